use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use bicubic_bench::benchmark::{backend_for, run_session};
use bicubic_bench::codec::{self, ArtifactWriter};
use bicubic_bench::config::{BenchConfig, DEFAULT_TRIALS, parse_widths};
use bicubic_bench::error::classify;
use bicubic_bench::report::{ConsoleReport, JsonReport, ReportSink};
use bicubic_bench::{BackendKind, HasRecoverySuggestion, logger};
use bicubic_scale::engine::timed_resize;
use bicubic_scale::plan::target_size;

/// Bicubic resampling benchmark:
/// - Sequential, CPU-parallel (rayon) and GPU-parallel (wgpu) cubic convolution
/// - every backend is checked against the sequential reference each trial
#[derive(Parser, Debug)]
#[command(name = "bicubic-bench")]
#[command(about = "Benchmark bicubic resampling backends against a sequential reference")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Time every backend at up to five target widths
    Bench {
        /// Source image
        input: PathBuf,

        #[arg(short, long, default_value = "1000",
              help = "Comma separated target widths, e.g. 800,1600,3200 (at most 5)")]
        widths: String,

        #[arg(short, long, default_value_t = DEFAULT_TRIALS, help = "Trials per width")]
        trials: usize,

        #[arg(short, long, default_value = "output", help = "Directory for resized artifacts")]
        output_dir: PathBuf,

        #[arg(long, help = "Worker threads for the CPU-parallel backend (default: all cores)")]
        threads: Option<usize>,

        #[arg(long, help = "Skip the GPU-parallel backend")]
        no_gpu: bool,

        #[arg(long, help = "Skip the nearest-neighbour baseline")]
        no_naive: bool,

        #[arg(long, help = "Do not write resized images")]
        no_artifacts: bool,

        #[arg(long, help = "Also write a JSON report to this path")]
        report: Option<PathBuf>,
    },

    /// Resize one image with a single backend
    Resize {
        /// Source image
        input: PathBuf,

        #[arg(short, long, help = "Target width; height follows the aspect ratio")]
        width: u32,

        #[arg(short, long, value_enum, default_value_t = BackendKind::CpuParallel)]
        backend: BackendKind,

        #[arg(short, long, help = "Output path (default: output/<stem>_<method>_<width>.png)")]
        output: Option<PathBuf>,

        #[arg(long, help = "Worker threads for the CPU-parallel backend")]
        threads: Option<usize>,
    },
}

fn main() -> Result<()> {
    logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Bench {
            input,
            widths,
            trials,
            output_dir,
            threads,
            no_gpu,
            no_naive,
            no_artifacts,
            report,
        } => {
            let config = BenchConfig {
                input,
                output_dir,
                widths: parse_widths(&widths),
                trials,
                use_gpu: !no_gpu,
                include_naive: !no_naive,
                write_artifacts: !no_artifacts,
                threads,
                report,
            };
            bench(config)
        }
        Command::Resize {
            input,
            width,
            backend,
            output,
            threads,
        } => resize(input, width, backend, output, threads),
    }
}

fn bench(config: BenchConfig) -> Result<()> {
    config.validate().map_err(anyhow::Error::msg)?;

    let summary = match run_session(&config) {
        Ok(summary) => summary,
        Err(e) => {
            if classify::is_fatal(&e) {
                let hint = e.recovery_suggestion().unwrap_or("no recovery available");
                log::error!("[{}] {} ({})", e.category(), e, hint);
            }
            return Err(e.into());
        }
    };

    let mut sinks: Vec<Box<dyn ReportSink>> = vec![Box::new(ConsoleReport)];
    if let Some(path) = &config.report {
        sinks.push(Box::new(JsonReport::new(path)));
    }
    for sink in &mut sinks {
        if let Err(e) = sink.publish(&summary) {
            log::warn!("{}", e);
        }
    }
    Ok(())
}

fn resize(
    input: PathBuf,
    width: u32,
    kind: BackendKind,
    output: Option<PathBuf>,
    threads: Option<usize>,
) -> Result<()> {
    let src = codec::load_image(&input)?;
    let target = target_size(src.size(), width)
        .with_context(|| format!("cannot derive a target size for width {}", width))?;
    let backend = backend_for(kind, threads)?;

    let result = timed_resize(backend.as_ref(), &src, target)
        .with_context(|| format!("{} resize failed", kind))?;
    println!(
        "{}: {}x{} -> {}x{} in {:.6} seconds",
        kind,
        src.width(),
        src.height(),
        target.w,
        target.h,
        result.elapsed.as_secs_f64()
    );

    let path = match output {
        Some(path) => {
            codec::save_image(&result.image, &path)?;
            path
        }
        None => ArtifactWriter::new("output", &input)?.write(&result.image, kind, width)?,
    };
    println!("Saved {}", path.display());
    Ok(())
}
