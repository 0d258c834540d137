//! Minimal stderr logger behind the `log` facade.
//!
//! Level comes from `RUST_LOG` (`error`, `warn`, `info`, `debug`, `trace`,
//! `off`) and defaults to `info`. Lines look like
//! `[1718000000.123] [ INFO] bicubic_bench::benchmark: width 640 (height 360)`.

use std::io::Write;
use std::time::{SystemTime, UNIX_EPOCH};

use log::{LevelFilter, Log, Metadata, Record};

struct StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let mut err = std::io::stderr().lock();
        let _ = writeln!(
            err,
            "[{}] [{:>5}] {}: {}",
            timestamp_millis(),
            record.level(),
            record.target(),
            record.args()
        );
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

/// Install the logger. Calling this more than once is harmless.
pub fn init() {
    init_with_level(level_from_env().unwrap_or(LevelFilter::Info));
}

pub fn init_with_level(level: LevelFilter) {
    if log::set_boxed_logger(Box::new(StderrLogger)).is_ok() {
        log::set_max_level(level);
    }
}

fn level_from_env() -> Option<LevelFilter> {
    std::env::var("RUST_LOG").ok().and_then(|v| parse_level(&v))
}

/// Most verbose level named anywhere in `filter`, so `bicubic_bench=debug` works.
fn parse_level(filter: &str) -> Option<LevelFilter> {
    let v = filter.to_lowercase();
    [
        ("trace", LevelFilter::Trace),
        ("debug", LevelFilter::Debug),
        ("info", LevelFilter::Info),
        ("warn", LevelFilter::Warn),
        ("error", LevelFilter::Error),
        ("off", LevelFilter::Off),
    ]
    .into_iter()
    .find(|(name, _)| v.contains(name))
    .map(|(_, level)| level)
}

fn timestamp_millis() -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("{}.{:03}", now.as_secs(), now.subsec_millis())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("debug"), Some(LevelFilter::Debug));
        assert_eq!(parse_level("bicubic_bench=TRACE"), Some(LevelFilter::Trace));
        assert_eq!(parse_level("warn,wgpu=error"), Some(LevelFilter::Warn));
        assert_eq!(parse_level("loud"), None);
    }

    #[test]
    fn test_second_init_keeps_first_level() {
        init_with_level(LevelFilter::Warn);
        init_with_level(LevelFilter::Trace);
        assert_eq!(log::max_level(), LevelFilter::Warn);
        log::warn!("logger installed");
    }

    #[test]
    fn test_timestamp_has_millis() {
        let ts = timestamp_millis();
        let (_, ms) = ts.split_once('.').unwrap();
        assert_eq!(ms.len(), 3);
    }
}
