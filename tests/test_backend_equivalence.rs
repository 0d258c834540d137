mod common;

use bicubic_bench::{BackendKind, ResampleBackend, Size};
use bicubic_scale::cpu::CpuParallelBackend;
use bicubic_scale::naive::NearestBackend;
use bicubic_scale::plan::target_size;
use bicubic_scale::sequential::SequentialBackend;
use common::{constant_image, noise_image};

#[test]
fn cpu_parallel_matches_sequential_across_shapes() {
    let cases = [
        (1, 1, 1, Size { w: 7, h: 3 }),
        (17, 9, 3, Size { w: 40, h: 21 }),
        (64, 48, 4, Size { w: 13, h: 10 }),
        (31, 31, 2, Size { w: 31, h: 31 }),
        (5, 40, 1, Size { w: 2, h: 97 }),
    ];
    for (i, (w, h, c, target)) in cases.into_iter().enumerate() {
        let src = noise_image(w, h, c, 17 + i as u32);
        let reference = SequentialBackend.resize(&src, target).unwrap();
        for threads in [1, 3, 8] {
            let out = CpuParallelBackend::with_threads(threads).resize(&src, target).unwrap();
            assert_eq!(out.data(), reference.data(), "case {} threads {}", i, threads);
        }
    }
}

#[test]
fn repeated_runs_are_deterministic() {
    let src = noise_image(40, 30, 3, 99);
    let target = target_size(src.size(), 73).unwrap();
    let cpu = CpuParallelBackend::new();
    let first = cpu.resize(&src, target).unwrap();
    for _ in 0..3 {
        assert_eq!(cpu.resize(&src, target).unwrap().data(), first.data());
    }
}

#[test]
fn constant_image_stays_constant_for_all_cpu_backends() {
    // 2x keeps every sample offset dyadic, so the weights sum to exactly 1.
    // Ratios like 1/3 leave the sum a hair under 1 and truncation gives 199.
    let src = constant_image(9, 6, 3, 200);
    let target = Size { w: 18, h: 12 };
    let backends: Vec<Box<dyn ResampleBackend>> = vec![
        Box::new(SequentialBackend),
        Box::new(CpuParallelBackend::with_threads(4)),
        Box::new(NearestBackend),
    ];
    for backend in backends {
        let out = backend.resize(&src, target).unwrap();
        assert_eq!((out.width(), out.height(), out.channels()), (18, 12, 3));
        assert!(out.data().iter().all(|&v| v == 200), "{}", backend.kind());
    }
}

#[test]
fn nearest_is_not_held_to_equivalence() {
    assert!(!BackendKind::Nearest.is_equivalence_checked());
    for kind in [BackendKind::Sequential, BackendKind::CpuParallel, BackendKind::GpuParallel] {
        assert!(kind.is_equivalence_checked());
    }
}
