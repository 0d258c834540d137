// SPDX-License-Identifier: MIT
//! # bicubic-scale: Cubic Convolution Resampling Backends
//!
//! This crate resamples 8-bit interleaved images with cubic convolution
//! (support radius 2, Catmull-Rom coefficients) and ships three execution
//! strategies that produce byte-identical output for the same input.
//!
//! ## Key Components
//!
//! - [`kernel`]: the cubic convolution weight function
//! - [`sampler`]: edge-replicating channel lookup
//! - [`engine`]: the shared per-pixel mapping and the [`engine::ResampleBackend`] strategy trait
//! - [`sequential`]: single-threaded row-major reference backend
//! - [`cpu`]: fork-join backend on a per-call rayon pool
//! - [`gpu`]: wgpu compute shader backend (feature `gpu`)
//! - [`naive`]: nearest-neighbour baseline, not held to equivalence
//! - [`plan`]: aspect-preserving target size derivation
//!
//! ## Usage Example
//!
//! ```rust
//! use bicubic_scale::engine::ResampleBackend;
//! use bicubic_scale::image::{Image, Size};
//! use bicubic_scale::plan::target_size;
//! use bicubic_scale::sequential::SequentialBackend;
//!
//! let src = Image::new(4, 4, 1, vec![200; 16]).unwrap();
//! let target = target_size(src.size(), 8).unwrap();
//! assert_eq!(target, Size { w: 8, h: 8 });
//!
//! let out = SequentialBackend.resize(&src, target).unwrap();
//! assert!(out.data().iter().all(|&v| v == 200));
//! ```

pub mod cpu;
pub mod engine;
#[cfg(feature = "gpu")]
pub mod gpu;
pub mod image;
pub mod kernel;
pub mod naive;
pub mod plan;
pub mod sampler;
pub mod sequential;

pub use engine::{BackendKind, ResampleBackend, ResizeResult, ScaleError};
pub use image::{Image, Size};
