//! Weight computation and the operations that consume weights.
//!
//! - **Weights**: ring falloff, diffusion, cotangent-Laplace solve ([`weight`])
//! - **Deformation**: translation along vertex normals ([`deform`])
//! - **Colorization**: weight-driven vertex colors ([`colorize`])
//! - **Smoothing**: uniform Laplacian smoothing ([`smooth`])
//!
//! Long-running entry points have a variant taking a [`Progress`], which
//! reports progress and can cancel the computation.

pub mod colorize;
pub mod deform;
pub mod progress;
pub mod smooth;
pub mod sparse;
pub mod weight;

pub use progress::{CancelToken, Progress};
