//! Shared primitives for the tagseq sequence-labeling crates.
//!
//! `tagseq-core` provides the foundation the algorithmic crates build on:
//!
//! - **Error types** — [`TagseqError`] and [`Result`] for structured error handling
//! - **Log-space numerics** — [`log_sum_exp`] and friends for underflow-free
//!   probability arithmetic
//! - **Traits** — [`Summarizable`] for one-line result summaries

pub mod error;
pub mod logspace;
pub mod traits;

pub use error::{Result, TagseqError};
pub use logspace::{log_normalize, log_sum_exp, log_sum_exp_slice};
pub use traits::Summarizable;
