//! Supervised multinomial hidden Markov models with Viterbi decoding.
//!
//! A first-order HMM whose emission distribution treats each observation as
//! counts over a fixed set of discrete event types (the multinomial event
//! model). Parameters are estimated from label-annotated training sequences
//! with additive smoothing — no EM, no iteration — and the most probable
//! hidden-state sequence is recovered by exact dynamic programming.
//!
//! - **Estimation** — [`fit`] aggregates smoothed initial/transition/emission
//!   counts from a length-segmented corpus into log-probability tensors
//! - **Decoding** — [`MultinomialHmm::predict`] and friends run the Viterbi
//!   recursion behind the swappable [`ViterbiDecoder`] trait
//! - **Observations** — [`Observations`] stores count vectors densely or as
//!   sparse `(index, count)` rows behind one arithmetic contract
//!
//! # Quick start
//!
//! ```
//! use tagseq_hmm::{fit, FitConfig, Observations};
//!
//! // Two weather states over three daily activities (walk, shop, clean),
//! // one-hot count vectors, two training sequences of four days each.
//! let obs = Observations::dense(vec![
//!     0.0, 1.0, 0.0,
//!     0.0, 0.0, 1.0,
//!     1.0, 0.0, 0.0,
//!     0.0, 0.0, 1.0,
//!     1.0, 0.0, 0.0,
//!     1.0, 0.0, 0.0,
//!     0.0, 1.0, 0.0,
//!     1.0, 0.0, 0.0,
//! ], 3).unwrap();
//! let labels = vec![
//!     "rainy", "rainy", "sunny", "rainy",
//!     "sunny", "sunny", "sunny", "sunny",
//! ];
//!
//! let model = fit(&obs, &labels, &[4, 4], &FitConfig::default()).unwrap();
//!
//! let held_out = Observations::dense(vec![
//!     1.0, 0.0, 0.0,
//!     0.0, 0.0, 1.0,
//! ], 3).unwrap();
//! let predicted = model.predict(&held_out).unwrap();
//! assert_eq!(predicted.len(), 2);
//! ```

pub mod model;
pub mod observation;
pub mod viterbi;

pub use model::{fit, FitConfig, MultinomialHmm};
pub use observation::Observations;
pub use viterbi::{DecodePath, LatticeViterbi, TableViterbi, ViterbiDecoder};
