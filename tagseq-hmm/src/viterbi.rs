//! Viterbi decoding over a hidden-state lattice.
//!
//! Given the three log-probability tensors of a fitted model and a sequence
//! of `T` observations, the decoder recovers the single state sequence
//! maximizing the joint log-probability of states and observations — the
//! global optimum over all `K^T` candidates, not a greedy approximation.
//! Runtime is `O(T·K²)` with `O(T·K)` space (a running score vector plus the
//! backpointer table).
//!
//! The algorithm sits behind the [`ViterbiDecoder`] trait so an alternative
//! kernel can be substituted at initialization time without changing the
//! contract. Two interchangeable implementations are provided:
//!
//! - [`LatticeViterbi`] — reference implementation; emission scores are
//!   computed on demand, one dot product per `(t, state)` cell.
//! - [`TableViterbi`] — precomputes the full `T×K` emission-score table in a
//!   single pass over each row's stored entries before the lattice sweep.
//!   Faster for sparse input with many states; output is identical.

use std::ops::Range;

use tagseq_core::{Result, TagseqError};

use crate::observation::Observations;

/// The decoded state sequence for one segment and its log-likelihood.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DecodePath {
    /// Most probable state index at each position.
    pub states: Vec<usize>,
    /// Joint log-probability of the returned path and the observations.
    pub log_likelihood: f64,
}

/// Maximum-a-posteriori state-sequence decoding.
///
/// Implementations must return the globally optimal path under the supplied
/// tensors, breaking score ties toward the lowest-indexed state so that
/// output is deterministic.
pub trait ViterbiDecoder {
    /// Decode the rows `range` of `obs` against the given log-probability
    /// tensors.
    ///
    /// `init_log` has length `K`, `trans_log` is `K×K` row-major, and
    /// `emit_log` is `K×n_features` row-major.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `range` is empty ([`TagseqError::EmptyInput`])
    /// - `range` extends past the matrix, or the tensor shapes disagree with
    ///   each other or with `obs.n_features()`
    ///   ([`TagseqError::DimensionMismatch`])
    fn decode(
        &self,
        obs: &Observations,
        range: Range<usize>,
        init_log: &[f64],
        trans_log: &[f64],
        emit_log: &[f64],
    ) -> Result<DecodePath>;
}

/// Reference decoder: per-cell emission scores computed on demand.
#[derive(Debug, Clone, Copy, Default)]
pub struct LatticeViterbi;

/// Accelerated decoder: emission-score table precomputed up front.
#[derive(Debug, Clone, Copy, Default)]
pub struct TableViterbi;

impl ViterbiDecoder for LatticeViterbi {
    fn decode(
        &self,
        obs: &Observations,
        range: Range<usize>,
        init_log: &[f64],
        trans_log: &[f64],
        emit_log: &[f64],
    ) -> Result<DecodePath> {
        let k = validate_shapes(obs, &range, init_log, trans_log, emit_log)?;
        let d = obs.n_features();
        let start = range.start;
        let t_len = range.len();
        Ok(lattice_sweep(k, t_len, init_log, trans_log, |t, j| {
            obs.row_dot(start + t, &emit_log[j * d..(j + 1) * d])
        }))
    }
}

impl ViterbiDecoder for TableViterbi {
    fn decode(
        &self,
        obs: &Observations,
        range: Range<usize>,
        init_log: &[f64],
        trans_log: &[f64],
        emit_log: &[f64],
    ) -> Result<DecodePath> {
        let k = validate_shapes(obs, &range, init_log, trans_log, emit_log)?;
        let d = obs.n_features();
        let start = range.start;
        let t_len = range.len();
        let mut scores = vec![0.0f64; t_len * k];
        for t in 0..t_len {
            for j in 0..k {
                scores[t * k + j] = obs.row_dot(start + t, &emit_log[j * d..(j + 1) * d]);
            }
        }
        Ok(lattice_sweep(k, t_len, init_log, trans_log, |t, j| {
            scores[t * k + j]
        }))
    }
}

/// Check the tensor shapes against each other and the observation matrix,
/// returning the number of states.
fn validate_shapes(
    obs: &Observations,
    range: &Range<usize>,
    init_log: &[f64],
    trans_log: &[f64],
    emit_log: &[f64],
) -> Result<usize> {
    if range.start >= range.end {
        return Err(TagseqError::EmptyInput(
            "observation sequence is empty".into(),
        ));
    }
    if range.end > obs.n_samples() {
        return Err(TagseqError::DimensionMismatch(format!(
            "segment {}..{} extends past {} observation rows",
            range.start,
            range.end,
            obs.n_samples()
        )));
    }
    let k = init_log.len();
    if k == 0 {
        return Err(TagseqError::InvalidParameter(
            "init_log must contain at least one state".into(),
        ));
    }
    if trans_log.len() != k * k {
        return Err(TagseqError::DimensionMismatch(format!(
            "trans_log length {} != n_states^2 {}",
            trans_log.len(),
            k * k
        )));
    }
    if emit_log.len() != k * obs.n_features() {
        return Err(TagseqError::DimensionMismatch(format!(
            "emit_log length {} != n_states*n_features {}",
            emit_log.len(),
            k * obs.n_features()
        )));
    }
    Ok(k)
}

/// The shared lattice recursion.
///
/// `emit(t, j)` yields the emission score of relative position `t` under
/// state `j`. Ties are broken toward the lowest-indexed state by replacing
/// the running maximum only on a strictly greater score, both in the
/// recursion and at termination.
fn lattice_sweep(
    k: usize,
    t_len: usize,
    init_log: &[f64],
    trans_log: &[f64],
    emit: impl Fn(usize, usize) -> f64,
) -> DecodePath {
    let mut delta = vec![f64::NEG_INFINITY; k];
    let mut next = vec![f64::NEG_INFINITY; k];
    let mut psi = vec![0usize; t_len * k];

    // Initialization: delta[i] = log(pi[i]) + e_0[i]
    for i in 0..k {
        delta[i] = init_log[i] + emit(0, i);
    }

    // Recursion
    for t in 1..t_len {
        for j in 0..k {
            let mut best_val = f64::NEG_INFINITY;
            let mut best_state = 0;
            for i in 0..k {
                let v = delta[i] + trans_log[i * k + j];
                if v > best_val {
                    best_val = v;
                    best_state = i;
                }
            }
            next[j] = best_val + emit(t, j);
            psi[t * k + j] = best_state;
        }
        std::mem::swap(&mut delta, &mut next);
    }

    // Termination: best final state
    let mut best_final = 0usize;
    let mut best_score = f64::NEG_INFINITY;
    for i in 0..k {
        if delta[i] > best_score {
            best_score = delta[i];
            best_final = i;
        }
    }

    // Backtrack
    let mut states = vec![0usize; t_len];
    states[t_len - 1] = best_final;
    for t in (0..t_len - 1).rev() {
        states[t] = psi[(t + 1) * k + states[t + 1]];
    }

    DecodePath {
        states,
        log_likelihood: best_score,
    }
}

// ===========================================================================
// Tests
// ===========================================================================
