//! Supervised estimation of multinomial HMM parameters.
//!
//! [`fit`] consumes a label-annotated training corpus — an observation matrix,
//! one hidden-state label per row, and a `lengths` array segmenting the rows
//! into independent sequences — and produces an immutable
//! [`MultinomialHmm`]: the canonical state alphabet plus the initial,
//! transition, and emission tensors, all as log-probabilities.
//!
//! Counting uses additive (Lidstone) smoothing: every count starts at the
//! smoothing constant α > 0, so no state or feature ever receives a zero
//! probability and no `-inf` can enter the tensors. Normalization happens in
//! log-space via log-sum-exp subtraction.

use log::debug;

use tagseq_core::{log_normalize, Result, Summarizable, TagseqError};

use crate::observation::Observations;
use crate::viterbi::{DecodePath, LatticeViterbi, ViterbiDecoder};

/// Row-sum tolerance when validating externally supplied tensors.
const ROW_SUM_TOL: f64 = 1e-6;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for supervised HMM fitting.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FitConfig {
    /// Additive (Lidstone/Laplace) smoothing constant α, added to every
    /// count before normalization. Must be strictly positive.
    pub smoothing: f64,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self { smoothing: 1.0 }
    }
}

// ---------------------------------------------------------------------------
// Fitted model
// ---------------------------------------------------------------------------

/// A fitted first-order hidden Markov model with a multinomial event model.
///
/// Produced once by [`fit`] (or assembled from externally supplied tensors
/// via [`from_parts`](Self::from_parts)) and consumed repeatedly by the
/// decoding methods; never mutated.
///
/// The state alphabet is the sorted list of distinct training labels; state
/// index `k` everywhere refers to `classes()[k]`.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MultinomialHmm<L> {
    classes: Vec<L>,
    n_states: usize,
    n_features: usize,
    /// log P(state k at sequence start), length `n_states`.
    init_log: Vec<f64>,
    /// log P(next state | current state), `n_states × n_states` row-major.
    trans_log: Vec<f64>,
    /// log P(feature | state), `n_states × n_features` row-major.
    emit_log: Vec<f64>,
}

// ---------------------------------------------------------------------------
// Fitting
// ---------------------------------------------------------------------------

/// Fit a multinomial HMM from a labeled, length-segmented corpus.
///
/// `obs` holds one observation row per position across all training
/// sequences, `labels[t]` is the hidden state of row `t`, and `lengths`
/// gives each sequence's row count (`Σ lengths == obs.n_samples()`).
///
/// All preconditions are checked before any counting begins.
///
/// # Errors
///
/// Returns an error if:
/// - `config.smoothing` is not strictly positive and finite
///   ([`TagseqError::InvalidParameter`])
/// - `obs` has no rows or `lengths` is empty ([`TagseqError::EmptyInput`])
/// - `labels.len() != obs.n_samples()`, any length is zero, or
///   `Σ lengths != obs.n_samples()` ([`TagseqError::DimensionMismatch`])
pub fn fit<L: Ord + Clone>(
    obs: &Observations,
    labels: &[L],
    lengths: &[usize],
    config: &FitConfig,
) -> Result<MultinomialHmm<L>> {
    let alpha = config.smoothing;
    if !(alpha > 0.0 && alpha.is_finite()) {
        return Err(TagseqError::InvalidParameter(format!(
            "smoothing must be > 0, got {alpha}"
        )));
    }

    let n = obs.n_samples();
    if n == 0 {
        return Err(TagseqError::EmptyInput("no observation rows".into()));
    }
    if lengths.is_empty() {
        return Err(TagseqError::EmptyInput("lengths is empty".into()));
    }
    if labels.len() != n {
        return Err(TagseqError::DimensionMismatch(format!(
            "{} labels for {n} observation rows",
            labels.len()
        )));
    }
    if let Some(i) = lengths.iter().position(|&len| len == 0) {
        return Err(TagseqError::DimensionMismatch(format!(
            "lengths[{i}] is zero; every sequence must be non-empty"
        )));
    }
    let total: usize = lengths.iter().sum();
    if total != n {
        return Err(TagseqError::DimensionMismatch(format!(
            "lengths sum to {total}, but there are {n} observation rows"
        )));
    }

    // Canonical state alphabet: sorted distinct labels, remapped to 0..K-1.
    let mut classes: Vec<L> = labels.to_vec();
    classes.sort();
    classes.dedup();
    let k = classes.len();
    let d = obs.n_features();
    let y: Vec<usize> = labels
        .iter()
        .map(|l| {
            classes
                .binary_search(l)
                .expect("every label is in the distinct-label alphabet")
        })
        .collect();

    debug!("fit: n_samples={n}, n_sequences={}, n_states={k}, n_features={d}", lengths.len());

    // All three tensors start at alpha so every count is >= alpha > 0 and no
    // -inf survives the log transform below.
    let mut init_log = vec![alpha; k];
    let mut trans_log = vec![alpha; k * k];
    let mut emit_log = vec![alpha; k * d];

    // Initial and transition counts, per segment. A segment's final position
    // has no successor within the segment, so it is never a predecessor.
    let mut pos = 0usize;
    for &len in lengths {
        init_log[y[pos]] += 1.0;
        for t in pos..pos + len - 1 {
            trans_log[y[t] * k + y[t + 1]] += 1.0;
        }
        pos += len;
    }

    // Emission counts: sum each state's observation rows.
    for t in 0..n {
        obs.accumulate_row(t, &mut emit_log[y[t] * d..(y[t] + 1) * d]);
    }

    // Log transform and row-wise log-space normalization.
    for x in init_log.iter_mut() {
        *x = x.ln();
    }
    log_normalize(&mut init_log);
    for row in trans_log.chunks_mut(k) {
        for x in row.iter_mut() {
            *x = x.ln();
        }
        log_normalize(row);
    }
    for row in emit_log.chunks_mut(d) {
        for x in row.iter_mut() {
            *x = x.ln();
        }
        log_normalize(row);
    }

    Ok(MultinomialHmm {
        classes,
        n_states: k,
        n_features: d,
        init_log,
        trans_log,
        emit_log,
    })
}

// ---------------------------------------------------------------------------
// Model surface
// ---------------------------------------------------------------------------

impl<L: Ord + Clone> MultinomialHmm<L> {
    /// Assemble a model from externally supplied log-probability tensors.
    ///
    /// `classes` must be sorted and distinct (it defines the index mapping),
    /// `init_log` has length `K = classes.len()`, `trans_log` is `K×K`, and
    /// `emit_log` is `K×D` for some `D ≥ 1`. Every row must exponentiate to
    /// a distribution summing to 1 within a tolerance of 1e-6.
    ///
    /// # Errors
    ///
    /// Returns an error if any shape, ordering, or normalization constraint
    /// above is violated.
    pub fn from_parts(
        classes: Vec<L>,
        init_log: Vec<f64>,
        trans_log: Vec<f64>,
        emit_log: Vec<f64>,
    ) -> Result<Self> {
        if classes.is_empty() {
            return Err(TagseqError::EmptyInput("state alphabet is empty".into()));
        }
        if classes.windows(2).any(|w| w[0] >= w[1]) {
            return Err(TagseqError::InvalidParameter(
                "state alphabet must be sorted and distinct".into(),
            ));
        }
        let k = classes.len();
        if init_log.len() != k {
            return Err(TagseqError::DimensionMismatch(format!(
                "init_log length {} != n_states {k}",
                init_log.len()
            )));
        }
        if trans_log.len() != k * k {
            return Err(TagseqError::DimensionMismatch(format!(
                "trans_log length {} != n_states^2 {}",
                trans_log.len(),
                k * k
            )));
        }
        if emit_log.is_empty() || emit_log.len() % k != 0 {
            return Err(TagseqError::DimensionMismatch(format!(
                "emit_log length {} is not a positive multiple of n_states {k}",
                emit_log.len()
            )));
        }
        let d = emit_log.len() / k;

        check_row_sums(&init_log, k, "init_log")?;
        for (i, row) in trans_log.chunks(k).enumerate() {
            check_row_sums(row, k, &format!("trans_log row {i}"))?;
        }
        for (i, row) in emit_log.chunks(d).enumerate() {
            check_row_sums(row, d, &format!("emit_log row {i}"))?;
        }

        Ok(Self {
            classes,
            n_states: k,
            n_features: d,
            init_log,
            trans_log,
            emit_log,
        })
    }

    /// Number of hidden states.
    pub fn n_states(&self) -> usize {
        self.n_states
    }

    /// Number of feature dimensions (event types).
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// The canonical state alphabet, sorted; state index `k` means
    /// `classes()[k]`.
    pub fn classes(&self) -> &[L] {
        &self.classes
    }

    /// log P(state k at sequence start), length `n_states`.
    pub fn init_log(&self) -> &[f64] {
        &self.init_log
    }

    /// log P(next state | current state), `n_states × n_states` row-major.
    pub fn trans_log(&self) -> &[f64] {
        &self.trans_log
    }

    /// log P(feature | state), `n_states × n_features` row-major.
    pub fn emit_log(&self) -> &[f64] {
        &self.emit_log
    }

    fn check_features(&self, obs: &Observations) -> Result<()> {
        if obs.n_features() != self.n_features {
            return Err(TagseqError::DimensionMismatch(format!(
                "observations have {} features, model was fitted with {}",
                obs.n_features(),
                self.n_features
            )));
        }
        Ok(())
    }

    /// Decode a single unsegmented sequence, returning the most probable
    /// state indices and that path's log-likelihood.
    ///
    /// # Errors
    ///
    /// Returns an error if `obs` is empty or its feature count differs from
    /// the fitted model's.
    pub fn decode(&self, obs: &Observations) -> Result<(Vec<usize>, f64)> {
        self.decode_with(&LatticeViterbi, obs)
    }

    /// Decode with a caller-chosen [`ViterbiDecoder`] implementation.
    ///
    /// Every decoder satisfying the trait contract returns the same result;
    /// this is the substitution point for an accelerated kernel.
    ///
    /// # Errors
    ///
    /// Same conditions as [`decode`](Self::decode).
    pub fn decode_with(
        &self,
        decoder: &dyn ViterbiDecoder,
        obs: &Observations,
    ) -> Result<(Vec<usize>, f64)> {
        self.check_features(obs)?;
        let DecodePath {
            states,
            log_likelihood,
        } = decoder.decode(
            obs,
            0..obs.n_samples(),
            &self.init_log,
            &self.trans_log,
            &self.emit_log,
        )?;
        Ok((states, log_likelihood))
    }

    /// Decode a single sequence and map the state indices back to the
    /// caller-domain labels of the state alphabet.
    ///
    /// # Errors
    ///
    /// Same conditions as [`decode`](Self::decode).
    pub fn predict(&self, obs: &Observations) -> Result<Vec<L>> {
        let (states, _) = self.decode(obs)?;
        Ok(states.into_iter().map(|s| self.classes[s].clone()).collect())
    }

    /// Decode a concatenation of independent sequences.
    ///
    /// Each segment described by `lengths` is decoded on its own — no state
    /// information crosses a segment boundary — and the per-segment label
    /// sequences are concatenated in input order. With the `parallel`
    /// feature enabled, segments are decoded across rayon worker threads;
    /// output is identical either way.
    ///
    /// # Errors
    ///
    /// Returns an error if `lengths` is empty, contains a zero, or does not
    /// sum to `obs.n_samples()`, or if the feature counts disagree.
    pub fn predict_batch(&self, obs: &Observations, lengths: &[usize]) -> Result<Vec<L>> {
        self.check_features(obs)?;
        if lengths.is_empty() {
            return Err(TagseqError::EmptyInput("lengths is empty".into()));
        }
        if let Some(i) = lengths.iter().position(|&len| len == 0) {
            return Err(TagseqError::DimensionMismatch(format!(
                "lengths[{i}] is zero; every sequence must be non-empty"
            )));
        }
        let total: usize = lengths.iter().sum();
        if total != obs.n_samples() {
            return Err(TagseqError::DimensionMismatch(format!(
                "lengths sum to {total}, but there are {} observation rows",
                obs.n_samples()
            )));
        }

        let mut ranges = Vec::with_capacity(lengths.len());
        let mut pos = 0usize;
        for &len in lengths {
            ranges.push(pos..pos + len);
            pos += len;
        }
        debug!("predict_batch: {} segments, {} rows", ranges.len(), total);

        #[cfg(feature = "parallel")]
        let paths = {
            use rayon::prelude::*;
            ranges
                .into_par_iter()
                .map(|r| {
                    LatticeViterbi.decode(obs, r, &self.init_log, &self.trans_log, &self.emit_log)
                })
                .collect::<Result<Vec<DecodePath>>>()?
        };

        #[cfg(not(feature = "parallel"))]
        let paths = ranges
            .into_iter()
            .map(|r| LatticeViterbi.decode(obs, r, &self.init_log, &self.trans_log, &self.emit_log))
            .collect::<Result<Vec<DecodePath>>>()?;

        Ok(paths
            .iter()
            .flat_map(|p| p.states.iter().map(|&s| self.classes[s].clone()))
            .collect())
    }
}

impl<L> Summarizable for MultinomialHmm<L> {
    fn summary(&self) -> String {
        format!(
            "MultinomialHmm: {} states, {} features",
            self.n_states, self.n_features
        )
    }
}

/// Validate that a log-probability row exponentiates to ~1.
fn check_row_sums(row: &[f64], expected_len: usize, what: &str) -> Result<()> {
    debug_assert_eq!(row.len(), expected_len);
    let total: f64 = row.iter().map(|&x| x.exp()).sum();
    if (total - 1.0).abs() > ROW_SUM_TOL {
        return Err(TagseqError::InvalidParameter(format!(
            "{what} sums to {total}, expected ~1.0"
        )));
    }
    Ok(())
}

// ===========================================================================
// Tests
// ===========================================================================
