//! Observation matrices with dense or sparse row storage.
//!
//! The multinomial event model treats each observation as a vector of counts
//! over `n_features` discrete event types. Real corpora are often extremely
//! sparse (a handful of nonzero counts per row out of thousands of feature
//! dimensions), so [`Observations`] supports both a flat row-major dense
//! layout and a per-row `(index, count)` list, behind one arithmetic
//! contract: a weighted feature-dimension sum ([`row_dot`](Observations::row_dot))
//! and a row accumulation ([`accumulate_row`](Observations::accumulate_row)).
//! The estimator and decoder never inspect the storage form.

use tagseq_core::{Result, TagseqError};

/// Row storage backing an [`Observations`] matrix.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
enum Storage {
    /// Flat row-major values: `n_samples * n_features` entries.
    Dense(Vec<f64>),
    /// One `(feature index, count)` list per row; indices may repeat and
    /// need not be sorted.
    Sparse(Vec<Vec<(usize, f64)>>),
}

/// An `n_samples × n_features` matrix of event counts.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Observations {
    storage: Storage,
    n_samples: usize,
    n_features: usize,
}

impl Observations {
    /// Create a dense observation matrix from flat row-major data.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `n_features` is zero
    /// - `data.len()` is not a multiple of `n_features`
    pub fn dense(data: Vec<f64>, n_features: usize) -> Result<Self> {
        if n_features == 0 {
            return Err(TagseqError::InvalidParameter(
                "n_features must be > 0".into(),
            ));
        }
        if data.len() % n_features != 0 {
            return Err(TagseqError::DimensionMismatch(format!(
                "data length {} is not a multiple of n_features {n_features}",
                data.len()
            )));
        }
        let n_samples = data.len() / n_features;
        Ok(Self {
            storage: Storage::Dense(data),
            n_samples,
            n_features,
        })
    }

    /// Create a sparse observation matrix from per-row `(index, count)` lists.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `n_features` is zero
    /// - any row references a feature index `>= n_features`
    pub fn sparse(rows: Vec<Vec<(usize, f64)>>, n_features: usize) -> Result<Self> {
        if n_features == 0 {
            return Err(TagseqError::InvalidParameter(
                "n_features must be > 0".into(),
            ));
        }
        for (t, row) in rows.iter().enumerate() {
            for &(d, _) in row {
                if d >= n_features {
                    return Err(TagseqError::UnknownFeature(format!(
                        "row {t} references feature {d}, but n_features = {n_features}"
                    )));
                }
            }
        }
        let n_samples = rows.len();
        Ok(Self {
            storage: Storage::Sparse(rows),
            n_samples,
            n_features,
        })
    }

    /// Number of observation rows.
    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    /// Number of feature dimensions (event types).
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Weighted feature-dimension sum for one row: `Σ_d weights[d] · x[row][d]`.
    ///
    /// For sparse rows only the stored pairs are visited, so the cost is
    /// proportional to the number of nonzero entries. `weights` must have
    /// length `n_features` and `row` must be in range; both are guaranteed by
    /// the callers in this crate.
    pub(crate) fn row_dot(&self, row: usize, weights: &[f64]) -> f64 {
        debug_assert_eq!(weights.len(), self.n_features);
        debug_assert!(row < self.n_samples);
        match &self.storage {
            Storage::Dense(data) => {
                let start = row * self.n_features;
                data[start..start + self.n_features]
                    .iter()
                    .zip(weights)
                    .map(|(&x, &w)| w * x)
                    .sum()
            }
            Storage::Sparse(rows) => rows[row].iter().map(|&(d, x)| weights[d] * x).sum(),
        }
    }

    /// Add one row's counts into an accumulator of length `n_features`.
    ///
    /// This is the building block for per-state emission counting; it never
    /// densifies a sparse row.
    pub(crate) fn accumulate_row(&self, row: usize, acc: &mut [f64]) {
        debug_assert_eq!(acc.len(), self.n_features);
        debug_assert!(row < self.n_samples);
        match &self.storage {
            Storage::Dense(data) => {
                let start = row * self.n_features;
                for (a, &x) in acc.iter_mut().zip(&data[start..start + self.n_features]) {
                    *a += x;
                }
            }
            Storage::Sparse(rows) => {
                for &(d, x) in &rows[row] {
                    acc[d] += x;
                }
            }
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
