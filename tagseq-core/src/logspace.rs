//! Numerically stable log-space arithmetic.
//!
//! Probability products over long sequences underflow `f64` quickly, so the
//! estimator and decoder keep every quantity as a natural logarithm. The
//! helpers here implement the standard log-sum-exp trick:
//! `ln Σ exp(x_i) = m + ln Σ exp(x_i − m)` with `m = max(x_i)`.

/// Numerically stable computation of `ln(exp(a) + exp(b))`.
///
/// Handles the cases where `a` or `b` are negative infinity.
pub fn log_sum_exp(a: f64, b: f64) -> f64 {
    if a == f64::NEG_INFINITY {
        return b;
    }
    if b == f64::NEG_INFINITY {
        return a;
    }
    let max = a.max(b);
    max + ((a - max).exp() + (b - max).exp()).ln()
}

/// Log-sum-exp over a slice.
///
/// Returns negative infinity for an empty slice or a slice of all
/// negative-infinity entries.
pub fn log_sum_exp_slice(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return f64::NEG_INFINITY;
    }
    let max = xs.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if max == f64::NEG_INFINITY {
        return f64::NEG_INFINITY;
    }
    let sum: f64 = xs.iter().map(|&x| (x - max).exp()).sum();
    max + sum.ln()
}

/// Normalize a slice of log-weights in place so that `Σ exp(xs[i]) == 1`.
///
/// Subtracts `log_sum_exp_slice(xs)` from every entry. A slice of all
/// negative-infinity entries is left unchanged (there is no distribution to
/// normalize to).
pub fn log_normalize(xs: &mut [f64]) {
    let norm = log_sum_exp_slice(xs);
    if norm == f64::NEG_INFINITY {
        return;
    }
    for x in xs.iter_mut() {
        *x -= norm;
    }
}

// ===========================================================================
// Tests
// ===========================================================================
