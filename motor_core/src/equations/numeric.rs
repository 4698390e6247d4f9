//! # Numerical Utilities
//!
//! Bounded bracketed root-finding, evenly spaced sampling and clamped table
//! interpolation, shared by the gas dynamics and performance calculators.
//!
//! Every loop here is capped by an iteration count, so no call can run
//! unbounded. Hitting the cap is reported as
//! [`CalcError::SolverDidNotConverge`], never as a silently returned
//! estimate.

use crate::config::SolverOptions;
use crate::errors::{CalcError, CalcResult};

/// Solve `f(x) = target` on `[lo, hi]` by bisection.
///
/// `f` must be continuous and `f(x) - target` must change sign over the
/// bracket (guaranteed by monotonicity for every caller in this crate).
/// Converged when `|f(x) - target| <= tolerance * |target|`.
///
/// # Example
/// ```rust
/// use motor_core::config::SolverOptions;
/// use motor_core::equations::numeric::bisect;
///
/// let root = bisect("sqrt", |x| x * x, 2.0, 0.0, 2.0, &SolverOptions::default()).unwrap();
/// assert!((root - 2f64.sqrt()).abs() < 1e-9);
/// ```
pub fn bisect<F>(solver: &str, f: F, target: f64, lo: f64, hi: f64, options: &SolverOptions) -> CalcResult<f64>
where
    F: Fn(f64) -> f64,
{
    let scale = target.abs().max(f64::MIN_POSITIVE);
    let residual = |x: f64| (f(x) - target) / scale;

    let (mut lo, mut hi) = (lo, hi);
    let mut r_lo = residual(lo);
    let r_hi = residual(hi);

    if r_lo.abs() <= options.tolerance {
        return Ok(lo);
    }
    if r_hi.abs() <= options.tolerance {
        return Ok(hi);
    }
    if r_lo.signum() == r_hi.signum() || r_lo.is_nan() || r_hi.is_nan() {
        tracing::debug!(solver, lo, hi, r_lo, r_hi, "root is not bracketed");
        return Err(CalcError::did_not_converge(solver, 0, r_lo.abs().min(r_hi.abs()), options.tolerance));
    }

    let mut last = f64::INFINITY;
    for iteration in 1..=options.max_iterations {
        let mid = 0.5 * (lo + hi);
        let r_mid = residual(mid);
        last = r_mid.abs();

        if last <= options.tolerance {
            tracing::debug!(solver, iteration, x = mid, residual = r_mid, "bisection converged");
            return Ok(mid);
        }

        if r_mid.signum() == r_lo.signum() {
            lo = mid;
            r_lo = r_mid;
        } else {
            hi = mid;
        }
    }

    Err(CalcError::did_not_converge(solver, options.max_iterations, last, options.tolerance))
}

/// `n` evenly spaced samples from `start` to `end`, both inclusive.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { end } else { start + step * i as f64 })
                .collect()
        }
    }
}

/// Piecewise-linear interpolation over a table sorted by `key`.
///
/// Values outside the table are clamped to the first/last row. An empty table
/// yields `None`.
pub fn interpolate<T, K, V>(table: &[T], x: f64, key: K, value: V) -> Option<f64>
where
    K: Fn(&T) -> f64,
    V: Fn(&T) -> f64,
{
    let first = table.first()?;
    let last = table.last()?;

    if x <= key(first) {
        return Some(value(first));
    }
    if x >= key(last) {
        return Some(value(last));
    }

    table.windows(2).find_map(|w| {
        let (x0, x1) = (key(&w[0]), key(&w[1]));
        if x >= x0 && x <= x1 {
            let t = (x - x0) / (x1 - x0);
            Some(value(&w[0]) + t * (value(&w[1]) - value(&w[0])))
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    #[test]
    fn test_bisect_decreasing_function() {
        let root = bisect("cube", |x| -x * x * x, -27.0, 0.0, 10.0, &SolverOptions::default()).unwrap();
        assert!(approx_eq(root, 3.0, 1e-9), "root = {}", root);
    }

    #[test]
    fn test_bisect_unbracketed_root_fails() {
        let err = bisect("square", |x| x * x, -1.0, 0.0, 2.0, &SolverOptions::default()).unwrap_err();
        assert_eq!(err.error_code(), "SOLVER_DID_NOT_CONVERGE");
    }

    #[test]
    fn test_bisect_iteration_cap_reports_failure() {
        let options = SolverOptions {
            tolerance: 1e-14,
            max_iterations: 3,
            ..SolverOptions::default()
        };
        match bisect("sqrt", |x| x * x, 2.0, 0.0, 2.0, &options) {
            Err(CalcError::SolverDidNotConverge { iterations, .. }) => assert_eq!(iterations, 3),
            other => panic!("expected non-convergence, got {:?}", other),
        }
    }

    #[test]
    fn test_linspace_endpoints() {
        let xs = linspace(0.0, 1.0, 5);
        assert_eq!(xs, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(linspace(2.0, 3.0, 1), vec![2.0]);
        assert!(linspace(0.0, 1.0, 0).is_empty());
    }

    #[test]
    fn test_interpolate_clamps_and_blends() {
        let table = [(0.0, 1.0), (100.0, 0.8), (200.0, 0.7)];
        let at = |x| interpolate(&table, x, |r| r.0, |r| r.1).unwrap();
        assert_eq!(at(-5.0), 1.0);
        assert_eq!(at(500.0), 0.7);
        assert!(approx_eq(at(50.0), 0.9, 1e-12));
        assert!(approx_eq(at(150.0), 0.75, 1e-12));
        let empty: [(f64, f64); 0] = [];
        assert!(interpolate(&empty, 1.0, |r| r.0, |r| r.1).is_none());
    }
}
