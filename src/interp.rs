//! Linear resampling of spectra between wavelength axes.
//!
//! Targets outside the source axis resample to exactly `0.0`. There is no
//! extrapolation and no clamping to the edge value.

use log::warn;

/// Linearly interpolate `src_val` (sampled on `src_wl`) at `target`.
///
/// Returns the stored value when `target` hits an axis value exactly and
/// `0.0` outside `[src_wl[0], src_wl[n - 1]]`. The bracketing interval is
/// found by binary search.
pub fn interpolate_scalar(src_wl: &[f64], src_val: &[f64], target: f64) -> f64 {
    let (Some(&first), Some(&last)) = (src_wl.first(), src_wl.last()) else {
        return 0.0;
    };
    // NaN fails both comparisons and lands here too
    if !(target >= first && target <= last) {
        return 0.0;
    }
    if target == first {
        return src_val[0];
    }

    // First index with src_wl[hi] >= target; always >= 1 here
    let hi = src_wl.partition_point(|&wl| wl < target);
    if src_wl[hi] == target {
        return src_val[hi];
    }
    let lo = hi - 1;

    let t = (target - src_wl[lo]) / (src_wl[hi] - src_wl[lo]);
    src_val[lo] + t * (src_val[hi] - src_val[lo])
}

/// True when `target_wl` lies entirely inside the span of `src_wl`.
pub fn covers(src_wl: &[f64], target_wl: &[f64]) -> bool {
    match (
        src_wl.first(),
        src_wl.last(),
        target_wl.first(),
        target_wl.last(),
    ) {
        (Some(src_lo), Some(src_hi), Some(lo), Some(hi)) => lo >= src_lo && hi <= src_hi,
        // An empty target needs nothing from the source
        (_, _, None, _) => true,
        _ => false,
    }
}

/// Resample a spectrum onto `target_wl`, writing into `out`.
///
/// `out` must have the same length as `target_wl`. A target grid wider than
/// the source only produces a warning; the uncovered bands come out as zero.
pub fn interpolate_vector(src_wl: &[f64], src_val: &[f64], target_wl: &[f64], out: &mut [f64]) {
    debug_assert_eq!(src_wl.len(), src_val.len());
    debug_assert_eq!(target_wl.len(), out.len());

    if !covers(src_wl, target_wl) {
        warn!(
            "target grid [{:?}, {:?}] nm exceeds source grid [{:?}, {:?}] nm, uncovered bands set to 0",
            target_wl.first(),
            target_wl.last(),
            src_wl.first(),
            src_wl.last()
        );
    }

    for (value, &wl) in out.iter_mut().zip(target_wl) {
        *value = interpolate_scalar(src_wl, src_val, wl);
    }
}

/// Resample every class column of a column-major matrix onto `target_wl`.
///
/// `src_matrix` holds `n_classes` blocks of `src_wl.len()` values and `out`
/// receives `n_classes` blocks of `target_wl.len()` values.
pub fn interpolate_matrix(
    src_wl: &[f64],
    src_matrix: &[f64],
    target_wl: &[f64],
    n_classes: usize,
    out: &mut [f64],
) {
    let n_src = src_wl.len();
    let n_target = target_wl.len();
    debug_assert_eq!(src_matrix.len(), n_src * n_classes);
    debug_assert_eq!(out.len(), n_target * n_classes);

    if n_src == 0 || n_target == 0 {
        out.fill(0.0);
        return;
    }

    for (src_col, out_col) in src_matrix
        .chunks_exact(n_src)
        .zip(out.chunks_exact_mut(n_target))
        .take(n_classes)
    {
        interpolate_vector(src_wl, src_col, target_wl, out_col);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const WL: [f64; 3] = [443.0, 490.0, 555.0];
    const VAL: [f64; 3] = [0.01, 0.02, 0.03];

    #[test]
    fn test_exact_match_returns_stored_value() {
        for (&wl, &val) in WL.iter().zip(VAL.iter()) {
            assert_eq!(interpolate_scalar(&WL, &VAL, wl), val);
        }
    }

    #[test]
    fn test_out_of_domain_is_zero() {
        assert_eq!(interpolate_scalar(&WL, &VAL, 442.999), 0.0);
        assert_eq!(interpolate_scalar(&WL, &VAL, 555.001), 0.0);
        assert_eq!(interpolate_scalar(&WL, &VAL, -1.0), 0.0);
    }

    #[test]
    fn test_non_finite_target_is_zero() {
        assert_eq!(interpolate_scalar(&WL, &VAL, f64::NAN), 0.0);
        assert_eq!(interpolate_scalar(&WL, &VAL, f64::INFINITY), 0.0);
        assert_eq!(interpolate_scalar(&[500.0], &[0.4], f64::NAN), 0.0);

        let mut out = [1.0; 2];
        interpolate_vector(&WL, &VAL, &[f64::NAN, 490.0], &mut out);
        assert_eq!(out, [0.0, 0.02]);
    }

    #[test]
    fn test_empty_and_single_point_sources() {
        assert_eq!(interpolate_scalar(&[], &[], 500.0), 0.0);
        assert_eq!(interpolate_scalar(&[500.0], &[0.4], 500.0), 0.4);
        assert_eq!(interpolate_scalar(&[500.0], &[0.4], 501.0), 0.0);
    }

    #[test]
    fn test_midpoint() {
        assert_relative_eq!(
            interpolate_scalar(&WL, &VAL, 466.5),
            0.015,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_interior_points_are_linear_and_bounded() {
        let targets = [500.0, 510.0, 520.0, 530.0];
        let values: Vec<f64> = targets
            .iter()
            .map(|&wl| interpolate_scalar(&WL, &VAL, wl))
            .collect();

        for &v in &values {
            assert!(v > 0.02 && v < 0.03);
        }
        // Equal wavelength steps give equal value steps
        let steps: Vec<f64> = values.windows(2).map(|w| w[1] - w[0]).collect();
        for step in &steps[1..] {
            assert_relative_eq!(*step, steps[0], max_relative = 1e-9);
        }
    }

    #[test]
    fn test_covers() {
        assert!(covers(&WL, &[450.0, 500.0]));
        assert!(covers(&WL, &WL));
        assert!(!covers(&WL, &[400.0, 500.0]));
        assert!(!covers(&WL, &[450.0, 600.0]));
        assert!(!covers(&[], &[450.0]));
        assert!(covers(&WL, &[]));
    }

    #[test]
    fn test_vector_zeroes_uncovered_bands() {
        let target = [400.0, 443.0, 466.5, 700.0];
        assert!(!covers(&WL, &target));

        // A wider target only warns; the call still fills every band
        let mut out = [f64::NAN; 4];
        interpolate_vector(&WL, &VAL, &target, &mut out);

        assert_eq!(out[0], 0.0, "band below the source span must be zero");
        assert_eq!(out[1], 0.01);
        assert_relative_eq!(out[2], 0.015, max_relative = 1e-12);
        assert_eq!(out[3], 0.0, "band above the source span must be zero");
    }

    #[test]
    fn test_matrix_keeps_class_blocks() {
        // sand, then algae
        let matrix = [0.01, 0.02, 0.03, 0.03, 0.04, 0.05];
        let target = [443.0, 522.5];
        let mut out = [0.0; 4];
        interpolate_matrix(&WL, &matrix, &target, 2, &mut out);

        assert_eq!(out[0], 0.01);
        assert_relative_eq!(out[1], 0.025, max_relative = 1e-12);
        assert_eq!(out[2], 0.03);
        assert_relative_eq!(out[3], 0.045, max_relative = 1e-12);
    }
}
