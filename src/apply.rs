//! Applying the spline matrices to a signal matrix.
//!
//! One regularized bordered system is factored per invocation; each sample
//! column is then an independent solve, so the per-sample work is
//! distributed across threads (the matrices are read-only and no ordering
//! between samples is needed).
use ndarray::{Array2, ArrayView2, Axis, Zip};

use crate::config::CsdConfig;
use crate::error::Result;
use crate::solve::Lu;
use crate::spline::SplineMatrices;

/// Transform a [C, T] potential matrix into CSD estimates.
///
/// Per sample: solve the regularized, constraint-augmented spline system
/// for the coefficients, drop the Lagrange multiplier, project through H,
/// and rescale by `head_radius_cm²`. Output shape equals input shape;
/// for µV inputs the output is in µV/cm².
///
/// # Errors
///
/// [`crate::CsdError::SingularSystem`] when the augmented matrix cannot be
/// factored to tolerance (e.g. duplicate electrode positions with
/// `lambda = 0`). No approximate output is ever produced.
pub fn apply_csd(
    data: ArrayView2<'_, f64>,
    spline: &SplineMatrices,
    cfg: &CsdConfig,
) -> Result<Array2<f64>> {
    let n = spline.g.nrows();
    assert_eq!(
        data.nrows(),
        n,
        "signal has {} channels but the montage has {n}",
        data.nrows()
    );

    let lu = Lu::factor(augmented(&spline.g, cfg.lambda))?;
    let inv_r2 = 1.0 / (cfg.head_radius_cm * cfg.head_radius_cm);

    let mut out = Array2::<f64>::zeros(data.raw_dim());
    Zip::from(out.lanes_mut(Axis(0)))
        .and(data.lanes(Axis(0)))
        .par_for_each(|mut csd, v| {
            // Potential vector plus the trailing zero of the constraint row.
            let mut rhs = Vec::with_capacity(n + 1);
            rhs.extend(v.iter().copied());
            rhs.push(0.0);

            let coeffs = lu.solve(&rhs);
            for (i, out_i) in csd.iter_mut().enumerate() {
                let mut acc = 0.0;
                for (j, c) in coeffs[..n].iter().enumerate() {
                    acc += spline.h[[i, j]] * c;
                }
                *out_i = acc * inv_r2;
            }
        });

    Ok(out)
}

/// `G + λI` bordered with the zero-sum constraint: a row and column of
/// ones and a zero corner (Lagrange-multiplier augmentation enforcing that
/// the spline weights sum to zero).
fn augmented(g: &Array2<f64>, lambda: f64) -> Array2<f64> {
    let n = g.nrows();
    let mut a = Array2::<f64>::ones((n + 1, n + 1));
    a[[n, n]] = 0.0;
    for i in 0..n {
        for j in 0..n {
            a[[i, j]] = g[[i, j]];
        }
        a[[i, i]] += lambda;
    }
    a
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::ElectrodeAngle;
    use crate::montage::Montage;
    use crate::CsdError;

    fn montage_of(angles: &[(&str, f64, f64)]) -> Montage {
        let locs: Vec<ElectrodeAngle> = angles
            .iter()
            .map(|(l, t, p)| ElectrodeAngle {
                label: l.to_string(),
                theta_deg: *t,
                phi_deg: *p,
            })
            .collect();
        let names: Vec<String> = angles.iter().map(|(l, _, _)| l.to_string()).collect();
        Montage::build(&locs, &names).unwrap()
    }

    fn quad() -> SplineMatrices {
        let m = montage_of(&[
            ("pole", 0.0, 90.0),
            ("e1", 90.0, 0.0),
            ("e2", 180.0, 0.0),
            ("e3", -90.0, 0.0),
        ]);
        SplineMatrices::build(&m, 4).unwrap()
    }

    #[test]
    fn augmented_shape_and_border() {
        let s = quad();
        let a = augmented(&s.g, 1e-5);
        assert_eq!(a.dim(), (5, 5));
        for i in 0..4 {
            approx::assert_abs_diff_eq!(a[[4, i]], 1.0, epsilon = 0.0);
            approx::assert_abs_diff_eq!(a[[i, 4]], 1.0, epsilon = 0.0);
            approx::assert_abs_diff_eq!(a[[i, i]], s.g[[i, i]] + 1e-5, epsilon = 1e-18);
        }
        approx::assert_abs_diff_eq!(a[[4, 4]], 0.0, epsilon = 0.0);
    }

    #[test]
    fn constant_potential_has_zero_csd() {
        // The constraint absorbs any constant offset: the spline
        // coefficients are all zero, so the Laplacian is too.
        let s = quad();
        let data = Array2::from_elem((4, 3), 42.0);
        let out = apply_csd(data.view(), &s, &CsdConfig::default()).unwrap();
        for &v in out.iter() {
            approx::assert_abs_diff_eq!(v, 0.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn output_shape_matches_input() {
        let s = quad();
        let data = Array2::from_shape_fn((4, 7), |(c, t)| (c + t) as f64);
        let out = apply_csd(data.view(), &s, &CsdConfig::default()).unwrap();
        assert_eq!(out.dim(), (4, 7));
    }

    #[test]
    fn head_radius_rescales_quadratically() {
        let s = quad();
        let data = Array2::from_shape_fn((4, 2), |(c, t)| (c * 2 + t) as f64);
        let r10 = apply_csd(data.view(), &s, &CsdConfig::default()).unwrap();
        let r5 = apply_csd(
            data.view(),
            &s,
            &CsdConfig {
                head_radius_cm: 5.0,
                ..CsdConfig::default()
            },
        )
        .unwrap();
        for (a, b) in r5.iter().zip(r10.iter()) {
            approx::assert_abs_diff_eq!(*a, 4.0 * b, epsilon = 1e-12);
        }
    }

    #[test]
    fn transform_is_linear_per_sample() {
        let s = quad();
        let mut data = Array2::zeros((4, 2));
        for c in 0..4 {
            let v = (c as f64).sin() + 0.5;
            data[[c, 0]] = v;
            data[[c, 1]] = 4.0 * v;
        }
        let out = apply_csd(data.view(), &s, &CsdConfig::default()).unwrap();
        for c in 0..4 {
            approx::assert_abs_diff_eq!(out[[c, 1]], 4.0 * out[[c, 0]], epsilon = 1e-12);
        }
    }

    #[test]
    fn duplicate_positions_without_smoothing_are_singular() {
        let m = montage_of(&[
            ("a", 0.0, 90.0),
            ("dup1", 90.0, 0.0),
            ("dup2", 90.0, 0.0),
            ("b", 180.0, 0.0),
        ]);
        let s = SplineMatrices::build(&m, 4).unwrap();
        let data = Array2::from_elem((4, 1), 1.0);
        let err = apply_csd(
            data.view(),
            &s,
            &CsdConfig {
                lambda: 0.0,
                ..CsdConfig::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, CsdError::SingularSystem { .. }));
    }

    #[test]
    fn smoothing_rescues_duplicate_positions() {
        let m = montage_of(&[
            ("a", 0.0, 90.0),
            ("dup1", 90.0, 0.0),
            ("dup2", 90.0, 0.0),
            ("b", 180.0, 0.0),
        ]);
        let s = SplineMatrices::build(&m, 4).unwrap();
        let data = Array2::from_elem((4, 1), 1.0);
        assert!(apply_csd(data.view(), &s, &CsdConfig::default()).is_ok());
    }
}
