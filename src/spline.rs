//! Spherical-spline interpolation matrices.
//!
//! Builds the pairwise G (interpolation kernel) and H (surface-Laplacian
//! kernel) matrices of Perrin et al. (1989) from electrode angles. Both
//! kernels are truncated Legendre series in the cosine of the great-circle
//! distance between electrodes; H additionally weights each term with the
//! Laplace–Beltrami eigenvalue n(n+1), which is what makes the Laplacian
//! amplify higher spatial harmonics.
use ndarray::Array2;

use crate::error::{CsdError, Result};
use crate::montage::Montage;

/// Truncation order of the Legendre expansion. Fixed by calibration against
/// the reference method, not a tunable.
const LEGENDRE_TERMS: usize = 7;

const FOUR_PI: f64 = 4.0 * std::f64::consts::PI;

/// The spline kernel matrices for one montage.
///
/// Owned by the transform invocation that built them; a different montage
/// needs freshly built matrices.
#[derive(Debug, Clone)]
pub struct SplineMatrices {
    /// Interpolation kernel, N×N, symmetric.
    pub g: Array2<f64>,
    /// Surface-Laplacian kernel, N×N, symmetric.
    pub h: Array2<f64>,
}

impl SplineMatrices {
    /// Build G and H for `montage` with flexibility exponent `m`.
    ///
    /// Every pair (i, j) contributes
    /// `cos_ij = sin φᵢ sin φⱼ + cos φᵢ cos φⱼ cos(θᵢ − θⱼ)`; the self-term
    /// goes through the same series (Pₙ(1) = 1, all values bounded by 1, so
    /// the recursion is stable at the boundary). Only the upper triangle is
    /// computed; cos_ij = cos_ji makes both matrices symmetric by
    /// construction.
    ///
    /// # Errors
    ///
    /// [`CsdError::InsufficientElectrodes`] when the montage has fewer than
    /// four electrodes.
    pub fn build(montage: &Montage, m: u32) -> Result<SplineMatrices> {
        let n = montage.len();
        if n < 4 {
            return Err(CsdError::InsufficientElectrodes(n));
        }

        // (sin φ, cos φ, θ) per electrode, radians.
        let ang: Vec<(f64, f64, f64)> = montage
            .entries()
            .iter()
            .map(|e| {
                let phi = e.phi_deg.to_radians();
                (phi.sin(), phi.cos(), e.theta_deg.to_radians())
            })
            .collect();

        let mut g = Array2::<f64>::zeros((n, n));
        let mut h = Array2::<f64>::zeros((n, n));
        for i in 0..n {
            let (sin_i, cos_i, theta_i) = ang[i];
            for j in i..n {
                let (sin_j, cos_j, theta_j) = ang[j];
                let cos_ij = sin_i * sin_j + cos_i * cos_j * (theta_i - theta_j).cos();
                // Rounding can push the self-term a hair past ±1.
                let (gij, hij) = kernel(cos_ij.clamp(-1.0, 1.0), m);
                g[[i, j]] = gij;
                g[[j, i]] = gij;
                h[[i, j]] = hij;
                h[[j, i]] = hij;
            }
        }

        log::debug!("built {n}×{n} spline matrices, m = {m}");
        Ok(SplineMatrices { g, h })
    }
}

/// One (G, H) kernel entry at `x = cos` of the angular separation.
fn kernel(x: f64, m: u32) -> (f64, f64) {
    let p = legendre(x);
    let mut g = 0.0;
    let mut h = 0.0;
    for n in 1..=LEGENDRE_TERMS {
        let nf = n as f64;
        let w = (2.0 * nf + 1.0) / (nf.powi(m as i32) * (nf + 1.0).powi(m as i32));
        g += w * p[n];
        h += w * nf * (nf + 1.0) * p[n];
    }
    (g / FOUR_PI, -h / FOUR_PI)
}

/// Legendre polynomials P₀(x)..P₇(x) via the stable three-term recurrence
/// `n Pₙ = (2n−1) x Pₙ₋₁ − (n−1) Pₙ₋₂`.
fn legendre(x: f64) -> [f64; LEGENDRE_TERMS + 1] {
    let mut p = [0.0; LEGENDRE_TERMS + 1];
    p[0] = 1.0;
    p[1] = x;
    for n in 2..=LEGENDRE_TERMS {
        let nf = n as f64;
        p[n] = ((2.0 * nf - 1.0) * x * p[n - 1] - (nf - 1.0) * p[n - 2]) / nf;
    }
    p
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::ElectrodeAngle;

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

    fn quad() -> Montage {
        montage_of(&[
            ("pole", 0.0, 90.0),
            ("e1", 90.0, 0.0),
            ("e2", 180.0, 0.0),
            ("e3", 270.0, 0.0),
        ])
    }

    #[test]
    fn legendre_low_orders() {
        let x = 0.6;
        let p = legendre(x);
        approx::assert_abs_diff_eq!(p[0], 1.0, epsilon = 1e-14);
        approx::assert_abs_diff_eq!(p[1], x, epsilon = 1e-14);
        approx::assert_abs_diff_eq!(p[2], (3.0 * x * x - 1.0) / 2.0, epsilon = 1e-14);
        approx::assert_abs_diff_eq!(
            p[3],
            (5.0 * x * x * x - 3.0 * x) / 2.0,
            epsilon = 1e-14
        );
    }

    #[test]
    fn legendre_endpoints() {
        // Pₙ(1) = 1, Pₙ(−1) = (−1)ⁿ.
        let p1 = legendre(1.0);
        let pm1 = legendre(-1.0);
        for n in 0..=LEGENDRE_TERMS {
            approx::assert_abs_diff_eq!(p1[n], 1.0, epsilon = 1e-12);
            let expected = if n % 2 == 0 { 1.0 } else { -1.0 };
            approx::assert_abs_diff_eq!(pm1[n], expected, epsilon = 1e-12);
        }
    }

    #[test]
    fn kernel_reference_values_m4() {
        // Hand-summed series values for the default m = 4.
        let (g1, h1) = kernel(1.0, 4);
        approx::assert_abs_diff_eq!(g1, 0.0152607, epsilon = 1e-6);
        approx::assert_abs_diff_eq!(h1, -0.0321487, epsilon = 1e-6);
        let (g0, _) = kernel(0.0, 4);
        approx::assert_abs_diff_eq!(g0, -0.00015193, epsilon = 1e-7);
    }

    #[test]
    fn matrices_are_symmetric() {
        let m = montage_of(&[
            ("a", 10.0, 70.0),
            ("b", -50.0, 20.0),
            ("c", 120.0, -10.0),
            ("d", 170.0, 40.0),
            ("e", -130.0, 5.0),
        ]);
        let s = SplineMatrices::build(&m, 4).unwrap();
        for i in 0..m.len() {
            for j in 0..m.len() {
                approx::assert_abs_diff_eq!(s.g[[i, j]], s.g[[j, i]], epsilon = 1e-14);
                approx::assert_abs_diff_eq!(s.h[[i, j]], s.h[[j, i]], epsilon = 1e-14);
            }
        }
    }

    #[test]
    fn self_term_uses_the_same_series() {
        // The diagonal is the kernel at cos = 1, no special casing.
        let s = SplineMatrices::build(&quad(), 4).unwrap();
        let (g1, h1) = kernel(1.0, 4);
        for i in 0..4 {
            approx::assert_abs_diff_eq!(s.g[[i, i]], g1, epsilon = 1e-14);
            approx::assert_abs_diff_eq!(s.h[[i, i]], h1, epsilon = 1e-14);
        }
    }

    #[test]
    fn pole_to_equator_is_orthogonal() {
        // 90° separation → cos 0 → the kernel at 0.
        let s = SplineMatrices::build(&quad(), 4).unwrap();
        let (g0, h0) = kernel(0.0, 4);
        approx::assert_abs_diff_eq!(s.g[[0, 1]], g0, epsilon = 1e-14);
        approx::assert_abs_diff_eq!(s.h[[0, 1]], h0, epsilon = 1e-14);
    }

    #[test]
    fn rigidity_grows_with_m() {
        // Clustered montage: every pairwise cosine stays above the largest
        // zero of P₇ (≈ 0.9491), so each Legendre term is positive and the
        // off-diagonal entries shrink strictly as m rises.
        let m = montage_of(&[
            ("a", 0.0, 90.0),
            ("b", 0.0, 84.0),
            ("c", 90.0, 84.0),
            ("d", 180.0, 84.0),
        ]);
        let mut prev = f64::INFINITY;
        for flex in 2..=10 {
            let s = SplineMatrices::build(&m, flex).unwrap();
            let mut max_off = 0.0_f64;
            for i in 0..4 {
                for j in 0..4 {
                    if i != j {
                        max_off = max_off.max(s.g[[i, j]].abs());
                    }
                }
            }
            assert!(
                max_off < prev,
                "off-diagonal |G| did not shrink at m = {flex}: {max_off} >= {prev}"
            );
            prev = max_off;
        }
    }

    #[test]
    fn too_few_electrodes() {
        let three = montage_of(&[("a", 0.0, 90.0), ("b", 90.0, 0.0), ("c", 180.0, 0.0)]);
        let err = SplineMatrices::build(&three, 4).unwrap_err();
        assert!(matches!(err, CsdError::InsufficientElectrodes(3)));
        // Four is enough.
        assert!(SplineMatrices::build(&quad(), 4).is_ok());
    }
}
