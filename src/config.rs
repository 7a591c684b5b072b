//! Transform configuration.
//!
//! [`CsdConfig`] holds every tunable parameter of the CSD transform. The
//! defaults are the values recommended by Kayser & Tenke (2006) and shared
//! by the common MATLAB implementations.

/// Configuration for the spherical-spline CSD transform.
///
/// All fields are `pub` so you can construct one with struct-update syntax:
///
/// ```
/// use csd::CsdConfig;
///
/// let cfg = CsdConfig {
///     m: 3,              // more flexible spline
///     ..CsdConfig::default()
/// };
/// ```
///
/// Or just call [`CsdConfig::default()`] for the standard settings.
#[derive(Debug, Clone)]
pub struct CsdConfig {
    /// Flexibility exponent of the spline (the literature's *m*).
    ///
    /// Controls how fast higher-order Legendre terms are damped: higher `m`
    /// gives a smoother, more rigid spline. Practical range 2..=10.
    ///
    /// Default: `4`.
    pub m: u32,

    /// Tikhonov smoothing constant added to the diagonal of G.
    ///
    /// Stabilizes the spline-fit system against near-duplicate electrode
    /// geometry. Larger values trade interpolation fidelity for
    /// conditioning.
    ///
    /// Default: `1e-5`.
    pub lambda: f64,

    /// Head radius in centimetres used to rescale the unit-sphere result.
    ///
    /// CSD values are divided by `head_radius_cm²`, mapping the
    /// dimensionless unit-sphere Laplacian to physical units (µV/cm² for
    /// µV inputs).
    ///
    /// Default: `10.0`.
    pub head_radius_cm: f64,
}

impl Default for CsdConfig {
    /// Returns the standard settings: `m = 4`, `lambda = 1e-5`,
    /// `head_radius_cm = 10.0`.
    fn default() -> Self {
        Self {
            m: 4,
            lambda: 1e-5,
            head_radius_cm: 10.0,
        }
    }
}
