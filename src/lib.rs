//! # csd — spherical-spline current source density for EEG in pure Rust
//!
//! `csd` converts multichannel scalp potential recordings into a
//! reference-free current source density (CSD, also called the surface
//! Laplacian) estimate, using the spherical-spline method of Perrin et al.
//! (1989) with the G/H-matrix formulation and defaults of Kayser & Tenke
//! (2006). Pure Rust — no Python, no BLAS, no C libraries.
//!
//! ## Pipeline overview
//!
//! ```text
//! electrode locations (.xyz / .ced / .locs / .csd, or bundled 10-05 table)
//!   │
//!   ├─ coords::read_locations()    canonical (label, theta, phi) angles
//!   ├─ Montage::build()            matched to the recording's channel order
//!   ├─ SplineMatrices::build()     G + H kernels, 7-term Legendre series
//!   └─ apply_csd()                 regularize → bordered solve → H · c / r²
//!        │
//!        └─→ recording with CSD-valued data, reference = "csd-transform"
//! ```
//!
//! ## Quick start
//!
//! ```no_run
//! use csd::{transform, CsdConfig, Recording};
//! use ndarray::Array2;
//!
//! // A recording: channel labels + [C, T] potentials in µV.
//! let data: Array2<f64> = Array2::zeros((4, 1024));
//! let names = vec!["Cz".into(), "Fz".into(), "Pz".into(), "Oz".into()];
//! let mut rec = Recording::continuous(names, data);
//!
//! // No location file given: the bundled 10-05 table is used.
//! transform(&mut rec, None, &CsdConfig::default()).unwrap();
//! assert!(rec.is_csd());   // data is now in µV/cm²
//! ```
//!
//! ## Running individual steps
//!
//! Each stage is also exposed on its own:
//!
//! ```no_run
//! use csd::{apply_csd, CsdConfig, Montage, SplineMatrices};
//! use csd::coords::{parse_locations, LocFormat};
//! use ndarray::Array2;
//!
//! let locs = parse_locations(LocFormat::Csd, "Cz 90 90\nFz 90 45\nPz -90 45\nOz -90 0\n").unwrap();
//! let names: Vec<String> = ["Cz", "Fz", "Pz", "Oz"].iter().map(|s| s.to_string()).collect();
//! let montage = Montage::build(&locs, &names).unwrap();
//! let matrices = SplineMatrices::build(&montage, 4).unwrap();
//!
//! let potentials: Array2<f64> = Array2::zeros((4, 256));
//! let csd = apply_csd(potentials.view(), &matrices, &CsdConfig::default()).unwrap();
//! ```
//!
//! The transform is not invertible and is refused on already-transformed
//! recordings; montages and spline matrices are built fresh per invocation
//! and never reused across electrode configurations.

pub mod apply;
pub mod config;
pub mod coords;
pub mod error;
pub mod io;
pub mod montage;
pub mod recording;
pub mod solve;
pub mod spline;

use std::path::Path;

// ── Crate-root re-exports ─────────────────────────────────────────────────
//
// Everything a downstream user is likely to need is available directly as
// `csd::Foo` without having to know the internal module layout.

pub use apply::apply_csd;
pub use config::CsdConfig;
pub use coords::{builtin_1005, read_locations, ElectrodeAngle, LocFormat};
pub use error::{CsdError, Result};
pub use montage::Montage;
pub use recording::{Recording, Signal, CSD_REFERENCE};
pub use spline::SplineMatrices;

/// Run the **full CSD transform** on a recording.
///
/// This is the main entry point for the `csd` library. It chains all
/// pipeline stages: location parsing, montage matching, spline-matrix
/// construction, and the per-sample CSD solve, then replaces the
/// recording's data and stamps its reference tag.
///
/// # Arguments
///
/// * `rec` – The recording to transform. Potentials of shape `[C, T]`
///   (continuous) or `[E, C, T]` (epoched; each epoch slice is transformed
///   identically).
/// * `location_source` – Electrode location file (`.xyz`, `.ced`, `.locs`
///   or `.csd`). `None` falls back to the bundled idealized 10-05 standard
///   table.
/// * `cfg` – Transform configuration (see [`CsdConfig`]).
///
/// # Errors
///
/// * [`CsdError::AlreadyTransformed`] — the reference tag already carries
///   [`CSD_REFERENCE`]; checked before any work, never a silent no-op.
/// * [`CsdError::UnsupportedFormat`] — unrecognized location-file suffix.
/// * [`CsdError::UnmatchedChannel`] / [`CsdError::MontageLengthMismatch`] —
///   the location table does not cover the recording's channels one-to-one.
/// * [`CsdError::InsufficientElectrodes`] — fewer than 4 channels.
/// * [`CsdError::SingularSystem`] — the regularized spline system could
///   not be solved to tolerance.
/// * [`CsdError::Io`] / [`CsdError::Parse`] — the location source could not
///   be read or parsed.
///
/// # Examples
///
/// ```no_run
/// use csd::{transform, CsdConfig, Recording, CSD_REFERENCE};
/// use ndarray::Array2;
///
/// let mut rec = Recording::continuous(
///     vec!["Cz".into(), "C3".into(), "C4".into(), "Pz".into()],
///     Array2::zeros((4, 512)),
/// );
/// let cfg = CsdConfig { m: 4, lambda: 1e-5, head_radius_cm: 10.0 };
/// transform(&mut rec, None, &cfg).unwrap();
/// assert_eq!(rec.reference.as_deref(), Some(CSD_REFERENCE));
/// ```
pub fn transform(
    rec: &mut Recording,
    location_source: Option<&Path>,
    cfg: &CsdConfig,
) -> Result<()> {
    if rec.is_csd() {
        return Err(CsdError::AlreadyTransformed);
    }

    let locations = match location_source {
        Some(path) => coords::read_locations(path)?,
        None => coords::builtin_1005()?,
    };
    let montage = Montage::build(&locations, &rec.ch_names)?;
    let matrices = SplineMatrices::build(&montage, cfg.m)?;

    match &mut rec.data {
        Signal::Continuous(d) => {
            let csd = apply_csd(d.view(), &matrices, cfg)?;
            *d = csd;
        }
        Signal::Epoched(e) => {
            for mut epoch in e.outer_iter_mut() {
                let csd = apply_csd(epoch.view(), &matrices, cfg)?;
                epoch.assign(&csd);
            }
        }
    }

    rec.reference = Some(CSD_REFERENCE.to_string());
    Ok(())
}
