//! The recording container handed to the transform.
//!
//! A minimal owned stand-in for the host application's recording object:
//! channel labels, the signal matrix (continuous or epoched), and the
//! mutable reference-state tag the transform stamps on success.
use ndarray::{Array2, Array3};

/// Sentinel written to [`Recording::reference`] by a successful transform.
pub const CSD_REFERENCE: &str = "csd-transform";

/// Signal data, either continuous `[C, T]` or epoched `[E, C, T]`.
///
/// The transform operates identically on each `[C, T]` slice.
#[derive(Debug, Clone)]
pub enum Signal {
    Continuous(Array2<f64>),
    Epoched(Array3<f64>),
}

impl Signal {
    pub fn n_chan(&self) -> usize {
        match self {
            Signal::Continuous(d) => d.nrows(),
            Signal::Epoched(d) => d.dim().1,
        }
    }

    pub fn n_samples(&self) -> usize {
        match self {
            Signal::Continuous(d) => d.ncols(),
            Signal::Epoched(d) => d.dim().2,
        }
    }
}

/// A multichannel recording: ordered channel labels, signal data, and the
/// reference-state tag.
#[derive(Debug, Clone)]
pub struct Recording {
    /// Channel labels; their order is authoritative for everything
    /// downstream (montage, matrices, signal rows).
    pub ch_names: Vec<String>,
    pub data: Signal,
    /// Reference state, e.g. `Some("average")`, or
    /// [`CSD_REFERENCE`] after the transform.
    pub reference: Option<String>,
}

impl Recording {
    /// Continuous recording from a `[C, T]` matrix.
    pub fn continuous(ch_names: Vec<String>, data: Array2<f64>) -> Self {
        assert_eq!(
            ch_names.len(),
            data.nrows(),
            "{} labels for {} data rows",
            ch_names.len(),
            data.nrows()
        );
        Recording {
            ch_names,
            data: Signal::Continuous(data),
            reference: None,
        }
    }

    /// Epoched recording from an `[E, C, T]` array.
    pub fn epoched(ch_names: Vec<String>, data: Array3<f64>) -> Self {
        assert_eq!(
            ch_names.len(),
            data.dim().1,
            "{} labels for {} data channels",
            ch_names.len(),
            data.dim().1
        );
        Recording {
            ch_names,
            data: Signal::Epoched(data),
            reference: None,
        }
    }

    pub fn n_chan(&self) -> usize {
        self.ch_names.len()
    }

    /// Whether the reference tag already carries the CSD sentinel.
    pub fn is_csd(&self) -> bool {
        self.reference.as_deref() == Some(CSD_REFERENCE)
    }
}
