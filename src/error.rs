//! Error taxonomy for the CSD transform.
//!
//! Every failure is deterministic and input-derived: the same inputs always
//! produce the same error, so nothing here is retryable. Callers get the
//! specific kind plus the offending identifier (suffix, channel label,
//! pivot row) and never a partial or best-effort result.
use thiserror::Error;

/// Unified error type for the CSD transform pipeline.
#[derive(Error, Debug)]
pub enum CsdError {
    /// The location file suffix is not one of `xyz`, `ced`, `locs`, `csd`.
    #[error(
        "unsupported electrode location format {0:?}: re-export the montage \
         as .xyz, .ced, .locs or .csd"
    )]
    UnsupportedFormat(String),

    /// A recording channel has no entry in the location table.
    #[error("channel {0:?} has no matching entry in the location table")]
    UnmatchedChannel(String),

    /// The matched montage does not cover the recording's channels
    /// one-to-one (e.g. duplicate channel labels).
    #[error("montage matched {got} distinct locations for {expected} channels")]
    MontageLengthMismatch { got: usize, expected: usize },

    /// Fewer than four electrodes: the spherical spline is not stable.
    #[error("{0} electrodes is too few for a spherical spline (need at least 4)")]
    InsufficientElectrodes(usize),

    /// The regularized spline system could not be factorized.
    #[error("spline system is singular: pivot {pivot:.3e} at row {row} below tolerance")]
    SingularSystem { row: usize, pivot: f64 },

    /// The recording's reference tag already carries the CSD sentinel.
    #[error("recording is already CSD-transformed; refusing to transform twice")]
    AlreadyTransformed,

    /// Malformed row in a location file.
    #[error("location file line {line}: {msg}")]
    Parse { line: usize, msg: String },

    /// I/O failure reading the location source, surfaced unchanged.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CsdError>;
