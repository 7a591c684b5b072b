//! Montage: the recording's channels mapped to their scalp angles.
//!
//! Built once by matching normalized location entries against the
//! recording's channel labels, reordered to the recording's channel order.
//! The ordering is load-bearing: the spline matrices and the signal matrix
//! are all indexed by recording-channel position.
use crate::coords::ElectrodeAngle;
use crate::error::{CsdError, Result};

/// Ordered, immutable sequence of electrode angles, index-aligned with the
/// recording's channels.
#[derive(Debug, Clone)]
pub struct Montage {
    entries: Vec<ElectrodeAngle>,
}

impl Montage {
    /// Match `locations` against `ch_names` (case-insensitive) and order
    /// the result by the recording's channel order.
    ///
    /// # Errors
    ///
    /// * [`CsdError::UnmatchedChannel`] — a recording channel has no
    ///   location entry; the channel is named, never silently dropped.
    /// * [`CsdError::MontageLengthMismatch`] — the matched entries do not
    ///   cover the channels one-to-one (duplicate recording labels collapse
    ///   onto the same location entry).
    pub fn build(locations: &[ElectrodeAngle], ch_names: &[String]) -> Result<Montage> {
        let mut entries = Vec::with_capacity(ch_names.len());
        let mut matched = vec![false; locations.len()];

        for name in ch_names {
            let idx = locations
                .iter()
                .position(|e| e.label.eq_ignore_ascii_case(name))
                .ok_or_else(|| CsdError::UnmatchedChannel(name.clone()))?;
            matched[idx] = true;
            entries.push(locations[idx].clone());
        }

        let distinct = matched.iter().filter(|&&m| m).count();
        if distinct != ch_names.len() {
            return Err(CsdError::MontageLengthMismatch {
                got: distinct,
                expected: ch_names.len(),
            });
        }

        Ok(Montage { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Electrode angles in recording-channel order.
    pub fn entries(&self) -> &[ElectrodeAngle] {
        &self.entries
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.label.as_str())
    }
}
