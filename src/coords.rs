//! Electrode location files and the canonical angle convention.
//!
//! Four location-description kinds are recognized, dispatched from the file
//! suffix. Whatever the source convention, every electrode comes out as a
//! `(label, theta, phi)` triple in degrees following the Kayser & Tenke
//! (2006) appendix convention: `theta` is the azimuth in the horizontal
//! plane, `phi` the elevation above it.
//!
//! | suffix | row fields                              | source convention |
//! |--------|-----------------------------------------|-------------------|
//! | `xyz`  | label X Y Z                             | Cartesian         |
//! | `ced`  | idx label θ r X Y Z sph_θ sph_φ sph_r   | header row, sph_θ off by −90° |
//! | `locs` | idx θ r label                           | polar angle + fractional radius |
//! | `csd`  | label theta phi [r X Y Z …]             | already canonical; `//` comments |
use std::path::Path;

use crate::error::{CsdError, Result};

/// One electrode position in the canonical angular convention.
///
/// Invariant after parsing: `theta_deg ∈ (-180, 180]`, `phi_deg ∈ [-90, 90]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ElectrodeAngle {
    pub label: String,
    /// Azimuth in the horizontal plane, degrees.
    pub theta_deg: f64,
    /// Elevation above the horizontal plane, degrees.
    pub phi_deg: f64,
}

/// The closed set of recognized location-file kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocFormat {
    Xyz,
    Ced,
    Locs,
    Csd,
}

impl LocFormat {
    /// Dispatch from the file suffix (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        match ext.as_str() {
            "xyz" => Ok(LocFormat::Xyz),
            "ced" => Ok(LocFormat::Ced),
            "locs" => Ok(LocFormat::Locs),
            "csd" => Ok(LocFormat::Csd),
            _ => Err(CsdError::UnsupportedFormat(ext)),
        }
    }
}

/// Read and normalize a location file, dispatching on its suffix.
pub fn read_locations(path: &Path) -> Result<Vec<ElectrodeAngle>> {
    let format = LocFormat::from_path(path)?;
    let text = std::fs::read_to_string(path)?;
    parse_locations(format, &text)
}

/// The bundled 10-05 standard coordinate table, used when the caller
/// supplies no location file. Idealized spherical positions, stored in the
/// crate's own `csd` text format and parsed through the ordinary parser.
pub fn builtin_1005() -> Result<Vec<ElectrodeAngle>> {
    parse_locations(LocFormat::Csd, include_str!("../assets/standard_1005.csd"))
}

/// Parse location text of a known kind into canonical angles.
pub fn parse_locations(format: LocFormat, text: &str) -> Result<Vec<ElectrodeAngle>> {
    match format {
        LocFormat::Xyz => parse_xyz(text),
        LocFormat::Ced => parse_ced(text),
        LocFormat::Locs => parse_locs(text),
        LocFormat::Csd => parse_csd(text),
    }
}

/// Wrap an azimuth into (-180, 180].
fn wrap_theta(theta: f64) -> f64 {
    if theta > 180.0 {
        theta - 360.0
    } else if theta <= -180.0 {
        theta + 360.0
    } else {
        theta
    }
}

fn parse_num(s: &str, line: usize) -> Result<f64> {
    s.parse::<f64>().map_err(|_| CsdError::Parse {
        line,
        msg: format!("expected a number, got {s:?}"),
    })
}

/// Informational only: report how far a Cartesian position sits off the
/// unit sphere. Never alters the parsed output.
fn check_on_sphere(label: &str, x: f64, y: f64, z: f64) {
    let off = x * x + y * y + z * z - 1.0;
    if off.abs() > 1e-6 {
        log::debug!("electrode {label}: position off the unit sphere by {off:.2e}");
    }
}

/// `xyz`: `label X Y Z` per row, Cartesian on the unit sphere.
fn parse_xyz(text: &str) -> Result<Vec<ElectrodeAngle>> {
    let mut out = Vec::new();
    for (idx, row) in text.lines().enumerate() {
        let line = idx + 1;
        let f: Vec<&str> = row.split_whitespace().collect();
        if f.is_empty() {
            continue;
        }
        if f.len() < 4 {
            return Err(CsdError::Parse {
                line,
                msg: format!("xyz row needs label X Y Z, got {} fields", f.len()),
            });
        }
        let (x, y, z) = (
            parse_num(f[1], line)?,
            parse_num(f[2], line)?,
            parse_num(f[3], line)?,
        );
        check_on_sphere(f[0], x, y, z);
        out.push(ElectrodeAngle {
            label: f[0].to_string(),
            // atan2 can return exactly -180 for y = -0; keep (-180, 180].
            theta_deg: wrap_theta(y.atan2(x).to_degrees()),
            phi_deg: z.atan2((x * x + y * y).sqrt()).to_degrees(),
        });
    }
    Ok(out)
}

/// `ced`: header row, then
/// `index label theta radius X Y Z sph_theta sph_phi sph_radius`.
/// The spherical azimuth is stored 90° off the canonical convention.
fn parse_ced(text: &str) -> Result<Vec<ElectrodeAngle>> {
    let mut out = Vec::new();
    for (idx, row) in text.lines().enumerate().skip(1) {
        let line = idx + 1;
        let f: Vec<&str> = row.split_whitespace().collect();
        if f.is_empty() {
            continue;
        }
        if f.len() < 9 {
            return Err(CsdError::Parse {
                line,
                msg: format!("ced row needs at least 9 fields, got {}", f.len()),
            });
        }
        let sph_theta = parse_num(f[7], line)?;
        let sph_phi = parse_num(f[8], line)?;
        out.push(ElectrodeAngle {
            label: f[1].to_string(),
            theta_deg: wrap_theta(sph_theta + 90.0),
            phi_deg: sph_phi,
        });
    }
    Ok(out)
}

/// `locs`: `index theta radius label`, no header. The polar angle runs
/// clockwise from the nose and the fractional radius runs from the vertex
/// (0.0) to the horizontal plane (0.5).
fn parse_locs(text: &str) -> Result<Vec<ElectrodeAngle>> {
    let mut out = Vec::new();
    for (idx, row) in text.lines().enumerate() {
        let line = idx + 1;
        let f: Vec<&str> = row.split_whitespace().collect();
        if f.is_empty() {
            continue;
        }
        if f.len() < 4 {
            return Err(CsdError::Parse {
                line,
                msg: format!("locs row needs index theta radius label, got {} fields", f.len()),
            });
        }
        let th = parse_num(f[1], line)?;
        let radius = parse_num(f[2], line)?;
        out.push(ElectrodeAngle {
            label: f[3].to_string(),
            theta_deg: wrap_theta(-th + 90.0),
            phi_deg: 90.0 - radius * 180.0,
        });
    }
    Ok(out)
}

/// `csd`: `label theta phi` already in the canonical convention; `//`
/// comment rows skipped; optional trailing `radius X Y Z` columns are used
/// only for the informational off-sphere check.
fn parse_csd(text: &str) -> Result<Vec<ElectrodeAngle>> {
    let mut out = Vec::new();
    for (idx, row) in text.lines().enumerate() {
        let line = idx + 1;
        let trimmed = row.trim_start();
        if trimmed.starts_with("//") {
            continue;
        }
        let f: Vec<&str> = trimmed.split_whitespace().collect();
        if f.is_empty() {
            continue;
        }
        if f.len() < 3 {
            return Err(CsdError::Parse {
                line,
                msg: format!("csd row needs label theta phi, got {} fields", f.len()),
            });
        }
        if f.len() >= 7 {
            if let (Ok(x), Ok(y), Ok(z)) =
                (f[4].parse::<f64>(), f[5].parse::<f64>(), f[6].parse::<f64>())
            {
                check_on_sphere(f[0], x, y, z);
            }
        }
        out.push(ElectrodeAngle {
            label: f[0].to_string(),
            theta_deg: parse_num(f[1], line)?,
            phi_deg: parse_num(f[2], line)?,
        });
    }
    Ok(out)
}
