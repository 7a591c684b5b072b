//! Safetensors exchange for recordings.
//!
//! The host-side container format: a `data` tensor (`[C, T]` continuous or
//! `[E, C, T]` epoched, F64; F32 inputs are promoted), the newline-joined
//! `ch_names` string, and the optional `reference` tag string.
use anyhow::{bail, Context, Result};
use ndarray::{Array2, Array3};
use std::collections::HashMap;
use std::path::Path;

use crate::recording::{Recording, Signal};

// ── Low-level safetensors helpers (raw bytes → values; no dependency on
//    the `safetensors` crate's tensor types). ────────────────────────────

fn parse_header(bytes: &[u8]) -> Result<(HashMap<String, serde_json::Value>, usize)> {
    if bytes.len() < 8 {
        bail!("safetensors file too small");
    }
    let n = u64::from_le_bytes(bytes[..8].try_into().unwrap()) as usize;
    let header: HashMap<String, serde_json::Value> = serde_json::from_slice(&bytes[8..8 + n])
        .context("failed to parse safetensors header")?;
    Ok((header, 8 + n))
}

fn entry_range(entry: &serde_json::Value) -> Result<(usize, usize)> {
    let offsets = entry["data_offsets"]
        .as_array()
        .context("missing data_offsets")?;
    let s = offsets[0].as_u64().context("bad offset")? as usize;
    let e = offsets[1].as_u64().context("bad offset")? as usize;
    Ok((s, e))
}

fn shape_of(entry: &serde_json::Value) -> Vec<usize> {
    entry["shape"]
        .as_array()
        .map(|a| a.iter().filter_map(|v| v.as_u64()).map(|v| v as usize).collect())
        .unwrap_or_default()
}

/// Read a numeric tensor as f64, promoting F32.
fn read_f64_tensor(bytes: &[u8], data_start: usize, entry: &serde_json::Value) -> Result<Vec<f64>> {
    let (s, e) = entry_range(entry)?;
    let raw = &bytes[data_start + s..data_start + e];
    let dtype = entry["dtype"].as_str().unwrap_or("F64");
    match dtype {
        "F64" => Ok(raw
            .chunks_exact(8)
            .map(|b| f64::from_le_bytes(b.try_into().unwrap()))
            .collect()),
        "F32" => Ok(raw
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes(b.try_into().unwrap()) as f64)
            .collect()),
        other => bail!("unsupported data dtype {other:?}"),
    }
}

fn read_string(bytes: &[u8], data_start: usize, entry: &serde_json::Value) -> Result<String> {
    let (s, e) = entry_range(entry)?;
    Ok(std::str::from_utf8(&bytes[data_start + s..data_start + e])?.to_string())
}

// ── Recording reader / writer ────────────────────────────────────────────

/// Load a recording from a safetensors file.
pub fn load_recording(path: &Path) -> Result<Recording> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("reading recording {}", path.display()))?;
    let (header, data_start) = parse_header(&bytes)?;

    let data_entry = header.get("data").context("missing 'data' tensor")?;
    let shape = shape_of(data_entry);
    let values = read_f64_tensor(&bytes, data_start, data_entry)?;
    let data = match shape.len() {
        2 => Signal::Continuous(Array2::from_shape_vec((shape[0], shape[1]), values)?),
        3 => Signal::Epoched(Array3::from_shape_vec((shape[0], shape[1], shape[2]), values)?),
        d => bail!("'data' tensor must be 2-D or 3-D, got {d}-D"),
    };

    let names_entry = header.get("ch_names").context("missing 'ch_names' tensor")?;
    let ch_names: Vec<String> = read_string(&bytes, data_start, names_entry)?
        .split('\n')
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect();
    if ch_names.len() != data.n_chan() {
        bail!(
            "{} channel names for {} data channels",
            ch_names.len(),
            data.n_chan()
        );
    }

    let reference = match header.get("reference") {
        Some(e) => {
            let s = read_string(&bytes, data_start, e)?;
            (!s.is_empty()).then_some(s)
        }
        None => None,
    };

    Ok(Recording { ch_names, data, reference })
}

/// Write a recording to a safetensors file.
pub fn save_recording(rec: &Recording, path: &Path) -> Result<()> {
    use std::io::Write;

    // (name, dtype, shape, payload)
    let mut tensors: Vec<(&str, &str, Vec<usize>, Vec<u8>)> = Vec::new();

    let (shape, values): (Vec<usize>, Vec<u8>) = match &rec.data {
        Signal::Continuous(d) => (
            vec![d.nrows(), d.ncols()],
            d.iter().flat_map(|v| v.to_le_bytes()).collect(),
        ),
        Signal::Epoched(d) => {
            let (e, c, t) = d.dim();
            (vec![e, c, t], d.iter().flat_map(|v| v.to_le_bytes()).collect())
        }
    };
    tensors.push(("data", "F64", shape, values));

    let names = rec.ch_names.join("\n").into_bytes();
    tensors.push(("ch_names", "U8", vec![names.len()], names));

    if let Some(reference) = &rec.reference {
        let bytes = reference.clone().into_bytes();
        tensors.push(("reference", "U8", vec![bytes.len()], bytes));
    }

    let mut header_map = serde_json::Map::new();
    let mut offset = 0usize;
    for (name, dtype, shape, payload) in &tensors {
        header_map.insert(
            name.to_string(),
            serde_json::json!({
                "dtype": dtype,
                "shape": shape,
                "data_offsets": [offset, offset + payload.len()],
            }),
        );
        offset += payload.len();
    }

    let hdr_bytes = serde_json::to_vec(&header_map)?;
    let pad = (8 - hdr_bytes.len() % 8) % 8;
    let padded: Vec<u8> = hdr_bytes
        .into_iter()
        .chain(std::iter::repeat(b' ').take(pad))
        .collect();

    let mut f = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    f.write_all(&(padded.len() as u64).to_le_bytes())?;
    f.write_all(&padded)?;
    for (_, _, _, payload) in &tensors {
        f.write_all(payload)?;
    }
    Ok(())
}
