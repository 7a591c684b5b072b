use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use csd::io::{load_recording, save_recording};
use csd::{transform, CsdConfig};

#[derive(Parser)]
#[command(name = "csd_transform", about = "Spherical-spline CSD (surface Laplacian) transform")]
struct Args {
    /// recording.safetensors input (data + ch_names [+ reference])
    #[arg(long)]
    input: PathBuf,

    /// transformed recording output path
    #[arg(long)]
    output: PathBuf,

    /// electrode location file (.xyz/.ced/.locs/.csd);
    /// bundled 10-05 standard table when omitted
    #[arg(long)]
    locations: Option<PathBuf>,

    /// spline flexibility exponent (default: 4)
    #[arg(long, default_value_t = 4)]
    m: u32,

    /// Tikhonov smoothing constant (default: 1e-5)
    #[arg(long, default_value_t = 1e-5)]
    lambda: f64,

    /// head radius in centimetres (default: 10)
    #[arg(long, default_value_t = 10.0)]
    head_radius: f64,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut rec = load_recording(&args.input)?;
    println!(
        "Loaded {} ch × {} samples (reference: {})",
        rec.n_chan(),
        rec.data.n_samples(),
        rec.reference.as_deref().unwrap_or("none"),
    );

    let cfg = CsdConfig {
        m: args.m,
        lambda: args.lambda,
        head_radius_cm: args.head_radius,
    };
    transform(&mut rec, args.locations.as_deref(), &cfg)?;
    println!("Transformed to CSD (m = {}, λ = {:.1e}, r = {} cm)", cfg.m, cfg.lambda, cfg.head_radius_cm);

    save_recording(&rec, &args.output)?;
    println!("Written → {}", args.output.display());

    Ok(())
}
