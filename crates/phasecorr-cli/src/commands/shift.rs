use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};
use phasecorr_core::io::image_io::{load_image, save_image};
use phasecorr_core::resample::{shift_wrapped, InterpolationOrder};

#[derive(Clone, ValueEnum)]
pub enum OrderArg {
    Nearest,
    Cubic,
}

#[derive(Args)]
pub struct ShiftArgs {
    /// Input image
    pub input: PathBuf,

    /// Output image (.png or .tiff)
    pub output: PathBuf,

    /// Comma-separated shift per axis, rows first (e.g. "2.5,-1")
    #[arg(long, allow_hyphen_values = true)]
    pub by: String,

    /// Interpolation used for fractional shifts
    #[arg(long, value_enum, default_value = "cubic")]
    pub order: OrderArg,
}

pub fn run(args: &ShiftArgs) -> Result<()> {
    let shift: Vec<f64> = args
        .by
        .split(',')
        .map(|s| s.trim().parse::<f64>())
        .collect::<std::result::Result<_, _>>()
        .with_context(|| format!("Invalid shift \"{}\"", args.by))?;
    if shift.len() != 2 {
        bail!("Expected 2 shift components, got {}", shift.len());
    }

    let order = match args.order {
        OrderArg::Nearest => InterpolationOrder::Nearest,
        OrderArg::Cubic => InterpolationOrder::Cubic,
    };

    let image = load_image(&args.input)
        .with_context(|| format!("Failed to load {}", args.input.display()))?;
    let dim = image.dim();
    let shifted = shift_wrapped(&image.into_dyn(), &shift, order)?.into_shape_with_order(dim)?;

    save_image(&shifted, &args.output)?;
    println!(
        "Shifted {} by {:?} -> {}",
        args.input.display(),
        shift,
        args.output.display()
    );

    Ok(())
}
