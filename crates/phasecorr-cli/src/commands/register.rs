use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use phasecorr_core::batch::register_frames_with_progress;
use phasecorr_core::io::image_io::{load_image, load_mask};
use phasecorr_core::{
    phase_cross_correlation_with_masks, Normalization, Registration, RegistrationConfig,
    ReturnError, Space,
};

use crate::summary::{print_config_summary, print_results};

#[derive(Clone, ValueEnum)]
pub enum NormalizationArg {
    Phase,
    None,
}

#[derive(Args)]
pub struct RegisterArgs {
    /// Reference image
    pub reference: PathBuf,

    /// One or more images to register against the reference
    #[arg(required = true)]
    pub moving: Vec<PathBuf>,

    /// Registration config file (TOML); overrides the flags below
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Subpixel precision: shifts are resolved to 1/upsample of a pixel
    #[arg(long, default_value = "1")]
    pub upsample: usize,

    /// Cross-power spectrum normalization
    #[arg(long, value_enum, default_value = "phase")]
    pub normalization: NormalizationArg,

    /// Resolve the wrap-around ambiguity of large shifts
    #[arg(long)]
    pub disambiguate: bool,

    /// Report only the shift, without error and phase difference
    #[arg(long)]
    pub shift_only: bool,

    /// Mask of valid reference pixels (non-zero = valid)
    #[arg(long)]
    pub reference_mask: Option<PathBuf>,

    /// Mask of valid moving pixels (non-zero = valid)
    #[arg(long)]
    pub moving_mask: Option<PathBuf>,

    /// Minimum overlap fraction for masked registration
    #[arg(long, default_value = "0.3")]
    pub overlap_ratio: f64,
}

pub fn run(args: &RegisterArgs) -> Result<()> {
    let config = if let Some(ref config_path) = args.config {
        let contents = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config {}", config_path.display()))?;
        toml::from_str(&contents).context("Invalid registration config")?
    } else {
        build_config_from_args(args)
    };
    if config.space == Space::Fourier {
        bail!("Image files are always registered in real space");
    }

    let masked = args.reference_mask.is_some() || args.moving_mask.is_some();
    print_config_summary(&args.reference, args.moving.len(), &config, masked);

    let reference = load_image(&args.reference)
        .with_context(|| format!("Failed to load {}", args.reference.display()))?;
    let frames = args
        .moving
        .iter()
        .map(|path| {
            load_image(path).with_context(|| format!("Failed to load {}", path.display()))
        })
        .collect::<Result<Vec<_>>>()?;

    let pb = ProgressBar::new(frames.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg} [{bar:40}] {pos}/{len}")?
            .progress_chars("=> "),
    );
    pb.set_message("Registering");

    let results: Vec<Registration> = if masked {
        let reference_mask = args.reference_mask.as_deref().map(load_mask).transpose()?;
        let moving_mask = args.moving_mask.as_deref().map(load_mask).transpose()?;
        frames
            .iter()
            .map(|frame| {
                let result = phase_cross_correlation_with_masks(
                    &reference,
                    frame,
                    reference_mask.as_ref(),
                    moving_mask.as_ref(),
                    &config,
                );
                pb.inc(1);
                result
            })
            .collect::<std::result::Result<_, _>>()?
    } else {
        register_frames_with_progress(&reference, &frames, &config, |done| {
            pb.set_position(done as u64);
        })?
    };

    pb.finish_with_message("Done");
    print_results(&args.moving, &results);

    Ok(())
}

fn build_config_from_args(args: &RegisterArgs) -> RegistrationConfig {
    RegistrationConfig {
        upsample_factor: args.upsample,
        space: Space::Real,
        disambiguate: args.disambiguate,
        return_error: if args.shift_only {
            ReturnError::Disabled
        } else {
            ReturnError::Enabled
        },
        overlap_ratio: args.overlap_ratio,
        normalization: match args.normalization {
            NormalizationArg::Phase => Normalization::Phase,
            NormalizationArg::None => Normalization::None,
        },
    }
}
