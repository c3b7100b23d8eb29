//! Subpixel image registration by phase cross-correlation.
//!
//! Two-stage approach (Guizar-Sicairos et al., 2008):
//! 1. **Coarse**: FFT cross-correlation gives the integer-pixel peak.
//! 2. **Fine**: the cross-power spectrum is evaluated on an upsampled grid in
//!    a `1.5` pixel window around that peak with a matrix-multiply DFT,
//!    reaching `1 / upsample_factor` pixel precision.
//!
//! The shift is only known modulo the image shape; `disambiguate` resolves
//! it in real space.

use ndarray::{ArrayBase, ArrayD, Data, Dimension};
use num_complex::Complex;
use tracing::{debug, warn};

use crate::config::{RegistrationConfig, ReturnError, Space};
use crate::consts::UPSAMPLED_REGION_SCALE;
use crate::correlation::{
    correlation_surface, cross_power_spectrum, find_peak, signed_shift, zero_singleton_axes,
};
use crate::disambiguate::disambiguate_shift;
use crate::element::{Element, Real};
use crate::error::{RegistrationError, Result};
use crate::fft::{fftn, ifftn};
use crate::masked::masked_phase_cross_correlation;
use crate::metrics::{
    check_finite, compute_error, compute_phasediff, mean_spectral_energy, spectral_energy,
};
use crate::upsampled_dft::upsampled_dft;

/// Outcome of a registration.
#[derive(Clone, Debug, PartialEq)]
pub struct Registration {
    /// Shift (in pixels) that registers the moving image onto the reference,
    /// in input axis order.
    pub shift: Vec<f64>,
    /// `None` when only the shift was requested.
    pub metrics: Option<RegistrationMetrics>,
}

/// Auxiliary registration outputs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RegistrationMetrics {
    /// Translation-invariant normalized RMS error.
    pub error: f64,
    /// Global phase difference; zero for non-negative images.
    pub phasediff: f64,
}

impl RegistrationMetrics {
    /// Metrics of the masked path, which has neither.
    pub fn unavailable() -> Self {
        Self {
            error: f64::NAN,
            phasediff: f64::NAN,
        }
    }
}

/// Register `moving` onto `reference`.
///
/// ```
/// use ndarray::Array2;
/// use phasecorr_core::{phase_cross_correlation, RegistrationConfig};
///
/// let reference = Array2::from_shape_fn((16, 16), |(r, c)| ((r * 7 + c * 3) % 5) as f64);
/// let result = phase_cross_correlation(&reference, &reference, &RegistrationConfig::default())?;
/// assert_eq!(result.shift, vec![0.0, 0.0]);
/// # Ok::<(), phasecorr_core::RegistrationError>(())
/// ```
pub fn phase_cross_correlation<A, S, S2, D>(
    reference: &ArrayBase<S, D>,
    moving: &ArrayBase<S2, D>,
    config: &RegistrationConfig,
) -> Result<Registration>
where
    A: Element,
    S: Data<Elem = A>,
    S2: Data<Elem = A>,
    D: Dimension,
{
    register(reference, moving, config)
}

/// Register `moving` onto `reference`, delegating to masked normalized
/// cross-correlation when either mask is given.
///
/// A lone moving mask is reused for the reference. The masked path returns
/// only the shift, or NaN metrics with [`ReturnError::Always`].
pub fn phase_cross_correlation_with_masks<A, S, S2, D, M>(
    reference: &ArrayBase<S, D>,
    moving: &ArrayBase<S2, D>,
    reference_mask: Option<&ArrayBase<M, D>>,
    moving_mask: Option<&ArrayBase<M, D>>,
    config: &RegistrationConfig,
) -> Result<Registration>
where
    A: Element,
    S: Data<Elem = A>,
    S2: Data<Elem = A>,
    D: Dimension,
    M: Data<Elem = bool>,
{
    let (reference_mask, moving_mask) = match (reference_mask, moving_mask) {
        (None, None) => return register(reference, moving, config),
        (Some(r), m) => (r, m),
        (None, Some(m)) => (m, None),
    };

    let reference_real = reference.mapv(Element::real_part).into_dyn();
    let moving_real = moving.mapv(Element::real_part).into_dyn();
    let reference_mask = reference_mask.to_owned().into_dyn();
    let moving_mask = moving_mask.map(|m| m.to_owned().into_dyn());

    let shift = masked_phase_cross_correlation(
        &reference_real,
        &moving_real,
        &reference_mask,
        moving_mask.as_ref(),
        config.overlap_ratio,
    )?;
    debug!(?shift, "Masked registration");

    let metrics = match config.return_error {
        ReturnError::Always => Some(RegistrationMetrics::unavailable()),
        mode => {
            warn_shift_only(mode);
            None
        }
    };
    Ok(Registration { shift, metrics })
}

fn register<A, S, S2, D>(
    reference: &ArrayBase<S, D>,
    moving: &ArrayBase<S2, D>,
    config: &RegistrationConfig,
) -> Result<Registration>
where
    A: Element,
    S: Data<Elem = A>,
    S2: Data<Elem = A>,
    D: Dimension,
{
    if reference.shape() != moving.shape() {
        return Err(RegistrationError::ShapeMismatch {
            reference: reference.shape().to_vec(),
            moving: moving.shape().to_vec(),
        });
    }
    if reference.is_empty() {
        return Err(RegistrationError::EmptyImage);
    }
    if config.upsample_factor == 0 {
        return Err(RegistrationError::InvalidUpsampleFactor(0.0));
    }

    let reference = reference.mapv(Element::to_complex).into_dyn();
    let moving = moving.mapv(Element::to_complex).into_dyn();
    let (src_freq, target_freq) = match config.space {
        Space::Real => (fftn(&reference), fftn(&moving)),
        Space::Fourier => (reference.clone(), moving.clone()),
    };

    let estimate = estimate_shift(&src_freq, &target_freq, config)?;
    let mut shift = estimate.shift;

    if config.disambiguate {
        let (reference_real, moving_real) = match config.space {
            Space::Real => (reference.mapv(|v| v.re), moving.mapv(|v| v.re)),
            Space::Fourier => (
                ifftn(&src_freq).mapv(|v| v.re),
                ifftn(&target_freq).mapv(|v| v.re),
            ),
        };
        shift = disambiguate_shift(&reference_real, &moving_real, &shift)?;
    }

    if !config.return_error.wants_metrics() {
        warn_shift_only(config.return_error);
        return Ok(Registration {
            shift,
            metrics: None,
        });
    }

    check_finite(estimate.peak, estimate.src_amp, estimate.target_amp)?;
    let metrics = RegistrationMetrics {
        error: compute_error(estimate.peak, estimate.src_amp, estimate.target_amp),
        phasediff: compute_phasediff(estimate.peak),
    };
    Ok(Registration {
        shift,
        metrics: Some(metrics),
    })
}

/// Periodic shift estimate plus the quantities the error metric needs.
struct ShiftEstimate<T> {
    shift: Vec<f64>,
    peak: Complex<T>,
    src_amp: T,
    target_amp: T,
}

fn estimate_shift<T: Real>(
    src_freq: &ArrayD<Complex<T>>,
    target_freq: &ArrayD<Complex<T>>,
    config: &RegistrationConfig,
) -> Result<ShiftEstimate<T>> {
    let shape = src_freq.shape().to_vec();

    let image_product = cross_power_spectrum(src_freq, target_freq, config.normalization);
    let cross_correlation = correlation_surface(&image_product);
    let coarse = find_peak(&cross_correlation);
    let mut shift = signed_shift(&coarse.index, &shape);
    debug!(peak = ?coarse.index, ?shift, "Integer-pixel correlation peak");

    let mut estimate = if config.upsample_factor == 1 {
        ShiftEstimate {
            shift,
            peak: coarse.value,
            src_amp: mean_spectral_energy(src_freq),
            target_amp: mean_spectral_energy(target_freq),
        }
    } else {
        let upsample_factor = config.upsample_factor as f64;
        for s in shift.iter_mut() {
            *s = (*s * upsample_factor).round_ties_even() / upsample_factor;
        }

        let region_size = (upsample_factor * UPSAMPLED_REGION_SCALE).ceil() as usize;
        // Center of the output window sits at `dftshift`.
        let dftshift = (region_size / 2) as f64;
        let offsets: Vec<f64> = shift
            .iter()
            .map(|&s| dftshift - s * upsample_factor)
            .collect();

        // Upsampling conj(product) and conjugating back yields the upsampled
        // cross-correlation without a second product.
        let conj_product = image_product.mapv(|v| v.conj());
        let upsampled = upsampled_dft(&conj_product, region_size, upsample_factor, Some(&offsets))?
            .mapv(|v| v.conj());

        let fine = find_peak(&upsampled);
        for (s, &m) in shift.iter_mut().zip(&fine.index) {
            *s += (m as f64 - dftshift) / upsample_factor;
        }
        debug!(?shift, upsample_factor, "Refined subpixel shift");

        ShiftEstimate {
            shift,
            peak: fine.value,
            src_amp: spectral_energy(src_freq),
            target_amp: spectral_energy(target_freq),
        }
    };

    zero_singleton_axes(&mut estimate.shift, &shape);
    Ok(estimate)
}

fn warn_shift_only(mode: ReturnError) {
    warn!(
        return_error = %mode,
        "Returning the shift only; set return_error = \"always\" to always receive \
         (shift, error, phasediff)"
    );
}
