//! Translation-invariant error metric and global phase difference.

use ndarray::ArrayD;
use num_complex::Complex;
use num_traits::Float;

use crate::element::Real;
use crate::error::{RegistrationError, Result};

/// Sum of squared magnitudes over the whole spectrum.
pub fn spectral_energy<T: Real>(freq: &ArrayD<Complex<T>>) -> T {
    freq.iter().fold(T::zero(), |acc, v| acc + v.norm_sqr())
}

/// Mean of squared magnitudes over the whole spectrum.
pub fn mean_spectral_energy<T: Real>(freq: &ArrayD<Complex<T>>) -> T {
    spectral_energy(freq) / T::cast(freq.len() as f64)
}

/// Global phase difference between the two images. Zero for non-negative
/// images.
pub fn compute_phasediff<T: Real>(cross_correlation_max: Complex<T>) -> f64 {
    Float::atan2(cross_correlation_max.im, cross_correlation_max.re).widen()
}

/// Normalized RMS error between the registered images.
pub fn compute_error<T: Real>(cross_correlation_max: Complex<T>, src_amp: T, target_amp: T) -> f64 {
    let ratio = cross_correlation_max.norm_sqr() / (src_amp * target_amp);
    Float::sqrt(Float::abs(T::one() - ratio)).widen()
}

/// Reject peak values and amplitudes that would produce NaN metrics.
pub fn check_finite<T: Real>(cross_correlation_max: Complex<T>, src_amp: T, target_amp: T) -> Result<()> {
    if Float::is_nan(cross_correlation_max.re)
        || Float::is_nan(cross_correlation_max.im)
        || Float::is_nan(src_amp)
        || Float::is_nan(target_amp)
        || src_amp * target_amp == T::zero()
    {
        return Err(RegistrationError::DegenerateResult);
    }
    Ok(())
}
