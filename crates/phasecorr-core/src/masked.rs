//! Masked normalized cross-correlation (Padfield, 2012).
//!
//! Registers images whose invalid pixels are excluded by boolean masks
//! (`true` = valid). The correlation is computed in "full" mode through
//! zero-padded FFTs, so no wrap-around is involved.
//!
//! Reference: D. Padfield, "Masked Object Registration in the Fourier Domain",
//!            IEEE Transactions on Image Processing 21(5), 2012.

use ndarray::{ArrayD, Axis, Dimension, Zip};
use num_complex::Complex;
use num_traits::Float;

use crate::consts::MASKED_DENOM_TOLERANCE_SCALE;
use crate::element::Real;
use crate::error::{RegistrationError, Result};
use crate::fft::{fftn_padded, ifftn};

/// Shift that registers `moving` onto `reference`, ignoring masked-out pixels.
///
/// When `moving_mask` is `None` the reference mask is reused, which requires
/// both images to have the same shape.
pub fn masked_phase_cross_correlation<T: Real>(
    reference: &ArrayD<T>,
    moving: &ArrayD<T>,
    reference_mask: &ArrayD<bool>,
    moving_mask: Option<&ArrayD<bool>>,
    overlap_ratio: f64,
) -> Result<Vec<f64>> {
    let moving_mask = match moving_mask {
        Some(mask) => mask,
        None => {
            if reference.shape() != moving.shape() {
                return Err(RegistrationError::ShapeMismatch {
                    reference: reference.shape().to_vec(),
                    moving: moving.shape().to_vec(),
                });
            }
            reference_mask
        }
    };

    for (image, mask) in [(reference, reference_mask), (moving, moving_mask)] {
        if image.shape() != mask.shape() {
            return Err(RegistrationError::MaskShapeMismatch {
                image: image.shape().to_vec(),
                mask: mask.shape().to_vec(),
            });
        }
    }

    let xcorr = cross_correlate_masked(moving, reference, moving_mask, reference_mask, overlap_ratio)?;

    let max = xcorr.iter().copied().fold(T::neg_infinity(), Float::max);
    let mut center = vec![0.0; xcorr.ndim()];
    let mut count = 0usize;
    for (idx, &v) in xcorr.indexed_iter() {
        if v == max {
            for (c, &i) in center.iter_mut().zip(idx.slice()) {
                *c += i as f64;
            }
            count += 1;
        }
    }
    if count == 0 {
        return Err(RegistrationError::DegenerateResult);
    }

    Ok(center
        .iter()
        .zip(reference.shape())
        .map(|(&c, &len)| -(c / count as f64 - len as f64 + 1.0))
        .collect())
}

/// Full-mode masked normalized cross-correlation of `fixed` and `moving`.
///
/// The output has shape `fixed.shape + moving.shape - 1`; values lie in
/// `[-1, 1]`. Lags whose overlap holds fewer than
/// `overlap_ratio * max_overlap` valid pixels are set to zero.
pub fn cross_correlate_masked<T: Real>(
    fixed: &ArrayD<T>,
    moving: &ArrayD<T>,
    fixed_mask: &ArrayD<bool>,
    moving_mask: &ArrayD<bool>,
    overlap_ratio: f64,
) -> Result<ArrayD<T>> {
    if !(0.0..=1.0).contains(&overlap_ratio) {
        return Err(RegistrationError::InvalidOverlapRatio(overlap_ratio));
    }
    if fixed.ndim() != moving.ndim() {
        return Err(RegistrationError::DimensionMismatch {
            what: "moving image axes",
            expected: fixed.ndim(),
            actual: moving.ndim(),
        });
    }
    if fixed.is_empty() || moving.is_empty() {
        return Err(RegistrationError::EmptyImage);
    }

    let eps = T::epsilon();
    let final_shape: Vec<usize> = fixed
        .shape()
        .iter()
        .zip(moving.shape())
        .map(|(&a, &b)| a + b - 1)
        .collect();

    let fixed_image = apply_mask(fixed, fixed_mask);
    let rotated_moving_image = flip_all_axes(&apply_mask(moving, moving_mask));
    let fixed_mask = mask_to_real::<T>(fixed_mask);
    let rotated_moving_mask = flip_all_axes(&mask_to_real::<T>(moving_mask));

    let fft = |data: &ArrayD<T>| fftn_padded(&to_complex(data), &final_shape);
    let ifft_real = |a: &ArrayD<Complex<T>>, b: &ArrayD<Complex<T>>| -> ArrayD<T> {
        let product = Zip::from(a).and(b).map_collect(|&x, &y| x * y);
        ifftn(&product).mapv(|v| v.re)
    };

    let fixed_fft = fft(&fixed_image)?;
    let rotated_moving_fft = fft(&rotated_moving_image)?;
    let fixed_mask_fft = fft(&fixed_mask)?;
    let rotated_moving_mask_fft = fft(&rotated_moving_mask)?;

    let number_overlap_masked_px = ifft_real(&rotated_moving_mask_fft, &fixed_mask_fft)
        .mapv(|v| overlap_count(v, eps));

    let masked_correlated_fixed = ifft_real(&rotated_moving_mask_fft, &fixed_fft);
    let masked_correlated_rotated_moving = ifft_real(&fixed_mask_fft, &rotated_moving_fft);

    let mut numerator = ifft_real(&rotated_moving_fft, &fixed_fft);
    Zip::from(&mut numerator)
        .and(&masked_correlated_fixed)
        .and(&masked_correlated_rotated_moving)
        .and(&number_overlap_masked_px)
        .for_each(|num, &f, &m, &n| *num = *num - f * m / n);

    let fixed_squared_fft = fft(&fixed_image.mapv(|v| v * v))?;
    let mut fixed_denom = ifft_real(&rotated_moving_mask_fft, &fixed_squared_fft);
    Zip::from(&mut fixed_denom)
        .and(&masked_correlated_fixed)
        .and(&number_overlap_masked_px)
        .for_each(|d, &f, &n| *d = Float::max(*d - f * f / n, T::zero()));

    let rotated_moving_squared_fft = fft(&rotated_moving_image.mapv(|v| v * v))?;
    let mut moving_denom = ifft_real(&fixed_mask_fft, &rotated_moving_squared_fft);
    Zip::from(&mut moving_denom)
        .and(&masked_correlated_rotated_moving)
        .and(&number_overlap_masked_px)
        .for_each(|d, &m, &n| *d = Float::max(*d - m * m / n, T::zero()));

    let denom = Zip::from(&fixed_denom)
        .and(&moving_denom)
        .map_collect(|&f, &m| Float::sqrt(f * m));

    // Very small denominators would turn rounding noise into huge values.
    let max_denom = denom
        .iter()
        .copied()
        .fold(T::zero(), |acc, v| Float::max(acc, Float::abs(v)));
    let tol = T::cast(MASKED_DENOM_TOLERANCE_SCALE) * eps * max_denom;

    let max_overlap = number_overlap_masked_px
        .iter()
        .copied()
        .fold(T::zero(), Float::max);
    let px_threshold = T::cast(overlap_ratio) * max_overlap;

    let one = T::one();
    Ok(Zip::from(&numerator)
        .and(&denom)
        .and(&number_overlap_masked_px)
        .map_collect(|&num, &den, &overlap| {
            if overlap < px_threshold || den <= tol {
                T::zero()
            } else {
                Float::min(Float::max(num / den, -one), one)
            }
        }))
}

/// Overlap pixel count recovered from a correlation of masks: rounded to the
/// nearest integer (ties to even) and kept away from zero.
fn overlap_count<T: Real>(value: T, eps: T) -> T {
    Float::max(Real::round_ties_even(value), eps)
}

fn apply_mask<T: Real>(image: &ArrayD<T>, mask: &ArrayD<bool>) -> ArrayD<T> {
    Zip::from(image)
        .and(mask)
        .map_collect(|&v, &valid| if valid { v } else { T::zero() })
}

fn mask_to_real<T: Real>(mask: &ArrayD<bool>) -> ArrayD<T> {
    mask.mapv(|valid| if valid { T::one() } else { T::zero() })
}

fn to_complex<T: Real>(data: &ArrayD<T>) -> ArrayD<Complex<T>> {
    data.mapv(|v| Complex::new(v, T::zero()))
}

fn flip_all_axes<T: Clone>(data: &ArrayD<T>) -> ArrayD<T> {
    let mut view = data.view();
    for axis in 0..view.ndim() {
        view.invert_axis(Axis(axis));
    }
    view.to_owned()
}
