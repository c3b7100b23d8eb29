//! Cross-power spectrum and the full-resolution correlation surface.

use ndarray::{ArrayD, Dimension, Zip};
use num_complex::Complex;
use num_traits::Float;

use crate::config::Normalization;
use crate::consts::PHASE_EPSILON_SCALE;
use crate::element::Real;
use crate::fft::ifftn;

/// Integer-pixel correlation peak.
#[derive(Clone, Debug)]
pub struct CorrelationPeak<T> {
    /// Index of the maximum magnitude in the correlation surface.
    pub index: Vec<usize>,
    /// Complex correlation value at `index`.
    pub value: Complex<T>,
}

/// `src_freq * conj(target_freq)`, optionally phase-normalized.
///
/// Phase normalization divides by `max(|product|, 100 * eps)` so that
/// vanishing frequency bins do not blow up.
pub fn cross_power_spectrum<T: Real>(
    src_freq: &ArrayD<Complex<T>>,
    target_freq: &ArrayD<Complex<T>>,
    normalization: Normalization,
) -> ArrayD<Complex<T>> {
    let floor = T::cast(PHASE_EPSILON_SCALE) * T::epsilon();
    Zip::from(src_freq)
        .and(target_freq)
        .map_collect(|&src, &target| {
            let product = src * target.conj();
            match normalization {
                Normalization::Phase => product / Float::max(product.norm(), floor),
                Normalization::None => product,
            }
        })
}

/// Inverse transform of the cross-power spectrum.
pub fn correlation_surface<T: Real>(image_product: &ArrayD<Complex<T>>) -> ArrayD<Complex<T>> {
    ifftn(image_product)
}

/// Locate the element of largest magnitude.
///
/// Ties resolve to the first element in row-major order. A NaN magnitude is
/// treated as the maximum so that NaN inputs surface in the peak value.
pub fn find_peak<T: Real>(data: &ArrayD<Complex<T>>) -> CorrelationPeak<T> {
    let mut best_index = vec![0; data.ndim()];
    let mut best_value = Complex::new(T::nan(), T::nan());
    let mut best_norm = T::neg_infinity();

    for (idx, &value) in data.indexed_iter() {
        let norm = value.norm();
        if norm.is_nan() {
            best_index = idx.slice().to_vec();
            best_value = value;
            break;
        }
        if norm > best_norm {
            best_norm = norm;
            best_index = idx.slice().to_vec();
            best_value = value;
        }
    }

    CorrelationPeak {
        index: best_index,
        value: best_value,
    }
}

/// Map peak indices past the midpoint of each axis to negative shifts.
pub fn signed_shift(index: &[usize], shape: &[usize]) -> Vec<f64> {
    index
        .iter()
        .zip(shape)
        .map(|(&i, &len)| {
            if i > len / 2 {
                i as f64 - len as f64
            } else {
                i as f64
            }
        })
        .collect()
}

/// Zero the shift on every axis of length 1.
pub fn zero_singleton_axes(shift: &mut [f64], shape: &[usize]) {
    for (s, &len) in shift.iter_mut().zip(shape) {
        if len == 1 {
            *s = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::IxDyn;

    #[test]
    fn signed_shift_wraps_past_midpoint() {
        assert_eq!(signed_shift(&[0, 4, 5, 7], &[8, 8, 8, 8]), vec![0.0, 4.0, -3.0, -1.0]);
        assert_eq!(signed_shift(&[2, 3], &[5, 5]), vec![2.0, -2.0]);
    }

    #[test]
    fn peak_prefers_first_maximum() {
        let mut data = ArrayD::<Complex<f64>>::zeros(IxDyn(&[3, 3]));
        data[[1, 2]] = Complex::new(0.0, -2.0);
        data[[2, 0]] = Complex::new(2.0, 0.0);
        let peak = find_peak(&data);
        assert_eq!(peak.index, vec![1, 2]);
        assert_eq!(peak.value, Complex::new(0.0, -2.0));
    }

    #[test]
    fn phase_normalization_has_unit_magnitude() {
        let src = ArrayD::from_elem(IxDyn(&[2, 2]), Complex::new(3.0f64, 4.0));
        let target = ArrayD::from_elem(IxDyn(&[2, 2]), Complex::new(1.0f64, 1.0));
        let product = cross_power_spectrum(&src, &target, Normalization::Phase);
        assert!(product.iter().all(|v| (v.norm() - 1.0).abs() < 1e-12));
        let raw = cross_power_spectrum(&src, &target, Normalization::None);
        assert!(raw.iter().all(|v| (*v - Complex::new(7.0, 1.0)).norm() < 1e-12));
    }

    #[test]
    fn zero_product_stays_finite() {
        let zeros = ArrayD::<Complex<f32>>::zeros(IxDyn(&[4]));
        let product = cross_power_spectrum(&zeros, &zeros, Normalization::Phase);
        assert!(product.iter().all(|v| v.re == 0.0 && v.im == 0.0));
    }
}
