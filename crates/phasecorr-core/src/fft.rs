//! N-dimensional discrete Fourier transforms built from 1-D `rustfft` plans.
//!
//! Each axis is transformed lane by lane. Large arrays transform their lanes
//! in parallel through Rayon.

use std::sync::Arc;

use ndarray::{ArrayD, Axis, IxDyn, Slice, Zip};
use num_complex::Complex;
use rustfft::{Fft, FftDirection, FftPlanner};

use crate::consts::PARALLEL_ELEMENT_THRESHOLD;
use crate::element::Real;
use crate::error::{RegistrationError, Result};

/// Forward N-d FFT over every axis.
pub fn fftn<T: Real>(data: &ArrayD<Complex<T>>) -> ArrayD<Complex<T>> {
    let mut out = data.to_owned();
    transform_all_axes(&mut out, FftDirection::Forward);
    out
}

/// Inverse N-d FFT over every axis, normalized by `1 / N`.
pub fn ifftn<T: Real>(data: &ArrayD<Complex<T>>) -> ArrayD<Complex<T>> {
    let mut out = data.to_owned();
    transform_all_axes(&mut out, FftDirection::Inverse);
    if !out.is_empty() {
        let scale = T::one() / T::cast(out.len() as f64);
        out.mapv_inplace(|v| v * scale);
    }
    out
}

/// Zero-pad `data` at the high end of every axis up to `shape`, then take the
/// forward N-d FFT.
pub fn fftn_padded<T: Real>(data: &ArrayD<Complex<T>>, shape: &[usize]) -> Result<ArrayD<Complex<T>>> {
    if shape.len() != data.ndim() {
        return Err(RegistrationError::DimensionMismatch {
            what: "padded axis lengths",
            expected: data.ndim(),
            actual: shape.len(),
        });
    }
    if shape.iter().zip(data.shape()).any(|(&padded, &len)| padded < len) {
        return Err(RegistrationError::ShapeMismatch {
            reference: data.shape().to_vec(),
            moving: shape.to_vec(),
        });
    }

    let mut padded = ArrayD::<Complex<T>>::zeros(IxDyn(shape));
    let source_shape = data.shape();
    padded
        .slice_each_axis_mut(|ax| Slice::from(0..source_shape[ax.axis.index()]))
        .assign(data);
    transform_all_axes(&mut padded, FftDirection::Forward);
    Ok(padded)
}

/// Sample frequencies of an `n`-point DFT with sample spacing `spacing`.
///
/// Bins are in DFT order: `[0, 1, ..., (n-1)/2, -(n/2), ..., -1] / (spacing * n)`.
pub fn fftfreq(n: usize, spacing: f64) -> Vec<f64> {
    if n == 0 {
        return Vec::new();
    }
    let scale = 1.0 / (spacing * n as f64);
    let positive_end = (n - 1) / 2 + 1;
    (0..n)
        .map(|k| {
            let bin = if k < positive_end {
                k as f64
            } else {
                k as f64 - n as f64
            };
            bin * scale
        })
        .collect()
}

fn transform_all_axes<T: Real>(data: &mut ArrayD<Complex<T>>, direction: FftDirection) {
    let mut planner = FftPlanner::<T>::new();
    for axis in 0..data.ndim() {
        let len = data.len_of(Axis(axis));
        if len <= 1 {
            continue;
        }
        let plan = planner.plan_fft(len, direction);
        transform_axis(data, axis, &plan);
    }
}

fn transform_axis<T: Real>(data: &mut ArrayD<Complex<T>>, axis: usize, plan: &Arc<dyn Fft<T>>) {
    let parallel = data.len() >= PARALLEL_ELEMENT_THRESHOLD;
    let run = |mut lane: ndarray::ArrayViewMut1<Complex<T>>| {
        let mut buffer = lane.to_vec();
        plan.process(&mut buffer);
        for (dst, src) in lane.iter_mut().zip(buffer) {
            *dst = src;
        }
    };

    let lanes = Zip::from(data.lanes_mut(Axis(axis)));
    if parallel {
        lanes.par_for_each(&run);
    } else {
        lanes.for_each(&run);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fftfreq_even_and_odd() {
        assert_eq!(fftfreq(4, 1.0), vec![0.0, 0.25, -0.5, -0.25]);
        assert_eq!(fftfreq(5, 1.0), vec![0.0, 0.2, 0.4, -0.4, -0.2]);
        assert_eq!(fftfreq(4, 2.0), vec![0.0, 0.125, -0.25, -0.125]);
    }

    #[test]
    fn fft_of_impulse_is_flat() {
        let mut data = ArrayD::<Complex<f64>>::zeros(IxDyn(&[4, 6]));
        data[[0, 0]] = Complex::new(1.0, 0.0);
        let spectrum = fftn(&data);
        for v in spectrum.iter() {
            assert!((v.re - 1.0).abs() < 1e-12 && v.im.abs() < 1e-12);
        }
    }

    #[test]
    fn inverse_undoes_forward() {
        let data = ArrayD::from_shape_fn(IxDyn(&[3, 5, 4]), |idx| {
            Complex::new((idx[0] * 7 + idx[1] * 3 + idx[2]) as f64 % 5.0, idx[2] as f64)
        });
        let back = ifftn(&fftn(&data));
        for (a, b) in data.iter().zip(back.iter()) {
            assert!((a - b).norm() < 1e-10);
        }
    }

    #[test]
    fn padded_transform_matches_manual_padding() {
        let data = ArrayD::from_shape_fn(IxDyn(&[2, 3]), |idx| {
            Complex::new((idx[0] + 2 * idx[1]) as f64, 0.0)
        });
        let padded = fftn_padded(&data, &[4, 5]).unwrap();
        let mut manual = ArrayD::<Complex<f64>>::zeros(IxDyn(&[4, 5]));
        for r in 0..2 {
            for c in 0..3 {
                manual[[r, c]] = data[[r, c]];
            }
        }
        let expected = fftn(&manual);
        for (a, b) in padded.iter().zip(expected.iter()) {
            assert!((a - b).norm() < 1e-10);
        }
    }
}
