#![allow(dead_code)]

use ndarray::{ArrayD, IxDyn};
use num_complex::Complex;
use phasecorr_core::fft::{fftn, ifftn};

/// Deterministic uniform noise in [0, 1) (64-bit LCG).
pub fn noise(shape: &[usize], seed: u64) -> ArrayD<f64> {
    let mut state = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
    ArrayD::from_shape_simple_fn(IxDyn(shape), || {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (state >> 11) as f64 / (1u64 << 53) as f64
    })
}

/// Circularly shift `data` so that `out[i] = data[i - shift]`.
pub fn roll(data: &ArrayD<f64>, shift: &[i64]) -> ArrayD<f64> {
    let shape = data.shape().to_vec();
    let mut out = ArrayD::<f64>::zeros(IxDyn(&shape));
    for (idx, &v) in data.indexed_iter() {
        let target: Vec<usize> = (0..shape.len())
            .map(|axis| (idx[axis] as i64 + shift[axis]).rem_euclid(shape[axis] as i64) as usize)
            .collect();
        out[target.as_slice()] = v;
    }
    out
}

/// Isotropic Gaussian blob centered at `center`.
pub fn gaussian(shape: &[usize], center: &[f64], sigma: f64) -> ArrayD<f64> {
    ArrayD::from_shape_fn(IxDyn(shape), |idx| {
        let r2: f64 = (0..shape.len())
            .map(|axis| (idx[axis] as f64 - center[axis]).powi(2))
            .sum();
        (-r2 / (2.0 * sigma * sigma)).exp()
    })
}

pub fn to_complex(data: &ArrayD<f64>) -> ArrayD<Complex<f64>> {
    data.mapv(|v| Complex::new(v, 0.0))
}

/// Spectrum of `data` translated by `shift` (circular, subpixel allowed).
pub fn fourier_shifted_spectrum(data: &ArrayD<f64>, shift: &[f64]) -> ArrayD<Complex<f64>> {
    let shape = data.shape().to_vec();
    let mut spectrum = fftn(&to_complex(data));
    for (idx, v) in spectrum.indexed_iter_mut() {
        let phase: f64 = (0..shape.len())
            .map(|axis| {
                let n = shape[axis];
                let k = idx[axis];
                let bin = if k <= (n - 1) / 2 {
                    k as f64
                } else {
                    k as f64 - n as f64
                };
                -std::f64::consts::TAU * bin / n as f64 * shift[axis]
            })
            .sum();
        *v *= Complex::from_polar(1.0, phase);
    }
    spectrum
}

/// Real part of the inverse transform.
pub fn real_ifft(spectrum: &ArrayD<Complex<f64>>) -> ArrayD<f64> {
    ifftn(spectrum).mapv(|v| v.re)
}

/// Noise with every frequency at or above `n / 4` removed on each axis, so
/// that fractional Fourier shifts stay well sampled.
pub fn band_limited_noise(shape: &[usize], seed: u64) -> ArrayD<f64> {
    let mut spectrum = fftn(&to_complex(&noise(shape, seed)));
    for (idx, v) in spectrum.indexed_iter_mut() {
        let high = (0..shape.len()).any(|axis| {
            let n = shape[axis];
            let k = idx[axis].min(n - idx[axis]);
            4 * k >= n
        });
        if high {
            *v = Complex::new(0.0, 0.0);
        }
    }
    real_ifft(&spectrum)
}
