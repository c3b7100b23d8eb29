use std::f64::consts::TAU;

use ndarray::{ArrayD, IxDyn};
use num_complex::Complex;

use phasecorr_core::fft::{fftfreq, fftn, ifftn};
use phasecorr_core::upsampled_dft::{upsampled_dft, RegionSize};
use phasecorr_core::RegistrationError;

fn complex_data(shape: &[usize]) -> ArrayD<Complex<f64>> {
    ArrayD::from_shape_fn(IxDyn(shape), |idx| {
        let a = (0..shape.len()).map(|i| idx[i] * (i + 2)).sum::<usize>();
        Complex::new((a % 7) as f64 - 3.0, ((a * 5) % 11) as f64 * 0.25)
    })
}

fn assert_close(a: &ArrayD<Complex<f64>>, b: &ArrayD<Complex<f64>>, tol: f64) {
    assert_eq!(a.shape(), b.shape());
    for (x, y) in a.iter().zip(b.iter()) {
        assert!((x - y).norm() < tol, "{x} vs {y}");
    }
}

#[test]
fn test_unit_factor_full_region_equals_forward_transform() {
    let data = complex_data(&[4, 6]);
    let out = upsampled_dft(&data, vec![4, 6], 1.0, None).unwrap();
    assert_close(&out, &fftn(&data), 1e-9);
}

#[test]
fn test_conjugate_form_equals_inverse_transform() {
    let data = complex_data(&[5, 3, 4]);
    let n = data.len() as f64;
    let conj = data.mapv(|v| v.conj());
    let out = upsampled_dft(&conj, data.shape(), 1.0, Some(&[0.0, 0.0, 0.0]))
        .unwrap()
        .mapv(|v| v.conj() / n);
    assert_close(&out, &ifftn(&data), 1e-9);
}

#[test]
fn test_matches_direct_evaluation_with_offsets() {
    let data = complex_data(&[6, 5]);
    let factor = 3.0;
    let offsets = [1.5, -2.0];
    let region = [4usize, 7];
    let out = upsampled_dft(&data, region.as_slice(), factor, Some(&offsets)).unwrap();

    let f0 = fftfreq(6, factor);
    let f1 = fftfreq(5, factor);
    for i in 0..region[0] {
        for j in 0..region[1] {
            let mut expected = Complex::new(0.0, 0.0);
            for k in 0..6 {
                for l in 0..5 {
                    let phase = -TAU
                        * ((i as f64 - offsets[0]) * f0[k] + (j as f64 - offsets[1]) * f1[l]);
                    expected += data[[k, l]] * Complex::from_polar(1.0, phase);
                }
            }
            assert!((out[[i, j]] - expected).norm() < 1e-9);
        }
    }
}

#[test]
fn test_scalar_region_broadcasts() {
    let data = complex_data(&[3, 4, 5]);
    let out = upsampled_dft(&data, 6, 2.0, None).unwrap();
    assert_eq!(out.shape(), &[6, 6, 6]);
    assert_eq!(RegionSize::from(6), RegionSize::Uniform(6));
}

#[test]
fn test_single_precision_stays_single() {
    let data = complex_data(&[4, 4]).mapv(|v| Complex::new(v.re as f32, v.im as f32));
    let out: ArrayD<Complex<f32>> = upsampled_dft(&data, 4, 1.0, None).unwrap();
    let reference = fftn(&data);
    for (x, y) in out.iter().zip(reference.iter()) {
        assert!((x - y).norm() < 1e-3);
    }
}

#[test]
fn test_region_size_length_mismatch_rejected() {
    let data = complex_data(&[4, 4]);
    let err = upsampled_dft(&data, vec![4, 4, 4], 2.0, None).unwrap_err();
    assert!(matches!(
        err,
        RegistrationError::DimensionMismatch { expected: 2, actual: 3, .. }
    ));
}

#[test]
fn test_offset_length_mismatch_rejected() {
    let data = complex_data(&[4, 4]);
    let err = upsampled_dft(&data, 3, 2.0, Some(&[1.0])).unwrap_err();
    assert!(matches!(
        err,
        RegistrationError::DimensionMismatch { expected: 2, actual: 1, .. }
    ));
}
