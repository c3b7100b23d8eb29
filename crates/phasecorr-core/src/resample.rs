//! Shift an N-d array by a real-valued offset with periodic boundaries.
//!
//! `output[x] = input(x - shift)` where samples outside the array wrap
//! around ("grid-wrap"). Cubic interpolation uses a periodic cubic B-spline:
//! the input is first converted to spline coefficients by a recursive
//! prefilter along every axis, then each output sample combines the `4^n`
//! surrounding coefficients.

use ndarray::{ArrayD, ArrayViewMut1, Axis, IxDyn, Zip};
use serde::{Deserialize, Serialize};

use crate::consts::{CUBIC_SPLINE_POLE, PARALLEL_ELEMENT_THRESHOLD};
use crate::element::Real;
use crate::error::{RegistrationError, Result};

/// Spline order used when resampling.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterpolationOrder {
    /// Order 0.
    #[default]
    Nearest,
    /// Order 3.
    Cubic,
}

/// Shift `input` by `shift` (one entry per axis) with wrap-around.
pub fn shift_wrapped<T: Real>(
    input: &ArrayD<T>,
    shift: &[f64],
    order: InterpolationOrder,
) -> Result<ArrayD<T>> {
    if shift.len() != input.ndim() {
        return Err(RegistrationError::DimensionMismatch {
            what: "shift components",
            expected: input.ndim(),
            actual: shift.len(),
        });
    }
    if input.is_empty() {
        return Err(RegistrationError::EmptyImage);
    }

    Ok(match order {
        InterpolationOrder::Nearest => shift_nearest(input, shift),
        InterpolationOrder::Cubic => shift_cubic(input, shift),
    })
}

fn wrap_index(i: i64, len: usize) -> usize {
    i.rem_euclid(len as i64) as usize
}

fn shift_nearest<T: Real>(input: &ArrayD<T>, shift: &[f64]) -> ArrayD<T> {
    let shape = input.shape().to_vec();
    let mut source = vec![0usize; shape.len()];
    ArrayD::from_shape_fn(IxDyn(&shape), |idx| {
        for (axis, s) in source.iter_mut().enumerate() {
            let coord = idx[axis] as f64 - shift[axis];
            *s = wrap_index((coord + 0.5).floor() as i64, shape[axis]);
        }
        input[source.as_slice()]
    })
}

fn shift_cubic<T: Real>(input: &ArrayD<T>, shift: &[f64]) -> ArrayD<T> {
    let coefficients = spline_coefficients(input);
    let shape = input.shape().to_vec();
    let ndim = shape.len();

    // The fractional part of the source coordinate is the same for every
    // output sample along an axis, so the four weights are too.
    let weights: Vec<[f64; 4]> = shift.iter().map(|&s| cubic_weights((-s) - (-s).floor())).collect();
    let bases: Vec<i64> = shift.iter().map(|&s| (-s).floor() as i64 - 1).collect();

    let taps = 4usize.pow(ndim as u32);
    let mut source = vec![0usize; ndim];
    ArrayD::from_shape_fn(IxDyn(&shape), |idx| {
        let mut acc = 0.0;
        for tap in 0..taps {
            let mut weight = 1.0;
            let mut code = tap;
            for axis in 0..ndim {
                let offset = code % 4;
                code /= 4;
                weight *= weights[axis][offset];
                let i = idx[axis] as i64 + bases[axis] + offset as i64;
                source[axis] = wrap_index(i, shape[axis]);
            }
            acc += weight * coefficients[source.as_slice()];
        }
        T::cast(acc)
    })
}

/// Cubic B-spline weights for the four taps at `floor(x) - 1 ..= floor(x) + 2`
/// given the fractional offset `t = x - floor(x)`.
fn cubic_weights(t: f64) -> [f64; 4] {
    let t2 = t * t;
    let t3 = t2 * t;
    [
        (1.0 - t).powi(3) / 6.0,
        (3.0 * t3 - 6.0 * t2 + 4.0) / 6.0,
        (-3.0 * t3 + 3.0 * t2 + 3.0 * t + 1.0) / 6.0,
        t3 / 6.0,
    ]
}

/// Periodic cubic B-spline coefficients along every axis.
fn spline_coefficients<T: Real>(input: &ArrayD<T>) -> ArrayD<f64> {
    let mut coefficients = input.mapv(|v| v.widen());
    let parallel = coefficients.len() >= PARALLEL_ELEMENT_THRESHOLD;
    for axis in 0..coefficients.ndim() {
        if coefficients.len_of(Axis(axis)) < 2 {
            continue;
        }
        let lanes = Zip::from(coefficients.lanes_mut(Axis(axis)));
        if parallel {
            lanes.par_for_each(prefilter_periodic);
        } else {
            lanes.for_each(prefilter_periodic);
        }
    }
    coefficients
}

/// In-place causal/anti-causal recursive filter with periodic initial
/// conditions. Converts samples to cubic B-spline coefficients.
fn prefilter_periodic(mut lane: ArrayViewMut1<f64>) {
    let n = lane.len();
    let z = CUBIC_SPLINE_POLE;
    let zn = z.powi(n as i32);

    // Causal pass: c+[0] = sum_k z^k s[-k mod n] / (1 - z^n)
    let mut init = lane[0];
    let mut zk = z;
    for k in 1..n {
        init += zk * lane[n - k];
        zk *= z;
    }
    lane[0] = init / (1.0 - zn);
    for k in 1..n {
        let prev = lane[k - 1];
        lane[k] += z * prev;
    }

    // Anti-causal pass: c-[n-1] = -z / (1 - z^n) * sum_j z^j c+[(n - 1 + j) mod n]
    let mut init = 0.0;
    let mut zj = 1.0;
    for j in 0..n {
        init += zj * lane[(n - 1 + j) % n];
        zj *= z;
    }
    lane[n - 1] = -z / (1.0 - zn) * init;
    for k in (0..n - 1).rev() {
        let next = lane[k + 1];
        lane[k] = z * (next - lane[k]);
    }

    lane.mapv_inplace(|v| 6.0 * v);
}
