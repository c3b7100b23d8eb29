//! Real-space disambiguation of a periodic shift estimate.
//!
//! A shift recovered in Fourier space is only known modulo the image size
//! along each axis, which leaves `2^n` candidates. The moving image is shifted
//! with wrap-around; its original borders then cut the overlap into `2^n`
//! tiles, and the tile that correlates best with the reference tells which
//! candidate is physically correct on every axis.

use ndarray::{ArrayD, ArrayViewD, Slice};
use tracing::{debug, warn};

use crate::consts::MIN_DISAMBIGUATION_TILE;
use crate::element::Real;
use crate::error::{RegistrationError, Result};
use crate::resample::{shift_wrapped, InterpolationOrder};

/// Pick the real-space shift among the periodic candidates of `shift`.
///
/// `shift` is the shift that registers `moving` onto `reference`, modulo the
/// image shape. Integral input shifts produce integral output shifts.
pub fn disambiguate_shift<T: Real>(
    reference: &ArrayD<T>,
    moving: &ArrayD<T>,
    shift: &[f64],
) -> Result<Vec<f64>> {
    let shape = reference.shape();
    if moving.shape() != shape {
        return Err(RegistrationError::ShapeMismatch {
            reference: shape.to_vec(),
            moving: moving.shape().to_vec(),
        });
    }
    if shift.len() != shape.len() {
        return Err(RegistrationError::DimensionMismatch {
            what: "shift components",
            expected: shape.len(),
            actual: shift.len(),
        });
    }

    let positive: Vec<f64> = shift
        .iter()
        .zip(shape)
        .map(|(&s, &len)| s.rem_euclid(len as f64))
        .collect();
    let negative: Vec<f64> = positive
        .iter()
        .zip(shape)
        .map(|(&p, &len)| p - len as f64)
        .collect();

    let subpixel = shift.iter().any(|s| s.fract() != 0.0);
    let order = if subpixel {
        InterpolationOrder::Cubic
    } else {
        InterpolationOrder::Nearest
    };
    let shifted = shift_wrapped(moving, shift, order)?;

    let splits: Vec<usize> = positive
        .iter()
        .zip(shape)
        .map(|(&p, &len)| (p.round_ties_even() as usize).min(len))
        .collect();

    // Bit `axis` of a tile code selects the upper (`split..`) slice.
    let ndim = shape.len();
    let mut best_corr = -1.0;
    let mut best_tile = None;
    for code in 0..(1usize << ndim) {
        let tile = |view: ArrayViewD<'_, T>| {
            view.slice_each_axis(|ax| {
                let axis = ax.axis.index();
                if code >> axis & 1 == 1 {
                    Slice::from(splits[axis]..)
                } else {
                    Slice::from(..splits[axis])
                }
            })
            .iter()
            .map(|v| v.widen())
            .collect::<Vec<f64>>()
        };
        let reference_tile = tile(reference.view());
        let moving_tile = tile(shifted.view());

        let corr = if reference_tile.len() > MIN_DISAMBIGUATION_TILE {
            pearson(&reference_tile, &moving_tile)
        } else {
            -1.0
        };
        if corr > best_corr {
            best_corr = corr;
            best_tile = Some(code);
        }
    }

    let Some(code) = best_tile else {
        warn!(?shift, "No overlap tile correlates; keeping the periodic shift estimate");
        return Ok(shift.to_vec());
    };

    let real_shift: Vec<f64> = (0..ndim)
        .map(|axis| {
            let value = if code >> axis & 1 == 1 {
                positive[axis]
            } else {
                negative[axis]
            };
            if subpixel {
                value
            } else {
                value.trunc()
            }
        })
        .collect();

    debug!(?shift, ?real_shift, correlation = best_corr, "Disambiguated shift");
    Ok(real_shift)
}

/// Pearson correlation coefficient, clipped to `[-1, 1]`. NaN when either
/// input has zero variance.
fn pearson(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len() as f64;
    let mean_a = a.iter().sum::<f64>() / n;
    let mean_b = b.iter().sum::<f64>() / n;

    let (mut cov, mut var_a, mut var_b) = (0.0, 0.0, 0.0);
    for (&x, &y) in a.iter().zip(b) {
        let dx = x - mean_a;
        let dy = y - mean_b;
        cov += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    }

    (cov / (var_a * var_b).sqrt()).clamp(-1.0, 1.0)
}
