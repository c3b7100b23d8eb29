/// Minimum element count to transform FFT lanes with Rayon.
pub const PARALLEL_ELEMENT_THRESHOLD: usize = 65_536;

/// Minimum frame count to use frame-level Rayon parallelism.
pub const PARALLEL_FRAME_THRESHOLD: usize = 4;

/// Size of the upsampled search window, in original pixels, around the
/// coarse correlation peak. The window holds `ceil(1.5 * upsample_factor)`
/// samples per axis.
pub const UPSAMPLED_REGION_SCALE: f64 = 1.5;

/// Phase normalization divides by `max(|product|, PHASE_EPSILON_SCALE * eps)`.
pub const PHASE_EPSILON_SCALE: f64 = 100.0;

/// Default minimum overlap ratio for masked registration.
pub const DEFAULT_OVERLAP_RATIO: f64 = 0.3;

/// Tiles with at most this many elements cannot produce a meaningful
/// Pearson coefficient during shift disambiguation.
pub const MIN_DISAMBIGUATION_TILE: usize = 2;

/// Masked correlation zeroes lags whose denominator is below
/// `MASKED_DENOM_TOLERANCE_SCALE * eps * max(denom)`.
pub const MASKED_DENOM_TOLERANCE_SCALE: f64 = 1e3;

/// Pole of the cubic B-spline prefilter (`sqrt(3) - 2`).
pub const CUBIC_SPLINE_POLE: f64 = -0.267_949_192_431_122_7;
