//! Numeric element types accepted by the registration routines.
//!
//! All arithmetic runs in the precision of the input: `f32` images are
//! transformed and correlated in `f32`, `f64` images in `f64`.

use std::fmt::{Debug, Display};

use num_complex::Complex;
use num_traits::Float;
use rustfft::FftNum;

/// Floating-point scalar usable with `rustfft`.
pub trait Real: FftNum + Float + Display + Debug {
    /// Lossy conversion from an `f64` literal or intermediate.
    fn cast(value: f64) -> Self;

    /// Widen to `f64` for reporting.
    fn widen(self) -> f64;

    /// Round half-way cases to the nearest even integer.
    fn round_ties_even(self) -> Self;
}

impl Real for f32 {
    fn cast(value: f64) -> Self {
        value as f32
    }

    fn widen(self) -> f64 {
        self as f64
    }

    fn round_ties_even(self) -> Self {
        f32::round_ties_even(self)
    }
}

impl Real for f64 {
    fn cast(value: f64) -> Self {
        value
    }

    fn widen(self) -> f64 {
        self
    }

    fn round_ties_even(self) -> Self {
        f64::round_ties_even(self)
    }
}

/// Image element: a real or complex scalar.
pub trait Element: Copy + Send + Sync {
    type Real: Real;

    fn to_complex(self) -> Complex<Self::Real>;

    /// Real component, used wherever a real-space image is required.
    fn real_part(self) -> Self::Real {
        self.to_complex().re
    }
}

impl Element for f32 {
    type Real = f32;

    fn to_complex(self) -> Complex<f32> {
        Complex::new(self, 0.0)
    }
}

impl Element for f64 {
    type Real = f64;

    fn to_complex(self) -> Complex<f64> {
        Complex::new(self, 0.0)
    }
}

impl Element for Complex<f32> {
    type Real = f32;

    fn to_complex(self) -> Complex<f32> {
        self
    }
}

impl Element for Complex<f64> {
    type Real = f64;

    fn to_complex(self) -> Complex<f64> {
        self
    }
}
