pub mod batch;
pub mod config;
pub mod consts;
pub mod correlation;
pub mod disambiguate;
pub mod element;
pub mod error;
pub mod fft;
pub mod io;
pub mod masked;
pub mod metrics;
pub mod registration;
pub mod resample;
pub mod upsampled_dft;

pub use config::{Normalization, RegistrationConfig, ReturnError, Space};
pub use error::{RegistrationError, Result};
pub use registration::{
    phase_cross_correlation, phase_cross_correlation_with_masks, Registration,
    RegistrationMetrics,
};
