use std::sync::atomic::{AtomicUsize, Ordering};

use ndarray::{Array, ArrayBase, Data, Dimension};
use rayon::prelude::*;

use crate::config::RegistrationConfig;
use crate::consts::PARALLEL_FRAME_THRESHOLD;
use crate::element::Element;
use crate::error::Result;
use crate::registration::{phase_cross_correlation, Registration};

/// Register every frame against `reference`.
pub fn register_frames<A, S, D>(
    reference: &ArrayBase<S, D>,
    frames: &[Array<A, D>],
    config: &RegistrationConfig,
) -> Result<Vec<Registration>>
where
    A: Element,
    S: Data<Elem = A>,
    D: Dimension,
{
    register_frames_with_progress(reference, frames, config, |_| {})
}

/// Register every frame against `reference`, reporting the number of frames
/// finished so far after each one.
pub fn register_frames_with_progress<A, S, D, F>(
    reference: &ArrayBase<S, D>,
    frames: &[Array<A, D>],
    config: &RegistrationConfig,
    on_frame_done: F,
) -> Result<Vec<Registration>>
where
    A: Element,
    S: Data<Elem = A>,
    D: Dimension,
    F: Fn(usize) + Send + Sync,
{
    let reference = reference.view();
    let counter = AtomicUsize::new(0);

    let register_one = |frame: &Array<A, D>| {
        let result = phase_cross_correlation(&reference, frame, config);
        let done = counter.fetch_add(1, Ordering::Relaxed) + 1;
        on_frame_done(done);
        result
    };

    if frames.len() >= PARALLEL_FRAME_THRESHOLD {
        frames.par_iter().map(register_one).collect()
    } else {
        frames.iter().map(register_one).collect()
    }
}
