mod common;

use std::sync::atomic::{AtomicUsize, Ordering};

use phasecorr_core::batch::{register_frames, register_frames_with_progress};
use phasecorr_core::{phase_cross_correlation, RegistrationConfig};

use common::{noise, roll};

#[test]
fn test_batch_matches_single_registration() {
    let reference = noise(&[32, 32], 41);
    let shifts = [[1, 2], [-3, 4], [0, 0], [5, -6], [-7, -8], [2, 9]];
    let frames: Vec<_> = shifts.iter().map(|s| roll(&reference, s)).collect();
    let config = RegistrationConfig {
        upsample_factor: 4,
        ..Default::default()
    };

    let max_done = AtomicUsize::new(0);
    let results = register_frames_with_progress(&reference, &frames, &config, |done| {
        max_done.fetch_max(done, Ordering::Relaxed);
    })
    .unwrap();

    assert_eq!(results.len(), frames.len());
    assert_eq!(max_done.load(Ordering::Relaxed), frames.len());
    for (frame, result) in frames.iter().zip(&results) {
        let single = phase_cross_correlation(&reference, frame, &config).unwrap();
        assert_eq!(&single, result);
    }
    for (s, result) in shifts.iter().zip(&results) {
        assert!((result.shift[0] + s[0] as f64).abs() < 1e-9);
        assert!((result.shift[1] + s[1] as f64).abs() < 1e-9);
    }
}

#[test]
fn test_small_batch_runs_sequentially() {
    let reference = noise(&[16, 16], 42);
    let frames = vec![roll(&reference, &[1, -1]), roll(&reference, &[2, 3])];
    let results = register_frames(&reference, &frames, &RegistrationConfig::default()).unwrap();
    assert_eq!(results[0].shift, vec![-1.0, 1.0]);
    assert_eq!(results[1].shift, vec![-2.0, -3.0]);
}

#[test]
fn test_batch_propagates_errors() {
    let reference = noise(&[16, 16], 43);
    let frames = vec![noise(&[16, 16], 44), noise(&[8, 16], 45)];
    assert!(register_frames(&reference, &frames, &RegistrationConfig::default()).is_err());
}
