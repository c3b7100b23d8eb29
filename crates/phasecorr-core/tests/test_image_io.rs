use ndarray::Array2;

use phasecorr_core::io::image_io::{load_image, load_mask, save_image};

#[test]
fn test_tiff_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ramp.tiff");
    let data = Array2::from_shape_fn((12, 20), |(r, c)| (r * 20 + c) as f32 / 239.0);

    save_image(&data, &path).unwrap();
    let loaded = load_image(&path).unwrap();

    assert_eq!(loaded.dim(), (12, 20));
    for (a, b) in data.iter().zip(loaded.iter()) {
        assert!((a - b).abs() < 1e-4);
    }
}

#[test]
fn test_png_round_trip_and_mask() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mask.png");
    let data = Array2::from_shape_fn((8, 8), |(r, c)| if r < 4 && c > 2 { 1.0 } else { 0.0 });

    save_image(&data, &path).unwrap();
    let mask = load_mask(&path).unwrap();

    assert_eq!(mask.dim(), (8, 8));
    for ((r, c), &valid) in mask.indexed_iter() {
        assert_eq!(valid, r < 4 && c > 2);
    }
}

#[test]
fn test_missing_file_is_an_error() {
    assert!(load_image(std::path::Path::new("/nonexistent/frame.png")).is_err());
}
