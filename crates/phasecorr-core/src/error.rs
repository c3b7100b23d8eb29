use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistrationError {
    #[error("Images must be the same shape: reference {reference:?} vs moving {moving:?}")]
    ShapeMismatch {
        reference: Vec<usize>,
        moving: Vec<usize>,
    },

    #[error("Mask shape {mask:?} does not match image shape {image:?}")]
    MaskShapeMismatch { image: Vec<usize>, mask: Vec<usize> },

    #[error("space argument must be \"real\" or \"fourier\", got {0:?}")]
    InvalidSpace(String),

    #[error("normalization must be either \"phase\" or \"none\", got {0:?}")]
    InvalidNormalization(String),

    #[error("return_error must be true, false or \"always\", got {0:?}")]
    InvalidReturnError(String),

    #[error("Number of {what} ({actual}) must equal the data's number of dimensions ({expected})")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Upsample factor must be finite and >= 1, got {0}")]
    InvalidUpsampleFactor(f64),

    #[error("Overlap ratio must lie in [0, 1], got {0}")]
    InvalidOverlapRatio(f64),

    #[error("Empty image")]
    EmptyImage,

    #[error(
        "NaN values or zero amplitude found in the correlation; remove NaNs from the input \
         data or register with reference/moving masks that exclude invalid pixels"
    )]
    DegenerateResult,

    #[error("Array shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image format error: {0}")]
    ImageError(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, RegistrationError>;
