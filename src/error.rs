use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building a tree
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("{axis} of the minimum corner ({min}) must be finite and smaller than {axis} of the maximum corner ({max})")]
    Geometry { axis: char, min: f64, max: f64 },

    #[error("Density grid size must be at least 1, got {0}")]
    InvalidGridSize(usize),

    #[error("Convolution configuration error: {0}")]
    ConvolutionConfig(#[from] ConvolutionError),
}

/// Misconfiguration of a single convolution pass
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvolutionError {
    #[error("Convolution stride must be larger than 0")]
    InvalidStride,

    #[error("Convolution padding must be larger than 0")]
    InvalidPadding,

    #[error("Grid of {grid_rows}x{grid_cols} is smaller than the {kernel}x{kernel} kernel")]
    GridSmallerThanKernel {
        grid_rows: usize,
        grid_cols: usize,
        kernel: usize,
    },
}
