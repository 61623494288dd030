//! Tree configuration.

use log::debug;

use crate::{
    convolution::Kernel,
    error::{Error, Result},
    shapes::Rect,
    P2,
};

/// Limits shared by both tree variants that decide whether and how far a node may split.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SplitLimits {
    /// Minimum width of any node produced by a split
    pub min_x_length: f64,
    /// Minimum height of any node produced by a split
    pub min_y_length: f64,
    /// A leaf splits once the total weight of its points exceeds this value
    pub max_points: u64,
    /// Nodes at this depth never split
    pub max_depth: usize,
}

impl SplitLimits {
    pub fn new(min_x_length: f64, min_y_length: f64, max_points: u64, max_depth: usize) -> Self {
        Self {
            min_x_length,
            min_y_length,
            max_points,
            max_depth,
        }
    }

    /// Whether a leaf covering `boundary` at `depth` and holding `weight` should split.
    ///
    /// Both halves of every axis must be able to hold the minimum length, the weight must
    /// exceed `max_points` and `max_depth` must not be reached yet.
    pub fn should_split(&self, boundary: &Rect, weight: u64, depth: usize) -> bool {
        let roomy = boundary.width() > 2.0 * self.min_x_length
            && boundary.height() > 2.0 * self.min_y_length;
        roomy && weight > self.max_points && depth < self.max_depth
    }

    /// Move `cut` so that every quadrant it produces keeps the minimum lengths.
    pub fn clamp_cut(&self, boundary: &Rect, cut: P2) -> P2 {
        let (start, end) = (boundary.start(), boundary.end());
        P2::new(
            clamp_axis(cut.x, start.x, end.x, self.min_x_length),
            clamp_axis(cut.y, start.y, end.y, self.min_y_length),
        )
    }
}

impl Default for SplitLimits {
    /// Unit minimum lengths, up to 10 weight per leaf and 8 levels below the root
    fn default() -> Self {
        Self::new(1.0, 1.0, 10, 8)
    }
}

fn clamp_axis(cut: f64, start: f64, end: f64, min_length: f64) -> f64 {
    let mut cut = cut;
    if cut - start < min_length {
        cut = start + min_length;
    }
    if end - cut < min_length {
        cut = end - min_length;
    }
    cut
}

/// Configuration of the adaptive [`ConvTree`](crate::ConvTree).
#[derive(Clone, Debug, PartialEq)]
pub struct ConvConfig {
    pub limits: SplitLimits,
    /// Side length of the density grid rasterized for each split
    pub grid_size: usize,
    pub kernel: Kernel,
    /// Number of convolution passes smoothing the density grid
    pub iterations: usize,
}

impl ConvConfig {
    pub fn new(limits: SplitLimits) -> Self {
        Self {
            limits,
            grid_size: 8,
            kernel: Kernel::default(),
            iterations: 1,
        }
    }

    pub fn with_grid_size(mut self, grid_size: usize) -> Self {
        self.grid_size = grid_size;
        self
    }

    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Use the kernel given by `rows`, or the default kernel if `rows` is not a
    /// non-empty square matrix.
    pub fn with_kernel(mut self, rows: &[Vec<f64>]) -> Self {
        self.kernel = Kernel::from_rows(rows).unwrap_or_else(|| {
            debug!("Invalid convolution kernel, falling back to the default kernel");
            Kernel::default()
        });
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.grid_size == 0 {
            return Err(Error::InvalidGridSize(self.grid_size));
        }
        Ok(())
    }
}

impl Default for ConvConfig {
    fn default() -> Self {
        Self::new(SplitLimits::default())
    }
}
