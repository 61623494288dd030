//! Density-aware quadtrees for weighted 2D points.
//!
//! Two partitioning strategies share the same recursive shape:
//!
//! - [`ConvTree`] rasterizes a cell's points into a density grid, smooths it with
//!   repeated convolution and cuts the cell along the low-density ring that surrounds
//!   the densest spot.
//! - [`QuadTree`] always cuts a cell at its geometric midpoint.
//!
//! ```
//! use convtree::{ConvConfig, ConvTree, Point, SplitLimits};
//! use nalgebra::point;
//!
//! let limits = SplitLimits::new(5.0, 5.0, 10, 3);
//! let mut tree = ConvTree::new(
//!     point![0.0, 0.0],
//!     point![100.0, 100.0],
//!     ConvConfig::new(limits),
//!     None,
//! )?;
//! assert!(tree.insert(Point::new(12.0, 40.0, 1), true));
//! assert_eq!(tree.points().len(), 1);
//! # Ok::<(), convtree::Error>(())
//! ```

pub mod config;
pub mod convolution;
pub mod convtree;
pub mod error;
pub mod grid;
pub mod point;
pub mod quadtree;
pub mod search;
pub mod shapes;
pub mod stats;
mod util;

pub use config::{ConvConfig, SplitLimits};
pub use convolution::Kernel;
pub use convtree::ConvTree;
pub use error::{ConvolutionError, Error, Result};
pub use point::Point;
pub use quadtree::QuadTree;
pub use shapes::Rect;
pub use stats::CellStats;

/// 2d position used throughout the crate
pub type P2 = nalgebra::Point2<f64>;
