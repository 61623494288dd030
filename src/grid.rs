//! Density grids: a rasterized weight map of a cell's points.

use log::warn;
use nalgebra::DMatrix;

use crate::{
    convolution::{convolve, Kernel},
    point::Point,
    shapes::Rect,
};

const STRIDE: usize = 1;
const PADDING: usize = 1;

/// Rasterize `points` into a `size x size` grid over `boundary`.
///
/// Row `i` covers the `i`-th slice of the x axis and column `j` the `j`-th slice of the
/// y axis. Every point lands in exactly one cell: the lower edge of a cell is inclusive,
/// the upper edge exclusive, except for the last cell on each axis which also takes the
/// points lying on the boundary's far edge. Points outside `boundary` are ignored.
pub fn rasterize(points: &[Point], boundary: &Rect, size: usize) -> DMatrix<f64> {
    let mut grid = DMatrix::<f64>::zeros(size, size);
    if size == 0 {
        return grid;
    }

    let x_step = boundary.width() / size as f64;
    let y_step = boundary.height() / size as f64;
    for point in points {
        let position = point.position();
        if !boundary.contains(&position) {
            continue;
        }
        let i = cell_index(position.x - boundary.start().x, x_step, size);
        let j = cell_index(position.y - boundary.start().y, y_step, size);
        grid[(i, j)] += f64::from(point.weight());
    }
    grid
}

fn cell_index(offset: f64, step: f64, size: usize) -> usize {
    let index = (offset / step).floor();
    if index.is_nan() || index < 0.0 {
        0
    } else {
        (index as usize).min(size - 1)
    }
}

/// Scale the grid so that its maximum becomes 1.
///
/// A grid without any positive value is returned unchanged.
pub fn normalize(mut grid: DMatrix<f64>) -> DMatrix<f64> {
    let max = grid.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max > 0.0 {
        grid /= max;
    }
    grid
}

/// Run `iterations` convolution passes over an already normalized grid, renormalizing
/// after every pass.
///
/// A misconfigured pass stops the smoothing and the last successfully produced grid is
/// returned.
pub fn smooth(grid: DMatrix<f64>, kernel: &Kernel, iterations: usize) -> DMatrix<f64> {
    let mut smoothed = grid;
    for pass in 0..iterations {
        match convolve(&smoothed, kernel, STRIDE, PADDING) {
            Ok(next) => smoothed = normalize(next),
            Err(err) => {
                warn!("Stopping density smoothing at pass {pass}: {err}");
                break;
            }
        }
    }
    smoothed
}
