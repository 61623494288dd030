//! Split-point search over a smoothed density grid.
//!
//! Starting at the densest cell, square rings of growing radius are scanned for cells
//! that stay above a threshold. The threshold starts at 80% of the peak and decays to
//! 80% of the mean of the qualifying values of each ring, so the search follows the
//! density slope down until a ring holds nothing dense enough. The last qualifying ring
//! edges, pushed one cell further out, become the cut line.

use log::trace;
use nalgebra::DMatrix;

use crate::util::mean;

const THRESHOLD: f64 = 0.8;

/// Find the grid indices at which to cut.
///
/// The result may lie outside the grid (or on its border) when no usable valley was
/// found; [`cut_indices`] turns such results into the grid midpoint.
pub fn split_point(grid: &DMatrix<f64>) -> (isize, isize) {
    let (rows, cols) = grid.shape();
    let (rows, cols) = (rows as isize, cols as isize);
    let value = |x: isize, y: isize| grid[(x as usize, y as usize)];

    let (mut max_x, mut max_y, mut max_value) = (0, 0, 0.0);
    for x in 0..rows {
        for y in 0..cols {
            if value(x, y) > max_value {
                max_value = value(x, y);
                (max_x, max_y) = (x, y);
            }
        }
    }

    let mut split_value = max_value * THRESHOLD;
    let (mut split_x, mut split_y) = (0, 0);
    let mut counter = 1;
    loop {
        let mut found = false;
        let mut values = Vec::new();
        let (mut ring_x, mut ring_y) = (None, None);
        let (left, right) = (max_x - counter, max_x + counter);
        let (top, bottom) = (max_y - counter, max_y + counter);

        for x in [left, right] {
            if x < 0 || x >= rows {
                continue;
            }
            for y in top.max(0)..=bottom.min(cols - 1) {
                if value(x, y) > split_value {
                    found = true;
                    values.push(value(x, y));
                    ring_x = Some(farther_from_center(ring_x, x, rows));
                }
            }
        }
        for y in [top, bottom] {
            if y < 0 || y >= cols {
                continue;
            }
            for x in left.max(0)..=right.min(rows - 1) {
                if value(x, y) > split_value {
                    found = true;
                    ring_y = Some(farther_from_center(ring_y, y, cols));
                    // corners were already collected by the column scan
                    if x != left && x != right {
                        values.push(value(x, y));
                    }
                }
            }
        }

        if !found {
            break;
        }
        if let Some(x) = ring_x.filter(|&x| x != 0) {
            split_x = x;
        }
        if let Some(y) = ring_y.filter(|&y| y != 0) {
            split_y = y;
        }
        if !values.is_empty() {
            split_value = mean(&values) * THRESHOLD;
        }
        trace!("ring {counter}: split ({split_x}, {split_y}), threshold {split_value:.4}");
        counter += 1;
    }

    split_x += if split_x > max_x { 1 } else { -1 };
    split_y += if split_y > max_y { 1 } else { -1 };
    (split_x, split_y)
}

/// Of two ring edges on the same axis keep the one farther from the grid center.
fn farther_from_center(current: Option<isize>, candidate: isize, len: isize) -> isize {
    match current {
        Some(current) if (current - len / 2).abs() >= (candidate - len / 2).abs() => current,
        _ => candidate,
    }
}

/// Run [`split_point`] and fall back to the grid midpoint on every axis whose index is
/// not strictly inside the grid.
pub fn cut_indices(grid: &DMatrix<f64>) -> (usize, usize) {
    let (split_x, split_y) = split_point(grid);
    (
        inner_or_midpoint(split_x, grid.nrows()),
        inner_or_midpoint(split_y, grid.ncols()),
    )
}

fn inner_or_midpoint(index: isize, len: usize) -> usize {
    match usize::try_from(index) {
        Ok(index) if index >= 1 && index + 1 < len => index,
        _ => len / 2,
    }
}
