//! Square-kernel convolution used to smooth density grids.

use nalgebra::DMatrix;

use crate::error::{ConvolutionError, Result};

/// A square convolution kernel.
#[derive(Clone, Debug, PartialEq)]
pub struct Kernel(DMatrix<f64>);

impl Kernel {
    /// Build a kernel from rows.
    ///
    /// **Returns** `None` when the rows are empty, ragged, or do not form a square.
    pub fn from_rows(rows: &[Vec<f64>]) -> Option<Self> {
        let size = rows.len();
        if size == 0 || rows.iter().any(|row| row.len() != size) {
            return None;
        }
        Some(Self(DMatrix::from_fn(size, size, |i, j| rows[i][j])))
    }

    /// Side length of the kernel
    pub fn size(&self) -> usize {
        self.0.nrows()
    }

    pub fn matrix(&self) -> &DMatrix<f64> {
        &self.0
    }
}

impl Default for Kernel {
    /// 3x3 smoothing kernel weighting the center twice as much as its neighbours
    fn default() -> Self {
        Self(DMatrix::from_row_slice(
            3,
            3,
            &[0.5, 0.5, 0.5, 0.5, 1.0, 0.5, 0.5, 0.5, 0.5],
        ))
    }
}

/// Convolve `grid` with `kernel`.
///
/// The grid is zero-padded by `padding` cells on every side before the kernel slides
/// over it with the given `stride`. Each output axis has
/// `(len - kernel + 2 * padding) / stride + 1` cells.
pub fn convolve(
    grid: &DMatrix<f64>,
    kernel: &Kernel,
    stride: usize,
    padding: usize,
) -> Result<DMatrix<f64>> {
    if stride < 1 {
        return Err(ConvolutionError::InvalidStride.into());
    }
    if padding < 1 {
        return Err(ConvolutionError::InvalidPadding.into());
    }
    let size = kernel.size();
    let (rows, cols) = grid.shape();
    if rows < size || cols < size {
        return Err(ConvolutionError::GridSmallerThanKernel {
            grid_rows: rows,
            grid_cols: cols,
            kernel: size,
        }
        .into());
    }

    let mut padded = DMatrix::<f64>::zeros(rows + 2 * padding, cols + 2 * padding);
    padded
        .view_mut((padding, padding), (rows, cols))
        .copy_from(grid);

    let out_rows = (rows - size + 2 * padding) / stride + 1;
    let out_cols = (cols - size + 2 * padding) / stride + 1;
    let weights = kernel.matrix();

    Ok(DMatrix::from_fn(out_rows, out_cols, |i, j| {
        let mut total = 0.0;
        for x in 0..size {
            for y in 0..size {
                let (px, py) = (stride * i + x, stride * j + y);
                if px < padded.nrows() && py < padded.ncols() {
                    total += padded[(px, py)] * weights[(x, y)];
                }
            }
        }
        total
    }))
}

#[cfg(test)]
mod tests {
    use nalgebra::DMatrix;

    use super::*;
    use crate::error::Error;

    #[test]
    fn kernel_rejects_invalid_shapes() {
        assert!(Kernel::from_rows(&[]).is_none(), "Empty kernel is invalid");
        assert!(
            Kernel::from_rows(&[vec![1.0, 1.0], vec![1.0]]).is_none(),
            "Ragged kernel is invalid"
        );
        assert!(
            Kernel::from_rows(&[vec![1.0, 1.0, 1.0], vec![1.0, 1.0, 1.0]]).is_none(),
            "Non-square kernel is invalid"
        );
        let kernel = Kernel::from_rows(&[vec![0.0, 1.0], vec![2.0, 3.0]]).unwrap();
        assert_eq!(kernel.size(), 2);
        assert_eq!(kernel.matrix()[(1, 0)], 2.0);
    }

    #[test]
    fn default_kernel_weights() {
        let kernel = Kernel::default();
        assert_eq!(kernel.size(), 3);
        assert_eq!(kernel.matrix()[(1, 1)], 1.0);
        assert_eq!(kernel.matrix()[(0, 2)], 0.5);
    }

    #[test]
    fn config_errors_are_reported() {
        let grid = DMatrix::from_element(4, 4, 1.0);
        let kernel = Kernel::default();
        assert_eq!(
            convolve(&grid, &kernel, 0, 1),
            Err(Error::ConvolutionConfig(ConvolutionError::InvalidStride))
        );
        assert_eq!(
            convolve(&grid, &kernel, 1, 0),
            Err(Error::ConvolutionConfig(ConvolutionError::InvalidPadding))
        );
        let small = DMatrix::from_element(2, 4, 1.0);
        assert_eq!(
            convolve(&small, &kernel, 1, 1),
            Err(Error::ConvolutionConfig(
                ConvolutionError::GridSmallerThanKernel {
                    grid_rows: 2,
                    grid_cols: 4,
                    kernel: 3
                }
            ))
        );
    }

    #[test]
    fn three_by_three_kernel_preserves_dimensions() {
        let grid = DMatrix::from_fn(6, 6, |i, j| (i * j) as f64);
        let out = convolve(&grid, &Kernel::default(), 1, 1).unwrap();
        assert_eq!(out.shape(), (6, 6), "Padding 1 with a 3x3 kernel keeps the grid size");

        let big = Kernel::from_rows(&vec![vec![1.0; 5]; 5]).unwrap();
        let out = convolve(&grid, &big, 1, 1).unwrap();
        assert_eq!(out.shape(), (4, 4), "(6 - 5 + 2) / 1 + 1 = 4");
    }

    #[test]
    fn zero_grid_stays_zero() {
        let grid = DMatrix::<f64>::zeros(5, 5);
        let out = convolve(&grid, &Kernel::default(), 1, 1).unwrap();
        assert!(out.iter().all(|&v| v == 0.0), "All-zero grid should stay all-zero");
    }

    #[test]
    fn single_peak_spreads_to_neighbours() {
        let mut grid = DMatrix::<f64>::zeros(5, 5);
        grid[(2, 2)] = 1.0;
        let out = convolve(&grid, &Kernel::default(), 1, 1).unwrap();

        assert_eq!(out[(2, 2)], 1.0, "Center keeps the kernel's center weight");
        assert_eq!(out[(1, 1)], 0.5, "Diagonal neighbour gets the corner weight");
        assert_eq!(out[(2, 3)], 0.5, "Side neighbour gets the edge weight");
        assert_eq!(out[(0, 0)], 0.0, "Cells outside the kernel footprint stay zero");
    }

    #[test]
    fn border_uses_zero_padding() {
        let grid = DMatrix::from_element(3, 3, 1.0);
        let out = convolve(&grid, &Kernel::default(), 1, 1).unwrap();
        // corner sees itself (1.0) plus three 0.5 neighbours
        assert_eq!(out[(0, 0)], 2.5);
        // center sees the whole kernel
        assert_eq!(out[(1, 1)], 5.0);
    }
}
