use crate::error::PivotError;

/// Default tolerance for floating point comparisons
pub const EPSILON: f64 = 1e-9;

/// Dense row-major matrix of `f64`
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Build a matrix from row vectors. All rows must have the same length.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Self {
        let n_rows = rows.len();
        let n_cols = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(n_rows * n_cols);
        for row in rows {
            assert_eq!(row.len(), n_cols, "ragged rows");
            data.extend(row);
        }
        Self {
            rows: n_rows,
            cols: n_cols,
            data,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.cols + col]
    }

    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.data[row * self.cols + col] = value;
    }

    pub fn row(&self, row: usize) -> &[f64] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    pub fn row_mut(&mut self, row: usize) -> &mut [f64] {
        &mut self.data[row * self.cols..(row + 1) * self.cols]
    }

    /// Column `col` as an owned vector
    pub fn column(&self, col: usize) -> Vec<f64> {
        (0..self.rows).map(|i| self.get(i, col)).collect()
    }

    /// `target += factor * source`, row-wise
    pub fn add_scaled_row(&mut self, target: usize, source: usize, factor: f64) {
        if factor == 0.0 || target == source {
            return;
        }
        let cols = self.cols;
        let (src_start, dst_start) = (source * cols, target * cols);
        for j in 0..cols {
            let v = self.data[src_start + j];
            self.data[dst_start + j] += factor * v;
        }
    }

    pub fn scale_row(&mut self, row: usize, factor: f64) {
        for v in self.row_mut(row) {
            *v *= factor;
        }
    }

    /// Gauss-Jordan pivot on `(row, col)`.
    ///
    /// Scales `row` so that the pivot entry becomes exactly 1 and eliminates
    /// `col` from every other row. The matrix is left untouched on error.
    pub fn pivot(&mut self, row: usize, col: usize, tolerance: f64) -> Result<(), PivotError> {
        if row >= self.rows || col >= self.cols {
            return Err(PivotError::OutOfBounds { row, col });
        }
        let value = self.get(row, col);
        if !value.is_finite() || value.abs() < tolerance {
            return Err(PivotError::NumericDegeneracy { row, col, value });
        }

        self.scale_row(row, 1.0 / value);
        self.set(row, col, 1.0);

        for i in 0..self.rows {
            if i == row {
                continue;
            }
            let factor = self.get(i, col);
            if factor != 0.0 {
                self.add_scaled_row(i, row, -factor);
                // exact zero in the eliminated column
                self.set(i, col, 0.0);
            }
        }
        Ok(())
    }
}

/// Dot product of two equal-length slices
pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
