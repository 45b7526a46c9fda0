//! Owned n-dimensional numeric arrays.
//!
//! [`Array`] stores its elements in a flat, row-major buffer alongside an explicit
//! shape. The crate only ever needs vectors and `N x M` matrices, but the
//! shape is kept general so that validators can report the *actual* rank of
//! whatever the caller passed in.

use serde::Serialize;

/// A row-major array with an explicit shape.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Array<T> {
    shape: Vec<usize>,
    data: Vec<T>,
}

impl<T> Array<T> {
    /// Caller guarantees `data.len() == product(shape)`.
    pub(crate) fn from_parts(shape: Vec<usize>, data: Vec<T>) -> Self {
        debug_assert_eq!(shape.iter().product::<usize>(), data.len());
        Self { shape, data }
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Number of dimensions.
    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// Total number of elements.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The elements in row-major order.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Returns row `i` of a rank-2 array.
    pub fn row(&self, i: usize) -> Option<&[T]> {
        match self.shape[..] {
            [rows, cols] if i < rows => Some(&self.data[i * cols..(i + 1) * cols]),
            _ => None,
        }
    }

    /// Iterates over the rows of a rank-2 array.
    ///
    /// Yields nothing for arrays of any other rank.
    pub fn rows(&self) -> impl Iterator<Item = &[T]> {
        let (rows, cols) = match self.shape[..] {
            [rows, cols] => (rows, cols),
            _ => (0, 0),
        };
        (0..rows).map(move |i| &self.data[i * cols..(i + 1) * cols])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_vector() {
        let a: Array<f64> = Array::from_parts(vec![0], Vec::new());
        assert_eq!(a.shape(), &[0]);
        assert_eq!(a.rank(), 1);
        assert!(a.is_empty());
    }

    #[test]
    fn row_major_rows() {
        let a = Array::from_parts(vec![2, 3], vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(a.rank(), 2);
        assert_eq!(a.len(), 6);
        assert_eq!(a.row(0), Some(&[1, 2, 3][..]));
        assert_eq!(a.row(1), Some(&[4, 5, 6][..]));
        assert_eq!(a.row(2), None);

        let rows: Vec<&[i32]> = a.rows().collect();
        assert_eq!(rows, vec![&[1, 2, 3][..], &[4, 5, 6][..]]);
    }

    #[test]
    fn rows_of_vector_is_empty() {
        let a = Array::from_parts(vec![2], vec![1.0, 2.0]);
        assert_eq!(a.rows().count(), 0);
        assert_eq!(a.row(0), None);
    }
}
