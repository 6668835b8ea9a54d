//! Zero-copy views of flat block data as faer matrices.
//!
//! Blocks are stored column-major, which is faer's native layout, so a block
//! slice can be viewed as a `MatRef`/`MatMut` without copying.

use faer::{MatMut, MatRef};

/// View `data` as an `nrows × ncols` column-major matrix.
///
/// # Panics
///
/// Panics if `nrows * ncols != data.len()`.
///
/// # Example
///
/// ```
/// use spinblock::backend::mat_ref;
///
/// let data = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
/// let m = mat_ref(&data, 2, 3);
/// assert_eq!(m[(1, 0)], 2.0);
/// assert_eq!(m[(0, 2)], 5.0);
/// ```
pub fn mat_ref(data: &[f64], nrows: usize, ncols: usize) -> MatRef<'_, f64> {
    assert_eq!(
        nrows * ncols,
        data.len(),
        "Matrix dimensions ({} x {} = {}) must match block size ({})",
        nrows,
        ncols,
        nrows * ncols,
        data.len()
    );
    MatRef::from_column_major_slice(data, nrows, ncols)
}

/// Mutable counterpart of [`mat_ref`].
///
/// # Panics
///
/// Panics if `nrows * ncols != data.len()`.
pub fn mat_mut(data: &mut [f64], nrows: usize, ncols: usize) -> MatMut<'_, f64> {
    assert_eq!(
        nrows * ncols,
        data.len(),
        "Matrix dimensions ({} x {} = {}) must match block size ({})",
        nrows,
        ncols,
        nrows * ncols,
        data.len()
    );
    MatMut::from_column_major_slice_mut(data, nrows, ncols)
}
