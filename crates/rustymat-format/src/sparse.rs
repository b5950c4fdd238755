//! Conversion between coordinate triples and the column-compressed
//! (CSC) storage a sparse array record uses on disk.
//!
//! CSC stores one row index and one value per nonzero, ordered by
//! ascending column then ascending row, plus a column pointer array of
//! `ncols + 1` entries where `col_ptr[j]` counts the nonzeros in columns
//! before `j`.

use std::collections::BTreeMap;

use crate::error::FormatError;

/// One coordinate entry: `(row, column, real, imaginary)`. The imaginary
/// part is 0.0 for real matrices.
pub type Triplet = (usize, usize, f64, f64);

/// Column-compressed sparse storage.
#[derive(Debug, Clone, PartialEq)]
pub struct Csc {
    /// Row index of each stored nonzero, column-major ordered.
    pub row_idx: Vec<i32>,
    /// `ncols + 1` offsets into `row_idx`/`real`.
    pub col_ptr: Vec<i32>,
    /// Real part of each stored nonzero.
    pub real: Vec<f64>,
    /// Imaginary parts, present only for complex matrices.
    pub imag: Option<Vec<f64>>,
}

impl Csc {
    /// Number of stored nonzeros.
    pub fn nnz(&self) -> usize {
        self.col_ptr.last().map_or(0, |&n| n as usize)
    }
}

/// Build CSC storage from an unordered coordinate list.
///
/// Duplicate `(row, column)` pairs overwrite (last write wins), and
/// entries whose value is exactly zero after deduplication are dropped.
/// Coordinates outside the `nrows` × `ncols` extent are rejected.
pub fn to_csc(
    nrows: usize,
    ncols: usize,
    entries: &[Triplet],
    complex: bool,
) -> Result<Csc, FormatError> {
    // Keyed (column, row) so iteration yields the on-disk order; the
    // map replaces the original's hand-rolled sort and gives
    // last-write-wins overwrite in one step.
    let mut cells: BTreeMap<(usize, usize), (f64, f64)> = BTreeMap::new();
    for &(row, col, re, im) in entries {
        if row >= nrows {
            return Err(FormatError::IndexOutOfRange {
                index: row,
                len: nrows,
            });
        }
        if col >= ncols {
            return Err(FormatError::IndexOutOfRange {
                index: col,
                len: ncols,
            });
        }
        cells.insert((col, row), (re, im));
    }

    let mut row_idx = Vec::new();
    let mut real = Vec::new();
    let mut imag = Vec::new();
    let mut col_counts = vec![0i32; ncols];
    for (&(col, row), &(re, im)) in &cells {
        let is_zero = re == 0.0 && (!complex || im == 0.0);
        if is_zero {
            continue;
        }
        col_counts[col] += 1;
        row_idx.push(row as i32);
        real.push(re);
        imag.push(im);
    }

    let mut col_ptr = Vec::with_capacity(ncols + 1);
    let mut running = 0i32;
    col_ptr.push(0);
    for &c in &col_counts {
        running += c;
        col_ptr.push(running);
    }

    Ok(Csc {
        row_idx,
        col_ptr,
        real,
        imag: if complex { Some(imag) } else { None },
    })
}

/// Reconstruct coordinate triples from CSC storage.
///
/// Tolerates over-allocated storage (`row_idx`/`real` longer than the
/// stored nonzero count, as an `nzmax` larger than `nnz` produces) but
/// rejects pointers that run past the arrays or backwards.
pub fn from_csc(csc: &Csc) -> Result<Vec<Triplet>, FormatError> {
    let ncols = csc.col_ptr.len().saturating_sub(1);
    let mut out = Vec::with_capacity(csc.nnz());
    for j in 0..ncols {
        let start = csc.col_ptr[j];
        let end = csc.col_ptr[j + 1];
        if start < 0 || end < start {
            return Err(FormatError::IndexOutOfRange {
                index: end.unsigned_abs() as usize,
                len: csc.row_idx.len(),
            });
        }
        for k in start as usize..end as usize {
            if k >= csc.row_idx.len() || k >= csc.real.len() {
                return Err(FormatError::IndexOutOfRange {
                    index: k,
                    len: csc.row_idx.len().min(csc.real.len()),
                });
            }
            let im = csc.imag.as_ref().map_or(0.0, |v| v.get(k).copied().unwrap_or(0.0));
            out.push((csc.row_idx[k] as usize, j, csc.real[k], im));
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_reconstruction_vector() {
        // Five entries over a 5x4 matrix: rows [4,3,2,1,3], columns
        // [0,1,2,3,3].
        let entries = vec![
            (4, 0, 0.1, 0.0),
            (3, 1, 1.1, 0.0),
            (2, 2, 2.2, 0.0),
            (1, 3, 3.3, 0.0),
            (3, 3, 4.4, 0.0),
        ];
        let csc = to_csc(5, 4, &entries, false).unwrap();
        assert_eq!(csc.col_ptr, vec![0, 1, 2, 3, 5]);
        assert_eq!(csc.row_idx, vec![4, 3, 2, 1, 3]);
        assert_eq!(csc.real, vec![0.1, 1.1, 2.2, 3.3, 4.4]);
        assert_eq!(csc.nnz(), 5);

        let back = from_csc(&csc).unwrap();
        assert_eq!(back, entries);
    }

    #[test]
    fn rows_sorted_within_column() {
        let entries = vec![(3, 0, 1.0, 0.0), (0, 0, 2.0, 0.0), (1, 0, 3.0, 0.0)];
        let csc = to_csc(4, 1, &entries, false).unwrap();
        assert_eq!(csc.row_idx, vec![0, 1, 3]);
        assert_eq!(csc.real, vec![2.0, 3.0, 1.0]);
    }

    #[test]
    fn duplicate_coordinate_overwrites() {
        let entries = vec![(1, 1, 5.0, 0.0), (1, 1, 9.0, 0.0)];
        let csc = to_csc(2, 2, &entries, false).unwrap();
        assert_eq!(csc.nnz(), 1);
        assert_eq!(csc.real, vec![9.0]);
    }

    #[test]
    fn explicit_zero_dropped() {
        let entries = vec![(0, 0, 0.0, 0.0), (1, 1, 2.0, 0.0)];
        let csc = to_csc(2, 2, &entries, false).unwrap();
        assert_eq!(csc.nnz(), 1);
        assert_eq!(csc.row_idx, vec![1]);
    }

    #[test]
    fn zero_overwriting_nonzero_drops_the_entry() {
        let entries = vec![(0, 0, 7.0, 0.0), (0, 0, 0.0, 0.0)];
        let csc = to_csc(1, 1, &entries, false).unwrap();
        assert_eq!(csc.nnz(), 0);
        assert_eq!(csc.col_ptr, vec![0, 0]);
    }

    #[test]
    fn complex_zero_requires_both_parts_zero() {
        let entries = vec![(0, 0, 0.0, 1.0, ), (1, 1, 0.0, 0.0)];
        let csc = to_csc(2, 2, &entries, true).unwrap();
        assert_eq!(csc.nnz(), 1);
        assert_eq!(csc.imag, Some(vec![1.0]));
    }

    #[test]
    fn empty_column_spans_collapse() {
        let entries = vec![(0, 2, 1.0, 0.0)];
        let csc = to_csc(1, 4, &entries, false).unwrap();
        assert_eq!(csc.col_ptr, vec![0, 0, 0, 1, 1]);
    }

    #[test]
    fn out_of_range_coordinate_rejected() {
        assert_eq!(
            to_csc(2, 2, &[(2, 0, 1.0, 0.0)], false).unwrap_err(),
            FormatError::IndexOutOfRange { index: 2, len: 2 }
        );
        assert_eq!(
            to_csc(2, 2, &[(0, 5, 1.0, 0.0)], false).unwrap_err(),
            FormatError::IndexOutOfRange { index: 5, len: 2 }
        );
    }

    #[test]
    fn overallocated_nzmax_tolerated_on_read() {
        // Storage arrays longer than nnz, as MATLAB's nzmax padding
        // produces; pointers only reach the first two slots.
        let csc = Csc {
            row_idx: vec![0, 1, 0, 0],
            col_ptr: vec![0, 2, 2],
            real: vec![1.0, 2.0, 0.0, 0.0],
            imag: None,
        };
        let back = from_csc(&csc).unwrap();
        assert_eq!(back, vec![(0, 0, 1.0, 0.0), (1, 0, 2.0, 0.0)]);
    }

    #[test]
    fn backwards_col_ptr_rejected() {
        let csc = Csc {
            row_idx: vec![0],
            col_ptr: vec![1, 0],
            real: vec![1.0],
            imag: None,
        };
        assert!(from_csc(&csc).is_err());
    }

    #[test]
    fn col_ptr_past_arrays_rejected() {
        let csc = Csc {
            row_idx: vec![0],
            col_ptr: vec![0, 3],
            real: vec![1.0],
            imag: None,
        };
        assert!(matches!(
            from_csc(&csc),
            Err(FormatError::IndexOutOfRange { .. })
        ));
    }
}
