//! The in-memory array model: one [`Matrix`] per MATLAB value, of any
//! class, with builders for the container variants and side-effect-free
//! typed accessors.

use crate::error::{FieldNameWarning, FormatError};
use crate::numeric::NumericData;
use crate::sparse::{to_csc, Csc, Triplet};
use crate::subelement::{validate_field_name, ArrayFlags, MatClass};

/// One MATLAB value: flags, dimensions, name, and a class-specific
/// payload. Cell and struct variants own their children exclusively
/// (a tree, never a graph).
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    /// Variable name. Children of containers conventionally carry an
    /// empty name; the on-disk form never persists inner names.
    pub name: String,
    /// Array extents, at least two entries.
    pub dims: Vec<i32>,
    /// The flags sub-element (class, complex/global/logical, nzmax).
    pub flags: ArrayFlags,
    /// The class-specific payload.
    pub data: MatrixData,
}

/// Class-specific payload of a [`Matrix`].
#[derive(Debug, Clone, PartialEq)]
pub enum MatrixData {
    /// Placeholder decoded from a zero-length element; also what unset
    /// cells of a cell array hold.
    Empty,
    /// Any of the ten numeric classes, with an imaginary buffer when
    /// the complex flag is set.
    Numeric {
        real: NumericData,
        imag: Option<NumericData>,
    },
    /// Character data, kept as a string of storage-order code units.
    Char { text: String },
    /// Column-major grid of child values, one per grid slot.
    Cell { grid: Vec<Matrix> },
    /// Insertion-ordered named fields.
    Struct { fields: Vec<(String, Matrix)> },
    /// Column-compressed sparse payload.
    Sparse(Csc),
}

impl Matrix {
    /// The 0-by-0 empty placeholder.
    pub fn empty(name: &str) -> Matrix {
        Matrix {
            name: name.to_string(),
            dims: vec![0, 0],
            flags: ArrayFlags::new(MatClass::Double),
            data: MatrixData::Empty,
        }
    }

    /// A double matrix from column-major values.
    pub fn from_f64(
        name: &str,
        rows: usize,
        cols: usize,
        values: Vec<f64>,
    ) -> Result<Matrix, FormatError> {
        if rows * cols != values.len() {
            return Err(FormatError::DimensionMismatch {
                expected: rows * cols,
                actual: values.len(),
            });
        }
        Ok(Matrix {
            name: name.to_string(),
            dims: vec![rows as i32, cols as i32],
            flags: ArrayFlags::new(MatClass::Double),
            data: MatrixData::Numeric {
                real: NumericData::Double(values),
                imag: None,
            },
        })
    }

    /// A complex double matrix from column-major real/imaginary parts.
    pub fn from_f64_complex(
        name: &str,
        rows: usize,
        cols: usize,
        real: Vec<f64>,
        imag: Vec<f64>,
    ) -> Result<Matrix, FormatError> {
        if real.len() != imag.len() {
            return Err(FormatError::DimensionMismatch {
                expected: real.len(),
                actual: imag.len(),
            });
        }
        let mut m = Matrix::from_f64(name, rows, cols, real)?;
        m.flags.complex = true;
        if let MatrixData::Numeric { imag: slot, .. } = &mut m.data {
            *slot = Some(NumericData::Double(imag));
        }
        Ok(m)
    }

    /// A 1-by-1 double.
    pub fn scalar(name: &str, value: f64) -> Matrix {
        Matrix {
            name: name.to_string(),
            dims: vec![1, 1],
            flags: ArrayFlags::new(MatClass::Double),
            data: MatrixData::Numeric {
                real: NumericData::Double(vec![value]),
                imag: None,
            },
        }
    }

    /// A numeric matrix whose class follows the buffer's storage type.
    pub fn from_numeric(
        name: &str,
        rows: usize,
        cols: usize,
        data: NumericData,
    ) -> Result<Matrix, FormatError> {
        if rows * cols != data.len() {
            return Err(FormatError::DimensionMismatch {
                expected: rows * cols,
                actual: data.len(),
            });
        }
        let mut flags = ArrayFlags::new(class_for_buffer(&data));
        flags.logical = matches!(data, NumericData::Bool(_));
        Ok(Matrix {
            name: name.to_string(),
            dims: vec![rows as i32, cols as i32],
            flags,
            data: MatrixData::Numeric {
                real: data,
                imag: None,
            },
        })
    }

    /// A logical matrix (class `uint8` with the logical flag).
    pub fn logical(
        name: &str,
        rows: usize,
        cols: usize,
        values: Vec<bool>,
    ) -> Result<Matrix, FormatError> {
        Matrix::from_numeric(name, rows, cols, NumericData::Bool(values))
    }

    /// A 1-by-n character row vector.
    pub fn char_row(name: &str, text: &str) -> Matrix {
        let units = text.encode_utf16().count();
        Matrix {
            name: name.to_string(),
            dims: vec![1, units as i32],
            flags: ArrayFlags::new(MatClass::Char),
            data: MatrixData::Char {
                text: text.to_string(),
            },
        }
    }

    /// A sparse matrix from prebuilt CSC storage.
    pub fn sparse_from_csc(
        name: &str,
        rows: usize,
        cols: usize,
        csc: Csc,
    ) -> Result<Matrix, FormatError> {
        if csc.col_ptr.len() != cols + 1 {
            return Err(FormatError::DimensionMismatch {
                expected: cols + 1,
                actual: csc.col_ptr.len(),
            });
        }
        let mut flags = ArrayFlags::sparse(csc.nnz() as u32);
        flags.complex = csc.imag.is_some();
        Ok(Matrix {
            name: name.to_string(),
            dims: vec![rows as i32, cols as i32],
            flags,
            data: MatrixData::Sparse(csc),
        })
    }

    /// The array class.
    pub fn class(&self) -> MatClass {
        self.flags.class
    }

    /// Total element count implied by the dimensions.
    pub fn num_elements(&self) -> usize {
        self.dims.iter().map(|&d| d as usize).product()
    }

    /// Row extent (first dimension).
    pub fn rows(&self) -> usize {
        self.dims.first().copied().unwrap_or(0) as usize
    }

    /// Column extent (second dimension).
    pub fn cols(&self) -> usize {
        self.dims.get(1).copied().unwrap_or(0) as usize
    }

    fn variant_name(&self) -> &'static str {
        match &self.data {
            MatrixData::Empty => "empty",
            MatrixData::Numeric { .. } => self.flags.class.name(),
            MatrixData::Char { .. } => "char",
            MatrixData::Cell { .. } => "cell",
            MatrixData::Struct { .. } => "struct",
            MatrixData::Sparse(_) => "sparse",
        }
    }

    /// The real payload widened to `f64`. Fails with `ClassMismatch`
    /// for non-numeric variants.
    pub fn to_f64_vec(&self) -> Result<Vec<f64>, FormatError> {
        match &self.data {
            MatrixData::Numeric { real, .. } => Ok(real.to_f64()),
            _ => Err(FormatError::ClassMismatch {
                expected: "numeric",
                actual: self.variant_name(),
            }),
        }
    }

    /// The imaginary payload widened to `f64`, if the array is complex.
    pub fn imag_f64_vec(&self) -> Result<Option<Vec<f64>>, FormatError> {
        match &self.data {
            MatrixData::Numeric { imag, .. } => Ok(imag.as_ref().map(|b| b.to_f64())),
            _ => Err(FormatError::ClassMismatch {
                expected: "numeric",
                actual: self.variant_name(),
            }),
        }
    }

    /// The real payload as `i32`, refusing lossy storage types.
    pub fn to_i32_vec(&self) -> Result<Vec<i32>, FormatError> {
        match &self.data {
            MatrixData::Numeric { real, .. } => real.to_i32(),
            _ => Err(FormatError::ClassMismatch {
                expected: "numeric",
                actual: self.variant_name(),
            }),
        }
    }

    /// One numeric element at `(row, col)`, widened to `f64`. Only
    /// defined for two-dimensional arrays.
    pub fn f64_at(&self, row: usize, col: usize) -> Result<f64, FormatError> {
        if self.dims.len() != 2 {
            return Err(FormatError::DimensionMismatch {
                expected: 2,
                actual: self.dims.len(),
            });
        }
        let (rows, cols) = (self.rows(), self.cols());
        if row >= rows {
            return Err(FormatError::IndexOutOfRange {
                index: row,
                len: rows,
            });
        }
        if col >= cols {
            return Err(FormatError::IndexOutOfRange {
                index: col,
                len: cols,
            });
        }
        self.f64_linear(col * rows + row)
    }

    /// One numeric element by column-major linear index, widened to `f64`.
    pub fn f64_linear(&self, index: usize) -> Result<f64, FormatError> {
        match &self.data {
            MatrixData::Numeric { real, .. } => {
                real.get_f64(index).ok_or(FormatError::IndexOutOfRange {
                    index,
                    len: real.len(),
                })
            }
            _ => Err(FormatError::ClassMismatch {
                expected: "numeric",
                actual: self.variant_name(),
            }),
        }
    }

    /// The character payload.
    pub fn text(&self) -> Result<&str, FormatError> {
        match &self.data {
            MatrixData::Char { text } => Ok(text),
            _ => Err(FormatError::ClassMismatch {
                expected: "char",
                actual: self.variant_name(),
            }),
        }
    }

    /// The sparse payload.
    pub fn csc(&self) -> Result<&Csc, FormatError> {
        match &self.data {
            MatrixData::Sparse(csc) => Ok(csc),
            _ => Err(FormatError::ClassMismatch {
                expected: "sparse",
                actual: self.variant_name(),
            }),
        }
    }

    /// Child of a cell array at `(row, col)`. Only defined for
    /// two-dimensional cells; higher-rank grids need [`Matrix::cell_linear`].
    pub fn cell_at(&self, row: usize, col: usize) -> Result<&Matrix, FormatError> {
        let grid = match &self.data {
            MatrixData::Cell { grid } => grid,
            _ => {
                return Err(FormatError::ClassMismatch {
                    expected: "cell",
                    actual: self.variant_name(),
                })
            }
        };
        if self.dims.len() != 2 {
            return Err(FormatError::DimensionMismatch {
                expected: 2,
                actual: self.dims.len(),
            });
        }
        let (rows, cols) = (self.rows(), self.cols());
        if row >= rows {
            return Err(FormatError::IndexOutOfRange {
                index: row,
                len: rows,
            });
        }
        if col >= cols {
            return Err(FormatError::IndexOutOfRange {
                index: col,
                len: cols,
            });
        }
        let index = col * rows + row;
        grid.get(index).ok_or(FormatError::IndexOutOfRange {
            index,
            len: grid.len(),
        })
    }

    /// Child of a cell array by column-major linear index.
    pub fn cell_linear(&self, index: usize) -> Result<&Matrix, FormatError> {
        let grid = match &self.data {
            MatrixData::Cell { grid } => grid,
            _ => {
                return Err(FormatError::ClassMismatch {
                    expected: "cell",
                    actual: self.variant_name(),
                })
            }
        };
        grid.get(index).ok_or(FormatError::IndexOutOfRange {
            index,
            len: grid.len(),
        })
    }

    /// Struct field by name.
    pub fn field(&self, name: &str) -> Option<&Matrix> {
        match &self.data {
            MatrixData::Struct { fields } => {
                fields.iter().find(|(n, _)| n == name).map(|(_, m)| m)
            }
            _ => None,
        }
    }

    /// Struct field names in insertion order.
    pub fn field_names(&self) -> Vec<&str> {
        match &self.data {
            MatrixData::Struct { fields } => fields.iter().map(|(n, _)| n.as_str()).collect(),
            _ => Vec::new(),
        }
    }
}

fn class_for_buffer(data: &NumericData) -> MatClass {
    match data {
        NumericData::Int8(_) => MatClass::Int8,
        NumericData::UInt8(_) | NumericData::Bool(_) => MatClass::UInt8,
        NumericData::Int16(_) => MatClass::Int16,
        NumericData::UInt16(_) => MatClass::UInt16,
        NumericData::Int32(_) => MatClass::Int32,
        NumericData::UInt32(_) => MatClass::UInt32,
        NumericData::Int64(_) => MatClass::Int64,
        NumericData::UInt64(_) => MatClass::UInt64,
        NumericData::Single(_) => MatClass::Single,
        NumericData::Double(_) => MatClass::Double,
    }
}

/// Incrementally builds a cell array over a dense grid.
///
/// The backing grid is allocated up front with every slot set to the
/// Empty placeholder, so the grid is fully populated after every
/// insertion and size queries always agree with a subsequent encode.
#[derive(Debug)]
pub struct CellBuilder {
    rows: usize,
    cols: usize,
    grid: Vec<Matrix>,
}

impl CellBuilder {
    /// A `rows` × `cols` grid, every slot Empty.
    pub fn new(rows: usize, cols: usize) -> CellBuilder {
        CellBuilder {
            rows,
            cols,
            grid: (0..rows * cols).map(|_| Matrix::empty("")).collect(),
        }
    }

    /// Place `value` at `(row, col)`, replacing whatever was there.
    pub fn set(&mut self, row: usize, col: usize, value: Matrix) -> Result<(), FormatError> {
        if row >= self.rows {
            return Err(FormatError::IndexOutOfRange {
                index: row,
                len: self.rows,
            });
        }
        if col >= self.cols {
            return Err(FormatError::IndexOutOfRange {
                index: col,
                len: self.cols,
            });
        }
        self.grid[col * self.rows + row] = value;
        Ok(())
    }

    /// Finish into a cell [`Matrix`].
    pub fn build(self, name: &str) -> Matrix {
        Matrix {
            name: name.to_string(),
            dims: vec![self.rows as i32, self.cols as i32],
            flags: ArrayFlags::new(MatClass::Cell),
            data: MatrixData::Cell { grid: self.grid },
        }
    }
}

/// Accumulates coordinate entries for a sparse matrix.
///
/// Entries may arrive in any order; duplicates overwrite (last write
/// wins) and exact zeros are dropped when [`SparseBuilder::build`] runs
/// the column-compression transform. Inserting a single imaginary part
/// makes the whole matrix complex.
#[derive(Debug)]
pub struct SparseBuilder {
    rows: usize,
    cols: usize,
    complex: bool,
    entries: Vec<Triplet>,
}

impl SparseBuilder {
    /// An empty `rows` × `cols` sparse matrix.
    pub fn new(rows: usize, cols: usize) -> SparseBuilder {
        SparseBuilder {
            rows,
            cols,
            complex: false,
            entries: Vec::new(),
        }
    }

    /// Record `value` at `(row, col)`. Coordinates are validated when
    /// the builder is finished.
    pub fn insert(&mut self, row: usize, col: usize, value: f64) {
        self.entries.push((row, col, value, 0.0));
    }

    /// Record a complex value at `(row, col)`.
    pub fn insert_complex(&mut self, row: usize, col: usize, real: f64, imag: f64) {
        self.complex = true;
        self.entries.push((row, col, real, imag));
    }

    /// Finish into a sparse [`Matrix`], running the CSC transform.
    pub fn build(self, name: &str) -> Result<Matrix, FormatError> {
        let csc = to_csc(self.rows, self.cols, &self.entries, self.complex)?;
        Matrix::sparse_from_csc(name, self.rows, self.cols, csc)
    }
}

/// Incrementally builds a struct, validating field names as they are
/// added and preserving insertion order.
#[derive(Debug, Default)]
pub struct StructBuilder {
    fields: Vec<(String, Matrix)>,
}

impl StructBuilder {
    pub fn new() -> StructBuilder {
        StructBuilder { fields: Vec::new() }
    }

    /// Add a field. Names longer than 31 characters and duplicates are
    /// rejected without mutating the struct; a name containing a space
    /// is truncated at the first space and the truncation reported.
    pub fn set_field(
        &mut self,
        name: &str,
        value: Matrix,
    ) -> Result<Option<FieldNameWarning>, FormatError> {
        let (kept, warning) = validate_field_name(name)?;
        if self.fields.iter().any(|(n, _)| *n == kept) {
            return Err(FormatError::DuplicateFieldName(kept));
        }
        self.fields.push((kept, value));
        Ok(warning)
    }

    /// Finish into a struct [`Matrix`]. Structs always carry dimensions
    /// `[1, 1]` regardless of field count.
    pub fn build(self, name: &str) -> Matrix {
        Matrix {
            name: name.to_string(),
            dims: vec![1, 1],
            flags: ArrayFlags::new(MatClass::Struct),
            data: MatrixData::Struct {
                fields: self.fields,
            },
        }
    }
}
