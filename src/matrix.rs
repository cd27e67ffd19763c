use crate::dims::Dimensions;
use crate::error::{Error, Result};
use crate::Quantity;
use log::{debug, info};

/// A dense row-major 2-D array of quantities. Rows are processes, columns are
/// resource types.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Matrix {
    cells: Vec<Quantity>,
    rows: usize,
    cols: usize,
}

impl Matrix {
    /// Creates a zero-filled matrix.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            cells: vec![0; rows * cols],
            rows,
            cols,
        }
    }

    /// Builds a `rows` × `cols` matrix from nested rows. Rows or cells that are missing
    /// read as 0, and anything beyond the requested shape is ignored.
    pub fn from_rows_lenient(rows: usize, cols: usize, src: &[Vec<Quantity>]) -> Self {
        let mut m = Self::new(rows, cols);
        for (i, row) in src.iter().take(rows).enumerate() {
            for (j, &v) in row.iter().take(cols).enumerate() {
                m[(i, j)] = v;
            }
        }
        m
    }

    /// Builds a matrix from nested rows that must all have exactly `cols` entries.
    pub fn from_rows(cols: usize, src: &[Vec<Quantity>]) -> Option<Self> {
        if src.iter().any(|row| row.len() != cols) {
            return None;
        }
        Some(Self {
            cells: src.iter().flat_map(|row| row.iter().copied()).collect(),
            rows: src.len(),
            cols,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> Option<Quantity> {
        if row < self.rows && col < self.cols {
            Some(self.cells[row * self.cols + col])
        } else {
            None
        }
    }

    pub fn get_mut(&mut self, row: usize, col: usize) -> Option<&mut Quantity> {
        if row < self.rows && col < self.cols {
            Some(&mut self.cells[row * self.cols + col])
        } else {
            None
        }
    }

    pub fn row(&self, row: usize) -> &[Quantity] {
        &self.cells[row * self.cols..(row + 1) * self.cols]
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[Quantity]> + '_ {
        // chunks() panics on 0, and a matrix with no columns has no cells anyway
        (0..self.rows).map(move |i| self.row(i))
    }

    /// Iterates `(row, col, value)` in row-major order.
    pub fn iter_cells(&self) -> impl Iterator<Item = (usize, usize, Quantity)> + '_ {
        let cols = self.cols;
        self.cells
            .iter()
            .enumerate()
            .map(move |(k, &v)| (k / cols, k % cols, v))
    }

    /// All cells, row-major.
    pub fn cells_mut(&mut self) -> &mut [Quantity] {
        &mut self.cells
    }

    pub fn num_cells(&self) -> usize {
        self.cells.len()
    }

    pub fn to_rows(&self) -> Vec<Vec<Quantity>> {
        self.iter_rows().map(|r| r.to_vec()).collect()
    }

    /// Returns a new matrix of the given shape, carrying over the overlapping
    /// top-left sub-rectangle. Everything else is zero.
    pub fn resized(&self, rows: usize, cols: usize) -> Self {
        let mut m = Self::new(rows, cols);
        for i in 0..rows.min(self.rows) {
            for j in 0..cols.min(self.cols) {
                m[(i, j)] = self[(i, j)];
            }
        }
        m
    }
}

// (row, column)
impl core::ops::Index<(usize, usize)> for Matrix {
    type Output = Quantity;
    fn index(&self, (row, col): (usize, usize)) -> &Self::Output {
        assert!(row < self.rows && col < self.cols, "matrix index out of range");
        &self.cells[row * self.cols + col]
    }
}

// (row, column)
impl core::ops::IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut Self::Output {
        assert!(row < self.rows && col < self.cols, "matrix index out of range");
        &mut self.cells[row * self.cols + col]
    }
}

/// Addresses one editable cell of the model.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum CellRef {
    Allocation { process: usize, resource: usize },
    Maximum { process: usize, resource: usize },
    Available { resource: usize },
}

impl core::fmt::Display for CellRef {
    fn fmt(&self, fmt: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match *self {
            CellRef::Allocation { process, resource } => {
                write!(fmt, "alloc[P{}][R{}]", process, resource)
            }
            CellRef::Maximum { process, resource } => write!(fmt, "max[P{}][R{}]", process, resource),
            CellRef::Available { resource } => write!(fmt, "avail[R{}]", resource),
        }
    }
}

/// What happens to existing cell values when the dimensions change.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ResizePolicy {
    /// Cells whose (process, resource) stay in bounds keep their values.
    Preserve,
    /// Every rebuild starts from zero-filled grids.
    Reset,
}

impl Default for ResizePolicy {
    fn default() -> Self {
        ResizePolicy::Preserve
    }
}

/// Owns the Allocation, Maximum and Available containers.
///
/// The three containers always agree with `dims`: with no dimensions they are all
/// empty, otherwise Allocation and Maximum are P × R and Available has R entries.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MatrixStore {
    dims: Option<Dimensions>,
    alloc: Matrix,
    max: Matrix,
    avail: Vec<Quantity>,
}

impl MatrixStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dimensions(dims: Dimensions) -> Self {
        let mut store = Self::new();
        store.rebuild(dims, ResizePolicy::Reset);
        store
    }

    pub fn dims(&self) -> Option<Dimensions> {
        self.dims
    }

    pub fn alloc(&self) -> &Matrix {
        &self.alloc
    }

    pub fn max(&self) -> &Matrix {
        &self.max
    }

    pub fn avail(&self) -> &[Quantity] {
        &self.avail
    }

    /// Reshapes all three containers to `dims`.
    pub fn rebuild(&mut self, dims: Dimensions, policy: ResizePolicy) {
        let (p, r) = (dims.processes(), dims.resources());
        match policy {
            ResizePolicy::Preserve => {
                self.alloc = self.alloc.resized(p, r);
                self.max = self.max.resized(p, r);
                self.avail.resize(r, 0);
            }
            ResizePolicy::Reset => {
                self.alloc = Matrix::new(p, r);
                self.max = Matrix::new(p, r);
                self.avail = vec![0; r];
            }
        }
        if let Some(old) = self.dims {
            debug!("rebuild {} -> {} ({:?})", old, dims, policy);
        }
        self.dims = Some(dims);
        info!("Built {} matrices.", dims);
    }

    pub fn get(&self, cell: CellRef) -> Option<Quantity> {
        match cell {
            CellRef::Allocation { process, resource } => self.alloc.get(process, resource),
            CellRef::Maximum { process, resource } => self.max.get(process, resource),
            CellRef::Available { resource } => self.avail.get(resource).copied(),
        }
    }

    pub fn set(&mut self, cell: CellRef, value: Quantity) -> Result<()> {
        let slot = match cell {
            CellRef::Allocation { process, resource } => self.alloc.get_mut(process, resource),
            CellRef::Maximum { process, resource } => self.max.get_mut(process, resource),
            CellRef::Available { resource } => self.avail.get_mut(resource),
        };
        match slot {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(Error::OutOfBounds { cell }),
        }
    }

    /// Replaces the whole model. The matrices must match `dims` exactly.
    pub fn load(
        &mut self,
        dims: Dimensions,
        alloc: Matrix,
        max: Matrix,
        avail: Vec<Quantity>,
    ) -> Result<()> {
        let (p, r) = (dims.processes(), dims.resources());
        for (name, m) in [("alloc", &alloc), ("max", &max)].iter() {
            if m.rows() != p || m.cols() != r {
                return Err(Error::Scenario(format!(
                    "{} is {}×{}, expected {}",
                    name,
                    m.rows(),
                    m.cols(),
                    dims
                )));
            }
        }
        if avail.len() != r {
            return Err(Error::Scenario(format!(
                "avail has {} entries, expected {}",
                avail.len(),
                r
            )));
        }
        self.dims = Some(dims);
        self.alloc = alloc;
        self.max = max;
        self.avail = avail;
        info!("Built {} matrices.", dims);
        Ok(())
    }
}
