use ndarray::Array2;
use smallvec::SmallVec;

/// Single coordinate axis used for board rows, columns, and positions.
pub type Coord = u16;

/// Count type used for mine counts and total-cell counts.
pub type CellCount = u32;

/// Two-dimensional coordinates `(row, col)`.
pub type Coord2 = (Coord, Coord);

pub trait ToNdIndex {
    type Output;
    fn to_nd_index(self) -> Self::Output;
}

impl ToNdIndex for Coord2 {
    type Output = [usize; 2];

    fn to_nd_index(self) -> Self::Output {
        [self.0.into(), self.1.into()]
    }
}

pub const fn mult(a: Coord, b: Coord) -> CellCount {
    let a = a as CellCount;
    let b = b as CellCount;
    a.saturating_mul(b)
}

const DISPLACEMENTS: [(isize, isize); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Applies `delta` to `coords`, returning a value only when it remains in bounds.
fn apply_delta(coords: Coord2, delta: (isize, isize), bounds: Coord2) -> Option<Coord2> {
    let (row, col) = coords;
    let (dr, dc) = delta;
    let (max_row, max_col) = bounds;

    let next_row = row.checked_add_signed(dr.try_into().ok()?)?;
    if next_row >= max_row {
        return None;
    }

    let next_col = col.checked_add_signed(dc.try_into().ok()?)?;
    if next_col >= max_col {
        return None;
    }

    Some((next_row, next_col))
}

/// Per-cell Moore neighborhoods, clipped at edges and corners, computed once
/// at board construction so every lookup is a slice borrow.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NeighborIndex {
    lists: Array2<SmallVec<[Coord2; 8]>>,
}

impl NeighborIndex {
    pub fn new(size: Coord2) -> Self {
        let mut lists: Array2<SmallVec<[Coord2; 8]>> =
            Array2::from_elem(size.to_nd_index(), SmallVec::new());

        let (row_end, col_end) = size;
        for row in 0..row_end {
            for col in 0..col_end {
                lists[(row, col).to_nd_index()] = DISPLACEMENTS
                    .iter()
                    .filter_map(|&delta| apply_delta((row, col), delta, size))
                    .collect();
            }
        }

        Self { lists }
    }

    pub fn of(&self, coords: Coord2) -> &[Coord2] {
        &self.lists[coords.to_nd_index()]
    }
}
