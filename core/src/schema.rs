use core::ops::Index;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// What a cell hides: a mine, or the number of mines around it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchemaCell {
    Mine,
    Count(u8),
}

impl SchemaCell {
    pub const fn is_mine(self) -> bool {
        matches!(self, Self::Mine)
    }

    /// Zero cells propagate reveals to their neighbors.
    pub const fn is_zero(self) -> bool {
        matches!(self, Self::Count(0))
    }
}

impl Default for SchemaCell {
    fn default() -> Self {
        Self::Count(0)
    }
}

/// Per-cell mine marker or adjacency count, derived once per game from the mine set.
///
/// Stored as `(height, width)` so iteration order matches [`CellIndex`] order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MinefieldSchema {
    matrix: Matrix,
    cells: Array2<SchemaCell>,
}

impl MinefieldSchema {
    pub fn build(matrix: Matrix, mines: &MineSet) -> Self {
        let cells = Array2::from_shape_fn(matrix.to_nd_index(), |(y, x)| {
            let point = Point::new(x as Coord, y as Coord);
            if mines.contains(&matrix.point_to_index(point)) {
                SchemaCell::Mine
            } else {
                let count = matrix
                    .points_around(point)
                    .filter(|&pos| mines.contains(&matrix.point_to_index(pos)))
                    .count();
                SchemaCell::Count(count as u8)
            }
        });

        Self { matrix, cells }
    }

    pub fn matrix(&self) -> Matrix {
        self.matrix
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn get(&self, index: CellIndex) -> Option<SchemaCell> {
        if self.matrix.contains_index(index) {
            Some(self[index])
        } else {
            None
        }
    }

    pub fn at(&self, point: Point) -> SchemaCell {
        self.cells[point.to_nd_index()]
    }

    pub fn mine_count(&self) -> CellCount {
        self.cells.iter().filter(|cell| cell.is_mine()).count() as CellCount
    }

    /// Cells in index order.
    pub fn iter(&self) -> impl Iterator<Item = SchemaCell> + '_ {
        self.cells.iter().copied()
    }

    pub fn cells(&self) -> &Array2<SchemaCell> {
        &self.cells
    }
}

/// # Panics
///
/// Panics when `index` lies outside the matrix.
impl Index<CellIndex> for MinefieldSchema {
    type Output = SchemaCell;

    fn index(&self, index: CellIndex) -> &Self::Output {
        assert!(
            self.matrix.contains_index(index),
            "invalid cell index: {index}"
        );
        &self.cells[self.matrix.index_to_point(index).to_nd_index()]
    }
}
