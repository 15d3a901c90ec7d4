use core::ops::Range;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::*;

/// Rectangular coordinate space of a minefield.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Matrix {
    pub width: Coord,
    pub height: Coord,
}

/// Cell position, 0-indexed from the top-left corner.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Point {
    pub x: Coord,
    pub y: Coord,
}

impl Point {
    pub const fn new(x: Coord, y: Coord) -> Self {
        Self { x, y }
    }
}

pub trait ToNdIndex {
    type Output;
    fn to_nd_index(self) -> Self::Output;
}

/// Boards are stored row-major as `(height, width)`, so a point maps to `[y, x]`.
impl ToNdIndex for Point {
    type Output = [usize; 2];

    fn to_nd_index(self) -> Self::Output {
        [self.y.into(), self.x.into()]
    }
}

impl ToNdIndex for Matrix {
    type Output = (usize, usize);

    fn to_nd_index(self) -> Self::Output {
        (self.height.into(), self.width.into())
    }
}

impl Matrix {
    /// Both dimensions must be non-zero.
    pub const fn new(width: Coord, height: Coord) -> Self {
        Self { width, height }
    }

    pub const fn cell_count(&self) -> CellCount {
        mult(self.width, self.height)
    }

    /// All cell indexes in ascending order.
    pub fn indexes(&self) -> Range<CellIndex> {
        0..self.cell_count()
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x < self.width && point.y < self.height
    }

    pub fn contains_index(&self, index: CellIndex) -> bool {
        index < self.cell_count()
    }

    /// No bounds validation, the point is expected to lie inside the matrix.
    pub fn point_to_index(&self, point: Point) -> CellIndex {
        CellIndex::from(point.y) * CellIndex::from(self.width) + CellIndex::from(point.x)
    }

    pub fn index_to_point(&self, index: CellIndex) -> Point {
        let width = CellIndex::from(self.width);
        Point {
            x: (index % width) as Coord,
            y: (index / width) as Coord,
        }
    }

    /// Neighbors of `point` inside the matrix, in the order N, NE, E, SE, S, SW, W, NW.
    pub fn points_around(&self, point: Point) -> NeighborIter {
        NeighborIter::new(point, *self)
    }

    pub fn collect_points_around(&self, point: Point) -> SmallVec<[Point; 8]> {
        self.points_around(point).collect()
    }

    pub fn indexes_around(&self, index: CellIndex) -> impl Iterator<Item = CellIndex> + use<> {
        let matrix = *self;
        self.points_around(self.index_to_point(index))
            .map(move |point| matrix.point_to_index(point))
    }
}

const DISPLACEMENTS: [(i8, i8); 8] = [
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
];

/// Applies `delta` to `point`, returning a value only when it remains in bounds.
fn apply_delta(point: Point, delta: (i8, i8), bounds: Matrix) -> Option<Point> {
    let (dx, dy) = delta;

    let x = point.x.checked_add_signed(dx)?;
    if x >= bounds.width {
        return None;
    }

    let y = point.y.checked_add_signed(dy)?;
    if y >= bounds.height {
        return None;
    }

    Some(Point { x, y })
}

#[derive(Debug)]
pub struct NeighborIter {
    center: Point,
    bounds: Matrix,
    index: u8,
}

impl NeighborIter {
    fn new(center: Point, bounds: Matrix) -> Self {
        Self {
            center,
            bounds,
            index: 0,
        }
    }
}

impl Iterator for NeighborIter {
    type Item = Point;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if usize::from(self.index) >= DISPLACEMENTS.len() {
                return None;
            }

            let next_item =
                apply_delta(self.center, DISPLACEMENTS[self.index as usize], self.bounds);
            self.index += 1;

            if next_item.is_some() {
                return next_item;
            }
        }
    }
}
