use crate::*;
pub use random::*;

mod random;

/// Produces the mine set of a game once the first revealed cell is known.
pub trait MinePlacer {
    /// The returned set never contains `start`.
    fn place(&mut self, matrix: Matrix, bombs: CellCount, start: CellIndex) -> MineSet;
}

/// Replays a predetermined layout, mostly useful for tests and shared boards.
#[derive(Clone, Debug, PartialEq)]
pub struct FixedMinePlacer {
    mines: MineSet,
}

impl FixedMinePlacer {
    pub fn new(mines: impl IntoIterator<Item = CellIndex>) -> Self {
        Self {
            mines: mines.into_iter().collect(),
        }
    }
}

impl MinePlacer for FixedMinePlacer {
    fn place(&mut self, matrix: Matrix, bombs: CellCount, start: CellIndex) -> MineSet {
        let mut mines: MineSet = self
            .mines
            .iter()
            .copied()
            .filter(|&index| matrix.contains_index(index))
            .collect();

        if mines.remove(&start) {
            log::warn!("Fixed layout has a mine on the start cell {start}, removed it");
        }

        if mines.len() != usize::from(bombs) {
            log::warn!(
                "Fixed layout mine count mismatch, actual: {}, requested: {}",
                mines.len(),
                bombs
            );
        }

        mines
    }
}
