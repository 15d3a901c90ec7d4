use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use super::*;

/// Picks `bombs` distinct cells uniformly at random, never `start`.
///
/// The count is capped to the cells available besides `start`; normalized
/// [`GameSettings`] never hit that cap.
pub fn create_mines<R: Rng + ?Sized>(
    rng: &mut R,
    matrix: Matrix,
    bombs: CellCount,
    start: CellIndex,
) -> MineSet {
    let total_cells = matrix.cell_count();
    let start_inside = matrix.contains_index(start);
    let free_cells = if start_inside {
        total_cells - 1
    } else {
        total_cells
    };

    let bombs = if bombs > free_cells {
        log::warn!(
            "Minefield already full, requested {} mines but only {} fit",
            bombs,
            free_cells
        );
        free_cells
    } else {
        bombs
    };

    // sample over the free cells and shift past the start cell
    let mines: MineSet = rand::seq::index::sample(rng, free_cells.into(), bombs.into())
        .into_iter()
        .map(|pick| {
            let pick = pick as CellIndex;
            if start_inside && pick >= start {
                pick + 1
            } else {
                pick
            }
        })
        .collect();

    log::debug!(
        "Placed {} mines on {}x{}, start cell {}",
        mines.len(),
        matrix.width,
        matrix.height,
        start
    );
    mines
}

/// Random placement driven by a caller-supplied generator.
#[derive(Clone, Debug, PartialEq)]
pub struct RandomMinePlacer<R = SmallRng> {
    rng: R,
}

impl<R: Rng> RandomMinePlacer<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RandomMinePlacer<SmallRng> {
    pub fn from_seed(seed: u64) -> Self {
        Self::new(SmallRng::seed_from_u64(seed))
    }
}

impl<R: Rng> MinePlacer for RandomMinePlacer<R> {
    fn place(&mut self, matrix: Matrix, bombs: CellCount, start: CellIndex) -> MineSet {
        create_mines(&mut self.rng, matrix, bombs, start)
    }
}
