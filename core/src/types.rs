/// Single coordinate axis used for board width, height, and positions.
pub type Coord = u8;

/// Count type used for mine counts and total-cell counts.
pub type CellCount = u16;

/// Linear cell identity, `y * width + x`.
pub type CellIndex = u16;

/// Set of cell indexes, used for mines and revealed cells.
pub type CellSet = hashbrown::HashSet<CellIndex>;

/// Indexes holding a mine, created once per game on the first reveal.
pub type MineSet = CellSet;

/// Indexes uncovered so far, only ever grows within a game.
pub type RevealedSet = CellSet;

pub const fn mult(a: Coord, b: Coord) -> CellCount {
    let a = a as CellCount;
    let b = b as CellCount;
    a.saturating_mul(b)
}
