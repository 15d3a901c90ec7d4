use serde::{Deserialize, Serialize};

use crate::*;

/// What the player sees on a cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellLabel {
    Hidden,
    Flag,
    Maybe,
    Count(u8),
    Mine,
    /// The mine that ended the game.
    Exploded,
    /// Flag placed on a safe cell, shown once the game is lost.
    Mistake,
}

impl CellLabel {
    /// Whether the cell still looks covered.
    pub const fn is_closed(self) -> bool {
        matches!(self, Self::Hidden | Self::Flag | Self::Maybe | Self::Mistake)
    }
}

impl Default for CellLabel {
    fn default() -> Self {
        Self::Hidden
    }
}

impl From<Mark> for CellLabel {
    fn from(mark: Mark) -> Self {
        match mark {
            Mark::Flag => Self::Flag,
            Mark::Maybe => Self::Maybe,
        }
    }
}

/// Label of a single cell; finished games uncover mines and wrong flags.
///
/// # Panics
///
/// Panics when `index` lies outside the schema's matrix.
pub fn cell_label(
    index: CellIndex,
    status: GameStatus,
    revealed: &RevealedSet,
    marks: &MarksMap,
    schema: &MinefieldSchema,
) -> CellLabel {
    let cell = schema[index];
    let mark = marks.get(&index).copied();
    let flagged = mark == Some(Mark::Flag);

    match status {
        GameStatus::Win if cell.is_mine() => return CellLabel::Flag,
        GameStatus::Lose if cell.is_mine() && !flagged => return CellLabel::Mine,
        GameStatus::Lose if !cell.is_mine() && flagged => return CellLabel::Mistake,
        _ => {}
    }

    if let Some(mark) = mark {
        return mark.into();
    }

    if !revealed.contains(&index) {
        return CellLabel::Hidden;
    }

    match cell {
        SchemaCell::Mine => CellLabel::Mine,
        SchemaCell::Count(count) => CellLabel::Count(count),
    }
}
