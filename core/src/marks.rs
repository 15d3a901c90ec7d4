use serde::{Deserialize, Serialize};

use crate::*;

/// Player-placed mark on an unrevealed cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mark {
    /// Suspected mine, blocks reveals.
    Flag,
    /// Question mark, cleared automatically when the cell gets revealed.
    Maybe,
}

/// Marks by cell, absence means unmarked.
pub type MarksMap = hashbrown::HashMap<CellIndex, Mark>;

/// Next mark in the cycle `none -> flag -> maybe -> none`, skipping `maybe` when
/// question marks are disabled.
pub const fn next_mark(current: Option<Mark>, question_marks: bool) -> Option<Mark> {
    match current {
        None => Some(Mark::Flag),
        Some(Mark::Flag) if question_marks => Some(Mark::Maybe),
        Some(Mark::Flag) => None,
        Some(Mark::Maybe) => None,
    }
}

/// Cells of a reveal result that carry a `maybe` mark and have to be unmarked.
pub fn marks_to_clear(revealed: &RevealedSet, marks: &MarksMap) -> CellSet {
    revealed
        .iter()
        .copied()
        .filter(|index| matches!(marks.get(index), Some(Mark::Maybe)))
        .collect()
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum MarkOutcome {
    NoChange,
    Changed(Option<Mark>),
}

impl MarkOutcome {
    pub const fn has_update(self) -> bool {
        match self {
            Self::NoChange => false,
            Self::Changed(_) => true,
        }
    }
}
