use serde::{Deserialize, Serialize};

use crate::*;

/// Classification of a single reveal action.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RevealAftermath {
    Continue,
    Win,
    Explosion,
}

impl RevealAftermath {
    pub const fn ends_game(self) -> bool {
        matches!(self, Self::Win | Self::Explosion)
    }
}

/// Classifies a reveal of `clicked`, given how many cells are revealed once its
/// result is merged in.
pub fn evaluate_reveal(
    clicked: CellIndex,
    mines: &MineSet,
    safe_cell_count: CellCount,
    revealed_after: usize,
) -> RevealAftermath {
    if mines.contains(&clicked) {
        RevealAftermath::Explosion
    } else if revealed_after == usize::from(safe_cell_count) {
        RevealAftermath::Win
    } else {
        RevealAftermath::Continue
    }
}

/// Valid transitions:
/// - Awaiting -> Playing
/// - Awaiting -> Win
/// - Awaiting -> Lose
/// - Playing -> Win
/// - Playing -> Lose
///
/// Finished games only leave their state through a restart.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Awaiting,
    Playing,
    Win,
    Lose,
}

impl GameStatus {
    /// Whether cells can still be revealed or marked.
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Awaiting | Self::Playing)
    }

    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Win | Self::Lose)
    }

    pub const fn after_reveal(self, aftermath: RevealAftermath) -> Self {
        if self.is_finished() {
            return self;
        }

        match aftermath {
            RevealAftermath::Continue => Self::Playing,
            RevealAftermath::Win => Self::Win,
            RevealAftermath::Explosion => Self::Lose,
        }
    }
}

impl Default for GameStatus {
    fn default() -> Self {
        Self::Awaiting
    }
}
