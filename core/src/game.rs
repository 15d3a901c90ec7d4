use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Everything a single reveal action changed.
#[derive(Clone, Debug, PartialEq)]
pub struct RevealReport {
    /// Newly uncovered cells, already merged into the game.
    pub revealed: RevealedSet,
    pub aftermath: RevealAftermath,
    /// Cells whose `maybe` mark was dropped because they got revealed.
    pub unmarked: CellSet,
}

impl RevealReport {
    fn unchanged() -> Self {
        Self {
            revealed: RevealedSet::new(),
            aftermath: RevealAftermath::Continue,
            unmarked: CellSet::new(),
        }
    }

    pub fn has_update(&self) -> bool {
        !self.revealed.is_empty()
    }
}

/// Canonical state of one game, threaded through every player action.
///
/// Snapshots carry the mine layout only, the schema is rebuilt on restore.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGame", into = "RawGame")]
pub struct Game {
    settings: GameSettings,
    options: GameOptions,
    mines: MineSet,
    schema: Option<MinefieldSchema>,
    revealed: RevealedSet,
    marks: MarksMap,
    status: GameStatus,
    explosion: Option<CellIndex>,
}

impl Game {
    /// Mines are placed on the first reveal, away from the clicked cell.
    pub fn new(settings: GameSettings, options: GameOptions) -> Self {
        Self {
            settings,
            options,
            mines: MineSet::new(),
            schema: None,
            revealed: RevealedSet::new(),
            marks: MarksMap::new(),
            status: Default::default(),
            explosion: None,
        }
    }

    /// Starts from a known layout, the first reveal can hit a mine.
    pub fn with_mines(settings: GameSettings, options: GameOptions, mines: MineSet) -> Self {
        let matrix = settings.matrix();
        let mines: MineSet = mines
            .into_iter()
            .filter(|&index| matrix.contains_index(index))
            .collect();
        let schema = MinefieldSchema::build(matrix, &mines);

        Self {
            mines,
            schema: Some(schema),
            ..Self::new(settings, options)
        }
    }

    pub fn settings(&self) -> GameSettings {
        self.settings
    }

    pub fn options(&self) -> GameOptions {
        self.options
    }

    /// Existing `maybe` marks stay in place when question marks get disabled.
    pub fn set_options(&mut self, options: GameOptions) {
        self.options = options;
    }

    pub fn matrix(&self) -> Matrix {
        self.settings.matrix()
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn is_finished(&self) -> bool {
        self.status.is_finished()
    }

    /// Empty until the first reveal.
    pub fn mines(&self) -> &MineSet {
        &self.mines
    }

    pub fn schema(&self) -> Option<&MinefieldSchema> {
        self.schema.as_ref()
    }

    pub fn revealed(&self) -> &RevealedSet {
        &self.revealed
    }

    pub fn marks(&self) -> &MarksMap {
        &self.marks
    }

    pub fn mark_at(&self, index: CellIndex) -> Option<Mark> {
        self.marks.get(&index).copied()
    }

    pub fn explosion(&self) -> Option<CellIndex> {
        self.explosion
    }

    pub fn total_mines(&self) -> CellCount {
        if self.schema.is_some() {
            self.mines.len() as CellCount
        } else {
            self.settings.bombs()
        }
    }

    pub fn flag_count(&self) -> CellCount {
        self.marks
            .values()
            .filter(|&&mark| mark == Mark::Flag)
            .count() as CellCount
    }

    /// Can go negative when the player places more flags than there are mines.
    pub fn mines_left(&self) -> isize {
        (self.total_mines() as isize) - (self.flag_count() as isize)
    }

    pub fn safe_cell_count(&self) -> CellCount {
        self.settings.cell_count() - self.total_mines()
    }

    /// Whether a reveal at `index` would do anything.
    pub fn can_reveal_at(&self, index: CellIndex) -> bool {
        self.can_mark_at(index) && self.mark_at(index) != Some(Mark::Flag)
    }

    pub fn can_mark_at(&self, index: CellIndex) -> bool {
        self.status.is_active()
            && self.matrix().contains_index(index)
            && !self.revealed.contains(&index)
    }

    pub fn reveal<P: MinePlacer + ?Sized>(
        &mut self,
        index: CellIndex,
        placer: &mut P,
    ) -> Result<RevealReport> {
        let index = self.validate_index(index)?;
        self.check_not_finished()?;

        if self.revealed.contains(&index) || self.mark_at(index) == Some(Mark::Flag) {
            return Ok(RevealReport::unchanged());
        }

        let settings = self.settings;
        let mines = &mut self.mines;
        let schema = self.schema.get_or_insert_with(|| {
            *mines = placer.place(settings.matrix(), settings.bombs(), index);
            MinefieldSchema::build(settings.matrix(), mines)
        });

        let revealed = indexes_to_reveal(index, schema, &self.revealed, &self.marks);
        self.revealed.extend(revealed.iter().copied());

        let aftermath = evaluate_reveal(
            index,
            &self.mines,
            self.safe_cell_count(),
            self.revealed.len(),
        );

        let unmarked = marks_to_clear(&revealed, &self.marks);
        for cleared in &unmarked {
            self.marks.remove(cleared);
        }

        self.apply_aftermath(index, aftermath);

        Ok(RevealReport {
            revealed,
            aftermath,
            unmarked,
        })
    }

    /// Advances the mark of an unrevealed cell, see [`next_mark`].
    pub fn mark(&mut self, index: CellIndex) -> Result<MarkOutcome> {
        let index = self.validate_index(index)?;
        self.check_active()?;

        if self.revealed.contains(&index) {
            return Ok(MarkOutcome::NoChange);
        }

        let next = next_mark(self.mark_at(index), self.options.question_marks);
        match next {
            Some(mark) => self.marks.insert(index, mark),
            None => self.marks.remove(&index),
        };

        Ok(MarkOutcome::Changed(next))
    }

    /// Back to an untouched board with the same settings and options.
    pub fn restart(&mut self) {
        *self = Self::new(self.settings, self.options);
    }

    pub fn label_at(&self, index: CellIndex) -> Result<CellLabel> {
        let index = self.validate_index(index)?;
        Ok(self.label_unchecked(index))
    }

    /// Labels for the whole board, shaped `(height, width)`.
    pub fn labels(&self) -> Array2<CellLabel> {
        let matrix = self.matrix();
        Array2::from_shape_fn(matrix.to_nd_index(), |(y, x)| {
            self.label_unchecked(matrix.point_to_index(Point::new(x as Coord, y as Coord)))
        })
    }

    fn label_unchecked(&self, index: CellIndex) -> CellLabel {
        match &self.schema {
            Some(_) if self.explosion == Some(index) => CellLabel::Exploded,
            Some(schema) => cell_label(index, self.status, &self.revealed, &self.marks, schema),
            None => self.mark_at(index).map_or(CellLabel::Hidden, CellLabel::from),
        }
    }

    fn apply_aftermath(&mut self, index: CellIndex, aftermath: RevealAftermath) {
        if self.status == GameStatus::Awaiting {
            log::debug!("Game started at cell {index}");
        }

        self.status = self.status.after_reveal(aftermath);

        match aftermath {
            RevealAftermath::Continue => {}
            RevealAftermath::Win => {
                log::debug!("Game won, last cell {index}");
            }
            RevealAftermath::Explosion => {
                log::debug!("Game lost, mine at {index}");
                self.explosion = Some(index);
            }
        }
    }

    fn validate_index(&self, index: CellIndex) -> Result<CellIndex> {
        if self.matrix().contains_index(index) {
            Ok(index)
        } else {
            Err(GameError::InvalidIndex)
        }
    }

    fn check_active(&self) -> Result<()> {
        if self.status.is_active() {
            Ok(())
        } else {
            Err(GameError::AlreadyEnded)
        }
    }

    fn check_not_finished(&self) -> Result<()> {
        if self.status.is_finished() {
            Err(GameError::AlreadyEnded)
        } else {
            Ok(())
        }
    }
}

/// Serialized form of [`Game`]; `mines` is absent until placement happened.
#[derive(Serialize, Deserialize)]
struct RawGame {
    settings: GameSettings,
    #[serde(default)]
    options: GameOptions,
    mines: Option<MineSet>,
    #[serde(default)]
    revealed: RevealedSet,
    #[serde(default)]
    marks: MarksMap,
    #[serde(default)]
    status: GameStatus,
    #[serde(default)]
    explosion: Option<CellIndex>,
}

impl From<Game> for RawGame {
    fn from(game: Game) -> Self {
        Self {
            settings: game.settings,
            options: game.options,
            mines: game.schema.is_some().then_some(game.mines),
            revealed: game.revealed,
            marks: game.marks,
            status: game.status,
            explosion: game.explosion,
        }
    }
}

impl TryFrom<RawGame> for Game {
    type Error = GameError;

    fn try_from(raw: RawGame) -> Result<Self> {
        let matrix = raw.settings.matrix();
        let inside = |index: &CellIndex| matrix.contains_index(*index);

        let mines_inside = raw.mines.iter().flatten().all(inside);
        if !mines_inside
            || !raw.revealed.iter().all(inside)
            || !raw.marks.keys().all(inside)
            || !raw.explosion.iter().all(inside)
        {
            return Err(GameError::InvalidIndex);
        }

        if raw.marks.keys().any(|index| raw.revealed.contains(index)) {
            return Err(GameError::InvalidSnapshot);
        }

        let Some(mines) = raw.mines else {
            if !raw.revealed.is_empty()
                || raw.status != GameStatus::Awaiting
                || raw.explosion.is_some()
            {
                return Err(GameError::InvalidSnapshot);
            }
            return Ok(Self {
                marks: raw.marks,
                ..Self::new(raw.settings, raw.options)
            });
        };

        let lost = raw.status == GameStatus::Lose;
        match raw.explosion {
            Some(index) if lost && mines.contains(&index) && raw.revealed.contains(&index) => {}
            None if !lost => {}
            _ => return Err(GameError::InvalidSnapshot),
        }

        let schema = MinefieldSchema::build(matrix, &mines);
        Ok(Self {
            settings: raw.settings,
            options: raw.options,
            mines,
            schema: Some(schema),
            revealed: raw.revealed,
            marks: raw.marks,
            status: raw.status,
            explosion: raw.explosion,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::String;
    use alloc::vec;

    const MARKS_ON: GameOptions = GameOptions {
        question_marks: true,
    };

    fn small_game(width: Coord, height: Coord, mines: &[CellIndex]) -> Game {
        let settings = GameSettings::new_unchecked(width, height, mines.len() as CellCount);
        Game::with_mines(settings, MARKS_ON, mines.iter().copied().collect())
    }

    fn no_placement() -> FixedMinePlacer {
        FixedMinePlacer::new([])
    }

    #[test]
    fn first_reveal_places_mines_away_from_click() {
        let mut game = Game::new(GameSettings::default(), MARKS_ON);
        let mut placer = RandomMinePlacer::from_seed(9);

        assert!(game.mines().is_empty());
        let report = game.reveal(40, &mut placer).unwrap();

        assert_eq!(game.mines().len(), 10);
        assert!(!game.mines().contains(&40));
        assert!(report.revealed.contains(&40));
        assert_ne!(report.aftermath, RevealAftermath::Explosion);
        assert!(game.schema().is_some());
        assert_ne!(game.status(), GameStatus::Lose);
    }

    #[test]
    fn placement_happens_only_once() {
        let mut game = Game::new(GameSettings::default(), MARKS_ON);
        // top row plus the center, cell 9 touches two mines and opens alone
        let mut placer = FixedMinePlacer::new([0, 1, 2, 3, 4, 5, 6, 7, 8, 40]);

        let report = game.reveal(9, &mut placer).unwrap();
        assert_eq!(report.revealed, [9].into_iter().collect());
        assert_eq!(game.status(), GameStatus::Playing);
        let mines = game.mines().clone();

        let mut other = FixedMinePlacer::new([70, 71, 72]);
        game.reveal(80, &mut other).unwrap();

        assert_eq!(game.mines(), &mines);
        assert!(!game.mines().contains(&70));
    }

    #[test]
    fn flood_fill_wins_in_one_click() {
        let mut game = small_game(3, 3, &[0]);

        let report = game.reveal(8, &mut no_placement()).unwrap();

        assert_eq!(report.revealed.len(), 8);
        assert_eq!(report.aftermath, RevealAftermath::Win);
        assert_eq!(game.status(), GameStatus::Win);
        assert_eq!(game.explosion(), None);
        assert_eq!(game.label_at(0), Ok(CellLabel::Flag));
    }

    #[test]
    fn hitting_a_mine_loses_and_records_explosion() {
        let mut game = small_game(3, 3, &[0, 8]);

        assert_eq!(
            game.reveal(1, &mut no_placement()).unwrap().aftermath,
            RevealAftermath::Continue
        );
        assert_eq!(game.status(), GameStatus::Playing);

        let report = game.reveal(8, &mut no_placement()).unwrap();

        assert_eq!(report.aftermath, RevealAftermath::Explosion);
        assert_eq!(game.status(), GameStatus::Lose);
        assert_eq!(game.explosion(), Some(8));
        assert_eq!(game.label_at(8), Ok(CellLabel::Exploded));
        assert_eq!(game.label_at(0), Ok(CellLabel::Mine));
        assert_eq!(
            game.reveal(2, &mut no_placement()),
            Err(GameError::AlreadyEnded)
        );
        assert_eq!(game.mark(2), Err(GameError::AlreadyEnded));
    }

    #[test]
    fn flagged_cell_blocks_reveal() {
        let mut game = small_game(3, 3, &[0]);

        game.mark(8).unwrap();
        let report = game.reveal(8, &mut no_placement()).unwrap();

        assert!(!report.has_update());
        assert_eq!(game.status(), GameStatus::Awaiting);
        assert!(!game.can_reveal_at(8));
        assert!(game.can_mark_at(8));
    }

    #[test]
    fn maybe_marks_are_cleared_by_reveal() {
        let mut game = small_game(3, 3, &[0]);

        game.mark(5).unwrap();
        game.mark(5).unwrap();
        assert_eq!(game.mark_at(5), Some(Mark::Maybe));

        let report = game.reveal(8, &mut no_placement()).unwrap();

        assert_eq!(report.unmarked, [5].into_iter().collect());
        assert_eq!(game.mark_at(5), None);
        assert!(game.revealed().contains(&5));
    }

    #[test]
    fn marking_cycles_and_respects_options() {
        let mut game = small_game(3, 3, &[0]);

        assert_eq!(game.mark(0), Ok(MarkOutcome::Changed(Some(Mark::Flag))));
        assert_eq!(game.mines_left(), 0);
        assert_eq!(game.mark(0), Ok(MarkOutcome::Changed(Some(Mark::Maybe))));
        assert_eq!(game.mark(0), Ok(MarkOutcome::Changed(None)));

        game.set_options(GameOptions {
            question_marks: false,
        });
        assert_eq!(game.mark(0), Ok(MarkOutcome::Changed(Some(Mark::Flag))));
        assert_eq!(game.mark(0), Ok(MarkOutcome::Changed(None)));
    }

    #[test]
    fn disabling_question_marks_keeps_existing_maybes() {
        let mut game = small_game(3, 3, &[0]);
        game.mark(4).unwrap();
        game.mark(4).unwrap();

        game.set_options(GameOptions {
            question_marks: false,
        });

        assert_eq!(game.mark_at(4), Some(Mark::Maybe));
        assert_eq!(game.mark(4), Ok(MarkOutcome::Changed(None)));
    }

    #[test]
    fn revealed_cells_cannot_be_marked() {
        let mut game = small_game(3, 3, &[0, 8]);

        game.reveal(4, &mut no_placement()).unwrap();

        assert_eq!(game.mark(4), Ok(MarkOutcome::NoChange));
        assert!(!game.can_mark_at(4));
        assert_eq!(
            game.reveal(4, &mut no_placement()).unwrap(),
            RevealReport::unchanged()
        );
    }

    #[test]
    fn extra_flags_drive_mines_left_negative() {
        let mut game = small_game(3, 3, &[0]);

        for index in [1, 2, 3] {
            game.mark(index).unwrap();
        }

        assert_eq!(game.flag_count(), 3);
        assert_eq!(game.mines_left(), -2);
    }

    #[test]
    fn invalid_index_is_rejected() {
        let mut game = small_game(3, 3, &[0]);

        assert_eq!(
            game.reveal(9, &mut no_placement()),
            Err(GameError::InvalidIndex)
        );
        assert_eq!(game.mark(100), Err(GameError::InvalidIndex));
        assert_eq!(game.label_at(9), Err(GameError::InvalidIndex));
    }

    #[test]
    fn restart_clears_everything() {
        let mut game = Game::new(GameSettings::default(), MARKS_ON);
        game.mark(3).unwrap();
        game.reveal(40, &mut RandomMinePlacer::from_seed(5)).unwrap();

        game.restart();

        assert_eq!(game.status(), GameStatus::Awaiting);
        assert!(game.mines().is_empty());
        assert!(game.revealed().is_empty());
        assert!(game.marks().is_empty());
        assert!(game.schema().is_none());
        assert_eq!(game.explosion(), None);
        assert_eq!(game.settings(), GameSettings::default());
    }

    #[test]
    fn labels_cover_the_whole_board() {
        let mut game = small_game(3, 3, &[0]);
        game.mark(0).unwrap();
        game.reveal(4, &mut no_placement()).unwrap();

        let labels = game.labels();

        assert_eq!(labels.dim(), (3, 3));
        assert_eq!(labels[[0, 0]], CellLabel::Flag);
        assert_eq!(labels[[1, 1]], CellLabel::Count(1));
        assert_eq!(labels[[2, 2]], CellLabel::Hidden);
    }

    #[test]
    fn labels_before_first_reveal_show_marks_only() {
        let mut game = Game::new(GameSettings::default(), MARKS_ON);
        game.mark(10).unwrap();

        assert_eq!(game.label_at(10), Ok(CellLabel::Flag));
        assert_eq!(game.label_at(11), Ok(CellLabel::Hidden));
    }

    #[test]
    fn random_games_end_consistently() {
        let settings = GameSettings::new(16, 16, 40);
        let mut placer = RandomMinePlacer::from_seed(11);

        for _ in 0..20 {
            let mut game = Game::new(settings, MARKS_ON);
            for index in settings.matrix().indexes() {
                if !game.can_reveal_at(index) {
                    continue;
                }
                if game.schema().is_some() && game.mines().contains(&index) {
                    continue;
                }
                game.reveal(index, &mut placer).unwrap();
            }

            assert_eq!(game.status(), GameStatus::Win);
            assert_eq!(game.revealed().len(), usize::from(settings.safe_cell_count()));
            assert!(game.revealed().is_disjoint(game.mines()));
        }
    }

    #[test]
    fn snapshot_survives_json() {
        let mines = [0, 80].into_iter().collect();
        let mut game = Game::with_mines(GameSettings::default(), MARKS_ON, mines);
        game.mark(80).unwrap();
        game.reveal(1, &mut no_placement()).unwrap();

        let json: String = serde_json::to_string(&game).unwrap();
        let restored: Game = serde_json::from_str(&json).unwrap();

        assert_eq!(restored, game);
    }

    #[test]
    fn awaiting_snapshot_keeps_deferred_placement() {
        let mut game = Game::new(GameSettings::default(), MARKS_ON);
        game.mark(7).unwrap();

        let value = serde_json::to_value(&game).unwrap();
        assert!(value["mines"].is_null());
        let mut restored: Game = serde_json::from_value(value).unwrap();

        assert_eq!(restored, game);
        assert!(restored.schema().is_none());
        restored.reveal(40, &mut RandomMinePlacer::from_seed(3)).unwrap();
        assert_eq!(restored.mines().len(), 10);
    }

    #[test]
    fn restored_schema_comes_from_mines() {
        let mines = [0, 80].into_iter().collect();
        let game = Game::with_mines(GameSettings::default(), MARKS_ON, mines);
        let small = MinefieldSchema::build(Matrix::new(3, 3), &[4].into_iter().collect());

        let mut value = serde_json::to_value(&game).unwrap();
        value["schema"] = serde_json::to_value(&small).unwrap();
        let mut restored: Game = serde_json::from_value(value).unwrap();

        assert_eq!(restored.schema(), game.schema());
        let report = restored.reveal(40, &mut no_placement()).unwrap();
        assert_eq!(report.revealed.len(), 79);
        assert_eq!(report.aftermath, RevealAftermath::Win);
    }

    #[test]
    fn snapshot_with_cells_outside_the_board_is_rejected() {
        let mines = [0, 80].into_iter().collect();
        let game = Game::with_mines(GameSettings::default(), MARKS_ON, mines);

        let mut value = serde_json::to_value(&game).unwrap();
        value["mines"] = serde_json::Value::from(vec![0, 500]);

        assert!(serde_json::from_value::<Game>(value).is_err());
    }

    #[test]
    fn snapshot_with_marked_revealed_cell_is_rejected() {
        let mines = [0, 80].into_iter().collect();
        let mut game = Game::with_mines(GameSettings::default(), MARKS_ON, mines);
        game.reveal(1, &mut no_placement()).unwrap();

        let mut value = serde_json::to_value(&game).unwrap();
        value["marks"] = serde_json::to_value(
            [(1, Mark::Flag)].into_iter().collect::<MarksMap>(),
        )
        .unwrap();

        assert!(serde_json::from_value::<Game>(value).is_err());
    }

    #[test]
    fn snapshot_consistency_checks() {
        let settings = GameSettings::default();
        let raw = |mines: Option<MineSet>, status, explosion| RawGame {
            settings,
            options: MARKS_ON,
            mines,
            revealed: [1].into_iter().collect(),
            marks: MarksMap::new(),
            status,
            explosion,
        };
        let placed = || Some([0, 1].into_iter().collect::<MineSet>());

        assert_eq!(
            Game::try_from(raw(None, GameStatus::Playing, None)),
            Err(GameError::InvalidSnapshot)
        );
        assert_eq!(
            Game::try_from(raw(placed(), GameStatus::Lose, None)),
            Err(GameError::InvalidSnapshot)
        );
        assert_eq!(
            Game::try_from(raw(placed(), GameStatus::Playing, Some(1))),
            Err(GameError::InvalidSnapshot)
        );
        assert_eq!(
            Game::try_from(raw(placed(), GameStatus::Lose, Some(0))),
            Err(GameError::InvalidSnapshot)
        );
        assert_eq!(
            Game::try_from(raw(placed(), GameStatus::Lose, Some(99))),
            Err(GameError::InvalidIndex)
        );

        let lost = Game::try_from(raw(placed(), GameStatus::Lose, Some(1))).unwrap();
        assert_eq!(lost.label_at(1), Ok(CellLabel::Exploded));
    }
}
