use core::fmt;
use core::ops::RangeInclusive;
use core::result::Result as StdResult;
use core::str::FromStr;
use serde::de::{self, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Serialize};

use crate::*;

const WIDTH_RANGE: RangeInclusive<i64> = 9..=30;
const HEIGHT_RANGE: RangeInclusive<i64> = 9..=24;
const MIN_BOMBS: i64 = 10;

/// Board geometry and mine count, always within the playable ranges.
///
/// Width is kept in `9..=30`, height in `9..=24` and bombs in
/// `10..=(width - 1) * (height - 1)`, which leaves room for a safe first click.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawGameSettings")]
pub struct GameSettings {
    width: Coord,
    height: Coord,
    bombs: CellCount,
}

impl GameSettings {
    pub(crate) const fn new_unchecked(width: Coord, height: Coord, bombs: CellCount) -> Self {
        Self {
            width,
            height,
            bombs,
        }
    }

    /// Clamps every value into range, the bomb ceiling follows the clamped size.
    pub fn new(width: i64, height: i64, bombs: i64) -> Self {
        let width = clamp(width, WIDTH_RANGE);
        let height = clamp(height, HEIGHT_RANGE);
        let max_bombs = (width - 1) * (height - 1);
        let bombs = clamp(bombs, MIN_BOMBS..=max_bombs);

        Self::new_unchecked(width as Coord, height as Coord, bombs as CellCount)
    }

    /// Truncates fractions and treats NaN as zero before clamping.
    pub fn normalized(width: f64, height: f64, bombs: f64) -> Self {
        // float to int casts truncate, saturate and map NaN to zero
        Self::new(width as i64, height as i64, bombs as i64)
    }

    pub const fn width(&self) -> Coord {
        self.width
    }

    pub const fn height(&self) -> Coord {
        self.height
    }

    pub const fn bombs(&self) -> CellCount {
        self.bombs
    }

    pub const fn matrix(&self) -> Matrix {
        Matrix::new(self.width, self.height)
    }

    pub const fn cell_count(&self) -> CellCount {
        mult(self.width, self.height)
    }

    pub const fn safe_cell_count(&self) -> CellCount {
        self.cell_count() - self.bombs
    }
}

impl Default for GameSettings {
    fn default() -> Self {
        BEGINNER
    }
}

fn clamp(value: i64, range: RangeInclusive<i64>) -> i64 {
    value.clamp(*range.start(), *range.end())
}

#[derive(Deserialize)]
struct RawGameSettings {
    #[serde(default)]
    width: Lenient,
    #[serde(default)]
    height: Lenient,
    #[serde(default)]
    bombs: Lenient,
}

impl From<RawGameSettings> for GameSettings {
    fn from(raw: RawGameSettings) -> Self {
        Self::new(raw.width.0, raw.height.0, raw.bombs.0)
    }
}

/// Number that accepts any input, anything non-numeric reads as zero.
#[derive(Default)]
struct Lenient(i64);

impl<'de> Deserialize<'de> for Lenient {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> StdResult<Self, D::Error> {
        deserializer.deserialize_any(LenientVisitor).map(Lenient)
    }
}

struct LenientVisitor;

impl<'de> Visitor<'de> for LenientVisitor {
    type Value = i64;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("any value")
    }

    fn visit_bool<E: de::Error>(self, _: bool) -> StdResult<i64, E> {
        Ok(0)
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> StdResult<i64, E> {
        Ok(value)
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> StdResult<i64, E> {
        Ok(i64::try_from(value).unwrap_or(i64::MAX))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> StdResult<i64, E> {
        Ok(value as i64)
    }

    fn visit_str<E: de::Error>(self, value: &str) -> StdResult<i64, E> {
        let value = value.trim();
        Ok(value
            .parse::<i64>()
            .ok()
            .or_else(|| value.parse::<f64>().ok().map(|value| value as i64))
            .unwrap_or(0))
    }

    fn visit_unit<E: de::Error>(self) -> StdResult<i64, E> {
        Ok(0)
    }

    fn visit_none<E: de::Error>(self) -> StdResult<i64, E> {
        Ok(0)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> StdResult<i64, D::Error> {
        deserializer.deserialize_any(self)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> StdResult<i64, A::Error> {
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(0)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> StdResult<i64, A::Error> {
        while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
        Ok(0)
    }
}

const BEGINNER: GameSettings = GameSettings::new_unchecked(9, 9, 10);
const INTERMEDIATE: GameSettings = GameSettings::new_unchecked(16, 16, 40);
const EXPERT: GameSettings = GameSettings::new_unchecked(30, 16, 99);

/// Difficulty presets plus the user-defined custom mode.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    Beginner,
    Intermediate,
    Expert,
    Custom,
}

impl GameMode {
    pub const ALL: [GameMode; 4] = [
        GameMode::Beginner,
        GameMode::Intermediate,
        GameMode::Expert,
        GameMode::Custom,
    ];

    pub const fn id(self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Expert => "expert",
            Self::Custom => "custom",
        }
    }

    /// Fixed settings of a preset, `None` for the custom mode.
    pub const fn preset(self) -> Option<GameSettings> {
        match self {
            Self::Beginner => Some(BEGINNER),
            Self::Intermediate => Some(INTERMEDIATE),
            Self::Expert => Some(EXPERT),
            Self::Custom => None,
        }
    }

    pub const fn is_preset(self) -> bool {
        self.preset().is_some()
    }
}

impl Default for GameMode {
    fn default() -> Self {
        Self::Beginner
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for GameMode {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.id() == s)
            .ok_or(GameError::UnknownGameMode)
    }
}

/// Player preferences that affect the engine.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameOptions {
    /// Whether marking cycles through the `maybe` state.
    pub question_marks: bool,
}

impl Default for GameOptions {
    fn default() -> Self {
        Self {
            question_marks: true,
        }
    }
}
