use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid cell index")]
    InvalidIndex,
    #[error("Unknown game mode")]
    UnknownGameMode,
    #[error("Game already ended, no new moves are accepted")]
    AlreadyEnded,
    #[error("Snapshot does not describe a consistent game")]
    InvalidSnapshot,
}

pub type Result<T> = core::result::Result<T, GameError>;
