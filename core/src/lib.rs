//! Minesweeper minefield engine: mine placement, adjacency counts, flood-fill
//! reveals, marks and game outcomes.
//!
//! The free functions are pure transformations over plain data, [`Game`] threads
//! the canonical state of one game through them.

#![no_std]

extern crate alloc;

pub use error::*;
pub use game::*;
pub use generator::*;
pub use geometry::*;
pub use label::*;
pub use marks::*;
pub use outcome::*;
pub use reveal::*;
pub use schema::*;
pub use settings::*;
pub use types::*;

mod error;
mod game;
mod generator;
mod geometry;
mod label;
mod marks;
mod outcome;
mod reveal;
mod schema;
mod settings;
mod types;
