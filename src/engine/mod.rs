//! Deterministic engine module
//!
//! All board logic lives here. This module must be pure and deterministic:
//! - Single-threaded, frame-stepped; every resolve/match/sweep pass runs to
//!   completion within one call
//! - Seeded RNG only
//! - No rendering or platform dependencies; collaborators copy positions out

pub mod board;
pub mod bubble;
pub mod collision;
pub mod connectivity;
pub mod grid;
pub mod matching;

pub use board::{Board, ConfigError, EngineConfig, GameEvent};
pub use bubble::{Bubble, BubbleState, Colour};
pub use collision::CollisionOutcome;
pub use connectivity::{collect_dangling, is_connected_to_roof};
pub use grid::{Cell, Grid, RowKind};
pub use matching::find_run;
