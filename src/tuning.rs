//! Data-driven difficulty balance
//!
//! Each session starts from a tuning record selected by difficulty and
//! level: bubble scale (smaller bubbles mean more columns), live colour
//! count, the row-injection countdown modifier and the number of starting
//! rows.

use serde::{Deserialize, Serialize};

/// Difficulty bands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

/// Level progression within a difficulty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Level {
    Deca,
    Hecto,
    Kilo,
    Mega,
    Giga,
    Tera,
}

impl Level {
    pub const ALL: [Level; 6] = [
        Level::Deca,
        Level::Hecto,
        Level::Kilo,
        Level::Mega,
        Level::Giga,
        Level::Tera,
    ];
}

/// Per-session tuning record handed to the engine at level start
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelTuning {
    /// Bubble size multiplier applied to the base bubble diameter
    pub bubble_scale: f32,
    /// Live palette prefix (4..=9)
    pub colour_count: usize,
    /// Row-injection countdown decrement per resolved collision
    pub row_add_modifier: f32,
    /// Ceiling rows injected at level start
    pub starting_row_count: usize,
}

impl LevelTuning {
    pub const fn new(
        bubble_scale: f32,
        colour_count: usize,
        row_add_modifier: f32,
        starting_row_count: usize,
    ) -> Self {
        Self {
            bubble_scale,
            colour_count,
            row_add_modifier,
            starting_row_count,
        }
    }

    /// Preset for a difficulty/level pair
    pub fn preset(difficulty: Difficulty, level: Level) -> Self {
        match difficulty {
            Difficulty::Easy => match level {
                Level::Deca => Self::new(1.25, 4, 0.075, 3),
                Level::Hecto => Self::new(1.20, 5, 0.080, 3),
                Level::Kilo => Self::new(1.15, 6, 0.085, 3),
                Level::Mega => Self::new(1.10, 7, 0.090, 3),
                Level::Giga => Self::new(1.05, 8, 0.095, 3),
                Level::Tera => Self::new(1.00, 9, 0.100, 3),
            },
            Difficulty::Normal => match level {
                Level::Deca => Self::new(1.10, 4, 0.08, 4),
                Level::Hecto => Self::new(1.05, 5, 0.09, 4),
                Level::Kilo => Self::new(1.00, 6, 0.10, 4),
                Level::Mega => Self::new(0.95, 7, 0.11, 4),
                Level::Giga => Self::new(0.90, 8, 0.12, 4),
                Level::Tera => Self::new(0.85, 9, 0.13, 4),
            },
            Difficulty::Hard => match level {
                Level::Deca => Self::new(1.00, 4, 0.09, 5),
                Level::Hecto => Self::new(0.95, 5, 0.11, 5),
                Level::Kilo => Self::new(0.90, 6, 0.13, 5),
                Level::Mega => Self::new(0.85, 7, 0.15, 5),
                Level::Giga => Self::new(0.80, 8, 0.17, 5),
                Level::Tera => Self::new(0.75, 9, 0.19, 5),
            },
        }
    }
}
