//! Board session: the engine's boundary surface
//!
//! A `Board` owns the grid, the seeded RNG, the score, the row-injection
//! countdown and the animation list for one game/level. External
//! collaborators (projectile controller, renderer, level sequencer) drive it
//! through the methods here; every resolve/match/sweep/score pass runs to
//! completion inside one call.

use std::collections::HashSet;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::bubble::{Bubble, Colour};
use super::collision::{self, CollisionOutcome};
use super::connectivity;
use super::grid::{Cell, Grid};
use super::matching;
use crate::consts::*;
use crate::tuning::LevelTuning;

/// Engine configuration, supplied once per game/level. Replaces any notion
/// of process-wide state: everything the engine needs is in here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Playfield width in pixels; determines the column counts
    pub board_width: f32,
    /// Top-left corner of the playfield
    pub board_offset: Vec2,
    /// Base bubble diameter before the tuning scale is applied
    pub bubble_size: Vec2,
    /// Row count above which the session is lost
    pub max_rows: usize,
    pub tuning: LevelTuning,
}

/// Construction failures. A board built from an invalid configuration is an
/// invalid state, not a recoverable condition, so these fail fast.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("colour count {0} outside supported range {COLOUR_COUNT_MIN}..={COLOUR_COUNT_MAX}")]
    ColourCount(usize),
    #[error("bubble size must be positive and finite, got {0}x{1}")]
    BubbleSize(f32, f32),
    #[error("bubble scale must be positive and finite, got {0}")]
    BubbleScale(f32),
    #[error("board width {width} cannot fit a single half row (needs at least {min})")]
    BoardWidth { width: f32, min: f32 },
    #[error("max_rows must be at least 1")]
    MaxRows,
}

/// Hints for audio/FX collaborators, drained once per tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A matched run popped
    Pop { count: u32 },
    /// Dangling bubbles started falling
    Fall { count: u32 },
    /// The countdown expired and a ceiling row was injected
    RowInjected,
}

/// A single game/level session
#[derive(Debug)]
pub struct Board {
    grid: Grid,
    config: EngineConfig,
    rng: Pcg32,
    score: u32,
    /// Row-injection countdown in `[0, 1 + modifier]`
    add_row_time: f32,
    /// Y past which falling bubbles are off the board
    floor_y: f32,
    events: Vec<GameEvent>,
    animations: Vec<Bubble>,
}

impl Board {
    /// Create a session. Fails fast on configurations the engine cannot
    /// honour.
    pub fn new(config: EngineConfig, seed: u64) -> Result<Self, ConfigError> {
        let colours = config.tuning.colour_count;
        if !(COLOUR_COUNT_MIN..=COLOUR_COUNT_MAX).contains(&colours) {
            return Err(ConfigError::ColourCount(colours));
        }
        let size = config.bubble_size;
        if !(size.x > 0.0 && size.y > 0.0 && size.is_finite()) {
            return Err(ConfigError::BubbleSize(size.x, size.y));
        }
        let scale = config.tuning.bubble_scale;
        if !(scale > 0.0 && scale.is_finite()) {
            return Err(ConfigError::BubbleScale(scale));
        }
        if config.max_rows == 0 {
            return Err(ConfigError::MaxRows);
        }

        let scaled = size * scale;
        // A Half row holds floor(width/w - 0.5) columns; require at least one
        let min_width = scaled.x * 1.5;
        if config.board_width < min_width {
            return Err(ConfigError::BoardWidth {
                width: config.board_width,
                min: min_width,
            });
        }

        let grid = Grid::new(config.board_width, scaled, config.board_offset);
        let floor_y =
            config.board_offset.y + (config.max_rows as f32 + 2.0) * ROW_OVERLAP * scaled.y;

        Ok(Self {
            grid,
            config,
            rng: Pcg32::seed_from_u64(seed),
            score: 0,
            add_row_time: 1.0,
            floor_y,
            events: Vec::new(),
            animations: Vec::new(),
        })
    }

    /// Inject the configured number of starting rows at the ceiling
    pub fn start_rows(&mut self) {
        for _ in 0..self.config.tuning.starting_row_count {
            self.add_row_top();
        }
    }

    /// Add a row of random bubbles above the ceiling row
    pub fn add_row_top(&mut self) {
        let width = self.grid.columns_for(self.grid.next_kind_top());
        let cells: Vec<Option<Bubble>> = (0..width)
            .map(|_| Some(Bubble::new(self.generate_colour_in_play(), Vec2::ZERO)))
            .collect();
        self.grid.add_row_top(cells);
    }

    /// Add a caller-built row below the last row. Wrong-length lists are
    /// padded or truncated to the destination width.
    pub fn add_row_bottom(&mut self, cells: Vec<Option<Bubble>>) {
        self.grid.add_row_bottom(cells);
    }

    /// Advance one projectile against the board. On a hit, the ball is
    /// committed to its resolved cell and the full match/dangling/score/
    /// pacing pass runs; on a miss, the ball is handed back in the outcome.
    pub fn resolve_collision(&mut self, ball: Bubble, dt: f32) -> CollisionOutcome {
        if !collision::check_collision(&self.grid, ball.pos) {
            return CollisionOutcome {
                hit: false,
                returned: Some(ball),
            };
        }

        // One speed-unit is the distance covered this tick; floor it so a
        // degenerate dt still makes backward progress
        let dir = ball.vel.normalize_or_zero();
        let mut backstep = SHOT_SPEED * dt * NOMINAL_TICK_RATE;
        if !(backstep > 0.0) {
            backstep = SHOT_SPEED;
        }

        let cell = collision::settle(&self.grid, ball.pos, dir, backstep);
        if cell.row == self.grid.row_count() {
            self.grid.add_row_bottom(Vec::new());
        }
        self.grid.insert(cell, ball);

        let run = matching::find_run(&self.grid, cell);
        if run.len() >= MATCH_MIN {
            self.remove_run(&run);
        }

        // The countdown ticks on every resolved collision, match or not
        self.add_row_time -= self.config.tuning.row_add_modifier;
        if self.add_row_time <= 0.0 {
            self.add_row_top();
            self.add_row_time = 1.0;
            self.events.push(GameEvent::RowInjected);
        }

        CollisionOutcome {
            hit: true,
            returned: None,
        }
    }

    /// Pop a matched run, sweep the bubbles it was supporting, update score
    /// and the countdown bonus, then prune empty trailing rows.
    fn remove_run(&mut self, run: &[Cell]) {
        let run_set: HashSet<Cell> = run.iter().copied().collect();

        // The run's former neighbours seed the dangling sweep
        let mut seeds: Vec<Cell> = Vec::new();
        for &cell in run {
            for neighbour in self.grid.neighbours(cell) {
                if !run_set.contains(&neighbour) {
                    seeds.push(neighbour);
                }
            }
        }

        let midline = self.grid.midline_x();
        for &cell in run {
            if let Some(mut bubble) = self.grid.remove(cell) {
                bubble.start_exploding();
                self.score += MATCH_SCORE;
                self.animations.push(bubble);
            }
        }
        self.events.push(GameEvent::Pop {
            count: run.len() as u32,
        });
        log::debug!("popped run of {}", run.len());

        let dangling = connectivity::collect_dangling(&self.grid, &seeds);
        if !dangling.is_empty() {
            let modifier = self.config.tuning.row_add_modifier;
            for &cell in &dangling {
                if let Some(mut bubble) = self.grid.remove(cell) {
                    bubble.start_falling(midline, &mut self.rng);
                    self.score += DANGLING_SCORE;
                    // Each dropped bubble buys back countdown time
                    self.add_row_time = (self.add_row_time + modifier * DANGLING_TIME_BONUS)
                        .min(1.0 + modifier);
                    self.animations.push(bubble);
                }
            }
            self.events.push(GameEvent::Fall {
                count: dangling.len() as u32,
            });
            log::debug!("dropped {} dangling bubbles", dangling.len());
        }

        self.grid.prune_trailing_empty_rows();
    }

    /// Draw a colour for a new bubble. Constrained to colours currently on
    /// the board once any exist; before that, any live palette colour.
    pub fn generate_colour_in_play(&mut self) -> Colour {
        let live = self.config.tuning.colour_count;
        if self.grid.total_bubbles() == 0 {
            let index = self.rng.random_range(0..live);
            return Colour::from_index(index).unwrap_or(Colour::Red);
        }

        let counts = self.grid.colour_counts();
        let in_play: Vec<usize> = (0..Colour::PALETTE).filter(|&i| counts[i] > 0).collect();
        let index = in_play[self.rng.random_range(0..in_play.len())];
        Colour::from_index(index).unwrap_or(Colour::Red)
    }

    /// Occupied-cell count per palette colour
    pub fn colour_in_play_counts(&self) -> [u32; Colour::PALETTE] {
        self.grid.colour_counts()
    }

    /// Total score
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Row-injection countdown for a progress-bar collaborator, clamped to
    /// `[0, 1]` (the internal value may transiently exceed 1.0 from the
    /// dangling bonus)
    pub fn add_row_time(&self) -> f32 {
        self.add_row_time.clamp(0.0, 1.0)
    }

    /// Bubbles resting on the board
    pub fn balls_left(&self) -> u32 {
        self.grid.total_bubbles()
    }

    /// Terminal board-overflow signal, polled by the end-of-game
    /// collaborator
    pub fn has_lost(&self) -> bool {
        self.grid.row_count() > self.config.max_rows
    }

    /// Take all pending audio/FX hints
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Bubbles currently animating (falling or exploding)
    pub fn animations(&self) -> &[Bubble] {
        &self.animations
    }

    /// Advance animations and drop every bubble that reached `Dead`
    pub fn step_animations(&mut self, dt: f32) {
        for bubble in &mut self.animations {
            bubble.step_animation(dt, self.floor_y);
        }
        self.animations.retain(|b| !b.is_dead());
    }

    /// Resting-bubble positions and colours, copied out for rendering
    pub fn bubbles(&self) -> impl Iterator<Item = (Vec2, Colour)> + '_ {
        self.grid.occupied().map(|(_, b)| (b.pos, b.colour))
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}
