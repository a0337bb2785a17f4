//! Bubble entity and its lifecycle state machine
//!
//! A bubble is owned by exactly one of: a grid cell (`Still`), the projectile
//! controller (`Shot`), or the animation list (`Falling`/`Exploding`).
//! `Dead` is terminal; the animation-list owner drops the bubble once it
//! observes that state.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// The full bubble palette. A session plays with a prefix of this list,
/// selected by the tuning record's colour count (4..=9).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Colour {
    Red,
    Blue,
    Green,
    Yellow,
    Turquoise,
    Purple,
    Pink,
    Orange,
    Black,
}

impl Colour {
    /// Number of palette entries
    pub const PALETTE: usize = 9;

    /// All palette colours in index order
    pub const ALL: [Colour; Colour::PALETTE] = [
        Colour::Red,
        Colour::Blue,
        Colour::Green,
        Colour::Yellow,
        Colour::Turquoise,
        Colour::Purple,
        Colour::Pink,
        Colour::Orange,
        Colour::Black,
    ];

    /// Stable palette index of this colour
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Palette colour at `index`, if in range
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

/// Bubble lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BubbleState {
    /// Resting in a grid cell
    Still,
    /// In flight, owned by the projectile controller
    Shot,
    /// Dropping off the board with a lateral kick (pixels/sec)
    Falling { kick: f32 },
    /// Matched-run pop animation; scale shrinks to zero (visual decay only)
    Exploding { scale: f32 },
    /// Pending removal from any live list
    Dead,
}

/// A bubble entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bubble {
    pub colour: Colour,
    /// Continuous position (centre), for in-flight and animation rendering
    pub pos: Vec2,
    /// Velocity while `Shot` (owned by the projectile controller)
    pub vel: Vec2,
    pub state: BubbleState,
}

impl Bubble {
    pub fn new(colour: Colour, pos: Vec2) -> Self {
        Self {
            colour,
            pos,
            vel: Vec2::ZERO,
            state: BubbleState::Still,
        }
    }

    /// Hand the bubble to the projectile controller, travelling along `dir`
    pub fn shoot(&mut self, dir: Vec2) {
        self.vel = dir.normalize_or_zero() * SHOT_SPEED * NOMINAL_TICK_RATE;
        self.state = BubbleState::Shot;
    }

    /// Begin the dangling fall. The kick direction is chosen by the bubble's
    /// x position relative to the board midline; the magnitude is randomized.
    pub fn start_falling<R: Rng>(&mut self, midline_x: f32, rng: &mut R) {
        let magnitude = rng.random_range(FALL_KICK_MIN..FALL_KICK_MAX);
        let kick = if self.pos.x < midline_x {
            -magnitude
        } else {
            magnitude
        };
        self.state = BubbleState::Falling { kick };
    }

    /// Begin the matched-run pop animation
    pub fn start_exploding(&mut self) {
        self.state = BubbleState::Exploding { scale: 1.0 };
    }

    /// Render scale for the current state (1.0 while live)
    pub fn scale(&self) -> f32 {
        match self.state {
            BubbleState::Exploding { scale } => scale,
            BubbleState::Dead => 0.0,
            _ => 1.0,
        }
    }

    /// Advance the falling/exploding animation by `dt` seconds. `floor_y` is
    /// the y coordinate past which a falling bubble is off the board.
    pub fn step_animation(&mut self, dt: f32, floor_y: f32) {
        match &mut self.state {
            BubbleState::Falling { kick } => {
                self.pos += Vec2::new(*kick, FALL_SPEED) * dt;
                if self.pos.y > floor_y {
                    self.state = BubbleState::Dead;
                }
            }
            BubbleState::Exploding { scale } => {
                *scale -= EXPLODE_DECAY * dt;
                if *scale <= 0.0 {
                    self.state = BubbleState::Dead;
                }
            }
            _ => {}
        }
    }

    /// True once the animating-list owner should drop all references
    #[inline]
    pub fn is_dead(&self) -> bool {
        self.state == BubbleState::Dead
    }
}
