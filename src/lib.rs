//! Hexpop - a hex-offset bubble grid engine
//!
//! Core modules:
//! - `engine`: the deterministic board core (grid bookkeeping, collision
//!   snapping, flood-fill matching, roof connectivity, scoring and row pacing)
//! - `tuning`: data-driven difficulty balance
//!
//! Rendering, input, audio and persistence are external collaborators; they
//! talk to the engine exclusively through [`engine::Board`].

pub mod engine;
pub mod tuning;

pub use engine::{
    Board, Bubble, BubbleState, Cell, Colour, CollisionOutcome, ConfigError, EngineConfig,
    GameEvent, Grid, RowKind,
};
pub use tuning::{Difficulty, Level, LevelTuning};

/// Engine configuration constants
pub mod consts {
    /// Vertical overlap between rows: row *r* sits at `r * 0.85 * height`,
    /// producing the hex-packed look of alternating offset rows.
    pub const ROW_OVERLAP: f32 = 0.85;

    /// A moving ball collides when its centre comes within this fraction of a
    /// bubble diameter of a resting bubble. Deliberately looser than 1.0 so
    /// in-flight balls visually overlap before stopping.
    pub const COLLISION_DISTANCE_FACTOR: f32 = 0.7;

    /// Minimum run length that triggers removal
    pub const MATCH_MIN: usize = 3;

    /// Points per matched bubble
    pub const MATCH_SCORE: u32 = 10;
    /// Points per dangling bubble
    pub const DANGLING_SCORE: u32 = 15;
    /// Fraction of the row-add modifier returned to the countdown per
    /// dangling bubble removed
    pub const DANGLING_TIME_BONUS: f32 = 0.5;

    /// Projectile speed in pixels per tick at the nominal tick rate; also the
    /// distance of one backward step during collision resolution
    pub const SHOT_SPEED: f32 = 10.0;
    /// Nominal fixed tick rate the speed constants are expressed against
    pub const NOMINAL_TICK_RATE: f32 = 60.0;

    /// Backward-stepping iteration cap, per row of grid height (guards
    /// against degenerate direction vectors)
    pub const BACKSTEP_CAP_PER_ROW: usize = 4;

    /// Falling-bubble vertical speed (pixels/sec)
    pub const FALL_SPEED: f32 = 420.0;
    /// Lateral kick speed range for falling bubbles (pixels/sec)
    pub const FALL_KICK_MIN: f32 = 40.0;
    pub const FALL_KICK_MAX: f32 = 120.0;

    /// Exploding-bubble scale decay (scale units/sec); pure visual decay
    pub const EXPLODE_DECAY: f32 = 4.0;

    /// Supported live-colour range
    pub const COLOUR_COUNT_MIN: usize = 4;
    pub const COLOUR_COUNT_MAX: usize = 9;
}
