//! Projectile-to-grid collision detection and cell settlement
//!
//! Detection triggers on ceiling touch or on proximity to any resting
//! bubble. Settlement walks the ball backward along its incoming direction
//! until a free cell is found, or until the candidate row is one past the
//! last row (a new row, always free).

use glam::Vec2;

use super::bubble::Bubble;
use super::grid::{Cell, Grid};
use crate::consts::{BACKSTEP_CAP_PER_ROW, COLLISION_DISTANCE_FACTOR};

/// Result of a collision-resolve call
#[derive(Debug)]
pub struct CollisionOutcome {
    /// Whether a collision was handled this call
    pub hit: bool,
    /// On a miss, the ball handed back to the projectile controller; on a
    /// hit the grid has taken ownership
    pub returned: Option<Bubble>,
}

/// Check whether a ball at `pos` has collided with the board: its top edge
/// crossed above the ceiling, or its centre came within 0.7 diameters of a
/// resting bubble.
pub fn check_collision(grid: &Grid, pos: Vec2) -> bool {
    let size = grid.bubble_size();
    if pos.y - size.y * 0.5 < grid.offset().y {
        return true;
    }

    let threshold = size.x * COLLISION_DISTANCE_FACTOR;
    grid.occupied()
        .any(|(_, bubble)| (bubble.pos - pos).length() < threshold)
}

/// Resolve the cell a colliding ball settles into.
///
/// If the cell under the ball is occupied, steps the ball backward along the
/// negative travel direction by `backstep` and recomputes, until an empty
/// cell is found or the candidate row reaches `row_count`. A hard iteration
/// cap covers degenerate direction vectors (zero or non-finite `dir`), where
/// stepping cannot make progress; on exhaustion the ball is forced into the
/// new bottom row at its current column.
pub fn settle(grid: &Grid, pos: Vec2, dir: Vec2, backstep: f32) -> Cell {
    let mut pos = pos;
    let mut cell = grid.pixel_to_cell(pos);
    let cap = BACKSTEP_CAP_PER_ROW * (grid.row_count() + 1);

    let mut steps = 0;
    while cell.row < grid.row_count() && grid.bubble(cell).is_some() {
        if steps >= cap {
            // The new bottom row has the opposite kind and may hold one
            // fewer column than the row the ball stalled in.
            let max_col = grid.columns_for(grid.next_kind_bottom()).saturating_sub(1);
            let col = cell.col.min(max_col);
            log::warn!(
                "backstep cap hit after {steps} steps (dir {dir:?}); forcing new row at col {col}"
            );
            return Cell::new(col, grid.row_count());
        }
        pos -= dir * backstep;
        cell = grid.pixel_to_cell(pos);
        steps += 1;
        log::trace!("backstep {steps}: pos {pos:?} -> cell {cell:?}");
    }

    cell
}
