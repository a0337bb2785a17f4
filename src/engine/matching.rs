//! Same-colour run detection (flood fill)
//!
//! Frontier-based expansion from a seed cell. The finder only computes
//! connectivity; the match-3 removal threshold is the caller's policy.

use std::collections::HashSet;

use super::grid::{Cell, Grid};

/// Collect the run of same-colour bubbles connected to `seed`: the seed plus
/// every occupied neighbour (transitively) sharing the seed's colour. Returns
/// an empty list if the seed cell holds no bubble.
pub fn find_run(grid: &Grid, seed: Cell) -> Vec<Cell> {
    let Some(seed_bubble) = grid.bubble(seed) else {
        return Vec::new();
    };
    let colour = seed_bubble.colour;

    let mut collected: HashSet<Cell> = HashSet::new();
    collected.insert(seed);
    let mut run = vec![seed];

    let mut frontier = grid.neighbours(seed);
    while !frontier.is_empty() {
        let mut next = Vec::new();
        for cell in frontier {
            if collected.contains(&cell) {
                continue;
            }
            let Some(bubble) = grid.bubble(cell) else {
                continue;
            };
            if bubble.colour != colour {
                continue;
            }
            collected.insert(cell);
            run.push(cell);
            next.extend(grid.neighbours(cell));
        }
        frontier = next;
    }

    run
}
