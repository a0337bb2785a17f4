//! Roof-reachability search for dangling-bubble detection
//!
//! A bubble stays on the board only while some path of occupied neighbours
//! reaches the ceiling row. The search is an explicit worklist traversal
//! (no recursion) over a `visited` set the caller owns, so the caller can
//! afterwards operate on exactly the explored component without
//! re-traversing.

use std::collections::HashSet;

use super::grid::{Cell, Grid};

/// Depth-first reachability from `start` to the ceiling row. Every explored
/// cell is recorded in `visited`, whatever the outcome. When the result is
/// `false`, `visited` contains the whole unreachable component.
///
/// Each cell is visited at most once, which bounds the search on the cyclic
/// hex-adjacency graph.
pub fn is_connected_to_roof(grid: &Grid, start: Cell, visited: &mut HashSet<Cell>) -> bool {
    if grid.bubble(start).is_none() {
        return false;
    }

    let mut stack = vec![start];
    while let Some(cell) = stack.pop() {
        if !visited.insert(cell) {
            continue;
        }
        if cell.row == 0 {
            return true;
        }
        // One-hop shortcut: at row 1, an occupied ceiling-adjacent neighbour
        // settles the question without walking the rest of the component
        if cell.row == 1
            && grid
                .neighbours(cell)
                .iter()
                .any(|n| n.row == 0 && grid.bubble(*n).is_some())
        {
            return true;
        }

        for neighbour in grid.neighbours(cell) {
            if grid.bubble(neighbour).is_some() && !visited.contains(&neighbour) {
                stack.push(neighbour);
            }
        }
    }

    false
}

/// Collect every bubble that lost its support after a removal pass.
///
/// `seeds` are the former neighbours of the removed cells. Each occupied,
/// not-yet-handled seed is checked for roof reachability with a fresh
/// component set; when a component cannot reach the roof, all of its cells
/// are scheduled, not just the queried seed, since many cells share one
/// unreachable island.
pub fn collect_dangling(grid: &Grid, seeds: &[Cell]) -> Vec<Cell> {
    let mut dangling = Vec::new();
    let mut handled: HashSet<Cell> = HashSet::new();

    for &seed in seeds {
        if handled.contains(&seed) || grid.bubble(seed).is_none() {
            continue;
        }

        let mut component = HashSet::new();
        if !is_connected_to_roof(grid, seed, &mut component) {
            // The component set is complete exactly when the search failed
            for cell in &component {
                handled.insert(*cell);
                dangling.push(*cell);
            }
        }
    }

    dangling
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::bubble::{Bubble, Colour};
    use glam::Vec2;

    fn bubble() -> Option<Bubble> {
        Some(Bubble::new(Colour::Red, Vec2::ZERO))
    }

    fn grid_from_rows(rows: Vec<Vec<Option<Bubble>>>) -> Grid {
        let mut grid = Grid::new(160.0, Vec2::new(32.0, 32.0), Vec2::ZERO);
        for row in rows {
            grid.add_row_bottom(row);
        }
        grid
    }

    #[test]
    fn ceiling_row_is_always_connected() {
        let grid = grid_from_rows(vec![vec![bubble()]]);
        let mut visited = HashSet::new();
        assert!(is_connected_to_roof(&grid, Cell::new(0, 0), &mut visited));
        assert!(visited.contains(&Cell::new(0, 0)));
    }

    #[test]
    fn empty_start_cell_is_not_connected() {
        let grid = grid_from_rows(vec![vec![bubble()]]);
        let mut visited = HashSet::new();
        assert!(!is_connected_to_roof(&grid, Cell::new(2, 0), &mut visited));
    }

    #[test]
    fn chain_to_ceiling_is_connected() {
        let grid = grid_from_rows(vec![
            vec![bubble()],
            vec![bubble()],
            vec![None, bubble()],
        ]);
        // (1, 2) -> (1, 1)? no: (1,2) touches (0,1) and (1,1); only (0,1) holds
        let mut visited = HashSet::new();
        assert!(is_connected_to_roof(&grid, Cell::new(1, 2), &mut visited));
    }

    #[test]
    fn island_below_a_gap_is_disconnected() {
        // Row 1 empty: row 2 bubbles have no path to the ceiling
        let grid = grid_from_rows(vec![
            vec![bubble(), bubble()],
            Vec::new(),
            vec![bubble(), bubble()],
        ]);
        let mut visited = HashSet::new();
        assert!(!is_connected_to_roof(&grid, Cell::new(0, 2), &mut visited));
        // The whole unreachable component was explored
        assert!(visited.contains(&Cell::new(0, 2)));
        assert!(visited.contains(&Cell::new(1, 2)));
    }

    #[test]
    fn connectivity_is_idempotent() {
        let grid = grid_from_rows(vec![
            vec![bubble(), bubble()],
            Vec::new(),
            vec![bubble(), bubble()],
        ]);
        for cell in [Cell::new(0, 0), Cell::new(0, 2)] {
            let first = is_connected_to_roof(&grid, cell, &mut HashSet::new());
            let second = is_connected_to_roof(&grid, cell, &mut HashSet::new());
            assert_eq!(first, second, "cell {cell:?}");
        }
    }

    #[test]
    fn collect_dangling_returns_whole_components() {
        let grid = grid_from_rows(vec![
            vec![bubble(), None, None, None, bubble()],
            vec![bubble(), None, None, bubble()],
            vec![bubble(), bubble(), None, None, bubble()],
        ]);
        // Left column chains to the roof; the right side of row 2 hangs off
        // (3, 1) which itself reaches the roof via (4, 0). Cut nothing and
        // nothing dangles.
        let seeds: Vec<Cell> = grid.occupied().map(|(c, _)| c).collect();
        assert!(collect_dangling(&grid, &seeds).is_empty());
    }

    #[test]
    fn collect_dangling_after_bridge_removal() {
        let mut grid = grid_from_rows(vec![
            vec![bubble(), None, None, None, None],
            vec![bubble(), None, None, None],
            vec![bubble(), bubble(), bubble(), None, None],
        ]);
        // Remove the bridge at (0, 1): everything in row 2 loses support
        grid.remove(Cell::new(0, 1));

        let seeds = vec![Cell::new(0, 2), Cell::new(0, 0)];
        let mut dangling = collect_dangling(&grid, &seeds);
        dangling.sort_by_key(|c| (c.row, c.col));
        assert_eq!(
            dangling,
            vec![Cell::new(0, 2), Cell::new(1, 2), Cell::new(2, 2)]
        );
    }

    #[test]
    fn duplicate_seeds_in_one_component_are_handled_once() {
        let mut grid = grid_from_rows(vec![
            vec![bubble()],
            vec![bubble()],
            vec![bubble(), bubble()],
        ]);
        grid.remove(Cell::new(0, 1));

        let seeds = vec![Cell::new(0, 2), Cell::new(1, 2), Cell::new(0, 2)];
        let dangling = collect_dangling(&grid, &seeds);
        assert_eq!(dangling.len(), 2);
    }
}
