//! Breadth-first wire path search.

use machinery_core::geometry::GridPosition;
use machinery_spatial::{CellGrid, Placeability};
use std::collections::VecDeque;

/// Whether a wire may pass through `pos`. Component cells and cells already
/// carrying a wire are closed except for the two endpoints being connected.
fn passable(grid: &CellGrid, pos: GridPosition, start: GridPosition, end: GridPosition) -> bool {
    match grid.try_cell(pos) {
        None => false,
        Some(cell) if cell.placeability == Placeability::Blocked => false,
        Some(_) if pos == start || pos == end => true,
        Some(cell) => !cell.has_component() && !cell.has_wire(),
    }
}

/// Shortest 4-connected path from `start` to `end`, both inclusive.
///
/// Neighbors expand up, down, left, right, so ties resolve in that order.
/// Existing wires are never crossed.
/// Returns an empty path when `end` is unreachable or either endpoint is
/// outside the grid, and `[start]` when `start == end`.
pub fn find_path(grid: &CellGrid, start: GridPosition, end: GridPosition) -> Vec<GridPosition> {
    let (Some(s), Some(goal)) = (grid.to_index(start), grid.to_index(end)) else {
        return Vec::new();
    };
    if s == goal {
        return vec![start];
    }

    let n = grid.cell_count();
    let mut came_from: Vec<Option<usize>> = vec![None; n];
    let mut visited = vec![false; n];
    let mut frontier = VecDeque::new();
    visited[s] = true;
    frontier.push_back(start);

    while let Some(current) = frontier.pop_front() {
        if current == end {
            break;
        }
        let from = grid.to_index(current);
        for next in current.neighbors_4() {
            let Some(i) = grid.to_index(next) else {
                continue;
            };
            if visited[i] || !passable(grid, next, start, end) {
                continue;
            }
            visited[i] = true;
            came_from[i] = from;
            frontier.push_back(next);
        }
    }

    if !visited[goal] {
        return Vec::new();
    }

    let mut path = vec![end];
    let mut step = goal;
    while let Some(prev) = came_from[step] {
        path.push(grid.from_index(prev));
        step = prev;
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use machinery_core::id::WireId;
    use machinery_spatial::WireType;
    use proptest::prelude::*;
    use slotmap::SlotMap;

    fn open(w: u32, h: u32) -> CellGrid {
        CellGrid::filled(w, h, Placeability::Placeable).unwrap()
    }

    fn p(x: i32, y: i32) -> GridPosition {
        GridPosition::new(x, y)
    }

    fn assert_contiguous(path: &[GridPosition]) {
        for pair in path.windows(2) {
            assert_eq!(pair[0].manhattan_distance(&pair[1]), 1, "gap in {path:?}");
        }
    }

    #[test]
    fn straight_row() {
        let grid = open(4, 1);
        assert_eq!(
            find_path(&grid, p(0, 0), p(3, 0)),
            vec![p(0, 0), p(1, 0), p(2, 0), p(3, 0)]
        );
    }

    #[test]
    fn same_cell_is_single_step() {
        let grid = open(3, 3);
        assert_eq!(find_path(&grid, p(1, 1), p(1, 1)), vec![p(1, 1)]);
    }

    #[test]
    fn out_of_bounds_endpoint_has_no_path() {
        let grid = open(3, 3);
        assert!(find_path(&grid, p(0, 0), p(3, 0)).is_empty());
        assert!(find_path(&grid, p(-1, 0), p(1, 0)).is_empty());
    }

    #[test]
    fn ties_prefer_vertical_first() {
        // Up is expanded before right, so the route climbs first.
        let grid = open(2, 2);
        assert_eq!(
            find_path(&grid, p(0, 0), p(1, 1)),
            vec![p(0, 0), p(0, 1), p(1, 1)]
        );
    }

    #[test]
    fn detours_around_blocked_cells() {
        // . . .
        // . # .
        // S # E
        let grid = CellGrid::from_fn(3, 3, |pos| {
            if pos.x == 1 && pos.y < 2 {
                Placeability::Blocked
            } else {
                Placeability::Placeable
            }
        })
        .unwrap();
        let path = find_path(&grid, p(0, 0), p(2, 0));
        assert_eq!(path.len(), 7);
        assert_eq!(path.first(), Some(&p(0, 0)));
        assert_eq!(path.last(), Some(&p(2, 0)));
        assert!(path.contains(&p(1, 2)));
        assert_contiguous(&path);
    }

    #[test]
    fn enclosed_goal_is_unreachable() {
        let grid = CellGrid::from_fn(5, 5, |pos| {
            let ring = (1..=3).contains(&pos.x)
                && (1..=3).contains(&pos.y)
                && !(pos.x == 2 && pos.y == 2);
            if ring {
                Placeability::Blocked
            } else {
                Placeability::Placeable
            }
        })
        .unwrap();
        assert!(find_path(&grid, p(0, 0), p(2, 2)).is_empty());
    }

    #[test]
    fn blocked_goal_is_unreachable() {
        let grid = CellGrid::from_fn(3, 1, |pos| {
            if pos.x == 2 {
                Placeability::Blocked
            } else {
                Placeability::Placeable
            }
        })
        .unwrap();
        assert!(find_path(&grid, p(0, 0), p(2, 0)).is_empty());
    }

    #[test]
    fn connectors_only_and_display_cells_are_passable() {
        let grid = CellGrid::from_fn(3, 1, |pos| match pos.x {
            1 => Placeability::ConnectorsOnly,
            2 => Placeability::Display,
            _ => Placeability::Placeable,
        })
        .unwrap();
        assert_eq!(find_path(&grid, p(0, 0), p(2, 0)).len(), 3);
    }

    #[test]
    fn existing_wires_are_not_crossed() {
        let mut grid = open(3, 3);
        let mut wires = SlotMap::<WireId, ()>::with_key();
        let id = wires.insert(());
        for x in 0..3 {
            grid.cell_mut(p(x, 1)).unwrap().set_wire(WireType::AC, id);
        }
        assert!(find_path(&grid, p(1, 0), p(1, 2)).is_empty());

        grid.cell_mut(p(2, 1)).unwrap().clear_wire();
        let path = find_path(&grid, p(1, 0), p(1, 2));
        assert_eq!(path.len(), 5);
        assert!(path.contains(&p(2, 1)));
        assert!(!path.contains(&p(1, 1)));
    }

    proptest! {
        #[test]
        fn open_grid_length_is_manhattan(
            w in 1u32..12,
            h in 1u32..12,
            a in 0u32..144,
            b in 0u32..144,
        ) {
            let grid = open(w, h);
            let n = w * h;
            let start = grid.from_index((a % n) as usize);
            let end = grid.from_index((b % n) as usize);
            let path = find_path(&grid, start, end);
            prop_assert_eq!(path.len() as u32, start.manhattan_distance(&end) + 1);
            prop_assert_eq!(path.first(), Some(&start));
            prop_assert_eq!(path.last(), Some(&end));
            for pair in path.windows(2) {
                prop_assert_eq!(pair[0].manhattan_distance(&pair[1]), 1);
            }
        }
    }
}
