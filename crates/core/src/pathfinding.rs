//! Deterministic A* over a [`WalkGrid`] and the flood fill used for connectivity checks.
//! Queries are read-only, so any number may run against one grid at once.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::error::Error;
use std::fmt;

use tracing::trace;

use crate::mapgen::WalkGrid;
use crate::types::Pos;

/// A query that names a cell outside the grid. This is a caller bug, unlike an
/// unreachable goal, which is reported as `Ok(None)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PathError {
    OutOfBounds { pos: Pos },
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfBounds { pos } => {
                write!(f, "cell ({}, {}) lies outside the grid", pos.x, pos.y)
            }
        }
    }
}

impl Error for PathError {}

/// Frontier entry. Ordering by `(f, seq)` pops the earliest-inserted entry among equal
/// f-scores, which matches a linear scan for the first minimum.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct OpenNode {
    f: u32,
    seq: u64,
    g: u32,
    y: i32,
    x: i32,
}

/// Shortest 4-connected path from `start` to `goal`, both included.
///
/// Returns `Ok(None)` when either endpoint is blocked or the goal cannot be reached.
pub fn find_path(grid: &WalkGrid, start: Pos, goal: Pos) -> Result<Option<Vec<Pos>>, PathError> {
    for pos in [start, goal] {
        if !grid.in_bounds(pos) {
            return Err(PathError::OutOfBounds { pos });
        }
    }
    if !grid.is_walkable(start) || !grid.is_walkable(goal) {
        return Ok(None);
    }
    if start == goal {
        return Ok(Some(vec![start]));
    }

    let mut open_set = BTreeSet::new();
    let mut g_score = BTreeMap::new();
    let mut came_from = BTreeMap::new();
    let mut seq = 0_u64;
    open_set.insert(OpenNode { f: manhattan(start, goal), seq, g: 0, y: start.y, x: start.x });
    g_score.insert(start, 0_u32);

    while let Some(curr) = open_set.pop_first() {
        let p = Pos { y: curr.y, x: curr.x };
        if p == goal {
            return Ok(Some(reconstruct_path(&came_from, start, goal)));
        }
        if g_score.get(&p).is_some_and(|&best| curr.g > best) {
            continue;
        }
        for n in neighbors(p) {
            if !grid.is_walkable(n) {
                continue;
            }
            let tg = curr.g + 1;
            if tg < *g_score.get(&n).unwrap_or(&u32::MAX) {
                came_from.insert(n, p);
                g_score.insert(n, tg);
                seq += 1;
                open_set.insert(OpenNode { f: tg + manhattan(n, goal), seq, g: tg, y: n.y, x: n.x });
            }
        }
    }
    trace!(?start, ?goal, explored = g_score.len(), "frontier exhausted without reaching goal");
    Ok(None)
}

/// Every walkable cell reachable from `start`, including `start` itself.
pub fn reachable_cells(grid: &WalkGrid, start: Pos) -> BTreeSet<Pos> {
    let mut visited = BTreeSet::new();
    if !grid.is_walkable(start) {
        return visited;
    }

    let mut queue = VecDeque::new();
    visited.insert(start);
    queue.push_back(start);

    while let Some(current) = queue.pop_front() {
        for neighbor in neighbors(current) {
            if grid.is_walkable(neighbor) && visited.insert(neighbor) {
                queue.push_back(neighbor);
            }
        }
    }

    visited
}

fn reconstruct_path(came: &BTreeMap<Pos, Pos>, start: Pos, goal: Pos) -> Vec<Pos> {
    let mut p = goal;
    let mut result = vec![p];
    while p != start {
        let Some(&previous) = came.get(&p) else {
            break;
        };
        p = previous;
        result.push(p);
    }
    result.reverse();
    result
}

pub fn neighbors(p: Pos) -> [Pos; 4] {
    [
        Pos { y: p.y - 1, x: p.x },
        Pos { y: p.y, x: p.x + 1 },
        Pos { y: p.y + 1, x: p.x },
        Pos { y: p.y, x: p.x - 1 },
    ]
}

pub fn manhattan(a: Pos, b: Pos) -> u32 {
    a.x.abs_diff(b.x) + a.y.abs_diff(b.y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_equal_to_goal_yields_single_cell_path() {
        let grid = WalkGrid::from_rows(&["...", "...", "..."]);
        let start = Pos::new(1, 1);
        assert_eq!(find_path(&grid, start, start), Ok(Some(vec![start])));
    }

    #[test]
    fn path_detours_around_wall() {
        let grid = WalkGrid::from_rows(&[
            ".....", //
            ".###.", //
            ".....",
        ]);
        let path = find_path(&grid, Pos::new(0, 1), Pos::new(4, 1))
            .expect("in bounds")
            .expect("reachable");
        assert_eq!(path.first(), Some(&Pos::new(0, 1)));
        assert_eq!(path.last(), Some(&Pos::new(4, 1)));
        assert_eq!(path.len(), 7);
        assert!(path.iter().all(|&pos| grid.is_walkable(pos)));
    }

    #[test]
    fn walled_in_cell_has_no_path() {
        let grid = WalkGrid::from_rows(&[
            ".....", //
            ".###.", //
            ".#.#.", //
            ".###.",
        ]);
        assert_eq!(find_path(&grid, Pos::new(0, 0), Pos::new(2, 2)), Ok(None));
        assert_eq!(find_path(&grid, Pos::new(2, 2), Pos::new(0, 0)), Ok(None));
    }

    #[test]
    fn blocked_endpoint_has_no_path() {
        let grid = WalkGrid::from_rows(&["..#"]);
        assert_eq!(find_path(&grid, Pos::new(0, 0), Pos::new(2, 0)), Ok(None));
        assert_eq!(find_path(&grid, Pos::new(2, 0), Pos::new(0, 0)), Ok(None));
    }

    #[test]
    fn out_of_bounds_endpoint_is_an_error_not_a_missing_path() {
        let grid = WalkGrid::from_rows(&["...", "..."]);
        let outside = Pos::new(3, 0);
        assert_eq!(
            find_path(&grid, Pos::new(0, 0), outside),
            Err(PathError::OutOfBounds { pos: outside })
        );
        assert_eq!(
            find_path(&grid, Pos::new(0, -1), Pos::new(0, 0)),
            Err(PathError::OutOfBounds { pos: Pos::new(0, -1) })
        );
    }

    #[test]
    fn equal_cost_routes_resolve_the_same_way_every_time() {
        let grid = WalkGrid::from_rows(&["....", "....", "...."]);
        let first = find_path(&grid, Pos::new(0, 0), Pos::new(3, 2)).expect("in bounds");
        for _ in 0..8 {
            assert_eq!(find_path(&grid, Pos::new(0, 0), Pos::new(3, 2)).expect("in bounds"), first);
        }
        assert_eq!(first.map(|path| path.len()), Some(6));
    }

    #[test]
    fn reachable_cells_stops_at_walls() {
        let grid = WalkGrid::from_rows(&["..#..", "..#.."]);
        assert_eq!(reachable_cells(&grid, Pos::new(0, 0)).len(), 4);
        assert!(reachable_cells(&grid, Pos::new(2, 0)).is_empty());
    }
}
