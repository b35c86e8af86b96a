//! Weighted-grid A* with axis-preference tie-breaking and an optional
//! closest-reachable fallback.
//!
//! The search is stateless: callers build a [`PassabilityGrid`] for every
//! query (AI systems mark every active solid except the seeker as blocked).
//! Every step costs 1; the heuristic is Manhattan distance, or Chebyshev when
//! diagonal moves are allowed.
//!
//! Among frontier nodes with equal `f`, moves along the axis with the larger
//! remaining gap are expanded first, which keeps paths straight instead of
//! zig-zagging.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet, BinaryHeap};

use gridlab_ecs::component::{Delta, Position};

const ORTHOGONAL: [Delta; 4] = [(0, -1), (0, 1), (-1, 0), (1, 0)];
const DIAGONAL: [Delta; 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

// ---------------------------------------------------------------------------
// PassabilityGrid
// ---------------------------------------------------------------------------

/// Boolean occupancy grid: `true` = open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassabilityGrid {
    width: i32,
    height: i32,
    open: Vec<bool>,
}

impl PassabilityGrid {
    /// An all-open grid.
    pub fn new(width: i32, height: i32) -> Self {
        let len = (width.max(0) as usize) * (height.max(0) as usize);
        Self {
            width,
            height,
            open: vec![true; len],
        }
    }

    /// Parse rows of `.` (open) and any other character (blocked).
    ///
    /// Rows shorter than the first are padded as blocked.
    pub fn from_rows(rows: &[&str]) -> Self {
        let height = rows.len() as i32;
        let width = rows.first().map_or(0, |r| r.chars().count()) as i32;
        let mut grid = Self::new(width, height);
        for (y, row) in rows.iter().enumerate() {
            let chars: Vec<char> = row.chars().collect();
            for x in 0..width as usize {
                if chars.get(x) != Some(&'.') {
                    grid.block(Position::new(x as i32, y as i32));
                }
            }
        }
        grid
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    fn index(&self, cell: Position) -> Option<usize> {
        if (0..self.width).contains(&cell.x) && (0..self.height).contains(&cell.y) {
            Some((cell.y * self.width + cell.x) as usize)
        } else {
            None
        }
    }

    /// Mark `cell` as impassable. Out-of-bounds cells are ignored.
    pub fn block(&mut self, cell: Position) {
        if let Some(i) = self.index(cell) {
            self.open[i] = false;
        }
    }

    /// In bounds and open.
    pub fn is_open(&self, cell: Position) -> bool {
        self.index(cell).is_some_and(|i| self.open[i])
    }
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

/// Knobs for [`search`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchOptions {
    /// Allow the four diagonal moves (and use the Chebyshev heuristic).
    pub diagonal: bool,
    /// When the goal is unreachable, path to the reachable cell closest to it.
    pub fallback: bool,
}

/// Grid distance: Chebyshev when `diagonal`, Manhattan otherwise.
pub fn distance(a: Position, b: Position, diagonal: bool) -> i32 {
    let dx = (a.x - b.x).abs();
    let dy = (a.y - b.y).abs();
    if diagonal {
        dx.max(dy)
    } else {
        dx + dy
    }
}

/// Frontier entry. Field order is the priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct OpenNode {
    f: i32,
    off_axis: u8,
    h: i32,
    seq: u64,
    cell: Position,
}

/// Find a path from `start` to `goal`.
///
/// Returns the cells to walk through, excluding `start` and including
/// `goal` (empty when `start == goal`). When the goal is unreachable the
/// result is `None`, unless `options.fallback` is set, in which case the path
/// leads to the reachable cell with the smallest heuristic distance to the
/// goal -- still `None` if that cell is `start` itself.
pub fn search(
    grid: &PassabilityGrid,
    start: Position,
    goal: Position,
    options: SearchOptions,
) -> Option<Vec<Position>> {
    if start == goal {
        return Some(Vec::new());
    }

    let neighbors: Vec<Delta> = if options.diagonal {
        ORTHOGONAL.iter().chain(DIAGONAL.iter()).copied().collect()
    } else {
        ORTHOGONAL.to_vec()
    };

    let mut frontier = BinaryHeap::new();
    let mut g_score: BTreeMap<Position, i32> = BTreeMap::new();
    let mut came_from: BTreeMap<Position, Position> = BTreeMap::new();
    let mut closed: BTreeSet<Position> = BTreeSet::new();
    let mut seq = 0u64;

    let start_h = distance(start, goal, options.diagonal);
    g_score.insert(start, 0);
    frontier.push(Reverse(OpenNode {
        f: start_h,
        off_axis: 0,
        h: start_h,
        seq,
        cell: start,
    }));
    // (h, g, seq) of the closest cell seen so far, for the fallback.
    let mut closest = (start_h, 0, seq, start);

    while let Some(Reverse(node)) = frontier.pop() {
        let current = node.cell;
        if !closed.insert(current) {
            continue;
        }
        if current == goal {
            return Some(reconstruct(&came_from, start, goal));
        }

        let prefer_horizontal = (goal.x - current.x).abs() >= (goal.y - current.y).abs();
        let current_g = g_score.get(&current).copied().unwrap_or(0);

        for &(dx, dy) in &neighbors {
            let next = current.offset(dx, dy);
            if !grid.is_open(next) || closed.contains(&next) {
                continue;
            }
            let tentative = current_g + 1;
            if tentative >= g_score.get(&next).copied().unwrap_or(i32::MAX) {
                continue;
            }

            g_score.insert(next, tentative);
            came_from.insert(next, current);

            let h = distance(next, goal, options.diagonal);
            let along_preferred = if prefer_horizontal { dx != 0 } else { dy != 0 };
            seq += 1;
            frontier.push(Reverse(OpenNode {
                f: tentative + h,
                off_axis: u8::from(!along_preferred),
                h,
                seq,
                cell: next,
            }));

            if (h, tentative, seq) < (closest.0, closest.1, closest.2) {
                closest = (h, tentative, seq, next);
            }
        }
    }

    let fallback_cell = closest.3;
    if options.fallback && fallback_cell != start {
        Some(reconstruct(&came_from, start, fallback_cell))
    } else {
        None
    }
}

/// Walk `came_from` back from `end` to `start`, returning the forward path
/// without `start`.
fn reconstruct(
    came_from: &BTreeMap<Position, Position>,
    start: Position,
    end: Position,
) -> Vec<Position> {
    let mut path = vec![end];
    let mut current = end;
    while let Some(&previous) = came_from.get(&current) {
        if previous == start {
            break;
        }
        path.push(previous);
        current = previous;
    }
    path.reverse();
    path
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: i32, y: i32) -> Position {
        Position::new(x, y)
    }

    fn exact() -> SearchOptions {
        SearchOptions::default()
    }

    #[test]
    fn straight_line_is_straight() {
        let grid = PassabilityGrid::new(5, 5);
        let path = search(&grid, p(0, 0), p(3, 0), exact()).unwrap();
        assert_eq!(path, vec![p(1, 0), p(2, 0), p(3, 0)]);
    }

    #[test]
    fn vertical_line_is_straight() {
        let grid = PassabilityGrid::new(5, 5);
        let path = search(&grid, p(2, 4), p(2, 1), exact()).unwrap();
        assert_eq!(path, vec![p(2, 3), p(2, 2), p(2, 1)]);
    }

    #[test]
    fn start_equals_goal_is_empty_path() {
        let grid = PassabilityGrid::new(2, 2);
        assert_eq!(search(&grid, p(1, 1), p(1, 1), exact()), Some(vec![]));
    }

    #[test]
    fn routes_around_walls_with_shortest_length() {
        let grid = PassabilityGrid::from_rows(&[
            ".....", //
            ".###.", //
            ".....",
        ]);
        let path = search(&grid, p(0, 1), p(4, 1), exact()).unwrap();
        assert_eq!(path.len(), 6);
        assert_eq!(path.last(), Some(&p(4, 1)));
        let walked: Vec<Position> = std::iter::once(p(0, 1)).chain(path.iter().copied()).collect();
        for pair in walked.windows(2) {
            assert_eq!(distance(pair[0], pair[1], false), 1);
            assert!(grid.is_open(pair[1]));
        }
    }

    #[test]
    fn diagonal_uses_chebyshev_steps() {
        let grid = PassabilityGrid::new(4, 4);
        let options = SearchOptions {
            diagonal: true,
            ..exact()
        };
        let path = search(&grid, p(0, 0), p(3, 3), options).unwrap();
        assert_eq!(path, vec![p(1, 1), p(2, 2), p(3, 3)]);
    }

    #[test]
    fn unreachable_without_fallback_is_none() {
        let grid = PassabilityGrid::from_rows(&["..#."]);
        assert_eq!(search(&grid, p(0, 0), p(3, 0), exact()), None);
    }

    #[test]
    fn fallback_walks_to_closest_reachable_cell() {
        // Goal sits on a blocked cell right behind an open neighbour.
        let grid = PassabilityGrid::from_rows(&["..#"]);
        let options = SearchOptions {
            fallback: true,
            ..exact()
        };
        let path = search(&grid, p(0, 0), p(2, 0), options).unwrap();
        assert_eq!(path, vec![p(1, 0)]);
    }

    #[test]
    fn fallback_is_none_when_start_is_closest() {
        let grid = PassabilityGrid::from_rows(&[".#."]);
        let options = SearchOptions {
            fallback: true,
            ..exact()
        };
        assert_eq!(search(&grid, p(0, 0), p(2, 0), options), None);
    }

    #[test]
    fn out_of_bounds_cells_are_closed() {
        let grid = PassabilityGrid::new(2, 2);
        assert!(!grid.is_open(p(-1, 0)));
        assert!(!grid.is_open(p(0, 2)));
        assert!(grid.is_open(p(1, 1)));
    }
}
