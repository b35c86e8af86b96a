//! Static bounds of the play area.

use gridlab_ecs::component::Position;
use serde::{Deserialize, Serialize};

/// Width and height of the level, in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    pub width: i32,
    pub height: i32,
}

impl Grid {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Whether `(x, y)` lies inside the grid.
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        (0..self.width).contains(&x) && (0..self.height).contains(&y)
    }

    /// [`in_bounds`](Self::in_bounds) for a [`Position`].
    pub fn contains(&self, position: Position) -> bool {
        self.in_bounds(position.x, position.y)
    }

    /// Number of cells.
    pub fn area(&self) -> usize {
        (self.width.max(0) as usize) * (self.height.max(0) as usize)
    }
}
