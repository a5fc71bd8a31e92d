//! Core of a grid snake game: body movement, item placement, collision
//! evaluation and the fixed-cadence game loop, plus a crossterm front end.

pub mod clock;
pub mod collision;
pub mod config;
pub mod game;
pub mod input;
pub mod items;
pub mod occupancy;
pub mod scores;
pub mod session;
pub mod snake;
pub mod term;

use std::fmt;

/// A cell centre on the playing grid. One grid unit is `segment_size` wide.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, serde::Deserialize, serde::Serialize)]
pub struct Coords {
    pub x: i32,
    pub y: i32,
}

impl Coords {
    pub const fn new(x: i32, y: i32) -> Self {
        Coords { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Coords { x: self.x + dx, y: self.y + dy }
    }
}

impl From<(i32, i32)> for Coords {
    fn from((x, y): (i32, i32)) -> Self {
        Coords { x, y }
    }
}

impl fmt::Display for Coords {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
