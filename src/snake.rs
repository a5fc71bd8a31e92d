use serde::{Deserialize, Serialize};

use crate::Coords;
use crate::occupancy::Occupant;
use Direction::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    pub fn opposite(self) -> Direction {
        match self {
            Up => Down,
            Down => Up,
            Left => Right,
            Right => Left,
        }
    }

    /// Unit vector in grid units, y growing downwards.
    pub fn unit(self) -> (i32, i32) {
        match self {
            Up => (0, -1),
            Down => (0, 1),
            Left => (-1, 0),
            Right => (1, 0),
        }
    }
}

/// The player's segmented body, head first.
#[derive(Clone, Debug)]
pub struct Snake {
    body: Vec<Coords>,
    direction: Direction,
    step: i32,
    dead: bool,
}

impl Snake {
    /// A fresh two-segment body: the head at `pos` and one segment behind it.
    pub fn new(pos: Coords, direction: Direction, step: i32) -> Self {
        let mut snake = Snake { body: Vec::with_capacity(16), direction, step, dead: false };
        snake.initialize(pos, direction);
        snake
    }

    pub fn initialize(&mut self, pos: Coords, direction: Direction) {
        let (dx, dy) = direction.opposite().unit();
        self.body.clear();
        self.body.push(pos);
        self.body.push(pos.offset(dx * self.step, dy * self.step));
        self.direction = direction;
        self.dead = false;
    }

    pub fn body(&self) -> &[Coords] {
        &self.body
    }

    pub fn head(&self) -> Coords {
        self.body[0]
    }

    pub fn tail(&self) -> Coords {
        self.body[self.body.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Moves the head one unit and drags every other segment into the cell
    /// its predecessor just left. Returns the new head, or `None` once dead.
    pub fn advance(&mut self) -> Option<Coords> {
        if self.dead {
            return None;
        }

        let (dx, dy) = self.direction.unit();
        let mut vacated = self.body[0];
        self.body[0] = vacated.offset(dx * self.step, dy * self.step);

        for segment in self.body[1..].iter_mut() {
            std::mem::swap(segment, &mut vacated);
        }

        Some(self.body[0])
    }

    /// Ignores the exact reversal of the current heading.
    pub fn set_direction(&mut self, new_direction: Direction) {
        match (&new_direction, &self.direction) {
            (Up, Down) | (Down, Up) | (Right, Left) | (Left, Right) => {},
            _ => self.direction = new_direction,
        };
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Adds a segment on top of the current tail; the next advance pulls
    /// it apart from its neighbour.
    pub fn grow(&mut self) {
        if self.dead {
            return;
        }
        let tail = self.tail();
        self.body.push(tail);
    }

    pub fn kill(&mut self) {
        self.dead = true;
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    /// Whether the head sits on any other segment.
    pub fn bites_itself(&self) -> bool {
        let head = self.head();
        self.body[1..].contains(&head)
    }

    pub fn head_char(&self) -> char {
        match self.direction {
            Up => '^',
            Down => 'v',
            Left => '<',
            Right => '>',
        }
    }
}

impl Occupant for Snake {
    fn cells(&self) -> Vec<Coords> {
        self.body.clone()
    }

    fn occupies(&self, pos: Coords) -> bool {
        self.body.contains(&pos)
    }
}
