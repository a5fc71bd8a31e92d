use std::fmt;

use crate::config::Bounds;
use crate::items::ItemSet;
use crate::snake::Snake;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CrashCause {
    Wall,
    SelfBite,
}

impl fmt::Display for CrashCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrashCause::Wall => write!(f, "hit the wall"),
            CrashCause::SelfBite => write!(f, "bit itself"),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Collision {
    Fatal(CrashCause),
    /// Index into the item set of the item under the head.
    Item(usize),
    Clear,
}

/// Classifies the head's current cell. Run once per tick, after the body moved.
/// A fatal hit wins over an item on the same cell.
pub fn evaluate(snake: &Snake, items: &ItemSet, bounds: &Bounds) -> Collision {
    let head = snake.head();

    if !bounds.contains(head) {
        return Collision::Fatal(CrashCause::Wall);
    }
    if snake.bites_itself() {
        return Collision::Fatal(CrashCause::SelfBite);
    }

    match items.index_at(head) {
        Some(index) => Collision::Item(index),
        None => Collision::Clear,
    }
}
