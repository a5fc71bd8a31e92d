//! "Is this cell taken" queries shared by everything that sits on the grid.

use std::collections::HashSet;

use crate::Coords;

/// Something that claims cells on the grid.
pub trait Occupant {
    fn cells(&self) -> Vec<Coords>;

    fn occupies(&self, pos: Coords) -> bool {
        self.cells().contains(&pos)
    }
}

/// A snapshot of claimed cells. Built fresh whenever one is needed and never
/// kept across ticks.
#[derive(Clone, Debug, Default)]
pub struct OccupancySet {
    cells: HashSet<Coords>,
}

impl OccupancySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn of(occupants: &[&dyn Occupant]) -> Self {
        let mut set = Self::new();
        for occupant in occupants {
            set.extend(occupant.cells());
        }
        set
    }

    pub fn insert(&mut self, pos: Coords) -> bool {
        self.cells.insert(pos)
    }

    pub fn extend(&mut self, cells: impl IntoIterator<Item = Coords>) {
        self.cells.extend(cells);
    }

    pub fn contains(&self, pos: Coords) -> bool {
        self.cells.contains(&pos)
    }

    /// Number of distinct claimed cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl FromIterator<Coords> for OccupancySet {
    fn from_iter<I: IntoIterator<Item = Coords>>(iter: I) -> Self {
        OccupancySet { cells: iter.into_iter().collect() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snake::{Direction, Snake};

    #[test]
    fn merges_occupants_and_dedups_stacked_segments() {
        let mut snake = Snake::new(Coords::new(100, 100), Direction::Up, 20);
        snake.grow();
        let extra: OccupancySet = [Coords::new(0, 0)].into_iter().collect();

        let mut set = OccupancySet::of(&[&snake]);
        assert_eq!(set.len(), 2);
        assert!(set.contains(Coords::new(100, 120)));

        set.extend(extra.cells.iter().copied());
        assert_eq!(set.len(), 3);
        assert!(!set.insert(Coords::new(0, 0)));
    }
}
