//! Consumable items and their placement on free cells.

use log::{debug, trace};
use rand::Rng;
use thiserror::Error;

use crate::Coords;
use crate::config::{Bounds, GameConfig};
use crate::occupancy::{Occupant, OccupancySet};

#[derive(Copy, Clone, Debug, Error, PartialEq, Eq)]
pub enum SpawnError {
    #[error("no free cell left on a board of {cells} cells")]
    NoFreeCell { cells: usize },
    #[error("gave up placing an item after {attempts} attempts")]
    AttemptsExhausted { attempts: u32 },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ItemKind {
    Apple,
}

impl ItemKind {
    pub fn glyph(self) -> char {
        match self {
            ItemKind::Apple => 'O',
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ItemKind::Apple => "apple",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Item {
    pub kind: ItemKind,
    pub pos: Coords,
}

impl Item {
    pub fn apple(pos: Coords) -> Self {
        Item { kind: ItemKind::Apple, pos }
    }
}

/// Where items may go and how hard to try before giving up.
#[derive(Copy, Clone, Debug)]
pub struct Placement {
    pub bounds: Bounds,
    pub step: i32,
    pub max_attempts: u32,
}

impl Placement {
    pub fn from_config(config: &GameConfig) -> Self {
        Placement {
            bounds: config.bounds,
            step: config.segment_size,
            max_attempts: config.max_spawn_attempts,
        }
    }

    /// Draws uniformly random grid cells until one outside `occupied` turns up.
    pub fn spawn_one<R: Rng>(
        &self,
        kind: ItemKind,
        occupied: &OccupancySet,
        rng: &mut R,
    ) -> Result<Item, SpawnError> {
        let cells = self.bounds.cell_count(self.step);
        if occupied.len() >= cells {
            return Err(SpawnError::NoFreeCell { cells });
        }

        let columns = self.bounds.columns(self.step);
        let rows = self.bounds.rows(self.step);

        for attempt in 1..=self.max_attempts {
            let pos = self.bounds.cell_at(rng.gen_range(0..columns), rng.gen_range(0..rows), self.step);
            if !occupied.contains(pos) {
                trace!("placed {} at {} after {} attempt(s)", kind.label(), pos, attempt);
                return Ok(Item { kind, pos });
            }
        }

        Err(SpawnError::AttemptsExhausted { attempts: self.max_attempts })
    }
}

/// The pool of active items.
#[derive(Clone, Debug, Default)]
pub struct ItemSet {
    items: Vec<Item>,
}

impl ItemSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(items: Vec<Item>) -> Self {
        ItemSet { items }
    }

    /// Replaces the pool with `count` apples on mutually distinct free cells.
    pub fn initialize<R: Rng>(
        &mut self,
        count: usize,
        placement: &Placement,
        occupied: &OccupancySet,
        rng: &mut R,
    ) -> Result<(), SpawnError> {
        self.items.clear();
        let mut occupied = occupied.clone();

        for _ in 0..count {
            let item = placement.spawn_one(ItemKind::Apple, &occupied, rng)?;
            occupied.insert(item.pos);
            self.items.push(item);
        }

        debug!("spawned {} items", count);
        Ok(())
    }

    /// Swaps the item at `index` for a fresh one of the same kind on a cell
    /// free of `body` and every other item. The pool is left untouched if no
    /// such cell turns up.
    pub fn consume<R: Rng>(
        &mut self,
        index: usize,
        placement: &Placement,
        body: &dyn Occupant,
        rng: &mut R,
    ) -> Result<Item, SpawnError> {
        let eaten = self.items[index];
        let mut occupied = OccupancySet::of(&[body]);
        occupied.extend(
            self.items.iter().enumerate().filter(|&(i, _)| i != index).map(|(_, item)| item.pos),
        );

        let replacement = placement.spawn_one(eaten.kind, &occupied, rng)?;
        self.items[index] = replacement;
        Ok(eaten)
    }

    pub fn index_at(&self, pos: Coords) -> Option<usize> {
        self.items.iter().position(|item| item.pos == pos)
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Occupant for ItemSet {
    fn cells(&self) -> Vec<Coords> {
        self.items.iter().map(|item| item.pos).collect()
    }

    fn occupies(&self, pos: Coords) -> bool {
        self.index_at(pos).is_some()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::SeedableRng;
    use rand::rngs::mock::StepRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;
    use crate::snake::{Direction, Snake};

    fn placement() -> Placement {
        Placement::from_config(&GameConfig::default())
    }

    fn tiny_placement() -> Placement {
        Placement {
            bounds: Bounds { min_x: 0, max_x: 20, min_y: 0, max_y: 20 },
            step: 20,
            max_attempts: 1_000,
        }
    }

    #[test]
    fn spawns_on_grid_cells_inside_the_board() {
        let placement = placement();
        let mut rng = ChaCha8Rng::seed_from_u64(0x5eed);
        let empty = OccupancySet::new();

        for _ in 0..500 {
            let item = placement.spawn_one(ItemKind::Apple, &empty, &mut rng).unwrap();
            assert!(placement.bounds.contains(item.pos));
            assert_eq!((item.pos.x - 40) % 20, 0);
            assert_eq!((item.pos.y - 70) % 20, 0);
        }
    }

    #[test]
    fn finds_the_last_free_cell() {
        let placement = tiny_placement();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let occupied: OccupancySet =
            [Coords::new(0, 0), Coords::new(20, 0), Coords::new(0, 20)].into_iter().collect();

        let item = placement.spawn_one(ItemKind::Apple, &occupied, &mut rng).unwrap();
        assert_eq!(item.pos, Coords::new(20, 20));
    }

    #[test]
    fn full_board_fails_fast() {
        let placement = tiny_placement();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let occupied: OccupancySet = [(0, 0), (20, 0), (0, 20), (20, 20)]
            .into_iter()
            .map(Coords::from)
            .collect();

        let err = placement.spawn_one(ItemKind::Apple, &occupied, &mut rng).unwrap_err();
        assert_eq!(err, SpawnError::NoFreeCell { cells: 4 });
    }

    #[test]
    fn retries_are_bounded() {
        let placement = Placement { max_attempts: 3, ..placement() };
        // A zero generator draws the top-left cell every time.
        let mut rng = StepRng::new(0, 0);
        let occupied: OccupancySet = [Coords::new(40, 70)].into_iter().collect();

        let err = placement.spawn_one(ItemKind::Apple, &occupied, &mut rng).unwrap_err();
        assert_eq!(err, SpawnError::AttemptsExhausted { attempts: 3 });
    }

    #[test]
    fn initialize_keeps_items_apart_from_each_other_and_the_body() {
        let placement = placement();
        let snake = Snake::new(Coords::new(400, 430), Direction::Up, 20);

        for seed in 0..50 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut items = ItemSet::new();
            items.initialize(25, &placement, &OccupancySet::of(&[&snake]), &mut rng).unwrap();

            let distinct: HashSet<Coords> = items.cells().into_iter().collect();
            assert_eq!(distinct.len(), 25);
            assert!(items.cells().iter().all(|pos| !snake.occupies(*pos)));
        }
    }

    #[test]
    fn consume_replaces_on_a_free_cell() {
        let placement = tiny_placement();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let snake = Snake::new(Coords::new(0, 0), Direction::Up, 20);
        // Body covers (0, 0) and (0, 20); items at (20, 0) and (20, 20).
        let mut items = ItemSet::with_items(vec![Item::apple(Coords::new(20, 0)), Item::apple(Coords::new(20, 20))]);

        let eaten = items.consume(0, &placement, &snake, &mut rng).unwrap();
        assert_eq!(eaten.pos, Coords::new(20, 0));
        assert_eq!(items.len(), 2);
        // The only cell not claimed by the body or the remaining item.
        assert_eq!(items.items()[0].pos, Coords::new(20, 0));
    }

    #[test]
    fn failed_replacement_keeps_the_pool() {
        let placement = tiny_placement();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        // Head on the eaten apple, tail below it, the other two apples fill the left column.
        let snake = Snake::new(Coords::new(20, 0), Direction::Up, 20);
        let before = vec![
            Item::apple(Coords::new(20, 0)),
            Item::apple(Coords::new(0, 0)),
            Item::apple(Coords::new(0, 20)),
        ];
        let mut items = ItemSet::with_items(before.clone());

        let err = items.consume(0, &placement, &snake, &mut rng).unwrap_err();

        assert_eq!(err, SpawnError::NoFreeCell { cells: 4 });
        assert_eq!(items.items(), &before[..]);
    }

    #[test]
    fn index_at_finds_items() {
        let items = ItemSet::with_items(vec![Item::apple(Coords::new(40, 70))]);
        assert_eq!(items.index_at(Coords::new(40, 70)), Some(0));
        assert_eq!(items.index_at(Coords::new(60, 70)), None);
        assert!(items.occupies(Coords::new(40, 70)));
    }
}
