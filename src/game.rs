//! One game instance: the per-tick move/evaluate/grow cycle and its terminal state.

use std::time::{Duration, Instant};

use log::{debug, info, warn};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

use crate::Coords;
use crate::clock::{format_runtime, GameClock};
use crate::collision::{self, Collision, CrashCause};
use crate::config::GameConfig;
use crate::items::{Item, ItemKind, ItemSet, Placement, SpawnError};
use crate::occupancy::OccupancySet;
use crate::snake::{Direction, Snake};

#[derive(Debug, Error)]
pub enum GameError {
    #[error("item placement failed")]
    Spawn(#[from] SpawnError),
}

/// Side effects the front end may act on, such as a sound cue.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    ItemConsumed { kind: ItemKind, at: Coords },
    /// Emitted once, on the tick that ends the game.
    Crashed { cause: CrashCause },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameSummary {
    pub score: u64,
    pub apples_eaten: u64,
    pub runtime: Duration,
    pub cause: CrashCause,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    Running { events: Vec<GameEvent> },
    Finished(GameSummary),
}

/// Raw values for the presentation layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    pub segments: Vec<Coords>,
    pub head_char: char,
    pub items: Vec<Item>,
    pub score: u64,
    pub apples_eaten: u64,
    pub runtime: String,
    pub dead: bool,
}

pub struct Game {
    config: GameConfig,
    placement: Placement,
    snake: Snake,
    items: ItemSet,
    rng: ChaCha8Rng,
    clock: GameClock,
    apples_eaten: u64,
    summary: Option<GameSummary>,
    failed: Option<SpawnError>,
}

impl Game {
    /// Spawns the body at the configured start and fills the item pool.
    /// `config` is expected to have passed [`GameConfig::validate`].
    pub fn new(config: GameConfig, now: Instant) -> Result<Self, GameError> {
        let mut rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let placement = Placement::from_config(&config);
        let snake = Snake::new(config.start_position, config.start_direction, config.segment_size);

        let mut items = ItemSet::new();
        items.initialize(config.item_count, &placement, &OccupancySet::of(&[&snake]), &mut rng)?;

        let game = Game::from_parts(config, snake, items, rng, now);
        info!(
            "new game: head {} facing {:?}, {} items",
            game.snake.head(),
            game.snake.direction(),
            game.items.len()
        );
        Ok(game)
    }

    /// Assembles a game from prepared pieces, e.g. a body and items placed
    /// by hand.
    pub fn from_parts(config: GameConfig, snake: Snake, items: ItemSet, rng: ChaCha8Rng, now: Instant) -> Self {
        Game {
            placement: Placement::from_config(&config),
            config,
            snake,
            items,
            rng,
            clock: GameClock::start(now),
            apples_eaten: 0,
            summary: None,
            failed: None,
        }
    }

    /// Applies the requested turn, moves one cell and resolves whatever the
    /// head landed on. A finished game only repeats its summary, and a game
    /// that could not replace an item keeps returning that error.
    pub fn tick(&mut self, requested: Option<Direction>, now: Instant) -> Result<TickOutcome, GameError> {
        if let Some(summary) = &self.summary {
            return Ok(TickOutcome::Finished(summary.clone()));
        }
        if let Some(err) = self.failed {
            return Err(err.into());
        }

        if let Some(dir) = requested {
            self.snake.set_direction(dir);
        }
        self.snake.advance();

        let mut events = vec![];
        match collision::evaluate(&self.snake, &self.items, &self.config.bounds) {
            Collision::Fatal(cause) => {
                self.snake.kill();
                let summary = GameSummary {
                    score: self.score(),
                    apples_eaten: self.apples_eaten,
                    runtime: self.clock.elapsed(now),
                    cause,
                };
                info!(
                    "snake {} at {}: score {}, runtime {}",
                    cause,
                    self.snake.head(),
                    summary.score,
                    format_runtime(summary.runtime)
                );
                self.summary = Some(summary.clone());
                return Ok(TickOutcome::Finished(summary));
            }
            Collision::Item(index) => {
                let eaten = match self.items.consume(index, &self.placement, &self.snake, &mut self.rng) {
                    Ok(eaten) => eaten,
                    Err(err) => {
                        warn!("no room for a new item at length {}: {}", self.snake.len(), err);
                        self.failed = Some(err);
                        return Err(err.into());
                    }
                };
                self.snake.grow();
                self.apples_eaten += 1;
                debug!("ate {} at {}, length {}", eaten.kind.label(), eaten.pos, self.snake.len());
                events.push(GameEvent::ItemConsumed { kind: eaten.kind, at: eaten.pos });
            }
            Collision::Clear => {}
        }

        Ok(TickOutcome::Running { events })
    }

    pub fn pause(&mut self, now: Instant) {
        self.clock.pause(now);
    }

    pub fn resume(&mut self, now: Instant) -> Duration {
        self.clock.resume(now)
    }

    pub fn elapsed(&self, now: Instant) -> Duration {
        self.clock.elapsed(now)
    }

    pub fn score(&self) -> u64 {
        self.apples_eaten * self.config.point_value
    }

    pub fn apples_eaten(&self) -> u64 {
        self.apples_eaten
    }

    pub fn is_over(&self) -> bool {
        self.summary.is_some()
    }

    pub fn summary(&self) -> Option<&GameSummary> {
        self.summary.as_ref()
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    pub fn items(&self) -> &ItemSet {
        &self.items
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn frame(&self, now: Instant) -> Frame {
        Frame {
            segments: self.snake.body().to_vec(),
            head_char: self.snake.head_char(),
            items: self.items.items().to_vec(),
            score: self.score(),
            apples_eaten: self.apples_eaten,
            runtime: format_runtime(self.clock.elapsed(now)),
            dead: self.snake.is_dead(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Bounds;
    use crate::snake::Direction::*;

    fn seeded(seed: u64) -> GameConfig {
        GameConfig { seed: Some(seed), ..GameConfig::default() }
    }

    fn hand_placed(items: Vec<Item>) -> Game {
        let config = GameConfig::default();
        let snake = Snake::new(config.start_position, config.start_direction, config.segment_size);
        Game::from_parts(config, snake, ItemSet::with_items(items), ChaCha8Rng::seed_from_u64(11), Instant::now())
    }

    #[test]
    fn new_game_fills_the_pool_off_the_body() {
        let game = Game::new(seeded(42), Instant::now()).unwrap();
        assert_eq!(game.items().len(), 3);
        assert_eq!(game.snake().len(), 2);
        for item in game.items().items() {
            assert!(!game.snake().body().contains(&item.pos));
        }
    }

    #[test]
    fn same_seed_same_board() {
        let a = Game::new(seeded(7), Instant::now()).unwrap();
        let b = Game::new(seeded(7), Instant::now()).unwrap();
        assert_eq!(a.items().items(), b.items().items());
    }

    #[test]
    fn eating_grows_scores_and_reports() {
        let mut game = hand_placed(vec![Item::apple(Coords::new(400, 410))]);

        let outcome = game.tick(None, Instant::now()).unwrap();
        assert_eq!(
            outcome,
            TickOutcome::Running {
                events: vec![GameEvent::ItemConsumed { kind: ItemKind::Apple, at: Coords::new(400, 410) }]
            }
        );
        assert_eq!(game.snake().len(), 3);
        assert_eq!(game.score(), 100);
        assert_eq!(game.items().len(), 1);
    }

    #[test]
    fn reversal_request_is_ignored_by_tick() {
        let mut game = hand_placed(vec![]);
        game.tick(Some(Down), Instant::now()).unwrap();
        assert_eq!(game.snake().head(), Coords::new(400, 410));
    }

    #[test]
    fn finished_game_is_frozen() {
        let mut game = hand_placed(vec![Item::apple(Coords::new(40, 70))]);
        game.tick(Some(Left), Instant::now()).unwrap();

        let summary = loop {
            if let TickOutcome::Finished(summary) = game.tick(None, Instant::now()).unwrap() {
                break summary;
            }
        };
        assert_eq!(summary.cause, CrashCause::Wall);
        assert!(game.is_over());

        let body = game.snake().body().to_vec();
        let items = game.items().items().to_vec();
        for dir in [Up, Down, Right] {
            assert_eq!(game.tick(Some(dir), Instant::now()).unwrap(), TickOutcome::Finished(summary.clone()));
        }
        assert_eq!(game.snake().body(), &body[..]);
        assert_eq!(game.items().items(), &items[..]);
    }

    #[test]
    fn failed_replacement_stops_the_game_with_the_pool_intact() {
        let config = GameConfig {
            bounds: Bounds { min_x: 0, max_x: 20, min_y: 0, max_y: 20 },
            start_position: Coords::new(20, 20),
            ..GameConfig::default()
        };
        let snake = Snake::new(Coords::new(20, 20), Up, config.segment_size);
        let items = vec![
            Item::apple(Coords::new(20, 0)),
            Item::apple(Coords::new(0, 0)),
            Item::apple(Coords::new(0, 20)),
        ];
        let mut game =
            Game::from_parts(config, snake, ItemSet::with_items(items.clone()), ChaCha8Rng::seed_from_u64(1), Instant::now());

        let err = game.tick(None, Instant::now()).unwrap_err();
        assert!(matches!(err, GameError::Spawn(SpawnError::NoFreeCell { cells: 4 })));
        assert_eq!(game.items().items(), &items[..]);
        assert_eq!(game.apples_eaten(), 0);

        let body = game.snake().body().to_vec();
        assert!(game.tick(Some(Left), Instant::now()).is_err());
        assert_eq!(game.snake().body(), &body[..]);
        assert_eq!(game.items().len(), 3);
    }

    #[test]
    fn frame_carries_raw_values() {
        let now = Instant::now();
        let game = hand_placed(vec![Item::apple(Coords::new(40, 70))]);
        let frame = game.frame(now);

        assert_eq!(frame.segments, vec![Coords::new(400, 430), Coords::new(400, 450)]);
        assert_eq!(frame.head_char, '^');
        assert_eq!(frame.items.len(), 1);
        assert_eq!(frame.score, 0);
        assert_eq!(frame.runtime, "00:00");
        assert!(!frame.dead);
    }
}
