//! Startup parameters for a game instance.
//!
//! Everything here is immutable once a [`crate::game::Game`] has been built
//! from it. Defaults reproduce the classic 800x500 board with 20-unit cells.

use std::{fs, io, path::{Path, PathBuf}, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Coords;
use crate::snake::Direction;

pub const DEFAULT_SEGMENT_SIZE: i32 = 20;
pub const DEFAULT_START_POS: Coords = Coords::new(400, 430);
pub const DEFAULT_ITEM_COUNT: usize = 3;
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 100;
pub const DEFAULT_POINT_VALUE: u64 = 100;
pub const DEFAULT_MAX_SPAWN_ATTEMPTS: u32 = 10_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed config file")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Inclusive range of valid cell centres.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Bounds {
    pub min_x: i32,
    pub max_x: i32,
    pub min_y: i32,
    pub max_y: i32,
}

impl Default for Bounds {
    fn default() -> Self {
        // Window 800x500 minus borders of 30 (left/right), 60 (top), 20 (bottom),
        // expressed as the centres of the outermost 20x20 cells.
        Bounds { min_x: 40, max_x: 760, min_y: 70, max_y: 470 }
    }
}

impl Bounds {
    pub fn contains(&self, pos: Coords) -> bool {
        (self.min_x..=self.max_x).contains(&pos.x) && (self.min_y..=self.max_y).contains(&pos.y)
    }

    pub fn columns(&self, step: i32) -> u32 {
        ((i64::from(self.max_x) - i64::from(self.min_x)) / i64::from(step) + 1) as u32
    }

    pub fn rows(&self, step: i32) -> u32 {
        ((i64::from(self.max_y) - i64::from(self.min_y)) / i64::from(step) + 1) as u32
    }

    pub fn cell_count(&self, step: i32) -> usize {
        self.columns(step) as usize * self.rows(step) as usize
    }

    /// Centre of the cell at `(column, row)`, counted from the top-left corner.
    pub fn cell_at(&self, column: u32, row: u32, step: i32) -> Coords {
        Coords::new(self.min_x + column as i32 * step, self.min_y + row as i32 * step)
    }

    /// Inverse of [`Bounds::cell_at`]; `None` for positions off the board.
    pub fn grid_index(&self, pos: Coords, step: i32) -> Option<(u32, u32)> {
        if !self.contains(pos) {
            return None;
        }
        Some((((pos.x - self.min_x) / step) as u32, ((pos.y - self.min_y) / step) as u32))
    }

    fn is_aligned(&self, pos: Coords, step: i32) -> bool {
        (pos.x - self.min_x) % step == 0 && (pos.y - self.min_y) % step == 0
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    pub segment_size: i32,
    pub bounds: Bounds,
    pub start_position: Coords,
    pub start_direction: Direction,
    pub item_count: usize,
    pub tick_interval_ms: u64,
    pub point_value: u64,
    pub max_spawn_attempts: u32,
    pub sound_effects: bool,
    pub show_grid: bool,
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            segment_size: DEFAULT_SEGMENT_SIZE,
            bounds: Bounds::default(),
            start_position: DEFAULT_START_POS,
            start_direction: Direction::Up,
            item_count: DEFAULT_ITEM_COUNT,
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            point_value: DEFAULT_POINT_VALUE,
            max_spawn_attempts: DEFAULT_MAX_SPAWN_ATTEMPTS,
            sound_effects: true,
            show_grid: false,
            seed: None,
        }
    }
}

impl GameConfig {
    /// Reads and validates a TOML config. `None` yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
                Self::from_toml_str(&text)?
            }
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Where the second spawn segment goes: one unit behind the head.
    pub fn start_tail(&self) -> Coords {
        let (dx, dy) = self.start_direction.opposite().unit();
        self.start_position.offset(dx * self.segment_size, dy * self.segment_size)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let step = self.segment_size;
        let b = &self.bounds;

        if step <= 0 {
            return Err(invalid("segment_size must be positive"));
        }
        if b.min_x > b.max_x || b.min_y > b.max_y {
            return Err(invalid("bounds are empty"));
        }
        let (Some(width), Some(height)) = (b.max_x.checked_sub(b.min_x), b.max_y.checked_sub(b.min_y)) else {
            return Err(invalid("bounds are too large"));
        };
        if width % step != 0 || height % step != 0 {
            return Err(invalid("bounds must span a whole number of segments"));
        }
        if !b.contains(self.start_position) || !b.is_aligned(self.start_position, step) {
            return Err(invalid(format!(
                "start position {} is not a cell inside the board",
                self.start_position
            )));
        }
        // The start cell is inside the board, so the tail needs at most one
        // more step; check it without leaving i32.
        let (dx, dy) = self.start_direction.opposite().unit();
        let tail_x = self.start_position.x.checked_add(dx * step);
        let tail_y = self.start_position.y.checked_add(dy * step);
        match (tail_x, tail_y) {
            (Some(x), Some(y)) if b.contains(Coords::new(x, y)) => {}
            _ => return Err(invalid("the starting body does not fit inside the board")),
        }
        // Body of two plus the item pool, with at least one cell left over so
        // a consumed item can always be replaced.
        if self.item_count.saturating_add(2) >= b.cell_count(step) {
            return Err(invalid(format!(
                "{} items do not fit on a board of {} cells",
                self.item_count,
                b.cell_count(step)
            )));
        }
        if self.tick_interval_ms == 0 {
            return Err(invalid("tick_interval_ms must be positive"));
        }
        if self.max_spawn_attempts == 0 {
            return Err(invalid("max_spawn_attempts must be positive"));
        }
        Ok(())
    }
}

fn invalid(msg: impl Into<String>) -> ConfigError {
    ConfigError::Invalid(msg.into())
}
