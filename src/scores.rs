//! Hand-off of finished games to the high score table.

use std::{fs::{self, OpenOptions}, io::{self, Write}, path::{Path, PathBuf}};

use anyhow::{Context, Result};
use log::{info, warn};

pub const NAME_CHAR_LIMIT: usize = 12;
const DEFAULT_NAME: &str = "player";

pub trait ScoreSink {
    fn record(&mut self, score: u64, name: &str) -> Result<()>;
}

/// Plain text table, one `score, name` pair per line.
#[derive(Clone, Debug)]
pub struct HighScoreFile {
    path: PathBuf,
}

impl HighScoreFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        HighScoreFile { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All entries, best first. A missing file is an empty table.
    pub fn load(&self) -> Result<Vec<(u64, String)>> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => return Err(e).with_context(|| format!("reading {}", self.path.display())),
        };

        let mut entries: Vec<(u64, String)> = text
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| {
                let parsed = line
                    .split_once(", ")
                    .and_then(|(score, name)| Some((score.trim().parse::<u64>().ok()?, name.to_string())));
                if parsed.is_none() {
                    warn!("skipping malformed score line {:?}", line);
                }
                parsed
            })
            .collect();

        entries.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(entries)
    }

    pub fn best(&self) -> Result<Option<u64>> {
        Ok(self.load()?.first().map(|(score, _)| *score))
    }
}

impl ScoreSink for HighScoreFile {
    fn record(&mut self, score: u64, name: &str) -> Result<()> {
        let name = clean_name(name);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("opening {}", self.path.display()))?;
        writeln!(file, "{}, {}", score, name).with_context(|| format!("writing {}", self.path.display()))?;

        info!("saved score {} for {}", score, name);
        Ok(())
    }
}

/// Lower case, no separators, at most [`NAME_CHAR_LIMIT`] characters.
pub fn clean_name(name: &str) -> String {
    let name: String = name
        .trim()
        .chars()
        .filter(|c| *c != ',' && !c.is_control())
        .take(NAME_CHAR_LIMIT)
        .collect::<String>()
        .to_lowercase();

    if name.trim().is_empty() {
        DEFAULT_NAME.to_string()
    } else {
        name.trim().to_string()
    }
}
