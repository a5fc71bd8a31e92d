use std::{fs::File, path::PathBuf, time::Instant};

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info};
use simplelog::{Config, LevelFilter, WriteLogger};

use snake::clock::format_runtime;
use snake::config::GameConfig;
use snake::game::{Game, GameSummary};
use snake::input::is_ctrl_c;
use snake::scores::{HighScoreFile, ScoreSink};
use snake::session::{GameLoop, SessionOutcome};
use snake::term::TermManager;

/// Terminal snake: eat apples, grow, don't hit the walls or yourself.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// TOML file overriding the default board and timing
    #[arg(long)]
    config: Option<PathBuf>,

    /// Name saved next to your scores
    #[arg(long, default_value = "player")]
    name: String,

    /// High score table
    #[arg(long, default_value = "high_scores.txt")]
    scores: PathBuf,

    /// Seed for item placement, overrides the config file
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, default_value = "snake.log")]
    log_file: PathBuf,

    /// off, error, warn, info, debug or trace
    #[arg(long, default_value = "info", value_parser = parse_level)]
    log_level: LevelFilter,
}

fn parse_level(s: &str) -> Result<LevelFilter, String> {
    s.parse().map_err(|_| format!("unknown log level {:?}", s))
}

fn main() -> Result<()> {
    let args = Args::parse();

    // The terminal is in raw mode while playing, so logs go to a file
    WriteLogger::init(
        args.log_level,
        Config::default(),
        File::create(&args.log_file).with_context(|| format!("creating {}", args.log_file.display()))?,
    )
    .context("Failed to initialize logger")?;

    let mut config = GameConfig::load(args.config.as_deref())?;
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    info!("starting with {:?}", config);

    let mut scores = HighScoreFile::new(&args.scores);
    info!("high scores in {}", scores.path().display());
    let mut term = TermManager::new(&config)?;
    term.setup()?;

    let result = play(&mut term, &config, &mut scores, &args.name);
    if let Err(e) = &result {
        error!("{:#}", e);
    }

    // Give the terminal back even if the game failed
    term.restore()?;
    result
}

/// Intro, then games back to back until the player quits.
fn play(term: &mut TermManager, config: &GameConfig, scores: &mut HighScoreFile, name: &str) -> Result<()> {
    'menu: loop {
        if !show_intro(term)? {
            return Ok(());
        }

        loop {
            term.set_high_score(scores.best()?);
            term.start_game()?;

            let mut game = Game::new(config.clone(), Instant::now())?;
            let outcome = GameLoop::new(term, config.tick_interval()).run(&mut game)?;

            match outcome {
                SessionOutcome::Finished(summary) => {
                    if summary.score > 0 {
                        scores.record(summary.score, name)?;
                    }
                    game_over(term, &summary)?;

                    // Quit if the user CTRL+C's after the game
                    if is_ctrl_c(&term.read_key_blocking()?) {
                        return Ok(());
                    }
                }
                SessionOutcome::Abandoned => continue 'menu,
                SessionOutcome::Quit => return Ok(()),
            }
        }
    }
}

/// Returns `false` if the player chose to quit.
fn show_intro(term: &mut TermManager) -> Result<bool> {
    term.start_game()?;
    term.show_message(&[
        "Arrow keys or WASD to move",
        "Esc to pause",
        "CTRL+C to quit",
        "",
        "Press any key to begin",
    ])?;

    if is_ctrl_c(&term.read_key_blocking()?) {
        return Ok(false);
    }

    term.hide_message()?;
    Ok(true)
}

fn game_over(term: &mut TermManager, summary: &GameSummary) -> Result<()> {
    term.show_message(&[
        "Game over!",
        &format!("The snake {}", summary.cause),
        &format!("Score: {}", summary.score),
        &format!("Apples: {}  Time: {}", summary.apples_eaten, format_runtime(summary.runtime)),
        "",
        "Press any key to play again,",
        "or CTRL+C to quit.",
    ])
}
