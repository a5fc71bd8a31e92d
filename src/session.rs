//! Fixed-cadence driver around a [`Game`]: input draining, pausing and
//! handing frames to the front end.

use std::{thread::sleep, time::{Duration, Instant}};

use anyhow::Result;
use log::info;

use crate::clock::format_runtime;
use crate::game::{Frame, Game, GameEvent, GameSummary, TickOutcome};
use crate::input::{GameInput, InputBuffer};

/// Where player input comes from.
pub trait InputSource {
    /// Everything queued since the last call. Must not block.
    fn poll(&mut self) -> Result<Vec<GameInput>>;

    /// Blocks until the next input arrives.
    fn wait(&mut self) -> Result<GameInput>;
}

/// Where game state goes.
pub trait Presenter {
    fn draw(&mut self, frame: &Frame) -> Result<()>;

    fn effect(&mut self, _event: &GameEvent) -> Result<()> {
        Ok(())
    }

    fn show_paused(&mut self) -> Result<()>;

    fn hide_paused(&mut self) -> Result<()>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionOutcome {
    Finished(GameSummary),
    /// Left from the pause screen.
    Abandoned,
    Quit,
}

pub struct GameLoop<'a, T> {
    io: &'a mut T,
    tick_interval: Duration,
    buffer: InputBuffer,
}

impl<'a, T: InputSource + Presenter> GameLoop<'a, T> {
    pub fn new(io: &'a mut T, tick_interval: Duration) -> Self {
        GameLoop { io, tick_interval, buffer: InputBuffer::default() }
    }

    /// Ticks `game` until it ends or the player leaves.
    pub fn run(&mut self, game: &mut Game) -> Result<SessionOutcome> {
        self.buffer.clear();
        self.io.draw(&game.frame(Instant::now()))?;
        let mut last_tick = Instant::now();

        loop {
            sleep(self.tick_interval.saturating_sub(last_tick.elapsed()));

            for input in self.io.poll()? {
                match input {
                    GameInput::Move(dir) => self.buffer.request(dir),
                    GameInput::PauseToggle => {
                        if let Some(outcome) = self.pause(game)? {
                            return Ok(outcome);
                        }
                    }
                    // Only meaningful on the pause screen.
                    GameInput::Abandon => {}
                    GameInput::Quit => {
                        info!("quit during play");
                        return Ok(SessionOutcome::Quit);
                    }
                }
            }

            let now = Instant::now();
            last_tick = now;
            match game.tick(self.buffer.take(), now)? {
                TickOutcome::Running { events } => {
                    for event in &events {
                        self.io.effect(event)?;
                    }
                    self.io.draw(&game.frame(now))?;
                }
                TickOutcome::Finished(summary) => {
                    self.io.effect(&GameEvent::Crashed { cause: summary.cause })?;
                    self.io.draw(&game.frame(now))?;
                    return Ok(SessionOutcome::Finished(summary));
                }
            }
        }
    }

    /// Blocks until the player resumes, abandons or quits. Nothing moves in
    /// here; the clock only accumulates paused time.
    fn pause(&mut self, game: &mut Game) -> Result<Option<SessionOutcome>> {
        game.pause(Instant::now());
        self.io.show_paused()?;
        info!("paused at {}", format_runtime(game.elapsed(Instant::now())));

        let exit = loop {
            match self.io.wait()? {
                GameInput::PauseToggle => break None,
                GameInput::Abandon => break Some(SessionOutcome::Abandoned),
                GameInput::Quit => break Some(SessionOutcome::Quit),
                GameInput::Move(_) => {}
            }
        };

        let paused = game.resume(Instant::now());
        self.io.hide_paused()?;
        match &exit {
            None => info!("resumed after {:?}", paused),
            Some(outcome) => info!("left paused game: {:?}", outcome),
        }
        Ok(exit)
    }
}
