use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::snake::Direction::{self, *};

/// Everything the player can ask of a running game.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GameInput {
    Move(Direction),
    /// Pauses a running game or resumes a paused one.
    PauseToggle,
    /// Leaves a paused game for the menu.
    Abandon,
    Quit,
}

impl GameInput {
    /// Arrow keys or WASD to move, Esc to pause, `q` to abandon, Ctrl+C to quit.
    pub fn from_key(ev: &KeyEvent) -> Option<GameInput> {
        if is_ctrl_c(ev) {
            return Some(GameInput::Quit);
        }

        match ev.code {
            KeyCode::Char('w') | KeyCode::Up => Some(GameInput::Move(Up)),
            KeyCode::Char('a') | KeyCode::Left => Some(GameInput::Move(Left)),
            KeyCode::Char('s') | KeyCode::Down => Some(GameInput::Move(Down)),
            KeyCode::Char('d') | KeyCode::Right => Some(GameInput::Move(Right)),
            KeyCode::Esc => Some(GameInput::PauseToggle),
            KeyCode::Char('q') => Some(GameInput::Abandon),
            _ => None,
        }
    }
}

pub fn is_ctrl_c(ev: &KeyEvent) -> bool {
    matches!(ev, KeyEvent { code: KeyCode::Char('c'), modifiers: KeyModifiers::CONTROL })
}

/// Holds the move request for the next tick. Later requests overwrite
/// earlier ones, so a burst of keys within one interval turns at most once.
#[derive(Copy, Clone, Debug, Default)]
pub struct InputBuffer {
    pending: Option<Direction>,
}

impl InputBuffer {
    pub fn request(&mut self, direction: Direction) {
        self.pending = Some(direction);
    }

    pub fn take(&mut self) -> Option<Direction> {
        self.pending.take()
    }

    pub fn clear(&mut self) {
        self.pending = None;
    }
}
