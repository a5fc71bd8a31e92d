use std::{io::{Stdout, Write, stdout}, time::Duration};

use anyhow::{bail, Context, Result};
use crossterm::{cursor, execute, queue, style, terminal};
use crossterm::terminal::{ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::event::{Event, KeyEvent, read, poll};

use crate::Coords;
use crate::config::{Bounds, GameConfig};
use crate::game::{Frame, GameEvent};
use crate::input::GameInput;
use crate::session::{InputSource, Presenter};

pub type TermInt = u16;
pub type TermPos = (TermInt, TermInt);

const SNAKE_BODY_CHAR: char = '█';
const DEAD_SNAKE_CHAR: char = 'X';
const GRID_CHAR: char = '·';
const BELL: char = '\u{7}';

/// Terminal front end: draws frames and reads keys.
pub struct TermManager {
    width: TermInt,
    height: TermInt,
    stdout: Stdout,
    screen: Vec<char>,
    current_msg: Option<Message>,
    board: Board,
}

struct Message {
    top_left: TermPos,
    width: TermInt,
    height: TermInt,
}

/// Placement of the playing grid on screen. Every cell is two characters wide
/// so the board keeps roughly square proportions.
struct Board {
    bounds: Bounds,
    step: i32,
    columns: TermInt,
    rows: TermInt,
    origin: TermPos,
    show_grid: bool,
    sound_effects: bool,
    high_score: Option<u64>,
}

impl TermManager {
    pub fn new(config: &GameConfig) -> Result<Self> {
        let (width, height) = terminal::size().context("Error reading size.")?;
        let board = Board::fit(config, width, height)?;
        let screen = vec![' '; width as usize * height as usize];
        Ok(TermManager { width, height, stdout: stdout(), screen, current_msg: None, board })
    }

    pub fn setup(&mut self) -> Result<()> {
        execute!(self.stdout, EnterAlternateScreen).context("Error entering alt screen")?;
        terminal::enable_raw_mode().context("Error setting raw mode.")?;
        execute!(self.stdout, cursor::Hide, cursor::DisableBlinking).context("Error hiding cursor.")?;
        Ok(())
    }

    pub fn restore(&mut self) -> Result<()> {
        terminal::disable_raw_mode().context("Error setting raw mode.")?;
        execute!(self.stdout, cursor::Show, cursor::EnableBlinking).context("Error showing cursor.")?;
        execute!(self.stdout, LeaveAlternateScreen).context("Error leaving alt screen")?;
        Ok(())
    }

    pub fn set_high_score(&mut self, high_score: Option<u64>) {
        self.board.high_score = high_score;
    }

    pub fn read_key_blocking(&self) -> Result<KeyEvent> {
        loop {
            if let Event::Key(ev) = read()? {
                return Ok(ev);
            }
        }
    }

    pub fn read_key_events_queue(&self) -> Result<Vec<KeyEvent>> {
        let mut events = vec![];

        while poll(Duration::from_millis(1))? {
            if let Event::Key(ev) = read()? {
                events.push(ev);
            }
        }

        Ok(events)
    }

    /// Blank screen with the board frame, ready for the first frame.
    pub fn start_game(&mut self) -> Result<()> {
        self.current_msg = None;
        self.clear()?;
        self.draw_borders()
    }

    pub fn draw_borders(&mut self) -> Result<()> {
        let (left, top) = (self.board.origin.0, self.board.origin.1 + 1);
        let right = left + self.board.columns * 2 + 1;
        let bottom = top + self.board.rows + 1;

        for x in left..=right {
            let ch = if x == left || x == right {'+'} else {'-'};
            self.print_at((x, top), ch)?;
            self.print_at((x, bottom), ch)?;
        }

        for y in top + 1..bottom {
            self.print_at((left, y), '|')?;
            self.print_at((right, y), '|')?;
        }

        self.flush()
    }

    pub fn show_message(&mut self, lines: &[&str]) -> Result<()> {
        if self.has_message() {
            self.hide_message()?;
        }

        let msg_height = (lines.len() + 2) as TermInt;
        let msg_width = (lines.iter().map(|x| x.chars().count()).max().unwrap_or(0) + 2) as TermInt;
        let center = (self.width / 2, self.height / 2);
        let top_left = (
            center.0.saturating_sub(msg_width / 2),
            center.1.saturating_sub(msg_height / 2),
        );

        // Print the top and bottom empty lines
        for y in [top_left.1, top_left.1 + msg_height - 1].iter() {
            for x_diff in 0..msg_width {
                self.print_at_no_save((top_left.0 + x_diff, *y), ' ')?;
            }
        }

        // Print the message lines
        for (i, line) in lines.iter().enumerate() {
            let padded_line = format!("{line: ^width$}", line = line, width = msg_width as usize);
            let y = top_left.1 + i as TermInt + 1;
            for (x_diff, ch) in padded_line.chars().enumerate() {
                self.print_at_no_save((top_left.0 + x_diff as TermInt, y), ch)?;
            }
        }

        self.current_msg = Some(Message { width: msg_width, height: msg_height, top_left });
        self.flush()
    }

    pub fn hide_message(&mut self) -> Result<()> {
        let msg = match self.current_msg.take() {
            Some(msg) => msg,
            None => return Ok(()),
        };

        // Restore the content from the screen buffer
        for y in msg.top_left.1..msg.top_left.1 + msg.height {
            for x in msg.top_left.0..msg.top_left.0 + msg.width {
                if let Some(ch) = self.buffered(x, y) {
                    self.print_at_no_save((x, y), ch)?;
                }
            }
        }

        self.flush()
    }

    pub fn has_message(&self) -> bool {
        self.current_msg.is_some()
    }

    /// Writes `ch` unless the buffer says it is already on screen.
    pub fn print_at(&mut self, pos: TermPos, ch: char) -> Result<()> {
        let idx = match self.index(pos) {
            Some(idx) => idx,
            None => return Ok(()),
        };
        if self.screen[idx] == ch {
            return Ok(());
        }
        queue!(self.stdout, cursor::MoveTo(pos.0, pos.1), style::Print(ch))?;
        self.screen[idx] = ch;
        Ok(())
    }

    pub fn clear(&mut self) -> Result<()> {
        execute!(self.stdout, terminal::Clear(ClearType::All)).context("Error clearing.")?;
        self.screen = vec![' '; self.width as usize * self.height as usize];
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.stdout.flush().context("Error flushing.")
    }

    ///////////////////////////////////////////////////////////////////////////

    fn print_at_no_save(&mut self, pos: TermPos, ch: char) -> Result<()> {
        // To be used for printing messages, where we don't wanna overwrite our
        // local buffer to restore it when the message is hidden
        if pos.0 < self.width && pos.1 < self.height {
            queue!(self.stdout, cursor::MoveTo(pos.0, pos.1), style::Print(ch))?;
        }
        Ok(())
    }

    fn index(&self, pos: TermPos) -> Option<usize> {
        if pos.0 < self.width && pos.1 < self.height {
            Some(self.width as usize * pos.1 as usize + pos.0 as usize)
        } else {
            None
        }
    }

    fn buffered(&self, x: TermInt, y: TermInt) -> Option<char> {
        self.index((x, y)).map(|idx| self.screen[idx])
    }

    fn draw_hud(&mut self, frame: &Frame) -> Result<()> {
        let high = self.board.high_score.map_or_else(|| "-".to_string(), |s| s.to_string());
        let text = format!(
            "HIGH SCORE {}  SCORE {}  APPLES {}  TIME {}",
            high, frame.score, frame.apples_eaten, frame.runtime
        );
        let width = (self.board.columns * 2 + 2) as usize;
        let line = format!("{text: ^width$}", text = text, width = width);

        let (left, top) = self.board.origin;
        for (i, ch) in line.chars().take(width).enumerate() {
            self.print_at((left + i as TermInt, top), ch)?;
        }
        Ok(())
    }
}

impl Board {
    fn fit(config: &GameConfig, width: TermInt, height: TermInt) -> Result<Self> {
        let step = config.segment_size;
        let columns = config.bounds.columns(step) as TermInt;
        let rows = config.bounds.rows(step) as TermInt;

        // Two border columns, plus the HUD row and two border rows.
        let (need_w, need_h) = (columns * 2 + 2, rows + 3);
        if need_w > width || need_h > height {
            bail!("terminal is {}x{}, the board needs at least {}x{}", width, height, need_w, need_h);
        }

        Ok(Board {
            bounds: config.bounds,
            step,
            columns,
            rows,
            origin: ((width - need_w) / 2, (height - need_h) / 2),
            show_grid: config.show_grid,
            sound_effects: config.sound_effects,
            high_score: None,
        })
    }

    fn empty_char(&self) -> char {
        if self.show_grid {GRID_CHAR} else {' '}
    }

    /// Screen position of the left half of cell `(column, row)`.
    fn cell_pos(&self, column: TermInt, row: TermInt) -> TermPos {
        (self.origin.0 + 1 + column * 2, self.origin.1 + 2 + row)
    }

    /// One char per cell, row-major.
    fn layout(&self, frame: &Frame) -> Vec<char> {
        let mut cells = vec![self.empty_char(); self.columns as usize * self.rows as usize];
        let mut put = |pos: Coords, ch: char| {
            if let Some((c, r)) = self.bounds.grid_index(pos, self.step) {
                cells[r as usize * self.columns as usize + c as usize] = ch;
            }
        };

        for item in &frame.items {
            put(item.pos, item.kind.glyph());
        }

        let body_char = if frame.dead {DEAD_SNAKE_CHAR} else {SNAKE_BODY_CHAR};
        for pos in frame.segments.iter().skip(1).rev() {
            put(*pos, body_char);
        }
        if let Some(head) = frame.segments.first() {
            put(*head, if frame.dead {DEAD_SNAKE_CHAR} else {frame.head_char});
        }

        cells
    }
}

impl Presenter for TermManager {
    fn draw(&mut self, frame: &Frame) -> Result<()> {
        let cells = self.board.layout(frame);
        let columns = self.board.columns as usize;

        for (i, ch) in cells.into_iter().enumerate() {
            let pos = self.board.cell_pos((i % columns) as TermInt, (i / columns) as TermInt);
            // Snake segments fill both halves of the cell
            let right = if ch == SNAKE_BODY_CHAR || ch == DEAD_SNAKE_CHAR {ch} else {' '};
            self.print_at(pos, ch)?;
            self.print_at((pos.0 + 1, pos.1), right)?;
        }

        self.draw_hud(frame)?;
        self.flush()
    }

    fn effect(&mut self, event: &GameEvent) -> Result<()> {
        match event {
            GameEvent::ItemConsumed { .. } | GameEvent::Crashed { .. } if self.board.sound_effects => {
                queue!(self.stdout, style::Print(BELL))?;
                self.flush()
            }
            _ => Ok(()),
        }
    }

    fn show_paused(&mut self) -> Result<()> {
        self.show_message(&["Paused", "", "Esc to resume", "Q to leave this game", "CTRL+C to quit"])
    }

    fn hide_paused(&mut self) -> Result<()> {
        self.hide_message()
    }
}

impl InputSource for TermManager {
    fn poll(&mut self) -> Result<Vec<GameInput>> {
        Ok(self.read_key_events_queue()?.iter().filter_map(GameInput::from_key).collect())
    }

    fn wait(&mut self) -> Result<GameInput> {
        loop {
            if let Some(input) = GameInput::from_key(&self.read_key_blocking()?) {
                return Ok(input);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::Item;

    fn frame(segments: Vec<Coords>, items: Vec<Item>, dead: bool) -> Frame {
        Frame {
            segments,
            head_char: '^',
            items,
            score: 0,
            apples_eaten: 0,
            runtime: "00:00".to_string(),
            dead,
        }
    }

    #[test]
    fn default_board_fits_an_80x24_terminal() {
        let board = Board::fit(&GameConfig::default(), 80, 24).unwrap();
        assert_eq!((board.columns, board.rows), (37, 21));
        assert_eq!(board.origin, (2, 0));
        assert_eq!(board.cell_pos(0, 0), (3, 2));
    }

    #[test]
    fn small_terminal_is_rejected() {
        assert!(Board::fit(&GameConfig::default(), 60, 24).is_err());
        assert!(Board::fit(&GameConfig::default(), 80, 20).is_err());
    }

    #[test]
    fn layout_places_head_body_and_items() {
        let board = Board::fit(&GameConfig::default(), 80, 24).unwrap();
        let cells = board.layout(&frame(
            vec![Coords::new(40, 70), Coords::new(40, 90), Coords::new(500, 900)],
            vec![Item::apple(Coords::new(60, 70))],
            false,
        ));

        assert_eq!(cells[0], '^');
        assert_eq!(cells[1], 'O');
        assert_eq!(cells[37], SNAKE_BODY_CHAR);
        assert_eq!(cells.iter().filter(|c| **c != ' ').count(), 3);
    }

    #[test]
    fn dead_snake_is_crossed_out() {
        let board = Board::fit(&GameConfig { show_grid: true, ..GameConfig::default() }, 80, 24).unwrap();
        let cells = board.layout(&frame(vec![Coords::new(40, 70), Coords::new(40, 90)], vec![], true));

        assert_eq!(cells[0], DEAD_SNAKE_CHAR);
        assert_eq!(cells[37], DEAD_SNAKE_CHAR);
        assert_eq!(cells[2], GRID_CHAR);
    }
}
