use std::io::{self, Stdout, Write};
use std::time::Duration;

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{
    self, DisableFocusChange, EnableFocusChange, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers,
};
use crossterm::style::{Attribute, Print, SetAttribute};
use crossterm::terminal::{
    self, disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen,
    LeaveAlternateScreen,
};
use crossterm::{execute, queue};

use crate::core_service::{ResultRow, View};
use crate::input_state::Command;
use crate::runtime::{EventSource, PlatformEvent, Renderer, RuntimeError};
use crate::search::Span;

const PROMPT: &str = "> ";

/// Raw-mode terminal front end. Restores the terminal on `leave` or drop.
pub struct TerminalPlatform {
    out: Stdout,
    active: bool,
}

impl TerminalPlatform {
    pub fn enter() -> Result<Self, RuntimeError> {
        enable_raw_mode()?;
        let mut out = io::stdout();
        if let Err(err) = execute!(out, EnterAlternateScreen, EnableFocusChange) {
            let _ = disable_raw_mode();
            return Err(err.into());
        }
        Ok(Self { out, active: true })
    }

    pub fn leave(&mut self) -> Result<(), RuntimeError> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        execute!(self.out, DisableFocusChange, LeaveAlternateScreen, Show)?;
        disable_raw_mode()?;
        Ok(())
    }

    fn draw_row(&mut self, y: u16, row: &ResultRow) -> io::Result<()> {
        queue!(self.out, MoveTo(0, y))?;
        if row.selected {
            queue!(self.out, SetAttribute(Attribute::Reverse))?;
        }
        self.draw_highlighted(&row.name, row.name_highlight)?;
        queue!(self.out, Print("  "), SetAttribute(Attribute::Dim))?;
        self.draw_highlighted(&row.comment, row.comment_highlight)?;
        queue!(self.out, SetAttribute(Attribute::Reset))
    }

    fn draw_highlighted(&mut self, text: &str, span: Option<Span>) -> io::Result<()> {
        let Some(span) = span.filter(|s| text.get(s.start..s.end()).is_some()) else {
            return queue!(self.out, Print(text));
        };
        queue!(
            self.out,
            Print(&text[..span.start]),
            SetAttribute(Attribute::Bold),
            Print(&text[span.start..span.end()]),
            SetAttribute(Attribute::NormalIntensity),
            Print(&text[span.end()..]),
        )
    }

    fn place_cursor(&mut self, view: &View, visible: bool) -> io::Result<()> {
        let column = PROMPT.len() + view.query.get(..view.cursor).map_or(0, |s| s.chars().count());
        let column = u16::try_from(column).unwrap_or(u16::MAX);
        queue!(self.out, MoveTo(column, 0))?;
        if visible {
            queue!(self.out, Show)
        } else {
            queue!(self.out, Hide)
        }
    }
}

impl Drop for TerminalPlatform {
    fn drop(&mut self) {
        let _ = self.leave();
    }
}

impl EventSource for TerminalPlatform {
    fn poll(&mut self, timeout: Duration) -> Result<Option<PlatformEvent>, RuntimeError> {
        if !event::poll(timeout)? {
            return Ok(None);
        }
        let translated = match event::read()? {
            Event::Key(key) => command_for_key(key).map(PlatformEvent::Command),
            Event::FocusLost => Some(PlatformEvent::FocusLost),
            Event::Resize(_, _) => Some(PlatformEvent::Redraw),
            _ => None,
        };
        Ok(translated)
    }
}

impl Renderer for TerminalPlatform {
    fn render(&mut self, view: &View, cursor_visible: bool) -> Result<(), RuntimeError> {
        let (_, height) = terminal::size().unwrap_or((80, 24));
        queue!(
            self.out,
            Clear(ClearType::All),
            MoveTo(0, 0),
            Print(PROMPT),
            Print(&view.query)
        )?;
        for (index, row) in view.rows.iter().enumerate() {
            let Ok(y) = u16::try_from(index + 1) else {
                break;
            };
            if y >= height {
                break;
            }
            self.draw_row(y, row)?;
        }
        self.place_cursor(view, cursor_visible)?;
        self.out.flush()?;
        Ok(())
    }

    fn render_cursor(&mut self, view: &View, cursor_visible: bool) -> Result<(), RuntimeError> {
        self.place_cursor(view, cursor_visible)?;
        self.out.flush()?;
        Ok(())
    }
}

/// Maps a key press to an input command. Releases and repeats of non-text keys are ignored.
pub fn command_for_key(key: KeyEvent) -> Option<Command> {
    match (key.kind, key.code) {
        (KeyEventKind::Release, _) => return None,
        (KeyEventKind::Repeat, code) if !matches!(code, KeyCode::Char(_)) => return None,
        _ => {}
    }
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Esc => Some(Command::Cancel),
        KeyCode::Enter => Some(Command::Activate),
        KeyCode::Up => Some(Command::NavigateUp),
        KeyCode::Down => Some(Command::NavigateDown),
        KeyCode::Left => Some(Command::MoveLeft),
        KeyCode::Right => Some(Command::MoveRight),
        KeyCode::Home => Some(Command::MoveHome),
        KeyCode::End => Some(Command::MoveEnd),
        KeyCode::Backspace => Some(Command::DeleteBackward { to_start: ctrl }),
        KeyCode::Delete => Some(Command::DeleteForward { to_end: ctrl }),
        KeyCode::Char('c') if ctrl => Some(Command::Cancel),
        KeyCode::Char('u') if ctrl => Some(Command::DeleteBackward { to_start: true }),
        KeyCode::Char('k') if ctrl => Some(Command::DeleteForward { to_end: true }),
        KeyCode::Char('a') if ctrl => Some(Command::MoveHome),
        KeyCode::Char('e') if ctrl => Some(Command::MoveEnd),
        KeyCode::Char(_) if ctrl || key.modifiers.contains(KeyModifiers::ALT) => None,
        KeyCode::Char(ch) => Some(Command::InsertText(ch.to_string())),
        _ => None,
    }
}
