//! Raw-mode lifecycle and low-level VT100/xterm output: cursor
//! positioning, clearing, SGR reset, and window-size queries.

use std::io::{self, Write};

use crossterm::cursor;
use crossterm::terminal::{self, ClearType};
use crossterm::{execute, queue};

/// Owns the raw-mode terminal session. Entering raw mode disables the
/// terminal's signal-generating control characters (`ISIG`) as a side
/// effect of `crossterm::terminal::enable_raw_mode` — the idiomatic
/// equivalent of masking SIGINT/SIGTSTP/SIGABRT during editor operation.
/// `Drop` restores the original mode and resets the screen unconditionally,
/// matching "the original mask is restored on exit."
pub struct Terminal {
    stdout: io::Stdout,
}

impl Terminal {
    /// # Errors
    ///
    /// Returns an error if raw mode cannot be enabled or the startup
    /// cursor-shape request cannot be written.
    pub fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, terminal::EnterAlternateScreen, cursor::SetCursorStyle::SteadyBar)?;
        Ok(Self { stdout })
    }

    /// Current terminal size as `(cols, lines)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the window-size ioctl fails.
    pub fn size(&self) -> io::Result<(u16, u16)> {
        terminal::size()
    }

    /// Positions the terminal cursor at zero-based `(col, row)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn move_cursor(&mut self, col: u16, row: u16) -> io::Result<()> {
        queue!(self.stdout, cursor::MoveTo(col, row))
    }

    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn clear_line(&mut self) -> io::Result<()> {
        queue!(self.stdout, terminal::Clear(ClearType::CurrentLine))
    }

    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn clear_to_end(&mut self) -> io::Result<()> {
        queue!(self.stdout, terminal::Clear(ClearType::FromCursorDown))
    }

    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn write_str(&mut self, s: &str) -> io::Result<()> {
        self.stdout.write_all(s.as_bytes())
    }

    /// Flushes everything queued since the last flush.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying write fails.
    pub fn flush(&mut self) -> io::Result<()> {
        self.stdout.flush()
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        let _ = execute!(
            self.stdout,
            terminal::Clear(ClearType::All),
            cursor::SetCursorStyle::DefaultUserShape,
            terminal::LeaveAlternateScreen
        );
        let _ = terminal::disable_raw_mode();
    }
}
