//! Status-line prompts: the driver reads further `EngineEvent`s off the
//! same channel `input::spawn` hands back, instead of a second reader
//! thread, so a prompt is just a small blocking loop over that one source.
//!
//! Per spec §5 ("Prompts are cancelled only by the Esc key"), cancellation
//! has no side effect: both functions report it as `None`/`false` rather
//! than an error.

use std::io;

use crossbeam_channel::Receiver;
use editor_core::Viewport;
use editor_state::{EngineEvent, KeyCode};

use crate::render::paint_prompt;
use crate::terminal::Terminal;

/// Collects a line of input on the status bar, echoing as the user types.
/// Returns `Ok(None)` if the user cancels with Esc, or if the event source
/// is closed.
///
/// # Errors
///
/// Returns an error if a terminal write fails.
pub fn read_line(
    term: &mut Terminal,
    events: &Receiver<EngineEvent>,
    viewport: &Viewport,
    label: &str,
) -> io::Result<Option<String>> {
    let mut input = String::new();

    loop {
        paint_prompt(term, viewport, label, &input)?;

        let Ok(EngineEvent::Key(key)) = events.recv() else {
            return Ok(None);
        };

        match key {
            KeyCode::Enter => return Ok(Some(input)),
            KeyCode::Esc => return Ok(None),
            KeyCode::Backspace => {
                input.pop();
            }
            KeyCode::Char(b) => input.push(b as char),
            _ => {}
        }
    }
}

/// Reads a single keypress as a y/n answer. Anything but `y`/`Y` (including
/// Esc, or the event source closing) answers "no".
///
/// # Errors
///
/// Returns an error if a terminal write fails.
pub fn read_confirm(
    term: &mut Terminal,
    events: &Receiver<EngineEvent>,
    viewport: &Viewport,
    label: &str,
) -> io::Result<bool> {
    paint_prompt(term, viewport, label, "")?;

    let Ok(EngineEvent::Key(key)) = events.recv() else {
        return Ok(false);
    };
    Ok(matches!(key, KeyCode::Char(b'y' | b'Y')))
}
