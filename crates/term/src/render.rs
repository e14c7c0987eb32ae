//! Paints the visible document lines and the status bar. Consumes
//! `Document`/`Workspace` state; never mutates it (spec §1: rendering is an
//! external collaborator, not part of the editing engine).

use std::io;

use editor_core::{Document, Viewport};
use editor_state::{Redraw, Workspace};

use crate::terminal::Terminal;

/// Repaints according to `redraw`: `Full` redraws every visible line plus
/// the status bar, `Line` redraws only the current line plus the status
/// bar, `StatusOnly` redraws just the status bar (spec §4.5 step 1).
///
/// # Errors
///
/// Returns an error if any terminal write fails.
pub fn paint(term: &mut Terminal, workspace: &Workspace, viewport: &Viewport, redraw: Redraw) -> io::Result<()> {
    let Some(doc) = workspace.current() else {
        return Ok(());
    };

    match redraw {
        Redraw::Full => paint_visible_lines(term, doc, viewport)?,
        Redraw::Line => paint_current_line(term, doc, viewport)?,
        Redraw::StatusOnly => {}
    }

    paint_status_bar(term, workspace, doc, viewport)?;
    position_cursor(term, doc)?;
    term.flush()
}

fn paint_visible_lines(term: &mut Terminal, doc: &Document, viewport: &Viewport) -> io::Result<()> {
    let mut line_pos = doc.top_pos();
    for row in 0..viewport.lines.saturating_sub(1) as u16 {
        term.move_cursor(0, row)?;
        term.clear_line()?;
        let line = doc.line_bytes(line_pos);
        let visible = visible_slice(&line, doc.margin(), viewport.cols);
        term.write_str(&String::from_utf8_lossy(visible))?;

        match doc.next_line(line_pos) {
            Some(next) => line_pos = next,
            None => break,
        }
    }
    Ok(())
}

fn paint_current_line(term: &mut Terminal, doc: &Document, viewport: &Viewport) -> io::Result<()> {
    let row = (doc.line() - doc.top_line()) as u16;
    term.move_cursor(0, row)?;
    term.clear_line()?;
    let line = doc.line_bytes(doc.line_pos());
    let visible = visible_slice(&line, doc.margin(), viewport.cols);
    term.write_str(&String::from_utf8_lossy(visible))
}

fn visible_slice(line: &[u8], margin: usize, cols: usize) -> &[u8] {
    if margin >= line.len() {
        return &[];
    }
    let end = (margin + cols).min(line.len());
    &line[margin..end]
}

fn paint_status_bar(
    term: &mut Terminal,
    workspace: &Workspace,
    doc: &Document,
    viewport: &Viewport,
) -> io::Result<()> {
    let row = viewport.lines.saturating_sub(1) as u16;
    term.move_cursor(0, row)?;
    term.clear_line()?;

    let dirty_marker = if doc.is_dirty() { "*" } else { "" };
    let message = workspace.status().unwrap_or("");
    let status = format!(
        "{}{}  L{} C{}  {}",
        doc.filename(),
        dirty_marker,
        doc.line() + 1,
        doc.col() + 1,
        message
    );
    term.write_str(&status)
}

fn position_cursor(term: &mut Terminal, doc: &Document) -> io::Result<()> {
    let vcol = doc.visual_column(doc.line_pos(), doc.col());
    let col = vcol.saturating_sub(doc.margin()) as u16;
    let row = (doc.line() - doc.top_line()) as u16;
    term.move_cursor(col, row)
}

/// Paints a prompt (`label` plus the input collected so far) on the status
/// line, with the cursor parked right after it.
///
/// # Errors
///
/// Returns an error if any terminal write fails.
pub fn paint_prompt(term: &mut Terminal, viewport: &Viewport, label: &str, input: &str) -> io::Result<()> {
    let row = viewport.lines.saturating_sub(1) as u16;
    term.move_cursor(0, row)?;
    term.clear_line()?;
    term.write_str(label)?;
    term.write_str(input)?;
    term.move_cursor((label.len() + input.len()) as u16, row)?;
    term.flush()
}
