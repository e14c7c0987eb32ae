//! The loop-driver boundary: abstract key codes and terminal-resize events
//! go in, `Document`/`Workspace` mutation and redraw signals come out.
//!
//! `KeyCode`/`EngineEvent` are the exact seam `spec.md` §9 asks for: the
//! driver (the `term` crate's blocking read loop) never touches a
//! free-standing "current document" global, it only hands events to
//! `dispatch`, which mutates the `Workspace` it's given and returns what
//! to redraw.

use editor_core::Viewport;

use crate::workspace::Workspace;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
}

impl Modifiers {
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn shift() -> Self {
        Self { shift: true, ctrl: false }
    }

    #[must_use]
    pub fn ctrl() -> Self {
        Self { shift: false, ctrl: true }
    }
}

/// An abstract, terminal-library-independent key code. Produced by `term`'s
/// decoder, consumed only here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCode {
    Char(u8),
    Enter,
    Tab,
    BackTab,
    Backspace,
    Delete,
    Left(Modifiers),
    Right(Modifiers),
    Up(Modifiers),
    Down(Modifiers),
    Home(Modifiers),
    End(Modifiers),
    PageUp,
    PageDown,
    CtrlTab,
    Esc,
    F1,
    F3,
    F5,
    /// Ctrl-<letter>, e.g. `Ctrl('s')` for save. Letters are lowercase.
    Ctrl(char),
}

#[derive(Debug, Clone, Copy)]
pub enum EngineEvent {
    Key(KeyCode),
    Resize(u16, u16),
}

/// How much of the screen the driver should repaint after a dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Redraw {
    StatusOnly,
    Line,
    Full,
}

/// A request for line input the driver must collect (by prompting on the
/// status line) before calling the matching `Workspace`/`Document` method.
/// Prompt collection itself is a terminal concern, out of scope here (spec
/// §1: "keyboard decoding", "screen rendering... of the status bar" are
/// external collaborators).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt {
    Find,
    GotoLine,
    OpenFile,
    SaveAs,
    ShellCommand,
    ConfirmQuit,
    ConfirmCloseDirty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Handled(Redraw),
    NeedsPrompt(Prompt),
    Quit,
}

/// Dispatches one event against `workspace`. `less_mode` disables every
/// mutating binding and makes Esc the only way to exit (spec §4.5 "LESS
/// variant").
pub fn dispatch(
    workspace: &mut Workspace,
    event: EngineEvent,
    viewport: &mut Viewport,
    less_mode: bool,
) -> DispatchOutcome {
    workspace.clear_status();

    match event {
        EngineEvent::Resize(cols, lines) => {
            viewport.cols = cols as usize;
            viewport.lines = lines as usize;
            DispatchOutcome::Handled(Redraw::Full)
        }
        EngineEvent::Key(key) => dispatch_key(workspace, key, viewport, less_mode),
    }
}

fn dispatch_key(
    workspace: &mut Workspace,
    key: KeyCode,
    viewport: &Viewport,
    less_mode: bool,
) -> DispatchOutcome {
    if less_mode {
        return match key {
            KeyCode::Esc => DispatchOutcome::Quit,
            _ => navigate(workspace, key, viewport).unwrap_or(DispatchOutcome::Handled(Redraw::StatusOnly)),
        };
    }

    if let Some(outcome) = navigate(workspace, key, viewport) {
        return outcome;
    }

    let Some(doc) = workspace.current_mut() else {
        return DispatchOutcome::Handled(Redraw::StatusOnly);
    };

    let result = match key {
        KeyCode::Char(b) => doc.insert_char(b, viewport).map(|()| Redraw::Line),
        KeyCode::Tab => doc.insert_char(b'\t', viewport).map(|()| Redraw::Line),
        KeyCode::Enter => doc.newline(viewport).map(|()| Redraw::Full),
        KeyCode::Backspace => doc.backspace(viewport).map(|()| Redraw::Full),
        KeyCode::Delete => doc.del(viewport).map(|()| Redraw::Full),
        KeyCode::Ctrl('z') => return handle_undo(workspace, viewport),
        KeyCode::Ctrl('r') => return handle_redo(workspace, viewport),
        KeyCode::Ctrl('a') => {
            workspace.current_mut().unwrap().select_all(viewport);
            return DispatchOutcome::Handled(Redraw::Full);
        }
        KeyCode::Ctrl('c') => return workspace_result(workspace.copy(), Redraw::StatusOnly),
        KeyCode::Ctrl('x') => return workspace_result(workspace.cut(viewport), Redraw::Full),
        KeyCode::Ctrl('v') => return workspace_result(workspace.paste(viewport), Redraw::Full),
        KeyCode::Ctrl('f') => return DispatchOutcome::NeedsPrompt(Prompt::Find),
        KeyCode::Ctrl('g') => return handle_find_next(workspace, viewport),
        KeyCode::Ctrl('l') => return DispatchOutcome::NeedsPrompt(Prompt::GotoLine),
        KeyCode::Ctrl('o') => return DispatchOutcome::NeedsPrompt(Prompt::OpenFile),
        KeyCode::Ctrl('n') => {
            workspace.create_document();
            return DispatchOutcome::Handled(Redraw::Full);
        }
        KeyCode::Ctrl('w') => {
            return if workspace.save_confirm_needed() {
                DispatchOutcome::NeedsPrompt(Prompt::ConfirmCloseDirty)
            } else {
                workspace.close_current();
                DispatchOutcome::Handled(Redraw::Full)
            };
        }
        KeyCode::Ctrl('s') => {
            return if workspace.current().is_some_and(editor_core::Document::is_path_synthetic) {
                DispatchOutcome::NeedsPrompt(Prompt::SaveAs)
            } else {
                workspace_result(workspace.current_mut().unwrap().save(), Redraw::StatusOnly)
            };
        }
        KeyCode::Ctrl('p') => return DispatchOutcome::NeedsPrompt(Prompt::ShellCommand),
        KeyCode::Ctrl('q') => {
            return if workspace.save_confirm_needed() {
                DispatchOutcome::NeedsPrompt(Prompt::ConfirmQuit)
            } else {
                DispatchOutcome::Quit
            };
        }
        KeyCode::Ctrl('u') | KeyCode::F3 => return handle_jump_to_file(workspace, viewport),
        KeyCode::F1 => return DispatchOutcome::Handled(Redraw::Full),
        KeyCode::F5 => return DispatchOutcome::Handled(Redraw::Full),
        KeyCode::BackTab => {
            workspace.next_file();
            return DispatchOutcome::Handled(Redraw::Full);
        }
        KeyCode::CtrlTab => {
            workspace.prev_file();
            return DispatchOutcome::Handled(Redraw::Full);
        }
        // Any key not in the dispatch table is silently ignored (spec §7
        // "InvalidKey").
        _ => return DispatchOutcome::Handled(Redraw::StatusOnly),
    };

    match result {
        Ok(redraw) => DispatchOutcome::Handled(redraw),
        Err(e) => DispatchOutcome::Handled(Redraw::StatusOnly).tap_err(e),
    }
}

/// Motion keys are identical in LESS mode and normal mode, so they are
/// factored out and tried first by `dispatch_key`. Returns `None` for keys
/// this function doesn't recognize as motions.
fn navigate(workspace: &mut Workspace, key: KeyCode, viewport: &Viewport) -> Option<DispatchOutcome> {
    let doc = workspace.current_mut()?;

    match key {
        KeyCode::Left(m) if m.ctrl => doc.word_left(m.shift, viewport),
        KeyCode::Right(m) if m.ctrl => doc.word_right(m.shift, viewport),
        KeyCode::Left(m) => doc.left(m.shift, viewport),
        KeyCode::Right(m) => doc.right(m.shift, viewport),
        KeyCode::Up(m) if m.ctrl => doc.goto_document_start(m.shift, viewport),
        KeyCode::Down(m) if m.ctrl => doc.goto_document_end(m.shift, viewport),
        KeyCode::Up(m) => doc.up(m.shift, viewport),
        KeyCode::Down(m) => doc.down(m.shift, viewport),
        KeyCode::Home(m) if m.ctrl => doc.goto_document_start(m.shift, viewport),
        KeyCode::End(m) if m.ctrl => doc.goto_document_end(m.shift, viewport),
        KeyCode::Home(m) => doc.home(m.shift, viewport),
        KeyCode::End(m) => doc.end(m.shift, viewport),
        KeyCode::PageUp => doc.page_up(false, viewport),
        KeyCode::PageDown => doc.page_down(false, viewport),
        _ => return None,
    }

    Some(DispatchOutcome::Handled(Redraw::Full))
}

fn workspace_result<E: std::fmt::Display>(
    result: std::result::Result<(), E>,
    ok_redraw: Redraw,
) -> DispatchOutcome {
    match result {
        Ok(()) => DispatchOutcome::Handled(ok_redraw),
        Err(e) => DispatchOutcome::Handled(Redraw::StatusOnly).tap_err(e),
    }
}

impl DispatchOutcome {
    /// Logs `e` at warn level and returns `self` unchanged. Small helper so
    /// `workspace_result` reads as one expression instead of a match arm
    /// with a side effect buried in it.
    fn tap_err(self, e: impl std::fmt::Display) -> Self {
        log::warn!("{e}");
        self
    }
}

fn handle_undo(workspace: &mut Workspace, viewport: &Viewport) -> DispatchOutcome {
    let Some(doc) = workspace.current_mut() else {
        return DispatchOutcome::Handled(Redraw::StatusOnly);
    };
    match doc.undo(viewport) {
        Ok(true) => DispatchOutcome::Handled(Redraw::Full),
        Ok(false) => DispatchOutcome::Handled(Redraw::StatusOnly),
        Err(e) => DispatchOutcome::Handled(Redraw::StatusOnly).tap_err(e),
    }
}

fn handle_redo(workspace: &mut Workspace, viewport: &Viewport) -> DispatchOutcome {
    let Some(doc) = workspace.current_mut() else {
        return DispatchOutcome::Handled(Redraw::StatusOnly);
    };
    match doc.redo(viewport) {
        Ok(true) => DispatchOutcome::Handled(Redraw::Full),
        Ok(false) => DispatchOutcome::Handled(Redraw::StatusOnly),
        Err(e) => DispatchOutcome::Handled(Redraw::StatusOnly).tap_err(e),
    }
}

fn handle_find_next(workspace: &mut Workspace, viewport: &Viewport) -> DispatchOutcome {
    match workspace.find_text(None, viewport) {
        Ok(true) => DispatchOutcome::Handled(Redraw::Full),
        Ok(false) => {
            workspace.set_status("search: no match (BEL)");
            DispatchOutcome::Handled(Redraw::StatusOnly)
        }
        Err(e) => DispatchOutcome::Handled(Redraw::StatusOnly).tap_err(e),
    }
}

fn handle_jump_to_file(workspace: &mut Workspace, viewport: &Viewport) -> DispatchOutcome {
    let Some(doc) = workspace.current() else {
        return DispatchOutcome::Handled(Redraw::StatusOnly);
    };
    let (name, line) = doc.filename_under_cursor();
    if name.is_empty() {
        return DispatchOutcome::Handled(Redraw::StatusOnly);
    }

    if let Err(e) = workspace.open(&name) {
        return DispatchOutcome::Handled(Redraw::StatusOnly).tap_err(e);
    }
    if let Some(line) = line {
        if let Some(doc) = workspace.current_mut() {
            doc.goto_line(line.saturating_sub(1) as usize, viewport);
        }
    }
    DispatchOutcome::Handled(Redraw::Full)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vp() -> Viewport {
        Viewport { cols: 80, lines: 24 }
    }

    fn fresh() -> Workspace {
        let mut ws = Workspace::new();
        ws.create_document();
        ws
    }

    #[test]
    fn typing_inserts_and_requests_line_redraw() {
        let mut ws = fresh();
        let mut v = vp();
        let outcome = dispatch(&mut ws, EngineEvent::Key(KeyCode::Char(b'a')), &mut v, false);
        assert_eq!(outcome, DispatchOutcome::Handled(Redraw::Line));
        assert_eq!(ws.current().unwrap().contents(), b"a");
    }

    #[test]
    fn ctrl_z_undoes_last_edit() {
        let mut ws = fresh();
        let mut v = vp();
        dispatch(&mut ws, EngineEvent::Key(KeyCode::Char(b'a')), &mut v, false);
        dispatch(&mut ws, EngineEvent::Key(KeyCode::Ctrl('z')), &mut v, false);
        assert_eq!(ws.current().unwrap().contents(), b"");
    }

    #[test]
    fn less_mode_ignores_mutating_keys() {
        let mut ws = fresh();
        let mut v = vp();
        let outcome = dispatch(&mut ws, EngineEvent::Key(KeyCode::Char(b'a')), &mut v, true);
        assert_eq!(outcome, DispatchOutcome::Handled(Redraw::StatusOnly));
        assert_eq!(ws.current().unwrap().contents(), b"");
    }

    #[test]
    fn less_mode_esc_quits() {
        let mut ws = fresh();
        let mut v = vp();
        let outcome = dispatch(&mut ws, EngineEvent::Key(KeyCode::Esc), &mut v, true);
        assert_eq!(outcome, DispatchOutcome::Quit);
    }

    #[test]
    fn ctrl_s_on_untitled_document_requests_save_as() {
        let mut ws = fresh();
        let mut v = vp();
        let outcome = dispatch(&mut ws, EngineEvent::Key(KeyCode::Ctrl('s')), &mut v, false);
        assert_eq!(outcome, DispatchOutcome::NeedsPrompt(Prompt::SaveAs));
    }

    #[test]
    fn ctrl_q_with_clean_document_quits_immediately() {
        let mut ws = fresh();
        let mut v = vp();
        let outcome = dispatch(&mut ws, EngineEvent::Key(KeyCode::Ctrl('q')), &mut v, false);
        assert_eq!(outcome, DispatchOutcome::Quit);
    }

    #[test]
    fn ctrl_q_with_dirty_document_requests_confirmation() {
        let mut ws = fresh();
        let mut v = vp();
        dispatch(&mut ws, EngineEvent::Key(KeyCode::Char(b'a')), &mut v, false);
        let outcome = dispatch(&mut ws, EngineEvent::Key(KeyCode::Ctrl('q')), &mut v, false);
        assert_eq!(outcome, DispatchOutcome::NeedsPrompt(Prompt::ConfirmQuit));
    }

    #[test]
    fn resize_updates_viewport_and_requests_full_redraw() {
        let mut ws = fresh();
        let mut v = vp();
        let outcome = dispatch(&mut ws, EngineEvent::Resize(100, 40), &mut v, false);
        assert_eq!(outcome, DispatchOutcome::Handled(Redraw::Full));
        assert_eq!(v.cols, 100);
        assert_eq!(v.lines, 40);
    }

    #[test]
    fn shift_tab_and_ctrl_tab_rotate_ring() {
        let mut ws = Workspace::new();
        ws.create_document(); // A
        ws.create_document(); // B
        ws.create_document(); // C
        let mut v = vp();

        // Spec scenario (spec.md §8): A, B, C opened in that order, C
        // current; Shift-Tab -> A; Shift-Tab -> B; Ctrl-Tab -> A.
        dispatch(&mut ws, EngineEvent::Key(KeyCode::BackTab), &mut v, false);
        assert_eq!(ws.current().unwrap().filename(), "Untitled-1");
        dispatch(&mut ws, EngineEvent::Key(KeyCode::BackTab), &mut v, false);
        assert_eq!(ws.current().unwrap().filename(), "Untitled-2");
        dispatch(&mut ws, EngineEvent::Key(KeyCode::CtrlTab), &mut v, false);
        assert_eq!(ws.current().unwrap().filename(), "Untitled-1");
    }
}
