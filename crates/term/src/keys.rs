//! Translates `crossterm` key events into the abstract `KeyCode` the
//! engine dispatch table consumes.

use crossterm::event::{KeyCode as CtKey, KeyEvent, KeyModifiers};
use editor_state::{KeyCode, Modifiers};

fn modifiers(mods: KeyModifiers) -> Modifiers {
    Modifiers {
        shift: mods.contains(KeyModifiers::SHIFT),
        ctrl: mods.contains(KeyModifiers::CONTROL),
    }
}

/// Returns `None` for key events the editor has no binding for (spec §7
/// "InvalidKey" — silently ignored).
#[must_use]
pub fn decode(event: KeyEvent) -> Option<KeyCode> {
    let m = modifiers(event.modifiers);

    match event.code {
        CtKey::Char(c) if m.ctrl => Some(KeyCode::Ctrl(c.to_ascii_lowercase())),
        CtKey::Char(c) if (' '..='~').contains(&c) => Some(KeyCode::Char(c as u8)),
        CtKey::Enter => Some(KeyCode::Enter),
        CtKey::Tab if m.shift => Some(KeyCode::BackTab),
        CtKey::Tab if m.ctrl => Some(KeyCode::CtrlTab),
        CtKey::Tab => Some(KeyCode::Tab),
        CtKey::BackTab => Some(KeyCode::BackTab),
        CtKey::Backspace => Some(KeyCode::Backspace),
        CtKey::Delete => Some(KeyCode::Delete),
        CtKey::Left => Some(KeyCode::Left(m)),
        CtKey::Right => Some(KeyCode::Right(m)),
        CtKey::Up => Some(KeyCode::Up(m)),
        CtKey::Down => Some(KeyCode::Down(m)),
        CtKey::Home => Some(KeyCode::Home(m)),
        CtKey::End => Some(KeyCode::End(m)),
        CtKey::PageUp => Some(KeyCode::PageUp),
        CtKey::PageDown => Some(KeyCode::PageDown),
        CtKey::Esc => Some(KeyCode::Esc),
        CtKey::F(1) => Some(KeyCode::F1),
        CtKey::F(3) => Some(KeyCode::F3),
        CtKey::F(5) => Some(KeyCode::F5),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventKind;

    fn key(code: CtKey, mods: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, mods)
    }

    fn plain(code: CtKey) -> KeyEvent {
        let mut k = key(code, KeyModifiers::NONE);
        k.kind = KeyEventKind::Press;
        k
    }

    #[test]
    fn printable_char_maps_to_char() {
        assert_eq!(decode(plain(CtKey::Char('q'))), Some(KeyCode::Char(b'q')));
    }

    #[test]
    fn ctrl_letter_maps_to_ctrl_lowercase() {
        let k = key(CtKey::Char('S'), KeyModifiers::CONTROL);
        assert_eq!(decode(k), Some(KeyCode::Ctrl('s')));
    }

    #[test]
    fn shift_arrow_carries_shift_modifier() {
        let k = key(CtKey::Right, KeyModifiers::SHIFT);
        assert_eq!(decode(k), Some(KeyCode::Right(Modifiers::shift())));
    }

    #[test]
    fn ctrl_arrow_carries_ctrl_modifier() {
        let k = key(CtKey::Left, KeyModifiers::CONTROL);
        assert_eq!(decode(k), Some(KeyCode::Left(Modifiers::ctrl())));
    }

    #[test]
    fn shift_tab_maps_to_backtab() {
        let k = key(CtKey::Tab, KeyModifiers::SHIFT);
        assert_eq!(decode(k), Some(KeyCode::BackTab));
    }

    #[test]
    fn unbound_function_key_is_ignored() {
        assert_eq!(decode(plain(CtKey::F(12))), None);
    }
}
