use winit::event::KeyEvent;
use winit::keyboard::{Key, KeyLocation, ModifiersState, NamedKey};

use crate::keymap::{KeyCombo, Mods};

/// Binding label for a named key, as written in keymap files.
fn named_label(key: NamedKey) -> Option<&'static str> {
    Some(match key {
        NamedKey::ArrowLeft => "Left",
        NamedKey::ArrowRight => "Right",
        NamedKey::ArrowUp => "Up",
        NamedKey::ArrowDown => "Down",
        NamedKey::PageUp => "PageUp",
        NamedKey::PageDown => "PageDown",
        NamedKey::Home => "Home",
        NamedKey::End => "End",
        NamedKey::Enter => "Enter",
        NamedKey::Escape => "Escape",
        NamedKey::Space => "Space",
        NamedKey::Tab => "Tab",
        NamedKey::Backspace => "Backspace",
        NamedKey::Delete => "Delete",
        NamedKey::Insert => "Insert",
        NamedKey::F1 => "F1",
        NamedKey::F2 => "F2",
        NamedKey::F3 => "F3",
        NamedKey::F4 => "F4",
        NamedKey::F5 => "F5",
        NamedKey::F6 => "F6",
        NamedKey::F7 => "F7",
        NamedKey::F8 => "F8",
        NamedKey::F9 => "F9",
        NamedKey::F10 => "F10",
        NamedKey::F11 => "F11",
        NamedKey::F12 => "F12",
        _ => return None,
    })
}

fn mods(state: ModifiersState) -> Mods {
    Mods {
        alt: state.alt_key(),
        ctrl: state.control_key(),
        meta: state.super_key(),
        shift: state.shift_key(),
    }
}

/// Label a keypad character: digits become `KP<d>`, operators stay as typed.
fn character_label(text: &str, location: KeyLocation) -> String {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if location == KeyLocation::Numpad && c.is_ascii_digit() => {
            format!("KP{}", c)
        }
        _ => text.to_string(),
    }
}

/// Translate a winit key press into the combo the keymap is indexed by.
pub fn key_combo(event: &KeyEvent, modifiers: ModifiersState) -> Option<KeyCombo> {
    let label = match &event.logical_key {
        Key::Named(named) => named_label(*named)?.to_string(),
        Key::Character(text) => character_label(text, event.location),
        _ => return None,
    };
    Some(KeyCombo::with_mods(mods(modifiers), label))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_match_keymap_syntax() {
        assert_eq!(named_label(NamedKey::ArrowLeft), Some("Left"));
        assert_eq!(named_label(NamedKey::F1), Some("F1"));
        assert_eq!(named_label(NamedKey::CapsLock), None);
        assert_eq!(character_label("5", KeyLocation::Numpad), "KP5");
        assert_eq!(character_label("5", KeyLocation::Standard), "5");
        assert_eq!(character_label("+", KeyLocation::Numpad), "+");
    }

    #[test]
    fn shifted_characters_ignore_shift() {
        let m = mods(ModifiersState::SHIFT);
        assert_eq!(KeyCombo::with_mods(m, "?"), KeyCombo::parse("S-?").unwrap());
        assert_eq!(
            KeyCombo::with_mods(m, "Left"),
            KeyCombo::parse("S-Left").unwrap()
        );
        assert_eq!(
            KeyCombo::with_mods(mods(ModifiersState::CONTROL), "q"),
            KeyCombo::parse("C-q").unwrap()
        );
    }
}
