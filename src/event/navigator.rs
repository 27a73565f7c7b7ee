use crate::app::PendingKey;
use crate::config::Config;
use crate::navigation::Direction;
use crate::navigator::NavigatorEvent;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// What a key press means to a navigator panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    Event(NavigatorEvent),
    Pending(PendingKey),
    Ignored,
}

/// Map a key for a panel. While the search prompt is open every printable
/// character goes to the prompt.
pub fn navigator_key_action(key: KeyEvent, composing: bool, config: &Config) -> KeyAction {
    if composing {
        return match key.code {
            KeyCode::Esc => KeyAction::Event(NavigatorEvent::CancelSearch),
            KeyCode::Enter => KeyAction::Event(NavigatorEvent::ConfirmSearch),
            KeyCode::Backspace => KeyAction::Event(NavigatorEvent::SearchBackspace),
            KeyCode::Up => KeyAction::Event(NavigatorEvent::MoveUp),
            KeyCode::Down => KeyAction::Event(NavigatorEvent::MoveDown),
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                KeyAction::Event(NavigatorEvent::SearchInput(c))
            }
            _ => KeyAction::Ignored,
        };
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('d') => KeyAction::Event(NavigatorEvent::HalfPageDown),
            KeyCode::Char('u') => KeyAction::Event(NavigatorEvent::HalfPageUp),
            KeyCode::Char('f') => KeyAction::Event(NavigatorEvent::PageDown),
            KeyCode::Char('b') => KeyAction::Event(NavigatorEvent::PageUp),
            _ => KeyAction::Ignored,
        };
    }

    let event = match key.code {
        KeyCode::Up | KeyCode::Char('k') => NavigatorEvent::MoveUp,
        KeyCode::Down | KeyCode::Char('j') => NavigatorEvent::MoveDown,
        KeyCode::PageUp => NavigatorEvent::PageUp,
        KeyCode::PageDown => NavigatorEvent::PageDown,
        KeyCode::Home => NavigatorEvent::Top,
        KeyCode::End => NavigatorEvent::Bottom,
        KeyCode::Right | KeyCode::Char('l') => NavigatorEvent::Expand,
        KeyCode::Left | KeyCode::Char('h') => NavigatorEvent::Collapse,
        KeyCode::Enter => NavigatorEvent::Select,
        KeyCode::Esc => NavigatorEvent::CancelSearch,
        KeyCode::Char(c) => return char_action(c, config),
        _ => return KeyAction::Ignored,
    };
    KeyAction::Event(event)
}

fn char_action(c: char, config: &Config) -> KeyAction {
    let keys = &config.keybindings;
    let jump_type = config.search.jump_type;

    let event = if c == keys.search {
        NavigatorEvent::StartSearch
    } else if c == keys.parent {
        NavigatorEvent::Parent
    } else if c == keys.next_sibling {
        NavigatorEvent::Sibling(Direction::Forward)
    } else if c == keys.prev_sibling {
        NavigatorEvent::Sibling(Direction::Backward)
    } else if c == keys.next_of_type {
        NavigatorEvent::TypeJump(jump_type, Direction::Forward)
    } else if c == keys.prev_of_type {
        NavigatorEvent::TypeJump(jump_type, Direction::Backward)
    } else if c == keys.goto_top {
        NavigatorEvent::Top
    } else if c == keys.goto_bottom {
        NavigatorEvent::Bottom
    } else if c == keys.toggle {
        NavigatorEvent::Toggle
    } else if c == keys.set_mark {
        return KeyAction::Pending(PendingKey::SetMark);
    } else if c == keys.jump_to_mark {
        return KeyAction::Pending(PendingKey::JumpToMark);
    } else if c == keys.quick_jump {
        return KeyAction::Pending(PendingKey::QuickJump(Direction::Forward));
    } else if c == keys.quick_jump_back {
        return KeyAction::Pending(PendingKey::QuickJump(Direction::Backward));
    } else {
        return KeyAction::Ignored;
    };
    KeyAction::Event(event)
}

/// Finish a two-key binding. Anything but a plain character abandons it.
pub fn complete_pending(pending: PendingKey, key: KeyEvent) -> Option<NavigatorEvent> {
    let KeyCode::Char(c) = key.code else {
        return None;
    };
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return None;
    }
    Some(match pending {
        PendingKey::SetMark => NavigatorEvent::SetMark(c),
        PendingKey::JumpToMark => NavigatorEvent::JumpToMark(c),
        PendingKey::QuickJump(direction) => NavigatorEvent::QuickJump(c, direction),
    })
}
