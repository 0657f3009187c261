//! Roving-focus rules for the inline bar and the dropdown list.
//!
//! Both domains share one key vocabulary; only the orientation differs. The
//! functions here are pure: they map keys to moves and moves to indices over a
//! caller-supplied list of navigable positions.

use crossterm::event::{KeyCode, KeyEvent};

/// Which roving-focus domain owns keyboard input right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocusContext {
    /// Keyboard input is elsewhere in the host.
    #[default]
    Outside,
    /// The inline bar; `index` is the roving item position in the item list.
    Bar { index: Option<usize> },
    /// The "More" toggle control.
    Toggle,
    /// The open dropdown; `index` is the active proxy entry.
    Dropdown { index: Option<usize> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RovingMove {
    Next,
    Prev,
    First,
    Last,
}

/// What a key does while the toggle control is focused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleKeyAction {
    OpenFocusFirst,
    OpenFocusLast,
}

/// Maps a key to a roving move for the given orientation.
pub fn roving_move_for(orientation: Orientation, key: &KeyEvent) -> Option<RovingMove> {
    match (orientation, key.code) {
        (Orientation::Horizontal, KeyCode::Right) | (Orientation::Vertical, KeyCode::Down) => Some(RovingMove::Next),
        (Orientation::Horizontal, KeyCode::Left) | (Orientation::Vertical, KeyCode::Up) => Some(RovingMove::Prev),
        (_, KeyCode::Home) => Some(RovingMove::First),
        (_, KeyCode::End) => Some(RovingMove::Last),
        _ => None,
    }
}

pub fn toggle_key_action(key: &KeyEvent) -> Option<ToggleKeyAction> {
    match key.code {
        KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Down => Some(ToggleKeyAction::OpenFocusFirst),
        KeyCode::Up => Some(ToggleKeyAction::OpenFocusLast),
        _ => None,
    }
}

pub fn is_activation_key(key: &KeyEvent) -> bool {
    matches!(key.code, KeyCode::Enter | KeyCode::Char(' '))
}

/// Applies `movement` to `current` over the ascending positions in
/// `navigable`, wrapping circularly. A `current` that is no longer navigable
/// moves to the nearest navigable position in the direction of travel.
pub fn next_roving_index(navigable: &[usize], current: Option<usize>, movement: RovingMove) -> Option<usize> {
    let first = *navigable.first()?;
    let last = *navigable.last()?;
    let Some(current) = current else {
        return Some(match movement {
            RovingMove::Prev | RovingMove::Last => last,
            RovingMove::Next | RovingMove::First => first,
        });
    };

    let target = match movement {
        RovingMove::First => first,
        RovingMove::Last => last,
        RovingMove::Next => navigable.iter().copied().find(|i| *i > current).unwrap_or(first),
        RovingMove::Prev => navigable.iter().rev().copied().find(|i| *i < current).unwrap_or(last),
    };
    Some(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn orientation_decides_arrow_meaning() {
        assert_eq!(roving_move_for(Orientation::Horizontal, &key(KeyCode::Right)), Some(RovingMove::Next));
        assert_eq!(roving_move_for(Orientation::Horizontal, &key(KeyCode::Down)), None);
        assert_eq!(roving_move_for(Orientation::Vertical, &key(KeyCode::Up)), Some(RovingMove::Prev));
        assert_eq!(roving_move_for(Orientation::Vertical, &key(KeyCode::End)), Some(RovingMove::Last));
    }

    #[test]
    fn moves_wrap_circularly() {
        let navigable = [0, 1, 2];
        assert_eq!(next_roving_index(&navigable, Some(2), RovingMove::Next), Some(0));
        assert_eq!(next_roving_index(&navigable, Some(0), RovingMove::Prev), Some(2));
        assert_eq!(next_roving_index(&navigable, Some(1), RovingMove::Last), Some(2));
        assert_eq!(next_roving_index(&navigable, Some(1), RovingMove::First), Some(0));
    }

    #[test]
    fn disabled_positions_are_skipped() {
        // Position 1 is disabled, 4 overflowed.
        let navigable = [0, 2, 3];
        assert_eq!(next_roving_index(&navigable, Some(0), RovingMove::Next), Some(2));
        assert_eq!(next_roving_index(&navigable, Some(2), RovingMove::Prev), Some(0));
        assert_eq!(next_roving_index(&navigable, Some(3), RovingMove::Next), Some(0));
        // Stale current position (became disabled) moves in direction of travel.
        assert_eq!(next_roving_index(&navigable, Some(1), RovingMove::Next), Some(2));
        assert_eq!(next_roving_index(&navigable, Some(1), RovingMove::Prev), Some(0));
    }

    #[test]
    fn empty_domain_has_no_target() {
        assert_eq!(next_roving_index(&[], Some(0), RovingMove::Next), None);
        assert_eq!(next_roving_index(&[4], None, RovingMove::Prev), Some(4));
    }

    #[test]
    fn toggle_keys_open_toward_the_arrival_direction() {
        assert_eq!(toggle_key_action(&key(KeyCode::Enter)), Some(ToggleKeyAction::OpenFocusFirst));
        assert_eq!(toggle_key_action(&key(KeyCode::Char(' '))), Some(ToggleKeyAction::OpenFocusFirst));
        assert_eq!(toggle_key_action(&key(KeyCode::Down)), Some(ToggleKeyAction::OpenFocusFirst));
        assert_eq!(toggle_key_action(&key(KeyCode::Up)), Some(ToggleKeyAction::OpenFocusLast));
        assert_eq!(toggle_key_action(&key(KeyCode::Left)), None);
    }
}
