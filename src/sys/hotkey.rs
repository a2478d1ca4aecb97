//! Keyboard input as seen by the switcher.
//!
//! Raw event-tap data (event type, virtual keycode, modifier flags) is
//! decoded into [`InputEvent`]s here so the rest of the crate never touches
//! CoreGraphics event types.

use bitflags::bitflags;
use num_enum::IntoPrimitive;
use serde::{Deserialize, Serialize};
use strum::EnumIter;

/// A virtual keycode (`kVK_*`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(transparent)]
pub struct KeyCode(pub u16);

impl KeyCode {
    pub const RETURN: KeyCode = KeyCode(36);
    pub const TAB: KeyCode = KeyCode(48);
    pub const ESCAPE: KeyCode = KeyCode(53);
    pub const KEYPAD_ENTER: KeyCode = KeyCode(76);
    pub const LEFT_ARROW: KeyCode = KeyCode(123);
    pub const RIGHT_ARROW: KeyCode = KeyCode(124);
    pub const DOWN_ARROW: KeyCode = KeyCode(125);
    pub const UP_ARROW: KeyCode = KeyCode(126);

    pub fn is_navigation(self) -> bool {
        matches!(
            self,
            KeyCode::LEFT_ARROW
                | KeyCode::RIGHT_ARROW
                | KeyCode::UP_ARROW
                | KeyCode::DOWN_ARROW
                | KeyCode::ESCAPE
                | KeyCode::RETURN
                | KeyCode::KEYPAD_ENTER
        )
    }
}

bitflags! {
    /// Modifier bits as they appear in `CGEventFlags` / `NSEventModifierFlags`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u64 {
        const SHIFT = 1 << 17;
        const CONTROL = 1 << 18;
        const OPTION = 1 << 19;
        const COMMAND = 1 << 20;
    }
}

impl Modifiers {
    /// Keeps the four modifier bits and drops device-dependent noise.
    pub fn from_event_flags(flags: u64) -> Self { Modifiers::from_bits_truncate(flags) }

    pub fn command(self) -> bool { self.contains(Modifiers::COMMAND) }

    pub fn shift(self) -> bool { self.contains(Modifiers::SHIFT) }
}

/// `kCGEventKeyDown`
pub const EVENT_KEY_DOWN: u32 = 10;
/// `kCGEventFlagsChanged`
pub const EVENT_FLAGS_CHANGED: u32 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    KeyDown { key: KeyCode, modifiers: Modifiers },
    FlagsChanged(Modifiers),
}

impl InputEvent {
    /// Decodes the fields an event tap hands us. Event types other than
    /// key-down and flags-changed are not interesting to the switcher.
    pub fn decode(event_type: u32, keycode: i64, flags: u64) -> Option<InputEvent> {
        let modifiers = Modifiers::from_event_flags(flags);
        match event_type {
            EVENT_KEY_DOWN => {
                let key = KeyCode(u16::try_from(keycode).ok()?);
                Some(InputEvent::KeyDown { key, modifiers })
            }
            EVENT_FLAGS_CHANGED => Some(InputEvent::FlagsChanged(modifiers)),
            _ => None,
        }
    }

    pub fn is_command_tab(&self) -> bool {
        matches!(self, InputEvent::KeyDown { key: KeyCode::TAB, modifiers } if modifiers.command())
    }
}

/// Whether the event tap should swallow `event` instead of passing it on to
/// the focused application.
pub fn should_consume(event: &InputEvent, showing: bool) -> bool {
    match event {
        InputEvent::FlagsChanged(_) => false,
        e if e.is_command_tab() => true,
        InputEvent::KeyDown { key, .. } => showing && key.is_navigation(),
    }
}

/// The system shortcuts owned by the Dock's application switcher. Values are
/// the CGS symbolic hotkey identifiers.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, IntoPrimitive, EnumIter,
)]
#[repr(i32)]
#[serde(rename_all = "snake_case")]
pub enum SymbolicHotKey {
    CommandTab = 1,
    CommandShiftTab = 2,
    CommandKeyAboveTab = 6,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use strum::IntoEnumIterator;

    use super::*;

    const CMD: u64 = 1 << 20;
    const SHIFT: u64 = 1 << 17;
    // Device-dependent left-command bit plus the non-coalesced bit.
    const NOISE: u64 = 0x08 | 0x100;

    #[test]
    fn decodes_key_down_with_modifiers() {
        let event = InputEvent::decode(EVENT_KEY_DOWN, 48, CMD | SHIFT | NOISE).unwrap();
        assert_eq!(event, InputEvent::KeyDown {
            key: KeyCode::TAB,
            modifiers: Modifiers::COMMAND | Modifiers::SHIFT,
        });
        assert!(event.is_command_tab());
    }

    #[test]
    fn decodes_flags_changed() {
        assert_eq!(
            InputEvent::decode(EVENT_FLAGS_CHANGED, 55, NOISE),
            Some(InputEvent::FlagsChanged(Modifiers::empty()))
        );
    }

    #[test]
    fn ignores_other_event_types_and_bad_keycodes() {
        assert_eq!(InputEvent::decode(11, 48, CMD), None);
        assert_eq!(InputEvent::decode(EVENT_KEY_DOWN, -1, CMD), None);
    }

    #[test]
    fn tab_without_command_is_not_the_shortcut() {
        let event = InputEvent::KeyDown {
            key: KeyCode::TAB,
            modifiers: Modifiers::OPTION,
        };
        assert!(!event.is_command_tab());
        assert!(!should_consume(&event, true));
    }

    #[test]
    fn consumes_shortcut_always_and_navigation_only_while_showing() {
        let cmd_tab = InputEvent::KeyDown {
            key: KeyCode::TAB,
            modifiers: Modifiers::COMMAND,
        };
        let left = InputEvent::KeyDown {
            key: KeyCode::LEFT_ARROW,
            modifiers: Modifiers::COMMAND,
        };
        let letter = InputEvent::KeyDown {
            key: KeyCode(0),
            modifiers: Modifiers::COMMAND,
        };
        assert!(should_consume(&cmd_tab, false));
        assert!(should_consume(&cmd_tab, true));
        assert!(!should_consume(&left, false));
        assert!(should_consume(&left, true));
        assert!(!should_consume(&letter, true));
        assert!(!should_consume(&InputEvent::FlagsChanged(Modifiers::empty()), true));
    }

    #[test]
    fn symbolic_hotkey_ids() {
        let ids: Vec<i32> = SymbolicHotKey::iter().map(i32::from).collect();
        assert_eq!(ids, vec![1, 2, 6]);
    }
}
