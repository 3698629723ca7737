// SPDX-License-Identifier: GPL-3.0-only

//! Pointer binding resolution. Grab handling (move/resize) lives on the
//! server, which owns both the seat and the views.

use crate::input::Modifiers;
use crate::modes::{ModeRegistry, PointerAction};

/// Linux input event codes for the buttons bindings name directly.
#[rustfmt::skip]
static BUTTONS: &[(&str, u32)] = &[
    ("BTN_LEFT",    0x110),
    ("BTN_RIGHT",   0x111),
    ("BTN_MIDDLE",  0x112),
    ("BTN_SIDE",    0x113),
    ("BTN_EXTRA",   0x114),
    ("BTN_FORWARD", 0x115),
    ("BTN_BACK",    0x116),
    ("BTN_TASK",    0x117),
];

/// Accepts a symbolic name or a raw event code.
pub fn parse_button(s: &str) -> Option<u32> {
    BUTTONS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(s))
        .map(|&(_, code)| code)
        .or_else(|| s.parse().ok())
}

pub fn button_name(code: u32) -> Option<&'static str> {
    BUTTONS.iter().find(|&&(_, c)| c == code).map(|&(n, _)| n)
}

/// Find the action bound to a button press in the current mode.
pub fn find_action(
    modes: &ModeRegistry,
    mode_id: usize,
    modifiers: Modifiers,
    button: u32,
) -> Option<PointerAction> {
    let effective = modifiers.difference(Modifiers::IGNORED);
    modes
        .get(mode_id)
        .pointer_mappings
        .iter()
        .find(|m| m.modifiers == effective && m.button == button)
        .map(|m| m.action.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modes::{PointerMapping, MODE_NORMAL};

    #[test]
    fn button_names_and_codes() {
        assert_eq!(parse_button("BTN_LEFT"), Some(0x110));
        assert_eq!(parse_button("btn_right"), Some(0x111));
        assert_eq!(parse_button("274"), Some(274));
        assert_eq!(parse_button("BTN_NOPE"), None);
        assert_eq!(button_name(0x110), Some("BTN_LEFT"));
    }

    #[test]
    fn match_ignores_lock_modifiers() {
        let mut modes = ModeRegistry::default();
        modes.get_mut(MODE_NORMAL).add_pointer_mapping(PointerMapping {
            modifiers: Modifiers::SUPER,
            button: 0x110,
            action: PointerAction::MoveView,
        });
        assert_eq!(
            find_action(&modes, MODE_NORMAL, Modifiers::SUPER | Modifiers::MOD2, 0x110),
            Some(PointerAction::MoveView)
        );
        assert_eq!(find_action(&modes, MODE_NORMAL, Modifiers::SUPER, 0x111), None);
    }
}
