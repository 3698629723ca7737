// SPDX-License-Identifier: GPL-3.0-only

//! Keyboard mapping resolution with press/release edge semantics.
//!
//! A release binding fires in the mode that was active when the key went
//! down, and a key whose press matched (or that has a release binding) is
//! never forwarded to the client.

use crate::input::keysym::Keysym;
use crate::input::Modifiers;
use crate::modes::ModeRegistry;
use crate::seat::{PressedKey, Seat};

/// One decoded key event from the seam. `syms` are the layout-resolved
/// keysyms, `raw_syms` the layout-independent ones; `consumed_modifiers`
/// are mods the keymap used up producing `syms`.
#[derive(Debug, Clone)]
pub struct KeyEvent {
    pub keycode: u32,
    pub pressed: bool,
    pub modifiers: Modifiers,
    pub consumed_modifiers: Modifiers,
    pub syms: Vec<Keysym>,
    pub raw_syms: Vec<Keysym>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    /// A mapping fired; run its command.
    Run(Vec<String>),
    /// Swallow the event (release-bound key, or a fired press edge).
    Swallow,
    /// No mapping; deliver to the focused surface.
    Forward,
}

fn find_command(
    modes: &ModeRegistry,
    mode_id: usize,
    ev: &KeyEvent,
    release: bool,
) -> Option<Vec<String>> {
    let mode = modes.get(mode_id);
    for mapping in &mode.mappings {
        if mapping.release != release {
            continue;
        }
        let candidates = if mapping.layout_independent { &ev.raw_syms } else { &ev.syms };
        if candidates
            .iter()
            .any(|&sym| mapping.matches(ev.modifiers, ev.consumed_modifiers, sym, release))
        {
            return Some(mapping.command.clone());
        }
    }
    None
}

pub fn handle_key(seat: &mut Seat, modes: &ModeRegistry, ev: &KeyEvent) -> KeyOutcome {
    if ev.pressed {
        let press = find_command(modes, seat.mode_id, ev, false);
        let has_release = find_command(modes, seat.mode_id, ev, true).is_some();
        let consumed = press.is_some() || has_release;
        seat.pressed_keys
            .insert(ev.keycode, PressedKey { mode_id: seat.mode_id, consumed });
        match press {
            Some(command) => KeyOutcome::Run(command),
            None if has_release => KeyOutcome::Swallow,
            None => KeyOutcome::Forward,
        }
    } else {
        // Release resolves in the mode captured at press time.
        let Some(pressed) = seat.pressed_keys.remove(&ev.keycode) else {
            return KeyOutcome::Forward;
        };
        match find_command(modes, pressed.mode_id, ev, true) {
            Some(command) => KeyOutcome::Run(command),
            None if pressed.consumed => KeyOutcome::Swallow,
            None => KeyOutcome::Forward,
        }
    }
}
