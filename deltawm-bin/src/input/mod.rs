// SPDX-License-Identifier: GPL-3.0-only

//! Input pipeline: modifier state, keyboard and pointer event handling,
//! per-device configuration. Decoded events arrive through the seat
//! methods on [`crate::server::Server`]; the keymap itself is compiled by
//! the display library.

pub mod config;
pub mod keyboard;
pub mod keysym;
pub mod pointer;

bitflags::bitflags! {
    /// Keyboard modifier mask, one bit per X modifier.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u32 {
        const SHIFT = 1 << 0;
        const LOCK  = 1 << 1;
        const CTRL  = 1 << 2;
        const ALT   = 1 << 3;
        const MOD2  = 1 << 4;
        const MOD3  = 1 << 5;
        const SUPER = 1 << 6;
        const MOD5  = 1 << 7;
    }
}

impl Modifiers {
    /// Caps and Num lock are ignored when matching mappings.
    pub const IGNORED: Modifiers = Modifiers::LOCK.union(Modifiers::MOD2);

    /// Parse a `+`-separated modifier list as used by the map commands.
    /// `None` (the word) means the empty mask.
    pub fn parse(s: &str) -> Option<Modifiers> {
        let mut mods = Modifiers::empty();
        if s.eq_ignore_ascii_case("none") {
            return Some(mods);
        }
        for name in s.split('+') {
            match name.to_ascii_lowercase().as_str() {
                "shift" => mods |= Modifiers::SHIFT,
                "lock" => mods |= Modifiers::LOCK,
                "control" | "ctrl" => mods |= Modifiers::CTRL,
                "mod1" | "alt" => mods |= Modifiers::ALT,
                "mod2" => mods |= Modifiers::MOD2,
                "mod3" => mods |= Modifiers::MOD3,
                "mod4" | "super" | "logo" => mods |= Modifiers::SUPER,
                "mod5" => mods |= Modifiers::MOD5,
                _ => return None,
            }
        }
        Some(mods)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_modifier_lists() {
        assert_eq!(Modifiers::parse("None"), Some(Modifiers::empty()));
        assert_eq!(
            Modifiers::parse("Super+Shift"),
            Some(Modifiers::SUPER | Modifiers::SHIFT)
        );
        assert_eq!(Modifiers::parse("Mod4"), Some(Modifiers::SUPER));
        assert_eq!(Modifiers::parse("Alt"), Some(Modifiers::ALT));
        assert_eq!(Modifiers::parse("Hyper"), None);
    }
}
