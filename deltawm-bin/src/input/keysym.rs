// SPDX-License-Identifier: GPL-3.0-only

//! Keysym values and name lookup for the map commands.
//!
//! Keymap compilation lives in the display library; the compositor only
//! needs the stable X11 keysym codes so that mapping definitions written
//! as names compare equal to the syms delivered with key events. The
//! table covers the names bindings realistically use; printable ASCII
//! resolves through its codepoint.

use std::collections::HashMap;

use once_cell::sync::Lazy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Keysym(pub u32);

#[rustfmt::skip]
static NAMED: &[(&str, u32)] = &[
    ("BackSpace", 0xff08),
    ("Tab", 0xff09),
    ("Return", 0xff0d),
    ("Pause", 0xff13),
    ("Scroll_Lock", 0xff14),
    ("Escape", 0xff1b),
    ("Home", 0xff50),
    ("Left", 0xff51),
    ("Up", 0xff52),
    ("Right", 0xff53),
    ("Down", 0xff54),
    ("Page_Up", 0xff55),
    ("Page_Down", 0xff56),
    ("End", 0xff57),
    ("Print", 0xff61),
    ("Insert", 0xff63),
    ("Menu", 0xff67),
    ("Num_Lock", 0xff7f),
    ("KP_Enter", 0xff8d),
    ("F1", 0xffbe),
    ("F2", 0xffbf),
    ("F3", 0xffc0),
    ("F4", 0xffc1),
    ("F5", 0xffc2),
    ("F6", 0xffc3),
    ("F7", 0xffc4),
    ("F8", 0xffc5),
    ("F9", 0xffc6),
    ("F10", 0xffc7),
    ("F11", 0xffc8),
    ("F12", 0xffc9),
    ("Delete", 0xffff),
    ("space", 0x0020),
    ("XF86MonBrightnessDown", 0x1008ff03),
    ("XF86MonBrightnessUp", 0x1008ff02),
    ("XF86AudioLowerVolume", 0x1008ff11),
    ("XF86AudioMute", 0x1008ff12),
    ("XF86AudioRaiseVolume", 0x1008ff13),
    ("XF86AudioPlay", 0x1008ff14),
    ("XF86AudioStop", 0x1008ff15),
    ("XF86AudioPrev", 0x1008ff16),
    ("XF86AudioNext", 0x1008ff17),
    ("XF86AudioMedia", 0x1008ff32),
    ("XF86AudioMicMute", 0x1008ffb2),
];

static BY_NAME: Lazy<HashMap<&'static str, u32>> =
    Lazy::new(|| NAMED.iter().copied().collect());

impl Keysym {
    /// Resolve a keysym name as written in a map command. Single
    /// printable ASCII characters resolve to their codepoint (letters
    /// lowercased, as an unshifted keymap would produce); longer names go
    /// through the table, case-insensitively on a miss.
    pub fn from_name(name: &str) -> Option<Keysym> {
        let mut chars = name.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            if c.is_ascii_graphic() {
                return Some(Keysym(c.to_ascii_lowercase() as u32));
            }
        }
        if let Some(&code) = BY_NAME.get(name) {
            return Some(Keysym(code));
        }
        NAMED
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|&(_, code)| Keysym(code))
    }

    pub fn name(self) -> Option<&'static str> {
        NAMED.iter().find(|&&(_, code)| code == self.0).map(|&(n, _)| n)
    }
}

impl std::fmt::Display for Keysym {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => match char::from_u32(self.0).filter(|c| c.is_ascii_graphic()) {
                Some(c) => write!(f, "{c}"),
                None => write!(f, "{:#x}", self.0),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_and_named_lookup() {
        assert_eq!(Keysym::from_name("q"), Some(Keysym(0x71)));
        assert_eq!(Keysym::from_name("Q"), Some(Keysym(0x71)));
        assert_eq!(Keysym::from_name("4"), Some(Keysym(0x34)));
        assert_eq!(Keysym::from_name("Return"), Some(Keysym(0xff0d)));
        assert_eq!(Keysym::from_name("return"), Some(Keysym(0xff0d)));
        assert_eq!(Keysym::from_name("NoSuchKey"), None);
    }

    #[test]
    fn display_round_trips_names() {
        assert_eq!(Keysym(0xff0d).to_string(), "Return");
        assert_eq!(Keysym(0x71).to_string(), "q");
    }
}
