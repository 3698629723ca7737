// SPDX-License-Identifier: GPL-3.0-only

//! Per-seat focus and mode state. Seats hold lookup-only ids; ownership
//! of views and outputs stays with the root.

use std::collections::HashMap;

use crate::geo::Point;
use crate::modes::{MODE_LOCKED, MODE_NORMAL};
use crate::shell::{OutputId, ViewId};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FocusTarget {
    #[default]
    None,
    View(ViewId),
    Layer(String),
    LockSurface,
}

/// Bookkeeping for a pressed key: which mode was active at press time and
/// whether the press was swallowed by a mapping.
#[derive(Debug, Clone, Copy)]
pub struct PressedKey {
    pub mode_id: usize,
    pub consumed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grab {
    Move { view: ViewId },
    Resize { view: ViewId },
}

#[derive(Debug)]
pub struct Seat {
    pub name: String,
    pub focused: FocusTarget,
    pub focused_output: Option<OutputId>,

    pub mode_id: usize,
    pub prev_mode_id: usize,
    /// While a session lock is held the mode is pinned to "locked".
    pub locked: bool,

    /// Most recently focused first; used to refocus after a view goes
    /// away.
    pub focus_history: Vec<ViewId>,
    pub pressed_keys: HashMap<u32, PressedKey>,

    pub repeat_rate: u32,
    pub repeat_delay: u32,

    pub pointer_pos: Point,
    pub grab: Option<Grab>,
    pub cursor_hidden: bool,
    pub hide_cursor_timeout_ms: u32,
    pub hide_cursor_when_typing: bool,
}

impl Seat {
    pub fn new(name: &str) -> Self {
        Seat {
            name: name.to_owned(),
            focused: FocusTarget::None,
            focused_output: None,
            mode_id: MODE_NORMAL,
            prev_mode_id: MODE_NORMAL,
            locked: false,
            focus_history: Vec::new(),
            pressed_keys: HashMap::new(),
            repeat_rate: 25,
            repeat_delay: 600,
            pointer_pos: Point::ZERO,
            grab: None,
            cursor_hidden: false,
            hide_cursor_timeout_ms: 0,
            hide_cursor_when_typing: false,
        }
    }

    pub fn focused_view(&self) -> Option<ViewId> {
        match self.focused {
            FocusTarget::View(id) => Some(id),
            _ => None,
        }
    }

    pub fn focus_view(&mut self, id: ViewId) {
        self.focused = FocusTarget::View(id);
        self.focus_history.retain(|&v| v != id);
        self.focus_history.insert(0, id);
    }

    pub fn clear_focus(&mut self) {
        self.focused = FocusTarget::None;
    }

    /// Switch modes. Fails while a session lock pins the locked mode.
    pub fn enter_mode(&mut self, id: usize) -> bool {
        if self.locked {
            return false;
        }
        self.prev_mode_id = self.mode_id;
        self.mode_id = id;
        true
    }

    pub fn session_locked(&mut self) {
        self.prev_mode_id = self.mode_id;
        self.mode_id = MODE_LOCKED;
        self.locked = true;
        self.grab = None;
    }

    pub fn session_unlocked(&mut self) {
        self.locked = false;
        self.mode_id = self.prev_mode_id;
        if self.focused == FocusTarget::LockSurface {
            self.focused = FocusTarget::None;
        }
    }

    /// Drop every reference to a view that is going away.
    pub fn forget_view(&mut self, id: ViewId) {
        self.focus_history.retain(|&v| v != id);
        if self.focused == FocusTarget::View(id) {
            self.focused = FocusTarget::None;
        }
        if matches!(self.grab, Some(Grab::Move { view } | Grab::Resize { view }) if view == id) {
            self.grab = None;
        }
    }

    pub fn forget_output(&mut self, id: OutputId) {
        if self.focused_output == Some(id) {
            self.focused_output = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn view_ids<const N: usize>() -> [ViewId; N] {
        let mut map: SlotMap<ViewId, ()> = SlotMap::with_key();
        [(); N].map(|_| map.insert(()))
    }

    #[test]
    fn locked_mode_is_a_trap_door() {
        let mut seat = Seat::new("seat0");
        seat.enter_mode(2);
        seat.session_locked();
        assert_eq!(seat.mode_id, MODE_LOCKED);
        assert!(!seat.enter_mode(MODE_NORMAL));
        assert!(!seat.enter_mode(5));
        assert_eq!(seat.mode_id, MODE_LOCKED);
        seat.session_unlocked();
        assert_eq!(seat.mode_id, 2);
        assert!(seat.enter_mode(MODE_NORMAL));
    }

    #[test]
    fn focus_history_is_mru() {
        let mut seat = Seat::new("seat0");
        let [a, b] = view_ids::<2>();
        seat.focus_view(a);
        seat.focus_view(b);
        seat.focus_view(a);
        assert_eq!(seat.focus_history, vec![a, b]);
        seat.forget_view(a);
        assert_eq!(seat.focused, FocusTarget::None);
        assert_eq!(seat.focus_history, vec![b]);
    }

    #[test]
    fn grab_released_when_view_goes_away() {
        let mut seat = Seat::new("seat0");
        let [a] = view_ids::<1>();
        seat.grab = Some(Grab::Move { view: a });
        seat.forget_view(a);
        assert_eq!(seat.grab, None);
    }
}
