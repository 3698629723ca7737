// SPDX-License-Identifier: GPL-3.0-only

//! Named binding modes and their key/pointer mappings.

use std::collections::HashMap;

use crate::input::keysym::Keysym;
use crate::input::Modifiers;

/// Mode ids 0 and 1 are fixed at creation and never removed.
pub const MODE_NORMAL: usize = 0;
pub const MODE_LOCKED: usize = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mapping {
    pub modifiers: Modifiers,
    pub keysym: Keysym,
    pub release: bool,
    pub layout_independent: bool,
    pub command: Vec<String>,
}

impl Mapping {
    /// Whether this mapping fires for the given event. Caps/Num lock are
    /// ignored; a mapping also fires when the only difference is
    /// modifiers the keymap consumed to produce the sym.
    pub fn matches(&self, mods: Modifiers, consumed: Modifiers, sym: Keysym, release: bool) -> bool {
        let effective = mods.difference(Modifiers::IGNORED);
        self.release == release
            && self.keysym == sym
            && (self.modifiers == effective || self.modifiers == effective.difference(consumed))
    }

    fn same_trigger(&self, other: &Mapping) -> bool {
        self.modifiers == other.modifiers
            && self.keysym == other.keysym
            && self.release == other.release
            && self.layout_independent == other.layout_independent
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PointerAction {
    MoveView,
    ResizeView,
    Command(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointerMapping {
    pub modifiers: Modifiers,
    pub button: u32,
    pub action: PointerAction,
}

#[derive(Debug, Default)]
pub struct Mode {
    pub name: String,
    pub mappings: Vec<Mapping>,
    pub pointer_mappings: Vec<PointerMapping>,
}

impl Mode {
    fn named(name: &str) -> Self {
        Mode { name: name.to_owned(), ..Default::default() }
    }

    /// Add a mapping, replacing any existing one with the same trigger.
    pub fn add_mapping(&mut self, mapping: Mapping) {
        match self.mappings.iter_mut().find(|m| m.same_trigger(&mapping)) {
            Some(existing) => *existing = mapping,
            None => self.mappings.push(mapping),
        }
    }

    /// Remove by trigger; false if nothing matched.
    pub fn remove_mapping(&mut self, modifiers: Modifiers, keysym: Keysym, release: bool) -> bool {
        let before = self.mappings.len();
        self.mappings
            .retain(|m| !(m.modifiers == modifiers && m.keysym == keysym && m.release == release));
        self.mappings.len() != before
    }

    pub fn add_pointer_mapping(&mut self, mapping: PointerMapping) {
        match self
            .pointer_mappings
            .iter_mut()
            .find(|m| m.modifiers == mapping.modifiers && m.button == mapping.button)
        {
            Some(existing) => *existing = mapping,
            None => self.pointer_mappings.push(mapping),
        }
    }

    pub fn remove_pointer_mapping(&mut self, modifiers: Modifiers, button: u32) -> bool {
        let before = self.pointer_mappings.len();
        self.pointer_mappings
            .retain(|m| !(m.modifiers == modifiers && m.button == button));
        self.pointer_mappings.len() != before
    }
}

#[derive(Debug)]
pub struct ModeRegistry {
    modes: Vec<Mode>,
    by_name: HashMap<String, usize>,
}

impl Default for ModeRegistry {
    fn default() -> Self {
        let mut registry = ModeRegistry { modes: Vec::new(), by_name: HashMap::new() };
        registry.modes.push(Mode::named("normal"));
        registry.modes.push(Mode::named("locked"));
        registry.by_name.insert("normal".into(), MODE_NORMAL);
        registry.by_name.insert("locked".into(), MODE_LOCKED);
        registry
    }
}

impl ModeRegistry {
    /// Register a new mode; `None` if the name is taken.
    pub fn declare(&mut self, name: &str) -> Option<usize> {
        if self.by_name.contains_key(name) {
            return None;
        }
        let id = self.modes.len();
        self.modes.push(Mode::named(name));
        self.by_name.insert(name.to_owned(), id);
        Some(id)
    }

    pub fn id(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    pub fn get(&self, id: usize) -> &Mode {
        &self.modes[id]
    }

    pub fn get_mut(&mut self, id: usize) -> &mut Mode {
        &mut self.modes[id]
    }
}
