// SPDX-License-Identifier: GPL-3.0-only

//! Per-output state: tag masks, the window-management stack, usable area
//! and the layout-demand slot.

use crate::config::AttachMode;
use crate::geo::Rect;
use crate::shell::{OutputId, ViewId};

/// An outstanding layout demand. Dimensions are accepted only while the
/// serial matches; they arrive in wm-stack order. `expected` is the count
/// the client was asked for, frozen even if views vanish mid-demand.
#[derive(Debug)]
pub struct LayoutDemand {
    pub serial: u32,
    pub views: Vec<ViewId>,
    pub expected: usize,
    pub pushed: Vec<Rect>,
}

#[derive(Debug)]
pub struct Output {
    pub id: OutputId,
    pub name: String,

    /// Position and size in the global layout space.
    pub global_box: Rect,
    /// Output-local area not claimed by layer-shell exclusion zones.
    pub usable_box: Rect,

    pub pending_tags: u32,
    pub current_tags: u32,
    pub previous_tags: u32,
    /// AND-mask applied to newly mapped views' tags.
    pub spawn_tagmask: u32,

    /// Window-management order, top first.
    pub wm_stack: Vec<ViewId>,

    /// Per-output override of the root's default layout namespace.
    pub layout_namespace: Option<String>,
    pub attach_mode: Option<AttachMode>,

    pub layout_demand: Option<LayoutDemand>,
    next_demand_serial: u32,
}

impl Output {
    pub fn new(id: OutputId, name: String, global_box: Rect) -> Self {
        Output {
            id,
            name,
            global_box,
            usable_box: Rect::from_size(global_box.width, global_box.height),
            pending_tags: 1,
            current_tags: 1,
            previous_tags: 1,
            spawn_tagmask: u32::MAX,
            wm_stack: Vec::new(),
            layout_namespace: None,
            attach_mode: None,
            layout_demand: None,
            next_demand_serial: 0,
        }
    }

    pub fn attach(&mut self, view: ViewId, mode: AttachMode) {
        match mode {
            AttachMode::Top => self.wm_stack.insert(0, view),
            AttachMode::Bottom => self.wm_stack.push(view),
        }
    }

    pub fn detach(&mut self, view: ViewId) {
        self.wm_stack.retain(|&v| v != view);
        if let Some(demand) = &mut self.layout_demand {
            demand.views.retain(|&v| v != view);
        }
    }

    pub fn effective_namespace<'a>(&'a self, default: &'a str) -> &'a str {
        self.layout_namespace.as_deref().unwrap_or(default)
    }

    /// Open a new demand slot, invalidating any previous serial.
    pub fn begin_demand(&mut self, views: Vec<ViewId>) -> u32 {
        let serial = self.next_demand_serial;
        self.next_demand_serial = self.next_demand_serial.wrapping_add(1);
        let expected = views.len();
        self.layout_demand = Some(LayoutDemand { serial, views, expected, pushed: Vec::new() });
        serial
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn ids<const N: usize>() -> [ViewId; N] {
        let mut map: SlotMap<ViewId, ()> = SlotMap::with_key();
        [(); N].map(|_| map.insert(()))
    }

    #[test]
    fn attach_respects_mode() {
        let mut outputs: SlotMap<OutputId, ()> = SlotMap::with_key();
        let oid = outputs.insert(());
        let mut output = Output::new(oid, "OUT-1".into(), Rect::from_size(1920, 1080));
        let [a, b, c] = ids::<3>();
        output.attach(a, AttachMode::Top);
        output.attach(b, AttachMode::Top);
        output.attach(c, AttachMode::Bottom);
        assert_eq!(output.wm_stack, vec![b, a, c]);
        output.detach(a);
        assert_eq!(output.wm_stack, vec![b, c]);
    }

    #[test]
    fn new_demand_invalidates_previous_serial() {
        let mut outputs: SlotMap<OutputId, ()> = SlotMap::with_key();
        let oid = outputs.insert(());
        let mut output = Output::new(oid, "OUT-1".into(), Rect::from_size(800, 600));
        let first = output.begin_demand(Vec::new());
        let second = output.begin_demand(Vec::new());
        assert_ne!(first, second);
        assert_eq!(output.layout_demand.as_ref().unwrap().serial, second);
    }
}
