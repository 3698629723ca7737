// SPDX-License-Identifier: GPL-3.0-only

//! Owns every output and view, and runs the pending → inflight → current
//! apply cycle: arrange, gather layout-client dimensions, then a
//! transaction that holds back the frame until every resized client has
//! acked (or the timeout gives up and commits best-effort).

use deltawm_protocol::LayoutEvent;
use itertools::Itertools;
use slotmap::SlotMap;
use tracing::{debug, warn};

use crate::geo::{Point, Rect};
use crate::layout::{ConnId, LayoutManager};
use crate::shell::output::Output;
use crate::shell::view::{ShellSurface, View};
use crate::shell::{OutputId, ShellEvent, ShellQueue, ViewId};

/// What the caller must do after an apply step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Nothing changed.
    Idle,
    /// Layout demands were sent; arm the demand timeout.
    AwaitingLayout,
    /// Configures are out; arm the transaction timeout.
    TransactionStarted,
    /// State was promoted; schedule frames and re-run focus checks.
    Committed,
}

#[derive(Debug)]
struct Transaction {
    participants: Vec<ViewId>,
}

#[derive(Debug)]
pub struct Root {
    pub views: SlotMap<ViewId, View>,
    pub outputs: SlotMap<OutputId, Output>,
    /// Real outputs in creation order; excludes the no-op sentinel.
    pub output_order: Vec<OutputId>,
    /// Permanent fallback owner for views with no real output.
    pub noop_output: OutputId,
    pub default_layout_namespace: Option<String>,

    transaction: Option<Transaction>,
    demands_outstanding: usize,
    pending_apply: bool,
}

impl Default for Root {
    fn default() -> Self {
        let views = SlotMap::with_key();
        let mut outputs: SlotMap<OutputId, Output> = SlotMap::with_key();
        let noop_output =
            outputs.insert_with_key(|id| Output::new(id, "noop".into(), Rect::default()));
        Root {
            views,
            outputs,
            output_order: Vec::new(),
            noop_output,
            default_layout_namespace: None,
            transaction: None,
            demands_outstanding: 0,
            pending_apply: false,
        }
    }
}

impl Root {
    pub fn add_output(&mut self, name: String, global_box: Rect) -> OutputId {
        let id = self.outputs.insert_with_key(|id| Output::new(id, name, global_box));
        self.output_order.push(id);
        id
    }

    /// Drop an output; its views fall back to the first remaining real
    /// output, or the no-op sentinel.
    pub fn remove_output(&mut self, id: OutputId) -> Vec<ViewId> {
        self.output_order.retain(|&o| o != id);
        let Some(removed) = self.outputs.remove(id) else {
            return Vec::new();
        };
        let fallback = self.output_order.first().copied().unwrap_or(self.noop_output);
        let orphans = removed.wm_stack.clone();
        for &view_id in &orphans {
            if let Some(view) = self.views.get_mut(view_id) {
                view.output = fallback;
            }
            if let Some(output) = self.outputs.get_mut(fallback) {
                output.wm_stack.push(view_id);
            }
        }
        if let Some(tx) = &mut self.transaction {
            tx.participants.retain(|v| self.views.contains_key(*v));
        }
        orphans
    }

    pub fn output_by_name(&self, name: &str) -> Option<OutputId> {
        self.output_order
            .iter()
            .copied()
            .find(|&id| self.outputs[id].name == name)
    }

    pub fn insert_view(&mut self, shell: ShellSurface, output: OutputId) -> ViewId {
        self.views.insert_with_key(|id| View::new(id, shell, output))
    }

    /// Unlink and drop a view. Safe mid-transaction: the participant set
    /// shrinks and the commit may become possible, which the caller
    /// observes through [`Root::maybe_finish_transaction`].
    pub fn remove_view(&mut self, id: ViewId) {
        if let Some(view) = self.views.remove(id) {
            if let Some(output) = self.outputs.get_mut(view.output) {
                output.detach(id);
            }
        }
        if let Some(tx) = &mut self.transaction {
            tx.participants.retain(|&v| v != id);
        }
    }

    /// Tombstone a view that unmapped while a transaction holds its
    /// reference: it leaves every stack now, the slot is reclaimed at
    /// commit.
    pub fn mark_destroying(&mut self, id: ViewId) {
        let Some(view) = self.views.get_mut(id) else { return };
        view.destroying = true;
        let output = view.output;
        if let Some(output) = self.outputs.get_mut(output) {
            output.detach(id);
        }
        if let Some(tx) = &mut self.transaction {
            tx.participants.retain(|&v| v != id);
        }
    }

    /// Move a view between outputs, preserving its place at the top of
    /// the target stack.
    pub fn transfer_view(&mut self, id: ViewId, to: OutputId) {
        let Some(view) = self.views.get_mut(id) else { return };
        let from = view.output;
        if from == to {
            return;
        }
        view.output = to;
        if let Some(output) = self.outputs.get_mut(from) {
            output.detach(id);
        }
        if let Some(output) = self.outputs.get_mut(to) {
            output.wm_stack.insert(0, id);
        }
    }

    pub fn busy(&self) -> bool {
        self.transaction.is_some() || self.demands_outstanding > 0
    }

    pub fn transaction_active(&self) -> bool {
        self.transaction.is_some()
    }

    pub fn awaiting_layouts(&self) -> bool {
        self.demands_outstanding > 0
    }

    pub fn outputs_with_open_demands(&self) -> Vec<OutputId> {
        self.output_order
            .iter()
            .copied()
            .filter(|&id| self.outputs[id].layout_demand.is_some())
            .collect()
    }

    /// Views of `output` visible under its pending tags, wm order.
    pub fn visible_views(&self, output: OutputId) -> Vec<ViewId> {
        let Some(out) = self.outputs.get(output) else { return Vec::new() };
        out.wm_stack
            .iter()
            .copied()
            .filter(|&v| {
                self.views
                    .get(v)
                    .map(|view| view.visible_on(out.pending_tags))
                    .unwrap_or(false)
            })
            .collect()
    }

    /// Paint order for `output` under its committed tags, bottom first:
    /// tiles, then floats, fullscreen on top. Within a class the top of
    /// the wm stack paints last.
    pub fn render_stack(&self, output: OutputId) -> Vec<ViewId> {
        let Some(out) = self.outputs.get(output) else { return Vec::new() };
        let visible = out
            .wm_stack
            .iter()
            .rev()
            .copied()
            .filter(|&v| {
                self.views
                    .get(v)
                    .map(|view| !view.destroying && view.current.tags & out.current_tags != 0)
                    .unwrap_or(false)
            })
            .collect_vec();
        let class = |view: &View| -> u8 {
            if view.current.fullscreen {
                2
            } else if view.current.float {
                1
            } else {
                0
            }
        };
        visible
            .into_iter()
            .sorted_by_key(|&v| class(&self.views[v]))
            .collect()
    }

    /// Stage pending state: arrange every output, demanding layouts where
    /// a generator is bound, then open the transaction. Coalesces while a
    /// previous cycle is still in flight.
    pub fn apply(
        &mut self,
        layouts: &LayoutManager,
        queue: &mut ShellQueue,
        layout_out: &mut Vec<(ConnId, LayoutEvent)>,
    ) -> ApplyOutcome {
        if self.busy() {
            self.pending_apply = true;
            return if self.transaction.is_some() {
                ApplyOutcome::TransactionStarted
            } else {
                ApplyOutcome::AwaitingLayout
            };
        }
        for &output_id in &self.output_order.clone() {
            self.arrange_output(output_id, layouts, layout_out);
        }
        if self.demands_outstanding > 0 {
            ApplyOutcome::AwaitingLayout
        } else {
            self.start_transaction(queue)
        }
    }

    fn arrange_output(
        &mut self,
        output_id: OutputId,
        layouts: &LayoutManager,
        layout_out: &mut Vec<(ConnId, LayoutEvent)>,
    ) {
        let visible = self.visible_views(output_id);
        let output = &self.outputs[output_id];
        let usable = output.usable_box;
        let full_rect = Rect::from_size(output.global_box.width, output.global_box.height);
        let tags = output.pending_tags;

        let mut tiled = Vec::new();
        for &view_id in &visible {
            let view = &mut self.views[view_id];
            if view.pending.fullscreen {
                view.pending.rect = full_rect;
                view.pending_move = Point::ZERO;
                view.draw_borders = false;
            } else if view.pending.float {
                let resolved = resolve_float(view.float_box, view.pending_move, &usable);
                view.pending.rect = resolved;
                view.float_box = resolved;
                view.pending_move = Point::ZERO;
                view.draw_borders = true;
            } else {
                view.draw_borders = true;
                tiled.push(view_id);
            }
        }
        if tiled.is_empty() {
            return;
        }

        let output = &mut self.outputs[output_id];
        let namespace = output
            .effective_namespace(self.default_layout_namespace.as_deref().unwrap_or(""))
            .to_owned();
        match layouts.binding_for(&namespace) {
            Some(client) if !namespace.is_empty() => {
                let serial = output.begin_demand(tiled.clone());
                layout_out.push((
                    client.conn,
                    LayoutEvent::LayoutDemand {
                        serial,
                        view_count: tiled.len() as u32,
                        usable_width: usable.width.max(0) as u32,
                        usable_height: usable.height.max(0) as u32,
                        tags,
                    },
                ));
                self.demands_outstanding += 1;
            }
            _ => self.stack_fallback(&tiled, &usable),
        }
    }

    /// The no-layout fallback: every tile fills the usable box.
    fn stack_fallback(&mut self, tiled: &[ViewId], usable: &Rect) {
        for &view_id in tiled {
            let view = &mut self.views[view_id];
            view.pending.rect = *usable;
            view.pending_move = Point::ZERO;
        }
    }

    /// Accept one pushed dimension for an open demand. Stale serials are
    /// discarded.
    pub fn push_dimensions(&mut self, output_id: OutputId, serial: u32, rect: Rect) {
        let Some(output) = self.outputs.get_mut(output_id) else { return };
        match &mut output.layout_demand {
            Some(demand) if demand.serial == serial => demand.pushed.push(rect),
            _ => debug!(serial, "discarding stale layout dimensions"),
        }
    }

    /// Complete a demand. On a count mismatch the demand is abandoned and
    /// the output falls back to stacking; the caller disconnects the
    /// client. Returns Err on protocol violation.
    pub fn commit_layout(
        &mut self,
        output_id: OutputId,
        serial: u32,
        layout_name: &str,
    ) -> Result<(), ()> {
        let Some(output) = self.outputs.get_mut(output_id) else { return Ok(()) };
        let Some(demand) = output.layout_demand.take() else {
            debug!(serial, "commit with no open demand");
            return Ok(());
        };
        if demand.serial != serial {
            debug!(serial, "commit with stale serial");
            output.layout_demand = Some(demand);
            return Ok(());
        }
        let usable = output.usable_box;
        self.demands_outstanding = self.demands_outstanding.saturating_sub(1);
        if demand.pushed.len() != demand.expected {
            warn!(
                output = %self.outputs[output_id].name,
                expected = demand.expected,
                got = demand.pushed.len(),
                "layout client pushed a wrong dimension count"
            );
            let views = demand.views.clone();
            self.stack_fallback(&views, &usable);
            return Err(());
        }
        debug!(layout = layout_name, serial, "layout committed");
        for (&view_id, rect) in demand.views.iter().zip(&demand.pushed) {
            if let Some(view) = self.views.get_mut(view_id) {
                let (w, h) = view.shell.clamp_size(rect.width, rect.height);
                view.pending.rect =
                    Rect::new(usable.x + rect.x, usable.y + rect.y, w, h);
                view.pending_move = Point::ZERO;
            }
        }
        Ok(())
    }

    /// Abandon the demand on `output` (client error or demand timeout)
    /// and stack its tiles.
    pub fn abandon_demand(&mut self, output_id: OutputId) {
        let Some(output) = self.outputs.get_mut(output_id) else { return };
        if let Some(demand) = output.layout_demand.take() {
            let usable = output.usable_box;
            self.demands_outstanding = self.demands_outstanding.saturating_sub(1);
            self.stack_fallback(&demand.views.clone(), &usable);
        }
    }

    /// Called once every open demand has resolved one way or the other.
    pub fn finish_arrangement(&mut self, queue: &mut ShellQueue) -> ApplyOutcome {
        debug_assert_eq!(self.demands_outstanding, 0);
        self.start_transaction(queue)
    }

    fn start_transaction(&mut self, queue: &mut ShellQueue) -> ApplyOutcome {
        let participants = self
            .views
            .iter_mut()
            .filter(|(_, view)| !view.destroying)
            .filter_map(|(id, view)| {
                let dirty = view.pending != view.current;
                view.begin_transaction(queue);
                dirty.then_some(id)
            })
            .collect_vec();
        let tags_dirty = self
            .outputs
            .values()
            .any(|o| o.pending_tags != o.current_tags);
        if participants.is_empty() && !tags_dirty {
            return ApplyOutcome::Idle;
        }
        self.transaction = Some(Transaction { participants });
        if self.all_ready() {
            self.commit(queue);
            ApplyOutcome::Committed
        } else {
            ApplyOutcome::TransactionStarted
        }
    }

    fn all_ready(&self) -> bool {
        let Some(tx) = &self.transaction else { return false };
        tx.participants
            .iter()
            .all(|&v| self.views.get(v).map(|view| view.ready()).unwrap_or(true))
    }

    /// Record a configure ack. Returns `Committed` when this ack closed
    /// the transaction.
    pub fn ack_configure(
        &mut self,
        view_id: ViewId,
        serial: u32,
        queue: &mut ShellQueue,
    ) -> Option<ApplyOutcome> {
        let view = self.views.get_mut(view_id)?;
        if !view.ack_configure(serial) {
            return None;
        }
        self.maybe_finish_transaction(queue)
    }

    /// Commit if a transaction is open and every participant is ready.
    pub fn maybe_finish_transaction(&mut self, queue: &mut ShellQueue) -> Option<ApplyOutcome> {
        if self.transaction.is_some() && self.all_ready() {
            self.commit(queue);
            return Some(ApplyOutcome::Committed);
        }
        None
    }

    /// Forced commit on transaction timeout: laggards keep their stashed
    /// buffers at the old size rather than stalling the frame.
    pub fn timeout_transaction(&mut self, queue: &mut ShellQueue) -> bool {
        let Some(tx) = &self.transaction else { return false };
        let laggards = tx
            .participants
            .iter()
            .filter(|&&v| self.views.get(v).map(|view| !view.ready()).unwrap_or(false))
            .count();
        warn!(laggards, "transaction timed out, committing anyway");
        self.commit(queue);
        true
    }

    fn commit(&mut self, queue: &mut ShellQueue) {
        let Some(tx) = self.transaction.take() else { return };
        let mut affected = Vec::new();
        for view_id in tx.participants {
            if let Some(view) = self.views.get_mut(view_id) {
                view.commit_inflight();
                if !affected.contains(&view.output) {
                    affected.push(view.output);
                }
            }
        }
        for (id, output) in self.outputs.iter_mut() {
            if output.pending_tags != output.current_tags {
                output.current_tags = output.pending_tags;
                if !affected.contains(&id) {
                    affected.push(id);
                }
            }
        }
        for output in affected {
            if output != self.noop_output {
                queue.push_back(ShellEvent::FrameScheduled { output });
            }
        }
        // The transaction no longer references tombstoned views.
        let dead = self
            .views
            .iter()
            .filter(|(_, view)| view.destroying)
            .map(|(id, _)| id)
            .collect_vec();
        for id in dead {
            self.views.remove(id);
        }
    }

    /// Whether a coalesced apply is waiting behind the finished cycle.
    pub fn take_pending_apply(&mut self) -> bool {
        std::mem::take(&mut self.pending_apply)
    }
}

fn resolve_float(rect: Rect, delta: Point, usable: &Rect) -> Rect {
    let mut out = rect;
    out.x = match delta.x {
        i32::MIN => usable.x,
        i32::MAX => usable.x + usable.width - out.width,
        d => out.x.saturating_add(d),
    };
    out.y = match delta.y {
        i32::MIN => usable.y,
        i32::MAX => usable.y + usable.height - out.height,
        d => out.y.saturating_add(d),
    };
    out.clamped_into(usable)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::xdg::XdgToplevel;

    fn root_with_output() -> (Root, OutputId) {
        let mut root = Root::default();
        let output = root.add_output("OUT-1".into(), Rect::from_size(1920, 1080));
        (root, output)
    }

    fn map_tile(root: &mut Root, output: OutputId, tags: u32) -> ViewId {
        let id = root.insert_view(ShellSurface::Xdg(XdgToplevel::default()), output);
        let view = &mut root.views[id];
        view.pending.tags = tags;
        root.outputs[output].wm_stack.push(id);
        id
    }

    #[test]
    fn fallback_stacks_tiles_into_usable_box() {
        let (mut root, output) = root_with_output();
        let a = map_tile(&mut root, output, 1);
        let b = map_tile(&mut root, output, 1);
        let layouts = LayoutManager::default();
        let mut queue = ShellQueue::new();
        let mut layout_out = Vec::new();
        let outcome = root.apply(&layouts, &mut queue, &mut layout_out);
        assert_eq!(outcome, ApplyOutcome::TransactionStarted);
        assert!(layout_out.is_empty());
        for id in [a, b] {
            assert_eq!(root.views[id].inflight.rect, Rect::from_size(1920, 1080));
        }
    }

    #[test]
    fn current_state_is_stable_until_all_acks() {
        let (mut root, output) = root_with_output();
        let a = map_tile(&mut root, output, 1);
        let b = map_tile(&mut root, output, 1);
        let layouts = LayoutManager::default();
        let mut queue = ShellQueue::new();
        let mut layout_out = Vec::new();
        root.apply(&layouts, &mut queue, &mut layout_out);

        let serials: Vec<(ViewId, u32)> = queue
            .iter()
            .filter_map(|ev| match ev {
                ShellEvent::Configure { view, serial: Some(s), .. } => Some((*view, *s)),
                _ => None,
            })
            .collect();
        assert_eq!(serials.len(), 2);

        assert_eq!(root.ack_configure(serials[0].0, serials[0].1, &mut queue), None);
        assert_eq!(root.views[a].current.rect, Rect::default());

        let outcome = root.ack_configure(serials[1].0, serials[1].1, &mut queue);
        assert_eq!(outcome, Some(ApplyOutcome::Committed));
        assert_eq!(root.views[a].current.rect, Rect::from_size(1920, 1080));
        assert_eq!(root.views[b].current.rect, Rect::from_size(1920, 1080));
        assert!(queue.iter().any(|ev| matches!(ev, ShellEvent::FrameScheduled { .. })));
    }

    #[test]
    fn applies_coalesce_while_in_flight() {
        let (mut root, output) = root_with_output();
        map_tile(&mut root, output, 1);
        let layouts = LayoutManager::default();
        let mut queue = ShellQueue::new();
        let mut layout_out = Vec::new();
        assert_eq!(
            root.apply(&layouts, &mut queue, &mut layout_out),
            ApplyOutcome::TransactionStarted
        );
        root.apply(&layouts, &mut queue, &mut layout_out);
        assert!(root.busy());
        root.timeout_transaction(&mut queue);
        assert!(root.take_pending_apply());
        assert!(!root.busy());
    }

    #[test]
    fn view_destroyed_mid_transaction_unblocks_commit() {
        let (mut root, output) = root_with_output();
        let a = map_tile(&mut root, output, 1);
        let b = map_tile(&mut root, output, 1);
        let layouts = LayoutManager::default();
        let mut queue = ShellQueue::new();
        let mut layout_out = Vec::new();
        root.apply(&layouts, &mut queue, &mut layout_out);

        let serial_b = queue
            .iter()
            .find_map(|ev| match ev {
                ShellEvent::Configure { view, serial: Some(s), .. } if *view == b => Some(*s),
                _ => None,
            })
            .unwrap();
        root.remove_view(a);
        root.ack_configure(b, serial_b, &mut queue);
        assert_eq!(root.maybe_finish_transaction(&mut queue), None);
        assert!(!root.busy());
        assert_eq!(root.views[b].current.rect, Rect::from_size(1920, 1080));
    }

    #[test]
    fn layout_demand_round_trip() {
        let (mut root, output) = root_with_output();
        let a = map_tile(&mut root, output, 1);
        let b = map_tile(&mut root, output, 1);
        let mut layouts = LayoutManager::default();
        layouts.register(7, "stack", 3).unwrap();
        root.default_layout_namespace = Some("stack".into());
        let mut queue = ShellQueue::new();
        let mut layout_out = Vec::new();
        assert_eq!(
            root.apply(&layouts, &mut queue, &mut layout_out),
            ApplyOutcome::AwaitingLayout
        );
        let serial = match &layout_out[..] {
            [(7, LayoutEvent::LayoutDemand { serial, view_count: 2, .. })] => *serial,
            other => panic!("unexpected layout traffic: {other:?}"),
        };
        root.push_dimensions(output, serial, Rect::new(0, 0, 960, 1080));
        root.push_dimensions(output, serial, Rect::new(960, 0, 960, 1080));
        root.commit_layout(output, serial, "stack").unwrap();
        root.finish_arrangement(&mut queue);
        assert_eq!(root.views[a].inflight.rect, Rect::new(0, 0, 960, 1080));
        assert_eq!(root.views[b].inflight.rect, Rect::new(960, 0, 960, 1080));
    }

    #[test]
    fn short_count_falls_back_to_stacking() {
        let (mut root, output) = root_with_output();
        map_tile(&mut root, output, 1);
        map_tile(&mut root, output, 1);
        let mut layouts = LayoutManager::default();
        layouts.register(7, "stack", 3).unwrap();
        root.default_layout_namespace = Some("stack".into());
        let mut queue = ShellQueue::new();
        let mut layout_out = Vec::new();
        root.apply(&layouts, &mut queue, &mut layout_out);
        let serial = root.outputs[output].layout_demand.as_ref().unwrap().serial;
        root.push_dimensions(output, serial, Rect::new(0, 0, 960, 1080));
        assert!(root.commit_layout(output, serial, "stack").is_err());
        for view in root.views.values() {
            assert_eq!(view.pending.rect, Rect::from_size(1920, 1080));
        }
    }
}
