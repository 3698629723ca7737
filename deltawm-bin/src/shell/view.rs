// SPDX-License-Identifier: GPL-3.0-only

//! One mapped toplevel surface and its staged state.

use crate::geo::{Point, Rect};
use crate::shell::xdg::XdgToplevel;
use crate::shell::xwayland::XwaylandSurface;
use crate::shell::{OutputId, ShellEvent, ShellQueue, ViewId};

/// Every attribute that participates in the pending → inflight → current
/// cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewState {
    pub rect: Rect,
    pub tags: u32,
    pub float: bool,
    pub fullscreen: bool,
    pub ssd: bool,
}

#[derive(Debug)]
pub enum ShellSurface {
    Xdg(XdgToplevel),
    Xwayland(XwaylandSurface),
}

impl ShellSurface {
    pub fn kind_name(&self) -> &'static str {
        match self {
            ShellSurface::Xdg(_) => "xdg-toplevel",
            ShellSurface::Xwayland(_) => "xwayland",
        }
    }

    pub fn clamp_size(&self, width: i32, height: i32) -> (i32, i32) {
        match self {
            ShellSurface::Xdg(xdg) => xdg.clamp_size(width, height),
            ShellSurface::Xwayland(_) => (width.max(1), height.max(1)),
        }
    }
}

#[derive(Debug)]
pub struct View {
    pub id: ViewId,
    pub shell: ShellSurface,
    pub output: OutputId,

    pub pending: ViewState,
    pub inflight: ViewState,
    pub current: ViewState,

    /// Geometry remembered across float/tile transitions.
    pub float_box: Rect,
    /// Client-supplied natural size, the floating default.
    pub natural_size: (i32, i32),
    /// Move delta accumulated by move/snap commands, consumed on apply.
    /// Snap stores `i32::MIN`/`i32::MAX` components, clamped on apply.
    pub pending_move: Point,

    pub app_id: String,
    pub title: String,
    pub draw_borders: bool,
    /// Set while an interactive resize grab holds this view.
    pub resizing: bool,
    pub destroying: bool,

    inflight_serial: Option<u32>,
    inflight_ready: bool,
}

impl View {
    pub fn new(id: ViewId, shell: ShellSurface, output: OutputId) -> Self {
        View {
            id,
            shell,
            output,
            pending: ViewState::default(),
            inflight: ViewState::default(),
            current: ViewState::default(),
            float_box: Rect::default(),
            natural_size: (0, 0),
            pending_move: Point::ZERO,
            app_id: String::new(),
            title: String::new(),
            draw_borders: true,
            resizing: false,
            destroying: false,
            inflight_serial: None,
            inflight_ready: true,
        }
    }

    /// Fullscreen supersedes float: a fullscreened view never counts as
    /// floating for arrangement or for the layout client.
    pub fn floating(&self) -> bool {
        self.pending.float && !self.pending.fullscreen
    }

    pub fn tiled(&self) -> bool {
        !self.pending.float && !self.pending.fullscreen
    }

    pub fn visible_on(&self, tags: u32) -> bool {
        !self.destroying && self.pending.tags & tags != 0
    }

    fn state_dirty(&self) -> bool {
        self.pending != self.current
    }

    /// Capture inflight state and send a configure if the client needs
    /// one. Returns true when the view must ack before commit.
    pub fn begin_transaction(&mut self, queue: &mut ShellQueue) -> bool {
        self.inflight = self.pending;
        self.inflight_serial = None;
        self.inflight_ready = true;
        if self.destroying || !self.state_dirty() {
            return false;
        }
        let size_changed = (self.inflight.rect.width, self.inflight.rect.height)
            != (self.current.rect.width, self.current.rect.height);
        match &mut self.shell {
            ShellSurface::Xdg(xdg) => {
                let serial = xdg.configure(
                    self.id,
                    self.inflight.rect,
                    self.inflight.fullscreen,
                    self.resizing,
                    self.inflight.ssd,
                    queue,
                );
                // A configure that does not change the size needs no ack.
                if size_changed {
                    self.inflight_serial = Some(serial);
                    self.inflight_ready = false;
                }
            }
            ShellSurface::Xwayland(xw) => {
                xw.configure(self.id, self.inflight.rect, self.inflight.fullscreen, self.resizing, queue);
            }
        }
        !self.inflight_ready
    }

    /// Record an ack; stale serials are ignored. Returns true if this ack
    /// made the view ready.
    pub fn ack_configure(&mut self, serial: u32) -> bool {
        if self.inflight_serial == Some(serial) {
            self.inflight_serial = None;
            self.inflight_ready = true;
            return true;
        }
        false
    }

    pub fn ready(&self) -> bool {
        self.inflight_ready
    }

    /// Promote inflight to current, all fields together.
    pub fn commit_inflight(&mut self) {
        self.current = self.inflight;
        self.inflight_serial = None;
        self.inflight_ready = true;
    }

    pub fn close(&self, queue: &mut ShellQueue) {
        queue.push_back(ShellEvent::Close { view: self.id });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn test_view() -> View {
        let mut views: SlotMap<ViewId, ()> = SlotMap::with_key();
        let id = views.insert(());
        let mut outputs: SlotMap<OutputId, ()> = SlotMap::with_key();
        let output = outputs.insert(());
        View::new(id, ShellSurface::Xdg(XdgToplevel::default()), output)
    }

    #[test]
    fn resize_waits_for_ack_and_commits_atomically() {
        let mut view = test_view();
        let mut queue = ShellQueue::new();
        view.current.rect = Rect::new(0, 0, 100, 100);
        view.current.tags = 1;
        view.pending = view.current;
        view.pending.rect = Rect::new(10, 10, 200, 150);
        view.pending.tags = 2;

        assert!(view.begin_transaction(&mut queue));
        // Nothing promoted before the ack.
        assert_eq!(view.current.rect, Rect::new(0, 0, 100, 100));
        assert_eq!(view.current.tags, 1);

        let serial = match queue.pop_front() {
            Some(ShellEvent::Configure { serial: Some(s), .. }) => s,
            other => panic!("expected configure, got {other:?}"),
        };
        assert!(!view.ack_configure(serial.wrapping_add(7)));
        assert!(view.ack_configure(serial));
        view.commit_inflight();
        // All fields move together.
        assert_eq!(view.current.rect, Rect::new(10, 10, 200, 150));
        assert_eq!(view.current.tags, 2);
    }

    #[test]
    fn same_size_configure_needs_no_ack() {
        let mut view = test_view();
        let mut queue = ShellQueue::new();
        view.current.rect = Rect::new(0, 0, 100, 100);
        view.pending = view.current;
        view.pending.rect.x = 50;
        assert!(!view.begin_transaction(&mut queue));
        assert!(view.ready());
    }

    #[test]
    fn fullscreen_supersedes_float() {
        let mut view = test_view();
        view.pending.float = true;
        view.pending.fullscreen = true;
        assert!(!view.floating());
        assert!(!view.tiled());
    }
}
