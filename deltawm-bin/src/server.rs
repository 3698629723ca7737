// SPDX-License-Identifier: GPL-3.0-only

//! The explicit context threaded through every handler: configuration,
//! options, the root shell state, the seat, devices and layout clients.
//! Seam methods on this type are the entire inbound surface; effects
//! accumulate in the outbox queues until the runtime glue drains them.

use std::time::Duration;

use deltawm_protocol::{LayoutEvent, LayoutRequest};
use tracing::{debug, info, warn};

use crate::cmd;
use crate::config::Config;
use crate::geo::{Point, Rect};
use crate::input::config::{matching_config, InputDevice};
use crate::input::keyboard::{self, KeyEvent, KeyOutcome};
use crate::input::{pointer, Modifiers};
use crate::layout::{ConnId, LayoutError, LayoutManager};
use crate::modes::PointerAction;
use crate::options::{OptionValue, OptionsStore};
use crate::seat::{FocusTarget, Grab, Seat};
use crate::shell::root::{ApplyOutcome, Root};
use crate::shell::view::ShellSurface;
use crate::shell::{OutputId, ShellEvent, ShellQueue, ViewId};

pub const TRANSACTION_TIMEOUT_OPTION: &str = "transaction-timeout-ms";
pub const DEFAULT_TRANSACTION_TIMEOUT_MS: u32 = 200;
pub const LAYOUT_DEMAND_TIMEOUT: Duration = Duration::from_millis(1000);

pub struct Server {
    pub config: Config,
    pub options: OptionsStore,
    pub root: Root,
    pub seat: Seat,
    pub devices: Vec<InputDevice>,
    pub layouts: LayoutManager,

    /// Outbound client-facing effects, drained by the display glue.
    pub shell_queue: ShellQueue,
    /// Outbound layout protocol traffic, drained by the socket glue.
    pub layout_outbox: Vec<(ConnId, LayoutEvent)>,
    /// Layout connections that violated the protocol; the socket glue
    /// closes them.
    pub dead_layout_conns: Vec<ConnId>,

    pub exiting: bool,
    activated: Option<ViewId>,
}

impl Default for Server {
    fn default() -> Self {
        Self::new()
    }
}

impl Server {
    pub fn new() -> Self {
        let mut options = OptionsStore::default();
        // Safe to ignore: the store is empty.
        let _ = options.declare(
            TRANSACTION_TIMEOUT_OPTION,
            OptionValue::Uint(DEFAULT_TRANSACTION_TIMEOUT_MS),
        );
        Server {
            config: Config::default(),
            options,
            root: Root::default(),
            seat: Seat::new("seat0"),
            devices: Vec::new(),
            layouts: LayoutManager::default(),
            shell_queue: ShellQueue::new(),
            layout_outbox: Vec::new(),
            dead_layout_conns: Vec::new(),
            exiting: false,
            activated: None,
        }
    }

    pub fn transaction_timeout(&self) -> Duration {
        Duration::from_millis(
            self.options
                .uint(TRANSACTION_TIMEOUT_OPTION)
                .unwrap_or(DEFAULT_TRANSACTION_TIMEOUT_MS) as u64,
        )
    }

    /// Run one control command and the apply cycle behind it.
    pub fn run_command(&mut self, tokens: &[String]) -> Result<String, cmd::Error> {
        let mut out = String::new();
        cmd::dispatch(self, tokens, &mut out)?;
        self.apply();
        Ok(out)
    }

    fn run_mapped_command(&mut self, tokens: Vec<String>) {
        match self.run_command(&tokens) {
            Ok(_) => {}
            Err(err) => warn!(command = ?tokens, %err, "mapped command failed"),
        }
    }

    /// Stage pending state into the next frame. Coalesces while a cycle
    /// is in flight.
    pub fn apply(&mut self) {
        let outcome = self
            .root
            .apply(&self.layouts, &mut self.shell_queue, &mut self.layout_outbox);
        self.after_apply(outcome);
    }

    fn after_apply(&mut self, outcome: ApplyOutcome) {
        if outcome == ApplyOutcome::Committed && self.root.take_pending_apply() {
            self.apply();
            return;
        }
        self.update_focus();
    }

    // ---- focus ----------------------------------------------------------

    pub fn focused_output(&self) -> Option<OutputId> {
        self.seat
            .focused_output
            .filter(|id| self.root.outputs.contains_key(*id))
            .or_else(|| self.root.output_order.first().copied())
    }

    /// Point the seat at a view (or nothing) and tell the clients.
    pub fn set_focus(&mut self, view: Option<ViewId>) {
        match view {
            Some(id) => {
                if let Some(view) = self.root.views.get(id) {
                    self.seat.focused_output = Some(view.output);
                }
                self.seat.focus_view(id);
            }
            None => self.seat.clear_focus(),
        }
        self.sync_activated();
    }

    /// Keep the focus valid: a hidden or dead focused view falls back to
    /// the most recently focused visible view, then the top of the stack.
    pub fn update_focus(&mut self) {
        if self.seat.locked {
            return;
        }
        let Some(output_id) = self.focused_output() else {
            self.seat.clear_focus();
            self.sync_activated();
            return;
        };
        self.seat.focused_output = Some(output_id);
        let visible = self.root.visible_views(output_id);
        if let Some(current) = self.seat.focused_view() {
            if visible.contains(&current) {
                self.sync_activated();
                return;
            }
        }
        if let FocusTarget::Layer(_) | FocusTarget::LockSurface = self.seat.focused {
            return;
        }
        let next = self
            .seat
            .focus_history
            .iter()
            .copied()
            .find(|v| visible.contains(v))
            .or_else(|| visible.first().copied());
        match next {
            Some(id) => self.seat.focus_view(id),
            None => self.seat.clear_focus(),
        }
        self.sync_activated();
    }

    fn sync_activated(&mut self) {
        let focused = self.seat.focused_view();
        if focused == self.activated {
            return;
        }
        if let Some(old) = self.activated {
            if self.root.views.contains_key(old) {
                self.shell_queue
                    .push_back(ShellEvent::Activated { view: old, activated: false });
            }
        }
        if let Some(new) = focused {
            self.shell_queue
                .push_back(ShellEvent::Activated { view: new, activated: true });
        }
        self.activated = focused;
    }

    // ---- outputs ---------------------------------------------------------

    pub fn output_added(&mut self, name: &str, width: i32, height: i32) -> OutputId {
        info!(name, width, height, "output added");
        let id = self.root.add_output(name.to_owned(), Rect::from_size(width, height));
        if self.seat.focused_output.is_none()
            || self.seat.focused_output == Some(self.root.noop_output)
        {
            self.seat.focused_output = Some(id);
        }
        self.apply();
        id
    }

    pub fn output_removed(&mut self, id: OutputId) {
        info!("output removed");
        self.options.forget_output(id);
        self.seat.forget_output(id);
        self.root.remove_output(id);
        self.apply();
    }

    /// Layer-shell exclusion zones changed the usable area.
    pub fn output_usable_box_changed(&mut self, id: OutputId, usable: Rect) {
        if let Some(output) = self.root.outputs.get_mut(id) {
            output.usable_box = usable;
        }
        self.apply();
    }

    // ---- views -----------------------------------------------------------

    /// A toplevel finished its initial commit and is ready to be placed.
    pub fn view_mapped(
        &mut self,
        shell: ShellSurface,
        app_id: &str,
        title: &str,
        natural_size: (i32, i32),
    ) -> ViewId {
        let rules = &self.config.rules;
        let rule_output = rules
            .output
            .matching(app_id, title)
            .and_then(|name| self.root.output_by_name(name));
        let output_id = rule_output
            .or_else(|| self.focused_output())
            .unwrap_or(self.root.noop_output);

        // Override-redirect X11 windows (menus, tooltips) place
        // themselves and never tile.
        let override_redirect = matches!(&shell, ShellSurface::Xwayland(xw) if xw.override_redirect);
        let float =
            override_redirect || rules.float.matching(app_id, title).copied().unwrap_or(false);
        let ssd = rules.ssd.matching(app_id, title).copied().unwrap_or(false);
        let fullscreen = rules.fullscreen.matching(app_id, title).copied().unwrap_or(false);
        let rule_tags = rules.tags.matching(app_id, title).copied();
        let rule_position = rules.position.matching(app_id, title).copied();
        let rule_dimensions = rules.dimensions.matching(app_id, title).copied();

        let output = &self.root.outputs[output_id];
        let tags = rule_tags.unwrap_or_else(|| {
            let masked = output.pending_tags & output.spawn_tagmask;
            if masked == 0 {
                output.pending_tags
            } else {
                masked
            }
        });
        let usable = output.usable_box;
        let attach = output.attach_mode.unwrap_or(self.config.attach_mode);

        let id = self.root.insert_view(shell, output_id);
        let view = &mut self.root.views[id];
        view.app_id = app_id.to_owned();
        view.title = title.to_owned();
        view.natural_size = natural_size;

        let (w, h) = rule_dimensions.unwrap_or_else(|| {
            if natural_size.0 > 0 && natural_size.1 > 0 {
                natural_size
            } else {
                (usable.width / 2, usable.height / 2)
            }
        });
        let (w, h) = view.shell.clamp_size(w, h);
        view.float_box = match rule_position {
            Some(pos) => Rect::new(usable.x + pos.x, usable.y + pos.y, w, h),
            None => usable.center_sized(w, h),
        };

        view.pending.tags = tags;
        view.pending.float = float;
        view.pending.fullscreen = fullscreen;
        view.pending.ssd = ssd;
        if float {
            view.pending.rect = view.float_box;
        }

        self.root.outputs[output_id].attach(id, attach);
        debug!(
            view = %crate::shell::view_id_string(id),
            kind = self.root.views[id].shell.kind_name(),
            app_id,
            title,
            "view mapped"
        );
        self.set_focus(Some(id));
        self.apply();
        id
    }

    pub fn view_unmapped(&mut self, id: ViewId) {
        debug!(view = %crate::shell::view_id_string(id), "view unmapped");
        self.seat.forget_view(id);
        if self.root.transaction_active() {
            // Keep the tombstone until the in-flight transaction drops
            // its reference at commit.
            self.root.mark_destroying(id);
            if let Some(outcome) = self.root.maybe_finish_transaction(&mut self.shell_queue) {
                self.after_apply(outcome);
            }
        } else {
            self.root.remove_view(id);
        }
        self.apply();
    }

    pub fn view_title_changed(&mut self, id: ViewId, title: &str) {
        if let Some(view) = self.root.views.get_mut(id) {
            view.title = title.to_owned();
        }
    }

    pub fn view_app_id_changed(&mut self, id: ViewId, app_id: &str) {
        if let Some(view) = self.root.views.get_mut(id) {
            view.app_id = app_id.to_owned();
        }
    }

    pub fn ack_configure(&mut self, id: ViewId, serial: u32) {
        if let Some(outcome) = self.root.ack_configure(id, serial, &mut self.shell_queue) {
            self.after_apply(outcome);
        }
    }

    /// The client asked for fullscreen itself (xdg request).
    pub fn view_requested_fullscreen(&mut self, id: ViewId, fullscreen: bool) {
        if let Some(view) = self.root.views.get_mut(id) {
            view.pending.fullscreen = fullscreen;
        }
        self.apply();
    }

    // ---- timers ----------------------------------------------------------

    pub fn on_transaction_timeout(&mut self) {
        if self.root.timeout_transaction(&mut self.shell_queue) {
            self.after_apply(ApplyOutcome::Committed);
        }
    }

    pub fn on_layout_demand_timeout(&mut self) {
        for output in self.root.outputs_with_open_demands() {
            warn!(output = %self.root.outputs[output].name, "layout demand timed out");
            self.root.abandon_demand(output);
        }
        if !self.root.awaiting_layouts() {
            let outcome = self.root.finish_arrangement(&mut self.shell_queue);
            self.after_apply(outcome);
        }
    }

    pub fn on_cursor_hide_timeout(&mut self) {
        if self.seat.hide_cursor_timeout_ms > 0 {
            self.seat.cursor_hidden = true;
        }
    }

    // ---- input -----------------------------------------------------------

    pub fn handle_key(&mut self, ev: KeyEvent) -> KeyOutcome {
        if ev.pressed && self.seat.hide_cursor_when_typing {
            self.seat.cursor_hidden = true;
        }
        let outcome = keyboard::handle_key(&mut self.seat, &self.config.modes, &ev);
        if let KeyOutcome::Run(tokens) = &outcome {
            self.run_mapped_command(tokens.clone());
        }
        outcome
    }

    /// Returns true when the button was consumed by a binding or grab.
    pub fn handle_pointer_button(&mut self, button: u32, pressed: bool, mods: Modifiers) -> bool {
        if !pressed {
            match self.seat.grab.take() {
                Some(Grab::Resize { view }) => {
                    if let Some(v) = self.root.views.get_mut(view) {
                        v.resizing = false;
                    }
                    self.apply();
                    return true;
                }
                Some(Grab::Move { .. }) => {
                    self.apply();
                    return true;
                }
                None => return false,
            }
        }
        let Some(action) = pointer::find_action(&self.config.modes, self.seat.mode_id, mods, button)
        else {
            return false;
        };
        match action {
            PointerAction::Command(tokens) => self.run_mapped_command(tokens),
            PointerAction::MoveView => {
                if let Some(view) = self.view_at(self.seat.pointer_pos) {
                    self.force_float(view);
                    self.set_focus(Some(view));
                    self.seat.grab = Some(Grab::Move { view });
                }
            }
            PointerAction::ResizeView => {
                if let Some(view) = self.view_at(self.seat.pointer_pos) {
                    self.force_float(view);
                    self.set_focus(Some(view));
                    if let Some(v) = self.root.views.get_mut(view) {
                        v.resizing = true;
                    }
                    self.seat.grab = Some(Grab::Resize { view });
                }
            }
        }
        true
    }

    pub fn handle_pointer_motion(&mut self, dx: i32, dy: i32) {
        self.seat.pointer_pos.x += dx;
        self.seat.pointer_pos.y += dy;
        self.seat.cursor_hidden = false;
        match self.seat.grab {
            Some(Grab::Move { view }) => {
                if let Some(v) = self.root.views.get_mut(view) {
                    v.pending_move.x = v.pending_move.x.saturating_add(dx);
                    v.pending_move.y = v.pending_move.y.saturating_add(dy);
                }
                self.apply();
            }
            Some(Grab::Resize { view }) => {
                if let Some(v) = self.root.views.get_mut(view) {
                    let (w, h) = v
                        .shell
                        .clamp_size(v.pending.rect.width + dx, v.pending.rect.height + dy);
                    v.pending.rect.width = w;
                    v.pending.rect.height = h;
                    v.float_box.width = w;
                    v.float_box.height = h;
                }
                self.apply();
            }
            None => {
                use crate::config::FocusFollowsCursor;
                if self.config.focus_follows_cursor != FocusFollowsCursor::Disabled {
                    if let Some(view) = self.view_at(self.seat.pointer_pos) {
                        if self.seat.focused_view() != Some(view) {
                            self.set_focus(Some(view));
                        }
                    }
                }
            }
        }
    }

    /// Topmost view under an output-local point on the focused output.
    pub fn view_at(&self, point: Point) -> Option<ViewId> {
        let output = self.focused_output()?;
        self.root
            .render_stack(output)
            .into_iter()
            .rev()
            .find(|&id| self.root.views[id].current.rect.contains(point))
    }

    /// Whether the output owning `id` has an active layout binding. Move,
    /// snap and resize only float-force a tiled view when a generator
    /// would otherwise re-tile it.
    pub fn output_has_layout(&self, id: ViewId) -> bool {
        let Some(view) = self.root.views.get(id) else { return false };
        let Some(output) = self.root.outputs.get(view.output) else { return false };
        let default = self.root.default_layout_namespace.as_deref().unwrap_or("");
        let namespace = output.effective_namespace(default);
        !namespace.is_empty() && self.layouts.binding_for(namespace).is_some()
    }

    /// Pull a view out of the layout, keeping its current geometry as the
    /// float box.
    pub fn force_float(&mut self, id: ViewId) {
        let Some(view) = self.root.views.get_mut(id) else { return };
        if view.floating() {
            return;
        }
        if view.current.rect.width > 0 {
            view.float_box = view.current.rect;
        }
        view.pending.float = true;
        view.pending.rect = view.float_box;
    }

    // ---- session lock ----------------------------------------------------

    pub fn session_locked(&mut self) {
        info!("session locked");
        self.seat.session_locked();
        self.seat.focused = FocusTarget::LockSurface;
        self.sync_activated();
    }

    pub fn session_unlocked(&mut self) {
        info!("session unlocked");
        self.seat.session_unlocked();
        self.update_focus();
    }

    // ---- devices ---------------------------------------------------------

    pub fn device_added(&mut self, identifier: &str) {
        let mut settings = Default::default();
        if let Some(row) = matching_config(&self.config.input_configs, identifier) {
            settings = row.settings.clone();
        }
        info!(identifier, "input device added");
        self.devices.push(InputDevice { identifier: identifier.to_owned(), settings });
    }

    pub fn device_removed(&mut self, identifier: &str) {
        self.devices.retain(|d| d.identifier != identifier);
    }

    /// Re-apply configuration rows to every open device.
    pub fn refresh_devices(&mut self) {
        for device in &mut self.devices {
            device.settings = matching_config(&self.config.input_configs, &device.identifier)
                .map(|row| row.settings.clone())
                .unwrap_or_default();
        }
    }

    // ---- layout clients --------------------------------------------------

    pub fn layout_hello(&mut self, conn: ConnId, namespace: &str, version: u32) {
        match self.layouts.register(conn, namespace, version) {
            Ok(()) => {
                info!(namespace, version, "layout client registered");
                self.apply();
            }
            Err(LayoutError::NamespaceInUse(_)) => {
                warn!(namespace, "layout namespace already in use");
                self.layout_outbox.push((conn, LayoutEvent::NamespaceInUse));
            }
            Err(err) => {
                warn!(namespace, %err, "rejecting layout client");
                self.dead_layout_conns.push(conn);
            }
        }
    }

    pub fn layout_request(&mut self, conn: ConnId, request: LayoutRequest) {
        let Some(namespace) = self.layouts.by_conn(conn).map(|c| c.namespace.clone()) else {
            debug!(conn, "layout request from unregistered connection");
            return;
        };
        match request {
            LayoutRequest::PushViewDimensions { x, y, width, height, serial } => {
                if let Some(output) = self.demand_output(&namespace, serial) {
                    self.root.push_dimensions(
                        output,
                        serial,
                        Rect::new(x, y, width as i32, height as i32),
                    );
                }
            }
            LayoutRequest::Commit { layout_name, serial } => {
                if let Some(output) = self.demand_output(&namespace, serial) {
                    if self.root.commit_layout(output, serial, &layout_name).is_err() {
                        // Protocol violation: drop the client, stack the
                        // tiles it abandoned.
                        self.layouts.disconnect(conn);
                        self.dead_layout_conns.push(conn);
                    }
                    if !self.root.awaiting_layouts() {
                        let outcome = self.root.finish_arrangement(&mut self.shell_queue);
                        self.after_apply(outcome);
                    }
                }
            }
            LayoutRequest::Destroy => self.layout_disconnected(conn),
        }
    }

    pub fn layout_disconnected(&mut self, conn: ConnId) {
        let Some(namespace) = self.layouts.disconnect(conn) else { return };
        info!(namespace, "layout client disconnected");
        let mut open = Vec::new();
        for &output_id in &self.root.output_order {
            let output = &self.root.outputs[output_id];
            if output.layout_demand.is_some()
                && output.effective_namespace(
                    self.root.default_layout_namespace.as_deref().unwrap_or(""),
                ) == namespace
            {
                open.push(output_id);
            }
        }
        let had_open = !open.is_empty();
        for output in open {
            self.root.abandon_demand(output);
        }
        if had_open && !self.root.awaiting_layouts() {
            let outcome = self.root.finish_arrangement(&mut self.shell_queue);
            self.after_apply(outcome);
        }
    }

    /// The output whose open demand `serial` belongs to, owned by
    /// `namespace`.
    fn demand_output(&self, namespace: &str, serial: u32) -> Option<OutputId> {
        let default = self.root.default_layout_namespace.as_deref().unwrap_or("");
        self.root.output_order.iter().copied().find(|&id| {
            let output = &self.root.outputs[id];
            output.effective_namespace(default) == namespace
                && output
                    .layout_demand
                    .as_ref()
                    .map(|d| d.serial == serial)
                    .unwrap_or(false)
        })
    }
}
