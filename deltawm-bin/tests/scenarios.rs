// SPDX-License-Identifier: GPL-3.0-only

//! End-to-end scenarios driven through the same entry points the socket
//! glue uses: commands in, shell and layout traffic out.

use deltawm::geo::Rect;
use deltawm::input::keyboard::{KeyEvent, KeyOutcome};
use deltawm::input::keysym::Keysym;
use deltawm::input::Modifiers;
use deltawm::server::Server;
use deltawm::shell::view::ShellSurface;
use deltawm::shell::xdg::XdgToplevel;
use deltawm::shell::{ShellEvent, ViewId};
use deltawm_protocol::{LayoutEvent, LayoutRequest};

fn server_with_output() -> Server {
    let mut server = Server::new();
    server.output_added("OUT-1", 1920, 1080);
    server
}

fn cmd(server: &mut Server, line: &str) -> Result<String, deltawm::cmd::Error> {
    let tokens: Vec<String> = line.split_whitespace().map(str::to_owned).collect();
    server.run_command(&tokens)
}

fn map_xdg(server: &mut Server, app_id: &str, title: &str) -> ViewId {
    server.view_mapped(
        ShellSurface::Xdg(XdgToplevel::default()),
        app_id,
        title,
        (640, 480),
    )
}

/// Ack every outstanding configure until the transaction commits.
fn settle(server: &mut Server) {
    for _ in 0..8 {
        let acks: Vec<(ViewId, u32)> = server
            .shell_queue
            .iter()
            .filter_map(|ev| match ev {
                ShellEvent::Configure { view, serial: Some(serial), .. } => Some((*view, *serial)),
                _ => None,
            })
            .collect();
        server.shell_queue.clear();
        for (view, serial) in acks {
            server.ack_configure(view, serial);
        }
        if !server.root.transaction_active() && !server.root.awaiting_layouts() {
            return;
        }
    }
    panic!("state machine did not settle");
}

/// Answer the most recent layout demand with the given dimensions.
fn answer_demand(server: &mut Server, conn: u64, dims: &[Rect]) {
    let demand = server
        .layout_outbox
        .iter()
        .rev()
        .find_map(|(to, ev)| match ev {
            LayoutEvent::LayoutDemand { serial, view_count, .. } if *to == conn => {
                Some((*serial, *view_count))
            }
            _ => None,
        })
        .expect("no layout demand was issued");
    assert_eq!(demand.1 as usize, dims.len(), "demand asked for a different count");
    server.layout_outbox.clear();
    for rect in dims {
        server.layout_request(
            conn,
            LayoutRequest::PushViewDimensions {
                x: rect.x,
                y: rect.y,
                width: rect.width as u32,
                height: rect.height as u32,
                serial: demand.0,
            },
        );
    }
    server.layout_request(
        conn,
        LayoutRequest::Commit { layout_name: "tile".into(), serial: demand.0 },
    );
}

#[test]
fn focused_tags_gate_new_views_through_the_spawn_tagmask() {
    let mut server = server_with_output();
    cmd(&mut server, "set-focused-tags 1").unwrap();
    let output = server.root.output_order[0];
    assert_eq!(server.root.outputs[output].pending_tags, 0b1);

    let view = map_xdg(&mut server, "foot", "fish");
    assert_eq!(server.root.views[view].pending.tags, 0b1);
    assert_eq!(server.seat.focused_view(), Some(view));
}

#[test]
fn spawn_tagmask_masks_rule_less_views() {
    let mut server = server_with_output();
    cmd(&mut server, "set-focused-tags 0b11").unwrap();
    cmd(&mut server, "spawn-tagmask 0b10").unwrap();
    settle(&mut server);
    let view = map_xdg(&mut server, "foot", "fish");
    assert_eq!(server.root.views[view].pending.tags, 0b10);
}

#[test]
fn swap_reorders_the_stack_and_issues_one_demand() {
    let mut server = server_with_output();
    cmd(&mut server, "default-layout tile").unwrap();
    server.layout_hello(1, "tile", 3);

    let a = map_xdg(&mut server, "foot", "a");
    answer_demand(&mut server, 1, &[Rect::new(0, 0, 1920, 1080)]);
    settle(&mut server);

    let b = map_xdg(&mut server, "foot", "b");
    answer_demand(
        &mut server,
        1,
        &[Rect::new(0, 0, 960, 1080), Rect::new(960, 0, 960, 1080)],
    );
    settle(&mut server);

    let output = server.root.output_order[0];
    assert_eq!(server.root.outputs[output].wm_stack, vec![b, a]);
    assert_eq!(server.seat.focused_view(), Some(b));

    cmd(&mut server, "swap next").unwrap();
    assert_eq!(server.root.outputs[output].wm_stack, vec![a, b]);
    answer_demand(
        &mut server,
        1,
        &[Rect::new(0, 0, 960, 1080), Rect::new(960, 0, 960, 1080)],
    );
    // Exactly one demand per arrangement cycle.
    assert!(server.layout_outbox.is_empty());
    settle(&mut server);
    assert_eq!(server.root.views[a].current.rect, Rect::new(0, 0, 960, 1080));
    assert_eq!(server.root.views[b].current.rect, Rect::new(960, 0, 960, 1080));
}

#[test]
fn float_rule_centers_the_view_at_its_natural_size() {
    let mut server = server_with_output();
    cmd(&mut server, "rule-add -app-id foot float").unwrap();
    let view = map_xdg(&mut server, "foot", "fish");
    settle(&mut server);
    let v = &server.root.views[view];
    assert!(v.pending.float);
    // 640x480 centered in 1920x1080.
    assert_eq!(v.current.rect, Rect::new(640, 300, 640, 480));
}

#[test]
fn toggling_to_an_empty_tag_mask_is_dropped() {
    let mut server = server_with_output();
    cmd(&mut server, "set-focused-tags 0b101").unwrap();
    cmd(&mut server, "toggle-focused-tags 5").unwrap();
    let output = server.root.output_order[0];
    assert_eq!(server.root.outputs[output].pending_tags, 0b101);

    let err = cmd(&mut server, "set-focused-tags 0").unwrap_err();
    assert_eq!(err.to_string(), "tags may not be 0");
    assert_eq!(server.root.outputs[output].pending_tags, 0b101);
}

#[test]
fn press_mapping_fires_exactly_once_per_press() {
    let mut server = server_with_output();
    cmd(&mut server, "map normal Mod4 Return set-focused-tags 2").unwrap();
    let output = server.root.output_order[0];

    let down = KeyEvent {
        keycode: 36,
        pressed: true,
        modifiers: Modifiers::SUPER,
        consumed_modifiers: Modifiers::empty(),
        syms: vec![Keysym::from_name("Return").unwrap()],
        raw_syms: vec![Keysym::from_name("Return").unwrap()],
    };
    let mut up = down.clone();
    up.pressed = false;

    assert!(matches!(server.handle_key(down.clone()), KeyOutcome::Run(_)));
    assert_eq!(server.root.outputs[output].pending_tags, 2);

    cmd(&mut server, "set-focused-tags 1").unwrap();
    assert_eq!(server.handle_key(up.clone()), KeyOutcome::Swallow);
    assert_eq!(server.root.outputs[output].pending_tags, 1);

    // The -release variant fires on release instead.
    cmd(&mut server, "unmap normal Mod4 Return").unwrap();
    cmd(&mut server, "map -release normal Mod4 Return set-focused-tags 2").unwrap();
    assert_eq!(server.handle_key(down), KeyOutcome::Swallow);
    assert_eq!(server.root.outputs[output].pending_tags, 1);
    assert!(matches!(server.handle_key(up), KeyOutcome::Run(_)));
    assert_eq!(server.root.outputs[output].pending_tags, 2);
}

#[test]
fn short_dimension_count_drops_the_layout_client() {
    let mut server = server_with_output();
    let views: Vec<ViewId> = (0..4).map(|n| map_xdg(&mut server, "foot", &n.to_string())).collect();
    settle(&mut server);

    server.layout_hello(1, "tile", 3);
    cmd(&mut server, "default-layout tile").unwrap();
    let demand = server
        .layout_outbox
        .iter()
        .find_map(|(_, ev)| match ev {
            LayoutEvent::LayoutDemand { serial, view_count: 4, .. } => Some(*serial),
            _ => None,
        })
        .expect("expected a demand for four views");
    server.layout_outbox.clear();
    for n in 0..3 {
        server.layout_request(
            1,
            LayoutRequest::PushViewDimensions {
                x: 0,
                y: n * 100,
                width: 1920,
                height: 100,
                serial: demand,
            },
        );
    }
    server.layout_request(1, LayoutRequest::Commit { layout_name: "tile".into(), serial: demand });

    // Protocol violation: the connection is marked dead and the output
    // falls back to stacking.
    assert_eq!(server.dead_layout_conns, vec![1]);
    assert!(server.layouts.binding_for("tile").is_none());
    settle(&mut server);
    for view in views {
        assert_eq!(server.root.views[view].current.rect, Rect::new(0, 0, 1920, 1080));
    }
}

#[test]
fn locked_mode_rejects_every_escape_but_unlock() {
    let mut server = server_with_output();
    cmd(&mut server, "declare-mode passthrough").unwrap();
    server.session_locked();
    assert_eq!(server.seat.mode_id, 1);

    assert!(cmd(&mut server, "enter-mode normal").is_err());
    assert!(cmd(&mut server, "enter-mode passthrough").is_err());
    assert!(cmd(&mut server, "enter-mode locked").is_err());
    assert_eq!(server.seat.mode_id, 1);

    server.session_unlocked();
    assert_eq!(server.seat.mode_id, 0);
    cmd(&mut server, "enter-mode passthrough").unwrap();
    assert_eq!(server.seat.mode_id, 2);
}

#[test]
fn spatial_focus_picks_the_nearest_view_in_direction() {
    let mut server = server_with_output();
    cmd(&mut server, "default-layout tile").unwrap();
    server.layout_hello(1, "tile", 3);

    let a = map_xdg(&mut server, "term", "a");
    answer_demand(&mut server, 1, &[Rect::new(0, 0, 960, 1080)]);
    settle(&mut server);
    let b = map_xdg(&mut server, "term", "b");
    answer_demand(
        &mut server,
        1,
        &[Rect::new(960, 0, 960, 700), Rect::new(0, 0, 960, 1080)],
    );
    settle(&mut server);
    let c = map_xdg(&mut server, "term", "c");
    answer_demand(
        &mut server,
        1,
        &[
            Rect::new(960, 700, 960, 380),
            Rect::new(960, 0, 960, 700),
            Rect::new(0, 0, 960, 1080),
        ],
    );
    settle(&mut server);

    // Stack is [c, b, a]: a fills the left half, b most of the right,
    // c the bottom right corner.
    cmd(&mut server, &format!("focus-view {}", deltawm::shell::view_id_string(a))).unwrap();
    assert_eq!(server.seat.focused_view(), Some(a));

    cmd(&mut server, "focus-view right").unwrap();
    assert_eq!(server.seat.focused_view(), Some(b));
    cmd(&mut server, "focus-view down").unwrap();
    assert_eq!(server.seat.focused_view(), Some(c));
    // Nothing lies further down; focus stays put.
    cmd(&mut server, "focus-view down").unwrap();
    assert_eq!(server.seat.focused_view(), Some(c));
}

#[test]
fn send_to_output_moves_the_focused_view() {
    let mut server = server_with_output();
    server.output_added("OUT-2", 1920, 1080);
    let view = map_xdg(&mut server, "foot", "fish");
    settle(&mut server);

    cmd(&mut server, "send-to-output OUT-2").unwrap();
    let second = server.root.output_by_name("OUT-2").unwrap();
    assert_eq!(server.root.views[view].output, second);
    assert_eq!(server.root.outputs[second].wm_stack, vec![view]);
    assert_eq!(server.seat.focused_output, Some(second));

    let first = server.root.output_by_name("OUT-1").unwrap();
    assert!(server.root.outputs[first].wm_stack.is_empty());
}

#[test]
fn zoom_promotes_and_cycles_the_stack_top() {
    let mut server = server_with_output();
    let a = map_xdg(&mut server, "foot", "a");
    settle(&mut server);
    let b = map_xdg(&mut server, "foot", "b");
    settle(&mut server);
    let output = server.root.output_order[0];
    assert_eq!(server.root.outputs[output].wm_stack, vec![b, a]);

    // Focused b is already on top: the second view is promoted instead.
    cmd(&mut server, "zoom").unwrap();
    assert_eq!(server.root.outputs[output].wm_stack, vec![a, b]);
    assert_eq!(server.seat.focused_view(), Some(a));

    // Focus the bottom view and zoom it to the top.
    cmd(&mut server, "focus-view next").unwrap();
    assert_eq!(server.seat.focused_view(), Some(b));
    cmd(&mut server, "zoom").unwrap();
    assert_eq!(server.root.outputs[output].wm_stack, vec![b, a]);
}

#[test]
fn move_and_resize_leave_a_tiled_view_alone_without_a_layout() {
    let mut server = server_with_output();
    let view = map_xdg(&mut server, "foot", "fish");
    settle(&mut server);
    assert!(server.root.views[view].tiled());

    cmd(&mut server, "move right 100").unwrap();
    settle(&mut server);
    cmd(&mut server, "resize horizontal 50").unwrap();
    settle(&mut server);
    cmd(&mut server, "snap left").unwrap();
    settle(&mut server);

    // No generator is bound, so the view stays in the stack and keeps
    // the fallback geometry.
    let v = &server.root.views[view];
    assert!(v.tiled());
    assert_eq!(v.current.rect, Rect::new(0, 0, 1920, 1080));
}

#[test]
fn move_floats_a_tiled_view_when_a_layout_is_bound() {
    let mut server = server_with_output();
    cmd(&mut server, "default-layout tile").unwrap();
    server.layout_hello(1, "tile", 3);

    let view = map_xdg(&mut server, "foot", "fish");
    answer_demand(&mut server, 1, &[Rect::new(100, 100, 640, 480)]);
    settle(&mut server);
    assert!(server.root.views[view].tiled());

    cmd(&mut server, "move right 100").unwrap();
    // The view left the layout, so the arrangement has nothing to
    // demand and the move applies to the float box.
    assert!(server.layout_outbox.is_empty());
    settle(&mut server);
    let v = &server.root.views[view];
    assert!(v.pending.float);
    assert_eq!(v.current.rect, Rect::new(200, 100, 640, 480));
}

#[test]
fn transaction_timeout_commits_best_effort() {
    let mut server = server_with_output();
    let view = map_xdg(&mut server, "foot", "slow");
    assert!(server.root.transaction_active());
    // The client never acks; the timer gives up and commits anyway.
    server.on_transaction_timeout();
    assert!(!server.root.transaction_active());
    assert_ne!(server.root.views[view].current.rect, Rect::default());
}

#[test]
fn get_option_round_trips_through_commands() {
    let mut server = server_with_output();
    cmd(&mut server, "declare-option gaps uint 4").unwrap();
    assert_eq!(cmd(&mut server, "get-option gaps").unwrap(), "4");
    cmd(&mut server, "set-option -output OUT-1 gaps 9").unwrap();
    assert_eq!(cmd(&mut server, "get-option -output OUT-1 gaps").unwrap(), "9");
    assert_eq!(cmd(&mut server, "get-option gaps").unwrap(), "4");
    cmd(&mut server, "mod-option gaps -3").unwrap();
    assert_eq!(cmd(&mut server, "get-option gaps").unwrap(), "1");
    cmd(&mut server, "unset-option -output OUT-1 gaps").unwrap();
    assert_eq!(cmd(&mut server, "get-option -output OUT-1 gaps").unwrap(), "1");
}

#[test]
fn previous_tags_swap_back_and_forth() {
    let mut server = server_with_output();
    let output = server.root.output_order[0];
    cmd(&mut server, "set-focused-tags 1").unwrap();
    cmd(&mut server, "set-focused-tags 4").unwrap();
    assert_eq!(server.root.outputs[output].pending_tags, 4);
    cmd(&mut server, "focus-previous-tags").unwrap();
    assert_eq!(server.root.outputs[output].pending_tags, 1);
    cmd(&mut server, "focus-previous-tags").unwrap();
    assert_eq!(server.root.outputs[output].pending_tags, 4);
}
