// SPDX-License-Identifier: GPL-3.0-only

//! Focus traversal, stack swapping and zoom.

use super::{expect_arity, Error};
use crate::geo::SpatialDirection;
use crate::server::Server;
use crate::shell::{parse_view_id, ViewId};

/// Pick the wrapped neighbour of `from` in `stack`.
fn neighbour(stack: &[ViewId], from: Option<ViewId>, forward: bool) -> Option<ViewId> {
    if stack.is_empty() {
        return None;
    }
    let Some(idx) = from.and_then(|f| stack.iter().position(|&v| v == f)) else {
        return stack.first().copied();
    };
    let len = stack.len();
    let next = if forward { (idx + 1) % len } else { (idx + len - 1) % len };
    Some(stack[next])
}

/// Closest view by center distance whose center lies in `direction`.
fn spatial(server: &Server, stack: &[ViewId], from: ViewId, direction: SpatialDirection) -> Option<ViewId> {
    let views = &server.root.views;
    let from_rect = views.get(from)?.current.rect;
    stack
        .iter()
        .copied()
        .filter(|&v| v != from)
        .filter(|&v| from_rect.is_toward(&views[v].current.rect, direction))
        .min_by_key(|&v| from_rect.center_distance_sq(&views[v].current.rect))
}

pub fn focus_view(server: &mut Server, args: &[String], _out: &mut String) -> Result<(), Error> {
    expect_arity(args, 1, 1)?;
    let Some(output_id) = server.focused_output() else { return Ok(()) };
    let stack = server.root.visible_views(output_id);
    let focused = server.seat.focused_view();
    let target = match args[0].as_str() {
        "next" => neighbour(&stack, focused, true),
        "previous" => neighbour(&stack, focused, false),
        arg => match SpatialDirection::parse(arg) {
            Some(direction) => focused.and_then(|f| spatial(server, &stack, f, direction)),
            None => match parse_view_id(arg).filter(|id| server.root.views.contains_key(*id)) {
                Some(id) => Some(id),
                None => return Err(Error::InvalidDirection(arg.to_owned())),
            },
        },
    };
    if let Some(id) = target {
        server.set_focus(Some(id));
    }
    Ok(())
}

pub fn swap(server: &mut Server, args: &[String], _out: &mut String) -> Result<(), Error> {
    expect_arity(args, 1, 1)?;
    let Some(output_id) = server.focused_output() else { return Ok(()) };
    let Some(focused) = server.seat.focused_view() else { return Ok(()) };
    // Floating and fullscreen views have no tile to trade.
    if !server.root.views.get(focused).map(|v| v.tiled()).unwrap_or(false) {
        return Ok(());
    }
    let tiled: Vec<ViewId> = server
        .root
        .visible_views(output_id)
        .into_iter()
        .filter(|&v| server.root.views[v].tiled())
        .collect();
    let target = match args[0].as_str() {
        "next" => neighbour(&tiled, Some(focused), true),
        "previous" => neighbour(&tiled, Some(focused), false),
        arg => match SpatialDirection::parse(arg) {
            Some(direction) => spatial(server, &tiled, focused, direction),
            None => return Err(Error::InvalidDirection(arg.to_owned())),
        },
    };
    let Some(target) = target.filter(|&t| t != focused) else { return Ok(()) };
    let stack = &mut server.root.outputs[output_id].wm_stack;
    if let (Some(a), Some(b)) = (
        stack.iter().position(|&v| v == focused),
        stack.iter().position(|&v| v == target),
    ) {
        stack.swap(a, b);
    }
    Ok(())
}

pub fn zoom(server: &mut Server, args: &[String], _out: &mut String) -> Result<(), Error> {
    expect_arity(args, 0, 0)?;
    let Some(output_id) = server.focused_output() else { return Ok(()) };
    let Some(focused) = server.seat.focused_view() else { return Ok(()) };
    if !server.root.views.get(focused).map(|v| v.tiled()).unwrap_or(false) {
        return Ok(());
    }
    let tiled: Vec<ViewId> = server
        .root
        .visible_views(output_id)
        .into_iter()
        .filter(|&v| server.root.views[v].tiled())
        .collect();
    // Zooming the top of the stack promotes the second view instead.
    let target = if tiled.first() == Some(&focused) {
        match tiled.get(1) {
            Some(&second) => second,
            None => return Ok(()),
        }
    } else {
        focused
    };
    let stack = &mut server.root.outputs[output_id].wm_stack;
    stack.retain(|&v| v != target);
    stack.insert(0, target);
    server.set_focus(Some(target));
    Ok(())
}
