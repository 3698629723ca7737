// SPDX-License-Identifier: GPL-3.0-only

//! Float geometry commands. A tiled view is pulled out of the layout
//! first, but only when the output has an active generator that would
//! re-tile it; the accumulated delta is clamped into the usable box when
//! the arrangement applies.

use super::{expect_arity, parse_i32, Error};
use crate::geo::{Orientation, SpatialDirection};
use crate::server::Server;

pub fn move_view(server: &mut Server, args: &[String], _out: &mut String) -> Result<(), Error> {
    expect_arity(args, 2, 2)?;
    let direction = SpatialDirection::parse(&args[0])
        .ok_or_else(|| Error::InvalidPhysicalDirection(args[0].clone()))?;
    let delta = parse_i32(&args[1])?;
    if delta < 0 {
        return Err(Error::InvalidValue(args[1].clone()));
    }
    let Some(view_id) = server.seat.focused_view() else { return Ok(()) };
    if server.output_has_layout(view_id) {
        server.force_float(view_id);
    }
    let Some(view) = server.root.views.get_mut(view_id) else { return Ok(()) };
    match direction {
        SpatialDirection::Left => view.pending_move.x = view.pending_move.x.saturating_sub(delta),
        SpatialDirection::Right => view.pending_move.x = view.pending_move.x.saturating_add(delta),
        SpatialDirection::Up => view.pending_move.y = view.pending_move.y.saturating_sub(delta),
        SpatialDirection::Down => view.pending_move.y = view.pending_move.y.saturating_add(delta),
    }
    Ok(())
}

pub fn snap(server: &mut Server, args: &[String], _out: &mut String) -> Result<(), Error> {
    expect_arity(args, 1, 1)?;
    let direction = SpatialDirection::parse(&args[0])
        .ok_or_else(|| Error::InvalidPhysicalDirection(args[0].clone()))?;
    let Some(view_id) = server.seat.focused_view() else { return Ok(()) };
    if server.output_has_layout(view_id) {
        server.force_float(view_id);
    }
    let Some(view) = server.root.views.get_mut(view_id) else { return Ok(()) };
    // Sentinel extremes, clamped to the usable box on apply.
    match direction {
        SpatialDirection::Left => view.pending_move.x = i32::MIN,
        SpatialDirection::Right => view.pending_move.x = i32::MAX,
        SpatialDirection::Up => view.pending_move.y = i32::MIN,
        SpatialDirection::Down => view.pending_move.y = i32::MAX,
    }
    Ok(())
}

pub fn resize(server: &mut Server, args: &[String], _out: &mut String) -> Result<(), Error> {
    expect_arity(args, 2, 2)?;
    let orientation =
        Orientation::parse(&args[0]).ok_or_else(|| Error::InvalidOrientation(args[0].clone()))?;
    let delta = parse_i32(&args[1])?;
    let Some(view_id) = server.seat.focused_view() else { return Ok(()) };
    if server.output_has_layout(view_id) {
        server.force_float(view_id);
    }
    let Some(view) = server.root.views.get_mut(view_id) else { return Ok(()) };
    let (w, h) = (view.float_box.width, view.float_box.height);
    match orientation {
        Orientation::Horizontal => {
            let (new_w, _) = view.shell.clamp_size(w.saturating_add(delta), h);
            // Split the change across both edges so the center stays put.
            view.float_box.x -= (new_w - w) / 2;
            view.float_box.width = new_w;
        }
        Orientation::Vertical => {
            let (_, new_h) = view.shell.clamp_size(w, h.saturating_add(delta));
            view.float_box.y -= (new_h - h) / 2;
            view.float_box.height = new_h;
        }
    }
    Ok(())
}
