// SPDX-License-Identifier: GPL-3.0-only

//! Tag commands. Tag masks are 32-bit; 0 is never a valid assignment.

use super::{expect_arity, parse_tags, parse_u32, Error};
use crate::server::Server;

pub fn set_focused_tags(server: &mut Server, args: &[String], _out: &mut String) -> Result<(), Error> {
    expect_arity(args, 1, 1)?;
    let tags = parse_tags(&args[0])?;
    let Some(output_id) = server.focused_output() else { return Ok(()) };
    let output = &mut server.root.outputs[output_id];
    if output.pending_tags != tags {
        output.previous_tags = output.pending_tags;
        output.pending_tags = tags;
    }
    Ok(())
}

pub fn set_view_tags(server: &mut Server, args: &[String], _out: &mut String) -> Result<(), Error> {
    expect_arity(args, 1, 1)?;
    let tags = parse_tags(&args[0])?;
    let Some(view_id) = server.seat.focused_view() else { return Ok(()) };
    if let Some(view) = server.root.views.get_mut(view_id) {
        view.pending.tags = tags;
    }
    Ok(())
}

pub fn toggle_focused_tags(server: &mut Server, args: &[String], _out: &mut String) -> Result<(), Error> {
    expect_arity(args, 1, 1)?;
    let tags = parse_u32(&args[0])?;
    let Some(output_id) = server.focused_output() else { return Ok(()) };
    let output = &mut server.root.outputs[output_id];
    let toggled = output.pending_tags ^ tags;
    // A toggle that would clear every tag is silently dropped.
    if toggled != 0 {
        output.previous_tags = output.pending_tags;
        output.pending_tags = toggled;
    }
    Ok(())
}

pub fn toggle_view_tags(server: &mut Server, args: &[String], _out: &mut String) -> Result<(), Error> {
    expect_arity(args, 1, 1)?;
    let tags = parse_u32(&args[0])?;
    let Some(view_id) = server.seat.focused_view() else { return Ok(()) };
    if let Some(view) = server.root.views.get_mut(view_id) {
        let toggled = view.pending.tags ^ tags;
        if toggled != 0 {
            view.pending.tags = toggled;
        }
    }
    Ok(())
}

pub fn focus_previous_tags(server: &mut Server, args: &[String], _out: &mut String) -> Result<(), Error> {
    expect_arity(args, 0, 0)?;
    let Some(output_id) = server.focused_output() else { return Ok(()) };
    let output = &mut server.root.outputs[output_id];
    std::mem::swap(&mut output.pending_tags, &mut output.previous_tags);
    Ok(())
}

pub fn send_to_previous_tags(server: &mut Server, args: &[String], _out: &mut String) -> Result<(), Error> {
    expect_arity(args, 0, 0)?;
    let Some(output_id) = server.focused_output() else { return Ok(()) };
    let previous = server.root.outputs[output_id].previous_tags;
    let Some(view_id) = server.seat.focused_view() else { return Ok(()) };
    if let Some(view) = server.root.views.get_mut(view_id) {
        view.pending.tags = previous;
    }
    Ok(())
}

pub fn spawn_tagmask(server: &mut Server, args: &[String], _out: &mut String) -> Result<(), Error> {
    expect_arity(args, 1, 1)?;
    let mask = parse_u32(&args[0])?;
    let Some(output_id) = server.focused_output() else { return Ok(()) };
    server.root.outputs[output_id].spawn_tagmask = mask;
    Ok(())
}
