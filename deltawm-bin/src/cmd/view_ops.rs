// SPDX-License-Identifier: GPL-3.0-only

use super::{expect_arity, Error};
use crate::server::Server;

pub fn close(server: &mut Server, args: &[String], _out: &mut String) -> Result<(), Error> {
    expect_arity(args, 0, 0)?;
    let Some(view_id) = server.seat.focused_view() else { return Ok(()) };
    if let Some(view) = server.root.views.get(view_id) {
        view.close(&mut server.shell_queue);
    }
    Ok(())
}

pub fn toggle_float(server: &mut Server, args: &[String], _out: &mut String) -> Result<(), Error> {
    expect_arity(args, 0, 0)?;
    let Some(view_id) = server.seat.focused_view() else { return Ok(()) };
    let Some(view) = server.root.views.get_mut(view_id) else { return Ok(()) };
    view.pending.float = !view.pending.float;
    if view.pending.float {
        view.pending.rect = view.float_box;
    }
    Ok(())
}

pub fn toggle_fullscreen(server: &mut Server, args: &[String], _out: &mut String) -> Result<(), Error> {
    expect_arity(args, 0, 0)?;
    let Some(view_id) = server.seat.focused_view() else { return Ok(()) };
    if let Some(view) = server.root.views.get_mut(view_id) {
        view.pending.fullscreen = !view.pending.fullscreen;
    }
    Ok(())
}
