// SPDX-License-Identifier: GPL-3.0-only

//! Output traversal and view transfer.

use super::{expect_arity, Error};
use crate::geo::SpatialDirection;
use crate::server::Server;
use crate::shell::OutputId;

fn resolve_output(server: &Server, arg: &str) -> Result<Option<OutputId>, Error> {
    let order = &server.root.output_order;
    if order.is_empty() {
        return Ok(None);
    }
    let current = server.focused_output();
    let target = match arg {
        "next" | "previous" => {
            let idx = current.and_then(|c| order.iter().position(|&o| o == c));
            let len = order.len();
            match idx {
                Some(i) if arg == "next" => Some(order[(i + 1) % len]),
                Some(i) => Some(order[(i + len - 1) % len]),
                None => order.first().copied(),
            }
        }
        arg => match SpatialDirection::parse(arg) {
            Some(direction) => {
                let Some(from_id) = current else { return Ok(None) };
                let from = server.root.outputs[from_id].global_box;
                order
                    .iter()
                    .copied()
                    .filter(|&o| o != from_id)
                    .filter(|&o| from.is_toward(&server.root.outputs[o].global_box, direction))
                    .min_by_key(|&o| from.center_distance_sq(&server.root.outputs[o].global_box))
            }
            None => Some(
                server
                    .root
                    .output_by_name(arg)
                    .ok_or_else(|| Error::Other(format!("unknown output: {arg}")))?,
            ),
        },
    };
    Ok(target)
}

pub fn focus_output(server: &mut Server, args: &[String], _out: &mut String) -> Result<(), Error> {
    expect_arity(args, 1, 1)?;
    let Some(target) = resolve_output(server, &args[0])? else { return Ok(()) };
    server.seat.focused_output = Some(target);
    server.update_focus();
    Ok(())
}

pub fn send_to_output(server: &mut Server, args: &[String], _out: &mut String) -> Result<(), Error> {
    expect_arity(args, 1, 1)?;
    // With no real outputs the focused view sits on the no-op sentinel;
    // there is nowhere to send it.
    let Some(target) = resolve_output(server, &args[0])? else { return Ok(()) };
    let Some(view_id) = server.seat.focused_view() else { return Ok(()) };
    server.root.transfer_view(view_id, target);
    server.seat.focused_output = Some(target);
    Ok(())
}
