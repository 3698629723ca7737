// SPDX-License-Identifier: GPL-3.0-only

//! Layout generator selection and pass-through commands.

use deltawm_protocol::LayoutEvent;

use super::{expect_arity, Error};
use crate::server::Server;

pub fn default_layout(server: &mut Server, args: &[String], _out: &mut String) -> Result<(), Error> {
    expect_arity(args, 1, 1)?;
    server.root.default_layout_namespace = Some(args[0].clone());
    Ok(())
}

pub fn output_layout(server: &mut Server, args: &[String], _out: &mut String) -> Result<(), Error> {
    expect_arity(args, 1, 1)?;
    let Some(output_id) = server.focused_output() else { return Ok(()) };
    server.root.outputs[output_id].layout_namespace = Some(args[0].clone());
    Ok(())
}

/// Forward an opaque command to the generator owning `namespace`.
/// Version 2+ clients get the focused output's tags first, so stateful
/// layouts can keep per-tag parameters.
pub fn send_layout_cmd(server: &mut Server, args: &[String], _out: &mut String) -> Result<(), Error> {
    expect_arity(args, 2, 2)?;
    let namespace = &args[0];
    let client = server
        .layouts
        .binding_for(namespace)
        .ok_or_else(|| Error::Other(format!("no layout client with namespace: {namespace}")))?;
    let (conn, version) = (client.conn, client.version);
    if version >= 2 {
        if let Some(output_id) = server.focused_output() {
            let tags = server.root.outputs[output_id].current_tags;
            server.layout_outbox.push((conn, LayoutEvent::UserCommandTags { tags }));
        }
    }
    server
        .layout_outbox
        .push((conn, LayoutEvent::UserCommand { command: args[1].clone() }));
    Ok(())
}
