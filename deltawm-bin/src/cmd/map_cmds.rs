// SPDX-License-Identifier: GPL-3.0-only

//! Mapping and mode commands.

use tracing::warn;

use super::{expect_arity, Error};
use crate::input::keysym::Keysym;
use crate::input::{pointer, Modifiers};
use crate::modes::{Mapping, PointerAction, PointerMapping};
use crate::server::Server;
use crate::util::flags::{self, Flag};

fn parse_mode(server: &Server, name: &str) -> Result<usize, Error> {
    server
        .config
        .modes
        .id(name)
        .ok_or_else(|| Error::Other(format!("mode not found: {name}")))
}

fn parse_modifiers(s: &str) -> Result<Modifiers, Error> {
    Modifiers::parse(s).ok_or_else(|| Error::InvalidValue(s.to_owned()))
}

fn parse_keysym(s: &str) -> Result<Keysym, Error> {
    Keysym::from_name(s).ok_or_else(|| Error::InvalidValue(s.to_owned()))
}

const MAP_SCHEMA: &[Flag] = &[Flag::boolean("release"), Flag::boolean("layout-independent")];
const UNMAP_SCHEMA: &[Flag] = &[Flag::boolean("release")];

pub fn map(server: &mut Server, args: &[String], _out: &mut String) -> Result<(), Error> {
    let parsed = flags::parse(args, MAP_SCHEMA)?;
    let positionals = parsed.positionals();
    if positionals.len() < 4 {
        return Err(Error::NotEnoughArguments);
    }
    let mode_id = parse_mode(server, &positionals[0])?;
    let modifiers = parse_modifiers(&positionals[1])?;
    let keysym = parse_keysym(&positionals[2])?;
    server.config.modes.get_mut(mode_id).add_mapping(Mapping {
        modifiers,
        keysym,
        release: parsed.flag("release"),
        layout_independent: parsed.flag("layout-independent"),
        command: positionals[3..].to_vec(),
    });
    Ok(())
}

pub fn unmap(server: &mut Server, args: &[String], _out: &mut String) -> Result<(), Error> {
    let parsed = flags::parse(args, UNMAP_SCHEMA)?;
    let positionals = parsed.positionals();
    expect_arity(positionals, 3, 3)?;
    let mode_id = parse_mode(server, &positionals[0])?;
    let modifiers = parse_modifiers(&positionals[1])?;
    let keysym = parse_keysym(&positionals[2])?;
    if !server
        .config
        .modes
        .get_mut(mode_id)
        .remove_mapping(modifiers, keysym, parsed.flag("release"))
    {
        return Err(Error::Other("no such mapping".into()));
    }
    Ok(())
}

pub fn map_pointer(server: &mut Server, args: &[String], _out: &mut String) -> Result<(), Error> {
    if args.len() < 4 {
        return Err(Error::NotEnoughArguments);
    }
    let mode_id = parse_mode(server, &args[0])?;
    let modifiers = parse_modifiers(&args[1])?;
    let button = pointer::parse_button(&args[2]).ok_or_else(|| Error::InvalidValue(args[2].clone()))?;
    let action = match args[3].as_str() {
        "move-view" => {
            expect_arity(args, 4, 4)?;
            PointerAction::MoveView
        }
        "resize-view" => {
            expect_arity(args, 4, 4)?;
            PointerAction::ResizeView
        }
        _ => PointerAction::Command(args[3..].to_vec()),
    };
    server
        .config
        .modes
        .get_mut(mode_id)
        .add_pointer_mapping(PointerMapping { modifiers, button, action });
    Ok(())
}

pub fn unmap_pointer(server: &mut Server, args: &[String], _out: &mut String) -> Result<(), Error> {
    expect_arity(args, 3, 3)?;
    let mode_id = parse_mode(server, &args[0])?;
    let modifiers = parse_modifiers(&args[1])?;
    let button = pointer::parse_button(&args[2]).ok_or_else(|| Error::InvalidValue(args[2].clone()))?;
    if !server.config.modes.get_mut(mode_id).remove_pointer_mapping(modifiers, button) {
        return Err(Error::Other("no such mapping".into()));
    }
    Ok(())
}

pub fn declare_mode(server: &mut Server, args: &[String], _out: &mut String) -> Result<(), Error> {
    expect_arity(args, 1, 1)?;
    if server.config.modes.declare(&args[0]).is_none() {
        return Err(Error::Other(format!("mode already exists: {}", args[0])));
    }
    Ok(())
}

pub fn enter_mode(server: &mut Server, args: &[String], _out: &mut String) -> Result<(), Error> {
    expect_arity(args, 1, 1)?;
    if args[0] == "locked" {
        return Err(Error::Other("the locked mode may only be entered by a session lock".into()));
    }
    let mode_id = parse_mode(server, &args[0])?;
    if !server.seat.enter_mode(mode_id) {
        return Err(Error::Other("seat is locked".into()));
    }
    Ok(())
}

/// Keyboard groups are gone; one implicit group per seat. The commands
/// stay accepted so old init scripts keep working.
pub fn keyboard_group(_server: &mut Server, _args: &[String], _out: &mut String) -> Result<(), Error> {
    warn!("keyboard groups are deprecated and ignored");
    Ok(())
}
