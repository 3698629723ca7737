// SPDX-License-Identifier: GPL-3.0-only

//! Appearance and seat policy commands.

use super::{expect_arity, parse_i32, Error};
use crate::config::{parse_color, AttachMode, FocusFollowsCursor, WarpCursor};
use crate::server::Server;

pub fn attach_mode(server: &mut Server, args: &[String], _out: &mut String) -> Result<(), Error> {
    expect_arity(args, 1, 1)?;
    server.config.attach_mode =
        AttachMode::parse(&args[0]).ok_or_else(|| Error::InvalidValue(args[0].clone()))?;
    Ok(())
}

fn color(args: &[String]) -> Result<u32, Error> {
    expect_arity(args, 1, 1)?;
    parse_color(&args[0]).ok_or_else(|| Error::InvalidValue(args[0].clone()))
}

pub fn background_color(server: &mut Server, args: &[String], _out: &mut String) -> Result<(), Error> {
    server.config.background_color = color(args)?;
    Ok(())
}

pub fn border_color_focused(server: &mut Server, args: &[String], _out: &mut String) -> Result<(), Error> {
    server.config.border_color_focused = color(args)?;
    Ok(())
}

pub fn border_color_unfocused(server: &mut Server, args: &[String], _out: &mut String) -> Result<(), Error> {
    server.config.border_color_unfocused = color(args)?;
    Ok(())
}

pub fn border_color_urgent(server: &mut Server, args: &[String], _out: &mut String) -> Result<(), Error> {
    server.config.border_color_urgent = color(args)?;
    Ok(())
}

pub fn border_width(server: &mut Server, args: &[String], _out: &mut String) -> Result<(), Error> {
    expect_arity(args, 1, 1)?;
    let width = parse_i32(&args[0])?;
    if width < 0 {
        return Err(Error::InvalidValue(args[0].clone()));
    }
    server.config.border_width = width;
    Ok(())
}

pub fn focus_follows_cursor(server: &mut Server, args: &[String], _out: &mut String) -> Result<(), Error> {
    expect_arity(args, 1, 1)?;
    server.config.focus_follows_cursor =
        FocusFollowsCursor::parse(&args[0]).ok_or_else(|| Error::InvalidValue(args[0].clone()))?;
    Ok(())
}

pub fn set_cursor_warp(server: &mut Server, args: &[String], _out: &mut String) -> Result<(), Error> {
    expect_arity(args, 1, 1)?;
    server.config.warp_cursor =
        WarpCursor::parse(&args[0]).ok_or_else(|| Error::InvalidValue(args[0].clone()))?;
    Ok(())
}

pub fn hide_cursor(server: &mut Server, args: &[String], _out: &mut String) -> Result<(), Error> {
    expect_arity(args, 2, 2)?;
    match args[0].as_str() {
        "timeout" => {
            server.seat.hide_cursor_timeout_ms =
                args[1].parse().map_err(|_| Error::InvalidValue(args[1].clone()))?;
        }
        "when-typing" => {
            server.seat.hide_cursor_when_typing = match args[1].as_str() {
                "enabled" => true,
                "disabled" => false,
                _ => return Err(Error::InvalidValue(args[1].clone())),
            };
        }
        other => return Err(Error::UnknownOption(other.to_owned())),
    }
    Ok(())
}

pub fn set_repeat(server: &mut Server, args: &[String], _out: &mut String) -> Result<(), Error> {
    expect_arity(args, 2, 2)?;
    let rate = args[0].parse().map_err(|_| Error::InvalidValue(args[0].clone()))?;
    let delay = args[1].parse().map_err(|_| Error::InvalidValue(args[1].clone()))?;
    server.seat.repeat_rate = rate;
    server.seat.repeat_delay = delay;
    Ok(())
}

pub fn xcursor_theme(server: &mut Server, args: &[String], _out: &mut String) -> Result<(), Error> {
    expect_arity(args, 1, 2)?;
    let size = match args.get(1) {
        Some(raw) => Some(raw.parse::<u32>().map_err(|_| Error::InvalidValue(raw.clone()))?),
        None => None,
    };
    std::env::set_var("XCURSOR_THEME", &args[0]);
    if let Some(size) = size {
        std::env::set_var("XCURSOR_SIZE", size.to_string());
    }
    server.config.xcursor_theme = Some((args[0].clone(), size));
    Ok(())
}

pub fn exit(server: &mut Server, args: &[String], _out: &mut String) -> Result<(), Error> {
    expect_arity(args, 0, 0)?;
    server.exiting = true;
    Ok(())
}
