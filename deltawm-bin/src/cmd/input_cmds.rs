// SPDX-License-Identifier: GPL-3.0-only

//! Per-device input configuration commands.

use std::fmt::Write;

use super::{expect_arity, Error};
use crate::input::config::{InputConfig, InputSettings};
use crate::server::Server;
use crate::util::globber;

pub fn input(server: &mut Server, args: &[String], _out: &mut String) -> Result<(), Error> {
    expect_arity(args, 3, 3)?;
    let glob = &args[0];
    if !globber::validate(glob) {
        return Err(Error::InvalidValue(glob.clone()));
    }
    // Parse into a scratch record first so a bad value leaves the row
    // untouched.
    let mut scratch = InputSettings::default();
    scratch.set(&args[1], &args[2])?;

    match server
        .config
        .input_configs
        .iter_mut()
        .find(|c| &c.identifier_glob == glob)
    {
        Some(row) => row.settings.merge(&scratch),
        None => server.config.input_configs.push(InputConfig {
            identifier_glob: glob.clone(),
            settings: scratch,
        }),
    }
    server.refresh_devices();
    Ok(())
}

pub fn list_inputs(server: &mut Server, args: &[String], out: &mut String) -> Result<(), Error> {
    expect_arity(args, 0, 0)?;
    for device in &server.devices {
        let _ = writeln!(out, "{}", device.identifier);
        let _ = write!(out, "{}", device.settings);
    }
    Ok(())
}

pub fn list_input_configs(server: &mut Server, args: &[String], out: &mut String) -> Result<(), Error> {
    expect_arity(args, 0, 0)?;
    for config in &server.config.input_configs {
        let _ = writeln!(out, "{}", config.identifier_glob);
        let _ = write!(out, "{}", config.settings);
    }
    Ok(())
}
