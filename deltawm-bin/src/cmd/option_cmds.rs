// SPDX-License-Identifier: GPL-3.0-only

//! Typed option commands, global or output-scoped with `-output`.

use super::{expect_arity, Error};
use crate::options::OptionValue;
use crate::server::Server;
use crate::shell::OutputId;
use crate::util::flags::{self, Flag};

const OUTPUT_SCHEMA: &[Flag] = &[Flag::value("output")];

fn scope(server: &Server, parsed: &flags::ParsedArgs) -> Result<Option<OutputId>, Error> {
    match parsed.value("output") {
        Some(name) => server
            .root
            .output_by_name(name)
            .map(Some)
            .ok_or_else(|| Error::Other(format!("unknown output: {name}"))),
        None => Ok(None),
    }
}

pub fn declare_option(server: &mut Server, args: &[String], _out: &mut String) -> Result<(), Error> {
    if args.len() < 3 {
        return Err(Error::NotEnoughArguments);
    }
    let (name, kind) = (&args[0], &args[1]);
    let default = match kind.as_str() {
        // String defaults may span several argv words.
        "string" => OptionValue::String(args[2..].join(" ")),
        _ => {
            expect_arity(args, 3, 3)?;
            let raw = &args[2];
            match kind.as_str() {
                "int" => OptionValue::Int(
                    raw.parse().map_err(|_| Error::InvalidValue(raw.clone()))?,
                ),
                "uint" => OptionValue::Uint(
                    raw.parse().map_err(|_| Error::InvalidValue(raw.clone()))?,
                ),
                "fixed" => OptionValue::Fixed(
                    raw.parse().map_err(|_| Error::InvalidValue(raw.clone()))?,
                ),
                other => return Err(Error::InvalidValue(other.to_owned())),
            }
        }
    };
    server.options.declare(name, default)?;
    Ok(())
}

pub fn set_option(server: &mut Server, args: &[String], _out: &mut String) -> Result<(), Error> {
    let parsed = flags::parse(args, OUTPUT_SCHEMA)?;
    let output = scope(server, &parsed)?;
    let positionals = parsed.positionals();
    if positionals.len() < 2 {
        return Err(Error::NotEnoughArguments);
    }
    let value = positionals[1..].join(" ");
    server.options.set(output, &positionals[0], &value)?;
    Ok(())
}

pub fn get_option(server: &mut Server, args: &[String], out: &mut String) -> Result<(), Error> {
    let parsed = flags::parse(args, OUTPUT_SCHEMA)?;
    let output = scope(server, &parsed)?;
    let positionals = parsed.positionals();
    expect_arity(positionals, 1, 1)?;
    let value = server
        .options
        .get(output, &positionals[0])
        .ok_or_else(|| Error::Other(format!("option {} has not been declared", positionals[0])))?;
    out.push_str(&value.to_string());
    Ok(())
}

pub fn unset_option(server: &mut Server, args: &[String], _out: &mut String) -> Result<(), Error> {
    let parsed = flags::parse(args, OUTPUT_SCHEMA)?;
    let Some(output) = scope(server, &parsed)? else {
        return Err(Error::Other("unset-option requires -output".into()));
    };
    let positionals = parsed.positionals();
    expect_arity(positionals, 1, 1)?;
    server.options.unset(output, &positionals[0])?;
    Ok(())
}

pub fn mod_option(server: &mut Server, args: &[String], _out: &mut String) -> Result<(), Error> {
    let parsed = flags::parse(args, OUTPUT_SCHEMA)?;
    let output = scope(server, &parsed)?;
    let positionals = parsed.positionals();
    expect_arity(positionals, 2, 2)?;
    server.options.modify(output, &positionals[0], &positionals[1])?;
    Ok(())
}
