// SPDX-License-Identifier: GPL-3.0-only

//! Fixed-schema flag parsing for command argument vectors.
//!
//! Flags come first, positionals after. A leading token that looks like a
//! flag but is not in the schema is an error, except when it parses as a
//! number (so negative deltas stay positionals).

use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagKind {
    Boolean,
    Value,
}

#[derive(Debug, Clone, Copy)]
pub struct Flag {
    pub name: &'static str,
    pub kind: FlagKind,
}

impl Flag {
    pub const fn boolean(name: &'static str) -> Self {
        Self { name, kind: FlagKind::Boolean }
    }

    pub const fn value(name: &'static str) -> Self {
        Self { name, kind: FlagKind::Value }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FlagsError {
    #[error("unknown option: {0}")]
    Unknown(String),
    #[error("option {0} requires a value")]
    MissingValue(String),
}

#[derive(Debug, Default, PartialEq)]
pub struct ParsedArgs<'a> {
    booleans: HashSet<&'static str>,
    values: HashMap<&'static str, &'a str>,
    positionals: &'a [String],
}

impl<'a> ParsedArgs<'a> {
    pub fn flag(&self, name: &str) -> bool {
        self.booleans.contains(name)
    }

    pub fn value(&self, name: &str) -> Option<&'a str> {
        self.values.get(name).copied()
    }

    pub fn positionals(&self) -> &'a [String] {
        self.positionals
    }
}

pub fn parse<'a>(args: &'a [String], schema: &[Flag]) -> Result<ParsedArgs<'a>, FlagsError> {
    let mut out = ParsedArgs::default();
    let mut i = 0;
    while i < args.len() {
        let token = args[i].as_str();
        if !token.starts_with('-') || token.parse::<i64>().is_ok() {
            break;
        }
        let Some(flag) = schema.iter().find(|f| f.name == &token[1..]) else {
            return Err(FlagsError::Unknown(token.to_owned()));
        };
        match flag.kind {
            FlagKind::Boolean => {
                out.booleans.insert(flag.name);
                i += 1;
            }
            FlagKind::Value => {
                let value = args.get(i + 1).ok_or_else(|| FlagsError::MissingValue(token.to_owned()))?;
                out.values.insert(flag.name, value.as_str());
                i += 2;
            }
        }
    }
    out.positionals = &args[i..];
    Ok(out)
}
