// SPDX-License-Identifier: GPL-3.0-only

use super::{expect_arity, Error};
use crate::process;
use crate::server::Server;

/// The argument is a single shell word vector entry; quoting is the
/// control client's business.
pub fn spawn(_server: &mut Server, args: &[String], _out: &mut String) -> Result<(), Error> {
    expect_arity(args, 1, 1)?;
    process::spawn(&args[0]).map_err(|err| Error::Other(err.to_string()))
}
