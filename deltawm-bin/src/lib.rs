// SPDX-License-Identifier: GPL-3.0-only

//! Compositor core: view/output state machines, the transactional
//! arrangement engine, the layout-client driver and the command engine.
//!
//! The display library (renderer, backends, xdg-shell and xwayland
//! plumbing, session lock) sits behind the seams in [`shell`] and
//! [`input`]: decoded shell and input events enter through methods on
//! [`server::Server`], client-facing effects leave through the server's
//! outbox queues.

pub mod cmd;
pub mod config;
pub mod control;
pub mod geo;
pub mod input;
pub mod layout;
pub mod modes;
pub mod options;
pub mod process;
pub mod rules;
pub mod seat;
pub mod server;
pub mod shell;
pub mod util;
