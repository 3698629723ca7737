// SPDX-License-Identifier: GPL-3.0-only

//! Views, outputs and the root arrangement engine.
//!
//! Everything client-facing leaves through [`ShellEvent`]s queued on the
//! server outbox; the display glue drains them into real protocol
//! traffic. Views and outputs are addressed by generational keys so a
//! stale id held by a seat or an in-flight transaction dereferences to
//! `None` instead of a recycled object.

use std::collections::VecDeque;

use crate::geo::Rect;

pub mod output;
pub mod root;
pub mod view;
pub mod xdg;
pub mod xwayland;

slotmap::new_key_type! {
    pub struct ViewId;
    pub struct OutputId;
}

/// Stable textual id for focus-view-by-id and listings.
pub fn view_id_string(id: ViewId) -> String {
    format!("{:x}", slotmap::Key::data(&id).as_ffi())
}

pub fn parse_view_id(s: &str) -> Option<ViewId> {
    let bits = u64::from_str_radix(s, 16).ok()?;
    Some(ViewId::from(slotmap::KeyData::from_ffi(bits)))
}

/// Client-facing effects, drained by the display glue after every
/// dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellEvent {
    /// Tell the client its new size and state. `serial` is `None` for
    /// surfaces whose configure completes immediately (xwayland).
    Configure {
        view: ViewId,
        serial: Option<u32>,
        rect: Rect,
        fullscreen: bool,
        resizing: bool,
        ssd: bool,
    },
    Activated {
        view: ViewId,
        activated: bool,
    },
    Close {
        view: ViewId,
    },
    FrameScheduled {
        output: OutputId,
    },
}

pub type ShellQueue = VecDeque<ShellEvent>;
