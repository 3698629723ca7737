// SPDX-License-Identifier: GPL-3.0-only

//! Handle for an xwayland backed view. X11 configures have no ack
//! round-trip, so these complete as soon as they are sent.

use crate::geo::Rect;
use crate::shell::{ShellEvent, ShellQueue, ViewId};

#[derive(Debug, Default)]
pub struct XwaylandSurface {
    pub override_redirect: bool,
}

impl XwaylandSurface {
    pub fn configure(
        &self,
        view: ViewId,
        rect: Rect,
        fullscreen: bool,
        resizing: bool,
        queue: &mut ShellQueue,
    ) {
        queue.push_back(ShellEvent::Configure {
            view,
            serial: None,
            rect,
            fullscreen,
            resizing,
            // X11 windows always decorate themselves.
            ssd: false,
        });
    }
}
