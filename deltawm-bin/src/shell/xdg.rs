// SPDX-License-Identifier: GPL-3.0-only

//! Handle for an xdg-toplevel backed view. Configures round-trip through
//! serials; the serial counter is per toplevel, monotonic.

use crate::geo::Rect;
use crate::shell::{ShellEvent, ShellQueue, ViewId};

#[derive(Debug, Default)]
pub struct XdgToplevel {
    next_serial: u32,
    pub min_size: (i32, i32),
    pub max_size: (i32, i32),
}

impl XdgToplevel {
    pub fn configure(
        &mut self,
        view: ViewId,
        rect: Rect,
        fullscreen: bool,
        resizing: bool,
        ssd: bool,
        queue: &mut ShellQueue,
    ) -> u32 {
        let serial = self.next_serial;
        self.next_serial = self.next_serial.wrapping_add(1);
        queue.push_back(ShellEvent::Configure {
            view,
            serial: Some(serial),
            rect,
            fullscreen,
            resizing,
            ssd,
        });
        serial
    }

    /// Clamp a size to the client's advertised constraints. Zero means
    /// unconstrained on that axis.
    pub fn clamp_size(&self, width: i32, height: i32) -> (i32, i32) {
        let mut w = width.max(self.min_size.0).max(1);
        let mut h = height.max(self.min_size.1).max(1);
        if self.max_size.0 > 0 {
            w = w.min(self.max_size.0);
        }
        if self.max_size.1 > 0 {
            h = h.min(self.max_size.1);
        }
        (w, h)
    }
}
