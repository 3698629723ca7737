// SPDX-License-Identifier: GPL-3.0-only

//! Wire types shared between the compositor and its out-of-process peers.
//!
//! Both protocols run over the same unix socket: a peer introduces itself
//! with a [`Hello`] and from then on speaks either the control protocol
//! (argv-style commands, one reply per request) or the layout protocol
//! (geometry demands pushed by the compositor, dimensions pushed back).
//!
//! Messages are serialized as single-line RON, newline-framed. RON escapes
//! control characters inside string literals, so embedded newlines in
//! command payloads never break the framing.

use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Current layout protocol version. Clients advertising an older version
/// are still served; `UserCommandTags` is only sent to version 2 and up.
pub const LAYOUT_PROTOCOL_VERSION: u32 = 3;

/// First message on every connection, declaring the peer's role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Hello {
    Control,
    Layout { namespace: String, version: u32 },
}

/// A request from a control client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlRequest {
    /// Run one command. Tokens are pre-split argv words; token 0 names the
    /// command.
    RunCommand { tokens: Vec<String> },
}

/// The single reply delivered for every [`ControlRequest`], in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlReply {
    Success { output: String },
    Failure { message: String },
}

/// Events sent by the compositor to a layout client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayoutEvent {
    /// Another client already owns this namespace. Terminal.
    NamespaceInUse,
    /// Demand a layout for `view_count` views inside the usable area.
    LayoutDemand {
        serial: u32,
        view_count: u32,
        usable_width: u32,
        usable_height: u32,
        tags: u32,
    },
    /// The focused output's tag mask, sent before each `UserCommand` to
    /// clients speaking version 2 or later.
    UserCommandTags { tags: u32 },
    /// Verbatim payload of a `send-layout-cmd` command.
    UserCommand { command: String },
}

/// Requests sent by a layout client back to the compositor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayoutRequest {
    /// One view's geometry, in usable-area-local coordinates. Must be sent
    /// exactly `view_count` times per demand, in window-stack order.
    PushViewDimensions {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        serial: u32,
    },
    /// Complete the demand identified by `serial`.
    Commit { layout_name: String, serial: u32 },
    /// The client is done with its layout object.
    Destroy,
}

/// Serialize one message as a newline-terminated RON line.
pub fn to_line<T: Serialize>(msg: &T) -> Result<String, ron::Error> {
    let mut line = ron::to_string(msg)?;
    line.push('\n');
    Ok(line)
}

/// Parse one framed line back into a message.
pub fn from_line<T: DeserializeOwned>(line: &str) -> Result<T, ron::error::SpannedError> {
    ron::from_str(line.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_payload_with_newline_stays_one_line() {
        let event = LayoutEvent::UserCommand {
            command: "main-count\n+1".into(),
        };
        let line = to_line(&event).unwrap();
        assert_eq!(line.matches('\n').count(), 1);
        assert!(line.ends_with('\n'));
        let parsed: LayoutEvent = from_line(&line).unwrap();
        assert_eq!(parsed, event);
    }

    #[test]
    fn hello_roles_are_distinguished() {
        let layout = Hello::Layout {
            namespace: "rivertile".into(),
            version: LAYOUT_PROTOCOL_VERSION,
        };
        let parsed: Hello = from_line(&to_line(&layout).unwrap()).unwrap();
        assert_eq!(parsed, layout);
        let control: Hello = from_line(&to_line(&Hello::Control).unwrap()).unwrap();
        assert_eq!(control, Hello::Control);
    }
}
