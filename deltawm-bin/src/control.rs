// SPDX-License-Identifier: GPL-3.0-only

//! Socket runtime: accepts control and layout clients on one unix
//! socket, frames newline-delimited RON, and reconciles the calloop
//! timers with the server's transaction state after every entry point.

use std::collections::HashMap;
use std::io::{ErrorKind, Read, Write};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use calloop::generic::Generic;
use calloop::timer::{TimeoutAction, Timer};
use calloop::{Interest, LoopHandle, LoopSignal, Mode, PostAction, RegistrationToken};
use deltawm_protocol::{ControlReply, ControlRequest, Hello, LayoutRequest};
use tracing::{debug, info, trace, warn};

use crate::layout::ConnId;
use crate::server::{Server, LAYOUT_DEMAND_TIMEOUT};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Pending,
    Control,
    Layout,
}

struct Connection {
    stream: UnixStream,
    role: Role,
    buf: String,
    token: RegistrationToken,
}

pub struct Runtime {
    pub server: Server,
    handle: LoopHandle<'static, Runtime>,
    pub signal: LoopSignal,
    conns: HashMap<ConnId, Connection>,
    next_conn: ConnId,
    transaction_timer: Option<RegistrationToken>,
    layout_timer: Option<RegistrationToken>,
}

/// Where clients find us: `$XDG_RUNTIME_DIR/deltawm/control.sock`, with a
/// tmpdir fallback for stripped-down environments.
pub fn socket_path() -> PathBuf {
    xdg::BaseDirectories::with_prefix("deltawm")
        .ok()
        .and_then(|dirs| dirs.place_runtime_file("control.sock").ok())
        .unwrap_or_else(|| std::env::temp_dir().join("deltawm-control.sock"))
}

impl Runtime {
    pub fn new(server: Server, handle: LoopHandle<'static, Runtime>, signal: LoopSignal) -> Self {
        Runtime {
            server,
            handle,
            signal,
            conns: HashMap::new(),
            next_conn: 0,
            transaction_timer: None,
            layout_timer: None,
        }
    }

    pub fn listen(&mut self, path: &Path) -> Result<()> {
        // A leftover socket from a crashed instance refuses the bind.
        if path.exists() {
            std::fs::remove_file(path)
                .with_context(|| format!("removing stale socket {}", path.display()))?;
        }
        let listener =
            UnixListener::bind(path).with_context(|| format!("binding {}", path.display()))?;
        listener.set_nonblocking(true)?;
        info!(socket = %path.display(), "listening for control and layout clients");
        self.handle
            .insert_source(
                Generic::new(listener, Interest::READ, Mode::Level),
                |_, listener, runtime: &mut Runtime| {
                    loop {
                        match listener.accept() {
                            Ok((stream, _)) => runtime.accept(stream),
                            Err(err) if err.kind() == ErrorKind::WouldBlock => break,
                            Err(err) => {
                                warn!(%err, "accept failed");
                                break;
                            }
                        }
                    }
                    Ok(PostAction::Continue)
                },
            )
            .map_err(|_| anyhow::anyhow!("failed to insert the listener source"))?;
        Ok(())
    }

    fn accept(&mut self, stream: UnixStream) {
        let id = self.next_conn;
        self.next_conn += 1;
        if stream.set_nonblocking(true).is_err() {
            return;
        }
        let Ok(read_half) = stream.try_clone() else { return };
        let inserted = self.handle.insert_source(
            Generic::new(read_half, Interest::READ, Mode::Level),
            move |_, sock, runtime: &mut Runtime| {
                Ok(runtime.readable(id, unsafe { sock.get_mut() }))
            },
        );
        match inserted {
            Ok(token) => {
                debug!(conn = id, "client connected");
                self.conns
                    .insert(id, Connection { stream, role: Role::Pending, buf: String::new(), token });
            }
            Err(_) => warn!("failed to register client connection"),
        }
    }

    fn readable(&mut self, id: ConnId, sock: &mut UnixStream) -> PostAction {
        let mut closed = false;
        let mut data = [0u8; 4096];
        let mut buf = match self.conns.get_mut(&id) {
            Some(conn) => std::mem::take(&mut conn.buf),
            None => return PostAction::Remove,
        };
        loop {
            match sock.read(&mut data) {
                Ok(0) => {
                    closed = true;
                    break;
                }
                Ok(n) => buf.push_str(&String::from_utf8_lossy(&data[..n])),
                Err(err) if err.kind() == ErrorKind::WouldBlock => break,
                Err(err) => {
                    debug!(conn = id, %err, "read failed");
                    closed = true;
                    break;
                }
            }
        }
        while let Some(at) = buf.find('\n') {
            let line: String = buf.drain(..=at).collect();
            if !self.handle_line(id, line.trim_end()) {
                closed = true;
                break;
            }
        }
        if let Some(conn) = self.conns.get_mut(&id) {
            conn.buf = buf;
        }
        self.sync();
        if closed {
            self.drop_conn(id);
            PostAction::Remove
        } else {
            PostAction::Continue
        }
    }

    /// Process one framed message. Returns false to hang up: a protocol
    /// violation disconnects the offending client, nothing more.
    fn handle_line(&mut self, id: ConnId, line: &str) -> bool {
        if line.is_empty() {
            return true;
        }
        let role = match self.conns.get(&id) {
            Some(conn) => conn.role,
            None => return false,
        };
        match role {
            Role::Pending => match deltawm_protocol::from_line::<Hello>(line) {
                Ok(Hello::Control) => {
                    if let Some(conn) = self.conns.get_mut(&id) {
                        conn.role = Role::Control;
                    }
                    true
                }
                Ok(Hello::Layout { namespace, version }) => {
                    if let Some(conn) = self.conns.get_mut(&id) {
                        conn.role = Role::Layout;
                    }
                    self.server.layout_hello(id, &namespace, version);
                    true
                }
                Err(err) => {
                    warn!(conn = id, %err, "bad hello");
                    false
                }
            },
            Role::Control => match deltawm_protocol::from_line::<ControlRequest>(line) {
                Ok(ControlRequest::RunCommand { tokens }) => {
                    let reply = match self.server.run_command(&tokens) {
                        Ok(output) => ControlReply::Success { output },
                        Err(err) => ControlReply::Failure { message: err.to_string() },
                    };
                    self.send(id, &reply)
                }
                Err(err) => {
                    warn!(conn = id, %err, "bad control request");
                    false
                }
            },
            Role::Layout => match deltawm_protocol::from_line::<LayoutRequest>(line) {
                Ok(request) => {
                    self.server.layout_request(id, request);
                    true
                }
                Err(err) => {
                    warn!(conn = id, %err, "bad layout request");
                    self.server.layout_disconnected(id);
                    false
                }
            },
        }
    }

    fn send<T: serde::Serialize>(&mut self, id: ConnId, msg: &T) -> bool {
        let Some(conn) = self.conns.get_mut(&id) else { return false };
        let line = match deltawm_protocol::to_line(msg) {
            Ok(line) => line,
            Err(err) => {
                warn!(%err, "failed to serialize reply");
                return false;
            }
        };
        match conn.stream.write_all(line.as_bytes()) {
            Ok(()) => true,
            Err(err) => {
                debug!(conn = id, %err, "write failed");
                false
            }
        }
    }

    fn drop_conn(&mut self, id: ConnId) {
        let Some(conn) = self.conns.remove(&id) else { return };
        debug!(conn = id, "client disconnected");
        self.handle.remove(conn.token);
        if conn.role == Role::Layout {
            self.server.layout_disconnected(id);
            self.sync();
        }
    }

    /// Drain the server's outboxes and reconcile timers. Called after
    /// every entry point into the server.
    pub fn sync(&mut self) {
        let traffic: Vec<_> = self.server.layout_outbox.drain(..).collect();
        for (conn, event) in traffic {
            if !self.send(conn, &event) {
                self.drop_conn(conn);
            }
        }
        let dead: Vec<_> = self.server.dead_layout_conns.drain(..).collect();
        for conn in dead {
            self.drop_conn(conn);
        }
        // Headless operation: shell effects have no display glue to go
        // to, they are only traced.
        for event in self.server.shell_queue.drain(..) {
            trace!(?event, "shell event");
        }

        match (self.server.root.transaction_active(), self.transaction_timer) {
            (true, None) => {
                let timeout = self.server.transaction_timeout();
                match self.handle.insert_source(
                    Timer::from_duration(timeout),
                    |_, _, runtime: &mut Runtime| {
                        runtime.transaction_timer = None;
                        runtime.server.on_transaction_timeout();
                        runtime.sync();
                        TimeoutAction::Drop
                    },
                ) {
                    Ok(token) => self.transaction_timer = Some(token),
                    Err(_) => warn!("failed to arm the transaction timer"),
                }
            }
            (false, Some(token)) => {
                self.handle.remove(token);
                self.transaction_timer = None;
            }
            _ => {}
        }

        match (self.server.root.awaiting_layouts(), self.layout_timer) {
            (true, None) => {
                match self.handle.insert_source(
                    Timer::from_duration(LAYOUT_DEMAND_TIMEOUT),
                    |_, _, runtime: &mut Runtime| {
                        runtime.layout_timer = None;
                        runtime.server.on_layout_demand_timeout();
                        runtime.sync();
                        TimeoutAction::Drop
                    },
                ) {
                    Ok(token) => self.layout_timer = Some(token),
                    Err(_) => warn!("failed to arm the layout demand timer"),
                }
            }
            (false, Some(token)) => {
                self.handle.remove(token);
                self.layout_timer = None;
            }
            _ => {}
        }

        if self.server.exiting {
            self.signal.stop();
        }
    }
}
