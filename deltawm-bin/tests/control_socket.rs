// SPDX-License-Identifier: GPL-3.0-only

//! The wire path: a real unix socket, framed RON, one reply per request.

use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::UnixStream;
use std::time::Duration;

use deltawm::control::Runtime;
use deltawm::server::Server;
use deltawm_protocol::{from_line, to_line, ControlReply, ControlRequest, Hello, LayoutEvent};

fn send<T: serde::Serialize>(stream: &mut UnixStream, msg: &T) {
    stream.write_all(to_line(msg).unwrap().as_bytes()).unwrap();
}

fn recv<T: serde::de::DeserializeOwned>(reader: &mut BufReader<UnixStream>) -> T {
    let mut line = String::new();
    reader.read_line(&mut line).unwrap();
    from_line(&line).unwrap()
}

fn run_command(stream: &mut UnixStream, tokens: &[&str]) {
    send(
        stream,
        &ControlRequest::RunCommand {
            tokens: tokens.iter().map(|t| t.to_string()).collect(),
        },
    );
}

#[test]
fn control_requests_get_one_reply_each_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("control.sock");
    let mut event_loop: calloop::EventLoop<Runtime> = calloop::EventLoop::try_new().unwrap();
    let mut runtime = Runtime::new(Server::new(), event_loop.handle(), event_loop.get_signal());
    runtime.listen(&path).unwrap();
    runtime.server.output_added("TEST-1", 800, 600);
    runtime.sync();

    let client_path = path.clone();
    let client = std::thread::spawn(move || {
        let mut stream = UnixStream::connect(&client_path).unwrap();
        send(&mut stream, &Hello::Control);
        run_command(&mut stream, &["set-focused-tags", "8"]);
        run_command(&mut stream, &["not-a-command"]);
        run_command(&mut stream, &["declare-option", "gaps", "uint", "6"]);
        run_command(&mut stream, &["get-option", "gaps"]);
        stream.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
        let mut reader = BufReader::new(stream);
        (0..4).map(|_| recv::<ControlReply>(&mut reader)).collect::<Vec<_>>()
    });

    for _ in 0..200 {
        event_loop.dispatch(Duration::from_millis(5), &mut runtime).unwrap();
        if client.is_finished() {
            break;
        }
    }
    let replies = client.join().unwrap();
    assert_eq!(
        replies,
        vec![
            ControlReply::Success { output: String::new() },
            ControlReply::Failure { message: "unknown command: not-a-command".into() },
            ControlReply::Success { output: String::new() },
            ControlReply::Success { output: "6".into() },
        ]
    );
    let output = runtime.server.root.output_order[0];
    assert_eq!(runtime.server.root.outputs[output].pending_tags, 8);
}

#[test]
fn second_layout_client_on_a_namespace_is_turned_away() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("control.sock");
    let mut event_loop: calloop::EventLoop<Runtime> = calloop::EventLoop::try_new().unwrap();
    let mut runtime = Runtime::new(Server::new(), event_loop.handle(), event_loop.get_signal());
    runtime.listen(&path).unwrap();
    // An in-process generator already owns the namespace.
    runtime.server.layout_hello(u64::MAX, "tile", 3);
    runtime.sync();

    let client_path = path.clone();
    let client = std::thread::spawn(move || {
        let mut stream = UnixStream::connect(&client_path).unwrap();
        send(&mut stream, &Hello::Layout { namespace: "tile".into(), version: 3 });
        stream.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
        let mut reader = BufReader::new(stream);
        recv::<LayoutEvent>(&mut reader)
    });

    for _ in 0..200 {
        event_loop.dispatch(Duration::from_millis(5), &mut runtime).unwrap();
        if client.is_finished() {
            break;
        }
    }
    assert_eq!(client.join().unwrap(), LayoutEvent::NamespaceInUse);
    assert_eq!(runtime.server.layouts.binding_for("tile").unwrap().conn, u64::MAX);
}
