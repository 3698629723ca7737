// SPDX-License-Identifier: GPL-3.0-only

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use deltawm::control::{socket_path, Runtime};
use deltawm::process;
use deltawm::server::Server;

const USAGE: &str = "\
USAGE: deltawm [options]

  -h                  Print this message and exit.
  -version            Print the version number and exit.
  -c <command>        Run `sh -c <command>` at startup instead of the
                      init executable.
  -log-level <level>  error, warn, info, debug or trace. Defaults to
                      info, or whatever RUST_LOG says.
  -no-xwayland        Do not manage xwayland toplevels.
";

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let mut startup_command: Option<String> = None;
    let mut log_level: Option<String> = None;
    let mut no_xwayland = false;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print!("{USAGE}");
                return Ok(());
            }
            "-version" | "--version" => {
                println!("{}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "-c" => startup_command = Some(args.next().context("-c requires an argument")?),
            "-log-level" => {
                log_level = Some(args.next().context("-log-level requires an argument")?)
            }
            "-no-xwayland" => no_xwayland = true,
            _ => {
                eprint!("{USAGE}");
                std::process::exit(1);
            }
        }
    }

    let filter = match &log_level {
        Some(level) => EnvFilter::try_new(level).context("invalid log level")?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
    if no_xwayland {
        info!("xwayland support disabled");
    }

    run(startup_command)
}

fn run(startup_command: Option<String>) -> Result<()> {
    let mut event_loop: calloop::EventLoop<'static, Runtime> =
        calloop::EventLoop::try_new().context("failed to initialize the event loop")?;
    let mut runtime = Runtime::new(Server::new(), event_loop.handle(), event_loop.get_signal());

    let path = socket_path();
    runtime.listen(&path)?;
    std::env::set_var("DELTAWM_SOCKET", &path);

    // A headless output so commands have something to act on before the
    // display glue attaches real ones.
    runtime.server.output_added("HEADLESS-1", 1920, 1080);
    runtime.sync();

    match startup_command {
        Some(command) => {
            if let Err(err) = process::spawn(&command) {
                warn!(%err, "failed to run the startup command");
            }
        }
        None => spawn_init(),
    }

    info!("running");
    event_loop
        .run(None::<std::time::Duration>, &mut runtime, |runtime| {
            if runtime.server.exiting {
                runtime.signal.stop();
            }
        })
        .context("event loop error")?;

    let _ = std::fs::remove_file(&path);
    info!("shutting down");
    Ok(())
}

/// `$XDG_CONFIG_HOME/deltawm/init` sets up mappings and starts the
/// layout and status clients.
fn spawn_init() {
    let init = xdg::BaseDirectories::with_prefix("deltawm")
        .ok()
        .and_then(|dirs| dirs.find_config_file("init"));
    match init {
        Some(path) => {
            #[allow(deprecated)]
            let quoted = shlex::quote(&path.to_string_lossy()).into_owned();
            if let Err(err) = process::spawn(&quoted) {
                warn!(init = %path.display(), %err, "failed to run the init executable");
            }
        }
        None => info!("no init executable found"),
    }
}
