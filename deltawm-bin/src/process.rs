// SPDX-License-Identifier: GPL-3.0-only

//! Child process spawning. Children are double-forked so they reparent
//! to init instead of becoming compositor zombies, get their own session,
//! and start with a clean signal mask.

use std::ffi::CString;

use anyhow::{bail, Context, Result};

/// Run `/bin/sh -c <command>` detached from the compositor.
pub fn spawn(command: &str) -> Result<()> {
    let shell = CString::new("/bin/sh").expect("static string");
    let flag = CString::new("-c").expect("static string");
    let arg = CString::new(command).context("command contains a NUL byte")?;
    let argv = [shell.as_ptr(), flag.as_ptr(), arg.as_ptr(), std::ptr::null()];

    // SAFETY: the child branch only calls async-signal-safe functions;
    // all allocation happens before the fork.
    unsafe {
        match libc::fork() {
            -1 => bail!("fork failed: {}", std::io::Error::last_os_error()),
            0 => {
                libc::setsid();
                let mut set: libc::sigset_t = std::mem::zeroed();
                libc::sigemptyset(&mut set);
                libc::sigprocmask(libc::SIG_SETMASK, &set, std::ptr::null_mut());
                match libc::fork() {
                    0 => {
                        libc::execv(shell.as_ptr(), argv.as_ptr());
                        libc::_exit(1);
                    }
                    -1 => libc::_exit(1),
                    _ => libc::_exit(0),
                }
            }
            intermediate => {
                let mut status = 0;
                if libc::waitpid(intermediate, &mut status, 0) == -1 {
                    bail!("waitpid failed: {}", std::io::Error::last_os_error());
                }
                if !libc::WIFEXITED(status) || libc::WEXITSTATUS(status) != 0 {
                    bail!("failed to fork the spawned child");
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn spawn_runs_the_command() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("marker");
        spawn(&format!("echo ran > {}", marker.display())).unwrap();
        // The grandchild is detached; give it a moment.
        for _ in 0..100 {
            if marker.exists() {
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(10));
        }
        let mut contents = String::new();
        std::fs::File::open(&marker)
            .unwrap()
            .read_to_string(&mut contents)
            .unwrap();
        assert_eq!(contents.trim(), "ran");
    }

    #[test]
    fn nul_bytes_are_rejected() {
        assert!(spawn("true\0false").is_err());
    }
}
