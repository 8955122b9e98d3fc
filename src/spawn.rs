//! Process spawning for the built-in "run a command" actions. Forks and
//! execs directly via `libc` rather than `std::process::Command`, in
//! keeping with the rest of the crate's preference for raw syscalls at
//! the X11 seam.

use std::ffi::CString;

use log::{error, warn};

/// Spawn a terminal emulator (`xterm`, white-on-black) detached from the
/// window manager's own process tree.
pub fn run_terminal() {
    spawn(&["xterm", "-bg", "black", "-fg", "white"]);
}

/// Spawn `xeyes`, used by a couple of the shipped demo keybindings.
pub fn run_xeyes() {
    spawn(&["xeyes"]);
}

/// Fork and exec `argv[0]` with the given arguments. A failed `fork(2)`
/// is logged and ignored — the window manager keeps running. A failed
/// `execvp(3)` only terminates the child.
fn spawn(argv: &[&str]) {
    let cstrings: Vec<CString> = argv
        .iter()
        .map(|s| CString::new(*s).expect("argv entries must not contain NUL bytes"))
        .collect();
    let mut raw: Vec<*const libc::c_char> = cstrings.iter().map(|s| s.as_ptr()).collect();
    raw.push(std::ptr::null());

    let pid = unsafe { libc::fork() };
    match pid {
        -1 => {
            error!("fork failed while spawning {:?}", argv);
        }
        0 => unsafe {
            libc::execvp(raw[0], raw.as_ptr());
            warn!("execvp failed for {:?}, exiting child", argv);
            libc::_exit(1);
        },
        _child_pid => {
            // Parent: nothing to wait on, the child is reparented to
            // init once it exits. Matches the original's fire-and-forget
            // spawn behaviour.
        }
    }
}
