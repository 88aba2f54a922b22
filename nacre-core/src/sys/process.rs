//! Process creation and reaping.

use std::io::Write;
use std::os::fd::{AsFd, AsRawFd, RawFd};

use nix::errno::Errno;
use nix::sys::wait::WaitStatus;
use nix::unistd::{ForkResult, Pid};

use crate::error;

/// Forks the current process.
pub fn fork() -> Result<ForkResult, error::Error> {
    flush_std_streams();

    // SAFETY: the shell is single-threaded, so the child cannot inherit a lock held by
    // another thread.
    match unsafe { nix::unistd::fork() } {
        Ok(result) => Ok(result),
        Err(errno) => Err(error::Error::ChildCreationFailure(errno.to_string())),
    }
}

/// Duplicates `fd` onto the descriptor number `target`.
///
/// # Arguments
///
/// * `fd` - The descriptor to duplicate.
/// * `target` - The descriptor number to duplicate onto.
pub fn dup_onto(fd: impl AsFd, target: RawFd) -> Result<(), error::Error> {
    // SAFETY: `fd` is borrowed for the duration of the call, and dup2 atomically
    // replaces `target`.
    let result = unsafe { nix::libc::dup2(fd.as_fd().as_raw_fd(), target) };
    Errno::result(result)?;
    Ok(())
}

/// Terminates a forked child with the given exit code after flushing standard streams.
///
/// # Arguments
///
/// * `code` - The exit code.
pub fn exit_child(code: u8) -> ! {
    flush_std_streams();
    std::process::exit(i32::from(code))
}

/// Waits for the given child to change state, retrying when interrupted.
///
/// # Arguments
///
/// * `pid` - The child to wait for.
pub fn wait_for(pid: Pid) -> Result<WaitStatus, error::Error> {
    loop {
        match nix::sys::wait::waitpid(pid, None) {
            Err(Errno::EINTR) => (),
            Err(errno) => return Err(errno.into()),
            Ok(status) => return Ok(status),
        }
    }
}

/// Waits for any child to terminate, retrying when interrupted. Returns `None` once
/// there are no children left to reap.
pub fn wait_any() -> Result<Option<WaitStatus>, error::Error> {
    loop {
        match nix::sys::wait::wait() {
            Err(Errno::EINTR) => (),
            Err(Errno::ECHILD) => return Ok(None),
            Err(errno) => return Err(errno.into()),
            Ok(status) => return Ok(Some(status)),
        }
    }
}

/// Returns the id of the current process.
pub fn current_pid() -> u32 {
    std::process::id()
}

fn flush_std_streams() {
    let _ = std::io::stdout().flush();
    let _ = std::io::stderr().flush();
}
