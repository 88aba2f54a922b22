//! Signal dispositions and the interrupt flag.

use std::sync::atomic::{AtomicBool, Ordering};

use nix::sys::signal::{SaFlags, SigAction, SigHandler, SigSet, Signal, sigaction};

use crate::error;

static INTERRUPTED: AtomicBool = AtomicBool::new(false);

extern "C" fn on_interrupt(_signal: nix::libc::c_int) {
    INTERRUPTED.store(true, Ordering::SeqCst);
}

fn set_disposition(signal: Signal, handler: SigHandler) -> Result<SigAction, error::Error> {
    // No SA_RESTART: a blocked read must return EINTR.
    let action = SigAction::new(handler, SaFlags::empty(), SigSet::empty());

    // SAFETY: the only handler ever installed stores to an atomic, which is
    // async-signal-safe.
    let previous = unsafe { sigaction(signal, &action) }?;
    Ok(previous)
}

/// Installs the dispositions used while the shell waits for input: SIGINT raises the
/// interrupt flag and SIGQUIT is ignored.
pub fn install_interactive_handlers() -> Result<(), error::Error> {
    set_disposition(Signal::SIGINT, SigHandler::Handler(on_interrupt))?;
    set_disposition(Signal::SIGQUIT, SigHandler::SigIgn)?;
    Ok(())
}

/// Installs the dispositions used while capturing a here-document: SIGINT raises the
/// interrupt flag.
pub fn install_heredoc_handlers() -> Result<(), error::Error> {
    INTERRUPTED.store(false, Ordering::SeqCst);
    set_disposition(Signal::SIGINT, SigHandler::Handler(on_interrupt))?;
    set_disposition(Signal::SIGQUIT, SigHandler::SigIgn)?;
    Ok(())
}

/// Restores default dispositions for SIGINT, SIGQUIT and SIGPIPE; used by child
/// processes before they run a command. SIGPIPE is ignored by the Rust runtime and the
/// ignored disposition would otherwise survive `execve`.
pub fn reset_for_child() -> Result<(), error::Error> {
    for signal in [Signal::SIGINT, Signal::SIGQUIT, Signal::SIGPIPE] {
        set_disposition(signal, SigHandler::SigDfl)?;
    }
    Ok(())
}

/// Returns whether an interrupt was received since the last call, clearing the flag.
pub fn take_interrupted() -> bool {
    INTERRUPTED.swap(false, Ordering::SeqCst)
}

/// Ignores SIGINT and SIGQUIT for as long as the guard lives; the previous dispositions
/// are restored when it is dropped.
pub struct IgnoreGuard {
    previous: Vec<(Signal, SigAction)>,
}

impl IgnoreGuard {
    /// Starts ignoring SIGINT and SIGQUIT.
    pub fn new() -> Result<Self, error::Error> {
        let mut guard = Self { previous: vec![] };
        for signal in [Signal::SIGINT, Signal::SIGQUIT] {
            let previous = set_disposition(signal, SigHandler::SigIgn)?;
            guard.previous.push((signal, previous));
        }
        Ok(guard)
    }
}

impl Drop for IgnoreGuard {
    fn drop(&mut self) {
        for (signal, action) in self.previous.drain(..).rev() {
            // SAFETY: restores an action previously returned by sigaction.
            if let Err(err) = unsafe { sigaction(signal, &action) } {
                tracing::warn!("failed to restore {signal} disposition: {err}");
            }
        }
    }
}
