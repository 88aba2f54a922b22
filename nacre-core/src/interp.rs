//! Execution of pipelines: builtins in the shell process, everything else in forked
//! children connected by pipes.

use std::ffi::CString;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

use nix::errno::Errno;
use nix::sys::signal::Signal;
use nix::sys::wait::WaitStatus;
use nix::unistd::{ForkResult, Pid};

use crate::commands::{Command, Redirection};
use crate::openfiles::{self, OpenFile, OpenFiles};
use crate::pathsearch;
use crate::results::{ExecutionExitCode, ExecutionResult};
use crate::{Shell, builtins, error, sys, trace_categories};

const STDIN_FILENO: i32 = 0;
const STDOUT_FILENO: i32 = 1;

/// Executes the stages of a pipeline and returns the result of its last stage.
///
/// # Arguments
///
/// * `shell` - The shell executing the pipeline.
/// * `commands` - The stages of the pipeline, in order.
pub(crate) fn execute_pipeline(
    shell: &mut Shell,
    mut commands: Vec<Command>,
) -> Result<ExecutionResult, error::Error> {
    if commands.len() == 1 {
        let registration = commands[0]
            .name
            .as_deref()
            .and_then(|name| shell.builtins().get(name))
            .filter(|registration| registration.modifies_shell)
            .cloned();

        if let Some(registration) = registration {
            let command = commands.remove(0);
            return Ok(execute_in_shell(shell, &registration, command));
        }
    }

    spawn_pipeline(shell, commands)
}

fn execute_in_shell(
    shell: &mut Shell,
    registration: &builtins::Registration,
    command: Command,
) -> ExecutionResult {
    if command.is_failed() {
        return ExecutionResult::general_error();
    }

    let Command {
        name,
        args,
        infile,
        outfile,
        ..
    } = command;

    let mut open_files = OpenFiles::default();
    if let Redirection::Open(file) = infile {
        open_files.set_stdin(file);
    }
    if let Redirection::Open(file) = outfile {
        open_files.set_stdout(file);
    }

    let name = name.unwrap_or_default();
    tracing::debug!(target: trace_categories::COMMANDS, "running builtin {name} in shell");
    builtins::invoke(shell, &name, registration, args, open_files)
}

fn spawn_pipeline(
    shell: &mut Shell,
    commands: Vec<Command>,
) -> Result<ExecutionResult, error::Error> {
    let count = commands.len();

    let mut readers: Vec<Option<OpenFile>> = Vec::with_capacity(count);
    let mut writers: Vec<Option<OpenFile>> = Vec::with_capacity(count);
    readers.push(None);
    for _ in 1..count {
        let (reader, writer) = openfiles::pipe()?;
        readers.push(Some(reader));
        writers.push(Some(writer));
    }
    writers.push(None);

    let guard = sys::signal::IgnoreGuard::new()?;

    let mut pids = Vec::with_capacity(count);
    let mut failure = None;

    for index in 0..count {
        let stdin = readers[index].take();
        let stdout = writers[index].take();

        match sys::process::fork() {
            Ok(ForkResult::Child) => {
                drop(readers);
                drop(writers);
                run_stage(shell, commands, index, stdin, stdout)
            }
            Ok(ForkResult::Parent { child }) => {
                tracing::debug!(target: trace_categories::COMMANDS, "stage {index} running as {child}");
                pids.push(child);
            }
            Err(err) => {
                tracing::error!("failed to fork stage {index}: {err}");
                failure = Some(err);
                break;
            }
        }
    }

    // Every pipe end must be closed here so the stages see end-of-file.
    drop(readers);
    drop(writers);
    drop(commands);

    let last_status = reap(&pids);
    drop(guard);

    if let Some(err) = failure {
        return Err(err);
    }

    Ok(ExecutionResult::new(fold_wait_status(last_status?)))
}

/// Waits for exactly the given children, returning the status of the last one.
fn reap(pids: &[Pid]) -> Result<Option<WaitStatus>, error::Error> {
    let mut last_status = None;

    for _ in pids {
        let Some(status) = sys::process::wait_any()? else {
            break;
        };

        if status.pid().is_some() && status.pid() == pids.last().copied() {
            last_status = Some(status);
        }
    }

    Ok(last_status)
}

/// Folds how a stage ended into an exit status, reporting deaths by signal the way
/// interactive shells do.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn fold_wait_status(status: Option<WaitStatus>) -> u8 {
    match status {
        Some(WaitStatus::Exited(_, code)) => (code & 0xff) as u8,
        Some(WaitStatus::Signaled(_, Signal::SIGINT, _)) => {
            eprintln!();
            ExecutionExitCode::Interrupted.into()
        }
        Some(WaitStatus::Signaled(_, Signal::SIGQUIT, core_dumped)) => {
            if core_dumped {
                eprintln!("Quit (core dumped)");
            } else {
                eprintln!("Quit");
            }
            ExecutionExitCode::Quit.into()
        }
        Some(WaitStatus::Signaled(_, signal, _)) => 128u8.wrapping_add(signal as u8),
        _ => ExecutionExitCode::GeneralError.into(),
    }
}

fn run_stage(
    shell: &mut Shell,
    commands: Vec<Command>,
    index: usize,
    stdin: Option<OpenFile>,
    stdout: Option<OpenFile>,
) -> ! {
    let Some(command) = commands.into_iter().nth(index) else {
        sys::process::exit_child(1)
    };

    let code = match run_stage_command(shell, command, stdin, stdout) {
        Ok(code) => code,
        Err(err) => {
            shell.report(&err);
            ExecutionExitCode::GeneralError.into()
        }
    };

    sys::process::exit_child(code)
}

fn run_stage_command(
    shell: &mut Shell,
    command: Command,
    stdin: Option<OpenFile>,
    stdout: Option<OpenFile>,
) -> Result<u8, error::Error> {
    sys::signal::reset_for_child()?;
    shell.enter_subshell();

    if command.is_failed() {
        return Ok(ExecutionExitCode::GeneralError.into());
    }

    let Command {
        name,
        args,
        infile,
        outfile,
        ..
    } = command;

    // File redirections take precedence over pipe ends.
    let input = match infile {
        Redirection::Open(file) => Some(file),
        _ => stdin,
    };
    let output = match outfile {
        Redirection::Open(file) => Some(file),
        _ => stdout,
    };

    if let Some(input) = input {
        sys::process::dup_onto(&input, STDIN_FILENO)?;
    }
    if let Some(output) = output {
        sys::process::dup_onto(&output, STDOUT_FILENO)?;
    }

    let Some(name) = name else {
        return Ok(ExecutionExitCode::Success.into());
    };

    if let Some(registration) = shell.builtins().get(&name).cloned() {
        let result = builtins::invoke(shell, &name, &registration, args, OpenFiles::default());
        return Ok(result.exit_code.into());
    }

    Ok(exec_external(shell, &name, &args))
}

/// Replaces the current process with the named program; only returns on failure, with the
/// exit status to report.
fn exec_external(shell: &Shell, name: &str, args: &[String]) -> u8 {
    let path = match pathsearch::resolve_command(name, shell.env().get("PATH")) {
        Ok(path) => path,
        Err(err) => {
            shell.report(&err);
            return err.exit_code().into();
        }
    };

    let (program, argv, envp) = match prepare_exec(shell, &path, args) {
        Ok(prepared) => prepared,
        Err(err) => {
            shell.report(format!("{name}: {err}"));
            return ExecutionExitCode::CannotExecute.into();
        }
    };

    match nix::unistd::execve(&program, &argv, &envp) {
        Ok(never) => match never {},
        Err(errno) => {
            shell.report(format!("{name}: {}", errno.desc()));
            match errno {
                Errno::ENOENT => ExecutionExitCode::NotFound.into(),
                _ => ExecutionExitCode::CannotExecute.into(),
            }
        }
    }
}

fn prepare_exec(
    shell: &Shell,
    path: &Path,
    args: &[String],
) -> Result<(CString, Vec<CString>, Vec<CString>), error::Error> {
    let program = CString::new(path.as_os_str().as_bytes())?;
    let argv = args
        .iter()
        .map(|arg| CString::new(arg.as_str()))
        .collect::<Result<Vec<_>, _>>()?;
    let envp = shell.env().to_envp()?;

    Ok((program, argv, envp))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn exit_statuses_fold() {
        let pid = Pid::from_raw(1);
        assert_eq!(fold_wait_status(Some(WaitStatus::Exited(pid, 0))), 0);
        assert_eq!(fold_wait_status(Some(WaitStatus::Exited(pid, 4))), 4);
        assert_eq!(
            fold_wait_status(Some(WaitStatus::Signaled(pid, Signal::SIGINT, false))),
            130
        );
        assert_eq!(
            fold_wait_status(Some(WaitStatus::Signaled(pid, Signal::SIGQUIT, true))),
            131
        );
        assert_eq!(
            fold_wait_status(Some(WaitStatus::Signaled(pid, Signal::SIGKILL, false))),
            137
        );
        assert_eq!(fold_wait_status(None), 1);
    }
}
