//! Initialization of the variables the shell maintains on behalf of its children.

use crate::{Shell, error};

const SHLVL_WARNING_THRESHOLD: i64 = 1000;

/// Initializes `SHLVL` and `PWD` in the shell's environment.
///
/// # Arguments
///
/// * `shell` - The shell whose environment should be updated.
pub(crate) fn init_well_known_vars(shell: &mut Shell) -> Result<(), error::Error> {
    // SHLVL
    let (shlvl, warning) = next_shell_level(shell.env().get("SHLVL"));
    if let Some(level) = warning {
        shell.report(format!("warning: shell level ({level}) too high, resetting to 1"));
    }
    shell.env_mut().set("SHLVL", shlvl.to_string());

    //
    // PWD
    //
    // Reflect our actual working directory; the inherited value may be stale.
    //
    let pwd = shell.working_dir().to_string_lossy().into_owned();
    shell.env_mut().set("PWD", pwd);

    Ok(())
}

/// Computes the shell level for a new shell from the inherited value. Also returns the
/// computed level when it was too high and had to be reset.
fn next_shell_level(inherited: Option<&str>) -> (i64, Option<i64>) {
    let current = inherited
        .and_then(|value| value.trim().parse::<i64>().ok())
        .unwrap_or(0);

    if current < 0 {
        return (1, None);
    }
    if current >= i64::from(i32::MAX) {
        return (0, None);
    }

    let next = current + 1;
    if next >= SHLVL_WARNING_THRESHOLD {
        (1, Some(next))
    } else {
        (next, None)
    }
}
