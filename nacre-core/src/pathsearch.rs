//! Resolution of command names to executable paths.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use crate::results::ExecutionExitCode;

/// Describes why a command name could not be resolved to something executable.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// No executable with this name exists on the search path.
    #[error("{0}: command not found")]
    NotFound(String),

    /// The explicitly given path does not exist.
    #[error("{0}: No such file or directory")]
    NoSuchFile(String),

    /// The explicitly given path names a directory.
    #[error("{0}: Is a directory")]
    IsDirectory(String),

    /// The explicitly given path is not executable.
    #[error("{0}: Permission denied")]
    PermissionDenied(String),
}

impl ResolveError {
    /// Returns the exit code a command that failed to resolve reports.
    pub const fn exit_code(&self) -> ExecutionExitCode {
        match self {
            Self::NotFound(_) | Self::NoSuchFile(_) => ExecutionExitCode::NotFound,
            Self::IsDirectory(_) | Self::PermissionDenied(_) => ExecutionExitCode::CannotExecute,
        }
    }
}

/// Encapsulates the result of a path search.
pub struct ExecutablePathSearch<PI, N>
where
    PI: AsRef<str>,
    N: AsRef<str>,
{
    paths: VecDeque<PI>,
    filename: N,
}

impl<PI, N> Iterator for ExecutablePathSearch<PI, N>
where
    PI: AsRef<str>,
    N: AsRef<str>,
{
    type Item = PathBuf;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(dir) = self.paths.pop_front() {
            // An empty entry names the current directory.
            let dir = match dir.as_ref() {
                "" => ".",
                dir => dir,
            };

            let path = Path::new(dir).join(self.filename.as_ref());
            if path.is_file() && is_executable(&path) {
                return Some(path);
            }
        }

        None
    }
}

/// Search for the given executable name in the provided paths.
///
/// # Arguments
///
/// * `paths` - An iterator over the paths to search.
/// * `filename` - The name of the executable file to search for.
pub fn search_for_executable<P, PI, N>(paths: P, filename: N) -> ExecutablePathSearch<PI, N>
where
    P: Iterator<Item = PI>,
    PI: AsRef<str>,
    N: AsRef<str>,
{
    ExecutablePathSearch {
        paths: paths.collect(),
        filename,
    }
}

/// Resolves a command name to the path of the executable to run.
///
/// Names containing a `/` are used as paths directly; other names are searched for in
/// the directories listed in `search_path`.
///
/// # Arguments
///
/// * `name` - The command name.
/// * `search_path` - The value of `PATH`, if set.
pub fn resolve_command(name: &str, search_path: Option<&str>) -> Result<PathBuf, ResolveError> {
    if name.contains('/') {
        let path = Path::new(name);
        return match path.metadata() {
            Err(_) => Err(ResolveError::NoSuchFile(name.to_owned())),
            Ok(metadata) if metadata.is_dir() => Err(ResolveError::IsDirectory(name.to_owned())),
            Ok(_) if !is_executable(path) => Err(ResolveError::PermissionDenied(name.to_owned())),
            Ok(_) => Ok(path.to_path_buf()),
        };
    }

    if name.is_empty() || name.chars().all(|c| c == '.') {
        return Err(ResolveError::NotFound(name.to_owned()));
    }

    let Some(search_path) = search_path else {
        return Err(ResolveError::NotFound(name.to_owned()));
    };

    search_for_executable(search_path.split(':'), name)
        .next()
        .ok_or_else(|| ResolveError::NotFound(name.to_owned()))
}

fn is_executable(path: &Path) -> bool {
    nix::unistd::access(path, nix::unistd::AccessFlags::X_OK).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use pretty_assertions::assert_eq;
    use std::os::unix::fs::PermissionsExt;

    fn make_file(dir: &Path, name: &str, mode: u32) -> Result<PathBuf> {
        let path = dir.join(name);
        std::fs::write(&path, "#!/bin/sh\n")?;
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(mode))?;
        Ok(path)
    }

    #[test]
    fn searches_path_in_order() -> Result<()> {
        let first = tempfile::tempdir()?;
        let second = tempfile::tempdir()?;
        make_file(first.path(), "tool", 0o644)?;
        let expected = make_file(second.path(), "tool", 0o755)?;

        let search_path = format!(
            "{}:{}",
            first.path().display(),
            second.path().display()
        );
        assert_eq!(resolve_command("tool", Some(&search_path)), Ok(expected));
        Ok(())
    }

    #[test]
    fn not_found_cases() {
        assert_eq!(
            resolve_command("no-such-tool-here", Some("/nonexistent")),
            Err(ResolveError::NotFound("no-such-tool-here".into()))
        );
        assert_eq!(
            resolve_command("ls", None),
            Err(ResolveError::NotFound("ls".into()))
        );
        assert_eq!(
            resolve_command("..", Some("/bin:/usr/bin")),
            Err(ResolveError::NotFound("..".into()))
        );
    }

    #[test]
    fn explicit_paths() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let exe = make_file(dir.path(), "exe", 0o755)?;
        let plain = make_file(dir.path(), "plain", 0o644)?;

        let exe_name = exe.to_string_lossy().into_owned();
        assert_eq!(resolve_command(&exe_name, None), Ok(exe));

        let dir_name = dir.path().to_string_lossy().into_owned();
        let err = resolve_command(&dir_name, None).err();
        assert_eq!(
            err.as_ref().map(ResolveError::exit_code),
            Some(ExecutionExitCode::CannotExecute)
        );

        let missing = format!("{dir_name}/missing");
        assert_eq!(
            resolve_command(&missing, None).map_err(|e| e.to_string()),
            Err(format!("{missing}: No such file or directory"))
        );

        let plain_name = plain.to_string_lossy().into_owned();
        assert_eq!(
            resolve_command(&plain_name, None),
            Err(ResolveError::PermissionDenied(plain_name))
        );
        Ok(())
    }
}
