//! Managing files open within a shell instance.

use std::os::fd::AsFd;

use crate::error;

/// Represents a file open in a shell context.
pub enum OpenFile {
    /// The original standard input this process was started with.
    Stdin(std::io::Stdin),
    /// The original standard output this process was started with.
    Stdout(std::io::Stdout),
    /// The original standard error this process was started with.
    Stderr(std::io::Stderr),
    /// A file open for reading or writing.
    File(std::fs::File),
    /// A read end of a pipe.
    PipeReader(os_pipe::PipeReader),
    /// A write end of a pipe.
    PipeWriter(os_pipe::PipeWriter),
}

impl std::fmt::Debug for OpenFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stdin(_) => f.write_str("stdin"),
            Self::Stdout(_) => f.write_str("stdout"),
            Self::Stderr(_) => f.write_str("stderr"),
            Self::File(file) => write!(f, "file({file:?})"),
            Self::PipeReader(_) => f.write_str("pipe reader"),
            Self::PipeWriter(_) => f.write_str("pipe writer"),
        }
    }
}

impl AsFd for OpenFile {
    fn as_fd(&self) -> std::os::fd::BorrowedFd<'_> {
        match self {
            Self::Stdin(f) => f.as_fd(),
            Self::Stdout(f) => f.as_fd(),
            Self::Stderr(f) => f.as_fd(),
            Self::File(f) => f.as_fd(),
            Self::PipeReader(r) => r.as_fd(),
            Self::PipeWriter(w) => w.as_fd(),
        }
    }
}

impl From<std::fs::File> for OpenFile {
    fn from(file: std::fs::File) -> Self {
        Self::File(file)
    }
}

impl From<os_pipe::PipeReader> for OpenFile {
    fn from(reader: os_pipe::PipeReader) -> Self {
        Self::PipeReader(reader)
    }
}

impl From<os_pipe::PipeWriter> for OpenFile {
    fn from(writer: os_pipe::PipeWriter) -> Self {
        Self::PipeWriter(writer)
    }
}

impl std::io::Read for OpenFile {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self {
            Self::Stdin(f) => f.read(buf),
            Self::Stdout(_) => Err(std::io::Error::other(error::Error::OpenFileNotReadable(
                "stdout",
            ))),
            Self::Stderr(_) => Err(std::io::Error::other(error::Error::OpenFileNotReadable(
                "stderr",
            ))),
            Self::File(f) => f.read(buf),
            Self::PipeReader(reader) => reader.read(buf),
            Self::PipeWriter(_) => Err(std::io::Error::other(error::Error::OpenFileNotReadable(
                "pipe writer",
            ))),
        }
    }
}

impl std::io::Write for OpenFile {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self {
            Self::Stdin(_) => Err(std::io::Error::other(error::Error::OpenFileNotWritable(
                "stdin",
            ))),
            Self::Stdout(f) => f.write(buf),
            Self::Stderr(f) => f.write(buf),
            Self::File(f) => f.write(buf),
            Self::PipeReader(_) => Err(std::io::Error::other(error::Error::OpenFileNotWritable(
                "pipe reader",
            ))),
            Self::PipeWriter(writer) => writer.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdin(_) | Self::PipeReader(_) => Ok(()),
            Self::Stdout(f) => f.flush(),
            Self::Stderr(f) => f.flush(),
            Self::File(f) => f.flush(),
            Self::PipeWriter(writer) => writer.flush(),
        }
    }
}

/// Represents the standard streams of a command running in a shell context.
pub struct OpenFiles {
    stdin: OpenFile,
    stdout: OpenFile,
    stderr: OpenFile,
}

impl Default for OpenFiles {
    fn default() -> Self {
        Self {
            stdin: OpenFile::Stdin(std::io::stdin()),
            stdout: OpenFile::Stdout(std::io::stdout()),
            stderr: OpenFile::Stderr(std::io::stderr()),
        }
    }
}

impl OpenFiles {
    /// Retrieves the file backing standard output in this context.
    pub const fn stdout(&mut self) -> &mut OpenFile {
        &mut self.stdout
    }

    /// Retrieves the file backing standard error in this context.
    pub const fn stderr(&mut self) -> &mut OpenFile {
        &mut self.stderr
    }

    /// Replaces standard input, returning the previous file.
    ///
    /// # Arguments
    ///
    /// * `file` - The file to read standard input from.
    pub fn set_stdin(&mut self, file: OpenFile) -> OpenFile {
        std::mem::replace(&mut self.stdin, file)
    }

    /// Replaces standard output, returning the previous file.
    ///
    /// # Arguments
    ///
    /// * `file` - The file to write standard output to.
    pub fn set_stdout(&mut self, file: OpenFile) -> OpenFile {
        std::mem::replace(&mut self.stdout, file)
    }
}

/// Creates a new pipe, returning its reader and writer ends.
pub fn pipe() -> Result<(OpenFile, OpenFile), error::Error> {
    let (reader, writer) = os_pipe::pipe()?;
    Ok((reader.into(), writer.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use pretty_assertions::assert_eq;
    use std::io::{Read, Write};

    #[test]
    fn pipe_round_trip() -> Result<()> {
        let (mut reader, mut writer) = pipe()?;
        writer.write_all(b"hello")?;
        drop(writer);

        let mut buf = String::new();
        reader.read_to_string(&mut buf)?;
        assert_eq!(buf, "hello");
        Ok(())
    }

    #[test]
    fn wrong_direction_is_error() -> Result<()> {
        let (mut reader, mut writer) = pipe()?;
        assert!(reader.write(b"x").is_err());
        assert!(writer.read(&mut [0u8; 1]).is_err());
        Ok(())
    }

    #[test]
    fn set_replaces_previous() -> Result<()> {
        let mut files = OpenFiles::default();
        let (reader, _writer) = pipe()?;
        let previous = files.set_stdin(reader);
        assert!(matches!(previous, OpenFile::Stdin(_)));
        let current = files.set_stdin(previous);
        assert!(matches!(current, OpenFile::PipeReader(_)));
        Ok(())
    }
}
