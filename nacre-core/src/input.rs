//! Unbuffered line input that can be interrupted by SIGINT.

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::os::fd::AsFd;

use crate::{error, sys, trace_categories};

/// The outcome of reading one line of input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LineRead {
    /// A line was read; the trailing newline is stripped.
    Line(String),
    /// The end of input was reached with nothing left to read.
    Eof,
    /// The read was interrupted by SIGINT.
    Interrupted,
}

/// Reads one line from `reader`, one byte at a time so that nothing beyond the line is
/// consumed. A final line without a newline is returned as a line.
///
/// # Arguments
///
/// * `reader` - The source to read from.
pub fn read_line_from(reader: &mut impl Read) -> std::io::Result<LineRead> {
    let mut bytes = vec![];
    let mut byte = [0u8; 1];

    loop {
        match reader.read(&mut byte) {
            Ok(0) => {
                if bytes.is_empty() {
                    return Ok(LineRead::Eof);
                }
                break;
            }
            Ok(_) => {
                if byte[0] == b'\n' {
                    break;
                }
                bytes.push(byte[0]);
            }
            Err(err) if err.kind() == ErrorKind::Interrupted => {
                if sys::signal::take_interrupted() {
                    tracing::debug!(target: trace_categories::INPUT, "read interrupted");
                    return Ok(LineRead::Interrupted);
                }
            }
            Err(err) => return Err(err),
        }
    }

    Ok(LineRead::Line(String::from_utf8_lossy(&bytes).into_owned()))
}

/// Returns an unbuffered reader over the process's standard input.
pub fn stdin_reader() -> Result<File, error::Error> {
    let fd = std::io::stdin().as_fd().try_clone_to_owned()?;
    Ok(File::from(fd))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use pretty_assertions::assert_eq;

    #[test]
    fn reads_lines_then_eof() -> Result<()> {
        let mut input: &[u8] = b"first\nsecond\n\nlast";
        assert_eq!(read_line_from(&mut input)?, LineRead::Line("first".into()));
        assert_eq!(read_line_from(&mut input)?, LineRead::Line("second".into()));
        assert_eq!(read_line_from(&mut input)?, LineRead::Line(String::new()));
        assert_eq!(read_line_from(&mut input)?, LineRead::Line("last".into()));
        assert_eq!(read_line_from(&mut input)?, LineRead::Eof);
        Ok(())
    }

    #[test]
    fn does_not_consume_past_line() -> Result<()> {
        let mut input: &[u8] = b"one\ntwo\n";
        read_line_from(&mut input)?;
        assert_eq!(input, b"two\n");
        Ok(())
    }
}
