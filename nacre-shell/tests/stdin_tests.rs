//! Tests for input that spans lines: here-documents and history.

#![cfg(unix)]

use std::path::Path;

use anyhow::Result;
use pretty_assertions::assert_eq;

fn run_in(dir: &Path, input: &str) -> Result<std::process::Output> {
    Ok(
        assert_cmd::Command::new(assert_cmd::cargo::cargo_bin!("nacre"))
            .current_dir(dir)
            .env("XDG_CONFIG_HOME", dir.join(".config"))
            .env("NAME", "world")
            .write_stdin(input)
            .output()?,
    )
}

fn leftover_heredocs(dir: &Path) -> Result<Vec<String>> {
    let mut names = vec![];
    for entry in std::fs::read_dir(dir)? {
        let name = entry?.file_name().to_string_lossy().into_owned();
        if name.starts_with(".heredoc_") {
            names.push(name);
        }
    }
    Ok(names)
}

#[test]
fn heredoc_expands_unquoted() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let output = run_in(dir.path(), "cat << EOF\nhello $NAME\n  'kept'\nEOF\necho after\n")?;

    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "hello world\n  'kept'\nafter\n"
    );
    assert!(leftover_heredocs(dir.path())?.is_empty());
    Ok(())
}

#[test]
fn heredoc_quoted_limiter_is_verbatim() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let output = run_in(dir.path(), "cat << 'EOF'\nhello $NAME\nEOF\ncat << E\"N\"D\n$NAME\nEND\n")?;

    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "hello $NAME\n$NAME\n"
    );
    Ok(())
}

#[test]
fn multiple_heredocs_last_wins() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let output = run_in(dir.path(), "cat << A << B\nfirst\nA\nsecond\nB\n")?;

    assert_eq!(String::from_utf8_lossy(&output.stdout), "second\n");
    assert!(leftover_heredocs(dir.path())?.is_empty());
    Ok(())
}

#[test]
fn heredoc_feeds_pipeline() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let output = run_in(dir.path(), "cat << EOF | grep b\na\nb\nc\nEOF\n")?;

    assert_eq!(String::from_utf8_lossy(&output.stdout), "b\n");
    Ok(())
}

#[test]
fn heredoc_at_end_of_input() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let output = run_in(dir.path(), "cat << EOF\nunterminated\n")?;

    assert_eq!(String::from_utf8_lossy(&output.stdout), "unterminated\n");
    assert!(
        String::from_utf8_lossy(&output.stderr)
            .contains("warning: here-document delimited by end-of-file (wanted `EOF')")
    );
    Ok(())
}

#[test]
fn too_many_heredocs() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let line = format!("cat{}\necho $?\n", " << X".repeat(17));
    let output = run_in(dir.path(), &line)?;

    assert_eq!(String::from_utf8_lossy(&output.stdout), "2\n");
    assert!(
        String::from_utf8_lossy(&output.stderr)
            .contains("maximum here-document count exceeded")
    );
    Ok(())
}

#[test]
fn history_is_persisted() -> Result<()> {
    let dir = tempfile::tempdir()?;
    run_in(dir.path(), "echo one\n\necho two\necho two\n")?;

    let saved = std::fs::read_to_string(dir.path().join(".nacre_history"))?;
    assert_eq!(saved, "echo one\necho two\n");

    let output = run_in(dir.path(), "history\n")?;
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "    1  echo one\n    2  echo two\n    3  history\n"
    );

    let output = run_in(dir.path(), "history -c\nhistory\n")?;
    assert_eq!(String::from_utf8_lossy(&output.stdout), "    1  history\n");
    Ok(())
}

#[test]
fn history_file_from_config() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let config_dir = dir.path().join(".config").join("nacre");
    std::fs::create_dir_all(&config_dir)?;
    std::fs::write(
        config_dir.join("config.toml"),
        "[history]\nfile = \"custom_history\"\nmax_entries = 2\n",
    )?;

    run_in(dir.path(), "echo a\necho b\necho c\n")?;

    let saved = std::fs::read_to_string(dir.path().join("custom_history"))?;
    assert_eq!(saved, "echo b\necho c\n");
    assert!(!dir.path().join(".nacre_history").exists());
    Ok(())
}
