//! End-to-end tests that run the `nacre` binary with scripted standard input.

#![cfg(unix)]

use std::path::Path;

use anyhow::Result;
use pretty_assertions::assert_eq;

struct Run {
    stdout: String,
    stderr: String,
    code: Option<i32>,
}

/// Runs the shell in `dir` with the given input, isolated from the user's configuration.
fn run_in(dir: &Path, input: &str, envs: &[(&str, &str)]) -> Run {
    let mut cmd = assert_cmd::Command::new(assert_cmd::cargo::cargo_bin!("nacre"));
    cmd.current_dir(dir)
        .env("XDG_CONFIG_HOME", dir.join(".config"))
        .env_remove("NACRE_LOG")
        .env_remove("OLDPWD")
        .write_stdin(input);
    for (name, value) in envs {
        cmd.env(name, value);
    }

    let output = cmd.output();
    match output {
        Ok(output) => Run {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            code: output.status.code(),
        },
        Err(err) => Run {
            stdout: String::new(),
            stderr: err.to_string(),
            code: None,
        },
    }
}

fn run(input: &str) -> Result<Run> {
    let dir = tempfile::tempdir()?;
    Ok(run_in(dir.path(), input, &[]))
}

#[test]
fn rejects_arguments() {
    assert_cmd::Command::new(assert_cmd::cargo::cargo_bin!("nacre"))
        .arg("script.sh")
        .assert()
        .code(1)
        .stderr("nacre: usage: nacre (no arguments accepted)\n");
}

#[test]
fn echo_and_quoting() -> Result<()> {
    let result = run("echo hello   world\necho 'a  b'\necho \"x\"'y'z\necho -n no newline\n")?;
    assert_eq!(result.stdout, "hello world\na  b\nxyz\nno newline");
    assert_eq!(result.code, Some(0));
    Ok(())
}

#[test]
fn variable_expansion_splits_unquoted() -> Result<()> {
    let result = run("export X=\"a   b\"\necho $X\necho \"$X\"\necho '$X'\necho x${}$NOPE_NOT_SET.\n")?;
    let lines: Vec<&str> = result.stdout.lines().collect();
    assert_eq!(lines[0], "a b");
    assert_eq!(lines[1], "a   b");
    assert_eq!(lines[2], "$X");
    Ok(())
}

#[test]
fn exit_status_tracking() -> Result<()> {
    let result = run("false\necho $?\ntrue | false\necho $?\nfalse | true\necho $?\n")?;
    assert_eq!(result.stdout, "1\n1\n0\n");
    Ok(())
}

#[test]
fn pipelines_connect_stages() -> Result<()> {
    let result = run("printf 'a\\nb\\nc\\n' | grep b\necho $?\necho one | cat | cat\n")?;
    assert_eq!(result.stdout, "b\n0\none\n");
    Ok(())
}

#[test]
fn ambiguous_redirect() -> Result<()> {
    let result = run("export X=\"a b\"\ncat < $X\necho $?\n")?;
    assert!(result.stderr.contains("$X: ambiguous redirect"), "{}", result.stderr);
    assert_eq!(result.stdout, "1\n");
    Ok(())
}

#[test]
fn file_redirections() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let result = run_in(
        dir.path(),
        "echo first > out.txt\necho second >> out.txt\ncat < out.txt\n< out.txt cat > copy.txt\n",
        &[],
    );
    assert_eq!(result.stdout, "first\nsecond\n");
    assert_eq!(
        std::fs::read_to_string(dir.path().join("copy.txt"))?,
        "first\nsecond\n"
    );
    Ok(())
}

#[test]
fn missing_input_file() -> Result<()> {
    let result = run("cat < missing.txt\necho $?\n")?;
    assert!(result.stderr.contains("missing.txt: No such file or directory"));
    assert_eq!(result.stdout, "1\n");
    Ok(())
}

#[test]
fn command_resolution_errors() -> Result<()> {
    let result = run("no_such_command_nacre\necho $?\n/\necho $?\n./missing\necho $?\n")?;
    assert_eq!(result.stdout, "127\n126\n127\n");
    assert!(result.stderr.contains("no_such_command_nacre: command not found"));
    assert!(result.stderr.contains("/: Is a directory"));
    assert!(result.stderr.contains("./missing: No such file or directory"));
    Ok(())
}

#[test]
fn syntax_errors_continue() -> Result<()> {
    let result = run("echo |\necho $?\necho 'open\necho after\n")?;
    assert_eq!(result.stdout, "2\nafter\n");
    assert!(result.stderr.contains("syntax error near unexpected token"));
    Ok(())
}

#[test]
fn subshells_rejected() -> Result<()> {
    let result = run("(echo hi)\necho $?\n")?;
    assert_eq!(result.stdout, "2\n");
    Ok(())
}

#[test]
fn exit_codes() -> Result<()> {
    assert_eq!(run("exit 260\necho unreachable\n")?.code, Some(4));
    assert_eq!(run("false\n")?.code, Some(1));

    let result = run("exit abc\n")?;
    assert_eq!(result.code, Some(2));
    assert!(result.stderr.contains("exit: abc: numeric argument required"));

    let result = run("exit 1 2\necho still here\n")?;
    assert_eq!(result.stdout, "still here\n");
    assert!(result.stderr.contains("exit: too many arguments"));
    Ok(())
}

#[test]
fn exit_in_pipeline_does_not_exit() -> Result<()> {
    let result = run("exit 3 | true\necho alive\n")?;
    assert_eq!(result.stdout, "alive\n");
    assert_eq!(result.code, Some(0));
    Ok(())
}

#[test]
fn non_interactive_eof_is_quiet() -> Result<()> {
    let result = run("echo done\n")?;
    assert!(!result.stderr.contains("exit"));
    assert!(!result.stderr.contains("nacre$"));
    Ok(())
}

#[test]
fn cd_maintains_pwd_and_oldpwd() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let a = dir.path().join("a");
    let b = dir.path().join("b");
    std::fs::create_dir(&a)?;
    std::fs::create_dir(&b)?;

    let script = format!(
        "cd {}\ncd {}\necho $OLDPWD $PWD\ncd -\npwd\n",
        a.display(),
        b.display()
    );
    let result = run_in(dir.path(), &script, &[]);

    let expected = format!(
        "{a} {b}\n{a}\n{a}\n",
        a = a.display(),
        b = b.display()
    );
    assert_eq!(result.stdout, expected);
    Ok(())
}

#[test]
fn cd_errors() -> Result<()> {
    let dir = tempfile::tempdir()?;
    std::fs::write(dir.path().join("file"), "")?;

    let result = run_in(
        dir.path(),
        "cd a b\necho $?\ncd missing\necho $?\ncd file\necho $?\ncd -\necho $?\n",
        &[],
    );
    assert_eq!(result.stdout, "1\n1\n1\n1\n");
    assert!(result.stderr.contains("cd: too many arguments"));
    assert!(result.stderr.contains("cd: missing: No such file or directory"));
    assert!(result.stderr.contains("cd: file: Not a directory"));
    assert!(result.stderr.contains("cd: OLDPWD not set"));
    Ok(())
}

#[test]
fn cd_home_and_tilde() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let home = dir.path().join("home");
    std::fs::create_dir(&home)?;
    let home = home.to_string_lossy().into_owned();

    let result = run_in(dir.path(), "echo ~ ~/x '~'\ncd\npwd\n", &[("HOME", &home)]);
    assert_eq!(result.stdout, format!("{home} {home}/x ~\n{home}\n"));
    Ok(())
}

#[test]
fn export_unset_and_env() -> Result<()> {
    let result = run("export B=2 A=1 EMPTY\nexport 1X=3\necho $?\nunset A\necho x$A\nenv\n")?;
    assert!(result.stderr.contains("export: `1X=3': not a valid identifier"));

    let lines: Vec<&str> = result.stdout.lines().collect();
    assert_eq!(lines[0], "1");
    assert_eq!(lines[1], "x");
    assert!(lines.contains(&"B=2"));
    assert!(!lines.iter().any(|line| line.starts_with("A=")));
    assert!(!lines.iter().any(|line| line.starts_with("EMPTY")));
    Ok(())
}

#[test]
fn export_display_is_sorted() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let mut cmd = assert_cmd::Command::new(assert_cmd::cargo::cargo_bin!("nacre"));
    let output = cmd
        .current_dir(dir.path())
        .env_clear()
        .env("ZED", "last")
        .env("ALPHA", "first")
        .env("XDG_CONFIG_HOME", dir.path())
        .write_stdin("export MARKED\nexport\n")
        .output()?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();

    let mut sorted = lines.clone();
    sorted.sort_unstable();
    assert_eq!(lines, sorted);

    assert!(lines.contains(&"declare -x ALPHA=\"first\""));
    assert!(lines.contains(&"declare -x MARKED"));
    assert!(lines.contains(&"declare -x SHLVL=\"1\""));
    Ok(())
}

#[test]
fn shell_level_increments() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let result = run_in(dir.path(), "echo $SHLVL\n", &[("SHLVL", "5")]);
    assert_eq!(result.stdout, "6\n");

    let result = run_in(dir.path(), "echo $SHLVL\n", &[("SHLVL", "999")]);
    assert_eq!(result.stdout, "1\n");
    assert!(result.stderr.contains("warning: shell level (1000) too high, resetting to 1"));
    Ok(())
}

#[test]
fn special_parameters() -> Result<()> {
    let result = run("echo $$\necho $1x\necho $\necho a$\"b\"\n")?;
    let lines: Vec<&str> = result.stdout.lines().collect();
    assert!(!lines[0].is_empty() && lines[0].chars().all(|c| c.is_ascii_digit()));
    assert_eq!(&lines[1..], ["x", "$", "ab"]);
    Ok(())
}

#[test]
fn child_environment() -> Result<()> {
    let result = run("export GREETING=hi\nprintenv GREETING\n")?;
    assert_eq!(result.stdout, "hi\n");
    Ok(())
}

#[test]
fn builtins_in_pipelines() -> Result<()> {
    let result = run("echo piped | cat\npwd | cat > /dev/null\nenv | grep -c '^PWD='\n")?;
    assert_eq!(result.stdout, "piped\n1\n");
    Ok(())
}

#[test]
fn single_external_stage_runs() -> Result<()> {
    let result = run("/bin/echo ext\n/bin/sh -c 'exit 5'\necho $?\n")?;
    assert_eq!(result.stdout, "ext\n5\n");
    Ok(())
}

#[test]
fn children_killed_by_signals() -> Result<()> {
    let result = run("/bin/sh -c 'kill -INT $$'\necho $?\n")?;
    assert_eq!(result.stdout, "130\n");
    assert_eq!(result.stderr, "\n");

    let result = run("/bin/sh -c 'kill -QUIT $$'\necho $?\n")?;
    assert_eq!(result.stdout, "131\n");
    assert!(result.stderr.starts_with("Quit"), "{}", result.stderr);

    let result = run("/bin/sh -c 'kill -TERM $$'\necho $?\n")?;
    assert_eq!(result.stdout, "143\n");
    Ok(())
}

#[test]
fn broken_pipes_end_writers_quietly() -> Result<()> {
    let result = run("yes | head -n 1\necho $?\ncat /dev/zero | head -c 3 | wc -c\n")?;
    let lines: Vec<&str> = result.stdout.lines().map(str::trim).collect();
    assert_eq!(lines, ["y", "0", "3"]);
    assert_eq!(result.stderr, "");
    Ok(())
}

#[test]
fn interrupted_heredoc_abandons_line() -> Result<()> {
    use std::io::Write;
    use std::os::unix::process::CommandExt;
    use std::process::Stdio;

    let dir = tempfile::tempdir()?;
    let mut child = std::process::Command::new(assert_cmd::cargo::cargo_bin!("nacre"))
        .current_dir(dir.path())
        .env("XDG_CONFIG_HOME", dir.path().join(".config"))
        .env_remove("NACRE_LOG")
        .process_group(0)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    let mut stdin = child.stdin.take().ok_or_else(|| anyhow::anyhow!("no stdin"))?;
    stdin.write_all(b"cat << EOF\nbody line\n")?;
    stdin.flush()?;
    std::thread::sleep(std::time::Duration::from_millis(500));

    // Deliver SIGINT to the shell and its here-document helper, as a terminal would.
    let status = std::process::Command::new("kill")
        .args(["-INT", "--", &format!("-{}", child.id())])
        .status()?;
    assert!(status.success());
    std::thread::sleep(std::time::Duration::from_millis(200));

    stdin.write_all(b"echo $?\n")?;
    drop(stdin);

    let output = child.wait_with_output()?;
    assert_eq!(String::from_utf8_lossy(&output.stdout), "130\n");
    Ok(())
}
