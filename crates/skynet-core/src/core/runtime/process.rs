use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};

use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct RunOutput {
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl RunOutput {
    #[must_use]
    pub fn success(&self) -> bool {
        self.code == 0
    }
}

/// Execute a program and capture stdout/stderr in full.
///
/// # Errors
///
/// Returns an error when the program cannot be spawned.
pub fn run_command(
    program: &str,
    args: &[String],
    envs: &[(String, String)],
    cwd: &Path,
) -> Result<RunOutput> {
    let output = configured_command(program, args, envs, cwd)
        .stdin(Stdio::null())
        .output()
        .with_context(|| format!("failed to start {program}"))?;
    Ok(RunOutput {
        code: exit_code(output.status),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

/// Execute a program with inherited stdio, the way a Makefile recipe would.
///
/// # Errors
///
/// Returns an error when the program cannot be spawned.
pub fn run_command_passthrough(
    program: &str,
    args: &[String],
    envs: &[(String, String)],
    cwd: &Path,
) -> Result<RunOutput> {
    let status = configured_command(program, args, envs, cwd)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .with_context(|| format!("failed to start {program}"))?;
    Ok(RunOutput {
        code: exit_code(status),
        stdout: String::new(),
        stderr: String::new(),
    })
}

fn configured_command(
    program: &str,
    args: &[String],
    envs: &[(String, String)],
    cwd: &Path,
) -> Command {
    let mut command = Command::new(program);
    command.args(args);
    for (key, value) in envs {
        command.env(key, value);
    }
    command.current_dir(cwd);
    command
}

/// Exit code as a shell reports it: `128 + signal` for a killed process.
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn sh(script: &str) -> Vec<String> {
        vec!["-c".to_string(), script.to_string()]
    }

    #[cfg(unix)]
    #[test]
    fn run_command_captures_output_and_status_unix() -> Result<()> {
        let output = run_command(
            "/bin/sh",
            &sh("printf out && printf err >&2; exit 7"),
            &[],
            Path::new("."),
        )?;
        assert_eq!(output.code, 7);
        assert!(!output.success());
        assert_eq!(output.stdout, "out");
        assert_eq!(output.stderr, "err");
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn run_command_keeps_every_line_unix() -> Result<()> {
        let output = run_command("/bin/sh", &sh("seq 1 20000"), &[], Path::new("."))?;
        let lines: Vec<&str> = output.stdout.lines().collect();
        assert_eq!(lines.len(), 20000);
        assert_eq!(lines[0], "1");
        assert_eq!(lines[19999], "20000");
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn run_command_passes_environment_unix() -> Result<()> {
        let output = run_command(
            "/bin/sh",
            &sh("printf \"$PYTHONPATH\""),
            &[("PYTHONPATH".into(), "/tmp/project".into())],
            Path::new("."),
        )?;
        assert_eq!(output.stdout, "/tmp/project");
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn run_command_passthrough_returns_status_unix() -> Result<()> {
        let output = run_command_passthrough("/bin/sh", &sh("exit 4"), &[], Path::new("."))?;
        assert_eq!(output.code, 4);
        assert!(output.stdout.is_empty());
        assert!(output.stderr.is_empty());
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn killed_process_reports_signal_code_unix() -> Result<()> {
        let output = run_command_passthrough("/bin/sh", &sh("kill -TERM $$"), &[], Path::new("."))?;
        assert_eq!(output.code, 128 + 15);
        let output = run_command("/bin/sh", &sh("kill -KILL $$"), &[], Path::new("."))?;
        assert_eq!(output.code, 128 + 9);
        Ok(())
    }

    #[test]
    fn run_command_reports_missing_program() {
        let err = run_command(
            "skynet-definitely-not-a-real-program",
            &[],
            &[],
            Path::new("."),
        )
        .unwrap_err();
        assert!(err.to_string().contains("failed to start"));
    }
}
