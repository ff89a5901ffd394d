//! Subprocess execution utilities.

use std::ffi::OsStr;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use anyhow::{bail, Context, Result};

use crate::core::BruError;

/// Builder for subprocess execution.
#[derive(Debug, Clone)]
pub struct ProcessBuilder {
    program: PathBuf,
    args: Vec<String>,
    cwd: Option<PathBuf>,
    stdin: Option<Vec<u8>>,
}

impl ProcessBuilder {
    /// Create a new process builder for the given program.
    pub fn new(program: impl AsRef<Path>) -> Self {
        ProcessBuilder {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
            cwd: None,
            stdin: None,
        }
    }

    /// Run `command` through the host shell (`sh -c` or `cmd /C`).
    pub fn shell(command: &str) -> Self {
        if cfg!(windows) {
            ProcessBuilder::new("cmd").args(["/C", command])
        } else {
            ProcessBuilder::new("sh").args(["-c", command])
        }
    }

    /// Add a single argument.
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_string_lossy().into_owned());
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args.extend(
            args.into_iter()
                .map(|s| s.as_ref().to_string_lossy().into_owned()),
        );
        self
    }

    /// Set the working directory.
    pub fn cwd(mut self, cwd: impl AsRef<Path>) -> Self {
        self.cwd = Some(cwd.as_ref().to_path_buf());
        self
    }

    /// Set stdin data. The pipe is closed after the data is written.
    pub fn stdin(mut self, data: impl Into<Vec<u8>>) -> Self {
        self.stdin = Some(data.into());
        self
    }

    /// Get the arguments.
    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    fn build_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);

        if let Some(ref cwd) = self.cwd {
            cmd.current_dir(cwd);
        }

        cmd
    }

    /// Execute with inherited stdout/stderr and return the exit status.
    pub fn status(&self) -> Result<ExitStatus> {
        let mut cmd = self.build_command();

        let Some(ref stdin_data) = self.stdin else {
            return cmd
                .status()
                .with_context(|| format!("failed to execute `{}`", self.display_command()));
        };

        cmd.stdin(Stdio::piped());
        let mut child = cmd
            .spawn()
            .with_context(|| format!("failed to spawn `{}`", self.display_command()))?;

        // Dropping the handle closes the pipe so the child sees end-of-input.
        // A child may exit without reading everything; its exit status
        // still decides the outcome.
        if let Some(mut stdin) = child.stdin.take() {
            if let Err(e) = stdin.write_all(stdin_data) {
                if e.kind() != ErrorKind::BrokenPipe {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(e).with_context(|| {
                        format!("failed to write stdin of `{}`", self.display_command())
                    });
                }
            }
        }

        child
            .wait()
            .with_context(|| format!("failed to wait for `{}`", self.display_command()))
    }

    /// Execute with inherited stdio and require a zero exit code.
    pub fn status_checked(&self) -> Result<()> {
        let status = self.status()?;
        if !status.success() {
            bail!(BruError::CommandFailed {
                command: self.display_command(),
                code: status.code(),
            });
        }
        Ok(())
    }

    /// Display the command for error messages.
    pub fn display_command(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

/// Find an executable in PATH.
pub fn find_executable(name: &str) -> Option<PathBuf> {
    which::which(name).ok()
}

/// Resolve a tool by name, falling back to the bare name so the spawn error
/// names the missing tool.
pub fn tool(name: &str) -> PathBuf {
    find_executable(name).unwrap_or_else(|| PathBuf::from(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_command() {
        let pb = ProcessBuilder::new("git").args(["clone", "https://example.com/x.git", "x"]);
        assert_eq!(pb.display_command(), "git clone https://example.com/x.git x");
    }

    #[cfg(unix)]
    #[test]
    fn test_shell_status_checked() {
        assert!(ProcessBuilder::shell("exit 0").status_checked().is_ok());

        let err = ProcessBuilder::shell("exit 3").status_checked().unwrap_err();
        match err.downcast_ref::<BruError>() {
            Some(BruError::CommandFailed { code, .. }) => assert_eq!(*code, Some(3)),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_stdin_is_piped_and_closed() {
        // `read` fails once stdin hits EOF without the expected line.
        let pb = ProcessBuilder::shell("read line && test \"$line\" = hello").stdin("hello\n");
        assert!(pb.status().unwrap().success());

        let pb = ProcessBuilder::new("cat").stdin("abc");
        assert!(pb.status().unwrap().success());
    }

    #[cfg(unix)]
    #[test]
    fn test_unread_stdin_does_not_fail_the_run() {
        let input = vec![b'x'; 1 << 20];

        let status = ProcessBuilder::shell("exit 0").stdin(input.clone()).status().unwrap();
        assert!(status.success());

        let status = ProcessBuilder::shell("exit 4").stdin(input).status().unwrap();
        assert_eq!(status.code(), Some(4));
    }
}
