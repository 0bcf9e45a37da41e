//! External command execution.
//!
//! Commands run through `sh -c` in a chosen working directory, blocking
//! until completion; there is no timeout. Template placeholders `{{path}}`,
//! `{{fileName}}` and `{{dir}}` are substituted with shell-quoted values
//! before execution.

use crate::error::{Error, Result};
use std::path::Path;
use std::process::Command;

/// Synchronous shell command runner.
#[derive(Debug, Default)]
pub struct ShellRunner;

impl ShellRunner {
    pub fn new() -> Self {
        ShellRunner
    }

    /// Run a command in `dir`, returning captured stdout.
    ///
    /// A non-zero exit status is an [`Error::Command`] carrying the captured
    /// stderr.
    pub fn run(&self, command: &str, dir: &Path) -> Result<String> {
        tracing::debug!("running {:?} in {}", command, dir.display());
        let output = Command::new("sh")
            .arg("-c")
            .arg(command)
            .current_dir(dir)
            .output()?;
        if !output.status.success() {
            return Err(Error::Command {
                command: command.to_string(),
                status: output.status.code().unwrap_or(-1),
                dir: dir.to_path_buf(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Quote a value for POSIX `sh`.
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

/// Substitute `{{path}}`, `{{fileName}}` and `{{dir}}` placeholders with
/// quoted values derived from the resolved file path.
pub fn substitute(command: &str, file_path: &Path) -> String {
    let path = file_path.display().to_string();
    let file_name = file_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    let dir = file_path
        .parent()
        .map(|d| d.display().to_string())
        .unwrap_or_default();
    command
        .replace("{{path}}", &shell_quote(&path))
        .replace("{{fileName}}", &shell_quote(file_name))
        .replace("{{dir}}", &shell_quote(&dir))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_run_captures_stdout() {
        let dir = TempDir::new().unwrap();
        let out = ShellRunner::new().run("echo hello", dir.path()).unwrap();
        assert_eq!(out, "hello\n");
    }

    #[test]
    fn test_run_surfaces_failure() {
        let dir = TempDir::new().unwrap();
        let err = ShellRunner::new().run("exit 3", dir.path()).unwrap_err();
        match err {
            crate::error::Error::Command { status, .. } => assert_eq!(status, 3),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_quote_escapes_single_quotes() {
        assert_eq!(shell_quote("a'b"), r"'a'\''b'");
    }

    #[test]
    fn test_substitute_placeholders() {
        let cmd = substitute("open {{path}} in {{dir}} as {{fileName}}", Path::new("/w/a/b.md"));
        assert_eq!(cmd, "open '/w/a/b.md' in '/w/a' as 'b.md'");
    }
}
