use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Outcome of running one shell command.
///
/// Every failure mode is absorbed into this value: a non-zero exit status
/// and a failed spawn both come back as `succeeded == false` with a
/// human-readable message in `output`. The executor never returns an error
/// to its caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub succeeded: bool,
    pub output: String,
}

impl ExecutionResult {
    /// One-line status word used in log entries and display
    pub fn status_word(&self) -> &'static str {
        if self.succeeded {
            "succeeded"
        } else {
            "failed"
        }
    }
}

/// Runs commands through the platform shell with captured output
pub struct ShellExecutor {
    working_dir: PathBuf,
}

impl ShellExecutor {
    /// Executor rooted at the process's current directory
    pub fn new() -> Self {
        Self {
            working_dir: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }

    pub fn with_working_dir(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
        }
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Run `command` through the shell exactly once and wait for it to
    /// finish. Zero exit status yields stdout; anything else yields a
    /// message embedding the exit code and stderr.
    pub async fn execute(&self, command: &str) -> ExecutionResult {
        let output = if cfg!(target_os = "windows") {
            Command::new("cmd")
                .args(["/C", command])
                .current_dir(&self.working_dir)
                .output()
                .await
        } else {
            Command::new("sh")
                .args(["-c", command])
                .current_dir(&self.working_dir)
                .output()
                .await
        };

        match output {
            Ok(output) if output.status.success() => ExecutionResult {
                succeeded: true,
                output: String::from_utf8_lossy(&output.stdout).into_owned(),
            },
            Ok(output) => {
                let code = output
                    .status
                    .code()
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "signal".to_string());
                let stderr = String::from_utf8_lossy(&output.stderr);
                ExecutionResult {
                    succeeded: false,
                    output: format!("Error (code {}):\n{}", code, stderr),
                }
            }
            Err(e) => ExecutionResult {
                succeeded: false,
                output: format!("Failed to execute command: {}", e),
            },
        }
    }
}

impl Default for ShellExecutor {
    fn default() -> Self {
        Self::new()
    }
}
