//! Raw help capture through an external program

use crate::source::HelpConfig;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Runs the configured help program for one command at a time
#[derive(Debug, Clone)]
pub struct HelpProvider {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl HelpProvider {
    /// `{command}` in any argument is replaced with the command name
    pub fn new(program: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args,
            timeout,
        }
    }

    pub fn from_config(config: &HelpConfig) -> Self {
        Self::new(
            config.program.clone(),
            config.args.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    fn args_for(&self, command: &str) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| arg.replace("{command}", command))
            .collect()
    }

    /// Capture the raw help dump of a command
    ///
    /// Returns `None` when the program is missing, fails, prints nothing
    /// or runs past the timeout. A timed-out child is killed.
    pub async fn fetch(&self, command: &str) -> Option<String> {
        let child = Command::new(&self.program)
            .args(self.args_for(command))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn();

        let child = match child {
            Ok(child) => child,
            Err(e) => {
                tracing::warn!("Failed to start {}: {}", self.program, e);
                return None;
            }
        };

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                tracing::warn!("Help capture for {} failed: {}", command, e);
                return None;
            }
            Err(_) => {
                tracing::warn!(
                    "Help capture for {} timed out after {:?}",
                    command,
                    self.timeout
                );
                return None;
            }
        };

        if !output.status.success() {
            tracing::debug!(
                "Help program exited with {} for {}: {}",
                output.status,
                command,
                String::from_utf8_lossy(&output.stderr).trim()
            );
            return None;
        }

        let text = String::from_utf8_lossy(&output.stdout).to_string();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}
