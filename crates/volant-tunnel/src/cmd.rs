//! External process helpers.
//!
//! Every interaction with the WireGuard driver goes through these wrappers so
//! that command lines are logged uniformly at debug level and failures carry
//! the tool's own output back to the caller. Human-facing lifecycle messages
//! are logged by the strategies themselves, which know what the command means.

use std::process::Command;

use crate::error::{Result, TunnelError};

/// Execute a command and return its trimmed stdout.
pub fn run_capture(program: &str, args: &[&str]) -> Result<String> {
    let cmd_line = format!("{program} {}", args.join(" "));
    tracing::debug!("exec (capture): {cmd_line}");

    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|e| TunnelError::Tool {
            command: cmd_line.clone(),
            output: e.to_string(),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(TunnelError::Tool {
            command: cmd_line,
            output: stderr.trim().to_string(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Execute a command and return its success flag together with combined
/// stdout+stderr. Used where the caller needs to inspect the driver's output
/// on failure (e.g. "is not a WireGuard interface" during teardown).
pub fn run_combined(program: &str, args: &[&str]) -> Result<(bool, String)> {
    let cmd_line = format!("{program} {}", args.join(" "));
    tracing::debug!("exec (combined): {cmd_line}");

    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|e| TunnelError::Tool {
            command: cmd_line,
            output: e.to_string(),
        })?;

    let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
    combined.push_str(&String::from_utf8_lossy(&output.stderr));
    Ok((output.status.success(), combined))
}

/// Check whether a program exists on PATH.
#[cfg(unix)]
pub fn command_exists(program: &str) -> bool {
    Command::new("which")
        .arg(program)
        .output()
        .is_ok_and(|o| o.status.success())
}

/// Check whether a program exists on PATH.
#[cfg(windows)]
pub fn command_exists(program: &str) -> bool {
    Command::new("where")
        .arg(program)
        .output()
        .is_ok_and(|o| o.status.success())
}
