//! macOS connection strategy.
//!
//! Elevation goes through `osascript`'s "do shell script ... with
//! administrator privileges", which raises the system admin-consent dialog.
//! Lifecycle commands are wrapped in a generated helper script so the user
//! sees a single prompt for the down-then-up sequence.

use std::fs;
use std::path::Path;

use crate::cmd::{command_exists, run_combined};
use crate::error::{Result, TunnelError};

/// Driver output marking an idempotent teardown (interface already absent).
const NOT_AN_INTERFACE: &str = "is not a WireGuard interface";

/// Single-quote a path for the shell so spaces and metacharacters survive.
/// An embedded single quote is closed, backslash-escaped, and reopened.
fn shell_quote(path: &str) -> String {
    format!("'{}'", path.replace('\'', r"'\''"))
}

pub struct MacosStrategy;

impl MacosStrategy {
    fn ensure_driver() -> Result<()> {
        if !command_exists("wg-quick") {
            return Err(TunnelError::DriverMissing(
                "install with: brew install wireguard-tools".into(),
            ));
        }
        Ok(())
    }

    /// Run a shell command through the macOS admin-consent dialog. The
    /// command is embedded in a double-quoted AppleScript string, so
    /// backslashes and quotes must be escaped here; shell-level quoting of
    /// arguments is the caller's job via [`shell_quote`].
    fn run_elevated(shell_command: &str) -> Result<(bool, String)> {
        let escaped = shell_command.replace('\\', r"\\").replace('"', r#"\""#);
        let script = format!(r#"do shell script "{escaped}" with administrator privileges"#);
        run_combined("osascript", &["-e", &script])
    }

    fn classify_failure(command: &str, output: String) -> TunnelError {
        // osascript reports a dismissed consent dialog as "User canceled"
        // (error -128).
        if output.contains("User canceled") || output.contains("-128") {
            TunnelError::Privilege("administrator consent dialog was dismissed".into())
        } else {
            TunnelError::Tool {
                command: command.to_string(),
                output: output.trim().to_string(),
            }
        }
    }
}

impl super::ConnectionStrategy for MacosStrategy {
    fn up(&self, config: &Path) -> Result<()> {
        Self::ensure_driver()?;
        let conf = config.to_string_lossy();

        // One helper script, one consent prompt: tear down any stale
        // interface, give the kernel a moment to release it, bring up anew.
        let script_body = format!(
            "#!/bin/bash\n\
             wg-quick down \"{conf}\" 2>/dev/null || true\n\
             sleep 0.5\n\
             wg-quick up \"{conf}\"\n"
        );
        let script_path = config.with_file_name("connect.sh");
        fs::write(&script_path, script_body)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&script_path, fs::Permissions::from_mode(0o755))?;
        }

        tracing::info!("bringing tunnel up (admin consent dialog)");
        let result = Self::run_elevated(&shell_quote(&script_path.to_string_lossy()));
        let _ = fs::remove_file(&script_path);

        let (ok, output) = result?;
        if !ok {
            return Err(Self::classify_failure("osascript wg-quick up", output));
        }
        Ok(())
    }

    fn down(&self, config: &Path) -> Result<()> {
        let conf = shell_quote(&config.to_string_lossy());

        tracing::info!("taking tunnel down (admin consent dialog)");
        let (ok, output) = Self::run_elevated(&format!("wg-quick down {conf}"))?;
        if !ok && !output.contains(NOT_AN_INTERFACE) {
            return Err(Self::classify_failure("osascript wg-quick down", output));
        }
        Ok(())
    }

    fn probe(&self) -> bool {
        // `wg show` works unprivileged when the interface was created by the
        // same user's tools; prefer it for accuracy.
        if let Ok((true, output)) = run_combined("wg", &["show"]) {
            if !output.is_empty() {
                return output.contains("interface:");
            }
        }

        // Fallback: WireGuard on macOS surfaces as a utun interface. This
        // over-approximates, but the manager only asks once a config exists.
        run_combined("ifconfig", &[]).is_ok_and(|(ok, output)| ok && output.contains("utun"))
    }

    fn status_dump(&self) -> Result<String> {
        // Try cached passwordless sudo first (common wireguard-tools setup),
        // then an unprivileged read. Never raise the consent dialog for
        // telemetry.
        if let Ok(dump) = crate::cmd::run_capture("sudo", &["-n", "wg", "show"]) {
            return Ok(dump);
        }
        crate::cmd::run_capture("wg", &["show"])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shell_quote_survives_spaces() {
        assert_eq!(
            shell_quote("/Users/Jo Doe/.volant/volant0.conf"),
            "'/Users/Jo Doe/.volant/volant0.conf'"
        );
    }

    #[test]
    fn shell_quote_escapes_embedded_single_quote() {
        assert_eq!(shell_quote("/tmp/o'brien"), r"'/tmp/o'\''brien'");
    }
}
