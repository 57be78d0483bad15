//! Linux connection strategy.
//!
//! Elevation is plain `sudo` — on a typical desktop the credential cache
//! makes repeat invocations prompt-free, and lifecycle commands run in a
//! terminal where a prompt is acceptable. Probes and statistics, which back
//! polling loops, always pass `-n` so they fail cleanly instead of blocking
//! on a password.

use std::path::Path;

use crate::cmd::{command_exists, run_combined};
use crate::error::{Result, TunnelError};
use crate::TUNNEL_NAME;

/// Driver output marking an idempotent teardown (interface already absent).
const NOT_AN_INTERFACE: &str = "is not a WireGuard interface";

pub struct LinuxStrategy;

impl LinuxStrategy {
    fn ensure_driver() -> Result<()> {
        if !command_exists("wg-quick") {
            return Err(TunnelError::DriverMissing(
                "install with: sudo apt install wireguard-tools".into(),
            ));
        }
        Ok(())
    }

    fn classify_failure(command: &str, output: String) -> TunnelError {
        if output.contains("a password is required") || output.contains("not in the sudoers") {
            TunnelError::Privilege(output.trim().to_string())
        } else {
            TunnelError::Tool {
                command: command.to_string(),
                output: output.trim().to_string(),
            }
        }
    }
}

impl super::ConnectionStrategy for LinuxStrategy {
    fn up(&self, config: &Path) -> Result<()> {
        Self::ensure_driver()?;
        let conf = config.to_string_lossy();

        // A prior interface with the same name would make `up` fail; tear it
        // down first and ignore the result.
        let _ = run_combined("sudo", &["wg-quick", "down", &conf]);

        tracing::info!("bringing tunnel up");
        let (ok, output) = run_combined("sudo", &["wg-quick", "up", &conf])?;
        if !ok {
            return Err(Self::classify_failure("sudo wg-quick up", output));
        }
        Ok(())
    }

    fn down(&self, config: &Path) -> Result<()> {
        let conf = config.to_string_lossy();

        tracing::info!("taking tunnel down");
        let (ok, output) = run_combined("sudo", &["wg-quick", "down", &conf])?;
        if !ok && !output.contains(NOT_AN_INTERFACE) {
            return Err(Self::classify_failure("sudo wg-quick down", output));
        }
        Ok(())
    }

    fn probe(&self) -> bool {
        // Interface existence needs no elevation.
        run_combined("ip", &["link", "show", TUNNEL_NAME]).is_ok_and(|(ok, _)| ok)
    }

    fn status_dump(&self) -> Result<String> {
        // Non-interactive sudo: fails instead of prompting when the
        // credential cache is cold. Statistics are best-effort telemetry.
        crate::cmd::run_capture("sudo", &["-n", "wg", "show", TUNNEL_NAME])
    }
}
