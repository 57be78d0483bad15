//! Windows connection strategy.
//!
//! The tunnel runs as a Windows service installed through `wireguard.exe
//! /installtunnelservice`; the whole process must already be elevated (the
//! installer manifest requests it). Service installation returns before the
//! tunnel is live, so liveness is confirmed with a bounded poll of the
//! service state.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::thread;
use std::time::Duration;

use crate::error::{Result, TunnelError};
use crate::TUNNEL_NAME;

/// Hide the console window that child processes would otherwise flash.
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// Poll cadence and bound while waiting for the tunnel service.
const POLL_INTERVAL: Duration = Duration::from_millis(500);
const POLL_ATTEMPTS: u32 = 10;

pub struct WindowsStrategy;

impl WindowsStrategy {
    fn service_name() -> String {
        format!("WireGuardTunnel${TUNNEL_NAME}")
    }

    /// Locate a WireGuard executable: next to our own binary, then PATH,
    /// then the standard install locations under Program Files.
    fn find_exe(name: &str) -> Result<PathBuf> {
        if let Ok(own) = std::env::current_exe() {
            if let Some(dir) = own.parent() {
                let candidate = dir.join(name);
                if candidate.exists() {
                    return Ok(candidate);
                }
            }
        }

        if crate::cmd::command_exists(name) {
            return Ok(PathBuf::from(name));
        }

        for env_var in ["ProgramFiles", "ProgramFiles(x86)"] {
            if let Ok(dir) = std::env::var(env_var) {
                let candidate = Path::new(&dir).join("WireGuard").join(name);
                if candidate.exists() {
                    return Ok(candidate);
                }
            }
        }

        Err(TunnelError::DriverMissing(format!(
            "{name} not found — install WireGuard for Windows"
        )))
    }

    /// Run a command with the console window suppressed, returning success
    /// flag and combined output.
    fn run_hidden(program: &Path, args: &[&str]) -> Result<(bool, String)> {
        use std::os::windows::process::CommandExt;

        let cmd_line = format!("{} {}", program.display(), args.join(" "));
        tracing::debug!("exec (hidden): {cmd_line}");

        let output = Command::new(program)
            .args(args)
            .creation_flags(CREATE_NO_WINDOW)
            .output()
            .map_err(|e| TunnelError::Tool {
                command: cmd_line,
                output: e.to_string(),
            })?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));
        Ok((output.status.success(), combined))
    }

    fn service_running() -> bool {
        Self::run_hidden(Path::new("sc"), &["query", &Self::service_name()])
            .is_ok_and(|(ok, output)| ok && output.contains("RUNNING"))
    }
}

impl super::ConnectionStrategy for WindowsStrategy {
    fn up(&self, config: &Path) -> Result<()> {
        let wireguard = Self::find_exe("wireguard.exe")?;
        let conf = config.to_string_lossy();

        // Remove any stale service first; it may not exist.
        let _ = Self::run_hidden(&wireguard, &["/uninstalltunnelservice", TUNNEL_NAME]);
        thread::sleep(Duration::from_secs(1));

        tracing::info!("installing tunnel service");
        let (ok, output) = Self::run_hidden(&wireguard, &["/installtunnelservice", &conf])?;
        if !ok {
            let lower = output.to_lowercase();
            if lower.contains("access") || lower.contains("denied") || lower.contains("privilege")
            {
                return Err(TunnelError::Privilege(
                    "run the client as Administrator".into(),
                ));
            }
            return Err(TunnelError::Tool {
                command: "wireguard.exe /installtunnelservice".into(),
                output: output.trim().to_string(),
            });
        }

        // Installation returns before the service is live.
        for _ in 0..POLL_ATTEMPTS {
            thread::sleep(POLL_INTERVAL);
            if Self::service_running() {
                return Ok(());
            }
        }

        Err(TunnelError::StartupTimeout {
            waited_secs: (POLL_INTERVAL * POLL_ATTEMPTS).as_secs(),
        })
    }

    fn down(&self, _config: &Path) -> Result<()> {
        // Driver gone entirely means nothing to disconnect.
        let Ok(wireguard) = Self::find_exe("wireguard.exe") else {
            return Ok(());
        };

        tracing::info!("uninstalling tunnel service");
        let (ok, output) = Self::run_hidden(&wireguard, &["/uninstalltunnelservice", TUNNEL_NAME])?;
        if !ok {
            let lower = output.to_lowercase();
            let already_absent = lower.contains("not found")
                || lower.contains("does not exist")
                || lower.contains("not installed");
            if !already_absent {
                return Err(TunnelError::Tool {
                    command: "wireguard.exe /uninstalltunnelservice".into(),
                    output: output.trim().to_string(),
                });
            }
        }

        // Best-effort wait for the service to wind down.
        for _ in 0..POLL_ATTEMPTS {
            if !Self::service_running() {
                break;
            }
            thread::sleep(POLL_INTERVAL);
        }

        Ok(())
    }

    fn probe(&self) -> bool {
        Self::service_running()
    }

    fn status_dump(&self) -> Result<String> {
        let wg = Self::find_exe("wg.exe")?;
        let (ok, output) = Self::run_hidden(&wg, &["show", TUNNEL_NAME])?;
        if !ok {
            return Err(TunnelError::Tool {
                command: "wg.exe show".into(),
                output: output.trim().to_string(),
            });
        }
        Ok(output)
    }
}
