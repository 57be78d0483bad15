//! Tunnel lifecycle subcommands: connect, disconnect, status, sessions.

use anyhow::{bail, Context, Result};
use clap::Args;

use volant_tunnel::TunnelManager;

use crate::context;

/// Arguments for `volant connect`.
#[derive(Debug, Args)]
pub struct ConnectArgs {
    /// Node id to connect to
    pub node_id: Option<String>,

    /// Let the backend pick the best node
    #[arg(long, conflicts_with = "node_id")]
    pub best: bool,
}

/// Establish the tunnel to the chosen node.
pub fn connect(args: &ConnectArgs, api_url: Option<&str>) -> Result<()> {
    let (client, _store, _session) = context::authenticated(api_url)?;

    let node = if args.best {
        client.best_node().context("failed to pick a node")?
    } else {
        let Some(ref id) = args.node_id else {
            bail!("provide a node id or pass --best");
        };
        client.node(id).context("unknown node")?
    };

    if node.status == "offline" {
        bail!("node {} is offline", node.id);
    }

    println!("Connecting to {} ({})...", node.name, node.country);

    let mut manager = TunnelManager::new()?;
    let info = manager
        .connect(&node.id, &client)
        .context("failed to establish tunnel")?;

    println!("Connected — tunnel address {}", info.client_address);
    Ok(())
}

/// Take the tunnel down. Safe to repeat.
pub fn disconnect() -> Result<()> {
    let mut manager = TunnelManager::new()?;
    manager.disconnect().context("failed to take tunnel down")?;
    println!("Disconnected");
    Ok(())
}

/// Show liveness and transfer statistics. Never fails on probe or parser
/// anomalies — those degrade to a plain "disconnected"/zero display.
pub fn status() -> Result<()> {
    let manager = TunnelManager::new()?;

    if !manager.is_connected() {
        println!("Disconnected");
        return Ok(());
    }

    let status = manager.status();
    println!("Connected");
    println!("  sent:      {}", format_bytes(status.transfer.bytes_sent));
    println!("  received:  {}", format_bytes(status.transfer.bytes_received));
    if !status.transfer.latest_handshake.is_empty() {
        println!("  handshake: {}", status.transfer.latest_handshake);
    }
    Ok(())
}

/// List the backend's record of this account's sessions.
pub fn sessions(api_url: Option<&str>) -> Result<()> {
    let (client, _store, _session) = context::authenticated(api_url)?;

    let sessions = client.user_sessions()?;
    if sessions.is_empty() {
        println!("no sessions");
        return Ok(());
    }
    for s in &sessions {
        println!(
            "{:<24} node {:<24} {:<12} {} sent / {} received",
            s.id,
            s.node_id,
            s.status,
            format_bytes(s.bytes_sent.max(0).unsigned_abs()),
            format_bytes(s.bytes_received.max(0).unsigned_abs()),
        );
    }
    Ok(())
}

/// Human-readable byte count, binary units to match the driver's own output.
fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];

    #[allow(clippy::cast_precision_loss)]
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.2} {}", UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_bytes_uses_binary_units() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1536), "1.50 KiB");
        assert_eq!(format_bytes(2_097_152), "2.00 MiB");
        assert_eq!(format_bytes(1024 * 1024 * 1024), "1.00 GiB");
    }
}
