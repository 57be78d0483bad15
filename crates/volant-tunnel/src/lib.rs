//! Tunnel lifecycle management for the Volant VPN client.
//!
//! This crate owns everything between "the backend gave us peer parameters"
//! and "packets flow through an encrypted interface": key generation via the
//! WireGuard tools, rendering the `wg-quick` configuration file, bringing the
//! tunnel up and down with the privilege-elevation mechanism appropriate to
//! the host OS, and turning `wg show` output into structured statistics.
//!
//! The WireGuard protocol itself is never implemented here — the external
//! driver (`wg-quick`, or the tunnel service on Windows) owns the data plane.

pub mod cmd;
pub mod conf;
pub mod error;
pub mod keys;
pub mod manager;
pub mod stats;
pub mod strategy;

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "macos")]
mod macos;
#[cfg(target_os = "windows")]
mod windows;

pub use conf::TunnelParameters;
pub use error::TunnelError;
pub use keys::{KeyPair, KeyProvider, WgKeyProvider};
pub use manager::{ConnectionInfo, ConnectionStatus, Negotiator, TunnelManager};
pub use stats::TransferStats;
pub use strategy::ConnectionStrategy;

/// Name of the managed tunnel. Doubles as the interface name on Linux, the
/// config file stem everywhere, and the service suffix on Windows.
pub const TUNNEL_NAME: &str = "volant0";
