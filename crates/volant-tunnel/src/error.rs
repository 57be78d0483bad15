//! Error types for tunnel lifecycle operations.

use thiserror::Error;

/// Result type alias using [`TunnelError`].
pub type Result<T> = std::result::Result<T, TunnelError>;

/// Errors surfaced by tunnel lifecycle operations.
///
/// `connect`/`disconnect` propagate these to the caller with the underlying
/// tool output attached; liveness and statistics queries never do — they
/// degrade to `false`/zero instead, because they back UI polling loops.
#[derive(Debug, Error)]
pub enum TunnelError {
    /// The WireGuard driver binary could not be located.
    #[error("WireGuard tools not installed: {0}")]
    DriverMissing(String),

    /// An external tool exited non-zero or could not be spawned.
    #[error("`{command}` failed: {output}")]
    Tool { command: String, output: String },

    /// Config file write/remove failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Privilege elevation was refused or is unavailable.
    #[error("administrator privileges required: {0}")]
    Privilege(String),

    /// A tunnel is already up; disconnect first.
    #[error("already connected — disconnect first")]
    AlreadyConnected,

    /// The remote peer-parameter exchange failed.
    #[error("peer negotiation failed: {0}")]
    Negotiation(anyhow::Error),

    /// The driver accepted the up command but liveness was never confirmed.
    #[error("tunnel did not come up within {waited_secs}s")]
    StartupTimeout { waited_secs: u64 },
}
