//! Rendering and persistence of the `wg-quick` configuration file.
//!
//! The driver parses this as a fixed-grammar INI dialect — section order,
//! key names, and the blank line between sections are all load-bearing, so
//! the template below must be reproduced byte-for-byte.

use std::fmt::Write as _;
use std::path::Path;

use crate::error::Result;

/// Peer parameters negotiated with the backend for one connection.
/// Immutable once the tunnel is up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TunnelParameters {
    /// Address assigned to this client, without prefix (a /32 is appended).
    pub client_address: String,
    /// The server's WireGuard public key, base64.
    pub server_public_key: String,
    /// `host:port` the tunnel connects to.
    pub server_endpoint: String,
    /// DNS server pushed while the tunnel is up.
    pub dns: String,
}

/// All traffic is routed through the tunnel.
const ALLOWED_IPS: &str = "0.0.0.0/0";

/// Keepalive interval in seconds, required for clients behind NAT.
const PERSISTENT_KEEPALIVE: u32 = 25;

/// Render the two-section config file consumed by the driver.
pub fn render(private_key: &str, params: &TunnelParameters) -> String {
    let mut out = String::new();
    // Infallible: writing to a String cannot fail.
    let _ = writeln!(out, "[Interface]");
    let _ = writeln!(out, "PrivateKey = {private_key}");
    let _ = writeln!(out, "Address = {}/32", params.client_address);
    let _ = writeln!(out, "DNS = {}", params.dns);
    let _ = writeln!(out);
    let _ = writeln!(out, "[Peer]");
    let _ = writeln!(out, "PublicKey = {}", params.server_public_key);
    let _ = writeln!(out, "Endpoint = {}", params.server_endpoint);
    let _ = writeln!(out, "AllowedIPs = {ALLOWED_IPS}");
    let _ = writeln!(out, "PersistentKeepalive = {PERSISTENT_KEEPALIVE}");
    out
}

/// Write the config file atomically with owner-only permissions.
///
/// The content is staged in a temp file in the destination directory and
/// renamed over the target, so a crash never leaves a half-written config
/// holding a private key.
pub fn write_config(path: &Path, private_key: &str, params: &TunnelParameters) -> Result<()> {
    use std::io::Write as _;

    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut staged = tempfile::NamedTempFile::new_in(dir)?;
    staged.write_all(render(private_key, params).as_bytes())?;
    staged.flush()?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        staged
            .as_file()
            .set_permissions(std::fs::Permissions::from_mode(0o600))?;
    }

    staged.persist(path).map_err(|e| e.error)?;
    tracing::debug!("wrote tunnel config: {}", path.display());
    Ok(())
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;

    fn sample_params() -> TunnelParameters {
        TunnelParameters {
            client_address: "10.0.0.2".into(),
            server_public_key: "SERVERPUB".into(),
            server_endpoint: "1.2.3.4:51820".into(),
            dns: "1.1.1.1".into(),
        }
    }

    #[test]
    fn render_matches_driver_grammar_exactly() {
        let expected = "[Interface]\n\
                        PrivateKey = PRIVKEY\n\
                        Address = 10.0.0.2/32\n\
                        DNS = 1.1.1.1\n\
                        \n\
                        [Peer]\n\
                        PublicKey = SERVERPUB\n\
                        Endpoint = 1.2.3.4:51820\n\
                        AllowedIPs = 0.0.0.0/0\n\
                        PersistentKeepalive = 25\n";
        assert_eq!(render("PRIVKEY", &sample_params()), expected);
    }

    #[test]
    fn write_config_creates_file_with_rendered_content() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("volant0.conf");

        write_config(&path, "PRIVKEY", &sample_params()).expect("write");

        let content = std::fs::read_to_string(&path).expect("read");
        assert_eq!(content, render("PRIVKEY", &sample_params()));
    }

    #[cfg(unix)]
    #[test]
    fn write_config_restricts_permissions_to_owner() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("volant0.conf");
        write_config(&path, "PRIVKEY", &sample_params()).expect("write");

        let mode = std::fs::metadata(&path).expect("metadata").permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn write_config_overwrites_existing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("volant0.conf");
        std::fs::write(&path, "stale").expect("seed");

        write_config(&path, "NEWKEY", &sample_params()).expect("write");

        let content = std::fs::read_to_string(&path).expect("read");
        assert!(content.contains("PrivateKey = NEWKEY"));
        assert!(!content.contains("stale"));
    }
}
