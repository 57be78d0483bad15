//! WireGuard key pair generation.
//!
//! Keys are produced by the `wg` utility itself rather than an in-process
//! implementation: `wg genkey` for the private key, `wg pubkey` fed the
//! private key on stdin for the public half. Neither key is written to disk
//! here or to any log stream; the private key exists only in memory until the
//! config writer renders it.

use std::fmt;
use std::io::Write;
use std::process::{Command, Stdio};

use crate::error::{Result, TunnelError};

/// A freshly generated WireGuard key pair, base64-encoded.
#[derive(Clone)]
pub struct KeyPair {
    pub private: String,
    pub public: String,
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("private", &"[redacted]")
            .field("public", &self.public)
            .finish()
    }
}

/// Source of key pairs. A fresh pair is generated for every connection
/// attempt; implementations must not persist or log private keys.
pub trait KeyProvider {
    fn generate(&self) -> Result<KeyPair>;
}

/// Production key provider backed by the `wg` binary.
#[derive(Debug, Default, Clone, Copy)]
pub struct WgKeyProvider;

impl KeyProvider for WgKeyProvider {
    fn generate(&self) -> Result<KeyPair> {
        let private = crate::cmd::run_capture("wg", &["genkey"])?;
        let public = derive_public_key(&private)?;
        Ok(KeyPair { private, public })
    }
}

/// Run `wg pubkey` with the private key supplied on stdin.
fn derive_public_key(private: &str) -> Result<String> {
    tracing::debug!("exec: wg pubkey (key on stdin)");

    let mut child = Command::new("wg")
        .arg("pubkey")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| TunnelError::Tool {
            command: "wg pubkey".into(),
            output: e.to_string(),
        })?;

    if let Some(stdin) = child.stdin.as_mut() {
        stdin.write_all(private.as_bytes())?;
    }

    let output = child.wait_with_output()?;
    if !output.status.success() {
        return Err(TunnelError::Tool {
            command: "wg pubkey".into(),
            output: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_private_key() {
        let pair = KeyPair {
            private: "SUPERSECRETKEY=".into(),
            public: "PUBLICPART=".into(),
        };
        let rendered = format!("{pair:?}");
        assert!(!rendered.contains("SUPERSECRETKEY"));
        assert!(rendered.contains("[redacted]"));
        assert!(rendered.contains("PUBLICPART="));
    }
}
