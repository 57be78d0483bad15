//! Tunnel lifecycle manager.
//!
//! Owns the config directory, composes the key provider, config writer, and
//! the platform connection strategy, and exposes the lifecycle state machine:
//! `Disconnected → Connecting → Connected → Disconnecting → Disconnected`.
//!
//! A manager drives at most one tunnel, and lifecycle calls must be
//! serialized by the caller — the methods take `&mut self` and run each
//! operation to completion. Liveness is always re-derived from the OS:
//! a config file left behind by a crash does not count as "connected".

use std::fs;
use std::path::PathBuf;

use crate::conf::{self, TunnelParameters};
use crate::error::{Result, TunnelError};
use crate::keys::{KeyProvider, WgKeyProvider};
use crate::stats::{self, TransferStats};
use crate::strategy::{platform_strategy, ConnectionStrategy};
use crate::TUNNEL_NAME;

/// Negotiates peer parameters with the backend: registers our fresh public
/// key for the chosen node and receives the server-side peer configuration.
pub trait Negotiator {
    fn negotiate(&self, node_id: &str, public_key: &str) -> anyhow::Result<TunnelParameters>;
}

/// Lifecycle state of the managed tunnel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Disconnected,
    Connecting,
    Connected,
    Disconnecting,
}

/// Identity of the tunnel that was last brought up by this manager.
#[derive(Debug, Clone)]
pub struct ConnectionInfo {
    pub node_id: String,
    pub client_address: String,
}

/// On-demand connection status. Counters are zero when down or when the
/// driver could not be queried — statistics are telemetry, not a
/// correctness-critical path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionStatus {
    pub connected: bool,
    pub transfer: TransferStats,
}

/// The tunnel lifecycle manager façade.
pub struct TunnelManager {
    config_dir: PathBuf,
    keys: Box<dyn KeyProvider>,
    strategy: Box<dyn ConnectionStrategy>,
    state: State,
    active: Option<ConnectionInfo>,
}

impl TunnelManager {
    /// Create a manager for the host platform, with the config directory at
    /// `~/.volant` (created `0700` if absent).
    pub fn new() -> Result<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| TunnelError::Io(std::io::Error::other("cannot determine home directory")))?;
        let config_dir = home.join(".volant");
        Self::with_components(config_dir, Box::new(WgKeyProvider), platform_strategy())
    }

    /// Create a manager from explicit parts. Used by tests and embedders
    /// that substitute the key source or the platform strategy.
    pub fn with_components(
        config_dir: PathBuf,
        keys: Box<dyn KeyProvider>,
        strategy: Box<dyn ConnectionStrategy>,
    ) -> Result<Self> {
        fs::create_dir_all(&config_dir)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&config_dir, fs::Permissions::from_mode(0o700))?;
        }
        Ok(Self {
            config_dir,
            keys,
            strategy,
            state: State::Disconnected,
            active: None,
        })
    }

    /// Path of the single config file this manager owns.
    pub fn config_path(&self) -> PathBuf {
        self.config_dir.join(format!("{TUNNEL_NAME}.conf"))
    }

    /// Identity of the active tunnel, when one was brought up by this
    /// manager instance.
    pub fn active(&self) -> Option<&ConnectionInfo> {
        self.active.as_ref()
    }

    /// Establish a tunnel to `node_id`.
    ///
    /// Generates a fresh key pair, negotiates peer parameters through
    /// `negotiator`, renders the config file, and brings the tunnel up via
    /// the platform strategy. Only valid while disconnected.
    pub fn connect(
        &mut self,
        node_id: &str,
        negotiator: &dyn Negotiator,
    ) -> Result<ConnectionInfo> {
        if self.state != State::Disconnected {
            return Err(TunnelError::AlreadyConnected);
        }
        // A live tunnel from a previous run counts too.
        if self.is_connected() {
            return Err(TunnelError::AlreadyConnected);
        }

        self.state = State::Connecting;
        match self.connect_inner(node_id, negotiator) {
            Ok(info) => {
                self.state = State::Connected;
                self.active = Some(info.clone());
                tracing::info!(node_id, client_address = %info.client_address, "tunnel connected");
                Ok(info)
            }
            Err(e) => {
                self.state = State::Disconnected;
                Err(e)
            }
        }
    }

    fn connect_inner(
        &mut self,
        node_id: &str,
        negotiator: &dyn Negotiator,
    ) -> Result<ConnectionInfo> {
        let pair = self.keys.generate()?;

        let params = negotiator
            .negotiate(node_id, &pair.public)
            .map_err(TunnelError::Negotiation)?;

        let config = self.config_path();
        conf::write_config(&config, &pair.private, &params)?;

        self.strategy.up(&config)?;

        Ok(ConnectionInfo {
            node_id: node_id.to_string(),
            client_address: params.client_address,
        })
    }

    /// Take the tunnel down. Idempotent: with no config file present this
    /// clears any stale local state and succeeds as a no-op, and a driver
    /// response meaning "no such tunnel" is success, not failure.
    pub fn disconnect(&mut self) -> Result<()> {
        let config = self.config_path();

        if !config.exists() {
            self.state = State::Disconnected;
            self.active = None;
            return Ok(());
        }

        self.state = State::Disconnecting;
        match self.strategy.down(&config) {
            Ok(()) => {
                if let Err(e) = fs::remove_file(&config) {
                    if e.kind() != std::io::ErrorKind::NotFound {
                        self.state = State::Disconnected;
                        return Err(e.into());
                    }
                }
                self.state = State::Disconnected;
                self.active = None;
                tracing::info!("tunnel disconnected");
                Ok(())
            }
            Err(e) => {
                // The tunnel may or may not be up; let liveness re-derive it.
                self.state = State::Disconnected;
                Err(e)
            }
        }
    }

    /// Whether the tunnel is currently up. Pure query: no state mutation, no
    /// credential prompts. Absent config file short-circuits to `false`
    /// without touching the platform probe.
    pub fn is_connected(&self) -> bool {
        if !self.config_path().exists() {
            return false;
        }
        self.strategy.probe()
    }

    /// Current status with transfer statistics. Never fails: when the tunnel
    /// is down the driver is not invoked at all, and a failed status dump
    /// degrades to zero counters.
    pub fn status(&self) -> ConnectionStatus {
        if !self.is_connected() {
            return ConnectionStatus::default();
        }

        let transfer = match self.strategy.status_dump() {
            Ok(dump) => stats::parse_transfer_stats(&dump),
            Err(e) => {
                tracing::debug!("status dump unavailable: {e}");
                TransferStats::default()
            }
        };

        ConnectionStatus {
            connected: true,
            transfer,
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::path::Path;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
    use std::sync::Arc;

    use crate::keys::KeyPair;

    struct FixedKeys;

    impl KeyProvider for FixedKeys {
        fn generate(&self) -> Result<KeyPair> {
            Ok(KeyPair {
                private: "CLIENTPRIV=".into(),
                public: "CLIENTPUB=".into(),
            })
        }
    }

    /// Strategy double: flips a shared "up" flag and counts probe calls.
    #[derive(Clone, Default)]
    struct FakeStrategy {
        up: Arc<AtomicBool>,
        probes: Arc<AtomicU32>,
        dump: &'static str,
    }

    impl ConnectionStrategy for FakeStrategy {
        fn up(&self, config: &Path) -> Result<()> {
            assert!(config.exists(), "config must be written before up");
            self.up.store(true, Ordering::SeqCst);
            Ok(())
        }

        fn down(&self, _config: &Path) -> Result<()> {
            self.up.store(false, Ordering::SeqCst);
            Ok(())
        }

        fn probe(&self) -> bool {
            self.probes.fetch_add(1, Ordering::SeqCst);
            self.up.load(Ordering::SeqCst)
        }

        fn status_dump(&self) -> Result<String> {
            Ok(self.dump.to_string())
        }
    }

    struct StaticNegotiator {
        calls: Cell<u32>,
    }

    impl StaticNegotiator {
        fn new() -> Self {
            Self { calls: Cell::new(0) }
        }
    }

    impl Negotiator for StaticNegotiator {
        fn negotiate(&self, _node_id: &str, public_key: &str) -> anyhow::Result<TunnelParameters> {
            assert_eq!(public_key, "CLIENTPUB=");
            self.calls.set(self.calls.get() + 1);
            Ok(TunnelParameters {
                client_address: "10.8.0.7".into(),
                server_public_key: "SERVERPUB=".into(),
                server_endpoint: "vpn.example.net:51820".into(),
                dns: "1.1.1.1".into(),
            })
        }
    }

    fn make_manager(strategy: FakeStrategy) -> (TunnelManager, tempfile::TempDir) {
        let dir = tempfile::tempdir().expect("tempdir");
        let manager = TunnelManager::with_components(
            dir.path().join("cfg"),
            Box::new(FixedKeys),
            Box::new(strategy),
        )
        .expect("manager");
        (manager, dir)
    }

    #[test]
    fn is_connected_short_circuits_without_config_file() {
        let strategy = FakeStrategy::default();
        let probes = strategy.probes.clone();
        let (manager, _dir) = make_manager(strategy);

        assert!(!manager.is_connected());
        assert_eq!(probes.load(Ordering::SeqCst), 0, "probe must not run");
    }

    #[test]
    fn connect_writes_config_and_reports_connected() {
        let strategy = FakeStrategy {
            dump: "transfer: 1.00 KiB received, 2.00 KiB sent\nlatest handshake: 5 seconds ago",
            ..FakeStrategy::default()
        };
        let (mut manager, _dir) = make_manager(strategy);
        let negotiator = StaticNegotiator::new();

        let info = manager.connect("node-1", &negotiator).expect("connect");
        assert_eq!(info.node_id, "node-1");
        assert_eq!(info.client_address, "10.8.0.7");
        assert_eq!(negotiator.calls.get(), 1);

        let content = fs::read_to_string(manager.config_path()).expect("config");
        assert!(content.contains("PrivateKey = CLIENTPRIV="));
        assert!(content.contains("PublicKey = SERVERPUB="));
        assert!(content.contains("Endpoint = vpn.example.net:51820"));

        assert!(manager.is_connected());
        let status = manager.status();
        assert!(status.connected);
        assert_eq!(status.transfer.bytes_received, 1024);
        assert_eq!(status.transfer.bytes_sent, 2048);
        assert_eq!(status.transfer.latest_handshake, "5 seconds ago");
    }

    #[test]
    fn connect_while_connected_fails_and_keeps_config() {
        let (mut manager, _dir) = make_manager(FakeStrategy::default());
        let negotiator = StaticNegotiator::new();

        manager.connect("node-1", &negotiator).expect("connect");
        let before = fs::read_to_string(manager.config_path()).expect("config");

        let err = manager.connect("node-2", &negotiator).expect_err("must fail");
        assert!(matches!(err, TunnelError::AlreadyConnected));
        assert_eq!(negotiator.calls.get(), 1, "no second negotiation");

        let after = fs::read_to_string(manager.config_path()).expect("config");
        assert_eq!(before, after, "existing config must be untouched");
    }

    #[test]
    fn disconnect_twice_is_idempotent() {
        let (mut manager, _dir) = make_manager(FakeStrategy::default());
        let negotiator = StaticNegotiator::new();
        manager.connect("node-1", &negotiator).expect("connect");

        manager.disconnect().expect("first disconnect");
        assert!(!manager.config_path().exists());
        assert!(!manager.is_connected());

        manager.disconnect().expect("second disconnect");
        assert!(!manager.config_path().exists());
        assert!(!manager.is_connected());
    }

    #[test]
    fn disconnect_without_config_clears_stale_state() {
        let (mut manager, _dir) = make_manager(FakeStrategy::default());
        manager.disconnect().expect("no-op disconnect");
        assert!(manager.active().is_none());
        assert!(!manager.is_connected());
    }

    #[test]
    fn status_is_zero_valued_when_down() {
        let (manager, _dir) = make_manager(FakeStrategy::default());
        assert_eq!(manager.status(), ConnectionStatus::default());
    }

    #[test]
    fn failed_negotiation_rolls_back_to_disconnected() {
        struct RefusingNegotiator;
        impl Negotiator for RefusingNegotiator {
            fn negotiate(&self, _: &str, _: &str) -> anyhow::Result<TunnelParameters> {
                anyhow::bail!("node is at capacity")
            }
        }

        let (mut manager, _dir) = make_manager(FakeStrategy::default());
        let err = manager
            .connect("node-1", &RefusingNegotiator)
            .expect_err("must fail");
        assert!(matches!(err, TunnelError::Negotiation(_)));
        assert!(err.to_string().contains("node is at capacity"));

        // A later attempt must be allowed.
        let negotiator = StaticNegotiator::new();
        manager.connect("node-1", &negotiator).expect("retry works");
    }

    #[test]
    fn end_to_end_lifecycle() {
        let strategy = FakeStrategy {
            dump: "transfer: 128.50 KiB received, 42.00 KiB sent",
            ..FakeStrategy::default()
        };
        let (mut manager, _dir) = make_manager(strategy);
        let negotiator = StaticNegotiator::new();

        assert!(!manager.is_connected());
        manager.connect("node-9", &negotiator).expect("connect");
        assert!(manager.is_connected());

        let status = manager.status();
        assert!(status.connected);
        assert_eq!(status.transfer.bytes_received, 131_584);
        assert_eq!(status.transfer.bytes_sent, 43_008);

        manager.disconnect().expect("disconnect");
        assert!(!manager.is_connected());
        assert!(!manager.config_path().exists());
        assert_eq!(manager.status(), ConnectionStatus::default());
    }
}
