//! Wire types for the backend API.
//!
//! Field names follow the backend's JSON contract. Timestamps are kept as
//! RFC 3339 strings — the client only displays them, it never computes on
//! them.

use serde::{Deserialize, Serialize};

/// A registered user account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub username: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub subscription_tier: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub data_transferred_gb: f64,
    #[serde(default)]
    pub connection_count: i64,
    #[serde(default)]
    pub created_at: String,
}

#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshTokenResponse {
    pub access_token: String,
}

#[derive(Debug, Serialize)]
pub struct UpdatePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserStats {
    #[serde(default)]
    pub total_sessions: i64,
    #[serde(default)]
    pub active_sessions: i64,
    #[serde(default)]
    pub data_transferred_gb: f64,
}

/// An available exit node.
#[derive(Debug, Clone, Deserialize)]
pub struct VpnNode {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub hostname: String,
    pub country: String,
    #[serde(default)]
    pub country_code: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub public_ip: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub load_score: f64,
    #[serde(default)]
    pub latency: i64,
    #[serde(default)]
    pub current_connections: i64,
    #[serde(default)]
    pub max_connections: i64,
    #[serde(default)]
    pub supports_wireguard: bool,
    #[serde(default)]
    pub wireguard_port: i64,
    #[serde(default)]
    pub uptime_percentage: f64,
}

#[derive(Debug, Deserialize)]
pub struct NodeListResponse {
    #[serde(default)]
    pub nodes: Vec<VpnNode>,
    #[serde(default)]
    pub total_count: i64,
}

/// A VPN session as the backend accounts it.
#[derive(Debug, Clone, Deserialize)]
pub struct Session {
    pub id: String,
    #[serde(default)]
    pub user_id: String,
    pub node_id: String,
    #[serde(default)]
    pub protocol: String,
    #[serde(default)]
    pub client_ip: String,
    #[serde(default)]
    pub tunnel_ip: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub connected_at: String,
    #[serde(default)]
    pub disconnected_at: String,
    #[serde(default)]
    pub bytes_sent: i64,
    #[serde(default)]
    pub bytes_received: i64,
    #[serde(default)]
    pub data_used_gb: f64,
}

#[derive(Debug, Serialize)]
pub struct CreateSessionRequest {
    pub node_id: String,
    pub protocol: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateSessionResponse {
    pub session: Session,
    #[serde(default)]
    pub config: String,
}

#[derive(Debug, Deserialize)]
pub struct SessionListResponse {
    #[serde(default)]
    pub sessions: Vec<Session>,
    #[serde(default)]
    pub count: i64,
}

/// Response to registering our public key with a node — the negotiated peer
/// parameters the tunnel config is rendered from.
#[derive(Debug, Clone, Deserialize)]
pub struct PeerConfig {
    #[serde(default)]
    pub session_id: String,
    pub server_public_key: String,
    pub server_endpoint: String,
    pub client_ip: String,
    pub dns: String,
    #[serde(default)]
    pub allowed_ips: String,
    #[serde(default)]
    pub keepalive: i64,
}

#[derive(Debug, Serialize)]
pub struct GenerateConfigRequest {
    pub node_id: String,
    pub protocol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GenerateConfigResponse {
    pub config_id: String,
    pub config_content: String,
    pub protocol: String,
}

/// Error body the backend attaches to non-2xx responses.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default)]
    pub version: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn login_response_deserializes() {
        let body = r#"{
            "access_token": "at",
            "refresh_token": "rt",
            "user": {"id": "u1", "email": "a@b.c", "username": "ab"}
        }"#;
        let resp: LoginResponse = serde_json::from_str(body).unwrap();
        assert_eq!(resp.access_token, "at");
        assert_eq!(resp.user.username, "ab");
        assert!(!resp.user.is_admin);
    }

    #[test]
    fn peer_config_tolerates_missing_optional_fields() {
        let body = r#"{
            "server_public_key": "SPK",
            "server_endpoint": "1.2.3.4:51820",
            "client_ip": "10.8.0.2",
            "dns": "1.1.1.1"
        }"#;
        let peer: PeerConfig = serde_json::from_str(body).unwrap();
        assert_eq!(peer.server_endpoint, "1.2.3.4:51820");
        assert!(peer.session_id.is_empty());
        assert_eq!(peer.keepalive, 0);
    }

    #[test]
    fn node_list_tolerates_missing_counters() {
        let body = r#"{"nodes": [{"id": "n1", "name": "Berlin 1", "country": "Germany"}]}"#;
        let resp: NodeListResponse = serde_json::from_str(body).unwrap();
        assert_eq!(resp.nodes.len(), 1);
        assert_eq!(resp.nodes[0].name, "Berlin 1");
    }
}
