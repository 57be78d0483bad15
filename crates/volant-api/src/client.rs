//! Backend REST API client.
//!
//! Blocking reqwest client with bearer-token auth. The base URL is an
//! explicit constructor argument — there is no process-wide "current API
//! URL"; callers that need to switch backends construct a new client.

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;

use volant_tunnel::{Negotiator, TunnelParameters};

use crate::error::ApiError;
use crate::models::{
    CreateSessionRequest, CreateSessionResponse, ErrorResponse, GenerateConfigRequest,
    GenerateConfigResponse, HealthResponse, LoginRequest, LoginResponse, NodeListResponse,
    PeerConfig, RefreshTokenRequest, RefreshTokenResponse, RegisterRequest, Session,
    SessionListResponse, UpdatePasswordRequest, User, UserStats, VpnNode,
};

/// How long to wait for the backend before giving up.
const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

/// Client for the Volant backend API (v1).
#[derive(Debug)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    access_token: Option<String>,
}

impl ApiClient {
    /// Create a client for the given backend base URL.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        if base_url.is_empty() {
            return Err(ApiError::Config("API base URL is empty".into()));
        }

        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token: None,
        })
    }

    /// Attach a bearer token for authenticated requests.
    pub fn set_access_token(&mut self, token: &str) {
        self.access_token = if token.is_empty() {
            None
        } else {
            Some(token.to_string())
        };
    }

    /// Whether a bearer token is currently attached.
    pub fn has_access_token(&self) -> bool {
        self.access_token.is_some()
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1{path}", self.base_url)
    }

    fn authed(&self, builder: RequestBuilder) -> Result<RequestBuilder, ApiError> {
        let token = self.access_token.as_ref().ok_or(ApiError::Unauthenticated)?;
        Ok(builder.bearer_auth(token))
    }

    /// Send a request and decode the JSON response, turning non-2xx statuses
    /// into `ApiError::Api` with the backend's own error message when one is
    /// present in the body.
    fn execute<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T, ApiError> {
        let resp = builder.send()?;
        let status = resp.status();

        if !status.is_success() {
            return Err(Self::api_error(status, resp));
        }
        Ok(resp.json()?)
    }

    /// As [`Self::execute`] but for endpoints whose response body is ignored.
    fn execute_unit(builder: RequestBuilder) -> Result<(), ApiError> {
        let resp = builder.send()?;
        let status = resp.status();

        if !status.is_success() {
            return Err(Self::api_error(status, resp));
        }
        Ok(())
    }

    fn api_error(status: StatusCode, resp: reqwest::blocking::Response) -> ApiError {
        let body = resp.text().unwrap_or_default();
        let parsed: ErrorResponse = serde_json::from_str(&body).unwrap_or_default();
        let message = if !parsed.message.is_empty() {
            parsed.message
        } else if !parsed.error.is_empty() {
            parsed.error
        } else {
            body
        };
        ApiError::Api {
            status: status.as_u16(),
            message,
        }
    }

    fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        requires_auth: bool,
    ) -> Result<T, ApiError> {
        let mut builder = self.http.post(self.url(path)).json(body);
        if requires_auth {
            builder = self.authed(builder)?;
        }
        Self::execute(builder)
    }

    fn get_authed<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let builder = self.authed(self.http.get(self.url(path)))?;
        Self::execute(builder)
    }

    // =========================================================================
    // Health
    // =========================================================================

    /// Check backend health. Unauthenticated.
    pub fn health(&self) -> Result<HealthResponse, ApiError> {
        Self::execute(self.http.get(format!("{}/health", self.base_url)))
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// Authenticate and store the returned access token on the client.
    pub fn login(&mut self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let resp: LoginResponse = self.post_json(
            "/auth/login",
            &LoginRequest {
                email: email.to_string(),
                password: password.to_string(),
            },
            false,
        )?;
        self.set_access_token(&resp.access_token);
        Ok(resp)
    }

    /// Create an account and store the returned access token on the client.
    pub fn register(
        &mut self,
        email: &str,
        password: &str,
        username: &str,
    ) -> Result<LoginResponse, ApiError> {
        let resp: LoginResponse = self.post_json(
            "/auth/register",
            &RegisterRequest {
                email: email.to_string(),
                password: password.to_string(),
                username: username.to_string(),
                full_name: None,
            },
            false,
        )?;
        self.set_access_token(&resp.access_token);
        Ok(resp)
    }

    /// Exchange a refresh token for a fresh access token.
    pub fn refresh_token(&mut self, refresh_token: &str) -> Result<String, ApiError> {
        let resp: RefreshTokenResponse = self.post_json(
            "/auth/refresh",
            &RefreshTokenRequest {
                refresh_token: refresh_token.to_string(),
            },
            false,
        )?;
        self.set_access_token(&resp.access_token);
        Ok(resp.access_token)
    }

    // =========================================================================
    // User
    // =========================================================================

    /// Fetch the current user's profile.
    pub fn user_profile(&self) -> Result<User, ApiError> {
        self.get_authed("/user/profile")
    }

    /// Change the current user's password.
    pub fn update_password(&self, old_password: &str, new_password: &str) -> Result<(), ApiError> {
        let builder = self.authed(
            self.http
                .put(self.url("/user/password"))
                .json(&UpdatePasswordRequest {
                    old_password: old_password.to_string(),
                    new_password: new_password.to_string(),
                }),
        )?;
        Self::execute_unit(builder)
    }

    /// Fetch usage statistics for the current user.
    pub fn user_stats(&self) -> Result<UserStats, ApiError> {
        self.get_authed("/user/stats")
    }

    /// Fetch the current user's sessions.
    pub fn user_sessions(&self) -> Result<Vec<Session>, ApiError> {
        let resp: SessionListResponse = self.get_authed("/user/sessions")?;
        Ok(resp.sessions)
    }

    // =========================================================================
    // Nodes
    // =========================================================================

    /// List available nodes, optionally filtered by country and protocol.
    pub fn nodes(
        &self,
        country: Option<&str>,
        protocol: Option<&str>,
    ) -> Result<Vec<VpnNode>, ApiError> {
        let mut query: Vec<(&str, &str)> = Vec::new();
        if let Some(c) = country {
            query.push(("country", c));
        }
        if let Some(p) = protocol {
            query.push(("protocol", p));
        }

        let builder = self.authed(self.http.get(self.url("/nodes")).query(&query))?;
        let resp: NodeListResponse = Self::execute(builder)?;
        Ok(resp.nodes)
    }

    /// Fetch the backend's pick for the best node.
    pub fn best_node(&self) -> Result<VpnNode, ApiError> {
        self.get_authed("/nodes/best")
    }

    /// Fetch a single node by id.
    pub fn node(&self, node_id: &str) -> Result<VpnNode, ApiError> {
        self.get_authed(&format!("/nodes/{node_id}"))
    }

    // =========================================================================
    // Sessions
    // =========================================================================

    /// Create a VPN session on the backend.
    pub fn create_session(
        &self,
        node_id: &str,
        protocol: &str,
    ) -> Result<CreateSessionResponse, ApiError> {
        self.post_json(
            "/sessions",
            &CreateSessionRequest {
                node_id: node_id.to_string(),
                protocol: protocol.to_string(),
            },
            true,
        )
    }

    /// Fetch a session by id.
    pub fn get_session(&self, session_id: &str) -> Result<Session, ApiError> {
        self.get_authed(&format!("/sessions/{session_id}"))
    }

    /// Mark a session disconnected on the backend.
    pub fn disconnect_session(&self, session_id: &str) -> Result<(), ApiError> {
        let builder = self.authed(self.http.delete(self.url(&format!("/sessions/{session_id}"))))?;
        Self::execute_unit(builder)
    }

    // =========================================================================
    // Config / negotiation
    // =========================================================================

    /// Register our WireGuard public key with a node and receive the
    /// server-side peer parameters. This is the negotiation step the tunnel
    /// manager drives during connect.
    pub fn register_peer(&self, node_id: &str, public_key: &str) -> Result<PeerConfig, ApiError> {
        self.post_json(
            "/config/generate",
            &serde_json::json!({
                "node_id": node_id,
                "public_key": public_key,
            }),
            true,
        )
    }

    /// Generate a downloadable config server-side without creating a session.
    pub fn generate_config(
        &self,
        node_id: &str,
        protocol: &str,
    ) -> Result<GenerateConfigResponse, ApiError> {
        self.post_json(
            "/config/generate",
            &GenerateConfigRequest {
                node_id: node_id.to_string(),
                protocol: protocol.to_string(),
                public_key: None,
            },
            true,
        )
    }
}

impl Negotiator for ApiClient {
    fn negotiate(&self, node_id: &str, public_key: &str) -> anyhow::Result<TunnelParameters> {
        let peer = self.register_peer(node_id, public_key)?;
        Ok(TunnelParameters {
            client_address: peer.client_ip,
            server_public_key: peer.server_public_key,
            server_endpoint: peer.server_endpoint,
            dns: peer.dns,
        })
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_base_url() {
        assert!(matches!(ApiClient::new(""), Err(ApiError::Config(_))));
    }

    #[test]
    fn strips_trailing_slash_from_base_url() {
        let client = ApiClient::new("https://api.example.com/").expect("client");
        assert_eq!(client.url("/nodes"), "https://api.example.com/api/v1/nodes");
    }

    #[test]
    fn authenticated_requests_require_a_token() {
        let client = ApiClient::new("https://api.example.com").expect("client");
        assert!(matches!(
            client.user_profile(),
            Err(ApiError::Unauthenticated)
        ));
    }

    #[test]
    fn set_access_token_treats_empty_as_logout() {
        let mut client = ApiClient::new("https://api.example.com").expect("client");
        client.set_access_token("tok");
        assert!(client.has_access_token());
        client.set_access_token("");
        assert!(!client.has_access_token());
    }
}
