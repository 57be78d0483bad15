//! Shared wiring: API URL resolution and authenticated-client construction.

use anyhow::{bail, Context, Result};

use volant_api::{ApiClient, ApiError, SessionData, SessionStore};

/// Backend used when neither `--api-url` nor a saved session supplies one.
pub const DEFAULT_API_URL: &str = "http://localhost:8080";

/// Resolve the backend URL: explicit flag/env wins, then the URL the saved
/// session was issued by, then the default.
pub fn resolve_api_url(flag: Option<&str>, saved: Option<&SessionData>) -> String {
    if let Some(url) = flag {
        return url.to_string();
    }
    if let Some(session) = saved {
        if !session.api_url.is_empty() {
            return session.api_url.clone();
        }
    }
    DEFAULT_API_URL.to_string()
}

/// An unauthenticated client plus the session store, for login/register.
///
/// Also returns the URL the client was built for, so that the session saved
/// after a successful login records the backend the tokens actually came
/// from — not a second, independently resolved URL.
pub fn anonymous(api_url: Option<&str>) -> Result<(ApiClient, SessionStore, String)> {
    let store = SessionStore::default_location()?;
    let saved = store.load().unwrap_or_default();
    let url = resolve_api_url(api_url, saved.as_ref());
    let client = ApiClient::new(&url).context("invalid API URL")?;
    Ok((client, store, url))
}

/// An authenticated client restored from the saved session.
///
/// The saved token is validated against the profile endpoint; an expired
/// token is refreshed once, and a session that cannot be revived is deleted
/// so the next command prompts for a fresh login.
pub fn authenticated(api_url: Option<&str>) -> Result<(ApiClient, SessionStore, SessionData)> {
    let store = SessionStore::default_location()?;
    let Some(mut session) = store.load().context("failed to read saved session")? else {
        bail!("not logged in — run `volant login` first");
    };

    let url = resolve_api_url(api_url, Some(&session));
    let mut client = ApiClient::new(&url).context("invalid API URL")?;
    client.set_access_token(&session.access_token);

    match client.user_profile() {
        Ok(user) => {
            session.user = user;
            Ok((client, store, session))
        }
        Err(ApiError::Api { status: 401, .. }) => {
            tracing::debug!("access token expired, attempting refresh");
            match client.refresh_token(&session.refresh_token) {
                Ok(token) => {
                    session.access_token = token;
                    store.save(&session)?;
                    Ok((client, store, session))
                }
                Err(_) => {
                    store.delete()?;
                    bail!("session expired — run `volant login` again");
                }
            }
        }
        Err(e) => Err(e).context("failed to validate saved session"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_wins_over_saved_url() {
        assert_eq!(
            resolve_api_url(Some("https://flag.example"), None),
            "https://flag.example"
        );
    }

    #[test]
    fn falls_back_to_default_url() {
        assert_eq!(resolve_api_url(None, None), DEFAULT_API_URL);
    }

    #[test]
    fn saved_session_url_wins_without_flag() {
        let session = SessionData {
            access_token: "at".into(),
            refresh_token: "rt".into(),
            user: volant_api::models::User {
                id: "u1".into(),
                email: "a@b.c".into(),
                username: "ab".into(),
                full_name: String::new(),
                subscription_tier: String::new(),
                is_active: true,
                is_admin: false,
                data_transferred_gb: 0.0,
                connection_count: 0,
                created_at: String::new(),
            },
            api_url: "https://backend-x.example".into(),
        };

        // The URL a re-login request goes to and the URL persisted with the
        // fresh tokens must both come from this one resolution.
        assert_eq!(
            resolve_api_url(None, Some(&session)),
            "https://backend-x.example"
        );
        // An explicit flag still overrides the saved backend.
        assert_eq!(
            resolve_api_url(Some("https://flag.example"), Some(&session)),
            "https://flag.example"
        );
    }
}
