//! REST client for the Volant VPN backend.
//!
//! Authentication, node listing, session bookkeeping, and the peer
//! negotiation call consumed by the tunnel lifecycle manager, plus on-disk
//! persistence of the login session. Everything here is plain authenticated
//! CRUD over JSON — the interesting machinery lives in `volant-tunnel`.

pub mod client;
pub mod error;
pub mod models;
pub mod session;

pub use client::ApiClient;
pub use error::ApiError;
pub use session::{SessionData, SessionStore};
