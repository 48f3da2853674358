/// Credential entry model and refresh policy
use crate::exchange::TokenGrant;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// How long before actual expiry a token is refreshed proactively.
pub const REFRESH_WINDOW_SECS: u64 = 10 * 60;

/// OAuth2 credentials for one named external service.
///
/// `access_token`, `refresh_token` and `expires_at` start out empty/zero
/// and are filled in by the first successful authorization. An empty
/// `refresh_token` means the site has never completed the code flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Site {
    pub name: String,

    pub client_id: String,
    pub client_secret: String,

    /// Endpoint the operator authorizes against.
    pub auth_url: String,
    /// Endpoint both grant exchanges POST to.
    pub token_url: String,

    /// Space-joined when transmitted.
    #[serde(default)]
    pub scopes: Vec<String>,

    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: String,

    /// Absolute unix seconds. Derived from `now + expires_in` of the most
    /// recent successful exchange; written back to the config but never
    /// hand-authored.
    #[serde(default)]
    pub expires_at: u64,
}

impl Site {
    /// Whether the site has ever completed the authorization-code flow.
    pub fn is_authorized(&self) -> bool {
        !self.refresh_token.is_empty()
    }

    /// Whether the access token is inside the proactive refresh window.
    pub fn needs_refresh(&self, now: u64) -> bool {
        self.expires_at <= now + REFRESH_WINDOW_SECS
    }

    /// Apply a successful exchange result.
    ///
    /// All three token fields move together; a refresh response that omits
    /// a new refresh token keeps the previous one.
    pub fn apply_grant(&mut self, grant: &TokenGrant, now: u64) {
        self.access_token = grant.access_token.clone();
        if let Some(refresh_token) = &grant.refresh_token {
            self.refresh_token = refresh_token.clone();
        }
        self.expires_at = now + grant.expires_in;
    }
}

/// The full credential set, one `[[sites]]` table per entry.
///
/// Order is processing order and is preserved across load/save.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteConfig {
    #[serde(default)]
    pub sites: Vec<Site>,
}

/// Current time as unix seconds.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
