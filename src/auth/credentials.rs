use std::fmt;

use crate::auth::token::TokenPair;

pub const KEY_HOME_OWNER_CODE: &str = "ENPHASE_CODE";
pub const KEY_CLIENT_ID: &str = "ENPHASE_CLIENT_ID";
pub const KEY_CLIENT_SECRET: &str = "ENPHASE_CLIENT_SECRET";
pub const KEY_API_KEY: &str = "ENPHASE_API_KEY";
pub const KEY_SYSTEM_ID: &str = "ENPHASE_SYSTEM_ID";
pub const KEY_REFRESH_TOKEN: &str = "ENPHASE_REFRESH_TOKEN";
pub const KEY_ACCESS_TOKEN: &str = "ENPHASE_ACCESS_TOKEN";

pub const ALL_KEYS: [&str; 7] = [
    KEY_HOME_OWNER_CODE,
    KEY_CLIENT_ID,
    KEY_CLIENT_SECRET,
    KEY_API_KEY,
    KEY_SYSTEM_ID,
    KEY_REFRESH_TOKEN,
    KEY_ACCESS_TOKEN,
];

/// Static application credentials registered with the Enphase developer portal.
#[derive(Clone, PartialEq, Eq)]
pub struct AppCredentials {
    /// One-time code, only used for the first token issuance.
    pub home_owner_code: String,
    pub client_id: String,
    pub client_secret: String,
    pub api_key: String,
    pub system_id: String,
}

impl fmt::Debug for AppCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppCredentials")
            .field("home_owner_code", &"<redacted>")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("api_key", &"<redacted>")
            .field("system_id", &self.system_id)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub app: AppCredentials,
    /// `None` until tokens have been issued for this app.
    pub tokens: Option<TokenPair>,
}

impl Credentials {
    pub fn new(app: AppCredentials, tokens: Option<TokenPair>) -> Self {
        Self { app, tokens }
    }

    pub fn has_tokens(&self) -> bool {
        self.tokens.is_some()
    }
}
