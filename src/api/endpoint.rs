use reqwest::Url;

use crate::error::AppError;

pub const DEFAULT_HOST: &str = "https://api.enphaseenergy.com";
pub const PATH_TOKEN: &str = "/oauth/token";
pub const PATH_SYSTEMS: &str = "/api/v4/systems";

/// Redirect URI registered for Enphase apps. Sent verbatim even when the host is overridden.
pub const REDIRECT_URI: &str = "https://api.enphaseenergy.com/oauth/redirect_uri";

/// Read-only resources under `/systems/{system_id}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemResource {
    Information,
    Summary,
    Devices,
}

impl SystemResource {
    pub fn segment(&self) -> Option<&'static str> {
        match self {
            SystemResource::Information => None,
            SystemResource::Summary => Some("summary"),
            SystemResource::Devices => Some("devices"),
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SystemResource::Information => "information",
            SystemResource::Summary => "summary",
            SystemResource::Devices => "devices",
        }
    }
}

impl std::fmt::Display for SystemResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// URL builder for the OAuth and v4 data endpoints of one host.
#[derive(Debug, Clone)]
pub struct Endpoints {
    host: String,
}

impl Endpoints {
    pub fn new(host: &str) -> Result<Self, AppError> {
        let host = host.trim_end_matches('/');
        let parsed = Url::parse(host)
            .map_err(|e| AppError::InvalidInput(format!("invalid base URL '{}': {}", host, e)))?;
        if parsed.cannot_be_a_base() {
            return Err(AppError::InvalidInput(format!(
                "invalid base URL '{}'",
                host
            )));
        }
        Ok(Self {
            host: host.to_string(),
        })
    }

    fn url(&self, path: &str) -> Result<Url, AppError> {
        let raw = format!("{}{}", self.host, path);
        Url::parse(&raw).map_err(|e| AppError::InvalidInput(format!("invalid URL '{}': {}", raw, e)))
    }

    /// `POST /oauth/token?grant_type=authorization_code&redirect_uri=..&code=..`
    pub fn authorization_code_url(&self, home_owner_code: &str) -> Result<Url, AppError> {
        let mut url = self.url(PATH_TOKEN)?;
        url.query_pairs_mut()
            .append_pair("grant_type", "authorization_code")
            .append_pair("redirect_uri", REDIRECT_URI)
            .append_pair("code", home_owner_code);
        Ok(url)
    }

    /// `POST /oauth/token?grant_type=refresh_token&refresh_token=..`
    pub fn refresh_token_url(&self, refresh_token: &str) -> Result<Url, AppError> {
        let mut url = self.url(PATH_TOKEN)?;
        url.query_pairs_mut()
            .append_pair("grant_type", "refresh_token")
            .append_pair("refresh_token", refresh_token);
        Ok(url)
    }

    /// `GET /api/v4/systems/{system_id}[/{segment}]?key={api_key}`
    pub fn system_url(
        &self,
        system_id: &str,
        resource: SystemResource,
        api_key: &str,
    ) -> Result<Url, AppError> {
        let mut url = self.url(PATH_SYSTEMS)?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| AppError::InvalidInput(format!("invalid base URL '{}'", self.host)))?;
            segments.push(system_id);
            if let Some(segment) = resource.segment() {
                segments.push(segment);
            }
        }
        url.query_pairs_mut().append_pair("key", api_key);
        Ok(url)
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
        }
    }
}
