use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use reqwest::header::AUTHORIZATION;
use reqwest::Url;
use serde_json::{Map, Value};

use super::basic_auth::{basic_auth_header, bearer_auth_header};
use super::endpoint::{Endpoints, SystemResource};
use super::response::{parse_data_response, parse_token_response};
use crate::auth::credentials::{AppCredentials, Credentials};
use crate::auth::source::CredentialSource;
use crate::auth::token::{TokenPair, TokenResponse};
use crate::error::AppError;

const USER_AGENT: &str = concat!("enphase-home/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the Enphase OAuth and v4 monitoring endpoints of one system.
///
/// The token pair is held behind a lock and always replaced whole, so the
/// client can be shared across tasks.
pub struct EnphaseApi {
    client: reqwest::Client,
    endpoints: Endpoints,
    app: AppCredentials,
    tokens: RwLock<Option<TokenPair>>,
}

fn build_http_client() -> Result<reqwest::Client, AppError> {
    Ok(reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(REQUEST_TIMEOUT)
        .build()?)
}

impl EnphaseApi {
    pub fn new(credentials: Credentials) -> Result<Self, AppError> {
        Self::with_endpoints(credentials, Endpoints::default())
    }

    pub fn with_endpoints(credentials: Credentials, endpoints: Endpoints) -> Result<Self, AppError> {
        Ok(Self {
            client: build_http_client()?,
            endpoints,
            app: credentials.app,
            tokens: RwLock::new(credentials.tokens),
        })
    }

    pub fn from_source(
        source: &dyn CredentialSource,
        endpoints: Endpoints,
    ) -> Result<Self, AppError> {
        Self::with_endpoints(source.load()?, endpoints)
    }

    pub fn system_id(&self) -> &str {
        &self.app.system_id
    }

    /// Snapshot of the currently held token pair.
    pub fn tokens(&self) -> Option<TokenPair> {
        self.tokens
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_tokens(&self, tokens: TokenPair) {
        *self.tokens.write().unwrap_or_else(PoisonError::into_inner) = Some(tokens);
    }

    /// Exchange the home-owner code for the first access/refresh token pair.
    ///
    /// On success the new pair replaces the one held by this client. Persisting
    /// it is up to the caller.
    pub async fn issue_initial_tokens(&self) -> Result<TokenResponse, AppError> {
        let url = self
            .endpoints
            .authorization_code_url(&self.app.home_owner_code)?;
        self.request_tokens(url).await
    }

    /// Trade the held refresh token for a new pair.
    ///
    /// Enphase invalidates the old refresh token as soon as this succeeds, so the
    /// returned pair must be persisted before the process exits or the next run
    /// has to start over with a new home-owner code.
    pub async fn refresh_tokens(&self) -> Result<TokenResponse, AppError> {
        let refresh_token = self
            .tokens()
            .map(|t| t.refresh_token)
            .ok_or(AppError::NotAuthenticated)?;
        let url = self.endpoints.refresh_token_url(&refresh_token)?;
        self.request_tokens(url).await
    }

    async fn request_tokens(&self, url: Url) -> Result<TokenResponse, AppError> {
        tracing::debug!(method = "POST", path = url.path(), "token request");

        let response = self
            .client
            .post(url)
            .header(
                AUTHORIZATION,
                basic_auth_header(&self.app.client_id, &self.app.client_secret),
            )
            .send()
            .await?;

        let status = response.status();
        let body = if status.is_success() {
            response.text().await?
        } else {
            response.text().await.unwrap_or_default()
        };
        tracing::debug!(status = status.as_u16(), "token response");

        let tokens = parse_token_response(status, body)?;
        self.set_tokens(tokens.token_pair());
        Ok(tokens)
    }

    pub async fn system_information(&self) -> Result<Map<String, Value>, AppError> {
        self.get_system(SystemResource::Information).await
    }

    pub async fn system_summary(&self) -> Result<Map<String, Value>, AppError> {
        self.get_system(SystemResource::Summary).await
    }

    pub async fn system_devices(&self) -> Result<Map<String, Value>, AppError> {
        self.get_system(SystemResource::Devices).await
    }

    /// GET one resource of the configured system. A 401 is reported as
    /// [`AppError::Auth`]; no refresh is attempted here.
    pub async fn get_system(&self, resource: SystemResource) -> Result<Map<String, Value>, AppError> {
        let access_token = self
            .tokens()
            .map(|t| t.access_token)
            .ok_or(AppError::NotAuthenticated)?;
        let url = self
            .endpoints
            .system_url(&self.app.system_id, resource, &self.app.api_key)?;

        tracing::debug!(method = "GET", path = url.path(), %resource, "data request");

        let response = self
            .client
            .get(url)
            .header(AUTHORIZATION, bearer_auth_header(&access_token))
            .send()
            .await?;

        let status = response.status();
        let body = if status.is_success() {
            response.text().await?
        } else {
            response.text().await.unwrap_or_default()
        };
        tracing::debug!(status = status.as_u16(), %resource, "data response");
        tracing::trace!(%body, "response body");

        parse_data_response(status, body)
    }
}
