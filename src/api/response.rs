use reqwest::StatusCode;
use serde_json::{Map, Value};

use crate::auth::token::TokenResponse;
use crate::error::AppError;

/// Map a token endpoint reply. Every non-2xx status is an authentication failure.
pub fn parse_token_response(status: StatusCode, body: String) -> Result<TokenResponse, AppError> {
    if !status.is_success() {
        return Err(AppError::Auth {
            status: status.as_u16(),
            body,
        });
    }
    Ok(serde_json::from_str(&body)?)
}

/// Map a data endpoint reply into the untouched JSON object.
///
/// 401 means the access token was rejected and surfaces as [`AppError::Auth`] so
/// the caller can refresh; any other non-2xx is [`AppError::Api`].
pub fn parse_data_response(status: StatusCode, body: String) -> Result<Map<String, Value>, AppError> {
    if status == StatusCode::UNAUTHORIZED {
        return Err(AppError::Auth {
            status: status.as_u16(),
            body,
        });
    }
    if !status.is_success() {
        return Err(AppError::Api {
            status: status.as_u16(),
            body,
        });
    }
    Ok(serde_json::from_str(&body)?)
}
