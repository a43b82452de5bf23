use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// `Authorization` value for the OAuth token endpoint: `Basic base64(client_id:client_secret)`.
pub fn basic_auth_header(client_id: &str, client_secret: &str) -> String {
    let raw = format!("{}:{}", client_id, client_secret);
    format!("Basic {}", STANDARD.encode(raw.as_bytes()))
}

/// `Authorization` value for data endpoints.
pub fn bearer_auth_header(access_token: &str) -> String {
    format!("Bearer {}", access_token)
}
