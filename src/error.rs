#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Authentication failed ({status}): {body}")]
    Auth { status: u16, body: String },

    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Not authenticated. Run 'enphase tokens issue' or 'enphase tokens refresh' first.")]
    NotAuthenticated,

    #[error("{0}")]
    InvalidInput(String),

    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// HTTP status reported by the provider, if the error came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            AppError::Auth { status, .. } | AppError::Api { status, .. } => Some(*status),
            AppError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Raw provider response body, if any.
    pub fn body(&self) -> Option<&str> {
        match self {
            AppError::Auth { body, .. } | AppError::Api { body, .. } => Some(body),
            _ => None,
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Auth { .. } | AppError::NotAuthenticated => 2,
            AppError::Configuration(_) => 3,
            _ => 1,
        }
    }

    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::Configuration(_) => "configuration",
            AppError::Auth { .. } => "auth",
            AppError::Api { .. } => "api",
            AppError::NotAuthenticated => "not_authenticated",
            AppError::InvalidInput(_) => "invalid_input",
            AppError::Transport(_) => "transport",
            AppError::Json(_) => "json",
            AppError::Io(_) => "io",
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        let mut obj = serde_json::json!({
            "error": self.error_type(),
            "message": self.to_string(),
        });
        if let Some(status) = self.status() {
            obj["status"] = serde_json::json!(status);
        }
        obj
    }
}
