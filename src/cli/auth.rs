use clap::Subcommand;
use serde_json::json;

use crate::api::EnphaseApi;
use crate::auth::store;
use crate::auth::token::TokenResponse;
use crate::cli::output::print_output;
use crate::config::{RuntimeConfig, SourceKind};
use crate::error::AppError;

#[derive(Subcommand)]
pub enum TokensCommand {
    /// Exchange the home-owner code for the first access/refresh token pair
    Issue {
        /// Write the new tokens into the configuration file
        #[arg(long)]
        save: bool,
    },

    /// Trade the stored refresh token for a new pair (the old one stops working)
    Refresh {
        /// Write the new tokens into the configuration file
        #[arg(long)]
        save: bool,
    },
}

pub async fn handle(cmd: &TokensCommand, config: &RuntimeConfig) -> Result<(), AppError> {
    let api = config.api()?;
    match cmd {
        TokensCommand::Issue { save } => {
            let tokens = api.issue_initial_tokens().await?;
            finish(&api, &tokens, *save, config)
        }
        TokensCommand::Refresh { save } => {
            let tokens = api.refresh_tokens().await?;
            finish(&api, &tokens, *save, config)
        }
    }
}

fn finish(
    api: &EnphaseApi,
    tokens: &TokenResponse,
    save: bool,
    config: &RuntimeConfig,
) -> Result<(), AppError> {
    let mut out = json!({
        "system_id": api.system_id(),
        "access_token": tokens.access_token,
        "refresh_token": tokens.refresh_token,
        "token_type": tokens.token_type,
        "expires_in": tokens.expires_in,
    });

    if save {
        store::save_tokens(&config.config_path, &tokens.token_pair())?;
        out["saved_to"] = json!(config.config_path.display().to_string());
        if config.source == SourceKind::Env {
            tracing::warn!(
                path = %config.config_path.display(),
                "saved tokens will not be read with --source env; use --source file or hybrid"
            );
        }
    } else {
        tracing::warn!("tokens were not saved; pass --save to persist them");
    }

    print_output(&out, config.output_mode);
    Ok(())
}

pub async fn handle_status(config: &RuntimeConfig) -> Result<(), AppError> {
    let source = config.credential_source();
    let status = match source.load() {
        Ok(creds) => json!({
            "status": "configured",
            "source": source.describe(),
            "client_id": creds.app.client_id,
            "system_id": creds.app.system_id,
            "has_tokens": creds.has_tokens(),
        }),
        Err(AppError::Configuration(reason)) => json!({
            "status": "not_configured",
            "source": source.describe(),
            "reason": reason,
        }),
        Err(e) => return Err(e),
    };

    print_output(&status, config.output_mode);
    Ok(())
}
