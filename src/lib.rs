pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod error;

pub use api::EnphaseApi;
pub use error::AppError;

use cli::output::print_error;
use config::{default_config_path, OutputMode, RuntimeConfig};
use tracing_subscriber::EnvFilter;

/// Install the stderr log subscriber. `RUST_LOG` wins over `verbose`.
pub fn init_logging(verbose: bool) {
    let default = if verbose {
        "enphase_home=debug"
    } else {
        "enphase_home=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

pub async fn run(cli_args: cli::Cli) -> i32 {
    let config = RuntimeConfig {
        output_mode: if cli_args.table {
            OutputMode::Table
        } else {
            OutputMode::Json
        },
        source: cli_args.source,
        config_path: cli_args.config.unwrap_or_else(default_config_path),
        base_url: cli_args.base_url,
    };

    let result = dispatch(cli_args.command, &config).await;

    match result {
        Ok(()) => 0,
        Err(err) => {
            print_error(&err);
            err.exit_code()
        }
    }
}

async fn dispatch(command: cli::Commands, config: &RuntimeConfig) -> Result<(), AppError> {
    match command {
        cli::Commands::Tokens(cmd) => cli::auth::handle(&cmd, config).await,
        cli::Commands::System(cmd) => cli::system::handle(&cmd, config).await,
        cli::Commands::Status => cli::auth::handle_status(config).await,
    }
}
