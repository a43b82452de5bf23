use std::path::{Path, PathBuf};

use clap::ValueEnum;

use crate::api::{EnphaseApi, Endpoints};
use crate::auth::source::{CredentialSource, EnvSource, FileSource, HybridSource};
use crate::error::AppError;

pub const CONFIG_FILE_NAME: &str = "enphase-configuration.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Json,
    Table,
}

/// Where credentials are read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceKind {
    /// `ENPHASE_*` environment variables only
    Env,
    /// The JSON configuration file only
    File,
    /// Environment variables, falling back to the configuration file
    Hybrid,
}

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub output_mode: OutputMode,
    pub source: SourceKind,
    pub config_path: PathBuf,
    pub base_url: Option<String>,
}

impl RuntimeConfig {
    pub fn credential_source(&self) -> Box<dyn CredentialSource> {
        match self.source {
            SourceKind::Env => Box::new(EnvSource::new()),
            SourceKind::File => Box::new(FileSource::new(&self.config_path)),
            SourceKind::Hybrid => Box::new(HybridSource::new(&self.config_path)),
        }
    }

    pub fn endpoints(&self) -> Result<Endpoints, AppError> {
        match &self.base_url {
            Some(url) => Endpoints::new(url),
            None => Ok(Endpoints::default()),
        }
    }

    /// Load credentials and build a client against the configured host.
    pub fn api(&self) -> Result<EnphaseApi, AppError> {
        let source = self.credential_source();
        EnphaseApi::from_source(source.as_ref(), self.endpoints()?)
    }
}

/// `./enphase-configuration.json` if present, otherwise the per-user config directory.
pub fn default_config_path() -> PathBuf {
    let local = Path::new(CONFIG_FILE_NAME);
    if local.exists() {
        return local.to_path_buf();
    }
    match dirs::config_dir() {
        Some(dir) => dir.join("enphase").join(CONFIG_FILE_NAME),
        None => local.to_path_buf(),
    }
}
