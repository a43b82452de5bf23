use std::collections::HashMap;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::auth::credentials::*;
use crate::auth::token::TokenPair;
use crate::error::AppError;

/// Anything that can produce a [`Credentials`] value for the client.
pub trait CredentialSource {
    fn load(&self) -> Result<Credentials, AppError>;

    /// Short human-readable origin, used in logs and `status` output.
    fn describe(&self) -> String;
}

type Lookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Reads `ENPHASE_*` variables from the process environment.
pub struct EnvSource {
    lookup: Lookup,
}

impl EnvSource {
    pub fn new() -> Self {
        Self::with_lookup(|key| env::var(key).ok())
    }

    /// Use an arbitrary key lookup instead of the process environment.
    pub fn with_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            lookup: Box::new(lookup),
        }
    }

    fn get(&self, key: &str) -> Option<String> {
        non_empty((self.lookup)(key))
    }
}

impl Default for EnvSource {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialSource for EnvSource {
    fn load(&self) -> Result<Credentials, AppError> {
        build_credentials(&self.describe(), |key| self.get(key))
    }

    fn describe(&self) -> String {
        "environment".into()
    }
}

/// Reads a JSON object with `ENPHASE_*` keys from disk.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `Ok(None)` when the file does not exist.
    fn read_values(&self) -> Result<Option<HashMap<String, String>>, AppError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(AppError::Configuration(format!(
                    "cannot read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };
        parse_values(&contents, &self.path).map(Some)
    }
}

impl CredentialSource for FileSource {
    fn load(&self) -> Result<Credentials, AppError> {
        let values = self.read_values()?.ok_or_else(|| {
            AppError::Configuration(format!(
                "configuration file {} not found",
                self.path.display()
            ))
        })?;
        build_credentials(&self.describe(), |key| values.get(key).cloned())
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}

/// Environment first, JSON file for whatever the environment leaves unset.
///
/// Tokens are the exception: they are taken as one pair from a single origin,
/// and the file's pair wins because that is where refreshed tokens are saved.
pub struct HybridSource {
    file: FileSource,
    env: EnvSource,
}

impl HybridSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_env(path, EnvSource::new())
    }

    pub fn with_env(path: impl Into<PathBuf>, env: EnvSource) -> Self {
        Self {
            file: FileSource::new(path),
            env,
        }
    }
}

impl CredentialSource for HybridSource {
    fn load(&self) -> Result<Credentials, AppError> {
        let file_values = self.file.read_values()?.unwrap_or_default();
        let from_file = |key: &str| file_values.get(key).cloned();
        let from_env = |key: &str| self.env.get(key);

        let app = app_credentials(&self.describe(), &|key: &str| {
            from_env(key).or_else(|| from_file(key))
        })?;

        let file_pair = token_pair(&self.file.describe(), &from_file)?;
        let env_pair = token_pair(&self.env.describe(), &from_env)?;
        if file_pair.is_some() && env_pair.is_some() {
            tracing::debug!("tokens set in both environment and file; using the file's pair");
        }
        let tokens = file_pair.or(env_pair);

        tracing::debug!(origin = %self.describe(), has_tokens = tokens.is_some(), "loaded credentials");
        Ok(Credentials::new(app, tokens))
    }

    fn describe(&self) -> String {
        format!("environment + {}", self.file.describe())
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_values(contents: &str, path: &Path) -> Result<HashMap<String, String>, AppError> {
    let root: Value = serde_json::from_str(contents).map_err(|e| {
        AppError::Configuration(format!("invalid JSON in {}: {}", path.display(), e))
    })?;
    let obj = root.as_object().ok_or_else(|| {
        AppError::Configuration(format!("{} must contain a JSON object", path.display()))
    })?;

    let mut values = HashMap::new();
    for key in ALL_KEYS {
        let value = match obj.get(key) {
            None | Some(Value::Null) => continue,
            Some(Value::String(s)) => s.clone(),
            // System ids are often written as bare numbers.
            Some(Value::Number(n)) => n.to_string(),
            Some(_) => {
                return Err(AppError::Configuration(format!(
                    "{} in {} must be a string",
                    key,
                    path.display()
                )))
            }
        };
        if let Some(v) = non_empty(Some(value)) {
            values.insert(key.to_string(), v);
        }
    }
    Ok(values)
}

fn build_credentials<F>(origin: &str, get: F) -> Result<Credentials, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    let app = app_credentials(origin, &get)?;
    let tokens = token_pair(origin, &get)?;

    tracing::debug!(origin, has_tokens = tokens.is_some(), "loaded credentials");

    Ok(Credentials::new(app, tokens))
}

fn app_credentials<F>(origin: &str, get: &F) -> Result<AppCredentials, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut missing = Vec::new();
    let mut required = |key: &'static str| {
        get(key).unwrap_or_else(|| {
            missing.push(key);
            String::new()
        })
    };

    let app = AppCredentials {
        home_owner_code: required(KEY_HOME_OWNER_CODE),
        client_id: required(KEY_CLIENT_ID),
        client_secret: required(KEY_CLIENT_SECRET),
        api_key: required(KEY_API_KEY),
        system_id: required(KEY_SYSTEM_ID),
    };

    if !missing.is_empty() {
        return Err(AppError::Configuration(format!(
            "{}: missing {}",
            origin,
            missing.join(", ")
        )));
    }
    Ok(app)
}

/// Both tokens or neither; one without the other is a configuration error.
fn token_pair<F>(origin: &str, get: &F) -> Result<Option<TokenPair>, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    match (get(KEY_ACCESS_TOKEN), get(KEY_REFRESH_TOKEN)) {
        (Some(access), Some(refresh)) => Ok(Some(TokenPair::new(access, refresh))),
        (None, None) => Ok(None),
        _ => Err(AppError::Configuration(format!(
            "{}: {} and {} must be set together",
            origin, KEY_ACCESS_TOKEN, KEY_REFRESH_TOKEN
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn env_from(pairs: &[(&str, &str)]) -> EnvSource {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        EnvSource::with_lookup(move |key| map.get(key).cloned())
    }

    const STATIC: [(&str, &str); 5] = [
        (KEY_HOME_OWNER_CODE, "code"),
        (KEY_CLIENT_ID, "id"),
        (KEY_CLIENT_SECRET, "secret"),
        (KEY_API_KEY, "K"),
        (KEY_SYSTEM_ID, "123"),
    ];

    fn write_config(json: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_env_source_loads_static_fields() {
        let creds = env_from(&STATIC).load().unwrap();
        assert_eq!(creds.app.client_id, "id");
        assert_eq!(creds.app.system_id, "123");
        assert!(creds.tokens.is_none());
    }

    #[test]
    fn test_env_source_reports_every_missing_key() {
        let err = env_from(&[(KEY_CLIENT_ID, "id")]).load().unwrap_err();
        let msg = err.to_string();
        assert!(matches!(err, AppError::Configuration(_)));
        assert!(msg.contains(KEY_HOME_OWNER_CODE));
        assert!(msg.contains(KEY_API_KEY));
        assert!(!msg.contains(KEY_CLIENT_ID));
    }

    #[test]
    fn test_empty_value_counts_as_missing() {
        let mut pairs = STATIC.to_vec();
        pairs[3] = (KEY_API_KEY, "  ");
        let err = env_from(&pairs).load().unwrap_err();
        assert!(err.to_string().contains(KEY_API_KEY));
    }

    #[test]
    fn test_half_token_pair_is_rejected() {
        let mut pairs = STATIC.to_vec();
        pairs.push((KEY_ACCESS_TOKEN, "A"));
        let err = env_from(&pairs).load().unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
    }

    #[test]
    fn test_full_token_pair_is_loaded() {
        let mut pairs = STATIC.to_vec();
        pairs.push((KEY_ACCESS_TOKEN, "A"));
        pairs.push((KEY_REFRESH_TOKEN, "R"));
        let creds = env_from(&pairs).load().unwrap();
        assert_eq!(creds.tokens, Some(TokenPair::new("A", "R")));
    }

    #[test]
    fn test_file_source_accepts_numeric_system_id() {
        let file = write_config(
            r#"{
                "ENPHASE_CODE": "code",
                "ENPHASE_CLIENT_ID": "id",
                "ENPHASE_CLIENT_SECRET": "secret",
                "ENPHASE_API_KEY": "K",
                "ENPHASE_SYSTEM_ID": 123,
                "ENPHASE_ACCESS_TOKEN": "A",
                "ENPHASE_REFRESH_TOKEN": "R"
            }"#,
        );
        let creds = FileSource::new(file.path()).load().unwrap();
        assert_eq!(creds.app.system_id, "123");
        assert!(creds.has_tokens());
    }

    #[test]
    fn test_file_source_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = FileSource::new(dir.path().join("nope.json"))
            .load()
            .unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_file_source_rejects_non_object() {
        let file = write_config("[1, 2, 3]");
        let err = FileSource::new(file.path()).load().unwrap_err();
        assert!(err.to_string().contains("JSON object"));
    }

    #[test]
    fn test_file_source_rejects_invalid_json() {
        let file = write_config("{not json");
        let err = FileSource::new(file.path()).load().unwrap_err();
        assert!(err.to_string().contains("invalid JSON"));
    }

    #[test]
    fn test_file_source_rejects_non_string_value() {
        let file = write_config(r#"{"ENPHASE_CLIENT_ID": {"nested": true}}"#);
        let err = FileSource::new(file.path()).load().unwrap_err();
        assert!(err.to_string().contains("must be a string"));
    }

    #[test]
    fn test_hybrid_prefers_environment() {
        let file = write_config(
            r#"{
                "ENPHASE_CODE": "code",
                "ENPHASE_CLIENT_ID": "file-id",
                "ENPHASE_CLIENT_SECRET": "secret",
                "ENPHASE_API_KEY": "K",
                "ENPHASE_SYSTEM_ID": "123"
            }"#,
        );
        let env = env_from(&[(KEY_CLIENT_ID, "env-id")]);
        let creds = HybridSource::with_env(file.path(), env).load().unwrap();
        assert_eq!(creds.app.client_id, "env-id");
        assert_eq!(creds.app.api_key, "K");
    }

    const FILE_WITH_TOKENS: &str = r#"{
        "ENPHASE_CODE": "code",
        "ENPHASE_CLIENT_ID": "id",
        "ENPHASE_CLIENT_SECRET": "secret",
        "ENPHASE_API_KEY": "K",
        "ENPHASE_SYSTEM_ID": "123",
        "ENPHASE_ACCESS_TOKEN": "fileA",
        "ENPHASE_REFRESH_TOKEN": "fileR"
    }"#;

    #[test]
    fn test_hybrid_rejects_half_pair_in_environment() {
        let file = write_config(FILE_WITH_TOKENS);
        let env = env_from(&[(KEY_ACCESS_TOKEN, "envA")]);
        let err = HybridSource::with_env(file.path(), env).load().unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
        assert!(err.to_string().contains("must be set together"));
    }

    #[test]
    fn test_hybrid_never_mixes_token_origins() {
        let file = write_config(
            r#"{
                "ENPHASE_CODE": "code",
                "ENPHASE_CLIENT_ID": "id",
                "ENPHASE_CLIENT_SECRET": "secret",
                "ENPHASE_API_KEY": "K",
                "ENPHASE_SYSTEM_ID": "123",
                "ENPHASE_REFRESH_TOKEN": "fileR"
            }"#,
        );
        let env = env_from(&[(KEY_ACCESS_TOKEN, "envA"), (KEY_REFRESH_TOKEN, "envR")]);
        let err = HybridSource::with_env(file.path(), env).load().unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
    }

    #[test]
    fn test_hybrid_file_token_pair_wins() {
        let file = write_config(FILE_WITH_TOKENS);
        let env = env_from(&[(KEY_ACCESS_TOKEN, "envA"), (KEY_REFRESH_TOKEN, "envR")]);
        let creds = HybridSource::with_env(file.path(), env).load().unwrap();
        assert_eq!(creds.tokens, Some(TokenPair::new("fileA", "fileR")));
    }

    #[test]
    fn test_hybrid_uses_environment_pair_when_file_has_none() {
        let mut pairs = STATIC.to_vec();
        pairs.push((KEY_ACCESS_TOKEN, "envA"));
        pairs.push((KEY_REFRESH_TOKEN, "envR"));
        let dir = tempfile::tempdir().unwrap();
        let source = HybridSource::with_env(dir.path().join("absent.json"), env_from(&pairs));
        let creds = source.load().unwrap();
        assert_eq!(creds.tokens, Some(TokenPair::new("envA", "envR")));
    }

    #[test]
    fn test_hybrid_tolerates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = HybridSource::with_env(dir.path().join("absent.json"), env_from(&STATIC));
        let creds = source.load().unwrap();
        assert_eq!(creds.app.system_id, "123");
    }

    #[test]
    fn test_hybrid_still_rejects_broken_file() {
        let file = write_config("{");
        let source = HybridSource::with_env(file.path(), env_from(&STATIC));
        assert!(matches!(source.load(), Err(AppError::Configuration(_))));
    }
}
