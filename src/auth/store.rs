use std::fs;
use std::io::{self, Write};
use std::path::Path;

use serde_json::{Map, Value};

use crate::auth::credentials::{KEY_ACCESS_TOKEN, KEY_REFRESH_TOKEN};
use crate::auth::token::TokenPair;
use crate::error::AppError;

/// Write both tokens into the JSON configuration file at `path`, keeping all other keys.
///
/// The file is created if it does not exist. The new contents go to a uniquely
/// named temporary file in the same directory that is then renamed into place;
/// the temporary file is removed if anything fails.
pub fn save_tokens(path: &Path, tokens: &TokenPair) -> Result<(), AppError> {
    let mut contents = match fs::read_to_string(path) {
        Ok(raw) => match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(map)) => map,
            Ok(_) => {
                return Err(AppError::Configuration(format!(
                    "{} must contain a JSON object",
                    path.display()
                )))
            }
            Err(e) => {
                return Err(AppError::Configuration(format!(
                    "invalid JSON in {}: {}",
                    path.display(),
                    e
                )))
            }
        },
        Err(e) if e.kind() == io::ErrorKind::NotFound => Map::new(),
        Err(e) => return Err(e.into()),
    };

    contents.insert(
        KEY_ACCESS_TOKEN.into(),
        Value::String(tokens.access_token.clone()),
    );
    contents.insert(
        KEY_REFRESH_TOKEN.into(),
        Value::String(tokens.refresh_token.clone()),
    );

    let dir = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => {
            fs::create_dir_all(parent)?;
            parent
        }
        None => Path::new("."),
    };

    let serialized = serde_json::to_string_pretty(&Value::Object(contents))?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(serialized.as_bytes())?;
    tmp.persist(path).map_err(|e| e.error)?;

    tracing::debug!(path = %path.display(), "saved tokens");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(path: &Path) -> Value {
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn test_save_preserves_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("enphase-configuration.json");
        fs::write(
            &path,
            r#"{"ENPHASE_CLIENT_ID":"id","ENPHASE_ACCESS_TOKEN":"old","ENPHASE_REFRESH_TOKEN":"old-r","extra":1}"#,
        )
        .unwrap();

        save_tokens(&path, &TokenPair::new("A", "R")).unwrap();

        let saved = read(&path);
        assert_eq!(saved["ENPHASE_CLIENT_ID"], "id");
        assert_eq!(saved["extra"], 1);
        assert_eq!(saved["ENPHASE_ACCESS_TOKEN"], "A");
        assert_eq!(saved["ENPHASE_REFRESH_TOKEN"], "R");
    }

    #[test]
    fn test_save_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        save_tokens(&path, &TokenPair::new("A", "R")).unwrap();

        let saved = read(&path);
        assert_eq!(saved.as_object().unwrap().len(), 2);
        assert_eq!(saved["ENPHASE_ACCESS_TOKEN"], "A");
        let leftovers: Vec<_> = fs::read_dir(dir.path().join("nested"))
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(leftovers, vec![std::ffi::OsString::from("config.json")]);
    }

    #[test]
    fn test_save_refuses_to_clobber_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "not json").unwrap();

        let err = save_tokens(&path, &TokenPair::new("A", "R")).unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
        assert_eq!(fs::read_to_string(&path).unwrap(), "not json");
    }
}
