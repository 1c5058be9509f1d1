// Settings loading: when no --token flag is given, the token comes
// from a `settings.json` file in the current directory, or failing
// that, one in the user's home directory.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct Settings {
    #[serde(default)]
    token: String,
}

fn candidate_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("settings.json")];
    if let Some(home) = dirs::home_dir() {
        paths.push(home.join("settings.json"));
    }
    paths
}

/// Read and validate the token from a settings file. A blank token is
/// an error: the file exists but was never filled in.
fn read_token(path: &Path) -> Result<String> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let settings: Settings = serde_json::from_str(&data)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    if settings.token.trim().is_empty() {
        bail!("Blank token in {}", path.display());
    }
    Ok(settings.token)
}

/// Locate a settings file and return its token. Missing settings are
/// fatal at startup, matching the missing-credentials contract.
pub fn load_token() -> Result<String> {
    for path in candidate_paths() {
        if path.exists() {
            return read_token(&path);
        }
    }
    bail!("Could not locate settings.json. Put one in the working directory or pass --token");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn temp_settings(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("emote-dump-test-{name}-{}", std::process::id()));
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn reads_token_from_settings() {
        let path = temp_settings("ok", r#"{"token": "abc123"}"#);
        assert_eq!(read_token(&path).unwrap(), "abc123");
        fs::remove_file(path).unwrap();
    }

    #[test]
    fn blank_token_is_an_error() {
        let path = temp_settings("blank", r#"{"token": ""}"#);
        assert!(read_token(&path).is_err());
        fs::remove_file(path).unwrap();
    }

    #[test]
    fn missing_token_field_is_an_error() {
        let path = temp_settings("missing", r#"{}"#);
        assert!(read_token(&path).is_err());
        fs::remove_file(path).unwrap();
    }

    #[test]
    fn malformed_settings_is_an_error() {
        let path = temp_settings("malformed", "not json");
        assert!(read_token(&path).is_err());
        fs::remove_file(path).unwrap();
    }
}
