use anyhow::{Context, Result};
use std::fmt;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crate::error::StartupError;

pub const API_KEY_NAME: &str = "GEMINI_API_KEY";
pub const DEFAULT_SECRETS_PATH: &str = ".streamlit/secrets.toml";

#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub bind_addr: SocketAddr,
    pub secrets_path: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            gemini_model: std::env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| "gemini-2.5-flash-preview-09-2025".into()),
            gemini_base_url: std::env::var("GEMINI_BASE_URL")
                .unwrap_or_else(|_| "https://generativelanguage.googleapis.com/v1beta".into()),
            bind_addr: std::env::var("BIND_ADDR")
                .unwrap_or_else(|_| "127.0.0.1:8501".into())
                .parse()
                .context("BIND_ADDR must be a socket address")?,
            secrets_path: std::env::var("SEARCH_AGENT_SECRETS")
                .unwrap_or_else(|_| DEFAULT_SECRETS_PATH.into())
                .into(),
        })
    }
}

/// API credential. `Debug` never shows the token.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(****)")
    }
}

/// Top-level string entries of a TOML secrets file.
#[derive(Debug, Default)]
pub struct SecretStore {
    values: toml::Table,
}

impl SecretStore {
    /// A missing file is an empty store; a file that exists must parse.
    pub fn load(path: &Path) -> Result<Self, StartupError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no secrets file");
                return Ok(Self::default());
            }
            Err(err) => {
                return Err(StartupError::SecretsFile {
                    path: path.to_path_buf(),
                    message: err.to_string(),
                })
            }
        };

        Self::parse(&content).map_err(|message| StartupError::SecretsFile {
            path: path.to_path_buf(),
            message,
        })
    }

    pub fn parse(content: &str) -> Result<Self, String> {
        let values = content.parse::<toml::Table>().map_err(|e| e.to_string())?;
        Ok(Self { values })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(|v| v.as_str())
    }
}

pub fn load_credential(secrets: &SecretStore) -> Result<Credential, StartupError> {
    load_credential_with(secrets, |key| std::env::var(key).ok())
}

/// Secrets store first, then `env`. Blank values count as absent.
pub fn load_credential_with<F>(secrets: &SecretStore, env: F) -> Result<Credential, StartupError>
where
    F: Fn(&str) -> Option<String>,
{
    let from_secrets = secrets
        .get(API_KEY_NAME)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string);

    let token = match from_secrets {
        Some(token) => {
            tracing::debug!("credential resolved from secrets file");
            Some(token)
        }
        None => env(API_KEY_NAME)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty()),
    };

    token.map(Credential::new).ok_or_else(|| StartupError::MissingCredential {
        key: API_KEY_NAME.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn secrets_file_wins_over_environment() {
        let secrets = SecretStore::parse(r#"GEMINI_API_KEY = "from-secrets""#).unwrap();
        let credential =
            load_credential_with(&secrets, |_| Some("from-env".to_string())).unwrap();
        assert_eq!(credential.expose(), "from-secrets");
    }

    #[test]
    fn falls_back_to_environment() {
        let secrets = SecretStore::parse("OTHER = \"x\"").unwrap();
        let credential = load_credential_with(&secrets, |key| {
            (key == API_KEY_NAME).then(|| "from-env".to_string())
        })
        .unwrap();
        assert_eq!(credential.expose(), "from-env");
    }

    #[test]
    fn blank_secret_falls_through_to_environment() {
        let secrets = SecretStore::parse(r#"GEMINI_API_KEY = "  ""#).unwrap();
        let credential = load_credential_with(&secrets, |_| Some("env-key".into())).unwrap();
        assert_eq!(credential.expose(), "env-key");
    }

    #[test]
    fn missing_everywhere_is_fatal() {
        let err = load_credential_with(&SecretStore::default(), no_env).unwrap_err();
        assert!(matches!(err, StartupError::MissingCredential { ref key } if key == API_KEY_NAME));

        let err = load_credential_with(&SecretStore::default(), |_| Some(String::new()))
            .unwrap_err();
        assert!(matches!(err, StartupError::MissingCredential { .. }));
    }

    #[test]
    fn non_string_secret_is_ignored() {
        let secrets = SecretStore::parse("GEMINI_API_KEY = 42").unwrap();
        assert!(load_credential_with(&secrets, no_env).is_err());
    }

    #[test]
    fn missing_secrets_file_is_empty_store() {
        let store = SecretStore::load(Path::new("/nonexistent/dir/secrets.toml")).unwrap();
        assert!(store.get(API_KEY_NAME).is_none());
    }

    #[test]
    fn malformed_secrets_file_is_an_error() {
        let path = std::env::temp_dir().join(format!("secrets-{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(&path, "GEMINI_API_KEY = ").unwrap();
        let err = SecretStore::load(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(matches!(err, StartupError::SecretsFile { .. }));
    }

    #[test]
    fn credential_debug_is_redacted() {
        let credential = Credential::new("super-secret");
        assert!(!format!("{:?}", credential).contains("super-secret"));
    }
}
