//! Environment configuration, read once at startup.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use crate::contacts::GoogleCredentials;
use crate::error::ConfigError;
use crate::task::ListIds;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_SINK_TIMEOUT_SECS: u64 = 10;

/// Relay configuration.
#[derive(Debug)]
pub struct RelayConfig {
    /// Port the webhook server listens on.
    pub port: u16,
    /// ClickUp API token, sent as the Authorization header.
    pub access_token: SecretString,
    /// Destination list ids, one per event category.
    pub lists: ListIds,
    /// Timeout for outbound task-creation requests.
    pub sink_timeout: Duration,
    /// Optional path to an external directory table; the embedded table
    /// is used when absent.
    pub directory_path: Option<PathBuf>,
    /// Google OAuth credentials; contacts lookup is disabled when absent.
    pub google: Option<GoogleCredentials>,
}

impl RelayConfig {
    /// Read configuration from the environment.
    ///
    /// The Google triple is all-or-nothing: a partial set is a
    /// configuration error rather than a silently disabled lookup.
    pub fn from_env() -> Result<Self, ConfigError> {
        let access_token = SecretString::from(required(
            "CLICKUP_ACCESS_TOKEN",
            "Generate one under ClickUp settings → Apps.",
        )?);
        let lists = ListIds {
            text: required("TEXT_LIST_ID", "List id for text-derived tasks.")?,
            voicemail: required("VOICEMAIL_LIST_ID", "List id for voicemail-derived tasks.")?,
        };

        let port = match std::env::var("PORT") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                key: "PORT".to_string(),
                message: format!("not a valid port number: {raw}"),
            })?,
            Err(_) => DEFAULT_PORT,
        };

        let sink_timeout = match std::env::var("RELAY_SINK_TIMEOUT_SECS") {
            Ok(raw) => {
                let secs: u64 = raw.parse().map_err(|_| ConfigError::InvalidValue {
                    key: "RELAY_SINK_TIMEOUT_SECS".to_string(),
                    message: format!("not a number of seconds: {raw}"),
                })?;
                Duration::from_secs(secs)
            }
            Err(_) => Duration::from_secs(DEFAULT_SINK_TIMEOUT_SECS),
        };

        let directory_path = std::env::var("RELAY_DIRECTORY_PATH")
            .ok()
            .map(PathBuf::from);

        let google = google_from_env()?;

        Ok(Self {
            port,
            access_token,
            lists,
            sink_timeout,
            directory_path,
            google,
        })
    }
}

fn required(key: &str, hint: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingRequired {
        key: key.to_string(),
        hint: hint.to_string(),
    })
}

fn google_from_env() -> Result<Option<GoogleCredentials>, ConfigError> {
    let client_id = std::env::var("GOOGLE_CLIENT_ID").ok();
    let client_secret = std::env::var("GOOGLE_CLIENT_SECRET").ok();
    let refresh_token = std::env::var("GOOGLE_REFRESH_TOKEN").ok();

    match (client_id, client_secret, refresh_token) {
        (Some(client_id), Some(client_secret), Some(refresh_token)) => {
            Ok(Some(GoogleCredentials {
                client_id,
                client_secret: SecretString::from(client_secret),
                refresh_token: SecretString::from(refresh_token),
            }))
        }
        (None, None, None) => Ok(None),
        _ => Err(ConfigError::InvalidValue {
            key: "GOOGLE_CLIENT_ID/GOOGLE_CLIENT_SECRET/GOOGLE_REFRESH_TOKEN".to_string(),
            message: "set all three to enable contacts lookup, or none to disable it"
                .to_string(),
        }),
    }
}
