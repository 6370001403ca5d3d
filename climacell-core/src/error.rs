use std::path::PathBuf;

use thiserror::Error;

use crate::api::Endpoint;

#[derive(Debug, Error)]
pub enum ClimacellError {
    #[error("Failed to build HTTP client")]
    Client(#[source] reqwest::Error),

    /// The request never produced a response (DNS, TLS, connection, timeout).
    #[error("Request to {endpoint} failed")]
    Transport {
        endpoint: Endpoint,
        #[source]
        source: reqwest::Error,
    },

    /// The service answered with a non-2xx status.
    #[error("{endpoint} request failed with status {status}: {message}")]
    Remote {
        endpoint: Endpoint,
        status: reqwest::StatusCode,
        message: String,
    },

    /// The response body did not match the expected shape. The source names
    /// the offending field when a single sample field failed.
    #[error("Failed to decode {endpoint} response: {source}")]
    Decode {
        endpoint: Endpoint,
        #[source]
        source: serde_json::Error,
    },

    #[error(
        "No API key configured.\n\
         Hint: set CLIMACELL_API_KEY or run `climacell configure` and enter your API key."
    )]
    MissingApiKey,

    #[error("Could not determine platform config directory")]
    ConfigDir,

    #[error("Failed to read config file: {}", .0.display())]
    ConfigRead(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse config file: {}", .0.display())]
    ConfigParse(PathBuf, #[source] toml::de::Error),

    #[error("Failed to write config file: {}", .0.display())]
    ConfigWrite(PathBuf, #[source] std::io::Error),

    #[error("Failed to serialize configuration to TOML")]
    ConfigSerialize(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, ClimacellError>;
