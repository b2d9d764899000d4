//! Error types

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CfmError {
    #[error("Failed to parse config file {}: {source}", path.display())]
    ConfigLoad {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to read config file {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to save config file {}: {reason}", path.display())]
    ConfigSave { path: PathBuf, reason: String },

    #[error("{kind} not found: {name}")]
    NotFound { kind: &'static str, name: String },

    #[error("No current account set. Use 'cfm account add' or 'cfm account switch'")]
    NoCurrentAccount,

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("{0} is not implemented in this version; please use the Cloudflare Dashboard")]
    Unimplemented(&'static str),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CfmError {
    pub fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            name: name.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CfmError>;
