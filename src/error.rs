use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SeamlessError {
    #[error("Error reading password file {path:?}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Error fetching {url}: {reason}")]
    Network { url: String, reason: String },
    #[error("Error decoding JSON: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("No assets found in the latest release of {0}")]
    NoAssets(String),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Error creating temp file: {0}")]
    TempFile(#[source] io::Error),
    #[error("Error unzipping file to {path:?}: {source}")]
    Extract {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Error loading INI file {path:?}: {source}")]
    LoadSettings {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Error saving INI file {path:?}: {source}")]
    SaveSettings {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Value for {key} contains a line break or other control character")]
    InvalidValue { key: String },
    #[error("Error parsing INI file: {0}")]
    Parse(#[from] ini::ParseError),
    #[error("Error unzipping file: {0}")]
    Archive(#[from] zip::result::ZipError),
    #[error("Illegal file path in archive: {0}")]
    UnsafePath(String),
}

impl SeamlessError {
    pub(crate) fn network(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::Network {
            url: url.into(),
            reason: reason.to_string(),
        }
    }
}
