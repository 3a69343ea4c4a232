// ABOUTME: Error types for template decoding
// ABOUTME: Covers file access, structured-format parsing, and store lookups

use std::path::PathBuf;
use thiserror::Error;

use crate::model::ModelError;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("failed to read template file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse JSON template: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to parse YAML template: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("unsupported template file type: \"{extension}\"")]
    UnsupportedFormat { extension: String },

    #[error("template not found: \"{identity}\"")]
    NotFound { identity: String },

    #[error(transparent)]
    Identity(#[from] ModelError),
}

pub type Result<T> = std::result::Result<T, DecodeError>;
