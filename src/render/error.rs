// ABOUTME: Error types for renderer operations
// ABOUTME: Distinguishes rendering failures from invalid function registrations

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("invalid environment variable name: \"{name}\"")]
    InvalidName { name: String },

    #[error("failed to render \"{text}\": {source}")]
    Render {
        text: String,
        #[source]
        source: handlebars::RenderError,
    },

    #[error("failed to render environment variable \"{key}\": {source}")]
    Variable {
        key: String,
        #[source]
        source: Box<RenderError>,
    },
}

pub type Result<T> = std::result::Result<T, RenderError>;
