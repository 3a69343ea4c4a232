// ABOUTME: Error types for template resolution and execution
// ABOUTME: Each failure aborts the whole run and carries the template, step, or field it came from

use thiserror::Error;

use crate::decode::DecodeError;
use crate::render::RenderError;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("no template decoder configured")]
    DecoderMissing,

    #[error("failed to decode template \"{identity}\": {source}")]
    Decode {
        identity: String,
        #[source]
        source: DecodeError,
    },

    #[error("template reference cycle detected: {}", chain.join(" -> "))]
    CycleDetected { chain: Vec<String> },

    #[error("failed to resolve \"{uses}\" referenced by \"{template}\": {source}")]
    Resolve {
        template: String,
        uses: String,
        #[source]
        source: Box<ExecutionError>,
    },

    #[error("sub-template step \"{step}\" failed: {source}")]
    SubTemplate {
        step: String,
        #[source]
        source: Box<ExecutionError>,
    },

    #[error("failed to render {field} of \"{template}\": {source}")]
    RenderFailed {
        template: String,
        field: String,
        #[source]
        source: RenderError,
    },

    #[error("invalid environment variable name \"{name}\" in \"{template}\"")]
    InvalidName { template: String, name: String },

    #[error("failed to parse skip value \"{value}\" of step \"{step}\": {source}")]
    SkipParseFailed {
        step: String,
        value: String,
        #[source]
        source: std::str::ParseBoolError,
    },

    #[error("invalid set chain value in step \"{step}\": {value}")]
    InvalidSetValue { step: String, value: String },

    #[error("step URL is empty")]
    EmptyUrl,

    #[error("failed to build request for step \"{step}\": {reason}")]
    RequestBuildFailed { step: String, reason: String },

    #[error("failed to send request for step \"{step}\": {source}")]
    TransportFailed {
        step: String,
        #[source]
        source: BoxError,
    },

    #[error("failed to read response body of step \"{step}\": {source}")]
    ResponseReadFailed {
        step: String,
        #[source]
        source: BoxError,
    },

    #[error("request for step \"{step}\" failed with status code {status}\n{body}")]
    BadStatus {
        step: String,
        status: u16,
        body: String,
    },
}

impl ExecutionError {
    /// Innermost error beneath any `Resolve` or `SubTemplate` context wrappers
    pub fn root_cause(&self) -> &ExecutionError {
        match self {
            Self::Resolve { source, .. } | Self::SubTemplate { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Wrap a renderer failure, lifting invalid names into their own kind
    pub fn render(template: impl Into<String>, field: impl Into<String>, source: RenderError) -> Self {
        match source {
            RenderError::InvalidName { name } => Self::InvalidName {
                template: template.into(),
                name,
            },
            source => Self::RenderFailed {
                template: template.into(),
                field: field.into(),
                source,
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, ExecutionError>;
