// ABOUTME: Error types for the template data model
// ABOUTME: Covers version parsing, identity parsing, and set-chain shape errors

use std::num::ParseIntError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    #[error("empty version input")]
    EmptyInput,

    #[error("invalid version prefix '{0}', expected 'v'")]
    InvalidPrefix(char),

    #[error("invalid version format: expected vX.Y.Z")]
    InvalidFormat,

    #[error("empty version component")]
    EmptyComponent,

    #[error("version component '{component}' is not a decimal number")]
    NotDecimal { component: String },

    #[error("invalid version number '{component}': {source}")]
    InvalidNumber {
        component: String,
        #[source]
        source: ParseIntError,
    },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("invalid template identity \"{identity}\", expected \"author/namespace@vX.Y.Z\"")]
    InvalidIdentity { identity: String },

    #[error("invalid version in identity \"{identity}\": {source}")]
    InvalidVersion {
        identity: String,
        #[source]
        source: VersionError,
    },

    #[error("invalid set chain value: {value}")]
    InvalidSetValue { value: String },
}

pub type Result<T> = std::result::Result<T, ModelError>;
