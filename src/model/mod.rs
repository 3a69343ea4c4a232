// ABOUTME: Data model module for versioned templates and their steps
// ABOUTME: Exports versions, identities, environments, templates, and steps

pub mod env;
pub mod error;
pub mod identity;
pub mod template;
pub mod version;

pub use env::Env;
pub use error::{ModelError, Result, VersionError};
pub use identity::Identity;
pub use template::{HeaderValues, Step, Template};
pub use version::Version;
