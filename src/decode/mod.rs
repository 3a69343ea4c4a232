// ABOUTME: Template decoders that load a template by identity
// ABOUTME: Defines the Decoder trait with file-based and in-memory store implementations

pub mod error;
pub mod file;
pub mod store;

use async_trait::async_trait;

use crate::model::Template;

pub use error::{DecodeError, Result};
pub use file::FileDecoder;
pub use store::TemplateStore;

#[async_trait]
pub trait Decoder: Send + Sync {
    /// Load the template addressed by `identity` into `target`, replacing its fields.
    async fn load(&self, identity: &str, target: &mut Template) -> Result<()>;
}
