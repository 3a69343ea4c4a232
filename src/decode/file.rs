// ABOUTME: File-based template decoder for JSON and YAML documents
// ABOUTME: Treats the identity as a path, optionally relative to a template root

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

use super::error::{DecodeError, Result};
use super::Decoder;
use crate::model::Template;

#[derive(Debug, Clone, Default)]
pub struct FileDecoder {
    root: Option<PathBuf>,
}

impl FileDecoder {
    pub fn new() -> Self {
        Self { root: None }
    }

    /// Resolve relative template paths against `root`
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    pub fn path_for(&self, identity: &str) -> PathBuf {
        let path = Path::new(identity);
        match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// Parse template content, choosing the format from the file extension
    pub fn parse(content: &str, extension: &str) -> Result<Template> {
        match extension.to_lowercase().as_str() {
            "json" => Ok(serde_json::from_str(content)?),
            "yml" | "yaml" => Ok(serde_yaml::from_str(content)?),
            other => Err(DecodeError::UnsupportedFormat {
                extension: other.to_string(),
            }),
        }
    }
}

#[async_trait]
impl Decoder for FileDecoder {
    async fn load(&self, identity: &str, target: &mut Template) -> Result<()> {
        let path = self.path_for(identity);
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default()
            .to_string();

        // Check the format before touching the file system
        if !matches!(extension.to_lowercase().as_str(), "json" | "yml" | "yaml") {
            return Err(DecodeError::UnsupportedFormat { extension });
        }

        debug!("Reading template file: {}", path.display());
        let content = fs::read_to_string(&path)
            .await
            .map_err(|source| DecodeError::Io {
                path: path.clone(),
                source,
            })?;

        *target = Self::parse(&content, &extension)?;
        Ok(())
    }
}
