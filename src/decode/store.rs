// ABOUTME: In-memory template store addressed by author/namespace@version
// ABOUTME: Decodes identities into their components and fails with NotFound on a miss

use async_trait::async_trait;
use std::collections::HashMap;

use super::error::{DecodeError, Result};
use super::Decoder;
use crate::model::{Identity, Template};

#[derive(Debug, Clone, Default)]
pub struct TemplateStore {
    templates: HashMap<Identity, Template>,
}

impl TemplateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a template under its own identity, replacing any previous one
    pub fn insert(&mut self, template: Template) -> Option<Template> {
        self.templates.insert(template.identity(), template)
    }

    pub fn with_template(mut self, template: Template) -> Self {
        self.insert(template);
        self
    }

    pub fn get(&self, identity: &Identity) -> Option<&Template> {
        self.templates.get(identity)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

#[async_trait]
impl Decoder for TemplateStore {
    async fn load(&self, identity: &str, target: &mut Template) -> Result<()> {
        let key = Identity::parse(identity)?;
        let template = self
            .templates
            .get(&key)
            .ok_or_else(|| DecodeError::NotFound {
                identity: identity.to_string(),
            })?;
        *target = template.clone();
        Ok(())
    }
}
