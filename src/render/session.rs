// ABOUTME: Per-execution renderer sessions over a shared root renderer
// ABOUTME: Each run gets a uniquely named child so concurrent runs never share registrations

use serde_json::Value as JsonValue;
use tracing::debug;
use uuid::Uuid;

use super::engine::Renderer;
use crate::engine::{self, Execution, Executor};
use crate::model::Template;

/// Shares one root renderer and one caller data value across any number of
/// executions, handing each its own child scope.
#[derive(Clone)]
pub struct SafeRenderer {
    root: Renderer,
    data: JsonValue,
}

impl SafeRenderer {
    pub fn new(data: JsonValue) -> Self {
        Self::with_root(Renderer::new(), data)
    }

    pub fn with_root(root: Renderer, data: JsonValue) -> Self {
        Self { root, data }
    }

    pub fn data(&self) -> &JsonValue {
        &self.data
    }

    /// A fresh child of the root with a unique name
    pub fn session(&self) -> Renderer {
        self.root.child(Uuid::new_v4().to_string())
    }

    pub async fn run(&self, executor: &Executor, template: &Template) -> engine::Result<Execution> {
        let session = self.session();
        debug!("Opened renderer session {}", session.name());
        executor.execute(template, &session, &self.data).await
    }
}

impl Default for SafeRenderer {
    fn default() -> Self {
        Self::new(JsonValue::Null)
    }
}
