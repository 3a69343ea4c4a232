// ABOUTME: Renderer implementation using Handlebars
// ABOUTME: Renders text against data and registered zero-argument environment functions

use handlebars::{Context, Handlebars, RenderContext, Renderable, StringOutput, Template};
use serde_json::Value as JsonValue;
use tracing::debug;

use super::error::{RenderError, Result};
use super::functions::FunctionBatch;
use super::helpers;
use crate::model::Env;

/// Local variable through which `set` and `out` entries see the last step
/// result, written `@response` in templates.
pub const RESPONSE_VAR: &str = "response";

/// A named handlebars registry. Children are independent copies, so
/// registrations made on a child are never visible to its parent or siblings.
#[derive(Clone)]
pub struct Renderer {
    name: String,
    handlebars: Handlebars<'static>,
}

impl Renderer {
    /// Create a root renderer with all built-in helpers
    pub fn new() -> Self {
        let mut handlebars = Handlebars::new();

        // Unknown names fail instead of rendering empty
        handlebars.set_strict_mode(true);
        handlebars.set_dev_mode(false);

        // Output feeds URLs, JSON bodies, and headers, not HTML
        handlebars.register_escape_fn(handlebars::no_escape);

        helpers::register_helpers(&mut handlebars);

        Self {
            name: "root".to_string(),
            handlebars,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Create an isolated child namespace that starts with every function
    /// currently registered here.
    pub fn child(&self, name: impl AsRef<str>) -> Self {
        Self {
            name: format!("{}/{}", self.name, name.as_ref()),
            handlebars: self.handlebars.clone(),
        }
    }

    /// Render a template string against the given data
    pub fn render(&self, text: &str, data: &JsonValue) -> Result<String> {
        self.handlebars
            .render_template(text, data)
            .map_err(|source| RenderError::Render {
                text: text.to_string(),
                source,
            })
    }

    /// Render a template string into a byte buffer
    pub fn render_bytes(&self, text: &str, data: &JsonValue) -> Result<Vec<u8>> {
        self.render(text, data).map(String::into_bytes)
    }

    /// Render a template string with the raw text of the last step result
    /// bound to `@response`. The caller's data stays the root context.
    pub fn render_with_response(
        &self,
        text: &str,
        data: &JsonValue,
        response: &[u8],
    ) -> Result<String> {
        let response = JsonValue::String(String::from_utf8_lossy(response).into_owned());
        self.render_with_local(text, data, RESPONSE_VAR, response)
            .map_err(|source| RenderError::Render {
                text: text.to_string(),
                source,
            })
    }

    fn render_with_local(
        &self,
        text: &str,
        data: &JsonValue,
        name: &str,
        value: JsonValue,
    ) -> std::result::Result<String, handlebars::RenderError> {
        let template = Template::compile(text)?;
        let context = Context::wraps(data)?;
        let mut output = StringOutput::new();
        let mut rc = RenderContext::new(None);
        if let Some(block) = rc.block_mut() {
            block.set_local_var(name, value);
        }
        template.render(&self.handlebars, &context, &mut rc, &mut output)?;
        output.into_string().map_err(handlebars::RenderError::from)
    }

    /// Render every string value of an environment; other values pass through.
    pub fn render_env(&self, env: &Env, data: &JsonValue) -> Result<Env> {
        render_strings(env, |text| self.render(text, data))
    }

    /// `render_env` with `@response` bound to the last step result
    pub fn render_env_with_response(
        &self,
        env: &Env,
        data: &JsonValue,
        response: &[u8],
    ) -> Result<Env> {
        render_strings(env, |text| self.render_with_response(text, data, response))
    }

    /// Register a validated batch of functions
    pub fn register(&mut self, batch: FunctionBatch) {
        for (name, function) in batch {
            self.handlebars.register_helper(&name, Box::new(function));
        }
    }

    /// Validate and register every entry of an environment under a prefix.
    /// Nothing is registered when any name is invalid.
    pub fn register_env(&mut self, env: &Env, prefix: &str) -> Result<()> {
        let batch = FunctionBatch::from_env(env, prefix)?;
        if batch.is_empty() {
            return Ok(());
        }
        debug!("Registering {} functions in {}", batch.len(), self.name);
        self.register(batch);
        Ok(())
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

fn render_strings(env: &Env, render: impl Fn(&str) -> Result<String>) -> Result<Env> {
    env.iter()
        .map(|(key, value)| match value {
            JsonValue::String(text) => render(text)
                .map(|rendered| (key.clone(), JsonValue::String(rendered)))
                .map_err(|e| RenderError::Variable {
                    key: key.clone(),
                    source: Box::new(e),
                }),
            other => Ok((key.clone(), other.clone())),
        })
        .collect()
}
