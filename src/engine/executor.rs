// ABOUTME: Template executor walking resolved steps in declared order
// ABOUTME: Evaluates skips, runs HTTP and sub-template steps, applies set chains, and collects exports

use futures::future::BoxFuture;
use serde_json::Value as JsonValue;
use std::borrow::Cow;
use std::str::ParseBoolError;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use super::error::{ExecutionError, Result};
use super::http::{build_request, HttpTransport, ReqwestTransport, TransportError};
use super::resolver::Resolver;
use crate::model::{Env, ModelError, Step, Template};
use crate::render::Renderer;

/// Outcome of one template execution
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Execution {
    /// Variables exported through the steps' `out` declarations
    pub exports: Env,
    /// Raw result of the last step that produced one
    pub result: Vec<u8>,
}

pub struct Executor {
    resolver: Resolver,
    transport: Arc<dyn HttpTransport>,
}

impl Executor {
    pub fn new(resolver: Resolver, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            resolver,
            transport,
        }
    }

    /// Executor using the default reqwest transport
    pub fn with_resolver(resolver: Resolver) -> Self {
        Self::new(resolver, Arc::new(ReqwestTransport::new()))
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Execute a resolved template.
    ///
    /// The template's env is rendered with `renderer` and registered on a
    /// child scope, so nothing registered during this run is visible to the
    /// caller's renderer. Any failure aborts the run without partial exports.
    pub fn execute<'a>(
        &'a self,
        template: &'a Template,
        renderer: &'a Renderer,
        data: &'a JsonValue,
    ) -> BoxFuture<'a, Result<Execution>> {
        Box::pin(self.execute_template(template, renderer, data))
    }

    #[instrument(skip_all, fields(template = %template.identity(), renderer = renderer.name()))]
    async fn execute_template(
        &self,
        template: &Template,
        renderer: &Renderer,
        data: &JsonValue,
    ) -> Result<Execution> {
        let env = renderer
            .render_env(&template.env, data)
            .map_err(|e| ExecutionError::render(template.to_string(), "env", e))?;

        let mut scope = renderer.child(template.identity().to_string());
        scope
            .register_env(&env, "")
            .map_err(|e| ExecutionError::render(template.to_string(), "env", e))?;

        let mut exports = Env::new();
        let mut result = Vec::new();

        for (index, step) in template.steps.iter().enumerate() {
            if self.should_skip(step, &scope, data)? {
                debug!("Skipping step {}: {}", index, step.label());
                continue;
            }
            debug!("Running step {}: {}", index, step.label());

            if step.is_sub_template() {
                let (namespace, execution) = self.run_sub_template(step, &scope, data).await?;
                let prefix = if namespace.is_empty() {
                    String::new()
                } else {
                    format!("{}_", namespace)
                };
                scope
                    .register_env(&execution.exports, &prefix)
                    .map_err(|e| ExecutionError::render(step.label(), "exports", e))?;
                result = execution.result;
            } else if step.is_http() {
                result = self.call(step, &scope, data).await?;
            }

            self.apply_set(step, &mut scope, data, &result)?;

            if !step.out.is_empty() {
                let out = scope
                    .render_env_with_response(&step.out, data, &result)
                    .map_err(|e| ExecutionError::render(step.label(), "out", e))?;
                exports.extend(out);
            }
        }

        info!("Executed {} with {} exports", template, exports.len());
        Ok(Execution { exports, result })
    }

    fn should_skip(&self, step: &Step, scope: &Renderer, data: &JsonValue) -> Result<bool> {
        if step.skip.is_empty() {
            return Ok(false);
        }

        let value = scope
            .render(&step.skip, data)
            .map_err(|e| ExecutionError::render(step.label(), "skip", e))?;

        parse_bool(&value).map_err(|source| ExecutionError::SkipParseFailed {
            step: step.label(),
            value,
            source,
        })
    }

    /// Run a sub-template step, returning the namespace its exports are
    /// published under alongside the execution.
    async fn run_sub_template(
        &self,
        step: &Step,
        scope: &Renderer,
        data: &JsonValue,
    ) -> Result<(String, Execution)> {
        let wrap = |e: ExecutionError| ExecutionError::SubTemplate {
            step: step.uses.clone(),
            source: Box::new(e),
        };

        // Inline references that were never resolved are loaded on demand
        let template = if step.template.steps.is_empty() {
            let mut template = step.template.clone();
            self.resolver
                .resolve(&step.uses, &mut template)
                .await
                .map_err(wrap)?;
            Cow::Owned(template)
        } else {
            Cow::Borrowed(&step.template)
        };

        let execution = self.execute(&template, scope, data).await.map_err(wrap)?;
        Ok((template.namespace.clone(), execution))
    }

    async fn call(&self, step: &Step, scope: &Renderer, data: &JsonValue) -> Result<Vec<u8>> {
        let request = build_request(step, scope, data)?;
        let label = step.label();
        debug!("Requesting {} {}", request.method, request.url);

        let response = self
            .transport
            .send(request)
            .await
            .map_err(|e| match e {
                TransportError::Send(source) => ExecutionError::TransportFailed {
                    step: label.clone(),
                    source,
                },
                TransportError::Read(source) => ExecutionError::ResponseReadFailed {
                    step: label.clone(),
                    source,
                },
            })?;

        if !response.is_success() {
            return Err(ExecutionError::BadStatus {
                step: label,
                status: response.status,
                body: String::from_utf8_lossy(&response.body).into_owned(),
            });
        }

        Ok(response.body)
    }

    /// Register each batch of the step's set chain in link order. Later
    /// batches see the functions registered by earlier ones.
    fn apply_set(
        &self,
        step: &Step,
        scope: &mut Renderer,
        data: &JsonValue,
        result: &[u8],
    ) -> Result<()> {
        let Some(set) = &step.set else {
            return Ok(());
        };

        let batches = set
            .set_chain()
            .map_err(|e| ExecutionError::InvalidSetValue {
                step: step.label(),
                value: match e {
                    ModelError::InvalidSetValue { value } => value,
                    other => other.to_string(),
                },
            })?;

        for batch in batches {
            let rendered = scope
                .render_env_with_response(&batch, data, result)
                .map_err(|e| ExecutionError::render(step.label(), "set", e))?;
            scope
                .register_env(&rendered, "")
                .map_err(|e| ExecutionError::render(step.label(), "set", e))?;
        }

        Ok(())
    }
}

/// Boolean literals: `1 t T TRUE true True` and `0 f F FALSE false False`.
pub fn parse_bool(text: &str) -> std::result::Result<bool, ParseBoolError> {
    match text {
        "1" | "t" | "T" | "TRUE" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "False" => Ok(false),
        other => other.parse(),
    }
}
