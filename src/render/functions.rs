// ABOUTME: Projection of environments into renderer-callable zero-argument functions
// ABOUTME: Validates function names against the renderer's identifier rule

use handlebars::{Context, Handlebars, Helper, HelperDef, RenderContext, ScopedJson};
use serde_json::Value as JsonValue;

use super::error::{RenderError, Result};
use crate::model::Env;

/// A name is good when it is non-empty, made of letters, digits, and
/// underscores, and does not start with a digit.
pub fn is_good_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        None => false,
        Some(first) if first.is_numeric() => false,
        Some(first) => {
            (first == '_' || first.is_alphanumeric())
                && chars.all(|c| c == '_' || c.is_alphanumeric())
        }
    }
}

/// Zero-argument function returning an owned copy of one environment value.
#[derive(Debug, Clone)]
pub struct EnvFunction {
    value: JsonValue,
}

impl EnvFunction {
    pub fn new(value: JsonValue) -> Self {
        Self { value }
    }

    pub fn value(&self) -> &JsonValue {
        &self.value
    }
}

impl HelperDef for EnvFunction {
    fn call_inner<'reg: 'rc, 'rc>(
        &self,
        _: &Helper<'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
    ) -> std::result::Result<ScopedJson<'rc>, handlebars::RenderError> {
        Ok(ScopedJson::Derived(self.value.clone()))
    }
}

/// A fully validated set of functions ready for registration.
#[derive(Debug, Clone, Default)]
pub struct FunctionBatch {
    functions: Vec<(String, EnvFunction)>,
}

impl FunctionBatch {
    /// Build a batch from every entry of `env`, naming each `prefix + key`.
    /// Fails on the first invalid name without producing a partial batch.
    pub fn from_env(env: &Env, prefix: &str) -> Result<Self> {
        let functions = env
            .iter()
            .map(|(key, value)| {
                let name = format!("{}{}", prefix, key);
                if is_good_name(&name) {
                    Ok((name, EnvFunction::new(value.clone())))
                } else {
                    Err(RenderError::InvalidName { name })
                }
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { functions })
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl IntoIterator for FunctionBatch {
    type Item = (String, EnvFunction);
    type IntoIter = std::vec::IntoIter<(String, EnvFunction)>;

    fn into_iter(self) -> Self::IntoIter {
        self.functions.into_iter()
    }
}

impl Env {
    /// Project this environment into renderer functions under `prefix`.
    pub fn as_functions(&self, prefix: &str) -> Result<FunctionBatch> {
        FunctionBatch::from_env(self, prefix)
    }
}
