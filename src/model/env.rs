// ABOUTME: Environment of named, dynamically typed template variables
// ABOUTME: Provides non-mutating merges and the set-chain unwinding used by steps

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::error::{ModelError, Result};

/// Key inside a `set` environment that links to the next registration batch.
pub const SET_LINK: &str = "set";

/// Variables visible to the renderer. Only string values are re-rendered;
/// every other value passes through verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Env(IndexMap<String, JsonValue>);

impl Env {
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    /// Later overrides win per key. No input is modified.
    pub fn merge<'a>(base: &Env, overrides: impl IntoIterator<Item = &'a Env>) -> Env {
        let mut merged = base.clone();
        for env in overrides {
            merged.extend(env.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        merged
    }

    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<JsonValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<JsonValue> {
        self.0.shift_remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, JsonValue> {
        self.0.iter()
    }

    /// Unwind a `set` environment into its ordered registration batches.
    ///
    /// Each batch is the environment minus its `set` link; the link must be
    /// absent, null, or a mapping that becomes the next batch.
    pub fn set_chain(&self) -> Result<Vec<Env>> {
        let mut batches = Vec::new();
        let mut next = Some(self.clone());

        while let Some(mut batch) = next {
            next = match batch.remove(SET_LINK) {
                None | Some(JsonValue::Null) => None,
                Some(JsonValue::Object(map)) => Some(map.into_iter().collect()),
                Some(other) => {
                    return Err(ModelError::InvalidSetValue {
                        value: other.to_string(),
                    })
                }
            };
            batches.push(batch);
        }

        Ok(batches)
    }
}

impl Extend<(String, JsonValue)> for Env {
    fn extend<T: IntoIterator<Item = (String, JsonValue)>>(&mut self, iter: T) {
        self.0.extend(iter);
    }
}

impl FromIterator<(String, JsonValue)> for Env {
    fn from_iter<T: IntoIterator<Item = (String, JsonValue)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Env {
    type Item = (String, JsonValue);
    type IntoIter = indexmap::map::IntoIter<String, JsonValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Env {
    type Item = (&'a String, &'a JsonValue);
    type IntoIter = indexmap::map::Iter<'a, String, JsonValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl From<IndexMap<String, JsonValue>> for Env {
    fn from(map: IndexMap<String, JsonValue>) -> Self {
        Self(map)
    }
}

impl From<Env> for JsonValue {
    fn from(env: Env) -> Self {
        JsonValue::Object(env.0.into_iter().collect())
    }
}
