// ABOUTME: Common utilities and helpers for integration tests
// ABOUTME: Provides template builders, a scripted HTTP transport, and temp-dir fixtures

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tokio::fs;

use tapestry::engine::{HttpRequest, HttpResponse, HttpTransport, TransportError};
use tapestry::model::{Env, Step, Template, Version};

pub fn env(value: JsonValue) -> Env {
    serde_json::from_value(value).expect("env literal must be a JSON object")
}

pub struct TestTemplateBuilder {
    template: Template,
}

impl TestTemplateBuilder {
    pub fn new(namespace: &str) -> Self {
        Self {
            template: Template {
                author: "tester".to_string(),
                namespace: namespace.to_string(),
                version: Version::new(1, 0, 0),
                description: format!("Test template: {}", namespace),
                ..Default::default()
            },
        }
    }

    pub fn with_env(mut self, value: JsonValue) -> Self {
        self.template.env = env(value);
        self
    }

    pub fn with_step(mut self, step: Step) -> Self {
        self.template.steps.push(step);
        self
    }

    pub fn identity(&self) -> String {
        self.template.identity().to_string()
    }

    pub fn build(self) -> Template {
        self.template
    }

    pub fn to_yaml(&self) -> String {
        serde_yaml::to_string(&self.template).expect("template must serialize")
    }
}

/// An HTTP step with the given method and URL
pub fn http_step(method: &str, url: &str) -> Step {
    Step {
        method: method.to_string(),
        url: url.to_string(),
        ..Default::default()
    }
}

/// A sub-template step referencing `uses`
pub fn uses_step(uses: &str) -> Step {
    Step {
        uses: uses.to_string(),
        ..Default::default()
    }
}

/// In-process transport answering from a script keyed by URL and recording
/// every request it receives.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    responses: Arc<Mutex<HashMap<String, HttpResponse>>>,
    unreadable: Arc<Mutex<HashSet<String>>>,
    requests: Arc<Mutex<Vec<HttpRequest>>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, url: &str, status: u16, body: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(url.to_string(), HttpResponse::new(status, body));
        self
    }

    /// Accept requests to `url` but fail while reading the response body
    pub fn fail_read(self, url: &str) -> Self {
        self.unreadable.lock().unwrap().insert(url.to_string());
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn urls(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|request| request.url.to_string())
            .collect()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let url = request.url.to_string();
        self.requests.lock().unwrap().push(request);

        if self.unreadable.lock().unwrap().contains(&url) {
            return Err(TransportError::Read(
                format!("connection reset while reading {}", url).into(),
            ));
        }

        self.responses
            .lock()
            .unwrap()
            .get(&url)
            .cloned()
            .ok_or_else(|| TransportError::Send(format!("no scripted response for {}", url).into()))
    }
}

pub struct TestEnvironment {
    pub temp_dir: TempDir,
}

impl TestEnvironment {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn template_file(&self, name: &str) -> PathBuf {
        self.path().join(format!("{}.yaml", name))
    }

    pub async fn create_template_file(&self, name: &str, content: &str) -> PathBuf {
        let template_file = self.template_file(name);
        fs::write(&template_file, content)
            .await
            .expect("Failed to write template file");
        template_file
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_builder() {
        let builder = TestTemplateBuilder::new("demo")
            .with_env(serde_json::json!({"uid": "1"}))
            .with_step(http_step("GET", "https://example.com/{{uid}}"));

        assert_eq!(builder.identity(), "tester/demo@v1.0.0");

        let yaml = builder.to_yaml();
        assert!(yaml.contains("namespace: demo"));
        assert!(yaml.contains("example.com/{{uid}}"));
    }

    #[test]
    fn test_environment_setup() {
        let env = TestEnvironment::new();
        assert!(env.path().exists());
        assert!(env
            .template_file("test")
            .to_string_lossy()
            .contains("test.yaml"));
    }
}
