// ABOUTME: Recursive template resolution through a pluggable decoder
// ABOUTME: Splices referenced templates into steps with caller-wins environment inheritance

use futures::future::BoxFuture;
use std::sync::Arc;
use tracing::{debug, instrument};

use super::error::{ExecutionError, Result};
use crate::decode::Decoder;
use crate::model::{Env, Template};

#[derive(Clone, Default)]
pub struct Resolver {
    decoder: Option<Arc<dyn Decoder>>,
}

impl Resolver {
    pub fn new(decoder: Arc<dyn Decoder>) -> Self {
        Self {
            decoder: Some(decoder),
        }
    }

    /// A resolver that fails every resolution with `DecoderMissing`
    pub fn without_decoder() -> Self {
        Self { decoder: None }
    }

    pub fn has_decoder(&self) -> bool {
        self.decoder.is_some()
    }

    /// Load `identity` into `template` and recursively resolve every step
    /// that references another template.
    ///
    /// The template's current `env` and `namespace` are caller overrides: a
    /// non-empty namespace survives decoding, and env entries win over the
    /// decoded template's own declarations.
    #[instrument(skip(self, template))]
    pub async fn resolve(&self, identity: &str, template: &mut Template) -> Result<()> {
        let decoder = self
            .decoder
            .as_deref()
            .ok_or(ExecutionError::DecoderMissing)?;
        let mut chain = Vec::new();
        resolve_with(decoder, identity, template, &mut chain).await
    }
}

fn resolve_with<'a>(
    decoder: &'a dyn Decoder,
    identity: &'a str,
    template: &'a mut Template,
    chain: &'a mut Vec<String>,
) -> BoxFuture<'a, Result<()>> {
    Box::pin(async move {
        if chain.iter().any(|seen| seen == identity) {
            let mut cycle = chain.clone();
            cycle.push(identity.to_string());
            return Err(ExecutionError::CycleDetected { chain: cycle });
        }

        let env = template.env.clone();
        let namespace = template.namespace.clone();

        decoder
            .load(identity, template)
            .await
            .map_err(|source| ExecutionError::Decode {
                identity: identity.to_string(),
                source,
            })?;

        if !namespace.is_empty() {
            template.namespace = namespace;
        }
        template.env = Env::merge(&template.env, [&env]);

        debug!(
            "Resolved {} as {} with {} steps",
            identity,
            template.identity(),
            template.steps.len()
        );

        chain.push(identity.to_string());
        let label = template.identity().to_string();
        for step in template.steps.iter_mut() {
            if step.uses.is_empty() {
                continue;
            }
            let uses = step.uses.clone();
            resolve_with(decoder, &uses, &mut step.template, chain)
                .await
                .map_err(|e| ExecutionError::Resolve {
                    template: label.clone(),
                    uses: uses.clone(),
                    source: Box::new(e),
                })?;
        }
        chain.pop();

        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::{DecodeError, TemplateStore};
    use crate::model::{Step, Version};
    use serde_json::json;

    fn env(value: serde_json::Value) -> Env {
        serde_json::from_value(value).unwrap()
    }

    fn template(namespace: &str, env_value: serde_json::Value, steps: Vec<Step>) -> Template {
        Template {
            author: "drelf".into(),
            namespace: namespace.into(),
            version: Version::new(1, 0, 0),
            env: env(env_value),
            steps,
            ..Default::default()
        }
    }

    fn uses(identity: &str) -> Step {
        Step {
            uses: identity.into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_missing_decoder() {
        let mut target = Template::default();
        let err = Resolver::without_decoder()
            .resolve("drelf/a@v1.0.0", &mut target)
            .await
            .unwrap_err();
        assert!(matches!(err, ExecutionError::DecoderMissing));
    }

    #[tokio::test]
    async fn test_caller_namespace_survives() {
        let store = TemplateStore::new().with_template(template("y", json!({}), vec![]));
        let resolver = Resolver::new(Arc::new(store));

        let mut target = Template {
            namespace: "x".into(),
            ..Default::default()
        };
        resolver.resolve("drelf/y@v1.0.0", &mut target).await.unwrap();
        assert_eq!(target.namespace, "x");

        let mut target = Template::default();
        resolver.resolve("drelf/y@v1.0.0", &mut target).await.unwrap();
        assert_eq!(target.namespace, "y");
    }

    #[tokio::test]
    async fn test_caller_env_wins() {
        let store = TemplateStore::new().with_template(template("a", json!({"k": 2, "j": 3}), vec![]));
        let resolver = Resolver::new(Arc::new(store));

        let mut target = Template {
            env: env(json!({"k": 1})),
            ..Default::default()
        };
        resolver.resolve("drelf/a@v1.0.0", &mut target).await.unwrap();
        assert_eq!(target.env, env(json!({"k": 1, "j": 3})));
    }

    #[tokio::test]
    async fn test_nested_resolution_propagates_step_env() {
        let mut login = uses("drelf/login@v1.0.0");
        login.template.env = env(json!({"user": "{{uid}}"}));
        login.template.namespace = "auth".into();

        let store = TemplateStore::new()
            .with_template(template("parent", json!({"uid": "1"}), vec![login]))
            .with_template(template(
                "login",
                json!({"user": "guest", "password": ""}),
                vec![Step {
                    url: "https://example.com/login".into(),
                    ..Default::default()
                }],
            ));
        let resolver = Resolver::new(Arc::new(store));

        let mut target = Template::default();
        resolver.resolve("drelf/parent@v1.0.0", &mut target).await.unwrap();

        let sub = &target.steps[0].template;
        assert_eq!(sub.namespace, "auth");
        assert_eq!(sub.env, env(json!({"user": "{{uid}}", "password": ""})));
        assert_eq!(sub.steps.len(), 1);
        assert!(target.steps[0].out.is_empty());
    }

    #[tokio::test]
    async fn test_nested_failure_aborts() {
        let store = TemplateStore::new().with_template(template(
            "parent",
            json!({}),
            vec![uses("drelf/missing@v1.0.0")],
        ));
        let resolver = Resolver::new(Arc::new(store));

        let mut target = Template::default();
        let err = resolver
            .resolve("drelf/parent@v1.0.0", &mut target)
            .await
            .unwrap_err();

        assert!(matches!(err, ExecutionError::Resolve { ref uses, .. } if uses == "drelf/missing@v1.0.0"));
        assert!(matches!(
            err.root_cause(),
            ExecutionError::Decode {
                source: DecodeError::NotFound { .. },
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_cycle_detected() {
        let store = TemplateStore::new()
            .with_template(template("a", json!({}), vec![uses("drelf/b@v1.0.0")]))
            .with_template(template("b", json!({}), vec![uses("drelf/a@v1.0.0")]));
        let resolver = Resolver::new(Arc::new(store));

        let mut target = Template::default();
        let err = resolver
            .resolve("drelf/a@v1.0.0", &mut target)
            .await
            .unwrap_err();

        match err.root_cause() {
            ExecutionError::CycleDetected { chain } => assert_eq!(
                chain,
                &vec![
                    "drelf/a@v1.0.0".to_string(),
                    "drelf/b@v1.0.0".to_string(),
                    "drelf/a@v1.0.0".to_string(),
                ]
            ),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_repeated_reference_is_not_a_cycle() {
        let store = TemplateStore::new()
            .with_template(template(
                "a",
                json!({}),
                vec![uses("drelf/b@v1.0.0"), uses("drelf/b@v1.0.0")],
            ))
            .with_template(template("b", json!({}), vec![]));
        let resolver = Resolver::new(Arc::new(store));

        let mut target = Template::default();
        resolver.resolve("drelf/a@v1.0.0", &mut target).await.unwrap();
        assert_eq!(target.steps[1].template.namespace, "b");
    }
}
