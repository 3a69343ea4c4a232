// ABOUTME: Command implementations for the tapestry CLI
// ABOUTME: Handles resolving and executing templates for the run and inspect commands

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use super::args::OutputFormat;
use super::config::Config;
use crate::decode::FileDecoder;
use crate::engine::{Executor, ReqwestTransport, Resolver};
use crate::model::{Env, Template};
use crate::render::SafeRenderer;

fn resolver(config: &Config) -> Resolver {
    let decoder = match &config.templates.root {
        Some(root) => FileDecoder::with_root(root),
        None => FileDecoder::new(),
    };
    Resolver::new(Arc::new(decoder))
}

/// Resolve the template at `path`, seeding it with caller overrides
pub async fn resolve_template(path: &Path, overrides: Env, config: &Config) -> Result<Template> {
    let identity = path.to_string_lossy();
    let mut template = Template {
        env: overrides,
        ..Default::default()
    };

    resolver(config)
        .resolve(&identity, &mut template)
        .await
        .with_context(|| format!("Failed to resolve template '{}'", identity))?;

    Ok(template)
}

/// Execute a template and print its exported variables
pub async fn run_template(
    path: &Path,
    overrides: Env,
    format: OutputFormat,
    config: &Config,
) -> Result<()> {
    info!("Starting template execution: {}", path.display());

    let template = resolve_template(path, overrides, config).await?;
    info!("Loaded template: {}", template);

    let transport = ReqwestTransport::from_settings(config.http.timeout, &config.http.user_agent)
        .context("Failed to create HTTP client")?;
    let executor = Executor::new(resolver(config), Arc::new(transport));

    let execution = SafeRenderer::default()
        .run(&executor, &template)
        .await
        .with_context(|| format!("Template execution failed: {}", template.identity()))?;

    println!("{}", format_exports(&execution.exports, format)?);

    info!("Template execution completed");
    Ok(())
}

/// Print the step tree of a resolved template
pub async fn inspect_template(path: &Path, config: &Config) -> Result<()> {
    let template = resolve_template(path, Env::new(), config).await?;
    println!("{}", template.tree("  "));
    Ok(())
}

pub fn format_exports(exports: &Env, format: OutputFormat) -> Result<String> {
    let text = match format {
        OutputFormat::Json => serde_json::to_string_pretty(exports)?,
        OutputFormat::Yaml => serde_yaml::to_string(exports)?,
    };
    Ok(text.trim_end().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_format_exports() {
        let exports: Env = serde_json::from_value(json!({"b": "1", "a": 2})).unwrap();

        assert_eq!(
            format_exports(&exports, OutputFormat::Json).unwrap(),
            "{\n  \"b\": \"1\",\n  \"a\": 2\n}"
        );
        assert_eq!(
            format_exports(&exports, OutputFormat::Yaml).unwrap(),
            "b: '1'\na: 2"
        );
        assert_eq!(format_exports(&Env::new(), OutputFormat::Json).unwrap(), "{}");
    }

    #[tokio::test]
    async fn test_resolve_template_with_root_and_overrides() {
        let temp_dir = tempdir().unwrap();
        fs::write(
            temp_dir.path().join("flow.yaml"),
            "author: me\nnamespace: flow\nversion: v1.0.0\nenv:\n  uid: \"0\"\n  page: \"1\"\n",
        )
        .unwrap();

        let config = Config {
            templates: crate::cli::config::TemplatesConfig {
                root: Some(temp_dir.path().to_path_buf()),
            },
            ..Default::default()
        };
        let overrides: Env = serde_json::from_value(json!({"uid": "42"})).unwrap();

        let template = resolve_template(Path::new("flow.yaml"), overrides, &config)
            .await
            .unwrap();

        assert_eq!(template.namespace, "flow");
        assert_eq!(template.env.get("uid"), Some(&json!("42")));
        assert_eq!(template.env.get("page"), Some(&json!("1")));
    }

    #[tokio::test]
    async fn test_resolve_missing_template() {
        let config = Config::default();
        let err = resolve_template(Path::new("/nonexistent/flow.yaml"), Env::new(), &config)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Failed to resolve template"));
    }
}
