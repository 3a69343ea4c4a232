// ABOUTME: Command line argument definitions and parsing using Clap
// ABOUTME: Defines the main CLI structure and the run and inspect subcommands

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::model::Env;

#[derive(Parser)]
#[command(name = "tapestry")]
#[command(about = "A declarative workflow engine that chains HTTP calls and reusable templates")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(short, long, global = true, help = "Path to configuration file")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "Disable colored output")]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve and execute a template, printing its exported variables.
    ///
    /// Options go before the first override: everything from the first
    /// override on is read as an override.
    Run {
        #[arg(help = "Path to the template file (JSON or YAML)")]
        template: PathBuf,

        #[arg(short, long, value_enum, help = "Output format for exported variables")]
        format: Option<OutputFormat>,

        #[arg(
            trailing_var_arg = true,
            allow_hyphen_values = true,
            help = "Environment overrides (--name=value), given after all options"
        )]
        overrides: Vec<String>,
    },

    /// Resolve a template and print its step tree
    Inspect {
        #[arg(help = "Path to the template file (JSON or YAML)")]
        template: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Parse `--name=value` overrides into an environment. Values are kept as
    /// strings; later duplicates win.
    pub fn parse_overrides(overrides: &[String]) -> anyhow::Result<Env> {
        let mut env = Env::new();

        for arg in overrides {
            let trimmed = arg.trim_start_matches('-');
            match trimmed.split_once('=') {
                Some((key, value)) if !key.is_empty() => {
                    env.insert(key, value);
                }
                _ => {
                    return Err(anyhow::anyhow!(
                        "Invalid override format '{}'. Expected '--name=value' (options must come before overrides)",
                        arg
                    ));
                }
            }
        }

        Ok(env)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_overrides() {
        let overrides = vec![
            "--uid=42".to_string(),
            "--token=a=b".to_string(),
            "name=plain".to_string(),
            "--uid=43".to_string(),
        ];

        let env = Args::parse_overrides(&overrides).unwrap();

        assert_eq!(env.len(), 3);
        assert_eq!(env.get("uid"), Some(&json!("43")));
        assert_eq!(env.get("token"), Some(&json!("a=b")));
        assert_eq!(env.get("name"), Some(&json!("plain")));
    }

    #[test]
    fn test_parse_overrides_invalid() {
        assert!(Args::parse_overrides(&["--uid".to_string()]).is_err());
        assert!(Args::parse_overrides(&["--=1".to_string()]).is_err());
    }

    #[test]
    fn test_run_command_parsing() {
        let args = Args::try_parse_from([
            "tapestry",
            "run",
            "flow.yaml",
            "--format",
            "yaml",
            "--uid=1",
        ])
        .unwrap();

        match args.command {
            Commands::Run {
                template,
                format,
                overrides,
            } => {
                assert_eq!(template, PathBuf::from("flow.yaml"));
                assert_eq!(format, Some(OutputFormat::Yaml));
                assert_eq!(overrides, vec!["--uid=1".to_string()]);
            }
            _ => panic!("expected run command"),
        }
    }

    #[test]
    fn test_options_after_overrides_are_overrides() {
        let args = Args::try_parse_from([
            "tapestry",
            "run",
            "flow.yaml",
            "--uid=1",
            "--format",
            "yaml",
        ])
        .unwrap();

        let Commands::Run {
            format, overrides, ..
        } = args.command
        else {
            panic!("expected run command");
        };

        assert_eq!(format, None);
        assert_eq!(overrides, vec!["--uid=1", "--format", "yaml"]);

        let err = Args::parse_overrides(&overrides).unwrap_err();
        assert!(err.to_string().contains("'--format'"));
        assert!(err.to_string().contains("options must come before overrides"));
    }
}
