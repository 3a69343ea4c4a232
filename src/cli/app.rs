// ABOUTME: Main application orchestration for the tapestry CLI
// ABOUTME: Coordinates between CLI arguments, configuration, and command execution

use anyhow::Result;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use super::commands;
use super::{Args, Commands, Config};

pub struct App {
    config: Config,
}

impl App {
    /// Create a new application instance
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Initialize logging based on configuration. Logs go to stderr so stdout
    /// only carries command output.
    pub fn init_logging(&self, verbose: bool, no_color: bool) -> Result<()> {
        let log_level = if verbose {
            "debug"
        } else {
            &self.config.logging.level
        };

        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

        let builder = tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .with_ansi(!no_color)
            .with_target(false);

        let installed = match self.config.logging.format.as_str() {
            "compact" => builder.compact().try_init(),
            _ => builder.try_init(),
        };
        installed.map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

        debug!("Logging initialized with level: {}", log_level);
        Ok(())
    }

    /// Run the application with parsed arguments
    pub async fn run(&mut self, args: Args) -> Result<()> {
        self.init_logging(args.verbose, args.no_color)?;

        info!("Starting tapestry v{}", env!("CARGO_PKG_VERSION"));
        debug!("Configuration loaded from: {:?}", args.config);

        match args.command {
            Commands::Run {
                template,
                format,
                overrides,
            } => {
                let overrides = Args::parse_overrides(&overrides)?;
                let format = format.unwrap_or(self.config.output.format);
                commands::run_template(&template, overrides, format, &self.config).await
            }

            Commands::Inspect { template } => {
                commands::inspect_template(&template, &self.config).await
            }
        }
    }

    /// Create application from command line arguments
    pub fn from_args(args: &Args) -> Result<Self> {
        let config = Config::load(args.config.clone())?;
        Ok(Self::new(config))
    }
}
