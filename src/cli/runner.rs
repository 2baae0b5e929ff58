//! CLI runner - executes commands

use crate::api::ApiClient;
use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::http::Credentials;
use serde::Serialize;
use std::io::Write;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command, writing results to stdout
    pub async fn run(&self, cancel: &CancellationToken) -> Result<()> {
        let config = self.load_config()?;
        let client = ApiClient::connect(&config, self.credentials()?)?;

        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        self.execute(&client, &mut out, cancel).await
    }

    /// Run the CLI command against an existing client
    pub async fn execute(
        &self,
        client: &ApiClient,
        out: &mut impl Write,
        cancel: &CancellationToken,
    ) -> Result<()> {
        debug!("Running {:?}", self.cli.command);

        match &self.cli.command {
            Commands::Groups => {
                let groups = client.require_groups(cancel).await?;
                info!("Found {} groups", groups.len());
                for group in groups.iter() {
                    self.emit(out, group, || format!("{}\t{}", group.id, group.name))?;
                }
            }
            Commands::Connectors { group } => {
                let connectors = client.cached_connectors(group, cancel).await?;
                info!("Found {} connectors in group {}", connectors.len(), group);
                for connector in connectors.iter() {
                    self.emit(out, connector, || {
                        format!(
                            "{}\t{}\t{}",
                            connector.id,
                            connector.service.as_deref().unwrap_or("-"),
                            connector.schema.as_deref().unwrap_or("-")
                        )
                    })?;
                }
            }
            Commands::Lineage { group } => {
                for mapping in client.lineage(group, cancel).await? {
                    self.emit(out, &mapping, || mapping.to_string())?;
                }
            }
        }

        out.flush()?;
        Ok(())
    }

    /// Load configuration from the file given on the command line, or defaults
    fn load_config(&self) -> Result<ClientConfig> {
        match &self.cli.config {
            Some(path) => {
                info!("Loading config from {}", path.display());
                ClientConfig::from_file(path)
            }
            None => Ok(ClientConfig::default()),
        }
    }

    /// Credentials from flags or the environment
    fn credentials(&self) -> Result<Credentials> {
        let api_key = self
            .cli
            .api_key
            .clone()
            .ok_or_else(|| Error::config("API key not specified (use --api-key or FIVETRAN_API_KEY)"))?;
        let api_secret = self.cli.api_secret.clone().ok_or_else(|| {
            Error::config("API secret not specified (use --api-secret or FIVETRAN_API_SECRET)")
        })?;
        Credentials::new(api_key, api_secret)
    }

    /// Write one entry in the selected format
    fn emit<T: Serialize>(
        &self,
        out: &mut impl Write,
        value: &T,
        text: impl FnOnce() -> String,
    ) -> Result<()> {
        match self.cli.format {
            OutputFormat::Text => writeln!(out, "{}", text())?,
            OutputFormat::Json => writeln!(out, "{}", serde_json::to_string(value)?)?,
        }
        Ok(())
    }
}
