//! CLI runner - executes commands

use crate::catalog::Catalog;
use crate::cli::commands::{Cli, Commands};
use crate::config::TapConfig;
use crate::error::Result;
use crate::output::{Message, MessageWriter};
use crate::schema::SchemaLoader;
use crate::tap::{Tap, TapOptions};
use tracing::{info, warn};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Check => self.check().await,
            Commands::Discover => self.discover(),
            Commands::Read {
                streams,
                max_records,
                no_fail_fast,
            } => self.read(streams, *max_records, *no_fail_fast).await,
            Commands::Streams => self.streams(),
        }
    }

    /// Load configuration
    fn load_config(&self) -> Result<TapConfig> {
        TapConfig::load(self.cli.config.as_deref(), self.cli.config_json.as_deref())
    }

    /// Load configuration if one was given
    fn load_optional_config(&self) -> Result<Option<TapConfig>> {
        if self.cli.config.is_none() && self.cli.config_json.is_none() {
            return Ok(None);
        }
        self.load_config().map(Some)
    }

    fn writer(&self) -> MessageWriter<std::io::Stdout> {
        MessageWriter::stdout(self.cli.format)
    }

    /// Check connection
    async fn check(&self) -> Result<()> {
        let config = self.load_config()?;
        info!("Checking connection to {}", config.api_url);

        let tap = Tap::from_config(&config)?;
        let message = match tap.check().await {
            Ok(()) => Message::connection_status(true, "Connection successful"),
            Err(e) => {
                warn!("Connection check failed: {e}");
                Message::connection_status(false, format!("Connection failed: {e}"))
            }
        };

        let mut writer = self.writer();
        writer.write(&message)?;
        writer.flush()
    }

    /// Print the catalog
    fn discover(&self) -> Result<()> {
        let (catalog, schemas) = match self.load_optional_config()? {
            Some(config) => (config.catalog(), config.schema_loader()),
            None => (Catalog::default(), SchemaLoader::embedded()),
        };

        let mut writer = self.writer();
        writer.write(&Message::Catalog {
            catalog: catalog.to_json(&schemas)?,
        })?;
        writer.flush()
    }

    /// Read streams
    async fn read(
        &self,
        streams: &[String],
        max_records: Option<usize>,
        no_fail_fast: bool,
    ) -> Result<()> {
        let config = self.load_config()?;

        let options = TapOptions::new()
            .with_streams(
                streams
                    .iter()
                    .map(|s| s.trim())
                    .filter(|s| !s.is_empty()),
            )
            .with_max_records(max_records.unwrap_or(0))
            .with_fail_fast(!no_fail_fast);

        let tap = Tap::from_config(&config)?.with_options(options);
        let mut writer = self.writer();
        let summary = tap.sync(&mut writer).await?;

        info!(
            "Read finished with status {} ({} records written)",
            summary.status(),
            writer.records_written()
        );
        Ok(())
    }

    /// List available streams (lightweight, no schemas)
    fn streams(&self) -> Result<()> {
        let catalog = self
            .load_optional_config()?
            .map_or_else(Catalog::default, |config| config.catalog());

        let mut writer = self.writer();
        writer.write(&Message::Streams {
            streams: catalog.names().into_iter().map(String::from).collect(),
        })?;
        writer.flush()
    }
}
