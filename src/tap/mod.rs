//! Tap orchestration
//!
//! Drives a `read` run over the catalog.
//!
//! # Overview
//!
//! - Streams are selected by name; selecting a child stream also runs its
//!   parent, whose records are then only used to scope the child.
//! - Each selected stream gets one `SCHEMA` message before any record.
//! - Child streams run once per parent record with the context the parent
//!   derives from that record.
//! - The run ends with a `SYNC_SUMMARY` message carrying per-stream stats.

mod types;


pub use types::{StreamStats, StreamStatus, SyncSummary, TapOptions};

use crate::catalog::Catalog;
use crate::config::TapConfig;
use crate::context::Context;
use crate::error::Result;
use crate::http::HttpClient;
use crate::output::{Message, MessageWriter};
use crate::pagination::PaginationState;
use crate::schema::SchemaLoader;
use crate::stream::{ResourceStream, StreamConfig};
use crate::types::JsonValue;
use futures::TryStreamExt;
use std::io::Write;
use std::time::Instant;
use tracing::{debug, error, info};

/// Stream fetched by `check`
pub const CHECK_STREAM: &str = "podcasts";

/// Runs the catalog's streams and writes their messages
pub struct Tap {
    client: HttpClient,
    catalog: Catalog,
    schemas: SchemaLoader,
    config_values: JsonValue,
    options: TapOptions,
}

impl Tap {
    /// Create a tap over a client and catalog
    pub fn new(client: HttpClient, catalog: Catalog) -> Self {
        Self {
            client,
            catalog,
            schemas: SchemaLoader::embedded(),
            config_values: JsonValue::Null,
            options: TapOptions::default(),
        }
    }

    /// Build a tap from its config
    pub fn from_config(config: &TapConfig) -> Result<Self> {
        Ok(Self::new(config.http_client()?, config.catalog())
            .with_schemas(config.schema_loader())
            .with_config_values(config.template_values()))
    }

    /// Set the schema loader
    #[must_use]
    pub fn with_schemas(mut self, schemas: SchemaLoader) -> Self {
        self.schemas = schemas;
        self
    }

    /// Values exposed to templates under `config.`
    #[must_use]
    pub fn with_config_values(mut self, values: JsonValue) -> Self {
        self.config_values = values;
        self
    }

    /// Set run options
    #[must_use]
    pub fn with_options(mut self, options: TapOptions) -> Self {
        self.options = options;
        self
    }

    /// The catalog
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Run options
    pub fn options(&self) -> &TapOptions {
        &self.options
    }

    /// Selected streams in catalog order
    ///
    /// Unknown names fail with `StreamNotFound`.
    pub fn selected_streams(&self) -> Result<Vec<&StreamConfig>> {
        let Some(names) = &self.options.streams else {
            return Ok(self.catalog.streams().iter().collect());
        };

        for name in names {
            self.catalog.require(name)?;
        }

        Ok(self
            .catalog
            .streams()
            .iter()
            .filter(|s| names.contains(&s.name))
            .collect())
    }

    /// Verify credentials and connectivity
    ///
    /// Obtains a token if needed and fetches the first page of podcasts.
    pub async fn check(&self) -> Result<()> {
        let stream = self.stream(self.catalog.require(CHECK_STREAM)?);
        let mut state = PaginationState::new();
        let request = stream.first_request(&state, None)?;
        let page = stream.fetch_page(&self.client, &request, &mut state).await?;

        info!(
            "Connection check fetched {} {} records",
            page.records.len(),
            CHECK_STREAM
        );
        Ok(())
    }

    /// Run the selected streams
    ///
    /// The summary is written even when the run aborts. With `fail_fast` the
    /// first stream error is returned after it; otherwise failures only show
    /// in the summary.
    pub async fn sync<W: Write>(&self, writer: &mut MessageWriter<W>) -> Result<SyncSummary> {
        let start = Instant::now();
        let selected = self.selected_streams()?;

        let mut summary = SyncSummary {
            streams: selected.iter().map(|s| StreamStats::new(&s.name)).collect(),
            duration_ms: 0,
        };

        let mut outcome = Ok(());
        for root in self.catalog.streams().iter().filter(|s| !s.is_child()) {
            let emit_root = selected.iter().any(|s| s.name == root.name);
            let children: Vec<&StreamConfig> = self
                .catalog
                .children_of(&root.name)
                .into_iter()
                .filter(|child| selected.iter().any(|s| s.name == child.name))
                .collect();

            if !emit_root && children.is_empty() {
                continue;
            }

            if let Err(e) = self
                .sync_family(root, emit_root, &children, writer, &mut summary)
                .await
            {
                outcome = Err(e);
                break;
            }
        }

        summary.duration_ms = start.elapsed().as_millis() as u64;
        info!(
            "Sync {}: {} records from {} streams in {}ms",
            summary.status(),
            summary.total_records(),
            summary.streams.len(),
            summary.duration_ms
        );

        writer.write(&Message::SyncSummary {
            summary: summary.to_json(),
        })?;
        writer.flush()?;

        outcome.map(|()| summary)
    }

    fn stream(&self, config: &StreamConfig) -> ResourceStream {
        ResourceStream::new(config.clone()).with_config_values(self.config_values.clone())
    }

    fn write_schema<W: Write>(
        &self,
        stream: &StreamConfig,
        writer: &mut MessageWriter<W>,
    ) -> Result<()> {
        let schema = self.schemas.load(&stream.schema_ref)?;
        writer.write(&Message::schema(
            &stream.name,
            schema,
            stream.primary_keys.clone(),
        ))
    }

    /// Run a root stream and, per record, its selected children
    async fn sync_family<W: Write>(
        &self,
        root: &StreamConfig,
        emit_root: bool,
        children: &[&StreamConfig],
        writer: &mut MessageWriter<W>,
        summary: &mut SyncSummary,
    ) -> Result<()> {
        let started = Instant::now();
        let parent = self.stream(root);
        let child_streams: Vec<ResourceStream> = children.iter().map(|c| self.stream(c)).collect();

        if emit_root {
            self.write_schema(root, writer)?;
        }
        for child in children {
            self.write_schema(child, writer)?;
        }

        info!("Syncing stream: {}", root.name);
        let mut emitted: u64 = 0;
        let mut child_abort = None;
        let mut records = parent.records(&self.client, None);

        let result = loop {
            let record = match records.try_next().await {
                Ok(Some(record)) => record,
                Ok(None) => break Ok(()),
                Err(e) => break Err(e),
            };

            let context = if child_streams.is_empty() {
                None
            } else {
                match parent.child_context(&record, None) {
                    Ok(context) => context,
                    Err(e) => break Err(e),
                }
            };

            if emit_root && !self.options.limit_reached(emitted) {
                writer.write(&Message::record(&root.name, record))?;
                emitted += 1;
            }

            if let Some(context) = &context {
                for child in &child_streams {
                    if let Err(e) = self.sync_child(child, context, writer, summary).await {
                        child_abort = Some(e);
                        break;
                    }
                }
                if child_abort.is_some() {
                    break Ok(());
                }
            }

            if self.family_done(emit_root, emitted, children, summary) {
                debug!("{}: record limit reached", root.name);
                break Ok(());
            }
        };
        drop(records);

        if let Some(stats) = summary.stream_mut(&root.name) {
            stats.records_synced += emitted;
            stats.invocations += 1;
            stats.duration_ms = started.elapsed().as_millis() as u64;
        }

        if let Some(e) = child_abort {
            return Err(e);
        }

        match result {
            Ok(()) => {
                info!("Finished stream {}: {} records", root.name, emitted);
                Ok(())
            }
            Err(e) => {
                error!("Stream '{}' failed: {}", root.name, e);
                if let Some(stats) = summary.stream_mut(&root.name) {
                    stats.fail(&e);
                }
                for child in children {
                    if let Some(stats) = summary.stream_mut(&child.name) {
                        stats.record_failure(
                            format!("parent stream '{}' failed: {e}", root.name),
                            e.kind().as_str(),
                        );
                    }
                }

                if self.options.fail_fast {
                    Err(e)
                } else {
                    Ok(())
                }
            }
        }
    }

    /// Whether every stream of the family has hit the record limit
    fn family_done(
        &self,
        emit_root: bool,
        emitted: u64,
        children: &[&StreamConfig],
        summary: &SyncSummary,
    ) -> bool {
        if self.options.max_records == 0 {
            return false;
        }
        if emit_root && !self.options.limit_reached(emitted) {
            return false;
        }
        if children.is_empty() {
            return emit_root;
        }

        children.iter().all(|child| {
            summary
                .stream(&child.name)
                .is_some_and(|stats| self.options.limit_reached(stats.records_synced))
        })
    }

    /// One invocation of a child stream
    ///
    /// Returns an error only when the run must abort.
    async fn sync_child<W: Write>(
        &self,
        child: &ResourceStream,
        context: &Context,
        writer: &mut MessageWriter<W>,
        summary: &mut SyncSummary,
    ) -> Result<()> {
        let name = child.name();
        let Some(stats) = summary.stream_mut(name) else {
            return Ok(());
        };
        if self.options.limit_reached(stats.records_synced) {
            return Ok(());
        }

        let started = Instant::now();
        stats.invocations += 1;
        debug!("Syncing {} for {}", name, context.describe());

        let mut records = child.records(&self.client, Some(context));
        let result = loop {
            match records.try_next().await {
                Ok(Some(record)) => {
                    writer.write(&Message::record(name, record))?;
                    stats.records_synced += 1;
                    if self.options.limit_reached(stats.records_synced) {
                        break Ok(());
                    }
                }
                Ok(None) => break Ok(()),
                Err(e) => break Err(e),
            }
        };
        stats.duration_ms += started.elapsed().as_millis() as u64;

        match result {
            Ok(()) => Ok(()),
            Err(e) => {
                error!("Stream '{}' failed for {}: {}", name, context.describe(), e);
                stats.fail(&e);
                if self.options.fail_fast {
                    Err(e)
                } else {
                    Ok(())
                }
            }
        }
    }
}

impl std::fmt::Debug for Tap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tap")
            .field("streams", &self.catalog.names())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
