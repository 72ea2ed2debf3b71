//! Built-in Podbean stream catalog

use crate::context::ChildContext;
use crate::error::{Error, Result};
use crate::pagination::PaginationConfig;
use crate::schema::SchemaLoader;
use crate::stream::{StreamConfig, StreamKind};
use serde_json::{json, Value};

/// Default number of records requested per page
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Report year used when the config does not set one
pub const DEFAULT_REPORT_YEAR: i32 = 2021;

/// The set of streams this tap can extract
#[derive(Debug, Clone)]
pub struct Catalog {
    streams: Vec<StreamConfig>,
}

impl Catalog {
    /// Build a catalog from stream configs
    pub fn new(streams: Vec<StreamConfig>) -> Self {
        Self { streams }
    }

    /// The Podbean streams
    ///
    /// Report streams are children of `podcasts` and run once per podcast
    /// with `podcast_id` and `report_year` in their query.
    pub fn podbean(report_year: i32, page_size: u32) -> Self {
        let pagination = PaginationConfig::podbean(page_size);

        let report = |name: &str, path: &str| {
            StreamConfig::new(name, path, "$.download_urls")
                .with_param("podcast_id", "{{ context.podcast_id }}")
                .with_param("year", "{{ context.year }}")
                .with_kind(StreamKind::Report)
                .with_parent("podcasts")
        };

        Self::new(vec![
            StreamConfig::new(
                "private_members",
                "/v1/privateMembers",
                "$.private_members[*]",
            )
            .with_primary_keys(&["email"])
            .with_pagination(pagination.clone()),
            StreamConfig::new("episodes", "/v1/episodes", "$.episodes[*]")
                .with_primary_keys(&["id"])
                .with_pagination(pagination.clone()),
            StreamConfig::new("podcasts", "/v1/podcasts", "$.podcasts[*]")
                .with_primary_keys(&["id"])
                .with_pagination(pagination)
                .with_child_context(ChildContext::podcast(report_year)),
            report("podcast_download_reports", "/v1/analytics/podcastReports"),
            report(
                "podcast_engagement_reports",
                "/v1/analytics/podcastEngagementReports",
            ),
        ])
    }

    /// All streams, parents before their children
    pub fn streams(&self) -> &[StreamConfig] {
        &self.streams
    }

    /// Stream names
    pub fn names(&self) -> Vec<&str> {
        self.streams.iter().map(|s| s.name.as_str()).collect()
    }

    /// Get a stream by name
    pub fn get(&self, name: &str) -> Option<&StreamConfig> {
        self.streams.iter().find(|s| s.name == name)
    }

    /// Get a stream by name or fail
    pub fn require(&self, name: &str) -> Result<&StreamConfig> {
        self.get(name).ok_or_else(|| Error::StreamNotFound {
            stream: name.to_string(),
        })
    }

    /// Streams declaring `parent` as their parent
    pub fn children_of(&self, parent: &str) -> Vec<&StreamConfig> {
        self.streams
            .iter()
            .filter(|s| s.parent.as_deref() == Some(parent))
            .collect()
    }

    /// Catalog document for `discover`
    pub fn to_json(&self, schemas: &SchemaLoader) -> Result<Value> {
        let streams = self
            .streams
            .iter()
            .map(|stream| {
                Ok(json!({
                    "tap_stream_id": stream.name,
                    "stream": stream.name,
                    "schema": schemas.load(&stream.schema_ref)?,
                    "key_properties": stream.primary_keys,
                    "parent_stream": stream.parent,
                }))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(json!({ "streams": streams }))
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::podbean(DEFAULT_REPORT_YEAR, DEFAULT_PAGE_SIZE)
    }
}
