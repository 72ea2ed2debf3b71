//! Stream types and traits

use crate::context::{ChildContext, Context};
use crate::error::Result;
use crate::http::HttpClient;
use crate::pagination::PaginationConfig;
use crate::template;
use crate::types::Record;
use async_trait::async_trait;
use std::collections::HashMap;

/// Hard ceiling on pages fetched by one stream invocation
pub const DEFAULT_MAX_PAGES: usize = 10_000;

/// How raw records are turned into emitted records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StreamKind {
    /// Records are emitted as extracted
    #[default]
    Plain,
    /// Rows of report download URLs, expanded into CSV tables
    Report,
}

/// Static description of a resource stream
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// Stream name
    pub name: String,
    /// API path, may contain `{{ context.x }}` templates
    pub path: String,
    /// JSON path of the records in a page
    pub records_path: String,
    /// Primary key fields (may be empty)
    pub primary_keys: Vec<String>,
    /// Name of the schema document describing emitted records
    pub schema_ref: String,
    /// Static query parameters, may contain templates
    pub params: HashMap<String, String>,
    /// Pagination strategy
    pub pagination: PaginationConfig,
    /// Post-processing kind
    pub kind: StreamKind,
    /// Parent stream name, for child streams
    pub parent: Option<String>,
    /// Context published to children, for parent streams
    pub child_context: Option<ChildContext>,
    /// Page ceiling for one invocation
    pub max_pages: usize,
}

impl StreamConfig {
    /// Create a plain, unpaginated stream config
    pub fn new(
        name: impl Into<String>,
        path: impl Into<String>,
        records_path: impl Into<String>,
    ) -> Self {
        let name = name.into();
        Self {
            schema_ref: name.clone(),
            name,
            path: path.into(),
            records_path: records_path.into(),
            primary_keys: Vec::new(),
            params: HashMap::new(),
            pagination: PaginationConfig::None,
            kind: StreamKind::Plain,
            parent: None,
            child_context: None,
            max_pages: DEFAULT_MAX_PAGES,
        }
    }

    /// Set primary keys
    #[must_use]
    pub fn with_primary_keys(mut self, keys: &[&str]) -> Self {
        self.primary_keys = keys.iter().map(ToString::to_string).collect();
        self
    }

    /// Add a static query parameter
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Set pagination
    #[must_use]
    pub fn with_pagination(mut self, pagination: PaginationConfig) -> Self {
        self.pagination = pagination;
        self
    }

    /// Set the post-processing kind
    #[must_use]
    pub fn with_kind(mut self, kind: StreamKind) -> Self {
        self.kind = kind;
        self
    }

    /// Declare this stream a child of `parent`
    #[must_use]
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Publish a context to child streams
    #[must_use]
    pub fn with_child_context(mut self, child_context: ChildContext) -> Self {
        self.child_context = Some(child_context);
        self
    }

    /// Check if this stream requires a parent context
    pub fn is_child(&self) -> bool {
        self.parent.is_some()
    }

    /// Context keys referenced by the path and query templates
    pub fn context_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = std::iter::once(&self.path)
            .chain(self.params.values())
            .filter(|s| template::has_templates(s))
            .flat_map(|s| template::extract_variables(s))
            .filter_map(|var| var.strip_prefix("context.").map(String::from))
            .collect();
        keys.sort();
        keys.dedup();
        keys
    }
}

/// A fully rendered page request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// Path relative to the API base URL, or an absolute URL
    pub url: String,
    /// Query parameters
    pub query: HashMap<String, String>,
}

/// Records of one page plus the request for the following page
#[derive(Debug, Clone)]
pub struct PageResult {
    /// Extracted records, before post-processing
    pub records: Vec<Record>,
    /// Next request; `None` when pagination is finished
    pub next: Option<PageRequest>,
}

/// Per-record transformation applied before emission
#[async_trait]
pub trait PostProcess: Send + Sync {
    /// Transform one raw record; `None` drops it
    async fn post_process(
        &self,
        client: &HttpClient,
        record: Record,
        context: Option<&Context>,
    ) -> Result<Option<Record>>;
}

/// Emits records unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThrough;

#[async_trait]
impl PostProcess for PassThrough {
    async fn post_process(
        &self,
        _client: &HttpClient,
        record: Record,
        _context: Option<&Context>,
    ) -> Result<Option<Record>> {
        Ok(Some(record))
    }
}
