//! Resource stream driver

use super::report::ReportPostProcessor;
use super::types::{
    PageRequest, PageResult, PassThrough, PostProcess, StreamConfig, StreamKind,
};
use crate::context::Context;
use crate::decode::JsonDecoder;
use crate::error::{Error, Result};
use crate::http::{HttpClient, RequestConfig};
use crate::pagination::{NextPage, PaginationState, Paginator};
use crate::template::{self, TemplateContext};
use crate::types::{JsonValue, Record};
use futures::stream::{self, BoxStream, StreamExt};
use std::collections::VecDeque;
use tracing::{debug, warn};

/// A resource stream bound to its paginator, decoder and post-processor
pub struct ResourceStream {
    config: StreamConfig,
    paginator: Box<dyn Paginator>,
    decoder: JsonDecoder,
    processor: Box<dyn PostProcess>,
    config_values: JsonValue,
}

impl ResourceStream {
    /// Create a stream from its config
    pub fn new(config: StreamConfig) -> Self {
        let processor: Box<dyn PostProcess> = match config.kind {
            StreamKind::Plain => Box::new(PassThrough),
            StreamKind::Report => Box::new(ReportPostProcessor::new(&config.name)),
        };

        Self {
            paginator: config.pagination.build(),
            decoder: JsonDecoder::with_path(&config.records_path),
            processor,
            config_values: JsonValue::Null,
            config,
        }
    }

    /// Values exposed to templates under `config.`
    #[must_use]
    pub fn with_config_values(mut self, values: JsonValue) -> Self {
        self.config_values = values;
        self
    }

    /// Replace the post-processing step
    #[must_use]
    pub fn with_post_processor(mut self, processor: Box<dyn PostProcess>) -> Self {
        self.processor = processor;
        self
    }

    /// Stream name
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Build the first request of an invocation
    pub fn first_request(
        &self,
        state: &PaginationState,
        context: Option<&Context>,
    ) -> Result<PageRequest> {
        for key in self.config.context_keys() {
            let present = context
                .and_then(|c| c.get(&key))
                .is_some_and(|v| !v.is_null());
            if !present {
                return Err(Error::missing_context(&self.config.name, key));
            }
        }

        let mut ctx = TemplateContext::with_config(self.config_values.clone());
        if let Some(context) = context {
            ctx.set_context(context);
        }

        let url = template::render(&self.config.path, &ctx)?;
        let mut query = template::render_params(&self.config.params, &ctx)?;
        query.extend(self.paginator.initial_params(state));

        Ok(PageRequest { url, query })
    }

    /// Fetch one page and work out the request for the next one
    pub async fn fetch_page(
        &self,
        client: &HttpClient,
        request: &PageRequest,
        state: &mut PaginationState,
    ) -> Result<PageResult> {
        let mut req_config = RequestConfig::new();
        for (key, value) in &request.query {
            req_config = req_config.query(key, value);
        }

        let response = client.get_with_config(&request.url, req_config).await?;
        let headers = response.headers().clone();
        let body_text = response
            .text()
            .await
            .map_err(|e| Error::decode(format!("Failed to read response body: {e}")))?;

        let body = self.decoder.parse(&body_text)?;
        let raw = self.decoder.records_from(&body)?;
        let records_count = raw.len();

        let records: Vec<Record> = raw
            .into_iter()
            .filter_map(|value| match value {
                JsonValue::Object(record) => Some(record),
                other => {
                    warn!("{}: dropping non-object record {}", self.config.name, other);
                    None
                }
            })
            .collect();

        let next = match self
            .paginator
            .process_response(&body, &headers, records_count, state)
        {
            NextPage::Done => None,
            more => {
                let next = next_request(request, more);
                if next.is_none() {
                    warn!(
                        "{}: next page request repeats the previous one, stopping",
                        self.config.name
                    );
                }
                next
            }
        };

        debug!(
            "{}: fetched {} records from {} (more pages: {})",
            self.config.name,
            records_count,
            request.url,
            next.is_some()
        );

        Ok(PageResult { records, next })
    }

    /// Apply the post-processing step to one record
    pub async fn post_process(
        &self,
        client: &HttpClient,
        record: Record,
        context: Option<&Context>,
    ) -> Result<Option<Record>> {
        self.processor.post_process(client, record, context).await
    }

    /// Context for child streams derived from one emitted record
    pub fn child_context(
        &self,
        record: &Record,
        _context: Option<&Context>,
    ) -> Result<Option<Context>> {
        self.config
            .child_context
            .as_ref()
            .map(|mapping| mapping.derive(record))
            .transpose()
    }

    /// Lazily yield post-processed records of one invocation
    ///
    /// Each call starts a fresh pagination. Pages are fetched on demand and
    /// the stream ends after the first error.
    pub fn records<'a>(
        &'a self,
        client: &'a HttpClient,
        context: Option<&'a Context>,
    ) -> BoxStream<'a, Result<Record>> {
        let init = Cursor {
            pending: VecDeque::new(),
            next: Pending::NotStarted,
            pagination: PaginationState::new(),
            pages: 0,
        };

        stream::try_unfold(init, move |cursor| self.advance(client, context, cursor)).boxed()
    }

    async fn advance(
        &self,
        client: &HttpClient,
        context: Option<&Context>,
        mut cursor: Cursor,
    ) -> Result<Option<(Record, Cursor)>> {
        loop {
            if let Some(raw) = cursor.pending.pop_front() {
                if let Some(record) = self.post_process(client, raw, context).await? {
                    return Ok(Some((record, cursor)));
                }
                continue;
            }

            let request = match std::mem::replace(&mut cursor.next, Pending::Finished) {
                Pending::Finished => return Ok(None),
                Pending::NotStarted => self.first_request(&cursor.pagination, context)?,
                Pending::Request(request) => request,
            };

            if cursor.pages >= self.config.max_pages {
                warn!(
                    "{}: reached the {} page limit, stopping",
                    self.config.name, self.config.max_pages
                );
                return Ok(None);
            }

            let page = self
                .fetch_page(client, &request, &mut cursor.pagination)
                .await?;
            cursor.pages += 1;
            cursor.pending.extend(page.records);
            if let Some(next) = page.next {
                cursor.next = Pending::Request(next);
            }
        }
    }
}

impl std::fmt::Debug for ResourceStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceStream")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// The request following `request`, if any
///
/// A continuation that reproduces `request` exactly ends pagination, so a
/// server that ignores the pagination parameters cannot loop the stream.
pub(super) fn next_request(request: &PageRequest, next: NextPage) -> Option<PageRequest> {
    let NextPage::Continue { query_params } = next else {
        return None;
    };

    let mut query = request.query.clone();
    query.extend(query_params);
    let next = PageRequest {
        url: request.url.clone(),
        query,
    };
    (&next != request).then_some(next)
}

/// Where an invocation is in its pagination
enum Pending {
    NotStarted,
    Request(PageRequest),
    Finished,
}

struct Cursor {
    pending: VecDeque<Record>,
    next: Pending,
    pagination: PaginationState,
    pages: usize,
}
