//! Report stream post-processing
//!
//! Report endpoints answer with one row mapping "year-month" columns to
//! pre-signed CSV download URLs. Each non-empty URL is fetched and parsed
//! into a table; the emitted record is `{podcast_id, report: [table, ...]}`.

use super::types::PostProcess;
use crate::context::Context;
use crate::decode::CsvDecoder;
use crate::error::{Error, Result};
use crate::http::HttpClient;
use crate::types::{JsonValue, Record};
use async_trait::async_trait;
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

/// Column names that carry report download URLs
pub const REPORT_PERIOD_PATTERN: &str = r"^\d{4}-\d{1,2}$";

static REPORT_PERIOD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(REPORT_PERIOD_PATTERN).expect("report period regex is valid"));

/// Download URLs of a report row, in the row's field order
pub fn report_urls(row: &Record) -> Vec<&str> {
    row.iter()
        .filter(|(field, _)| REPORT_PERIOD.is_match(field))
        .filter_map(|(_, value)| value.as_str())
        .filter(|url| !url.is_empty())
        .collect()
}

/// Expands report rows into CSV tables
#[derive(Debug, Clone)]
pub struct ReportPostProcessor {
    stream: String,
    decoder: CsvDecoder,
}

impl ReportPostProcessor {
    /// Create a processor for the named stream
    pub fn new(stream: impl Into<String>) -> Self {
        Self {
            stream: stream.into(),
            decoder: CsvDecoder::new(),
        }
    }
}

#[async_trait]
impl PostProcess for ReportPostProcessor {
    async fn post_process(
        &self,
        client: &HttpClient,
        row: Record,
        context: Option<&Context>,
    ) -> Result<Option<Record>> {
        let podcast_id = context
            .and_then(|ctx| ctx.get("podcast_id"))
            .filter(|value| !value.is_null())
            .cloned()
            .ok_or_else(|| Error::missing_context(&self.stream, "podcast_id"))?;

        let urls = report_urls(&row);
        debug!(
            "{}: {} report file(s) for podcast {}",
            self.stream,
            urls.len(),
            podcast_id
        );

        let mut tables = Vec::with_capacity(urls.len());
        for url in urls {
            let body = client.download(url).await?;
            let rows = self.decoder.decode_rows(&body)?;
            tables.push(JsonValue::Array(
                rows.into_iter().map(JsonValue::Object).collect(),
            ));
        }

        let mut out = Record::new();
        out.insert("podcast_id".to_string(), podcast_id);
        out.insert("report".to_string(), JsonValue::Array(tables));
        Ok(Some(out))
    }
}
