//! Resource streams
//!
//! # Overview
//!
//! A [`ResourceStream`] binds one API resource (path, record path, primary
//! keys, schema) to the pagination pipeline:
//!
//! 1. Render the path and query parameters against the parent context
//! 2. Fetch a page and extract records at the record path
//! 3. Ask the paginator for the next request
//! 4. Run each record through the stream's [`PostProcess`] step
//!
//! Records are produced lazily: a page is only requested once the consumer
//! has drained the previous one. Streams never retry; any error ends the
//! invocation and is handed to the consumer as-is.

mod report;
mod resource;
mod types;

pub use report::{report_urls, ReportPostProcessor, REPORT_PERIOD_PATTERN};
pub use resource::ResourceStream;
pub use types::{
    PageRequest, PageResult, PassThrough, PostProcess, StreamConfig, StreamKind,
    DEFAULT_MAX_PAGES,
};
