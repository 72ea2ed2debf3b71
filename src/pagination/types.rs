//! Pagination types and traits

use super::strategies::{NoPaginator, OffsetPaginator};
use crate::decode::extract_simple_path;
use reqwest::header::HeaderMap;
use serde_json::Value;
use std::collections::HashMap;

/// Result of the next page computation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextPage {
    /// More pages available with these parameters
    Continue {
        /// Query parameters to add/replace
        query_params: HashMap<String, String>,
    },
    /// No more pages
    Done,
}

impl NextPage {
    /// Create a continuation with query parameters
    pub fn with_params(params: HashMap<String, String>) -> Self {
        Self::Continue {
            query_params: params,
        }
    }
}

/// Configuration for pagination behavior
#[derive(Debug, Clone, Default)]
pub enum PaginationConfig {
    /// Single request
    #[default]
    None,

    /// Offset-based pagination (Podbean's `offset`/`limit`)
    Offset {
        /// Query parameter name for offset
        offset_param: String,
        /// Query parameter name for limit
        limit_param: String,
        /// Number of records per page
        limit_value: u32,
        /// Stop condition
        stop_condition: StopCondition,
    },
}

impl PaginationConfig {
    /// Create offset pagination config
    pub fn offset(
        offset_param: impl Into<String>,
        limit_param: impl Into<String>,
        limit_value: u32,
        stop_condition: StopCondition,
    ) -> Self {
        Self::Offset {
            offset_param: offset_param.into(),
            limit_param: limit_param.into(),
            limit_value,
            stop_condition,
        }
    }

    /// Podbean list endpoints: `offset`/`limit`, continue while `has_more`
    pub fn podbean(limit: u32) -> Self {
        Self::offset("offset", "limit", limit, StopCondition::more_flag("$.has_more"))
    }

    /// Build the paginator described by this config
    pub fn build(&self) -> Box<dyn Paginator> {
        match self {
            Self::None => Box::new(NoPaginator),
            Self::Offset {
                offset_param,
                limit_param,
                limit_value,
                stop_condition,
            } => Box::new(OffsetPaginator::new(
                offset_param,
                limit_param,
                *limit_value,
                stop_condition.clone(),
            )),
        }
    }
}

/// Stop conditions for pagination
#[derive(Debug, Clone, Default)]
pub enum StopCondition {
    /// Stop when page is empty (no records)
    #[default]
    EmptyPage,

    /// Continue only while a boolean flag is present and true
    MoreFlag {
        /// Path to the flag (e.g. `$.has_more`)
        path: String,
    },
}

impl StopCondition {
    /// Create a "more pages" flag condition
    pub fn more_flag(path: impl Into<String>) -> Self {
        Self::MoreFlag { path: path.into() }
    }
}

/// Result of checking a stop condition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopResult {
    /// Continue pagination
    Continue,
    /// Stop pagination
    Stop,
}

impl StopResult {
    /// Check if we should stop
    pub fn should_stop(&self) -> bool {
        matches!(self, Self::Stop)
    }
}

/// Tracks pagination state during one stream invocation
#[derive(Debug, Clone, Default)]
pub struct PaginationState {
    /// Current offset
    pub offset: u32,
    /// Total records fetched so far
    pub total_fetched: u64,
    /// Is pagination complete?
    pub done: bool,
}

impl PaginationState {
    /// Create a new pagination state
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark pagination as complete
    pub fn mark_done(&mut self) {
        self.done = true;
    }

    /// Add offset
    pub fn add_offset(&mut self, amount: u32) {
        self.offset = self.offset.saturating_add(amount);
    }

    /// Add to total fetched
    pub fn add_fetched(&mut self, count: u64) {
        self.total_fetched += count;
    }
}

/// Core trait for pagination strategies
pub trait Paginator: Send + Sync {
    /// Get initial query parameters for the first request
    fn initial_params(&self, state: &PaginationState) -> HashMap<String, String>;

    /// Process a response and determine if there's a next page
    fn process_response(
        &self,
        body: &Value,
        headers: &HeaderMap,
        records_count: usize,
        state: &mut PaginationState,
    ) -> NextPage;
}

/// Check a stop condition against a response
pub fn check_stop_condition(
    condition: &StopCondition,
    body: &Value,
    records_count: usize,
) -> StopResult {
    let stop = match condition {
        StopCondition::EmptyPage => records_count == 0,
        StopCondition::MoreFlag { path } => {
            extract_simple_path(body, path) != Some(Value::Bool(true))
        }
    };

    if stop {
        StopResult::Stop
    } else {
        StopResult::Continue
    }
}
