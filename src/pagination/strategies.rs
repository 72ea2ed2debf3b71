//! Pagination strategy implementations

use super::types::{check_stop_condition, NextPage, PaginationState, Paginator, StopCondition};
use reqwest::header::HeaderMap;
use serde_json::Value;
use std::collections::HashMap;

// ============================================================================
// Offset Pagination
// ============================================================================

/// Offset-based pagination
///
/// Uses offset and limit parameters, e.g. `?offset=100&limit=100`. A page
/// shorter than the limit is the last one.
#[derive(Debug, Clone)]
pub struct OffsetPaginator {
    /// Query parameter name for offset
    pub offset_param: String,
    /// Query parameter name for limit
    pub limit_param: String,
    /// Number of records per page
    pub limit_value: u32,
    /// Stop condition
    pub stop_condition: StopCondition,
}

impl OffsetPaginator {
    /// Create a new offset paginator
    pub fn new(
        offset_param: impl Into<String>,
        limit_param: impl Into<String>,
        limit_value: u32,
        stop_condition: StopCondition,
    ) -> Self {
        Self {
            offset_param: offset_param.into(),
            limit_param: limit_param.into(),
            limit_value,
            stop_condition,
        }
    }

    fn params(&self, offset: u32) -> HashMap<String, String> {
        let mut params = HashMap::new();
        params.insert(self.offset_param.clone(), offset.to_string());
        params.insert(self.limit_param.clone(), self.limit_value.to_string());
        params
    }
}

impl Paginator for OffsetPaginator {
    fn initial_params(&self, state: &PaginationState) -> HashMap<String, String> {
        self.params(state.offset)
    }

    fn process_response(
        &self,
        body: &Value,
        _headers: &HeaderMap,
        records_count: usize,
        state: &mut PaginationState,
    ) -> NextPage {
        state.add_fetched(records_count as u64);

        if check_stop_condition(&self.stop_condition, body, records_count).should_stop() {
            state.mark_done();
            return NextPage::Done;
        }

        if records_count == 0 || records_count < self.limit_value as usize {
            state.mark_done();
            return NextPage::Done;
        }

        state.add_offset(self.limit_value);
        NextPage::with_params(self.params(state.offset))
    }
}

// ============================================================================
// No Pagination
// ============================================================================

/// No pagination - single request
#[derive(Debug, Clone, Default)]
pub struct NoPaginator;

impl Paginator for NoPaginator {
    fn initial_params(&self, _state: &PaginationState) -> HashMap<String, String> {
        HashMap::new()
    }

    fn process_response(
        &self,
        _body: &Value,
        _headers: &HeaderMap,
        records_count: usize,
        state: &mut PaginationState,
    ) -> NextPage {
        state.add_fetched(records_count as u64);
        state.mark_done();
        NextPage::Done
    }
}
