//! Pagination module
//!
//! Supports: Offset, None
//!
//! # Overview
//!
//! A [`Paginator`] looks at one page of a response and decides whether
//! another page exists and which query parameters identify it.
//! Paginators never see failed responses; the HTTP client surfaces those as
//! errors before pagination runs.

mod strategies;
mod types;

pub use strategies::{NoPaginator, OffsetPaginator};
pub use types::{
    check_stop_condition, NextPage, PaginationConfig, PaginationState, Paginator, StopCondition,
    StopResult,
};
