//! HTTP client module
//!
//! Provides the transport every stream issues its requests through.
//!
//! # Features
//!
//! - **Automatic Retries**: 429, 5xx and timeouts are retried with backoff
//! - **Rate Limiting**: Token bucket rate limiter using governor
//! - **Authentication**: Access token injection via the auth module
//! - **Bare downloads**: Report files are fetched without auth or base URL

mod client;
mod rate_limit;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder, RequestConfig};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
