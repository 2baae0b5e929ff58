//! HTTP transport
//!
//! Provides the reqwest-backed [`Transport`](crate::fetch::Transport) used
//! against the live API.
//!
//! # Features
//!
//! - **Basic Authentication**: API key and secret on every request
//! - **Automatic Retries**: Configurable retry logic with backoff
//! - **Rate Limiting**: Token bucket rate limiter using governor
//! - **Cancellation**: In-flight requests and backoff sleeps stop on the token

mod client;
mod rate_limit;

pub use client::{Credentials, HttpClient, HttpClientConfig, HttpClientConfigBuilder};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
