//! REST client for the tickerdash backend.
//!
//! Every request goes through one fetch wrapper that:
//! - Applies a per-request timeout (15s by default)
//! - Normalizes timeouts, transport failures, non-2xx responses, and bad
//!   payloads into a single `ApiError` carrying a user-facing message
//! - Records request counts and latency
//!
//! There is no retry logic; callers surface the error and move on.

pub mod client;
pub mod endpoints;
pub mod error;

pub use client::{ApiClient, DEFAULT_TIMEOUT};
pub use error::{ApiError, ApiResult};
