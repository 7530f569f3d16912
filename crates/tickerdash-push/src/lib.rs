//! Real-time push channel client for tickerdash.
//!
//! The backend pushes job progress, job completion, and data-refresh
//! notifications over a websocket. This crate provides:
//! - `PushClient`: connection lifecycle with exponential backoff reconnect
//! - `PushEvent`: decoded notifications, plus synthesized connect/disconnect
//! - `PushHub`: broadcast fan-out with cancellable per-widget listeners

pub mod connection;
pub mod error;
pub mod event;
pub mod hub;

pub use connection::{ConnectionState, PushClient, PushConfig};
pub use error::{PushError, PushResult};
pub use event::PushEvent;
pub use hub::PushHub;
