//! # livecam API
//!
//! The HTTP surface of livecam. One router carries:
//!
//! - the stream proxy and frame proxy (`livecam-proxy`)
//! - the embed and manifest extraction endpoints (`livecam-extract`)
//! - one-shot resolution and the live selection session (`livecam-runtime`)
//! - health and liveness probes

pub mod error;
pub mod http;
pub mod server;
pub mod state;

pub use error::ApiError;
pub use http::routes::create_router;
pub use server::{ApiServer, ServerConfig};
pub use state::AppState;
