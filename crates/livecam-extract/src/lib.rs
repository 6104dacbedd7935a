//! Extraction backend for livecam.
//!
//! Fetches a webcam page and looks for something directly playable: a hosted
//! video embed or an HLS manifest. Served as the endpoints the page resolver
//! probes.

pub mod error;
pub mod extractor;
pub mod handler;
pub mod scan;

pub use error::ExtractError;
pub use extractor::Extractor;
pub use handler::routes;
