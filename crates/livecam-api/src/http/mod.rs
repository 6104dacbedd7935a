//! HTTP interface module.
//!
//! Provides REST endpoints for:
//! - One-shot marker resolution
//! - The live selection session
//! - Health checks

pub mod handlers;
pub mod routes;

pub(crate) mod monitoring;
