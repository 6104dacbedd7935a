//! # livecam Runtime
//!
//! Turns a selected [`Marker`](livecam_protocols::Marker) into a playable
//! source.
//!
//! - [`Resolution`] - pure fallback chain, driven step by step
//! - [`ResolutionEngine`] - runs a resolution against a page resolver
//! - [`SessionController`] - one active selection at a time, with
//!   cancellation and stale-result suppression
//! - [`MarkerRegistry`] - marker list loaded from JSON

pub mod controller;
pub mod engine;
pub mod error;
pub mod machine;
pub mod registry;

pub use controller::{SessionController, SessionHandle, SessionSnapshot};
pub use engine::ResolutionEngine;
pub use error::ResolveError;
pub use machine::{ProbeResult, Resolution, Step, resolve_with};
pub use registry::MarkerRegistry;
