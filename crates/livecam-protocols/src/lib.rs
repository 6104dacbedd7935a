//! # livecam Protocols
//!
//! Shared vocabulary for the livecam workspace. Contains only data types and
//! trait definitions - no I/O.
//!
//! ## Core Types
//!
//! - [`Marker`] - A named location with candidate video-source hints
//! - [`ResolutionState`] - Current classification of the active selection
//! - [`ResolutionAttempt`] - One evaluated strategy, appended to the session log
//! - [`PageResolver`] - Trait for backend extraction probes

pub mod error;
pub mod marker;
pub mod probe;
pub mod resolution;

pub use error::ProbeError;
pub use marker::Marker;
pub use probe::{EmbedPayload, ManifestPayload, PageResolver, ProbeKind, ProbeOutcome};
pub use resolution::{
    AttemptResult, EmbedOrigin, FrameLoad, ResolutionAttempt, ResolutionState, Strategy,
};
