//! Error types for the livecam protocol layer.

mod probe;

pub use probe::*;
