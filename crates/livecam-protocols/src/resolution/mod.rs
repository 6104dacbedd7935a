//! Resolution vocabulary: strategies, attempts and states.

mod attempt;
mod state;
mod strategy;

pub use attempt::*;
pub use state::*;
pub use strategy::*;

#[cfg(test)]
#[path = "resolution_tests.rs"]
mod tests;
