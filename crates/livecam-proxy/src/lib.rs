//! Reverse proxy router for livecam.
//!
//! Forwards requests whose path or query embeds a target URL to that URL,
//! hiding the caller's origin and relaying only media-relevant headers.
//! Two addressing modes are accepted:
//!
//! - query mode: `<prefix>?url=<percent-encoded-url>`
//! - path mode: `<prefix>/<absolute-or-relative-url>`

pub mod error;
pub mod forward;
pub mod handler;
pub mod links;
pub mod route;

pub use error::ProxyError;
pub use forward::Forwarder;
pub use handler::{ProxyState, routes};
pub use links::PlaybackLinks;
pub use route::{AddressingMode, ProxyRoute, RouteRules};
