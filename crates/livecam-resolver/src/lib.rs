//! Page resolver backed by the HTTP extraction endpoints.
//!
//! Both probes send `GET <endpoint>?url=<page-url>` and map the answer onto a
//! [`ProbeOutcome`](livecam_protocols::ProbeOutcome):
//!
//! | Response                         | Outcome           |
//! |----------------------------------|-------------------|
//! | 2xx with a usable payload        | `Found`           |
//! | 2xx with an empty payload        | `NotFound`        |
//! | 4xx                              | `NotFound(text)`  |
//! | 5xx, timeout, refused, bad JSON  | `TransportError`  |

mod http;

pub use http::HttpPageResolver;
