//! HTTP gateway that turns signed webhook events into signed attestations.
//!
//! Assembles configured routes into an Axum router: each route binds a
//! webhook handler and a pre-resolved signer, and every validated event
//! flows authenticate → sign → export through the per-request pipeline
//! with fan-out to independently fallible sinks.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod pipeline;
pub mod server;
pub mod sink;

pub use config::{Config, RouteConfig};
pub use error::GatewayError;
pub use pipeline::Route;
pub use server::{build_router, serve};
pub use sink::{ArchiveSink, LocalDirSink, Sink, SinkError};
