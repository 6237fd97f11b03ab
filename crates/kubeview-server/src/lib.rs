//! HTTP surface for kubeview
//!
//! # Data Flow
//! ```text
//! client ──HTTP──→ server.rs (router, CORS, trace, timeout)
//!                     ├─→ handlers.rs ──→ KubeClient (one read-only call) ──→ JSON envelope
//!                     └─→ stream.rs   ──→ KubeClient::log_stream ──→ LogRelay ──→ WebSocket
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod server;
pub mod stream;

pub use config::ServerConfig;
pub use error::ApiError;
pub use server::{AppState, HttpServer, build_router};
