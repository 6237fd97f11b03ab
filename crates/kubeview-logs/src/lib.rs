//! Log relaying for kubeview
//!
//! This crate forwards a live sequence of log lines from the control plane to
//! a downstream consumer with fixed pacing.

mod relay;

pub use relay::{DEFAULT_RELAY_INTERVAL, LogRelay, RelayOutcome, RelaySummary};
