use std::fmt::Display;
use std::time::Duration;

use futures::{Sink, SinkExt, Stream, StreamExt};
use tokio_util::sync::CancellationToken;

/// Default pause after each relayed line
pub const DEFAULT_RELAY_INTERVAL: Duration = Duration::from_millis(100);

/// Why a relay stopped
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RelayOutcome {
    /// The upstream log source finished
    UpstreamEnded,

    /// Reading from the upstream log source failed
    UpstreamFailed(String),

    /// The downstream consumer closed or stopped accepting lines
    ClientGone,
}

/// Summary of a finished relay
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelaySummary {
    pub outcome: RelayOutcome,
    pub lines: u64,
}

/// Forwards lines from an upstream log source to a downstream sink, one at a
/// time, pausing a fixed interval after each line.
pub struct LogRelay {
    /// Pause after each forwarded line
    interval: Duration,

    /// Cancellation token for stopping the relay from outside
    cancel: CancellationToken,
}

impl LogRelay {
    /// Create a new relay with the given pacing interval
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            cancel: CancellationToken::new(),
        }
    }

    /// Token that stops the relay when cancelled
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Relay until the upstream ends or fails, or the downstream goes away
    pub async fn run<L, E, S>(&self, mut lines: L, sink: &mut S) -> RelaySummary
    where
        L: Stream<Item = Result<String, E>> + Unpin,
        E: Display,
        S: Sink<String> + Unpin,
    {
        let mut relayed = 0u64;

        let outcome = loop {
            let next = tokio::select! {
                _ = self.cancel.cancelled() => break RelayOutcome::ClientGone,
                next = lines.next() => next,
            };

            match next {
                Some(Ok(line)) => {
                    if sink.send(line).await.is_err() {
                        break RelayOutcome::ClientGone;
                    }
                    relayed += 1;

                    if !self.interval.is_zero() {
                        tokio::select! {
                            _ = self.cancel.cancelled() => break RelayOutcome::ClientGone,
                            _ = tokio::time::sleep(self.interval) => {}
                        }
                    }
                }
                Some(Err(e)) => break RelayOutcome::UpstreamFailed(e.to_string()),
                None => break RelayOutcome::UpstreamEnded,
            }
        };

        tracing::debug!(lines = relayed, outcome = ?outcome, "Log relay finished");

        RelaySummary {
            outcome,
            lines: relayed,
        }
    }

    /// Stop the relay
    pub fn stop(&self) {
        self.cancel.cancel();
    }
}

impl Default for LogRelay {
    fn default() -> Self {
        Self::new(DEFAULT_RELAY_INTERVAL)
    }
}
