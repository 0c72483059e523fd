//! Lifecycle of the crawl loop

use std::fmt;

/// State of the crawl loop
///
/// The loop starts `Running`. An external stop request or the page cap moves
/// it to `Stopping`, which only takes effect once the current URL's
/// bookkeeping is done. `Stopped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlState {
    Running,
    Stopping(StopReason),
    Stopped(StopReason),
}

impl CrawlState {
    /// Requests a stop; a loop that is already stopping keeps its first reason
    pub fn request_stop(&mut self, reason: StopReason) {
        if let Self::Running = self {
            *self = Self::Stopping(reason);
        }
    }

    /// Moves to `Stopped`, keeping a pending stop reason over `fallback`
    pub fn finish(&mut self, fallback: StopReason) -> StopReason {
        let reason = match *self {
            Self::Running => fallback,
            Self::Stopping(reason) | Self::Stopped(reason) => reason,
        };
        *self = Self::Stopped(reason);
        reason
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }
}

/// Why a crawl run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// No due record and no pending URL remained
    FrontierExhausted,

    /// The configured page cap was reached
    PageCap,

    /// An external stop signal was received
    Cancelled,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::FrontierExhausted => "frontier exhausted",
            Self::PageCap => "page cap reached",
            Self::Cancelled => "stop requested",
        };
        f.write_str(text)
    }
}
