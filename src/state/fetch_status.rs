//! Outcome tags stored with each crawl record

use std::fmt;

/// Outcome of the last attempt to fetch a stored URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchStatus {
    /// Page was fetched and its content stored
    Success,

    /// Every fetch attempt failed (transport error or non-2xx status)
    FailedFetch,

    /// The server answered with a non-HTML content type
    NonHtml,
}

impl FetchStatus {
    /// Returns true if this represents a successful fetch
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Converts the status to its database string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::FailedFetch => "failed_fetch",
            Self::NonHtml => "non_html",
        }
    }

    /// Parses a status from its database string representation
    ///
    /// Returns None if the string doesn't match any known status.
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "success" => Some(Self::Success),
            "failed_fetch" => Some(Self::FailedFetch),
            "non_html" => Some(Self::NonHtml),
            _ => None,
        }
    }

    /// Returns all possible statuses
    pub fn all() -> [Self; 3] {
        [Self::Success, Self::FailedFetch, Self::NonHtml]
    }
}

impl fmt::Display for FetchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}
