//! Error type shared by the YouTube client and everything built on top of it.

use thiserror::Error;

/// Failures that can end a query cycle.
///
/// An empty search is not an error: callers receive `Ok` with an empty list
/// and can tell "nothing found" apart from "could not ask".
#[derive(Debug, Error)]
pub enum Error {
    /// No API key was configured for the client.
    #[error("YOUTUBE_API_KEY is not set")]
    MissingApiKey,

    /// The API answered with a non-success status. The body is not inspected.
    #[error("YouTube API {endpoint} request failed with HTTP status {status}")]
    Upstream { endpoint: &'static str, status: u16 },

    /// The request never produced a response (DNS, connect, TLS, timeout).
    #[error("YouTube API request failed")]
    Transport(#[source] ureq::Transport),

    #[error("could not decode YouTube API response")]
    Decode(#[source] std::io::Error),
}

/// A search order name the API does not know.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown search order: {0:?}")]
pub struct UnknownSearchOrder(pub String);

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// True for errors caused by local configuration rather than the API.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::MissingApiKey)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;
    use std::io;

    #[test]
    fn upstream_message_names_endpoint_and_status() {
        let err = Error::Upstream {
            endpoint: "search",
            status: 403,
        };
        assert_eq!(
            err.to_string(),
            "YouTube API search request failed with HTTP status 403"
        );
        assert!(!err.is_configuration());
    }

    #[test]
    fn missing_key_is_configuration_error() {
        assert!(Error::MissingApiKey.is_configuration());
        assert_eq!(Error::MissingApiKey.to_string(), "YOUTUBE_API_KEY is not set");
    }

    #[test]
    fn decode_message_leaves_cause_to_source() {
        let err = Error::Decode(io::Error::other("expected value at line 1"));
        assert_eq!(err.to_string(), "could not decode YouTube API response");
        assert_eq!(
            err.source().map(|source| source.to_string()).as_deref(),
            Some("expected value at line 1")
        );
        let chain = format!("{:#}", anyhow::Error::from(err));
        assert_eq!(chain.matches("expected value at line 1").count(), 1);
    }

    #[test]
    fn unknown_order_quotes_the_name() {
        let err = UnknownSearchOrder("views".into());
        assert_eq!(err.to_string(), r#"unknown search order: "views""#);
    }
}
