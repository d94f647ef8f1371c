// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors that travel *inside* streams.
//!
//! A `StreamError` is the error notification of an [`EventStream`](crate::stream::EventStream):
//! it is always the last item a subscriber sees. Multicast fans the same error out
//! to every subscriber, so the type is `Clone` and carries owned strings only.

use thiserror::Error;

/// Error notification carried by a stream.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StreamError {
    /// A fork predicate faulted while classifying a value.
    ///
    /// Both branches of the fork terminate with this error.
    #[error("Predicate fault in fork '{fork}': {message}")]
    PredicateFault { fork: String, message: String },

    /// An upstream source reported a failure of its own.
    #[error("Source '{origin}' failed: {message}")]
    Source { origin: String, message: String },

    /// A payload could not be converted into the type a stream promised.
    #[error("Payload for '{origin}' could not be decoded: {message}")]
    Payload { origin: String, message: String },
}

impl StreamError {
    /// Convenience constructor for collaborator-side failures.
    pub fn source(origin: impl Into<String>, message: impl Into<String>) -> Self {
        StreamError::Source {
            origin: origin.into(),
            message: message.into(),
        }
    }
}

/// Returned by a fallible fork predicate.
///
/// The fork wraps it into [`StreamError::PredicateFault`] together with its label.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct PredicateFault(pub String);

impl PredicateFault {
    pub fn new(message: impl Into<String>) -> Self {
        PredicateFault(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_origin() {
        let err = StreamError::source("assign", "connection refused");
        assert_eq!(err.to_string(), "Source 'assign' failed: connection refused");

        let fault = StreamError::PredicateFault {
            fork: "mandelboxCreateFlow".to_string(),
            message: PredicateFault::new("status missing").to_string(),
        };
        assert_eq!(
            fault.to_string(),
            "Predicate fault in fork 'mandelboxCreateFlow': status missing"
        );
    }
}
