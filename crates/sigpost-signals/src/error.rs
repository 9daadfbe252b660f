use thiserror::Error;

/// Ways a signal submission can fail once it has been dispatched.
///
/// A document without signal attributes is not an error; see
/// [`SignalOutcome::Skipped`](crate::SignalOutcome::Skipped).
#[derive(Debug, Error)]
pub enum SignalError {
    /// The request never completed: connect, TLS, timeout or body read failure.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a non-2xx status.
    #[error("{message}")]
    Status { status: u16, message: String },

    /// The service answered 2xx but the body was not JSON.
    #[error("invalid JSON in response: {source}")]
    Decode {
        #[source]
        source: serde_json::Error,
    },

    #[error("could not encode signal payload: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("invalid base URL '{base_url}': {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },
}

impl SignalError {
    /// Builds a [`SignalError::Status`] from the response status line.
    ///
    /// `reason_phrase` is the phrase the server sent, when it differs from the
    /// canonical one; `None` falls back to the canonical reason. Produces
    /// `"<reason> (error code <code>)"`, or `"Unknown error of type <code>"`
    /// when there is no non-empty reason.
    #[must_use]
    pub fn from_status(status: reqwest::StatusCode, reason_phrase: Option<&str>) -> Self {
        let code = status.as_u16();
        let reason = reason_phrase
            .or_else(|| status.canonical_reason())
            .filter(|reason| !reason.is_empty());
        let message = match reason {
            Some(reason) => format!("{reason} (error code {code})"),
            None => format!("Unknown error of type {code}"),
        };
        Self::Status {
            status: code,
            message,
        }
    }
}
