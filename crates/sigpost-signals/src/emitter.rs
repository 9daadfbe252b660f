//! HTTP emitter for search interaction signals.
//!
//! [`SignalEmitter::submit`] is fire-and-forget: it schedules the POST on the
//! current Tokio runtime and returns at once, and every failure ends up as a
//! `warn` log line. [`SignalEmitter::send`] runs the same exchange inline and
//! hands the outcome back to the caller instead.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use hyper::ext::ReasonPhrase;
use reqwest::cookie::Jar;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, ClientBuilder, Url};
use sigpost_core::{AppConfig, SearchDocument};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::instrument::WithSubscriber;

use crate::error::SignalError;
use crate::payload::{SignalPayload, DEFAULT_SIGNAL_TYPE, DEFAULT_SIGNAL_WEIGHT};

/// Endpoint path, relative to the base address, that records a signal.
pub const SIGNALS_PATH: &str = "/rest/signals/add";

const JSON_MEDIA_TYPE: &str = "application/json";

/// Result of an awaited [`SignalEmitter::send`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalOutcome {
    /// The document had no signal attributes; nothing was sent.
    Skipped,
    /// The service accepted the signal with a 2xx JSON response.
    Recorded,
}

/// Posts signals for search documents to `<base_url>/rest/signals/add`.
///
/// Cloning is cheap: the inner `reqwest::Client` is reference counted, so a
/// clone shares its connection pool and cookie store.
#[derive(Debug, Clone)]
pub struct SignalEmitter {
    client: Client,
    base_url: String,
    endpoint: String,
}

impl SignalEmitter {
    /// Creates an emitter with its own HTTP client.
    ///
    /// The client keeps a cookie store so session cookies set by the service
    /// are sent back with later signals.
    ///
    /// # Errors
    ///
    /// Returns [`SignalError::Transport`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(base_url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, SignalError> {
        let client = client_builder(timeout_secs, user_agent)
            .cookie_store(true)
            .build()?;
        Ok(Self::with_client(base_url, client))
    }

    /// Creates an emitter from application configuration.
    ///
    /// When `session_cookie` is set it is seeded into the client's cookie jar
    /// for the base address, so every signal carries the session.
    ///
    /// # Errors
    ///
    /// - [`SignalError::InvalidBaseUrl`] if a session cookie is configured and
    ///   the base address cannot be parsed as a URL.
    /// - [`SignalError::Transport`] if the HTTP client cannot be constructed.
    pub fn from_config(config: &AppConfig) -> Result<Self, SignalError> {
        let Some(cookie) = config.session_cookie.as_deref() else {
            return Self::new(
                &config.base_url,
                config.request_timeout_secs,
                &config.user_agent,
            );
        };

        let url = Url::parse(&config.base_url).map_err(|e| SignalError::InvalidBaseUrl {
            base_url: config.base_url.clone(),
            reason: e.to_string(),
        })?;
        let jar = Jar::default();
        jar.add_cookie_str(cookie, &url);

        let client = client_builder(config.request_timeout_secs, &config.user_agent)
            .cookie_provider(Arc::new(jar))
            .build()?;
        Ok(Self::with_client(&config.base_url, client))
    }

    /// Creates an emitter around a caller-supplied client.
    ///
    /// Whatever credentials the client carries (cookie store, default headers)
    /// go out with each signal. The base address is not validated.
    #[must_use]
    pub fn with_client(base_url: &str, client: Client) -> Self {
        let endpoint = format!("{}{SIGNALS_PATH}", base_url.trim_end_matches('/'));
        Self {
            client,
            base_url: base_url.to_owned(),
            endpoint,
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Records a `click` of weight 1 for `document` without waiting for the
    /// service. See [`SignalEmitter::submit_with`].
    pub fn submit(&self, document: &SearchDocument) {
        self.submit_with(document, DEFAULT_SIGNAL_TYPE, DEFAULT_SIGNAL_WEIGHT);
    }

    /// Records a signal of the given type and weight for `document` without
    /// waiting for the service.
    ///
    /// Does nothing if the document has no signal attributes. Otherwise the
    /// POST runs on a spawned task and any failure is logged at `warn`; the
    /// caller never sees the outcome.
    pub fn submit_with(&self, document: &SearchDocument, kind: &str, weight: i64) {
        drop(self.dispatch(document, kind, weight));
    }

    /// Sends a `click` of weight 1 and waits for the service to answer.
    ///
    /// # Errors
    ///
    /// See [`SignalEmitter::send_with`].
    pub async fn send(&self, document: &SearchDocument) -> Result<SignalOutcome, SignalError> {
        self.send_with(document, DEFAULT_SIGNAL_TYPE, DEFAULT_SIGNAL_WEIGHT)
            .await
    }

    /// Sends a signal and waits for the service to answer.
    ///
    /// Returns [`SignalOutcome::Skipped`] without any network traffic when the
    /// document has no signal attributes.
    ///
    /// # Errors
    ///
    /// - [`SignalError::Transport`] if the request or the body read fails.
    /// - [`SignalError::Status`] on a non-2xx response.
    /// - [`SignalError::Decode`] if a 2xx response body is not JSON.
    /// - [`SignalError::Encode`] if the payload cannot be serialized.
    pub async fn send_with(
        &self,
        document: &SearchDocument,
        kind: &str,
        weight: i64,
    ) -> Result<SignalOutcome, SignalError> {
        let Some(payload) = SignalPayload::overlay(document, kind, weight) else {
            return Ok(SignalOutcome::Skipped);
        };
        let body = payload.to_body()?;
        self.deliver(&body).await?;
        Ok(SignalOutcome::Recorded)
    }

    /// Schedules delivery on the current runtime and returns the task handle,
    /// or `None` when nothing was scheduled.
    pub(crate) fn dispatch(
        &self,
        document: &SearchDocument,
        kind: &str,
        weight: i64,
    ) -> Option<JoinHandle<()>> {
        let payload = SignalPayload::overlay(document, kind, weight)?;
        let body = match payload.to_body() {
            Ok(body) => body,
            Err(error) => {
                let attributes = format!("{:?}", payload.attributes());
                log_failure(document, &attributes, &error);
                return None;
            }
        };

        let Ok(runtime) = Handle::try_current() else {
            tracing::warn!(
                document = ?document,
                payload = %body,
                error = "no Tokio runtime to deliver on",
                "failed to submit signal"
            );
            return None;
        };

        let emitter = self.clone();
        let document = document.clone();
        let task = async move {
            settle_delivery(emitter.deliver(&body), &emitter.endpoint, &document, &body).await;
        };

        Some(runtime.spawn(task.with_current_subscriber()))
    }

    /// POSTs `body` and checks that the service answered 2xx with JSON.
    async fn deliver(&self, body: &str) -> Result<(), SignalError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header(ACCEPT, JSON_MEDIA_TYPE)
            .header(CONTENT_TYPE, JSON_MEDIA_TYPE)
            .body(body.to_owned())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            // hyper only records the phrase when it is not the canonical one.
            let reason_phrase = response
                .extensions()
                .get::<ReasonPhrase>()
                .map(|phrase| String::from_utf8_lossy(phrase.as_bytes()).into_owned());
            return Err(SignalError::from_status(status, reason_phrase.as_deref()));
        }

        // The body is not used, only checked to be JSON.
        let text = response.text().await?;
        serde_json::from_str::<serde_json::Value>(&text)
            .map_err(|source| SignalError::Decode { source })?;
        Ok(())
    }
}

fn client_builder(timeout_secs: u64, user_agent: &str) -> ClientBuilder {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .user_agent(user_agent)
}

/// Awaits a delivery and logs how it ended. A panic inside `delivery` is
/// caught here and logged like any other failure.
async fn settle_delivery<F>(delivery: F, endpoint: &str, document: &SearchDocument, body: &str)
where
    F: Future<Output = Result<(), SignalError>>,
{
    match AssertUnwindSafe(delivery).catch_unwind().await {
        Ok(Ok(())) => {
            tracing::debug!(endpoint, payload = %body, "signal recorded");
        }
        Ok(Err(error)) => log_failure(document, body, &error),
        Err(panic) => {
            tracing::warn!(
                document = ?document,
                payload = %body,
                error = %format!("delivery panicked: {}", panic_message(panic.as_ref())),
                "failed to submit signal"
            );
        }
    }
}

fn log_failure(document: &SearchDocument, payload: &str, error: &SignalError) {
    tracing::warn!(
        document = ?document,
        payload = %payload,
        error = %error,
        "failed to submit signal"
    );
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "unknown panic payload"
    }
}

#[cfg(test)]
#[path = "emitter_test.rs"]
mod tests;
