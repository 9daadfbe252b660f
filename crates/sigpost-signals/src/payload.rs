//! Builds the JSON body sent for one signal.

use serde_json::Value;
use sigpost_core::{SearchDocument, SignalAttributes};

use crate::error::SignalError;

pub const DEFAULT_SIGNAL_TYPE: &str = "click";
pub const DEFAULT_SIGNAL_WEIGHT: i64 = 1;

/// A document's signal attributes with `type` and `weight` overlaid.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalPayload(SignalAttributes);

impl SignalPayload {
    /// Shallow-copies `document.signal` and sets `type` and `weight` on the
    /// copy, replacing any values already stored under those keys.
    ///
    /// Returns `None` when the document carries no signal attributes. The
    /// document itself is never modified.
    #[must_use]
    pub fn overlay(document: &SearchDocument, kind: &str, weight: i64) -> Option<Self> {
        let mut attributes = document.signal.clone()?;
        attributes.insert("type".to_owned(), Value::from(kind));
        attributes.insert("weight".to_owned(), Value::from(weight));
        Some(Self(attributes))
    }

    #[must_use]
    pub fn attributes(&self) -> &SignalAttributes {
        &self.0
    }

    /// Serializes the payload to the request body.
    ///
    /// # Errors
    ///
    /// Returns [`SignalError::Encode`] if serialization fails.
    pub fn to_body(&self) -> Result<String, SignalError> {
        serde_json::to_string(&self.0).map_err(SignalError::Encode)
    }
}
