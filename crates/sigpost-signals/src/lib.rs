//! Records user interactions with search results ("signals") against the
//! search service's `/rest/signals/add` endpoint.

pub mod emitter;
pub mod error;
pub mod payload;

pub use emitter::{SignalEmitter, SignalOutcome, SIGNALS_PATH};
pub use error::SignalError;
pub use payload::{SignalPayload, DEFAULT_SIGNAL_TYPE, DEFAULT_SIGNAL_WEIGHT};
