use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Opaque attribute bag the search service attaches to a result so that
/// interaction events can be correlated with the originating query.
pub type SignalAttributes = Map<String, Value>;

/// One result of a search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchDocument {
    #[serde(default)]
    pub fields: BTreeMap<String, Vec<Value>>,
    /// Absent (or `null`) when the service returned no signal context for
    /// this result; no event can be recorded for it then.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signal: Option<SignalAttributes>,
}

impl SearchDocument {
    /// Name of the field holding the document identifier.
    pub const ID_FIELD: &'static str = ".id";

    /// First string value of `field`, if any.
    #[must_use]
    pub fn first_value(&self, field: &str) -> Option<&str> {
        self.fields
            .get(field)
            .and_then(|values| values.iter().find_map(Value::as_str))
    }

    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.first_value(Self::ID_FIELD)
    }
}
