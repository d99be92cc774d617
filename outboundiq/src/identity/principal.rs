//! The authenticated principal an auth layer attaches to a request.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An authenticated subject attached to a request by an upstream auth layer.
///
/// Every accessor is optional; the extractor probes them in a fixed order and
/// takes the first one present. Implementors should prefer providing
/// [`principal_type`](Principal::principal_type) explicitly; the
/// [`type_name`](Principal::type_name) fallback exists for principals that
/// only carry their type implicitly.
pub trait Principal: Send + Sync {
    /// The primary identifier (`id`).
    fn id(&self) -> Option<String> {
        None
    }

    /// An alternate identifier (`_id`, as produced by document stores).
    fn alternate_id(&self) -> Option<String> {
        None
    }

    /// A user identifier field (`userId`).
    fn user_id(&self) -> Option<String> {
        None
    }

    /// A token subject (`sub`).
    fn subject(&self) -> Option<String> {
        None
    }

    /// The explicit subject type (`type`).
    fn principal_type(&self) -> Option<String> {
        None
    }

    /// The subject's role (`role`).
    fn role(&self) -> Option<String> {
        None
    }

    /// The concrete type name of the principal, without module path or
    /// generic arguments.
    fn type_name(&self) -> Option<&'static str> {
        Some(short_type_name(std::any::type_name::<Self>()))
    }
}

/// Strips the module path and generic arguments from a type name.
///
/// `my_app::auth::Customer<Tenant>` becomes `Customer`.
#[must_use]
pub fn short_type_name(full: &'static str) -> &'static str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// A principal backed by a JSON object, such as decoded token claims or a
/// session record.
///
/// Field lookup follows the conventional names: `id`, `_id`, `userId` (or
/// `user_id`), `sub`, `type` and `role`. Non-string scalars are coerced to
/// strings and `null` counts as absent. A JSON object has no meaningful type
/// name, so [`type_name`](Principal::type_name) returns `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JsonPrincipal {
    fields: Map<String, Value>,
}

impl JsonPrincipal {
    /// Creates an empty principal.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a principal from a JSON value; returns None unless it is an object.
    #[must_use]
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self { fields }),
            _ => None,
        }
    }

    /// Sets a field.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Returns the raw value of a field.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    fn string_field(&self, key: &str) -> Option<String> {
        match self.fields.get(key)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(number_to_string(n)),
            other => Some(other.to_string()),
        }
    }
}

// Integral floats render without a fractional part, so `42.0` and `42`
// yield the same subject ID.
fn number_to_string(n: &serde_json::Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.is_finite() && f.fract() == 0.0 && f.abs() < 1e21 => {
            if f == 0.0 {
                "0".to_string()
            } else {
                format!("{f:.0}")
            }
        }
        _ => n.to_string(),
    }
}

impl From<Map<String, Value>> for JsonPrincipal {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

impl Principal for JsonPrincipal {
    fn id(&self) -> Option<String> {
        self.string_field("id")
    }

    fn alternate_id(&self) -> Option<String> {
        self.string_field("_id")
    }

    fn user_id(&self) -> Option<String> {
        self.string_field("userId")
            .or_else(|| self.string_field("user_id"))
    }

    fn subject(&self) -> Option<String> {
        self.string_field("sub")
    }

    fn principal_type(&self) -> Option<String> {
        self.string_field("type")
    }

    fn role(&self) -> Option<String> {
        self.string_field("role")
    }

    fn type_name(&self) -> Option<&'static str> {
        None
    }
}
