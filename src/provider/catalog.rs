//! Ready-made providers.
//!
//! Each provider points at its production endpoints by default; `with_endpoints` swaps the table
//! (for staging tenants or mock servers) without touching the hooks.

mod facebook;
mod mailru;
mod uber;
mod vsts;

pub use facebook::*;
pub use mailru::*;
pub use uber::*;
pub use vsts::*;

// crates.io
use serde::{Deserialize, Deserializer, de::Error as _};
use serde_json::{Map, Value};

/// Renders a JSON scalar as a string; `null`, arrays, and objects yield `None`.
fn scalar_string(value: &Value) -> Option<String> {
	match value {
		Value::String(s) => Some(s.clone()),
		Value::Number(n) => Some(n.to_string()),
		Value::Bool(b) => Some(b.to_string()),
		Value::Null | Value::Array(_) | Value::Object(_) => None,
	}
}

/// Deserializes a JSON string or number into a `String`.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
	D: Deserializer<'de>,
{
	match Value::deserialize(deserializer)? {
		Value::String(s) => Ok(s),
		Value::Number(n) => Ok(n.to_string()),
		_ => Err(D::Error::custom("Expected a string or a number.")),
	}
}

/// Looks up `key` ignoring ASCII case.
fn field_ignore_case(object: &Map<String, Value>, key: &str) -> Option<String> {
	object.iter().find(|(k, _)| k.eq_ignore_ascii_case(key)).and_then(|(_, v)| scalar_string(v))
}
