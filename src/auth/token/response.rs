//! Dual-format token response field extraction.
//!
//! Providers answer token requests with either a JSON object or a URL-encoded query string and
//! never declare which one in advance. [`parse_token_field`] tries JSON first and falls back to
//! query-string decoding, so callers only deal with "found" or "not found".

// crates.io
use serde_json::Value;

/// Extracts `key` from a token endpoint response body.
///
/// JSON objects are searched by dotted path (`a.b`, numeric segments index arrays) and scalar
/// values are rendered as strings, so `{"expires_in":3600}` yields `"3600"`. Content that is not
/// a JSON object is decoded as `application/x-www-form-urlencoded` and the first value for `key`
/// is returned. Missing keys and JSON `null` yield `None`.
pub fn parse_token_field(content: &str, key: &str) -> Option<String> {
	if content.is_empty() || key.is_empty() {
		return None;
	}

	match serde_json::from_str::<Value>(content) {
		Ok(document @ Value::Object(_)) => select_path(&document, key).and_then(render_value),
		_ => url::form_urlencoded::parse(content.as_bytes())
			.find(|(name, _)| name == key)
			.map(|(_, value)| value.into_owned()),
	}
}

fn select_path<'a>(document: &'a Value, path: &str) -> Option<&'a Value> {
	path.split('.').try_fold(document, |node, segment| match node {
		Value::Object(map) => map.get(segment),
		Value::Array(items) => segment.parse::<usize>().ok().and_then(|idx| items.get(idx)),
		_ => None,
	})
}

fn render_value(value: &Value) -> Option<String> {
	match value {
		Value::Null => None,
		Value::String(text) => Some(text.clone()),
		Value::Bool(_) | Value::Number(_) | Value::Array(_) | Value::Object(_) =>
			Some(value.to_string()),
	}
}
