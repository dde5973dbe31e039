//! Query parameters delivered to the application's redirect (callback) URI.

// self
use crate::{_prelude::*, obs::FlowStage};

/// Ordered, multi-valued view of callback parameters.
///
/// Web frameworks differ in how they expose query strings, so the engines accept this neutral
/// type; build it with [`CallbackParameters::from_query`], [`CallbackParameters::from_url`], or
/// by collecting `(key, value)` pairs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CallbackParameters(Vec<(String, String)>);
impl CallbackParameters {
	/// Creates an empty parameter list.
	pub fn new() -> Self {
		Self::default()
	}

	/// Parses an URL-encoded query string; a leading `?` is ignored.
	pub fn from_query(query: &str) -> Self {
		let query = query.strip_prefix('?').unwrap_or(query);

		url::form_urlencoded::parse(query.as_bytes())
			.map(|(key, value)| (key.into_owned(), value.into_owned()))
			.collect()
	}

	/// Collects the query parameters of a full callback URL.
	pub fn from_url(url: &Url) -> Self {
		url.query_pairs().map(|(key, value)| (key.into_owned(), value.into_owned())).collect()
	}

	/// Appends a parameter.
	pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
		self.0.push((key.into(), value.into()));

		self
	}

	/// Returns the first value of `key`, which may be empty.
	pub fn get(&self, key: &str) -> Option<&str> {
		self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
	}

	/// Returns every value of `key` in arrival order.
	pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
		self.0.iter().filter(move |(k, _)| k == key).map(|(_, v)| v.as_str())
	}

	/// Returns the first value of `key`, treating absent and empty values alike.
	///
	/// Failures surface as [`Error::UnexpectedResponse`] tagged with `stage`.
	pub fn require(&self, key: &str, stage: FlowStage) -> Result<&str> {
		self.get(key)
			.filter(|value| !value.is_empty())
			.ok_or_else(|| Error::unexpected_response(stage, key))
	}

	/// Iterates over all pairs in arrival order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
	}

	/// Returns `true` when no parameters were supplied.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}
impl<K, V> FromIterator<(K, V)> for CallbackParameters
where
	K: Into<String>,
	V: Into<String>,
{
	fn from_iter<I>(iter: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
	{
		Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
	}
}
