//! Normalized user profile produced by provider parsers.

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{_prelude::*, obs::FlowStage};

/// Avatar URLs in the sizes providers commonly expose.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AvatarUri {
	/// Small avatar URL.
	pub small: Option<String>,
	/// Normal avatar URL.
	pub normal: Option<String>,
	/// Large avatar URL.
	pub large: Option<String>,
}
impl AvatarUri {
	/// Uses the same URL for every size.
	pub fn uniform(uri: impl Into<String>) -> Self {
		let uri = uri.into();

		Self { small: Some(uri.clone()), normal: Some(uri.clone()), large: Some(uri) }
	}
}

/// Provider-independent view of the authenticated user.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserInfo {
	/// Provider-scoped user identifier.
	pub id: Option<String>,
	/// Given name.
	pub first_name: Option<String>,
	/// Family name.
	pub last_name: Option<String>,
	/// Email address, when the provider shares it.
	pub email: Option<String>,
	/// Avatar URLs.
	pub avatar: AvatarUri,
	/// Name of the provider that produced the profile; stamped by the engine.
	pub provider_name: String,
}

/// Deserializes profile JSON, reporting the failing path on error.
///
/// Provider parsers use this so malformed profiles surface as
/// [`Error::MalformedResponse`] tagged with [`FlowStage::ProfileFetch`].
pub fn parse_profile_json<T>(content: &str) -> Result<T>
where
	T: DeserializeOwned,
{
	let mut deserializer = serde_json::Deserializer::from_str(content);

	serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|source| Error::MalformedResponse { stage: FlowStage::ProfileFetch, source })
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[derive(Debug, Deserialize)]
	struct Profile {
		#[allow(dead_code)]
		id: String,
	}

	#[test]
	fn profile_parse_errors_carry_the_json_path() {
		let err = parse_profile_json::<Profile>("{\"id\":42}")
			.expect_err("Numeric ids should not deserialize into strings.");

		match err {
			Error::MalformedResponse { stage, source } => {
				assert_eq!(stage, FlowStage::ProfileFetch);
				assert_eq!(source.path().to_string(), "id");
			},
			other => panic!("Unexpected error: {other:?}"),
		}
	}

	#[test]
	fn uniform_avatar_fills_every_size() {
		let avatar = AvatarUri::uniform("https://cdn.example.com/a.png");

		assert_eq!(avatar.small, avatar.large);
		assert_eq!(avatar.normal.as_deref(), Some("https://cdn.example.com/a.png"));
	}
}
