// self
use crate::{
	_prelude::*,
	auth::{AvatarUri, UserInfo, parse_profile_json},
	provider::{
		Endpoint, EndpointSet, OAuth2Provider, Provider, UserInfoRequestArgs,
		catalog::string_or_number,
	},
};

const PROFILE_FIELDS: &str = "id,first_name,last_name,email,picture";

/// Facebook Login (OAuth 2.0).
#[derive(Clone, Debug)]
pub struct Facebook {
	endpoints: EndpointSet,
}
impl Facebook {
	/// Creates the provider with the production Graph API endpoints.
	pub fn new() -> Self {
		Self {
			endpoints: EndpointSet::default()
				.with_authorize(Endpoint::new("https://www.facebook.com", "/dialog/oauth"))
				.with_token(Endpoint::new("https://graph.facebook.com", "/oauth/access_token"))
				.with_user_info(Endpoint::new("https://graph.facebook.com", "/me")),
		}
	}

	/// Replaces the endpoint table.
	pub fn with_endpoints(mut self, endpoints: EndpointSet) -> Self {
		self.endpoints = endpoints;

		self
	}
}
impl Default for Facebook {
	fn default() -> Self {
		Self::new()
	}
}
impl Provider for Facebook {
	fn name(&self) -> &str {
		"Facebook"
	}

	fn endpoints(&self) -> &EndpointSet {
		&self.endpoints
	}

	fn before_user_info(&self, args: &mut UserInfoRequestArgs<'_>) -> Result<()> {
		args.request.add_parameter("fields", PROFILE_FIELDS);

		Ok(())
	}

	fn parse_user_info(&self, content: &str) -> Result<UserInfo> {
		let profile = parse_profile_json::<FacebookProfile>(content)?;
		let picture = profile
			.picture
			.and_then(|picture| picture.data.url)
			.filter(|url| !url.trim().is_empty());
		let sized = |size: &str| picture.as_ref().map(|url| format!("{url}?type={size}"));

		Ok(UserInfo {
			id: Some(profile.id),
			first_name: profile.first_name,
			last_name: profile.last_name,
			email: profile.email,
			avatar: AvatarUri {
				small: sized("small"),
				normal: sized("normal"),
				large: sized("large"),
			},
			provider_name: String::new(),
		})
	}
}
impl OAuth2Provider for Facebook {}

#[derive(Debug, Deserialize)]
struct FacebookProfile {
	#[serde(deserialize_with = "string_or_number")]
	id: String,
	first_name: Option<String>,
	last_name: Option<String>,
	email: Option<String>,
	picture: Option<FacebookPicture>,
}

#[derive(Debug, Deserialize)]
struct FacebookPicture {
	data: FacebookPictureData,
}

#[derive(Debug, Deserialize)]
struct FacebookPictureData {
	url: Option<String>,
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn parses_profile_and_sized_avatars() {
		let info = Facebook::new()
			.parse_user_info(
				r#"{"id":"10","first_name":"Ada","last_name":"Lovelace","email":"ada@example.com",
				"picture":{"data":{"url":"https://cdn.example.com/p.jpg","is_silhouette":false}}}"#,
			)
			.expect("Facebook profile should parse.");

		assert_eq!(info.id.as_deref(), Some("10"));
		assert_eq!(info.last_name.as_deref(), Some("Lovelace"));
		assert_eq!(info.avatar.small.as_deref(), Some("https://cdn.example.com/p.jpg?type=small"));
		assert_eq!(info.avatar.large.as_deref(), Some("https://cdn.example.com/p.jpg?type=large"));
	}

	#[test]
	fn missing_picture_leaves_avatar_empty() {
		let info = Facebook::new()
			.parse_user_info(r#"{"id":"10","first_name":"Ada","last_name":"Lovelace"}"#)
			.expect("Facebook profile without a picture should parse.");

		assert_eq!(info.avatar, AvatarUri::default());
		assert_eq!(info.email, None);
	}

	#[test]
	fn numeric_id_is_accepted() {
		let info = Facebook::new()
			.parse_user_info(r#"{"id":10206398742,"first_name":"Ada"}"#)
			.expect("Facebook profile with a numeric id should parse.");

		assert_eq!(info.id.as_deref(), Some("10206398742"));
		assert_eq!(info.first_name.as_deref(), Some("Ada"));
	}

	#[test]
	fn missing_or_non_scalar_id_is_malformed() {
		for body in [r#"{"first_name":"Ada"}"#, r#"{"id":true}"#, r#"{"id":{"value":"10"}}"#] {
			let err = Facebook::new()
				.parse_user_info(body)
				.expect_err("Profiles without a usable id must be rejected.");

			assert!(matches!(err, Error::MalformedResponse { .. }));
		}
	}
}
