// crates.io
use serde_json::{Map, Value};
// self
use crate::{
	_prelude::*,
	auth::{AvatarUri, UserInfo, parse_profile_json},
	http::HeaderAuthenticator,
	provider::{
		Endpoint, EndpointSet, OAuth2Provider, Provider, UserInfoRequestArgs,
		catalog::field_ignore_case,
	},
};

/// Uber (OAuth 2.0); the profile endpoint expects a bearer header.
#[derive(Clone, Debug)]
pub struct Uber {
	endpoints: EndpointSet,
}
impl Uber {
	/// Creates the provider with the production endpoints.
	pub fn new() -> Self {
		Self {
			endpoints: EndpointSet::default()
				.with_authorize(Endpoint::new("https://login.uber.com", "/oauth/v2/authorize"))
				.with_token(Endpoint::new("https://login.uber.com", "/oauth/v2/token"))
				.with_user_info(Endpoint::new("https://api.uber.com", "/v1/me")),
		}
	}

	/// Replaces the endpoint table.
	pub fn with_endpoints(mut self, endpoints: EndpointSet) -> Self {
		self.endpoints = endpoints;

		self
	}
}
impl Default for Uber {
	fn default() -> Self {
		Self::new()
	}
}
impl Provider for Uber {
	fn name(&self) -> &str {
		"Uber"
	}

	fn endpoints(&self) -> &EndpointSet {
		&self.endpoints
	}

	fn before_user_info(&self, args: &mut UserInfoRequestArgs<'_>) -> Result<()> {
		args.request.set_authenticator(HeaderAuthenticator::bearer(args.access_token.clone()));

		Ok(())
	}

	fn parse_user_info(&self, content: &str) -> Result<UserInfo> {
		let profile = parse_profile_json::<Map<String, Value>>(content)?;

		Ok(UserInfo {
			id: field_ignore_case(&profile, "uuid"),
			first_name: field_ignore_case(&profile, "first_name"),
			last_name: field_ignore_case(&profile, "last_name"),
			email: field_ignore_case(&profile, "email"),
			avatar: field_ignore_case(&profile, "picture")
				.map(AvatarUri::uniform)
				.unwrap_or_default(),
			provider_name: String::new(),
		})
	}
}
impl OAuth2Provider for Uber {}
