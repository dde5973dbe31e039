// self
use crate::{
	_prelude::*,
	auth::{AvatarUri, UserInfo, parse_profile_json},
	http::HeaderAuthenticator,
	provider::{
		AccessTokenRequestArgs, Endpoint, EndpointSet, OAuth2Provider, Provider,
		UserInfoRequestArgs,
	},
};

const CLIENT_ASSERTION_TYPE: &str = "urn:ietf:params:oauth:client-assertion-type:jwt-bearer";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const AVATAR_BASE: &str = "https://app.vssps.visualstudio.com/_apis/Profile/Profiles";

/// Visual Studio Team Services / Azure DevOps (OAuth 2.0 with JWT-bearer assertions).
///
/// The token endpoint does not accept the RFC 6749 body: the client secret travels as a
/// `client_assertion` and the code (or refresh token) as an `assertion`.
#[derive(Clone, Debug)]
pub struct Vsts {
	endpoints: EndpointSet,
}
impl Vsts {
	/// Creates the provider with the production endpoints.
	pub fn new() -> Self {
		Self {
			endpoints: EndpointSet::default()
				.with_authorize(Endpoint::new(
					"https://app.vssps.visualstudio.com/oauth2",
					"/authorize",
				))
				.with_token(Endpoint::new("https://app.vssps.visualstudio.com/oauth2", "/token"))
				.with_user_info(Endpoint::new(
					"https://app.vssps.visualstudio.com",
					"/_apis/profile/profiles/me?api-version=1.0",
				)),
		}
	}

	/// Replaces the endpoint table.
	pub fn with_endpoints(mut self, endpoints: EndpointSet) -> Self {
		self.endpoints = endpoints;

		self
	}
}
impl Default for Vsts {
	fn default() -> Self {
		Self::new()
	}
}
impl Provider for Vsts {
	fn name(&self) -> &str {
		"VSTS"
	}

	fn endpoints(&self) -> &EndpointSet {
		&self.endpoints
	}

	fn before_user_info(&self, args: &mut UserInfoRequestArgs<'_>) -> Result<()> {
		args.request.set_authenticator(HeaderAuthenticator::bearer(args.access_token.clone()));

		Ok(())
	}

	fn parse_user_info(&self, content: &str) -> Result<UserInfo> {
		let profile = parse_profile_json::<VstsProfile>(content)?;
		let sized = |size: &str| {
			Some(format!("{AVATAR_BASE}/{}/Avatar?size={size}&format=png", profile.id))
		};
		let avatar =
			AvatarUri { small: sized("small"), normal: sized("medium"), large: sized("large") };

		Ok(UserInfo {
			id: Some(profile.id),
			first_name: profile.display_name,
			last_name: None,
			email: profile.email_address,
			avatar,
			provider_name: String::new(),
		})
	}
}
impl OAuth2Provider for Vsts {
	fn before_access_token(&self, args: &mut AccessTokenRequestArgs<'_>) -> Result<()> {
		let refresh_token = args.parameters.get("refresh_token").filter(|value| !value.is_empty());
		let (grant_type, assertion) = match refresh_token {
			Some(token) => ("refresh_token", token),
			None => (JWT_BEARER_GRANT, args.parameters.require("code", args.grant.stage())?),
		};

		args.request
			.add_parameter("client_assertion_type", CLIENT_ASSERTION_TYPE)
			.add_parameter("client_assertion", args.config.client_secret.expose())
			.add_parameter("grant_type", grant_type)
			.add_parameter("assertion", assertion)
			.add_parameter("redirect_uri", &args.config.redirect_uri);

		Ok(())
	}
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VstsProfile {
	id: String,
	display_name: Option<String>,
	email_address: Option<String>,
}
