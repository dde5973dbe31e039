// self
use crate::{
	_prelude::*,
	auth::{AvatarUri, UserInfo, parse_profile_json},
	obs::FlowStage,
	provider::{Endpoint, EndpointSet, OAuth2Provider, Provider, UserInfoRequestArgs},
};

/// Mail.Ru (OAuth 2.0); profile calls go through the MD5-signed REST platform API.
#[derive(Clone, Debug)]
pub struct MailRu {
	endpoints: EndpointSet,
}
impl MailRu {
	/// Creates the provider with the production endpoints.
	pub fn new() -> Self {
		Self {
			endpoints: EndpointSet::default()
				.with_authorize(Endpoint::new("https://connect.mail.ru", "/oauth/authorize"))
				.with_token(Endpoint::new("https://connect.mail.ru", "/oauth/token"))
				.with_user_info(Endpoint::new("http://www.appsmail.ru", "/platform/api")),
		}
	}

	/// Replaces the endpoint table.
	pub fn with_endpoints(mut self, endpoints: EndpointSet) -> Self {
		self.endpoints = endpoints;

		self
	}
}
impl Default for MailRu {
	fn default() -> Self {
		Self::new()
	}
}
impl Provider for MailRu {
	fn name(&self) -> &str {
		"MailRu"
	}

	fn endpoints(&self) -> &EndpointSet {
		&self.endpoints
	}

	fn before_user_info(&self, args: &mut UserInfoRequestArgs<'_>) -> Result<()> {
		let token = args.access_token.expose();

		args.request
			.add_parameter("app_id", &args.config.client_id)
			.add_parameter("method", "users.getInfo")
			.add_parameter("secure", "1")
			.add_parameter("session_key", token);

		// The default authenticator appends `oauth_token` at dispatch; the signature covers it.
		let mut signed = args
			.request
			.query_parameters()
			.iter()
			.chain(args.request.form_parameters())
			.filter(|(key, _)| key != "oauth_token")
			.map(|(key, value)| (key.as_str(), value.as_str()))
			.chain([("oauth_token", token)])
			.collect::<Vec<_>>();

		signed.sort_by(|a, b| a.0.cmp(b.0));

		let sig = signature(&signed, args.config.client_secret.expose());

		args.request.add_parameter("sig", sig);

		Ok(())
	}

	fn parse_user_info(&self, content: &str) -> Result<UserInfo> {
		let profile = parse_profile_json::<Vec<MailRuProfile>>(content)?
			.into_iter()
			.next()
			.ok_or_else(|| Error::unexpected_response(FlowStage::ProfileFetch, "uid"))?;

		Ok(UserInfo {
			id: Some(profile.uid),
			first_name: profile.first_name,
			last_name: profile.last_name,
			email: profile.email,
			avatar: AvatarUri { small: None, normal: profile.pic, large: None },
			provider_name: String::new(),
		})
	}
}
impl OAuth2Provider for MailRu {}

#[derive(Debug, Deserialize)]
struct MailRuProfile {
	uid: String,
	first_name: Option<String>,
	last_name: Option<String>,
	email: Option<String>,
	pic: Option<String>,
}

/// `hex(md5("k1=v1k2=v2..." + secret))` over name-sorted parameters.
fn signature(sorted: &[(&str, &str)], secret: &str) -> String {
	let mut payload =
		sorted.iter().map(|(key, value)| format!("{key}={value}")).collect::<String>();

	payload.push_str(secret);

	format!("{:x}", md5::compute(payload.as_bytes()))
}

#[cfg(test)]
mod tests {
	// crates.io
	use oauth2::http::Method;
	// self
	use super::*;
	use crate::{auth::TokenSecret, config::ProviderConfig, http::ProviderRequest};

	#[test]
	fn user_info_parameters_are_md5_signed() {
		let config = ProviderConfig::new("app-1", "s3cr3t", "https://app/cb");
		let token = TokenSecret::new("AT");
		let mut request = ProviderRequest::new(
			Method::GET,
			Url::parse("http://www.appsmail.ru/platform/api").expect("Fixture URL should parse."),
		);

		MailRu::new()
			.before_user_info(&mut UserInfoRequestArgs {
				request: &mut request,
				config: &config,
				access_token: &token,
			})
			.expect("Hook should succeed.");

		let expected = format!(
			"{:x}",
			md5::compute(
				"app_id=app-1method=users.getInfooauth_token=ATsecure=1session_key=ATs3cr3t"
			)
		);

		assert_eq!(request.parameter("sig"), Some(expected.as_str()));
		assert_eq!(request.parameter("session_key"), Some("AT"));
		assert_eq!(request.parameter("oauth_token"), None);
	}

	#[test]
	fn parses_first_array_entry() {
		let info = MailRu::new()
			.parse_user_info(
				r#"[{"uid":"15410773191172635989","first_name":"Ivan","last_name":"Petrov",
				"email":"ivan@mail.ru","pic":"http://avt.appsmail.ru/mail/ivan/_avatar"}]"#,
			)
			.expect("Mail.Ru profile should parse.");

		assert_eq!(info.id.as_deref(), Some("15410773191172635989"));
		assert_eq!(info.avatar.normal.as_deref(), Some("http://avt.appsmail.ru/mail/ivan/_avatar"));
		assert_eq!(info.avatar.small, None);
	}

	#[test]
	fn empty_array_is_an_unexpected_response() {
		let err = MailRu::new().parse_user_info("[]").expect_err("Empty profiles must fail.");

		assert!(matches!(err, Error::UnexpectedResponse { stage: FlowStage::ProfileFetch, .. }));
	}
}
