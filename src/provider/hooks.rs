//! Arguments handed to provider hooks at fixed pipeline stages.
//!
//! Each bundle borrows the in-flight request (or the received response) together with the
//! callback parameters that triggered the call and the client configuration. Hooks mutate the
//! borrowed values in place and report failures through [`Result`].

// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	config::ProviderConfig,
	flows::CallbackParameters,
	http::ProviderRequest,
	obs::FlowStage,
	provider::GrantMode,
	transport::ProviderResponse,
};

/// Input of [`OAuth2Provider::before_access_token`](crate::provider::OAuth2Provider::before_access_token).
#[derive(Debug)]
pub struct AccessTokenRequestArgs<'a> {
	/// POST request to the token endpoint, still without a body.
	pub request: &'a mut ProviderRequest,
	/// Callback parameters (authorization code grant) or `{refresh_token}` (refresh grant).
	pub parameters: &'a CallbackParameters,
	/// Client configuration.
	pub config: &'a ProviderConfig,
	/// Grant requested by the engine.
	pub grant: GrantMode,
}
impl AccessTokenRequestArgs<'_> {
	/// Adds the RFC 6749 form fields for the current grant.
	///
	/// The refresh grant sends `refresh_token`, `client_id`, `client_secret`, and `grant_type`;
	/// the authorization code grant sends `code`, `client_id`, `client_secret`, `redirect_uri`,
	/// and `grant_type`. A missing or empty `code`/`refresh_token` is reported as
	/// [`Error::UnexpectedResponse`].
	pub fn apply_standard_grant(&mut self) -> Result<()> {
		let stage = self.grant.stage();

		match self.grant {
			GrantMode::RefreshToken => {
				let refresh_token = self.parameters.require("refresh_token", stage)?;

				self.request
					.add_parameter("refresh_token", refresh_token)
					.add_parameter("client_id", &self.config.client_id)
					.add_parameter("client_secret", self.config.client_secret.expose())
					.add_parameter("grant_type", self.grant.as_str());
			},
			GrantMode::AuthorizationCode => {
				let code = self.parameters.require("code", stage)?;

				self.request
					.add_parameter("code", code)
					.add_parameter("client_id", &self.config.client_id)
					.add_parameter("client_secret", self.config.client_secret.expose())
					.add_parameter("redirect_uri", &self.config.redirect_uri)
					.add_parameter("grant_type", self.grant.as_str());
			},
		}

		Ok(())
	}
}

/// Input of [`OAuth1Provider::before_request_token`](crate::provider::OAuth1Provider::before_request_token).
#[derive(Debug)]
pub struct RequestTokenRequestArgs<'a> {
	/// POST request to the temporary-credential endpoint.
	pub request: &'a mut ProviderRequest,
	/// Client configuration.
	pub config: &'a ProviderConfig,
}

/// Input of [`Provider::after_token_response`](crate::provider::Provider::after_token_response).
#[derive(Debug)]
pub struct TokenResponseArgs<'a> {
	/// Stage that received the response.
	pub stage: FlowStage,
	/// Verified (2xx/3xx) provider response.
	pub response: &'a ProviderResponse,
	/// Parameters that triggered the token request.
	pub parameters: &'a CallbackParameters,
	/// Client configuration.
	pub config: &'a ProviderConfig,
	/// Provider-specific values to keep next to the token (for example an `x_user_id`).
	pub extras: &'a mut BTreeMap<String, String>,
}

/// Input of [`Provider::before_user_info`](crate::provider::Provider::before_user_info).
#[derive(Debug)]
pub struct UserInfoRequestArgs<'a> {
	/// GET request to the user-info endpoint with the engine's default authenticator installed.
	pub request: &'a mut ProviderRequest,
	/// Client configuration.
	pub config: &'a ProviderConfig,
	/// Current access token.
	pub access_token: &'a TokenSecret,
}

#[cfg(test)]
mod tests {
	// crates.io
	use oauth2::http::Method;
	// self
	use super::*;

	fn config() -> ProviderConfig {
		ProviderConfig::new("cid", "csecret", "https://app.example.com/cb")
	}

	fn token_request() -> ProviderRequest {
		ProviderRequest::new(
			Method::POST,
			Url::parse("https://provider.example.com/token").expect("Fixture URL should parse."),
		)
	}

	#[test]
	fn standard_code_grant_fields() {
		let config = config();
		let parameters = CallbackParameters::from_query("code=abc&state=xyz");
		let mut request = token_request();

		AccessTokenRequestArgs {
			request: &mut request,
			parameters: &parameters,
			config: &config,
			grant: GrantMode::AuthorizationCode,
		}
		.apply_standard_grant()
		.expect("Code grant fields should be added.");

		let form = request
			.form_parameters()
			.iter()
			.map(|(k, v)| (k.as_str(), v.as_str()))
			.collect::<Vec<_>>();

		assert_eq!(
			form,
			[
				("code", "abc"),
				("client_id", "cid"),
				("client_secret", "csecret"),
				("redirect_uri", "https://app.example.com/cb"),
				("grant_type", "authorization_code"),
			]
		);
	}

	#[test]
	fn standard_refresh_grant_fields() {
		let config = config();
		let parameters = CallbackParameters::from_iter([("refresh_token", "R1")]);
		let mut request = token_request();

		AccessTokenRequestArgs {
			request: &mut request,
			parameters: &parameters,
			config: &config,
			grant: GrantMode::RefreshToken,
		}
		.apply_standard_grant()
		.expect("Refresh grant fields should be added.");

		assert_eq!(request.parameter("refresh_token"), Some("R1"));
		assert_eq!(request.parameter("grant_type"), Some("refresh_token"));
		assert_eq!(request.parameter("redirect_uri"), None);
	}

	#[test]
	fn missing_code_is_an_unexpected_response() {
		let config = config();
		let parameters = CallbackParameters::from_query("code=&state=xyz");
		let mut request = token_request();
		let err = AccessTokenRequestArgs {
			request: &mut request,
			parameters: &parameters,
			config: &config,
			grant: GrantMode::AuthorizationCode,
		}
		.apply_standard_grant()
		.expect_err("Empty codes must be rejected.");

		assert!(matches!(
			err,
			Error::UnexpectedResponse { stage: FlowStage::CodeExchange, ref field } if field == "code"
		));
		assert!(request.form_parameters().is_empty());
	}
}
