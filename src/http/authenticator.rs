//! Pluggable strategies that attach credentials to a [`ProviderRequest`].

// crates.io
use oauth2::http::header::AUTHORIZATION;
// self
use crate::{_prelude::*, auth::TokenSecret, http::ProviderRequest};

const DEFAULT_TOKEN_PARAMETER: &str = "oauth_token";

/// Applies authentication to a request right before it is rendered.
///
/// Implementations run after every provider hook, so they see (and may sign) the final set of
/// parameters.
pub trait Authenticator
where
	Self: Send + Sync + Debug,
{
	/// Mutates `request` so the provider accepts it.
	fn authenticate(&self, request: &mut ProviderRequest) -> Result<()>;
}

/// Sends the access token as a request parameter (`oauth_token` unless overridden).
#[derive(Clone, Debug)]
pub struct QueryParameterAuthenticator {
	parameter: String,
	token: TokenSecret,
}
impl QueryParameterAuthenticator {
	/// Creates an authenticator using the default `oauth_token` parameter.
	pub fn new(token: impl Into<TokenSecret>) -> Self {
		Self { parameter: DEFAULT_TOKEN_PARAMETER.into(), token: token.into() }
	}

	/// Overrides the parameter name that carries the token.
	pub fn with_parameter_name(mut self, parameter: impl Into<String>) -> Self {
		self.parameter = parameter.into();

		self
	}

	/// Parameter name that carries the token.
	pub fn parameter_name(&self) -> &str {
		&self.parameter
	}
}
impl Authenticator for QueryParameterAuthenticator {
	fn authenticate(&self, request: &mut ProviderRequest) -> Result<()> {
		request.remove_parameter(&self.parameter);
		request.add_parameter(self.parameter.clone(), self.token.expose());

		Ok(())
	}
}

/// Sends the access token in the `Authorization` header as `<scheme> <token>`.
#[derive(Clone, Debug)]
pub struct HeaderAuthenticator {
	scheme: String,
	token: TokenSecret,
}
impl HeaderAuthenticator {
	/// Creates an authenticator with an arbitrary scheme.
	pub fn new(scheme: impl Into<String>, token: impl Into<TokenSecret>) -> Self {
		Self { scheme: scheme.into(), token: token.into() }
	}

	/// Creates a `Bearer` authenticator.
	pub fn bearer(token: impl Into<TokenSecret>) -> Self {
		Self::new("Bearer", token)
	}
}
impl Authenticator for HeaderAuthenticator {
	fn authenticate(&self, request: &mut ProviderRequest) -> Result<()> {
		request.insert_header(AUTHORIZATION, &format!("{} {}", self.scheme, self.token.expose()))?;

		Ok(())
	}
}
