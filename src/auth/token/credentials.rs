//! OAuth 1.0a token credentials (request tokens and access tokens).

// self
use crate::{_prelude::*, auth::TokenSecret, obs::FlowStage};

const OAUTH_TOKEN_KEY: &str = "oauth_token";
const OAUTH_TOKEN_SECRET_KEY: &str = "oauth_token_secret";

/// Token + shared-secret pair issued by an OAuth 1.0a provider.
///
/// OAuth 1.0a tokens carry no expiry; the pair stays valid until the provider revokes it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenCredentials {
	/// `oauth_token` value.
	pub token: TokenSecret,
	/// `oauth_token_secret` value used as the second half of the signing key.
	pub secret: TokenSecret,
}
impl TokenCredentials {
	/// Creates a credential pair from raw values.
	pub fn new(token: impl Into<String>, secret: impl Into<String>) -> Self {
		Self { token: TokenSecret::new(token), secret: TokenSecret::new(secret) }
	}

	/// Parses a strictly URL-encoded provider response carrying `oauth_token` and
	/// `oauth_token_secret`.
	pub fn from_query_response(stage: FlowStage, content: &str) -> Result<Self> {
		let mut token = None;
		let mut secret = None;

		for (key, value) in url::form_urlencoded::parse(content.as_bytes()) {
			match key.as_ref() {
				OAUTH_TOKEN_KEY if token.is_none() => token = Some(value.into_owned()),
				OAUTH_TOKEN_SECRET_KEY if secret.is_none() => secret = Some(value.into_owned()),
				_ => {},
			}
		}

		let token = token
			.filter(|value| !value.is_empty())
			.ok_or_else(|| Error::unexpected_response(stage, OAUTH_TOKEN_KEY))?;
		let secret = secret
			.filter(|value| !value.is_empty())
			.ok_or_else(|| Error::unexpected_response(stage, OAUTH_TOKEN_SECRET_KEY))?;

		Ok(Self::new(token, secret))
	}
}
impl Debug for TokenCredentials {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenCredentials")
			.field("token", &self.token)
			.field("secret", &self.secret)
			.finish()
	}
}
