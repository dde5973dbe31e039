//! OAuth 2.0 token state and the exchange transition that produces it.

// self
use crate::{
	_prelude::*,
	auth::{TokenSecret, parse_token_field},
	provider::GrantMode,
};

const ACCESS_TOKEN_KEY: &str = "access_token";
const REFRESH_TOKEN_KEY: &str = "refresh_token";
const TOKEN_TYPE_KEY: &str = "token_type";
const EXPIRES_IN_KEY: &str = "expires_in";

/// Tokens held by an OAuth 2.0 engine after a successful exchange.
///
/// Values are replaced wholesale by [`TokenState::from_response`]; the engine never patches
/// individual fields in place.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenState {
	/// Access token; never empty.
	pub access_token: TokenSecret,
	/// Refresh token, when the provider issued (or previously issued) one.
	pub refresh_token: Option<TokenSecret>,
	/// Token type reported by the provider (usually `bearer`).
	pub token_type: Option<String>,
	/// Expiry instant derived from `expires_in`; unset when the provider omitted it.
	#[serde(with = "time::serde::rfc3339::option")]
	pub expires_at: Option<OffsetDateTime>,
	/// Extra response fields recorded by the provider's after-token hook.
	#[serde(default)]
	pub extras: BTreeMap<String, String>,
}
impl TokenState {
	/// Builds the next token state from a token endpoint response body.
	///
	/// `retained_refresh_token` is the refresh token to keep after a `refresh_token` grant whose
	/// response omits a new non-empty one; providers commonly do. Authorization-code exchanges
	/// take the response's refresh token as-is.
	pub fn from_response(
		grant: GrantMode,
		content: &str,
		retained_refresh_token: Option<&str>,
		now: OffsetDateTime,
	) -> Result<Self> {
		let access_token = parse_token_field(content, ACCESS_TOKEN_KEY)
			.filter(|value| !value.is_empty())
			.ok_or_else(|| Error::unexpected_response(grant.stage(), ACCESS_TOKEN_KEY))?;
		let issued_refresh =
			parse_token_field(content, REFRESH_TOKEN_KEY).filter(|value| !value.is_empty());
		let refresh_token = match grant {
			GrantMode::AuthorizationCode => issued_refresh,
			GrantMode::RefreshToken =>
				issued_refresh.or_else(|| retained_refresh_token.map(ToOwned::to_owned)),
		};
		let expires_at = parse_token_field(content, EXPIRES_IN_KEY)
			.and_then(|raw| raw.trim().parse::<i64>().ok())
			.and_then(|secs| now.checked_add(Duration::seconds(secs)));

		Ok(Self {
			access_token: TokenSecret::new(access_token),
			refresh_token: refresh_token.map(TokenSecret::new),
			token_type: parse_token_field(content, TOKEN_TYPE_KEY),
			expires_at,
			extras: BTreeMap::new(),
		})
	}

	/// Attaches extra fields captured by a provider hook.
	pub fn with_extras(mut self, extras: BTreeMap<String, String>) -> Self {
		self.extras = extras;

		self
	}

	/// Returns `true` when the access token can be reused at `now` without refreshing.
	///
	/// Tokens without a known expiry are never considered fresh.
	pub fn is_fresh_at(&self, now: OffsetDateTime) -> bool {
		!self.access_token.is_empty() && self.expires_at.is_some_and(|expires_at| now < expires_at)
	}
}
impl Debug for TokenState {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenState")
			.field("access_token", &"<redacted>")
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
			.field("token_type", &self.token_type)
			.field("expires_at", &self.expires_at)
			.field("extras", &self.extras.keys().collect::<Vec<_>>())
			.finish()
	}
}
