//! Provider traits that customize the handshake pipelines.
//!
//! Engines own the sequencing; providers only describe endpoints, parse profiles, and adjust
//! requests or responses at fixed hook points. Every hook has a default, so a typical provider
//! implements `name`, `endpoints`, and `parse_user_info` and nothing else.

// self
use crate::{
	_prelude::*,
	auth::UserInfo,
	provider::{
		AccessTokenRequestArgs, EndpointSet, RequestTokenRequestArgs, TokenResponseArgs,
		UserInfoRequestArgs,
	},
};

/// Behavior shared by OAuth 1.0a and OAuth 2.0 providers.
pub trait Provider
where
	Self: Send + Sync,
{
	/// Friendly provider name stamped on every [`UserInfo`].
	fn name(&self) -> &str;

	/// Endpoint table; engines resolve it once at construction.
	fn endpoints(&self) -> &EndpointSet;

	/// Converts the user-info response body into a [`UserInfo`].
	///
	/// `provider_name` is overwritten by the engine, so parsers may leave it empty.
	fn parse_user_info(&self, content: &str) -> Result<UserInfo>;

	/// Runs after a token response passed status verification and before it is parsed.
	fn after_token_response(&self, _args: &mut TokenResponseArgs<'_>) -> Result<()> {
		Ok(())
	}

	/// Runs before the user-info request is sent.
	///
	/// Providers add parameters here or replace the default authenticator.
	fn before_user_info(&self, _args: &mut UserInfoRequestArgs<'_>) -> Result<()> {
		Ok(())
	}
}

/// OAuth 2.0 authorization code providers.
pub trait OAuth2Provider
where
	Self: Provider,
{
	/// Fills the token request body.
	///
	/// Overrides replace the default body entirely; call
	/// [`AccessTokenRequestArgs::apply_standard_grant`] to extend it instead.
	fn before_access_token(&self, args: &mut AccessTokenRequestArgs<'_>) -> Result<()> {
		args.apply_standard_grant()
	}
}

/// OAuth 1.0a request token / verifier providers.
pub trait OAuth1Provider
where
	Self: Provider,
{
	/// Runs before the temporary-credential request is signed and sent.
	fn before_request_token(&self, _args: &mut RequestTokenRequestArgs<'_>) -> Result<()> {
		Ok(())
	}

	/// Whether the provider round-trips an opaque `state` through the login page.
	fn supports_state(&self) -> bool {
		false
	}
}
