//! OAuth 2.0 authorization code engine.
//!
//! The engine composes the login link, exchanges the callback's `code` for tokens, refreshes
//! them on demand, and fetches the user's profile. Token state is owned by the engine and only
//! ever replaced by [`TokenState::from_response`]; callers that persist tokens across restarts
//! read it with [`AuthorizationCodeEngine::token_state`] and put it back with
//! [`AuthorizationCodeEngine::restore_token_state`].

// crates.io
use oauth2::http::Method;
// self
use crate::{
	_prelude::*,
	auth::{TokenState, UserInfo},
	config::ProviderConfig,
	error::ConfigError,
	flows::{CallbackParameters, ProfileFetch},
	http::{ProviderHttpClient, ProviderRequest, QueryParameterAuthenticator},
	obs::{self, FlowOutcome, FlowSpan, FlowStage},
	provider::{
		AccessTokenRequestArgs, EndpointKind, GrantMode, OAuth2Provider, TokenResponseArgs,
	},
	transport::{self, TransportErrorMapper},
};
#[cfg(feature = "reqwest")]
use crate::{http::ReqwestHttpClient, transport::ReqwestTransportErrorMapper};

const ERROR_KEY: &str = "error";
const ERROR_DESCRIPTION_KEY: &str = "error_description";
const STATE_KEY: &str = "state";
const REFRESH_TOKEN_KEY: &str = "refresh_token";

/// Drives the OAuth 2.0 authorization code flow against one provider.
///
/// Operations that change token state take `&mut self`, so a single engine never runs two
/// exchanges at once; share it behind an async mutex when several tasks need it.
pub struct AuthorizationCodeEngine<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	http_client: Arc<C>,
	transport_mapper: Arc<M>,
	provider: Arc<dyn OAuth2Provider>,
	config: ProviderConfig,
	authorize_url: Url,
	token_url: Url,
	user_info_url: Url,
	token: Option<TokenState>,
	state: Option<String>,
}
impl<C, M> AuthorizationCodeEngine<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates an engine that reuses the caller-provided transport + mapper pair.
	///
	/// The authorize, token, and user-info endpoints are resolved here; a missing or malformed
	/// endpoint fails with [`ConfigError::Endpoint`].
	pub fn with_http_client(
		provider: Arc<dyn OAuth2Provider>,
		config: ProviderConfig,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Result<Self> {
		let endpoints = provider.endpoints();
		let authorize_url = endpoints.require(EndpointKind::Authorize).map_err(ConfigError::from)?;
		let token_url = endpoints.require(EndpointKind::Token).map_err(ConfigError::from)?;
		let user_info_url = endpoints.require(EndpointKind::UserInfo).map_err(ConfigError::from)?;

		Ok(Self {
			http_client: http_client.into(),
			transport_mapper: mapper.into(),
			provider,
			config,
			authorize_url,
			token_url,
			user_info_url,
			token: None,
			state: None,
		})
	}

	/// Client configuration bound to this engine.
	pub fn config(&self) -> &ProviderConfig {
		&self.config
	}

	/// Name of the bound provider.
	pub fn provider_name(&self) -> &str {
		self.provider.name()
	}

	/// Current token state, if an exchange succeeded (or state was restored).
	pub fn token_state(&self) -> Option<&TokenState> {
		self.token.as_ref()
	}

	/// Replaces the token state, typically with a value persisted by the caller.
	pub fn restore_token_state(&mut self, state: TokenState) {
		self.token = Some(state);
	}

	/// `state` value captured from the most recent authorization callback.
	pub fn state(&self) -> Option<&str> {
		self.state.as_deref()
	}

	/// Builds the provider login link.
	///
	/// `scope` is included only when configured, and `state` only when non-empty.
	pub fn login_uri(&self, state: Option<&str>) -> Url {
		let mut url = self.authorize_url.clone();

		{
			let mut query = url.query_pairs_mut();

			query
				.append_pair("response_type", "code")
				.append_pair("client_id", &self.config.client_id)
				.append_pair("redirect_uri", &self.config.redirect_uri);

			if let Some(scope) = self.config.scope() {
				query.append_pair("scope", scope);
			}
			if let Some(state) = state.filter(|value| !value.is_empty()) {
				query.append_pair(STATE_KEY, state);
			}
		}

		url
	}

	/// Exchanges the authorization callback for tokens and returns the user's profile.
	///
	/// A callback carrying `error` fails with [`Error::Provider`] before any request is made.
	pub async fn exchange_code(&mut self, parameters: &CallbackParameters) -> Result<UserInfo> {
		const STAGE: FlowStage = FlowStage::CodeExchange;

		let span = FlowSpan::new(STAGE, "exchange_code");

		obs::record_stage_outcome(STAGE, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				self.accept_callback(parameters)?;
				self.query_access_token(GrantMode::AuthorizationCode, parameters, None).await?;
				self.user_info().await
			})
			.await;

		obs::record_stage_outcome(STAGE, FlowOutcome::of(&result));

		result
	}

	/// Exchanges the authorization callback for tokens without fetching the profile.
	///
	/// Returns the new access token.
	pub async fn exchange_code_for_token(
		&mut self,
		parameters: &CallbackParameters,
	) -> Result<String> {
		const STAGE: FlowStage = FlowStage::CodeExchange;

		let span = FlowSpan::new(STAGE, "exchange_code_for_token");

		obs::record_stage_outcome(STAGE, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				self.accept_callback(parameters)?;
				self.query_access_token(GrantMode::AuthorizationCode, parameters, None).await
			})
			.await;

		obs::record_stage_outcome(STAGE, FlowOutcome::of(&result));

		result
	}

	/// Returns a usable access token, refreshing it when needed.
	///
	/// The cached token is returned without network I/O unless `force_update` is set, the
	/// expiry is unknown, or it has passed. Refreshing sends `refresh_token` when supplied and
	/// non-empty, else the stored one; with neither, the call fails with
	/// [`ConfigError::MissingRefreshToken`]. When the response carries no new refresh token,
	/// the stored one is kept, or the supplied one if nothing was stored.
	pub async fn current_token(
		&mut self,
		refresh_token: Option<&str>,
		force_update: bool,
	) -> Result<String> {
		const STAGE: FlowStage = FlowStage::Refresh;

		let span = FlowSpan::new(STAGE, "current_token");

		obs::record_stage_outcome(STAGE, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				if !force_update
					&& let Some(token) = &self.token
					&& token.is_fresh_at(OffsetDateTime::now_utc())
				{
					obs::trace_event(STAGE, "cached access token reused");

					return Ok(token.access_token.expose().to_owned());
				}

				let stored = self
					.token
					.as_ref()
					.and_then(|token| token.refresh_token.as_ref())
					.filter(|secret| !secret.is_empty())
					.map(|secret| secret.expose().to_owned());
				let credential = refresh_token
					.filter(|value| !value.is_empty())
					.map(ToOwned::to_owned)
					.or_else(|| stored.clone())
					.ok_or(ConfigError::MissingRefreshToken)?;
				// A response without `refresh_token` leaves the stored one in place.
				let retained = stored.unwrap_or_else(|| credential.clone());
				let parameters =
					CallbackParameters::from_iter([(REFRESH_TOKEN_KEY, credential.as_str())]);

				self.query_access_token(GrantMode::RefreshToken, &parameters, Some(&retained)).await
			})
			.await;

		obs::record_stage_outcome(STAGE, FlowOutcome::of(&result));

		result
	}

	/// Fetches the user's profile with the current access token.
	///
	/// The token is sent as the `oauth_token` parameter unless the provider's
	/// `before_user_info` hook installs another authenticator.
	pub async fn user_info(&self) -> Result<UserInfo> {
		const STAGE: FlowStage = FlowStage::ProfileFetch;

		let span = FlowSpan::new(STAGE, "user_info");

		obs::record_stage_outcome(STAGE, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let token = self.token.as_ref().ok_or(ConfigError::MissingAccessToken)?;

				ProfileFetch {
					http_client: self.http_client.as_ref(),
					transport_mapper: self.transport_mapper.as_ref(),
					provider: self.provider.as_ref(),
					config: &self.config,
					url: &self.user_info_url,
					access_token: &token.access_token,
				}
				.run(QueryParameterAuthenticator::new(token.access_token.clone()))
				.await
			})
			.await;

		obs::record_stage_outcome(STAGE, FlowOutcome::of(&result));

		result
	}

	fn accept_callback(&mut self, parameters: &CallbackParameters) -> Result<()> {
		if let Some(error) = parameters.get(ERROR_KEY).filter(|value| !value.is_empty()) {
			return Err(Error::Provider {
				error: error.to_owned(),
				description: parameters.get(ERROR_DESCRIPTION_KEY).map(ToOwned::to_owned),
			});
		}

		self.state = parameters.get(STATE_KEY).map(ToOwned::to_owned);

		Ok(())
	}

	async fn query_access_token(
		&mut self,
		grant: GrantMode,
		parameters: &CallbackParameters,
		retained_refresh_token: Option<&str>,
	) -> Result<String> {
		let stage = grant.stage();
		let mut request = ProviderRequest::new(Method::POST, self.token_url.clone());

		self.provider.before_access_token(&mut AccessTokenRequestArgs {
			request: &mut request,
			parameters,
			config: &self.config,
			grant,
		})?;

		let response = transport::execute(
			self.http_client.as_ref(),
			self.transport_mapper.as_ref(),
			stage,
			request,
		)
		.await?;
		let mut extras = BTreeMap::new();

		self.provider.after_token_response(&mut TokenResponseArgs {
			stage,
			response: &response,
			parameters,
			config: &self.config,
			extras: &mut extras,
		})?;

		let state = TokenState::from_response(
			grant,
			&response.content,
			retained_refresh_token,
			OffsetDateTime::now_utc(),
		)?
		.with_extras(extras);
		let access_token = state.access_token.expose().to_owned();

		self.token = Some(state);
		obs::trace_event(stage, "token state replaced");

		Ok(access_token)
	}
}
#[cfg(feature = "reqwest")]
impl AuthorizationCodeEngine<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	/// Creates an engine that provisions its own reqwest-backed transport.
	pub fn new(provider: Arc<dyn OAuth2Provider>, config: ProviderConfig) -> Result<Self> {
		Self::with_http_client(
			provider,
			config,
			ReqwestHttpClient::default(),
			Arc::new(ReqwestTransportErrorMapper),
		)
	}
}
impl<C, M> Debug for AuthorizationCodeEngine<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthorizationCodeEngine")
			.field("provider", &self.provider.name())
			.field("config", &self.config)
			.field("token", &self.token)
			.field("state", &self.state)
			.finish()
	}
}

#[cfg(all(test, feature = "reqwest"))]
mod tests {
	// self
	use super::*;
	use crate::{flows::ReqwestAuthorizationCodeEngine, provider::catalog::Facebook};

	fn engine(scope: &str) -> ReqwestAuthorizationCodeEngine {
		let config =
			ProviderConfig::new("cid", "secret", "https://app.example.com/cb").with_scope(scope);

		AuthorizationCodeEngine::new(Arc::new(Facebook::new()), config)
			.expect("Facebook endpoints should resolve.")
	}

	#[test]
	fn login_uri_includes_scope_only_when_configured() {
		let url = engine("").login_uri(None);
		let params = CallbackParameters::from_url(&url);

		assert_eq!(url.host_str(), Some("www.facebook.com"));
		assert_eq!(params.get("response_type"), Some("code"));
		assert_eq!(params.get("client_id"), Some("cid"));
		assert_eq!(params.get("redirect_uri"), Some("https://app.example.com/cb"));
		assert_eq!(params.get("scope"), None);
		assert_eq!(params.get("state"), None);

		let url = engine("email").login_uri(Some("xyz"));
		let params = CallbackParameters::from_url(&url);

		assert_eq!(params.get("scope"), Some("email"));
		assert_eq!(params.get("state"), Some("xyz"));
	}

	#[test]
	fn empty_state_is_omitted() {
		let url = engine("").login_uri(Some(""));

		assert_eq!(CallbackParameters::from_url(&url).get("state"), None);
	}

	#[tokio::test]
	async fn provider_error_short_circuits() {
		let mut engine = engine("");
		let err = engine
			.exchange_code(&CallbackParameters::from_query(
				"error=access_denied&error_description=User+denied",
			))
			.await
			.expect_err("Provider errors must surface.");

		match err {
			Error::Provider { error, description } => {
				assert_eq!(error, "access_denied");
				assert_eq!(description.as_deref(), Some("User denied"));
			},
			other => panic!("Unexpected error: {other:?}"),
		}
		assert!(engine.token_state().is_none());
	}

	#[tokio::test]
	async fn refresh_without_any_token_is_a_config_error() {
		let err = engine("")
			.current_token(None, false)
			.await
			.expect_err("Refresh without a refresh token must fail.");

		assert!(matches!(err, Error::Config(ConfigError::MissingRefreshToken)));
	}

	#[tokio::test]
	async fn user_info_requires_an_access_token() {
		let err = engine("").user_info().await.expect_err("Profile fetch needs a token.");

		assert!(matches!(err, Error::Config(ConfigError::MissingAccessToken)));
	}
}
