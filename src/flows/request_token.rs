//! OAuth 1.0a request token / verifier engine.
//!
//! `login_uri` obtains temporary credentials and points the user at the authorization page,
//! `exchange_verifier` trades the callback's verifier for access credentials, and `user_info`
//! signs profile requests with those credentials.

// crates.io
use oauth2::http::Method;
// self
use crate::{
	_prelude::*,
	auth::{TokenCredentials, UserInfo},
	config::ProviderConfig,
	error::ConfigError,
	flows::{CallbackParameters, ProfileFetch},
	http::{OAuth1Authenticator, ProviderHttpClient, ProviderRequest, SignatureMethod},
	obs::{self, FlowOutcome, FlowSpan, FlowStage},
	provider::{EndpointKind, OAuth1Provider, RequestTokenRequestArgs, TokenResponseArgs},
	transport::{self, TransportErrorMapper},
};
#[cfg(feature = "reqwest")]
use crate::{http::ReqwestHttpClient, transport::ReqwestTransportErrorMapper};

const OAUTH_TOKEN_KEY: &str = "oauth_token";
const OAUTH_VERIFIER_KEY: &str = "oauth_verifier";
const STATE_KEY: &str = "state";

/// Drives the OAuth 1.0a flow against one provider.
pub struct RequestTokenEngine<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	http_client: Arc<C>,
	transport_mapper: Arc<M>,
	provider: Arc<dyn OAuth1Provider>,
	config: ProviderConfig,
	request_token_url: Url,
	authorize_url: Url,
	access_token_url: Url,
	user_info_url: Url,
	signature_method: SignatureMethod,
	request_token: Option<TokenCredentials>,
	access: Option<TokenCredentials>,
	extras: BTreeMap<String, String>,
}
impl<C, M> RequestTokenEngine<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates an engine that reuses the caller-provided transport + mapper pair.
	///
	/// All four endpoints must be declared; the token endpoint serves as the access-token
	/// endpoint.
	pub fn with_http_client(
		provider: Arc<dyn OAuth1Provider>,
		config: ProviderConfig,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Result<Self> {
		let endpoints = provider.endpoints();
		let resolve = |kind| endpoints.require(kind).map_err(ConfigError::from);
		let request_token_url = resolve(EndpointKind::RequestToken)?;
		let authorize_url = resolve(EndpointKind::Authorize)?;
		let access_token_url = resolve(EndpointKind::Token)?;
		let user_info_url = resolve(EndpointKind::UserInfo)?;

		Ok(Self {
			http_client: http_client.into(),
			transport_mapper: mapper.into(),
			provider,
			config,
			request_token_url,
			authorize_url,
			access_token_url,
			user_info_url,
			signature_method: SignatureMethod::default(),
			request_token: None,
			access: None,
			extras: BTreeMap::new(),
		})
	}

	/// Overrides the signature method (HMAC-SHA1 by default).
	pub fn with_signature_method(mut self, method: SignatureMethod) -> Self {
		self.signature_method = method;

		self
	}

	/// Client configuration bound to this engine.
	pub fn config(&self) -> &ProviderConfig {
		&self.config
	}

	/// Name of the bound provider.
	pub fn provider_name(&self) -> &str {
		self.provider.name()
	}

	/// Request token awaiting the user's authorization, if any.
	pub fn request_token(&self) -> Option<&TokenCredentials> {
		self.request_token.as_ref()
	}

	/// Puts back a request token issued by an earlier engine (for example across a redirect
	/// handled by another process).
	pub fn restore_request_token(&mut self, token: TokenCredentials) {
		self.request_token = Some(token);
	}

	/// Access credentials from the last verifier exchange.
	pub fn access_token(&self) -> Option<&TokenCredentials> {
		self.access.as_ref()
	}

	/// Replaces the access credentials, typically with values persisted by the caller.
	pub fn restore_access_token(&mut self, token: TokenCredentials) {
		self.access = Some(token);
	}

	/// Values recorded by the provider's `after_token_response` hook during `login_uri`.
	pub fn extras(&self) -> &BTreeMap<String, String> {
		&self.extras
	}

	/// Obtains a request token and returns the provider's authorization URL for it.
	///
	/// A non-empty `state` fails with [`Error::NotSupported`] before any request when the
	/// provider cannot round-trip it.
	pub async fn login_uri(&mut self, state: Option<&str>) -> Result<Url> {
		const STAGE: FlowStage = FlowStage::RequestToken;

		let span = FlowSpan::new(STAGE, "login_uri");

		obs::record_stage_outcome(STAGE, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let state = state.filter(|value| !value.is_empty());

				if state.is_some() && !self.provider.supports_state() {
					return Err(Error::NotSupported { feature: STATE_KEY });
				}

				let mut request =
					ProviderRequest::new(Method::POST, self.request_token_url.clone());

				request.set_authenticator(
					OAuth1Authenticator::for_request_token(&self.config)
						.with_signature_method(self.signature_method),
				);
				self.provider.before_request_token(&mut RequestTokenRequestArgs {
					request: &mut request,
					config: &self.config,
				})?;

				let response = transport::execute(
					self.http_client.as_ref(),
					self.transport_mapper.as_ref(),
					STAGE,
					request,
				)
				.await?;
				let parameters = CallbackParameters::new();
				let mut extras = BTreeMap::new();

				self.provider.after_token_response(&mut TokenResponseArgs {
					stage: STAGE,
					response: &response,
					parameters: &parameters,
					config: &self.config,
					extras: &mut extras,
				})?;

				let token = TokenCredentials::from_query_response(STAGE, &response.content)?;
				let mut url = self.authorize_url.clone();

				{
					let mut query = url.query_pairs_mut();

					query.append_pair(OAUTH_TOKEN_KEY, token.token.expose());

					if let Some(state) = state {
						query.append_pair(STATE_KEY, state);
					}
				}

				self.request_token = Some(token);
				self.extras = extras;
				obs::trace_event(STAGE, "request token stored");

				Ok(url)
			})
			.await;

		obs::record_stage_outcome(STAGE, FlowOutcome::of(&result));

		result
	}

	/// Trades the callback's verifier for access credentials and returns the user's profile.
	///
	/// The callback's `oauth_token` must match the held request token. Without a held request
	/// token (another process issued it and it was not restored) the exchange is signed with an
	/// empty token secret.
	pub async fn exchange_verifier(&mut self, parameters: &CallbackParameters) -> Result<UserInfo> {
		const STAGE: FlowStage = FlowStage::VerifierExchange;

		let span = FlowSpan::new(STAGE, "exchange_verifier");

		obs::record_stage_outcome(STAGE, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let token = parameters.require(OAUTH_TOKEN_KEY, STAGE)?;

				if let Some(held) = &self.request_token
					&& held.token.expose() != token
				{
					return Err(Error::unexpected_response(STAGE, OAUTH_TOKEN_KEY));
				}

				let verifier = parameters.require(OAUTH_VERIFIER_KEY, STAGE)?;
				let request_token =
					self.request_token.clone().unwrap_or_else(|| TokenCredentials::new(token, ""));
				let mut request = ProviderRequest::new(Method::POST, self.access_token_url.clone());

				request.set_authenticator(
					OAuth1Authenticator::for_access_token(&self.config, &request_token, verifier)
						.with_signature_method(self.signature_method),
				);

				let response = transport::execute(
					self.http_client.as_ref(),
					self.transport_mapper.as_ref(),
					STAGE,
					request,
				)
				.await?;
				let access = TokenCredentials::from_query_response(STAGE, &response.content)?;

				self.access = Some(access);
				self.request_token = None;
				obs::trace_event(STAGE, "access credentials stored");

				self.user_info().await
			})
			.await;

		obs::record_stage_outcome(STAGE, FlowOutcome::of(&result));

		result
	}

	/// Fetches the user's profile, signing the request with the access credentials.
	pub async fn user_info(&self) -> Result<UserInfo> {
		const STAGE: FlowStage = FlowStage::ProfileFetch;

		let span = FlowSpan::new(STAGE, "user_info");

		obs::record_stage_outcome(STAGE, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let access = self.access.as_ref().ok_or(ConfigError::MissingAccessToken)?;

				ProfileFetch {
					http_client: self.http_client.as_ref(),
					transport_mapper: self.transport_mapper.as_ref(),
					provider: self.provider.as_ref(),
					config: &self.config,
					url: &self.user_info_url,
					access_token: &access.token,
				}
				.run(
					OAuth1Authenticator::for_protected_resource(&self.config, access)
						.with_signature_method(self.signature_method),
				)
				.await
			})
			.await;

		obs::record_stage_outcome(STAGE, FlowOutcome::of(&result));

		result
	}
}
#[cfg(feature = "reqwest")]
impl RequestTokenEngine<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	/// Creates an engine that provisions its own reqwest-backed transport.
	pub fn new(provider: Arc<dyn OAuth1Provider>, config: ProviderConfig) -> Result<Self> {
		Self::with_http_client(
			provider,
			config,
			ReqwestHttpClient::default(),
			Arc::new(ReqwestTransportErrorMapper),
		)
	}
}
impl<C, M> Debug for RequestTokenEngine<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RequestTokenEngine")
			.field("provider", &self.provider.name())
			.field("config", &self.config)
			.field("signature_method", &self.signature_method)
			.field("request_token", &self.request_token)
			.field("access", &self.access)
			.finish()
	}
}
