//! Handshake engines.
//!
//! [`AuthorizationCodeEngine`] drives OAuth 2.0 authorization code flows (login link, code
//! exchange, refresh, profile fetch); [`RequestTokenEngine`] drives OAuth 1.0a request token /
//! verifier flows. Both bind one provider and one [`ProviderConfig`] for their whole lifetime and
//! share the transport plumbing below.

pub mod authorization_code;
pub mod callback;
pub mod request_token;

pub use authorization_code::*;
pub use callback::*;
pub use request_token::*;

// crates.io
use oauth2::http::Method;
// self
use crate::{
	_prelude::*,
	auth::{TokenSecret, UserInfo},
	config::ProviderConfig,
	http::{Authenticator, ProviderHttpClient, ProviderRequest},
	obs::{self, FlowStage},
	provider::{Provider, UserInfoRequestArgs},
	transport::{self, TransportErrorMapper},
};
#[cfg(feature = "reqwest")]
use crate::{http::ReqwestHttpClient, transport::ReqwestTransportErrorMapper};

#[cfg(feature = "reqwest")]
/// OAuth 2.0 engine specialized for the crate's default reqwest transport stack.
pub type ReqwestAuthorizationCodeEngine =
	AuthorizationCodeEngine<ReqwestHttpClient, ReqwestTransportErrorMapper>;
#[cfg(feature = "reqwest")]
/// OAuth 1.0a engine specialized for the crate's default reqwest transport stack.
pub type ReqwestRequestTokenEngine =
	RequestTokenEngine<ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// Everything a profile fetch needs besides the authenticator.
pub(crate) struct ProfileFetch<'a, C, M, P>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
	P: ?Sized + Provider,
{
	pub(crate) http_client: &'a C,
	pub(crate) transport_mapper: &'a M,
	pub(crate) provider: &'a P,
	pub(crate) config: &'a ProviderConfig,
	pub(crate) url: &'a Url,
	pub(crate) access_token: &'a TokenSecret,
}
impl<C, M, P> ProfileFetch<'_, C, M, P>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
	P: ?Sized + Provider,
{
	/// GETs the user-info endpoint, parses the body, and stamps the provider name.
	pub(crate) async fn run<A>(self, authenticator: A) -> Result<UserInfo>
	where
		A: 'static + Authenticator,
	{
		const STAGE: FlowStage = FlowStage::ProfileFetch;

		let mut request = ProviderRequest::new(Method::GET, self.url.clone());

		request.set_authenticator(authenticator);
		self.provider.before_user_info(&mut UserInfoRequestArgs {
			request: &mut request,
			config: self.config,
			access_token: self.access_token,
		})?;

		let response =
			transport::execute(self.http_client, self.transport_mapper, STAGE, request).await?;
		let mut info = self.provider.parse_user_info(&response.content)?;

		info.provider_name = self.provider.name().to_owned();
		obs::trace_event(STAGE, "user info parsed");

		Ok(info)
	}
}
