//! Demonstrates plugging a custom HTTP client and error mapper into an engine.
//!
//! 1. Implement [`ProviderHttpClient`] so the transport records [`ResponseMetadata`] via the
//!    provided [`ResponseMetadataSlot`].
//! 2. Provide a [`TransportErrorMapper`] that understands the transport's error type.
//! 3. Pass both to [`AuthorizationCodeEngine::with_http_client`].

// std
use std::{
	error::Error as StdError,
	fmt::{Display, Formatter, Result as FmtResult},
	future::Future,
	pin::Pin,
	sync::Arc,
};
// crates.io
use color_eyre::Result;
// self
use oauth_handshake::{
	auth::{UserInfo, parse_profile_json},
	config::ProviderConfig,
	error::{Error, TransportError},
	flows::{AuthorizationCodeEngine, CallbackParameters},
	http::{ProviderHttpClient, ResponseMetadata, ResponseMetadataSlot},
	oauth2::{AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse},
	obs::FlowStage,
	provider::{Endpoint, EndpointSet, OAuth2Provider, Provider},
	transport::TransportErrorMapper,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let config = ProviderConfig::new("demo-client", "demo-secret", "https://app.example.com/cb");
	let mut engine: AuthorizationCodeEngine<MockHttpClient, MockTransportErrorMapper> =
		AuthorizationCodeEngine::with_http_client(
			Arc::new(DemoProvider::new()),
			config.clone(),
			MockHttpClient::default(),
			MockTransportErrorMapper,
		)?;
	let token = engine.exchange_code_for_token(&CallbackParameters::from_query("code=demo")).await?;

	println!("Access token issued by the mock transport: {token}.");

	let mut failing: AuthorizationCodeEngine<MockHttpClient, MockTransportErrorMapper> =
		AuthorizationCodeEngine::with_http_client(
			Arc::new(DemoProvider::new()),
			config,
			MockHttpClient { fail_with: Some(MockTransportError { host: "provider.example.com" }) },
			MockTransportErrorMapper,
		)?;

	match failing.exchange_code(&CallbackParameters::from_query("code=demo")).await {
		Ok(_) => println!("Mock transport unexpectedly succeeded."),
		Err(e) => println!("Transport error mapped during {:?}: {e}", e.stage()),
	}

	Ok(())
}

#[derive(Debug)]
struct DemoProvider {
	endpoints: EndpointSet,
}
impl DemoProvider {
	fn new() -> Self {
		let base = "https://provider.example.com";

		Self {
			endpoints: EndpointSet::default()
				.with_authorize(Endpoint::new(base, "/authorize"))
				.with_token(Endpoint::new(base, "/token"))
				.with_user_info(Endpoint::new(base, "/me")),
		}
	}
}
impl Provider for DemoProvider {
	fn name(&self) -> &str {
		"Demo"
	}

	fn endpoints(&self) -> &EndpointSet {
		&self.endpoints
	}

	fn parse_user_info(&self, content: &str) -> oauth_handshake::error::Result<UserInfo> {
		parse_profile_json(content)
	}
}
impl OAuth2Provider for DemoProvider {}

#[derive(Clone, Debug)]
struct MockTransportError {
	host: &'static str,
}
impl Display for MockTransportError {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "DNS lookup failed for {}", self.host)
	}
}
impl StdError for MockTransportError {}

#[derive(Clone, Default)]
struct MockHttpClient {
	fail_with: Option<MockTransportError>,
}
impl ProviderHttpClient for MockHttpClient {
	type Handle = MockHttpHandle;
	type TransportError = MockTransportError;

	fn with_metadata(&self, slot: ResponseMetadataSlot) -> Self::Handle {
		MockHttpHandle { slot, fail_with: self.fail_with.clone() }
	}
}

struct MockHttpHandle {
	slot: ResponseMetadataSlot,
	fail_with: Option<MockTransportError>,
}
impl<'a> AsyncHttpClient<'a> for MockHttpHandle {
	type Error = HttpClientError<MockTransportError>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'a + Send + Sync>>;

	fn call(&'a self, _request: HttpRequest) -> Self::Future {
		let slot = self.slot.clone();
		let fail_with = self.fail_with.clone();

		Box::pin(async move {
			slot.take();

			if let Some(error) = fail_with {
				// `Reqwest` is the variant oauth2 reserves for boxed transport errors of any type.
				return Err(HttpClientError::Reqwest(Box::new(error)));
			}

			slot.store(ResponseMetadata { status: Some(200), retry_after: None });

			Ok(HttpResponse::new(
				b"{\"access_token\":\"mock-access\",\"token_type\":\"bearer\",\"expires_in\":900}"
					.to_vec(),
			))
		})
	}
}

#[derive(Clone, Default)]
struct MockTransportErrorMapper;
impl TransportErrorMapper<MockTransportError> for MockTransportErrorMapper {
	fn map_transport_error(
		&self,
		stage: FlowStage,
		metadata: Option<&ResponseMetadata>,
		error: HttpClientError<MockTransportError>,
	) -> Error {
		match error {
			HttpClientError::Reqwest(inner) => TransportError::network(stage, *inner).into(),
			other => TransportError::Other {
				stage,
				message: other.to_string(),
				status: metadata.and_then(|meta| meta.status),
			}
			.into(),
		}
	}
}
