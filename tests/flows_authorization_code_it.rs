#![cfg(feature = "reqwest")]

// crates.io
use httpmock::prelude::*;
// self
use oauth_handshake::{
	_preludet::*,
	auth::{TokenState, UserInfo, parse_profile_json},
	error::{ConfigError, TransportError},
	flows::CallbackParameters,
	obs::FlowStage,
	provider::{EndpointSet, GrantMode, OAuth2Provider, Provider},
};

#[derive(Debug)]
struct MockProvider {
	endpoints: EndpointSet,
}
impl MockProvider {
	fn new(server: &MockServer) -> Arc<dyn OAuth2Provider> {
		let base = server.base_url();

		Arc::new(Self {
			endpoints: EndpointSet::default()
				.with_authorize(mock_endpoint(&base, "/authorize"))
				.with_token(mock_endpoint(&base, "/token"))
				.with_user_info(mock_endpoint(&base, "/me")),
		})
	}
}
impl Provider for MockProvider {
	fn name(&self) -> &str {
		"Mock"
	}

	fn endpoints(&self) -> &EndpointSet {
		&self.endpoints
	}

	fn parse_user_info(&self, content: &str) -> Result<UserInfo> {
		parse_profile_json(content)
	}
}
impl OAuth2Provider for MockProvider {}

fn expired_state(refresh_token: &str) -> TokenState {
	TokenState::from_response(
		GrantMode::AuthorizationCode,
		&format!("access_token=stale&refresh_token={refresh_token}&expires_in=-60"),
		None,
		OffsetDateTime::now_utc(),
	)
	.expect("Expired fixture state should build.")
}

#[tokio::test]
async fn exchange_code_parses_tokens_and_fetches_profile() {
	let server = MockServer::start_async().await;
	let config = test_provider_config("email");
	let mut engine = build_reqwest_test_oauth2_engine(MockProvider::new(&server), config);
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/token")
				.header("content-type", "application/x-www-form-urlencoded");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"T\",\"expires_in\":\"3600\",\"refresh_token\":\"R\"}");
		})
		.await;
	let profile_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/me").query_param("oauth_token", "T");
			then.status(200).body("{\"id\":\"42\",\"first_name\":\"Ada\",\"email\":\"ada@x.io\"}");
		})
		.await;
	let before = OffsetDateTime::now_utc();
	let info = engine
		.exchange_code(&CallbackParameters::from_query("code=abc&state=xyz"))
		.await
		.expect("Code exchange should succeed.");

	token_mock.assert_async().await;
	profile_mock.assert_async().await;

	assert_eq!(info.id.as_deref(), Some("42"));
	assert_eq!(info.first_name.as_deref(), Some("Ada"));
	assert_eq!(info.provider_name, "Mock");
	assert_eq!(engine.state(), Some("xyz"));

	let state = engine.token_state().expect("Token state should be stored.");
	let expires_at = state.expires_at.expect("Expiry should be derived from a string field.");

	assert_eq!(state.access_token.expose(), "T");
	assert_eq!(state.refresh_token.as_ref().map(|token| token.expose()), Some("R"));
	assert!(expires_at >= before + Duration::seconds(3600));
	assert!(expires_at <= OffsetDateTime::now_utc() + Duration::seconds(3600));
}

#[tokio::test]
async fn provider_error_issues_no_token_request() {
	let server = MockServer::start_async().await;
	let mut engine =
		build_reqwest_test_oauth2_engine(MockProvider::new(&server), test_provider_config(""));
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200).body("{\"access_token\":\"T\"}");
		})
		.await;
	let err = engine
		.exchange_code(&CallbackParameters::from_query("error=access_denied"))
		.await
		.expect_err("Denied consent must fail.");

	assert!(matches!(err, Error::Provider { ref error, .. } if error == "access_denied"));

	token_mock.assert_calls_async(0).await;
}

#[tokio::test]
async fn query_string_token_response_is_accepted() {
	let server = MockServer::start_async().await;
	let mut engine =
		build_reqwest_test_oauth2_engine(MockProvider::new(&server), test_provider_config(""));
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200)
				.header("content-type", "text/plain")
				.body("access_token=X&token_type=bearer");
		})
		.await;
	let token = engine
		.exchange_code_for_token(&CallbackParameters::from_query("code=abc"))
		.await
		.expect("Query-string token response should parse.");

	token_mock.assert_async().await;

	assert_eq!(token, "X");

	let state = engine.token_state().expect("Token state should be stored.");

	assert_eq!(state.token_type.as_deref(), Some("bearer"));
	assert_eq!(state.expires_at, None);
}

#[tokio::test]
async fn missing_access_token_is_an_unexpected_response() {
	let server = MockServer::start_async().await;
	let mut engine =
		build_reqwest_test_oauth2_engine(MockProvider::new(&server), test_provider_config(""));
	let _token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200).body("{\"access_token\":\"\",\"expires_in\":60}");
		})
		.await;
	let err = engine
		.exchange_code_for_token(&CallbackParameters::from_query("code=abc"))
		.await
		.expect_err("Empty access token must be rejected.");

	assert!(matches!(
		err,
		Error::UnexpectedResponse { stage: FlowStage::CodeExchange, ref field }
			if field == "access_token"
	));
	assert!(engine.token_state().is_none());
}

#[tokio::test]
async fn current_token_reuses_fresh_tokens() {
	let server = MockServer::start_async().await;
	let mut engine =
		build_reqwest_test_oauth2_engine(MockProvider::new(&server), test_provider_config(""));
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200).body("{\"access_token\":\"fresh\",\"expires_in\":3600}");
		})
		.await;

	engine.restore_token_state(expired_state("R0"));

	let first = engine.current_token(None, false).await.expect("Refresh should succeed.");
	let second = engine.current_token(None, false).await.expect("Cached token should be reused.");

	token_mock.assert_calls_async(1).await;

	assert_eq!(first, "fresh");
	assert_eq!(second, "fresh");
}

#[tokio::test]
async fn refresh_retains_or_replaces_the_refresh_token() {
	let server = MockServer::start_async().await;
	let mut engine =
		build_reqwest_test_oauth2_engine(MockProvider::new(&server), test_provider_config(""));
	let without_refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200).body("{\"access_token\":\"A1\",\"expires_in\":3600}");
		})
		.await;

	engine.restore_token_state(expired_state("R0"));
	engine.current_token(None, false).await.expect("First refresh should succeed.");
	without_refresh.assert_async().await;

	let state = engine.token_state().expect("Token state should be stored.");

	assert_eq!(state.access_token.expose(), "A1");
	assert_eq!(state.refresh_token.as_ref().map(|token| token.expose()), Some("R0"));

	without_refresh.delete_async().await;

	let with_refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200)
				.body("{\"access_token\":\"A2\",\"refresh_token\":\"R1\",\"expires_in\":3600}");
		})
		.await;

	engine.current_token(None, true).await.expect("Forced refresh should succeed.");
	with_refresh.assert_async().await;

	let state = engine.token_state().expect("Token state should be stored.");

	assert_eq!(state.access_token.expose(), "A2");
	assert_eq!(state.refresh_token.as_ref().map(|token| token.expose()), Some("R1"));
}

#[tokio::test]
async fn supplied_refresh_token_is_sent_but_stored_one_is_kept() {
	let server = MockServer::start_async().await;
	let mut engine =
		build_reqwest_test_oauth2_engine(MockProvider::new(&server), test_provider_config(""));
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token").form_urlencoded_tuple("refresh_token", "S");
			then.status(200).body("{\"access_token\":\"A\",\"expires_in\":3600}");
		})
		.await;

	engine.restore_token_state(expired_state("R0"));

	let token = engine
		.current_token(Some("S"), false)
		.await
		.expect("Refresh with a supplied token should succeed.");

	token_mock.assert_async().await;

	assert_eq!(token, "A");
	assert_eq!(
		engine.token_state().and_then(|state| state.refresh_token.as_ref()).map(|t| t.expose()),
		Some("R0")
	);
}

#[tokio::test]
async fn supplied_refresh_token_is_kept_when_none_was_stored() {
	let server = MockServer::start_async().await;
	let mut engine =
		build_reqwest_test_oauth2_engine(MockProvider::new(&server), test_provider_config(""));
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token").form_urlencoded_tuple("refresh_token", "supplied");
			then.status(200).body("{\"access_token\":\"A\"}");
		})
		.await;
	let token = engine
		.current_token(Some("supplied"), false)
		.await
		.expect("Refresh with a supplied token should succeed.");

	token_mock.assert_async().await;

	assert_eq!(token, "A");
	assert_eq!(
		engine.token_state().and_then(|state| state.refresh_token.as_ref()).map(|t| t.expose()),
		Some("supplied")
	);
}

#[tokio::test]
async fn error_status_carries_a_body_preview() {
	let server = MockServer::start_async().await;
	let mut engine =
		build_reqwest_test_oauth2_engine(MockProvider::new(&server), test_provider_config(""));
	let _token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(400)
				.header("retry-after", "7")
				.body("{\"error\":\"invalid_grant\",\"error_description\":\"already used\"}");
		})
		.await;
	let err = engine
		.exchange_code(&CallbackParameters::from_query("code=stale"))
		.await
		.expect_err("HTTP 400 must surface as a transport error.");

	assert_eq!(err.stage(), Some(FlowStage::CodeExchange));

	match err {
		Error::Transport(TransportError::Status { status, retry_after, body_preview, .. }) => {
			assert_eq!(status, 400);
			assert_eq!(retry_after, Some(Duration::seconds(7)));
			assert!(body_preview.contains("invalid_grant"));
		},
		other => panic!("Unexpected error variant: {other:?}."),
	}
}

#[test]
fn missing_endpoint_fails_construction() {
	#[derive(Debug)]
	struct NoProfile(EndpointSet);
	impl Provider for NoProfile {
		fn name(&self) -> &str {
			"NoProfile"
		}

		fn endpoints(&self) -> &EndpointSet {
			&self.0
		}

		fn parse_user_info(&self, content: &str) -> Result<UserInfo> {
			parse_profile_json(content)
		}
	}
	impl OAuth2Provider for NoProfile {}

	let endpoints = EndpointSet::default()
		.with_authorize(mock_endpoint("https://p.example.com", "/authorize"))
		.with_token(mock_endpoint("https://p.example.com", "/token"));
	let result =
		ReqwestTestOAuth2Engine::new(Arc::new(NoProfile(endpoints)), test_provider_config(""));

	assert!(matches!(result, Err(Error::Config(ConfigError::Endpoint(_)))));
}
