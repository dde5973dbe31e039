//! Provider-agnostic OAuth 1.0a and OAuth 2.0 handshake engines.
//!
//! Engines own the sequencing of each handshake; providers plug in their endpoints, request
//! hooks, and profile parsing through the traits in [`provider`].

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod config;
pub mod error;
pub mod flows;
pub mod http;
pub mod obs;
pub mod provider;
pub mod transport;
#[cfg(feature = "reqwest")]
#[doc(hidden)]
pub mod _preludet {
	//! Convenience re-exports and helpers shared by unit and integration tests.

	pub use crate::_prelude::*;

	// self
	use crate::{
		config::ProviderConfig,
		flows::{AuthorizationCodeEngine, RequestTokenEngine},
		http::ReqwestHttpClient,
		provider::{Endpoint, OAuth1Provider, OAuth2Provider},
		transport::ReqwestTransportErrorMapper,
	};

	/// OAuth 2.0 engine alias used by reqwest-backed integration tests.
	pub type ReqwestTestOAuth2Engine =
		AuthorizationCodeEngine<ReqwestHttpClient, ReqwestTransportErrorMapper>;
	/// OAuth 1.0a engine alias used by reqwest-backed integration tests.
	pub type ReqwestTestOAuth1Engine =
		RequestTokenEngine<ReqwestHttpClient, ReqwestTransportErrorMapper>;

	/// Client configuration fixture shared by tests.
	pub fn test_provider_config(scope: &str) -> ProviderConfig {
		ProviderConfig::new("client-it", "secret-it", "https://app.example.com/callback")
			.with_scope(scope)
	}

	/// Builds an endpoint rooted at a mock server base URL.
	pub fn mock_endpoint(base_uri: &str, resource_path: &str) -> Endpoint {
		Endpoint::new(base_uri, resource_path)
	}

	/// Builds a reqwest HTTP client that never follows redirects and accepts the self-signed
	/// certificates produced by `httpmock` during tests.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.redirect(reqwest::redirect::Policy::none())
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Constructs an [`AuthorizationCodeEngine`] backed by the test reqwest transport.
	pub fn build_reqwest_test_oauth2_engine(
		provider: Arc<dyn OAuth2Provider>,
		config: ProviderConfig,
	) -> ReqwestTestOAuth2Engine {
		AuthorizationCodeEngine::with_http_client(
			provider,
			config,
			test_reqwest_http_client(),
			Arc::new(ReqwestTransportErrorMapper),
		)
		.expect("Failed to build OAuth 2.0 engine for tests.")
	}

	/// Constructs a [`RequestTokenEngine`] backed by the test reqwest transport.
	pub fn build_reqwest_test_oauth1_engine(
		provider: Arc<dyn OAuth1Provider>,
		config: ProviderConfig,
	) -> ReqwestTestOAuth1Engine {
		RequestTokenEngine::with_http_client(
			provider,
			config,
			test_reqwest_http_client(),
			Arc::new(ReqwestTransportErrorMapper),
		)
		.expect("Failed to build OAuth 1.0a engine for tests.")
	}
}

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use parking_lot::Mutex;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use oauth2;
#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _, tokio as _};
