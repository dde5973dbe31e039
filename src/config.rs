//! Client registration settings shared by both engines.
//!
//! [`ProviderConfig`] derives [`Deserialize`] so applications can load it from whatever source
//! they already use (TOML, environment adapters, secrets managers); the crate itself never reads
//! configuration files.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Client credentials and redirect settings for one provider registration.
///
/// Engines treat the value as read-only for their whole lifetime.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
	/// OAuth 2.0 client identifier or OAuth 1.0a consumer key.
	pub client_id: String,
	/// OAuth 2.0 client secret or OAuth 1.0a consumer secret.
	pub client_secret: TokenSecret,
	/// Redirect URI (OAuth 1.0a callback URI) registered with the provider.
	pub redirect_uri: String,
	/// Space- or provider-delimited scope string; empty means "provider default".
	#[serde(default)]
	pub scope: String,
}
impl ProviderConfig {
	/// Creates a configuration without scopes.
	pub fn new(
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
		redirect_uri: impl Into<String>,
	) -> Self {
		Self {
			client_id: client_id.into(),
			client_secret: TokenSecret::new(client_secret),
			redirect_uri: redirect_uri.into(),
			scope: String::new(),
		}
	}

	/// Sets the scope string sent with authorization requests.
	pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
		self.scope = scope.into();

		self
	}

	/// Returns the scope when one is configured.
	pub fn scope(&self) -> Option<&str> {
		let scope = self.scope.trim();

		if scope.is_empty() { None } else { Some(scope) }
	}
}
impl Debug for ProviderConfig {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ProviderConfig")
			.field("client_id", &self.client_id)
			.field("client_secret", &self.client_secret)
			.field("redirect_uri", &self.redirect_uri)
			.field("scope", &self.scope)
			.finish()
	}
}
