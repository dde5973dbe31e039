//! Endpoint tables resolved once per engine.

// self
use crate::_prelude::*;

/// Errors raised while resolving provider endpoints.
#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum EndpointError {
	/// The flow needs an endpoint the provider does not declare.
	#[error("Missing {endpoint} endpoint.")]
	Missing {
		/// Which endpoint is missing.
		endpoint: EndpointKind,
	},
	/// The endpoint does not form a valid absolute URL.
	#[error("The {endpoint} endpoint is not a valid URL: {url}.")]
	Invalid {
		/// Which endpoint failed validation.
		endpoint: EndpointKind,
		/// Joined URL that failed to parse.
		url: String,
		/// Parser failure.
		#[source]
		source: url::ParseError,
	},
	/// Endpoints must be `http` or `https` URLs with a host.
	#[error("The {endpoint} endpoint must be an http(s) URL with a host: {url}.")]
	UnsupportedScheme {
		/// Which endpoint failed validation.
		endpoint: EndpointKind,
		/// Endpoint URL that failed validation.
		url: String,
	},
}

/// Role an endpoint plays in the handshake.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndpointKind {
	/// Authorization (login) page.
	Authorize,
	/// OAuth 2.0 token or OAuth 1.0a access-token endpoint.
	Token,
	/// OAuth 1.0a temporary-credential endpoint.
	RequestToken,
	/// Profile endpoint of the authenticated user.
	UserInfo,
}
impl EndpointKind {
	/// Returns a stable label.
	pub fn as_str(self) -> &'static str {
		match self {
			EndpointKind::Authorize => "authorize",
			EndpointKind::Token => "token",
			EndpointKind::RequestToken => "request_token",
			EndpointKind::UserInfo => "user_info",
		}
	}
}
impl Display for EndpointKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Base URI plus resource path; the resource path may carry a query string.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
	/// Scheme, host, and optional path prefix.
	pub base_uri: String,
	/// Resource path appended to the base URI.
	pub resource_path: String,
}
impl Endpoint {
	/// Creates an endpoint.
	pub fn new(base_uri: impl Into<String>, resource_path: impl Into<String>) -> Self {
		Self { base_uri: base_uri.into(), resource_path: resource_path.into() }
	}

	/// Joins the base URI and resource path into an absolute URL.
	pub fn url(&self, kind: EndpointKind) -> Result<Url, EndpointError> {
		let base = self.base_uri.trim_end_matches('/');
		let path = self.resource_path.as_str();
		let joined = if path.is_empty() || path.starts_with('/') {
			format!("{base}{path}")
		} else {
			format!("{base}/{path}")
		};
		let url = Url::parse(&joined).map_err(|source| EndpointError::Invalid {
			endpoint: kind,
			url: joined.clone(),
			source,
		})?;

		if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
			return Err(EndpointError::UnsupportedScheme { endpoint: kind, url: url.to_string() });
		}

		Ok(url)
	}
}

/// The four endpoints a provider may declare.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointSet {
	/// Authorization (login) page.
	pub authorize: Option<Endpoint>,
	/// Token endpoint (OAuth 1.0a: access-token endpoint).
	pub token: Option<Endpoint>,
	/// OAuth 1.0a temporary-credential endpoint.
	pub request_token: Option<Endpoint>,
	/// User profile endpoint.
	pub user_info: Option<Endpoint>,
}
impl EndpointSet {
	/// Sets the authorization endpoint.
	pub fn with_authorize(mut self, endpoint: Endpoint) -> Self {
		self.authorize = Some(endpoint);

		self
	}

	/// Sets the token endpoint.
	pub fn with_token(mut self, endpoint: Endpoint) -> Self {
		self.token = Some(endpoint);

		self
	}

	/// Sets the request-token endpoint.
	pub fn with_request_token(mut self, endpoint: Endpoint) -> Self {
		self.request_token = Some(endpoint);

		self
	}

	/// Sets the user-info endpoint.
	pub fn with_user_info(mut self, endpoint: Endpoint) -> Self {
		self.user_info = Some(endpoint);

		self
	}

	/// Returns the endpoint declared for `kind`.
	pub fn get(&self, kind: EndpointKind) -> Option<&Endpoint> {
		match kind {
			EndpointKind::Authorize => self.authorize.as_ref(),
			EndpointKind::Token => self.token.as_ref(),
			EndpointKind::RequestToken => self.request_token.as_ref(),
			EndpointKind::UserInfo => self.user_info.as_ref(),
		}
	}

	/// Resolves `kind` to an absolute URL, failing when it is missing or invalid.
	pub fn require(&self, kind: EndpointKind) -> Result<Url, EndpointError> {
		self.get(kind).ok_or(EndpointError::Missing { endpoint: kind })?.url(kind)
	}
}
