//! Engine-level error types shared across flows, providers, and transports.

// self
use crate::{_prelude::*, obs::FlowStage, provider::EndpointError};

/// Engine-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical engine error exposed by public APIs.
///
/// Every variant is terminal to the current call; nothing is retried internally.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS, or an unacceptable HTTP status).
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// Provider reported an `error` in the authorization callback.
	#[error("Provider reported an authorization error: {error}.")]
	Provider {
		/// Provider-supplied `error` value.
		error: String,
		/// Provider-supplied `error_description`, when present.
		description: Option<String>,
	},
	/// A required field is absent from a provider response or callback.
	#[error("Provider response during {stage} is missing `{field}`.")]
	UnexpectedResponse {
		/// Stage that observed the missing field.
		stage: FlowStage,
		/// Name of the missing field.
		field: String,
	},
	/// Provider content could not be decoded into the expected shape.
	#[error("Provider response during {stage} could not be parsed.")]
	MalformedResponse {
		/// Stage that received the malformed content.
		stage: FlowStage,
		/// Structured parsing failure including the offending JSON path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// The concrete flow cannot provide the requested feature.
	#[error("The {feature} feature is not supported by this flow.")]
	NotSupported {
		/// Label of the unsupported feature.
		feature: &'static str,
	},
}
impl Error {
	/// Convenience constructor for [`Error::UnexpectedResponse`].
	pub fn unexpected_response(stage: FlowStage, field: impl Into<String>) -> Self {
		Self::UnexpectedResponse { stage, field: field.into() }
	}

	/// Returns the flow stage that failed, when the failure is tied to one.
	pub fn stage(&self) -> Option<FlowStage> {
		match self {
			Self::Transport(err) => Some(err.stage()),
			Self::UnexpectedResponse { stage, .. } | Self::MalformedResponse { stage, .. } =>
				Some(*stage),
			Self::Config(_) | Self::Provider { .. } | Self::NotSupported { .. } => None,
		}
	}
}

/// Configuration and validation failures raised by the engines.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// A header value contains characters HTTP does not allow.
	#[error("Header value is invalid.")]
	InvalidHeader(#[from] oauth2::http::header::InvalidHeaderValue),
	/// Provider endpoint table is incomplete or malformed.
	#[error(transparent)]
	Endpoint(#[from] EndpointError),
	/// A refresh was required but no refresh token is known.
	#[error("Token never fetched and no refresh token is available.")]
	MissingRefreshToken,
	/// A token-using operation ran before any successful exchange.
	#[error("No access token is available; complete a token exchange first.")]
	MissingAccessToken,
	/// The signing key was rejected by the MAC implementation.
	#[error("Request signing key is invalid.")]
	SigningKey,
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO, HTTP status), tagged with the failing stage.
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred during {stage}.")]
	Network {
		/// Stage that issued the request.
		stage: FlowStage,
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// The request did not complete in time.
	#[error("Request timed out during {stage}.")]
	Timeout {
		/// Stage that issued the request.
		stage: FlowStage,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred during {stage}.")]
	Io {
		/// Stage that issued the request.
		stage: FlowStage,
		/// IO failure.
		#[source]
		source: std::io::Error,
	},
	/// Provider answered with a status outside the accepted 2xx/3xx range.
	#[error("Provider returned HTTP {status} during {stage}.")]
	Status {
		/// Stage that issued the request.
		stage: FlowStage,
		/// HTTP status code.
		status: u16,
		/// Retry-After hint from upstream, if supplied.
		retry_after: Option<Duration>,
		/// Truncated response body.
		body_preview: String,
	},
	/// Transport reported a failure without a structured cause.
	#[error("HTTP client error occurred during {stage}: {message}.")]
	Other {
		/// Stage that issued the request.
		stage: FlowStage,
		/// Transport-supplied message.
		message: String,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(stage: FlowStage, src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { stage, source: Box::new(src) }
	}

	/// Returns the stage that issued the failing request.
	pub fn stage(&self) -> FlowStage {
		match self {
			Self::Network { stage, .. }
			| Self::Timeout { stage }
			| Self::Io { stage, .. }
			| Self::Status { stage, .. }
			| Self::Other { stage, .. } => *stage,
		}
	}
}
