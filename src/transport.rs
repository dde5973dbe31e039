//! Request execution and transport error classification.
//!
//! Engines render a [`ProviderRequest`], hand it to the configured [`ProviderHttpClient`], and
//! turn whatever comes back into either a [`ProviderResponse`] or a stage-tagged [`Error`].

// crates.io
use oauth2::{AsyncHttpClient, HttpClientError, HttpResponse, http::HeaderMap};
// self
use crate::{
	_prelude::*,
	error::{ConfigError, TransportError},
	http::{ProviderHttpClient, ProviderRequest, ResponseMetadata, ResponseMetadataSlot},
	obs::FlowStage,
};

/// Maximum number of characters kept from an error body.
pub const BODY_PREVIEW_LIMIT: usize = 256;

/// Maps HTTP transport failures into engine [`Error`] values.
pub trait TransportErrorMapper<E>
where
	Self: 'static + Send + Sync,
	E: 'static + Send + Sync + StdError,
{
	/// Converts an [`HttpClientError`] emitted by the transport into an engine error.
	fn map_transport_error(
		&self,
		stage: FlowStage,
		metadata: Option<&ResponseMetadata>,
		error: HttpClientError<E>,
	) -> Error;
}

/// Default mapper for reqwest-backed transports.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransportErrorMapper;
#[cfg(feature = "reqwest")]
impl TransportErrorMapper<ReqwestError> for ReqwestTransportErrorMapper {
	fn map_transport_error(
		&self,
		stage: FlowStage,
		meta: Option<&ResponseMetadata>,
		err: HttpClientError<ReqwestError>,
	) -> Error {
		match err {
			HttpClientError::Reqwest(inner) => map_reqwest_error(stage, *inner),
			HttpClientError::Http(inner) => ConfigError::from(inner).into(),
			HttpClientError::Io(inner) => TransportError::Io { stage, source: inner }.into(),
			HttpClientError::Other(message) => map_generic_transport_error(stage, meta, message),
			_ => map_generic_transport_error(stage, meta, "unknown transport failure"),
		}
	}
}

/// Provider answer as seen by hooks and parsers.
#[derive(Clone, Debug)]
pub struct ProviderResponse {
	/// HTTP status code.
	pub status: u16,
	/// Response headers.
	pub headers: HeaderMap,
	/// Body decoded as UTF-8 (lossily).
	pub content: String,
}
impl ProviderResponse {
	/// Wraps a raw HTTP response.
	pub fn from_http_response(response: HttpResponse) -> Self {
		let status = response.status().as_u16();
		let (parts, body) = response.into_parts();

		let content = String::from_utf8_lossy(&body).into_owned();

		Self { status, headers: parts.headers, content }
	}

	/// Returns `true` for 2xx and 3xx statuses.
	pub fn is_accepted(&self) -> bool {
		(200..400).contains(&self.status)
	}

	/// Rejects statuses outside 2xx/3xx with [`TransportError::Status`].
	pub fn verify(self, stage: FlowStage, metadata: Option<&ResponseMetadata>) -> Result<Self> {
		if self.is_accepted() {
			return Ok(self);
		}

		Err(TransportError::Status {
			stage,
			status: self.status,
			retry_after: metadata.and_then(|meta| meta.retry_after),
			body_preview: truncate_preview(&self.content),
		}
		.into())
	}
}

/// Renders `request`, sends it, and verifies the status.
pub(crate) async fn execute<C, M>(
	http_client: &C,
	mapper: &M,
	stage: FlowStage,
	request: ProviderRequest,
) -> Result<ProviderResponse>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	let http_request = request.into_http_request()?;
	let meta = ResponseMetadataSlot::default();
	let handle = http_client.with_metadata(meta.clone());
	let response = handle.call(http_request).await.map_err(|err| {
		let captured = meta.take();

		mapper.map_transport_error(stage, captured.as_ref(), err)
	})?;
	let captured = meta.take();

	ProviderResponse::from_http_response(response).verify(stage, captured.as_ref())
}

#[cfg(feature = "reqwest")]
fn map_reqwest_error(stage: FlowStage, err: ReqwestError) -> Error {
	if err.is_builder() {
		return ConfigError::from(err).into();
	}
	if err.is_timeout() {
		return TransportError::Timeout { stage }.into();
	}

	TransportError::network(stage, err).into()
}

fn map_generic_transport_error(
	stage: FlowStage,
	meta: Option<&ResponseMetadata>,
	message: impl Display,
) -> Error {
	TransportError::Other {
		stage,
		message: message.to_string(),
		status: meta.and_then(|value| value.status),
	}
	.into()
}

fn truncate_preview(body: &str) -> String {
	if body.chars().count() <= BODY_PREVIEW_LIMIT {
		return body.to_owned();
	}

	let mut buf = body.chars().take(BODY_PREVIEW_LIMIT).collect::<String>();

	buf.push('…');

	buf
}
