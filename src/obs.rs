//! Optional observability helpers for engine flows.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `oauth_handshake.flow` with the `stage` and
//!   `call_site` fields.
//! - Enable `metrics` to increment the `oauth_handshake_stage_total` counter for every
//!   attempt/success/failure, labeled by `stage` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Handshake stages observed by the engines.
///
/// Errors carry the stage so callers can tell whether to restart the authorization flow.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowStage {
	/// OAuth 1.0a temporary credential request.
	RequestToken,
	/// OAuth 2.0 authorization code exchange.
	CodeExchange,
	/// OAuth 2.0 refresh token exchange.
	Refresh,
	/// OAuth 1.0a verifier exchange.
	VerifierExchange,
	/// Authenticated user profile fetch.
	ProfileFetch,
}
impl FlowStage {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowStage::RequestToken => "request_token",
			FlowStage::CodeExchange => "code_exchange",
			FlowStage::Refresh => "refresh",
			FlowStage::VerifierExchange => "verifier_exchange",
			FlowStage::ProfileFetch => "profile_fetch",
		}
	}
}
impl Display for FlowStage {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// Entry to an engine operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl FlowOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowOutcome::Attempt => "attempt",
			FlowOutcome::Success => "success",
			FlowOutcome::Failure => "failure",
		}
	}

	/// Maps a result into its terminal outcome label.
	pub fn of<T>(result: &Result<T>) -> Self {
		if result.is_ok() { FlowOutcome::Success } else { FlowOutcome::Failure }
	}
}
impl Display for FlowOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
