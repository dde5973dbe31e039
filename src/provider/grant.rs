//! OAuth 2.0 grant modes issued by the authorization code engine.

// self
use crate::{_prelude::*, obs::FlowStage};

/// OAuth 2.0 grant used by the token request currently in flight.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantMode {
	/// Authorization Code grant.
	AuthorizationCode,
	/// Refresh Token grant.
	RefreshToken,
}
impl GrantMode {
	/// Returns the RFC 6749 identifier for the grant type.
	pub fn as_str(self) -> &'static str {
		match self {
			GrantMode::AuthorizationCode => "authorization_code",
			GrantMode::RefreshToken => "refresh_token",
		}
	}

	/// Stage reported when the token request for this grant fails.
	pub fn stage(self) -> FlowStage {
		match self {
			GrantMode::AuthorizationCode => FlowStage::CodeExchange,
			GrantMode::RefreshToken => FlowStage::Refresh,
		}
	}
}
impl Display for GrantMode {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
