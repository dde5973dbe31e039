//! Token secrets, OAuth 2.0 token state, OAuth 1.0a credentials, and response parsing.

pub mod credentials;
pub mod response;
pub mod secret;
pub mod state;
