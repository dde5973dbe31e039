//! Provider-facing endpoint tables (data) and hook traits (behavior).
//!
//! `endpoint` describes where each handshake step lives, `hooks` bundles the arguments handed to
//! provider customization points, `strategy` defines the [`Provider`], [`OAuth2Provider`], and
//! [`OAuth1Provider`] traits, and `catalog` ships a few concrete providers built on them.

pub mod catalog;
pub mod endpoint;
pub mod grant;
pub mod hooks;
pub mod strategy;

pub use endpoint::*;
pub use grant::*;
pub use hooks::*;
pub use strategy::*;
