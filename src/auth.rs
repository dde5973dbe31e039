//! Auth-domain token models, token response parsing, and normalized user profiles.

pub mod token;
pub mod user;

pub use token::{credentials::*, response::*, secret::*, state::*};
pub use user::*;
