//! Interactive Facebook login walkthrough.
//!
//! The demo prints the login URL, waits for the user to paste the full callback URL Facebook
//! redirected to, exchanges the code, and prints the normalized profile.

// std
use std::{
	io::{self, Write},
	sync::Arc,
};
// crates.io
use color_eyre::Result;
use url::Url;
// self
use oauth_handshake::{
	config::ProviderConfig,
	flows::{CallbackParameters, ReqwestAuthorizationCodeEngine},
	provider::catalog::Facebook,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let client_id = prompt_with_default("Enter your Facebook app ID", Some("demo-app"))?;
	let client_secret = prompt_with_default("Enter your Facebook app secret", Some("demo-secret"))?;
	let redirect_uri = prompt_with_default(
		"Enter the redirect URI registered with Facebook",
		Some("https://app.example.com/facebook/callback"),
	)?;
	let config = ProviderConfig::new(client_id, client_secret, redirect_uri).with_scope("email");
	let mut engine = ReqwestAuthorizationCodeEngine::new(Arc::new(Facebook::new()), config)?;

	println!("Login URL: {}", engine.login_uri(Some("demo-state")));
	println!("After Facebook redirects back, paste the full callback URL here.");

	let Some(callback) = prompt_optional("Callback URL (leave blank to stop here)")? else {
		println!("Callback not provided; skipping the code exchange.");

		return Ok(());
	};
	let parameters = CallbackParameters::from_url(&Url::parse(&callback)?);
	let info = engine.exchange_code(&parameters).await?;

	println!("Returned state: {:?}", engine.state());
	println!("Signed in as {:?} {:?} ({:?}).", info.first_name, info.last_name, info.email);
	println!("Avatar: {:?}", info.avatar.normal);

	if let Some(expires_at) = engine.token_state().and_then(|state| state.expires_at) {
		println!("Access token expires at {expires_at}.");
	}

	Ok(())
}

fn prompt_with_default(message: &str, default: Option<&str>) -> Result<String> {
	loop {
		if let Some(value) = default {
			print!("{message} [{value}]: ");
		} else {
			print!("{message}: ");
		}

		io::stdout().flush()?;

		let mut input = String::new();

		io::stdin().read_line(&mut input)?;

		let trimmed = input.trim();

		if trimmed.is_empty() {
			if let Some(value) = default {
				return Ok(value.to_owned());
			}
		} else {
			return Ok(trimmed.to_owned());
		}
	}
}

fn prompt_optional(message: &str) -> Result<Option<String>> {
	print!("{message}: ");

	io::stdout().flush()?;

	let mut input = String::new();

	io::stdin().read_line(&mut input)?;

	let trimmed = input.trim();

	if trimmed.is_empty() { Ok(None) } else { Ok(Some(trimmed.to_owned())) }
}
