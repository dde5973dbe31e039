//! OAuth 1.0a request signing (RFC 5849).
//!
//! [`OAuth1Authenticator`] computes the signature over the request method, the normalized URL,
//! and every query, form, and protocol parameter, then sends the protocol parameters in an
//! `Authorization: OAuth ...` header.

// crates.io
use base64::{Engine, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac};
use oauth2::http::header::AUTHORIZATION;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use rand::{Rng, distr::Alphanumeric};
use sha1::Sha1;
use sha2::Sha256;
// self
use crate::{
	_prelude::*,
	auth::{TokenCredentials, TokenSecret},
	config::ProviderConfig,
	error::ConfigError,
	http::{Authenticator, ProviderRequest},
};

/// RFC 3986 unreserved characters stay as-is; everything else is percent-encoded.
const OAUTH_ENCODE_SET: &AsciiSet =
	&NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');
const NONCE_LEN: usize = 32;

/// Signature algorithm advertised in `oauth_signature_method`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignatureMethod {
	/// `HMAC-SHA1`, the method every OAuth 1.0a provider accepts.
	#[default]
	#[serde(rename = "HMAC-SHA1")]
	HmacSha1,
	/// `HMAC-SHA256`.
	#[serde(rename = "HMAC-SHA256")]
	HmacSha256,
	/// `PLAINTEXT`; only safe over TLS.
	#[serde(rename = "PLAINTEXT")]
	Plaintext,
}
impl SignatureMethod {
	/// Returns the protocol label.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::HmacSha1 => "HMAC-SHA1",
			Self::HmacSha256 => "HMAC-SHA256",
			Self::Plaintext => "PLAINTEXT",
		}
	}
}
impl Display for SignatureMethod {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Signs requests with consumer credentials and an optional token.
#[derive(Clone, Debug)]
pub struct OAuth1Authenticator {
	consumer_key: String,
	consumer_secret: TokenSecret,
	token: Option<TokenSecret>,
	token_secret: TokenSecret,
	callback: Option<String>,
	verifier: Option<String>,
	realm: Option<String>,
	signature_method: SignatureMethod,
	nonce: Option<String>,
	timestamp: Option<i64>,
}
impl OAuth1Authenticator {
	/// Creates a signer that uses consumer credentials only.
	pub fn new(consumer_key: impl Into<String>, consumer_secret: impl Into<TokenSecret>) -> Self {
		Self {
			consumer_key: consumer_key.into(),
			consumer_secret: consumer_secret.into(),
			token: None,
			token_secret: TokenSecret::default(),
			callback: None,
			verifier: None,
			realm: None,
			signature_method: SignatureMethod::default(),
			nonce: None,
			timestamp: None,
		}
	}

	/// Signer for the temporary-credential request: client credentials plus `oauth_callback`.
	pub fn for_request_token(config: &ProviderConfig) -> Self {
		Self::new(config.client_id.clone(), config.client_secret.clone())
			.with_callback(config.redirect_uri.clone())
	}

	/// Signer for the verifier exchange: request token, its secret, and `oauth_verifier`.
	pub fn for_access_token(
		config: &ProviderConfig,
		request_token: &TokenCredentials,
		verifier: impl Into<String>,
	) -> Self {
		Self::new(config.client_id.clone(), config.client_secret.clone())
			.with_token(request_token.token.clone(), request_token.secret.clone())
			.with_verifier(verifier)
	}

	/// Signer for protected resources: access token and its secret.
	pub fn for_protected_resource(config: &ProviderConfig, access: &TokenCredentials) -> Self {
		Self::new(config.client_id.clone(), config.client_secret.clone())
			.with_token(access.token.clone(), access.secret.clone())
	}

	/// Sets the token and token secret.
	pub fn with_token(
		mut self,
		token: impl Into<TokenSecret>,
		secret: impl Into<TokenSecret>,
	) -> Self {
		self.token = Some(token.into());
		self.token_secret = secret.into();

		self
	}

	/// Sets `oauth_callback`.
	pub fn with_callback(mut self, callback: impl Into<String>) -> Self {
		self.callback = Some(callback.into());

		self
	}

	/// Sets `oauth_verifier`.
	pub fn with_verifier(mut self, verifier: impl Into<String>) -> Self {
		self.verifier = Some(verifier.into());

		self
	}

	/// Adds a `realm` to the header; it never takes part in the signature.
	pub fn with_realm(mut self, realm: impl Into<String>) -> Self {
		self.realm = Some(realm.into());

		self
	}

	/// Selects the signature algorithm.
	pub fn with_signature_method(mut self, method: SignatureMethod) -> Self {
		self.signature_method = method;

		self
	}

	/// Pins `oauth_nonce` instead of generating one per request.
	pub fn with_nonce(mut self, nonce: impl Into<String>) -> Self {
		self.nonce = Some(nonce.into());

		self
	}

	/// Pins `oauth_timestamp` instead of reading the clock.
	pub fn with_timestamp(mut self, timestamp: i64) -> Self {
		self.timestamp = Some(timestamp);

		self
	}

	/// Signature algorithm in use.
	pub fn signature_method(&self) -> SignatureMethod {
		self.signature_method
	}

	/// Returns the signature base string for `request` as it would be signed right now.
	///
	/// Only deterministic when both the nonce and the timestamp are pinned.
	pub fn signature_base_string(&self, request: &ProviderRequest) -> String {
		base_string(request, &self.protocol_parameters())
	}

	fn protocol_parameters(&self) -> Vec<(String, String)> {
		let nonce = self.nonce.clone().unwrap_or_else(|| {
			rand::rng().sample_iter(Alphanumeric).take(NONCE_LEN).map(char::from).collect()
		});
		let timestamp =
			self.timestamp.unwrap_or_else(|| OffsetDateTime::now_utc().unix_timestamp());
		let mut params = vec![
			("oauth_consumer_key".to_owned(), self.consumer_key.clone()),
			("oauth_nonce".to_owned(), nonce),
			("oauth_signature_method".to_owned(), self.signature_method.as_str().to_owned()),
			("oauth_timestamp".to_owned(), timestamp.to_string()),
			("oauth_version".to_owned(), "1.0".to_owned()),
		];

		if let Some(token) = &self.token {
			params.push(("oauth_token".to_owned(), token.expose().to_owned()));
		}
		if let Some(callback) = &self.callback {
			params.push(("oauth_callback".to_owned(), callback.clone()));
		}
		if let Some(verifier) = &self.verifier {
			params.push(("oauth_verifier".to_owned(), verifier.clone()));
		}

		params
	}

	fn signing_key(&self) -> String {
		format!("{}&{}", encode(self.consumer_secret.expose()), encode(self.token_secret.expose()))
	}

	fn sign(&self, base_string: &str) -> Result<String> {
		let key = self.signing_key();

		match self.signature_method {
			SignatureMethod::HmacSha1 => hmac_base64::<Hmac<Sha1>>(&key, base_string),
			SignatureMethod::HmacSha256 => hmac_base64::<Hmac<Sha256>>(&key, base_string),
			SignatureMethod::Plaintext => Ok(key),
		}
	}
}
impl Authenticator for OAuth1Authenticator {
	fn authenticate(&self, request: &mut ProviderRequest) -> Result<()> {
		let mut params = self.protocol_parameters();
		let signature = self.sign(&base_string(request, &params))?;

		params.push(("oauth_signature".to_owned(), signature));

		let mut fields = Vec::with_capacity(params.len() + 1);

		if let Some(realm) = &self.realm {
			fields.push(format!("realm=\"{}\"", encode(realm)));
		}

		fields.extend(params.iter().map(|(k, v)| format!("{}=\"{}\"", encode(k), encode(v))));
		request.insert_header(AUTHORIZATION, &format!("OAuth {}", fields.join(", ")))?;

		Ok(())
	}
}

fn encode(value: &str) -> String {
	utf8_percent_encode(value, OAUTH_ENCODE_SET).to_string()
}

fn base_string(request: &ProviderRequest, protocol: &[(String, String)]) -> String {
	let url = request.url();
	let mut normalized = format!("{}://{}", url.scheme(), url.host_str().unwrap_or_default());

	if let Some(port) = url.port() {
		normalized.push_str(&format!(":{port}"));
	}

	normalized.push_str(url.path());

	let mut params = url
		.query_pairs()
		.map(|(k, v)| (encode(&k), encode(&v)))
		.chain(
			request
				.query_parameters()
				.iter()
				.chain(request.form_parameters())
				.chain(protocol)
				.map(|(k, v)| (encode(k), encode(v))),
		)
		.collect::<Vec<_>>();

	params.sort();

	let params = params.into_iter().map(|(k, v)| format!("{k}={v}")).collect::<Vec<_>>().join("&");

	format!("{}&{}&{}", request.method().as_str(), encode(&normalized), encode(&params))
}

fn hmac_base64<M>(key: &str, message: &str) -> Result<String>
where
	M: Mac + hmac::digest::KeyInit,
{
	let mut mac = <M as hmac::digest::KeyInit>::new_from_slice(key.as_bytes())
		.map_err(|_| ConfigError::SigningKey)?;

	mac.update(message.as_bytes());

	Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

#[cfg(test)]
mod tests {
	// crates.io
	use oauth2::http::Method;
	// self
	use super::*;

	fn request() -> ProviderRequest {
		let mut request = ProviderRequest::new(
			Method::POST,
			Url::parse("https://API.example.com:443/1/statuses/update.json?include_entities=true")
				.expect("Fixture URL should parse."),
		);

		request.add_form_parameter("status", "Hello Ladies + Gentlemen!");

		request
	}

	fn authenticator() -> OAuth1Authenticator {
		OAuth1Authenticator::new("ck", "cs")
			.with_token("tk", "ts")
			.with_nonce("n0nce")
			.with_timestamp(1_318_622_958)
	}

	fn header(request: &ProviderRequest) -> String {
		request.headers()[AUTHORIZATION]
			.to_str()
			.expect("Authorization header should be ASCII.")
			.to_owned()
	}

	fn header_field(header: &str, key: &str) -> String {
		let prefix = format!("{key}=\"");
		let start = header.find(&prefix).expect("Header field should exist.") + prefix.len();
		let end = header[start..].find('"').expect("Header field should be quoted.") + start;
		let raw = &header[start..end];

		percent_encoding::percent_decode_str(raw)
			.decode_utf8()
			.expect("Header field should be UTF-8.")
			.into_owned()
	}

	#[test]
	fn base_string_normalizes_url_and_sorts_parameters() {
		let base = authenticator().signature_base_string(&request());

		assert_eq!(
			base,
			"POST&https%3A%2F%2Fapi.example.com%2F1%2Fstatuses%2Fupdate.json&\
			 include_entities%3Dtrue%26oauth_consumer_key%3Dck%26oauth_nonce%3Dn0nce%26\
			 oauth_signature_method%3DHMAC-SHA1%26oauth_timestamp%3D1318622958%26\
			 oauth_token%3Dtk%26oauth_version%3D1.0%26\
			 status%3DHello%2520Ladies%2520%252B%2520Gentlemen%2521"
		);
	}

	#[test]
	fn non_default_ports_are_kept() {
		let request = ProviderRequest::new(
			Method::GET,
			Url::parse("http://localhost:8080/profile").expect("Fixture URL should parse."),
		);
		let base = authenticator().signature_base_string(&request);

		assert!(base.starts_with("GET&http%3A%2F%2Flocalhost%3A8080%2Fprofile&"));
	}

	#[test]
	fn hmac_sha1_signature_matches_recomputed_mac() {
		let authenticator = authenticator();
		let mut request = request();
		let base = authenticator.signature_base_string(&request);

		authenticator.authenticate(&mut request).expect("Signing should succeed.");

		let header = header(&request);
		let mut mac = <Hmac<Sha1> as hmac::digest::KeyInit>::new_from_slice(b"cs&ts")
			.expect("HMAC accepts any key length.");

		mac.update(base.as_bytes());

		assert!(header.starts_with("OAuth "));
		assert_eq!(
			header_field(&header, "oauth_signature"),
			STANDARD.encode(mac.finalize().into_bytes())
		);
		assert_eq!(header_field(&header, "oauth_token"), "tk");
		assert_eq!(header_field(&header, "oauth_version"), "1.0");
	}

	#[test]
	fn plaintext_signature_is_the_encoded_key() {
		let mut request = request();

		OAuth1Authenticator::new("ck", "c&s")
			.with_signature_method(SignatureMethod::Plaintext)
			.with_realm("Photos")
			.authenticate(&mut request)
			.expect("Signing should succeed.");

		let header = header(&request);

		assert!(header.starts_with("OAuth realm=\"Photos\", "));
		assert_eq!(header_field(&header, "oauth_signature"), "c%26s&");
		assert_eq!(header_field(&header, "oauth_signature_method"), "PLAINTEXT");
	}

	#[test]
	fn request_token_signer_carries_the_callback() {
		let config = ProviderConfig::new("ck", "cs", "https://app.example.com/cb");
		let mut request = request();

		OAuth1Authenticator::for_request_token(&config)
			.authenticate(&mut request)
			.expect("Signing should succeed.");

		let header = header(&request);

		assert_eq!(header_field(&header, "oauth_callback"), "https://app.example.com/cb");
		assert!(!header.contains("oauth_token="));
		assert_eq!(header_field(&header, "oauth_nonce").len(), NONCE_LEN);
	}

	#[test]
	fn access_token_signer_uses_request_credentials_and_verifier() {
		let config = ProviderConfig::new("ck", "cs", "https://app.example.com/cb");
		let request_token = TokenCredentials::new("RT", "RS");
		let mut request = request();

		OAuth1Authenticator::for_access_token(&config, &request_token, "V")
			.with_signature_method(SignatureMethod::Plaintext)
			.authenticate(&mut request)
			.expect("Signing should succeed.");

		let header = header(&request);

		assert_eq!(header_field(&header, "oauth_token"), "RT");
		assert_eq!(header_field(&header, "oauth_verifier"), "V");
		assert_eq!(header_field(&header, "oauth_signature"), "cs&RS");
	}
}
