//! Transport-agnostic description of an outgoing provider request.

// crates.io
use oauth2::{
	HttpRequest,
	http::{
		HeaderMap, HeaderValue, Method, Request,
		header::{CONTENT_TYPE, HeaderName},
	},
};
// self
use crate::{_prelude::*, error::ConfigError, http::Authenticator};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Mutable request handed to provider hooks before dispatch.
///
/// Hooks add parameters, headers, or swap the [`Authenticator`]; the engine converts the value
/// into an [`HttpRequest`] only after every hook ran, so authenticators (including OAuth 1.0a
/// signers) observe the final parameter set.
#[derive(Clone, Debug)]
pub struct ProviderRequest {
	method: Method,
	url: Url,
	query: Vec<(String, String)>,
	form: Vec<(String, String)>,
	headers: HeaderMap,
	authenticator: Option<Arc<dyn Authenticator>>,
}
impl ProviderRequest {
	/// Creates a request without parameters or authentication.
	pub fn new(method: Method, url: Url) -> Self {
		Self {
			method,
			url,
			query: Vec::new(),
			form: Vec::new(),
			headers: HeaderMap::new(),
			authenticator: None,
		}
	}

	/// HTTP method.
	pub fn method(&self) -> &Method {
		&self.method
	}

	/// Target URL, including any query string baked into the endpoint.
	pub fn url(&self) -> &Url {
		&self.url
	}

	/// Query parameters added on top of the endpoint URL.
	pub fn query_parameters(&self) -> &[(String, String)] {
		&self.query
	}

	/// Form body parameters.
	pub fn form_parameters(&self) -> &[(String, String)] {
		&self.form
	}

	/// Request headers.
	pub fn headers(&self) -> &HeaderMap {
		&self.headers
	}

	/// Currently installed authenticator.
	pub fn authenticator(&self) -> Option<&dyn Authenticator> {
		self.authenticator.as_deref()
	}

	/// Adds a parameter where the method expects it: the query string for `GET`, `HEAD`, and
	/// `DELETE`, the form body otherwise.
	pub fn add_parameter(
		&mut self,
		name: impl Into<String>,
		value: impl Into<String>,
	) -> &mut Self {
		if self.carries_body() {
			self.add_form_parameter(name, value)
		} else {
			self.add_query_parameter(name, value)
		}
	}

	/// Appends a query parameter.
	pub fn add_query_parameter(
		&mut self,
		name: impl Into<String>,
		value: impl Into<String>,
	) -> &mut Self {
		self.query.push((name.into(), value.into()));

		self
	}

	/// Appends a form body parameter.
	pub fn add_form_parameter(
		&mut self,
		name: impl Into<String>,
		value: impl Into<String>,
	) -> &mut Self {
		self.form.push((name.into(), value.into()));

		self
	}

	/// Returns the first value of `name` among query and form parameters.
	pub fn parameter(&self, name: &str) -> Option<&str> {
		self.query
			.iter()
			.chain(self.form.iter())
			.find(|(key, _)| key == name)
			.map(|(_, value)| value.as_str())
	}

	/// Removes every query or form parameter called `name`.
	pub fn remove_parameter(&mut self, name: &str) -> &mut Self {
		self.query.retain(|(key, _)| key != name);
		self.form.retain(|(key, _)| key != name);

		self
	}

	/// Inserts (or replaces) a header.
	pub fn insert_header(&mut self, name: HeaderName, value: &str) -> Result<&mut Self> {
		let value = HeaderValue::from_str(value).map_err(ConfigError::from)?;

		self.headers.insert(name, value);

		Ok(self)
	}

	/// Installs the authentication strategy applied right before dispatch.
	pub fn set_authenticator<A>(&mut self, authenticator: A) -> &mut Self
	where
		A: 'static + Authenticator,
	{
		self.authenticator = Some(Arc::new(authenticator));

		self
	}

	/// Removes the authentication strategy.
	pub fn clear_authenticator(&mut self) -> &mut Self {
		self.authenticator = None;

		self
	}

	/// Applies the authenticator and renders the final HTTP request.
	pub fn into_http_request(mut self) -> Result<HttpRequest> {
		if let Some(authenticator) = self.authenticator.take() {
			authenticator.authenticate(&mut self)?;
		}

		let mut url = self.url;

		if !self.query.is_empty() {
			url.query_pairs_mut().extend_pairs(&self.query);
		}

		let body = if self.form.is_empty() {
			Vec::new()
		} else {
			if !self.headers.contains_key(CONTENT_TYPE) {
				self.headers.insert(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE));
			}

			url::form_urlencoded::Serializer::new(String::new())
				.extend_pairs(&self.form)
				.finish()
				.into_bytes()
		};
		let mut request = Request::builder()
			.method(self.method)
			.uri(url.as_str())
			.body(body)
			.map_err(ConfigError::from)?;

		*request.headers_mut() = self.headers;

		Ok(request)
	}

	fn carries_body(&self) -> bool {
		!matches!(self.method, Method::GET | Method::HEAD | Method::DELETE)
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use oauth2::http::header::AUTHORIZATION;
	// self
	use super::*;

	fn url(value: &str) -> Url {
		Url::parse(value).expect("Fixture URL should parse.")
	}

	#[test]
	fn add_parameter_follows_the_method() {
		let mut get = ProviderRequest::new(Method::GET, url("https://api.example.com/me"));
		let mut post = ProviderRequest::new(Method::POST, url("https://api.example.com/token"));

		get.add_parameter("fields", "id");
		post.add_parameter("code", "abc");

		assert_eq!(get.query_parameters(), &[("fields".to_owned(), "id".to_owned())]);
		assert!(get.form_parameters().is_empty());
		assert_eq!(post.form_parameters(), &[("code".to_owned(), "abc".to_owned())]);
		assert_eq!(post.parameter("code"), Some("abc"));
	}

	#[test]
	fn renders_query_and_form_body() {
		let mut request = ProviderRequest::new(
			Method::POST,
			url("https://api.example.com/token?api-version=1.0"),
		);

		request
			.add_query_parameter("trace", "on")
			.add_form_parameter("grant_type", "authorization_code")
			.add_form_parameter("redirect_uri", "https://app/cb?x=1");
		request
			.insert_header(AUTHORIZATION, "Basic Zm9vOmJhcg==")
			.expect("Static header value should be accepted.");

		let rendered = request.into_http_request().expect("Request should render.");

		assert_eq!(rendered.uri(), "https://api.example.com/token?api-version=1.0&trace=on");
		assert_eq!(rendered.headers()[CONTENT_TYPE], FORM_CONTENT_TYPE);
		assert_eq!(rendered.headers()[AUTHORIZATION], "Basic Zm9vOmJhcg==");
		assert_eq!(
			String::from_utf8(rendered.body().clone()).expect("Form body should be UTF-8."),
			"grant_type=authorization_code&redirect_uri=https%3A%2F%2Fapp%2Fcb%3Fx%3D1"
		);
	}

	#[test]
	fn remove_parameter_clears_every_occurrence() {
		let mut request = ProviderRequest::new(Method::GET, url("https://api.example.com/me"));

		request
			.add_query_parameter("oauth_token", "a")
			.add_form_parameter("oauth_token", "b")
			.add_query_parameter("keep", "1");
		request.remove_parameter("oauth_token");

		assert_eq!(request.parameter("oauth_token"), None);
		assert_eq!(request.parameter("keep"), Some("1"));
	}

	#[test]
	fn invalid_header_values_are_config_errors() {
		let mut request = ProviderRequest::new(Method::GET, url("https://api.example.com/me"));
		let err = request
			.insert_header(AUTHORIZATION, "line\nbreak")
			.expect_err("Newlines are not valid in header values.");

		assert!(matches!(err, Error::Config(ConfigError::InvalidHeader(_))));
	}
}
