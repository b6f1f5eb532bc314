use axum::response::{IntoResponseParts, ResponseParts};
use cookie::{Cookie, SameSite};
use http::header::SET_COOKIE;

use crate::token::{Purpose, COOKIE_NAME};

/// Simple wrapper around `cookie::Cookie` that implements `axum::response::IntoResponseParts`
pub struct Part<'a>(pub Cookie<'a>);

impl IntoResponseParts for Part<'_> {
	type Error = std::convert::Infallible;

	fn into_response_parts(self, mut res: ResponseParts) -> Result<ResponseParts, Self::Error> {
		res.headers_mut().append(SET_COOKIE, self.encode());
		Ok(res)
	}
}

impl Part<'_> {
	pub fn encode(&self) -> http::HeaderValue {
		self.0.to_string().parse().unwrap() // we assert that an encoded value should always be a valid header value
	}
}

impl Part<'static> {
	/// The cookie that carries a freshly issued session token.
	pub fn session(token: String, secure: bool) -> Self {
		Self(
			Cookie::build(COOKIE_NAME, token)
				.http_only(true)
				.path("/")
				.secure(secure)
				.same_site(SameSite::Strict)
				.max_age(Purpose::Session.ttl())
				.finish(),
		)
	}

	/// Tells the browser to forget its session token.
	pub fn session_removal() -> Self {
		let mut cookie = Cookie::named(COOKIE_NAME);
		cookie.set_path("/");
		cookie.make_removal();
		Self(cookie)
	}
}
