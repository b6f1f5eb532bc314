//! Issuing and checking the tokens that carry a user's identity between requests.
//!
//! Tokens are stateless: nothing is stored server-side, so a token stays usable until it expires
//! even if the cookie holding it is deleted.

use std::sync::Arc;

use headers::HeaderMapExt as _;
use http::HeaderMap;

use super::crypt::{EncryptError, Key};
use super::{Claims, Purpose, Verification, COOKIE_NAME};
use crate::database::models::UserId;
use crate::timestamp::Clock;

pub struct SessionService {
	key: Key,
	clock: Arc<dyn Clock>,
}

impl SessionService {
	pub fn new(key: Key, clock: Arc<dyn Clock>) -> Self {
		Self { key, clock }
	}

	fn issue(&self, user_id: UserId, purpose: Purpose) -> Result<String, EncryptError> {
		let claims = Claims::new(user_id, purpose, self.clock.now());
		let token = claims.seal(&self.key)?;
		tracing::debug!(user_id, token_id = %claims.token_id, %purpose, "issued token");
		Ok(token)
	}

	/// The caller must already know that `user_id` exists.
	pub fn create_session_token(&self, user_id: UserId) -> Result<String, EncryptError> {
		self.issue(user_id, Purpose::Session)
	}

	pub fn generate_reset_token(&self, user_id: UserId) -> Result<String, EncryptError> {
		self.issue(user_id, Purpose::Reset)
	}

	/// Opens the token without judging it.
	pub fn claims(&self, token: &str) -> Option<Claims> {
		match Claims::open(token, &self.key) {
			Ok(claims) => Some(claims),
			Err(error) => {
				tracing::debug!(%error, "could not open token");
				None
			}
		}
	}

	pub fn inspect(&self, token: &str, expected: Purpose) -> Verification {
		let claims = match self.claims(token) {
			Some(claims) => claims,
			None => return Verification::Invalid,
		};
		if claims.purpose != expected {
			Verification::WrongPurpose
		} else if claims.is_expired_at(self.clock.now()) {
			Verification::Expired
		} else {
			Verification::Valid(claims.user_id)
		}
	}

	fn verify(&self, token: &str, expected: Purpose) -> Option<UserId> {
		let verification = self.inspect(token, expected);
		if !matches!(verification, Verification::Valid(_)) {
			tracing::debug!(?verification, %expected, "rejected token");
		}
		verification.user_id()
	}

	pub fn verify_session_token(&self, token: &str) -> Option<UserId> {
		self.verify(token, Purpose::Session)
	}

	pub fn verify_reset_token(&self, token: &str) -> Option<UserId> {
		self.verify(token, Purpose::Reset)
	}

	/// The user whose session token is in the request's cookies, if any.
	pub fn authenticated_user(&self, headers: &HeaderMap) -> Option<UserId> {
		let cookies = headers.typed_get::<headers::Cookie>()?;
		let token = cookies.get(COOKIE_NAME)?;
		self.verify_session_token(token)
	}

	/// Entry point for protected operations. Currently the same as `authenticated_user`.
	pub fn require_auth(&self, headers: &HeaderMap) -> Option<UserId> {
		self.authenticated_user(headers)
	}
}
