use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};
use time::Duration;

use crate::database::models::UserId;
use crate::timestamp::Timestamp;

pub mod crypt;
pub mod service;
pub use crypt::Key;
pub use service::SessionService;

pub static COOKIE_NAME: &str = "session_token";

const SESSION_EXPIRATION_TIME: Duration = Duration::days(7);
const RESET_EXPIRATION_TIME: Duration = Duration::hours(1);

/// What a token may be used for. A token is only accepted where its purpose matches.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Purpose {
	Session,
	Reset,
}

impl Purpose {
	pub const fn ttl(self) -> Duration {
		match self {
			Self::Session => SESSION_EXPIRATION_TIME,
			Self::Reset => RESET_EXPIRATION_TIME,
		}
	}
}

impl Display for Purpose {
	fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
		formatter.write_str(match self {
			Self::Session => "session",
			Self::Reset => "reset",
		})
	}
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Claims {
	pub user_id: UserId,
	/// Unique per issued token, for eventual revocation lists.
	pub token_id: String,
	#[serde(with = "time::serde::timestamp")]
	pub issued_at: Timestamp,
	#[serde(with = "time::serde::timestamp")]
	pub expires_at: Timestamp,
	pub purpose: Purpose,
}

const TOKEN_ID_BYTES: usize = 16;

fn generate_token_id() -> String {
	use rand::RngCore as _;

	let mut raw = [0u8; TOKEN_ID_BYTES];
	rand::thread_rng().fill_bytes(&mut raw);
	base64::encode_config(raw, base64::URL_SAFE_NO_PAD)
}

impl Claims {
	pub fn new(user_id: UserId, purpose: Purpose, now: Timestamp) -> Self {
		// the wire format only keeps whole seconds
		let issued_at = now - Duration::nanoseconds(now.nanosecond().into());
		Self {
			user_id,
			token_id: generate_token_id(),
			issued_at,
			expires_at: issued_at + purpose.ttl(),
			purpose,
		}
	}

	pub fn is_expired_at(&self, now: Timestamp) -> bool {
		now >= self.expires_at
	}
}

/// Everything verification can conclude about a presented token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
	Valid(UserId),
	Expired,
	/// Undecodable, tampered with, or sealed under another key.
	Invalid,
	WrongPurpose,
}

impl Verification {
	pub fn user_id(self) -> Option<UserId> {
		match self {
			Self::Valid(user_id) => Some(user_id),
			Self::Expired | Self::Invalid | Self::WrongPurpose => None,
		}
	}
}
