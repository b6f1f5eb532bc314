use std::borrow::Cow;

use axum::response::{IntoResponse, Response};
use http::StatusCode;

#[derive(Debug, thiserror::Error)]
#[error("SQL error: {0}")]
pub struct Sqlx(#[source] pub sqlx::Error);

#[derive(Debug, thiserror::Error)]
#[error("password hash error")]
pub struct PasswordHash;

#[derive(Debug, thiserror::Error)]
#[error("error while issuing token: {0}")]
pub struct Encrypt(#[source] pub crate::token::crypt::EncryptError);

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct BadRequest(pub Cow<'static, str>);

#[derive(Debug, thiserror::Error)]
#[error("unknown user or wrong password")]
pub struct InvalidCredentials;

#[derive(Debug, thiserror::Error)]
#[error("page not found")]
pub struct NotFound;

pub fn error_response(error: &dyn std::error::Error, status_code: StatusCode) -> Response {
	if status_code.is_server_error() {
		tracing::error!(%error, %status_code, "request failed");
	}
	let body = format!(
		"{} {}: {}",
		status_code.as_u16(),
		status_code.canonical_reason().unwrap_or("Unknown"),
		error,
	);
	(status_code, body).into_response()
}

macro_rules! impl_response {
	($struct_name:ident, $status:ident) => {
		impl axum::response::IntoResponse for $struct_name {
			fn into_response(self) -> axum::response::Response {
				crate::error::error_response(&self, http::StatusCode::$status)
			}
		}
	};
}

impl_response!(Sqlx, INTERNAL_SERVER_ERROR);
impl_response!(PasswordHash, INTERNAL_SERVER_ERROR);
impl_response!(Encrypt, INTERNAL_SERVER_ERROR);
impl_response!(BadRequest, BAD_REQUEST);
impl_response!(InvalidCredentials, UNAUTHORIZED);
impl_response!(NotFound, NOT_FOUND);

pub async fn default_handler() -> NotFound {
	NotFound
}
