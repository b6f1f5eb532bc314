use std::sync::Arc;

use axum::async_trait;
use axum::body::Body;
use axum::extract::{FromRequest, OriginalUri, RequestParts};
use axum::response::{IntoResponse, Response};
use http::header::LOCATION;
use http::StatusCode;

use crate::database::models::{User, UserId};
use crate::database::Database;
use crate::helpers::cookie::Part as CookiePart;
use crate::token::SessionService;

/// A request carrying a valid session token.
pub struct Authenticated(pub UserId);

/// Like `Authenticated`, but lets anonymous requests through.
pub struct MaybeAuthenticated(pub Option<UserId>);

/// A request from a user that still exists.
pub struct Auth(pub User);

fn sessions(req: &RequestParts<Body>) -> Arc<SessionService> {
	Arc::clone(
		req
			.extensions()
			.get::<Arc<SessionService>>()
			.expect("Could not get session service from app data"),
	)
}

fn original_uri(req: &RequestParts<Body>) -> String {
	// nested routers strip their prefix from `req.uri()`
	let uri = req
		.extensions()
		.get::<OriginalUri>()
		.map_or(req.uri(), |OriginalUri(uri)| uri);
	uri
		.path_and_query()
		.map_or_else(|| "/".to_owned(), |path| path.as_str().to_owned())
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("not logged in")]
	NoSession { redirect_to: String },
	#[error("user was deleted")]
	// the token checked out, so we issued it; the account must have gone away since
	UserDeleted { redirect_to: String },
	#[error("sqlx error: {0}")]
	Sqlx(#[from] sqlx::Error),
}

impl Error {
	fn redirect_to(&self) -> Option<&str> {
		// be exhaustive in case we add another variant
		match self {
			Self::NoSession { redirect_to } | Self::UserDeleted { redirect_to } => Some(redirect_to),
			Self::Sqlx(_) => None,
		}
	}
}

impl IntoResponse for Error {
	fn into_response(self) -> Response {
		match self.redirect_to() {
			// /login will send the user back here once they are logged in
			Some(redirect_to) => {
				let location = format!(
					"/login?return={}",
					super::percent::encode(redirect_to.as_bytes())
				);
				(
					StatusCode::SEE_OTHER,
					CookiePart::session_removal(),
					[(LOCATION, location)],
					self.to_string(),
				)
					.into_response()
			}
			None => crate::error::error_response(&self, StatusCode::INTERNAL_SERVER_ERROR),
		}
	}
}

#[async_trait]
impl FromRequest<Body> for Authenticated {
	type Rejection = Error;

	async fn from_request(req: &mut RequestParts<Body>) -> Result<Self, Self::Rejection> {
		match sessions(req).require_auth(req.headers()) {
			Some(user_id) => Ok(Self(user_id)),
			None => Err(Error::NoSession {
				redirect_to: original_uri(req),
			}),
		}
	}
}

#[async_trait]
impl FromRequest<Body> for MaybeAuthenticated {
	type Rejection = std::convert::Infallible;

	async fn from_request(req: &mut RequestParts<Body>) -> Result<Self, Self::Rejection> {
		Ok(Self(sessions(req).authenticated_user(req.headers())))
	}
}

#[async_trait]
impl FromRequest<Body> for Auth {
	type Rejection = Error;

	async fn from_request(req: &mut RequestParts<Body>) -> Result<Self, Self::Rejection> {
		let Authenticated(user_id) = Authenticated::from_request(req).await?;
		let database = Arc::clone(
			req
				.extensions()
				.get::<Arc<Database>>()
				.expect("Could not get database from app data"),
		);
		match User::by_id(&*database, user_id).await? {
			Some(user) => Ok(Self(user)),
			None => {
				tracing::info!(user_id, "session token names a user that no longer exists");
				Err(Error::UserDeleted {
					redirect_to: original_uri(req),
				})
			}
		}
	}
}
