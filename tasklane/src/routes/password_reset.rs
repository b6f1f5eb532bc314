//! Password reset in two steps: asking for a reset token, then trading it in for a new password.
//!
//! There is no mail transport, so the reset link is written to the log for the operator to pass on.
//! The link is a live credential and only appears at `debug`, which operators opt into.

use std::sync::Arc;

use axum::response::{ErrorResponse, IntoResponse, Redirect, Response};
use axum::{extract, Router};
use http::StatusCode;
use serde::Deserialize;

use crate::database::models::UserId;
use crate::database::{models, Database};
use crate::error;
use crate::helpers::cookie::Part as CookiePart;
use crate::helpers::percent;
use crate::token::SessionService;

static REQUESTED_MESSAGE: &str =
	"If an account with that username exists, a password reset link has been issued.\n";
static INVALID_TOKEN_MESSAGE: &str = "Invalid or expired reset token";

#[derive(Deserialize)]
pub struct ResetRequest {
	username: String,
}

pub async fn request_handler(
	extract::Form(ResetRequest { username }): extract::Form<ResetRequest>,
	extract::Extension(database): extract::Extension<Arc<Database>>,
	extract::Extension(sessions): extract::Extension<Arc<SessionService>>,
) -> Result<Response, ErrorResponse> {
	let user = models::User::by_username(&*database, &username)
		.await
		.map_err(error::Sqlx)?;

	// same answer either way, so this cannot be used to probe for accounts
	match user {
		Some(user) => {
			let token = sessions
				.generate_reset_token(user.id)
				.map_err(error::Encrypt)?;
			announce_reset_link(user.id, &token);
		}
		None => tracing::debug!(?username, "password reset for unknown user"),
	}

	Ok((StatusCode::ACCEPTED, REQUESTED_MESSAGE).into_response())
}

fn announce_reset_link(user_id: UserId, token: &str) {
	tracing::info!(user_id, "issued password reset token");
	let link = format!("/password_reset/confirm?token={}", percent::encode(token.as_bytes()));
	tracing::debug!(user_id, %link, "password reset link");
}

#[derive(Deserialize)]
pub struct ConfirmQuery {
	token: Option<String>,
}

pub async fn confirm_get_handler(
	extract::Query(ConfirmQuery { token }): extract::Query<ConfirmQuery>,
) -> Result<&'static str, error::BadRequest> {
	match token {
		Some(_) => Ok("To choose a new password, POST a form with `token`, `password`, and `confirm_password` to /password_reset/confirm.\n"),
		None => Err(error::BadRequest("Missing reset token".into())),
	}
}

#[derive(Deserialize)]
pub struct ConfirmRequest {
	token: String,
	password: String,
	confirm_password: String,
}

pub async fn confirm_post_handler(
	extract::Form(ConfirmRequest {
		token,
		password,
		confirm_password,
	}): extract::Form<ConfirmRequest>,
	extract::Extension(database): extract::Extension<Arc<Database>>,
	extract::Extension(sessions): extract::Extension<Arc<SessionService>>,
) -> Result<Response, ErrorResponse> {
	if password.is_empty() {
		return Err(error::BadRequest("Password is required".into()).into());
	}
	if password != confirm_password {
		return Err(error::BadRequest("Passwords do not match".into()).into());
	}

	let user_id = sessions
		.verify_reset_token(&token)
		.ok_or(error::BadRequest(INVALID_TOKEN_MESSAGE.into()))?;
	let mut user = models::User::by_id(&*database, user_id)
		.await
		.map_err(error::Sqlx)?
		.ok_or(error::BadRequest(INVALID_TOKEN_MESSAGE.into()))?;

	let password = models::UserPassword::hash(&password).map_err(|_| error::PasswordHash)?;
	user
		.set_password(&*database, password)
		.await
		.map_err(error::Sqlx)?;
	tracing::info!(user_id, "password was reset");

	Ok(
		(
			CookiePart::session_removal(),
			Redirect::to("/login"),
		)
			.into_response(),
	)
}

pub fn configure() -> Router {
	Router::new()
		.route("/", axum::routing::post(request_handler))
		.route(
			"/confirm",
			axum::routing::get(confirm_get_handler).post(confirm_post_handler),
		)
}
