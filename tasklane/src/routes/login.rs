use std::sync::Arc;

use axum::response::{ErrorResponse, IntoResponse, Redirect, Response};
use axum::{extract, Router};
use serde::Deserialize;

use crate::config::Config;
use crate::database::{models, Database};
use crate::error;
use crate::helpers::cookie::Part as CookiePart;
use crate::helpers::percent::ReturnPath;
use crate::token::SessionService;

#[derive(Deserialize)]
pub struct ReturnUrl {
	#[serde(rename = "return")]
	return_url: Option<String>,
}

impl ReturnUrl {
	pub fn into_path(self) -> Option<ReturnPath> {
		self.return_url.and_then(ReturnPath::new)
	}
}

pub async fn get_handler(extract::Query(return_url): extract::Query<ReturnUrl>) -> String {
	let action = match return_url.into_path() {
		Some(path) => format!("/login?return={}", path),
		None => "/login".to_owned(),
	};
	format!("To log in, POST a form with `username` and `password` to {action}.\n")
}

#[derive(Deserialize)]
pub struct LoginRequest {
	username: String,
	password: String,
}

pub async fn post_handler(
	extract::Form(LoginRequest { username, password }): extract::Form<LoginRequest>,
	extract::Query(return_url): extract::Query<ReturnUrl>,
	extract::Extension(database): extract::Extension<Arc<Database>>,
	extract::Extension(config): extract::Extension<Arc<Config>>,
	extract::Extension(sessions): extract::Extension<Arc<SessionService>>,
) -> Result<Response, ErrorResponse> {
	let database = &*database;

	let user = models::User::by_username(database, &username)
		.await
		.map_err(error::Sqlx)?;
	let mut user = match user {
		Some(user) => user,
		None => {
			tracing::debug!(?username, "login for unknown user");
			return Err(error::InvalidCredentials.into());
		}
	};
	if !user
		.verify_password(&password)
		.map_err(|_| error::PasswordHash)?
	{
		tracing::debug!(user_id = user.id, "login with wrong password");
		return Err(error::InvalidCredentials.into());
	}

	user
		.set_last_login(database, Some(crate::timestamp::now()))
		.await
		.map_err(error::Sqlx)?;

	let token = sessions
		.create_session_token(user.id)
		.map_err(error::Encrypt)?;
	tracing::info!(user_id = user.id, "user logged in");

	Ok(logged_in(&config, token, return_url.into_path().as_ref()))
}

/// Hands the new session token to the browser and sends it on to `destination`, or `/`.
pub(super) fn logged_in(config: &Config, token: String, destination: Option<&ReturnPath>) -> Response {
	(
		CookiePart::session(token, config.secure_cookies()),
		Redirect::to(destination.map_or("/", ReturnPath::as_str)),
	)
		.into_response()
}

pub fn configure() -> Router {
	Router::new().route("/", axum::routing::get(get_handler).post(post_handler))
}
