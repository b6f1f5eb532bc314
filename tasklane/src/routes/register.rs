use std::sync::Arc;

use axum::response::{ErrorResponse, Response};
use axum::{extract, Router};
use serde::Deserialize;

use super::login::logged_in;
use crate::config::Config;
use crate::database::{is_unique_violation, models, Database};
use crate::error;
use crate::helpers::set_none_if_empty;
use crate::token::SessionService;

static USERNAME_TAKEN: &str = "Username taken";

pub async fn get_handler() -> &'static str {
	"To register, POST a form with `username`, `password`, `confirm_password`, and optionally `email` to /register.\n"
}

#[derive(Debug, Deserialize)]
pub struct PostRequest {
	username: String,
	password: String,
	confirm_password: String,
	email: Option<String>,
}

impl PostRequest {
	fn validate(&mut self) -> Result<(), error::BadRequest> {
		set_none_if_empty(&mut self.email);
		let trimmed = self.username.trim();
		if trimmed.len() != self.username.len() {
			self.username = trimmed.to_owned();
		}
		if self.username.is_empty() {
			return Err(error::BadRequest("Username is required".into()));
		}
		if self.password.is_empty() {
			return Err(error::BadRequest("Password is required".into()));
		}
		if self.password != self.confirm_password {
			return Err(error::BadRequest("Passwords do not match".into()));
		}
		Ok(())
	}
}

pub async fn post_handler(
	extract::Form(mut request): extract::Form<PostRequest>,
	extract::Extension(database): extract::Extension<Arc<Database>>,
	extract::Extension(config): extract::Extension<Arc<Config>>,
	extract::Extension(sessions): extract::Extension<Arc<SessionService>>,
) -> Result<Response, ErrorResponse> {
	request.validate()?;

	if models::User::by_username(&*database, &request.username)
		.await
		.map_err(error::Sqlx)?
		.is_some()
	{
		return Err(error::BadRequest(USERNAME_TAKEN.into()).into());
	}

	let user = models::user::Create {
		username: request.username,
		password: models::UserPassword::hash(&request.password).map_err(|_| error::PasswordHash)?,
		email: request.email,
	}
	.insert(&*database)
	.await
	.map_err(|error| -> ErrorResponse {
		// lost a race with a concurrent registration of the same name
		if is_unique_violation(&error) {
			error::BadRequest(USERNAME_TAKEN.into()).into()
		} else {
			error::Sqlx(error).into()
		}
	})?;
	tracing::info!(user_id = user.id, username = %user.username, "registered user");

	let token = sessions
		.create_session_token(user.id)
		.map_err(error::Encrypt)?;
	Ok(logged_in(&config, token, None))
}

pub fn configure() -> Router {
	Router::new().route("/", axum::routing::get(get_handler).post(post_handler))
}

#[cfg(test)]
mod test {
	use super::PostRequest;

	fn request(username: &str, password: &str, confirm_password: &str) -> PostRequest {
		PostRequest {
			username: username.to_owned(),
			password: password.to_owned(),
			confirm_password: confirm_password.to_owned(),
			email: Some(String::new()),
		}
	}

	#[test]
	fn validation() {
		let mut ok = request("  ada ", "pw", "pw");
		ok.validate().unwrap();
		assert_eq!(ok.username, "ada");
		assert_eq!(ok.email, None);

		assert!(request("   ", "pw", "pw").validate().is_err());
		assert!(request("ada", "", "").validate().is_err());
		assert!(request("ada", "pw", "wp").validate().is_err());
	}
}
