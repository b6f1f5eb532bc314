use std::fmt::Write as _;

use axum::Router;

use crate::helpers::auth;

pub async fn get_handler(auth::Auth(self_user): auth::Auth) -> String {
	let mut page = format!(
		"Logged in as {} (member since {}).\n",
		self_user.username,
		self_user.created_time.date()
	);
	if let Some(email) = &self_user.email {
		let _ = writeln!(page, "Email: {email}");
	}
	if let Some(last_login) = self_user.last_login {
		let _ = writeln!(page, "Last login: {} {} UTC", last_login.date(), last_login.time());
	}
	page
}

pub fn configure() -> Router {
	Router::new().route("/", axum::routing::get(get_handler))
}
