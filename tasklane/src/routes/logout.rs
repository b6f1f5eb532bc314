use axum::response::{IntoResponse, Redirect};
use axum::Router;

use crate::helpers::auth::MaybeAuthenticated;
use crate::helpers::cookie::Part as CookiePart;

pub async fn handler(MaybeAuthenticated(user_id): MaybeAuthenticated) -> impl IntoResponse {
	if let Some(user_id) = user_id {
		tracing::info!(user_id, "user logged out");
	}
	// the token itself stays valid until it expires; we can only make the browser forget it
	(CookiePart::session_removal(), Redirect::to("/login"))
}

pub fn configure() -> Router {
	Router::new().route("/", axum::routing::get(handler))
}
