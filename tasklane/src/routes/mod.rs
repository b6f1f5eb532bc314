use axum::Router;

mod login;
mod logout;
mod password_reset;
mod register;
mod root;

macro_rules! sub {
	($app:ident, $name:ident) => {
		$app = $app.nest(concat!("/", stringify!($name)), $name::configure())
	};
	($app:ident; $($name:ident),+) => {
		$(sub!($app, $name));+
	};
}

macro_rules! merge {
	($app:ident, $name:ident) => {
		$app = $app.merge($name::configure());
	};
	($app:ident; $($name:ident),+) => {
		$(merge!($app, $name));+
	};
}

pub fn configure() -> Router {
	let mut app = Router::new();

	merge!(app; root);
	sub!(app; login, logout, password_reset, register);

	app.fallback(axum::handler::Handler::into_service(
		crate::error::default_handler,
	))
}

#[cfg(test)]
mod test {
	use std::sync::Arc;

	use axum::body::Body;
	use axum::{Extension, Router};
	use http::header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE};
	use http::{Request, StatusCode};
	use tower::ServiceExt as _;
	use tracing::level_filters::LevelFilter;

	use crate::config::{Config, Environment, LogLevel};
	use crate::helpers::percent::ReturnPath;
	use crate::timestamp::SystemClock;
	use crate::token::{Key, SessionService};

	fn config(environment: Environment) -> Config {
		Config {
			address: "127.0.0.1:0".parse().unwrap(),
			log_level: LogLevel {
				internal: LevelFilter::OFF,
				external: LevelFilter::OFF,
			},
			database_url: "postgres://localhost/tasklane_test".to_owned(),
			environment,
			token_key: Key::generate(),
		}
	}

	fn app(sessions: &Arc<SessionService>) -> Router {
		let config = config(Environment::Development);
		// never connects unless a handler actually queries it
		let database = sqlx::postgres::PgPoolOptions::new()
			.connect_lazy(&config.database_url)
			.unwrap();

		super::configure()
			.layer(Extension(Arc::new(database)))
			.layer(Extension(Arc::new(config)))
			.layer(Extension(Arc::clone(sessions)))
	}

	fn sessions() -> Arc<SessionService> {
		Arc::new(SessionService::new(Key::generate(), Arc::new(SystemClock)))
	}

	fn form(uri: &str, body: &'static str) -> Request<Body> {
		Request::builder()
			.method("POST")
			.uri(uri)
			.header(CONTENT_TYPE, "application/x-www-form-urlencoded")
			.body(Body::from(body))
			.unwrap()
	}

	#[tokio::test]
	async fn root_without_session_redirects_to_login() {
		let response = app(&sessions())
			.oneshot(Request::get("/").body(Body::empty()).unwrap())
			.await
			.unwrap();
		assert_eq!(response.status(), StatusCode::SEE_OTHER);
		assert_eq!(response.headers()[LOCATION], "/login?return=%2F");
		assert!(response.headers()[SET_COOKIE]
			.to_str()
			.unwrap()
			.starts_with("session_token=;"));
	}

	#[tokio::test]
	async fn root_with_reset_token_redirects_to_login() {
		let sessions = sessions();
		let token = sessions.generate_reset_token(1).unwrap();
		let response = app(&sessions)
			.oneshot(
				Request::get("/")
					.header(COOKIE, format!("session_token={}", token))
					.body(Body::empty())
					.unwrap(),
			)
			.await
			.unwrap();
		assert_eq!(response.status(), StatusCode::SEE_OTHER);
	}

	#[tokio::test]
	async fn logout_removes_cookie() {
		let response = app(&sessions())
			.oneshot(Request::get("/logout").body(Body::empty()).unwrap())
			.await
			.unwrap();
		assert_eq!(response.status(), StatusCode::SEE_OTHER);
		assert_eq!(response.headers()[LOCATION], "/login");
		let set_cookie = response.headers()[SET_COOKIE].to_str().unwrap();
		assert!(set_cookie.starts_with("session_token=;"));
		assert!(set_cookie.contains("Path=/"));
	}

	#[tokio::test]
	async fn login_page_keeps_only_local_return_paths() {
		let response = app(&sessions())
			.oneshot(
				Request::get("/login?return=%2Ftasks")
					.body(Body::empty())
					.unwrap(),
			)
			.await
			.unwrap();
		assert_eq!(response.status(), StatusCode::OK);
		let body = hyper::body::to_bytes(response.into_body()).await.unwrap();
		assert!(std::str::from_utf8(&body)
			.unwrap()
			.contains("/login?return=%2Ftasks"));

		let response = app(&sessions())
			.oneshot(
				Request::get("/login?return=https%3A%2F%2Fevil.example")
					.body(Body::empty())
					.unwrap(),
			)
			.await
			.unwrap();
		let body = hyper::body::to_bytes(response.into_body()).await.unwrap();
		assert!(!std::str::from_utf8(&body).unwrap().contains("evil"));
	}

	#[tokio::test]
	async fn register_rejects_mismatched_passwords() {
		let response = app(&sessions())
			.oneshot(form(
				"/register",
				"username=ada&password=one&confirm_password=two",
			))
			.await
			.unwrap();
		assert_eq!(response.status(), StatusCode::BAD_REQUEST);
	}

	#[tokio::test]
	async fn reset_confirm_rejects_session_token() {
		let sessions = sessions();
		let token = sessions.create_session_token(1).unwrap();
		let body = format!("token={}&password=new&confirm_password=new", token);
		let request = Request::builder()
			.method("POST")
			.uri("/password_reset/confirm")
			.header(CONTENT_TYPE, "application/x-www-form-urlencoded")
			.body(Body::from(body))
			.unwrap();
		let response = app(&sessions).oneshot(request).await.unwrap();
		assert_eq!(response.status(), StatusCode::BAD_REQUEST);
	}

	#[test]
	fn logged_in_cookie_follows_environment() {
		let sessions = sessions();
		let token = sessions.create_session_token(6).unwrap();

		let production = config(Environment::Production);
		let response = super::login::logged_in(&production, token.clone(), None);
		assert_eq!(response.status(), StatusCode::SEE_OTHER);
		assert_eq!(response.headers()[LOCATION], "/");
		let set_cookie = response.headers()[SET_COOKIE].to_str().unwrap();
		assert!(set_cookie.starts_with(&format!("session_token={};", token)));
		assert!(set_cookie.contains("Secure"));
		assert!(set_cookie.contains("HttpOnly"));
		assert!(set_cookie.contains("SameSite=Strict"));

		let development = config(Environment::Development);
		let response = super::login::logged_in(&development, token, None);
		let set_cookie = response.headers()[SET_COOKIE].to_str().unwrap();
		assert!(!set_cookie.contains("Secure"));
	}

	#[test]
	fn logged_in_redirect_ignores_unsafe_return_paths() {
		let development = config(Environment::Development);
		let token = sessions().create_session_token(6).unwrap();

		let destination = ReturnPath::new("/tasks?view=board".to_owned());
		let response = super::login::logged_in(&development, token.clone(), destination.as_ref());
		assert_eq!(response.headers()[LOCATION], "/tasks?view=board");

		// `return=%2F%0A` decodes to a path with a newline
		let destination = ReturnPath::new("/\n".to_owned());
		let response = super::login::logged_in(&development, token, destination.as_ref());
		assert_eq!(response.headers()[LOCATION], "/");
	}

	#[tokio::test]
	async fn unknown_page() {
		let response = app(&sessions())
			.oneshot(Request::get("/calendar").body(Body::empty()).unwrap())
			.await
			.unwrap();
		assert_eq!(response.status(), StatusCode::NOT_FOUND);
	}
}
