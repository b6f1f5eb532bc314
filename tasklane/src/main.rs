#![deny(
	absolute_paths_not_starting_with_crate,
	future_incompatible,
	keyword_idents,
	macro_use_extern_crate,
	meta_variable_misuse,
	missing_abi,
	missing_copy_implementations,
	non_ascii_idents,
	nonstandard_style,
	noop_method_call,
	rust_2018_idioms
)]
#![forbid(unsafe_code)]

use std::sync::Arc;

use axum::Extension;

mod config;
mod database;
mod error;
mod helpers;
mod routes;
mod server;
mod timestamp;
mod token;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("reading configuration: {0}")]
	Config(#[from] config::Error),
	#[error("setting up database: {0}")]
	Database(#[from] database::Error),
	#[error("running server: {0}")]
	RunServer(#[source] hyper::Error),
	#[error("binding to Unix socket at path {1}: {0}")]
	BindUnix(#[source] std::io::Error, std::path::PathBuf),
}

#[tokio::main]
async fn main() -> Result<(), Error> {
	let config = config::config()?;

	init_logging(config.log_level);

	let sessions = token::SessionService::new(
		config.token_key.clone(),
		Arc::new(timestamp::SystemClock),
	);
	let sessions = Arc::new(sessions);
	let config = Arc::new(config);

	let database = database::connect(&config.database_url)
		.await
		.map(Arc::new)?;

	let mut app = routes::configure();
	app = app.layer(Extension(database));
	app = app.layer(Extension(sessions));
	app = app.layer(Extension(Arc::clone(&config)));
	app = app.layer(tower_http::trace::TraceLayer::new_for_http());

	tracing::info!(address = %config.address, environment = ?config.environment, "listening");
	server::run(app, &config.address).await
}

fn init_logging(log_level: config::LogLevel) {
	use tracing_subscriber::filter::FilterFn;
	use tracing_subscriber::layer::{Layer, SubscriberExt};
	use tracing_subscriber::util::SubscriberInitExt;

	let filter = FilterFn::new(move |metadata| {
		let required_level = match metadata.module_path() {
			Some(path) if path.split("::").next() == Some(env!("CARGO_CRATE_NAME")) => {
				log_level.internal
			}
			_ => log_level.external,
		};
		// more verbose levels compare greater, and a level passes when it does not exceed the filter
		metadata.level() <= &required_level
	});

	let layer = tracing_subscriber::fmt::layer()
		.with_file(true)
		.with_line_number(true)
		.with_writer(std::io::stderr);

	tracing_subscriber::registry()
		.with(layer.with_filter(filter))
		.init();
}
