use sqlx::postgres::{PgPool, PgPoolOptions};

pub mod models;

pub type Database = PgPool;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("connecting: {0}")]
	Connect(#[from] sqlx::Error),
	#[error("running migrations: {0}")]
	Migrate(#[from] sqlx::migrate::MigrateError),
}

pub async fn connect(conn_str: &str) -> Result<Database, Error> {
	let conn = PgPoolOptions::new()
		.max_connections(5)
		.connect(conn_str)
		.await?;
	sqlx::migrate!().run(&conn).await?;
	tracing::debug!("database migrations are up to date");
	Ok(conn)
}

/// Postgres `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

/// Whether the statement was rejected by a `UNIQUE` constraint.
pub fn is_unique_violation(error: &sqlx::Error) -> bool {
	error
		.as_database_error()
		.and_then(|error| error.code())
		.map_or(false, |code| code == UNIQUE_VIOLATION)
}
