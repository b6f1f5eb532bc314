use sqlx::Postgres;

use super::UserPassword;
use crate::timestamp::Timestamp;

pub type Id = super::Id;

#[derive(Debug, sqlx::FromRow)]
pub struct User {
	pub id: Id,
	pub username: String,
	pub password: UserPassword,
	pub email: Option<String>,
	pub created_time: Timestamp,
	pub last_login: Option<Timestamp>,
}

pub struct Create {
	pub username: String,
	pub password: UserPassword,
	pub email: Option<String>,
}

impl Create {
	pub async fn insert(
		self,
		database: impl sqlx::Executor<'_, Database = Postgres>,
	) -> sqlx::Result<User> {
		sqlx::query_as(
			"INSERT INTO users (username, password, email) VALUES ($1, $2, $3) RETURNING *",
		)
		.bind(self.username)
		.bind(self.password)
		.bind(self.email)
		.fetch_one(database)
		.await
	}
}

impl User {
	pub async fn by_id(
		database: impl sqlx::Executor<'_, Database = Postgres>,
		id: Id,
	) -> sqlx::Result<Option<Self>> {
		sqlx::query_as("SELECT * FROM users WHERE id = $1")
			.bind(id)
			.fetch_optional(database)
			.await
	}

	pub async fn by_username(
		database: impl sqlx::Executor<'_, Database = Postgres>,
		username: &str,
	) -> sqlx::Result<Option<Self>> {
		sqlx::query_as("SELECT * FROM users WHERE username = $1")
			.bind(username)
			.fetch_optional(database)
			.await
	}

	pub async fn set_last_login(
		&mut self,
		database: impl sqlx::Executor<'_, Database = Postgres>,
		last_login: Option<Timestamp>,
	) -> sqlx::Result<()> {
		sqlx::query("UPDATE users SET last_login = $1 WHERE id = $2")
			.bind(last_login)
			.bind(self.id)
			.execute(database)
			.await?;
		self.last_login = last_login;
		Ok(())
	}

	pub async fn set_password(
		&mut self,
		database: impl sqlx::Executor<'_, Database = Postgres>,
		password: UserPassword,
	) -> sqlx::Result<()> {
		sqlx::query("UPDATE users SET password = $1 WHERE id = $2")
			.bind(&password)
			.bind(self.id)
			.execute(database)
			.await?;
		self.password = password;
		Ok(())
	}
}
