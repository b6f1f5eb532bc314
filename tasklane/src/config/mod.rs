use figment::Figment;
use serde::Deserialize;
use tracing::level_filters::LevelFilter;

use crate::token::Key as TokenKey;

pub mod bindable;
pub use bindable::BindableAddr;

static CONFIG_FILE: &str = "tasklane.toml";
static ENV_PREFIX: &str = "TASKLANE_";

#[derive(Debug)]
pub struct Config {
	pub address: BindableAddr,
	pub log_level: LogLevel,
	pub database_url: String,
	pub environment: Environment,
	pub token_key: TokenKey,
}

/// The configuration as written by the operator, before the token key is settled.
#[derive(Deserialize)]
struct Layered {
	address: BindableAddr,
	#[serde(default = "default_log_level")]
	log_level: LogLevel,
	database_url: String,
	#[serde(default)]
	environment: Environment,
	#[serde(default)]
	token_key: Option<TokenKey>,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("{0}")]
	Figment(#[from] figment::Error),
	#[error("`token_key` must be configured when running in production")]
	MissingTokenKey,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
	#[default]
	Development,
	Production,
}

impl Environment {
	pub fn is_production(self) -> bool {
		self == Self::Production
	}
}

fn deserialize_level_filter<'de, D: serde::de::Deserializer<'de>>(
	d: D,
) -> Result<LevelFilter, D::Error>
where
	D::Error: serde::de::Error,
{
	String::deserialize(d)?
		.parse()
		.map_err(serde::de::Error::custom)
}

/// `internal` applies to this crate's own events, `external` to everything else.
/// An `internal` level of `debug` or finer also logs password reset links, which are credentials.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(from = "LogLevelSerdeHelper")]
pub struct LogLevel {
	pub internal: LevelFilter,
	pub external: LevelFilter,
}

const fn default_log_level_internal() -> LevelFilter {
	LevelFilter::INFO
}

const fn default_log_level_external() -> LevelFilter {
	LevelFilter::WARN
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LogLevelSerdeHelper {
	#[serde(deserialize_with = "deserialize_level_filter")]
	Together(LevelFilter),
	Separate {
		#[serde(
			deserialize_with = "deserialize_level_filter",
			default = "default_log_level_internal"
		)]
		internal: LevelFilter,
		#[serde(
			deserialize_with = "deserialize_level_filter",
			default = "default_log_level_external"
		)]
		external: LevelFilter,
	},
}

impl From<LogLevelSerdeHelper> for LogLevel {
	fn from(helper: LogLevelSerdeHelper) -> Self {
		match helper {
			LogLevelSerdeHelper::Together(level) => Self {
				internal: level,
				external: level,
			},
			LogLevelSerdeHelper::Separate { internal, external } => Self { internal, external },
		}
	}
}

const fn default_log_level() -> LogLevel {
	LogLevel {
		internal: default_log_level_internal(),
		external: default_log_level_external(),
	}
}

fn generate_token_key() -> TokenKey {
	let generated = TokenKey::generate();
	// print warning with `eprintln!` since logging is not initialized when config is loaded
	eprintln!("Warning: since you did not provide a token key, one was generated for you.");
	eprintln!("Every session will be invalidated when the server restarts. To avoid this, add the following to your `{CONFIG_FILE}`:");
	eprintln!("token_key = {:?}", generated.to_base64());
	generated
}

impl Config {
	pub fn from_figment(figment: &Figment) -> Result<Self, Error> {
		let Layered {
			address,
			log_level,
			database_url,
			environment,
			token_key,
		} = figment.extract()?;

		let token_key = match (token_key, environment) {
			(Some(key), _) => key,
			(None, Environment::Production) => return Err(Error::MissingTokenKey),
			(None, Environment::Development) => generate_token_key(),
		};

		Ok(Self {
			address,
			log_level,
			database_url,
			environment,
			token_key,
		})
	}

	/// Whether cookies should carry the `Secure` attribute.
	pub fn secure_cookies(&self) -> bool {
		self.environment.is_production()
	}
}

pub fn config() -> Result<Config, Error> {
	use figment::providers::Format as _;

	let figment = Figment::new()
		.merge(figment::providers::Toml::file(CONFIG_FILE))
		.merge(figment::providers::Env::prefixed(ENV_PREFIX));
	Config::from_figment(&figment)
}

#[cfg(test)]
mod test {
	use figment::providers::{Format as _, Toml};
	use figment::Figment;
	use tracing::level_filters::LevelFilter;

	use super::{BindableAddr, Config, Environment, Error, LogLevel};

	fn load(toml: &str) -> Result<Config, Error> {
		Config::from_figment(&Figment::from(Toml::string(toml)))
	}

	#[test]
	fn minimal_development() {
		let config = load(
			r#"
			address = "127.0.0.1:8000"
			database_url = "postgres://localhost/tasklane"
			"#,
		)
		.unwrap();
		assert_eq!(
			config.address,
			BindableAddr::Tcp("127.0.0.1:8000".parse().unwrap())
		);
		assert_eq!(config.environment, Environment::Development);
		assert!(!config.secure_cookies());
		assert_eq!(
			config.log_level,
			LogLevel {
				internal: LevelFilter::INFO,
				external: LevelFilter::WARN,
			}
		);
	}

	#[test]
	fn production_requires_token_key() {
		let result = load(
			r#"
			address = "unix:///run/tasklane.sock"
			database_url = "postgres://localhost/tasklane"
			environment = "production"
			"#,
		);
		assert!(matches!(result, Err(Error::MissingTokenKey)));
	}

	#[test]
	fn production_with_token_key() {
		let key = crate::token::Key::generate().to_base64();
		let config = load(&format!(
			r#"
			address = "unix:///run/tasklane.sock"
			database_url = "postgres://localhost/tasklane"
			environment = "production"
			token_key = "{key}"
			"#
		))
		.unwrap();
		assert!(config.secure_cookies());
		assert_eq!(config.token_key.to_base64(), key);
	}

	#[test]
	fn bad_token_key() {
		let result = load(
			r#"
			address = "127.0.0.1:8000"
			database_url = "postgres://localhost/tasklane"
			token_key = "c2hvcnQ="
			"#,
		);
		assert!(matches!(result, Err(Error::Figment(_))));
	}

	#[test]
	fn log_levels() {
		let together = load(
			r#"
			address = "127.0.0.1:8000"
			database_url = "postgres://localhost/tasklane"
			log_level = "debug"
			"#,
		)
		.unwrap();
		assert_eq!(together.log_level.internal, LevelFilter::DEBUG);
		assert_eq!(together.log_level.external, LevelFilter::DEBUG);

		let separate = load(
			r#"
			address = "127.0.0.1:8000"
			database_url = "postgres://localhost/tasklane"
			log_level = { internal = "trace" }
			"#,
		)
		.unwrap();
		assert_eq!(separate.log_level.internal, LevelFilter::TRACE);
		assert_eq!(separate.log_level.external, LevelFilter::WARN);
	}
}
