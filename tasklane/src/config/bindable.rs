use std::fmt::{self, Display, Formatter};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use serde::de::{Deserialize, Deserializer, Error as DError};

/// Where the server listens. Written as `tcp://host:port`, `unix:///path/to/socket`, or a bare
/// `host:port`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindableAddr {
	Unix(PathBuf),
	Tcp(SocketAddr),
}

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
	#[error("unknown protocol {0:?}")]
	UnknownProtocol(String),
	#[error("could not parse socket address: {0}")]
	SocketAddr(#[from] std::net::AddrParseError),
	#[error("empty socket path")]
	EmptyPath,
}

impl FromStr for BindableAddr {
	type Err = ParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let (protocol, inner) = s.split_once("://").unwrap_or(("tcp", s));
		match protocol {
			"unix" if inner.is_empty() => Err(ParseError::EmptyPath),
			"unix" => Ok(Self::Unix(PathBuf::from(inner))),
			"tcp" => Ok(Self::Tcp(inner.parse()?)),
			unknown => Err(ParseError::UnknownProtocol(unknown.to_owned())),
		}
	}
}

impl Display for BindableAddr {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			Self::Tcp(inner) => write!(f, "tcp://{}", inner),
			Self::Unix(inner) => write!(f, "unix://{}", inner.display()),
		}
	}
}

impl<'de> Deserialize<'de> for BindableAddr {
	fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error>
	where
		D::Error: DError,
	{
		String::deserialize(d)?.parse().map_err(DError::custom)
	}
}
