use std::fmt::{self, Display, Formatter};

use percent_encoding::percent_encode;

#[inline]
pub fn encode(data: &[u8]) -> String {
	percent_encode(data, percent_encoding::NON_ALPHANUMERIC).to_string()
}

/// A local path to send the user back to after logging in.
/// Holds the decoded path; `Display` re-encodes it for use in a query string.
#[derive(Debug, PartialEq, Eq)]
pub struct ReturnPath(String);

impl ReturnPath {
	/// Only absolute paths on this site, so a crafted link cannot bounce the user elsewhere.
	/// The path must also fit in a `Location` header as-is: printable ASCII and spaces only.
	pub fn new(path: String) -> Option<Self> {
		let local = path.starts_with('/') && !path.starts_with("//") && !path.contains('\\');
		let header_safe = path.bytes().all(|byte| byte.is_ascii_graphic() || byte == b' ');
		(local && header_safe).then(|| Self(path))
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl Display for ReturnPath {
	fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
		formatter.write_str(&encode(self.0.as_bytes()))
	}
}
