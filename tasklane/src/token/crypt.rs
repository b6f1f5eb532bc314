use std::fmt::{self, Debug, Formatter};

use aes_gcm::aead::KeyInit as _;
use aes_gcm::{Aes256Gcm, Nonce};

#[derive(Debug, thiserror::Error)]
pub enum EncryptError {
	#[error("serializing token claims: {0}")]
	Serialize(#[from] bincode::Error),
	#[error("sealing serialized claims: {0}")]
	Encrypt(#[from] aes_gcm::aead::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum DecryptError {
	#[error("decoding base64 data: {0}")]
	Base64(#[from] base64::DecodeError),
	#[error("decoded data is too short")]
	TooShort,
	#[error("opening sealed data: {0}")]
	Decrypt(#[from] aes_gcm::aead::Error),
	#[error("deserializing opened claims: {0}")]
	Deserialize(#[from] bincode::Error),
}

const KEY_LEN: usize = 32;
const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;
static ASSOCIATED_DATA: &[u8] = b"tasklane token";
const ENCODING: base64::Config = base64::URL_SAFE_NO_PAD;

/// Symmetric key that seals and opens every token the process issues.
#[derive(Clone)]
pub struct Key([u8; KEY_LEN]);

impl Key {
	pub fn generate() -> Self {
		use rand::Rng as _;
		Self(rand::thread_rng().gen())
	}

	pub fn to_base64(&self) -> String {
		base64::encode(self.0)
	}

	fn cipher(&self) -> Aes256Gcm {
		Aes256Gcm::new((&self.0).into())
	}
}

impl Debug for Key {
	fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
		formatter.write_str("Key(..)")
	}
}

impl<'de> serde::Deserialize<'de> for Key {
	fn deserialize<D: serde::de::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error>
	where
		D::Error: serde::de::Error,
	{
		use serde::de::Error;
		let deserialized = <std::borrow::Cow<'_, str>>::deserialize(deserializer)?;
		let decoded = base64::decode(deserialized.as_bytes()).map_err(Error::custom)?;
		let raw: [u8; KEY_LEN] = decoded
			.as_slice()
			.try_into()
			.map_err(|_| Error::invalid_length(decoded.len(), &"32 bytes of base64"))?;
		Ok(Self(raw))
	}
}

impl super::Claims {
	/// Layout before base64: `nonce || ciphertext || tag`.
	pub fn seal(&self, key: &Key) -> Result<String, EncryptError> {
		use aes_gcm::aead::AeadInPlace as _;
		use rand::RngCore as _;

		let serialized_size = usize::try_from(bincode::serialized_size(self)?)
			.map_err(|_| bincode::Error::from(bincode::ErrorKind::SizeLimit))?;
		let mut sealed = vec![0; NONCE_LEN + serialized_size + TAG_LEN];
		let (nonce, in_out) = sealed.split_at_mut(NONCE_LEN);
		let (in_out, tag_buffer) = in_out.split_at_mut(serialized_size);
		rand::thread_rng().fill_bytes(nonce);
		bincode::serialize_into(&mut *in_out, self)?;
		let tag =
			key
				.cipher()
				.encrypt_in_place_detached(Nonce::from_slice(nonce), ASSOCIATED_DATA, in_out)?;
		tag_buffer.copy_from_slice(&tag);
		Ok(base64::encode_config(&sealed, ENCODING))
	}

	/// Opens a sealed token. Says nothing about expiry or purpose.
	pub fn open(sealed_and_encoded: &str, key: &Key) -> Result<Self, DecryptError> {
		use aes_gcm::aead::{Aead as _, Payload};

		let sealed = base64::decode_config(sealed_and_encoded, ENCODING)?;
		if sealed.len() < NONCE_LEN + TAG_LEN {
			return Err(DecryptError::TooShort);
		}
		let (nonce, sealed) = sealed.split_at(NONCE_LEN);
		let opened = key.cipher().decrypt(
			Nonce::from_slice(nonce),
			Payload {
				msg: sealed,
				aad: ASSOCIATED_DATA,
			},
		)?;
		Ok(bincode::deserialize(&opened)?)
	}
}
