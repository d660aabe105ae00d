//! API key holder that redacts sensitive material.

// self
use crate::{_prelude::*, error::ConfigError};

/// Environment variable the collector reads its API key from.
pub const API_KEY_ENV: &str = "RIOT_API_KEY";

/// Redacted API key wrapper keeping the secret out of logs.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);
impl ApiKey {
	/// Wraps a key string; empty or whitespace-only keys yield `None`.
	pub fn new(value: impl Into<String>) -> Option<Self> {
		let value = value.into();
		let trimmed = value.trim();

		if trimmed.is_empty() {
			return None;
		}

		Some(Self(trimmed.to_owned()))
	}

	/// Returns the inner key value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl AsRef<str> for ApiKey {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for ApiKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("ApiKey").field(&"<redacted>").finish()
	}
}
impl Display for ApiKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Holds the single static API key handed to the request client.
///
/// The holder is loaded once, typically at process start via [`Credential::from_env`], and
/// never mutated afterwards. A holder without a key is representable so callers can build
/// one from optional configuration, but [`Credential::key`] refuses to hand out a missing
/// key and the client refuses to start with one.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Credential {
	key: Option<ApiKey>,
}
impl Credential {
	/// Creates a holder from an explicit key. Blank keys leave the holder unset.
	pub fn new(key: impl Into<String>) -> Self {
		Self { key: ApiKey::new(key) }
	}

	/// Loads the key from [`API_KEY_ENV`], failing when it is absent or blank.
	pub fn from_env() -> Result<Self> {
		Self::from_lookup(|name| std::env::var(name).ok())
	}

	/// Loads the key through `lookup`, which maps a variable name to its value.
	///
	/// [`Credential::from_env`] delegates here with the process environment; tests and
	/// embedders can supply any other source.
	pub fn from_lookup<F>(lookup: F) -> Result<Self>
	where
		F: FnOnce(&str) -> Option<String>,
	{
		let credential = Self { key: lookup(API_KEY_ENV).and_then(ApiKey::new) };

		credential.key()?;

		Ok(credential)
	}

	/// Returns the key, or [`ConfigError::MissingCredential`] when unset.
	pub fn key(&self) -> Result<&str> {
		self.key
			.as_ref()
			.map(ApiKey::expose)
			.ok_or_else(|| ConfigError::MissingCredential { variable: API_KEY_ENV }.into())
	}

	/// Returns `true` when a key is present.
	pub fn is_set(&self) -> bool {
		self.key.is_some()
	}
}
