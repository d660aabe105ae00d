//! Strongly typed identifiers enforced across the collector domain.

// std
use std::{borrow::Borrow, ops::Deref};
// self
use crate::_prelude::*;

macro_rules! def_id {
	($name:ident, $doc:literal, $kind:literal) => {
		#[doc = $doc]
		#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
		#[serde(try_from = "String", into = "String")]
		pub struct $name(String);
		impl $name {
			/// Creates a new identifier after validation.
			pub fn new(value: impl AsRef<str>) -> Result<Self, IdentifierError> {
				let view = value.as_ref();

				validate_view($kind, view)?;

				Ok(Self(view.to_owned()))
			}
		}
		impl Deref for $name {
			type Target = str;

			fn deref(&self) -> &Self::Target {
				&self.0
			}
		}
		impl AsRef<str> for $name {
			fn as_ref(&self) -> &str {
				&self.0
			}
		}
		impl From<$name> for String {
			fn from(value: $name) -> Self {
				value.0
			}
		}
		impl TryFrom<String> for $name {
			type Error = IdentifierError;

			fn try_from(value: String) -> Result<Self, Self::Error> {
				validate_view($kind, &value)?;

				Ok(Self(value))
			}
		}
		impl Borrow<str> for $name {
			fn borrow(&self) -> &str {
				&self.0
			}
		}
		impl Debug for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				write!(f, concat!($kind, "({})"), self.0)
			}
		}
		impl Display for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				f.write_str(&self.0)
			}
		}
		impl FromStr for $name {
			type Err = IdentifierError;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				Self::new(s)
			}
		}
	};
}

const IDENTIFIER_MAX_LEN: usize = 128;

/// Error returned when identifier validation fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum IdentifierError {
	/// The identifier was empty or whitespace.
	#[error("{kind} identifier cannot be empty.")]
	Empty {
		/// Kind of identifier (match, PUUID, game name, tag line).
		kind: &'static str,
	},
	/// The identifier contains whitespace characters.
	#[error("{kind} identifier contains whitespace.")]
	ContainsWhitespace {
		/// Kind of identifier (match, PUUID, game name, tag line).
		kind: &'static str,
	},
	/// The identifier exceeded the allowed character count.
	#[error("{kind} identifier exceeds {max} characters.")]
	TooLong {
		/// Kind of identifier (match, PUUID, game name, tag line).
		kind: &'static str,
		/// Maximum permitted character count.
		max: usize,
	},
	/// A Riot ID was not written as `name#tag`.
	#[error("Riot ID `{value}` must be written as `name#tag`.")]
	MalformedRiotId {
		/// The rejected input.
		value: String,
	},
}

def_id! { MatchId, "Unique identifier for a completed match (e.g. `KR_7312345678`).", "Match" }
def_id! { Puuid, "Globally unique player identifier issued by the account API.", "Puuid" }

/// Player handle made of a game name and a tag line (`name#tag`).
///
/// Game names may contain inner spaces and non-ASCII characters, so only the
/// surrounding whitespace is rejected; neither half may contain `#`.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RiotId {
	game_name: String,
	tag_line: String,
}
impl RiotId {
	/// Builds a Riot ID from its two halves.
	pub fn new(
		game_name: impl Into<String>,
		tag_line: impl Into<String>,
	) -> Result<Self, IdentifierError> {
		let game_name = game_name.into();
		let tag_line = tag_line.into();

		validate_riot_part("Game name", &game_name)?;
		validate_riot_part("Tag line", &tag_line)?;

		Ok(Self { game_name, tag_line })
	}

	/// Returns the game name (before `#`).
	pub fn game_name(&self) -> &str {
		&self.game_name
	}

	/// Returns the tag line (after `#`).
	pub fn tag_line(&self) -> &str {
		&self.tag_line
	}
}
impl Debug for RiotId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "RiotId({}#{})", self.game_name, self.tag_line)
	}
}
impl Display for RiotId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "{}#{}", self.game_name, self.tag_line)
	}
}
impl FromStr for RiotId {
	type Err = IdentifierError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let (name, tag) = s
			.split_once('#')
			.ok_or_else(|| IdentifierError::MalformedRiotId { value: s.to_owned() })?;

		if tag.contains('#') {
			return Err(IdentifierError::MalformedRiotId { value: s.to_owned() });
		}

		Self::new(name, tag)
	}
}

fn validate_view(kind: &'static str, view: &str) -> Result<(), IdentifierError> {
	if view.is_empty() {
		return Err(IdentifierError::Empty { kind });
	}
	if view.chars().any(char::is_whitespace) {
		return Err(IdentifierError::ContainsWhitespace { kind });
	}
	if view.len() > IDENTIFIER_MAX_LEN {
		return Err(IdentifierError::TooLong { kind, max: IDENTIFIER_MAX_LEN });
	}

	Ok(())
}

fn validate_riot_part(kind: &'static str, view: &str) -> Result<(), IdentifierError> {
	if view.trim().is_empty() {
		return Err(IdentifierError::Empty { kind });
	}
	if view.trim() != view {
		return Err(IdentifierError::ContainsWhitespace { kind });
	}
	if view.contains('#') {
		return Err(IdentifierError::MalformedRiotId { value: view.to_owned() });
	}
	if view.chars().count() > IDENTIFIER_MAX_LEN {
		return Err(IdentifierError::TooLong { kind, max: IDENTIFIER_MAX_LEN });
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn identifiers_trim_and_validate() {
		assert!(MatchId::new(" KR_1").is_err(), "Leading whitespace must be rejected.");
		assert!(MatchId::new("KR_1 ").is_err(), "Trailing whitespace must be rejected.");

		let id = MatchId::new("KR_7312345678").expect("Match fixture should be considered valid.");

		assert_eq!(id.as_ref(), "KR_7312345678");
		assert_eq!(format!("{id:?}"), "Match(KR_7312345678)");
		assert!(Puuid::new("").is_err());
	}

	#[test]
	fn serde_round_trip_enforces_validation() {
		let id: MatchId =
			serde_json::from_str("\"KR_42\"").expect("Match id should deserialize successfully.");

		assert_eq!(id.as_ref(), "KR_42");
		assert!(serde_json::from_str::<Puuid>("\"with space\"").is_err());
	}

	#[test]
	fn length_limit_applies() {
		let exact = "a".repeat(IDENTIFIER_MAX_LEN);

		Puuid::new(&exact).expect("Exact length should succeed.");

		assert!(Puuid::new("a".repeat(IDENTIFIER_MAX_LEN + 1)).is_err());
	}

	#[test]
	fn riot_id_parses_names_with_spaces() {
		let id: RiotId = "Hide on bush#KR1".parse().expect("Riot ID fixture should parse.");

		assert_eq!(id.game_name(), "Hide on bush");
		assert_eq!(id.tag_line(), "KR1");
		assert_eq!(id.to_string(), "Hide on bush#KR1");

		let korean: RiotId = "구수어빵#KR1".parse().expect("Non-ASCII names should parse.");

		assert_eq!(korean.game_name(), "구수어빵");
	}

	#[test]
	fn riot_id_rejects_malformed_input() {
		assert!(matches!(
			"no-tag".parse::<RiotId>(),
			Err(IdentifierError::MalformedRiotId { .. })
		));
		assert!("a#b#c".parse::<RiotId>().is_err());
		assert!(matches!("#KR1".parse::<RiotId>(), Err(IdentifierError::Empty { .. })));
		assert!(matches!(
			" name#KR1".parse::<RiotId>(),
			Err(IdentifierError::ContainsWhitespace { .. })
		));
	}
}
