//! Internal entity model produced by the normalizer and consumed by the dashboard.

// self
use crate::{
	_prelude::*,
	auth::{MatchId, Puuid},
};

/// Numeric champion identifier as published by Riot's static data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChampionId(pub u32);
impl Display for ChampionId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "{}", self.0)
	}
}

/// Game modes the collector understands, keyed by Riot's numeric queue id.
///
/// The table is fixed at compile time; ids outside it cannot be represented and
/// payloads carrying them are rejected during normalization.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum QueueType {
	/// 5v5 Ranked Solo/Duo on Summoner's Rift.
	RankedSolo,
	/// 5v5 Normal Blind Pick on Summoner's Rift.
	NormalBlind,
	/// 5v5 Ranked Flex on Summoner's Rift.
	RankedFlex,
	/// 5v5 ARAM on Howling Abyss.
	Aram,
}
impl QueueType {
	/// Every supported queue, in ascending id order.
	pub const ALL: [Self; 4] = [Self::RankedSolo, Self::NormalBlind, Self::RankedFlex, Self::Aram];

	/// Returns Riot's numeric id for the queue.
	pub const fn id(self) -> u16 {
		match self {
			Self::RankedSolo => 420,
			Self::NormalBlind => 430,
			Self::RankedFlex => 440,
			Self::Aram => 450,
		}
	}

	/// Looks up a queue by numeric id.
	pub const fn from_id(id: u16) -> Option<Self> {
		match id {
			420 => Some(Self::RankedSolo),
			430 => Some(Self::NormalBlind),
			440 => Some(Self::RankedFlex),
			450 => Some(Self::Aram),
			_ => None,
		}
	}

	/// Returns a stable, human-readable label.
	pub const fn label(self) -> &'static str {
		match self {
			Self::RankedSolo => "Ranked Solo/Duo",
			Self::NormalBlind => "Normal Blind",
			Self::RankedFlex => "Ranked Flex",
			Self::Aram => "ARAM",
		}
	}

	/// Number of participants a completed match in this queue must list.
	pub const fn expected_participants(self) -> usize {
		match self {
			Self::RankedSolo | Self::NormalBlind | Self::RankedFlex | Self::Aram => 10,
		}
	}
}
impl Display for QueueType {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.label())
	}
}
impl From<QueueType> for u16 {
	fn from(value: QueueType) -> Self {
		value.id()
	}
}
impl TryFrom<u16> for QueueType {
	type Error = UnknownQueue;

	fn try_from(value: u16) -> Result<Self, Self::Error> {
		Self::from_id(value).ok_or(UnknownQueue(value))
	}
}

/// Error returned when a numeric queue id is outside the lookup table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ThisError)]
#[error("Queue id {0} is not supported.")]
pub struct UnknownQueue(pub u16);

/// Raw JSON document returned by the API, kept verbatim for caching and diagnostics.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawPayload(serde_json::Value);
impl RawPayload {
	/// Parses a response body.
	pub fn from_slice(body: &[u8]) -> Result<Self, serde_json::Error> {
		serde_json::from_slice(body).map(Self)
	}

	/// Borrows the underlying JSON value.
	pub fn as_value(&self) -> &serde_json::Value {
		&self.0
	}

	/// Consumes the payload and returns the JSON value.
	pub fn into_value(self) -> serde_json::Value {
		self.0
	}
}
impl From<serde_json::Value> for RawPayload {
	fn from(value: serde_json::Value) -> Self {
		Self(value)
	}
}

/// One completed game, immutable once normalized.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
	/// Unique match identifier.
	pub match_id: MatchId,
	/// Queue the match was played in.
	pub queue: QueueType,
	/// Instant the game was created.
	pub game_creation: OffsetDateTime,
	/// Participants in payload order; the length always equals
	/// [`QueueType::expected_participants`].
	pub participants: Vec<ParticipantRecord>,
}
impl MatchRecord {
	/// Finds the participant record for a player, if they played in this match.
	pub fn participant(&self, puuid: &Puuid) -> Option<&ParticipantRecord> {
		self.participants.iter().find(|p| &p.puuid == puuid)
	}

	/// Returns the team id flagged as the winner, if any participant won.
	pub fn winning_team(&self) -> Option<u16> {
		self.participants.iter().find(|p| p.win).map(|p| p.team_id)
	}

	/// Iterates every ban in the match, ordered by pick turn.
	pub fn bans(&self) -> impl Iterator<Item = ChampionId> + '_ {
		self.participants.iter().flat_map(|p| p.bans.iter().copied())
	}
}

/// One player's data within a match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantRecord {
	/// Player identifier.
	pub puuid: Puuid,
	/// Champion the player locked in.
	pub champion_id: ChampionId,
	/// Champion display name.
	pub champion_name: String,
	/// Team the player belonged to (100 = blue, 200 = red).
	pub team_id: u16,
	/// Champions this player banned, in pick-turn order.
	pub bans: Vec<ChampionId>,
	/// Whether the player's team won.
	pub win: bool,
}
