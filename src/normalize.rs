//! Pure mapping from raw match-v5 / account-v1 payloads into the entity model.
//!
//! Every function here is deterministic and side-effect free: the same payload always
//! yields the same record or the same [`MalformedPayloadError`]. Wire structs mirror only
//! the fields the collector reads, so unrelated upstream additions never break parsing.

// self
use crate::{
	_prelude::*,
	auth::{IdentifierError, MatchId, Puuid},
	error::{MalformedPayloadError, PayloadDefect},
	model::{ChampionId, MatchRecord, ParticipantRecord, QueueType, RawPayload},
};

#[derive(Debug, Deserialize)]
struct WireMatch {
	metadata: WireMetadata,
	info: WireInfo,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireMetadata {
	match_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireInfo {
	queue_id: u16,
	game_creation: i64,
	participants: Vec<WireParticipant>,
	#[serde(default)]
	teams: Vec<WireTeam>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireParticipant {
	puuid: String,
	champion_id: i32,
	champion_name: String,
	team_id: u16,
	win: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireTeam {
	#[serde(default)]
	bans: Vec<WireBan>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireBan {
	champion_id: i32,
	pick_turn: usize,
}

#[derive(Debug, Deserialize)]
struct WireAccount {
	puuid: String,
}

/// Maps a match-detail payload into a [`MatchRecord`].
///
/// Fails when a required field is absent or mistyped, the queue id is outside
/// [`QueueType`], or the participant count disagrees with the queue. Bans are read from
/// `info.teams[].bans[]`; a ban with `pickTurn = n` belongs to the n-th participant and
/// empty ban slots (`championId <= 0`) are dropped.
pub fn normalize(raw: &RawPayload) -> Result<MatchRecord, MalformedPayloadError> {
	let wire: WireMatch = decode(raw)?;
	let reject = |defect| MalformedPayloadError::new(defect, raw.clone());
	let queue_id = wire.info.queue_id;
	let queue = QueueType::from_id(queue_id)
		.ok_or_else(|| reject(PayloadDefect::UnsupportedQueue { queue_id }))?;
	let expected = queue.expected_participants();
	let actual = wire.info.participants.len();

	if actual != expected {
		return Err(reject(PayloadDefect::ParticipantCount { queue_id, expected, actual }));
	}

	let match_id = MatchId::new(&wire.metadata.match_id)
		.map_err(|source| reject(identifier_defect("metadata.matchId", source)))?;
	let millis = wire.info.game_creation;
	let game_creation = OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000)
		.map_err(|_| reject(PayloadDefect::Timestamp { millis }))?;
	let mut bans = vec![Vec::new(); actual];
	let mut team_bans =
		wire.info.teams.iter().flat_map(|team| team.bans.iter()).collect::<Vec<_>>();

	team_bans.sort_by_key(|ban| ban.pick_turn);

	for ban in team_bans {
		let Ok(champion) = u32::try_from(ban.champion_id) else { continue };

		if champion == 0 {
			continue;
		}
		if let Some(slot) = ban.pick_turn.checked_sub(1).and_then(|index| bans.get_mut(index)) {
			slot.push(ChampionId(champion));
		}
	}

	let mut participants = Vec::with_capacity(actual);

	for (index, (participant, bans)) in wire.info.participants.into_iter().zip(bans).enumerate() {
		let champion_id = u32::try_from(participant.champion_id).map_err(|_| {
			reject(PayloadDefect::ChampionId { index, champion_id: participant.champion_id })
		})?;
		let puuid = Puuid::new(&participant.puuid)
			.map_err(|source| reject(identifier_defect("info.participants[].puuid", source)))?;

		participants.push(ParticipantRecord {
			puuid,
			champion_id: ChampionId(champion_id),
			champion_name: participant.champion_name,
			team_id: participant.team_id,
			bans,
			win: participant.win,
		});
	}

	Ok(MatchRecord { match_id, queue, game_creation, participants })
}

/// Maps a match-id listing payload (a JSON array of strings).
pub fn normalize_match_ids(raw: &RawPayload) -> Result<Vec<MatchId>, MalformedPayloadError> {
	let ids: Vec<String> = decode(raw)?;

	ids.iter()
		.map(|id| {
			MatchId::new(id).map_err(|source| {
				MalformedPayloadError::new(identifier_defect("[]", source), raw.clone())
			})
		})
		.collect()
}

/// Extracts the PUUID from an account-v1 payload.
pub fn normalize_account(raw: &RawPayload) -> Result<Puuid, MalformedPayloadError> {
	let account: WireAccount = decode(raw)?;

	Puuid::new(&account.puuid).map_err(|source| {
		MalformedPayloadError::new(identifier_defect("puuid", source), raw.clone())
	})
}

fn decode<T>(raw: &RawPayload) -> Result<T, MalformedPayloadError>
where
	T: for<'de> Deserialize<'de>,
{
	serde_path_to_error::deserialize(raw.as_value()).map_err(|source| {
		let path = source.path().to_string();

		MalformedPayloadError::new(PayloadDefect::Field { path, source }, raw.clone())
	})
}

fn identifier_defect(path: &'static str, source: IdentifierError) -> PayloadDefect {
	PayloadDefect::Identifier { path, source }
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::{Value, json};
	// self
	use super::*;

	fn participant(index: usize, champion_id: i32, win: bool) -> Value {
		let team_id = if index < 5 { 100 } else { 200 };

		json!({
			"puuid": format!("puuid-{index}"),
			"championId": champion_id,
			"championName": format!("Champ{champion_id}"),
			"teamId": team_id,
			"win": win,
			"kills": 3,
		})
	}

	fn match_payload(queue_id: u16, participants: usize) -> RawPayload {
		let participants = (0..participants)
			.map(|index| participant(index, 100 + index as i32, index < 5))
			.collect::<Vec<_>>();

		RawPayload::from(json!({
			"metadata": { "matchId": "KR_7000000001", "participants": [] },
			"info": {
				"queueId": queue_id,
				"gameCreation": 1_700_000_000_000_i64,
				"participants": participants,
				"teams": [
					{ "teamId": 100, "win": true, "bans": [
						{ "championId": 64, "pickTurn": 1 },
						{ "championId": -1, "pickTurn": 2 },
						{ "championId": 238, "pickTurn": 3 },
					]},
					{ "teamId": 200, "win": false, "bans": [
						{ "championId": 157, "pickTurn": 6 },
					]},
				],
			},
		}))
	}

	#[test]
	fn normalizes_a_ranked_match() {
		let record = normalize(&match_payload(420, 10)).expect("Valid payload should normalize.");

		assert_eq!(record.match_id.as_ref(), "KR_7000000001");
		assert_eq!(record.queue, QueueType::RankedSolo);
		assert_eq!(record.game_creation.unix_timestamp(), 1_700_000_000);
		assert_eq!(record.participants.len(), 10);
		assert_eq!(record.participants[0].bans, vec![ChampionId(64)]);
		assert!(record.participants[1].bans.is_empty(), "Empty ban slots must be dropped.");
		assert_eq!(record.participants[2].bans, vec![ChampionId(238)]);
		assert_eq!(record.participants[5].bans, vec![ChampionId(157)]);
		assert_eq!(record.participants[7].champion_id, ChampionId(107));
		assert_eq!(record.participants[7].champion_name, "Champ107");
		assert_eq!(record.winning_team(), Some(100));
		assert_eq!(record.bans().count(), 3);
	}

	#[test]
	fn rejects_participant_count_mismatch() {
		let raw = match_payload(450, 9);
		let err = normalize(&raw).expect_err("Nine ARAM participants must be rejected.");

		assert!(matches!(
			err.defect,
			PayloadDefect::ParticipantCount { queue_id: 450, expected: 10, actual: 9 }
		));
		assert_eq!(*err.payload, raw, "The offending payload must be kept.");
	}

	#[test]
	fn rejects_unsupported_queue() {
		let err = normalize(&match_payload(1700, 10)).expect_err("Arena must be rejected.");

		assert!(matches!(err.defect, PayloadDefect::UnsupportedQueue { queue_id: 1700 }));
	}

	#[test]
	fn reports_path_of_missing_field() {
		let mut value = match_payload(420, 10).into_value();

		value["info"]["participants"][3]
			.as_object_mut()
			.expect("Participant fixture should be an object.")
			.remove("win");

		let err = normalize(&RawPayload::from(value)).expect_err("Missing win must be rejected.");

		match err.defect {
			PayloadDefect::Field { path, .. } => assert!(path.starts_with("info.participants[3]")),
			other => panic!("Unexpected defect: {other:?}."),
		}
	}

	#[test]
	fn rejects_negative_champion_for_participant() {
		let mut value = match_payload(440, 10).into_value();

		value["info"]["participants"][0]["championId"] = json!(-1);

		let err = normalize(&RawPayload::from(value)).expect_err("Negative champion must fail.");

		assert!(matches!(err.defect, PayloadDefect::ChampionId { index: 0, champion_id: -1 }));
	}

	#[test]
	fn normalization_is_deterministic() {
		let raw = match_payload(430, 10);

		assert_eq!(
			normalize(&raw).expect("First pass should succeed."),
			normalize(&raw).expect("Second pass should succeed."),
		);
	}

	#[test]
	fn normalizes_match_ids_and_accounts() {
		let ids = normalize_match_ids(&RawPayload::from(json!(["KR_1", "KR_2"])))
			.expect("Match id listing should normalize.");

		assert_eq!(ids.iter().map(|id| id.as_ref()).collect::<Vec<_>>(), ["KR_1", "KR_2"]);
		assert!(normalize_match_ids(&RawPayload::from(json!({ "ids": [] }))).is_err());

		let puuid = normalize_account(&RawPayload::from(
			json!({ "puuid": "abc-123", "gameName": "Faker", "tagLine": "KR1" }),
		))
		.expect("Account payload should normalize.");

		assert_eq!(puuid.as_ref(), "abc-123");
		assert!(normalize_account(&RawPayload::from(json!({ "puuid": "" }))).is_err());
	}
}
