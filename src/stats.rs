//! Champion usage aggregation over normalized match records.

// self
use crate::{
	_prelude::*,
	auth::{MatchId, Puuid},
	model::{ChampionId, MatchRecord, QueueType},
};

/// Per-champion totals for one player.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChampionUsage {
	/// Champion identifier.
	pub champion_id: ChampionId,
	/// Champion display name.
	pub champion_name: String,
	/// Games played on the champion.
	pub games: u32,
	/// Games won.
	pub wins: u32,
	/// Games lost.
	pub losses: u32,
	/// `wins / games`, rounded to two decimals.
	pub win_rate: f64,
}

/// Result of [`RiotClient::champion_usage`](crate::client::RiotClient::champion_usage).
#[derive(Debug)]
pub struct ChampionUsageReport {
	/// Usage rows sorted by games then win rate, both descending.
	pub usage: Vec<ChampionUsage>,
	/// Matches that were fetched and normalized.
	pub matches: Vec<MatchRecord>,
	/// Fetches that failed and were left out of the totals.
	pub skipped: Vec<SkippedFetch>,
}

/// A queue listing or match fetch left out of an aggregation.
#[derive(Debug)]
pub struct SkippedFetch {
	/// Queue being collected.
	pub queue: QueueType,
	/// Match that failed; `None` when the id listing itself failed.
	pub match_id: Option<MatchId>,
	/// Why the fetch failed.
	pub error: Error,
}
impl Display for SkippedFetch {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match &self.match_id {
			Some(match_id) => write!(f, "match {match_id} ({})", self.queue),
			None => write!(f, "match list for {}", self.queue),
		}
	}
}

#[derive(Debug, Default)]
struct UsageTally {
	champion_name: String,
	games: u32,
	wins: u32,
}

/// Tallies the champions `puuid` played across `records`.
///
/// Records the player does not appear in are ignored. Rows are ordered by games played,
/// then win rate, both descending; remaining ties fall back to champion name so the
/// output is deterministic.
pub fn summarise<'a, I>(records: I, puuid: &Puuid) -> Vec<ChampionUsage>
where
	I: IntoIterator<Item = &'a MatchRecord>,
{
	let mut tallies = BTreeMap::<ChampionId, UsageTally>::new();

	for participant in records.into_iter().filter_map(|record| record.participant(puuid)) {
		let tally = tallies.entry(participant.champion_id).or_default();

		if tally.champion_name.is_empty() {
			tally.champion_name.clone_from(&participant.champion_name);
		}

		tally.games += 1;
		tally.wins += u32::from(participant.win);
	}

	let mut usage = tallies
		.into_iter()
		.map(|(champion_id, tally)| ChampionUsage {
			champion_id,
			champion_name: tally.champion_name,
			games: tally.games,
			wins: tally.wins,
			losses: tally.games - tally.wins,
			win_rate: round_rate(tally.wins, tally.games),
		})
		.collect::<Vec<_>>();

	usage.sort_by(|a, b| {
		b.games
			.cmp(&a.games)
			.then_with(|| b.win_rate.total_cmp(&a.win_rate))
			.then_with(|| a.champion_name.cmp(&b.champion_name))
	});

	usage
}

/// Counts how often each champion was banned across `records`, most banned first.
pub fn ban_frequency<'a, I>(records: I) -> Vec<(ChampionId, u32)>
where
	I: IntoIterator<Item = &'a MatchRecord>,
{
	let mut counts = BTreeMap::<ChampionId, u32>::new();

	for champion in records.into_iter().flat_map(|record| record.bans()) {
		*counts.entry(champion).or_default() += 1;
	}

	let mut frequency = counts.into_iter().collect::<Vec<_>>();

	frequency.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

	frequency
}

fn round_rate(wins: u32, games: u32) -> f64 {
	if games == 0 {
		return 0.;
	}

	(f64::from(wins) / f64::from(games) * 100.).round() / 100.
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::model::ParticipantRecord;

	fn puuid(value: &str) -> Puuid {
		Puuid::new(value).expect("Puuid fixture should be valid.")
	}

	fn record(id: &str, player_champion: (u32, &str), win: bool, bans: &[u32]) -> MatchRecord {
		let participants = (0..10)
			.map(|index| ParticipantRecord {
				puuid: if index == 0 { puuid("me") } else { puuid(&format!("other-{index}")) },
				champion_id: if index == 0 {
					ChampionId(player_champion.0)
				} else {
					ChampionId(1_000 + index)
				},
				champion_name: if index == 0 {
					player_champion.1.to_owned()
				} else {
					format!("Other{index}")
				},
				team_id: if index < 5 { 100 } else { 200 },
				bans: bans.get(index as usize).map(|id| vec![ChampionId(*id)]).unwrap_or_default(),
				win: (index < 5) == win,
			})
			.collect();

		MatchRecord {
			match_id: MatchId::new(id).expect("Match fixture should be valid."),
			queue: QueueType::RankedSolo,
			game_creation: OffsetDateTime::UNIX_EPOCH,
			participants,
		}
	}

	#[test]
	fn summarise_orders_by_games_then_win_rate() {
		let records = [
			record("KR_1", (64, "LeeSin"), true, &[]),
			record("KR_2", (64, "LeeSin"), false, &[]),
			record("KR_3", (64, "LeeSin"), false, &[]),
			record("KR_4", (238, "Zed"), true, &[]),
			record("KR_5", (238, "Zed"), true, &[]),
			record("KR_6", (157, "Yasuo"), false, &[]),
			record("KR_7", (103, "Ahri"), false, &[]),
		];
		let usage = summarise(&records, &puuid("me"));
		let names = usage.iter().map(|row| row.champion_name.as_str()).collect::<Vec<_>>();

		assert_eq!(names, ["LeeSin", "Zed", "Ahri", "Yasuo"]);
		assert_eq!(usage[0].games, 3);
		assert_eq!(usage[0].wins, 1);
		assert_eq!(usage[0].losses, 2);
		assert_eq!(usage[0].win_rate, 0.33);
		assert_eq!(usage[1].win_rate, 1.);
		assert_eq!(usage[2].win_rate, 0.);
	}

	#[test]
	fn summarise_ignores_matches_without_the_player() {
		let records = [record("KR_1", (64, "LeeSin"), true, &[])];

		assert!(summarise(&records, &puuid("stranger")).is_empty());
	}

	#[test]
	fn ban_frequency_counts_across_matches() {
		let records = [
			record("KR_1", (64, "LeeSin"), true, &[555, 350, 875]),
			record("KR_2", (64, "LeeSin"), true, &[350]),
		];
		let frequency = ban_frequency(&records);

		assert_eq!(frequency[0], (ChampionId(350), 2));
		assert_eq!(frequency[1], (ChampionId(555), 1));
		assert_eq!(frequency[2], (ChampionId(875), 1));
	}
}
