//! Typed Riot API operations built on [`RiotClient::fetch`].

// self
use crate::{
	_prelude::*,
	auth::{MatchId, Puuid, RiotId},
	client::{Endpoint, RiotClient, Routing},
	http::ApiHttpClient,
	model::{MatchRecord, QueueType},
	normalize,
	obs::{self, Operation, RequestOutcome, RequestSpan},
	stats::{self, ChampionUsageReport, SkippedFetch},
};

/// Paging and filtering for [`RiotClient::match_ids`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchIdQuery {
	/// Offset into the player's history, newest first.
	pub start: u32,
	/// Number of ids to return; clamped to `1..=100` when sent.
	pub count: u32,
	/// Restricts the listing to one queue.
	pub queue: Option<QueueType>,
}
impl MatchIdQuery {
	/// Largest page Riot serves.
	pub const MAX_COUNT: u32 = 100;

	/// First page of 20 ids across all queues.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the offset.
	pub fn with_start(mut self, start: u32) -> Self {
		self.start = start;

		self
	}

	/// Sets the page size.
	pub fn with_count(mut self, count: u32) -> Self {
		self.count = count;

		self
	}

	/// Restricts the listing to `queue`.
	pub fn with_queue(mut self, queue: QueueType) -> Self {
		self.queue = Some(queue);

		self
	}

	fn params(&self) -> Vec<(&'static str, String)> {
		let mut params = vec![
			("start", self.start.to_string()),
			("count", self.count.clamp(1, Self::MAX_COUNT).to_string()),
		];

		if let Some(queue) = self.queue {
			params.push(("queue", queue.id().to_string()));
		}

		params
	}
}
impl Default for MatchIdQuery {
	fn default() -> Self {
		Self { start: 0, count: 20, queue: None }
	}
}

impl<C> RiotClient<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// Resolves a Riot ID (`name#tag`) to the player's PUUID.
	pub async fn account_by_riot_id(&self, riot_id: &RiotId) -> Result<Puuid> {
		let segments = [
			"riot",
			"account",
			"v1",
			"accounts",
			"by-riot-id",
			riot_id.game_name(),
			riot_id.tag_line(),
		];
		let endpoint =
			Endpoint::new(Routing::Regional, segments).with_operation(Operation::Account);
		let raw = self.fetch(&endpoint, &[]).await?;

		Ok(normalize::normalize_account(&raw)?)
	}

	/// Lists a player's match ids, newest first.
	pub async fn match_ids(&self, puuid: &Puuid, query: &MatchIdQuery) -> Result<Vec<MatchId>> {
		let endpoint = Endpoint::new(
			Routing::Regional,
			["lol", "match", "v5", "matches", "by-puuid", puuid.as_ref(), "ids"],
		)
		.with_operation(Operation::MatchIds);
		let params = query.params();
		let raw = self.fetch(&endpoint, &params).await?;

		Ok(normalize::normalize_match_ids(&raw)?)
	}

	/// Fetches and normalizes one match.
	pub async fn match_record(&self, match_id: &MatchId) -> Result<MatchRecord> {
		let endpoint =
			Endpoint::new(Routing::Regional, ["lol", "match", "v5", "matches", match_id.as_ref()])
				.with_operation(Operation::MatchDetail);
		let raw = self.fetch(&endpoint, &[]).await?;

		Ok(normalize::normalize(&raw)?)
	}

	/// Aggregates the champions a player used over their recent matches in `queues`.
	///
	/// Up to `max_matches_per_queue` ids are listed per queue and each match is fetched
	/// in turn; a limit of zero returns an empty report without any request. A listing or
	/// match that fails with an upstream or payload error is recorded in
	/// [`ChampionUsageReport::skipped`] and the aggregation moves on; configuration and
	/// credential errors abort the whole call. Matches the player did not take part in are
	/// ignored.
	pub async fn champion_usage(
		&self,
		puuid: &Puuid,
		queues: &[QueueType],
		max_matches_per_queue: u32,
	) -> Result<ChampionUsageReport> {
		const OPERATION: Operation = Operation::ChampionUsage;

		let span = RequestSpan::new(OPERATION, "champion_usage");

		obs::record_request_outcome(OPERATION, RequestOutcome::Attempt);

		let result = span
			.instrument(async move {
				let mut matches = Vec::new();
				let mut skipped = Vec::new();

				if max_matches_per_queue == 0 {
					return Ok(ChampionUsageReport { usage: Vec::new(), matches, skipped });
				}

				for &queue in queues {
					let query =
						MatchIdQuery::new().with_count(max_matches_per_queue).with_queue(queue);
					let ids = match self.match_ids(puuid, &query).await {
						Ok(ids) => ids,
						Err(error) if is_skippable(&error) => {
							skip(&mut skipped, SkippedFetch { queue, match_id: None, error });

							continue;
						},
						Err(error) => return Err(error),
					};

					for match_id in ids {
						match self.match_record(&match_id).await {
							Ok(record) => matches.push(record),
							Err(error) if is_skippable(&error) => skip(
								&mut skipped,
								SkippedFetch { queue, match_id: Some(match_id), error },
							),
							Err(error) => return Err(error),
						}
					}
				}

				let usage = stats::summarise(&matches, puuid);

				Ok(ChampionUsageReport { usage, matches, skipped })
			})
			.await;

		match &result {
			Ok(_) => obs::record_request_outcome(OPERATION, RequestOutcome::Success),
			Err(_) => obs::record_request_outcome(OPERATION, RequestOutcome::Failure),
		}

		result
	}
}

fn is_skippable(error: &Error) -> bool {
	matches!(
		error,
		Error::RateLimitExceeded { .. }
			| Error::UpstreamUnavailable { .. }
			| Error::InvalidRequest { .. }
			| Error::MalformedPayload(_)
	)
}

fn skip(skipped: &mut Vec<SkippedFetch>, entry: SkippedFetch) {
	obs::log_skip(&entry, &entry.error);
	obs::record_request_outcome(Operation::ChampionUsage, RequestOutcome::Skipped);

	skipped.push(entry);
}
