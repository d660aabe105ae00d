//! Collects a player's champion usage against a local mock of the Riot API, then saves
//! the response cache so a later run can start warm.

// std
use std::env;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use serde_json::json;
use url::Url;
// self
use banpick_collector::{
	auth::{Credential, RiotId},
	client::ReqwestRiotClient,
	config::ClientConfig,
	http::ReqwestHttpClient,
	model::QueueType,
	reqwest::Client,
	stats,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/riot/account/v1/accounts/by-riot-id/Faker/KR1");
			then.status(200).json_body(json!({ "puuid": "demo-puuid" }));
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/lol/match/v5/matches/by-puuid/demo-puuid/ids");
			then.status(200).json_body(json!(["KR_1", "KR_2"]));
		})
		.await;

	for (id, champion, name, win) in [("KR_1", 64, "LeeSin", true), ("KR_2", 238, "Zed", false)] {
		let participants = (0..10)
			.map(|index| {
				json!({
					"puuid": if index == 0 { "demo-puuid".to_owned() } else { format!("p{index}") },
					"championId": if index == 0 { champion } else { 500 + index },
					"championName": if index == 0 { name.to_owned() } else { format!("C{index}") },
					"teamId": if index < 5 { 100 } else { 200 },
					"win": (index < 5) == win,
				})
			})
			.collect::<Vec<_>>();
		let body = json!({
			"metadata": { "matchId": id },
			"info": {
				"queueId": 420,
				"gameCreation": 1_700_000_000_000_i64,
				"participants": participants,
				"teams": [{ "teamId": 100, "bans": [{ "championId": 157, "pickTurn": 1 }] }],
			},
		});

		server
			.mock_async(move |when, then| {
				when.method(GET).path(format!("/lol/match/v5/matches/{id}"));
				then.status(200).json_body(body);
			})
			.await;
	}

	let base = Url::parse(&server.base_url())?;
	let config = ClientConfig::builder()
		.regional_endpoint(base.clone())
		.platform_endpoint(base)
		.build()?;
	let http_client = ReqwestHttpClient::with_client(Client::builder().build()?);
	let client =
		ReqwestRiotClient::with_http_client(config, Credential::new("RGAPI-demo"), http_client)?;
	let riot_id = "Faker#KR1".parse::<RiotId>()?;
	let puuid = client.account_by_riot_id(&riot_id).await?;
	let report = client.champion_usage(&puuid, &[QueueType::RankedSolo], 10).await?;

	for row in &report.usage {
		println!(
			"{:<8} games={} wins={} losses={} win_rate={:.2}",
			row.champion_name, row.games, row.wins, row.losses, row.win_rate
		);
	}
	for (champion, bans) in stats::ban_frequency(&report.matches) {
		println!("banned {champion}: {bans}");
	}

	let snapshot = env::temp_dir().join("banpick-collector-demo-cache.json");

	client.cache.save_snapshot(&snapshot)?;

	println!("Saved {} cached responses to {}.", client.cache.len(), snapshot.display());

	Ok(())
}
