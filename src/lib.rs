//! Riot match-data collector for ban/pick analysis: rate-limited API access, an LRU response
//! cache, and normalization of match payloads into typed records the dashboard can query.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod model;
pub mod normalize;
pub mod obs;
pub mod ratelimit;
pub mod retry;
pub mod stats;
#[cfg(feature = "reqwest")]
#[doc(hidden)]
pub mod _preludet {
	//! Convenience re-exports and fixtures shared by integration tests and demos.

	pub use crate::_prelude::*;

	// self
	use crate::{
		auth::Credential,
		client::RiotClient,
		config::ClientConfig,
		http::ReqwestHttpClient,
		ratelimit::BucketConfig,
		retry::RetryPolicy,
	};

	/// Client type alias used by reqwest-backed integration tests.
	pub type ReqwestTestClient = RiotClient<ReqwestHttpClient>;

	/// API key attached to every request issued by test clients.
	pub const TEST_API_KEY: &str = "RGAPI-00000000-test-key";

	/// Builds a reqwest HTTP client suitable for talking to `httpmock` servers.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Configuration that routes both regional and platform calls to `base_url` with
	/// millisecond backoffs and a roomy rate limit.
	pub fn test_config(base_url: &str) -> ClientConfig {
		let base = Url::parse(base_url).expect("Failed to parse mock server base URL.");

		ClientConfig::builder()
			.regional_endpoint(base.clone())
			.platform_endpoint(base)
			.rate_limit(BucketConfig::per_interval(100, Duration::seconds(1)))
			.retry(RetryPolicy {
				max_attempts: 3,
				base_delay: Duration::milliseconds(1),
				max_delay: Duration::milliseconds(5),
				jitter: false,
			})
			.build()
			.expect("Failed to build test client configuration.")
	}

	/// Constructs a [`RiotClient`] that talks to the mock server at `base_url`.
	pub fn build_reqwest_test_client(base_url: &str) -> ReqwestTestClient {
		RiotClient::with_http_client(
			test_config(base_url),
			Credential::new(TEST_API_KEY),
			test_reqwest_http_client(),
		)
		.expect("Failed to build reqwest-backed test client.")
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
		time::Duration as StdDuration,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::Mutex;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
