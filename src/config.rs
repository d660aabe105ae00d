//! Client configuration: routing endpoints, rate-limit buckets, retry policy, cache
//! sizing, and the optional per-request timeout.
//!
//! Configuration is an explicit value handed to the client at construction; nothing is
//! read from global state except the API key, which lives in [`crate::auth`].

/// Builder API for assembling client configurations.
pub mod builder;

pub use builder::*;

// std
use std::net::IpAddr;
// crates.io
use url::Host;
// self
use crate::{
	_prelude::*,
	cache::CacheConfig,
	error::ConfigError,
	ratelimit::BucketConfig,
	retry::RetryPolicy,
};

/// Regional routing host used for account-v1 and match-v5.
pub const DEFAULT_REGIONAL_ENDPOINT: &str = "https://asia.api.riotgames.com";
/// Platform routing host used for per-server APIs.
pub const DEFAULT_PLATFORM_ENDPOINT: &str = "https://kr.api.riotgames.com";

/// Base URLs for the two Riot routing classes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingEndpoints {
	/// Regional cluster (`asia`, `americas`, `europe`, `sea`).
	pub regional: Url,
	/// Platform server (`kr`, `na1`, `euw1`, ...).
	pub platform: Url,
}

/// Validated configuration consumed by [`RiotClient`](crate::client::RiotClient).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
	/// Routing base URLs.
	pub endpoints: RoutingEndpoints,
	/// Buckets that must all grant a token before a request goes out.
	pub rate_limits: Vec<BucketConfig>,
	/// Retry budget and backoff schedule.
	pub retry: RetryPolicy,
	/// Response cache sizing.
	pub cache: CacheConfig,
	/// Optional per-request timeout; `None` leaves the transport default.
	pub request_timeout: Option<Duration>,
}
impl ClientConfig {
	/// Creates a builder seeded with the Riot defaults.
	pub fn builder() -> ClientConfigBuilder {
		ClientConfigBuilder::new()
	}

	/// Riot's development-key application limits: 20 requests per second and 100 per
	/// two minutes.
	pub fn riot_default_rate_limits() -> Vec<BucketConfig> {
		vec![
			BucketConfig::per_interval(20, Duration::seconds(1)),
			BucketConfig::per_interval(100, Duration::seconds(120)),
		]
	}

	/// Validates every section of the configuration.
	pub fn validate(&self) -> Result<(), ConfigError> {
		validate_endpoint("regional", &self.endpoints.regional)?;
		validate_endpoint("platform", &self.endpoints.platform)?;

		if self.rate_limits.is_empty() {
			return Err(ConfigError::NoRateLimitBuckets);
		}

		self.rate_limits.iter().try_for_each(BucketConfig::validate)?;
		self.retry.validate()?;
		self.cache.validate()?;

		if self.request_timeout.is_some_and(|timeout| !timeout.is_positive()) {
			return Err(ConfigError::NonPositiveTimeout);
		}

		Ok(())
	}
}

fn validate_endpoint(endpoint: &'static str, url: &Url) -> Result<(), ConfigError> {
	if url.cannot_be_a_base() {
		return Err(ConfigError::CannotBeABase { endpoint, url: url.to_string() });
	}

	match url.scheme() {
		"https" => Ok(()),
		"http" if is_loopback(url) => Ok(()),
		_ => Err(ConfigError::InsecureEndpoint { endpoint, url: url.to_string() }),
	}
}

fn is_loopback(url: &Url) -> bool {
	match url.host() {
		Some(Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
		Some(Host::Ipv4(ip)) => IpAddr::V4(ip).is_loopback(),
		Some(Host::Ipv6(ip)) => IpAddr::V6(ip).is_loopback(),
		None => false,
	}
}
