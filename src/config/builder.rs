// self
use crate::{
	_prelude::*,
	cache::CacheConfig,
	config::{ClientConfig, DEFAULT_PLATFORM_ENDPOINT, DEFAULT_REGIONAL_ENDPOINT, RoutingEndpoints},
	error::ConfigError,
	ratelimit::BucketConfig,
	retry::RetryPolicy,
};

/// Builder for [`ClientConfig`] values.
///
/// Unset sections fall back to the Riot defaults: Korean routing, the development-key
/// rate limits, five attempts with 500 ms doubling backoff, and a 512-entry cache with a
/// ten-minute TTL.
#[derive(Clone, Debug, Default)]
pub struct ClientConfigBuilder {
	/// Regional routing override.
	pub regional_endpoint: Option<Url>,
	/// Platform routing override.
	pub platform_endpoint: Option<Url>,
	/// Bucket override; `None` keeps [`ClientConfig::riot_default_rate_limits`].
	pub rate_limits: Option<Vec<BucketConfig>>,
	/// Retry policy.
	pub retry: RetryPolicy,
	/// Cache sizing.
	pub cache: CacheConfig,
	/// Optional per-request timeout.
	pub request_timeout: Option<Duration>,
}
impl ClientConfigBuilder {
	/// Creates a builder with every section at its default.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the regional routing base URL.
	pub fn regional_endpoint(mut self, url: Url) -> Self {
		self.regional_endpoint = Some(url);

		self
	}

	/// Sets the platform routing base URL.
	pub fn platform_endpoint(mut self, url: Url) -> Self {
		self.platform_endpoint = Some(url);

		self
	}

	/// Adds a bucket; the first call replaces the default buckets.
	pub fn rate_limit(mut self, bucket: BucketConfig) -> Self {
		self.rate_limits.get_or_insert_with(Vec::new).push(bucket);

		self
	}

	/// Replaces every bucket.
	pub fn rate_limits<I>(mut self, buckets: I) -> Self
	where
		I: IntoIterator<Item = BucketConfig>,
	{
		self.rate_limits = Some(buckets.into_iter().collect());

		self
	}

	/// Overrides the retry policy.
	pub fn retry(mut self, retry: RetryPolicy) -> Self {
		self.retry = retry;

		self
	}

	/// Overrides the cache sizing.
	pub fn cache(mut self, cache: CacheConfig) -> Self {
		self.cache = cache;

		self
	}

	/// Sets a per-request timeout.
	pub fn request_timeout(mut self, timeout: Duration) -> Self {
		self.request_timeout = Some(timeout);

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<ClientConfig, ConfigError> {
		let regional = match self.regional_endpoint {
			Some(url) => url,
			None => default_endpoint("regional", DEFAULT_REGIONAL_ENDPOINT)?,
		};
		let platform = match self.platform_endpoint {
			Some(url) => url,
			None => default_endpoint("platform", DEFAULT_PLATFORM_ENDPOINT)?,
		};
		let config = ClientConfig {
			endpoints: RoutingEndpoints { regional, platform },
			rate_limits: self.rate_limits.unwrap_or_else(ClientConfig::riot_default_rate_limits),
			retry: self.retry,
			cache: self.cache,
			request_timeout: self.request_timeout,
		};

		config.validate()?;

		Ok(config)
	}
}

fn default_endpoint(endpoint: &'static str, raw: &str) -> Result<Url, ConfigError> {
	Url::parse(raw).map_err(|source| ConfigError::InvalidEndpoint { endpoint, source })
}
