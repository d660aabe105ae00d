//! Rate-limited, retrying, caching Riot API client.
//!
//! [`RiotClient`] owns the HTTP transport, the validated configuration, the response
//! cache, and the rate limiter so individual operations only describe *what* to fetch.
//! Every call goes through [`RiotClient::fetch`], which consults the cache, waits for a
//! rate-limit token, retries transient failures, and stores successful payloads.

mod request;
mod riot;

pub use request::*;
pub use riot::*;

// self
use crate::{
	_prelude::*,
	auth::Credential,
	cache::ResponseCache,
	config::ClientConfig,
	http::ApiHttpClient,
	ratelimit::{RateLimitPolicy, RateLimiter},
};
#[cfg(feature = "reqwest")] use crate::{error::ConfigError, http::ReqwestHttpClient};

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport.
pub type ReqwestRiotClient = RiotClient<ReqwestHttpClient>;

/// Riot API client bound to one API key and one configuration.
///
/// Cloning is cheap and clones share the transport, cache, limiter, and in-flight
/// request guards.
pub struct RiotClient<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// HTTP transport used for every outbound request.
	pub http_client: Arc<C>,
	/// Validated configuration.
	pub config: Arc<ClientConfig>,
	/// Response cache consulted before the network.
	pub cache: Arc<ResponseCache>,
	/// Limiter consulted before every outbound attempt.
	pub limiter: Arc<dyn RateLimitPolicy>,
	credential: Credential,
	fetch_guards: Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>,
}
impl<C> RiotClient<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// Creates a client over a caller-provided transport.
	///
	/// Fails with [`ConfigError::MissingCredential`](crate::error::ConfigError) before
	/// any network activity when `credential` holds no key, and with another
	/// [`ConfigError`](crate::error::ConfigError) when `config` is invalid.
	pub fn with_http_client(
		config: ClientConfig,
		credential: Credential,
		http_client: impl Into<Arc<C>>,
	) -> Result<Self> {
		credential.key()?;
		config.validate()?;

		let limiter = Arc::new(RateLimiter::new(&config.rate_limits)?);
		let cache = Arc::new(ResponseCache::new(config.cache)?);

		Ok(Self {
			http_client: http_client.into(),
			config: Arc::new(config),
			cache,
			limiter,
			credential,
			fetch_guards: Default::default(),
		})
	}

	/// Replaces the rate limiter, e.g. to share one budget across several clients.
	pub fn with_rate_limiter(mut self, limiter: Arc<dyn RateLimitPolicy>) -> Self {
		self.limiter = limiter;

		self
	}

	/// Replaces the response cache, e.g. with one restored from a snapshot.
	pub fn with_cache(mut self, cache: Arc<ResponseCache>) -> Self {
		self.cache = cache;

		self
	}

	/// Returns the singleflight guard for a request signature, creating it on demand.
	fn fetch_guard(&self, signature: &str) -> Arc<AsyncMutex<()>> {
		let mut guards = self.fetch_guards.lock();

		guards
			.entry(signature.to_owned())
			.or_insert_with(|| Arc::new(AsyncMutex::new(())))
			.clone()
	}

	/// Drops the guard entry once no other caller holds or awaits it.
	fn release_fetch_guard(&self, signature: &str, guard: Arc<AsyncMutex<()>>) {
		let mut guards = self.fetch_guards.lock();

		if Arc::strong_count(&guard) == 2 {
			guards.remove(signature);
		}
	}
}
#[cfg(feature = "reqwest")]
impl RiotClient<ReqwestHttpClient> {
	/// Creates a client with its own reqwest transport.
	pub fn new(config: ClientConfig, credential: Credential) -> Result<Self> {
		let client = ReqwestClient::builder()
			.user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
			.build()
			.map_err(ConfigError::from)?;

		Self::with_http_client(config, credential, ReqwestHttpClient::with_client(client))
	}

	/// Creates a client with default configuration and the key from `RIOT_API_KEY`.
	pub fn from_env() -> Result<Self> {
		Self::new(ClientConfig::builder().build()?, Credential::from_env()?)
	}
}
impl<C> Clone for RiotClient<C>
where
	C: ?Sized + ApiHttpClient,
{
	fn clone(&self) -> Self {
		Self {
			http_client: self.http_client.clone(),
			config: self.config.clone(),
			cache: self.cache.clone(),
			limiter: self.limiter.clone(),
			credential: self.credential.clone(),
			fetch_guards: self.fetch_guards.clone(),
		}
	}
}
impl<C> Debug for RiotClient<C>
where
	C: ?Sized + ApiHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RiotClient")
			.field("config", &self.config)
			.field("credential", &self.credential)
			.field("cached_entries", &self.cache.len())
			.finish()
	}
}
