//! Endpoint description, request signatures, and the cache → limiter → retry pipeline.

// crates.io
use tokio::time::{self, Instant};
// self
use crate::{
	_prelude::*,
	client::RiotClient,
	error::{ConfigError, MalformedPayloadError},
	http::{ApiHttpClient, ApiRequest, ApiResponse, RIOT_TOKEN_HEADER},
	model::RawPayload,
	obs::{self, Operation, RequestOutcome, RequestSpan},
	retry::StatusClass,
};

const BODY_PREVIEW_CHARS: usize = 256;

/// Which Riot routing base URL an endpoint lives under.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Routing {
	/// Regional cluster (account-v1, match-v5).
	Regional,
	/// Platform server (summoner-v4, league-v4, ...).
	Platform,
}
impl Routing {
	/// Returns a stable label used in signatures and errors.
	pub const fn as_str(self) -> &'static str {
		match self {
			Routing::Regional => "regional",
			Routing::Platform => "platform",
		}
	}
}
impl Display for Routing {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Path under a routing base URL, held as raw (unencoded) segments.
///
/// Segments are percent-encoded when the URL is built, so Riot IDs with spaces or
/// non-ASCII characters can be passed as-is.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Endpoint {
	/// Routing class.
	pub routing: Routing,
	/// Path segments.
	pub segments: Vec<String>,
	/// Operation label used for spans and metrics.
	pub operation: Operation,
}
impl Endpoint {
	/// Creates an endpoint labeled [`Operation::Fetch`].
	pub fn new<I>(routing: Routing, segments: I) -> Self
	where
		I: IntoIterator,
		I::Item: Into<String>,
	{
		Self {
			routing,
			segments: segments.into_iter().map(Into::into).collect(),
			operation: Operation::Fetch,
		}
	}

	/// Overrides the operation label.
	pub fn with_operation(mut self, operation: Operation) -> Self {
		self.operation = operation;

		self
	}

	/// Resolves the endpoint against `base` and appends `params` as the query string.
	pub fn url(&self, base: &Url, params: &[(&str, String)]) -> Result<Url, ConfigError> {
		let mut url = base.clone();

		url.path_segments_mut()
			.map_err(|_| ConfigError::CannotBeABase {
				endpoint: self.routing.as_str(),
				url: base.to_string(),
			})?
			.pop_if_empty()
			.extend(&self.segments);

		if !params.is_empty() {
			url.query_pairs_mut().extend_pairs(params);
		}

		Ok(url)
	}

	/// Cache key for this endpoint and `params`.
	///
	/// The key combines routing, path, and the parameters sorted by name and value, so
	/// parameter order never matters. It never includes the API key.
	pub fn signature(&self, params: &[(&str, String)]) -> String {
		let mut sorted = params.iter().collect::<Vec<_>>();

		sorted.sort();

		let mut signature = format!("{}:/{}", self.routing, self.segments.join("/"));

		for (idx, (name, value)) in sorted.into_iter().enumerate() {
			signature.push(if idx == 0 { '?' } else { '&' });
			signature.push_str(name);
			signature.push('=');
			signature.push_str(value);
		}

		signature
	}
}

/// Transient failure observed on one attempt.
#[derive(Debug)]
enum AttemptFailure {
	RateLimited { retry_after: Option<Duration> },
	Server { status: u16, reason: String },
	Transport { reason: String },
}
impl AttemptFailure {
	fn status(&self) -> Option<u16> {
		match self {
			Self::RateLimited { .. } => Some(429),
			Self::Server { status, .. } => Some(*status),
			Self::Transport { .. } => None,
		}
	}

	fn retry_after(&self) -> Option<Duration> {
		match self {
			Self::RateLimited { retry_after } => *retry_after,
			_ => None,
		}
	}

	fn into_error(self, attempts: u32) -> Error {
		match self {
			Self::RateLimited { retry_after } => Error::RateLimitExceeded { attempts, retry_after },
			Self::Server { status, reason } =>
				Error::UpstreamUnavailable { attempts, status: Some(status), reason },
			Self::Transport { reason } =>
				Error::UpstreamUnavailable { attempts, status: None, reason },
		}
	}
}

impl<C> RiotClient<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// Issues a GET for `endpoint` and returns the JSON payload.
	///
	/// A fresh cached payload is returned without touching the network. Otherwise the
	/// call waits for a rate-limit token, sends the request with the API key, and retries
	/// 429, 5xx, and transport failures with exponential backoff until the attempt budget
	/// runs out. Other statuses fail immediately with [`Error::InvalidRequest`]; a 2xx body
	/// that is not JSON fails with [`Error::MalformedPayload`]. Concurrent callers asking
	/// for the same signature share a single upstream fetch.
	pub async fn fetch(
		&self,
		endpoint: &Endpoint,
		params: &[(&str, String)],
	) -> Result<RawPayload> {
		let operation = endpoint.operation;
		let span = RequestSpan::new(operation, "fetch");

		obs::record_request_outcome(operation, RequestOutcome::Attempt);

		let result = span
			.instrument(async move {
				let signature = endpoint.signature(params);

				if let Some(hit) = self.cache.get(&signature) {
					obs::record_request_outcome(operation, RequestOutcome::CacheHit);

					return Ok(hit);
				}

				let guard = self.fetch_guard(&signature);
				let result = {
					let _singleflight = guard.lock().await;

					match self.cache.get(&signature) {
						Some(hit) => {
							obs::record_request_outcome(operation, RequestOutcome::CacheHit);

							Ok(hit)
						},
						None => self.fetch_uncached(endpoint, params, &signature).await,
					}
				};

				self.release_fetch_guard(&signature, guard);

				result
			})
			.await;

		match &result {
			Ok(_) => obs::record_request_outcome(operation, RequestOutcome::Success),
			Err(_) => obs::record_request_outcome(operation, RequestOutcome::Failure),
		}

		result
	}

	async fn fetch_uncached(
		&self,
		endpoint: &Endpoint,
		params: &[(&str, String)],
		signature: &str,
	) -> Result<RawPayload> {
		let base = match endpoint.routing {
			Routing::Regional => &self.config.endpoints.regional,
			Routing::Platform => &self.config.endpoints.platform,
		};
		let url = endpoint.url(base, params)?;
		let key = self.credential.key()?;
		let timeout = self.config.request_timeout.map(Duration::unsigned_abs);
		let policy = self.config.retry;
		let mut attempts = 0;

		loop {
			let waited = self.limiter.acquire().await;

			obs::record_rate_limit_wait(endpoint.routing, waited);

			attempts += 1;

			let request = ApiRequest::new(url.clone())
				.with_header(RIOT_TOKEN_HEADER, key)
				.with_timeout(timeout);
			let failure = match self.http_client.get(request).await {
				Ok(response) => match StatusClass::of(response.metadata.status) {
					StatusClass::Success => {
						let payload = parse_payload(&response)?;

						self.cache.put(signature, payload.clone());

						return Ok(payload);
					},
					StatusClass::Rejected =>
						return Err(Error::InvalidRequest {
							status: response.metadata.status,
							reason: response.body_preview(BODY_PREVIEW_CHARS),
						}),
					StatusClass::RateLimited => {
						let retry_after = response.metadata.retry_after;

						if let Some(hint) = retry_after.filter(|hint| hint.is_positive()) {
							self.limiter.penalize(Instant::now() + hint.unsigned_abs());
						}

						AttemptFailure::RateLimited { retry_after }
					},
					StatusClass::ServerError => AttemptFailure::Server {
						status: response.metadata.status,
						reason: format!(
							"HTTP {}: {}",
							response.metadata.status,
							response.body_preview(BODY_PREVIEW_CHARS)
						),
					},
				},
				Err(e) => AttemptFailure::Transport { reason: e.to_string() },
			};

			if !policy.allows_retry(attempts) {
				return Err(failure.into_error(attempts));
			}

			let delay = policy.delay_for(attempts, failure.retry_after());

			obs::log_retry(attempts, failure.status(), delay);
			obs::record_request_outcome(endpoint.operation, RequestOutcome::Retry);
			time::sleep(delay).await;
		}
	}
}

fn parse_payload(response: &ApiResponse) -> Result<RawPayload, MalformedPayloadError> {
	RawPayload::from_slice(&response.body)
		.map_err(|source| MalformedPayloadError::not_json(source, &response.body))
}
