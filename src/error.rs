//! Collector-level error types shared across the client, cache, and normalizer.

// self
use crate::{_prelude::*, model::RawPayload};

/// Collector-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical collector error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem, including a missing API key.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Cache snapshot failure.
	#[error("{0}")]
	Cache(
		#[from]
		#[source]
		crate::cache::CacheError,
	),
	/// Caller supplied an identifier that fails validation.
	#[error(transparent)]
	InvalidIdentifier(#[from] crate::auth::IdentifierError),
	/// Upstream payload could not be mapped into the entity model.
	#[error(transparent)]
	MalformedPayload(#[from] MalformedPayloadError),

	/// Upstream kept answering HTTP 429 until the retry budget ran out.
	#[error("Riot API rate limit still exceeded after {attempts} attempts.")]
	RateLimitExceeded {
		/// Number of attempts made, including the first.
		attempts: u32,
		/// Retry-After hint from the last response, if supplied.
		retry_after: Option<Duration>,
	},
	/// Upstream returned 5xx or could not be reached until the retry budget ran out.
	#[error("Riot API unavailable after {attempts} attempts: {reason}.")]
	UpstreamUnavailable {
		/// Number of attempts made, including the first.
		attempts: u32,
		/// HTTP status of the last response; `None` for network failures.
		status: Option<u16>,
		/// Human-readable description of the last failure.
		reason: String,
	},
	/// Upstream rejected the request as malformed; retrying cannot help.
	#[error("Riot API rejected the request with HTTP {status}: {reason}.")]
	InvalidRequest {
		/// HTTP status code returned by the API.
		status: u16,
		/// Preview of the response body.
		reason: String,
	},
}
impl Error {
	/// Returns `true` when the caller may retry the same request later.
	pub fn is_retryable(&self) -> bool {
		matches!(self, Self::RateLimitExceeded { .. } | Self::UpstreamUnavailable { .. })
	}

	/// Returns `true` for the missing-credential startup failure.
	pub fn is_missing_credential(&self) -> bool {
		matches!(self, Self::Config(ConfigError::MissingCredential { .. }))
	}
}

/// Configuration and validation failures raised by the collector.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// No API key was configured.
	#[error("Riot API key is missing; set the {variable} environment variable.")]
	MissingCredential {
		/// Environment variable expected to hold the key.
		variable: &'static str,
	},
	/// Endpoint could not be parsed.
	#[error("The {endpoint} endpoint is not a valid URL.")]
	InvalidEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Endpoint must use HTTPS unless it points at a loopback host.
	#[error("The {endpoint} endpoint must use HTTPS: {url}.")]
	InsecureEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// Endpoint cannot carry path segments (e.g. `mailto:` URLs).
	#[error("The {endpoint} endpoint cannot be used as a base URL: {url}.")]
	CannotBeABase {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},

	/// Rate limiting was configured without any bucket.
	#[error("At least one rate limit bucket must be configured.")]
	NoRateLimitBuckets,
	/// A bucket holds no tokens.
	#[error("Rate limit bucket capacity must be positive.")]
	ZeroBucketCapacity,
	/// A bucket never refills.
	#[error("Rate limit bucket refill amount must be positive.")]
	ZeroBucketRefill,
	/// A bucket refill interval is zero or negative.
	#[error("Rate limit bucket refill interval must be positive.")]
	NonPositiveRefillInterval,
	/// Retry policy forbids even the first attempt.
	#[error("Retry policy must allow at least one attempt.")]
	ZeroAttempts,
	/// Backoff bounds are negative or inverted.
	#[error("Retry backoff delays must be non-negative with base_delay <= max_delay.")]
	InvalidBackoff,
	/// Cache cannot hold a single entry.
	#[error("Cache capacity must be positive.")]
	ZeroCacheCapacity,
	/// Cache TTL is zero or negative.
	#[error("Cache TTL must be positive.")]
	NonPositiveCacheTtl,
	/// Per-request timeout is zero or negative.
	#[error("Request timeout must be positive.")]
	NonPositiveTimeout,
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Upstream payload rejected by the normalizer, kept alongside the offending document.
#[derive(Debug, ThisError)]
#[error("Malformed payload: {defect}.")]
pub struct MalformedPayloadError {
	/// What was wrong with the payload.
	#[source]
	pub defect: PayloadDefect,
	/// Offending payload for diagnostics.
	pub payload: Box<RawPayload>,
}
impl MalformedPayloadError {
	/// Pairs a defect with the payload that exhibited it.
	pub fn new(defect: PayloadDefect, payload: RawPayload) -> Self {
		Self { defect, payload: Box::new(payload) }
	}

	/// Builds the error for a 2xx body that is not JSON; the text is kept as a JSON string.
	pub fn not_json(source: serde_json::Error, body: &[u8]) -> Self {
		let text = String::from_utf8_lossy(body).into_owned();

		let payload = RawPayload::from(serde_json::Value::String(text));

		Self::new(PayloadDefect::NotJson { source }, payload)
	}
}

/// Individual defects detected while normalizing payloads.
#[derive(Debug, ThisError)]
pub enum PayloadDefect {
	/// Response body is not valid JSON.
	#[error("response body is not valid JSON")]
	NotJson {
		/// Parser failure.
		#[source]
		source: serde_json::Error,
	},
	/// Required field missing or of the wrong type.
	#[error("field `{path}` is missing or invalid")]
	Field {
		/// JSON path of the failing field.
		path: String,
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Identifier field failed validation.
	#[error("field `{path}` holds an invalid identifier")]
	Identifier {
		/// JSON path of the failing field.
		path: &'static str,
		/// Validation failure.
		#[source]
		source: crate::auth::IdentifierError,
	},
	/// Queue id outside the supported lookup table.
	#[error("queue {queue_id} is not supported")]
	UnsupportedQueue {
		/// Raw queue id from the payload.
		queue_id: u16,
	},
	/// Participant list length disagrees with the queue's team size.
	#[error("queue {queue_id} expects {expected} participants but the payload has {actual}")]
	ParticipantCount {
		/// Raw queue id from the payload.
		queue_id: u16,
		/// Participant count required by the queue.
		expected: usize,
		/// Participant count found in the payload.
		actual: usize,
	},
	/// Champion id is negative for a participant that must have picked one.
	#[error("participant {index} has invalid champion id {champion_id}")]
	ChampionId {
		/// Zero-based participant index.
		index: usize,
		/// Raw champion id from the payload.
		champion_id: i32,
	},
	/// Game creation timestamp is outside the representable range.
	#[error("game creation timestamp {millis} is out of range")]
	Timestamp {
		/// Raw millisecond timestamp from the payload.
		millis: i64,
	},
}
