//! Transport primitives for Riot API calls.
//!
//! The module exposes [`ApiHttpClient`] alongside [`ApiRequest`] and [`ApiResponse`] so
//! downstream crates can plug in custom HTTP stacks (or fakes in tests) without touching
//! the retry, rate-limit, and cache layers. Transports only perform a single GET and
//! report the status, the `Retry-After` hint, and the raw body; classification happens in
//! the client.

// std
#[cfg(feature = "reqwest")] use std::ops::Deref;
// crates.io
#[cfg(feature = "reqwest")] use reqwest::header::{HeaderMap, RETRY_AFTER};
#[cfg(feature = "reqwest")] use time::format_description::well_known::Rfc2822;
// self
use crate::_prelude::*;

/// Header carrying the API key on every request.
pub const RIOT_TOKEN_HEADER: &str = "X-Riot-Token";

/// Boxed future returned by [`ApiHttpClient::get`].
pub type HttpFuture<'a, E> = Pin<Box<dyn Future<Output = Result<ApiResponse, E>> + 'a + Send>>;

/// Abstraction over HTTP transports capable of issuing Riot API GET requests.
///
/// Implementations must be `Send + Sync + 'static` so one transport can be shared by
/// every in-flight request, and the returned future must be `Send` so callers can
/// spawn collector work onto multi-threaded runtimes. A transport error means no HTTP
/// status was observed (connect failure, timeout, truncated body); the client treats
/// it as transient.
pub trait ApiHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// Performs a single GET request.
	fn get(&self, request: ApiRequest) -> HttpFuture<'_, Self::TransportError>;
}

/// Outbound GET request handed to an [`ApiHttpClient`].
#[derive(Clone)]
pub struct ApiRequest {
	/// Fully resolved URL, query string included.
	pub url: Url,
	/// Headers to attach, in order.
	pub headers: Vec<(&'static str, String)>,
	/// Optional per-request timeout.
	pub timeout: Option<StdDuration>,
}
impl ApiRequest {
	/// Creates a request without headers or timeout.
	pub fn new(url: Url) -> Self {
		Self { url, headers: Vec::new(), timeout: None }
	}

	/// Appends a header.
	pub fn with_header(mut self, name: &'static str, value: impl Into<String>) -> Self {
		self.headers.push((name, value.into()));

		self
	}

	/// Sets the per-request timeout.
	pub fn with_timeout(mut self, timeout: Option<StdDuration>) -> Self {
		self.timeout = timeout;

		self
	}

	/// Looks up a header value by case-insensitive name.
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers
			.iter()
			.find(|(key, _)| key.eq_ignore_ascii_case(name))
			.map(|(_, value)| value.as_str())
	}
}
impl Debug for ApiRequest {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let names = self.headers.iter().map(|(name, _)| *name).collect::<Vec<_>>();

		f.debug_struct("ApiRequest")
			.field("url", &self.url.as_str())
			.field("headers", &names)
			.field("timeout", &self.timeout)
			.finish()
	}
}

/// Status information captured from a response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResponseMetadata {
	/// HTTP status code.
	pub status: u16,
	/// Retry-After hint expressed as a relative duration.
	pub retry_after: Option<Duration>,
}

/// Completed HTTP exchange.
#[derive(Clone, Debug)]
pub struct ApiResponse {
	/// Status and retry hint.
	pub metadata: ResponseMetadata,
	/// Raw response body.
	pub body: Vec<u8>,
}
impl ApiResponse {
	/// Builds a response with no retry hint.
	pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
		Self { metadata: ResponseMetadata { status, retry_after: None }, body: body.into() }
	}

	/// Attaches a retry hint.
	pub fn with_retry_after(mut self, retry_after: Duration) -> Self {
		self.metadata.retry_after = Some(retry_after);

		self
	}

	/// Returns up to `limit` characters of the body for error messages.
	pub fn body_preview(&self, limit: usize) -> String {
		let text = String::from_utf8_lossy(&self.body);
		let mut preview = text.chars().take(limit).collect::<String>();

		if text.chars().count() > limit {
			preview.push('…');
		}

		preview
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl ApiHttpClient for ReqwestHttpClient {
	type TransportError = ReqwestError;

	fn get(&self, request: ApiRequest) -> HttpFuture<'_, Self::TransportError> {
		Box::pin(async move {
			let mut builder = self.0.get(request.url);

			for (name, value) in &request.headers {
				builder = builder.header(*name, value);
			}
			if let Some(timeout) = request.timeout {
				builder = builder.timeout(timeout);
			}

			let response = builder.send().await?;
			let status = response.status().as_u16();
			let retry_after = parse_retry_after(response.headers());
			let body = response.bytes().await?.to_vec();

			Ok(ApiResponse { metadata: ResponseMetadata { status, retry_after }, body })
		})
	}
}

#[cfg(feature = "reqwest")]
fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
	let value = headers.get(RETRY_AFTER)?;
	let raw = value.to_str().ok()?.trim();

	if let Ok(secs) = raw.parse::<u32>() {
		return Some(Duration::seconds(i64::from(secs)));
	}
	if let Ok(moment) = OffsetDateTime::parse(raw, &Rfc2822) {
		let delta = moment - OffsetDateTime::now_utc();

		if delta.is_positive() {
			return Some(delta);
		}
	}

	None
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn request_debug_hides_header_values() {
		let request = ApiRequest::new(
			Url::parse("https://kr.api.riotgames.com/lol/match/v5/matches/KR_1")
				.expect("Request URL fixture should parse."),
		)
		.with_header(RIOT_TOKEN_HEADER, "RGAPI-secret");
		let rendered = format!("{request:?}");

		assert!(rendered.contains(RIOT_TOKEN_HEADER));
		assert!(!rendered.contains("RGAPI-secret"));
		assert_eq!(request.header("x-riot-token"), Some("RGAPI-secret"));
	}

	#[test]
	fn body_preview_truncates_long_bodies() {
		let response = ApiResponse::new(404, "x".repeat(300));
		let preview = response.body_preview(10);

		assert_eq!(preview.chars().count(), 11);
		assert!(preview.ends_with('…'));
		assert_eq!(ApiResponse::new(400, "short").body_preview(10), "short");
	}

	#[cfg(feature = "reqwest")]
	#[test]
	fn retry_after_accepts_seconds_and_dates() {
		let mut headers = HeaderMap::new();

		assert_eq!(parse_retry_after(&headers), None);

		headers.insert(RETRY_AFTER, "7".parse().expect("Header value fixture should parse."));

		assert_eq!(parse_retry_after(&headers), Some(Duration::seconds(7)));

		let future = (OffsetDateTime::now_utc() + Duration::minutes(5))
			.format(&Rfc2822)
			.expect("RFC 2822 formatting should succeed.");

		headers.insert(RETRY_AFTER, future.parse().expect("Date header fixture should parse."));

		let hint = parse_retry_after(&headers).expect("Future date should yield a hint.");

		assert!(hint > Duration::minutes(4) && hint <= Duration::minutes(5));

		headers.insert(
			RETRY_AFTER,
			"Mon, 01 Jan 2001 00:00:00 +0000".parse().expect("Past date fixture should parse."),
		);

		assert_eq!(parse_retry_after(&headers), None, "Past dates carry no hint.");

		headers.insert(RETRY_AFTER, "soon".parse().expect("Garbage fixture should parse."));

		assert_eq!(parse_retry_after(&headers), None);
	}
}
