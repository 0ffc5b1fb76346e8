//! HTTP retry helper for dataset downloads.
//!
//! The dataset portal occasionally times out or answers with a 5xx while it
//! regenerates its datastore dump. [`send_bytes`] retries those with
//! exponential backoff and gives up immediately on other client errors.

use std::time::Duration;

use crate::SourceError;

/// Maximum number of retry attempts for transient HTTP errors.
///
/// With exponential backoff (2s, 4s, 8s, 16s, 32s) the total wait before
/// giving up is 62 seconds.
const MAX_RETRIES: u32 = 5;

/// Maximum number of full re-fetch attempts when the body stream breaks
/// part way through.
const MAX_BODY_RETRIES: u32 = 2;

/// Sends an HTTP request and returns the full response body.
///
/// The `build_request` closure is called on each attempt to construct a
/// fresh [`reqwest::RequestBuilder`] (builders are consumed by `.send()`).
///
/// # Errors
///
/// Returns [`SourceError`] if the request fails after all retries, the
/// server returns a non-retryable status code, or the body cannot be read
/// after all body retries.
#[allow(clippy::future_not_send)]
pub async fn send_bytes<F>(build_request: F) -> Result<Vec<u8>, SourceError>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let mut body_attempt = 0;

    loop {
        let response = send_inner(&build_request, MAX_RETRIES).await?;
        let url = response.url().to_string();
        let status = response.status();

        match response.bytes().await {
            Ok(bytes) => return Ok(bytes.to_vec()),
            Err(e) if body_attempt < MAX_BODY_RETRIES => {
                body_attempt += 1;
                let delay = backoff(body_attempt);
                log::warn!(
                    "Body read failed (body retry {body_attempt}/{MAX_BODY_RETRIES}), \
                     re-fetching in {delay:?}...\n  \
                     url: {url}\n  \
                     status: {status}\n  \
                     error: {e}"
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => {
                log::error!(
                    "Body read failed after {MAX_BODY_RETRIES} retries, giving up.\n  \
                     url: {url}\n  \
                     status: {status}\n  \
                     error: {e}"
                );
                return Err(SourceError::Http(e));
            }
        }
    }
}

/// Sends the request built by `build_request`, retrying on transient
/// errors up to `max_retries` times. Returns the first 2xx/3xx response.
#[allow(clippy::future_not_send)]
async fn send_inner<F>(
    build_request: &F,
    max_retries: u32,
) -> Result<reqwest::Response, SourceError>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let mut attempt = 0;

    loop {
        if attempt > 0 {
            let delay = backoff(attempt);
            log::warn!("  retry {attempt}/{max_retries} in {delay:?}...");
            tokio::time::sleep(delay).await;
        }

        match build_request().send().await {
            Err(e) if is_transient(&e) && attempt < max_retries => {
                log::warn!("  transient error: {e}");
            }
            Err(e) => return Err(SourceError::Http(e)),
            Ok(response) => {
                let status = response.status();
                match classify_status(status) {
                    StatusClass::Ok => return Ok(response),
                    StatusClass::Retryable if attempt < max_retries => {
                        log::warn!("  HTTP {status}");
                    }
                    StatusClass::Retryable => {
                        return Err(SourceError::Download {
                            message: format!("HTTP {status} after {max_retries} retries"),
                        });
                    }
                    StatusClass::Permanent => {
                        return Err(SourceError::Download {
                            message: format!("HTTP {status}"),
                        });
                    }
                }
            }
        }

        attempt += 1;
    }
}

/// How a response status should be handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatusClass {
    Ok,
    Retryable,
    Permanent,
}

/// 429 and 5xx are retried; other 4xx are permanent.
fn classify_status(status: reqwest::StatusCode) -> StatusClass {
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        StatusClass::Retryable
    } else if status.is_client_error() {
        StatusClass::Permanent
    } else {
        StatusClass::Ok
    }
}

/// 2s, 4s, 8s, ...
const fn backoff(attempt: u32) -> Duration {
    Duration::from_secs(1u64 << attempt)
}

/// Returns `true` if the error is likely transient and worth retrying.
fn is_transient(e: &reqwest::Error) -> bool {
    e.is_timeout() || e.is_connect() || e.is_body() || e.is_decode() || e.is_request()
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn classifies_statuses() {
        assert_eq!(classify_status(StatusCode::OK), StatusClass::Ok);
        assert_eq!(classify_status(StatusCode::FOUND), StatusClass::Ok);
        assert_eq!(
            classify_status(StatusCode::TOO_MANY_REQUESTS),
            StatusClass::Retryable
        );
        assert_eq!(
            classify_status(StatusCode::BAD_GATEWAY),
            StatusClass::Retryable
        );
        assert_eq!(
            classify_status(StatusCode::NOT_FOUND),
            StatusClass::Permanent
        );
    }

    #[test]
    fn backoff_doubles() {
        assert_eq!(backoff(1), Duration::from_secs(2));
        assert_eq!(backoff(2), Duration::from_secs(4));
        assert_eq!(backoff(5), Duration::from_secs(32));
    }
}
