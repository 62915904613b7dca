//! Blocking HTTP GET over a shared async client.
//!
//! reqwest runs on a small shared tokio runtime; callers stay synchronous,
//! which is all a strictly sequential pipeline needs.

use std::sync::LazyLock;
use std::time::Duration;

/// Connect timeout
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Failure to obtain a usable response for one request
#[derive(Debug)]
pub enum FetchError {
    /// Transport failure or non-success status
    Http {
        status: Option<u16>,
        message: String,
    },
    /// Body arrived but could not be decoded
    Decode(String),
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Http {
                status: Some(s),
                message,
            } => write!(f, "HTTP {s}: {message}"),
            Self::Http {
                status: None,
                message,
            } => write!(f, "HTTP error: {message}"),
            Self::Decode(msg) => write!(f, "decode error: {msg}"),
        }
    }
}

impl std::error::Error for FetchError {}

impl FetchError {
    /// Build from a reqwest error, dropping the URL.
    ///
    /// Request URLs carry the API key as a query parameter and must not end
    /// up in log output.
    pub fn from_reqwest(e: reqwest::Error) -> Self {
        let status = e.status().map(|s| s.as_u16());
        Self::Http {
            status,
            message: e.without_url().to_string(),
        }
    }
}

static SHARED_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(|| {
    reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .user_agent(concat!("pubwatch/", env!("CARGO_PKG_VERSION")))
        .build()
        .expect("failed to build HTTP client")
});

/// Get shared HTTP client.
pub fn http_client() -> &'static reqwest::Client {
    &SHARED_CLIENT
}

/// Shared tokio runtime for HTTP operations.
///
/// Multi-thread flavor so `Handle::block_on` can drive IO and timers.
pub static SHARED_RUNTIME: LazyLock<tokio::runtime::Runtime> = LazyLock::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .expect("failed to build tokio runtime")
});

/// GET `url` with `query` appended and return the body text.
///
/// Non-2xx statuses are errors. `timeout` bounds the whole request,
/// body included.
pub fn get_text(
    url: &str,
    query: &[(&str, &str)],
    timeout: Duration,
) -> Result<String, FetchError> {
    SHARED_RUNTIME.handle().block_on(async {
        let response = http_client()
            .get(url)
            .query(query)
            .timeout(timeout)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(FetchError::from_reqwest)?;

        response.text().await.map_err(FetchError::from_reqwest)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_http_with_status() {
        let err = FetchError::Http {
            status: Some(404),
            message: "not found".to_string(),
        };
        assert_eq!(format!("{err}"), "HTTP 404: not found");
    }

    #[test]
    fn display_http_without_status() {
        let err = FetchError::Http {
            status: None,
            message: "connection refused".to_string(),
        };
        assert_eq!(format!("{err}"), "HTTP error: connection refused");
    }

    #[test]
    fn display_decode() {
        let err = FetchError::Decode("expected value at line 1".to_string());
        assert!(format!("{err}").starts_with("decode error:"));
    }

    #[test]
    fn unreachable_host_is_http_error() {
        // Port 9 on localhost is almost never listening
        let err = get_text("http://127.0.0.1:9/", &[], Duration::from_secs(2)).unwrap_err();
        assert!(matches!(err, FetchError::Http { status: None, .. }));
    }
}
