//! HTTP fetching with a bounded retry budget

use crate::config::RetryPolicy;
use crate::error::{Error, Result};
use crate::retry::with_retry;

/// HTTP GET with retry-on-transport-failure
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Clone, Debug)]
pub struct Fetcher {
    client: reqwest::Client,
    retry: RetryPolicy,
}

impl Fetcher {
    /// Create a fetcher with the given retry policy
    ///
    /// No request timeout is configured: the portal can be extremely slow and
    /// the pipeline has no cancellation mechanism, so a hung transfer simply
    /// occupies its worker.
    pub fn new(retry: RetryPolicy) -> Self {
        Self {
            client: reqwest::Client::new(),
            retry,
        }
    }

    /// Fetch `url` and return the raw response body
    ///
    /// Only transport-level failures (connect, timeout, body read) are
    /// retried. The HTTP status is never inspected: a 4xx/5xx body is
    /// returned as-is and surfaces downstream as empty extraction results.
    /// Once the budget is exhausted the last transport error is returned as
    /// [`Error::Fetch`].
    pub async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let body = with_retry(&self.retry, || async move {
            let response = self.client.get(url).send().await?;
            response.bytes().await
        })
        .await
        .map_err(|source| Error::Fetch {
            url: url.to_string(),
            attempts: self.retry.max_attempts,
            source,
        })?;

        tracing::debug!(url, bytes = body.len(), "fetched");
        Ok(body.to_vec())
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn zero_delay(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            delay: Duration::ZERO,
        }
    }

    #[tokio::test]
    async fn fetch_returns_the_body_on_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/doc"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>hola</html>"))
            .mount(&server)
            .await;

        let fetcher = Fetcher::new(zero_delay(5));
        let body = fetcher.fetch(&format!("{}/doc", server.uri())).await.unwrap();
        assert_eq!(body, b"<html>hola</html>");
    }

    #[tokio::test]
    async fn http_500_is_returned_without_any_retry() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/broken"))
            .respond_with(ResponseTemplate::new(500).set_body_string("server error"))
            .expect(1)
            .mount(&server)
            .await;

        let fetcher = Fetcher::new(zero_delay(5));
        let body = fetcher
            .fetch(&format!("{}/broken", server.uri()))
            .await
            .unwrap();
        // Error statuses are not fetch failures; the body comes back as-is
        assert_eq!(body, b"server error");
    }

    #[tokio::test]
    async fn connection_refused_exhausts_the_budget_and_reports_attempts() {
        // Bind then drop a listener so the port is known-dead
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let fetcher = Fetcher::new(zero_delay(3));
        let err = fetcher
            .fetch(&format!("http://127.0.0.1:{port}/"))
            .await
            .unwrap_err();

        match err {
            Error::Fetch { url, attempts, .. } => {
                assert!(url.contains(&port.to_string()));
                assert_eq!(attempts, 3);
            }
            other => panic!("expected Error::Fetch, got {other:?}"),
        }
    }
}
