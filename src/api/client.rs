use super::cache::RequestCache;
use super::transport::{Method, RawResponse, Transport};
use super::types::*;
use super::ApiError;
use futures::future::BoxFuture;
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Client for the code assistant API. Cheap to clone; clones share the
/// transport and the dedup cache.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    cache: RequestCache,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            cache: RequestCache::default(),
        }
    }

    pub fn with_cache(mut self, cache: RequestCache) -> Self {
        self.cache = cache;
        self
    }

    pub async fn explain(&self, req: &ExplainRequest) -> Result<ExplainResponse, ApiError> {
        self.post_json("/api/v1/explain/", req, true).await
    }

    pub async fn refactor(&self, req: &RefactorRequest) -> Result<RefactorResponse, ApiError> {
        self.post_json("/api/v1/refactor/", req, true).await
    }

    pub async fn generate_tests(
        &self,
        req: &GenerateTestsRequest,
    ) -> Result<GenerateTestsResponse, ApiError> {
        self.post_json("/api/v1/tests/", req, true).await
    }

    pub async fn health(&self) -> Result<HealthResponse, ApiError> {
        let body = self.request_raw("/health", Method::Get, None, false).await?;
        decode(&body)
    }

    pub async fn ping(&self) -> Result<PingResponse, ApiError> {
        let body = self.request_raw("/ping", Method::Get, None, false).await?;
        decode(&body)
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    async fn post_json<B, T>(&self, endpoint: &str, req: &B, use_cache: bool) -> Result<T, ApiError>
    where
        B: serde::Serialize,
        T: DeserializeOwned,
    {
        let body = serde_json::to_value(req)
            .map_err(|e| ApiError::Network(format!("failed to serialize request: {e}")))?;
        let body = self
            .request_raw(endpoint, Method::Post, Some(body), use_cache)
            .await?;
        decode(&body)
    }

    /// One attempt, no retries. GETs and explicitly-flagged calls go through
    /// the dedup cache; everything else hits the transport directly.
    async fn request_raw(
        &self,
        endpoint: &str,
        method: Method,
        body: Option<serde_json::Value>,
        use_cache: bool,
    ) -> Result<String, ApiError> {
        if !use_cache && method != Method::Get {
            let raw = self
                .transport
                .send(endpoint.to_string(), method, body)
                .await?;
            return into_body(raw);
        }

        if let Some(pending) = self.cache.get(endpoint, body.as_ref()) {
            tracing::debug!(endpoint, "request deduplicated against cache");
            return pending.await;
        }

        let transport = self.transport.clone();
        let fut: BoxFuture<'static, Result<String, ApiError>> = {
            let endpoint = endpoint.to_string();
            let body = body.clone();
            Box::pin(async move {
                let raw = transport.send(endpoint, method, body).await?;
                into_body(raw)
            })
        };
        self.cache.set(endpoint, body.as_ref(), fut).await
    }
}

fn into_body(raw: RawResponse) -> Result<String, ApiError> {
    if (200..300).contains(&raw.status) {
        Ok(raw.body)
    } else {
        Err(ApiError::status(raw.status, &raw.body))
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body)
        .map_err(|e| ApiError::Network(format!("failed to decode response: {e}")))
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use futures::future::BoxFuture;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Canned-response transport, the counterpart of a stub provider: each
    /// send pops the next scripted outcome, optionally after a delay.
    pub struct StubTransport {
        calls: AtomicUsize,
        script: Mutex<VecDeque<(Duration, Result<RawResponse, ApiError>)>>,
    }

    impl StubTransport {
        pub fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                script: Mutex::new(VecDeque::new()),
            }
        }

        pub fn respond(self, status: u16, body: &str) -> Self {
            self.respond_after(Duration::ZERO, status, body)
        }

        pub fn respond_after(self, delay: Duration, status: u16, body: &str) -> Self {
            self.script.lock().unwrap().push_back((
                delay,
                Ok(RawResponse {
                    status,
                    body: body.to_string(),
                }),
            ));
            self
        }

        pub fn fail(self, err: ApiError) -> Self {
            self.script.lock().unwrap().push_back((Duration::ZERO, Err(err)));
            self
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Transport for StubTransport {
        fn send(
            &self,
            _endpoint: String,
            _method: Method,
            _body: Option<serde_json::Value>,
        ) -> BoxFuture<'static, Result<RawResponse, ApiError>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let next = self
                .script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| panic!("stub transport ran out of scripted responses"));
            Box::pin(async move {
                let (delay, outcome) = next;
                if delay > Duration::ZERO {
                    tokio::time::sleep(delay).await;
                }
                outcome
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::StubTransport;
    use super::*;

    const EXPLAIN_BODY: &str = r#"{
        "explanation": "x",
        "line_count": 1,
        "character_count": 9,
        "provider": "demo",
        "placeholder": true
    }"#;

    fn client(stub: StubTransport) -> (ApiClient, Arc<StubTransport>) {
        let stub = Arc::new(stub);
        (ApiClient::new(stub.clone()), stub)
    }

    #[tokio::test]
    async fn explain_round_trip() {
        let (client, _) = client(StubTransport::new().respond(200, EXPLAIN_BODY));
        let resp = client
            .explain(&ExplainRequest {
                code: "print(1)".to_string(),
                language: None,
            })
            .await
            .unwrap();
        assert_eq!(
            resp,
            ExplainResponse {
                explanation: "x".to_string(),
                line_count: 1,
                character_count: 9,
                provider: "demo".to_string(),
                placeholder: true,
            }
        );
    }

    #[tokio::test]
    async fn identical_pending_requests_hit_transport_once() {
        let (client, stub) = client(
            StubTransport::new().respond_after(std::time::Duration::from_millis(20), 200, EXPLAIN_BODY),
        );
        let req = ExplainRequest {
            code: "print(1)".to_string(),
            language: None,
        };

        let (a, b) = tokio::join!(client.explain(&req), client.explain(&req));
        assert_eq!(a.unwrap(), b.unwrap());
        assert_eq!(stub.calls(), 1);
    }

    #[tokio::test]
    async fn cache_cleared_refetches() {
        let (client, stub) = client(
            StubTransport::new()
                .respond(200, EXPLAIN_BODY)
                .respond(200, EXPLAIN_BODY),
        );
        let req = ExplainRequest {
            code: "print(1)".to_string(),
            language: None,
        };

        client.explain(&req).await.unwrap();
        client.clear_cache();
        client.explain(&req).await.unwrap();
        assert_eq!(stub.calls(), 2);
    }

    #[tokio::test]
    async fn failed_outcomes_are_not_kept_cached() {
        let (client, stub) = client(
            StubTransport::new()
                .respond(429, "{}")
                .respond(200, EXPLAIN_BODY),
        );
        let req = ExplainRequest {
            code: "print(1)".to_string(),
            language: None,
        };

        assert!(client.explain(&req).await.is_err());
        assert!(client.explain(&req).await.is_ok());
        assert_eq!(stub.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn abandoned_caller_does_not_pin_a_failure_in_the_cache() {
        use std::time::Duration;

        let (client, stub) = client(
            StubTransport::new()
                .respond_after(Duration::from_millis(50), 429, "{}")
                .respond(200, EXPLAIN_BODY),
        );
        let req = ExplainRequest {
            code: "print(1)".to_string(),
            language: None,
        };

        // First caller starts the request and is dropped mid-flight.
        let task = tokio::spawn({
            let client = client.clone();
            let req = req.clone();
            async move { client.explain(&req).await }
        });
        tokio::time::sleep(Duration::from_millis(10)).await;
        task.abort();
        let _ = task.await;

        // The entry is still pending, so the next identical call resumes it
        // and observes the failure as its own attempt.
        assert!(client.explain(&req).await.is_err());
        // The resolved failure is not served to the retry after that.
        assert!(client.explain(&req).await.is_ok());
        assert_eq!(stub.calls(), 2);
    }

    #[tokio::test]
    async fn rate_limited_maps_to_fixed_message() {
        let (client, _) = client(StubTransport::new().respond(429, r#"{"detail":"whatever"}"#));
        let err = client
            .explain(&ExplainRequest {
                code: "x".to_string(),
                language: None,
            })
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Too many requests. Please wait a moment and try again."
        );
    }

    #[tokio::test]
    async fn transport_failure_passes_through() {
        let (client, _) = client(StubTransport::new().fail(ApiError::Timeout));
        let err = client.ping().await.unwrap_err();
        assert_eq!(err, ApiError::Timeout);
    }

    #[tokio::test]
    async fn malformed_success_body_is_a_network_error() {
        let (client, _) = client(StubTransport::new().respond(200, "not json"));
        let err = client
            .explain(&ExplainRequest {
                code: "x".to_string(),
                language: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Network(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn health_decodes() {
        let (client, _) = client(StubTransport::new().respond(
            200,
            r#"{
                "status": "healthy",
                "version": "0.0.1",
                "api_version": "v1",
                "ai_provider": "demo",
                "environment": "development",
                "timestamp": "2025-01-01T00:00:00Z"
            }"#,
        ));
        let health = client.health().await.unwrap();
        assert_eq!(health.status, "healthy");
        assert_eq!(health.api_version, "v1");
    }
}
