use super::ApiError;
use anyhow::Context;
use futures::future::BoxFuture;
use reqwest::Url;
use std::time::Duration;

/// Client-side deadline for a single request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// Raw response before status mapping and JSON decoding.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

/// Network seam. The production impl wraps `reqwest`; tests supply a stub so
/// the lifecycle and cache layers can be exercised without a server.
pub trait Transport: Send + Sync {
    fn send(
        &self,
        endpoint: String,
        method: Method,
        body: Option<serde_json::Value>,
    ) -> BoxFuture<'static, Result<RawResponse, ApiError>>;
}

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: reqwest::Client,
    base_url: Url,
    timeout: Duration,
}

impl ReqwestTransport {
    pub fn new(http: reqwest::Client, base_url: &str) -> anyhow::Result<Self> {
        // A trailing slash makes relative joins append to the base path, so a
        // reverse-proxy prefix like http://gateway/codeapi is kept.
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        let base_url = Url::parse(&normalized)
            .with_context(|| format!("invalid API base URL: {base_url}"))?;
        Ok(Self {
            http,
            base_url,
            timeout: REQUEST_TIMEOUT,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn endpoint_url(&self, endpoint: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(endpoint.trim_start_matches('/'))
            .map_err(|e| ApiError::Network(format!("invalid endpoint {endpoint}: {e}")))
    }
}

impl Transport for ReqwestTransport {
    fn send(
        &self,
        endpoint: String,
        method: Method,
        body: Option<serde_json::Value>,
    ) -> BoxFuture<'static, Result<RawResponse, ApiError>> {
        let http = self.http.clone();
        let url = self.endpoint_url(&endpoint);
        let timeout = self.timeout;

        Box::pin(async move {
            let url = url?;

            let mut req = match method {
                Method::Get => http.get(url),
                Method::Post => http.post(url),
            }
            .timeout(timeout);

            if let Some(body) = body {
                req = req.json(&body);
            }

            let resp = req.send().await.map_err(map_reqwest_error)?;
            let status = resp.status().as_u16();
            let body = resp.text().await.map_err(map_reqwest_error)?;

            Ok(RawResponse { status, body })
        })
    }
}

fn map_reqwest_error(e: reqwest::Error) -> ApiError {
    if e.is_timeout() {
        ApiError::Timeout
    } else {
        ApiError::Network(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transport(base: &str) -> ReqwestTransport {
        ReqwestTransport::new(reqwest::Client::new(), base).unwrap()
    }

    #[test]
    fn base_url_path_prefix_is_preserved() {
        let t = transport("http://gateway.local/codeapi");
        assert_eq!(
            t.endpoint_url("/api/v1/explain/").unwrap().as_str(),
            "http://gateway.local/codeapi/api/v1/explain/"
        );
    }

    #[test]
    fn plain_base_joins_endpoints() {
        let t = transport("http://localhost:8000");
        assert_eq!(
            t.endpoint_url("/health").unwrap().as_str(),
            "http://localhost:8000/health"
        );
    }

    #[test]
    fn trailing_slash_base_is_not_doubled() {
        let t = transport("http://localhost:8000/");
        assert_eq!(
            t.endpoint_url("/ping").unwrap().as_str(),
            "http://localhost:8000/ping"
        );
    }

    #[test]
    fn garbage_base_url_is_rejected() {
        assert!(ReqwestTransport::new(reqwest::Client::new(), "not a url").is_err());
    }
}
