//! HTTP transport.
//!
//! The client talks to the registry through [`HttpTransport`] so listing and
//! deletion logic can run against a scripted transport in tests.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, LINK};
use reqwest::StatusCode;

use crate::config::RegistryConfig;
use crate::error::RegistryError;

/// A registry response, reduced to what the client inspects.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// Response status.
    pub status: StatusCode,

    /// Raw `Link` header, if present.
    pub link: Option<String>,

    /// Response body.
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Creates a response with the given status and body and no `Link` header.
    #[must_use]
    pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            link: None,
            body: body.into(),
        }
    }

    /// Sets the `Link` header.
    #[must_use]
    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    /// Returns the body as text, for error messages.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Minimal HTTP interface used by the registry client.
#[async_trait]
pub trait HttpTransport: Send + Sync + std::fmt::Debug {
    /// Issues a GET request.
    async fn get(&self, url: &str, headers: HeaderMap) -> Result<HttpResponse, RegistryError>;

    /// Issues a DELETE request.
    async fn delete(&self, url: &str, headers: HeaderMap) -> Result<HttpResponse, RegistryError>;
}

/// [`HttpTransport`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl ReqwestTransport {
    /// Builds the HTTP client from the registry configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: &RegistryConfig) -> Result<Self, RegistryError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| RegistryError::ConnectionFailed {
                url: config.api_url.clone(),
                source: e,
            })?;

        Ok(Self { http })
    }

    async fn read(response: reqwest::Response) -> Result<HttpResponse, RegistryError> {
        let status = response.status();
        let link = response
            .headers()
            .get(LINK)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string);
        let body = response.bytes().await?.to_vec();

        Ok(HttpResponse { status, link, body })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str, headers: HeaderMap) -> Result<HttpResponse, RegistryError> {
        let response = self.http.get(url).headers(headers).send().await?;
        Self::read(response).await
    }

    async fn delete(&self, url: &str, headers: HeaderMap) -> Result<HttpResponse, RegistryError> {
        let response = self.http.delete(url).headers(headers).send().await?;
        Self::read(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_creation() {
        let transport = ReqwestTransport::new(&RegistryConfig::default());
        assert!(transport.is_ok());
    }

    #[test]
    fn test_response_text() {
        let response = HttpResponse::new(StatusCode::FORBIDDEN, "no access")
            .with_link("<https://example.com/next>; rel=\"next\"");
        assert_eq!(response.text(), "no access");
        assert!(response.link.is_some());
    }
}
