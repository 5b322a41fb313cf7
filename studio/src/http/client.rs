//! HTTP client implementation

use std::time::Duration;

use reqwest::{header, multipart, Client, RequestBuilder};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::authn::credential::Credential;
use crate::errors::{ApiError, StudioError};

/// Prefix of every backend route
pub const API_PREFIX: &str = "/v1";

/// HTTP client for backend communication
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
}

impl HttpClient {
    /// Create a new HTTP client. Without `timeout` requests run until the
    /// transport completes or fails them.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, StudioError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, API_PREFIX, path)
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        credential: Option<&Credential>,
    ) -> Result<T, StudioError> {
        let url = self.url(path);
        debug!("GET {}", url);
        self.send(self.client.get(&url), credential, "GET", &url).await
    }

    /// Make a POST request with a JSON body
    pub async fn post_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        credential: Option<&Credential>,
        body: &B,
    ) -> Result<T, StudioError> {
        let url = self.url(path);
        debug!("POST {} (json)", url);
        self.send(self.client.post(&url).json(body), credential, "POST", &url)
            .await
    }

    /// Make a POST request without a body
    pub async fn post_empty<T: DeserializeOwned>(
        &self,
        path: &str,
        credential: Option<&Credential>,
    ) -> Result<T, StudioError> {
        let url = self.url(path);
        debug!("POST {}", url);
        self.send(self.client.post(&url), credential, "POST", &url).await
    }

    /// Make a POST request with a form-encoded body
    pub async fn post_form<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        credential: Option<&Credential>,
        form: &B,
    ) -> Result<T, StudioError> {
        let url = self.url(path);
        debug!("POST {} (form)", url);
        self.send(self.client.post(&url).form(form), credential, "POST", &url)
            .await
    }

    /// Make a POST request with a multipart body
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        credential: Option<&Credential>,
        form: multipart::Form,
    ) -> Result<T, StudioError> {
        let url = self.url(path);
        debug!("POST {} (multipart)", url);
        self.send(self.client.post(&url).multipart(form), credential, "POST", &url)
            .await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        mut request: RequestBuilder,
        credential: Option<&Credential>,
        method: &str,
        url: &str,
    ) -> Result<T, StudioError> {
        if let Some(credential) = credential {
            request = request.header(header::AUTHORIZATION, credential.bearer());
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            warn!("HTTP {} {} failed: {} - {}", method, url, status, body);
            return Err(ApiError::from_body(status, &body).into());
        }

        Ok(serde_json::from_str(&body)?)
    }
}
