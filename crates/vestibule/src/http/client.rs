//! Typed HTTP client for the auth endpoints.

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, instrument, trace};

use crate::error::{Error, ProtocolError};
use crate::types::ServerUrl;

use super::endpoints::ApiErrorResponse;

/// HTTP client for application-server requests.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    server: ServerUrl,
}

impl ApiClient {
    /// Create a new client for the given server.
    pub fn new(server: ServerUrl) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(concat!("vestibule/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("failed to build HTTP client");

        Self { client, server }
    }

    /// Returns the server URL this client is configured for.
    pub fn server(&self) -> &ServerUrl {
        &self.server
    }

    /// Make an authenticated GET request.
    #[instrument(skip(self, token), fields(server = %self.server))]
    pub async fn get_authed<R>(&self, path: &str, token: &str) -> Result<R, Error>
    where
        R: DeserializeOwned,
    {
        let url = self.server.endpoint_url(path);
        debug!(path, "authenticated GET");

        let response = self
            .client
            .get(&url)
            .headers(self.auth_headers(token))
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Make an unauthenticated POST request.
    #[instrument(skip(self, body), fields(server = %self.server))]
    pub async fn post<B, R>(&self, path: &str, body: &B) -> Result<R, Error>
    where
        B: Serialize,
        R: DeserializeOwned,
    {
        let url = self.server.endpoint_url(path);
        debug!(path, "POST");

        let response = self.client.post(&url).json(body).send().await?;

        self.handle_response(response).await
    }

    /// Make an unauthenticated POST request that returns no content.
    #[instrument(skip(self, body), fields(server = %self.server))]
    pub async fn post_no_response<B>(&self, path: &str, body: &B) -> Result<(), Error>
    where
        B: Serialize,
    {
        let url = self.server.endpoint_url(path);
        debug!(path, "POST (no response)");

        let response = self.client.post(&url).json(body).send().await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let error = self.parse_error_response(response).await;
            Err(Error::Protocol(error))
        }
    }

    /// Create authorization headers for authenticated requests.
    fn auth_headers(&self, token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        let auth_value = format!("Bearer {}", token);
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth_value).expect("invalid token characters"),
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers
    }

    /// Handle a response, parsing the body or error.
    async fn handle_response<R: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<R, Error> {
        let status = response.status();
        trace!(status = %status, "response");

        if status.is_success() {
            let body = response.json::<R>().await?;
            Ok(body)
        } else {
            let error = self.parse_error_response(response).await;
            Err(Error::Protocol(error))
        }
    }

    /// Parse an error response body.
    async fn parse_error_response(&self, response: reqwest::Response) -> ProtocolError {
        let status = response.status().as_u16();

        match response.json::<ApiErrorResponse>().await {
            Ok(error_body) => ProtocolError::new(status, error_body.error, error_body.message),
            Err(_) => ProtocolError::new(status, None, None),
        }
    }
}
