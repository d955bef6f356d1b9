//! JSON endpoint builder producing slice operations.

use crate::credentials::{CredentialProvider, NoCredentials};
use crate::envelope::decode_envelope;
use crate::error::HttpError;
use reqwest::{Client, Method, StatusCode};
use resource_slice_core::OperationFuture;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::debug;

/// A method + URL pair that sends typed params and decodes a typed payload.
///
/// The endpoint owns its HTTP client and credential provider; call
/// [`JsonEndpoint::into_operation`] to obtain the operation closure a
/// slice accepts. Query-style methods (GET, DELETE) serialize params into
/// the query string; body-style methods send them as a JSON body.
///
/// # Example
///
/// ```ignore
/// let endpoint = JsonEndpoint::get("https://api.example.com/orders")
///     .with_credentials(StaticToken::new(token));
/// let orders: Vec<Order> = endpoint.send(&OrderQuery { page: 1 }).await?;
/// ```
pub struct JsonEndpoint {
    client: Client,
    method: Method,
    url: String,
    credentials: Arc<dyn CredentialProvider>,
}

impl JsonEndpoint {
    /// Create an endpoint for an arbitrary method
    #[must_use]
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            method,
            url: url.into(),
            credentials: Arc::new(NoCredentials),
        }
    }

    /// GET endpoint; params become the query string
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    /// POST endpoint; params become the JSON body
    #[must_use]
    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    /// PUT endpoint; params become the JSON body
    #[must_use]
    pub fn put(url: impl Into<String>) -> Self {
        Self::new(Method::PUT, url)
    }

    /// DELETE endpoint; params become the query string
    #[must_use]
    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(Method::DELETE, url)
    }

    /// Use a pre-configured HTTP client (connection pools, timeouts)
    #[must_use]
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// Attach a credential provider
    #[must_use]
    pub fn with_credentials(mut self, credentials: impl CredentialProvider + 'static) -> Self {
        self.credentials = Arc::new(credentials);
        self
    }

    /// Send one request and decode the enveloped payload.
    ///
    /// # Errors
    ///
    /// - [`HttpError::Request`] if the request never produces a response
    /// - [`HttpError::Unauthorized`] on 401
    /// - [`HttpError::RateLimited`] on 429
    /// - [`HttpError::Api`] on any other non-success status
    /// - [`HttpError::Decode`] if the payload does not match `T`
    pub async fn send<P, T>(&self, params: &P) -> Result<T, HttpError>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.client.request(self.method.clone(), &self.url);
        let request = match self.method {
            Method::GET | Method::DELETE => request.query(params),
            _ => request.json(params),
        };
        let request = match self.credentials.bearer_token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        debug!(method = %self.method, url = %self.url, "Sending request");

        let response = request
            .send()
            .await
            .map_err(|e| HttpError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(match status {
                StatusCode::UNAUTHORIZED => HttpError::Unauthorized,
                StatusCode::TOO_MANY_REQUESTS => HttpError::RateLimited,
                _ => {
                    let message = response.text().await.unwrap_or_default();
                    HttpError::Api {
                        status: status.as_u16(),
                        message,
                    }
                },
            });
        }

        let body = response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| HttpError::Decode(e.to_string()))?;
        decode_envelope(body)
    }

    /// Convert the endpoint into an operation closure for a slice.
    ///
    /// Each invocation clones the endpoint handle and sends one request;
    /// the underlying client's connection pool is shared across calls.
    #[must_use]
    pub fn into_operation<P, T>(self) -> impl Fn(P) -> OperationFuture<T, HttpError> + Send + Sync
    where
        P: Serialize + Send + Sync + 'static,
        T: DeserializeOwned + Send + 'static,
    {
        let endpoint = Arc::new(self);
        move |params: P| {
            let endpoint = Arc::clone(&endpoint);
            Box::pin(async move { endpoint.send(&params).await })
        }
    }
}

impl std::fmt::Debug for JsonEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonEndpoint")
            .field("method", &self.method)
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}
