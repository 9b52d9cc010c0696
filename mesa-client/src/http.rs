//! HTTP client for network-based API calls

use crate::{ApiResponse, ClientConfig, ClientError, ClientResult};
use reqwest::{Client, Method, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// HTTP client for making requests to the order backend
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl HttpClient {
    /// Create a new HTTP client from configuration
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .build()?;

        let base_url = Url::parse(config.base_url.trim_end_matches('/'))
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", config.base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(config.base_url.clone()));
        }

        Ok(Self {
            client,
            base_url,
            token: config.token.clone(),
        })
    }

    /// Set the session token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Get the current token
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Build a URL from percent-encoded path segments
    pub(crate) fn url(&self, segments: &[&str]) -> ClientResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Build authorization header value
    fn auth_header(&self) -> ClientResult<String> {
        match self.token.as_deref() {
            Some(t) if !t.trim().is_empty() => Ok(format!("Bearer {}", t)),
            _ => Err(ClientError::Unauthorized),
        }
    }

    /// Send a request and decode the response envelope
    async fn send<T, B>(
        &self,
        method: Method,
        url: Url,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> ClientResult<ApiResponse<T>>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        // no token, no request
        let auth = self.auth_header()?;

        tracing::debug!(method = %method, url = %url, "backend request");
        let mut request = self
            .client
            .request(method, url)
            .header(reqwest::header::AUTHORIZATION, auth);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        Self::decode(status, &text)
    }

    /// Map status + body onto an envelope or a [`ClientError`]
    pub(crate) fn decode<T: DeserializeOwned>(
        status: StatusCode,
        text: &str,
    ) -> ClientResult<ApiResponse<T>> {
        // 402 short-circuits regardless of body
        if status == StatusCode::PAYMENT_REQUIRED {
            return Err(ClientError::PaymentRequired);
        }
        if status == StatusCode::UNAUTHORIZED {
            return Err(ClientError::Unauthorized);
        }

        if !status.is_success() {
            return match serde_json::from_str::<ApiResponse<serde_json::Value>>(text) {
                Ok(envelope) if !envelope.is_success() => {
                    Err(ClientError::Api(envelope.into_error()))
                }
                _ => Err(ClientError::Status {
                    status: status.as_u16(),
                    body: text.to_string(),
                }),
            };
        }

        if text.trim().is_empty() {
            return Ok(ApiResponse {
                code: Some(0),
                message: String::new(),
                data: None,
                details: None,
            });
        }

        let envelope: ApiResponse<T> = serde_json::from_str(text)?;
        if !envelope.is_success() {
            let code = envelope.code;
            let message = envelope.message;
            let details = envelope.details;
            let err = ApiResponse::<()> {
                code,
                message,
                data: None,
                details,
            }
            .into_error();
            if err.code == shared::ErrorCode::SubscriptionRequired {
                return Err(ClientError::PaymentRequired);
            }
            return Err(ClientError::Api(err));
        }
        Ok(envelope)
    }

    /// GET returning the envelope payload
    pub async fn get<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> ClientResult<T> {
        let url = self.url(segments)?;
        self.send::<T, ()>(Method::GET, url, query, None)
            .await?
            .data
            .ok_or_else(|| ClientError::InvalidResponse("Missing response data".to_string()))
    }

    /// Request with a JSON body returning the envelope payload
    pub async fn call<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        segments: &[&str],
        body: &B,
    ) -> ClientResult<T> {
        let url = self.url(segments)?;
        self.send::<T, B>(method, url, &[], Some(body))
            .await?
            .data
            .ok_or_else(|| ClientError::InvalidResponse("Missing response data".to_string()))
    }

    /// Request with a JSON body whose answer carries no payload
    pub async fn call_unit<B: Serialize + ?Sized>(
        &self,
        method: Method,
        segments: &[&str],
        body: &B,
    ) -> ClientResult<()> {
        let url = self.url(segments)?;
        self.send::<serde_json::Value, B>(method, url, &[], Some(body))
            .await
            .map(|_| ())
    }
}
