//! HTTP gateway for the learning service.
//!
//! One [`ApiClient`] owns the pooled [`reqwest::Client`], the configuration and
//! the key-value store the bearer token is read from. Every call is a single
//! attempt bounded by a deadline; retrying is left to the caller.

use std::{
    sync::Arc,
    time::Duration,
};

use reqwest::{
    header::{
        HeaderMap,
        HeaderName,
        HeaderValue,
        CONTENT_TYPE,
    },
    Method,
    Response,
    StatusCode,
};
use serde::{
    de::{
        DeserializeOwned,
        IgnoredAny,
    },
    Serialize,
};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::{
    envelope::{
        decode,
        decode_or_default,
    },
    quiz::QuizApi,
    srs::SrsApi,
    wordbook::WordbookApi,
};
use crate::{
    config::ClientConfig,
    core::{
        http::{
            http_client,
            join_url,
        },
        ApiError,
        LexiqError,
    },
    persistence::{
        keys,
        KeyValueStore,
    },
};

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Decoded response body, picked from the response `content-type`.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiBody {
    Json(Value),
    Text(String),
    Blob(Vec<u8>),
}

impl ApiBody {
    /// Best-effort JSON view: text bodies are parsed if they look like JSON,
    /// blobs carry no JSON and map to `null`.
    pub fn into_json(self) -> Value {
        match self {
            ApiBody::Json(value) => value,
            ApiBody::Text(text) if text.trim().is_empty() => Value::Null,
            ApiBody::Text(text) => serde_json::from_str(&text).unwrap_or(Value::String(text)),
            ApiBody::Blob(_) => Value::Null,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<Value>,
    pub requires_auth: bool,
    /// Falls back to [`ClientConfig::timeout`] when unset.
    pub timeout: Option<Duration>,
    /// Caller-owned cancellation, raced against the deadline.
    pub cancel: Option<CancellationToken>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            headers: HeaderMap::new(),
            body: None,
            requires_auth: true,
            timeout: None,
            cancel: None,
        }
    }
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn with_method(method: Method) -> Self {
        Self { method, ..Self::default() }
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn no_auth(mut self) -> Self {
        self.requires_auth = false;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn cancel_on(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

pub struct ApiClient {
    client: reqwest::Client,
    config: ClientConfig,
    store: Arc<dyn KeyValueStore>,
}

impl ApiClient {
    pub fn new(config: ClientConfig, store: Arc<dyn KeyValueStore>) -> Result<Self, LexiqError> {
        Ok(Self::with_client(http_client()?, config, store))
    }

    /// Reuses an existing [`reqwest::Client`] for connection pooling.
    pub fn with_client(
        client: reqwest::Client,
        config: ClientConfig,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        Self { client, config, store }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    pub fn srs(&self) -> SrsApi<'_> {
        SrsApi::new(self)
    }

    pub fn wordbook(&self) -> WordbookApi<'_> {
        WordbookApi::new(self)
    }

    pub fn quiz(&self) -> QuizApi<'_> {
        QuizApi::new(self)
    }

    pub fn set_tokens(&self, access: &str, refresh: Option<&str>) -> Result<(), LexiqError> {
        self.store.set(keys::ACCESS_TOKEN, access)?;
        if let Some(refresh) = refresh {
            self.store.set(keys::REFRESH_TOKEN, refresh)?;
        }
        Ok(())
    }

    pub fn clear_tokens(&self) -> Result<(), LexiqError> {
        self.store.remove_many(&[keys::ACCESS_TOKEN, keys::REFRESH_TOKEN])
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.store.get(keys::ACCESS_TOKEN), Ok(Some(_)))
    }

    /// Issues one request and returns the body shaped by its content type.
    ///
    /// The deadline covers sending and reading the body. A 401 clears both
    /// stored tokens before [`ApiError::Unauthorized`] is returned.
    pub async fn request(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<ApiBody, ApiError> {
        let timeout = options.timeout.unwrap_or(self.config.timeout);
        let cancel = options.cancel.clone();
        let method = options.method.clone();
        let request_id = Uuid::new_v4();

        tracing::debug!(%method, endpoint, %request_id, "Sending request");

        let work = tokio::time::timeout(timeout, self.execute(endpoint, options, request_id));
        let timed_out = || ApiError::Timeout {
            endpoint: endpoint.to_string(),
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        };

        let result = match cancel {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => {
                    Err(ApiError::Cancelled { endpoint: endpoint.to_string() })
                }
                outcome = work => outcome.unwrap_or_else(|_| Err(timed_out())),
            },
            None => work.await.unwrap_or_else(|_| Err(timed_out())),
        };

        if let Err(e) = &result {
            tracing::warn!(
                %method,
                endpoint,
                %request_id,
                status = ?e.status(),
                error = %e,
                "Request failed"
            );
        }
        result
    }

    pub async fn send<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        let body = self.request(endpoint, options).await?;
        decode(endpoint, body.into_json())
    }

    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        self.send(endpoint, RequestOptions::get()).await
    }

    /// GET where an empty or `null` payload means `T::default()`, e.g. empty lists.
    pub async fn get_or_default<T: DeserializeOwned + Default>(
        &self,
        endpoint: &str,
    ) -> Result<T, ApiError> {
        let body = self.request(endpoint, RequestOptions::get()).await?;
        decode_or_default(endpoint, body.into_json())
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let options = RequestOptions::with_method(Method::POST).body(encode(endpoint, body)?);
        self.send(endpoint, options).await
    }

    pub async fn patch<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let options = RequestOptions::with_method(Method::PATCH).body(encode(endpoint, body)?);
        self.send(endpoint, options).await
    }

    pub async fn post_or_default<T: DeserializeOwned + Default, B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let options = RequestOptions::with_method(Method::POST).body(encode(endpoint, body)?);
        let body = self.request(endpoint, options).await?;
        decode_or_default(endpoint, body.into_json())
    }

    /// POST whose response body is irrelevant to the caller.
    pub async fn post_unit<B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<(), ApiError> {
        let options = RequestOptions::with_method(Method::POST).body(encode(endpoint, body)?);
        self.request(endpoint, options).await?;
        Ok(())
    }

    pub async fn delete(&self, endpoint: &str) -> Result<(), ApiError> {
        let _: IgnoredAny = self
            .request(endpoint, RequestOptions::with_method(Method::DELETE))
            .await
            .and_then(|body| decode(endpoint, body.into_json()))?;
        Ok(())
    }

    // ---- private helpers ----

    async fn execute(
        &self,
        endpoint: &str,
        options: RequestOptions,
        request_id: Uuid,
    ) -> Result<ApiBody, ApiError> {
        let url = join_url(&self.config.base_url, endpoint);

        let mut builder = self
            .client
            .request(options.method, &url)
            .headers(options.headers)
            .header(REQUEST_ID_HEADER, request_id.to_string());

        if options.requires_auth {
            let token =
                self.store.get(keys::ACCESS_TOKEN).map_err(|e| ApiError::Store(e.to_string()))?;
            if let Some(token) = token {
                builder = builder.bearer_auth(token);
            }
        }

        if let Some(body) = &options.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            if let Err(e) = self.clear_tokens() {
                tracing::warn!(error = %e, "Failed to clear stored tokens after 401");
            }
            return Err(ApiError::Unauthorized);
        }

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ApiError::Http {
                status: status.as_u16(),
                message: error_message(status, &text),
            });
        }

        read_body(endpoint, response).await
    }
}

fn encode<B: Serialize + ?Sized>(endpoint: &str, body: &B) -> Result<Value, ApiError> {
    serde_json::to_value(body)
        .map_err(|e| ApiError::Encode { endpoint: endpoint.to_string(), message: e.to_string() })
}

async fn read_body(endpoint: &str, response: Response) -> Result<ApiBody, ApiError> {
    if response.status() == StatusCode::NO_CONTENT {
        return Ok(ApiBody::Json(Value::Null));
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_ascii_lowercase())
        .unwrap_or_default();

    if content_type.contains("application/json") || content_type.contains("+json") {
        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(ApiBody::Json(Value::Null));
        }
        return serde_json::from_str(&text).map(ApiBody::Json).map_err(|e| ApiError::Decode {
            endpoint: endpoint.to_string(),
            message: e.to_string(),
        });
    }

    if content_type.starts_with("text/") {
        return Ok(ApiBody::Text(response.text().await?));
    }

    Ok(ApiBody::Blob(response.bytes().await?.to_vec()))
}

/// Pulls a human-readable message out of an error body: a JSON `message` or
/// `error` string wins, then the raw text, then the status reason.
pub(crate) fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        for field in ["message", "error"] {
            if let Some(Value::String(message)) = map.get(field) {
                if !message.is_empty() {
                    return message.clone();
                }
            }
        }
    }

    let trimmed = body.trim();
    if !trimmed.is_empty() {
        return trimmed.to_string();
    }

    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP error {}", status.as_u16()))
}
