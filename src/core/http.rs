use std::time::Duration;

use reqwest::{
    header::{
        HeaderMap,
        HeaderValue,
        ACCEPT,
        USER_AGENT,
    },
    Client,
};

use crate::core::LexiqError;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Shared pooled client. Per-request deadlines are enforced by the gateway,
/// so only the connect phase is bounded here.
pub fn http_client() -> Result<Client, LexiqError> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static("lexiq/0.1 (+reqwest)"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json, text/plain, */*"));

    Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .default_headers(headers)
        .build()
        .map_err(|e| LexiqError::Custom(format!("HTTP client build failed: {e}")))
}

/// Joins a base URL and a relative endpoint without doubling or dropping the slash.
pub fn join_url(base: &str, endpoint: &str) -> String {
    let base = base.trim_end_matches('/');
    if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        return endpoint.to_string();
    }
    if endpoint.starts_with('/') {
        format!("{base}{endpoint}")
    } else {
        format!("{base}/{endpoint}")
    }
}
