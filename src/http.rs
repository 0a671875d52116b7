//! Shared HTTP plumbing
//!
//! One reqwest client per run (fixed timeout + browser-like user agent) and
//! small helpers that turn non-success statuses into errors so the retry
//! policy can classify them.

use crate::config::Config;
use crate::error::{FloraIdError, Result};
use crate::retry::RetryPolicy;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;

pub fn build_client(config: &Config) -> Result<Client> {
    Client::builder()
        .timeout(config.timeout())
        .user_agent(config.user_agent.as_str())
        .build()
        .map_err(|e| FloraIdError::Config(format!("failed to create HTTP client: {}", e)))
}

/// Sends the request and fails on any non-2xx status
pub async fn send_checked(request: RequestBuilder) -> Result<Response> {
    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(FloraIdError::HttpStatus {
            status: status.as_u16(),
            url: response.url().to_string(),
        });
    }
    Ok(response)
}

/// GET returning the body as text, retried per `policy`; `None` once the
/// attempts are exhausted
pub async fn get_text_soft(
    client: &Client,
    policy: &RetryPolicy,
    url: &str,
    referer: Option<&str>,
) -> Option<String> {
    policy
        .run_soft(url, move || async move {
            let mut request = client.get(url);
            if let Some(referer) = referer {
                request = request.header(reqwest::header::REFERER, referer);
            }
            let response = send_checked(request).await?;
            Ok(response.text().await?)
        })
        .await
}

/// GET with query parameters returning decoded JSON, retried per `policy`
pub async fn get_json_soft<T: DeserializeOwned>(
    client: &Client,
    policy: &RetryPolicy,
    url: &str,
    params: &[(&str, &str)],
    referer: Option<&str>,
) -> Option<T> {
    policy
        .run_soft(url, move || async move {
            let mut request = client.get(url).query(params);
            if let Some(referer) = referer {
                request = request.header(reqwest::header::REFERER, referer);
            }
            let response = send_checked(request).await?;
            Ok(response.json::<T>().await?)
        })
        .await
}
