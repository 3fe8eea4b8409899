// Shared HTTP client utilities

use crate::error::ModError;
use log::trace;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;

/// User-Agent string for all HTTP requests
const USER_AGENT: &str = concat!("mcmod/", env!("CARGO_PKG_VERSION"));

/// Build the HTTP client shared by the registry and the downloader
pub fn build_client() -> Result<Client, ModError> {
    Ok(Client::builder().user_agent(USER_AGENT).build()?)
}

/// Send a GET request, turning any non-success status into an error
pub async fn get(client: &Client, url: &str) -> Result<Response, ModError> {
    trace!("requesting GET {}", url);
    let response = client
        .get(url)
        .header("Content-Type", "application/json")
        .send()
        .await?;
    trace!("request returned {}", response.status());

    if !response.status().is_success() {
        return Err(status_error(response, url).await);
    }
    Ok(response)
}

/// Fetch JSON from a URL and deserialize it
pub async fn fetch_json<T: DeserializeOwned>(client: &Client, url: &str) -> Result<T, ModError> {
    let response = get(client, url).await?;
    Ok(response.json().await?)
}

/// Fetch JSON from a URL, returning None for 404 errors
pub async fn fetch_json_optional<T: DeserializeOwned>(
    client: &Client,
    url: &str,
) -> Result<Option<T>, ModError> {
    trace!("requesting GET {}", url);
    let response = client.get(url).send().await?;

    if response.status() == StatusCode::NOT_FOUND {
        return Ok(None);
    }

    if !response.status().is_success() {
        return Err(status_error(response, url).await);
    }

    Ok(Some(response.json().await?))
}

async fn status_error(response: Response, url: &str) -> ModError {
    let status = response.status().as_u16();
    // The body is only informational, a failed read leaves it empty
    let body = response.text().await.unwrap_or_default();
    ModError::HttpStatus {
        method: "GET",
        url: url.to_string(),
        status,
        body,
    }
}
