//! Unsplash photo search

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::ImageSearch;
use crate::{Error, Result};

const SEARCH_URL: &str = "https://api.unsplash.com/search/photos";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<Photo>,
}

#[derive(Debug, Deserialize)]
struct Photo {
    urls: PhotoUrls,
}

#[derive(Debug, Deserialize)]
struct PhotoUrls {
    small: String,
}

/// Image search backed by the Unsplash API
pub struct UnsplashImageSearch {
    client: reqwest::Client,
    access_key: SecretString,
}

impl UnsplashImageSearch {
    /// Create an image search client
    #[must_use]
    pub const fn new(client: reqwest::Client, access_key: SecretString) -> Self {
        Self { client, access_key }
    }
}

#[async_trait]
impl ImageSearch for UnsplashImageSearch {
    async fn first_image(&self, query: &str) -> Result<String> {
        let response = self
            .client
            .get(SEARCH_URL)
            .query(&[
                ("query", query),
                ("client_id", self.access_key.expose_secret()),
            ])
            .send()
            .await
            .map_err(|e| Error::Provider(format!("Unsplash request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Provider(format!(
                "Unsplash API error: {status} - {body}"
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::Provider(format!("Unsplash response read error: {e}")))?;

        first_small_url(&body)
    }
}

fn first_small_url(body: &str) -> Result<String> {
    let parsed: SearchResponse = serde_json::from_str(body)?;

    parsed
        .results
        .into_iter()
        .next()
        .map(|photo| photo.urls.small)
        .ok_or_else(|| Error::Provider("Unsplash returned no photos".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn takes_small_url_of_first_result() {
        let body = r#"{
            "total": 2,
            "results": [
                {"id": "a", "urls": {"raw": "https://u/a-raw", "small": "https://u/a-small"}},
                {"id": "b", "urls": {"raw": "https://u/b-raw", "small": "https://u/b-small"}}
            ]
        }"#;
        assert_eq!(first_small_url(body).unwrap(), "https://u/a-small");
    }

    #[test]
    fn no_results_is_error() {
        assert!(first_small_url(r#"{"total": 0, "results": []}"#).is_err());
    }
}
