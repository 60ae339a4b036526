//! HTTP binding of the event directory.

use super::{decode_search_response, EventDirectory, ReverseGeocode};
use crate::domain::error::{GigsearchError, Result};
use crate::domain::{Coordinates, MappedEvent, SearchParams, DEFAULT_CATEGORY};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::Value;
use std::time::Duration;

/// Base URL used when the configuration does not name one.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Event directory reached over HTTP.
///
/// Endpoints live under `/api` relative to the base URL:
///
/// | Operation         | Request                                         |
/// |-------------------|-------------------------------------------------|
/// | search            | `GET /api/search?keyword&radius&segmentId&location` |
/// | event detail      | `GET /api/event/{id}`                           |
/// | venue             | `GET /api/venue?keyword`                        |
/// | reverse geocode   | `GET /api/geocode/reverse?lat&lon`              |
/// | health            | `GET /api/health`                               |
#[derive(Debug, Clone)]
pub struct HttpEventDirectory {
    client: Client,
    base_url: Url,
}

impl HttpEventDirectory {
    /// Creates a client for the directory at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`GigsearchError::Config`] if `base_url` is not an absolute
    /// http(s) URL, or [`GigsearchError::Http`] if the HTTP client cannot be
    /// built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| GigsearchError::Config(format!("invalid api_base_url {base_url:?}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(GigsearchError::Config(format!(
                "api_base_url {base_url} cannot carry a path"
            )));
        }

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("gigsearch/", env!("CARGO_PKG_VERSION")))
            .build()?;

        tracing::debug!(base_url = %base_url, timeout = ?timeout, "event directory client ready");
        Ok(Self { client, base_url })
    }

    /// Builds `<base>/api/<segments...>`, percent-encoding each segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| GigsearchError::Config(format!("api_base_url {} cannot carry a path", self.base_url)))?
            .pop_if_empty()
            .push("api")
            .extend(segments);
        Ok(url)
    }

    async fn get_json(&self, url: Url, query: &[(&str, &str)]) -> Result<Value> {
        let response = self.client.get(url.clone()).query(query).send().await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(url = %url, status = status.as_u16(), "event directory request failed");
            return Err(GigsearchError::Directory(format!("{url} returned HTTP {status}")));
        }

        Ok(response.json::<Value>().await?)
    }
}

#[async_trait]
impl EventDirectory for HttpEventDirectory {
    async fn search(&self, params: &SearchParams) -> Result<Vec<MappedEvent>> {
        let segment_id = if params.category.trim().is_empty() {
            DEFAULT_CATEGORY
        } else {
            params.category.as_str()
        };
        let url = self.endpoint(&["search"])?;
        let body = self
            .get_json(
                url,
                &[
                    ("keyword", params.keyword.as_str()),
                    ("radius", params.effective_radius()),
                    ("segmentId", segment_id),
                    ("location", params.location.as_str()),
                ],
            )
            .await?;

        let events = decode_search_response(body)?;
        tracing::debug!(keyword = %params.keyword, count = events.len(), "search returned");
        Ok(events)
    }

    async fn event_detail(&self, id: &str) -> Result<Value> {
        let url = self.endpoint(&["event", id])?;
        self.get_json(url, &[]).await
    }

    async fn venue(&self, keyword: &str) -> Result<Value> {
        let url = self.endpoint(&["venue"])?;
        self.get_json(url, &[("keyword", keyword)]).await
    }

    async fn reverse_geocode(&self, coordinates: Coordinates) -> Result<ReverseGeocode> {
        let url = self.endpoint(&["geocode", "reverse"])?;
        let lat = coordinates.latitude.to_string();
        let lon = coordinates.longitude.to_string();
        let body = self.get_json(url, &[("lat", lat.as_str()), ("lon", lon.as_str())]).await?;
        Ok(serde_json::from_value(body)?)
    }

    async fn health(&self) -> Result<Value> {
        let url = self.endpoint(&["health"])?;
        self.get_json(url, &[]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory(base: &str) -> HttpEventDirectory {
        HttpEventDirectory::new(base, Duration::from_secs(15)).unwrap()
    }

    #[test]
    fn endpoints_are_rooted_under_api() {
        let dir = directory(DEFAULT_BASE_URL);
        assert_eq!(
            dir.endpoint(&["search"]).unwrap().as_str(),
            "http://localhost:8080/api/search"
        );
        assert_eq!(
            dir.endpoint(&["geocode", "reverse"]).unwrap().as_str(),
            "http://localhost:8080/api/geocode/reverse"
        );
    }

    #[test]
    fn event_id_is_percent_encoded() {
        let dir = directory("https://events.example/backend/");
        assert_eq!(
            dir.endpoint(&["event", "a/b c"]).unwrap().as_str(),
            "https://events.example/backend/api/event/a%2Fb%20c"
        );
    }

    #[test]
    fn rejects_unusable_base_urls() {
        assert!(HttpEventDirectory::new("not a url", Duration::from_secs(1)).is_err());
        assert!(HttpEventDirectory::new("mailto:me@example.com", Duration::from_secs(1)).is_err());
    }
}
