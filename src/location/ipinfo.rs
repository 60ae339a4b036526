//! IP-based geolocation.
//!
//! The lookup service answers with JSON describing the caller's public IP:
//! city, region, country and a `"lat,lon"` pair, any of which may be missing.
//! Some deployments wrap that JSON in a callback or prepend text, so responses
//! are decoded leniently.

use crate::domain::error::{GigsearchError, Result};
use crate::domain::Coordinates;
use async_trait::async_trait;
use regex::Regex;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::OnceLock;
use std::time::Duration;

/// Lookup endpoint used when the configuration does not name one.
pub const DEFAULT_IPINFO_URL: &str = "https://ipinfo.io/";

/// Responses longer than this are not decoded.
pub const MAX_PAYLOAD_BYTES: usize = 64 * 1024;

/// Decodes `text` as JSON, falling back to the first `{...}` span in it.
///
/// The fallback span runs from the first `{` to the last `}`, which recovers
/// JSONP (`cb({...})`) and JSON with leading or trailing noise. Returns `None`
/// for oversized input and when neither attempt decodes.
///
/// # Examples
///
/// ```
/// use gigsearch::location::ipinfo::{decode_lenient, IpInfo};
///
/// let info: IpInfo = decode_lenient(r#"callback({"city":"Chicago"});"#).unwrap();
/// assert_eq!(info.city.as_deref(), Some("Chicago"));
/// assert!(decode_lenient::<IpInfo>("<html>rate limited</html>").is_none());
/// ```
#[must_use]
pub fn decode_lenient<T: DeserializeOwned>(text: &str) -> Option<T> {
    if text.len() > MAX_PAYLOAD_BYTES {
        tracing::debug!(len = text.len(), "lookup payload too large, ignoring");
        return None;
    }

    if let Ok(value) = serde_json::from_str(text) {
        return Some(value);
    }

    static OBJECT_SPAN: OnceLock<Option<Regex>> = OnceLock::new();
    let pattern = OBJECT_SPAN.get_or_init(|| Regex::new(r"(?s)\{.*\}").ok()).as_ref()?;
    let span = pattern.find(text)?;
    match serde_json::from_str(span.as_str()) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::debug!(error = %e, "embedded lookup payload did not decode");
            None
        }
    }
}

/// The fields of an IP lookup response the resolver reads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct IpInfo {
    pub city: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
    /// `"lat,lon"`.
    pub loc: Option<String>,
}

impl IpInfo {
    /// Present place fields joined with `", "`, or `None` if all are blank.
    #[must_use]
    pub fn place_name(&self) -> Option<String> {
        let parts: Vec<&str> = [&self.city, &self.region, &self.country]
            .into_iter()
            .filter_map(|part| part.as_deref().map(str::trim))
            .filter(|part| !part.is_empty())
            .collect();
        (!parts.is_empty()).then(|| parts.join(", "))
    }

    /// The `loc` pair, if it parses.
    #[must_use]
    pub fn coordinates(&self) -> Option<Coordinates> {
        self.loc.as_deref().and_then(Coordinates::parse_pair)
    }
}

/// Source of IP lookup responses.
///
/// Implementations return the raw body; decoding is the caller's job so that
/// every source gets the same lenient treatment.
#[async_trait]
pub trait IpLookup: Send + Sync {
    async fn lookup(&self, token: &str) -> Result<String>;
}

/// IP lookup over HTTP, `GET <url>?token=<token>`.
#[derive(Debug, Clone)]
pub struct HttpIpLookup {
    client: Client,
    url: Url,
}

impl HttpIpLookup {
    /// # Errors
    ///
    /// Returns [`GigsearchError::Config`] for an unparsable URL or
    /// [`GigsearchError::Http`] if the client cannot be built.
    pub fn new(url: &str, timeout: Duration) -> Result<Self> {
        let url = Url::parse(url)
            .map_err(|e| GigsearchError::Config(format!("invalid ipinfo_url {url:?}: {e}")))?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, url })
    }
}

#[async_trait]
impl IpLookup for HttpIpLookup {
    async fn lookup(&self, token: &str) -> Result<String> {
        let mut url = self.url.clone();
        url.query_pairs_mut().append_pair("token", token);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(GigsearchError::Directory(format!("IP lookup returned HTTP {status}")));
        }
        Ok(response.text().await?)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Returns a canned body, or fails when `body` is `None`.
    #[derive(Debug, Default)]
    pub struct CannedLookup {
        pub body: Option<String>,
        pub calls: AtomicUsize,
    }

    impl CannedLookup {
        pub fn answering(body: &str) -> Self {
            Self {
                body: Some(body.to_string()),
                calls: AtomicUsize::new(0),
            }
        }

        pub fn failing() -> Self {
            Self::default()
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl IpLookup for CannedLookup {
        async fn lookup(&self, _token: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.body
                .clone()
                .ok_or_else(|| GigsearchError::Directory("lookup unreachable".to_string()))
        }
    }
}
