use super::PageSource;
use crate::config::UpstreamConfig;
use crate::errors::{Error, Result};
use reqwest::{Client, Url};
use std::future::Future;
use tracing::{debug, info};

/// Query parameters that bound a page: `f2=bug_id&o2=greaterthan&v2=<cursor>`.
pub const CURSOR_FIELD_PARAM: &str = "f2";
pub const CURSOR_OP_PARAM: &str = "o2";
pub const CURSOR_VALUE_PARAM: &str = "v2";

/// Fetches pages from a Bugzilla-style `buglist.cgi` CSV query.
#[derive(Debug, Clone)]
pub struct HttpPageSource {
    client: Client,
    base: Url,
}

impl HttpPageSource {
    pub fn new(config: &UpstreamConfig) -> Result<Self> {
        let base = Url::parse(&config.base_url).map_err(|e| Error::InvalidUrl {
            url: config.base_url.clone(),
            message: e.to_string(),
        })?;
        let client = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| Error::Configuration(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client, base })
    }

    /// The query URL for the page after `after_id`.
    pub fn page_url(&self, after_id: u64) -> Url {
        let mut url = self.base.clone();
        url.query_pairs_mut()
            .append_pair(CURSOR_FIELD_PARAM, "bug_id")
            .append_pair(CURSOR_OP_PARAM, "greaterthan")
            .append_pair(CURSOR_VALUE_PARAM, &after_id.to_string());
        url
    }

    async fn get(&self, after_id: u64) -> Result<Vec<u8>> {
        let url = self.page_url(after_id);
        info!(cursor = after_id, %url, "fetching page");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| Error::from_request(url.as_str(), e))?;
        let body = response
            .bytes()
            .await
            .map_err(|e| Error::from_request(url.as_str(), e))?;

        debug!(cursor = after_id, bytes = body.len(), "page received");
        Ok(body.to_vec())
    }
}

impl PageSource for HttpPageSource {
    fn fetch_page(&self, after_id: u64) -> impl Future<Output = Result<Vec<u8>>> + Send {
        self.get(after_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(base_url: &str) -> Result<HttpPageSource> {
        HttpPageSource::new(&UpstreamConfig {
            base_url: base_url.to_string(),
            ..UpstreamConfig::default()
        })
    }

    #[test]
    fn test_page_url_appends_cursor_bound() {
        let source = source("https://bugs.example.org/buglist.cgi?ctype=csv&order=bug_id").unwrap();
        let url = source.page_url(1520);
        assert_eq!(
            url.as_str(),
            "https://bugs.example.org/buglist.cgi?ctype=csv&order=bug_id&f2=bug_id&o2=greaterthan&v2=1520"
        );
    }

    #[test]
    fn test_page_url_keeps_base_untouched() {
        let source = source("https://bugs.example.org/buglist.cgi?ctype=csv").unwrap();
        let first = source.page_url(0);
        let second = source.page_url(99);
        assert!(first.as_str().ends_with("v2=0"));
        assert!(second.as_str().ends_with("v2=99"));
        assert_eq!(second.query_pairs().filter(|(k, _)| k == "v2").count(), 1);
    }

    #[test]
    fn test_default_query_is_csv_sorted_by_id() {
        let source = source(&UpstreamConfig::default().base_url).unwrap();
        let url = source.page_url(0);
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("ctype".into(), "csv".into())));
        assert!(pairs.contains(&("order".into(), "bug_id".into())));
        assert!(pairs.contains(&("f1".into(), "cf_fission_milestone".into())));
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let err = source("not a url").unwrap_err();
        assert!(matches!(err, Error::InvalidUrl { .. }));
    }
}
