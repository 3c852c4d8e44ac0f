//! Live Google Scholar backend

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue, USER_AGENT};

use super::SearchBackend;
use crate::error::{Result, ScholarError};
use crate::model::{SCHOLAR_URL, ScholarResult, SearchQuery};
use crate::parse::ResultParser;

const BROWSER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                             (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Fetches and parses result pages over HTTP
pub struct HttpScholarBackend {
    client: reqwest::Client,
    parser: ResultParser,
    base_url: String,
}

impl HttpScholarBackend {
    pub fn new() -> Result<Self> {
        Self::with_base_url(SCHOLAR_URL)
    }

    /// Point at a different results endpoint (mirrors, local fixtures)
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_AGENT));
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8"),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            parser: ResultParser::new()?,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl SearchBackend for HttpScholarBackend {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<ScholarResult>> {
        let url = query.url(&self.base_url)?;
        tracing::debug!(%url, "Fetching Scholar results");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%status, "Scholar request rejected");
            return Err(ScholarError::Http(status.as_u16()));
        }

        let html = response.text().await?;
        let results = self.parser.parse(&html, query.num_results as usize);
        if results.is_empty() && html.contains("gs_captcha") {
            tracing::warn!("Scholar returned a captcha page");
        }
        Ok(results)
    }

    fn name(&self) -> &str {
        "google-scholar"
    }
}
