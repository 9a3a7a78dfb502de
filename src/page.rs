//! The page being analyzed: where its URL and HTML come from.

use std::path::Path;
use std::time::Duration;

use once_cell::sync::Lazy;
use scraper::Html;

use crate::error::{EcoError, Result};
use crate::extract::FieldStrategies;
use crate::product::RawFields;

/// Default page download timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Browser-like User-Agent; retailers serve stripped pages to obvious bots
const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Shared HTTP agent for connection pooling
static HTTP_AGENT: Lazy<ureq::Agent> = Lazy::new(|| {
    ureq::Agent::config_builder()
        .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)))
        .build()
        .into()
});

/// A page the user has open
pub trait Tab {
    /// URL of the page, used as the cache key
    fn url(&self) -> Result<String>;

    /// Run field extraction against the page's document
    fn run_extraction(&self) -> Result<RawFields>;
}

/// A page whose HTML is already in hand
pub struct HtmlTab {
    url: String,
    html: String,
    strategies: FieldStrategies,
}

impl HtmlTab {
    pub fn new(url: &str, html: impl Into<String>) -> Self {
        Self {
            url: url.to_string(),
            html: html.into(),
            strategies: FieldStrategies::default(),
        }
    }

    /// Saved page on disk, analyzed as if it were `url`
    pub fn from_file(url: &str, path: &Path) -> Result<Self> {
        let html = std::fs::read_to_string(path)?;
        Ok(Self::new(url, html))
    }

    pub fn with_strategies(mut self, strategies: FieldStrategies) -> Self {
        self.strategies = strategies;
        self
    }
}

impl Tab for HtmlTab {
    fn url(&self) -> Result<String> {
        Ok(self.url.clone())
    }

    fn run_extraction(&self) -> Result<RawFields> {
        let document = Html::parse_document(&self.html);
        Ok(self.strategies.extract(&document))
    }
}

/// A live page downloaded over HTTP at extraction time
pub struct HttpTab {
    url: String,
    strategies: FieldStrategies,
}

impl HttpTab {
    pub fn new(url: &str) -> Self {
        Self { url: url.to_string(), strategies: FieldStrategies::default() }
    }
}

impl Tab for HttpTab {
    fn url(&self) -> Result<String> {
        Ok(self.url.clone())
    }

    fn run_extraction(&self) -> Result<RawFields> {
        let html = fetch_html(&self.url)?;
        let document = Html::parse_document(&html);
        Ok(self.strategies.extract(&document))
    }
}

/// Download a page's HTML
pub fn fetch_html(url: &str) -> Result<String> {
    tracing::debug!(url, "fetching page");
    let mut response = HTTP_AGENT
        .get(url)
        .header("User-Agent", USER_AGENT)
        .header("Accept-Language", "en-US,en;q=0.9")
        .call()
        .map_err(|e| EcoError::Fetch(e.to_string()))?;

    let html = response
        .body_mut()
        .read_to_string()
        .map_err(|e| EcoError::Fetch(e.to_string()))?;
    tracing::debug!(url, bytes = html.len(), "page fetched");
    Ok(html)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::Strategy;
    use crate::product::Field;

    #[test]
    fn test_html_tab_extracts() {
        let tab = HtmlTab::new(
            "https://www.amazon.com/dp/B01",
            r#"<html><body><span id="productTitle">Soap Bar</span></body></html>"#,
        );
        assert_eq!(tab.url().unwrap(), "https://www.amazon.com/dp/B01");
        assert_eq!(tab.run_extraction().unwrap().product_title, "Soap Bar");
    }

    #[test]
    fn test_html_tab_custom_strategies() {
        let tab = HtmlTab::new("https://shop.example/p/1", r#"<h2 class="name">Mug</h2>"#)
            .with_strategies(FieldStrategies::new(vec![(Field::ProductTitle, vec![Strategy::text("h2.name")])]));
        assert_eq!(tab.run_extraction().unwrap().product_title, "Mug");
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.html");
        std::fs::write(&path, r#"<span id="productTitle">Saved Page</span>"#).unwrap();
        let tab = HtmlTab::from_file("https://www.amazon.com/dp/B02", &path).unwrap();
        assert_eq!(tab.run_extraction().unwrap().product_title, "Saved Page");
    }

    #[test]
    fn test_from_missing_file() {
        let err = HtmlTab::from_file("https://www.amazon.com/dp/B02", Path::new("/nonexistent/page.html"));
        assert!(matches!(err, Err(EcoError::IoError(_))));
    }
}
