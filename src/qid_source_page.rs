use crate::app_config::QcConfig;
use crate::qid_source::{extract_qids, QidSource};
use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{info, warn};

/// Scrapes QIDs from the raw wikitext of an on-wiki report page.
///
/// Transport errors degrade to an empty list; the caller decides whether an
/// empty run is worth a report.
#[derive(Debug, Clone)]
pub struct SourcePage {
    page_url: String,
    user_agent: String,
    timeout: Duration,
}

impl SourcePage {
    pub fn new(page_url: &str, config: &QcConfig) -> Self {
        Self {
            page_url: page_url.to_string(),
            user_agent: config.user_agent(),
            timeout: Duration::from_secs(config.request_timeout_secs()),
        }
    }
}

#[async_trait]
impl QidSource for SourcePage {
    fn name(&self) -> String {
        "page".to_string()
    }

    async fn run(&self) -> Result<Vec<String>> {
        let raw_url = format!("{}?action=raw", self.page_url);
        info!("Fetching raw wikitext from: {raw_url}");
        let client = reqwest::ClientBuilder::new().timeout(self.timeout).build()?;
        let wikitext = match self.fetch_wikitext(&client, &raw_url).await {
            Ok(wikitext) => wikitext,
            Err(e) => {
                warn!("Error fetching page {raw_url}: {e}");
                return Ok(vec![]);
            }
        };
        let qids = extract_qids(&wikitext);
        info!("Found {} unique QIDs", qids.len());
        Ok(qids)
    }
}

impl SourcePage {
    async fn fetch_wikitext(&self, client: &reqwest::Client, raw_url: &str) -> Result<String> {
        let response = client
            .get(raw_url)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.text().await?)
    }
}
