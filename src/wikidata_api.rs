use crate::app_config::QcConfig;
use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tracing::{info, warn};
use url::Url;

/// Documented cap on how many entities `wbgetentities` returns per request.
pub static ENTITY_QUERY_LIMIT: usize = 50;

/// One item creation found via `list=usercontribs`.
#[derive(Debug, Clone, PartialEq)]
pub struct CreatedItem {
    pub qid: String,
    pub page_id: u64,
    pub created: Option<DateTime<Utc>>,
}

/// Client for the MediaWiki action API on wikidata.org.
#[derive(Debug, Clone)]
pub struct WikidataApi {
    client: reqwest::Client,
    endpoint: String,
    user_agent: String,
    language: String,
    delay: Duration,
    search_limit: usize,
    max_user_items: usize,
}

impl WikidataApi {
    pub fn new(config: &QcConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.request_timeout_secs());
        let client = reqwest::ClientBuilder::new().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: config.api_endpoint(),
            user_agent: config.user_agent(),
            language: config.language(),
            delay: Duration::from_millis(config.api_delay_ms()),
            search_limit: config.search_limit(),
            max_user_items: config.max_user_items(),
        })
    }

    async fn get_json(&self, url: &str) -> Result<Value> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(anyhow!("API request failed: HTTP {}", response.status()));
        }
        Ok(response.json().await?)
    }

    /// Fetches full entity JSON for the given QIDs, in batches of
    /// `ENTITY_QUERY_LIMIT`. A failed batch is logged and skipped; the other
    /// batches are unaffected.
    pub async fn get_entities(&self, qids: &[String]) -> Result<HashMap<String, Value>> {
        let mut entities: HashMap<String, Value> = HashMap::new();
        for batch in qids.chunks(ENTITY_QUERY_LIMIT) {
            match self.get_entities_batch(batch).await {
                Ok(batch_entities) => entities.extend(batch_entities),
                Err(e) => warn!("wbgetentities failed for batch starting at {}: {e}", batch[0]),
            }
            tokio::time::sleep(self.delay).await;
        }
        Ok(entities)
    }

    async fn get_entities_batch(&self, qids: &[String]) -> Result<HashMap<String, Value>> {
        let url = format!(
            "{}?action=wbgetentities&format=json&ids={}",
            self.endpoint,
            qids.join("|")
        );
        let result = self.get_json(&url).await?;
        if result["success"].as_u64() != Some(1) {
            let info = result["error"]["info"].as_str().unwrap_or("unknown error");
            return Err(anyhow!("wbgetentities call failed: {info}"));
        }
        let entities = result["entities"]
            .as_object()
            .ok_or_else(|| anyhow!("wbgetentities returned no entities object"))?;
        Ok(entities
            .iter()
            .map(|(qid, entity)| (qid.to_owned(), entity.to_owned()))
            .collect())
    }

    /// Label search via `wbsearchentities`; returns candidate QIDs.
    pub async fn search_items(&self, label: &str) -> Result<Vec<String>> {
        let encoded = utf8_percent_encode(label, NON_ALPHANUMERIC).to_string();
        let url = format!(
            "{}?action=wbsearchentities&search={}&language={}&uselang={}&type=item&limit={}&format=json&formatversion=2",
            self.endpoint, encoded, self.language, self.language, self.search_limit
        );
        let result = self.get_json(&url).await?;
        let candidates = result["search"]
            .as_array()
            .map(|results| {
                results
                    .iter()
                    .filter_map(|r| r["id"].as_str())
                    .filter(|id| id.starts_with('Q'))
                    .map(|id| id.to_string())
                    .collect()
            })
            .unwrap_or_default();
        Ok(candidates)
    }

    /// Items created by a user (new pages in namespace 0), following API
    /// continuation up to the safety limit.
    pub async fn user_created_items(&self, username: &str) -> Result<Vec<CreatedItem>> {
        let mut items: Vec<CreatedItem> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut continuation: Option<Value> = None;

        loop {
            let mut url = Url::parse(&self.endpoint)?;
            url.query_pairs_mut()
                .append_pair("action", "query")
                .append_pair("list", "usercontribs")
                .append_pair("ucuser", username)
                .append_pair("ucprop", "title|timestamp|ids")
                .append_pair("uclimit", "max")
                .append_pair("ucnamespace", "0")
                .append_pair("ucshow", "new")
                .append_pair("ucdir", "newer")
                .append_pair("format", "json")
                .append_pair("formatversion", "2");
            if let Some(cont) = &continuation {
                if let Some(cont) = cont.as_object() {
                    for (key, value) in cont {
                        let value = value.as_str().map_or_else(|| value.to_string(), |s| s.to_string());
                        url.query_pairs_mut().append_pair(key, &value);
                    }
                }
            }

            info!("Fetching user contributions batch (current total: {})", items.len());
            let result = self.get_json(url.as_str()).await?;
            let contributions = result["query"]["usercontribs"]
                .as_array()
                .cloned()
                .unwrap_or_default();
            if contributions.is_empty() {
                break;
            }
            for contrib in &contributions {
                let title = contrib["title"].as_str().unwrap_or("");
                let page_id = match contrib["pageid"].as_u64() {
                    Some(page_id) => page_id,
                    None => continue,
                };
                if !title.starts_with('Q') || seen.contains(title) {
                    continue;
                }
                let created = contrib["timestamp"]
                    .as_str()
                    .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
                    .map(|ts| ts.with_timezone(&Utc));
                seen.insert(title.to_string());
                items.push(CreatedItem {
                    qid: title.to_string(),
                    page_id,
                    created,
                });
            }
            if items.len() >= self.max_user_items {
                warn!("Reached item limit ({})", self.max_user_items);
                break;
            }
            match result.get("continue") {
                Some(cont) => {
                    continuation = Some(cont.to_owned());
                    tokio::time::sleep(self.delay / 2).await;
                }
                None => break,
            }
        }
        info!("Found {} items created by {username}", items.len());
        Ok(items)
    }

    pub async fn courtesy_delay(&self) {
        tokio::time::sleep(self.delay).await;
    }
}
