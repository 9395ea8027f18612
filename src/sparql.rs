use crate::app_config::QcConfig;
use anyhow::{anyhow, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

/// Client for the Wikidata Query Service. One courtesy delay is owed after
/// every query; callers invoke `courtesy_delay` at the end of each batch.
#[derive(Debug, Clone)]
pub struct SparqlClient {
    client: reqwest::Client,
    endpoint: String,
    user_agent: String,
    delay: Duration,
}

impl SparqlClient {
    pub fn new(config: &QcConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.request_timeout_secs() + 10);
        let client = reqwest::ClientBuilder::new().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: config.sparql_endpoint(),
            user_agent: config.user_agent(),
            delay: Duration::from_millis(config.sparql_delay_ms()),
        })
    }

    pub async fn query(&self, sparql: &str) -> Result<Value> {
        let mut params: HashMap<String, String> = HashMap::new();
        params.insert("query".to_string(), sparql.to_string());
        params.insert("format".to_string(), "json".to_string());

        let response = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .form(&params)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(anyhow!("SPARQL query failed: HTTP {}", response.status()));
        }
        Ok(response.json().await?)
    }

    pub async fn courtesy_delay(&self) {
        tokio::time::sleep(self.delay).await;
    }

    pub fn bindings(result: &Value) -> Vec<Value> {
        result["results"]["bindings"]
            .as_array()
            .cloned()
            .unwrap_or_default()
    }

    /// `http://www.wikidata.org/entity/Q42` -> `Q42`
    pub fn entity_from_uri(uri: &str) -> Option<String> {
        let qid = uri.rsplit('/').next()?;
        if qid.is_empty() {
            None
        } else {
            Some(qid.to_string())
        }
    }

    pub fn values_clause(qids: &[String]) -> String {
        qids.iter()
            .map(|qid| format!("wd:{}", qid))
            .collect::<Vec<String>>()
            .join(" ")
    }
}
