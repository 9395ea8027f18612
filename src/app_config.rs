use serde_json::Value;
use std::fs::File;
use tracing::info;

pub static DEFAULT_USER_AGENT: &str =
    "wdqc_rs/0.1 (https://www.wikidata.org/wiki/User:Jamie7687)";
pub static DEFAULT_API_ENDPOINT: &str = "https://www.wikidata.org/w/api.php";
pub static DEFAULT_SPARQL_ENDPOINT: &str = "https://query.wikidata.org/sparql";
pub static DEFAULT_TARGET_PAGE: &str =
    "https://www.wikidata.org/wiki/User:Pasleim/Implausible/coordinate";
pub static DEFAULT_BOUNDARIES_FILE: &str = "ne_110m_admin_0_countries.geojson";

/// Optional `config.json` in the working directory. Every key has a default,
/// so all binaries run without one.
#[derive(Debug, Clone)]
pub struct QcConfig {
    config: Value,
}

impl QcConfig {
    pub fn load() -> Self {
        match File::open("config.json") {
            Ok(file) => match serde_json::from_reader(file) {
                Ok(config) => {
                    info!("Using config.json");
                    Self { config }
                }
                Err(e) => {
                    info!("Could not parse config.json ({e}), using defaults");
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    pub fn new_from_value(config: Value) -> Self {
        Self { config }
    }

    fn str_or(&self, key: &str, default: &str) -> String {
        self.config[key]
            .as_str()
            .unwrap_or(default)
            .to_string()
    }

    fn usize_or(&self, key: &str, default: usize) -> usize {
        self.config[key].as_u64().map_or(default, |v| v as usize)
    }

    fn u64_or(&self, key: &str, default: u64) -> u64 {
        self.config[key].as_u64().unwrap_or(default)
    }

    pub fn user_agent(&self) -> String {
        self.str_or("user_agent", DEFAULT_USER_AGENT)
    }

    pub fn api_endpoint(&self) -> String {
        self.str_or("api_endpoint", DEFAULT_API_ENDPOINT)
    }

    pub fn sparql_endpoint(&self) -> String {
        self.str_or("sparql_endpoint", DEFAULT_SPARQL_ENDPOINT)
    }

    pub fn target_page(&self) -> String {
        self.str_or("target_page", DEFAULT_TARGET_PAGE)
    }

    pub fn boundaries_file(&self) -> String {
        self.str_or("boundaries_file", DEFAULT_BOUNDARIES_FILE)
    }

    pub fn language(&self) -> String {
        self.str_or("language", "en")
    }

    pub fn sparql_batch_size(&self) -> usize {
        self.usize_or("sparql_batch_size", 100)
    }

    /// ISO code lookups are cheap, so the batch can be larger.
    pub fn iso_code_batch_size(&self) -> usize {
        self.usize_or("iso_code_batch_size", 200)
    }

    pub fn sparql_delay_ms(&self) -> u64 {
        self.u64_or("sparql_delay_ms", 1000)
    }

    pub fn api_delay_ms(&self) -> u64 {
        self.u64_or("api_delay_ms", 1000)
    }

    pub fn request_timeout_secs(&self) -> u64 {
        self.u64_or("request_timeout_secs", 60)
    }

    pub fn detailed_output_limit(&self) -> usize {
        self.usize_or("detailed_output_limit", 25)
    }

    pub fn search_limit(&self) -> usize {
        self.usize_or("search_limit", 7)
    }

    pub fn max_user_items(&self) -> usize {
        self.usize_or("max_user_items", 10000)
    }

    /// Set to an integer for testing, absent for all.
    pub fn process_qid_limit(&self) -> Option<usize> {
        self.config["process_qid_limit"].as_u64().map(|v| v as usize)
    }
}

impl Default for QcConfig {
    fn default() -> Self {
        Self { config: json!({}) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_config() {
        let config = QcConfig::default();
        assert_eq!(config.sparql_batch_size(), 100);
        assert_eq!(config.iso_code_batch_size(), 200);
        assert_eq!(config.language(), "en");
        assert_eq!(config.process_qid_limit(), None);
        assert_eq!(config.api_endpoint(), DEFAULT_API_ENDPOINT);
    }

    #[test]
    fn overrides_from_value() {
        let config = QcConfig::new_from_value(json!({
            "sparql_batch_size": 10,
            "user_agent": "test-agent/0.0",
            "process_qid_limit": 5
        }));
        assert_eq!(config.sparql_batch_size(), 10);
        assert_eq!(config.user_agent(), "test-agent/0.0");
        assert_eq!(config.process_qid_limit(), Some(5));
        assert_eq!(config.sparql_endpoint(), DEFAULT_SPARQL_ENDPOINT);
    }
}
