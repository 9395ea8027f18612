use crate::sparql::SparqlClient;
use anyhow::Result;
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

/// Everything stage 2 learns about one item. Fields fill in as bindings
/// arrive; `fetch_error` is set when the whole batch failed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemDetails {
    pub label: Option<String>,
    pub coordinate: Option<Coordinate>,
    pub country_qid: Option<String>,
    pub country_label: Option<String>,
    pub fetch_error: Option<String>,
}

/// Outcome of parsing one WKT-like coordinate literal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointParse {
    Valid(Coordinate),
    OutOfRange { lat: f64, lon: f64 },
    NoMatch,
}

/// Parses the `Point(<lon> <lat>)` serialization used by wdt:P625.
/// Longitude comes first in the literal.
pub fn parse_point(coord: &str) -> PointParse {
    lazy_static! {
        static ref RE_POINT: Regex = Regex::new(
            r"^Point\(\s*(?P<lon>[-+]?\d*\.?\d+)\s+(?P<lat>[-+]?\d*\.?\d+)\s*\)"
        )
        .expect("parse_point RE_POINT is invalid");
    }
    let caps = match RE_POINT.captures(coord) {
        Some(caps) => caps,
        None => return PointParse::NoMatch,
    };
    let lon: f64 = match caps["lon"].parse() {
        Ok(lon) => lon,
        Err(_) => return PointParse::NoMatch,
    };
    let lat: f64 = match caps["lat"].parse() {
        Ok(lat) => lat,
        Err(_) => return PointParse::NoMatch,
    };
    if (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon) {
        PointParse::Valid(Coordinate { lat, lon })
    } else {
        PointParse::OutOfRange { lat, lon }
    }
}

/// Merges one SPARQL binding into an item record. Within a batch the last
/// binding processed wins for every field it carries a value for
/// (last-write-wins; the ISO code lookup in country_geometry.rs deliberately
/// does the opposite).
pub fn apply_binding(qid: &str, details: &mut ItemDetails, binding: &Value) {
    if let Some(label) = binding["itemLabel"]["value"].as_str() {
        details.label = Some(label.to_string());
    }
    if let Some(coord) = binding["coord"]["value"].as_str() {
        match parse_point(coord) {
            PointParse::Valid(coordinate) => details.coordinate = Some(coordinate),
            PointParse::OutOfRange { lat, lon } => {
                warn!("Invalid lat/lon range for {qid}: ({lat}, {lon})");
            }
            PointParse::NoMatch => {
                warn!("Could not parse coordinate for {qid}: {coord}");
            }
        }
    }
    if let Some(country) = binding["country"]["value"].as_str() {
        if let Some(country_qid) = SparqlClient::entity_from_uri(country) {
            details.country_qid = Some(country_qid);
        }
    }
    if let Some(country_label) = binding["countryLabel"]["value"].as_str() {
        details.country_label = Some(country_label.to_string());
    }
}

/// Stage 2: batched SPARQL lookup of label, coordinate and country per QID.
#[derive(Debug)]
pub struct DetailFetcher<'a> {
    sparql: &'a SparqlClient,
    batch_size: usize,
}

impl<'a> DetailFetcher<'a> {
    pub fn new(sparql: &'a SparqlClient, batch_size: usize) -> Self {
        Self { sparql, batch_size }
    }

    pub async fn fetch(&self, qids: &[String]) -> Result<HashMap<String, ItemDetails>> {
        let mut results: HashMap<String, ItemDetails> = HashMap::new();
        let batches = (qids.len() + self.batch_size - 1) / self.batch_size;
        info!(
            "Fetching details for {} QIDs in batches of {}",
            qids.len(),
            self.batch_size
        );
        for (batch_number, batch) in qids.chunks(self.batch_size).enumerate() {
            info!(
                "Processing SPARQL batch {}/{} ({} QIDs)",
                batch_number + 1,
                batches,
                batch.len()
            );
            if let Err(e) = self.fetch_batch(batch, &mut results).await {
                warn!(
                    "Error during SPARQL query for batch starting at {}: {e}",
                    batch[0]
                );
                // Error is scoped to this batch; do not overwrite items that
                // already got details from an earlier batch.
                for qid in batch {
                    results.entry(qid.to_owned()).or_insert_with(|| ItemDetails {
                        fetch_error: Some(e.to_string()),
                        ..ItemDetails::default()
                    });
                }
            }
            self.sparql.courtesy_delay().await;
        }
        info!("Finished fetching details, processed {} QIDs", results.len());
        Ok(results)
    }

    async fn fetch_batch(
        &self,
        batch: &[String],
        results: &mut HashMap<String, ItemDetails>,
    ) -> Result<()> {
        let query = format!(
            "SELECT ?item ?itemLabel ?coord ?country ?countryLabel WHERE {{
              VALUES ?item {{ {} }}
              OPTIONAL {{ ?item wdt:P625 ?coord . }}
              OPTIONAL {{ ?item wdt:P17 ?country . }}
              SERVICE wikibase:label {{ bd:serviceParam wikibase:language \"[AUTO_LANGUAGE],en\". }}
            }}",
            SparqlClient::values_clause(batch)
        );
        let response = self.sparql.query(&query).await?;
        for binding in SparqlClient::bindings(&response) {
            let qid = match binding["item"]["value"]
                .as_str()
                .and_then(SparqlClient::entity_from_uri)
            {
                Some(qid) => qid,
                None => continue,
            };
            let details = results.entry(qid.to_owned()).or_default();
            apply_binding(&qid, details, &binding);
        }
        Ok(())
    }
}

/// Rebuilds stage-1 input order, so downstream stable sorts keep it as the
/// final tie-breaker.
pub fn in_input_order(
    qids: &[String],
    mut details: HashMap<String, ItemDetails>,
) -> Vec<(String, ItemDetails)> {
    qids.iter()
        .map(|qid| (qid.to_owned(), details.remove(qid).unwrap_or_default()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_parse_round_trip() {
        match parse_point("Point(-105.96 35.68)") {
            PointParse::Valid(coordinate) => {
                assert!((coordinate.lat - 35.68).abs() < f64::EPSILON);
                assert!((coordinate.lon - -105.96).abs() < f64::EPSILON);
            }
            other => panic!("expected valid coordinate, got {:?}", other),
        }
    }

    #[test]
    fn point_parse_allows_comma_free_whitespace() {
        assert_eq!(
            parse_point("Point( 12.5 -8 )"),
            PointParse::Valid(Coordinate {
                lat: -8.0,
                lon: 12.5
            })
        );
    }

    #[test]
    fn point_parse_rejects_out_of_range() {
        assert_eq!(
            parse_point("Point(200.0 10.0)"),
            PointParse::OutOfRange {
                lat: 10.0,
                lon: 200.0
            }
        );
        assert_eq!(
            parse_point("Point(10.0 95.0)"),
            PointParse::OutOfRange {
                lat: 95.0,
                lon: 10.0
            }
        );
    }

    #[test]
    fn point_parse_rejects_garbage() {
        assert_eq!(parse_point("POINT(1 2)"), PointParse::NoMatch);
        assert_eq!(parse_point(""), PointParse::NoMatch);
    }

    #[test]
    fn binding_merge_is_last_write_wins() {
        let mut details = ItemDetails::default();
        let first = json!({
            "itemLabel": {"value": "Foo"},
            "country": {"value": "http://www.wikidata.org/entity/Q30"},
            "countryLabel": {"value": "United States"}
        });
        let second = json!({
            "country": {"value": "http://www.wikidata.org/entity/Q16"},
            "countryLabel": {"value": "Canada"}
        });
        apply_binding("Q1", &mut details, &first);
        apply_binding("Q1", &mut details, &second);
        // Conflicting country: the last binding wins.
        assert_eq!(details.country_qid.as_deref(), Some("Q16"));
        assert_eq!(details.country_label.as_deref(), Some("Canada"));
        // Label only present in the first binding: kept.
        assert_eq!(details.label.as_deref(), Some("Foo"));
    }

    #[test]
    fn unparseable_coordinate_does_not_clear_earlier_one() {
        let mut details = ItemDetails::default();
        apply_binding(
            "Q1",
            &mut details,
            &json!({"coord": {"value": "Point(1.0 2.0)"}}),
        );
        apply_binding("Q1", &mut details, &json!({"coord": {"value": "bogus"}}));
        assert_eq!(
            details.coordinate,
            Some(Coordinate { lat: 2.0, lon: 1.0 })
        );
    }

    #[test]
    fn input_order_is_preserved() {
        let qids = vec!["Q5".to_string(), "Q1".to_string(), "Q9".to_string()];
        let mut details = HashMap::new();
        details.insert(
            "Q1".to_string(),
            ItemDetails {
                label: Some("one".to_string()),
                ..ItemDetails::default()
            },
        );
        let ordered = in_input_order(&qids, details);
        let order: Vec<&str> = ordered.iter().map(|(qid, _)| qid.as_str()).collect();
        assert_eq!(order, vec!["Q5", "Q1", "Q9"]);
        // Missing QIDs become empty records, not errors.
        assert_eq!(ordered[0].1, ItemDetails::default());
    }
}
