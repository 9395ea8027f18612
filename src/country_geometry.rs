use crate::sparql::SparqlClient;
use anyhow::{anyhow, Result};
use geo::{Geometry, MultiPolygon};
use geojson::{FeatureCollection, GeoJson};
use serde_json::Value;
use std::collections::HashMap;
use std::convert::TryFrom;
use tracing::{info, warn};

/// Property names carrying the ISO 3166-1 alpha-3 code in Natural Earth
/// exports, in preference order.
pub static ISO_A3_PROPERTIES: &[&str] = &["ADM0_A3", "ISO_A3_EH", "ISO_A3"];

/// Queries P298 (ISO 3166-1 alpha-3) for the given country QIDs, in batches.
/// A failed batch is logged and skipped.
pub async fn fetch_country_codes(
    sparql: &SparqlClient,
    country_qids: &[String],
    batch_size: usize,
) -> HashMap<String, String> {
    let mut mapping: HashMap<String, String> = HashMap::new();
    info!(
        "Querying for ISO A3 codes (P298) for {} countries",
        country_qids.len()
    );
    for batch in country_qids.chunks(batch_size) {
        let query = format!(
            "SELECT ?country ?isoCode WHERE {{
              VALUES ?country {{ {} }}
              ?country wdt:P298 ?isoCode .
            }}",
            SparqlClient::values_clause(batch)
        );
        match sparql.query(&query).await {
            Ok(response) => {
                for binding in SparqlClient::bindings(&response) {
                    let qid = binding["country"]["value"]
                        .as_str()
                        .and_then(SparqlClient::entity_from_uri);
                    let code = binding["isoCode"]["value"].as_str();
                    if let (Some(qid), Some(code)) = (qid, code) {
                        merge_code(&mut mapping, &qid, code);
                    }
                }
            }
            Err(e) => warn!("Error during SPARQL query for ISO codes batch: {e}"),
        }
        sparql.courtesy_delay().await;
    }
    info!("Found ISO A3 codes for {} countries", mapping.len());
    mapping
}

/// The first code seen for a country wins. This is the opposite of the
/// last-write-wins merge in entity_details.rs; the asymmetry is intentional
/// and kept as-is (see DESIGN.md).
pub fn merge_code(mapping: &mut HashMap<String, String>, qid: &str, code: &str) {
    if !mapping.contains_key(qid) {
        mapping.insert(qid.to_string(), code.trim().to_uppercase());
    }
}

/// Country boundary polygons keyed by ISO A3 code, loaded once per run from
/// a Natural-Earth-style GeoJSON file.
#[derive(Debug, Default)]
pub struct CountryBoundaries {
    by_code: HashMap<String, MultiPolygon<f64>>,
}

impl CountryBoundaries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(path: &str) -> Result<Self> {
        info!("Loading country boundaries from {path}");
        let raw = std::fs::read_to_string(path)?;
        let geojson: GeoJson = raw.parse()?;
        let collection = match geojson {
            GeoJson::FeatureCollection(collection) => collection,
            _ => return Err(anyhow!("{path} is not a GeoJSON FeatureCollection")),
        };
        let iso_property = detect_iso_property(&collection).ok_or_else(|| {
            anyhow!(
                "No ISO A3 property ({}) found in {path}",
                ISO_A3_PROPERTIES.join("/")
            )
        })?;
        info!("Using '{iso_property}' property for country matching");

        let mut boundaries = Self::new();
        for feature in collection.features {
            let code = match feature
                .properties
                .as_ref()
                .and_then(|properties| properties.get(iso_property))
                .and_then(Value::as_str)
            {
                Some(code) => code.to_string(),
                None => continue,
            };
            let geometry = match feature.geometry {
                Some(geometry) => geometry,
                None => continue,
            };
            let geometry = match Geometry::<f64>::try_from(geometry.value) {
                Ok(geometry) => geometry,
                Err(e) => {
                    warn!("Skipping unparseable geometry for {code}: {e}");
                    continue;
                }
            };
            let multi = match geometry {
                Geometry::MultiPolygon(multi) => multi,
                Geometry::Polygon(polygon) => MultiPolygon(vec![polygon]),
                _ => {
                    warn!("Skipping non-polygon geometry for {code}");
                    continue;
                }
            };
            if multi.0.is_empty() {
                continue;
            }
            boundaries.add(&code, multi);
        }
        info!("Loaded {} country boundaries", boundaries.len());
        Ok(boundaries)
    }

    pub fn add(&mut self, code: &str, geometry: MultiPolygon<f64>) {
        self.by_code
            .entry(code.trim().to_uppercase())
            .or_insert(geometry);
    }

    pub fn for_code(&self, code: &str) -> Option<&MultiPolygon<f64>> {
        self.by_code.get(code)
    }

    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }
}

fn detect_iso_property(collection: &FeatureCollection) -> Option<&'static str> {
    ISO_A3_PROPERTIES
        .iter()
        .find(|key| {
            collection.features.iter().any(|feature| {
                feature
                    .properties
                    .as_ref()
                    .map_or(false, |properties| properties.contains_key(**key))
            })
        })
        .copied()
}

/// Maps country QIDs to boundary geometries via their ISO codes. Countries
/// with no code or no boundary match are simply absent; the scorer surfaces
/// them as missing-geometry.
pub fn resolve_geometries(
    codes: &HashMap<String, String>,
    boundaries: &CountryBoundaries,
) -> HashMap<String, MultiPolygon<f64>> {
    let mut geometries: HashMap<String, MultiPolygon<f64>> = HashMap::new();
    let mut unmatched = 0;
    for (qid, code) in codes {
        match boundaries.for_code(code) {
            Some(geometry) => {
                geometries.insert(qid.to_owned(), geometry.to_owned());
            }
            None => unmatched += 1,
        }
    }
    info!("Found geometries for {} countries", geometries.len());
    if unmatched > 0 {
        info!("{unmatched} countries with ISO codes had no boundary match");
    }
    geometries
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;

    #[test]
    fn code_merge_is_first_match_wins() {
        let mut mapping = HashMap::new();
        merge_code(&mut mapping, "Q16", "can");
        merge_code(&mut mapping, "Q16", "XXX");
        assert_eq!(mapping.get("Q16").map(String::as_str), Some("CAN"));
    }

    #[test]
    fn code_is_normalized() {
        let mut mapping = HashMap::new();
        merge_code(&mut mapping, "Q30", " usa ");
        assert_eq!(mapping.get("Q30").map(String::as_str), Some("USA"));
    }

    #[test]
    fn resolve_skips_unknown_codes() {
        let mut boundaries = CountryBoundaries::new();
        let square = polygon![
            (x: 0.0, y: 0.0),
            (x: 1.0, y: 0.0),
            (x: 1.0, y: 1.0),
            (x: 0.0, y: 1.0),
        ];
        boundaries.add("USA", MultiPolygon(vec![square]));

        let mut codes = HashMap::new();
        codes.insert("Q30".to_string(), "USA".to_string());
        codes.insert("Q16".to_string(), "CAN".to_string());

        let geometries = resolve_geometries(&codes, &boundaries);
        assert!(geometries.contains_key("Q30"));
        assert!(!geometries.contains_key("Q16"));
    }

    #[test]
    fn load_feature_collection() {
        let geojson = r#"{
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "properties": {"ADM0_A3": "TST"},
                    "geometry": {
                        "type": "Polygon",
                        "coordinates": [[[0.0, 0.0], [2.0, 0.0], [2.0, 2.0], [0.0, 2.0], [0.0, 0.0]]]
                    }
                },
                {
                    "type": "Feature",
                    "properties": {"OTHER": 1},
                    "geometry": null
                }
            ]
        }"#;
        let dir = std::env::temp_dir().join("wdqc_boundaries_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("boundaries.geojson");
        std::fs::write(&path, geojson).unwrap();

        let boundaries = CountryBoundaries::load(path.to_str().unwrap()).unwrap();
        assert_eq!(boundaries.len(), 1);
        assert!(boundaries.for_code("TST").is_some());
        assert!(boundaries.for_code("XXX").is_none());
    }
}
