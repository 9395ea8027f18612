//! Filters a previously downloaded set of implausible-coordinate items down
//! to the ones worth a human look, and reports which of them could be fixed
//! by flipping a coordinate axis or sign.

use anyhow::{Context, Result};
use serde_json::Value;
use wdqc_rs::app_config::QcConfig;
use wdqc_rs::coord_filter::{filter_items, most_common};
use wdqc_rs::country_geometry::{
    fetch_country_codes, resolve_geometries, CountryBoundaries,
};
use wdqc_rs::dump_scan;
use wdqc_rs::report::{print_nothing_to_process, wikidata_url};
use wdqc_rs::sparql::SparqlClient;
use wdqc_rs::wikidata_api::WikidataApi;
use tracing::warn;

/// Entity JSON as written by item_downloader (one per line), or a plain JSON
/// array of entities.
fn read_entities(path: &str) -> Result<Vec<Value>> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("Could not read {path}"))?;
    if let Ok(Value::Array(entities)) = serde_json::from_str(&raw) {
        return Ok(entities);
    }
    Ok(raw
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| match serde_json::from_str(line) {
            Ok(entity) => Some(entity),
            Err(e) => {
                warn!("Skipping malformed line in {path}: {e}");
                None
            }
        })
        .collect())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let config = QcConfig::load();
    let path = std::env::args().nth(1).unwrap_or_else(|| "items.json".to_string());

    let entities = read_entities(&path)?;
    if entities.is_empty() {
        print_nothing_to_process("no entities in the input file");
        return Ok(());
    }

    // Boundaries for the flip check: one geometry per claimed country.
    let sparql = SparqlClient::new(&config)?;
    let mut country_qids: Vec<String> = entities
        .iter()
        .filter_map(|entity| dump_scan::first_statement_value(entity, "P17"))
        .collect();
    country_qids.sort();
    country_qids.dedup();
    let codes = fetch_country_codes(&sparql, &country_qids, config.iso_code_batch_size()).await;
    let boundaries = match CountryBoundaries::load(&config.boundaries_file()) {
        Ok(boundaries) => boundaries,
        Err(e) => {
            warn!("Could not load boundaries: {e}");
            CountryBoundaries::new()
        }
    };
    let geometries = resolve_geometries(&codes, &boundaries);

    let outcome = filter_items(&entities, &geometries);

    println!("Filtered by type: {}", outcome.tally.filtered);
    println!("Dropped for deprecated claims: {}", outcome.tally.deprecated);
    println!("Possibly not on Earth: {}", outcome.tally.off_earth);
    println!("In Antarctica: {}", outcome.tally.antarctica);

    println!("\nFlippable ({}):", outcome.flippable.len());
    for (qid, flips) in &outcome.flippable {
        println!("{}", wikidata_url(qid));
        for (lat, lon) in flips {
            println!("  ({lat}, {lon}) puts the coordinate in the claimed country");
        }
    }
    println!("\nOther ({}):", outcome.other.len());
    for qid in &outcome.other {
        println!("{}", wikidata_url(qid));
    }

    // Most frequent survivor types, labelled, as candidates for the filter
    // list in a later run.
    let common = most_common(&outcome.tally.type_counts, 50);
    if !common.is_empty() {
        let type_qids: Vec<String> = common.iter().map(|(qid, _)| qid.to_owned()).collect();
        let api = WikidataApi::new(&config)?;
        let type_entities = api.get_entities(&type_qids).await?;
        println!("\nMost common unfiltered types:");
        for (qid, count) in &common {
            let label = type_entities
                .get(qid)
                .and_then(|entity| dump_scan::label(entity, &config.language()))
                .unwrap_or("[no label]");
            println!("{:<24} {:>6}  {}", qid, count, label);
        }
    }
    Ok(())
}
