//! Checks whether items listed on an on-wiki report page have a coordinate
//! (P625) inside the boundary of their stated country (P17), and ranks the
//! mismatches by distance.

use anyhow::Result;
use wdqc_rs::app_config::QcConfig;
use wdqc_rs::coord_check::{check_items, sort_results};
use wdqc_rs::country_geometry::{
    fetch_country_codes, resolve_geometries, CountryBoundaries,
};
use wdqc_rs::entity_details::{in_input_order, DetailFetcher};
use wdqc_rs::qid_source::QidSource;
use wdqc_rs::qid_source_page::SourcePage;
use wdqc_rs::report::{print_nothing_to_process, print_report};
use wdqc_rs::sparql::SparqlClient;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let config = QcConfig::load();

    // Stage 1: QIDs from the report page.
    let source = SourcePage::new(&config.target_page(), &config);
    let mut qids = source.run().await?;
    if qids.is_empty() {
        print_nothing_to_process("no QIDs found on the target page");
        return Ok(());
    }
    if let Some(limit) = config.process_qid_limit() {
        info!("Limiting run to the first {limit} QIDs");
        qids.truncate(limit);
    }

    // Stage 2: label, coordinate and country per item.
    let sparql = SparqlClient::new(&config)?;
    let fetcher = DetailFetcher::new(&sparql, config.sparql_batch_size());
    let details = fetcher.fetch(&qids).await?;
    if details.values().all(|d| d.fetch_error.is_some()) {
        print_nothing_to_process("every detail lookup failed");
        return Ok(());
    }

    // Stage 3: country boundaries, matched via ISO A3 codes.
    let mut country_qids: Vec<String> = details
        .values()
        .filter_map(|d| d.country_qid.to_owned())
        .collect();
    country_qids.sort();
    country_qids.dedup();
    let codes = fetch_country_codes(&sparql, &country_qids, config.iso_code_batch_size()).await;
    let boundaries = match CountryBoundaries::load(&config.boundaries_file()) {
        Ok(boundaries) => boundaries,
        Err(e) => {
            // Every item then reports missing-geometry instead of aborting.
            warn!("Could not load boundaries: {e}");
            CountryBoundaries::new()
        }
    };
    let geometries = resolve_geometries(&codes, &boundaries);

    // Stage 4: containment and scoring, then the report.
    let items = in_input_order(&qids, details);
    let (mut results, tally) = check_items(&items, &geometries);
    sort_results(&mut results);
    print_report(&results, &tally, config.detailed_output_limit());
    Ok(())
}
