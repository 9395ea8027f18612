use crate::coord_check::{CheckResult, CheckStatus, CheckTally};
use std::collections::BTreeMap;

pub fn wikidata_url(qid: &str) -> String {
    format!("https://www.wikidata.org/wiki/{}", qid)
}

/// Printed when stage 1 or stage 2 produced nothing usable; better than an
/// empty, misleading report.
pub fn print_nothing_to_process(reason: &str) {
    println!("Nothing to process: {reason}");
}

fn format_coordinate(result: &CheckResult) -> String {
    match result.coordinate {
        Some(coordinate) => format!("Lat={:.4}, Lon={:.4}", coordinate.lat, coordinate.lon),
        None => "None".to_string(),
    }
}

/// Final console report: the capped most-implausible section, then a summary
/// of everything that could not be fully checked. `results` must already be
/// sorted (see coord_check::sort_results).
pub fn print_report(results: &[CheckResult], tally: &CheckTally, limit: usize) {
    println!();
    println!("{}", "=".repeat(40));
    println!("Final report");
    println!("{}", "=".repeat(40));

    println!("\nChecked {} items", results.len());
    println!("  - Compared against a boundary: {}", tally.checked);
    println!("    - Inside: {}", tally.inside);
    println!("    - Outside: {}", tally.outside);
    println!("  - Could not check (missing data/geometry): {}", tally.missing);
    println!("  - Errors (fetch or check): {}", tally.errors);
    if tally.repaired > 0 {
        println!("  - Repaired invalid geometries: {}", tally.repaired);
    }

    let outside: Vec<&CheckResult> = results
        .iter()
        .filter(|result| result.status == CheckStatus::Outside)
        .collect();
    if outside.is_empty() {
        println!("\nNo items found with status 'Outside'.");
    } else {
        println!(
            "\nTop {} potential mismatches (status 'Outside', sorted by score):",
            limit.min(outside.len())
        );
        for (i, result) in outside.iter().take(limit).enumerate() {
            println!(
                "\n{}. {} ({})",
                i + 1,
                wikidata_url(&result.qid),
                result.label.as_deref().unwrap_or("[No Label]")
            );
            println!("   Coord: {}", format_coordinate(result));
            println!(
                "   Country: {} ({})",
                result
                    .country_qid
                    .as_deref()
                    .map_or_else(|| "None".to_string(), wikidata_url),
                result.country_label.as_deref().unwrap_or("[No Country Label]")
            );
            println!(
                "   Score (distance in degrees): {:.4}",
                result.score.unwrap_or(0.0)
            );
        }
    }

    let issues = summarize_issues(results);
    if issues.is_empty() {
        println!("\nAll items were either 'Inside' or 'Outside'.");
    } else {
        let not_checked: usize = issues.values().sum();
        println!("\nItems not fully checked ({} items):", not_checked);
        for (status, count) in issues {
            println!("- {}: {} items", status, count);
        }
    }
}

/// Counts per status for everything that is neither inside nor outside.
pub fn summarize_issues(results: &[CheckResult]) -> BTreeMap<&'static str, usize> {
    let mut issues: BTreeMap<&'static str, usize> = BTreeMap::new();
    for result in results {
        if result.status.bucket() == 2 {
            *issues.entry(result.status.describe()).or_insert(0) += 1;
        }
    }
    issues
}
