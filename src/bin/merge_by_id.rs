//! Groups downloaded entities by a shared external identifier and prints
//! QuickStatements MERGE commands for the two-member groups.

use anyhow::{anyhow, Context, Result};
use serde_json::Value;
use wdqc_rs::dup_finder::{group_by_identifier, merge_pairs_from_groups};
use wdqc_rs::quickstatements::merge_commands;

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let mut args = std::env::args().skip(1);
    let path = args
        .next()
        .ok_or_else(|| anyhow!("usage: merge_by_id <entity-file> [property]"))?;
    let property = args.next().unwrap_or_else(|| "P1225".to_string());

    let raw = std::fs::read_to_string(&path).with_context(|| format!("Could not read {path}"))?;
    let entities: Vec<Value> = raw
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(serde_json::from_str)
        .collect::<Result<_, _>>()
        .with_context(|| format!("{path} is not one entity JSON per line"))?;

    let groups = group_by_identifier(&entities, &property);
    for (identifier, members) in &groups {
        if members.len() > 1 {
            println!("{} {:?}", identifier, members);
        }
    }
    let pairs = merge_pairs_from_groups(&groups);
    if pairs.is_empty() {
        println!("No two-member {property} groups found.");
    } else {
        println!("\nQuickStatements commands:");
        print!("{}", merge_commands(&pairs));
    }
    Ok(())
}
