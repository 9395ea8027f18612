//! Finds items created by a user that duplicate older community items, and
//! writes QuickStatements MERGE suggestions to a file for manual review.

use anyhow::{anyhow, Result};
use wdqc_rs::app_config::QcConfig;
use wdqc_rs::dup_finder::{summary_from_entity, DupFinder, MergePair};
use wdqc_rs::quickstatements::{merge_commands, output_filename, preview};
use wdqc_rs::wikidata_api::WikidataApi;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let config = QcConfig::load();
    let username = std::env::args()
        .nth(1)
        .ok_or_else(|| anyhow!("usage: dup_finder <username>"))?;

    let api = WikidataApi::new(&config)?;
    let created = api.user_created_items(&username).await?;
    if created.is_empty() {
        println!("No items created by {username} were found.");
        return Ok(());
    }

    let qids: Vec<String> = created.iter().map(|item| item.qid.to_owned()).collect();
    let entities = api.get_entities(&qids).await?;
    let language = config.language();
    let finder = DupFinder::new(&api, &language);

    let mut pairs: Vec<MergePair> = vec![];
    let mut processed = 0;
    for qid in &qids {
        let user_item = match entities
            .get(qid)
            .and_then(|entity| summary_from_entity(qid, entity, &language))
        {
            Some(user_item) => user_item,
            None => continue,
        };
        processed += 1;
        info!(
            "[{processed}/{}] Checking user item: {} ('{}')",
            qids.len(),
            user_item.qid,
            user_item.label.as_deref().unwrap_or("[no label]")
        );
        pairs.extend(finder.duplicates_for(&user_item).await?);
        api.courtesy_delay().await;
    }
    println!("\nProcessed {processed} user items.");

    if pairs.is_empty() {
        println!("No potential duplicates needing merges were found.");
        return Ok(());
    }
    let commands = merge_commands(&pairs);
    let filename = output_filename(&username);
    tokio::fs::write(&filename, &commands).await?;
    println!(
        "Found {} potential duplicate pairs.",
        commands.lines().count()
    );
    println!("First commands:\n{}", preview(&commands, 5));
    println!("\nQuickStatements file saved as: {filename}");
    println!("IMPORTANT: review every suggested merge before uploading.");
    println!("Verify the community item is genuinely older and the correct target.");
    Ok(())
}
