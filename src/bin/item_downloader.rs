//! Downloads full entity JSON for a list of QIDs and writes it to stdout,
//! one entity per line (redirect to a file for later filtering).

use anyhow::{anyhow, Result};
use wdqc_rs::app_config::QcConfig;
use wdqc_rs::qid_source::QidSource;
use wdqc_rs::qid_source_file::SourceFile;
use wdqc_rs::wikidata_api::WikidataApi;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let config = QcConfig::load();
    let path = std::env::args()
        .nth(1)
        .ok_or_else(|| anyhow!("usage: item_downloader <qid-file>"))?;

    let qids = SourceFile::new(&path).run().await?;
    let entities = WikidataApi::new(&config)?.get_entities(&qids).await?;

    // Keep the input order in the output.
    for qid in &qids {
        if let Some(entity) = entities.get(qid) {
            println!("{}", serde_json::to_string(entity)?);
        }
    }
    Ok(())
}
