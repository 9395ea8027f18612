//! Prints items whose English description trips enough lexical heuristics.
//! Usage: zcat latest-all.json.gz | desc_check

use wdqc_rs::desc_rules::{description_issues, ISSUE_THRESHOLD};
use wdqc_rs::dump_scan;

fn main() {
    tracing_subscriber::fmt::init();
    let stdin = std::io::stdin();
    for entity in dump_scan::entities(stdin.lock()) {
        let qid = match dump_scan::entity_id(&entity) {
            Some(qid) => qid,
            None => continue,
        };
        let desc = match dump_scan::description(&entity, "en") {
            Some(desc) => desc,
            None => continue,
        };
        let label = dump_scan::label(&entity, "en");
        if description_issues(label, desc).len() >= ISSUE_THRESHOLD {
            println!("{:<17}{}", qid, desc);
        }
    }
}
