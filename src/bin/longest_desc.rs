//! Prints successively longer English descriptions while scanning a dump.
//! Usage: zcat latest-all.json.gz | longest_desc

use wdqc_rs::desc_rules::{LongestTracker, LONGEST_SKIP};
use wdqc_rs::dump_scan;

fn main() {
    tracing_subscriber::fmt::init();
    let stdin = std::io::stdin();
    let mut tracker = LongestTracker::new();
    for entity in dump_scan::entities(stdin.lock()) {
        let qid = match dump_scan::entity_id(&entity) {
            Some(qid) => qid,
            None => continue,
        };
        if LONGEST_SKIP.contains(&qid) {
            continue;
        }
        if let Some(desc) = dump_scan::description(&entity, "en") {
            if tracker.observe(desc) {
                println!("{:<17}{}", qid, desc);
            }
        }
    }
}
