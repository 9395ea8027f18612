//! Prints items whose English description reads like advertising copy.
//! Usage: zcat latest-all.json.gz | promo_check

use wdqc_rs::desc_rules::{is_promotional, PROMO_SKIP};
use wdqc_rs::dump_scan;

fn main() {
    tracing_subscriber::fmt::init();
    let stdin = std::io::stdin();
    for entity in dump_scan::entities(stdin.lock()) {
        let qid = match dump_scan::entity_id(&entity) {
            Some(qid) => qid,
            None => continue,
        };
        if PROMO_SKIP.contains(&qid) {
            continue;
        }
        if let Some(desc) = dump_scan::description(&entity, "en") {
            if is_promotional(desc) {
                println!("{:<17}{}", qid, desc);
            }
        }
    }
}
