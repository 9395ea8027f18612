use anyhow::Result;
use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;

/// Something that produces the list of QIDs a run will process.
#[async_trait]
pub trait QidSource {
    fn name(&self) -> String;
    async fn run(&self) -> Result<Vec<String>>;
}

/// Extracts `[[Q...]]` link tokens from wikitext, deduplicated and sorted.
pub fn extract_qids(wikitext: &str) -> Vec<String> {
    lazy_static! {
        static ref RE_QID: Regex =
            Regex::new(r"\[\[(Q[0-9]+)\]\]").expect("extract_qids RE_QID is invalid");
    }
    let mut qids: Vec<String> = RE_QID
        .captures_iter(wikitext)
        .map(|caps| caps[1].to_string())
        .collect();
    qids.sort();
    qids.dedup();
    qids
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_dedups_and_sorts() {
        let wikitext = "* [[Q42]] foo\n* [[Q1]] bar\n* [[Q42]]\nplain Q7 [[Category:X]]";
        assert_eq!(extract_qids(wikitext), vec!["Q1", "Q42"]);
    }

    #[test]
    fn empty_wikitext_yields_nothing() {
        assert!(extract_qids("").is_empty());
        assert!(extract_qids("no links here").is_empty());
    }
}
