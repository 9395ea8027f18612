use crate::dump_scan;
use crate::wikidata_api::WikidataApi;
use anyhow::Result;
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::info;

/// The comparison-relevant subset of one entity.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemSummary {
    pub qid: String,
    pub label: Option<String>,
    pub description: Option<String>,
    pub p31: Vec<String>,
    pub page_id: u64,
}

/// Builds a summary from `wbgetentities` JSON. Returns None for missing
/// entities or entities without a page id.
pub fn summary_from_entity(qid: &str, entity: &Value, language: &str) -> Option<ItemSummary> {
    if entity.get("missing").is_some() {
        return None;
    }
    let page_id = entity["pageid"].as_u64()?;
    let mut p31: Vec<String> = dump_scan::statement_values(entity, "P31");
    p31.sort();
    p31.dedup();
    Some(ItemSummary {
        qid: qid.to_string(),
        label: dump_scan::label(entity, language).map(|label| label.to_string()),
        description: dump_scan::description(entity, language).map(|desc| desc.to_string()),
        p31,
        page_id,
    })
}

/// Lowercase, punctuation stripped, whitespace collapsed. Label search is
/// fuzzy; this is the strict equality we actually require.
pub fn normalize_label(label: &str) -> String {
    lazy_static! {
        static ref RE_PUNCT: Regex =
            Regex::new(r"[^\w\s]").expect("normalize_label RE_PUNCT is invalid");
        static ref RE_SPACE: Regex =
            Regex::new(r"\s+").expect("normalize_label RE_SPACE is invalid");
    }
    let text = label.to_lowercase();
    let text = RE_PUNCT.replace_all(&text, "");
    RE_SPACE.replace_all(&text, " ").trim().to_string()
}

/// A suggested merge: the user's newer item into the older community item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MergePair {
    pub newer: String,
    pub older: String,
}

/// The three duplicate criteria: the candidate must be older (lower page
/// id), carry the same normalized label, and have an identical P31 set.
pub fn is_older_duplicate(user_item: &ItemSummary, candidate: &ItemSummary) -> bool {
    let user_label = match &user_item.label {
        Some(label) => label,
        None => return false,
    };
    let candidate_label = match &candidate.label {
        Some(label) => label,
        None => return false,
    };
    if candidate.page_id >= user_item.page_id {
        return false;
    }
    if normalize_label(user_label) != normalize_label(candidate_label) {
        return false;
    }
    user_item.p31 == candidate.p31
}

/// Checks one user item against label-search candidates across all of
/// Wikidata.
#[derive(Debug)]
pub struct DupFinder<'a> {
    api: &'a WikidataApi,
    language: String,
}

impl<'a> DupFinder<'a> {
    pub fn new(api: &'a WikidataApi, language: &str) -> Self {
        Self {
            api,
            language: language.to_string(),
        }
    }

    pub async fn duplicates_for(&self, user_item: &ItemSummary) -> Result<Vec<MergePair>> {
        let label = match &user_item.label {
            Some(label) => label,
            None => return Ok(vec![]),
        };
        let candidates: Vec<String> = self
            .api
            .search_items(label)
            .await?
            .into_iter()
            .filter(|qid| *qid != user_item.qid)
            .collect();
        if candidates.is_empty() {
            return Ok(vec![]);
        }
        let entities = self.api.get_entities(&candidates).await?;
        let mut pairs: Vec<MergePair> = vec![];
        for (qid, entity) in &entities {
            let candidate = match summary_from_entity(qid, entity, &self.language) {
                Some(candidate) => candidate,
                None => continue,
            };
            if is_older_duplicate(user_item, &candidate) {
                info!(
                    "Potential duplicate: {} ('{}', page {}) -> {} (page {})",
                    user_item.qid,
                    label,
                    user_item.page_id,
                    candidate.qid,
                    candidate.page_id
                );
                pairs.push(MergePair {
                    newer: user_item.qid.to_owned(),
                    older: candidate.qid,
                });
            }
        }
        Ok(pairs)
    }
}

//________________________________________________________________________________________________________________________

/// Groups entities by the first claim value of an external-identifier
/// property. More than one member means duplicate items sharing the id.
pub fn group_by_identifier(entities: &[Value], property: &str) -> BTreeMap<String, Vec<String>> {
    let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for entity in entities {
        let qid = match dump_scan::entity_id(entity) {
            Some(qid) => qid.to_string(),
            None => continue,
        };
        let identifier = match dump_scan::first_string_value(entity, property) {
            Some(identifier) => identifier,
            None => continue,
        };
        groups.entry(identifier).or_default().push(qid);
    }
    groups
}

/// Merge commands for groups of exactly two: second member into the first.
pub fn merge_pairs_from_groups(groups: &BTreeMap<String, Vec<String>>) -> Vec<MergePair> {
    groups
        .values()
        .filter(|members| members.len() == 2)
        .map(|members| MergePair {
            newer: members[1].to_owned(),
            older: members[0].to_owned(),
        })
        .collect()
}
