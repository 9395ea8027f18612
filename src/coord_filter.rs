use crate::dump_scan;
use crate::entity_details::Coordinate;
use geo::{Contains, MultiPolygon, Point};
use serde_json::Value;
use std::collections::HashMap;
use tracing::info;

/// Item types that dominate the implausible-coordinate report but are known
/// to be noise (ships, asteroids, paintings and so on). Accumulated from
/// earlier runs.
pub static FILTER_TYPES: &[&str] = &[
    "Q23442", "Q207524", "Q184358", "Q190107", "Q28337", "Q503269", "Q1402592", "Q7944",
    "Q852190", "Q3002150", "Q963729", "Q749622", "Q211748", "Q783953", "Q27020041", "Q366301",
    "Q133156", "Q26213387", "Q1261499", "Q178561", "Q19953632", "Q332602", "Q11702690",
    "Q29102902", "Q744913", "Q165", "Q813672", "Q192611", "Q570554", "Q14660", "Q9319988",
    "Q3305213", "Q785020", "Q191992", "Q34198935", "Q1310961", "Q620225", "Q39594", "Q2360219",
    "Q674775", "Q105999", "Q11446", "Q41767843", "Q2811", "Q3487904", "Q21507948", "Q13406463",
    "Q1357601", "Q3024240", "Q4164871", "Q17018380", "Q188055", "Q28716292", "Q1377943",
    "Q119253", "Q55436365", "Q123695", "Q33837", "Q1229765", "Q1795675", "Q2362867", "Q1190554",
    "Q134851", "Q1140477", "Q32099", "Q24529780", "Q57833747", "Q41982239", "Q28966115",
    "Q55193679", "Q7888495", "Q37901", "Q7843791", "Q213283", "Q1161185", "Q3917681", "Q997267",
    "Q29898672", "Q1069932", "Q96251935", "Q1210950", "Q39715", "Q187223", "Q47781032",
];

/// Counts for everything the filter removed, plus the P31 types of the
/// survivors (to grow `FILTER_TYPES` in later runs).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterTally {
    pub filtered: usize,
    pub deprecated: usize,
    pub off_earth: usize,
    pub antarctica: usize,
    pub type_counts: HashMap<String, usize>,
}

/// Items surviving the filter, split by whether some axis flip of their
/// coordinate lands inside the claimed country.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterOutcome {
    pub flippable: Vec<(String, Vec<(f64, f64)>)>,
    pub other: Vec<String>,
    pub tally: FilterTally,
}

/// True when any P31 value is a known-noise type. Survivor types are counted
/// into the tally.
pub fn is_filtered_type(entity: &Value, tally: &mut FilterTally) -> bool {
    let types = dump_scan::statement_values(entity, "P31");
    if types.iter().any(|t| FILTER_TYPES.contains(&t.as_str())) {
        return true;
    }
    for t in types {
        *tally.type_counts.entry(t).or_insert(0) += 1;
    }
    false
}

/// True when any country or coordinate claim is deprecated. The conflict may
/// already be acknowledged on-wiki, so the item is dropped from the report.
pub fn has_deprecated_conflict(entity: &Value) -> bool {
    dump_scan::statement_ranks(entity, "P17")
        .iter()
        .chain(dump_scan::statement_ranks(entity, "P625").iter())
        .any(|rank| rank == "deprecated")
}

/// Items with P376 (located on astronomical body) may not be on Earth, so a
/// country containment check is meaningless.
pub fn is_off_earth(entity: &Value) -> bool {
    dump_scan::has_claim(entity, "P376")
}

/// First P30 (continent) being Antarctica (Q51). Antarctic items rarely have
/// a meaningful country boundary.
pub fn is_antarctica(entity: &Value) -> bool {
    dump_scan::first_statement_value(entity, "P30").as_deref() == Some("Q51")
}

/// The eight sign/axis permutations of a coordinate, claimed value first.
pub fn coordinate_flips(lat: f64, lon: f64) -> [(f64, f64); 8] {
    [
        (lat, lon),
        (-lat, lon),
        (lat, -lon),
        (-lat, -lon),
        (lon, lat),
        (-lon, lat),
        (lon, -lat),
        (-lon, -lat),
    ]
}

/// Flips of the item's coordinates that land inside the claimed country's
/// boundary. The claimed value itself is included, so an empty result means
/// no permutation works, not that the original was fine.
pub fn workable_flips(
    coordinates: &[Coordinate],
    geometry: &MultiPolygon<f64>,
) -> Vec<(f64, f64)> {
    let mut workable: Vec<(f64, f64)> = vec![];
    for coordinate in coordinates {
        for (lat, lon) in coordinate_flips(coordinate.lat, coordinate.lon) {
            if geometry.contains(&Point::new(lon, lat)) {
                workable.push((lat, lon));
            }
        }
    }
    workable
}

/// Runs the whole filter over entity JSON, in input order. `geometries` is
/// keyed by country QID, as produced by country_geometry::resolve_geometries.
pub fn filter_items(
    entities: &[Value],
    geometries: &HashMap<String, MultiPolygon<f64>>,
) -> FilterOutcome {
    let mut outcome = FilterOutcome::default();
    for entity in entities {
        let qid = match dump_scan::entity_id(entity) {
            Some(qid) => qid.to_string(),
            None => continue,
        };
        if is_off_earth(entity) {
            info!("{qid} may not be on Earth, skipping");
            outcome.tally.off_earth += 1;
            continue;
        }
        if is_antarctica(entity) {
            info!("{qid} is in Antarctica, skipping");
            outcome.tally.antarctica += 1;
            continue;
        }
        if is_filtered_type(entity, &mut outcome.tally) {
            outcome.tally.filtered += 1;
            continue;
        }
        if has_deprecated_conflict(entity) {
            outcome.tally.deprecated += 1;
            continue;
        }
        let flips = dump_scan::first_statement_value(entity, "P17")
            .and_then(|country| geometries.get(&country))
            .map(|geometry| workable_flips(&dump_scan::coordinate_claims(entity), geometry))
            .unwrap_or_default();
        if flips.is_empty() {
            outcome.other.push(qid);
        } else {
            outcome.flippable.push((qid, flips));
        }
    }
    outcome
}

/// The `n` most frequent survivor types, most frequent first. Ties break by
/// QID so the output is deterministic.
pub fn most_common(type_counts: &HashMap<String, usize>, n: usize) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = type_counts
        .iter()
        .map(|(qid, count)| (qid.to_owned(), *count))
        .collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    counts.truncate(n);
    counts
}
