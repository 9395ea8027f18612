use crate::entity_details::{Coordinate, ItemDetails};
use geo::orient::{Direction, Orient};
use geo::{Contains, EuclideanDistance, MultiPolygon, Point, Validation};
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::warn;

//________________________________________________________________________________________________________________________

/// Terminal state of one record. No retries within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    Outside,
    Inside,
    MissingCoordinate,
    MissingCountry,
    MissingGeometry,
    FetchError,
    CheckError,
}

impl CheckStatus {
    /// Report bucket: outside first, then inside, then everything else.
    pub fn bucket(&self) -> u8 {
        match self {
            Self::Outside => 0,
            Self::Inside => 1,
            _ => 2,
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Self::Outside => "Outside",
            Self::Inside => "Inside",
            Self::MissingCoordinate => "Missing Coordinate (P625)",
            Self::MissingCountry => "Missing Country (P17)",
            Self::MissingGeometry => "Missing Country Geometry",
            Self::FetchError => "Fetch Error",
            Self::CheckError => "Check Error",
        }
    }
}

//________________________________________________________________________________________________________________________

#[derive(Debug, Clone)]
pub struct CheckResult {
    pub qid: String,
    pub label: Option<String>,
    pub coordinate: Option<Coordinate>,
    pub country_qid: Option<String>,
    pub country_label: Option<String>,
    pub status: CheckStatus,
    pub score: Option<f64>,
}

/// Explicit accumulator for run statistics; stages pass it along instead of
/// bumping process-wide counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckTally {
    pub checked: usize,
    pub inside: usize,
    pub outside: usize,
    pub missing: usize,
    pub errors: usize,
    pub repaired: usize,
    pub unrepairable: usize,
}

//________________________________________________________________________________________________________________________

/// Stage 4: containment check and implausibility scoring, in input order.
pub fn check_items(
    items: &[(String, ItemDetails)],
    geometries: &HashMap<String, MultiPolygon<f64>>,
) -> (Vec<CheckResult>, CheckTally) {
    let mut results: Vec<CheckResult> = Vec::with_capacity(items.len());
    let mut tally = CheckTally::default();

    for (qid, details) in items {
        let (status, score) = classify(qid, details, geometries, &mut tally);
        results.push(CheckResult {
            qid: qid.to_owned(),
            label: details.label.to_owned(),
            coordinate: details.coordinate,
            country_qid: details.country_qid.to_owned(),
            country_label: details.country_label.to_owned(),
            status,
            score,
        });
    }
    (results, tally)
}

fn classify(
    qid: &str,
    details: &ItemDetails,
    geometries: &HashMap<String, MultiPolygon<f64>>,
    tally: &mut CheckTally,
) -> (CheckStatus, Option<f64>) {
    if details.fetch_error.is_some() {
        tally.errors += 1;
        return (CheckStatus::FetchError, None);
    }
    let coordinate = match details.coordinate {
        Some(coordinate) => coordinate,
        None => {
            tally.missing += 1;
            return (CheckStatus::MissingCoordinate, None);
        }
    };
    let country_qid = match &details.country_qid {
        Some(country_qid) => country_qid,
        None => {
            tally.missing += 1;
            return (CheckStatus::MissingCountry, None);
        }
    };
    let geometry = match geometries.get(country_qid) {
        Some(geometry) => geometry,
        None => {
            tally.missing += 1;
            return (CheckStatus::MissingGeometry, None);
        }
    };
    match contain_and_score(qid, country_qid, coordinate, geometry, tally) {
        Some((status, score)) => (status, score),
        None => {
            tally.errors += 1;
            (CheckStatus::CheckError, None)
        }
    }
}

fn contain_and_score(
    qid: &str,
    country_qid: &str,
    coordinate: Coordinate,
    geometry: &MultiPolygon<f64>,
    tally: &mut CheckTally,
) -> Option<(CheckStatus, Option<f64>)> {
    // Longitude is x, latitude is y.
    let point = Point::new(coordinate.lon, coordinate.lat);

    let mut repaired: Option<MultiPolygon<f64>> = None;
    if !geometry.is_valid() {
        warn!("Geometry for country {country_qid} is invalid, attempting reorientation");
        let oriented = geometry.orient(Direction::Default);
        if oriented.is_valid() {
            tally.repaired += 1;
            repaired = Some(oriented);
        } else {
            warn!("Reorientation failed for {country_qid}, cannot check {qid}");
            tally.unrepairable += 1;
            return None;
        }
    }
    let geometry = repaired.as_ref().unwrap_or(geometry);

    tally.checked += 1;
    if geometry.contains(&point) {
        tally.inside += 1;
        Some((CheckStatus::Inside, Some(0.0)))
    } else {
        tally.outside += 1;
        // Planar distance in degrees, not geodesic. The score only ranks.
        let score = point.euclidean_distance(geometry);
        Some((CheckStatus::Outside, Some(score)))
    }
}

/// Report order: outside (largest score first), then inside, then the rest.
/// The sort is stable, so ties keep stage-1 input order.
pub fn sort_results(results: &mut [CheckResult]) {
    results.sort_by(|a, b| {
        a.status
            .bucket()
            .cmp(&b.status.bucket())
            .then_with(|| match (a.status, b.status) {
                (CheckStatus::Outside, CheckStatus::Outside) => b
                    .score
                    .partial_cmp(&a.score)
                    .unwrap_or(Ordering::Equal),
                _ => Ordering::Equal,
            })
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;

    fn geometries_with(qid: &str, geometry: MultiPolygon<f64>) -> HashMap<String, MultiPolygon<f64>> {
        let mut geometries = HashMap::new();
        geometries.insert(qid.to_string(), geometry);
        geometries
    }

    // Asymmetric in lat/lon on purpose: lon 0..10, lat 40..50.
    fn rectangle() -> MultiPolygon<f64> {
        MultiPolygon(vec![polygon![
            (x: 0.0, y: 40.0),
            (x: 10.0, y: 40.0),
            (x: 10.0, y: 50.0),
            (x: 0.0, y: 50.0),
        ]])
    }

    fn details(coordinate: Option<Coordinate>, country: Option<&str>) -> ItemDetails {
        ItemDetails {
            coordinate,
            country_qid: country.map(|c| c.to_string()),
            ..ItemDetails::default()
        }
    }

    #[test]
    fn inside_point_scores_zero() {
        let items = vec![(
            "Q1".to_string(),
            details(Some(Coordinate { lat: 45.0, lon: 5.0 }), Some("Q30")),
        )];
        let (results, tally) = check_items(&items, &geometries_with("Q30", rectangle()));
        assert_eq!(results[0].status, CheckStatus::Inside);
        assert_eq!(results[0].score, Some(0.0));
        assert_eq!(tally.inside, 1);
        assert_eq!(tally.checked, 1);
    }

    #[test]
    fn outside_point_gets_positive_planar_score() {
        // Spec example: (lat=35.68, lon=-105.96) against a polygon that does
        // not contain it.
        let items = vec![(
            "Q1".to_string(),
            details(
                Some(Coordinate {
                    lat: 35.68,
                    lon: -105.96,
                }),
                Some("Q30"),
            ),
        )];
        let (results, tally) = check_items(&items, &geometries_with("Q30", rectangle()));
        assert_eq!(results[0].status, CheckStatus::Outside);
        let score = results[0].score.unwrap();
        assert!(score > 0.0);
        // Nearest boundary point is (0, 40): plain degree-space distance.
        let expected = (105.96_f64.powi(2) + (40.0 - 35.68_f64).powi(2)).sqrt();
        assert!((score - expected).abs() < 1e-9);
        assert_eq!(tally.outside, 1);
    }

    #[test]
    fn point_construction_is_lon_lat() {
        // (lat=45, lon=5) is inside the rectangle; swapping the axes is not.
        let inside = vec![(
            "Q1".to_string(),
            details(Some(Coordinate { lat: 45.0, lon: 5.0 }), Some("Q30")),
        )];
        let swapped = vec![(
            "Q1".to_string(),
            details(Some(Coordinate { lat: 5.0, lon: 45.0 }), Some("Q30")),
        )];
        let (results, _) = check_items(&inside, &geometries_with("Q30", rectangle()));
        assert_eq!(results[0].status, CheckStatus::Inside);
        let (results, _) = check_items(&swapped, &geometries_with("Q30", rectangle()));
        assert_eq!(results[0].status, CheckStatus::Outside);
    }

    #[test]
    fn missing_fields_map_to_statuses() {
        let geometries = geometries_with("Q30", rectangle());
        let items = vec![
            ("Q1".to_string(), details(None, Some("Q30"))),
            (
                "Q2".to_string(),
                details(Some(Coordinate { lat: 1.0, lon: 1.0 }), None),
            ),
            (
                "Q3".to_string(),
                details(Some(Coordinate { lat: 1.0, lon: 1.0 }), Some("Q99")),
            ),
            (
                "Q4".to_string(),
                ItemDetails {
                    fetch_error: Some("boom".to_string()),
                    ..ItemDetails::default()
                },
            ),
        ];
        let (results, tally) = check_items(&items, &geometries);
        assert_eq!(results[0].status, CheckStatus::MissingCoordinate);
        assert_eq!(results[0].score, None);
        assert_eq!(results[1].status, CheckStatus::MissingCountry);
        assert_eq!(results[2].status, CheckStatus::MissingGeometry);
        assert_eq!(results[3].status, CheckStatus::FetchError);
        assert_eq!(tally.missing, 3);
        assert_eq!(tally.errors, 1);
    }

    #[test]
    fn no_coordinate_wins_over_country_data() {
        // An item with country data but no coordinate is missing-coordinate,
        // score None, regardless of the rest.
        let items = vec![(
            "Q1".to_string(),
            ItemDetails {
                country_qid: Some("Q30".to_string()),
                country_label: Some("United States".to_string()),
                ..ItemDetails::default()
            },
        )];
        let (results, _) = check_items(&items, &geometries_with("Q30", rectangle()));
        assert_eq!(results[0].status, CheckStatus::MissingCoordinate);
        assert_eq!(results[0].score, None);
    }

    #[test]
    fn report_ordering() {
        let mut results = vec![
            CheckResult {
                qid: "Q1".to_string(),
                label: None,
                coordinate: None,
                country_qid: None,
                country_label: None,
                status: CheckStatus::Inside,
                score: Some(0.0),
            },
            CheckResult {
                qid: "Q2".to_string(),
                label: None,
                coordinate: None,
                country_qid: None,
                country_label: None,
                status: CheckStatus::Outside,
                score: Some(1.0),
            },
            CheckResult {
                qid: "Q3".to_string(),
                label: None,
                coordinate: None,
                country_qid: None,
                country_label: None,
                status: CheckStatus::Outside,
                score: Some(5.0),
            },
        ];
        sort_results(&mut results);
        let order: Vec<&str> = results.iter().map(|r| r.qid.as_str()).collect();
        assert_eq!(order, vec!["Q3", "Q2", "Q1"]);
    }

    #[test]
    fn stable_sort_keeps_input_order_for_other_statuses() {
        let make = |qid: &str, status| CheckResult {
            qid: qid.to_string(),
            label: None,
            coordinate: None,
            country_qid: None,
            country_label: None,
            status,
            score: None,
        };
        let mut results = vec![
            make("Q9", CheckStatus::MissingCountry),
            make("Q2", CheckStatus::FetchError),
            make("Q5", CheckStatus::MissingCoordinate),
        ];
        sort_results(&mut results);
        let order: Vec<&str> = results.iter().map(|r| r.qid.as_str()).collect();
        assert_eq!(order, vec!["Q9", "Q2", "Q5"]);
    }
}
