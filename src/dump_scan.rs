use crate::entity_details::Coordinate;
use serde_json::Value;
use std::io::BufRead;
use tracing::warn;

/// One line of a `latest-all.json` style dump, classified. The dump is a
/// giant JSON array with one entity per line; lines end with a comma and the
/// first and last lines are the array brackets.
#[derive(Debug, Clone, PartialEq)]
pub enum DumpLine {
    Entity(Value),
    Skip,
    Malformed(String),
}

pub fn parse_dump_line(line: &str) -> DumpLine {
    let trimmed = line.trim().trim_end_matches(',');
    if trimmed.is_empty() || trimmed == "[" || trimmed == "]" {
        return DumpLine::Skip;
    }
    match serde_json::from_str(trimmed) {
        Ok(entity) => DumpLine::Entity(entity),
        Err(e) => DumpLine::Malformed(e.to_string()),
    }
}

/// Iterates entities from a dump stream (typically `zcat ... |` on stdin),
/// logging and skipping malformed lines rather than aborting the scan.
pub fn entities<R: BufRead>(reader: R) -> impl Iterator<Item = Value> {
    reader.lines().filter_map(|line| match line {
        Ok(line) => match parse_dump_line(&line) {
            DumpLine::Entity(entity) => Some(entity),
            DumpLine::Skip => None,
            DumpLine::Malformed(e) => {
                warn!("Skipping malformed dump line: {e}");
                None
            }
        },
        Err(e) => {
            warn!("Error reading dump line: {e}");
            None
        }
    })
}

//________________________________________________________________________________________________________________________
// Accessors for the entity JSON shape shared by dumps and wbgetentities.

pub fn entity_id(entity: &Value) -> Option<&str> {
    entity["id"].as_str()
}

pub fn label<'a>(entity: &'a Value, language: &str) -> Option<&'a str> {
    entity["labels"][language]["value"].as_str()
}

pub fn description<'a>(entity: &'a Value, language: &str) -> Option<&'a str> {
    entity["descriptions"][language]["value"].as_str()
}

pub fn has_claim(entity: &Value, property: &str) -> bool {
    entity["claims"][property].as_array().map_or(false, |claims| !claims.is_empty())
}

fn claims<'a>(entity: &'a Value, property: &str) -> Vec<&'a Value> {
    entity["claims"][property]
        .as_array()
        .map(|claims| claims.iter().collect())
        .unwrap_or_default()
}

/// Entity-id values of a property's statements (e.g. the P31 types).
pub fn statement_values(entity: &Value, property: &str) -> Vec<String> {
    claims(entity, property)
        .iter()
        .filter_map(|claim| claim["mainsnak"]["datavalue"]["value"]["id"].as_str())
        .map(|id| id.to_string())
        .collect()
}

pub fn first_statement_value(entity: &Value, property: &str) -> Option<String> {
    statement_values(entity, property).into_iter().next()
}

/// Plain-string value of the first statement (external identifiers).
pub fn first_string_value(entity: &Value, property: &str) -> Option<String> {
    claims(entity, property)
        .first()
        .and_then(|claim| claim["mainsnak"]["datavalue"]["value"].as_str())
        .map(|value| value.to_string())
}

pub fn statement_ranks(entity: &Value, property: &str) -> Vec<String> {
    claims(entity, property)
        .iter()
        .filter_map(|claim| claim["rank"].as_str())
        .map(|rank| rank.to_string())
        .collect()
}

/// Coordinates from P625 statements (dump shape: numeric latitude/longitude).
pub fn coordinate_claims(entity: &Value) -> Vec<Coordinate> {
    claims(entity, "P625")
        .iter()
        .filter_map(|claim| {
            let value = &claim["mainsnak"]["datavalue"]["value"];
            let lat = value["latitude"].as_f64()?;
            let lon = value["longitude"].as_f64()?;
            Some(Coordinate { lat, lon })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn dump_lines_strip_commas_and_brackets() {
        assert_eq!(parse_dump_line("["), DumpLine::Skip);
        assert_eq!(parse_dump_line("]"), DumpLine::Skip);
        assert_eq!(parse_dump_line(""), DumpLine::Skip);
        match parse_dump_line(r#"{"id":"Q1"},"#) {
            DumpLine::Entity(entity) => assert_eq!(entity_id(&entity), Some("Q1")),
            other => panic!("expected entity, got {:?}", other),
        }
        match parse_dump_line("{broken") {
            DumpLine::Malformed(_) => {}
            other => panic!("expected malformed, got {:?}", other),
        }
    }

    #[test]
    fn entity_iterator_skips_bad_lines() {
        let dump = "[\n{\"id\":\"Q1\"},\n{nope\n{\"id\":\"Q2\"}\n]\n";
        let ids: Vec<String> = entities(Cursor::new(dump))
            .filter_map(|entity| entity_id(&entity).map(|id| id.to_string()))
            .collect();
        assert_eq!(ids, vec!["Q1", "Q2"]);
    }

    #[test]
    fn statement_accessors() {
        let entity = json!({
            "id": "Q1",
            "labels": {"en": {"value": "thing"}},
            "descriptions": {"en": {"value": "a thing"}},
            "claims": {
                "P31": [
                    {"mainsnak": {"datavalue": {"value": {"id": "Q5"}}}, "rank": "normal"},
                    {"mainsnak": {"datavalue": {"value": {"id": "Q42"}}}, "rank": "deprecated"}
                ],
                "P1225": [
                    {"mainsnak": {"datavalue": {"value": "ABC123"}}}
                ],
                "P625": [
                    {"mainsnak": {"datavalue": {"value": {"latitude": 1.5, "longitude": -2.5}}}}
                ]
            }
        });
        assert_eq!(label(&entity, "en"), Some("thing"));
        assert_eq!(description(&entity, "en"), Some("a thing"));
        assert_eq!(description(&entity, "de"), None);
        assert_eq!(statement_values(&entity, "P31"), vec!["Q5", "Q42"]);
        assert_eq!(first_statement_value(&entity, "P31"), Some("Q5".to_string()));
        assert_eq!(
            first_string_value(&entity, "P1225"),
            Some("ABC123".to_string())
        );
        assert_eq!(statement_ranks(&entity, "P31"), vec!["normal", "deprecated"]);
        assert!(has_claim(&entity, "P625"));
        assert!(!has_claim(&entity, "P17"));
        let coordinates = coordinate_claims(&entity);
        assert_eq!(coordinates.len(), 1);
        assert!((coordinates[0].lat - 1.5).abs() < f64::EPSILON);
        assert!((coordinates[0].lon - -2.5).abs() < f64::EPSILON);
    }
}
