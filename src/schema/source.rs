#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use super::{Question, Schema, SchemaError};

/// Title used when the assessment does not declare one.
const DEFAULT_TITLE: &str = "assignment";

/// Top level of an assessment description file.
#[derive(Debug, Deserialize)]
struct AssessmentInfo {
    /// Human readable title.
    #[serde(default)]
    title: Option<String>,
    /// Question zones, in display order.
    #[serde(default)]
    zones: Vec<Zone>,
}

/// A zone groups questions; only its question list matters here.
#[derive(Debug, Deserialize)]
struct Zone {
    /// Questions declared in this zone.
    #[serde(default)]
    questions: Vec<RawQuestion>,
}

/// One question entry as written in the description file.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawQuestion {
    /// Direct identifier, absent for alternative groups.
    id:            Option<String>,
    /// Alternative variants sharing this slot.
    #[serde(default)]
    alternatives:  Vec<RawAlternative>,
    /// How many alternatives a student answers.
    number_choose: Option<usize>,
    /// Sub-part labels.
    #[serde(default)]
    parts:         Vec<String>,
    /// Expected uploaded file names.
    #[serde(default)]
    files:         Vec<String>,
}

/// One entry of an `alternatives` list.
#[derive(Debug, Deserialize)]
struct RawAlternative {
    /// Variant identifier.
    id: String,
}

/// A schema together with the assessment title it was declared under.
#[derive(Debug, Clone)]
pub struct LoadedSchema {
    /// Assessment title, or `"assignment"` when none is declared.
    pub title:  String,
    /// The parsed question schema.
    pub schema: Schema,
}

/// Turns a title into the prefix used for every output file.
pub fn output_stem(title: &str) -> String {
    title.replace(' ', "_")
}

/// Reads an assessment description file and builds its schema.
pub fn load_schema(path: &Path) -> Result<LoadedSchema> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Could not read assessment file {}", path.display()))?;
    parse_schema(&raw)
        .with_context(|| format!("Could not parse assessment file {}", path.display()))
}

/// Builds a schema from the JSON text of an assessment description.
pub fn parse_schema(raw: &str) -> Result<LoadedSchema> {
    let info: AssessmentInfo = serde_json::from_str(raw)?;
    let title = info.title.unwrap_or_else(|| DEFAULT_TITLE.to_string());

    let mut schema = Schema::new();
    let mut ordinal = 0;
    for (zone_index, zone) in info.zones.into_iter().enumerate() {
        for raw_q in zone.questions {
            ordinal += 1;
            schema.add_question(build_question(raw_q, zone_index, ordinal)?)?;
        }
    }

    tracing::info!(
        "Parsed config. Created {} questions and {} variants.",
        schema.question_count(),
        schema.variant_count()
    );

    Ok(LoadedSchema { title, schema })
}

/// Converts one raw entry into a question slot.
fn build_question(raw: RawQuestion, zone: usize, ordinal: usize) -> Result<Question, SchemaError> {
    let variants: Vec<String> = raw.alternatives.into_iter().map(|a| a.id).collect();

    let id = match (raw.id, variants.first()) {
        (Some(id), _) => id,
        (None, Some(first)) => first.clone(),
        (None, None) => return Err(SchemaError::MissingIdentifier { zone, ordinal }),
    };

    Ok(Question::builder()
        .id(id)
        .ordinal(ordinal)
        .variants(variants)
        .maybe_number_choose(raw.number_choose)
        .parts(raw.parts)
        .expected_files(raw.files)
        .build())
}

#[cfg(test)]
mod tests {
    use super::*;

    const INFO: &str = r#"{
        "title": "Midterm Exam 1",
        "zones": [
            { "questions": [
                { "id": "intro", "parts": ["a", "b"] },
                { "numberChoose": 1, "alternatives": [{ "id": "pool/v1" }, { "id": "pool/v2" }] }
            ]},
            { "questions": [ { "id": "code", "files": ["main.py"], "points": 5 } ] }
        ]
    }"#;

    #[test]
    fn ordinals_run_across_zones() {
        let loaded = parse_schema(INFO).expect("parse");
        let ordinals: Vec<(String, usize)> = loaded
            .schema
            .questions()
            .map(|q| (q.id().to_string(), q.ordinal()))
            .collect();

        assert_eq!(
            ordinals,
            vec![("intro".into(), 1), ("pool/v1".into(), 2), ("code".into(), 3)]
        );
        assert_eq!(loaded.title, "Midterm Exam 1");
        assert_eq!(output_stem(&loaded.title), "Midterm_Exam_1");
    }

    #[test]
    fn alternative_group_takes_first_variant_as_primary() {
        let loaded = parse_schema(INFO).expect("parse");
        let q = loaded.schema.get_question("pool/v2").expect("variant resolves");
        assert_eq!(q.id(), "pool/v1");
        assert_eq!(q.number_choose(), Some(1));
        assert_eq!(loaded.schema.variant_count(), 4);
    }

    #[test]
    fn missing_title_falls_back() {
        let loaded = parse_schema(r#"{ "zones": [] }"#).expect("parse");
        assert_eq!(loaded.title, "assignment");
        assert_eq!(loaded.schema.question_count(), 0);
    }

    #[test]
    fn entry_without_identifier_is_rejected() {
        let err = parse_schema(r#"{ "zones": [ { "questions": [ { "parts": [] } ] } ] }"#)
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<SchemaError>(),
            Some(&SchemaError::MissingIdentifier { zone: 0, ordinal: 1 })
        );
    }

    #[test]
    fn duplicate_across_zones_is_rejected() {
        let raw = r#"{ "zones": [
            { "questions": [ { "id": "q1" } ] },
            { "questions": [ { "alternatives": [ { "id": "q2" }, { "id": "q1" } ] } ] }
        ] }"#;
        let err = parse_schema(raw).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SchemaError>(),
            Some(SchemaError::DuplicateQuestion { id }) if id == "q1"
        ));
    }
}
