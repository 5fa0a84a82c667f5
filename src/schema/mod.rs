#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// The question slot type.
pub mod question;
/// Loading a schema from an assessment description file.
pub mod source;

use std::{collections::HashMap, path::Path};

use indexmap::IndexMap;
use serde::Serialize;
use tabled::Tabled;

pub use question::Question;
pub use source::{LoadedSchema, load_schema, output_stem};

/// Errors raised while building a schema.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum SchemaError {
    /// An identifier (direct or alternative) is already taken.
    #[error("Question `{id}` is declared more than once in the assessment.")]
    DuplicateQuestion {
        /// The identifier that collided.
        id: String,
    },
    /// A question entry carries neither an `id` nor any `alternatives`.
    #[error("Question #{ordinal} in zone {zone} has neither an id nor alternatives.")]
    MissingIdentifier {
        /// Zone index, 0-based.
        zone:    usize,
        /// Schema-wide ordinal the question would have taken.
        ordinal: usize,
    },
}

/// Ordered set of questions for one assessment.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    /// Question slots keyed by primary identifier, in insertion order.
    questions: IndexMap<String, Question>,
    /// Maps every alternative identifier to its primary identifier.
    aliases:   HashMap<String, String>,
}

impl Schema {
    /// Creates an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a question slot.
    ///
    /// Fails without modifying the schema when the primary identifier or any
    /// alternative identifier already resolves to a slot.
    pub fn add_question(&mut self, question: Question) -> Result<(), SchemaError> {
        let mut seen = Vec::new();
        for id in question.identifiers() {
            if self.contains(id) || seen.contains(&id) {
                return Err(SchemaError::DuplicateQuestion { id: id.to_string() });
            }
            seen.push(id);
        }

        let primary = question.id().to_string();
        for alias in question.identifiers().skip(1) {
            self.aliases.insert(alias.to_string(), primary.clone());
        }
        self.questions.insert(primary, question);
        Ok(())
    }

    /// Returns whether `id` resolves to a slot.
    pub fn contains(&self, id: &str) -> bool {
        self.questions.contains_key(id) || self.aliases.contains_key(id)
    }

    /// Resolves a direct or alternative identifier to its slot.
    pub fn get_question(&self, id: &str) -> Option<&Question> {
        self.questions
            .get(id)
            .or_else(|| self.aliases.get(id).and_then(|p| self.questions.get(p)))
    }

    /// Mutable counterpart of [`Schema::get_question`].
    pub(crate) fn get_question_mut(&mut self, id: &str) -> Option<&mut Question> {
        let primary = match self.aliases.get(id) {
            Some(primary) => primary.clone(),
            None => id.to_string(),
        };
        self.questions.get_mut(&primary)
    }

    /// Registers a matched file on the slot owning `id`.
    pub(crate) fn register_file(&mut self, id: &str, path: &Path) {
        if let Some(question) = self.get_question_mut(id) {
            question.add_file(path);
        }
    }

    /// Number of distinct question slots.
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    /// Number of identifiers, alternatives included.
    pub fn variant_count(&self) -> usize {
        self.questions.len() + self.aliases.len()
    }

    /// Iterates over slots in insertion order.
    pub fn questions(&self) -> impl Iterator<Item = &Question> {
        self.questions.values()
    }

    /// One table row per slot, used by `plgspl info`.
    pub fn overview(&self) -> Vec<QuestionRow> {
        self.questions()
            .map(|q| QuestionRow {
                ordinal:  q.ordinal(),
                id:       q.id().to_string(),
                variants: q.variants().join(", "),
                parts:    q.parts().join(", "),
                files:    q.expected_files().iter().cloned().collect::<Vec<_>>().join(", "),
            })
            .collect()
    }
}

/// A printable summary of one question slot.
#[derive(Tabled, Serialize, Debug, Clone)]
pub struct QuestionRow {
    #[tabled(rename = "#")]
    /// Ordinal position.
    pub ordinal:  usize,
    #[tabled(rename = "Question")]
    /// Primary identifier.
    pub id:       String,
    #[tabled(rename = "Variants")]
    /// Alternatives, comma separated.
    pub variants: String,
    #[tabled(rename = "Parts")]
    /// Sub-part labels, comma separated.
    pub parts:    String,
    #[tabled(rename = "Files")]
    /// Expected file kinds, comma separated.
    pub files:    String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(ids: &[&str], ordinal: usize) -> Question {
        Question::builder()
            .id(ids[0])
            .ordinal(ordinal)
            .variants(ids.iter().map(|s| s.to_string()))
            .number_choose(1)
            .build()
    }

    #[test]
    fn alternatives_resolve_to_the_same_slot() {
        let mut schema = Schema::new();
        schema.add_question(group(&["q1a", "q1b", "q1c"], 1)).unwrap();

        for id in ["q1a", "q1b", "q1c"] {
            let q = schema.get_question(id).expect("resolves");
            assert_eq!(q.id(), "q1a");
            assert_eq!(q.ordinal(), 1);
        }
        assert!(schema.get_question("q1d").is_none());
    }

    #[test]
    fn duplicate_alternative_leaves_schema_untouched() {
        let mut schema = Schema::new();
        schema
            .add_question(Question::builder().id("q2").ordinal(1).build())
            .unwrap();

        let err = schema.add_question(group(&["q3", "q2"], 2)).unwrap_err();
        assert_eq!(err, SchemaError::DuplicateQuestion { id: "q2".into() });
        assert_eq!(schema.question_count(), 1);
        assert_eq!(schema.variant_count(), 1);
        assert!(schema.get_question("q3").is_none());
    }

    #[test]
    fn counts_distinguish_slots_from_variants() {
        let mut schema = Schema::new();
        schema
            .add_question(Question::builder().id("intro").ordinal(1).build())
            .unwrap();
        schema.add_question(group(&["a", "b"], 2)).unwrap();

        assert_eq!(schema.question_count(), 2);
        assert_eq!(schema.variant_count(), 3);
    }

    #[test]
    fn registered_files_land_on_the_group_primary() {
        let mut schema = Schema::new();
        schema.add_question(group(&["a", "b"], 1)).unwrap();
        schema.register_file("b", Path::new("/tmp/x_b_1_2_code.py"));

        let files = schema.get_question("a").unwrap().files();
        assert_eq!(files.len(), 1);
    }
}
