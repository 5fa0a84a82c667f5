#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! The student → answered-questions map uploaded alongside the batches.

use std::path::Path;

use anyhow::{Context, Result};
use indexmap::IndexMap;

use crate::{schema::Schema, submission::Submission};

/// Question ids present per student, keyed by student id in discovery order.
pub type QuestionMap = IndexMap<String, Vec<String>>;

/// Lists the questions each submission answered.
pub fn question_map(submissions: &[Submission], schema: &Schema) -> QuestionMap {
    submissions
        .iter()
        .map(|s| (s.uid().to_string(), s.list_questions(schema)))
        .collect()
}

/// File name of the question map.
pub fn qmap_file_name(stem: &str) -> String {
    format!("{stem}_qmap.json")
}

/// Writes `map` as one JSON object to `path`.
pub fn write_question_map(map: &QuestionMap, path: &Path) -> Result<()> {
    let json = serde_json::to_string(map).context("Could not serialize question map")?;
    std::fs::write(path, json).with_context(|| format!("Could not write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{files::FileBundle, schema::Question, submission::StudentAnswer};

    fn answered(uid: &str, qids: &[&str]) -> Submission {
        let mut sub = Submission::new(uid);
        for qid in qids {
            sub.add_answer(StudentAnswer {
                uid:              uid.into(),
                qid:              qid.to_string(),
                submitted_answer: String::new(),
                true_answer:      String::new(),
                params:           String::new(),
                partial_scores:   String::new(),
                files:            FileBundle::empty(*qid),
            });
        }
        sub
    }

    #[test]
    fn map_is_independent_of_row_order() {
        let mut schema = Schema::new();
        for (i, id) in ["q1", "q2", "q3"].iter().enumerate() {
            schema
                .add_question(Question::builder().id(*id).ordinal(i + 1).build())
                .unwrap();
        }

        let map = question_map(
            &[answered("a", &["q3", "q1"]), answered("b", &["q2"]), answered("c", &[])],
            &schema,
        );

        assert_eq!(map["a"], ["q1", "q3"]);
        assert_eq!(map["b"], ["q2"]);
        assert!(map["c"].is_empty());
        assert_eq!(
            serde_json::to_string(&map).unwrap(),
            r#"{"a":["q1","q3"],"b":["q2"],"c":[]}"#
        );
    }
}
