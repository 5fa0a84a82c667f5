#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use anyhow::{Context, Result};
use itertools::Itertools;
use serde_json::Value;

use super::{PageDocument, Renderer};
use crate::{
    schema::{Question, Schema},
    submission::{StudentAnswer, Submission},
};

/// Placeholder for an empty answer or part.
const NO_ANSWER: &str = "(no answer)";

/// Renders answers as wrapped plain text, one question per page run.
#[derive(Debug, Clone, Copy)]
pub struct TextRenderer {
    /// Maximum characters per line.
    wrap_width: usize,
}

impl TextRenderer {
    /// Creates a renderer wrapping lines at `wrap_width` characters.
    pub fn new(wrap_width: usize) -> Self {
        Self {
            wrap_width: wrap_width.max(1),
        }
    }

    /// Writes `text` to `doc`, wrapped.
    fn write(&self, doc: &mut PageDocument, text: &str) {
        for line in wrap(text, self.wrap_width) {
            doc.push_line(line);
        }
    }

    /// Renders one answer, starting on a fresh page.
    fn render_answer(
        &self,
        uid: &str,
        question: &Question,
        answer: &StudentAnswer,
        doc: &mut PageDocument,
    ) -> Result<()> {
        doc.add_page();
        let header = if answer.qid == question.id() {
            format!("{uid} | Question {}: {}", question.ordinal(), answer.qid)
        } else {
            format!(
                "{uid} | Question {}: {} (variant of {})",
                question.ordinal(),
                answer.qid,
                question.id()
            )
        };
        self.write(doc, &header);
        doc.push_line("");

        for line in answer_lines(question, &answer.submitted_answer) {
            self.write(doc, &line);
        }

        for path in answer.files.paths() {
            doc.push_line("");
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            self.write(doc, &format!("File: {name}"));

            let bytes = std::fs::read(path)
                .with_context(|| format!("Could not read submitted file {}", path.display()))?;
            match String::from_utf8(bytes) {
                Ok(contents) => self.write(doc, &contents),
                Err(_) => self.write(doc, "[binary file, not shown]"),
            }
        }

        Ok(())
    }
}

impl Default for TextRenderer {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_WRAP_WIDTH)
    }
}

impl Renderer for TextRenderer {
    fn render(
        &self,
        submission: &Submission,
        schema: &Schema,
        doc: &mut PageDocument,
    ) -> Result<()> {
        let ordered = submission
            .answers()
            .filter_map(|answer| schema.get_question(&answer.qid).map(|q| (q, answer)))
            .sorted_by_key(|(q, _)| q.ordinal());

        for (question, answer) in ordered {
            self.render_answer(submission.uid(), question, answer, doc)?;
        }
        Ok(())
    }
}

/// Turns a raw answer into display lines.
///
/// JSON objects are laid out by the question's parts when it declares any,
/// otherwise key by key. Anything else is shown verbatim.
fn answer_lines(question: &Question, raw: &str) -> Vec<String> {
    if raw.trim().is_empty() {
        return vec![NO_ANSWER.to_string()];
    }

    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) if !question.parts().is_empty() => question
            .parts()
            .iter()
            .map(|part| format!("{part}: {}", map.get(part).map_or(NO_ANSWER.into(), display)))
            .collect(),
        Ok(Value::Object(map)) if !map.is_empty() => map
            .iter()
            .map(|(key, value)| format!("{key}: {}", display(value)))
            .collect(),
        Ok(Value::String(s)) => vec![s],
        _ => vec![raw.to_string()],
    }
}

/// Shows strings without quotes, everything else as compact JSON.
fn display(value: &Value) -> String {
    match value {
        Value::String(s) if s.is_empty() => NO_ANSWER.to_string(),
        Value::String(s) => s.clone(),
        Value::Null => NO_ANSWER.to_string(),
        other => other.to_string(),
    }
}

/// Splits `text` into lines of at most `width` characters.
///
/// Embedded newlines are honored and tabs expand to four spaces.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut out = Vec::new();
    for line in text.replace('\t', "    ").lines() {
        if line.is_empty() {
            out.push(String::new());
            continue;
        }
        let chars: Vec<char> = line.chars().collect();
        out.extend(chars.chunks(width).map(|chunk| chunk.iter().collect::<String>()));
    }
    if out.is_empty() {
        out.push(String::new());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::files::FileBundle;

    fn question(parts: &[&str]) -> Question {
        Question::builder()
            .id("q1")
            .ordinal(1)
            .parts(parts.iter().map(|s| s.to_string()))
            .build()
    }

    fn answer(qid: &str, raw: &str) -> StudentAnswer {
        StudentAnswer {
            uid:              "a".into(),
            qid:              qid.into(),
            submitted_answer: raw.into(),
            true_answer:      String::new(),
            params:           String::new(),
            partial_scores:   String::new(),
            files:            FileBundle::empty(qid),
        }
    }

    #[test]
    fn wraps_long_lines_and_keeps_blank_ones() {
        assert_eq!(wrap("abcdef\n\ngh", 4), ["abcd", "ef", "", "gh"]);
        assert_eq!(wrap("", 4), [""]);
    }

    #[test]
    fn parts_drive_object_layout() {
        let lines = answer_lines(&question(&["a", "b"]), r#"{"b": 2, "a": "x", "c": 3}"#);
        assert_eq!(lines, ["a: x", "b: 2"]);
    }

    #[test]
    fn missing_part_is_marked() {
        let lines = answer_lines(&question(&["a", "b"]), r#"{"a": "x"}"#);
        assert_eq!(lines, ["a: x", "b: (no answer)"]);
    }

    #[test]
    fn plain_text_is_verbatim() {
        assert_eq!(answer_lines(&question(&[]), "hello"), ["hello"]);
        assert_eq!(answer_lines(&question(&[]), "  "), [NO_ANSWER]);
    }

    #[test]
    fn each_question_starts_a_page_in_ordinal_order() {
        let mut schema = Schema::new();
        schema.add_question(question(&[])).unwrap();
        schema
            .add_question(Question::builder().id("q2").ordinal(2).build())
            .unwrap();

        let mut sub = Submission::new("a");
        sub.add_answer(answer("q2", "second"));
        sub.add_answer(answer("q1", "first"));
        sub.add_answer(answer("gone", "dropped"));

        let mut doc = PageDocument::new(40);
        TextRenderer::new(80).render(&sub, &schema, &mut doc).unwrap();

        assert_eq!(doc.page_count(), 2);
        assert_eq!(doc.pages()[0].lines()[0], "a | Question 1: q1");
        assert_eq!(doc.pages()[1].lines()[2], "second");
    }
}
