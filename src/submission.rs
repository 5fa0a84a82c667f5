#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Grouping export rows into one submission per student.

use indexmap::IndexMap;
use serde::Serialize;

use crate::{
    export::ExportRow,
    files::{FileBundle, FileListing},
    schema::Schema,
};

/// Strips an `@domain` suffix from a raw student identifier.
pub fn student_id(raw_uid: &str) -> &str {
    raw_uid.split_once('@').map_or(raw_uid, |(uid, _)| uid)
}

/// One student's answer to one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudentAnswer {
    /// Student identifier, domain stripped.
    pub uid:              String,
    /// Question identifier as exported (may be an alternative variant).
    pub qid:              String,
    /// Raw answer the student submitted.
    pub submitted_answer: String,
    /// Reference answer.
    pub true_answer:      String,
    /// Question parameters.
    pub params:           String,
    /// Partial scores.
    pub partial_scores:   String,
    /// Uploaded files matched to this answer.
    pub files:            FileBundle,
}

/// Every answer one student gave, keyed by question id in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Submission {
    /// Owning student, domain stripped.
    uid:     String,
    /// Answers keyed by exported question id.
    answers: IndexMap<String, StudentAnswer>,
}

impl Submission {
    /// Creates an empty submission for `uid`.
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid:     uid.into(),
            answers: IndexMap::new(),
        }
    }

    /// Returns the owning student id.
    pub fn uid(&self) -> &str {
        &self.uid
    }

    /// Adds or replaces the answer for its question id.
    pub fn add_answer(&mut self, answer: StudentAnswer) {
        self.answers.insert(answer.qid.clone(), answer);
    }

    /// Returns the answer recorded for `qid`.
    pub fn answer(&self, qid: &str) -> Option<&StudentAnswer> {
        self.answers.get(qid)
    }

    /// Iterates over answers in first-seen order.
    pub fn answers(&self) -> impl Iterator<Item = &StudentAnswer> {
        self.answers.values()
    }

    /// Returns the number of answered questions.
    pub fn len(&self) -> usize {
        self.answers.len()
    }

    /// Returns whether no answer was recorded.
    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    /// Question ids present in this submission, in schema ordinal order.
    ///
    /// Ids the schema no longer resolves are dropped.
    pub fn list_questions(&self, schema: &Schema) -> Vec<String> {
        let mut present: Vec<(usize, &str)> = self
            .answers
            .keys()
            .filter_map(|qid| schema.get_question(qid).map(|q| (q.ordinal(), qid.as_str())))
            .collect();
        present.sort();
        present.into_iter().map(|(_, qid)| qid.to_string()).collect()
    }
}

/// Accumulates submissions from export rows.
#[derive(Debug)]
pub struct SubmissionBuilder<'a> {
    /// Question schema; receives matched files as a side effect.
    schema:      &'a mut Schema,
    /// Uploaded files, if a directory was given.
    listing:     Option<&'a FileListing>,
    /// Submissions keyed by student id, in discovery order.
    submissions: IndexMap<String, Submission>,
    /// Rows dropped because their question is unknown.
    skipped:     usize,
}

impl<'a> SubmissionBuilder<'a> {
    /// Starts a builder over `schema`, matching files from `listing`.
    pub fn new(schema: &'a mut Schema, listing: Option<&'a FileListing>) -> Self {
        Self {
            schema,
            listing,
            submissions: IndexMap::new(),
            skipped: 0,
        }
    }

    /// Folds one export row into its student's submission.
    ///
    /// The student's submission is created even when the row is skipped for
    /// naming an unknown question.
    pub fn add_row(&mut self, row: &ExportRow) {
        let uid = student_id(&row.uid);
        let submission = self
            .submissions
            .entry(uid.to_string())
            .or_insert_with(|| Submission::new(uid));

        let Some(question) = self.schema.get_question(&row.qid) else {
            tracing::debug!("Skipping row for unknown question `{}`", row.qid);
            self.skipped += 1;
            return;
        };

        let files = match self.listing {
            Some(listing) => listing.match_files(
                &row.uid,
                &row.qid,
                &row.submission_id,
                question.expected_files(),
            ),
            None => FileBundle::empty(&row.qid),
        };

        for path in files.paths() {
            self.schema.register_file(&row.qid, path);
        }

        submission.add_answer(StudentAnswer {
            uid: uid.to_string(),
            qid: row.qid.clone(),
            submitted_answer: row.submitted_answer.clone(),
            true_answer: row.true_answer.clone(),
            params: row.params.clone(),
            partial_scores: row.partial_scores.clone(),
            files,
        });
    }

    /// Number of rows skipped so far.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Returns the submissions in student discovery order.
    pub fn finish(self) -> Vec<Submission> {
        self.submissions.into_values().collect()
    }
}

/// Builds every submission from `rows`.
pub fn build_submissions(
    schema: &mut Schema,
    listing: Option<&FileListing>,
    rows: &[ExportRow],
) -> Vec<Submission> {
    let mut builder = SubmissionBuilder::new(schema, listing);
    for row in rows {
        builder.add_row(row);
    }
    if builder.skipped() > 0 {
        tracing::info!("Skipped {} row(s) naming unknown questions", builder.skipped());
    }
    let submissions = builder.finish();
    tracing::info!("Created {} submission(s)", submissions.len());
    submissions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Question;

    fn row(uid: &str, qid: &str, sid: &str, answer: &str) -> ExportRow {
        ExportRow {
            uid:              uid.into(),
            qid:              qid.into(),
            submission_id:    sid.into(),
            params:           String::new(),
            true_answer:      String::new(),
            submitted_answer: answer.into(),
            partial_scores:   String::new(),
        }
    }

    fn schema() -> Schema {
        let mut schema = Schema::new();
        schema
            .add_question(
                Question::builder()
                    .id("q1")
                    .ordinal(1)
                    .expected_files(["main.py".to_string()])
                    .build(),
            )
            .unwrap();
        schema
            .add_question(Question::builder().id("q2").ordinal(2).build())
            .unwrap();
        schema
    }

    #[test]
    fn strips_domain_suffix() {
        assert_eq!(student_id("abc123@school.edu"), "abc123");
        assert_eq!(student_id("abc123"), "abc123");
        assert_eq!(student_id("a@b@c"), "a");
    }

    #[test]
    fn groups_rows_by_student_in_discovery_order() {
        let mut schema = schema();
        let rows = vec![
            row("b@x.edu", "q1", "1", "b1"),
            row("a@x.edu", "q1", "2", "a1"),
            row("b@x.edu", "q2", "3", "b2"),
        ];
        let subs = build_submissions(&mut schema, None, &rows);

        assert_eq!(subs.iter().map(Submission::uid).collect::<Vec<_>>(), ["b", "a"]);
        assert_eq!(subs[0].len(), 2);
        assert_eq!(subs[1].answer("q1").unwrap().submitted_answer, "a1");
    }

    #[test]
    fn unknown_questions_are_skipped() {
        let mut schema = schema();
        let rows = vec![row("a", "retired", "1", "x"), row("a", "q2", "2", "y")];
        let mut builder = SubmissionBuilder::new(&mut schema, None);
        for r in &rows {
            builder.add_row(r);
        }
        assert_eq!(builder.skipped(), 1);

        let subs = builder.finish();
        assert_eq!(subs.len(), 1);
        assert!(subs[0].answer("retired").is_none());
        assert!(subs[0].answer("q2").is_some());
    }

    #[test]
    fn last_row_for_a_question_wins() {
        let mut schema = schema();
        let rows = vec![row("a", "q1", "1", "first"), row("a", "q1", "2", "second")];
        let subs = build_submissions(&mut schema, None, &rows);
        assert_eq!(subs[0].len(), 1);
        assert_eq!(subs[0].answer("q1").unwrap().submitted_answer, "second");
    }

    #[test]
    fn matched_files_are_registered_on_the_question() {
        let mut schema = schema();
        let listing = FileListing::from_names(
            "/up",
            ["a@x.edu_q1_9_1_main.py".to_string(), "a@x.edu_q2_9_1_main.py".to_string()],
        );
        let rows = vec![row("a@x.edu", "q1", "9", "")];
        let subs = build_submissions(&mut schema, Some(&listing), &rows);

        assert_eq!(subs[0].answer("q1").unwrap().files.paths().len(), 1);
        assert_eq!(schema.get_question("q1").unwrap().files().len(), 1);
    }

    #[test]
    fn question_list_follows_schema_order() {
        let mut schema = schema();
        let rows = vec![row("a", "q2", "1", ""), row("a", "q1", "2", "")];
        let subs = build_submissions(&mut schema, None, &rows);
        assert_eq!(subs[0].list_questions(&schema), ["q1", "q2"]);
    }
}
