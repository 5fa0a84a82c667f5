#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Reading the manual-grading CSV export.

use std::{io::Read, path::Path};

use anyhow::{Context, Result, bail};
use csv::StringRecord;
use serde::Deserialize;

/// Byte order mark spreadsheet tools prepend to UTF-8 files.
const BOM: char = '\u{feff}';

/// One row of the manual-grading export.
///
/// Value columns may be blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRow {
    /// Raw student identifier, possibly carrying an `@domain` suffix.
    pub uid:              String,
    /// Question identifier as recorded by the platform.
    pub qid:              String,
    /// Submission identifier for this (student, question) pair.
    pub submission_id:    String,
    /// Question parameters, usually JSON.
    pub params:           String,
    /// Reference answer, usually JSON.
    pub true_answer:      String,
    /// The student's answer, usually JSON.
    pub submitted_answer: String,
    /// Partial scores, usually JSON.
    pub partial_scores:   String,
}

/// A row as it appears in the CSV.
///
/// The student column is `uid`; older exports spell it `UID`. Both may be
/// present, in which case a non-blank `uid` wins.
#[derive(Debug, Deserialize)]
struct RawRow {
    /// Student column, current spelling.
    #[serde(default)]
    uid:              Option<String>,
    /// Student column, legacy spelling.
    #[serde(default, rename = "UID")]
    uid_upper:        Option<String>,
    /// Question identifier as recorded by the platform.
    qid:              String,
    /// Submission identifier for this (student, question) pair.
    submission_id:    String,
    /// Question parameters, usually JSON.
    #[serde(default)]
    params:           String,
    /// Reference answer, usually JSON.
    #[serde(default)]
    true_answer:      String,
    /// The student's answer, usually JSON.
    #[serde(default)]
    submitted_answer: String,
    /// Partial scores, usually JSON.
    #[serde(default)]
    partial_scores:   String,
}

impl RawRow {
    /// Resolves the student column, failing when neither spelling has a value.
    fn into_row(self) -> Result<ExportRow> {
        let Some(uid) = [self.uid, self.uid_upper]
            .into_iter()
            .flatten()
            .find(|uid| !uid.trim().is_empty())
        else {
            bail!("Row has no `uid` or `UID` value");
        };
        Ok(ExportRow {
            uid,
            qid: self.qid,
            submission_id: self.submission_id,
            params: self.params,
            true_answer: self.true_answer,
            submitted_answer: self.submitted_answer,
            partial_scores: self.partial_scores,
        })
    }
}

/// Reads every row of the export at `path`.
pub fn read_export(path: &Path) -> Result<Vec<ExportRow>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Could not open export {}", path.display()))?;
    read_rows(file).with_context(|| format!("Could not read export {}", path.display()))
}

/// Reads export rows from any CSV source.
pub fn read_rows(source: impl Read) -> Result<Vec<ExportRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(true)
        .from_reader(source);

    let headers: StringRecord = reader
        .headers()
        .context("Could not read export header")?
        .iter()
        .map(|field| field.trim_start_matches(BOM))
        .collect();
    reader.set_headers(headers);

    reader
        .deserialize::<RawRow>()
        .enumerate()
        .map(|(index, row)| {
            // Header is line 1.
            row.map_err(anyhow::Error::from)
                .and_then(RawRow::into_row)
                .with_context(|| format!("Malformed export row on line {}", index + 2))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_lowercase_uid_column() {
        let csv = "uid,qid,submission_id,params,true_answer,submitted_answer,partial_scores\n\
                   a@x.edu,q1,10,{},{},\"{\"\"ans\"\": 1}\",{}\n";
        let rows = read_rows(csv.as_bytes()).expect("rows");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].uid, "a@x.edu");
        assert_eq!(rows[0].submitted_answer, "{\"ans\": 1}");
    }

    #[test]
    fn falls_back_to_uppercase_uid_and_blank_values() {
        let csv = "UID,qid,submission_id,params,true_answer,submitted_answer,partial_scores\n\
                   b,q2,11,,,,\n";
        let rows = read_rows(csv.as_bytes()).expect("rows");
        assert_eq!(rows[0].uid, "b");
        assert_eq!(rows[0].submission_id, "11");
        assert!(rows[0].submitted_answer.is_empty());
    }

    #[test]
    fn lowercase_uid_wins_when_both_columns_exist() {
        let csv = "uid,UID,qid,submission_id,params,true_answer,submitted_answer,partial_scores\n\
                   a@x.edu,A@X.EDU,q1,10,{},{},{},{}\n\
                   ,b@x.edu,q1,11,{},{},{},{}\n";
        let rows = read_rows(csv.as_bytes()).expect("rows");
        assert_eq!(rows[0].uid, "a@x.edu");
        assert_eq!(rows[1].uid, "b@x.edu");
    }

    #[test]
    fn blank_student_column_names_the_line() {
        let csv = "uid,UID,qid,submission_id\na,,q1,1\n,,q1,2\n";
        let err = read_rows(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("line 3"));
    }

    #[test]
    fn byte_order_mark_on_header_is_ignored() {
        let csv = "\u{feff}uid,qid,submission_id\nc@x.edu,q3,12\n";
        let rows = read_rows(csv.as_bytes()).expect("rows");
        assert_eq!(rows[0].uid, "c@x.edu");
        assert_eq!(rows[0].qid, "q3");
    }

    #[test]
    fn missing_qid_column_names_the_line() {
        let csv = "uid,submission_id\nb,11\n";
        let err = read_rows(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }
}
