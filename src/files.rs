#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Matching uploaded files to (student, question) pairs.
//!
//! Uploaded file names encode their owner:
//! `{uid}_{escaped-qid}_{submission-id}_{file-id}_{file-name}`.

use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use glob::{Pattern, glob};
use serde::Serialize;

/// Files attached to one student answer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FileBundle {
    /// Question the files were matched for.
    qid:   String,
    /// Resolved paths, in directory listing order.
    paths: Vec<PathBuf>,
}

impl FileBundle {
    /// Creates a bundle for `qid`.
    pub fn new(qid: impl Into<String>, paths: Vec<PathBuf>) -> Self {
        Self {
            qid: qid.into(),
            paths,
        }
    }

    /// Creates a bundle with no files.
    pub fn empty(qid: impl Into<String>) -> Self {
        Self::new(qid, Vec::new())
    }

    /// Returns the matched paths.
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Returns whether no file matched.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Rewrites a question id into the form it takes inside file names.
///
/// Question ids are directory paths; the path separator cannot appear in a
/// file name, so it is stored as `@`.
pub fn escape_qid(qid: &str) -> String {
    qid.replace('/', "@")
}

/// The `{escaped-qid}_{submission-id}` token identifying a submission.
pub fn submission_token(qid: &str, submission_id: &str) -> String {
    format!("{}_{}", escape_qid(qid), submission_id)
}

/// Extracts the file kind (the original upload name) from a file name.
///
/// The kind is whatever follows `token`, minus the separating `_` and a
/// leading numeric file-id segment.
pub fn parse_file_kind<'a>(file_name: &'a str, token: &str) -> Option<&'a str> {
    let start = file_name.find(token)? + token.len();
    let rest = &file_name[start..];
    let rest = rest.strip_prefix('_').unwrap_or(rest);

    let kind = match rest.split_once('_') {
        Some((file_id, tail))
            if !file_id.is_empty() && file_id.chars().all(|c| c.is_ascii_digit()) =>
        {
            tail
        }
        _ => rest,
    };

    (!kind.is_empty()).then_some(kind)
}

/// A one-time listing of the uploaded-files directory.
#[derive(Debug, Clone, Default)]
pub struct FileListing {
    /// Directory the names were listed from.
    dir:   PathBuf,
    /// Plain file names, sorted.
    names: Vec<String>,
}

impl FileListing {
    /// Lists every regular file directly inside `dir`.
    pub fn read(dir: &Path) -> Result<Self> {
        let dir_str = dir
            .to_str()
            .context("Could not convert file directory to string")?;
        let pattern = format!("{}{}*", Pattern::escape(dir_str), std::path::MAIN_SEPARATOR);
        tracing::debug!("Listing uploaded files with {pattern}");

        let mut names: Vec<String> = glob(&pattern)
            .context("Could not create glob")?
            .filter_map(Result::ok)
            .filter(|p| p.is_file())
            .filter_map(|p| p.file_name().and_then(|n| n.to_str()).map(str::to_string))
            .collect();
        names.sort();

        Ok(Self {
            dir: dir.to_path_buf(),
            names,
        })
    }

    /// Builds a listing from names already in memory.
    pub fn from_names(dir: impl Into<PathBuf>, names: impl IntoIterator<Item = String>) -> Self {
        Self {
            dir:   dir.into(),
            names: names.into_iter().collect(),
        }
    }

    /// Selects the files belonging to one (student, question) submission.
    ///
    /// A file qualifies only if its name contains `raw_uid`, contains the
    /// submission token, and carries a file kind listed in `expected`. Every
    /// qualifying file is kept.
    pub fn match_files(
        &self,
        raw_uid: &str,
        qid: &str,
        submission_id: &str,
        expected: &BTreeSet<String>,
    ) -> FileBundle {
        let token = submission_token(qid, submission_id);
        let paths = self
            .names
            .iter()
            .filter(|name| name.contains(raw_uid) && name.contains(&token))
            .filter(|name| {
                parse_file_kind(name, &token).is_some_and(|kind| expected.contains(kind))
            })
            .map(|name| self.dir.join(name))
            .collect();

        FileBundle::new(qid, paths)
    }
}
