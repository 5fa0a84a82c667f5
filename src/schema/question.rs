#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
};

use bon::Builder;
use serde::Serialize;

/// A single question slot of an assessment.
///
/// A slot is either a plain question with one identifier, or an alternative
/// group whose variants all share the same ordinal position.
#[derive(Debug, Clone, Builder, Serialize)]
#[builder(on(String, into))]
pub struct Question {
    /// Primary identifier. For an alternative group this is the first variant.
    id:             String,
    /// 1-based position within the schema.
    ordinal:        usize,
    /// Every identifier in the alternative group, primary included.
    #[builder(default)]
    #[builder(with = FromIterator::from_iter)]
    variants:       Vec<String>,
    /// How many alternatives a student is asked to answer.
    number_choose:  Option<usize>,
    /// Sub-part labels, in display order.
    #[builder(default)]
    #[builder(with = FromIterator::from_iter)]
    parts:          Vec<String>,
    /// File kinds (uploaded file names) accepted for this question.
    #[builder(default)]
    #[builder(with = FromIterator::from_iter)]
    expected_files: BTreeSet<String>,
    /// Files matched to this question across every submission.
    #[builder(skip)]
    files:          BTreeSet<PathBuf>,
}

impl Question {
    /// Returns the primary identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the 1-based ordinal position.
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    /// Returns the alternative identifiers, empty for a plain question.
    pub fn variants(&self) -> &[String] {
        &self.variants
    }

    /// Returns whether this slot is an alternative group.
    pub fn is_group(&self) -> bool {
        !self.variants.is_empty()
    }

    /// Returns the number of alternatives to choose, if declared.
    pub fn number_choose(&self) -> Option<usize> {
        self.number_choose
    }

    /// Returns the sub-part labels.
    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    /// Returns the accepted file kinds.
    pub fn expected_files(&self) -> &BTreeSet<String> {
        &self.expected_files
    }

    /// Returns the files matched so far.
    pub fn files(&self) -> &BTreeSet<PathBuf> {
        &self.files
    }

    /// Every identifier that resolves to this slot.
    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.id.as_str()).chain(
            self.variants
                .iter()
                .map(String::as_str)
                .filter(move |v| *v != self.id),
        )
    }

    /// Records a file matched to this question. Append-only.
    pub(crate) fn add_file(&mut self, path: &Path) {
        self.files.insert(path.to_path_buf());
    }
}
