#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// The in-memory paged document.
pub mod document;
/// PDF serialization of paged documents.
pub mod pdf;
/// The default plain-text renderer.
pub mod text;

use anyhow::Result;

pub use document::{BLANK_PAGE_MARKER, Page, PageDocument};
pub use pdf::write_pdf;
pub use text::TextRenderer;

use crate::{schema::Schema, submission::Submission};

/// Lays out a submission onto pages.
pub trait Renderer {
    /// Appends the pages for `submission` to `doc`.
    fn render(&self, submission: &Submission, schema: &Schema, doc: &mut PageDocument)
    -> Result<()>;
}
