//! # plgspl
//!
//! Assembles per-student manual-grading submissions into page-aligned PDF
//! batches for upload to Gradescope, along with a map from each student to
//! the questions they answered.

#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// Packing rendered submissions into page-budgeted batches
pub mod batch;
/// Run configuration
pub mod config;
/// Reading the manual-grading export
pub mod export;
/// Matching uploaded files to submissions
pub mod files;
/// The student to question-list map
pub mod qmap;
/// Paged documents, renderers, and PDF output
pub mod render;
/// End-to-end orchestration
pub mod run;
/// Assessment question schema
pub mod schema;
/// Per-student submissions
pub mod submission;

pub use batch::{BatchSink, PackError, PackReport, PdfSink, pack_submissions};
pub use config::Config;
pub use render::{PageDocument, Renderer, TextRenderer};
pub use run::{RunSummary, to_pdf};
pub use schema::{Question, Schema, SchemaError};
pub use submission::{StudentAnswer, Submission, build_submissions, student_id};
