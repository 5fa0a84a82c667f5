#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Packing rendered submissions into page-budgeted batches.
//!
//! The first submission is the template: its page count becomes the footprint
//! every later submission is padded to, and a submission that renders longer
//! than the template aborts the run. Batches hold a fixed number of
//! submissions so every student sits at the same page offsets within a batch.

use std::{
    ops::Range,
    path::{Path, PathBuf},
};

use anyhow::Result;
use serde::Serialize;
use tabled::Tabled;

use crate::{
    config::Config,
    render::{BLANK_PAGE_MARKER, PageDocument, Renderer, write_pdf},
    schema::Schema,
    submission::Submission,
};

/// Fatal conditions raised while packing.
#[derive(thiserror::Error, Debug)]
pub enum PackError {
    /// The template submission rendered no pages at all.
    #[error("Submission 0, {uid} rendered no pages; the first submission must be complete.")]
    EmptyTemplate {
        /// Student owning the template submission.
        uid: String,
    },
    /// Not even one submission fits into a batch.
    #[error(
        "Cannot create submissions given the current max page constraint: one submission needs \
         {expected_pages} pages but a batch allows {max_pages}. Please raise the page limit."
    )]
    PageBudgetExceeded {
        /// Pages the template submission occupies.
        expected_pages: usize,
        /// Configured pages per batch.
        max_pages:      usize,
    },
    /// A submission renders longer than the template.
    #[error(
        "Submission {index}, {uid} exceeds the sample template ({pages} pages, expected \
         {expected_pages}). Please make sure that the first submission is complete."
    )]
    TemplateMismatch {
        /// Position of the submission in discovery order.
        index:          usize,
        /// Student owning the submission.
        uid:            String,
        /// Pages the submission rendered to.
        pages:          usize,
        /// Pages the template occupies.
        expected_pages: usize,
    },
    /// The renderer failed.
    #[error("Could not render submission {index}, {uid}")]
    Render {
        /// Position of the submission in discovery order.
        index:  usize,
        /// Student owning the submission.
        uid:    String,
        /// Underlying failure.
        #[source]
        source: anyhow::Error,
    },
    /// Handing a document to the sink failed.
    #[error("Could not write {name}")]
    Output {
        /// What was being written.
        name:   String,
        /// Underlying failure.
        #[source]
        source: anyhow::Error,
    },
}

/// Receives the documents the packer produces.
pub trait BatchSink {
    /// Receives the isolated rendering of the template submission.
    fn write_sample(&mut self, doc: &PageDocument) -> Result<()>;

    /// Receives a closed batch covering the half-open submission `range`.
    fn write_batch(&mut self, range: Range<usize>, doc: PageDocument) -> Result<()>;
}

/// File name of a batch document.
pub fn batch_file_name(stem: &str, range: &Range<usize>) -> String {
    format!("{stem}_{}-{}.pdf", range.start, range.end)
}

/// File name of the sample document.
pub fn sample_file_name(stem: &str) -> String {
    format!("{stem}_sample.pdf")
}

/// Writes every document as a PDF into one directory.
#[derive(Debug, Clone)]
pub struct PdfSink {
    /// Output directory.
    dir:     PathBuf,
    /// File name prefix.
    stem:    String,
    /// Files written so far.
    written: Vec<PathBuf>,
}

impl PdfSink {
    /// Creates a sink writing `{stem}_*.pdf` files into `dir`.
    pub fn new(dir: &Path, stem: impl Into<String>) -> Self {
        Self {
            dir:     dir.to_path_buf(),
            stem:    stem.into(),
            written: Vec::new(),
        }
    }

    /// Paths written so far.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    /// Writes `doc` to `name` inside the output directory.
    fn save(&mut self, name: String, doc: &PageDocument) -> Result<()> {
        let path = self.dir.join(name);
        write_pdf(doc, &path)?;
        self.written.push(path);
        Ok(())
    }
}

impl BatchSink for PdfSink {
    fn write_sample(&mut self, doc: &PageDocument) -> Result<()> {
        self.save(sample_file_name(&self.stem), doc)
    }

    fn write_batch(&mut self, range: Range<usize>, doc: PageDocument) -> Result<()> {
        self.save(batch_file_name(&self.stem, &range), &doc)
    }
}

/// Page footprint fixed by the template submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Baseline {
    /// Pages every submission occupies after padding.
    pub expected_pages:            usize,
    /// Submissions per batch.
    pub max_submissions_per_batch: usize,
}

impl Baseline {
    /// Derives the batch size for a template of `expected_pages` pages.
    pub fn new(expected_pages: usize, max_pages: usize) -> Result<Self, PackError> {
        let max_submissions_per_batch = max_pages / expected_pages.max(1);
        if max_submissions_per_batch < 1 {
            return Err(PackError::PageBudgetExceeded {
                expected_pages,
                max_pages,
            });
        }
        Ok(Self {
            expected_pages,
            max_submissions_per_batch,
        })
    }
}

/// One closed batch, for the run summary.
#[derive(Tabled, Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchRow {
    #[tabled(rename = "First")]
    /// First submission index.
    pub start: usize,
    #[tabled(rename = "End (exclusive)")]
    /// One past the last submission index.
    pub end:   usize,
    #[tabled(rename = "Pages")]
    /// Pages in the batch document.
    pub pages: usize,
}

/// Outcome of a successful packing run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PackReport {
    /// Template footprint; absent when there were no submissions.
    pub baseline:          Option<Baseline>,
    /// Batches in the order they were flushed.
    pub batches:           Vec<BatchRow>,
    /// Students whose submissions were padded, in discovery order.
    pub missing_questions: Vec<String>,
}

/// Renders `submission` into `doc`, tagging failures with its position.
fn render_one<R: Renderer + ?Sized>(
    renderer: &R,
    schema: &Schema,
    index: usize,
    submission: &Submission,
    doc: &mut PageDocument,
) -> Result<(), PackError> {
    renderer
        .render(submission, schema, doc)
        .map_err(|source| PackError::Render {
            index,
            uid: submission.uid().to_string(),
            source,
        })
}

/// Packing state threaded through the submission sequence.
struct Packer<'a, R: ?Sized, S: ?Sized> {
    /// Question schema handed to the renderer.
    schema:      &'a Schema,
    /// Lays out submissions.
    renderer:    &'a R,
    /// Receives sample and batch documents.
    sink:        &'a mut S,
    /// Run configuration.
    config:      &'a Config,
    /// Batch being filled.
    current:     PageDocument,
    /// Submissions in the current batch.
    in_batch:    usize,
    /// Index of the first submission in the current batch.
    batch_start: usize,
    /// Template footprint, fixed by submission 0.
    baseline:    Option<Baseline>,
    /// Accumulated result.
    report:      PackReport,
}

impl<'a, R, S> Packer<'a, R, S>
where
    R: Renderer + ?Sized,
    S: BatchSink + ?Sized,
{
    /// Fresh state with an empty batch.
    fn new(schema: &'a Schema, renderer: &'a R, sink: &'a mut S, config: &'a Config) -> Self {
        Self {
            schema,
            renderer,
            sink,
            config,
            current: PageDocument::new(config.lines_per_page()),
            in_batch: 0,
            batch_start: 0,
            baseline: None,
            report: PackReport::default(),
        }
    }

    /// Renders the template in isolation, hands it to the sink, and fixes the
    /// baseline.
    fn establish_baseline(&mut self, submission: &Submission) -> Result<Baseline, PackError> {
        let mut sample = PageDocument::new(self.config.lines_per_page());
        render_one(self.renderer, self.schema, 0, submission, &mut sample)?;

        let expected_pages = sample.page_count();
        if expected_pages == 0 {
            return Err(PackError::EmptyTemplate {
                uid: submission.uid().to_string(),
            });
        }

        self.sink
            .write_sample(&sample)
            .map_err(|source| PackError::Output {
                name: "sample".to_string(),
                source,
            })?;

        let baseline = Baseline::new(expected_pages, self.config.pages_per_pdf())?;
        tracing::info!(
            "Template submission {} spans {} page(s); {} submission(s) per batch",
            submission.uid(),
            baseline.expected_pages,
            baseline.max_submissions_per_batch
        );
        self.baseline = Some(baseline);
        self.report.baseline = Some(baseline);
        Ok(baseline)
    }

    /// Renders one submission into the current batch, audits and pads it, and
    /// closes the batch once it is full.
    fn push(&mut self, index: usize, submission: &Submission) -> Result<(), PackError> {
        let start = self.current.page_count();
        render_one(self.renderer, self.schema, index, submission, &mut self.current)?;

        let baseline = match self.baseline {
            Some(baseline) => baseline,
            None => self.establish_baseline(submission)?,
        };

        let pages = self.current.page_count() - start;
        if pages > baseline.expected_pages {
            return Err(PackError::TemplateMismatch {
                index,
                uid: submission.uid().to_string(),
                pages,
                expected_pages: baseline.expected_pages,
            });
        }
        if pages < baseline.expected_pages {
            tracing::warn!(
                "Submission {index}, {} spans {pages} of {} page(s); padding",
                submission.uid(),
                baseline.expected_pages
            );
            self.report.missing_questions.push(submission.uid().to_string());
            while self.current.page_count() - start < baseline.expected_pages {
                self.current.add_blank_page(BLANK_PAGE_MARKER);
            }
        }

        self.in_batch += 1;
        if self.in_batch == baseline.max_submissions_per_batch {
            self.flush(index + 1)?;
        }
        Ok(())
    }

    /// Hands the current batch, ending before submission `end`, to the sink
    /// and starts an empty one.
    fn flush(&mut self, end: usize) -> Result<(), PackError> {
        let range = self.batch_start..end;
        let doc = std::mem::replace(
            &mut self.current,
            PageDocument::new(self.config.lines_per_page()),
        );
        let pages = doc.page_count();

        tracing::info!("Writing submissions {}-{} ({pages} pages)", range.start, range.end);
        self.sink
            .write_batch(range.clone(), doc)
            .map_err(|source| PackError::Output {
                name: format!("batch {}-{}", range.start, range.end),
                source,
            })?;

        self.report.batches.push(BatchRow {
            start: range.start,
            end: range.end,
            pages,
        });
        self.batch_start = end;
        self.in_batch = 0;
        Ok(())
    }

    /// Flushes a partially filled final batch.
    fn finish(mut self, total: usize) -> Result<PackReport, PackError> {
        if self.in_batch > 0 {
            self.flush(total)?;
        }
        Ok(self.report)
    }
}

/// Renders and packs `submissions` in order.
///
/// Documents are handed to `sink` as soon as they are complete, so batches
/// flushed before a fatal error have already been written.
pub fn pack_submissions<R, S>(
    submissions: &[Submission],
    schema: &Schema,
    renderer: &R,
    sink: &mut S,
    config: &Config,
) -> Result<PackReport, PackError>
where
    R: Renderer + ?Sized,
    S: BatchSink + ?Sized,
{
    let mut packer = Packer::new(schema, renderer, sink, config);
    for (index, submission) in submissions.iter().enumerate() {
        packer.push(index, submission)?;
    }
    packer.finish(submissions.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baseline_divides_the_budget() {
        let baseline = Baseline::new(3, 10).unwrap();
        assert_eq!(baseline.max_submissions_per_batch, 3);
    }

    #[test]
    fn baseline_rejects_oversized_template() {
        assert!(matches!(
            Baseline::new(11, 10),
            Err(PackError::PageBudgetExceeded {
                expected_pages: 11,
                max_pages:      10,
            })
        ));
    }

    #[test]
    fn file_names_use_half_open_ranges() {
        assert_eq!(batch_file_name("HW_1", &(3..6)), "HW_1_3-6.pdf");
        assert_eq!(sample_file_name("HW_1"), "HW_1_sample.pdf");
    }
}
