#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! End-to-end run: assessment + export (+ uploads) → batches and question map.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tabled::{
    Table, Tabled,
    settings::{Panel, Style},
};

use crate::{
    batch::{PackReport, PdfSink, pack_submissions},
    config::Config,
    export::read_export,
    files::FileListing,
    qmap::{qmap_file_name, question_map, write_question_map},
    render::TextRenderer,
    schema::{load_schema, output_stem},
    submission::{Submission, build_submissions},
};

/// What a completed run produced.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Output file prefix derived from the assessment title.
    pub stem:        String,
    /// Number of submissions packed.
    pub submissions: usize,
    /// Packing outcome.
    pub report:      PackReport,
    /// Every file written, question map last.
    pub written:     Vec<PathBuf>,
}

/// A student flagged for manual pairing.
#[derive(Tabled)]
struct MissingRow {
    #[tabled(rename = "Student")]
    /// Student id.
    uid: String,
}

/// Builds batch PDFs, a sample PDF, and the question map for one assessment.
///
/// * `info_json`: assessment description file.
/// * `manual_csv`: manual-grading export.
/// * `file_dir`: optional directory of uploaded files.
/// * `config`: page budget, layout, and output directory.
pub fn to_pdf(
    info_json: &Path,
    manual_csv: &Path,
    file_dir: Option<&Path>,
    config: &Config,
) -> Result<RunSummary> {
    let loaded = load_schema(info_json)?;
    let mut schema = loaded.schema;
    let stem = output_stem(&loaded.title);
    tracing::info!("Parsing submissions from {}", manual_csv.display());

    let listing = file_dir.map(FileListing::read).transpose()?;
    let rows = read_export(manual_csv)?;
    let submissions = build_submissions(&mut schema, listing.as_ref(), &rows);

    std::fs::create_dir_all(config.output_dir()).with_context(|| {
        format!("Could not create output directory {}", config.output_dir().display())
    })?;

    let qmap = question_map(&submissions, &schema);
    // A student whose rows all named unknown questions has nothing to lay out
    // and must not become the template.
    let (answered, answerless): (Vec<Submission>, Vec<Submission>) =
        submissions.into_iter().partition(|s| !s.is_empty());
    for submission in &answerless {
        tracing::warn!("{} has no answers to known questions; not packed", submission.uid());
    }

    let renderer = TextRenderer::new(config.wrap_width());
    let mut sink = PdfSink::new(config.output_dir(), stem.clone());
    let mut report = pack_submissions(&answered, &schema, &renderer, &mut sink, config)?;
    report
        .missing_questions
        .extend(answerless.iter().map(|s| s.uid().to_string()));

    let qmap_path = config.output_dir().join(qmap_file_name(&stem));
    write_question_map(&qmap, &qmap_path)?;

    let mut written = sink.written().to_vec();
    written.push(qmap_path);

    Ok(RunSummary {
        stem,
        submissions: answered.len(),
        report,
        written,
    })
}

/// Prints the batch overview and, once, the students needing manual pairing.
pub fn print_summary(summary: &RunSummary) {
    if !summary.report.batches.is_empty() {
        eprintln!(
            "{}",
            Table::new(&summary.report.batches)
                .with(Panel::header(format!("Batches for {}", summary.stem)))
                .with(Style::modern())
        );
    }

    let missing = &summary.report.missing_questions;
    if !missing.is_empty() {
        tracing::warn!(
            "{} submissions are missing question submissions. Please make sure to manually pair \
             them in gradescope!",
            missing.len()
        );
        let rows: Vec<MissingRow> = missing
            .iter()
            .map(|uid| MissingRow { uid: uid.clone() })
            .collect();
        eprintln!("{}", Table::new(rows).with(Style::modern()));
    }
}
