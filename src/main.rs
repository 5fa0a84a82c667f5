#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! # plgspl
//!
//! Turns a PrairieLearn manual-grading export into Gradescope-ready PDFs.

use std::path::PathBuf;

use anyhow::{Context, Result};
use bpaf::*;
use dotenvy::dotenv;
use plgspl::{
    config::Config,
    run::{print_summary, to_pdf},
    schema::load_schema,
};
use tabled::{
    Table,
    settings::{Panel, Style},
};
use tracing::{Level, metadata::LevelFilter};
use tracing_subscriber::{fmt, prelude::*, util::SubscriberInitExt};

/// Arguments for building PDFs.
#[derive(Debug, Clone)]
struct PdfArgs {
    /// Assessment description file.
    info_json:     PathBuf,
    /// Manual-grading export.
    manual_csv:    PathBuf,
    /// Directory of uploaded files.
    files:         Option<PathBuf>,
    /// Page cap override.
    pages_per_pdf: Option<usize>,
    /// Output directory override.
    out:           Option<PathBuf>,
}

/// Top-level CLI commands.
#[derive(Debug, Clone)]
enum Cmd {
    /// Build batch PDFs and the question map
    Pdf(PdfArgs),
    /// Print the parsed question schema
    Info(PathBuf),
    /// Print the effective configuration
    Config,
}

/// Parse the command line arguments and return a `Cmd` enum
fn options() -> Cmd {
    /// parses the assessment description path
    fn assessment() -> impl Parser<PathBuf> {
        positional("INFO_JSON").help("Path to infoAssessment.json")
    }

    let manual_csv = positional::<PathBuf>("MANUAL_CSV").help("Path to the manual grading CSV");
    let files = long("files")
        .short('f')
        .help("Directory of uploaded files to attach")
        .argument::<PathBuf>("DIR")
        .optional();
    let pages_per_pdf = long("pages-per-pdf")
        .short('p')
        .help("Maximum pages per output PDF (overrides PLGSPL_PAGES_PER_PDF)")
        .argument::<usize>("N")
        .optional();
    let out = long("out")
        .short('o')
        .help("Output directory (overrides PLGSPL_OUTPUT_DIR)")
        .argument::<PathBuf>("DIR")
        .optional();
    let info_json = assessment();

    let pdf = construct!(PdfArgs {
        files,
        pages_per_pdf,
        out,
        info_json,
        manual_csv,
    })
    .map(Cmd::Pdf)
    .to_options()
    .command("pdf")
    .help("Split submissions into Gradescope-ready PDFs");

    let info_path = assessment();
    let info = construct!(Cmd::Info(info_path))
        .to_options()
        .command("info")
        .help("Print the questions parsed from an assessment");

    let config = pure(Cmd::Config)
        .to_options()
        .command("config")
        .help("Print the effective configuration as JSON");

    let cmd = construct!([pdf, info, config]);

    cmd.to_options()
        .descr("Split PrairieLearn manual grading exports for Gradescope")
        .run()
}

fn main() -> Result<()> {
    dotenv().ok();

    let fmt = fmt::layer()
        .without_time()
        .with_file(false)
        .with_line_number(false);
    let filter_layer = LevelFilter::from_level(Level::INFO);
    tracing_subscriber::registry()
        .with(fmt)
        .with(filter_layer)
        .init();

    let cmd = options();
    let mut config = Config::from_env();

    match cmd {
        Cmd::Pdf(args) => {
            if let Some(pages) = args.pages_per_pdf {
                config = config.with_pages_per_pdf(pages);
            }
            if let Some(out) = args.out {
                config = config.with_output_dir(out);
            }

            let summary = to_pdf(&args.info_json, &args.manual_csv, args.files.as_deref(), &config)
                .with_context(|| format!("Failed to split {}", args.manual_csv.display()))?;
            print_summary(&summary);
            for path in &summary.written {
                tracing::info!("Wrote {}", path.display());
            }
        }
        Cmd::Info(path) => {
            let loaded = load_schema(&path)?;
            println!(
                "{}",
                Table::new(loaded.schema.overview())
                    .with(Panel::header(loaded.title))
                    .with(Style::modern())
            );
        }
        Cmd::Config => println!("{}", serde_json::to_string_pretty(&config)?),
    };

    Ok(())
}
