#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::path::{Path, PathBuf};

use serde::Serialize;
use typed_builder::TypedBuilder;

/// Default cap on pages in one output document.
pub const DEFAULT_PAGES_PER_PDF: usize = 200;
/// Default number of text lines per rendered page.
pub const DEFAULT_LINES_PER_PAGE: usize = 50;
/// Default wrap width, in characters.
pub const DEFAULT_WRAP_WIDTH: usize = 90;

/// Run configuration.
#[derive(Debug, Clone, Serialize, TypedBuilder)]
#[builder(doc)]
pub struct Config {
    /// Maximum pages allowed in one output batch document.
    #[builder(default = DEFAULT_PAGES_PER_PDF)]
    pages_per_pdf:  usize,
    /// Directory output files are written into.
    #[builder(default = PathBuf::from("."), setter(into))]
    output_dir:     PathBuf,
    /// Text lines per rendered page.
    #[builder(default = DEFAULT_LINES_PER_PAGE)]
    lines_per_page: usize,
    /// Characters per rendered line.
    #[builder(default = DEFAULT_WRAP_WIDTH)]
    wrap_width:     usize,
}

impl Default for Config {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl Config {
    /// Reads the configuration from `PLGSPL_*` environment variables, falling
    /// back to defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        let output_dir = std::env::var("PLGSPL_OUTPUT_DIR")
            .ok()
            .map(|v| v.trim().to_owned())
            .filter(|v| !v.is_empty())
            .map_or_else(|| PathBuf::from("."), PathBuf::from);

        Self {
            pages_per_pdf: read_usize("PLGSPL_PAGES_PER_PDF", DEFAULT_PAGES_PER_PDF),
            output_dir,
            lines_per_page: read_usize("PLGSPL_LINES_PER_PAGE", DEFAULT_LINES_PER_PAGE),
            wrap_width: read_usize("PLGSPL_WRAP_WIDTH", DEFAULT_WRAP_WIDTH),
        }
    }

    /// Returns the maximum pages per batch document.
    pub fn pages_per_pdf(&self) -> usize {
        self.pages_per_pdf
    }

    /// Returns the output directory.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Returns the number of lines per rendered page.
    pub fn lines_per_page(&self) -> usize {
        self.lines_per_page
    }

    /// Returns the wrap width.
    pub fn wrap_width(&self) -> usize {
        self.wrap_width
    }

    /// Returns a copy with a different page cap.
    pub fn with_pages_per_pdf(mut self, pages: usize) -> Self {
        self.pages_per_pdf = pages;
        self
    }

    /// Returns a copy writing into `dir`.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }
}

/// Parses an environment variable as `usize`, falling back to `default`.
fn read_usize(env: &str, default: usize) -> usize {
    std::env::var(env)
        .ok()
        .and_then(|value| value.trim().parse::<usize>().ok())
        .unwrap_or(default)
}
