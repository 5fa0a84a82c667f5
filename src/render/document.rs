#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use serde::Serialize;

/// Text shown on filler pages.
pub const BLANK_PAGE_MARKER: &str = "THIS IS A BLANK PAGE";

/// One page of text lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Page {
    /// Lines, top to bottom.
    lines: Vec<String>,
}

impl Page {
    /// Returns the lines on this page.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

/// An in-memory paged document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageDocument {
    /// Pages in order.
    pages:          Vec<Page>,
    /// Lines a page holds before text flows onto a new one.
    lines_per_page: usize,
}

impl PageDocument {
    /// Creates an empty document whose pages hold `lines_per_page` lines.
    pub fn new(lines_per_page: usize) -> Self {
        Self {
            pages:          Vec::new(),
            lines_per_page: lines_per_page.max(1),
        }
    }

    /// Number of pages so far.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Returns whether the document has no pages.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Returns the pages.
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Returns the page capacity in lines.
    pub fn lines_per_page(&self) -> usize {
        self.lines_per_page
    }

    /// Starts a new, empty page.
    pub fn add_page(&mut self) {
        self.pages.push(Page::default());
    }

    /// Appends a line, starting a page when none is open or the last is full.
    pub fn push_line(&mut self, line: impl Into<String>) {
        let needs_page = self
            .pages
            .last()
            .is_none_or(|page| page.lines.len() >= self.lines_per_page);
        if needs_page {
            self.add_page();
        }
        if let Some(page) = self.pages.last_mut() {
            page.lines.push(line.into());
        }
    }

    /// Adds a page carrying only `marker`.
    pub fn add_blank_page(&mut self, marker: &str) {
        self.add_page();
        self.push_line(marker);
    }
}
