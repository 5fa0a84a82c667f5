#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::path::Path;

use anyhow::{Context, Result};
use lopdf::{
    Document, Object, Stream,
    content::{Content, Operation},
    dictionary,
};

use super::PageDocument;

/// US Letter width in points.
const PAGE_WIDTH: i64 = 612;
/// US Letter height in points.
const PAGE_HEIGHT: i64 = 792;
/// Page margin in points.
const MARGIN: i64 = 36;
/// Largest font size used.
const MAX_FONT_SIZE: i64 = 11;

/// Builds the content stream operations for one page.
fn page_operations(lines: &[String], font_size: i64) -> Vec<Operation> {
    let leading = leading_for(font_size);
    let mut ops = vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F1".into(), font_size.into()]),
        Operation::new("TL", vec![leading.into()]),
        Operation::new("Td", vec![MARGIN.into(), (PAGE_HEIGHT - MARGIN - font_size).into()]),
    ];
    for line in lines {
        ops.push(Operation::new("Tj", vec![Object::string_literal(latin1(line))]));
        ops.push(Operation::new("T*", vec![]));
    }
    ops.push(Operation::new("ET", vec![]));
    ops
}

/// Maps text onto the WinAnsi range understood by the base-14 fonts.
fn latin1(line: &str) -> Vec<u8> {
    line.chars()
        .map(|c| if (c as u32) < 256 { c as u8 } else { b'?' })
        .collect()
}

/// Line spacing for `font_size`, about 1.2 times the size.
fn leading_for(font_size: i64) -> i64 {
    (font_size * 6 + 4) / 5
}

/// Picks a font size so `lines_per_page` lines fit between the margins.
fn font_size_for(lines_per_page: usize) -> i64 {
    let usable = PAGE_HEIGHT - 2 * MARGIN;
    let lines = i64::try_from(lines_per_page.max(1)).unwrap_or(i64::MAX);
    let mut size = MAX_FONT_SIZE;
    while size > 1 && leading_for(size).saturating_mul(lines) > usable {
        size -= 1;
    }
    size
}

/// Serializes `doc` into an in-memory PDF, one PDF page per document page.
pub fn to_pdf_document(doc: &PageDocument) -> Result<Document> {
    let mut pdf = Document::with_version("1.5");
    let pages_id = pdf.new_object_id();
    let font_id = pdf.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = pdf.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let font_size = font_size_for(doc.lines_per_page());
    let mut kids: Vec<Object> = Vec::with_capacity(doc.page_count());
    for page in doc.pages() {
        let content = Content {
            operations: page_operations(page.lines(), font_size),
        };
        let content_id = pdf.add_object(Stream::new(
            dictionary! {},
            content.encode().context("Could not encode page content")?,
        ));
        let page_id = pdf.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => count,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
    };
    pdf.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = pdf.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    pdf.trailer.set("Root", catalog_id);
    pdf.compress();
    Ok(pdf)
}

/// Writes `doc` to `path` as a PDF file.
pub fn write_pdf(doc: &PageDocument, path: &Path) -> Result<()> {
    let mut pdf = to_pdf_document(doc)?;
    pdf.save(path)
        .with_context(|| format!("Could not write {}", path.display()))?;
    tracing::debug!("Wrote {} page(s) to {}", doc.page_count(), path.display());
    Ok(())
}
