use std::fmt::Write as _;
use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, Stream, StringFormat};

use crate::error::Result;
use crate::processing::pipeline::Analysis;
use crate::processing::statistics::SampleStatistics;

pub const REPORT_TITLE: &str = "EQA Result Analysis";

/// Shown in place of a standard deviation that could not be computed.
pub const SD_PLACEHOLDER: &str = "-";

/// One report line: device id, count, mean and SD to two decimals.
pub fn device_line(device_id: &str, stats: &SampleStatistics) -> String {
    let sd = match stats.displayable_sd() {
        Some(sd) => format!("{sd:.2}"),
        None => SD_PLACEHOLDER.to_string(),
    };
    format!("{device_id}: n={}, mean={:.2}, sd={sd}", stats.count, stats.mean)
}

/// Plain-text report of the per-device statistics.
pub fn text_report(analysis: &Analysis) -> String {
    let mut out = String::from(REPORT_TITLE);
    out.push('\n');
    if let Some(test) = &analysis.selected_test {
        let _ = writeln!(out, "Test: {test}");
    }
    for device in &analysis.device_stats {
        out.push_str(&device_line(&device.device_id, &device.stats));
        out.push('\n');
    }
    out
}

pub fn write_text_report(analysis: &Analysis, path: &Path) -> Result<()> {
    std::fs::write(path, text_report(analysis))?;
    tracing::info!("Report written to {:?}", path);
    Ok(())
}

/// US Letter, in points.
const PAGE_WIDTH: i64 = 612;
const PAGE_HEIGHT: i64 = 792;
const MARGIN: i64 = 56;
const FONT_SIZE: i64 = 11;
const LEADING: i64 = 15;
const LINES_PER_PAGE: usize = ((PAGE_HEIGHT - 2 * MARGIN) / LEADING) as usize;

/// PDF strings use single-byte text here; characters outside Latin-1 are
/// replaced with `?`.
fn pdf_text(line: &str) -> Object {
    let bytes = line
        .chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect();
    Object::String(bytes, StringFormat::Literal)
}

fn page_content(lines: &[&str]) -> Content {
    let mut operations = vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec![Object::Name(b"F1".to_vec()), FONT_SIZE.into()]),
        Operation::new("TL", vec![LEADING.into()]),
        Operation::new("Td", vec![MARGIN.into(), (PAGE_HEIGHT - MARGIN).into()]),
    ];
    for line in lines {
        operations.push(Operation::new("Tj", vec![pdf_text(line)]));
        operations.push(Operation::new("T*", vec![]));
    }
    operations.push(Operation::new("ET", vec![]));
    Content { operations }
}

/// The text report laid out as a PDF document, one Helvetica line per
/// report line, paginated.
pub fn pdf_report(analysis: &Analysis) -> Result<Vec<u8>> {
    let text = text_report(analysis);
    let lines: Vec<&str> = text.lines().collect();

    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut page_ids = Vec::new();
    for chunk in lines.chunks(LINES_PER_PAGE) {
        let content = page_content(chunk);
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        page_ids.push(page_id);
    }

    let pages = dictionary! {
        "Type" => "Pages",
        "Count" => page_ids.len() as i64,
        "Kids" => page_ids.iter().map(|id| Object::Reference(*id)).collect::<Vec<_>>(),
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)?;
    Ok(buffer)
}

pub fn write_pdf_report(analysis: &Analysis, path: &Path) -> Result<()> {
    std::fs::write(path, pdf_report(analysis)?)?;
    tracing::info!("PDF report written to {:?}", path);
    Ok(())
}
