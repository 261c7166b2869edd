//! Lays out an [ExpenseReport] as an A4 PDF.

use std::io::BufWriter;

use printpdf::{
    BuiltinFont, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference,
    Point,
};

use crate::{Error, report::model::ExpenseReport};

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN_LEFT: f32 = 15.0;
const MARGIN_RIGHT: f32 = 195.0;
const CONTENT_TOP: f32 = 282.0;
const CONTENT_BOTTOM: f32 = 20.0;
const FOOTER_Y: f32 = 10.0;

const BODY_FONT_SIZE: f32 = 10.0;
const BODY_LINE_HEIGHT: f32 = 5.0;
const ROW_HEIGHT: f32 = 6.0;

/// Roughly how many body-size characters fit across the page.
const SUMMARY_LINE_WIDTH: usize = 95;

const COLUMN_DATE: f32 = MARGIN_LEFT;
const COLUMN_CATEGORY: f32 = 45.0;
const COLUMN_DESCRIPTION: f32 = 85.0;
const COLUMN_AMOUNT: f32 = 170.0;
const CATEGORY_WIDTH: usize = 20;
const DESCRIPTION_WIDTH: usize = 45;

/// Render `report` as PDF bytes.
///
/// # Errors
/// Returns [Error::ReportRendering] if the fonts cannot be embedded or the
/// document cannot be serialized.
pub fn render_pdf(report: &ExpenseReport) -> Result<Vec<u8>, Error> {
    layout(report)?.finish()
}

/// Draw every part of the report, starting new pages as they fill up.
fn layout(report: &ExpenseReport) -> Result<PageWriter, Error> {
    let mut writer = PageWriter::new(&report.title)?;

    writer.heading(&report.title, 18.0);
    writer.advance(2.0);
    writer.body_line(&format!("Generated on {}", report.generated_on));
    writer.advance(6.0);

    writer.heading("Summary", 13.0);
    for line in summary_lines(&report.summary) {
        writer.body_line(&line);
    }
    writer.advance(6.0);

    writer.heading("Transactions", 13.0);
    writer.table_header();
    for row in &report.rows {
        if writer.needs_page(ROW_HEIGHT) {
            writer.new_page();
            writer.table_header();
        }

        let y = writer.y;
        writer.text(&row.date, BODY_FONT_SIZE, COLUMN_DATE, y, false);
        writer.text(
            &truncate(&row.category, CATEGORY_WIDTH),
            BODY_FONT_SIZE,
            COLUMN_CATEGORY,
            y,
            false,
        );
        writer.text(
            &truncate(&row.description, DESCRIPTION_WIDTH),
            BODY_FONT_SIZE,
            COLUMN_DESCRIPTION,
            y,
            false,
        );
        writer.text(&format!("${}", row.amount), BODY_FONT_SIZE, COLUMN_AMOUNT, y, false);
        writer.y -= ROW_HEIGHT;
    }

    if writer.needs_page(ROW_HEIGHT * 2.0) {
        writer.new_page();
    }
    writer.rule();
    writer.advance(5.0);
    let y = writer.y;
    writer.text("Total:", 11.0, 140.0, y, true);
    writer.text(
        &format!("${}", report.formatted_total()),
        11.0,
        COLUMN_AMOUNT,
        y,
        true,
    );

    Ok(writer)
}

/// Tracks the current page and the vertical position on it.
struct PageWriter {
    document: PdfDocumentReference,
    layer: PdfLayerReference,
    font: IndirectFontRef,
    bold_font: IndirectFontRef,
    y: f32,
    page_count: usize,
}

impl PageWriter {
    fn new(title: &str) -> Result<Self, Error> {
        let (document, page, layer) = PdfDocument::new(
            pdf_safe_text(title),
            Mm(PAGE_WIDTH),
            Mm(PAGE_HEIGHT),
            "Layer 1",
        );
        let layer = document.get_page(page).get_layer(layer);

        let font = document
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|error| Error::ReportRendering(error.to_string()))?;
        let bold_font = document
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|error| Error::ReportRendering(error.to_string()))?;

        let writer = Self {
            document,
            layer,
            font,
            bold_font,
            y: CONTENT_TOP,
            page_count: 1,
        };
        writer.footer();

        Ok(writer)
    }

    fn needs_page(&self, height: f32) -> bool {
        self.y - height < CONTENT_BOTTOM
    }

    fn new_page(&mut self) {
        let (page, layer) = self.document.add_page(
            Mm(PAGE_WIDTH),
            Mm(PAGE_HEIGHT),
            format!("Layer {}", self.page_count + 1),
        );
        self.layer = self.document.get_page(page).get_layer(layer);
        self.page_count += 1;
        self.y = CONTENT_TOP;
        self.footer();
    }

    fn footer(&self) {
        self.text(
            &format!("Page {}", self.page_count),
            8.0,
            MARGIN_LEFT,
            FOOTER_Y,
            false,
        );
    }

    fn advance(&mut self, height: f32) {
        self.y -= height;
    }

    fn text(&self, text: &str, font_size: f32, x: f32, y: f32, bold: bool) {
        let font = if bold { &self.bold_font } else { &self.font };
        self.layer
            .use_text(pdf_safe_text(text), font_size, Mm(x), Mm(y), font);
    }

    fn heading(&mut self, text: &str, font_size: f32) {
        if self.needs_page(font_size) {
            self.new_page();
        }

        self.y -= font_size * 0.25;
        let y = self.y;
        self.text(text, font_size, MARGIN_LEFT, y, true);
        self.y -= font_size * 0.4;
    }

    fn body_line(&mut self, text: &str) {
        if self.needs_page(BODY_LINE_HEIGHT) {
            self.new_page();
        }

        let y = self.y;
        self.text(text, BODY_FONT_SIZE, MARGIN_LEFT, y, false);
        self.y -= BODY_LINE_HEIGHT;
    }

    fn table_header(&mut self) {
        let y = self.y;
        self.text("Date", BODY_FONT_SIZE, COLUMN_DATE, y, true);
        self.text("Category", BODY_FONT_SIZE, COLUMN_CATEGORY, y, true);
        self.text("Description", BODY_FONT_SIZE, COLUMN_DESCRIPTION, y, true);
        self.text("Amount", BODY_FONT_SIZE, COLUMN_AMOUNT, y, true);
        self.y -= 3.0;
        self.rule();
        self.y -= ROW_HEIGHT;
    }

    fn rule(&self) {
        self.layer.add_line(Line {
            points: vec![
                (Point::new(Mm(MARGIN_LEFT), Mm(self.y)), false),
                (Point::new(Mm(MARGIN_RIGHT), Mm(self.y)), false),
            ],
            is_closed: false,
        });
    }

    fn finish(self) -> Result<Vec<u8>, Error> {
        let mut buffer = BufWriter::new(Vec::<u8>::new());
        self.document
            .save(&mut buffer)
            .map_err(|error| Error::ReportRendering(error.to_string()))?;

        buffer
            .into_inner()
            .map_err(|error| Error::ReportRendering(error.to_string()))
    }
}

/// Turn markdown into plain lines that fit the page width.
///
/// Heading markers and emphasis are dropped, list markers become dashes and
/// long lines are wrapped at word boundaries.
fn summary_lines(summary: &str) -> Vec<String> {
    let mut lines = Vec::new();

    for raw_line in summary.lines() {
        let line = raw_line.trim();
        let line = line.trim_start_matches('#').trim_start();
        let line = line.replace("**", "").replace("__", "");
        let line = match line.strip_prefix("* ") {
            Some(rest) => format!("- {rest}"),
            None => line,
        };

        if line.is_empty() {
            // Collapse runs of blank lines into one.
            if lines.last().is_some_and(|last: &String| !last.is_empty()) {
                lines.push(String::new());
            }
            continue;
        }

        lines.extend(wrap(&line, SUMMARY_LINE_WIDTH));
    }

    while lines.last().is_some_and(|last| last.is_empty()) {
        lines.pop();
    }

    lines
}

/// Split `text` into lines of at most `width` characters, breaking at spaces.
///
/// Words longer than `width` are split.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word = word.to_owned();
        while word.chars().count() > width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let split_at = word
                .char_indices()
                .nth(width)
                .map(|(index, _)| index)
                .unwrap_or(word.len());
            let rest = word.split_off(split_at);
            lines.push(word);
            word = rest;
        }

        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&word);
    }

    if !current.is_empty() {
        lines.push(current);
    }

    lines
}

/// Shorten `text` to `width` characters, marking the cut with "...".
fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_owned();
    }

    let mut truncated: String = text.chars().take(width.saturating_sub(3)).collect();
    truncated.push_str("...");
    truncated
}

/// Reduce `text` to characters the built-in PDF fonts can draw.
fn pdf_safe_text(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' => '\'',
            '\u{201C}' | '\u{201D}' => '"',
            '\u{2013}' | '\u{2014}' => '-',
            '\u{2022}' => '-',
            '\t' => ' ',
            c if c.is_ascii_graphic() || c == ' ' => c,
            c if ('\u{A0}'..='\u{FF}').contains(&c) => c,
            _ => '?',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::{
        report::{
            model::{ExpenseReport, ReportRequest},
            pdf::{layout, pdf_safe_text, render_pdf, summary_lines, truncate, wrap},
        },
        transaction::{PeriodMonth, TransactionSnapshot},
    };

    fn report(transaction_count: usize, summary: &str) -> ExpenseReport {
        let request = ReportRequest {
            month: Some(PeriodMonth::new("3")),
            year: Some(2024),
            transactions: (0..transaction_count)
                .map(|i| {
                    TransactionSnapshot::new(4.5, "Coffee", "2024-03-01")
                        .description(&format!("Flat white #{i}"))
                })
                .collect(),
            summary: Some(summary.to_owned()),
        };

        ExpenseReport::new(request, date!(2024 - 04 - 01)).unwrap()
    }

    #[test]
    fn renders_pdf_document() {
        let bytes = render_pdf(&report(2, "## Overview\nYou spent **$9.00** on coffee.")).unwrap();

        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn short_report_fits_on_one_page() {
        let writer = layout(&report(10, "All good.")).unwrap();

        assert_eq!(writer.page_count, 1);
    }

    #[test]
    fn long_table_flows_onto_more_pages() {
        let writer = layout(&report(120, "All good.")).unwrap();

        assert!(writer.page_count >= 3, "got {} pages", writer.page_count);
    }

    #[test]
    fn summary_lines_strip_markdown() {
        let lines = summary_lines("## Overview\n\n\nYou spent **$52.50**.\n* Cook at home\n\n");

        assert_eq!(
            lines,
            ["Overview", "", "You spent $52.50.", "- Cook at home"]
        );
    }

    #[test]
    fn wrap_breaks_at_word_boundaries() {
        let lines = wrap("the quick brown fox jumps over the lazy dog", 15);

        assert_eq!(lines, ["the quick brown", "fox jumps over", "the lazy dog"]);
        assert!(lines.iter().all(|line| line.chars().count() <= 15));
    }

    #[test]
    fn wrap_splits_long_words() {
        let lines = wrap("abcdefghij xy", 4);

        assert_eq!(lines, ["abcd", "efgh", "ij", "xy"]);
    }

    #[test]
    fn truncate_marks_cut() {
        assert_eq!(truncate("Groceries", 20), "Groceries");
        assert_eq!(truncate("A very long description here", 10), "A very ...");
    }

    #[test]
    fn pdf_safe_text_replaces_unsupported_characters() {
        assert_eq!(
            pdf_safe_text("Café \u{2014} \u{201C}budget\u{201D} \u{1F600}"),
            "Café - \"budget\" ?"
        );
    }
}
