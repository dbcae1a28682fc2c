use std::fs;
use std::path::Path;

use pdf_writer::{Content, Filter, Name, Pdf, Rect, Ref, Str};
use tracing::info;

use crate::error::{CodePdfError, Result};
use crate::render::RenderSink;

// A4 portrait, all units in points. The cursor runs top-down, like the
// layout engine's vertical budget.
const PAGE_WIDTH: f32 = 595.28;
const PAGE_HEIGHT: f32 = 841.89;
const MARGIN_LEFT: f32 = 28.35;
const MARGIN_RIGHT: f32 = 28.35;

const HEADER_TOP: f32 = 14.17;
const HEADER_FONT_SIZE: f32 = 10.0;
const BODY_TOP: f32 = 45.35;
const BOTTOM_LIMIT: f32 = 807.87;
const FOOTER_BASELINE: f32 = 24.0;
const FOOTER_FONT_SIZE: f32 = 8.0;

const CODE_FONT_SIZE: f32 = 8.0;
// Courier advance width is 600/1000 em.
const CODE_CHAR_WIDTH: f32 = CODE_FONT_SIZE * 0.6;
const ROW_HEIGHT: f32 = 14.2;

const NUM_COL_WIDTH: f32 = 42.52;
const SPACER_WIDTH: f32 = 14.17;
const TEXT_X: f32 = MARGIN_LEFT + NUM_COL_WIDTH + SPACER_WIDTH;

/// PDF render sink: one content stream per page, Courier for code and
/// line numbers, Helvetica for the header and footer. Footers are drawn
/// at `finish`, once the page total is known.
pub struct PdfSink {
    pages: Vec<Content>,
    cursor: f32,
    header: String,
    footer: String,
}

impl PdfSink {
    pub fn new() -> Self {
        Self {
            pages: Vec::new(),
            cursor: BODY_TOP,
            header: String::new(),
            footer: String::new(),
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn text_columns() -> usize {
        ((PAGE_WIDTH - MARGIN_RIGHT - TEXT_X) / CODE_CHAR_WIDTH) as usize
    }

    fn show_text(content: &mut Content, font: &[u8], size: f32, x: f32, baseline: f32, text: &str) {
        content.begin_text();
        content.set_font(Name(font), size);
        content.next_line(x, baseline);
        content.show(Str(&to_winansi(text)));
        content.end_text();
    }

    fn draw_header(&mut self) {
        let content = self.pages.last_mut().expect("page is open");
        let baseline = PAGE_HEIGHT - HEADER_TOP - HEADER_FONT_SIZE;
        Self::show_text(
            content,
            b"F2",
            HEADER_FONT_SIZE,
            MARGIN_LEFT,
            baseline,
            &self.header,
        );

        let rule_y = baseline - 3.0;
        content.set_line_width(0.5);
        content.move_to(MARGIN_LEFT, rule_y);
        content.line_to(PAGE_WIDTH - MARGIN_RIGHT, rule_y);
        content.stroke();
    }

    /// Auto page break, matching the original tool's behavior for rows
    /// that wrap past the bottom margin.
    fn ensure_room(&mut self) {
        if self.cursor + ROW_HEIGHT > BOTTOM_LIMIT {
            self.add_page();
        }
    }

    fn draw_footers(&mut self) {
        let total = self.pages.len();
        for (idx, content) in self.pages.iter_mut().enumerate() {
            let text = if self.footer.is_empty() {
                format!("Page {} of {}", idx + 1, total)
            } else {
                format!("{} - Page {} of {}", self.footer, idx + 1, total)
            };
            // Rough Helvetica centering; close enough for a footer.
            let width = text.chars().count() as f32 * FOOTER_FONT_SIZE * 0.5;
            let x = (PAGE_WIDTH - width) / 2.0;
            content.set_fill_gray(0.3);
            Self::show_text(content, b"F2", FOOTER_FONT_SIZE, x, FOOTER_BASELINE, &text);
            content.set_fill_gray(0.0);
        }
    }
}

impl Default for PdfSink {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderSink for PdfSink {
    fn begin_document(&mut self, header: &str, footer: &str) {
        self.header = header.to_string();
        self.footer = footer.to_string();
        self.add_page();
    }

    fn add_page(&mut self) {
        self.pages.push(Content::new());
        self.draw_header();
        self.cursor = BODY_TOP;
    }

    fn draw_row(&mut self, line_number: usize, text: &str) -> Result<()> {
        let segments = wrap_text(text, Self::text_columns());
        for (idx, segment) in segments.iter().enumerate() {
            self.ensure_room();
            let baseline = PAGE_HEIGHT - self.cursor - CODE_FONT_SIZE;
            let content = self.pages.last_mut().expect("page is open");

            if idx == 0 {
                let label = line_number.to_string();
                let x = MARGIN_LEFT + NUM_COL_WIDTH
                    - label.chars().count() as f32 * CODE_CHAR_WIDTH;
                content.set_fill_gray(0.5);
                Self::show_text(content, b"F1", CODE_FONT_SIZE, x, baseline, &label);
                content.set_fill_gray(0.0);
            }

            Self::show_text(content, b"F1", CODE_FONT_SIZE, TEXT_X, baseline, segment);
            self.cursor += ROW_HEIGHT;
        }
        Ok(())
    }

    fn end_batch(&mut self) {
        self.cursor += 1.4;
        let rule_y = PAGE_HEIGHT - self.cursor;
        let content = self.pages.last_mut().expect("page is open");
        content.set_line_width(0.2);
        content.move_to(MARGIN_LEFT + 28.35, rule_y);
        content.line_to(PAGE_WIDTH - MARGIN_RIGHT - 28.35, rule_y);
        content.stroke();
        self.cursor += 5.7;
    }

    fn current_vertical_position(&self) -> f32 {
        self.cursor
    }

    fn finish(&mut self, path: &Path) -> Result<()> {
        if self.pages.is_empty() {
            self.add_page();
        }
        self.draw_footers();

        let mut pdf = Pdf::new();
        let mut next_id = 1i32;
        let mut alloc = || {
            let r = Ref::new(next_id);
            next_id += 1;
            r
        };

        let catalog_id = alloc();
        let pages_id = alloc();
        let courier_id = alloc();
        let helvetica_id = alloc();

        pdf.type1_font(courier_id)
            .base_font(Name(b"Courier"))
            .encoding_predefined(Name(b"WinAnsiEncoding"));
        pdf.type1_font(helvetica_id)
            .base_font(Name(b"Helvetica"))
            .encoding_predefined(Name(b"WinAnsiEncoding"));

        let contents = std::mem::take(&mut self.pages);
        let n = contents.len();
        let page_ids: Vec<Ref> = (0..n).map(|_| alloc()).collect();
        let content_ids: Vec<Ref> = (0..n).map(|_| alloc()).collect();

        for (idx, content) in contents.into_iter().enumerate() {
            let raw = content.finish();
            let compressed = miniz_oxide::deflate::compress_to_vec_zlib(&raw, 6);
            pdf.stream(content_ids[idx], &compressed)
                .filter(Filter::FlateDecode);
        }

        pdf.catalog(catalog_id).pages(pages_id);
        pdf.pages(pages_id)
            .kids(page_ids.iter().copied())
            .count(n as i32);

        for idx in 0..n {
            let mut page = pdf.page(page_ids[idx]);
            page.media_box(Rect::new(0.0, 0.0, PAGE_WIDTH, PAGE_HEIGHT))
                .parent(pages_id)
                .contents(content_ids[idx]);
            let mut resources = page.resources();
            let mut fonts = resources.fonts();
            fonts.pair(Name(b"F1"), courier_id);
            fonts.pair(Name(b"F2"), helvetica_id);
        }

        let bytes = pdf.finish();
        fs::write(path, bytes).map_err(|err| {
            CodePdfError::Render(format!("failed to write {}: {err}", path.display()))
        })?;
        info!(pages = n, path = %path.display(), "pdf written");
        Ok(())
    }
}

/// Encodes text for the base-14 fonts. The line source already scrubbed
/// control characters; anything outside Latin-1 degrades to `?`.
fn to_winansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| {
            let code = c as u32;
            if code < 256 {
                code as u8
            } else {
                b'?'
            }
        })
        .collect()
}

/// Greedy monospace word wrap. Breaks at the last space that fits,
/// hard-splits tokens longer than a whole line, and always returns at
/// least one segment so empty lines still occupy a row.
fn wrap_text(text: &str, max_cols: usize) -> Vec<String> {
    let max_cols = max_cols.max(1);
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_cols {
        return vec![text.to_string()];
    }

    let mut segments = Vec::new();
    let mut start = 0;
    while chars.len() - start > max_cols {
        let window = &chars[start..start + max_cols + 1];
        let split = window
            .iter()
            .rposition(|c| *c == ' ')
            .filter(|idx| *idx > 0)
            .unwrap_or(max_cols);
        segments.push(chars[start..start + split].iter().collect());
        start += split;
        while start < chars.len() && chars[start] == ' ' {
            start += 1;
        }
    }
    segments.push(chars[start..].iter().collect());
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_lines_pass_through_unwrapped() {
        assert_eq!(wrap_text("fn main() {}", 80), vec!["fn main() {}"]);
    }

    #[test]
    fn empty_line_is_one_empty_segment() {
        assert_eq!(wrap_text("", 80), vec![""]);
    }

    #[test]
    fn wraps_at_word_boundaries() {
        let segments = wrap_text("alpha beta gamma delta", 11);
        assert_eq!(segments, vec!["alpha beta", "gamma delta"]);
    }

    #[test]
    fn hard_splits_unbroken_tokens() {
        let segments = wrap_text(&"x".repeat(25), 10);
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0].len(), 10);
        assert_eq!(segments[2].len(), 5);
    }

    #[test]
    fn width_one_terminates() {
        let segments = wrap_text("abc", 1);
        assert_eq!(segments, vec!["a", "b", "c"]);
    }

    #[test]
    fn winansi_keeps_latin1_and_degrades_the_rest() {
        assert_eq!(to_winansi("ab"), vec![b'a', b'b']);
        assert_eq!(to_winansi("é"), vec![0xe9]);
        assert_eq!(to_winansi("日"), vec![b'?']);
    }

    #[test]
    fn wrapped_rows_advance_the_cursor_per_segment() {
        let mut sink = PdfSink::new();
        sink.begin_document("proj", "");
        let before = sink.current_vertical_position();
        let long = "word ".repeat(60);
        sink.draw_row(1, long.trim_end()).unwrap();
        let consumed = sink.current_vertical_position() - before;
        let segments = wrap_text(long.trim_end(), PdfSink::text_columns()).len();
        assert!(segments > 1);
        assert!((consumed - segments as f32 * ROW_HEIGHT).abs() < 0.01);
    }

    #[test]
    fn overflowing_rows_auto_break_onto_a_new_page() {
        let mut sink = PdfSink::new();
        sink.begin_document("proj", "");
        for i in 1..=60 {
            sink.draw_row(i, "fn f() {}").unwrap();
        }
        assert_eq!(sink.page_count(), 2);
    }

    #[test]
    fn finish_writes_a_pdf_file() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.pdf");

        let mut sink = PdfSink::new();
        sink.begin_document("proj", "demo");
        sink.draw_row(1, "let x = 1;").unwrap();
        sink.end_batch();
        sink.finish(&out).unwrap();

        let bytes = std::fs::read(&out).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
    }
}
