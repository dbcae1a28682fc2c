use std::path::Path;

use tracing::debug;

use crate::error::Result;
use crate::layout::{paginate, LayoutConfig, SpaceBudget};

/// The seam between the page planner and whatever physically draws rows.
///
/// The planner only ever asks the sink to start pages, draw rows, and
/// report its vertical cursor; everything else (fonts, wrapping, headers,
/// footers) is the sink's business.
pub trait RenderSink {
    /// Opens the document and its first page. `footer` is an optional
    /// label drawn next to the page numbering.
    fn begin_document(&mut self, header: &str, footer: &str);

    /// Starts a fresh page; the cursor returns to the top of the body.
    fn add_page(&mut self);

    /// Draws one row: number cell, spacer, wrapped text cell.
    fn draw_row(&mut self, line_number: usize, text: &str) -> Result<()>;

    /// Closes one batch of rows (the divider rule under a page's table).
    fn end_batch(&mut self);

    /// Vertical position already consumed on the current page, in the
    /// same units as `LayoutConfig::page_height`.
    fn current_vertical_position(&self) -> f32;

    /// Writes the finished document.
    fn finish(&mut self, path: &Path) -> Result<()>;
}

/// Lays out one line sequence against the sink.
///
/// A single forward pass: each batch of `lines_per_page` rows is emitted
/// as one page's table, preceded by a forced page break whenever the
/// estimated need exceeds the remaining space. After every batch the
/// budget is reconciled from the sink's actual cursor, so wrapped rows
/// only ever cost us accuracy for one batch.
pub fn render_lines<S: RenderSink>(lines: &[String], cfg: &LayoutConfig, sink: &mut S) -> Result<()> {
    cfg.validate()?;

    let mut budget = SpaceBudget::new(cfg, sink.current_vertical_position());
    for page in paginate(lines, cfg.lines_per_page) {
        if budget.needs_break(page.rows.len()) {
            debug!(rows = page.rows.len(), "forcing page break");
            sink.add_page();
            budget.reset();
        }
        for row in &page.rows {
            sink.draw_row(row.number, &row.text)?;
        }
        sink.end_batch();
        budget.reconcile(sink.current_vertical_position());
    }
    Ok(())
}
