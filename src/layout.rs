use crate::error::{CodePdfError, Result};

/// Per-run layout parameters. Heights are in PDF points.
#[derive(Debug, Clone)]
pub struct LayoutConfig {
    /// Rows attempted per page before a forced break.
    pub lines_per_page: usize,
    /// Pages rendered in full before head/tail truncation applies.
    pub total_pages: usize,
    /// Usable vertical budget of one page.
    pub page_height: f32,
    /// Estimated vertical cost of one row.
    pub line_height: f32,
}

/// Usable height of an A4 page once the top/bottom margins are gone.
pub const DEFAULT_PAGE_HEIGHT: f32 = 785.0;
/// Estimated row height for 8 pt monospace code.
pub const DEFAULT_LINE_HEIGHT: f32 = 14.2;

impl LayoutConfig {
    pub fn new(lines_per_page: usize, total_pages: usize) -> Self {
        Self {
            lines_per_page,
            total_pages,
            page_height: DEFAULT_PAGE_HEIGHT,
            line_height: DEFAULT_LINE_HEIGHT,
        }
    }

    /// Maximum line count rendered in full; beyond it the chunk selector
    /// keeps a head and a tail window and drops the middle.
    pub fn page_capacity(&self) -> usize {
        self.lines_per_page * self.total_pages
    }

    pub fn validate(&self) -> Result<()> {
        if self.lines_per_page == 0 {
            return Err(CodePdfError::InvalidConfig(
                "lines-per-page must be positive".into(),
            ));
        }
        if self.total_pages == 0 {
            return Err(CodePdfError::InvalidConfig(
                "total-pages must be positive".into(),
            ));
        }
        if self.page_height <= 0.0 || self.line_height <= 0.0 {
            return Err(CodePdfError::InvalidConfig(
                "page and line heights must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// A contiguous line range selected for rendering, with 1-based inclusive
/// bounds into the source document.
#[derive(Debug, Clone)]
pub struct Chunk {
    pub start_line: usize,
    pub end_line: usize,
    pub lines: Vec<String>,
}

impl Chunk {
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Decides whether a document is rendered whole or reduced to a head
/// window and a tail window.
///
/// Inputs within the capacity come back as one chunk covering everything
/// (an empty input is the degenerate `[1, 0]` chunk). Oversized inputs
/// come back as exactly two chunks of `capacity / 2` lines each; the
/// middle is dropped with no marker. Only single-file mode calls this;
/// directory mode renders every file in full.
pub fn select_chunks(lines: &[String], cfg: &LayoutConfig) -> Vec<Chunk> {
    let total = lines.len();
    let capacity = cfg.page_capacity();

    if total <= capacity {
        return vec![Chunk {
            start_line: 1,
            end_line: total,
            lines: lines.to_vec(),
        }];
    }

    let half = capacity / 2;
    let head = Chunk {
        start_line: 1,
        end_line: half,
        lines: lines[..half].to_vec(),
    };
    let tail_start = total - half;
    let tail = Chunk {
        start_line: tail_start + 1,
        end_line: total,
        lines: lines[tail_start..].to_vec(),
    };
    vec![head, tail]
}

/// One line's rendering unit: page-local number plus verbatim text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub number: usize,
    pub text: String,
}

/// One rendered sheet's worth of rows. Numbering restarts at 1 on every
/// page, independent of the rows' original document positions.
#[derive(Debug, Clone)]
pub struct Page {
    pub rows: Vec<Row>,
}

/// Splits lines into pages of at most `lines_per_page` rows. The final
/// page may be short; it is never padded or merged backward. Empty input
/// yields no pages.
pub fn paginate<'a>(
    lines: &'a [String],
    lines_per_page: usize,
) -> impl Iterator<Item = Page> + 'a {
    lines.chunks(lines_per_page).map(|batch| Page {
        rows: batch
            .iter()
            .enumerate()
            .map(|(idx, text)| Row {
                number: idx + 1,
                text: text.clone(),
            })
            .collect(),
    })
}

/// Running vertical budget for one planning pass.
///
/// The planner estimates each batch's need from the fixed line height,
/// but the ground truth (wrapped rows, batch dividers) comes from the
/// render target's cursor, so the budget is corrected from the cursor
/// after every batch rather than from row arithmetic.
#[derive(Debug)]
pub struct SpaceBudget {
    page_height: f32,
    line_height: f32,
    remaining: f32,
}

impl SpaceBudget {
    /// `starting_offset` is the vertical position already consumed on
    /// whatever page is open.
    pub fn new(cfg: &LayoutConfig, starting_offset: f32) -> Self {
        Self {
            page_height: cfg.page_height,
            line_height: cfg.line_height,
            remaining: cfg.page_height - starting_offset,
        }
    }

    /// True when the estimated need of `rows` rows exceeds what is left.
    pub fn needs_break(&self, rows: usize) -> bool {
        rows as f32 * self.line_height > self.remaining
    }

    /// A fresh page has its full height available.
    pub fn reset(&mut self) {
        self.remaining = self.page_height;
    }

    /// Re-reads the actual cursor after a batch was drawn.
    pub fn reconcile(&mut self, cursor: f32) {
        self.remaining = self.page_height - cursor;
    }
}
