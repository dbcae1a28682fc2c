mod error;
mod input;
mod layout;
mod pdf;
mod render;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::layout::LayoutConfig;
use crate::pdf::PdfSink;
use crate::render::{render_lines, RenderSink};

#[derive(Debug, Parser)]
#[command(
    name = "codepdf",
    version,
    about = "Render source code into a paginated, line-numbered PDF"
)]
struct Cli {
    /// Source file, or a directory whose code files are concatenated.
    input: PathBuf,

    /// Output PDF path.
    #[arg(short, long, default_value = "code_document.pdf")]
    output: PathBuf,

    /// Project name shown in the page header.
    #[arg(short, long, default_value = "Project")]
    project: String,

    /// Rows attempted per page before a forced break.
    #[arg(long, default_value_t = 50)]
    lines_per_page: usize,

    /// Pages rendered in full before head/tail truncation kicks in.
    #[arg(long, default_value_t = 60)]
    total_pages: usize,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(concat!(env!("CARGO_PKG_NAME"), "=info"))),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = LayoutConfig::new(cli.lines_per_page, cli.total_pages);
    cfg.validate()?;

    let meta = fs::metadata(&cli.input)
        .with_context(|| format!("Failed to stat {}", cli.input.display()))?;

    if meta.is_dir() {
        render_directory(&cli, &cfg)
    } else {
        render_file(&cli, &cfg)
    }
}

/// Single-file mode: load, possibly reduce to a head and a tail window,
/// then lay out.
fn render_file(cli: &Cli, cfg: &LayoutConfig) -> Result<()> {
    let lines = input::read_lines(&cli.input)
        .with_context(|| format!("Failed to read {}", cli.input.display()))?;
    info!(lines = lines.len(), "input loaded");

    let chunks = layout::select_chunks(&lines, cfg);
    if chunks.len() > 1 {
        let kept: usize = chunks.iter().map(layout::Chunk::len).sum();
        info!(
            kept,
            dropped = lines.len() - kept,
            "input exceeds the page capacity, keeping head and tail"
        );
    }

    let mut sink = PdfSink::new();
    sink.begin_document(&cli.project, "");
    for chunk in &chunks {
        if chunk.is_empty() {
            continue;
        }
        info!(start = chunk.start_line, end = chunk.end_line, "laying out chunk");
        render_lines(&chunk.lines, cfg, &mut sink)?;
    }
    info!(pages = sink.page_count(), "layout complete");
    sink.finish(&cli.output)
        .with_context(|| format!("Failed to write {}", cli.output.display()))?;

    println!("PDF written to {}", cli.output.display());
    Ok(())
}

/// Directory mode: every recognized code file, sorted and concatenated,
/// rendered in full. No truncation applies here; a single unreadable
/// file aborts the whole run.
fn render_directory(cli: &Cli, cfg: &LayoutConfig) -> Result<()> {
    ensure_output_dir(&cli.output)?;

    let files = input::collect_code_files(&cli.input)
        .with_context(|| format!("Failed to walk {}", cli.input.display()))?;
    info!(files = files.len(), "code files collected");

    let mut sink = PdfSink::new();
    sink.begin_document(&cli.project, "");
    render_files(&files, cfg, &mut sink)?;
    info!(pages = sink.page_count(), "layout complete");
    sink.finish(&cli.output)
        .with_context(|| format!("Failed to write {}", cli.output.display()))?;

    println!(
        "PDF written to {} ({} code files)",
        cli.output.display(),
        files.len()
    );
    Ok(())
}

/// Feeds every file's lines to the sink in full. Unlike single-file
/// mode, no chunk selection runs here.
fn render_files<S: RenderSink>(files: &[PathBuf], cfg: &LayoutConfig, sink: &mut S) -> Result<()> {
    for file in files {
        let lines = input::read_lines(file)
            .with_context(|| format!("Failed to read {}", file.display()))?;
        render_lines(&lines, cfg, sink)?;
    }
    Ok(())
}

fn ensure_output_dir(output: &Path) -> Result<()> {
    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result as CrateResult;

    struct CountingSink {
        rows: usize,
    }

    impl RenderSink for CountingSink {
        fn begin_document(&mut self, _header: &str, _footer: &str) {}
        fn add_page(&mut self) {}
        fn draw_row(&mut self, _line_number: usize, _text: &str) -> CrateResult<()> {
            self.rows += 1;
            Ok(())
        }
        fn end_batch(&mut self) {}
        fn current_vertical_position(&self) -> f32 {
            0.0
        }
        fn finish(&mut self, _path: &Path) -> CrateResult<()> {
            Ok(())
        }
    }

    // Deliberate inconsistency carried over from the original tool: a
    // single file over the capacity is reduced to head + tail, but the
    // same content inside a directory renders in full.
    #[test]
    fn directory_mode_never_truncates_while_file_mode_does() {
        let cfg = LayoutConfig::new(2, 2); // capacity 4
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.py");
        let body: String = (1..=9).map(|i| format!("print({i})\n")).collect();
        fs::write(&path, &body).unwrap();

        let lines = input::read_lines(&path).unwrap();
        assert_eq!(lines.len(), 10); // trailing newline -> trailing empty line

        let kept: usize = layout::select_chunks(&lines, &cfg)
            .iter()
            .map(layout::Chunk::len)
            .sum();
        assert_eq!(kept, 4);

        let mut sink = CountingSink { rows: 0 };
        render_files(&[path], &cfg, &mut sink).unwrap();
        assert_eq!(sink.rows, 10);
    }

    #[test]
    fn unreadable_file_aborts_the_whole_run() {
        let cfg = LayoutConfig::new(50, 60);
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("gone.rs");
        let mut sink = CountingSink { rows: 0 };
        assert!(render_files(&[missing], &cfg, &mut sink).is_err());
        assert_eq!(sink.rows, 0);
    }
}
