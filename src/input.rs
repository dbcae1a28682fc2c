use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::Result;

/// Extensions recognized as code in directory mode. Anything else is
/// silently skipped.
const CODE_EXTENSIONS: &[&str] = &[
    "go", "java", "py", "js", "ts", "html", "css", "cpp", "c", "h", "cs", "php",
];

/// Reads a file and returns its normalized lines.
///
/// Line endings collapse to `\n`, tabs expand to four spaces, and any
/// remaining control character that a PDF font cannot display becomes a
/// plain space. A trailing newline yields a trailing empty line, matching
/// plain split semantics.
pub fn read_lines(path: &Path) -> Result<Vec<String>> {
    let raw = fs::read_to_string(path)?;
    Ok(normalize_lines(&raw))
}

pub fn normalize_lines(raw: &str) -> Vec<String> {
    let text = raw.replace("\r\n", "\n").replace('\r', "\n");
    let text = text.replace('\t', "    ");

    let cleaned: String = text
        .chars()
        .map(|c| {
            let code = c as u32;
            let control = code < 32 || code == 127 || (128..=159).contains(&code);
            if control && c != '\n' {
                ' '
            } else {
                c
            }
        })
        .collect();

    cleaned.split('\n').map(str::to_string).collect()
}

pub fn is_code_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| CODE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Collects every recognized code file under `root`, sorted by path.
/// The first walk error aborts the whole collection.
pub fn collect_code_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry?;
        if entry.file_type().is_file() && is_code_file(entry.path()) {
            files.push(entry.path().to_path_buf());
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn normalizes_windows_and_mac_line_endings() {
        let lines = normalize_lines("a\r\nb\rc\nd");
        assert_eq!(lines, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn expands_tabs_to_four_spaces() {
        let lines = normalize_lines("\tx");
        assert_eq!(lines, vec!["    x"]);
    }

    #[test]
    fn scrubs_control_characters_to_spaces() {
        let lines = normalize_lines("a\u{0}b\u{7f}c\u{9b}d");
        assert_eq!(lines, vec!["a b c d"]);
    }

    #[test]
    fn trailing_newline_yields_trailing_empty_line() {
        let lines = normalize_lines("one\ntwo\n");
        assert_eq!(lines, vec!["one", "two", ""]);
    }

    #[test]
    fn empty_source_is_a_single_empty_line() {
        assert_eq!(normalize_lines(""), vec![""]);
    }

    #[test]
    fn allow_list_membership() {
        assert!(is_code_file(Path::new("src/main.go")));
        assert!(is_code_file(Path::new("Widget.JAVA")));
        assert!(!is_code_file(Path::new("notes.md")));
        assert!(!is_code_file(Path::new("Makefile")));
    }

    #[test]
    fn collects_sorted_code_files_and_skips_the_rest() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("b.py"), "print(1)\n").unwrap();
        fs::write(dir.path().join("a.txt"), "ignored\n").unwrap();
        fs::write(dir.path().join("sub/a.go"), "package sub\n").unwrap();

        let files = collect_code_files(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["b.py", "sub/a.go"]);
    }
}
