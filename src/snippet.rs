//! Snippet extraction from fetched source files.
//!
//! A popover shows either a capped whole-file view or the referenced line
//! range padded with a couple of lines of surrounding context. Line numbers
//! are 1-based and inclusive throughout, matching the annotation syntax.
//! Annotations can go stale as the documented code evolves; a range that no
//! longer fits the file degrades to an empty excerpt, never a fault.

use crate::properties::{SourceFile, SourceRef};

/// Cap on lines shown for a whole-file reference.
pub const MAX_WHOLE_FILE_LINES: usize = 100;

/// Lines of context shown on each side of a referenced range.
pub const CONTEXT_LINES: usize = 2;

/// Marker appended to the code of a truncated whole-file snippet.
const TRUNCATION_MARKER: &str = "\n\n// ... truncated ...";

/// A display-ready slice of a source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snippet {
    pub code: String,
    /// 1-based line number of the first line in `code`.
    pub context_start_line: usize,
    /// Range to highlight. For a ranged reference this is the authored
    /// range verbatim, even when it falls outside the file as fetched; for
    /// a whole-file reference it spans the shown excerpt.
    pub focus: (usize, usize),
    pub truncated: bool,
    pub total_lines: usize,
}

/// Extract the snippet a reference points at.
///
/// Returns `None` when the file was recorded as missing; the caller shows
/// the per-file error instead. A whole-file reference yields at most
/// [`MAX_WHOLE_FILE_LINES`] lines with a truncation marker when cut; a
/// ranged reference yields the range widened by [`CONTEXT_LINES`] on each
/// side, clipped to the file. A range lying entirely past the end of the
/// file yields an empty excerpt.
pub fn extract(file: &SourceFile, source_ref: &SourceRef) -> Option<Snippet> {
    let SourceFile::Loaded {
        total_lines,
        content,
        ..
    } = file
    else {
        return None;
    };
    let lines: Vec<&str> = content.split('\n').collect();

    match (source_ref.start_line, source_ref.end_line) {
        (Some(start), Some(end)) => {
            let start = (start as usize).max(1);
            let end = end as usize;
            let context_start = start.saturating_sub(CONTEXT_LINES).max(1);
            let context_end = (end + CONTEXT_LINES).min(lines.len());
            // Stale or inverted ranges leave nothing to show.
            let code = if context_start <= context_end {
                lines[context_start - 1..context_end].join("\n")
            } else {
                String::new()
            };
            Some(Snippet {
                code,
                context_start_line: context_start,
                focus: (start, end),
                truncated: false,
                total_lines: *total_lines,
            })
        }
        _ => {
            let truncated = lines.len() > MAX_WHOLE_FILE_LINES;
            let shown = lines.len().min(MAX_WHOLE_FILE_LINES);
            let mut code = lines[..shown].join("\n");
            if truncated {
                code.push_str(TRUNCATION_MARKER);
            }
            Some(Snippet {
                code,
                context_start_line: 1,
                focus: (1, shown),
                truncated,
                total_lines: *total_lines,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded(total: usize) -> SourceFile {
        let content = (1..=total)
            .map(|n| format!("line {n}"))
            .collect::<Vec<_>>()
            .join("\n");
        SourceFile::Loaded {
            language: "ruby".to_string(),
            total_lines: total,
            content,
        }
    }

    #[test]
    fn test_whole_file_under_cap_is_untruncated() {
        let file = loaded(5);
        let snippet = extract(&file, &SourceRef::whole_file("lib/a.rb")).unwrap();
        assert!(!snippet.truncated);
        assert_eq!(snippet.context_start_line, 1);
        assert_eq!(snippet.code.lines().count(), 5);
        assert_eq!(snippet.focus, (1, 5));
        assert_eq!(snippet.total_lines, 5);
    }

    #[test]
    fn test_whole_file_caps_at_limit_with_marker() {
        let file = loaded(250);
        let snippet = extract(&file, &SourceRef::whole_file("lib/a.rb")).unwrap();
        assert!(snippet.truncated);
        assert_eq!(snippet.total_lines, 250);
        // The focus span carries the shown-line count for the "first N of
        // M lines" notice.
        assert_eq!(snippet.focus, (1, MAX_WHOLE_FILE_LINES));
        assert!(snippet.code.ends_with("// ... truncated ..."));
        let shown: Vec<&str> = snippet
            .code
            .strip_suffix("\n\n// ... truncated ...")
            .unwrap()
            .split('\n')
            .collect();
        assert_eq!(shown.len(), MAX_WHOLE_FILE_LINES);
        assert_eq!(shown[0], "line 1");
        assert_eq!(shown[99], "line 100");
    }

    #[test]
    fn test_range_widens_by_context() {
        let file = loaded(60);
        let snippet = extract(&file, &SourceRef::ranged("lib/a.rb", 40, 45)).unwrap();
        assert_eq!(snippet.context_start_line, 38);
        assert_eq!(snippet.focus, (40, 45));
        let lines: Vec<&str> = snippet.code.split('\n').collect();
        assert_eq!(lines.first(), Some(&"line 38"));
        assert_eq!(lines.last(), Some(&"line 47"));
        assert!(!snippet.truncated);
    }

    #[test]
    fn test_range_context_clips_at_file_boundaries() {
        let file = loaded(10);
        let snippet = extract(&file, &SourceRef::ranged("lib/a.rb", 1, 3)).unwrap();
        assert_eq!(snippet.context_start_line, 1);
        assert!(snippet.code.starts_with("line 1"));

        let snippet = extract(&file, &SourceRef::ranged("lib/a.rb", 9, 10)).unwrap();
        let lines: Vec<&str> = snippet.code.split('\n').collect();
        assert_eq!(lines.last(), Some(&"line 10"));
        assert_eq!(snippet.context_start_line, 7);
    }

    #[test]
    fn test_range_past_end_clips_code_not_focus() {
        let file = loaded(10);
        let snippet = extract(&file, &SourceRef::ranged("lib/a.rb", 8, 99)).unwrap();
        // The excerpt stops at the file; the authored range passes through.
        assert_eq!(snippet.focus, (8, 99));
        let lines: Vec<&str> = snippet.code.split('\n').collect();
        assert_eq!(lines.first(), Some(&"line 6"));
        assert_eq!(lines.last(), Some(&"line 10"));
    }

    #[test]
    fn test_stale_range_past_eof_is_empty_excerpt() {
        // The annotated file shrank below the referenced range: nothing to
        // show, but extraction still succeeds.
        let file = loaded(10);
        let snippet = extract(&file, &SourceRef::ranged("lib/a.rb", 50, 60)).unwrap();
        assert_eq!(snippet.code, "");
        assert_eq!(snippet.focus, (50, 60));
        assert_eq!(snippet.total_lines, 10);
        assert!(!snippet.truncated);
    }

    #[test]
    fn test_inverted_range_past_eof_is_empty_excerpt() {
        let file = loaded(7);
        let snippet = extract(&file, &SourceRef::ranged("lib/a.rb", 10, 5)).unwrap();
        assert_eq!(snippet.code, "");
        assert_eq!(snippet.focus, (10, 5));
    }

    #[test]
    fn test_missing_file_yields_none() {
        let missing = SourceFile::Missing {
            language: "text".to_string(),
            error: "File not found".to_string(),
        };
        assert!(extract(&missing, &SourceRef::whole_file("gone.rb")).is_none());
    }
}
