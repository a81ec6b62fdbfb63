//! Title matching between configured files and live windows.
//!
//! Editors tend to put the document name at the very start of their window
//! title (`notes.txt - Editor`, `notes - Viewer`, `*notes.txt` when there
//! are unsaved changes).  A window is considered to show a file when its
//! title, compared case-insensitively, starts with one of:
//!
//! | Prefix           | Example title              |
//! |------------------|----------------------------|
//! | `name.ext`       | `notes.txt - Editor`       |
//! | `name` + `" "`   | `notes - Viewer`           |
//! | `name` + `"-"`   | `notes-draft`              |
//! | `*name.ext`      | `*notes.txt - Editor`      |
//! | `*name`          | `*notes (modified)`        |
//!
//! The heuristic is intentionally loose.  A file called `a` matches the
//! title `a b c`, and that false positive is accepted in exchange for
//! needing no per-application configuration.

use std::path::Path;

/// Return whether `window_title` looks like a window showing `file_path`.
///
/// Paths without a file name (`""`, `"/"`, `".."`) never match.
pub fn matches(file_path: &str, window_title: &str) -> bool {
    let path = Path::new(file_path);
    let (Some(base), Some(stem)) = (path.file_name(), path.file_stem()) else {
        return false;
    };
    let base = base.to_string_lossy().to_lowercase();
    let stem = stem.to_string_lossy().to_lowercase();
    if base.is_empty() || stem.is_empty() {
        return false;
    }

    let title = window_title.to_lowercase();
    let starred = |s: &str| title.strip_prefix('*').is_some_and(|rest| rest.starts_with(s));

    title.starts_with(&base)
        || title.starts_with(&format!("{} ", stem))
        || title.starts_with(&format!("{}-", stem))
        || starred(&base)
        || starred(&stem)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_file_name_prefix() {
        assert!(matches("/home/u/notes.txt", "notes.txt - Editor"));
    }

    #[test]
    fn stem_followed_by_space_or_dash() {
        assert!(matches("/home/u/notes.txt", "notes - Viewer"));
        assert!(matches("/home/u/notes.txt", "notes-draft"));
        assert!(!matches("/home/u/notes.txt", "notesbook"));
    }

    #[test]
    fn unsaved_marker_prefix() {
        assert!(matches("/home/u/notes.txt", "*notes.txt - Editor"));
        assert!(matches("/home/u/notes.txt", "*notes"));
    }

    #[test]
    fn case_insensitive() {
        assert!(matches("/home/u/Report.DOCX", "report.docx - Writer"));
        assert!(matches("/home/u/report.docx", "REPORT - WRITER"));
    }

    #[test]
    fn name_must_be_a_prefix() {
        assert!(!matches("/home/u/notes.txt", "Editor - notes.txt"));
        assert!(!matches("/home/u/notes.txt", ""));
    }

    #[test]
    fn appending_text_never_breaks_a_match() {
        let titles = ["notes.txt", "notes ", "notes-", "*notes.txt", "*notes"];
        for t in titles {
            assert!(matches("/x/notes.txt", t), "{t}");
            for suffix in ["", " - Editor", "xyz", " (read only) *"] {
                let longer = format!("{t}{suffix}");
                assert!(matches("/x/notes.txt", &longer), "{longer}");
            }
        }
    }

    #[test]
    fn only_the_file_name_matters() {
        assert!(matches("/a/b/c/notes.txt", "notes.txt"));
        assert!(matches("notes.txt", "notes.txt"));
        assert!(!matches("/a/b/c/notes.txt", "c - Files"));
    }

    #[test]
    fn short_names_give_accepted_false_positives() {
        assert!(matches("/x/a", "a b c - Editor"));
    }

    #[test]
    fn malformed_paths_never_match() {
        assert!(!matches("", "anything"));
        assert!(!matches("/", "/"));
        assert!(!matches("..", ".. - Files"));
    }
}
