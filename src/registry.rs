//! Per-bar tracking of which configured files are currently open.
//!
//! Every poll enumerates the live windows once and, for each configured
//! entry, binds the first window whose title [`matches`] it.  "First" is
//! the window system's enumeration order, which is not specified.  When
//! several windows could show the same file, the one picked may differ
//! between window systems or even between polls.  That nondeterminism is
//! accepted; no tie-breaking is attempted.

use crate::bar::FileEntry;
use crate::command::{WindowHandle, WindowInfo};
use crate::matcher::matches;
use crate::traits::WindowSystem;
use log::debug;
use std::collections::BTreeMap;

/// `path -> window` for the entries of one bar that are currently open.
pub type OpenMap = BTreeMap<String, WindowHandle>;

/// Open-window mapping of a single bar, refreshed by [`poll`](Self::poll).
#[derive(Debug, Clone, Default)]
pub struct WindowRegistry {
    open: OpenMap,
}

impl WindowRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The mapping produced by the last poll.
    pub fn open_map(&self) -> &OpenMap {
        &self.open
    }

    /// Window currently bound to `path`, if any.
    pub fn handle(&self, path: &str) -> Option<&WindowHandle> {
        self.open.get(path)
    }

    pub fn is_open(&self, path: &str) -> bool {
        self.open.contains_key(path)
    }

    /// Bind each entry to the first window in `windows` whose title matches
    /// it.  Untitled windows are ignored.
    pub fn resolve(entries: &[FileEntry], windows: &[WindowInfo]) -> OpenMap {
        let mut open = OpenMap::new();
        for entry in entries {
            if open.contains_key(&entry.path) {
                continue;
            }
            let hit = windows
                .iter()
                .filter(|w| !w.title.is_empty())
                .find(|w| matches(&entry.path, &w.title));
            if let Some(w) = hit {
                open.insert(entry.path.clone(), w.handle.clone());
            }
        }
        open
    }

    /// Enumerate the live windows and rebuild the mapping for `entries`.
    ///
    /// Returns whether the mapping changed.  If enumeration fails the
    /// previous mapping is kept and the error is returned; stale handles in
    /// it are harmless because every window operation tolerates them.
    pub fn poll<W: WindowSystem>(&mut self, wm: &W, entries: &[FileEntry]) -> Result<bool, W::Error> {
        let windows = wm.windows()?;
        let open = Self::resolve(entries, &windows);
        debug!("poll: {} window(s), {}/{} entries open", windows.len(), open.len(), entries.len());
        Ok(self.replace(open))
    }

    /// Install a new mapping, returning whether it differs from the old one.
    pub fn replace(&mut self, open: OpenMap) -> bool {
        if open == self.open {
            return false;
        }
        self.open = open;
        true
    }

    /// Drop bindings for paths that are no longer configured.
    pub fn retain_entries(&mut self, entries: &[FileEntry]) {
        self.open.retain(|path, _| entries.iter().any(|e| &e.path == path));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecorderWindows;

    fn entries() -> Vec<FileEntry> {
        vec![
            FileEntry::new("/home/u/notes.txt", 1, ""),
            FileEntry::new("/home/u/plan.md", 2, ""),
            FileEntry::new("/home/u/budget.ods", 3, ""),
        ]
    }

    #[test]
    fn resolve_binds_matching_entries_only() {
        let windows = vec![
            WindowInfo::new("0x1", "notes.txt - Editor"),
            WindowInfo::new("0x2", "Terminal"),
            WindowInfo::new("0x3", "*plan.md - Editor"),
        ];
        let open = WindowRegistry::resolve(&entries(), &windows);
        assert_eq!(open.len(), 2);
        assert_eq!(open["/home/u/notes.txt"], WindowHandle("0x1".into()));
        assert_eq!(open["/home/u/plan.md"], WindowHandle("0x3".into()));
        assert!(!open.contains_key("/home/u/budget.ods"));
    }

    #[test]
    fn first_matching_window_wins() {
        let windows = vec![
            WindowInfo::new("0xa", "notes.txt - Editor"),
            WindowInfo::new("0xb", "notes - Viewer"),
        ];
        let open = WindowRegistry::resolve(&entries(), &windows);
        assert_eq!(open["/home/u/notes.txt"], WindowHandle("0xa".into()));
    }

    #[test]
    fn untitled_windows_are_skipped() {
        let windows = vec![WindowInfo::new("0x1", "")];
        let open = WindowRegistry::resolve(&[FileEntry::new("/x/a", 1, "")], &windows);
        assert!(open.is_empty());
    }

    #[test]
    fn mapping_keys_are_configured_paths() {
        let windows = vec![
            WindowInfo::new("0x1", "notes.txt"),
            WindowInfo::new("0x2", "budget - Sheets"),
            WindowInfo::new("0x3", "other.txt"),
        ];
        let es = entries();
        let open = WindowRegistry::resolve(&es, &windows);
        assert!(open.keys().all(|k| es.iter().any(|e| &e.path == k)));
    }

    #[test]
    fn poll_is_idempotent_without_window_changes() {
        let wm = RecorderWindows::with_windows(vec![
            WindowInfo::new("0x1", "notes.txt - Editor"),
            WindowInfo::new("0x2", "plan - Viewer"),
        ]);
        let mut reg = WindowRegistry::new();
        assert!(reg.poll(&wm, &entries()).unwrap());
        let first = reg.open_map().clone();
        assert!(!reg.poll(&wm, &entries()).unwrap());
        assert_eq!(reg.open_map(), &first);
    }

    #[test]
    fn poll_reports_closed_windows() {
        let wm = RecorderWindows::with_windows(vec![WindowInfo::new("0x1", "notes.txt")]);
        let mut reg = WindowRegistry::new();
        reg.poll(&wm, &entries()).unwrap();
        assert!(reg.is_open("/home/u/notes.txt"));

        wm.windows.borrow_mut().clear();
        assert!(reg.poll(&wm, &entries()).unwrap());
        assert!(reg.open_map().is_empty());
    }

    #[test]
    fn failed_enumeration_keeps_previous_mapping() {
        let wm = RecorderWindows::with_windows(vec![WindowInfo::new("0x1", "notes.txt")]);
        let mut reg = WindowRegistry::new();
        reg.poll(&wm, &entries()).unwrap();

        *wm.fail_enumeration.borrow_mut() = true;
        assert!(reg.poll(&wm, &entries()).is_err());
        assert_eq!(reg.handle("/home/u/notes.txt"), Some(&WindowHandle("0x1".into())));
    }

    #[test]
    fn retain_entries_drops_unconfigured_paths() {
        let wm = RecorderWindows::with_windows(vec![
            WindowInfo::new("0x1", "notes.txt"),
            WindowInfo::new("0x2", "plan.md"),
        ]);
        let mut reg = WindowRegistry::new();
        let es = entries();
        reg.poll(&wm, &es).unwrap();
        reg.retain_entries(&es[1..]);
        assert!(!reg.is_open("/home/u/notes.txt"));
        assert!(reg.is_open("/home/u/plan.md"));
    }
}
