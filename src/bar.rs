//! A single launcher bar and its tracked files.
//!
//! A [`Bar`] owns its configured [`FileEntry`] list, its geometry, and the
//! [`WindowRegistry`] that says which of those files currently have an open
//! window.  Only open entries get a button; a bar with none is hidden.

use crate::command::{Placement, WindowAction};
use crate::geometry::{Point, Rect, Size};
use crate::registry::{OpenMap, WindowRegistry};
use crate::traits::WindowSystem;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;

fn default_order() -> i64 {
    999
}

/// A file tracked by a bar.
///
/// `path` is unique within one bar but may appear in several bars.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub path: String,
    /// Display position among the open entries (ascending).
    #[serde(default = "default_order")]
    pub order: i64,
    /// Button colour, usually an `hsl(...)` string.
    #[serde(default)]
    pub color: String,
}

impl FileEntry {
    pub fn new(path: impl Into<String>, order: i64, color: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            order,
            color: color.into(),
        }
    }

    /// File name shown on the button.
    pub fn label(&self) -> &str {
        std::path::Path::new(&self.path)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(&self.path)
    }
}

/// Stable identity of a bar for the lifetime of the process.
///
/// Names can change (rename) but ids cannot; dock groups are keyed by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BarId(pub u32);

impl fmt::Display for BarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Result of [`Bar::toggle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// No window is bound to the path; nothing happened.
    NotOpen,
    Minimized,
    Restored,
}

/// One launcher bar.
#[derive(Debug, Clone)]
pub struct Bar {
    id: BarId,
    name: String,
    entries: Vec<FileEntry>,
    border_color: String,
    position: Point,
    size: Size,
    registry: WindowRegistry,
}

impl Bar {
    pub fn new(
        id: BarId,
        name: impl Into<String>,
        entries: Vec<FileEntry>,
        border_color: impl Into<String>,
        position: Point,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            entries,
            border_color: border_color.into(),
            position,
            size: Size::default(),
            registry: WindowRegistry::new(),
        }
    }

    //  Accessors

    pub fn id(&self) -> BarId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn entries(&self) -> &[FileEntry] {
        &self.entries
    }

    /// Mutable access to the configured entries.  Bindings of removed paths
    /// are dropped once the borrow ends via [`Bar::prune_open_map`].
    pub fn entries_mut(&mut self) -> &mut Vec<FileEntry> {
        &mut self.entries
    }

    pub fn prune_open_map(&mut self) {
        self.registry.retain_entries(&self.entries);
    }

    pub fn has_entry(&self, path: &str) -> bool {
        self.entries.iter().any(|e| e.path == path)
    }

    pub fn border_color(&self) -> &str {
        &self.border_color
    }

    pub fn set_border_color(&mut self, color: impl Into<String>) {
        self.border_color = color.into();
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn set_position(&mut self, position: Point) {
        self.position = position;
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn set_size(&mut self, size: Size) {
        self.size = size;
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.position, self.size)
    }

    pub fn open_map(&self) -> &OpenMap {
        self.registry.open_map()
    }

    //  Behaviour

    /// Translate the bar by `delta`.
    pub fn move_by(&mut self, delta: Point) {
        self.position += delta;
    }

    /// Open entries in display order: ascending `order`, configuration
    /// order among equal values.
    pub fn visible_entries(&self) -> Vec<&FileEntry> {
        let mut open: Vec<&FileEntry> = self
            .entries
            .iter()
            .filter(|e| self.registry.is_open(&e.path))
            .collect();
        // `sort_by_key` is stable.
        open.sort_by_key(|e| e.order);
        open
    }

    /// Whether the bar has at least one open entry to show.
    pub fn is_visible(&self) -> bool {
        self.entries.iter().any(|e| self.registry.is_open(&e.path))
    }

    /// Refresh the open-window mapping.  Returns whether it changed.
    pub fn poll<W: WindowSystem>(&mut self, wm: &W) -> Result<bool, W::Error> {
        self.registry.poll(wm, &self.entries)
    }

    /// Minimize the window showing `path`, or restore and focus it when it
    /// is already minimized.
    ///
    /// A window that closed since the last poll reads as normal and the
    /// window system ignores the minimize, so a stale handle is a no-op.
    pub fn toggle<W: WindowSystem>(&self, wm: &W, path: &str) -> Result<ToggleOutcome, W::Error> {
        let Some(handle) = self.registry.handle(path) else {
            debug!("toggle {}: not open", path);
            return Ok(ToggleOutcome::NotOpen);
        };

        let placement = wm.placement(handle).unwrap_or_else(|e| {
            debug!("placement of {} unavailable ({}), assuming normal", handle, e);
            Placement::Normal
        });

        if placement == Placement::Minimized {
            wm.set_state(handle, WindowAction::Restore)?;
            wm.bring_to_foreground(handle)?;
            Ok(ToggleOutcome::Restored)
        } else {
            wm.set_state(handle, WindowAction::Minimize)?;
            Ok(ToggleOutcome::Minimized)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{WindowHandle, WindowInfo};
    use crate::testing::RecorderWindows;

    fn bar(entries: Vec<FileEntry>) -> Bar {
        Bar::new(BarId(0), "work", entries, "hsl(0, 70%, 45%)", Point::new(10, 20))
    }

    fn polled(entries: Vec<FileEntry>, wm: &RecorderWindows) -> Bar {
        let mut b = bar(entries);
        b.poll(wm).unwrap();
        b
    }

    #[test]
    fn visible_entries_sorted_by_order() {
        let wm = RecorderWindows::with_windows(vec![
            WindowInfo::new("0x1", "a.txt"),
            WindowInfo::new("0x2", "b.txt"),
        ]);
        let b = polled(
            vec![FileEntry::new("a.txt", 2, ""), FileEntry::new("b.txt", 1, "")],
            &wm,
        );
        let paths: Vec<&str> = b.visible_entries().iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["b.txt", "a.txt"]);
    }

    #[test]
    fn equal_orders_keep_configured_order() {
        let wm = RecorderWindows::with_windows(vec![
            WindowInfo::new("0x1", "c.txt"),
            WindowInfo::new("0x2", "a.txt"),
            WindowInfo::new("0x3", "b.txt"),
        ]);
        let b = polled(
            vec![
                FileEntry::new("c.txt", 1, ""),
                FileEntry::new("a.txt", 1, ""),
                FileEntry::new("b.txt", 0, ""),
            ],
            &wm,
        );
        let paths: Vec<&str> = b.visible_entries().iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["b.txt", "c.txt", "a.txt"]);
    }

    #[test]
    fn bar_without_open_entries_is_hidden() {
        let wm = RecorderWindows::with_windows(vec![WindowInfo::new("0x1", "Terminal")]);
        let b = polled(vec![FileEntry::new("a.txt", 1, "")], &wm);
        assert!(b.visible_entries().is_empty());
        assert!(!b.is_visible());
    }

    #[test]
    fn toggle_minimizes_a_normal_window() {
        let wm = RecorderWindows::with_windows(vec![WindowInfo::new("0x1", "a.txt")]);
        let b = polled(vec![FileEntry::new("a.txt", 1, "")], &wm);
        assert_eq!(b.toggle(&wm, "a.txt").unwrap(), ToggleOutcome::Minimized);
        assert_eq!(
            wm.actions.borrow().as_slice(),
            &[(WindowHandle("0x1".into()), WindowAction::Minimize)]
        );
        assert!(wm.foregrounded.borrow().is_empty());
    }

    #[test]
    fn toggle_restores_and_focuses_a_minimized_window() {
        let wm = RecorderWindows::with_windows(vec![WindowInfo::new("0x1", "a.txt")]);
        wm.set_placement("0x1", Placement::Minimized);
        let b = polled(vec![FileEntry::new("a.txt", 1, "")], &wm);
        assert_eq!(b.toggle(&wm, "a.txt").unwrap(), ToggleOutcome::Restored);
        assert_eq!(
            wm.actions.borrow().as_slice(),
            &[(WindowHandle("0x1".into()), WindowAction::Restore)]
        );
        assert_eq!(wm.foregrounded.borrow().as_slice(), &[WindowHandle("0x1".into())]);
    }

    #[test]
    fn toggle_twice_round_trips_the_window_state() {
        let wm = RecorderWindows::with_windows(vec![WindowInfo::new("0x1", "a.txt")]);
        let b = polled(vec![FileEntry::new("a.txt", 1, "")], &wm);
        b.toggle(&wm, "a.txt").unwrap();
        b.toggle(&wm, "a.txt").unwrap();
        let actions: Vec<WindowAction> = wm.actions.borrow().iter().map(|(_, a)| *a).collect();
        assert_eq!(actions, vec![WindowAction::Minimize, WindowAction::Restore]);
    }

    #[test]
    fn toggle_maximized_window_minimizes_it() {
        let wm = RecorderWindows::with_windows(vec![WindowInfo::new("0x1", "a.txt")]);
        wm.set_placement("0x1", Placement::Maximized);
        let b = polled(vec![FileEntry::new("a.txt", 1, "")], &wm);
        assert_eq!(b.toggle(&wm, "a.txt").unwrap(), ToggleOutcome::Minimized);
    }

    #[test]
    fn toggle_unknown_path_is_a_no_op() {
        let wm = RecorderWindows::default();
        let b = bar(vec![FileEntry::new("a.txt", 1, "")]);
        assert_eq!(b.toggle(&wm, "a.txt").unwrap(), ToggleOutcome::NotOpen);
        assert!(wm.actions.borrow().is_empty());
    }

    #[test]
    fn toggle_stale_handle_is_a_no_op() {
        let wm = RecorderWindows::with_windows(vec![WindowInfo::new("0x1", "a.txt")]);
        let b = polled(vec![FileEntry::new("a.txt", 1, "")], &wm);
        // The window closes before the next poll.
        wm.windows.borrow_mut().clear();
        assert!(b.toggle(&wm, "a.txt").is_ok());
        assert!(wm.actions.borrow().is_empty());
    }

    #[test]
    fn move_by_translates_position() {
        let mut b = bar(vec![]);
        b.move_by(Point::new(5, -3));
        assert_eq!(b.position(), Point::new(15, 17));
    }

    #[test]
    fn label_is_file_name() {
        assert_eq!(FileEntry::new("/home/u/notes.txt", 1, "").label(), "notes.txt");
        assert_eq!(FileEntry::new("notes", 1, "").label(), "notes");
    }

    #[test]
    fn missing_order_sorts_last() {
        let e: FileEntry = serde_json::from_str(r#"{"path":"a.txt"}"#).unwrap();
        assert_eq!(e.order, 999);
        assert_eq!(e.color, "");
    }
}
