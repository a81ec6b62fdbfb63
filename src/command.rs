//! Commands and types used throughout dockbar.
//!
//! This module defines the vocabulary that all components share:
//! [`Command`] describes every action the bar manager can perform, and
//! [`WindowHandle`] / [`WindowInfo`] / [`Placement`] / [`WindowAction`]
//! describe live windows as reported by a
//! [`WindowSystem`](crate::traits::WindowSystem).
//!
//! Commands travel as single-line JSON, so every bar is addressed by its
//! (unique) name rather than by an internal id.

use crate::geometry::Point;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier of a live top-level window.
///
/// A handle is only a snapshot: the window may close at any time, so every
/// consumer must tolerate a handle that no longer resolves.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WindowHandle(pub String);

impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A visible top-level window and its title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowInfo {
    pub handle: WindowHandle,
    pub title: String,
}

impl WindowInfo {
    pub fn new(handle: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            handle: WindowHandle(handle.into()),
            title: title.into(),
        }
    }
}

/// Show state of a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Minimized,
    Normal,
    Maximized,
}

/// State change requested from the window system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowAction {
    Minimize,
    Restore,
}

impl fmt::Display for WindowAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WindowAction::Minimize => write!(f, "minimize"),
            WindowAction::Restore => write!(f, "restore"),
        }
    }
}

/// Every action the bar manager can perform.
///
/// Commands are produced by [`CommandSource`](crate::traits::CommandSource)
/// implementations (the Unix socket, the GTK renderer) and consumed by the
/// [`BarManager`](crate::manager::BarManager).
///
/// On the wire, unit variants are plain strings (`"Poll"`) and the rest are
/// externally tagged objects (`{"NewBar":{"name":"work"}}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// The user is holding `bar` and it should now sit at `to`.
    ///
    /// With `solo` unset the bar's whole dock group follows by the same
    /// delta.  With `solo` set only the held bar moves, which is how a bar
    /// is pulled out of its group.
    DragMove {
        bar: String,
        to: Point,
        #[serde(default)]
        solo: bool,
    },

    /// The user let go of `bar`: snap, dock, or detach.
    DragRelease { bar: String },

    /// The renderer laid `bar` out at this size.
    Resize { bar: String, width: i32, height: i32 },

    /// Minimize or restore the window showing `path` in `bar`.
    Toggle { bar: String, path: String },

    /// Create an empty bar.
    NewBar { name: String },

    /// Rename a bar.  Dock groups follow the bar.
    RenameBar { from: String, to: String },

    /// Delete a bar, stopping its polling and detaching it from its group.
    DeleteBar { name: String },

    /// Track a new file in `bar`.
    AddFile { bar: String, path: String },

    /// Change the rendering scale (clamped to `[1.0, 2.5]`).
    SetScale(f64),

    /// Open `path` with the desktop's default application.
    OpenFile { path: String },

    /// Poll every bar now instead of waiting for its timer.
    Poll,

    /// Save and exit.  With `close_windows` every tracked window is asked
    /// to close first.
    Quit {
        #[serde(default)]
        close_windows: bool,
    },
}
