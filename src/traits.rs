//! Core traits that decouple dockbar from any specific window system or
//! transport mechanism.
//!
//! Every concrete backend (Hyprland, a Unix-socket listener, a test
//! harness, …) implements one of these traits.  The
//! [`BarManager`](crate::manager::BarManager) only depends on these
//! abstractions.

use crate::bar::FileEntry;
use crate::command::{Command, Placement, WindowAction, WindowHandle, WindowInfo};
use crate::geometry::{Point, WorkArea};
use std::sync::mpsc;

/// Abstraction over the desktop's window system.
///
/// Handles are snapshots: a window may close between an enumeration and the
/// next call that uses its handle.  Implementations must turn such stale
/// handles into no-ops (or, for [`placement`](WindowSystem::placement),
/// into [`Placement::Normal`]) instead of failing.
pub trait WindowSystem {
    /// The error type produced by this window system.
    type Error: std::error::Error + Send + 'static;

    /// Every visible top-level window, in the window system's own order.
    fn windows(&self) -> Result<Vec<WindowInfo>, Self::Error>;

    /// Current show state of `handle`.
    fn placement(&self, handle: &WindowHandle) -> Result<Placement, Self::Error>;

    /// Minimize or restore `handle`.
    fn set_state(&self, handle: &WindowHandle, action: WindowAction) -> Result<(), Self::Error>;

    /// Raise and focus `handle`.
    fn bring_to_foreground(&self, handle: &WindowHandle) -> Result<(), Self::Error>;

    /// Ask the application owning `handle` to close it.
    fn close(&self, handle: &WindowHandle) -> Result<(), Self::Error>;

    /// Open `path` with the desktop's default application.
    fn open_path(&self, path: &str) -> Result<(), Self::Error>;

    /// Usable area of the primary display, excluding panels and taskbars.
    fn work_area(&self) -> Result<WorkArea, Self::Error>;
}

//  Renderer events

/// Events sent from the [`BarManager`](crate::manager::BarManager) to a
/// renderer over an [`mpsc`](std::sync::mpsc) channel.
///
/// The manager holds an `Option<mpsc::Sender<BarEvent>>`.  Any listener
/// can consume them: the GTK renderer, a debug logger, a test.
#[derive(Debug, Clone, PartialEq)]
pub enum BarEvent {
    /// A bar was created (or loaded) at `position`.
    Created { bar: String, position: Point, border_color: String },

    /// The set of open entries of `bar` changed.  An empty list means the
    /// bar should be hidden.
    VisibleEntriesChanged { bar: String, entries: Vec<FileEntry> },

    /// `bar` now sits at `position`.
    Moved { bar: String, position: Point },

    Renamed { from: String, to: String },

    Removed { bar: String },

    /// The rendering scale changed; every bar must be re-laid out.
    Restyled { scale: f64 },

    /// Saving the configuration failed.  In-memory state is unaffected.
    PersistenceFailed(String),

    /// The manager is shutting down.
    Quit,
}

//  Command Source

/// A source of [`Command`]s.
///
/// Implementations listen on some transport (a Unix socket, an in-memory
/// channel) and forward parsed commands into the provided
/// [`mpsc::Sender`].
///
/// # Contract
///
/// * [`run`](CommandSource::run) **blocks** until the source is exhausted or
///   an unrecoverable error occurs.
/// * Each received command must be sent through `sink` exactly once.
/// * Implementations must be [`Send`] so they can run on a dedicated thread.
pub trait CommandSource: Send {
    /// The error type produced by this source.
    type Error: std::error::Error + Send + 'static;

    /// Start listening and forward every incoming [`Command`] into `sink`.
    fn run(&mut self, sink: mpsc::Sender<Command>) -> Result<(), Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[derive(Debug, thiserror::Error)]
    #[error("mock error")]
    struct MockError;

    /// A test double that emits a fixed sequence of commands.
    struct MockSource {
        commands: Vec<Command>,
    }

    impl CommandSource for MockSource {
        type Error = MockError;

        fn run(&mut self, sink: mpsc::Sender<Command>) -> Result<(), MockError> {
            for cmd in self.commands.drain(..) {
                let _ = sink.send(cmd);
            }
            Ok(())
        }
    }

    #[test]
    fn mock_source_emits_commands() {
        let mut src = MockSource {
            commands: vec![
                Command::NewBar { name: "a".into() },
                Command::DragRelease { bar: "a".into() },
            ],
        };
        let (tx, rx) = mpsc::channel();
        src.run(tx).unwrap();
        let cmds: Vec<Command> = rx.try_iter().collect();
        assert_eq!(cmds.len(), 2);
        assert_eq!(cmds[0], Command::NewBar { name: "a".into() });
        assert_eq!(cmds[1], Command::DragRelease { bar: "a".into() });
    }
}
