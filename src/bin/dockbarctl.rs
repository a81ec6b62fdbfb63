//! Command-line client for a running **dockbar** daemon.
//!
//! Turns its arguments into one [`Command`], sends it as a JSON line to the
//! daemon's socket, and exits.
//!
//! ```text
//! dockbarctl new-bar work
//! dockbarctl add-file work ~/notes.txt
//! dockbarctl move work 40 900 [--solo]
//! dockbarctl release work
//! dockbarctl quit --close-windows
//! dockbarctl raw '{"SetScale":1.8}'
//! ```

use clap::{Parser, Subcommand};
use dockbar::command::Command;
use dockbar::geometry::Point;
use dockbar::ipc::default_socket_path;
use dockbar::ipc::listener::send_command;
use log::error;
use std::path::{Path, PathBuf};

/// Send one command to the running dockbar daemon.
#[derive(Parser, Debug)]
#[command(name = "dockbarctl", version, about, long_about = None)]
struct Cli {
    /// Daemon socket (default: `$XDG_RUNTIME_DIR/dockbar.sock`).
    #[arg(long, global = true)]
    socket: Option<PathBuf>,

    #[command(subcommand)]
    command: Sub,
}

#[derive(Subcommand, Debug)]
enum Sub {
    /// Create an empty bar.
    NewBar { name: String },

    /// Rename a bar.
    Rename { from: String, to: String },

    /// Delete a bar.
    Delete { name: String },

    /// Track a file in a bar.
    AddFile { bar: String, path: PathBuf },

    /// Minimize or restore the file's window.
    Toggle { bar: String, path: PathBuf },

    /// Open a file with its default application.
    Open { path: PathBuf },

    /// Drag a bar (and its dock group) to X Y.
    Move {
        bar: String,
        #[arg(allow_negative_numbers = true)]
        x: i32,
        #[arg(allow_negative_numbers = true)]
        y: i32,
        /// Move only this bar, leaving its group behind.
        #[arg(long)]
        solo: bool,
    },

    /// Drop a dragged bar: snap, dock or detach.
    Release { bar: String },

    /// Set the rendering scale (1.0 to 2.5).
    Scale { factor: f64 },

    /// Refresh every bar now.
    Poll,

    /// Save and stop the daemon.
    Quit {
        /// Also close every tracked window.
        #[arg(long)]
        close_windows: bool,
    },

    /// Send a JSON command as is.
    Raw { json: String },
}

impl Sub {
    fn into_command(self) -> Result<Command, serde_json::Error> {
        Ok(match self {
            Sub::NewBar { name } => Command::NewBar { name },
            Sub::Rename { from, to } => Command::RenameBar { from, to },
            Sub::Delete { name } => Command::DeleteBar { name },
            Sub::AddFile { bar, path } => Command::AddFile {
                bar,
                path: absolute(&path),
            },
            Sub::Toggle { bar, path } => Command::Toggle {
                bar,
                path: absolute(&path),
            },
            Sub::Open { path } => Command::OpenFile { path: absolute(&path) },
            Sub::Move { bar, x, y, solo } => Command::DragMove {
                bar,
                to: Point::new(x, y),
                solo,
            },
            Sub::Release { bar } => Command::DragRelease { bar },
            Sub::Scale { factor } => Command::SetScale(factor),
            Sub::Poll => Command::Poll,
            Sub::Quit { close_windows } => Command::Quit { close_windows },
            Sub::Raw { json } => serde_json::from_str(&json)?,
        })
    }
}

/// `path` relative to the current directory, unless it already is
/// absolute.  Bars store the paths they are given, so relative ones would
/// depend on where the client ran.
fn absolute(path: &Path) -> String {
    if path.is_absolute() {
        return path.display().to_string();
    }
    std::env::current_dir()
        .map(|dir| dir.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
        .display()
        .to_string()
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let socket = cli.socket.unwrap_or_else(default_socket_path);
    let cmd = match cli.command.into_command() {
        Ok(cmd) => cmd,
        Err(e) => {
            eprintln!("bad command: {}", e);
            std::process::exit(2);
        }
    };

    if let Err(e) = send_command(&socket, &cmd) {
        error!("cannot reach dockbar at {}: {}", socket.display(), e);
        std::process::exit(1);
    }
}
