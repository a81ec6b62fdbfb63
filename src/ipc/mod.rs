//! IPC listener that accepts commands over a Unix socket.
//!
//! External tools (`dockbarctl`, scripts, key-bind helpers) can connect to
//! the socket and send newline-delimited JSON commands.  The same socket
//! doubles as the single-instance lock.

pub mod listener;

use std::path::PathBuf;

/// Default command socket: `$XDG_RUNTIME_DIR/dockbar.sock`, or the temp
/// directory when no runtime dir is set.
pub fn default_socket_path() -> PathBuf {
    std::env::var_os("XDG_RUNTIME_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(std::env::temp_dir)
        .join("dockbar.sock")
}
