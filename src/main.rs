//! Entry point for the **dockbar** daemon.
//!
//! Loads the bar document, spawns the command socket listener on a
//! background thread, and processes commands and bar polls on the main
//! thread.
//!
//! When the `visualizer-gtk` feature is enabled the main thread runs the
//! GLib main loop (GTK4 requires it) and renders the bars.  Without the
//! feature, a headless loop waits for commands until the next bar is due
//! for a poll.
//!
//! `--dry-run` swaps the Hyprland backend for one that sees no windows and
//! ignores every window action, which is handy for trying out commands.

use dockbar::command::Command;
use dockbar::config::Config;
use dockbar::hyprland::wm::HyprlandWindows;
use dockbar::ipc::default_socket_path;
use dockbar::ipc::listener::{is_running, UnixSocketListener};
use dockbar::manager::BarManager;
use dockbar::traits::{CommandSource, WindowSystem};
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::mpsc;

/// Resolve the config directory (`$XDG_CONFIG_HOME/dockbar`).
fn config_dir() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME").unwrap_or_else(|_| {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        format!("{}/.config", home)
    });
    PathBuf::from(base).join("dockbar")
}

/// Load `$XDG_CONFIG_HOME/dockbar/config.json`, normalising it and saving
/// it back when that changed anything.
///
/// Returns the path to save to, or `None` when the existing document could
/// not be read: it is left untouched rather than overwritten by defaults.
fn load_config(path: &Path) -> (Config, Option<PathBuf>) {
    match Config::load_or_default(path) {
        Ok(mut cfg) => {
            info!("loaded {} bar(s) from {}", cfg.bars.len(), path.display());
            if cfg.normalize() {
                info!("normalised colours and settings, saving back");
                if let Err(e) = cfg.save(path) {
                    warn!("{}", e);
                }
            }
            (cfg, Some(path.to_path_buf()))
        }
        Err(e) => {
            warn!("{}; using defaults, changes will not be saved", e);
            (Config::default(), None)
        }
    }
}

/// Resolve the CSS stylesheet path.
#[cfg(feature = "visualizer-gtk")]
fn css_path() -> PathBuf {
    config_dir().join("style.css")
}

//  No-op window system (--dry-run)

mod noop_windows {
    use dockbar::command::{Placement, WindowAction, WindowHandle, WindowInfo};
    use dockbar::geometry::WorkArea;
    use dockbar::traits::WindowSystem;
    use log::info;

    pub struct NoopWindows;

    #[derive(Debug, thiserror::Error)]
    #[error("noop")]
    pub struct NoopWindowsError;

    impl WindowSystem for NoopWindows {
        type Error = NoopWindowsError;

        fn windows(&self) -> Result<Vec<WindowInfo>, NoopWindowsError> {
            Ok(Vec::new())
        }

        fn placement(&self, _: &WindowHandle) -> Result<Placement, NoopWindowsError> {
            Ok(Placement::Normal)
        }

        fn set_state(&self, handle: &WindowHandle, action: WindowAction) -> Result<(), NoopWindowsError> {
            info!("dry run: {} {}", action, handle);
            Ok(())
        }

        fn bring_to_foreground(&self, _: &WindowHandle) -> Result<(), NoopWindowsError> {
            Ok(())
        }

        fn close(&self, handle: &WindowHandle) -> Result<(), NoopWindowsError> {
            info!("dry run: close {}", handle);
            Ok(())
        }

        fn open_path(&self, path: &str) -> Result<(), NoopWindowsError> {
            info!("dry run: open {}", path);
            Ok(())
        }

        fn work_area(&self) -> Result<WorkArea, NoopWindowsError> {
            Ok(WorkArea::default())
        }
    }
}

use noop_windows::NoopWindows;

//  Main

fn main() {
    env_logger::init();

    let dry_run = std::env::args().any(|a| a == "--dry-run");
    let socket = default_socket_path();

    if is_running(&socket) {
        info!("dockbar is already running ({}), exiting", socket.display());
        return;
    }

    let (config, save_path) = load_config(&config_dir().join("config.json"));

    if dry_run {
        info!("running in dry-run mode (no window system)");
        run_daemon(NoopWindows, config, save_path, &socket);
    } else {
        if !HyprlandWindows::is_available() {
            error!("HYPRLAND_INSTANCE_SIGNATURE not set; start inside Hyprland or use --dry-run");
            std::process::exit(1);
        }
        run_daemon(HyprlandWindows::new(), config, save_path, &socket);
    }

    let _ = std::fs::remove_file(&socket);
}

fn run_daemon<W: WindowSystem + 'static>(
    wm: W,
    config: Config,
    save_path: Option<PathBuf>,
    socket: &Path,
) {
    let mut manager = BarManager::new(wm, config);
    if let Some(path) = save_path {
        manager = manager.with_config_path(path);
    }

    let (cmd_tx, cmd_rx) = mpsc::channel::<Command>();
    spawn_command_sources(cmd_tx.clone(), socket.to_path_buf());

    start_event_loop(manager, cmd_tx, cmd_rx);
}

//  Event loops

#[cfg(feature = "visualizer-gtk")]
fn start_event_loop<W: WindowSystem + 'static>(
    manager: BarManager<W>,
    cmd_tx: mpsc::Sender<Command>,
    cmd_rx: mpsc::Receiver<Command>,
) {
    if let Err(e) = dockbar::visualizer::gtk::run_main_loop(manager, cmd_tx, cmd_rx, Some(css_path())) {
        error!("failed to start GTK: {}", e);
        std::process::exit(1);
    }
}

#[cfg(not(feature = "visualizer-gtk"))]
fn start_event_loop<W: WindowSystem>(
    mut manager: BarManager<W>,
    cmd_tx: mpsc::Sender<Command>,
    cmd_rx: mpsc::Receiver<Command>,
) {
    use dockbar::traits::BarEvent;
    use std::time::{Duration, Instant};

    // Only the listener thread sends commands in headless mode.
    drop(cmd_tx);

    let (bar_tx, bar_rx) = mpsc::channel::<BarEvent>();
    manager.set_events(bar_tx);

    info!("dockbar running (headless)");
    while !manager.should_quit() {
        let wait = manager
            .next_due()
            .map(|due| due.saturating_duration_since(Instant::now()))
            .unwrap_or(Duration::from_secs(60));

        match cmd_rx.recv_timeout(wait) {
            Ok(cmd) => {
                if let Err(e) = manager.handle(cmd) {
                    error!("command error: {}", e);
                }
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {}
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                info!("all command sources closed, exiting");
                break;
            }
        }
        manager.tick(Instant::now());

        for event in bar_rx.try_iter() {
            if let BarEvent::VisibleEntriesChanged { bar, entries } = event {
                let labels: Vec<&str> = entries.iter().map(|e| e.label()).collect();
                info!("{}: [{}]", bar, labels.join(", "));
            }
        }
    }
}

//  Helpers

fn spawn_command_sources(tx: mpsc::Sender<Command>, socket: PathBuf) {
    std::thread::spawn(move || {
        let mut source = UnixSocketListener::new(&socket);
        if let Err(e) = source.run(tx) {
            error!("socket listener error: {}", e);
        }
    });
}
