//! The orchestrator that ties the bars, the window system, the persisted
//! document, and the renderer together.
//!
//! [`BarManager`] owns the [`DockingEngine`] and reacts to [`Command`]s by
//! updating bar state, issuing calls to the [`WindowSystem`] trait, saving
//! the configuration, and telling the renderer what changed.

use crate::bar::{BarId, FileEntry};
use crate::color::bar_color;
use crate::command::{Command, WindowHandle};
use crate::config::{clamp_scale, load_bars, recolor_entries, Config, NEW_BAR_POSITION};
use crate::docking::{DockingEngine, ReleaseOutcome};
use crate::geometry::{Size, WorkArea};
use crate::traits::{BarEvent, WindowSystem};
use log::{debug, info, warn};
use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::{Duration, Instant};

/// Possible errors from the manager.
#[derive(Debug, thiserror::Error)]
pub enum ManagerError {
    #[error("no bar named {0:?}")]
    UnknownBar(String),

    #[error("a bar named {0:?} already exists")]
    DuplicateName(String),

    #[error("bar names must not be empty")]
    EmptyName,

    #[error("{path:?} is already tracked by bar {bar:?}")]
    DuplicateEntry { bar: String, path: String },

    /// The window system returned an error.
    #[error("window system error: {0}")]
    WindowSystem(String),
}

/// Orchestrates bar state, polling, persistence, and window-system calls.
///
/// The manager is generic over any [`WindowSystem`] implementation, making
/// it independent of Hyprland or any other concrete backend.  It is not
/// thread-safe and is meant to be driven from a single event loop: feed it
/// commands with [`handle`](Self::handle) and call [`tick`](Self::tick)
/// whenever [`next_due`](Self::next_due) has passed.
///
/// # Typical usage
///
/// ```ignore
/// let wm = HyprlandWindows::new()?;
/// let mut manager = BarManager::new(wm, config).with_config_path(path);
/// manager.handle(Command::NewBar { name: "work".into() })?;
/// manager.tick(Instant::now());
/// ```
pub struct BarManager<W: WindowSystem> {
    wm: W,
    engine: DockingEngine,
    /// Settings and the last saved document.  Bars and groups are captured
    /// from the engine on every save.
    config: Config,
    config_path: Option<PathBuf>,
    events: Option<mpsc::Sender<BarEvent>>,
    /// Next poll instant of every bar.
    schedule: HashMap<BarId, Instant>,
    should_quit: bool,
}

impl<W: WindowSystem> BarManager<W> {
    /// Create a manager for the bars and groups described by `config`.
    ///
    /// Every bar is due for its first poll immediately.  Nothing is saved
    /// until a config path is attached with
    /// [`with_config_path`](Self::with_config_path).
    pub fn new(wm: W, config: Config) -> Self {
        let engine = load_bars(&config);
        let now = Instant::now();
        let schedule = engine.bars().iter().map(|b| (b.id(), now)).collect();
        info!(
            "managing {} bar(s) in {} dock group(s)",
            engine.bars().len(),
            engine.groups().len()
        );

        Self {
            wm,
            engine,
            config,
            config_path: None,
            events: None,
            schedule,
            should_quit: false,
        }
    }

    /// Save the document to `path` after every mutating command.
    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    /// Attach a renderer event channel.
    ///
    /// A [`BarEvent::Created`] is sent straight away for every existing bar
    /// so the renderer can build its windows.  The receiver end can be owned
    /// by any listener: the GTK renderer, a debug logger, a test.
    pub fn set_events(&mut self, tx: mpsc::Sender<BarEvent>) {
        for bar in self.engine.bars() {
            let _ = tx.send(BarEvent::Created {
                bar: bar.name().to_string(),
                position: bar.position(),
                border_color: bar.border_color().to_string(),
            });
        }
        self.events = Some(tx);
    }

    pub fn engine(&self) -> &DockingEngine {
        &self.engine
    }

    pub fn window_system(&self) -> &W {
        &self.wm
    }

    /// Current rendering scale.
    pub fn scale(&self) -> f64 {
        self.config.scale
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.config.poll_interval_ms.max(1))
    }

    /// Whether a [`Command::Quit`] has been handled.
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Process a single [`Command`].
    ///
    /// A failing save is not an error: it is logged and reported as
    /// [`BarEvent::PersistenceFailed`] while the in-memory state stays as
    /// it is.
    pub fn handle(&mut self, cmd: Command) -> Result<(), ManagerError> {
        match cmd {
            //  Drag

            Command::DragMove { bar, to, solo } => {
                let id = self.bar_id(&bar)?;
                debug!("drag {} to {} (solo: {})", bar, to, solo);
                for moved in self.engine.drag_move(id, to, solo) {
                    self.emit_moved(moved);
                }
            }

            Command::DragRelease { bar } => {
                let id = self.bar_id(&bar)?;
                let area = self.work_area();
                match self.engine.drag_release(id, area) {
                    ReleaseOutcome::Snapped { .. } | ReleaseOutcome::Docked { .. } => {
                        self.emit_moved(id)
                    }
                    ReleaseOutcome::Detached(result) => info!("{} left its group ({:?})", bar, result),
                    ReleaseOutcome::Unchanged => {}
                }
                self.persist();
            }

            Command::Resize { bar, width, height } => {
                let id = self.bar_id(&bar)?;
                if let Some(b) = self.engine.bar_mut(id) {
                    b.set_size(Size::new(width, height));
                }
            }

            Command::Toggle { bar, path } => {
                let id = self.bar_id(&bar)?;
                if let Some(b) = self.engine.bar(id) {
                    let outcome = b
                        .toggle(&self.wm, &path)
                        .map_err(|e| ManagerError::WindowSystem(e.to_string()))?;
                    info!("toggle {} in {}: {:?}", path, bar, outcome);
                }
            }

            //  Lifecycle

            Command::NewBar { name } => {
                let name = self.validate_new_name(&name)?;
                let color = bar_color(self.engine.bars().len()).to_string();
                let id = self
                    .engine
                    .add_bar(name.clone(), Vec::new(), color.clone(), NEW_BAR_POSITION);
                self.schedule.insert(id, Instant::now());
                info!("created bar {}", name);
                self.emit(BarEvent::Created {
                    bar: name,
                    position: NEW_BAR_POSITION,
                    border_color: color,
                });
                self.persist();
            }

            Command::RenameBar { from, to } => {
                let id = self.bar_id(&from)?;
                if from == to.trim() {
                    return Ok(());
                }
                let to = self.validate_new_name(&to)?;
                if let Some(b) = self.engine.bar_mut(id) {
                    b.set_name(to.clone());
                }
                info!("renamed bar {} to {}", from, to);
                self.emit(BarEvent::Renamed { from, to });
                self.persist();
            }

            Command::DeleteBar { name } => {
                let id = self.bar_id(&name)?;
                self.schedule.remove(&id);
                self.engine.remove_bar(id);
                info!("deleted bar {}", name);
                self.emit(BarEvent::Removed { bar: name });
                self.persist();
            }

            Command::AddFile { bar, path } => {
                let id = self.bar_id(&bar)?;
                let index = self.engine.index_of(id).unwrap_or_default();
                let Some(b) = self.engine.bar_mut(id) else {
                    return Err(ManagerError::UnknownBar(bar));
                };
                if b.has_entry(&path) {
                    return Err(ManagerError::DuplicateEntry { bar, path });
                }
                let order = b.entries().len() as i64 + 1;
                b.entries_mut().push(FileEntry::new(path.clone(), order, ""));
                recolor_entries(b.entries_mut(), index);
                info!("{} now tracks {}", bar, path);

                self.emit_visible(id);
                // Look for the new file's window right away.
                self.schedule.insert(id, Instant::now());
                self.persist();
            }

            Command::SetScale(scale) => {
                let scale = clamp_scale(scale);
                info!("scale set to {:.2}", scale);
                self.config.scale = scale;
                self.emit(BarEvent::Restyled { scale });
                self.persist();
            }

            Command::OpenFile { path } => {
                info!("open {}", path);
                self.wm
                    .open_path(&path)
                    .map_err(|e| ManagerError::WindowSystem(e.to_string()))?;
            }

            Command::Poll => {
                debug!("poll requested");
                self.poll_all();
            }

            Command::Quit { close_windows } => {
                info!("quit (close windows: {})", close_windows);
                self.persist();
                if close_windows {
                    self.close_tracked_windows();
                }
                self.schedule.clear();
                self.should_quit = true;
                self.emit(BarEvent::Quit);
            }
        }
        Ok(())
    }

    //  Polling

    /// Earliest instant at which some bar is due for a poll.
    pub fn next_due(&self) -> Option<Instant> {
        self.schedule.values().min().copied()
    }

    /// Poll every bar whose turn has come.  Returns how many were polled.
    pub fn tick(&mut self, now: Instant) -> usize {
        let due: Vec<BarId> = self
            .schedule
            .iter()
            .filter(|(_, at)| **at <= now)
            .map(|(id, _)| *id)
            .collect();
        let next = now + self.poll_interval();
        for &id in &due {
            self.poll_bar(id);
            self.schedule.insert(id, next);
        }
        due.len()
    }

    /// Poll every bar now and restart their timers.
    pub fn poll_all(&mut self) {
        let next = Instant::now() + self.poll_interval();
        let ids: Vec<BarId> = self.engine.bars().iter().map(|b| b.id()).collect();
        for id in ids {
            self.poll_bar(id);
            self.schedule.insert(id, next);
        }
    }

    fn poll_bar(&mut self, id: BarId) {
        let Some(bar) = self.engine.bar_mut(id) else {
            self.schedule.remove(&id);
            return;
        };
        match bar.poll(&self.wm) {
            Ok(true) => {
                debug!("{}: {} open", bar.name(), bar.open_map().len());
                self.emit_visible(id);
            }
            Ok(false) => {}
            Err(e) => warn!("poll of {} failed, keeping previous windows: {}", bar.name(), e),
        }
    }

    //  Helpers

    fn bar_id(&self, name: &str) -> Result<BarId, ManagerError> {
        self.engine
            .find(name)
            .ok_or_else(|| ManagerError::UnknownBar(name.to_string()))
    }

    fn validate_new_name(&self, name: &str) -> Result<String, ManagerError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ManagerError::EmptyName);
        }
        if self.engine.find(name).is_some() {
            return Err(ManagerError::DuplicateName(name.to_string()));
        }
        Ok(name.to_string())
    }

    fn work_area(&self) -> WorkArea {
        self.wm.work_area().unwrap_or_else(|e| {
            warn!("work area unavailable ({}), using {:?}", e, WorkArea::default());
            WorkArea::default()
        })
    }

    /// Ask the window system to close every tracked window, each once.
    fn close_tracked_windows(&mut self) {
        let handles: BTreeSet<WindowHandle> = self
            .engine
            .bars()
            .iter()
            .flat_map(|b| b.open_map().values().cloned())
            .collect();
        for handle in handles {
            if let Err(e) = self.wm.close(&handle) {
                warn!("close {} failed: {}", handle, e);
            }
        }
    }

    /// Save the whole document.  Failures are reported, never returned.
    fn persist(&mut self) {
        let Some(path) = &self.config_path else {
            return;
        };
        self.config.capture(&self.engine);
        match self.config.save(path) {
            Ok(()) => debug!("saved {}", path.display()),
            Err(e) => {
                warn!("{}", e);
                self.emit(BarEvent::PersistenceFailed(e.to_string()));
            }
        }
    }

    fn emit(&self, event: BarEvent) {
        if let Some(tx) = &self.events {
            let _ = tx.send(event);
        }
    }

    fn emit_moved(&self, id: BarId) {
        if let Some(b) = self.engine.bar(id) {
            self.emit(BarEvent::Moved {
                bar: b.name().to_string(),
                position: b.position(),
            });
        }
    }

    fn emit_visible(&self, id: BarId) {
        if let Some(b) = self.engine.bar(id) {
            self.emit(BarEvent::VisibleEntriesChanged {
                bar: b.name().to_string(),
                entries: b.visible_entries().into_iter().cloned().collect(),
            });
        }
    }
}

//  Tests
