//! The persisted configuration document.
//!
//! The document lives at `$XDG_CONFIG_HOME/dockbar/config.json` and is
//! rewritten in full after every mutating action (new/rename/delete bar,
//! new file, drag release, rescale).  Live window bindings are never
//! stored.
//!
//! # Example
//!
//! ```json
//! {
//!   "bars": [
//!     {
//!       "name": "work",
//!       "entries": [
//!         { "path": "/home/u/notes.txt", "order": 1, "color": "hsl(0, 75%, 45%)" }
//!       ],
//!       "borderColor": "hsl(0, 70%, 45%)",
//!       "position": { "x": 100, "y": 100 }
//!     }
//!   ],
//!   "groups": [["work", "home"]],
//!   "scale": 1.4,
//!   "pollIntervalMs": 2000
//! }
//! ```

use crate::bar::{BarId, FileEntry};
use crate::color::{bar_color, palette};
use crate::docking::DockingEngine;
use crate::geometry::Point;
use crate::groups::DockGroups;
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Rendering scale used when none is configured.
pub const DEFAULT_SCALE: f64 = 1.4;
/// Allowed rendering scale range.
pub const MIN_SCALE: f64 = 1.0;
pub const MAX_SCALE: f64 = 2.5;
/// Poll period of every bar when none is configured (ms).
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2000;
/// Where new bars appear.
pub const NEW_BAR_POSITION: Point = Point::new(100, 100);

fn default_position() -> Point {
    NEW_BAR_POSITION
}

/// Top-level document.
///
/// Every field is optional: a minimal `{}` file is valid and all fields
/// fall back to their defaults.  Unknown keys are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Bars in display/creation order.
    pub bars: Vec<BarConfig>,
    /// Dock groups as lists of bar names.
    pub groups: Vec<Vec<String>>,
    /// Rendering scale, `1.0..=2.5`.
    pub scale: f64,
    /// Poll period of each bar (ms).
    pub poll_interval_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bars: Vec::new(),
            groups: Vec::new(),
            scale: DEFAULT_SCALE,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

/// One persisted bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BarConfig {
    pub name: String,
    #[serde(default)]
    pub entries: Vec<FileEntry>,
    #[serde(default)]
    pub border_color: String,
    #[serde(default = "default_position")]
    pub position: Point,
}

impl Config {
    /// Load configuration from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError(format!("failed to read {}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| ConfigError(format!("failed to parse {}: {}", path.display(), e)))?;
        Ok(config)
    }

    /// Like [`load`](Self::load), but a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Write the whole document to `path`.
    ///
    /// The JSON goes to a sibling temporary file first and is then renamed
    /// over the target, so a crash mid-write leaves the old document intact.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .map_err(|e| ConfigError(format!("failed to create {}: {}", dir.display(), e)))?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError(format!("failed to serialize config: {}", e)))?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json)
            .map_err(|e| ConfigError(format!("failed to write {}: {}", tmp.display(), e)))?;
        std::fs::rename(&tmp, path)
            .map_err(|e| ConfigError(format!("failed to replace {}: {}", path.display(), e)))?;
        Ok(())
    }

    /// Drop repeated entry paths, fill in missing border colours, spread
    /// entry colours, and bring `scale` / `poll_interval_ms` into range.  Returns whether anything
    /// changed (so the caller can save the document back).
    pub fn normalize(&mut self) -> bool {
        let mut changed = false;
        for (i, bar) in self.bars.iter_mut().enumerate() {
            if bar.border_color.is_empty() {
                bar.border_color = bar_color(i).to_string();
                changed = true;
            }
            changed |= dedup_entries(&bar.name, &mut bar.entries);
            changed |= recolor_entries(&mut bar.entries, i);
        }

        let scale = clamp_scale(self.scale);
        if scale != self.scale {
            self.scale = scale;
            changed = true;
        }
        if self.poll_interval_ms == 0 {
            self.poll_interval_ms = DEFAULT_POLL_INTERVAL_MS;
            changed = true;
        }
        changed
    }

    /// Replace the bars and groups with the current state of `engine`,
    /// keeping the other settings.
    pub fn capture(&mut self, engine: &DockingEngine) {
        let (bars, groups) = serialize_bars(engine);
        self.bars = bars;
        self.groups = groups;
    }
}

/// Clamp a rendering scale into `[MIN_SCALE, MAX_SCALE]`; NaN becomes the
/// default.
pub fn clamp_scale(scale: f64) -> f64 {
    if scale.is_nan() {
        DEFAULT_SCALE
    } else {
        scale.clamp(MIN_SCALE, MAX_SCALE)
    }
}

/// Keep the first entry for each path in `bar`.  Returns whether any
/// entry was dropped.
pub fn dedup_entries(bar: &str, entries: &mut Vec<FileEntry>) -> bool {
    let before = entries.len();
    let mut seen = HashSet::new();
    entries.retain(|e| {
        let first = seen.insert(e.path.clone());
        if !first {
            warn!("bar {:?} lists {:?} twice, dropping the repeat", bar, e.path);
        }
        first
    });
    entries.len() != before
}

/// Give the entries of the bar at `bar_index` maximally separated colours.
/// Returns whether any colour changed.
pub fn recolor_entries(entries: &mut [FileEntry], bar_index: usize) -> bool {
    let colors = palette(entries.len(), bar_index);
    let mut changed = false;
    for (entry, color) in entries.iter_mut().zip(colors) {
        let color = color.to_string();
        if entry.color != color {
            entry.color = color;
            changed = true;
        }
    }
    changed
}

/// Build the live bars and dock groups described by `config`.
///
/// Bars with a duplicate name are skipped, repeated paths within a bar are
/// dropped, and group members that do not name a loaded bar are dropped.
/// All of these are logged and never fatal.
pub fn load_bars(config: &Config) -> DockingEngine {
    let mut engine = DockingEngine::new();
    let mut seen = HashSet::new();
    for bar in &config.bars {
        if !seen.insert(bar.name.as_str()) {
            warn!("skipping duplicate bar {:?}", bar.name);
            continue;
        }
        let mut entries = bar.entries.clone();
        dedup_entries(&bar.name, &mut entries);
        engine.add_bar(&bar.name, entries, &bar.border_color, bar.position);
    }

    let lists = config.groups.iter().map(|names| {
        names
            .iter()
            .filter_map(|name| {
                let id = engine.find(name);
                if id.is_none() {
                    warn!("dock group names unknown bar {:?}, dropping it", name);
                }
                id
            })
            .collect::<Vec<BarId>>()
    });
    let groups = DockGroups::from_lists(lists.collect::<Vec<_>>());
    engine.set_groups(groups);
    engine
}

/// Persisted form of every bar and dock group in `engine`.
pub fn serialize_bars(engine: &DockingEngine) -> (Vec<BarConfig>, Vec<Vec<String>>) {
    let bars: Vec<BarConfig> = engine
        .bars()
        .iter()
        .map(|b| BarConfig {
            name: b.name().to_string(),
            entries: b.entries().to_vec(),
            border_color: b.border_color().to_string(),
            position: b.position(),
        })
        .collect();
    let groups: Vec<Vec<String>> = engine
        .groups()
        .lists()
        .into_iter()
        .map(|ids| {
            ids.into_iter()
                .filter_map(|id| engine.bar(id).map(|b| b.name().to_string()))
                .collect()
        })
        .collect();
    (bars, groups)
}

/// Error from loading, parsing, or saving the configuration file.
#[derive(Debug, thiserror::Error)]
#[error("config error: {0}")]
pub struct ConfigError(String);
