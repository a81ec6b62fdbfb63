//! [`WindowSystem`] implementation backed by Hyprland IPC.
//!
//! Communicates directly with Hyprland through its Unix socket at
//! `$XDG_RUNTIME_DIR/hypr/$HYPRLAND_INSTANCE_SIGNATURE/.socket.sock`,
//! avoiding any shell command invocation or third-party crate for socket
//! discovery.
//!
//! Hyprland has no minimized state of its own, so "minimize" parks the
//! window on the hidden special workspace [`MINIMIZED_WORKSPACE`] and
//! "restore" brings it back to the active workspace.

use crate::command::{Placement, WindowAction, WindowHandle, WindowInfo};
use crate::geometry::WorkArea;
use crate::traits::WindowSystem;
use log::debug;
use serde::Deserialize;
use std::io::{Read, Write};
use std::os::unix::net::UnixStream;
use std::path::PathBuf;

/// Special workspace that plays the role of the taskbar for minimized
/// windows.
pub const MINIMIZED_WORKSPACE: &str = "special:dockbar";

/// Hyprland-backed window system.
///
/// All communication happens over Hyprland's IPC socket.  The only child
/// process is the one Hyprland itself spawns for
/// [`open_path`](WindowSystem::open_path).
#[derive(Debug, Default)]
pub struct HyprlandWindows;

/// Errors that can occur when talking to Hyprland.
#[derive(Debug, thiserror::Error)]
#[error("hyprland IPC error: {0}")]
pub struct HyprlandError(String);

impl HyprlandWindows {
    /// Create a new handle.
    ///
    /// No connection is opened eagerly; each method call opens a short-lived
    /// IPC request.
    pub fn new() -> Self {
        Self
    }

    /// Whether this process runs inside a Hyprland session.
    pub fn is_available() -> bool {
        std::env::var_os("HYPRLAND_INSTANCE_SIGNATURE").is_some()
    }

    fn clients(&self) -> Result<Vec<ClientJson>, HyprlandError> {
        parse_clients(&ipc_json("clients")?)
    }

    /// The live client behind `handle`, or `None` if it has closed.
    fn client(&self, handle: &WindowHandle) -> Result<Option<ClientJson>, HyprlandError> {
        Ok(self.clients()?.into_iter().find(|c| c.address == handle.0))
    }
}

//  Direct Hyprland IPC helpers

/// Resolve the Hyprland command socket path.
///
/// Hyprland ≥ 0.40 stores its sockets at
/// `$XDG_RUNTIME_DIR/hypr/$HYPRLAND_INSTANCE_SIGNATURE/.socket.sock`.
fn socket_path() -> Result<PathBuf, HyprlandError> {
    let runtime_dir = std::env::var("XDG_RUNTIME_DIR")
        .map_err(|_| HyprlandError("XDG_RUNTIME_DIR not set".into()))?;
    let his = std::env::var("HYPRLAND_INSTANCE_SIGNATURE")
        .map_err(|_| HyprlandError("HYPRLAND_INSTANCE_SIGNATURE not set".into()))?;
    Ok(PathBuf::from(format!("{}/hypr/{}/.socket.sock", runtime_dir, his)))
}

/// Send a raw command to the Hyprland command socket and return the
/// response as a string.
fn ipc_request(command: &str) -> Result<String, HyprlandError> {
    let path = socket_path()?;
    let mut stream = UnixStream::connect(&path)
        .map_err(|e| HyprlandError(format!("connect to {}: {}", path.display(), e)))?;

    stream
        .write_all(command.as_bytes())
        .map_err(|e| HyprlandError(format!("write: {}", e)))?;

    let mut response = Vec::new();
    stream
        .read_to_end(&mut response)
        .map_err(|e| HyprlandError(format!("read: {}", e)))?;

    String::from_utf8(response).map_err(|e| HyprlandError(format!("utf-8: {}", e)))
}

/// Send a JSON data query (`j/<command>`) and return the raw JSON string.
fn ipc_json(data_command: &str) -> Result<String, HyprlandError> {
    ipc_request(&format!("j/{}", data_command))
}

/// Send a dispatch command and check for `"ok"`.
fn ipc_dispatch(args: &str) -> Result<(), HyprlandError> {
    debug!("dispatch {}", args);
    let response = ipc_request(&format!("/dispatch {}", args))?;
    if response.trim() == "ok" {
        Ok(())
    } else {
        Err(HyprlandError(format!("dispatch error: {}", response)))
    }
}

/// Quote `s` for the `/bin/sh -c` that Hyprland's `exec` runs.
fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

//  Minimal serde structs for the JSON we care about

/// Subset of the JSON object returned by `j/clients`.
#[derive(Debug, Clone, Deserialize)]
struct ClientJson {
    address: String,
    #[serde(default)]
    mapped: bool,
    #[serde(default)]
    title: String,
    workspace: WorkspaceRefJson,
    /// `bool` on older Hyprland releases, a fullscreen mode number on newer
    /// ones.
    #[serde(default)]
    fullscreen: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
struct WorkspaceRefJson {
    id: i64,
    name: String,
}

/// Subset of the JSON object returned by `j/monitors`.
#[derive(Deserialize)]
struct MonitorJson {
    x: i32,
    y: i32,
    width: u32,
    height: u32,
    #[serde(default = "unit_scale")]
    scale: f64,
    /// Space taken by layer-shell panels: left, top, right, bottom.
    #[serde(default)]
    reserved: [i32; 4],
}

fn unit_scale() -> f64 {
    1.0
}

fn parse_clients(json: &str) -> Result<Vec<ClientJson>, HyprlandError> {
    serde_json::from_str(json).map_err(|e| HyprlandError(format!("parse clients: {}", e)))
}

/// Mapped, titled clients as [`WindowInfo`]s, in Hyprland's order.
fn visible_windows(clients: &[ClientJson]) -> Vec<WindowInfo> {
    clients
        .iter()
        .filter(|c| c.mapped && !c.title.is_empty())
        .map(|c| WindowInfo::new(c.address.clone(), c.title.clone()))
        .collect()
}

fn placement_of(client: &ClientJson) -> Placement {
    let fullscreen = match &client.fullscreen {
        serde_json::Value::Bool(b) => *b,
        serde_json::Value::Number(n) => n.as_i64().unwrap_or(0) > 0,
        _ => false,
    };
    if client.workspace.name == MINIMIZED_WORKSPACE {
        Placement::Minimized
    } else if fullscreen {
        Placement::Maximized
    } else {
        Placement::Normal
    }
}

/// Work area of the first monitor: its logical bounds minus reserved space.
fn work_area_from_monitors(json: &str) -> Result<WorkArea, HyprlandError> {
    let monitors: Vec<MonitorJson> =
        serde_json::from_str(json).map_err(|e| HyprlandError(format!("parse monitors: {}", e)))?;
    let m = monitors
        .first()
        .ok_or_else(|| HyprlandError("no monitors".into()))?;
    let scale = if m.scale > 0.0 { m.scale } else { 1.0 };
    let width = (f64::from(m.width) / scale).round() as i32;
    let height = (f64::from(m.height) / scale).round() as i32;
    let [left, top, right, bottom] = m.reserved;
    Ok(WorkArea::new(
        m.x + left,
        m.y + top,
        m.x + width - right,
        m.y + height - bottom,
    ))
}

//  WindowSystem implementation

impl WindowSystem for HyprlandWindows {
    type Error = HyprlandError;

    fn windows(&self) -> Result<Vec<WindowInfo>, Self::Error> {
        Ok(visible_windows(&self.clients()?))
    }

    fn placement(&self, handle: &WindowHandle) -> Result<Placement, Self::Error> {
        Ok(self
            .client(handle)?
            .map(|c| placement_of(&c))
            .unwrap_or(Placement::Normal))
    }

    fn set_state(&self, handle: &WindowHandle, action: WindowAction) -> Result<(), Self::Error> {
        if self.client(handle)?.is_none() {
            debug!("{} {}: window is gone", action, handle);
            return Ok(());
        }
        match action {
            WindowAction::Minimize => ipc_dispatch(&format!(
                "movetoworkspacesilent {},address:{}",
                MINIMIZED_WORKSPACE, handle
            )),
            WindowAction::Restore => {
                let json = ipc_json("activeworkspace")?;
                let active: WorkspaceRefJson = serde_json::from_str(&json)
                    .map_err(|e| HyprlandError(format!("parse activeworkspace: {}", e)))?;
                ipc_dispatch(&format!(
                    "movetoworkspacesilent {},address:{}",
                    active.id, handle
                ))
            }
        }
    }

    fn bring_to_foreground(&self, handle: &WindowHandle) -> Result<(), Self::Error> {
        if self.client(handle)?.is_none() {
            return Ok(());
        }
        ipc_dispatch(&format!("focuswindow address:{}", handle))
    }

    fn close(&self, handle: &WindowHandle) -> Result<(), Self::Error> {
        if self.client(handle)?.is_none() {
            return Ok(());
        }
        ipc_dispatch(&format!("closewindow address:{}", handle))
    }

    fn open_path(&self, path: &str) -> Result<(), Self::Error> {
        ipc_dispatch(&format!("exec xdg-open {}", shell_quote(path)))
    }

    fn work_area(&self) -> Result<WorkArea, Self::Error> {
        work_area_from_monitors(&ipc_json("monitors")?)
    }
}
