//! **dockbar**: always-on-top launcher bars that track open files and dock
//! together.
//!
//! Each bar lists files.  Every poll it looks for live windows whose titles
//! match those files and shows one button per open file; clicking a button
//! minimizes or restores that window.  Bars can be dragged, snapped into the
//! bottom corners of the work area, and docked edge to edge into groups
//! that move as one.
//!
//! # Architecture
//!
//! The crate is organised around two core traits:
//!
//! * [`traits::WindowSystem`] abstracts window enumeration and window
//!   control, so matching and docking are not coupled to any specific
//!   compositor.
//! * [`traits::CommandSource`] abstracts the transport that delivers
//!   user intent (a Unix socket, the renderer's own gestures), so the main
//!   loop is not coupled to any specific IPC mechanism.
//!
//! The pure core is [`matcher`], [`registry`], [`bar`], [`groups`] and
//! [`docking`]; [`manager`] drives it from commands and timers.  Concrete
//! implementations live in [`hyprland`] (Hyprland IPC), [`ipc`]
//! (Unix-socket command listener) and [`visualizer`] (GTK4 renderer).

pub mod bar;
pub mod color;
pub mod command;
pub mod config;
pub mod docking;
pub mod geometry;
pub mod groups;
pub mod hyprland;
pub mod ipc;
pub mod manager;
pub mod matcher;
pub mod registry;
pub mod traits;
pub mod visualizer;

#[cfg(test)]
mod testing;
