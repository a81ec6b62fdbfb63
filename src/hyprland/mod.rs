//! Hyprland-specific implementations.
//!
//! This module provides a concrete backend for the
//! [`WindowSystem`](crate::traits::WindowSystem) trait, powered by
//! Hyprland's IPC socket.
//!
//! Nothing outside this module should reference Hyprland directly.

pub mod wm;
