//! Renderers for the launcher bars.
//!
//! When the `visualizer-gtk` feature is enabled, the
//! [`gtk::run_main_loop`] function takes over the main thread and
//! drives command processing, polling, and bar rendering through the GLib
//! main loop.  [`style`] builds the stylesheet and needs no GTK.

#[cfg(feature = "visualizer-gtk")]
pub mod gtk;
pub mod style;
