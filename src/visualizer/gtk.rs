//! GTK4 + layer-shell bar renderer that runs on the **main thread**.
//!
//! Every bar is its own layer-shell surface anchored to the top-left corner
//! of the output and placed with margins, so bar positions are plain
//! desktop coordinates.
//!
//! # Widget tree
//!
//! ```text
//! window                        (layer-shell, transparent)
//! └ .dockbar.dockbar-color-N    (bar box, border in the bar colour)
//!     ├ .grip                   (drag handle)
//!     └ .dockbar-btn.dockbar-color-M   (one per open file)
//! ```
//!
//! Dragging the grip moves the bar and its dock group; with Shift held the
//! bar moves alone so it can be pulled out of its group.  Clicking a button
//! minimizes or restores the file's window.

use crate::bar::FileEntry;
use crate::command::Command;
use crate::geometry::Point;
use crate::manager::BarManager;
use crate::traits::{BarEvent, WindowSystem};
use crate::visualizer::style::StyleSheet;
use gtk4::prelude::*;
use gtk4::{gdk, glib};
use gtk4_layer_shell::{Edge, LayerShell};
use log::{debug, error, info, warn};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::mpsc;
use std::time::{Duration, Instant};

/// Offsets below this many pixels are treated as a click, not a drag.
const DRAG_SLOP: f64 = 3.0;

//  Default CSS

const WINDOW_CSS: &str = r#"
window,
window.background {
    background-color: transparent;
    background: none;
}
"#;

//  One bar surface

struct BarWindow {
    window: gtk4::Window,
    container: gtk4::Box,
    buttons: gtk4::Box,
    /// Shared with the gesture and button closures, which outlive renames.
    name: Rc<RefCell<String>>,
    position: Rc<Cell<Point>>,
    border_class: String,
    /// Last size reported to the manager.
    reported: (i32, i32),
}

impl BarWindow {
    fn new(
        name: &str,
        position: Point,
        border_class: String,
        cmd_tx: &mpsc::Sender<Command>,
    ) -> Self {
        let window = gtk4::Window::new();
        window.init_layer_shell();
        window.set_layer(gtk4_layer_shell::Layer::Top);
        window.set_namespace("dockbar");
        window.set_keyboard_mode(gtk4_layer_shell::KeyboardMode::None);
        window.set_anchor(Edge::Left, true);
        window.set_anchor(Edge::Top, true);
        window.set_decorated(false);
        window.remove_css_class("background");

        let container = gtk4::Box::new(gtk4::Orientation::Horizontal, 0);
        container.add_css_class("dockbar");
        container.add_css_class(&border_class);

        let grip = gtk4::Label::new(Some("⠿"));
        grip.add_css_class("grip");
        container.append(&grip);

        let buttons = gtk4::Box::new(gtk4::Orientation::Horizontal, 0);
        container.append(&buttons);
        window.set_child(Some(&container));

        let bar = Self {
            window,
            container,
            buttons,
            name: Rc::new(RefCell::new(name.to_string())),
            position: Rc::new(Cell::new(position)),
            border_class,
            reported: (0, 0),
        };
        bar.attach_drag(&grip, cmd_tx.clone());
        bar.place(position);
        bar
    }

    /// Turn grip drags into `DragMove` / `DragRelease` commands.
    fn attach_drag(&self, grip: &gtk4::Label, cmd_tx: mpsc::Sender<Command>) {
        let drag = gtk4::GestureDrag::new();
        let dragging = Rc::new(Cell::new(false));

        {
            let name = self.name.clone();
            let position = self.position.clone();
            let dragging = dragging.clone();
            let cmd_tx = cmd_tx.clone();
            drag.connect_drag_update(move |gesture, dx, dy| {
                if !dragging.get() && dx.hypot(dy) < DRAG_SLOP {
                    return;
                }
                dragging.set(true);
                // The surface follows the pointer, so the offset is relative
                // to where the bar sits now.
                let to = position.get() + Point::new(dx.round() as i32, dy.round() as i32);
                let solo = gesture
                    .current_event_state()
                    .contains(gdk::ModifierType::SHIFT_MASK);
                let _ = cmd_tx.send(Command::DragMove {
                    bar: name.borrow().clone(),
                    to,
                    solo,
                });
            });
        }

        {
            let name = self.name.clone();
            drag.connect_drag_end(move |_, _, _| {
                if dragging.replace(false) {
                    let _ = cmd_tx.send(Command::DragRelease {
                        bar: name.borrow().clone(),
                    });
                }
            });
        }

        grip.add_controller(drag);
    }

    fn place(&self, position: Point) {
        self.position.set(position);
        self.window.set_margin(Edge::Left, position.x);
        self.window.set_margin(Edge::Top, position.y);
    }

    /// Rebuild the buttons for `entries`; an empty list hides the bar.
    fn set_entries(
        &mut self,
        entries: Vec<FileEntry>,
        styles: &mut StyleSheet,
        cmd_tx: &mpsc::Sender<Command>,
    ) -> bool {
        while let Some(child) = self.buttons.first_child() {
            self.buttons.remove(&child);
        }

        let mut new_classes = false;
        for entry in &entries {
            let (class, fresh) = styles.color_class(&entry.color);
            new_classes |= fresh;

            let button = gtk4::Button::with_label(entry.label());
            button.add_css_class("dockbar-btn");
            button.add_css_class(&class);
            button.set_tooltip_text(Some(&entry.path));

            let name = self.name.clone();
            let path = entry.path.clone();
            let cmd_tx = cmd_tx.clone();
            button.connect_clicked(move |_| {
                let _ = cmd_tx.send(Command::Toggle {
                    bar: name.borrow().clone(),
                    path: path.clone(),
                });
            });
            self.buttons.append(&button);
        }

        self.window.set_visible(!entries.is_empty());
        new_classes
    }

    /// The laid-out size, if it changed since the last call.
    fn size_change(&mut self) -> Option<(i32, i32)> {
        if !self.window.is_visible() {
            return None;
        }
        let size = (self.container.width(), self.container.height());
        if size == self.reported || size.0 == 0 {
            return None;
        }
        self.reported = size;
        Some(size)
    }
}

//  Public API

/// Run the GTK4 main loop on the **current** (main) thread.
///
/// Commands arrive on `cmd_rx` (from the socket listener and from the bars'
/// own gestures, which send through `cmd_tx`).  The loop drains them,
/// polls due bars, and applies the manager's events to the bar windows
/// about 60 times a second, until a [`Command::Quit`] is handled.
pub fn run_main_loop<W: WindowSystem + 'static>(
    mut manager: BarManager<W>,
    cmd_tx: mpsc::Sender<Command>,
    cmd_rx: mpsc::Receiver<Command>,
    css_path: Option<PathBuf>,
) -> Result<(), glib::BoolError> {
    gtk4::init()?;
    info!("GTK4 initialised on main thread");

    load_css(&css_path);
    let provider = gtk4::CssProvider::new();
    register_provider(&provider, gtk4::STYLE_PROVIDER_PRIORITY_APPLICATION);
    let mut styles = StyleSheet::new(manager.scale());
    let mut bars: HashMap<String, BarWindow> = HashMap::new();

    let (bar_tx, bar_rx) = mpsc::channel::<BarEvent>();
    manager.set_events(bar_tx);

    let main_loop = glib::MainLoop::new(None, false);
    let quit_loop = main_loop.clone();

    //  Main event loop (~60 fps)
    glib::timeout_add_local(Duration::from_millis(16), move || {
        // 1. Drain commands.
        while let Ok(cmd) = cmd_rx.try_recv() {
            debug!("command: {:?}", cmd);
            if let Err(e) = manager.handle(cmd) {
                error!("command error: {}", e);
            }
        }

        // 2. Poll due bars.
        manager.tick(Instant::now());

        // 3. Apply bar events.
        let mut restyle = false;
        while let Ok(event) = bar_rx.try_recv() {
            match event {
                BarEvent::Created { bar, position, border_color } => {
                    let (class, fresh) = styles.color_class(&border_color);
                    restyle |= fresh;
                    let window = BarWindow::new(&bar, position, class, &cmd_tx);
                    bars.insert(bar, window);
                }
                BarEvent::VisibleEntriesChanged { bar, entries } => {
                    if let Some(window) = bars.get_mut(&bar) {
                        restyle |= window.set_entries(entries, &mut styles, &cmd_tx);
                    }
                }
                BarEvent::Moved { bar, position } => {
                    if let Some(window) = bars.get(&bar) {
                        window.place(position);
                    }
                }
                BarEvent::Renamed { from, to } => {
                    if let Some(window) = bars.remove(&from) {
                        *window.name.borrow_mut() = to.clone();
                        bars.insert(to, window);
                    }
                }
                BarEvent::Removed { bar } => {
                    if let Some(window) = bars.remove(&bar) {
                        window.window.destroy();
                    }
                }
                BarEvent::Restyled { scale } => {
                    restyle |= styles.set_scale(scale);
                }
                BarEvent::PersistenceFailed(reason) => {
                    warn!("configuration not saved: {}", reason);
                }
                BarEvent::Quit => {
                    info!("quit requested");
                    quit_loop.quit();
                    return glib::ControlFlow::Break;
                }
            }
        }

        if restyle {
            #[allow(deprecated)]
            provider.load_from_data(&styles.render());
            debug!("stylesheet reloaded (scale {:.2})", styles.scale());
        }

        // 4. Report laid-out sizes for docking.
        for (name, window) in bars.iter_mut() {
            if let Some((width, height)) = window.size_change() {
                debug!("{} laid out at {}x{} ({})", name, width, height, window.border_class);
                if let Err(e) = manager.handle(Command::Resize {
                    bar: name.clone(),
                    width,
                    height,
                }) {
                    error!("resize error: {}", e);
                }
            }
        }

        glib::ControlFlow::Continue
    });

    info!("entering GLib main loop");
    main_loop.run();
    info!("GLib main loop exited");
    Ok(())
}

//  CSS loading

/// Load the window CSS plus the user stylesheet, if there is one.
fn load_css(css_path: &Option<PathBuf>) {
    let provider = gtk4::CssProvider::new();

    let mut css_content = WINDOW_CSS.to_string();
    match css_path.as_ref().filter(|p| p.exists()) {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(content) => {
                info!("user CSS: {} ({} bytes)", p.display(), content.len());
                css_content.push_str(&content);
            }
            Err(e) => warn!("CSS read failed ({}): {}", p.display(), e),
        },
        None => info!("no user CSS, using built-in styles"),
    }

    #[allow(deprecated)]
    provider.load_from_data(&css_content);
    // Above the generated sheet so user rules win.
    register_provider(&provider, gtk4::STYLE_PROVIDER_PRIORITY_USER);
}

fn register_provider(provider: &gtk4::CssProvider, priority: u32) {
    if let Some(display) = gdk::Display::default() {
        gtk4::style_context_add_provider_for_display(&display, provider, priority);
    } else {
        warn!("no GDK display, CSS will not be applied");
    }
}
