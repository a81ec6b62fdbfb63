//! Recording [`WindowSystem`] double shared by the unit tests.

use crate::command::{Placement, WindowAction, WindowHandle, WindowInfo};
use crate::geometry::WorkArea;
use crate::traits::WindowSystem;
use std::cell::RefCell;
use std::collections::HashMap;

#[derive(Debug, thiserror::Error)]
#[error("recorder error")]
pub struct RecorderErr;

/// A window system that serves a scripted window list and records every
/// call made to it.
///
/// Handles missing from `windows` behave like closed windows: their
/// placement reads as normal and actions on them are silently dropped.
#[derive(Debug, Default)]
pub struct RecorderWindows {
    pub windows: RefCell<Vec<WindowInfo>>,
    pub placements: RefCell<HashMap<WindowHandle, Placement>>,
    pub actions: RefCell<Vec<(WindowHandle, WindowAction)>>,
    pub foregrounded: RefCell<Vec<WindowHandle>>,
    pub closed: RefCell<Vec<WindowHandle>>,
    pub opened: RefCell<Vec<String>>,
    pub fail_enumeration: RefCell<bool>,
    pub area: RefCell<Option<WorkArea>>,
}

impl RecorderWindows {
    pub fn with_windows(windows: Vec<WindowInfo>) -> Self {
        Self {
            windows: RefCell::new(windows),
            ..Self::default()
        }
    }

    fn is_live(&self, handle: &WindowHandle) -> bool {
        self.windows.borrow().iter().any(|w| &w.handle == handle)
    }

    pub fn set_placement(&self, handle: &str, placement: Placement) {
        self.placements
            .borrow_mut()
            .insert(WindowHandle(handle.into()), placement);
    }
}

impl WindowSystem for RecorderWindows {
    type Error = RecorderErr;

    fn windows(&self) -> Result<Vec<WindowInfo>, RecorderErr> {
        if *self.fail_enumeration.borrow() {
            return Err(RecorderErr);
        }
        Ok(self.windows.borrow().clone())
    }

    fn placement(&self, handle: &WindowHandle) -> Result<Placement, RecorderErr> {
        if !self.is_live(handle) {
            return Ok(Placement::Normal);
        }
        Ok(self
            .placements
            .borrow()
            .get(handle)
            .copied()
            .unwrap_or(Placement::Normal))
    }

    fn set_state(&self, handle: &WindowHandle, action: WindowAction) -> Result<(), RecorderErr> {
        if !self.is_live(handle) {
            return Ok(());
        }
        self.actions.borrow_mut().push((handle.clone(), action));
        let placement = match action {
            WindowAction::Minimize => Placement::Minimized,
            WindowAction::Restore => Placement::Normal,
        };
        self.placements.borrow_mut().insert(handle.clone(), placement);
        Ok(())
    }

    fn bring_to_foreground(&self, handle: &WindowHandle) -> Result<(), RecorderErr> {
        if self.is_live(handle) {
            self.foregrounded.borrow_mut().push(handle.clone());
        }
        Ok(())
    }

    fn close(&self, handle: &WindowHandle) -> Result<(), RecorderErr> {
        self.closed.borrow_mut().push(handle.clone());
        Ok(())
    }

    fn open_path(&self, path: &str) -> Result<(), RecorderErr> {
        self.opened.borrow_mut().push(path.to_string());
        Ok(())
    }

    fn work_area(&self) -> Result<WorkArea, RecorderErr> {
        Ok(self.area.borrow().unwrap_or_default())
    }
}
