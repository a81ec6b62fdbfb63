//! Drag handling: group movement, edge snapping, docking, and detaching.
//!
//! The [`DockingEngine`] owns every [`Bar`] together with the
//! [`DockGroups`] partition.  It reacts to two events:
//!
//! * **drag-move**: the held bar goes to a new position; unless the drag is
//!   *solo*, every bar docked with it is translated by the same delta so the
//!   group moves as a rigid body.
//! * **drag-release**: evaluated once, first match wins:
//!   1. *edge snap*: near the bottom of the work area **and** near its left
//!      or right edge → jump into that bottom corner;
//!   2. *dock*: flush against a neighbouring visible bar and join its group.
//!      Visible bars outside the released bar's own group are tried first,
//!      in bar order, and its group mates last.  A mate lying flush beside
//!      it would otherwise always win and the group could never grow;
//!   3. *detach*: too far from any member of its own group → leave it.
//!
//! All of this is plain integer geometry and cannot fail.  Persisting the
//! result is the caller's job.

use crate::bar::{Bar, BarId, FileEntry};
use crate::geometry::{Point, Rect, WorkArea};
use crate::groups::{DetachResult, DockGroups, JoinResult};
use log::{debug, info};

/// Distance from the work-area edges that triggers a corner snap.
pub const SNAP_THRESHOLD: i32 = 30;
/// Gap between two bars (and, vertically, their left-edge misalignment)
/// under which they dock.
pub const DOCK_THRESHOLD: i32 = 20;
/// Extra distance beyond a group member's size at which a bar detaches.
pub const UNDOCK_THRESHOLD: i32 = 50;

/// Work-area corner a bar can snap into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    BottomLeft,
    BottomRight,
}

/// Where the dragged bar ends up relative to the bar it docked to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    LeftOf,
    RightOf,
    Above,
    Below,
}

/// What a drag-release did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseOutcome {
    Snapped { corner: Corner, position: Point },
    Docked { neighbor: BarId, side: Side, position: Point, join: JoinResult },
    Detached(DetachResult),
    /// Nothing beyond the free drag.
    Unchanged,
}

impl ReleaseOutcome {
    /// Whether the dock partition changed.
    pub fn changes_groups(&self) -> bool {
        match self {
            ReleaseOutcome::Docked { join, .. } => !matches!(join, JoinResult::Unchanged(_)),
            ReleaseOutcome::Detached(_) => true,
            _ => false,
        }
    }
}

/// Target corner for a bar released at `rect`, if any.
pub fn edge_snap(rect: Rect, area: WorkArea) -> Option<(Corner, Point)> {
    if rect.bottom() <= area.bottom.saturating_sub(SNAP_THRESHOLD) {
        return None;
    }
    let y = area.bottom.saturating_sub(rect.size.height);
    if rect.left() < area.left.saturating_add(SNAP_THRESHOLD) {
        Some((Corner::BottomLeft, Point::new(area.left, y)))
    } else if rect.right() > area.right.saturating_sub(SNAP_THRESHOLD) {
        Some((Corner::BottomRight, Point::new(area.right.saturating_sub(rect.size.width), y)))
    } else {
        None
    }
}

/// Flush position for a bar released at `rect` next to `other`, testing
/// left-of, right-of, above, and below in that order.
///
/// The vertical sides additionally require the left edges to line up
/// within [`DOCK_THRESHOLD`].
pub fn dock_target(rect: Rect, other: Rect) -> Option<(Side, Point)> {
    let near = |a: i32, b: i32| a.abs_diff(b) < DOCK_THRESHOLD.unsigned_abs();
    let (w, h) = (rect.size.width, rect.size.height);

    if near(rect.right(), other.left()) {
        Some((Side::LeftOf, Point::new(other.left().saturating_sub(w), other.top())))
    } else if near(rect.left(), other.right()) {
        Some((Side::RightOf, Point::new(other.right(), other.top())))
    } else if near(rect.bottom(), other.top()) && near(rect.left(), other.left()) {
        Some((Side::Above, Point::new(other.left(), other.top().saturating_sub(h))))
    } else if near(rect.top(), other.bottom()) && near(rect.left(), other.left()) {
        Some((Side::Below, Point::new(other.left(), other.bottom())))
    } else {
        None
    }
}

/// Whether a bar at `rect` has strayed too far from the group member at
/// `member`.  Each axis is checked on its own against the member's size.
pub fn strayed_from(rect: Rect, member: Rect) -> bool {
    let dx = i64::from(rect.left().abs_diff(member.left()));
    let dy = i64::from(rect.top().abs_diff(member.top()));
    dx > i64::from(UNDOCK_THRESHOLD) + i64::from(member.size.width)
        || dy > i64::from(UNDOCK_THRESHOLD) + i64::from(member.size.height)
}

/// Owner of all bars and of the dock partition.
#[derive(Debug, Clone, Default)]
pub struct DockingEngine {
    /// Bars in configuration order.
    bars: Vec<Bar>,
    groups: DockGroups,
    /// Counter used to allocate the next bar id.
    next_bar_id: u32,
}

impl DockingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    //  Bars

    /// Create a bar and return its id.
    pub fn add_bar(
        &mut self,
        name: impl Into<String>,
        entries: Vec<FileEntry>,
        border_color: impl Into<String>,
        position: Point,
    ) -> BarId {
        let id = BarId(self.next_bar_id);
        self.next_bar_id += 1;
        self.bars.push(Bar::new(id, name, entries, border_color, position));
        id
    }

    /// Remove a bar, detaching it from its group first.
    pub fn remove_bar(&mut self, id: BarId) -> Option<Bar> {
        let index = self.index_of(id)?;
        self.groups.detach(id);
        Some(self.bars.remove(index))
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn bars_mut(&mut self) -> impl Iterator<Item = &mut Bar> {
        self.bars.iter_mut()
    }

    pub fn bar(&self, id: BarId) -> Option<&Bar> {
        self.bars.iter().find(|b| b.id() == id)
    }

    pub fn bar_mut(&mut self, id: BarId) -> Option<&mut Bar> {
        self.bars.iter_mut().find(|b| b.id() == id)
    }

    /// Position of the bar in configuration order.
    pub fn index_of(&self, id: BarId) -> Option<usize> {
        self.bars.iter().position(|b| b.id() == id)
    }

    pub fn find(&self, name: &str) -> Option<BarId> {
        self.bars.iter().find(|b| b.name() == name).map(Bar::id)
    }

    //  Groups

    pub fn groups(&self) -> &DockGroups {
        &self.groups
    }

    /// Replace the whole partition (used when loading a configuration).
    pub fn set_groups(&mut self, groups: DockGroups) {
        self.groups = groups;
    }

    /// Bars that move together with `id`, itself included.
    pub fn group_of(&self, id: BarId) -> Vec<BarId> {
        self.groups.members_of(id)
    }

    //  Drag events

    /// Move the held bar to `to`.  Returns every bar whose position changed.
    ///
    /// Unless `solo` is set, the bar's group follows by the same delta.
    pub fn drag_move(&mut self, id: BarId, to: Point, solo: bool) -> Vec<BarId> {
        let Some(current) = self.bar(id).map(Bar::position) else {
            return Vec::new();
        };
        let delta = to - current;
        if delta == Point::default() {
            return Vec::new();
        }

        let moved = if solo { vec![id] } else { self.groups.members_of(id) };
        for bar in self.bars.iter_mut().filter(|b| moved.contains(&b.id())) {
            bar.move_by(delta);
        }
        debug!("drag {} by {} ({} bar(s))", id, delta, moved.len());
        moved
    }

    /// Resolve a drag-release of `id` against the current `area`.
    pub fn drag_release(&mut self, id: BarId, area: WorkArea) -> ReleaseOutcome {
        let Some(rect) = self.bar(id).map(Bar::rect) else {
            return ReleaseOutcome::Unchanged;
        };

        // 1. Corner snap.
        if let Some((corner, position)) = edge_snap(rect, area) {
            self.set_position(id, position);
            info!("{} snapped to {:?} at {}", id, corner, position);
            return ReleaseOutcome::Snapped { corner, position };
        }

        // 2. Dock to a visible neighbour.
        if let Some((neighbor, side, position)) = self.find_dock_target(id, rect) {
            self.set_position(id, position);
            let join = self.groups.join(id, neighbor);
            info!("{} docked {:?} {} ({:?})", id, side, neighbor, join);
            return ReleaseOutcome::Docked {
                neighbor,
                side,
                position,
                join,
            };
        }

        // 3. Leave the group when too far from any member.
        let members = self.groups.members_of(id);
        if members.len() > 1 {
            let strayed = members
                .iter()
                .filter(|&&m| m != id)
                .filter_map(|&m| self.bar(m))
                .any(|m| strayed_from(rect, m.rect()));
            if strayed {
                let result = self.groups.detach(id);
                info!("{} detached ({:?})", id, result);
                return ReleaseOutcome::Detached(result);
            }
        }

        ReleaseOutcome::Unchanged
    }

    //  Internal

    fn set_position(&mut self, id: BarId, position: Point) {
        if let Some(bar) = self.bar_mut(id) {
            bar.set_position(position);
        }
    }

    /// First visible bar the released bar can dock to.
    ///
    /// Bars outside the released bar's own group are tried first, so a
    /// group member lying flush next to it cannot shadow a new neighbour.
    fn find_dock_target(&self, id: BarId, rect: Rect) -> Option<(BarId, Side, Point)> {
        let own_group = self.groups.members_of(id);
        let candidates = self
            .bars
            .iter()
            .filter(|b| !own_group.contains(&b.id()))
            .chain(self.bars.iter().filter(|b| b.id() != id && own_group.contains(&b.id())));

        candidates
            .filter(|b| b.is_visible())
            .find_map(|b| dock_target(rect, b.rect()).map(|(side, pos)| (b.id(), side, pos)))
    }
}

//  Tests
