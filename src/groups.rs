//! Partition of docked bars into groups.
//!
//! A [`DockGroups`] keeps two maps: `bar -> group` for O(1) lookups and
//! `group -> members` for iteration.  A bar that is not docked to anything
//! has no entry at all; it is an implicit singleton.  A group always has at
//! least two members: it is dissolved as soon as it would shrink below
//! that.

use crate::bar::BarId;
use std::collections::{BTreeSet, HashMap};

/// Identifier of a materialised dock group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId(u32);

/// How [`DockGroups::join`] changed the partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinResult {
    /// Two loose bars formed a new group.
    Created(GroupId),
    /// A loose bar joined an existing group.
    Joined(GroupId),
    /// Two groups became one.
    Merged(GroupId),
    /// Both bars were already in the same group.
    Unchanged(GroupId),
}

impl JoinResult {
    pub fn group(&self) -> GroupId {
        match *self {
            JoinResult::Created(g) | JoinResult::Joined(g) | JoinResult::Merged(g) | JoinResult::Unchanged(g) => g,
        }
    }
}

/// How [`DockGroups::detach`] changed the partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetachResult {
    /// The bar was not docked.
    NotDocked,
    /// The bar left; the rest of its group stays together.
    Left(GroupId),
    /// The bar left and its group dissolved (the remaining bar is loose).
    Dissolved,
}

/// The docking partition.
#[derive(Debug, Clone, Default)]
pub struct DockGroups {
    /// `bar -> group`.  Only docked bars appear here.
    membership: HashMap<BarId, GroupId>,
    /// `group -> members`, every set holding at least two bars.
    members: HashMap<GroupId, BTreeSet<BarId>>,
    /// Counter used to allocate the next group id.
    next_group_id: u32,
}

impl DockGroups {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a partition from lists of bars, e.g. loaded from disk.
    ///
    /// Lists with fewer than two bars are ignored.  A bar mentioned in more
    /// than one list ends up in the union of those lists.
    pub fn from_lists(lists: impl IntoIterator<Item = Vec<BarId>>) -> Self {
        let mut groups = Self::new();
        for list in lists {
            let unique: BTreeSet<BarId> = list.into_iter().collect();
            if unique.len() < 2 {
                continue;
            }
            let mut iter = unique.into_iter();
            if let Some(first) = iter.next() {
                for other in iter {
                    groups.join(first, other);
                }
            }
        }
        groups
    }

    //  Queries

    /// Group of `bar`, or `None` if it is not docked.
    pub fn group_of(&self, bar: BarId) -> Option<GroupId> {
        self.membership.get(&bar).copied()
    }

    /// Every bar that moves together with `bar`, including `bar` itself.
    pub fn members_of(&self, bar: BarId) -> Vec<BarId> {
        match self.group_of(bar).and_then(|g| self.members.get(&g)) {
            Some(set) => set.iter().copied().collect(),
            None => vec![bar],
        }
    }

    pub fn is_docked(&self, bar: BarId) -> bool {
        self.membership.contains_key(&bar)
    }

    /// Number of materialised groups.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// All groups as sorted member lists, in a deterministic order (by
    /// smallest member).
    pub fn lists(&self) -> Vec<Vec<BarId>> {
        let mut lists: Vec<Vec<BarId>> = self
            .members
            .values()
            .map(|set| set.iter().copied().collect())
            .collect();
        lists.sort();
        lists
    }

    //  Mutation

    /// Put `a` and `b` in the same group, creating, extending, or merging
    /// groups as needed.
    pub fn join(&mut self, a: BarId, b: BarId) -> JoinResult {
        match (self.group_of(a), self.group_of(b)) {
            (None, None) => {
                let id = self.allocate();
                self.members.insert(id, BTreeSet::from([a, b]));
                self.membership.insert(a, id);
                self.membership.insert(b, id);
                JoinResult::Created(id)
            }
            (Some(g), None) => {
                self.add_to(g, b);
                JoinResult::Joined(g)
            }
            (None, Some(g)) => {
                self.add_to(g, a);
                JoinResult::Joined(g)
            }
            (Some(ga), Some(gb)) if ga == gb => JoinResult::Unchanged(ga),
            (Some(ga), Some(gb)) => {
                let moved = self.members.remove(&gb).unwrap_or_default();
                for bar in moved {
                    self.add_to(ga, bar);
                }
                JoinResult::Merged(ga)
            }
        }
    }

    /// Take `bar` out of its group, dissolving the group if fewer than two
    /// members remain.
    pub fn detach(&mut self, bar: BarId) -> DetachResult {
        let Some(g) = self.membership.remove(&bar) else {
            return DetachResult::NotDocked;
        };
        let Some(set) = self.members.get_mut(&g) else {
            return DetachResult::NotDocked;
        };
        set.remove(&bar);
        if set.len() >= 2 {
            return DetachResult::Left(g);
        }
        if let Some(rest) = self.members.remove(&g) {
            for other in rest {
                self.membership.remove(&other);
            }
        }
        DetachResult::Dissolved
    }

    //  Internal

    fn add_to(&mut self, group: GroupId, bar: BarId) {
        self.members.entry(group).or_default().insert(bar);
        self.membership.insert(bar, group);
    }

    fn allocate(&mut self) -> GroupId {
        let id = GroupId(self.next_group_id);
        self.next_group_id += 1;
        id
    }
}

//  Tests

#[cfg(test)]
mod tests {
    use super::*;

    const A: BarId = BarId(0);
    const B: BarId = BarId(1);
    const C: BarId = BarId(2);
    const D: BarId = BarId(3);

    #[test]
    fn loose_bar_is_its_own_singleton() {
        let g = DockGroups::new();
        assert_eq!(g.members_of(A), vec![A]);
        assert!(g.group_of(A).is_none());
        assert!(g.is_empty());
    }

    #[test]
    fn joining_two_loose_bars_creates_a_group() {
        let mut g = DockGroups::new();
        assert!(matches!(g.join(A, B), JoinResult::Created(_)));
        assert_eq!(g.members_of(A), vec![A, B]);
        assert_eq!(g.members_of(B), vec![A, B]);
        assert_eq!(g.group_of(A), g.group_of(B));
    }

    #[test]
    fn loose_bar_joins_existing_group() {
        let mut g = DockGroups::new();
        g.join(A, B);
        assert!(matches!(g.join(C, B), JoinResult::Joined(_)));
        assert_eq!(g.members_of(C), vec![A, B, C]);
        assert_eq!(g.len(), 1);
    }

    #[test]
    fn joining_members_of_two_groups_merges_them() {
        let mut g = DockGroups::new();
        g.join(A, B);
        g.join(C, D);
        assert!(matches!(g.join(B, C), JoinResult::Merged(_)));
        assert_eq!(g.len(), 1);
        for bar in [A, B, C, D] {
            assert_eq!(g.members_of(bar), vec![A, B, C, D]);
        }
    }

    #[test]
    fn joining_within_a_group_changes_nothing() {
        let mut g = DockGroups::new();
        let id = g.join(A, B).group();
        assert_eq!(g.join(B, A), JoinResult::Unchanged(id));
        assert_eq!(g.len(), 1);
    }

    #[test]
    fn merge_order_does_not_matter() {
        let mut first = DockGroups::new();
        first.join(A, B);
        first.join(B, C);

        let mut second = DockGroups::new();
        second.join(B, C);
        second.join(A, B);

        assert_eq!(first.lists(), second.lists());
        assert_eq!(first.lists(), vec![vec![A, B, C]]);
    }

    #[test]
    fn detach_from_pair_dissolves_group() {
        let mut g = DockGroups::new();
        g.join(A, B);
        assert_eq!(g.detach(A), DetachResult::Dissolved);
        assert!(g.is_empty());
        assert!(!g.is_docked(B));
        assert_eq!(g.members_of(B), vec![B]);
    }

    #[test]
    fn detach_from_larger_group_keeps_the_rest() {
        let mut g = DockGroups::new();
        g.join(A, B);
        g.join(B, C);
        assert!(matches!(g.detach(B), DetachResult::Left(_)));
        assert_eq!(g.members_of(A), vec![A, C]);
        assert_eq!(g.members_of(B), vec![B]);
    }

    #[test]
    fn detach_loose_bar_is_a_no_op() {
        let mut g = DockGroups::new();
        assert_eq!(g.detach(A), DetachResult::NotDocked);
    }

    #[test]
    fn every_bar_is_in_at_most_one_group() {
        let mut g = DockGroups::new();
        g.join(A, B);
        g.join(C, D);
        g.join(A, D);
        g.detach(C);
        let lists = g.lists();
        let mut seen = BTreeSet::new();
        for list in &lists {
            assert!(list.len() >= 2);
            for bar in list {
                assert!(seen.insert(*bar), "{bar} appears twice");
            }
        }
    }

    #[test]
    fn from_lists_skips_short_lists_and_unions_overlaps() {
        let g = DockGroups::from_lists(vec![vec![A], vec![A, B], vec![B, C], vec![D, D]]);
        assert_eq!(g.lists(), vec![vec![A, B, C]]);
    }
}
