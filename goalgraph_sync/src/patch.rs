// Copyright 2026 the Goalgraph Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Minimal differences between two node/link snapshots.

use goalgraph_model::{GoalId, GoalLink, GoalNode, NodeUpdate};
use hashbrown::{HashMap, HashSet};

/// A node moved to a different parent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Move {
    /// The moved node.
    pub id: GoalId,
    /// Parent before the move.
    pub from: Option<GoalId>,
    /// Parent after the move.
    pub to: Option<GoalId>,
}

/// What changed between two snapshots.
///
/// Parents are read from the links (the edges the tree is built from), so a
/// `parent_id` that disagrees with the links does not count as a move.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GraphPatch {
    /// Nodes present only in the new snapshot, in its order.
    pub added: Vec<GoalNode>,
    /// Ids present only in the old snapshot, in its order.
    pub removed: Vec<GoalId>,
    /// Field changes on nodes present in both.
    pub updated: Vec<(GoalId, NodeUpdate)>,
    /// Parent changes on nodes present in both.
    pub moved: Vec<Move>,
    /// Parents whose children, among nodes that neither came, went nor
    /// moved, are listed in a different order. Sibling order drives angle
    /// and slot assignment, so this is a shape change too.
    pub reordered: Vec<GoalId>,
}

impl GraphPatch {
    /// Diff `old` against `new`.
    pub fn between(
        old_nodes: &[GoalNode],
        old_links: &[GoalLink],
        new_nodes: &[GoalNode],
        new_links: &[GoalLink],
    ) -> Self {
        let old_by_id: HashMap<&GoalId, &GoalNode> = old_nodes.iter().map(|n| (&n.id, n)).collect();
        let new_ids: HashSet<&GoalId> = new_nodes.iter().map(|n| &n.id).collect();
        let old_parent = parents(old_links);
        let new_parent = parents(new_links);

        let mut patch = Self::default();
        for n in new_nodes {
            let Some(old) = old_by_id.get(&n.id) else {
                patch.added.push(n.clone());
                continue;
            };
            let update = field_changes(old, n);
            if !update.is_empty() {
                patch.updated.push((n.id.clone(), update));
            }
            let (from, to) = (old_parent.get(&n.id), new_parent.get(&n.id));
            if from != to {
                patch.moved.push(Move {
                    id: n.id.clone(),
                    from: from.map(|&p| p.clone()),
                    to: to.map(|&p| p.clone()),
                });
            }
        }
        patch.removed = old_nodes
            .iter()
            .filter(|n| !new_ids.contains(&n.id))
            .map(|n| n.id.clone())
            .collect();

        let settled: HashSet<&GoalId> = old_nodes
            .iter()
            .map(|n| &n.id)
            .filter(|id| new_ids.contains(*id) && !patch.moved.iter().any(|m| &m.id == *id))
            .collect();
        let old_children = child_order(old_links, &settled);
        let new_children = child_order(new_links, &settled);
        let mut seen = HashSet::new();
        for l in new_links.iter().chain(old_links) {
            if seen.insert(&l.source) && old_children.get(&l.source) != new_children.get(&l.source)
            {
                patch.reordered.push(l.source.clone());
            }
        }
        patch
    }

    /// True if nothing changed.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty()
            && self.removed.is_empty()
            && self.updated.is_empty()
            && self.moved.is_empty()
            && self.reordered.is_empty()
    }

    /// True if the tree shape changed (nodes added, removed, moved or
    /// reordered among their siblings).
    pub fn is_structural(&self) -> bool {
        !(self.added.is_empty()
            && self.removed.is_empty()
            && self.moved.is_empty()
            && self.reordered.is_empty())
    }

    /// True if positions must be recomputed: the shape changed or a node was
    /// collapsed or expanded.
    pub fn needs_layout(&self) -> bool {
        self.is_structural() || self.updated.iter().any(|(_, u)| u.collapsed.is_some())
    }

    /// Whether `id` is added, removed, updated or moved by this patch.
    pub fn touches(&self, id: &GoalId) -> bool {
        self.added.iter().any(|n| &n.id == id)
            || self.removed.contains(id)
            || self.updated.iter().any(|(u, _)| u == id)
            || self.moved.iter().any(|m| &m.id == id)
    }

    /// Update for `id`, if its fields changed.
    pub fn update_for(&self, id: &GoalId) -> Option<&NodeUpdate> {
        self.updated.iter().find(|(u, _)| u == id).map(|(_, u)| u)
    }
}

fn parents(links: &[GoalLink]) -> HashMap<&GoalId, &GoalId> {
    let mut out = HashMap::with_capacity(links.len());
    for l in links {
        // First link wins, matching the tree builder.
        out.entry(&l.target).or_insert(&l.source);
    }
    out
}

/// Children per parent in link order, restricted to `keep`.
fn child_order<'a>(
    links: &'a [GoalLink],
    keep: &HashSet<&GoalId>,
) -> HashMap<&'a GoalId, Vec<&'a GoalId>> {
    let mut out: HashMap<&GoalId, Vec<&GoalId>> = HashMap::new();
    for l in links {
        if keep.contains(&l.target) {
            out.entry(&l.source).or_default().push(&l.target);
        }
    }
    out
}

fn field_changes(old: &GoalNode, new: &GoalNode) -> NodeUpdate {
    NodeUpdate {
        text: (old.text != new.text).then(|| new.text.clone()),
        status: (old.status != new.status).then_some(new.status),
        progress: (old.progress != new.progress).then_some(new.progress),
        collapsed: (old.collapsed != new.collapsed).then_some(new.collapsed),
        image_url: (old.image_url != new.image_url).then(|| new.image_url.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use goalgraph_model::{GoalStatus, links_from_parents};

    fn base() -> Vec<GoalNode> {
        vec![
            GoalNode::root("r", "Root"),
            GoalNode::sub("a", "r", "A"),
            GoalNode::sub("b", "r", "B"),
            GoalNode::sub("a1", "a", "A1"),
        ]
    }

    fn diff(old: &[GoalNode], new: &[GoalNode]) -> GraphPatch {
        GraphPatch::between(old, &links_from_parents(old), new, &links_from_parents(new))
    }

    #[test]
    fn identical_snapshots_give_an_empty_patch() {
        let p = diff(&base(), &base());
        assert!(p.is_empty());
        assert!(!p.needs_layout());
    }

    #[test]
    fn detects_each_kind_of_change() {
        let old = base();
        let mut new = base();
        new[1].text = "A!".into();
        new[2].status = GoalStatus::Stuck;
        new[3].parent_id = Some(GoalId::from("b"));
        new.push(GoalNode::sub("c", "r", "C"));

        let p = diff(&old, &new);
        assert_eq!(p.added.len(), 1);
        assert_eq!(p.added[0].id.as_str(), "c");
        assert!(p.removed.is_empty());
        assert_eq!(p.update_for(&GoalId::from("a")), Some(&NodeUpdate::text("A!")));
        assert_eq!(
            p.update_for(&GoalId::from("b")),
            Some(&NodeUpdate::status(GoalStatus::Stuck))
        );
        assert_eq!(
            p.moved,
            [Move {
                id: GoalId::from("a1"),
                from: Some(GoalId::from("a")),
                to: Some(GoalId::from("b")),
            }]
        );
        assert!(p.is_structural());
    }

    #[test]
    fn label_only_changes_keep_the_layout() {
        let old = base();
        let mut new = base();
        new[3].text = "Renamed".into();
        let p = diff(&old, &new);
        assert!(!p.is_structural());
        assert!(!p.needs_layout());
        assert!(p.touches(&GoalId::from("a1")));
        assert!(!p.touches(&GoalId::from("a")));
    }

    #[test]
    fn sibling_reorder_is_structural() {
        let old = base();
        let mut new = base();
        new.swap(1, 2);
        let p = diff(&old, &new);
        assert!(p.added.is_empty() && p.removed.is_empty() && p.moved.is_empty());
        assert_eq!(p.reordered, [GoalId::from("r")]);
        assert!(p.is_structural());
        assert!(p.needs_layout());

        // An added sibling alone is not a reorder.
        let mut grown = base();
        grown.push(GoalNode::sub("c", "r", "C"));
        assert!(diff(&old, &grown).reordered.is_empty());
    }

    #[test]
    fn collapse_needs_layout_and_removal_is_listed() {
        let old = base();
        let mut new = base();
        new[1].collapsed = true;
        assert!(diff(&old, &new).needs_layout());

        let new: Vec<_> = base().into_iter().filter(|n| n.id.as_str() != "a1").collect();
        let p = diff(&old, &new);
        assert_eq!(p.removed, [GoalId::from("a1")]);
        assert!(p.touches(&GoalId::from("a1")));
    }
}
