// Copyright 2026 the Goalgraph Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Invariant-preserving operations over a node/link snapshot.
//!
//! [`GoalGraph`] is an owned copy of the externally supplied collections. The
//! engine applies its own edits to this copy optimistically so it can predict
//! what the owner will echo back; the owner's arrays are never touched.

use std::collections::VecDeque;

use hashbrown::{HashMap, HashSet};

use crate::error::GraphError;
use crate::types::{GoalId, GoalLink, GoalNode, NodeUpdate};

/// Source of parent relationships, used for ancestor walks.
pub trait ParentLookup {
    /// Parent of `id`, or `None` for the root and unknown ids.
    fn parent_of(&self, id: &GoalId) -> Option<&GoalId>;

    /// Whether `id` is known at all.
    fn contains(&self, id: &GoalId) -> bool;
}

impl ParentLookup for [GoalNode] {
    fn parent_of(&self, id: &GoalId) -> Option<&GoalId> {
        self.iter()
            .find(|n| &n.id == id)
            .and_then(|n| n.parent_id.as_ref())
    }

    fn contains(&self, id: &GoalId) -> bool {
        self.iter().any(|n| &n.id == id)
    }
}

/// Ancestors of `id`, nearest first, ending at the root.
///
/// The walk is bounded by `limit` steps so malformed (cyclic) parent data
/// still terminates.
pub fn ancestors<P: ParentLookup + ?Sized>(lookup: &P, id: &GoalId, limit: usize) -> Vec<GoalId> {
    let mut out = Vec::new();
    let mut cur = lookup.parent_of(id);
    while let Some(p) = cur {
        if out.len() >= limit {
            break;
        }
        out.push(p.clone());
        cur = lookup.parent_of(p);
    }
    out
}

/// Whether `ancestor` is `node` itself or appears on `node`'s parent chain.
pub fn is_ancestor_or_self<P: ParentLookup + ?Sized>(
    lookup: &P,
    ancestor: &GoalId,
    node: &GoalId,
    limit: usize,
) -> bool {
    if ancestor == node {
        return true;
    }
    let mut cur = lookup.parent_of(node);
    let mut steps = 0;
    while let Some(p) = cur {
        if p == ancestor {
            return true;
        }
        steps += 1;
        if steps > limit {
            return false;
        }
        cur = lookup.parent_of(p);
    }
    false
}

/// Check that `child` may be moved under `new_parent`.
///
/// Walks the ancestor chain of the proposed parent up to the root; if `child`
/// is on it the move would create a cycle and is rejected.
pub fn validate_reparent<P: ParentLookup + ?Sized>(
    lookup: &P,
    child: &GoalId,
    new_parent: &GoalId,
    limit: usize,
) -> Result<(), GraphError> {
    if !lookup.contains(child) {
        return Err(GraphError::UnknownNode(child.clone()));
    }
    if !lookup.contains(new_parent) {
        return Err(GraphError::UnknownNode(new_parent.clone()));
    }
    if child == new_parent {
        return Err(GraphError::SelfParent(child.clone()));
    }
    let Some(current) = lookup.parent_of(child) else {
        return Err(GraphError::RootImmovable(child.clone()));
    };
    if current == new_parent {
        return Err(GraphError::AlreadyChild {
            child: child.clone(),
            parent: new_parent.clone(),
        });
    }
    if is_ancestor_or_self(lookup, child, new_parent, limit) {
        return Err(GraphError::Cycle {
            child: child.clone(),
            parent: new_parent.clone(),
        });
    }
    Ok(())
}

/// Owned node/link snapshot with an id index.
#[derive(Clone, Debug, Default)]
pub struct GoalGraph {
    nodes: Vec<GoalNode>,
    links: Vec<GoalLink>,
    index: HashMap<GoalId, usize>,
}

impl GoalGraph {
    /// Take ownership of a node/link snapshot.
    pub fn new(nodes: Vec<GoalNode>, links: Vec<GoalLink>) -> Self {
        let mut graph = Self {
            nodes,
            links,
            index: HashMap::new(),
        };
        graph.reindex();
        graph
    }

    fn reindex(&mut self) {
        self.index = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.clone(), i))
            .collect();
    }

    /// All nodes, in owner order.
    pub fn nodes(&self) -> &[GoalNode] {
        &self.nodes
    }

    /// All links, in owner order.
    pub fn links(&self) -> &[GoalLink] {
        &self.links
    }

    /// Node with the given id.
    pub fn get(&self, id: &GoalId) -> Option<&GoalNode> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when there are no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Id of the first ROOT node.
    pub fn root_id(&self) -> Option<&GoalId> {
        self.nodes.iter().find(|n| n.is_root()).map(|n| &n.id)
    }

    /// Direct children of `id`, by `parent_id`, in owner order.
    pub fn children_of<'a>(&'a self, id: &'a GoalId) -> impl Iterator<Item = &'a GoalId> + 'a {
        self.nodes
            .iter()
            .filter(move |n| n.parent_id.as_ref() == Some(id))
            .map(|n| &n.id)
    }

    /// `id` and all of its descendants, parents before children.
    pub fn subtree_ids(&self, id: &GoalId) -> Vec<GoalId> {
        if !self.index.contains_key(id) {
            return Vec::new();
        }
        let mut by_parent: HashMap<&GoalId, Vec<&GoalId>> = HashMap::new();
        for n in &self.nodes {
            if let Some(p) = &n.parent_id {
                by_parent.entry(p).or_default().push(&n.id);
            }
        }
        let mut seen: HashSet<&GoalId> = HashSet::new();
        let mut out = Vec::new();
        let mut queue = VecDeque::from([id]);
        while let Some(cur) = queue.pop_front() {
            if !seen.insert(cur) {
                continue;
            }
            out.push(cur.clone());
            if let Some(kids) = by_parent.get(cur) {
                queue.extend(kids.iter().copied());
            }
        }
        out
    }

    /// Apply a partial update to one node.
    pub fn apply_update(&mut self, id: &GoalId, update: &NodeUpdate) -> Result<(), GraphError> {
        let &i = self
            .index
            .get(id)
            .ok_or_else(|| GraphError::UnknownNode(id.clone()))?;
        update.apply_to(&mut self.nodes[i]);
        Ok(())
    }

    /// Delete `id` together with its whole subtree, and every link touching it.
    ///
    /// Returns the removed ids, parents first.
    pub fn apply_delete(&mut self, id: &GoalId) -> Result<Vec<GoalId>, GraphError> {
        let node = self.get(id).ok_or_else(|| GraphError::UnknownNode(id.clone()))?;
        if node.is_root() {
            return Err(GraphError::RootImmovable(id.clone()));
        }
        let removed = self.subtree_ids(id);
        {
            let gone: HashSet<&GoalId> = removed.iter().collect();
            self.nodes.retain(|n| !gone.contains(&n.id));
            self.links
                .retain(|l| !gone.contains(&l.source) && !gone.contains(&l.target));
        }
        self.reindex();
        Ok(removed)
    }

    /// Move `child` under `new_parent`, keeping `parent_id` and links in step.
    pub fn apply_reparent(&mut self, child: &GoalId, new_parent: &GoalId) -> Result<(), GraphError> {
        validate_reparent(&*self, child, new_parent, self.nodes.len())?;
        if let Some(&i) = self.index.get(child) {
            self.nodes[i].parent_id = Some(new_parent.clone());
        }
        match self.links.iter_mut().find(|l| &l.target == child) {
            Some(link) => link.source = new_parent.clone(),
            None => self.links.push(GoalLink::new(new_parent.clone(), child.clone())),
        }
        Ok(())
    }

    /// Append a new node (and its link, when it has a parent).
    pub fn apply_add(&mut self, node: GoalNode) -> Result<(), GraphError> {
        if self.index.contains_key(&node.id) {
            return Err(GraphError::DuplicateId(node.id));
        }
        if let Some(parent) = &node.parent_id {
            if !self.index.contains_key(parent) {
                return Err(GraphError::UnknownNode(parent.clone()));
            }
            self.links.push(GoalLink::new(parent.clone(), node.id.clone()));
        }
        self.index.insert(node.id.clone(), self.nodes.len());
        self.nodes.push(node);
        Ok(())
    }

    /// Give back the owned collections.
    pub fn into_parts(self) -> (Vec<GoalNode>, Vec<GoalLink>) {
        (self.nodes, self.links)
    }
}

impl ParentLookup for GoalGraph {
    fn parent_of(&self, id: &GoalId) -> Option<&GoalId> {
        self.get(id).and_then(|n| n.parent_id.as_ref())
    }

    fn contains(&self, id: &GoalId) -> bool {
        self.index.contains_key(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::links_from_parents;

    fn graph() -> GoalGraph {
        let nodes = vec![
            GoalNode::root("root", "Root"),
            GoalNode::sub("a", "root", "A"),
            GoalNode::sub("b", "root", "B"),
            GoalNode::sub("a1", "a", "A1"),
            GoalNode::sub("a1x", "a1", "A1x"),
        ];
        let links = links_from_parents(&nodes);
        GoalGraph::new(nodes, links)
    }

    #[test]
    fn ancestors_walk_to_root() {
        let g = graph();
        let chain = ancestors(&g, &"a1x".into(), 16);
        assert_eq!(chain, vec![GoalId::from("a1"), "a".into(), "root".into()]);
        assert!(ancestors(&g, &"root".into(), 16).is_empty());
    }

    #[test]
    fn reparent_under_descendant_is_a_cycle() {
        let g = graph();
        let err = validate_reparent(&g, &"a".into(), &"a1x".into(), g.len()).unwrap_err();
        assert_eq!(
            err,
            GraphError::Cycle {
                child: "a".into(),
                parent: "a1x".into()
            }
        );
    }

    #[test]
    fn reparent_rejections() {
        let g = graph();
        assert_eq!(
            validate_reparent(&g, &"a".into(), &"a".into(), 8),
            Err(GraphError::SelfParent("a".into()))
        );
        assert_eq!(
            validate_reparent(&g, &"root".into(), &"a".into(), 8),
            Err(GraphError::RootImmovable("root".into()))
        );
        assert_eq!(
            validate_reparent(&g, &"zz".into(), &"a".into(), 8),
            Err(GraphError::UnknownNode("zz".into()))
        );
        assert!(matches!(
            validate_reparent(&g, &"a1".into(), &"a".into(), 8),
            Err(GraphError::AlreadyChild { .. })
        ));
        assert!(validate_reparent(&g, &"a1".into(), &"b".into(), 8).is_ok());
    }

    #[test]
    fn rejected_reparent_leaves_snapshot_untouched() {
        let mut g = graph();
        let before = g.nodes().to_vec();
        let links_before = g.links().to_vec();
        assert!(g.apply_reparent(&"a".into(), &"a1".into()).is_err());
        assert_eq!(g.nodes(), &before[..]);
        assert_eq!(g.links(), &links_before[..]);
    }

    #[test]
    fn reparent_moves_parent_id_and_link() {
        let mut g = graph();
        g.apply_reparent(&"a1".into(), &"b".into()).unwrap();
        assert_eq!(g.get(&"a1".into()).unwrap().parent_id, Some("b".into()));
        assert!(g.links().contains(&GoalLink::new("b", "a1")));
        assert!(!g.links().contains(&GoalLink::new("a", "a1")));
        assert_eq!(g.links().len(), 4);
    }

    #[test]
    fn delete_cascades_over_subtree() {
        let mut g = graph();
        let removed = g.apply_delete(&"a".into()).unwrap();
        assert_eq!(removed, vec![GoalId::from("a"), "a1".into(), "a1x".into()]);
        assert_eq!(g.len(), 2);
        assert_eq!(g.links(), &[GoalLink::new("root", "b")]);
        assert_eq!(
            g.apply_delete(&"root".into()),
            Err(GraphError::RootImmovable("root".into()))
        );
    }

    #[test]
    fn add_appends_node_and_link() {
        let mut g = graph();
        g.apply_add(GoalNode::sub("c", "b", "C")).unwrap();
        assert_eq!(g.children_of(&"b".into()).count(), 1);
        assert!(matches!(
            g.apply_add(GoalNode::sub("c", "b", "C")),
            Err(GraphError::DuplicateId(_))
        ));
        assert!(matches!(
            g.apply_add(GoalNode::sub("d", "nope", "D")),
            Err(GraphError::UnknownNode(_))
        ));
    }

    #[test]
    fn slice_lookup_matches_graph_lookup() {
        let g = graph();
        let nodes = g.nodes();
        assert_eq!(nodes.parent_of(&"a1".into()), g.parent_of(&"a1".into()));
        assert!(is_ancestor_or_self(nodes, &"root".into(), &"a1x".into(), 8));
        assert!(!is_ancestor_or_self(nodes, &"b".into(), &"a1x".into(), 8));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        /// A random tree: node `i > 0` picks a parent among `0..i`.
        fn tree_nodes(parents: &[usize]) -> Vec<GoalNode> {
            let mut nodes = vec![GoalNode::root("n0", "n0")];
            for (i, &p) in parents.iter().enumerate() {
                let id = format!("n{}", i + 1);
                let parent = format!("n{}", p % (i + 1));
                nodes.push(GoalNode::sub(id.as_str(), parent.as_str(), id.as_str()));
            }
            nodes
        }

        proptest! {
            #[test]
            fn moving_under_a_descendant_is_always_rejected(
                parents in proptest::collection::vec(0_usize..64, 1..40),
                pick in 0_usize..1000,
            ) {
                let nodes = tree_nodes(&parents);
                let mut g = GoalGraph::new(nodes.clone(), links_from_parents(&nodes));
                let a = GoalId::new(format!("n{}", 1 + pick % parents.len()));
                let subtree = g.subtree_ids(&a);
                for b in &subtree {
                    let before = g.nodes().to_vec();
                    prop_assert!(g.apply_reparent(&a, b).is_err());
                    prop_assert_eq!(g.nodes(), &before[..]);
                }
            }
        }
    }
}
