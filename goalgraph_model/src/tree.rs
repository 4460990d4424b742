// Copyright 2026 the Goalgraph Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rooted tree built from a flat node/link collection.

use hashbrown::{HashMap, HashSet};
use smallvec::SmallVec;

use crate::types::{GoalId, GoalLink, GoalNode};

/// Child index list; most goals have a handful of children.
pub type Children = SmallVec<[usize; 4]>;

/// One node of a built [`GoalTree`].
#[derive(Clone, Debug)]
pub struct TreeEntry {
    /// Id of the goal this entry stands for.
    pub id: GoalId,
    /// Distance from the root (root is 0).
    pub depth: usize,
    /// Index of the parent entry, `None` for the root.
    pub parent: Option<usize>,
    /// Child entry indices, in link order.
    pub children: Children,
    /// Copied from [`GoalNode::collapsed`].
    pub collapsed: bool,
}

/// A single rooted tree over the goals reachable from the ROOT node.
///
/// Entries are stored in pre-order (entry `0` is the root, every parent comes
/// before its children), which makes bottom-up aggregates a reverse scan.
///
/// ## Example
///
/// ```rust
/// use goalgraph_model::{GoalNode, GoalTree, links_from_parents};
///
/// let nodes = vec![
///     GoalNode::root("root", "Run a marathon"),
///     GoalNode::sub("a", "root", "Train"),
///     GoalNode::sub("b", "root", "Buy shoes"),
/// ];
/// let links = links_from_parents(&nodes);
///
/// let tree = GoalTree::build(&nodes, &links).unwrap();
/// assert_eq!(tree.root().id.as_str(), "root");
/// assert_eq!(tree.leaf_count(0), 2);
/// ```
#[derive(Clone, Debug)]
pub struct GoalTree {
    entries: Vec<TreeEntry>,
    index: HashMap<GoalId, usize>,
    /// Visible leaves below each entry (a collapsed entry counts as one leaf).
    leaves: Vec<usize>,
    /// Size of each entry's subtree, excluding itself.
    descendants: Vec<usize>,
    visible: Vec<bool>,
    excluded: usize,
}

impl GoalTree {
    /// Build the tree rooted at the first node of kind ROOT.
    ///
    /// Returns `None` when there is no ROOT node, which callers treat as
    /// "nothing to render". Nodes that cannot be reached from the root through
    /// `links` (orphans, dangling references) are left out and counted in
    /// [`GoalTree::excluded`]. A node reachable through more than one link is
    /// attached once, under the first parent reached.
    pub fn build(nodes: &[GoalNode], links: &[GoalLink]) -> Option<Self> {
        let mut roots = nodes.iter().enumerate().filter(|(_, n)| n.is_root());
        let (root_pos, root) = roots.next()?;
        if let Some((_, extra)) = roots.next() {
            tracing::warn!(
                root = %root.id,
                ignored = %extra.id,
                "multiple ROOT nodes; using the first"
            );
        }

        let by_id: HashMap<&GoalId, usize> =
            nodes.iter().enumerate().map(|(i, n)| (&n.id, i)).collect();

        let mut adjacency: HashMap<&GoalId, SmallVec<[usize; 4]>> = HashMap::new();
        for link in links {
            if let Some(&target) = by_id.get(&link.target) {
                adjacency.entry(&link.source).or_default().push(target);
            }
        }

        let mut entries: Vec<TreeEntry> = Vec::with_capacity(nodes.len());
        let mut index: HashMap<GoalId, usize> = HashMap::with_capacity(nodes.len());
        let mut attached: HashSet<usize> = HashSet::with_capacity(nodes.len());

        // (position in `nodes`, parent entry, depth)
        let mut stack: Vec<(usize, Option<usize>, usize)> = vec![(root_pos, None, 0)];
        while let Some((pos, parent, depth)) = stack.pop() {
            if !attached.insert(pos) {
                continue;
            }
            let node = &nodes[pos];
            let idx = entries.len();
            entries.push(TreeEntry {
                id: node.id.clone(),
                depth,
                parent,
                children: Children::new(),
                collapsed: node.collapsed,
            });
            index.insert(node.id.clone(), idx);
            if let Some(p) = parent {
                entries[p].children.push(idx);
            }
            if let Some(targets) = adjacency.get(&node.id) {
                // Reverse so the first link is popped (and laid out) first.
                for &t in targets.iter().rev() {
                    if !attached.contains(&t) && !nodes[t].is_root() {
                        stack.push((t, Some(idx), depth + 1));
                    }
                }
            }
        }

        let excluded = nodes.len() - entries.len();
        if excluded > 0 {
            tracing::debug!(excluded, "nodes unreachable from root left out of tree");
        }

        let n = entries.len();
        let mut leaves = vec![0_usize; n];
        let mut descendants = vec![0_usize; n];
        for i in (0..n).rev() {
            let e = &entries[i];
            descendants[i] = e.children.iter().map(|&c| descendants[c] + 1).sum();
            leaves[i] = if e.collapsed || e.children.is_empty() {
                1
            } else {
                e.children.iter().map(|&c| leaves[c]).sum()
            };
        }
        let mut visible = vec![true; n];
        for i in 1..n {
            if let Some(p) = entries[i].parent {
                visible[i] = visible[p] && !entries[p].collapsed;
            }
        }

        Some(Self {
            entries,
            index,
            leaves,
            descendants,
            visible,
            excluded,
        })
    }

    /// The root entry.
    pub fn root(&self) -> &TreeEntry {
        &self.entries[0]
    }

    /// Number of entries in the tree (visible or not).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// A built tree always has its root, so it is never empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry at `idx`.
    pub fn entry(&self, idx: usize) -> Option<&TreeEntry> {
        self.entries.get(idx)
    }

    /// Entry for `id`, if the node is part of the tree.
    pub fn get(&self, id: &GoalId) -> Option<&TreeEntry> {
        self.index.get(id).map(|&i| &self.entries[i])
    }

    /// Index of the entry for `id`.
    pub fn index_of(&self, id: &GoalId) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// All entries in pre-order.
    pub fn entries(&self) -> &[TreeEntry] {
        &self.entries
    }

    /// Children of `idx` that are rendered (empty when `idx` is collapsed).
    pub fn visible_children(&self, idx: usize) -> &[usize] {
        let e = &self.entries[idx];
        if e.collapsed { &[] } else { &e.children }
    }

    /// Visible leaves in the subtree of `idx`; a collapsed entry counts as one leaf.
    pub fn leaf_count(&self, idx: usize) -> usize {
        self.leaves[idx]
    }

    /// Number of descendants of `idx` hidden because `idx` is collapsed.
    pub fn hidden_descendants(&self, idx: usize) -> usize {
        if self.entries[idx].collapsed {
            self.descendants[idx]
        } else {
            0
        }
    }

    /// Visible entry indices in pre-order.
    pub fn visible(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.entries.len()).filter(|&i| self.visible[i])
    }

    /// Whether `id` is part of the rendered scene.
    pub fn is_visible(&self, id: &GoalId) -> bool {
        self.index.get(id).is_some_and(|&i| self.visible[i])
    }

    /// Number of input nodes that were not attached to the tree.
    pub fn excluded(&self) -> usize {
        self.excluded
    }

    /// Depth of the deepest visible entry.
    pub fn max_visible_depth(&self) -> usize {
        self.visible().map(|i| self.entries[i].depth).max().unwrap_or(0)
    }
}
