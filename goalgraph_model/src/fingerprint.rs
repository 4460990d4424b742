// Copyright 2026 the Goalgraph Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Structural fingerprints and the rebuild gate built on them.

use core::fmt::Write as _;

use crate::types::{GoalId, GoalLink, GoalNode, LayoutMode};

/// Everything a rebuild depends on.
#[derive(Clone, Copy, Debug)]
pub struct FingerprintInput<'a> {
    /// Node collection.
    pub nodes: &'a [GoalNode],
    /// Link collection.
    pub links: &'a [GoalLink],
    /// Selected node.
    pub selected: Option<&'a GoalId>,
    /// Node whose label is being edited.
    pub editing: Option<&'a GoalId>,
    /// Active layout mode.
    pub mode: LayoutMode,
}

/// A cheap string key over the rebuild-relevant state.
///
/// Two inputs with equal fingerprints produce the same scene, so the second
/// rebuild can be skipped.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Key over nodes, links, selection, editing target and layout mode.
    pub fn compute(input: &FingerprintInput<'_>) -> Self {
        let mut key = Self::structural(input.nodes, input.links).0;
        key.push_str("#sel=");
        push_opt(&mut key, input.selected.map(GoalId::as_str));
        key.push_str("#edit=");
        push_opt(&mut key, input.editing.map(GoalId::as_str));
        key.push_str("#mode=");
        key.push_str(input.mode.as_str());
        Self(key)
    }

    /// Key over nodes and links only.
    ///
    /// Per node: id, text, status, collapsed, image url and progress; per
    /// link: source and target. Free-text fields are length-prefixed, so
    /// delimiters inside ids or labels cannot make two snapshots collide.
    pub fn structural(nodes: &[GoalNode], links: &[GoalLink]) -> Self {
        let mut key = String::with_capacity(nodes.len() * 40 + links.len() * 20);
        for n in nodes {
            push_field(&mut key, n.id.as_str());
            push_field(&mut key, &n.text);
            // Writing to a String cannot fail.
            let _ = write!(key, "{}:{}:", n.status.as_str(), n.collapsed);
            push_opt(&mut key, n.image_url.as_deref());
            let _ = write!(key, "{}|", n.progress);
        }
        key.push('#');
        for l in links {
            push_field(&mut key, l.source.as_str());
            push_field(&mut key, l.target.as_str());
            key.push(',');
        }
        Self(key)
    }

    /// The raw key.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn push_field(key: &mut String, field: &str) {
    let _ = write!(key, "{}:{field}", field.len());
}

fn push_opt(key: &mut String, field: Option<&str>) {
    match field {
        Some(f) => push_field(key, f),
        None => key.push('~'),
    }
}

/// Gate that lets a rebuild through only when the fingerprint changed.
#[derive(Clone, Debug, Default)]
pub struct DiffGuard {
    last: Option<Fingerprint>,
    skipped: u64,
}

impl DiffGuard {
    /// A guard that lets the first rebuild through.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if `fingerprint` differs from the last accepted one, and
    /// remembers it. Returns `false` (and counts a skip) otherwise.
    pub fn check(&mut self, fingerprint: Fingerprint) -> bool {
        if self.last.as_ref() == Some(&fingerprint) {
            self.skipped += 1;
            tracing::trace!(skipped = self.skipped, "fingerprint unchanged; rebuild skipped");
            return false;
        }
        self.last = Some(fingerprint);
        true
    }

    /// Forget the last fingerprint so the next check always passes.
    pub fn invalidate(&mut self) {
        self.last = None;
    }

    /// Last accepted fingerprint.
    pub fn last(&self) -> Option<&Fingerprint> {
        self.last.as_ref()
    }

    /// Number of rebuilds skipped so far.
    pub fn skipped(&self) -> u64 {
        self.skipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{GoalStatus, links_from_parents};

    fn nodes() -> Vec<GoalNode> {
        vec![GoalNode::root("r", "Root"), GoalNode::sub("a", "r", "A")]
    }

    fn input<'a>(nodes: &'a [GoalNode], links: &'a [GoalLink]) -> FingerprintInput<'a> {
        FingerprintInput {
            nodes,
            links,
            selected: None,
            editing: None,
            mode: LayoutMode::Radial,
        }
    }

    #[test]
    fn deep_equal_inputs_share_a_fingerprint() {
        let a = nodes();
        let b = nodes();
        let la = links_from_parents(&a);
        let lb = links_from_parents(&b);
        assert_eq!(
            Fingerprint::compute(&input(&a, &la)),
            Fingerprint::compute(&input(&b, &lb))
        );
    }

    #[test]
    fn every_tracked_field_changes_the_key() {
        let base_nodes = nodes();
        let links = links_from_parents(&base_nodes);
        let base = Fingerprint::compute(&input(&base_nodes, &links));

        let mut changed = nodes();
        changed[1].status = GoalStatus::Stuck;
        assert_ne!(base, Fingerprint::compute(&input(&changed, &links)));

        let mut changed = nodes();
        changed[1].collapsed = true;
        assert_ne!(base, Fingerprint::compute(&input(&changed, &links)));

        let mut changed = nodes();
        changed[1].image_url = Some("x.png".into());
        assert_ne!(base, Fingerprint::compute(&input(&changed, &links)));

        let sel = GoalId::from("a");
        let mut with_sel = input(&base_nodes, &links);
        with_sel.selected = Some(&sel);
        assert_ne!(base, Fingerprint::compute(&with_sel));

        let mut with_edit = input(&base_nodes, &links);
        with_edit.editing = Some(&sel);
        assert_ne!(Fingerprint::compute(&with_sel), Fingerprint::compute(&with_edit));

        let mut forced = input(&base_nodes, &links);
        forced.mode = LayoutMode::Force;
        assert_ne!(base, Fingerprint::compute(&forced));

        assert_ne!(base, Fingerprint::compute(&input(&base_nodes, &[])));
    }

    #[test]
    fn delimiters_inside_fields_do_not_collide() {
        // Text that mimics the next field.
        let mut a = nodes();
        a[1].text = "A:pending:false".into();
        let mut b = nodes();
        b[1].text = "A".into();
        b[1].image_url = Some("pending:false".into());
        let la = links_from_parents(&a);
        assert_ne!(Fingerprint::structural(&a, &la), Fingerprint::structural(&b, &la));

        // Ids containing the link separator.
        let split = |s: &str, t: &str| GoalLink {
            source: GoalId::from(s),
            target: GoalId::from(t),
        };
        assert_ne!(
            Fingerprint::structural(&[], &[split("a-b", "c")]),
            Fingerprint::structural(&[], &[split("a", "b-c")])
        );

        let mut empty_image = nodes();
        empty_image[1].image_url = Some(String::new());
        assert_ne!(
            Fingerprint::structural(&nodes(), &la),
            Fingerprint::structural(&empty_image, &la)
        );
    }

    #[test]
    fn guard_passes_once_per_distinct_fingerprint() {
        let n = nodes();
        let l = links_from_parents(&n);
        let mut guard = DiffGuard::new();
        assert!(guard.check(Fingerprint::compute(&input(&n, &l))));
        assert!(!guard.check(Fingerprint::compute(&input(&n, &l))));
        assert_eq!(guard.skipped(), 1);
        guard.invalidate();
        assert!(guard.check(Fingerprint::compute(&input(&n, &l))));
    }
}
