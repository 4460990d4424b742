// Copyright 2026 the Goalgraph Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The engine: props in, scene and host callbacks out.

use goalgraph_interaction::{
    Controller, Intent, Key, MenuAction, Mode, NodeCircle, PointerEvent, SceneQuery,
};
use goalgraph_layout::{Positions, Simulation, compute_positions};
use goalgraph_model::{
    DiffGuard, Fingerprint, FingerprintInput, GoalGraph, GoalId, GoalLink, GoalNode, GoalTree,
    GraphError, LayoutMode, NodeUpdate, ParentLookup,
};
use goalgraph_sync::{Inbound, Synchronizer};
use hashbrown::{HashMap, HashSet};
use kurbo::{Point, Size, Vec2};

use crate::host::GoalGraphHost;
use crate::props::{EngineConfig, Props};
use crate::scene::{EditOverlay, NodeFlags, Scene, SceneEdge, SceneNode, SceneRenderer};
use crate::viewport::Viewport;

/// What [`Engine::set_props`] did with a snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Update {
    /// Nothing relevant changed, or the snapshot predates a local edit.
    Skipped,
    /// The snapshot touches the node under an active drag or edit; it is
    /// applied when the session ends.
    Deferred,
    /// Applied without recomputing positions.
    Patched,
    /// Positions were recomputed.
    Rebuilt,
    /// There is no ROOT node; nothing is drawn.
    Empty,
}

/// Imperative requests from the owner.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViewSignal {
    /// Pan so the node is centered; `None` resets the view.
    CenterOn(Option<GoalId>),
}

/// Layout state the gesture controller reads.
#[derive(Debug, Default)]
struct View {
    graph: GoalGraph,
    tree: Option<GoalTree>,
    mode: LayoutMode,
    /// Layout positions, without the drag override.
    positions: Positions,
    /// Drawn discs in pre-order, with the drag override.
    circles: Vec<NodeCircle>,
}

impl ParentLookup for View {
    fn parent_of(&self, id: &GoalId) -> Option<&GoalId> {
        self.graph.parent_of(id)
    }

    fn contains(&self, id: &GoalId) -> bool {
        ParentLookup::contains(&self.graph, id)
    }
}

impl SceneQuery for View {
    fn circles(&self) -> &[NodeCircle] {
        &self.circles
    }

    fn layout_position(&self, id: &GoalId) -> Option<Point> {
        self.positions.get(id).copied()
    }

    fn is_root(&self, id: &GoalId) -> bool {
        self.graph.get(id).is_some_and(GoalNode::is_root)
    }

    fn label(&self, id: &GoalId) -> Option<&str> {
        self.graph.get(id).map(|n| n.text.as_str())
    }

    fn has_children(&self, id: &GoalId) -> bool {
        self.graph.children_of(id).next().is_some()
    }

    fn pins_on_drop(&self) -> bool {
        self.mode == LayoutMode::Force
    }

    fn node_count(&self) -> usize {
        self.graph.len()
    }
}

/// Interactive goal graph view.
///
/// The engine keeps an optimistic copy of the owner's graph. Gestures edit
/// the copy, report the change to the [`GoalGraphHost`], and the owner's
/// next snapshot is reconciled so its echo neither re-applies nor undoes
/// the edit.
///
/// Time is supplied by the caller in milliseconds. Drive [`tick`](Self::tick)
/// from an animation loop for the force layout and long presses.
///
/// ```
/// use goalgraph::{Engine, EngineConfig, GoalNode, HostCall, Props, Update, links_from_parents};
/// use kurbo::Size;
///
/// let nodes = vec![GoalNode::root("r", "Ship it"), GoalNode::sub("a", "r", "Write docs")];
/// let props = Props::new(nodes.clone(), links_from_parents(&nodes), Size::new(800.0, 600.0));
///
/// let mut host: Vec<HostCall> = Vec::new();
/// let mut engine = Engine::new(EngineConfig::default());
/// assert_eq!(engine.set_props(&props, 0, &mut host), Update::Rebuilt);
/// assert_eq!(engine.set_props(&props, 16, &mut host), Update::Skipped);
/// assert_eq!(engine.scene().nodes.len(), 2);
/// ```
#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    view: View,
    controller: Controller,
    guard: DiffGuard,
    sync: Synchronizer,
    simulation: Option<Simulation>,
    viewport: Viewport,
    size: Size,
    managed_mode: LayoutMode,
    forced_mode: Option<LayoutMode>,
    selected: Option<GoalId>,
    loading: HashSet<GoalId>,
    drag: Option<(GoalId, Point)>,
    drop_highlight: Option<GoalId>,
    pins: HashMap<GoalId, Point>,
    deferred: Option<(Vec<GoalNode>, Vec<GoalLink>)>,
    /// `editing` from the last props that got through.
    requested_edit: Option<GoalId>,
    layout_runs: u64,
}

impl Engine {
    /// An engine with nothing loaded.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            view: View::default(),
            controller: Controller::new(config.interaction.clone()),
            guard: DiffGuard::new(),
            sync: Synchronizer::new(config.sync.clone()),
            simulation: None,
            viewport: Viewport::new(config.min_zoom, config.max_zoom),
            size: Size::ZERO,
            managed_mode: LayoutMode::default(),
            forced_mode: None,
            selected: None,
            loading: HashSet::new(),
            drag: None,
            drop_highlight: None,
            pins: HashMap::new(),
            deferred: None,
            requested_edit: None,
            layout_runs: 0,
            config,
        }
    }

    /// Configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The layout mode in effect: the forced one if props set it.
    pub fn layout_mode(&self) -> LayoutMode {
        self.forced_mode.unwrap_or(self.managed_mode)
    }

    /// How many times positions were computed from scratch or re-simulated.
    pub fn layout_runs(&self) -> u64 {
        self.layout_runs
    }

    /// The local, optimistically edited graph.
    pub fn graph(&self) -> &GoalGraph {
        &self.view.graph
    }

    /// The built tree, if the graph has a ROOT.
    pub fn tree(&self) -> Option<&GoalTree> {
        self.view.tree.as_ref()
    }

    /// Layout positions, without any drag override.
    pub fn positions(&self) -> &Positions {
        &self.view.positions
    }

    /// Where `id` is drawn, in world space.
    pub fn position(&self, id: &GoalId) -> Option<Point> {
        self.view
            .circles
            .iter()
            .find(|c| &c.id == id)
            .map(|c| c.center)
    }

    /// Selected node.
    pub fn selected(&self) -> Option<&GoalId> {
        self.selected.as_ref()
    }

    /// Gesture state.
    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    /// Camera.
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Viewport size.
    pub fn size(&self) -> Size {
        self.size
    }

    /// The running force simulation.
    pub fn simulation(&self) -> Option<&Simulation> {
        self.simulation.as_ref()
    }

    /// Take a new snapshot from the owner.
    ///
    /// Identical snapshots are skipped. Structural changes rebuild the tree
    /// and recompute positions; label, status and selection changes only
    /// refresh the scene. The echo of a local edit is recognized and not
    /// re-applied.
    pub fn set_props<H: GoalGraphHost + ?Sized>(
        &mut self,
        props: &Props,
        now: u64,
        host: &mut H,
    ) -> Update {
        self.loading.clone_from(&props.loading);
        self.forced_mode = props.layout_mode;
        self.resize(props.size);

        let mode = self.layout_mode();
        let fingerprint = Fingerprint::compute(&FingerprintInput {
            nodes: &props.nodes,
            links: &props.links,
            selected: props.selected.as_ref(),
            editing: props.editing.as_ref(),
            mode,
        });
        if !self.guard.check(fingerprint) {
            return Update::Skipped;
        }

        let mode_changed = mode != self.view.mode;
        if mode_changed {
            self.switch_mode(mode);
        }
        let update = self.reconcile(&props.nodes, &props.links, now, mode_changed);
        tracing::debug!(?update, nodes = props.nodes.len(), "props applied");
        if update == Update::Skipped {
            return update;
        }

        self.selected.clone_from(&props.selected);
        // Only a new request opens the editor; the echo of a committed edit
        // still carries the old one.
        if props.editing != self.requested_edit {
            self.requested_edit.clone_from(&props.editing);
            if let Some(id) = &props.editing {
                if self.controller.session_node() != Some(id) {
                    let intents = self.controller.begin_edit(&self.view, id);
                    self.apply(intents, now, host);
                }
            }
        }
        update
    }

    /// Choose the layout mode. Ignored (returns `false`) while props force a
    /// mode; otherwise switching drops cached positions and pins and resets
    /// the viewport.
    pub fn set_layout_mode(&mut self, mode: LayoutMode) -> bool {
        if self.forced_mode.is_some() {
            tracing::debug!(requested = mode.as_str(), "layout mode is forced by props");
            return false;
        }
        self.managed_mode = mode;
        if mode == self.view.mode {
            return false;
        }
        self.switch_mode(mode);
        self.relayout();
        true
    }

    /// The viewport changed size. Deterministic layouts are recomputed; the
    /// force layout is re-centered and reheated.
    pub fn resize(&mut self, size: Size) {
        if size == self.size {
            return;
        }
        self.size = size;
        if let Some(sim) = &mut self.simulation {
            sim.recenter(Point::new(size.width * 0.5, size.height * 0.5));
        } else if self.view.tree.is_some() {
            self.relayout();
        }
    }

    /// Advance the force simulation and gesture timers by one frame.
    ///
    /// Returns `true` while something is still changing.
    pub fn tick<H: GoalGraphHost + ?Sized>(&mut self, now: u64, host: &mut H) -> bool {
        let intents = self.controller.poll(&self.view, now);
        let mut active = !intents.is_empty();
        self.apply(intents, now, host);
        if let Some(sim) = &mut self.simulation {
            if sim.tick() {
                self.view.positions = sim.positions();
                self.refresh_circles();
                active = true;
            }
        }
        active
    }

    /// Pointer pressed, in screen space.
    pub fn pointer_down<H: GoalGraphHost + ?Sized>(&mut self, event: PointerEvent, host: &mut H) {
        let event = self.to_world(event);
        let intents = self.controller.pointer_down(&self.view, event);
        self.apply(intents, event.time, host);
    }

    /// Pointer moved, in screen space.
    pub fn pointer_move<H: GoalGraphHost + ?Sized>(
        &mut self,
        position: Point,
        now: u64,
        host: &mut H,
    ) {
        let world = self.viewport.screen_to_world(position);
        let intents = self.controller.pointer_move(&self.view, world);
        self.apply(intents, now, host);
    }

    /// Pointer released, in screen space.
    pub fn pointer_up<H: GoalGraphHost + ?Sized>(&mut self, event: PointerEvent, host: &mut H) {
        let event = self.to_world(event);
        let intents = self.controller.pointer_up(&self.view, event);
        self.apply(intents, event.time, host);
    }

    /// Pointer left the canvas.
    pub fn pointer_leave<H: GoalGraphHost + ?Sized>(&mut self, now: u64, host: &mut H) {
        let intents = self.controller.pointer_leave(&self.view);
        self.apply(intents, now, host);
    }

    /// Key pressed in the inline editor or on the canvas.
    pub fn key<H: GoalGraphHost + ?Sized>(
        &mut self,
        key: Key,
        composing: bool,
        now: u64,
        host: &mut H,
    ) {
        let intents = self.controller.key(key, composing);
        self.apply(intents, now, host);
    }

    /// Inline editor contents changed.
    pub fn text_input(&mut self, text: &str) {
        self.controller.text_input(text);
    }

    /// Inline editor lost focus.
    pub fn blur<H: GoalGraphHost + ?Sized>(&mut self, now: u64, host: &mut H) {
        let intents = self.controller.blur();
        self.apply(intents, now, host);
    }

    /// Open the inline editor on `id`.
    pub fn begin_edit<H: GoalGraphHost + ?Sized>(&mut self, id: &GoalId, now: u64, host: &mut H) {
        let intents = self.controller.begin_edit(&self.view, id);
        self.apply(intents, now, host);
    }

    /// Choose an entry of the open context menu.
    pub fn menu_select<H: GoalGraphHost + ?Sized>(
        &mut self,
        action: MenuAction,
        now: u64,
        host: &mut H,
    ) {
        let intents = self.controller.menu_select(&self.view, action);
        self.apply(intents, now, host);
    }

    /// Dismiss the context menu.
    pub fn close_menu(&mut self) {
        self.controller.close_menu();
    }

    /// Pan the view by `delta` screen units.
    pub fn pan(&mut self, delta: Vec2) {
        self.viewport.pan(delta);
    }

    /// Zoom around a screen point.
    pub fn zoom_at(&mut self, anchor: Point, factor: f64) {
        self.viewport.zoom_at(anchor, factor);
    }

    /// Center the view on a node, or reset it for `None`.
    pub fn center_on(&mut self, id: Option<&GoalId>) {
        let Some(id) = id else {
            self.viewport.reset();
            return;
        };
        match self.position(id) {
            Some(at) => self.viewport.center_on(at, self.size),
            None => tracing::debug!(node = %id, "cannot center on a node that is not drawn"),
        }
    }

    /// Handle an imperative request from the owner.
    pub fn signal(&mut self, signal: &ViewSignal) {
        match signal {
            ViewSignal::CenterOn(id) => self.center_on(id.as_ref()),
        }
    }

    /// Snapshot of everything to draw.
    pub fn scene(&self) -> Scene {
        let mut scene = Scene {
            transform: self.viewport.transform(),
            size: self.size,
            menu: self.controller.menu().cloned(),
            ..Scene::default()
        };
        let Some(tree) = &self.view.tree else {
            return scene;
        };
        let centers: HashMap<&GoalId, Point> = self
            .view
            .circles
            .iter()
            .map(|c| (&c.id, c.center))
            .collect();
        let editing = self.controller.edit_session();

        for circle in &self.view.circles {
            let (Some(idx), Some(node)) = (tree.index_of(&circle.id), self.view.graph.get(&circle.id))
            else {
                continue;
            };
            let entry = &tree.entries()[idx];
            let mut flags = NodeFlags::empty();
            flags.set(NodeFlags::ROOT, node.is_root());
            flags.set(NodeFlags::SELECTED, self.selected.as_ref() == Some(&node.id));
            flags.set(NodeFlags::EDITING, editing.is_some_and(|s| s.node() == &node.id));
            flags.set(NodeFlags::DROP_TARGET, self.drop_highlight.as_ref() == Some(&node.id));
            flags.set(
                NodeFlags::DRAGGING,
                self.drag.as_ref().is_some_and(|(id, _)| id == &node.id),
            );
            flags.set(NodeFlags::LOADING, self.loading.contains(&node.id));
            flags.set(NodeFlags::COLLAPSED, node.collapsed);
            flags.set(NodeFlags::PINNED, self.pins.contains_key(&node.id));

            if let Some(parent) = entry.parent.and_then(|p| tree.entry(p)) {
                if let Some(&from) = centers.get(&parent.id) {
                    scene.edges.push(SceneEdge::curved(
                        parent.id.clone(),
                        node.id.clone(),
                        from,
                        circle.center,
                        self.config.edge_curvature,
                    ));
                }
            }
            scene.nodes.push(SceneNode {
                id: node.id.clone(),
                label: node.text.clone(),
                status: node.status,
                progress: node.progress,
                depth: entry.depth,
                center: circle.center,
                radius: circle.radius,
                flags,
                image_url: node.image_url.clone(),
                hidden_descendants: tree.hidden_descendants(idx),
            });
        }

        // The overlay follows its node, which matters while the force layout moves.
        scene.edit = editing.map(|session| {
            let anchor = self
                .view
                .circles
                .iter()
                .find(|c| &c.id == session.node())
                .map_or(session.anchor(), |c| {
                    c.center + Vec2::new(0.0, c.radius + self.config.interaction.edit_gap)
                });
            EditOverlay {
                node: session.node().clone(),
                anchor,
                text: session.text().to_owned(),
            }
        });
        scene
    }

    /// Draw the current scene.
    pub fn render<R: SceneRenderer + ?Sized>(&self, renderer: &mut R) {
        renderer.render(&self.scene());
    }

    fn to_world(&self, event: PointerEvent) -> PointerEvent {
        PointerEvent {
            position: self.viewport.screen_to_world(event.position),
            ..event
        }
    }

    /// Reconcile an inbound snapshot with the local graph.
    fn reconcile(
        &mut self,
        nodes: &[GoalNode],
        links: &[GoalLink],
        now: u64,
        relayout: bool,
    ) -> Update {
        let session = self.controller.session_node().cloned();
        let inbound = self
            .sync
            .inbound(&self.view.graph, nodes, links, now, session.as_ref());
        if matches!(inbound, Inbound::Unchanged | Inbound::Echo | Inbound::Apply(_)) {
            // Anything held back is superseded by this snapshot.
            self.deferred = None;
        }
        let needs_layout = match inbound {
            Inbound::Unchanged => false,
            Inbound::Echo => {
                // While later local edits are in flight the local graph is ahead.
                if self.sync.pending().is_empty() {
                    self.view.graph = GoalGraph::new(nodes.to_vec(), links.to_vec());
                }
                false
            }
            Inbound::Stale => {
                // Let the same snapshot through again once the window has passed.
                self.guard.invalidate();
                if relayout {
                    self.rebuild();
                }
                return Update::Skipped;
            }
            Inbound::Deferred => {
                self.deferred = Some((nodes.to_vec(), links.to_vec()));
                self.guard.invalidate();
                if relayout {
                    self.rebuild();
                }
                return Update::Deferred;
            }
            Inbound::Apply(patch) => {
                self.view.graph = GoalGraph::new(nodes.to_vec(), links.to_vec());
                for id in &patch.removed {
                    self.pins.remove(id);
                }
                if self
                    .selected
                    .as_ref()
                    .is_some_and(|s| self.view.graph.get(s).is_none())
                {
                    self.selected = None;
                }
                patch.needs_layout()
            }
        };

        if needs_layout || relayout || self.view.tree.is_none() {
            self.rebuild();
            if self.view.tree.is_some() {
                Update::Rebuilt
            } else {
                Update::Empty
            }
        } else {
            self.refresh_circles();
            Update::Patched
        }
    }

    /// Apply a snapshot held back during a drag or edit.
    fn replay_deferred(&mut self, now: u64) {
        let Some((nodes, links)) = self.deferred.take() else {
            return;
        };
        self.sync.take_deferred();
        tracing::debug!("session ended; replaying deferred snapshot");
        self.reconcile(&nodes, &links, now, false);
    }

    fn switch_mode(&mut self, mode: LayoutMode) {
        tracing::debug!(from = self.view.mode.as_str(), to = mode.as_str(), "layout mode switched");
        self.view.mode = mode;
        self.view.positions.clear();
        self.simulation = None;
        self.pins.clear();
        self.drag = None;
        self.viewport.reset();
    }

    /// Rebuild the tree from the local graph and lay it out.
    fn rebuild(&mut self) {
        self.view.tree = GoalTree::build(self.view.graph.nodes(), self.view.graph.links());
        if self.view.tree.is_none() {
            if !self.view.graph.is_empty() {
                tracing::warn!(nodes = self.view.graph.len(), "no ROOT node; nothing to draw");
            }
            self.view.positions.clear();
            self.view.circles.clear();
            self.simulation = None;
            return;
        }
        self.relayout();
    }

    fn relayout(&mut self) {
        let Some(tree) = &self.view.tree else {
            return;
        };
        let positions = if self.view.mode == LayoutMode::Force {
            let cached = (!self.view.positions.is_empty()).then_some(&self.view.positions);
            let mut sim = Simulation::new(tree, self.size, &self.config.layout, cached);
            for (id, at) in self.pins.iter().chain(self.drag.as_ref().map(|(id, at)| (id, at))) {
                sim.pin(id, *at);
            }
            sim.warm_up();
            let positions = sim.positions();
            self.simulation = Some(sim);
            positions
        } else {
            compute_positions(tree, self.view.mode, self.size, &self.config.layout)
        };
        self.view.positions = positions;
        self.layout_runs += 1;
        self.refresh_circles();
    }

    fn refresh_circles(&mut self) {
        self.view.circles.clear();
        let Some(tree) = &self.view.tree else {
            return;
        };
        for idx in tree.visible() {
            let entry = &tree.entries()[idx];
            let Some(&laid_out) = self.view.positions.get(&entry.id) else {
                continue;
            };
            let center = match &self.drag {
                Some((id, at)) if *id == entry.id => *at,
                _ => laid_out,
            };
            let radius = self.config.layout.radius_for_depth(entry.depth);
            self.view
                .circles
                .push(NodeCircle::new(entry.id.clone(), center, radius));
        }
    }

    /// Apply an edit to the local graph and record it as outbound.
    fn commit_local<T>(
        &mut self,
        now: u64,
        edit: impl FnOnce(&mut GoalGraph) -> Result<T, GraphError>,
    ) -> Option<T> {
        let previous = Fingerprint::structural(self.view.graph.nodes(), self.view.graph.links());
        match edit(&mut self.view.graph) {
            Ok(value) => {
                let expected =
                    Fingerprint::structural(self.view.graph.nodes(), self.view.graph.links());
                self.sync.record_outbound(previous, expected, now);
                // The owner may answer with a snapshot equal to the last props.
                self.guard.invalidate();
                Some(value)
            }
            Err(err) => {
                tracing::warn!(%err, "local edit rejected");
                None
            }
        }
    }

    fn apply<H: GoalGraphHost + ?Sized>(&mut self, intents: Vec<Intent>, now: u64, host: &mut H) {
        for intent in intents {
            self.handle(intent, now, host);
        }
        if self.controller.mode() != Mode::Editing && self.controller.mode() != Mode::Dragging {
            self.replay_deferred(now);
        }
    }

    fn handle<H: GoalGraphHost + ?Sized>(&mut self, intent: Intent, now: u64, host: &mut H) {
        tracing::trace!(?intent, "intent");
        match intent {
            Intent::Select(id) => {
                if let Some(node) = self.view.graph.get(&id) {
                    host.on_node_click(node);
                }
                self.selected = Some(id);
            }
            Intent::ClearSelection => {
                if self.selected.take().is_some() {
                    host.on_selection_cleared();
                }
            }
            // Menu and editor state live in the controller and are read by `scene`.
            Intent::OpenMenu(_)
            | Intent::CloseMenu
            | Intent::BeginEdit { .. }
            | Intent::EndEdit
            | Intent::RestoreText(_) => {}
            Intent::UpdateText { node, text } => {
                let update = NodeUpdate::text(text);
                if self
                    .commit_local(now, |g| g.apply_update(&node, &update))
                    .is_some()
                {
                    host.on_update_node(&node, &update);
                }
            }
            Intent::Delete(node) => {
                if let Some(removed) = self.commit_local(now, |g| g.apply_delete(&node)) {
                    if self.selected.as_ref().is_some_and(|s| removed.contains(s)) {
                        self.selected = None;
                    }
                    for id in &removed {
                        self.pins.remove(id);
                    }
                    host.on_delete_node(&node);
                    self.rebuild();
                }
            }
            Intent::Reparent { child, parent } => {
                self.drag = None;
                self.pins.remove(&child);
                if let Some(sim) = &mut self.simulation {
                    sim.unpin(&child);
                }
                if self
                    .commit_local(now, |g| g.apply_reparent(&child, &parent))
                    .is_some()
                {
                    host.on_reparent_node(&child, &parent);
                    self.rebuild();
                } else {
                    self.refresh_circles();
                }
            }
            Intent::AddChild { parent } => host.on_add_sub_node(&parent, None),
            Intent::CycleStatus(node) => {
                let Some(status) = self.view.graph.get(&node).map(|n| n.status.cycled()) else {
                    return;
                };
                let update = NodeUpdate::status(status);
                if self
                    .commit_local(now, |g| g.apply_update(&node, &update))
                    .is_some()
                {
                    host.on_update_node(&node, &update);
                }
            }
            Intent::ToggleCollapse(node) => {
                let Some(collapsed) = self.view.graph.get(&node).map(|n| !n.collapsed) else {
                    return;
                };
                let update = NodeUpdate::collapsed(collapsed);
                if self
                    .commit_local(now, |g| g.apply_update(&node, &update))
                    .is_some()
                {
                    host.on_update_node(&node, &update);
                    self.rebuild();
                }
            }
            Intent::ConvertToTask(node) => host.on_convert_node_to_task(&node),
            Intent::GenerateImage(node) => host.on_generate_image(&node),
            Intent::DragTo { node, position } => {
                if let Some(sim) = &mut self.simulation {
                    sim.pin(&node, position);
                    sim.reheat();
                }
                self.drag = Some((node, position));
                self.refresh_circles();
            }
            Intent::HighlightDropTarget(target) => self.drop_highlight = target,
            Intent::SnapBack { node, .. } => {
                self.drag = None;
                if let Some(sim) = &mut self.simulation {
                    sim.unpin(&node);
                }
                self.refresh_circles();
            }
            Intent::Pin { node, position } => {
                self.drag = None;
                if let Some(sim) = &mut self.simulation {
                    sim.pin(&node, position);
                }
                self.pins.insert(node.clone(), position);
                self.view.positions.insert(node, position);
                self.refresh_circles();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::HostCall;
    use goalgraph_interaction::PointerButton;
    use goalgraph_model::{GoalStatus, links_from_parents};

    const SIZE: Size = Size::new(800.0, 600.0);

    fn id(s: &str) -> GoalId {
        GoalId::from(s)
    }

    fn nodes() -> Vec<GoalNode> {
        vec![
            GoalNode::root("r", "Root"),
            GoalNode::sub("a", "r", "A"),
            GoalNode::sub("b", "r", "B"),
            GoalNode::sub("a1", "a", "A1"),
            GoalNode::sub("a2", "a", "A2"),
        ]
    }

    fn props(nodes: Vec<GoalNode>) -> Props {
        let links = links_from_parents(&nodes);
        Props::new(nodes, links, SIZE)
    }

    fn loaded(p: &Props) -> (Engine, Vec<HostCall>) {
        let mut host = Vec::new();
        let mut engine = Engine::new(EngineConfig::default());
        assert_eq!(engine.set_props(p, 0, &mut host), Update::Rebuilt);
        (engine, host)
    }

    fn at(engine: &Engine, s: &str) -> Point {
        engine.position(&id(s)).expect("node is drawn")
    }

    fn click(engine: &mut Engine, host: &mut Vec<HostCall>, p: Point, t: u64) {
        engine.pointer_down(PointerEvent::primary(p, t), host);
        engine.pointer_up(PointerEvent::primary(p, t + 10), host);
    }

    #[test]
    fn identical_props_skip_the_rebuild() {
        let p = props(nodes());
        let (mut engine, mut host) = loaded(&p);
        assert_eq!(engine.layout_runs(), 1);
        assert_eq!(engine.set_props(&p.clone(), 16, &mut host), Update::Skipped);
        assert_eq!(engine.layout_runs(), 1);
        assert_eq!(engine.scene().nodes.len(), 5);
    }

    #[test]
    fn label_change_patches_without_layout() {
        let p = props(nodes());
        let (mut engine, mut host) = loaded(&p);
        let before = at(&engine, "b");
        let mut n = nodes();
        n[2].text = "B renamed".into();
        assert_eq!(engine.set_props(&props(n), 50, &mut host), Update::Patched);
        assert_eq!(engine.layout_runs(), 1);
        assert_eq!(at(&engine, "b"), before);
        let scene = engine.scene();
        assert_eq!(scene.node(&id("b")).map(|n| n.label.as_str()), Some("B renamed"));
    }

    #[test]
    fn structural_change_rebuilds() {
        let p = props(nodes());
        let (mut engine, mut host) = loaded(&p);
        let mut n = nodes();
        n.push(GoalNode::sub("b1", "b", "B1"));
        assert_eq!(engine.set_props(&props(n), 50, &mut host), Update::Rebuilt);
        assert_eq!(engine.layout_runs(), 2);
        assert!(engine.position(&id("b1")).is_some());
    }

    #[test]
    fn sibling_reorder_relayouts() {
        let p = props(nodes());
        let (mut engine, mut host) = loaded(&p);
        let first = at(&engine, "a");

        let mut n = nodes();
        n.swap(1, 2);
        assert_eq!(engine.set_props(&props(n), 16, &mut host), Update::Rebuilt);
        assert_eq!(engine.layout_runs(), 2);
        assert!(at(&engine, "b").distance(first) < 1e-9);
    }

    #[test]
    fn no_root_draws_nothing() {
        let p = props(vec![GoalNode::sub("a", "x", "Orphan")]);
        let mut host = Vec::new();
        let mut engine = Engine::new(EngineConfig::default());
        assert_eq!(engine.set_props(&p, 0, &mut host), Update::Empty);
        assert!(engine.scene().is_empty());
        assert!(engine.tree().is_none());
    }

    #[test]
    fn click_selects_and_reports() {
        let p = props(nodes());
        let (mut engine, mut host) = loaded(&p);
        let b = at(&engine, "b");
        click(&mut engine, &mut host, b, 100);
        assert_eq!(host, [HostCall::NodeClick(id("b"))]);
        assert_eq!(engine.selected(), Some(&id("b")));
        let scene = engine.scene();
        assert!(scene.node(&id("b")).is_some_and(|n| n.flags.contains(NodeFlags::SELECTED)));

        click(&mut engine, &mut host, Point::new(-4_000.0, -4_000.0), 1_000);
        assert_eq!(host.last(), Some(&HostCall::SelectionCleared));
        assert!(engine.selected().is_none());
    }

    #[test]
    fn collapse_hides_descendants_but_keeps_data() {
        let p = props(nodes());
        let (mut engine, mut host) = loaded(&p);
        let a = at(&engine, "a");
        engine.pointer_down(PointerEvent::secondary(a, 100), &mut host);
        assert!(engine.controller().menu().is_some());
        engine.menu_select(MenuAction::ToggleCollapse, 120, &mut host);

        assert!(host.contains(&HostCall::UpdateNode(id("a"), NodeUpdate::collapsed(true))));
        assert_eq!(engine.graph().len(), 5);
        assert_eq!(p.nodes.len(), 5);
        let scene = engine.scene();
        assert_eq!(scene.nodes.len(), 3);
        let a = scene.node(&id("a")).expect("collapsed node stays visible");
        assert_eq!(a.hidden_descendants, 2);
        assert!(a.flags.contains(NodeFlags::COLLAPSED));
        assert!(scene.node(&id("a1")).is_none());
    }

    #[test]
    fn drop_on_empty_canvas_restores_layout_position() {
        let p = props(nodes()).with_layout_mode(LayoutMode::VerticalTree);
        let (mut engine, mut host) = loaded(&p);
        let leaf = at(&engine, "a2");
        let laid_out = engine.positions()[&id("a2")];
        assert_eq!(leaf, laid_out);

        let far = Point::new(leaf.x + 2_000.0, leaf.y + 2_000.0);
        engine.pointer_down(PointerEvent::primary(leaf, 100), &mut host);
        engine.pointer_move(Point::new(leaf.x + 30.0, leaf.y), 110, &mut host);
        engine.pointer_move(far, 120, &mut host);
        assert_eq!(at(&engine, "a2"), far);
        assert!(engine.scene().node(&id("a2")).is_some_and(|n| n.flags.contains(NodeFlags::DRAGGING)));

        engine.pointer_up(PointerEvent::primary(far, 130), &mut host);
        assert_eq!(at(&engine, "a2"), laid_out);
        assert!(host.is_empty());
        assert_eq!(engine.layout_runs(), 1);
    }

    #[test]
    fn drop_on_node_reparents_and_relayouts() {
        let p = props(nodes()).with_layout_mode(LayoutMode::VerticalTree);
        let (mut engine, mut host) = loaded(&p);
        let from = at(&engine, "a2");
        let onto = at(&engine, "b");
        engine.pointer_down(PointerEvent::primary(from, 100), &mut host);
        engine.pointer_move(Point::new(from.x + 30.0, from.y), 110, &mut host);
        engine.pointer_move(onto, 120, &mut host);
        assert!(engine.scene().node(&id("b")).is_some_and(|n| n.flags.contains(NodeFlags::DROP_TARGET)));
        engine.pointer_up(PointerEvent::primary(onto, 130), &mut host);

        assert_eq!(host, [HostCall::ReparentNode(id("a2"), id("b"))]);
        assert_eq!(engine.graph().parent_of(&id("a2")), Some(&id("b")));
        assert_eq!(engine.layout_runs(), 2);

        // The owner's echo is recognized and not laid out again.
        let mut n = nodes();
        n[4].parent_id = Some(id("b"));
        assert_eq!(engine.set_props(&props(n).with_layout_mode(LayoutMode::VerticalTree), 200, &mut host), Update::Patched);
        assert_eq!(engine.layout_runs(), 2);
    }

    #[test]
    fn drop_on_own_descendant_snaps_back() {
        let p = props(nodes()).with_layout_mode(LayoutMode::HorizontalTree);
        let (mut engine, mut host) = loaded(&p);
        let from = at(&engine, "a");
        let onto = at(&engine, "a1");
        engine.pointer_down(PointerEvent::primary(from, 100), &mut host);
        engine.pointer_move(Point::new(from.x + 30.0, from.y), 110, &mut host);
        engine.pointer_move(onto, 120, &mut host);
        engine.pointer_up(PointerEvent::primary(onto, 130), &mut host);
        assert!(host.is_empty());
        assert_eq!(engine.graph().parent_of(&id("a")), Some(&id("r")));
        assert_eq!(at(&engine, "a"), from);
    }

    #[test]
    fn clearing_a_label_deletes_the_node() {
        let p = props(nodes());
        let (mut engine, mut host) = loaded(&p);
        let b = at(&engine, "b");
        click(&mut engine, &mut host, b, 100);
        click(&mut engine, &mut host, b, 200);
        assert_eq!(engine.controller().mode(), Mode::Editing);
        assert!(engine.scene().edit.is_some());

        engine.text_input("   ");
        engine.key(Key::Enter, false, 300, &mut host);
        assert!(host.contains(&HostCall::DeleteNode(id("b"))));
        assert!(!host.iter().any(|c| matches!(c, HostCall::UpdateNode(..))));
        assert!(engine.graph().get(&id("b")).is_none());
        assert!(engine.selected().is_none());
        assert!(engine.scene().node(&id("b")).is_none());
    }

    #[test]
    fn rename_echo_and_stale_snapshot_do_not_bounce() {
        let p = props(nodes());
        let (mut engine, mut host) = loaded(&p);
        engine.begin_edit(&id("a"), 100, &mut host);
        engine.text_input("  Renamed ");
        engine.blur(200, &mut host);
        assert_eq!(
            host,
            [HostCall::UpdateNode(id("a"), NodeUpdate::text("Renamed"))]
        );

        // The owner re-sends its old state before processing the edit.
        assert_eq!(engine.set_props(&p, 250, &mut host), Update::Skipped);
        assert_eq!(engine.graph().get(&id("a")).map(|n| n.text.as_str()), Some("Renamed"));

        let mut n = nodes();
        n[1].text = "Renamed".into();
        assert_eq!(engine.set_props(&props(n), 320, &mut host), Update::Patched);
        assert_eq!(engine.graph().get(&id("a")).map(|n| n.text.as_str()), Some("Renamed"));
        assert_eq!(engine.layout_runs(), 1);
    }

    #[test]
    fn changes_to_the_edited_node_wait_for_the_session() {
        let p = props(nodes());
        let (mut engine, mut host) = loaded(&p);
        engine.begin_edit(&id("b"), 100, &mut host);

        let mut n = nodes();
        n[2].text = "B from elsewhere".into();
        assert_eq!(engine.set_props(&props(n), 150, &mut host), Update::Deferred);
        assert_eq!(engine.graph().get(&id("b")).map(|n| n.text.as_str()), Some("B"));

        engine.key(Key::Escape, false, 200, &mut host);
        assert_eq!(
            engine.graph().get(&id("b")).map(|n| n.text.as_str()),
            Some("B from elsewhere")
        );
        assert!(host.is_empty());
    }

    #[test]
    fn props_can_open_the_editor() {
        let p = props(nodes()).with_editing("a1");
        let (engine, _) = loaded(&p);
        assert_eq!(engine.controller().session_node(), Some(&id("a1")));
        let scene = engine.scene();
        let overlay = scene.edit.as_ref().expect("editor is open");
        let a1 = scene.node(&id("a1")).expect("node is drawn");
        assert_eq!(overlay.text, "A1");
        assert_eq!(overlay.anchor, a1.center + Vec2::new(0.0, a1.radius + 12.0));
        assert!(a1.flags.contains(NodeFlags::EDITING));
    }

    #[test]
    fn committed_edit_does_not_reopen_from_props() {
        let p = props(nodes()).with_editing("a1");
        let (mut engine, mut host) = loaded(&p);
        engine.text_input("New");
        engine.key(Key::Enter, false, 100, &mut host);
        assert_eq!(host, [HostCall::UpdateNode(id("a1"), NodeUpdate::text("New"))]);
        assert_eq!(engine.controller().mode(), Mode::Idle);

        // The owner echoes the rename without clearing its editing field.
        let mut n = nodes();
        n[3].text = "New".into();
        let echo = props(n.clone()).with_editing("a1");
        assert_eq!(engine.set_props(&echo, 150, &mut host), Update::Patched);
        assert_eq!(engine.controller().mode(), Mode::Idle);
        assert!(engine.scene().edit.is_none());

        // Clearing and then setting it again is a new request.
        engine.set_props(&props(n.clone()), 200, &mut host);
        engine.set_props(&props(n).with_editing("a1"), 250, &mut host);
        assert_eq!(engine.controller().session_node(), Some(&id("a1")));
    }

    #[test]
    fn newer_snapshot_replaces_a_deferred_one() {
        let p = props(nodes());
        let (mut engine, mut host) = loaded(&p);
        engine.begin_edit(&id("b"), 100, &mut host);

        let mut held = nodes();
        held[2].text = "B old remote".into();
        assert_eq!(engine.set_props(&props(held), 150, &mut host), Update::Deferred);

        // A later snapshot that leaves the edited node alone applies at once.
        let mut newer = nodes();
        newer.push(GoalNode::sub("c", "r", "C"));
        let newer = props(newer);
        assert_eq!(engine.set_props(&newer, 200, &mut host), Update::Rebuilt);

        engine.key(Key::Escape, false, 250, &mut host);
        assert!(engine.graph().get(&id("c")).is_some());
        assert_eq!(engine.graph().get(&id("b")).map(|n| n.text.as_str()), Some("B"));
        assert_eq!(engine.set_props(&newer, 300, &mut host), Update::Skipped);
        assert!(engine.graph().get(&id("c")).is_some());
    }

    #[test]
    fn successive_edits_survive_the_first_echo() {
        let p = props(nodes());
        let (mut engine, mut host) = loaded(&p);
        engine.begin_edit(&id("b"), 100, &mut host);
        engine.text_input("B renamed");
        engine.key(Key::Enter, false, 120, &mut host);
        let b = at(&engine, "b");
        engine.pointer_down(PointerEvent::secondary(b, 140), &mut host);
        engine.menu_select(MenuAction::CycleStatus, 150, &mut host);

        let text_and_status = |engine: &Engine| {
            engine
                .graph()
                .get(&id("b"))
                .map(|n| (n.text.clone(), n.status))
        };
        let both = Some(("B renamed".to_owned(), GoalStatus::Completed));
        assert_eq!(text_and_status(&engine), both);

        // The echo of the rename alone arrives first.
        let mut renamed = nodes();
        renamed[2].text = "B renamed".into();
        assert_eq!(engine.set_props(&props(renamed.clone()), 200, &mut host), Update::Patched);
        assert_eq!(text_and_status(&engine), both);

        let mut cycled = renamed;
        cycled[2].status = GoalStatus::Completed;
        assert_eq!(engine.set_props(&props(cycled), 260, &mut host), Update::Patched);
        assert_eq!(text_and_status(&engine), both);
        assert!(engine.sync.pending().is_empty());
        assert_eq!(engine.layout_runs(), 1);
    }

    #[test]
    fn menu_status_cycle_is_optimistic() {
        let p = props(nodes());
        let (mut engine, mut host) = loaded(&p);
        let b = at(&engine, "b");
        engine.pointer_down(PointerEvent::secondary(b, 100), &mut host);
        engine.menu_select(MenuAction::CycleStatus, 110, &mut host);
        assert_eq!(
            host,
            [
                HostCall::NodeClick(id("b")),
                HostCall::UpdateNode(id("b"), NodeUpdate::status(GoalStatus::Completed)),
            ]
        );
        assert_eq!(engine.graph().get(&id("b")).map(|n| n.status), Some(GoalStatus::Completed));
        assert!(engine.controller().menu().is_none());
    }

    #[test]
    fn add_child_waits_for_the_owner() {
        let p = props(nodes());
        let (mut engine, mut host) = loaded(&p);
        let r = at(&engine, "r");
        engine.pointer_down(
            PointerEvent {
                button: PointerButton::Secondary,
                ..PointerEvent::primary(r, 100)
            },
            &mut host,
        );
        engine.menu_select(MenuAction::AddChild, 110, &mut host);
        assert_eq!(host.last(), Some(&HostCall::AddSubNode(id("r"), None)));
        assert_eq!(engine.graph().len(), 5);
    }

    #[test]
    fn loading_updates_decorations_only() {
        let p = props(nodes());
        let (mut engine, mut host) = loaded(&p);
        let busy = p.clone().with_loading("b");
        assert_eq!(engine.set_props(&busy, 50, &mut host), Update::Skipped);
        assert!(engine.scene().node(&id("b")).is_some_and(|n| n.flags.contains(NodeFlags::LOADING)));
        assert_eq!(engine.layout_runs(), 1);
    }

    #[test]
    fn managed_mode_switch_resets_the_view() {
        let p = props(nodes());
        let (mut engine, _) = loaded(&p);
        engine.pan(Vec2::new(40.0, 40.0));
        assert!(engine.set_layout_mode(LayoutMode::VerticalTree));
        assert!(engine.viewport().is_identity());
        assert_eq!(engine.layout_mode(), LayoutMode::VerticalTree);
        assert_eq!(engine.layout_runs(), 2);
        assert!(!engine.set_layout_mode(LayoutMode::VerticalTree));
    }

    #[test]
    fn forced_mode_ignores_managed_switches() {
        let p = props(nodes()).with_layout_mode(LayoutMode::Force);
        let (mut engine, mut host) = loaded(&p);
        assert!(!engine.set_layout_mode(LayoutMode::Radial));
        assert_eq!(engine.layout_mode(), LayoutMode::Force);
        assert!(engine.simulation().is_some());

        let mut frames = 0;
        while engine.tick(frames * 16, &mut host) {
            frames += 1;
            assert!(frames < 2_000, "force layout never settled");
        }
        assert_eq!(engine.positions().len(), 5);
    }

    #[test]
    fn force_drop_pins_where_released() {
        let p = props(nodes()).with_layout_mode(LayoutMode::Force);
        let (mut engine, mut host) = loaded(&p);
        let from = at(&engine, "b");
        let far = Point::new(from.x + 3_000.0, from.y);
        engine.pointer_down(PointerEvent::primary(from, 100), &mut host);
        engine.pointer_move(Point::new(from.x + 30.0, from.y), 110, &mut host);
        engine.pointer_move(far, 120, &mut host);
        engine.pointer_up(PointerEvent::primary(far, 130), &mut host);

        assert_eq!(at(&engine, "b"), far);
        assert!(engine.simulation().is_some_and(|s| s.is_pinned(&id("b"))));
        engine.tick(200, &mut host);
        assert_eq!(at(&engine, "b"), far);
        assert!(engine.scene().node(&id("b")).is_some_and(|n| n.flags.contains(NodeFlags::PINNED)));
    }

    #[test]
    fn resize_recenters_deterministic_layouts() {
        let p = props(nodes());
        let (mut engine, mut host) = loaded(&p);
        assert_eq!(at(&engine, "r"), Point::new(400.0, 300.0));
        let mut bigger = p.clone();
        bigger.size = Size::new(1_000.0, 800.0);
        engine.set_props(&bigger, 50, &mut host);
        assert_eq!(at(&engine, "r"), Point::new(500.0, 400.0));
        assert_eq!(engine.layout_runs(), 2);
    }

    #[test]
    fn center_signal_moves_the_viewport() {
        let p = props(nodes());
        let (mut engine, mut host) = loaded(&p);
        let b = at(&engine, "b");
        engine.signal(&ViewSignal::CenterOn(Some(id("b"))));
        let on_screen = engine.viewport().world_to_screen(b);
        assert!((on_screen - Point::new(400.0, 300.0)).hypot() < 1e-9);

        // Screen clicks map through the viewport.
        click(&mut engine, &mut host, Point::new(400.0, 300.0), 100);
        assert_eq!(host, [HostCall::NodeClick(id("b"))]);

        engine.signal(&ViewSignal::CenterOn(None));
        assert!(engine.viewport().is_identity());
    }
}
