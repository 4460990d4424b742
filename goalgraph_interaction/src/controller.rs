// Copyright 2026 the Goalgraph Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The modal gesture controller.
//!
//! [`Controller`] is in exactly one of four modes: idle, pressed, dragging
//! or editing. A context menu may be open on top of the idle or pressed
//! mode. Every input returns the [`Intent`]s it produced; the controller never
//! mutates the graph or calls the host itself.

use core::mem;

use goalgraph_model::{GoalId, ParentLookup, validate_reparent};
use kurbo::{Point, Vec2};

use crate::config::InteractionConfig;
use crate::edit::{EditOutcome, EditSession};
use crate::hit::{NodeCircle, drop_target, hit_test};
use crate::menu::{ContextMenu, MenuAction};
use crate::press::{PointerKind, PressOutcome, PressState};

/// Pointer button.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerButton {
    /// Left mouse button, touch contact, pen tip.
    Primary,
    /// Right mouse button, pen barrel button.
    Secondary,
    /// Any other button.
    Auxiliary,
}

/// A pointer down or up, in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerEvent {
    /// Pointer position.
    pub position: Point,
    /// Button involved.
    pub button: PointerButton,
    /// Device.
    pub kind: PointerKind,
    /// Timestamp in milliseconds.
    pub time: u64,
}

impl PointerEvent {
    /// Primary mouse button event.
    pub fn primary(position: Point, time: u64) -> Self {
        Self {
            position,
            button: PointerButton::Primary,
            kind: PointerKind::Mouse,
            time,
        }
    }

    /// Secondary mouse button event.
    pub fn secondary(position: Point, time: u64) -> Self {
        Self {
            position,
            button: PointerButton::Secondary,
            kind: PointerKind::Mouse,
            time,
        }
    }

    /// Touch contact event.
    pub fn touch(position: Point, time: u64) -> Self {
        Self {
            position,
            button: PointerButton::Primary,
            kind: PointerKind::Touch,
            time,
        }
    }
}

/// Keys the controller reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    /// Commit the edit.
    Enter,
    /// Cancel the edit or close the menu.
    Escape,
}

/// What the controller needs to know about the rendered scene.
///
/// Parent lookups come from [`ParentLookup`] so re-parent validation walks
/// the same chain the model does.
pub trait SceneQuery: ParentLookup {
    /// Pickable discs of the visible nodes, in draw order.
    fn circles(&self) -> &[NodeCircle];

    /// Position computed by the active layout, ignoring drag overrides.
    fn layout_position(&self, id: &GoalId) -> Option<Point>;

    /// Whether `id` is the root.
    fn is_root(&self, id: &GoalId) -> bool;

    /// Current label of `id`.
    fn label(&self, id: &GoalId) -> Option<&str>;

    /// Whether `id` has children, visible or not.
    fn has_children(&self, id: &GoalId) -> bool;

    /// True when a node dropped on empty canvas stays where it was dropped
    /// (force layout) instead of returning to its layout position.
    fn pins_on_drop(&self) -> bool;

    /// Upper bound on ancestor chain length.
    fn node_count(&self) -> usize;
}

/// Something the owner of the controller should do.
#[derive(Clone, Debug, PartialEq)]
pub enum Intent {
    /// Select a node and report the click.
    Select(GoalId),
    /// Clear the selection.
    ClearSelection,
    /// Show a context menu.
    OpenMenu(ContextMenu),
    /// Hide the context menu.
    CloseMenu,
    /// Show the inline editor for a node.
    BeginEdit {
        /// Node being edited.
        node: GoalId,
        /// Top-center of the overlay.
        anchor: Point,
    },
    /// Hide the inline editor.
    EndEdit,
    /// Change a node's label.
    UpdateText {
        /// Node to relabel.
        node: GoalId,
        /// New label.
        text: String,
    },
    /// An edit was rejected; show the previous label again.
    RestoreText(GoalId),
    /// Delete a node and its subtree.
    Delete(GoalId),
    /// Move `child` under `parent`. Already checked for cycles.
    Reparent {
        /// Node being moved.
        child: GoalId,
        /// New parent.
        parent: GoalId,
    },
    /// Add a node under `parent`.
    AddChild {
        /// Parent of the new node.
        parent: GoalId,
    },
    /// Rotate a node's status.
    CycleStatus(GoalId),
    /// Collapse or expand a node.
    ToggleCollapse(GoalId),
    /// Host pass-through.
    ConvertToTask(GoalId),
    /// Host pass-through.
    GenerateImage(GoalId),
    /// Draw a dragged node at `position`.
    DragTo {
        /// Dragged node.
        node: GoalId,
        /// Pointer position.
        position: Point,
    },
    /// Highlight a potential new parent, or clear the highlight.
    HighlightDropTarget(Option<GoalId>),
    /// Return a dragged node to its layout position.
    SnapBack {
        /// Dragged node.
        node: GoalId,
        /// Layout position to restore.
        position: Point,
    },
    /// Leave a dragged node where it was dropped.
    Pin {
        /// Dragged node.
        node: GoalId,
        /// Drop position.
        position: Point,
    },
}

/// Public view of the controller's mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Nothing in progress.
    Idle,
    /// A pointer is down but has not moved far enough to drag.
    Pressed,
    /// A node follows the pointer.
    Dragging,
    /// The inline editor is open.
    Editing,
}

#[derive(Clone, Debug)]
struct Drag {
    node: GoalId,
    radius: f64,
    position: Point,
    target: Option<GoalId>,
}

#[derive(Clone, Debug)]
enum State {
    Idle,
    Pressed,
    Dragging(Drag),
    Editing(EditSession),
}

/// Modal gesture state machine.
///
/// ```
/// use goalgraph_interaction::{Controller, InteractionConfig, Intent, Mode, NodeCircle, PointerEvent, SceneQuery};
/// use goalgraph_model::{GoalId, GoalNode, ParentLookup};
/// use kurbo::Point;
///
/// struct Scene(Vec<GoalNode>, Vec<NodeCircle>);
/// impl ParentLookup for Scene {
///     fn parent_of(&self, id: &GoalId) -> Option<&GoalId> { self.0.as_slice().parent_of(id) }
///     fn contains(&self, id: &GoalId) -> bool { ParentLookup::contains(self.0.as_slice(), id) }
/// }
/// impl SceneQuery for Scene {
///     fn circles(&self) -> &[NodeCircle] { &self.1 }
///     fn layout_position(&self, id: &GoalId) -> Option<Point> {
///         self.1.iter().find(|c| &c.id == id).map(|c| c.center)
///     }
///     fn is_root(&self, id: &GoalId) -> bool { id.as_str() == "r" }
///     fn label(&self, id: &GoalId) -> Option<&str> {
///         self.0.iter().find(|n| &n.id == id).map(|n| n.text.as_str())
///     }
///     fn has_children(&self, id: &GoalId) -> bool { self.0.iter().any(|n| n.parent_id.as_ref() == Some(id)) }
///     fn pins_on_drop(&self) -> bool { false }
///     fn node_count(&self) -> usize { self.0.len() }
/// }
///
/// let scene = Scene(
///     vec![GoalNode::root("r", "Root"), GoalNode::sub("a", "r", "A")],
///     vec![
///         NodeCircle::new("r", Point::new(0.0, 0.0), 65.0),
///         NodeCircle::new("a", Point::new(200.0, 0.0), 45.0),
///     ],
/// );
/// let mut ctl = Controller::new(InteractionConfig::default());
/// ctl.pointer_down(&scene, PointerEvent::primary(Point::new(200.0, 0.0), 0));
/// let out = ctl.pointer_up(&scene, PointerEvent::primary(Point::new(200.0, 0.0), 20));
/// assert_eq!(out, [Intent::Select(GoalId::from("a"))]);
/// assert_eq!(ctl.mode(), Mode::Idle);
/// ```
#[derive(Clone, Debug)]
pub struct Controller {
    state: State,
    press: PressState,
    menu: Option<ContextMenu>,
    config: InteractionConfig,
}

impl Controller {
    /// Create an idle controller.
    pub fn new(config: InteractionConfig) -> Self {
        Self {
            state: State::Idle,
            press: PressState::new(config.clone()),
            menu: None,
            config,
        }
    }

    /// Current mode.
    pub fn mode(&self) -> Mode {
        match self.state {
            State::Idle => Mode::Idle,
            State::Pressed => Mode::Pressed,
            State::Dragging(_) => Mode::Dragging,
            State::Editing(_) => Mode::Editing,
        }
    }

    /// Node under an active drag or edit session.
    pub fn session_node(&self) -> Option<&GoalId> {
        match &self.state {
            State::Dragging(drag) => Some(&drag.node),
            State::Editing(session) => Some(session.node()),
            _ => None,
        }
    }

    /// The open editor, if any.
    pub fn edit_session(&self) -> Option<&EditSession> {
        match &self.state {
            State::Editing(session) => Some(session),
            _ => None,
        }
    }

    /// The dragged node and its current position.
    pub fn dragged(&self) -> Option<(&GoalId, Point)> {
        match &self.state {
            State::Dragging(drag) => Some((&drag.node, drag.position)),
            _ => None,
        }
    }

    /// Highlighted potential parent during a drag.
    pub fn drop_target(&self) -> Option<&GoalId> {
        match &self.state {
            State::Dragging(drag) => drag.target.as_ref(),
            _ => None,
        }
    }

    /// The open context menu.
    pub fn menu(&self) -> Option<&ContextMenu> {
        self.menu.as_ref()
    }

    /// Pending long-press deadline, for hosts that schedule their own wakeups.
    pub fn long_press_deadline(&self) -> Option<u64> {
        self.press.long_press_deadline()
    }

    /// Pointer pressed.
    ///
    /// Pressing anywhere commits an open edit and closes an open menu.
    pub fn pointer_down<S: SceneQuery + ?Sized>(
        &mut self,
        scene: &S,
        event: PointerEvent,
    ) -> Vec<Intent> {
        let mut out = Vec::new();
        self.finish_edit(true, &mut out);
        self.cancel_drag(scene, &mut out);
        if self.menu.take().is_some() {
            out.push(Intent::CloseMenu);
        }
        let hit = hit_test(scene.circles(), event.position).map(|c| c.id.clone());
        tracing::trace!(hit = ?hit, button = ?event.button, "pointer down");
        match event.button {
            PointerButton::Primary => {
                self.press
                    .on_down(hit, event.position, event.kind, event.time);
                self.state = State::Pressed;
            }
            PointerButton::Secondary => {
                self.press.cancel();
                self.state = State::Idle;
                if let Some(id) = hit {
                    out.push(Intent::Select(id.clone()));
                    self.open_menu(scene, id, event.position, &mut out);
                }
            }
            PointerButton::Auxiliary => {}
        }
        out
    }

    /// Pointer moved to `position`.
    pub fn pointer_move<S: SceneQuery + ?Sized>(&mut self, scene: &S, position: Point) -> Vec<Intent> {
        let mut out = Vec::new();
        if matches!(self.state, State::Pressed) {
            if self.press.on_move(position) {
                if let Some(node) = self.press.press().and_then(|p| p.target.clone()) {
                    self.start_drag(scene, node, position, &mut out);
                }
            }
        } else if let State::Dragging(drag) = &mut self.state {
            drag.position = position;
            out.push(Intent::DragTo {
                node: drag.node.clone(),
                position,
            });
            update_drop_target(scene, drag, &mut out);
        }
        out
    }

    /// Pointer released.
    pub fn pointer_up<S: SceneQuery + ?Sized>(&mut self, scene: &S, event: PointerEvent) -> Vec<Intent> {
        let mut out = Vec::new();
        match mem::replace(&mut self.state, State::Idle) {
            State::Pressed => match self.press.on_up(event.position, event.time) {
                PressOutcome::Click(Some(id)) => out.push(Intent::Select(id)),
                PressOutcome::Click(None) => out.push(Intent::ClearSelection),
                PressOutcome::DoubleClick(id) => {
                    out.push(Intent::Select(id.clone()));
                    self.start_edit(scene, id, &mut out);
                }
                PressOutcome::DragEnd | PressOutcome::None => {}
            },
            State::Dragging(mut drag) => {
                self.press.on_up(event.position, event.time);
                drag.position = event.position;
                self.drop(scene, drag, &mut out);
            }
            other => self.state = other,
        }
        out
    }

    /// Pointer left the canvas. Cancels a press and any drag.
    pub fn pointer_leave<S: SceneQuery + ?Sized>(&mut self, scene: &S) -> Vec<Intent> {
        let mut out = Vec::new();
        self.press.cancel();
        self.cancel_drag(scene, &mut out);
        if matches!(self.state, State::Pressed) {
            self.state = State::Idle;
        }
        out
    }

    /// Advance timers; fires the long press once its dwell elapses.
    pub fn poll<S: SceneQuery + ?Sized>(&mut self, scene: &S, now: u64) -> Vec<Intent> {
        let mut out = Vec::new();
        if !matches!(self.state, State::Pressed) {
            return out;
        }
        if let Some((id, at)) = self.press.poll(now) {
            out.push(Intent::Select(id.clone()));
            self.open_menu(scene, id, at, &mut out);
        }
        out
    }

    /// Key pressed. `composing` is true while an IME composition is active.
    pub fn key(&mut self, key: Key, composing: bool) -> Vec<Intent> {
        let mut out = Vec::new();
        if let State::Editing(session) = &mut self.state {
            session.set_composing(composing);
            match key {
                Key::Enter if composing => {}
                Key::Enter => self.finish_edit(true, &mut out),
                Key::Escape => self.finish_edit(false, &mut out),
            }
        } else if key == Key::Escape && self.menu.take().is_some() {
            out.push(Intent::CloseMenu);
        }
        out
    }

    /// Editor contents changed.
    pub fn text_input(&mut self, text: &str) {
        if let State::Editing(session) = &mut self.state {
            session.set_text(text);
        }
    }

    /// Editor lost focus; commits.
    pub fn blur(&mut self) -> Vec<Intent> {
        let mut out = Vec::new();
        self.finish_edit(true, &mut out);
        out
    }

    /// Cancel an open editor without committing.
    pub fn cancel_edit(&mut self) -> Vec<Intent> {
        let mut out = Vec::new();
        self.finish_edit(false, &mut out);
        out
    }

    /// Open the editor for `id`. Cancels a drag and commits another open edit.
    pub fn begin_edit<S: SceneQuery + ?Sized>(&mut self, scene: &S, id: &GoalId) -> Vec<Intent> {
        let mut out = Vec::new();
        if self.session_node() == Some(id) && matches!(self.state, State::Editing(_)) {
            return out;
        }
        self.finish_edit(true, &mut out);
        self.cancel_drag(scene, &mut out);
        self.press.cancel();
        if self.menu.take().is_some() {
            out.push(Intent::CloseMenu);
        }
        self.start_edit(scene, id.clone(), &mut out);
        out
    }

    /// Pick an entry from the open menu.
    pub fn menu_select<S: SceneQuery + ?Sized>(
        &mut self,
        scene: &S,
        action: MenuAction,
    ) -> Vec<Intent> {
        let mut out = Vec::new();
        let Some(menu) = self.menu.take() else {
            return out;
        };
        out.push(Intent::CloseMenu);
        if !menu.offers(action) {
            tracing::debug!(node = %menu.node, ?action, "menu action not offered");
            return out;
        }
        let node = menu.node;
        match action {
            MenuAction::Edit => {
                self.press.cancel();
                self.state = State::Idle;
                self.start_edit(scene, node, &mut out);
            }
            MenuAction::AddSibling => {
                if let Some(parent) = scene.parent_of(&node) {
                    out.push(Intent::AddChild {
                        parent: parent.clone(),
                    });
                }
            }
            MenuAction::AddChild => out.push(Intent::AddChild { parent: node }),
            MenuAction::Delete => out.push(Intent::Delete(node)),
            MenuAction::CycleStatus => out.push(Intent::CycleStatus(node)),
            MenuAction::ToggleCollapse => out.push(Intent::ToggleCollapse(node)),
            MenuAction::ConvertToTask => out.push(Intent::ConvertToTask(node)),
            MenuAction::GenerateImage => out.push(Intent::GenerateImage(node)),
        }
        out
    }

    /// Close the menu without choosing anything.
    pub fn close_menu(&mut self) -> Vec<Intent> {
        if self.menu.take().is_some() {
            vec![Intent::CloseMenu]
        } else {
            Vec::new()
        }
    }

    fn open_menu<S: SceneQuery + ?Sized>(
        &mut self,
        scene: &S,
        id: GoalId,
        anchor: Point,
        out: &mut Vec<Intent>,
    ) {
        let is_root = scene.is_root(&id);
        let has_children = scene.has_children(&id);
        let menu = ContextMenu::for_node(id, anchor, is_root, has_children);
        tracing::trace!(node = %menu.node, "menu opened");
        out.push(Intent::OpenMenu(menu.clone()));
        self.menu = Some(menu);
    }

    fn start_drag<S: SceneQuery + ?Sized>(
        &mut self,
        scene: &S,
        node: GoalId,
        position: Point,
        out: &mut Vec<Intent>,
    ) {
        let radius = scene
            .circles()
            .iter()
            .find(|c| c.id == node)
            .map_or(0.0, |c| c.radius);
        tracing::debug!(%node, "drag started");
        let mut drag = Drag {
            node,
            radius,
            position,
            target: None,
        };
        out.push(Intent::DragTo {
            node: drag.node.clone(),
            position,
        });
        update_drop_target(scene, &mut drag, out);
        self.state = State::Dragging(drag);
    }

    fn start_edit<S: SceneQuery + ?Sized>(&mut self, scene: &S, id: GoalId, out: &mut Vec<Intent>) {
        let Some(label) = scene.label(&id) else {
            tracing::debug!(node = %id, "edit requested for unknown node");
            return;
        };
        let anchor = scene
            .circles()
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.center + Vec2::new(0.0, c.radius + self.config.edit_gap))
            .or_else(|| scene.layout_position(&id))
            .unwrap_or(Point::ZERO);
        let session = EditSession::new(id.clone(), label, scene.is_root(&id), anchor);
        out.push(Intent::BeginEdit { node: id, anchor });
        self.state = State::Editing(session);
    }

    fn finish_edit(&mut self, commit: bool, out: &mut Vec<Intent>) {
        if !matches!(self.state, State::Editing(_)) {
            return;
        }
        let State::Editing(session) = mem::replace(&mut self.state, State::Idle) else {
            return;
        };
        out.push(Intent::EndEdit);
        if !commit {
            return;
        }
        let node = session.node().clone();
        match session.commit() {
            EditOutcome::Update(text) => out.push(Intent::UpdateText { node, text }),
            EditOutcome::Delete => out.push(Intent::Delete(node)),
            EditOutcome::Rejected => {
                tracing::warn!(%node, "empty label on root rejected");
                out.push(Intent::RestoreText(node));
            }
            EditOutcome::Unchanged => {}
        }
    }

    fn cancel_drag<S: SceneQuery + ?Sized>(&mut self, scene: &S, out: &mut Vec<Intent>) {
        if !matches!(self.state, State::Dragging(_)) {
            return;
        }
        if let State::Dragging(drag) = mem::replace(&mut self.state, State::Idle) {
            if drag.target.is_some() {
                out.push(Intent::HighlightDropTarget(None));
            }
            release(scene, drag, out);
        }
    }

    fn drop<S: SceneQuery + ?Sized>(&mut self, scene: &S, mut drag: Drag, out: &mut Vec<Intent>) {
        if drag.target.is_some() {
            out.push(Intent::HighlightDropTarget(None));
        }
        if let Some(parent) = drag.target.take() {
            match validate_reparent(scene, &drag.node, &parent, scene.node_count()) {
                Ok(()) => {
                    tracing::debug!(child = %drag.node, %parent, "re-parent requested");
                    out.push(Intent::Reparent {
                        child: drag.node,
                        parent,
                    });
                    return;
                }
                Err(err) => tracing::warn!(%err, "re-parent rejected"),
            }
        }
        release(scene, drag, out);
    }
}

/// Drop with no valid target: back to the layout, or pinned in force mode.
fn release<S: SceneQuery + ?Sized>(scene: &S, drag: Drag, out: &mut Vec<Intent>) {
    if scene.pins_on_drop() {
        out.push(Intent::Pin {
            node: drag.node,
            position: drag.position,
        });
    } else {
        let position = scene.layout_position(&drag.node).unwrap_or(drag.position);
        out.push(Intent::SnapBack {
            node: drag.node,
            position,
        });
    }
}

fn update_drop_target<S: SceneQuery + ?Sized>(scene: &S, drag: &mut Drag, out: &mut Vec<Intent>) {
    let target = drop_target(scene.circles(), &drag.node, drag.position, drag.radius).map(|c| c.id.clone());
    if target != drag.target {
        drag.target.clone_from(&target);
        out.push(Intent::HighlightDropTarget(target));
    }
}
