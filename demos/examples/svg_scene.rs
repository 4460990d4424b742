// Copyright 2026 the Goalgraph Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A scripted session against an in-memory owner, drawn as SVG.
//!
//! The owner keeps the node and link arrays and applies every callback to
//! them, then hands the engine a fresh snapshot, the way a UI framework
//! would on its next render. The script renames a node, drags a leaf onto
//! another branch and collapses a subtree, printing the final frame as SVG.
//!
//! Run:
//! - `RUST_LOG=goalgraph=debug cargo run -p goalgraph_demos --example svg_scene > goals.svg`

use std::fmt::{self, Write as _};

use goalgraph::{
    Engine, EngineConfig, GoalGraphHost, GoalId, GoalLink, GoalNode, GoalStatus, Key, LayoutMode,
    MenuAction, NodeFlags, NodeUpdate, PointerEvent, Props, Scene, SceneRenderer,
    links_from_parents,
};
use kurbo::{Point, Size};
use tracing_subscriber::EnvFilter;

/// Owner of the goal arrays.
struct Board {
    nodes: Vec<GoalNode>,
    links: Vec<GoalLink>,
    next_id: u32,
    size: Size,
    layout: LayoutMode,
}

impl Board {
    fn props(&self) -> Props {
        Props::new(self.nodes.clone(), self.links.clone(), self.size).with_layout_mode(self.layout)
    }

    fn subtree(&self, id: &GoalId) -> Vec<GoalId> {
        let mut out = vec![id.clone()];
        let mut i = 0;
        while let Some(cur) = out.get(i).cloned() {
            out.extend(
                self.nodes
                    .iter()
                    .filter(|n| n.parent_id.as_ref() == Some(&cur))
                    .map(|n| n.id.clone()),
            );
            i += 1;
        }
        out
    }
}

impl GoalGraphHost for Board {
    fn on_node_click(&mut self, node: &GoalNode) {
        tracing::info!(node = %node.id, text = %node.text, "clicked");
    }

    fn on_update_node(&mut self, id: &GoalId, update: &NodeUpdate) {
        if let Some(node) = self.nodes.iter_mut().find(|n| &n.id == id) {
            update.apply_to(node);
        }
    }

    fn on_delete_node(&mut self, id: &GoalId) {
        let gone = self.subtree(id);
        self.nodes.retain(|n| !gone.contains(&n.id));
        self.links = links_from_parents(&self.nodes);
    }

    fn on_reparent_node(&mut self, child: &GoalId, new_parent: &GoalId) {
        if let Some(node) = self.nodes.iter_mut().find(|n| &n.id == child) {
            node.parent_id = Some(new_parent.clone());
        }
        self.links = links_from_parents(&self.nodes);
    }

    fn on_add_sub_node(&mut self, parent: &GoalId, initial_text: Option<&str>) {
        self.next_id += 1;
        let id = format!("g{}", self.next_id);
        self.nodes.push(GoalNode::sub(
            id.as_str(),
            parent.clone(),
            initial_text.unwrap_or("New goal"),
        ));
        self.links = links_from_parents(&self.nodes);
    }
}

/// Writes each frame as a standalone SVG document.
#[derive(Default)]
struct SvgRenderer {
    out: String,
}

impl SvgRenderer {
    fn draw(&mut self, scene: &Scene) -> fmt::Result {
        self.out.clear();
        let [a, b, c, d, e, f] = scene.transform.as_coeffs();
        writeln!(
            self.out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}">"#,
            scene.size.width, scene.size.height
        )?;
        writeln!(self.out, r#"<g transform="matrix({a} {b} {c} {d} {e} {f})">"#)?;
        for edge in &scene.edges {
            writeln!(
                self.out,
                r##"<path d="{}" fill="none" stroke="#94a3b8" stroke-width="2"/>"##,
                edge.path.to_svg()
            )?;
        }
        for node in &scene.nodes {
            let fill = match node.status {
                GoalStatus::Pending => "#e2e8f0",
                GoalStatus::Completed => "#bbf7d0",
                GoalStatus::Stuck => "#fecaca",
            };
            let stroke = if node.flags.contains(NodeFlags::DROP_TARGET) {
                "#f59e0b"
            } else if node.flags.contains(NodeFlags::SELECTED) {
                "#2563eb"
            } else {
                "#475569"
            };
            writeln!(
                self.out,
                r#"<circle cx="{:.1}" cy="{:.1}" r="{}" fill="{fill}" stroke="{stroke}" stroke-width="3"/>"#,
                node.center.x, node.center.y, node.radius
            )?;
            let mut label = node.label.clone();
            if node.hidden_descendants > 0 {
                write!(label, " (+{})", node.hidden_descendants)?;
            }
            writeln!(
                self.out,
                r#"<text x="{:.1}" y="{:.1}" text-anchor="middle" font-size="12">{}</text>"#,
                node.center.x,
                node.center.y + 4.0,
                escape(&label)
            )?;
        }
        if let Some(edit) = &scene.edit {
            writeln!(
                self.out,
                r#"<foreignObject x="{:.1}" y="{:.1}" width="160" height="24"><input value="{}"/></foreignObject>"#,
                edit.anchor.x - 80.0,
                edit.anchor.y,
                escape(&edit.text)
            )?;
        }
        writeln!(self.out, "</g>\n</svg>")
    }
}

impl SceneRenderer for SvgRenderer {
    fn render(&mut self, scene: &Scene) {
        if let Err(err) = self.draw(scene) {
            tracing::error!(%err, "failed to write svg");
        }
    }
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let nodes = vec![
        GoalNode::root("root", "Run a marathon"),
        GoalNode::sub("train", "root", "Training plan"),
        GoalNode::sub("gear", "root", "Gear"),
        GoalNode::sub("diet", "root", "Nutrition"),
        GoalNode::sub("long", "train", "Weekly long run").with_status(GoalStatus::Completed),
        GoalNode::sub("tempo", "train", "Tempo intervals"),
        GoalNode::sub("shoes", "gear", "Buy shoes").with_progress(50),
        GoalNode::sub("carbs", "diet", "Carb loading").with_status(GoalStatus::Stuck),
    ];
    let mut board = Board {
        links: links_from_parents(&nodes),
        nodes,
        next_id: 0,
        size: Size::new(1_000.0, 800.0),
        layout: LayoutMode::VerticalTree,
    };

    let mut engine = Engine::new(EngineConfig::default());
    let mut now = 0;
    engine.set_props(&board.props(), now, &mut board);

    let pos = |engine: &Engine, id: &str| engine.position(&GoalId::from(id)).unwrap_or(Point::ZERO);

    // Double-click to rename.
    let gear = pos(&engine, "gear");
    for _ in 0..2 {
        now += 40;
        engine.pointer_down(PointerEvent::primary(gear, now), &mut board);
        engine.pointer_up(PointerEvent::primary(gear, now + 10), &mut board);
    }
    engine.text_input("Race-day gear");
    now += 400;
    engine.key(Key::Enter, false, now, &mut board);
    engine.set_props(&board.props(), now + 5, &mut board);

    // Drag the carb loading goal under the training plan.
    let from = pos(&engine, "carbs");
    let onto = pos(&engine, "train");
    now += 100;
    engine.pointer_down(PointerEvent::primary(from, now), &mut board);
    for step in 1_u32..=10 {
        let t = f64::from(step) / 10.0;
        engine.pointer_move(from.lerp(onto, t), now + u64::from(step) * 16, &mut board);
    }
    now += 200;
    engine.pointer_up(PointerEvent::primary(onto, now), &mut board);
    engine.set_props(&board.props(), now + 5, &mut board);

    // Add a goal under nutrition, then collapse the training plan.
    let diet = pos(&engine, "diet");
    now += 100;
    engine.pointer_down(PointerEvent::secondary(diet, now), &mut board);
    engine.menu_select(MenuAction::AddChild, now + 20, &mut board);
    engine.set_props(&board.props(), now + 25, &mut board);
    let train = pos(&engine, "train");
    engine.pointer_down(PointerEvent::secondary(train, now + 200), &mut board);
    engine.menu_select(MenuAction::ToggleCollapse, now + 220, &mut board);
    engine.set_props(&board.props(), now + 225, &mut board);

    tracing::info!(
        layout_runs = engine.layout_runs(),
        nodes = board.nodes.len(),
        "script finished"
    );

    let mut svg = SvgRenderer::default();
    engine.render(&mut svg);
    println!("{}", svg.out);
}
