// Copyright 2026 the Goalgraph Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Force layout: cold start, settling, and a warm restart after an edit.
//!
//! Run:
//! - `RUST_LOG=goalgraph_layout=debug cargo run -p goalgraph_demos --example force_settle`

use goalgraph::{
    Engine, EngineConfig, GoalId, GoalNode, HostCall, LayoutMode, Props, links_from_parents,
};
use kurbo::Size;
use tracing_subscriber::EnvFilter;

const FRAME_MS: u64 = 16;

fn run_until_settled(engine: &mut Engine, host: &mut Vec<HostCall>, now: &mut u64) -> u32 {
    let mut frames = 0;
    while engine.tick(*now, host) {
        *now += FRAME_MS;
        frames += 1;
    }
    frames
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut nodes = vec![GoalNode::root("root", "Launch the product")];
    for (i, branch) in ["Design", "Build", "Market", "Support"].iter().enumerate() {
        let id = format!("b{i}");
        nodes.push(GoalNode::sub(id.as_str(), "root", *branch));
        for j in 0..3 {
            nodes.push(GoalNode::sub(
                format!("{id}.{j}"),
                id.as_str(),
                format!("{branch} task {j}"),
            ));
        }
    }
    let size = Size::new(1_200.0, 900.0);
    let props = Props::new(nodes.clone(), links_from_parents(&nodes), size)
        .with_layout_mode(LayoutMode::Force);

    let mut host = Vec::new();
    let mut engine = Engine::new(EngineConfig::default());
    let mut now = 0;
    engine.set_props(&props, now, &mut host);
    let frames = run_until_settled(&mut engine, &mut host, &mut now);
    tracing::info!(frames, "cold start settled");

    // A new branch arrives; existing nodes resume from where they are.
    nodes.push(GoalNode::sub("b4", "root", "Fundraise"));
    let props = Props::new(nodes.clone(), links_from_parents(&nodes), size)
        .with_layout_mode(LayoutMode::Force);
    engine.set_props(&props, now, &mut host);
    let frames = run_until_settled(&mut engine, &mut host, &mut now);
    tracing::info!(frames, "warm restart settled");

    for node in &nodes {
        if let Some(p) = engine.position(&node.id) {
            println!("{:<12} {:>8.1} {:>8.1}", node.id, p.x, p.y);
        }
    }
    let root = GoalId::from("root");
    engine.center_on(Some(&root));
    println!("viewport offset after centering: {:?}", engine.viewport().offset());
}
