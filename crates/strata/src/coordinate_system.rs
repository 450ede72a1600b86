//! Coordinate system adjustment helpers.
//!
//! The engine lays out top-to-bottom. For left-to-right / right-to-left layouts we swap axes
//! before layering and restore them afterwards; bottom-to-top mirrors the y axis.

use crate::config::RankDir;
use crate::graph::Graph;
use crate::model::{Apex, EdgeLabel, NodeLabel};
use crate::session::LayoutSession;

pub fn adjust(session: &mut LayoutSession) {
    match session.config.rankdir {
        RankDir::LR | RankDir::RL => swap_width_height(&mut session.graph),
        RankDir::TB | RankDir::BT => {}
    }
    // Output y becomes -y (BT) or x (LR, RL) of the layout frame.
    let apex = match session.config.rankdir {
        RankDir::TB => Apex::Up,
        RankDir::BT => Apex::Down,
        RankDir::LR | RankDir::RL => Apex::Left,
    };
    session.graph.for_each_node_mut(|_, n| n.apex = apex);
}

pub fn undo(session: &mut LayoutSession) {
    let g = &mut session.graph;
    g.for_each_node_mut(|_, n| n.apex = Apex::Up);
    match session.config.rankdir {
        RankDir::BT | RankDir::RL => reverse_y(g),
        RankDir::TB | RankDir::LR => {}
    }

    match session.config.rankdir {
        RankDir::LR | RankDir::RL => {
            swap_xy(g);
            swap_width_height(g);
        }
        RankDir::TB | RankDir::BT => {}
    }
}

fn swap_width_height(g: &mut Graph<NodeLabel, EdgeLabel>) {
    g.for_each_node_mut(|_, n| {
        (n.width, n.height) = (n.height, n.width);
    });
    g.for_each_edge_mut(|_, e| {
        if let Some(label) = e.label.as_mut() {
            (label.width, label.height) = (label.height, label.width);
        }
    });
}

fn reverse_y(g: &mut Graph<NodeLabel, EdgeLabel>) {
    g.for_each_node_mut(|_, n| {
        n.y = -n.y;
    });
    g.for_each_edge_mut(|_, e| {
        for seg in &mut e.route {
            for p in &mut seg.points {
                p.y = -p.y;
            }
        }
        if let Some(p) = e.label_pos.as_mut() {
            p.y = -p.y;
        }
        e.source_orientation = e.source_orientation.map(|c| c.flip_vertical());
        e.target_orientation = e.target_orientation.map(|c| c.flip_vertical());
    });
}

fn swap_xy(g: &mut Graph<NodeLabel, EdgeLabel>) {
    g.for_each_node_mut(|_, n| {
        (n.x, n.y) = (n.y, n.x);
    });
    g.for_each_edge_mut(|_, e| {
        for seg in &mut e.route {
            for p in &mut seg.points {
                (p.x, p.y) = (p.y, p.x);
            }
        }
        if let Some(p) = e.label_pos.as_mut() {
            (p.x, p.y) = (p.y, p.x);
        }
        e.source_orientation = e.source_orientation.map(|c| c.transpose());
        e.target_orientation = e.target_orientation.map(|c| c.transpose());
    });
}
