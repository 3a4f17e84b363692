//! Dashboard widgets.

pub mod controls;
pub mod notice;
pub mod traffic_graph;
