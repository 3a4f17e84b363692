//! Canvas rendering of live traffic between the nodes of one graph level.

mod component;
mod engine;
mod props;
mod render;
mod scene;

pub use component::TrafficGraph;
pub use props::{FilterKind, TrafficFilter, VizProps};
