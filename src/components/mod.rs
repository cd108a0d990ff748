//! Canvas components.

pub mod trace_graph;
