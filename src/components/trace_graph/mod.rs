pub mod cache;
mod component;
pub mod interchange;
pub mod palette;
mod render;
pub mod selection;
pub mod state;
pub mod store;
pub mod transform;
pub mod types;
pub mod viewport;

pub use component::TraceGraphCanvas;
pub use interchange::{GraphInterchange, RemoteGraph, Volume, VolumeBounds};
pub use selection::{SelectionRadius, nearest_node};
pub use store::{ImportReport, ImportWarning, TraceGraph};
pub use transform::ViewTransform;
pub use types::{Edge, GraphData, Node, NodeAttrs, NodeId, NodeType, Point3};
