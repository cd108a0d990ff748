//! Conversion between the editor's graph and the annotation store's graph records.
//!
//! The store keeps absolute voxel coordinates. The editor keeps positions relative to the
//! middle of the volume (so the image can be drawn centred on the pan position) and z as a
//! slice index from the top of the volume.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::types::{Edge, GraphData, Node, NodeId, NodeType};

#[derive(thiserror::Error, Debug)]
pub enum InterchangeError {
	#[error("link {from} -> {to} references an unknown node")]
	DanglingLink { from: NodeId, to: NodeId },

	#[error("node {0} appears more than once")]
	DuplicateNode(NodeId),

	#[error("node {id} lies on slice {z}, outside the volume's {slices} slices")]
	SliceOutOfRange { id: NodeId, z: f64, slices: u32 },

	#[error("malformed graph record: {0}")]
	Json(#[from] serde_json::Error),
}

pub type InterchangeResult<T> = Result<T, InterchangeError>;

/// Axis-aligned volume extent, `[[x0, y0, z0], [x1, y1, z1]]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct VolumeBounds {
	pub bounds: [[f64; 3]; 2],
}

impl VolumeBounds {
	pub fn new(min: [f64; 3], max: [f64; 3]) -> Self {
		Self { bounds: [min, max] }
	}

	fn extent(&self, axis: usize) -> f64 {
		self.bounds[1][axis] - self.bounds[0][axis]
	}

	pub fn width(&self) -> f64 {
		self.extent(0)
	}

	pub fn height(&self) -> f64 {
		self.extent(1)
	}

	pub fn slice_count(&self) -> u32 {
		self.extent(2).max(0.0) as u32
	}

	/// Zero or negative extent on any axis.
	pub fn is_degenerate(&self) -> bool {
		(0..3).any(|axis| {
			let extent = self.extent(axis);
			extent.is_nan() || extent <= 0.0
		})
	}

	fn half(&self, axis: usize) -> f64 {
		self.bounds[0][axis] + self.extent(axis) / 2.0
	}
}

/// Absolute coordinate to editor space. z is snapped to a slice but not range-checked.
pub fn to_view_space(coordinate: [f64; 3], bounds: &VolumeBounds) -> (f64, f64, f64) {
	(
		coordinate[0] - bounds.half(0),
		coordinate[1] - bounds.half(1),
		(coordinate[2] - bounds.bounds[0][2]).round(),
	)
}

/// Editor space back to an absolute coordinate.
pub fn to_data_space(x: f64, y: f64, z: u32, bounds: &VolumeBounds) -> [f64; 3] {
	[
		x + bounds.half(0),
		y + bounds.half(1),
		z as f64 + bounds.bounds[0][2],
	]
}

/// The volume a question is posed over.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Volume {
	#[serde(rename = "_id")]
	pub id: String,
	#[serde(flatten)]
	pub bounds: VolumeBounds,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RemoteNode {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub id: Option<NodeId>,
	pub coordinate: [f64; 3],
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub author: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub created: Option<f64>,
	#[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
	pub node_type: Option<NodeType>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub namespace: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub volume: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub decisions: Option<Vec<serde_json::Value>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub metadata: Option<serde_json::Value>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteLink {
	pub source: NodeId,
	pub target: NodeId,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RemoteGraph {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub author: Option<String>,
	pub nodes: Vec<RemoteNode>,
	#[serde(default)]
	pub links: Vec<RemoteLink>,
	#[serde(default = "directed_default")]
	pub directed: bool,
	#[serde(default)]
	pub multigraph: bool,
}

fn directed_default() -> bool {
	true
}

impl RemoteGraph {
	pub fn from_json(json: &str) -> InterchangeResult<Self> {
		Ok(serde_json::from_str(json)?)
	}

	pub fn to_json(&self) -> InterchangeResult<String> {
		Ok(serde_json::to_string(self)?)
	}
}

/// Converts graphs for one volume, stamping namespace, volume and default author.
#[derive(Clone, Debug)]
pub struct GraphInterchange {
	pub volume: Volume,
	pub namespace: String,
	pub author: String,
}

impl GraphInterchange {
	pub fn new(volume: Volume, namespace: impl Into<String>, author: impl Into<String>) -> Self {
		debug_assert!(
			!volume.bounds.is_degenerate(),
			"volume {} has degenerate bounds",
			volume.id
		);
		Self {
			volume,
			namespace: namespace.into(),
			author: author.into(),
		}
	}

	fn bounds(&self) -> &VolumeBounds {
		&self.volume.bounds
	}

	pub fn from_remote(&self, remote: &RemoteGraph) -> InterchangeResult<GraphData> {
		let slices = self.bounds().slice_count();
		let mut seen = HashSet::new();
		let mut nodes = Vec::with_capacity(remote.nodes.len());

		for record in &remote.nodes {
			let id = record.id.clone().unwrap_or_else(NodeId::fresh);
			if !seen.insert(id.clone()) {
				return Err(InterchangeError::DuplicateNode(id));
			}
			let (x, y, z) = to_view_space(record.coordinate, self.bounds());
			if z < 0.0 || z >= slices as f64 {
				return Err(InterchangeError::SliceOutOfRange { id, z, slices });
			}
			nodes.push(Node {
				id,
				x,
				y,
				z: z as u32,
				node_type: record.node_type.clone(),
				author: record.author.clone().unwrap_or_else(|| self.author.clone()),
				created: record.created.unwrap_or_default(),
				protected: false,
				bookmarked: false,
				low_confidence: false,
			});
		}

		let edges = remote
			.links
			.iter()
			.map(|link| {
				if seen.contains(&link.source) && seen.contains(&link.target) {
					Ok(Edge {
						v: link.source.clone(),
						w: link.target.clone(),
					})
				} else {
					Err(InterchangeError::DanglingLink {
						from: link.source.clone(),
						to: link.target.clone(),
					})
				}
			})
			.collect::<InterchangeResult<Vec<_>>>()?;

		Ok(GraphData { nodes, edges })
	}

	pub fn to_remote(&self, graph: &GraphData) -> RemoteGraph {
		let nodes = graph
			.nodes
			.iter()
			.map(|node| RemoteNode {
				id: Some(node.id.clone()),
				coordinate: to_data_space(node.x, node.y, node.z, self.bounds()),
				author: Some(if node.author.is_empty() {
					self.author.clone()
				} else {
					node.author.clone()
				}),
				created: Some(node.created),
				node_type: node.node_type.clone(),
				namespace: Some(self.namespace.clone()),
				volume: Some(self.volume.id.clone()),
				decisions: None,
				metadata: None,
			})
			.collect();
		let links = graph
			.edges
			.iter()
			.map(|e| RemoteLink {
				source: e.v.clone(),
				target: e.w.clone(),
			})
			.collect();

		RemoteGraph {
			author: Some(self.author.clone()),
			nodes,
			links,
			directed: true,
			multigraph: false,
		}
	}

	/// Parse a remote graph record and convert it in one go.
	pub fn parse(&self, json: &str) -> InterchangeResult<GraphData> {
		self.from_remote(&RemoteGraph::from_json(json)?)
	}
}
