use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque node identifier, stable for the node's lifetime.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
	/// A fresh random (v4) id.
	pub fn fresh() -> Self {
		Self(Uuid::new_v4().to_string())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl From<&str> for NodeId {
	fn from(s: &str) -> Self {
		Self(s.to_owned())
	}
}

impl From<String> for NodeId {
	fn from(s: String) -> Self {
		Self(s)
	}
}

impl fmt::Display for NodeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// Semantic tag on a node. The set is open: instructions may define their own.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeType {
	Presynaptic,
	Postsynaptic,
	Initial,
	Boundary,
	Other(CustomType),
}

/// Name of an instruction-defined type. Only built through [`NodeType::new`], so it never
/// spells one of the well-known types.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CustomType(String);

impl CustomType {
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl NodeType {
	pub fn new(name: &str) -> Self {
		match name {
			"presynaptic" => NodeType::Presynaptic,
			"postsynaptic" => NodeType::Postsynaptic,
			"initial" => NodeType::Initial,
			"boundary" => NodeType::Boundary,
			other => NodeType::Other(CustomType(other.to_owned())),
		}
	}

	pub fn as_str(&self) -> &str {
		match self {
			NodeType::Presynaptic => "presynaptic",
			NodeType::Postsynaptic => "postsynaptic",
			NodeType::Initial => "initial",
			NodeType::Boundary => "boundary",
			NodeType::Other(custom) => custom.as_str(),
		}
	}
}

impl From<&str> for NodeType {
	fn from(s: &str) -> Self {
		NodeType::new(s)
	}
}

impl From<String> for NodeType {
	fn from(s: String) -> Self {
		NodeType::from(s.as_str())
	}
}

impl From<NodeType> for String {
	fn from(t: NodeType) -> Self {
		t.as_str().to_owned()
	}
}

impl fmt::Display for NodeType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// A position in data-space plus its slice index.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point3 {
	pub x: f64,
	pub y: f64,
	pub z: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
	pub id: NodeId,
	/// Data-space position, independent of the viewport.
	pub x: f64,
	pub y: f64,
	/// Slice index into the volume.
	pub z: u32,
	#[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
	pub node_type: Option<NodeType>,
	pub author: String,
	/// Milliseconds since the Unix epoch.
	pub created: f64,
	#[serde(default)]
	pub protected: bool,
	#[serde(default)]
	pub bookmarked: bool,
	#[serde(default)]
	pub low_confidence: bool,
}

impl Node {
	pub fn position(&self) -> Point3 {
		Point3 {
			x: self.x,
			y: self.y,
			z: self.z,
		}
	}
}

/// Optional overrides for a node being created.
#[derive(Clone, Debug, Default)]
pub struct NodeAttrs {
	pub node_type: Option<NodeType>,
	pub author: Option<String>,
	pub id: Option<NodeId>,
}

/// Trace connection between two nodes. Stored in insertion direction, queried undirected.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
	pub v: NodeId,
	pub w: NodeId,
}

impl Edge {
	pub fn touches(&self, id: &NodeId) -> bool {
		&self.v == id || &self.w == id
	}

	/// The endpoint opposite `id`, if `id` is an endpoint.
	pub fn other(&self, id: &NodeId) -> Option<&NodeId> {
		if &self.v == id {
			Some(&self.w)
		} else if &self.w == id {
			Some(&self.v)
		} else {
			None
		}
	}
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphData {
	pub nodes: Vec<Node>,
	pub edges: Vec<Edge>,
}
