use std::collections::{BTreeSet, HashMap, HashSet};

use log::{debug, warn};

use super::selection::{SelectionRadius, nearest_node};
use super::transform::ViewTransform;
use super::types::{Edge, GraphData, Node, NodeAttrs, NodeId, NodeType, Point3};

/// Something in an imported graph that had to be skipped or guessed at.
#[derive(Clone, Debug, PartialEq)]
pub enum ImportWarning {
	/// More than one node is tagged `initial`; the first one was kept as active.
	MultipleInitial { kept: NodeId, ignored: NodeId },
	DuplicateNode(NodeId),
	DanglingEdge(Edge),
	SelfLoop(NodeId),
	UnknownActive(NodeId),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ImportReport {
	pub warnings: Vec<ImportWarning>,
}

impl ImportReport {
	pub fn is_clean(&self) -> bool {
		self.warnings.is_empty()
	}

	fn push(&mut self, warning: ImportWarning) {
		warn!("graph import: {:?}", warning);
		self.warnings.push(warning);
	}
}

/// In-memory trace graph being edited during a session.
///
/// All edits go through the methods here. Edits that cannot apply (protected node, no active
/// node, interior node) are no-ops and report so through their return value.
#[derive(Clone, Debug, Default)]
pub struct TraceGraph {
	nodes: Vec<Node>,
	index: HashMap<NodeId, usize>,
	edges: Vec<Edge>,
	active: Option<NodeId>,
	author: String,
}

impl TraceGraph {
	pub fn new(author: impl Into<String>) -> Self {
		Self {
			author: author.into(),
			..Self::default()
		}
	}

	pub fn author(&self) -> &str {
		&self.author
	}

	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// Nodes in insertion order.
	pub fn nodes(&self) -> &[Node] {
		&self.nodes
	}

	pub fn edges(&self) -> &[Edge] {
		&self.edges
	}

	pub fn node(&self, id: &NodeId) -> Option<&Node> {
		self.index.get(id).map(|&i| &self.nodes[i])
	}

	fn node_mut(&mut self, id: &NodeId) -> Option<&mut Node> {
		self.index.get(id).map(|&i| &mut self.nodes[i])
	}

	pub fn active(&self) -> Option<&NodeId> {
		self.active.as_ref()
	}

	pub fn active_node(&self) -> Option<&Node> {
		self.active.as_ref().and_then(|id| self.node(id))
	}

	fn active_node_mut(&mut self) -> Option<&mut Node> {
		let id = self.active.clone()?;
		self.node_mut(&id)
	}

	pub fn degree(&self, id: &NodeId) -> usize {
		self.edges.iter().filter(|e| e.touches(id)).count()
	}

	pub fn neighbors(&self, id: &NodeId) -> Vec<&NodeId> {
		self.edges.iter().filter_map(|e| e.other(id)).collect()
	}

	/// Whether an edge joins `a` and `b`, in either direction.
	pub fn linked(&self, a: &NodeId, b: &NodeId) -> bool {
		self.edges.iter().any(|e| e.touches(a) && e.touches(b))
	}

	/// Slice of the active node, or `fallback` (usually the current slice) without one.
	pub fn selected_z(&self, fallback: u32) -> u32 {
		self.active_node().map(|n| n.z).unwrap_or(fallback)
	}

	/// Distinct node types present, sorted.
	pub fn node_types(&self) -> Vec<NodeType> {
		self.nodes
			.iter()
			.filter_map(|n| n.node_type.clone())
			.collect::<BTreeSet<_>>()
			.into_iter()
			.collect()
	}

	pub fn count_of_type(&self, node_type: &NodeType) -> usize {
		self.nodes
			.iter()
			.filter(|n| n.node_type.as_ref() == Some(node_type))
			.count()
	}

	/// Create a node at a data-space position. Always succeeds.
	pub fn add_node(&mut self, (x, y): (f64, f64), z: u32, attrs: NodeAttrs) -> &Node {
		let node = Node {
			id: attrs
				.id
				.filter(|id| !self.index.contains_key(id))
				.unwrap_or_else(NodeId::fresh),
			x,
			y,
			z,
			node_type: attrs.node_type,
			author: attrs.author.unwrap_or_else(|| self.author.clone()),
			created: now_ms(),
			protected: false,
			bookmarked: false,
			low_confidence: false,
		};
		debug!("add node {} at ({x:.1}, {y:.1}, {z})", node.id);
		let i = self.nodes.len();
		self.index.insert(node.id.clone(), i);
		self.nodes.push(node);
		&self.nodes[i]
	}

	/// Link the active node to `id` and make `id` active.
	///
	/// Without an active node no edge is created, but `id` still becomes active. Nodes that
	/// are already linked stay joined by their one edge.
	pub fn connect_to_active(&mut self, id: &NodeId) -> Option<Edge> {
		if !self.index.contains_key(id) {
			return None;
		}
		match self.active.replace(id.clone()) {
			Some(prev)
				if &prev != id && self.index.contains_key(&prev) && !self.linked(&prev, id) =>
			{
				let edge = Edge {
					v: prev,
					w: id.clone(),
				};
				self.edges.push(edge.clone());
				Some(edge)
			}
			_ => None,
		}
	}

	/// Add a node and connect it to the active one; what a left click does.
	pub fn extend(&mut self, position: (f64, f64), z: u32, attrs: NodeAttrs) -> NodeId {
		let id = self.add_node(position, z, attrs).id.clone();
		self.connect_to_active(&id);
		id
	}

	pub fn set_active(&mut self, id: &NodeId) -> bool {
		if self.index.contains_key(id) {
			self.active = Some(id.clone());
			true
		} else {
			false
		}
	}

	/// Right-click selection: activate the nearest node to a screen point, if any.
	pub fn select_at(
		&mut self,
		transform: &ViewTransform,
		click: (f64, f64),
		current_z: u32,
		radius: SelectionRadius,
	) -> bool {
		match nearest_node(&self.nodes, transform, click, current_z, radius) {
			Some(node) => {
				self.active = Some(node.id.clone());
				true
			}
			None => false,
		}
	}

	/// Set the active node's type, or clear it if it already has that type.
	pub fn mark_type(&mut self, node_type: NodeType) -> bool {
		let Some(node) = self.active_node_mut() else {
			return false;
		};
		if node.protected {
			return false;
		}
		node.node_type = if node.node_type.as_ref() == Some(&node_type) {
			None
		} else {
			Some(node_type)
		};
		true
	}

	pub fn toggle_bookmark(&mut self) -> bool {
		let Some(node) = self.active_node_mut() else {
			return false;
		};
		node.bookmarked = !node.bookmarked;
		true
	}

	pub fn toggle_low_confidence(&mut self) -> bool {
		match self.active_node_mut() {
			Some(node) if !node.protected => {
				node.low_confidence = !node.low_confidence;
				true
			}
			_ => false,
		}
	}

	/// Position of the most recently added bookmark, else of the active node.
	pub fn pop_bookmark(&self) -> Option<Point3> {
		self.nodes
			.iter()
			.rev()
			.find(|n| n.bookmarked)
			.or_else(|| self.active_node())
			.map(Node::position)
	}

	/// Remove the active node if it is an unprotected leaf.
	///
	/// The former neighbour (if any) becomes active.
	pub fn delete_active(&mut self) -> Option<Node> {
		let node = self.active_node()?;
		if node.protected || self.degree(&node.id) > 1 {
			return None;
		}
		let id = node.id.clone();
		let replacement = self.neighbors(&id).into_iter().find(|&n| n != &id).cloned();

		self.edges.retain(|e| !e.touches(&id));
		let i = self.index.remove(&id)?;
		let removed = self.nodes.remove(i);
		self.reindex();
		self.active = replacement;
		debug!("deleted node {id}");
		Some(removed)
	}

	fn reindex(&mut self) {
		self.index = self
			.nodes
			.iter()
			.enumerate()
			.map(|(i, n)| (n.id.clone(), i))
			.collect();
	}

	/// Replace the whole graph.
	///
	/// With `active`, the graph is a resumed session and keeps its own protection flags.
	/// Without, it is a parent graph: every node becomes protected and the `initial` node
	/// (or the only node, which is tagged `initial`) becomes active.
	pub fn import_graph(&mut self, data: GraphData, active: Option<&NodeId>) -> ImportReport {
		let mut report = ImportReport::default();
		self.nodes.clear();
		self.index.clear();
		self.edges.clear();
		self.active = None;

		for node in data.nodes {
			if self.index.contains_key(&node.id) {
				report.push(ImportWarning::DuplicateNode(node.id));
				continue;
			}
			self.index.insert(node.id.clone(), self.nodes.len());
			self.nodes.push(node);
		}

		// edges are undirected for editing, so a->b and b->a are the same link
		let mut seen = HashSet::new();
		for edge in data.edges {
			if !self.index.contains_key(&edge.v) || !self.index.contains_key(&edge.w) {
				report.push(ImportWarning::DanglingEdge(edge));
				continue;
			}
			if edge.v == edge.w {
				report.push(ImportWarning::SelfLoop(edge.v));
				continue;
			}
			let pair = if edge.v < edge.w {
				(edge.v.clone(), edge.w.clone())
			} else {
				(edge.w.clone(), edge.v.clone())
			};
			if seen.insert(pair) {
				self.edges.push(edge);
			}
		}

		match active {
			Some(id) => {
				if !self.set_active(id) {
					report.push(ImportWarning::UnknownActive(id.clone()));
				}
			}
			None => self.protect_and_pick_initial(&mut report),
		}
		debug!(
			"imported {} nodes, {} edges, active {:?}",
			self.nodes.len(),
			self.edges.len(),
			self.active
		);
		report
	}

	fn protect_and_pick_initial(&mut self, report: &mut ImportReport) {
		if let [only] = self.nodes.as_mut_slice() {
			only.protected = true;
			only.node_type = Some(NodeType::Initial);
			self.active = Some(only.id.clone());
			return;
		}

		let mut initial: Option<NodeId> = None;
		for node in &mut self.nodes {
			node.protected = true;
			if node.node_type != Some(NodeType::Initial) {
				continue;
			}
			match &initial {
				Some(kept) => report.push(ImportWarning::MultipleInitial {
					kept: kept.clone(),
					ignored: node.id.clone(),
				}),
				None => initial = Some(node.id.clone()),
			}
		}
		self.active = initial;
	}

	/// Deep copy of the current contents, in the form `import_graph` accepts.
	pub fn export_graph(&self) -> GraphData {
		GraphData {
			nodes: self.nodes.clone(),
			edges: self.edges.clone(),
		}
	}
}

#[cfg(target_arch = "wasm32")]
fn now_ms() -> f64 {
	js_sys::Date::now()
}

#[cfg(not(target_arch = "wasm32"))]
fn now_ms() -> f64 {
	use std::time::{SystemTime, UNIX_EPOCH};
	SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.map(|d| d.as_secs_f64() * 1000.0)
		.unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn attrs(id: &str) -> NodeAttrs {
		NodeAttrs {
			id: Some(id.into()),
			..NodeAttrs::default()
		}
	}

	/// A-B-C, built by clicking, with C active.
	fn path() -> TraceGraph {
		let mut g = TraceGraph::new("tester");
		g.extend((0.0, 0.0), 0, attrs("A"));
		g.extend((1.0, 0.0), 0, attrs("B"));
		g.extend((2.0, 0.0), 1, attrs("C"));
		g
	}

	fn imported(nodes: &[(&str, Option<NodeType>)], edges: &[(&str, &str)]) -> GraphData {
		GraphData {
			nodes: nodes
				.iter()
				.enumerate()
				.map(|(i, (id, t))| Node {
					id: (*id).into(),
					x: i as f64,
					y: 0.0,
					z: 0,
					node_type: t.clone(),
					author: "parent".into(),
					created: 0.0,
					protected: false,
					bookmarked: false,
					low_confidence: false,
				})
				.collect(),
			edges: edges
				.iter()
				.map(|(v, w)| Edge {
					v: (*v).into(),
					w: (*w).into(),
				})
				.collect(),
		}
	}

	#[test]
	fn add_node_fills_defaults() {
		let mut g = TraceGraph::new("alice");
		let node = g.add_node((3.0, 4.0), 2, NodeAttrs::default()).clone();
		assert_eq!(node.author, "alice");
		assert!(node.created > 0.0);
		assert!(!node.protected);
		assert_eq!(g.len(), 1);
		assert_eq!(g.active(), None);

		let other = g.add_node(
			(0.0, 0.0),
			0,
			NodeAttrs {
				author: Some("bob".into()),
				node_type: Some(NodeType::Boundary),
				id: Some(node.id.clone()),
			},
		);
		assert_eq!(other.author, "bob");
		assert_ne!(other.id, node.id, "taken ids are replaced");
	}

	#[test]
	fn first_connect_sets_active_without_edge() {
		let mut g = TraceGraph::new("tester");
		let id = g.add_node((0.0, 0.0), 0, NodeAttrs::default()).id.clone();
		assert_eq!(g.connect_to_active(&id), None);
		assert_eq!(g.active(), Some(&id));

		let next = g.add_node((1.0, 1.0), 0, NodeAttrs::default()).id.clone();
		let edge = g.connect_to_active(&next).unwrap();
		assert_eq!((edge.v, edge.w), (id, next.clone()));
		assert_eq!(g.active(), Some(&next));
	}

	#[test]
	fn connect_to_unknown_node_is_ignored() {
		let mut g = path();
		assert_eq!(g.connect_to_active(&"nope".into()), None);
		assert_eq!(g.active(), Some(&NodeId::from("C")));
		assert_eq!(g.edges().len(), 2);
	}

	#[test]
	fn deleting_interior_node_is_rejected() {
		let mut g = path();
		assert!(g.set_active(&"B".into()));
		let before = g.export_graph();
		assert!(g.delete_active().is_none());
		assert_eq!(g.export_graph(), before);
		assert_eq!(g.active(), Some(&NodeId::from("B")));
	}

	#[test]
	fn deleting_leaf_moves_active_to_neighbor() {
		let mut g = path();
		let removed = g.delete_active().unwrap();
		assert_eq!(removed.id.as_str(), "C");
		assert_eq!(g.active(), Some(&NodeId::from("B")));
		assert_eq!(g.len(), 2);
		assert_eq!(g.edges().len(), 1);
		assert!(g.node(&"C".into()).is_none());
		assert_eq!(g.node(&"B".into()).map(|n| n.x), Some(1.0));
	}

	#[test]
	fn deleting_isolated_node_clears_active() {
		let mut g = TraceGraph::new("tester");
		g.extend((0.0, 0.0), 0, NodeAttrs::default());
		assert!(g.delete_active().is_some());
		assert!(g.is_empty());
		assert_eq!(g.active(), None);
		assert!(g.delete_active().is_none());
	}

	#[test]
	fn protected_nodes_cannot_be_deleted_or_retyped() {
		let mut g = TraceGraph::new("tester");
		g.import_graph(imported(&[("seed", None)], &[]), None);
		let before = g.export_graph();
		assert!(g.node(&"seed".into()).unwrap().protected);

		assert!(!g.mark_type(NodeType::Boundary));
		assert!(g.delete_active().is_none());
		assert!(!g.toggle_low_confidence());
		assert_eq!(g.export_graph(), before);
	}

	#[test]
	fn mark_type_toggles() {
		let mut g = path();
		assert!(g.mark_type(NodeType::Presynaptic));
		assert_eq!(g.active_node().unwrap().node_type, Some(NodeType::Presynaptic));
		assert!(g.mark_type(NodeType::Boundary));
		assert_eq!(g.active_node().unwrap().node_type, Some(NodeType::Boundary));
		assert!(g.mark_type(NodeType::Boundary));
		assert_eq!(g.active_node().unwrap().node_type, None);
		assert_eq!(g.count_of_type(&NodeType::Boundary), 0);
	}

	#[test]
	fn edits_without_active_node_are_noops() {
		let mut g = TraceGraph::new("tester");
		assert!(!g.mark_type(NodeType::Initial));
		assert!(!g.toggle_bookmark());
		assert!(g.delete_active().is_none());
		assert_eq!(g.pop_bookmark(), None);
		assert!(!g.set_active(&"ghost".into()));
	}

	#[test]
	fn pop_bookmark_prefers_latest_bookmark() {
		let mut g = path();
		assert_eq!(g.pop_bookmark(), Some(Point3 { x: 2.0, y: 0.0, z: 1 }));

		g.set_active(&"A".into());
		g.toggle_bookmark();
		g.set_active(&"B".into());
		g.toggle_bookmark();
		g.set_active(&"C".into());
		assert_eq!(g.pop_bookmark(), Some(Point3 { x: 1.0, y: 0.0, z: 0 }));

		g.set_active(&"B".into());
		g.toggle_bookmark();
		assert_eq!(g.pop_bookmark(), Some(Point3 { x: 0.0, y: 0.0, z: 0 }));
	}

	#[test]
	fn import_single_node_becomes_initial_and_active() {
		let mut g = TraceGraph::new("tester");
		let report = g.import_graph(imported(&[("seed", None)], &[]), None);
		assert!(report.is_clean());
		let seed = g.active_node().unwrap();
		assert_eq!(seed.id.as_str(), "seed");
		assert_eq!(seed.node_type, Some(NodeType::Initial));
		assert!(seed.protected);
	}

	#[test]
	fn import_parent_graph_protects_and_activates_initial() {
		let mut g = TraceGraph::new("tester");
		let data = imported(
			&[("a", None), ("b", Some(NodeType::Initial)), ("c", None)],
			&[("a", "b"), ("b", "c")],
		);
		let report = g.import_graph(data, None);
		assert!(report.is_clean());
		assert_eq!(g.active(), Some(&NodeId::from("b")));
		assert!(g.nodes().iter().all(|n| n.protected));

		// new work hangs off the protected seed
		let id = g.extend((5.0, 5.0), 0, NodeAttrs::default());
		assert_eq!(g.degree(&"b".into()), 3);
		assert!(!g.node(&id).unwrap().protected);
	}

	#[test]
	fn import_with_two_initial_nodes_warns_and_keeps_first() {
		let mut g = TraceGraph::new("tester");
		let data = imported(
			&[
				("x", None),
				("first", Some(NodeType::Initial)),
				("second", Some(NodeType::Initial)),
			],
			&[],
		);
		let report = g.import_graph(data, None);
		assert_eq!(
			report.warnings,
			vec![ImportWarning::MultipleInitial {
				kept: "first".into(),
				ignored: "second".into(),
			}]
		);
		assert_eq!(g.active(), Some(&NodeId::from("first")));
		assert_eq!(g.len(), 3);
	}

	#[test]
	fn import_without_initial_leaves_no_active() {
		let mut g = TraceGraph::new("tester");
		g.import_graph(imported(&[("a", None), ("b", None)], &[("a", "b")]), None);
		assert_eq!(g.active(), None);
	}

	#[test]
	fn import_with_active_id_keeps_protection_flags() {
		let mut g = path();
		g.mark_type(NodeType::Boundary);
		let saved = g.export_graph();

		let mut resumed = TraceGraph::new("tester");
		let report = resumed.import_graph(saved.clone(), Some(&"B".into()));
		assert!(report.is_clean());
		assert_eq!(resumed.active(), Some(&NodeId::from("B")));
		assert!(resumed.nodes().iter().all(|n| !n.protected));
		assert_eq!(resumed.export_graph(), saved);
	}

	#[test]
	fn import_drops_duplicates_and_dangling_edges() {
		let mut g = TraceGraph::new("tester");
		let data = imported(
			&[("a", None), ("a", None), ("b", None)],
			&[("a", "b"), ("a", "b"), ("a", "zzz")],
		);
		let report = g.import_graph(data, Some(&"missing".into()));
		assert_eq!(g.len(), 2);
		assert_eq!(g.edges().len(), 1);
		assert_eq!(g.active(), None);
		assert_eq!(report.warnings.len(), 3);
		assert!(matches!(report.warnings[0], ImportWarning::DuplicateNode(_)));
		assert!(matches!(report.warnings[1], ImportWarning::DanglingEdge(_)));
		assert!(matches!(report.warnings[2], ImportWarning::UnknownActive(_)));
	}

	#[test]
	fn reconnecting_linked_nodes_adds_no_edge() {
		let mut g = TraceGraph::new("tester");
		g.extend((0.0, 0.0), 0, attrs("A"));
		g.extend((1.0, 0.0), 0, attrs("B"));
		assert!(g.set_active(&"A".into()));

		assert_eq!(g.connect_to_active(&"B".into()), None);
		assert_eq!(g.active(), Some(&NodeId::from("B")));
		assert_eq!(g.edges().len(), 1);
		assert_eq!(g.degree(&"B".into()), 1);
		assert_eq!(g.delete_active().map(|n| n.id), Some(NodeId::from("B")));
		assert_eq!(g.active(), Some(&NodeId::from("A")));
	}

	#[test]
	fn import_merges_reversed_edges() {
		let mut g = TraceGraph::new("tester");
		let data = imported(&[("a", None), ("b", None)], &[("a", "b"), ("b", "a")]);
		let report = g.import_graph(data, Some(&"b".into()));
		assert!(report.is_clean());
		assert_eq!(g.edges().len(), 1);
		assert_eq!(g.degree(&"b".into()), 1);
		assert!(g.delete_active().is_some());
		assert_eq!(g.active(), Some(&NodeId::from("a")));
	}

	#[test]
	fn import_drops_self_loops() {
		let mut g = TraceGraph::new("tester");
		let data = imported(&[("a", None)], &[("a", "a")]);
		let report = g.import_graph(data, Some(&"a".into()));
		assert_eq!(report.warnings, vec![ImportWarning::SelfLoop("a".into())]);
		assert!(g.edges().is_empty());

		assert_eq!(g.delete_active().map(|n| n.id), Some(NodeId::from("a")));
		assert_eq!(g.active(), None);
		assert!(g.is_empty());
	}

	#[test]
	fn export_is_independent_of_the_store() {
		let mut g = path();
		let mut exported = g.export_graph();
		exported.nodes[0].x = 999.0;
		exported.edges.clear();
		assert_eq!(g.node(&"A".into()).unwrap().x, 0.0);
		assert_eq!(g.edges().len(), 2);

		g.mark_type(NodeType::Boundary);
		assert_eq!(exported.nodes[2].node_type, None);
	}

	#[test]
	fn select_at_activates_nearest() {
		let mut g = path();
		let view = ViewTransform {
			x: 100.0,
			y: 100.0,
			k: 10.0,
		};
		assert!(g.select_at(&view, (111.0, 101.0), 0, SelectionRadius::TRACE));
		assert_eq!(g.active(), Some(&NodeId::from("B")));
		assert!(!g.select_at(&view, (400.0, 400.0), 0, SelectionRadius::TRACE));
		assert_eq!(g.active(), Some(&NodeId::from("B")));
	}

	#[test]
	fn node_types_are_distinct_and_sorted() {
		let mut g = path();
		g.mark_type(NodeType::Presynaptic);
		g.set_active(&"A".into());
		g.mark_type(NodeType::Boundary);
		assert_eq!(g.node_types(), vec![NodeType::Presynaptic, NodeType::Boundary]);
		assert_eq!(g.selected_z(7), 0);
		assert_eq!(TraceGraph::new("x").selected_z(7), 7);
	}
}
