use super::transform::ViewTransform;
use super::types::Node;

/// How far from the cursor (screen pixels) and the current slice (z) a node stays selectable.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SelectionRadius {
	pub pixels: f64,
	pub slices: u32,
}

impl SelectionRadius {
	/// Neuron tracing (breadcrumbs, nazca).
	pub const TRACE: Self = Self {
		pixels: 15.0,
		slices: 20,
	};
	/// Synapse matching.
	pub const MATCH: Self = Self {
		pixels: 15.0,
		slices: 5,
	};
	/// Point-cloud marking.
	pub const POINT_CLOUD: Self = Self {
		pixels: 10.0,
		slices: 10,
	};
}

impl Default for SelectionRadius {
	fn default() -> Self {
		Self::TRACE
	}
}

/// Nearest node to the screen point `(sx, sy)` within `radius`, or `None`.
///
/// Ties keep the earliest node in iteration order.
pub fn nearest_node<'a, I>(
	nodes: I,
	transform: &ViewTransform,
	(sx, sy): (f64, f64),
	current_z: u32,
	radius: SelectionRadius,
) -> Option<&'a Node>
where
	I: IntoIterator<Item = &'a Node>,
{
	let max_sq = radius.pixels * radius.pixels;
	let mut best: Option<(&Node, f64)> = None;

	for node in nodes {
		if node.z.abs_diff(current_z) >= radius.slices {
			continue;
		}
		let (nx, ny) = transform.to_screen(node.x, node.y);
		let (dx, dy) = (nx - sx, ny - sy);
		let dist_sq = dx * dx + dy * dy;
		if dist_sq >= max_sq {
			continue;
		}
		if best.is_none_or(|(_, d)| dist_sq < d) {
			best = Some((node, dist_sq));
		}
	}
	best.map(|(node, _)| node)
}
