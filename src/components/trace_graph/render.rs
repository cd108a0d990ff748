use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::palette::{self, Rgb};
use super::state::TraceGraphState;
use super::types::{Node, NodeType};

const DEFAULT_RADIUS: f64 = 7.0;
const SPECIAL_RADIUS: f64 = 25.0;
const BOOKMARK_RADIUS: f64 = 20.0;
const CENTROID_RADIUS: f64 = 10.0;
const ACTIVE_RADIUS: f64 = 20.0;
const EDGE_WIDTH: f64 = 3.0;
/// Edges further than this many slices from the current one are drawn faded.
const EDGE_FADE_SLICES: u32 = 20;

/// 1.0 on the current slice, falling off with the squared slice distance.
fn depth_alpha(z: u32, current_z: u32) -> f64 {
	let d = z.abs_diff(current_z) as f64;
	((255.0 - d * d) / 255.0).max(0.0)
}

fn node_style(node: &Node) -> (Rgb, f64) {
	if node.bookmarked {
		return (palette::BOOKMARK, BOOKMARK_RADIUS);
	}
	match &node.node_type {
		Some(t @ (NodeType::Initial | NodeType::Boundary)) => (palette::type_color(t), BOOKMARK_RADIUS),
		Some(t) => (palette::type_color(t), SPECIAL_RADIUS),
		None => (palette::DEFAULT_NODE, DEFAULT_RADIUS),
	}
}

pub fn render(state: &TraceGraphState, ctx: &CanvasRenderingContext2d) {
	let vp = &state.viewport;
	ctx.set_fill_style_str("#1a1a2e");
	ctx.fill_rect(0.0, 0.0, vp.width, vp.height);
	draw_image_border(state, ctx);
	if !state.visible {
		return;
	}
	draw_edges(state, ctx);
	draw_nodes(state, ctx);
	draw_active(state, ctx);
	draw_hint(state, ctx);
}

fn draw_image_border(state: &TraceGraphState, ctx: &CanvasRenderingContext2d) {
	let vp = &state.viewport;
	let (w, h) = (vp.image_width * vp.scale, vp.image_height * vp.scale);
	ctx.set_stroke_style_str("rgba(255, 255, 255, 0.3)");
	ctx.set_line_width(1.0);
	ctx.stroke_rect(vp.position.0 - w / 2.0, vp.position.1 - h / 2.0, w, h);
}

fn draw_edges(state: &TraceGraphState, ctx: &CanvasRenderingContext2d) {
	let (t, current_z) = (state.viewport.transform(), state.viewport.current_z);

	for edge in state.graph.edges() {
		let (Some(v), Some(w)) = (state.graph.node(&edge.v), state.graph.node(&edge.w)) else {
			continue;
		};
		let (x1, y1) = t.to_screen(v.x, v.y);
		let (x2, y2) = t.to_screen(w.x, w.y);

		if w.z.abs_diff(current_z) > EDGE_FADE_SLICES {
			let mut fade = (v.z + 1) as f64 / (current_z + 1) as f64;
			if fade > 1.0 {
				fade = 1.0 / fade;
			}
			ctx.set_line_width(EDGE_WIDTH * fade);
			ctx.set_stroke_style_str(&format!("rgba(0, 0, 0, {})", fade * 0.5));
		} else {
			ctx.set_line_width(EDGE_WIDTH);
			ctx.set_stroke_style_str(&palette::DEFAULT_EDGE.css(1.0));
		}
		ctx.begin_path();
		ctx.move_to(x1, y1);
		ctx.line_to(x2, y2);
		ctx.stroke();
	}
}

fn draw_nodes(state: &TraceGraphState, ctx: &CanvasRenderingContext2d) {
	let (t, current_z) = (state.viewport.transform(), state.viewport.current_z);

	for node in state.graph.nodes() {
		let (x, y) = t.to_screen(node.x, node.y);
		let alpha = depth_alpha(node.z, current_z);
		let (color, diameter) = node_style(node);

		ctx.begin_path();
		let _ = ctx.arc(x, y, diameter / 2.0, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(&color.css(alpha));
		ctx.fill();

		// centroid marks nodes on the current slice
		if node.z == current_z {
			ctx.begin_path();
			let _ = ctx.arc(x, y, CENTROID_RADIUS / 2.0, 0.0, 2.0 * PI);
			ctx.set_fill_style_str(&palette::CENTROID.css(1.0));
			ctx.fill();
		}
		if node.low_confidence {
			ctx.begin_path();
			let _ = ctx.arc(x, y, 0.45 * CENTROID_RADIUS, PI / 2.0, 3.0 * PI / 2.0);
			ctx.set_fill_style_str(&format!("rgba(255, 255, 255, {alpha})"));
			ctx.fill();
		}
	}
}

fn draw_active(state: &TraceGraphState, ctx: &CanvasRenderingContext2d) {
	let Some(node) = state.graph.active_node() else {
		return;
	};
	let t = state.viewport.transform();
	let (x, y) = t.to_screen(node.x, node.y);
	let d = node.z.abs_diff(state.viewport.current_z) as f64;
	let alpha = ((255.0 - (d * d - 20.0)) / 255.0).clamp(0.0, 1.0);

	ctx.begin_path();
	let _ = ctx.arc(x, y, ACTIVE_RADIUS / 2.0, 0.0, 2.0 * PI);
	ctx.set_fill_style_str(&palette::ACTIVE_NODE.css(alpha));
	ctx.fill();
}

/// While the button is down, preview the node and edge a release would create.
fn draw_hint(state: &TraceGraphState, ctx: &CanvasRenderingContext2d) {
	let (true, Some((mx, my))) = (state.hinting, state.cursor) else {
		return;
	};
	if let Some(active) = state.graph.active_node() {
		let (ax, ay) = state.viewport.transform().to_screen(active.x, active.y);
		ctx.set_line_width(EDGE_WIDTH);
		ctx.set_stroke_style_str("rgba(0, 0, 0, 0.5)");
		ctx.begin_path();
		ctx.move_to(ax, ay);
		ctx.line_to(mx, my);
		ctx.stroke();
	}
	ctx.begin_path();
	let _ = ctx.arc(mx, my, 5.0, 0.0, 2.0 * PI);
	ctx.set_fill_style_str("rgba(255, 0, 0, 0.5)");
	ctx.fill();
}
