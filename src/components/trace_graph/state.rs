use log::debug;

use super::selection::SelectionRadius;
use super::store::TraceGraph;
use super::types::{NodeAttrs, NodeId, NodeType};
use super::viewport::Viewport;

/// Instruction-defined key that tags the active node with a type.
#[derive(Clone, Debug, PartialEq)]
pub struct TypeHotkey {
	pub key: String,
	pub node_type: NodeType,
}

#[derive(Clone, Debug)]
pub struct EditorConfig {
	pub author: String,
	pub selection: SelectionRadius,
	pub hotkeys: Vec<TypeHotkey>,
}

impl Default for EditorConfig {
	fn default() -> Self {
		Self {
			author: "anonymous".into(),
			selection: SelectionRadius::TRACE,
			hotkeys: vec![
				TypeHotkey {
					key: "a".into(),
					node_type: NodeType::Presynaptic,
				},
				TypeHotkey {
					key: "d".into(),
					node_type: NodeType::Postsynaptic,
				},
				TypeHotkey {
					key: "b".into(),
					node_type: NodeType::Boundary,
				},
			],
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MouseButton {
	Left,
	Middle,
	Right,
}

impl MouseButton {
	/// From `MouseEvent.button`.
	pub fn from_dom(button: i16) -> Self {
		match button {
			1 => MouseButton::Middle,
			2 => MouseButton::Right,
			_ => MouseButton::Left,
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub enum Command {
	PanUp,
	PanDown,
	PanLeft,
	PanRight,
	ScaleUp,
	ScaleDown,
	PrevSlice,
	NextSlice,
	Reset,
	StopHinting,
	ToggleVisibility,
	Bookmark,
	PopBookmark,
	DeleteActive,
	MarkType(NodeType),
	ToggleLowConfidence,
	/// Save the session snapshot. Carried out by the host, which owns the storage.
	Save,
	/// Hand the graph to the host's submit callback.
	Submit,
}

impl Command {
	/// Map a `KeyboardEvent.key`. Type hotkeys win over the fixed bindings.
	pub fn from_key(key: &str, hotkeys: &[TypeHotkey]) -> Option<Self> {
		if let Some(hotkey) = hotkeys.iter().find(|h| h.key == key) {
			return Some(Command::MarkType(hotkey.node_type.clone()));
		}
		// arrows move the image opposite to the camera
		let cmd = match key {
			"ArrowUp" => Command::PanDown,
			"ArrowDown" => Command::PanUp,
			"ArrowLeft" => Command::PanRight,
			"ArrowRight" => Command::PanLeft,
			"q" => Command::PrevSlice,
			"e" => Command::NextSlice,
			"+" | "=" => Command::ScaleUp,
			"-" => Command::ScaleDown,
			"Escape" => Command::Reset,
			"h" => Command::StopHinting,
			"t" => Command::ToggleVisibility,
			"1" | "!" => Command::Bookmark,
			"2" | "@" => Command::PopBookmark,
			"Backspace" => Command::DeleteActive,
			"l" => Command::ToggleLowConfidence,
			"s" => Command::Save,
			"Enter" => Command::Submit,
			_ => return None,
		};
		Some(cmd)
	}
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub last_x: f64,
	pub last_y: f64,
}

/// The graph being edited plus the view onto it, driven by input events.
pub struct TraceGraphState {
	pub graph: TraceGraph,
	pub viewport: Viewport,
	pub config: EditorConfig,
	pub pan: PanState,
	/// Left button is down: preview where the next node will land.
	pub hinting: bool,
	pub cursor: Option<(f64, f64)>,
	pub visible: bool,
}

impl TraceGraphState {
	pub fn new(graph: TraceGraph, viewport: Viewport, config: EditorConfig) -> Self {
		Self {
			graph,
			viewport,
			config,
			pan: PanState::default(),
			hinting: false,
			cursor: None,
			visible: true,
		}
	}

	pub fn mouse_pressed(&mut self, button: MouseButton, sx: f64, sy: f64) {
		match button {
			MouseButton::Right => {
				let transform = self.viewport.transform();
				self.graph.select_at(
					&transform,
					(sx, sy),
					self.viewport.current_z,
					self.config.selection,
				);
				if self.viewport.image_collision(sx, sy) {
					self.pan = PanState {
						active: true,
						last_x: sx,
						last_y: sy,
					};
				}
			}
			MouseButton::Left => self.hinting = true,
			MouseButton::Middle => {}
		}
	}

	pub fn mouse_moved(&mut self, sx: f64, sy: f64) {
		self.cursor = Some((sx, sy));
		if self.pan.active {
			self.viewport
				.drag_by(sx - self.pan.last_x, sy - self.pan.last_y);
			self.pan.last_x = sx;
			self.pan.last_y = sy;
		}
	}

	pub fn mouse_released(&mut self, button: MouseButton, sx: f64, sy: f64) -> Option<NodeId> {
		self.pan.active = false;
		if button != MouseButton::Left {
			return None;
		}
		self.mouse_clicked(sx, sy)
	}

	/// Left click on the image places a node on the current slice, linked to the active one.
	pub fn mouse_clicked(&mut self, sx: f64, sy: f64) -> Option<NodeId> {
		let hit = self.viewport.image_collision(sx, sy);
		self.hinting = false;
		if !hit {
			return None;
		}
		let position = self.viewport.cursor_data(sx, sy);
		Some(
			self.graph
				.extend(position, self.viewport.current_z, NodeAttrs::default()),
		)
	}

	pub fn mouse_left(&mut self) {
		self.pan.active = false;
		self.hinting = false;
		self.cursor = None;
	}

	/// Wheel scrolls through slices, or zooms with ctrl/shift held.
	pub fn wheel(&mut self, delta_y: f64, zoom: bool) {
		match (zoom, delta_y > 0.0) {
			(true, true) => self.viewport.scale_down(),
			(true, false) => self.viewport.scale_up(),
			(false, true) => self.viewport.increment_z(),
			(false, false) => self.viewport.decrement_z(),
		}
	}

	/// Apply the command bound to `key` and return it, so the host can act on
	/// [`Command::Save`] and [`Command::Submit`].
	pub fn key_pressed(&mut self, key: &str) -> Option<Command> {
		let cmd = Command::from_key(key, &self.config.hotkeys)?;
		self.apply(cmd.clone());
		Some(cmd)
	}

	pub fn apply(&mut self, cmd: Command) {
		debug!("command {:?}", cmd);
		let v = &mut self.viewport;
		match cmd {
			Command::PanUp => v.pan_up(),
			Command::PanDown => v.pan_down(),
			Command::PanLeft => v.pan_left(),
			Command::PanRight => v.pan_right(),
			Command::ScaleUp => v.scale_up(),
			Command::ScaleDown => v.scale_down(),
			Command::PrevSlice => v.decrement_z(),
			Command::NextSlice => v.increment_z(),
			Command::Reset => {
				let z = self.graph.selected_z(v.current_z);
				v.reset(Some(z));
			}
			Command::StopHinting => self.hinting = false,
			Command::ToggleVisibility => self.visible = !self.visible,
			Command::Bookmark => {
				self.graph.toggle_bookmark();
			}
			Command::PopBookmark => {
				if let Some(p) = self.graph.pop_bookmark() {
					v.set_z(p.z);
				}
			}
			Command::DeleteActive => {
				self.graph.delete_active();
			}
			Command::MarkType(t) => {
				self.graph.mark_type(t);
			}
			Command::ToggleLowConfidence => {
				self.graph.toggle_low_confidence();
			}
			Command::Save | Command::Submit => {}
		}
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.viewport.resize(width, height);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn state() -> TraceGraphState {
		TraceGraphState::new(
			TraceGraph::new("tester"),
			Viewport::new(800.0, 600.0, (400.0, 400.0), 20),
			EditorConfig::default(),
		)
	}

	#[test]
	fn clicks_on_image_extend_the_trace() {
		let mut s = state();
		let a = s.mouse_clicked(400.0, 300.0).unwrap();
		s.apply(Command::NextSlice);
		let b = s.mouse_clicked(420.0, 310.0).unwrap();

		assert_eq!(s.graph.len(), 2);
		assert_eq!(s.graph.active(), Some(&b));
		assert_eq!(s.graph.degree(&a), 1);
		let node = s.graph.node(&b).unwrap();
		assert_eq!((node.x, node.y, node.z), (20.0, 10.0, 11));
	}

	#[test]
	fn clicks_off_image_do_nothing() {
		let mut s = state();
		s.mouse_pressed(MouseButton::Left, 10.0, 10.0);
		assert!(s.hinting);
		assert!(s.mouse_released(MouseButton::Left, 10.0, 10.0).is_none());
		assert!(!s.hinting);
		assert!(s.graph.is_empty());
	}

	#[test]
	fn right_click_selects_and_drags() {
		let mut s = state();
		let a = s.mouse_clicked(400.0, 300.0).unwrap();
		s.mouse_clicked(450.0, 300.0);

		s.mouse_pressed(MouseButton::Right, 403.0, 302.0);
		assert_eq!(s.graph.active(), Some(&a));
		s.mouse_moved(413.0, 302.0);
		s.mouse_released(MouseButton::Right, 413.0, 302.0);
		assert_eq!(s.viewport.position, (410.0, 300.0));
		s.mouse_moved(500.0, 500.0);
		assert_eq!(s.viewport.position, (410.0, 300.0));
	}

	#[test]
	fn keys_dispatch_through_hotkeys_first() {
		let mut s = state();
		s.mouse_clicked(400.0, 300.0);
		assert!(s.key_pressed("a").is_some());
		assert_eq!(
			s.graph.active_node().unwrap().node_type,
			Some(NodeType::Presynaptic)
		);
		assert!(s.key_pressed("z").is_none());
		assert_eq!(Command::from_key("ArrowUp", &[]), Some(Command::PanDown));
	}

	#[test]
	fn session_keys_yield_to_type_hotkeys() {
		let mut s = state();
		assert_eq!(s.key_pressed("s"), Some(Command::Save));
		assert_eq!(s.key_pressed("Enter"), Some(Command::Submit));

		s.config.hotkeys.push(TypeHotkey {
			key: "s".into(),
			node_type: NodeType::new("soma"),
		});
		s.mouse_clicked(400.0, 300.0);
		assert_eq!(
			s.key_pressed("s"),
			Some(Command::MarkType(NodeType::new("soma")))
		);
		assert_eq!(
			s.graph.active_node().unwrap().node_type,
			Some(NodeType::new("soma"))
		);
	}

	#[test]
	fn pop_bookmark_jumps_slice_and_reset_returns_to_active() {
		let mut s = state();
		s.mouse_clicked(400.0, 300.0);
		s.apply(Command::Bookmark);
		for _ in 0..5 {
			s.apply(Command::NextSlice);
		}
		s.mouse_clicked(400.0, 300.0);
		assert_eq!(s.viewport.current_z, 15);

		s.apply(Command::PopBookmark);
		assert_eq!(s.viewport.current_z, 10);

		s.apply(Command::ScaleUp);
		s.apply(Command::Reset);
		assert_eq!((s.viewport.current_z, s.viewport.scale), (15, 1.0));
	}

	#[test]
	fn wheel_scrolls_or_zooms() {
		let mut s = state();
		s.wheel(1.0, false);
		assert_eq!(s.viewport.current_z, 11);
		s.wheel(-1.0, true);
		assert!((s.viewport.scale - 1.1).abs() < 1e-9);
	}

	#[test]
	fn delete_key_removes_leaf() {
		let mut s = state();
		let a = s.mouse_clicked(400.0, 300.0).unwrap();
		s.mouse_clicked(410.0, 300.0);
		assert_eq!(s.key_pressed("Backspace"), Some(Command::DeleteActive));
		assert_eq!(s.graph.len(), 1);
		assert_eq!(s.graph.active(), Some(&a));
	}
}
