use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::{info, warn};
use wasm_bindgen::prelude::*;
use web_sys::{
	CanvasRenderingContext2d, HtmlCanvasElement, KeyboardEvent, MouseEvent, WheelEvent, Window,
};

use super::cache::{self, BrowserStorage};
use super::interchange::VolumeBounds;
use super::render;
use super::state::{Command, EditorConfig, MouseButton, TraceGraphState};
use super::store::TraceGraph;
use super::types::{GraphData, NodeId};
use super::viewport::Viewport;

type Shared<T> = Rc<RefCell<Option<T>>>;

fn canvas_point(canvas: &HtmlCanvasElement, ev: &MouseEvent) -> (f64, f64) {
	let rect = canvas.get_bounding_client_rect();
	(
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	)
}

/// Interactive trace editor over one volume.
///
/// `data` is the parent graph in editor space. With a `storage_key`, a cached session under
/// that key is resumed instead, and `s` saves the session. `Enter` hands the graph to
/// `on_submit` and clears the saved session. Instruction hotkeys take precedence over both.
#[component]
pub fn TraceGraphCanvas(
	#[prop(into)] data: Signal<GraphData>,
	volume: VolumeBounds,
	#[prop(optional)] active: Option<NodeId>,
	#[prop(optional)] config: EditorConfig,
	#[prop(optional, into)] storage_key: Option<String>,
	#[prop(optional)] on_submit: Option<Callback<GraphData>>,
	#[prop(default = true)] fullscreen: bool,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state: Shared<TraceGraphState> = Rc::new(RefCell::new(None));
	let animate: Shared<Closure<dyn FnMut()>> = Rc::new(RefCell::new(None));
	let resize_cb: Shared<Closure<dyn FnMut()>> = Rc::new(RefCell::new(None));
	let key_cb: Shared<Closure<dyn FnMut(KeyboardEvent)>> = Rc::new(RefCell::new(None));
	let (state_init, animate_init, resize_cb_init, key_cb_init) =
		(state.clone(), animate.clone(), resize_cb.clone(), key_cb.clone());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let window: Window = web_sys::window().unwrap();

		let (w, h) = if fullscreen {
			(
				window.inner_width().unwrap().as_f64().unwrap(),
				window.inner_height().unwrap().as_f64().unwrap(),
			)
		} else {
			(
				canvas
					.parent_element()
					.map(|p| p.client_width() as f64)
					.unwrap_or(800.0),
				canvas
					.parent_element()
					.map(|p| p.client_height() as f64)
					.unwrap_or(600.0),
			)
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let ctx: CanvasRenderingContext2d = canvas
			.get_context("2d")
			.unwrap()
			.unwrap()
			.dyn_into()
			.unwrap();

		let mut graph = TraceGraph::new(config.author.clone());
		let report = match (&storage_key, BrowserStorage::local()) {
			(Some(key), Ok(storage)) => {
				cache::restore_or_import(&mut graph, &storage, key, data.get(), active.as_ref())
			}
			_ => graph.import_graph(data.get(), active.as_ref()),
		};
		if !report.is_clean() {
			warn!("graph loaded with {} warnings", report.warnings.len());
		}
		let mut viewport = Viewport::new(
			w,
			h,
			(volume.width(), volume.height()),
			volume.slice_count(),
		);
		viewport.reset(graph.active_node().map(|n| n.z));
		*state_init.borrow_mut() = Some(TraceGraphState::new(graph, viewport, config.clone()));

		if fullscreen {
			let (state_resize, canvas_resize) = (state_init.clone(), canvas.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let win: Window = web_sys::window().unwrap();
				let (nw, nh) = (
					win.inner_width().unwrap().as_f64().unwrap(),
					win.inner_height().unwrap().as_f64().unwrap(),
				);
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				if let Some(ref mut s) = *state_resize.borrow_mut() {
					s.resize(nw, nh);
				}
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		let (state_key, storage_key) = (state_init.clone(), storage_key.clone());
		*key_cb_init.borrow_mut() = Some(Closure::new(move |ev: KeyboardEvent| {
			let mut guard = state_key.borrow_mut();
			let Some(s) = guard.as_mut() else {
				return;
			};
			match s.key_pressed(&ev.key()) {
				Some(Command::Save) => {
					if let Some(key) = &storage_key {
						let saved = BrowserStorage::local()
							.and_then(|mut storage| cache::save_snapshot(&mut storage, key, &s.graph));
						match saved {
							Ok(()) => info!("saved session {key}"),
							Err(e) => warn!("could not save session {key}: {e}"),
						}
					}
				}
				Some(Command::Submit) => {
					let Some(cb) = on_submit else {
						return;
					};
					let Some(key) = &storage_key else {
						cb.run(s.graph.export_graph());
						return;
					};
					match BrowserStorage::local() {
						Ok(mut storage) => {
							let submitted =
								cache::submit_session(&mut storage, key, &s.graph, |data| cb.run(data));
							if let Err(e) = submitted {
								warn!("could not clear session {key}: {e}");
							}
						}
						Err(e) => {
							warn!("session storage unavailable, {key} not cleared: {e}");
							cb.run(s.graph.export_graph());
						}
					}
				}
				Some(_) => ev.prevent_default(),
				None => {}
			}
		}));
		if let Some(ref cb) = *key_cb_init.borrow() {
			let _ = window.add_event_listener_with_callback("keydown", cb.as_ref().unchecked_ref());
		}

		let (state_anim, animate_inner) = (state_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if let Some(ref s) = *state_anim.borrow() {
				render::render(s, &ctx);
			}
			if let Some(ref cb) = *animate_inner.borrow() {
				let _ = web_sys::window()
					.unwrap()
					.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let canvas: HtmlCanvasElement = canvas_ref.get().unwrap().into();
		let (x, y) = canvas_point(&canvas, &ev);
		if let Some(ref mut s) = *state_md.borrow_mut() {
			s.mouse_pressed(MouseButton::from_dom(ev.button()), x, y);
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let canvas: HtmlCanvasElement = canvas_ref.get().unwrap().into();
		let (x, y) = canvas_point(&canvas, &ev);
		if let Some(ref mut s) = *state_mm.borrow_mut() {
			s.mouse_moved(x, y);
		}
	};

	let state_mu = state.clone();
	let on_mouseup = move |ev: MouseEvent| {
		let canvas: HtmlCanvasElement = canvas_ref.get().unwrap().into();
		let (x, y) = canvas_point(&canvas, &ev);
		if let Some(ref mut s) = *state_mu.borrow_mut() {
			s.mouse_released(MouseButton::from_dom(ev.button()), x, y);
		}
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_ml.borrow_mut() {
			s.mouse_left();
		}
	};

	let state_wh = state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		if let Some(ref mut s) = *state_wh.borrow_mut() {
			s.wheel(ev.delta_y(), ev.ctrl_key() || ev.shift_key());
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="trace-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			on:contextmenu=|ev: MouseEvent| ev.prevent_default()
			style="display: block; cursor: crosshair;"
		/>
	}
}
