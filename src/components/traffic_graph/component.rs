use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use leptos::prelude::*;
use log::{debug, trace};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent};

use super::engine::{EngineEvent, TrafficEngine};
use super::props::{VizProps, diff, initial_commands};
use super::render;

/// Pointer travel, in pixels, below which a press counts as a click.
const CLICK_SLOP: f64 = 3.0;

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

#[derive(Clone, Copy)]
struct Handlers {
	view_changed: Option<Callback<Vec<String>>>,
	object_highlighted: Option<Callback<Option<String>>>,
	object_hovered: Option<Callback<Option<String>>>,
	matches_found: Option<Callback<(usize, usize)>>,
}

impl Handlers {
	fn emit(&self, events: Vec<EngineEvent>) {
		for event in events {
			trace!("Engine event {:?}", event);
			match event {
				EngineEvent::ViewChanged(view) => {
					if let Some(cb) = self.view_changed {
						cb.run(view);
					}
				}
				EngineEvent::ObjectHighlighted(name) => {
					if let Some(cb) = self.object_highlighted {
						cb.run(name);
					}
				}
				EngineEvent::ObjectHovered(name) => {
					if let Some(cb) = self.object_hovered {
						cb.run(name);
					}
				}
				EngineEvent::MatchesFound { total, visible } => {
					if let Some(cb) = self.matches_found {
						cb.run((total, visible));
					}
				}
			}
		}
	}
}

fn now_ms() -> f64 {
	web_sys::window()
		.and_then(|w| w.performance())
		.map_or_else(js_sys::Date::now, |p| p.now())
}

fn canvas_size(canvas: &HtmlCanvasElement) -> (f64, f64) {
	canvas
		.parent_element()
		.map(|p| (p.client_width() as f64, p.client_height() as f64))
		.filter(|(w, h)| *w > 0.0 && *h > 0.0)
		.unwrap_or((800.0, 600.0))
}

/// Draws live traffic of the level `props.view` points at.
///
/// Prop changes are diffed against the previous props and only the engine
/// calls they require are issued.
#[component]
pub fn TrafficGraph(
	#[prop(into)] props: Signal<VizProps>,
	#[prop(optional, into)] on_view_changed: Option<Callback<Vec<String>>>,
	#[prop(optional, into)] on_object_highlighted: Option<Callback<Option<String>>>,
	#[prop(optional, into)] on_object_hovered: Option<Callback<Option<String>>>,
	#[prop(optional, into)] on_matches_found: Option<Callback<(usize, usize)>>,
	/// Frames per second to draw at; unthrottled when unset.
	#[prop(default = None)]
	target_framerate: Option<f64>,
) -> impl IntoView {
	let handlers = Handlers {
		view_changed: on_view_changed,
		object_highlighted: on_object_highlighted,
		object_hovered: on_object_hovered,
		matches_found: on_matches_found,
	};
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let engine: Rc<RefCell<Option<TrafficEngine>>> = Rc::new(RefCell::new(None));
	let previous: Rc<RefCell<Option<VizProps>>> = Rc::new(RefCell::new(None));
	let animate: FrameCallback = Rc::new(RefCell::new(None));
	let resize_cb: FrameCallback = Rc::new(RefCell::new(None));
	let alive = Arc::new(AtomicBool::new(true));
	let (engine_fx, previous_fx, animate_init, resize_cb_init, alive_anim) = (
		engine.clone(),
		previous.clone(),
		animate.clone(),
		resize_cb.clone(),
		alive.clone(),
	);

	Effect::new(move |_| {
		let mut next = props.get();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let now = now_ms();

		let old = previous_fx.borrow_mut().take();
		let has_engine = engine_fx.borrow().is_some();
		let events = match (has_engine, old) {
			(true, Some(old)) => {
				let cmds = diff(&old, &mut next, now);
				if !cmds.is_empty() {
					debug!(
						"Props changed: {}",
						cmds.iter().map(|c| c.name()).collect::<Vec<_>>().join(", ")
					);
				}
				engine_fx
					.borrow_mut()
					.as_mut()
					.map(|e| e.apply_all(cmds))
					.unwrap_or_default()
			}
			_ => {
				let Some(window) = web_sys::window() else {
					return;
				};
				let Some(ctx) = canvas
					.get_context("2d")
					.ok()
					.flatten()
					.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
				else {
					log::error!("Canvas has no 2d context");
					return;
				};
				next.traffic.updated.get_or_insert(now);
				let (w, h) = canvas_size(&canvas);
				canvas.set_width(w as u32);
				canvas.set_height(h as u32);
				let mut created = TrafficEngine::new(w, h);
				let events = created.apply_all(initial_commands(&next));
				*engine_fx.borrow_mut() = Some(created);

				let (engine_resize, canvas_resize) = (engine_fx.clone(), canvas.clone());
				*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
					let (nw, nh) = canvas_size(&canvas_resize);
					canvas_resize.set_width(nw as u32);
					canvas_resize.set_height(nh as u32);
					if let Some(ref mut e) = *engine_resize.borrow_mut() {
						e.resize(nw, nh);
					}
				}));
				if let Some(ref cb) = *resize_cb_init.borrow() {
					let _ = window
						.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
				}

				let min_frame_ms = target_framerate.filter(|f| *f > 0.0).map(|f| 1000.0 / f);
				let mut last_frame = 0.0;
				let (engine_anim, animate_inner, alive_inner) =
					(engine_fx.clone(), animate_init.clone(), alive_anim.clone());
				*animate_init.borrow_mut() = Some(Closure::new(move || {
					if !alive_inner.load(Ordering::Relaxed) {
						return;
					}
					let now = now_ms();
					if min_frame_ms.is_none_or(|min| now - last_frame >= min) {
						last_frame = now;
						if let Some(ref mut e) = *engine_anim.borrow_mut() {
							if let Some(s) = e.scene_mut() {
								if s.animation_running {
									s.tick(0.016);
								}
							}
							render::render(e, &ctx);
						}
					}
					if let Some(ref cb) = *animate_inner.borrow() {
						if let Some(w) = web_sys::window() {
							let _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
						}
					}
				}));
				if let Some(ref cb) = *animate_init.borrow() {
					let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
				}
				events
			}
		};
		*previous_fx.borrow_mut() = Some(next);
		handlers.emit(events);
	});

	let alive_cleanup = alive.clone();
	on_cleanup(move || alive_cleanup.store(false, Ordering::Relaxed));

	let pointer = move |ev: &MouseEvent| -> Option<(f64, f64)> {
		let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
		let rect = canvas.get_bounding_client_rect();
		Some((
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		))
	};
	let press: Rc<RefCell<Option<(f64, f64)>>> = Rc::new(RefCell::new(None));

	let (engine_md, press_md) = (engine.clone(), press.clone());
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = pointer(&ev) else {
			return;
		};
		*press_md.borrow_mut() = Some((x, y));
		let mut engine = engine_md.borrow_mut();
		let Some(e) = engine.as_mut() else {
			return;
		};
		let draggable = e.options().allow_dragging_of_nodes;
		let Some(s) = e.scene_mut() else {
			return;
		};
		match s.node_at_position(x, y).filter(|_| draggable) {
			Some(idx) => {
				s.drag.active = true;
				s.drag.node_idx = Some(idx);
				s.drag.start_x = x;
				s.drag.start_y = y;
				let (mut nx, mut ny) = (0.0, 0.0);
				s.graph.visit_nodes(|node| {
					if node.index() == idx {
						(nx, ny) = (node.x(), node.y());
					}
				});
				s.drag.node_start_x = nx;
				s.drag.node_start_y = ny;
			}
			None => {
				s.pan.active = true;
				s.pan.start_x = x;
				s.pan.start_y = y;
				s.pan.transform_start_x = s.transform.x;
				s.pan.transform_start_y = s.transform.y;
			}
		}
	};

	let engine_mm = engine.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = pointer(&ev) else {
			return;
		};
		let mut hovered = None;
		if let Some(ref mut e) = *engine_mm.borrow_mut() {
			let dragging = e.scene().is_some_and(|s| s.drag.active);
			if !dragging {
				hovered = e.hover_at(x, y);
			}
			if let Some(s) = e.scene_mut() {
				if s.drag.active {
					if let Some(idx) = s.drag.node_idx {
						let (dx, dy) = (
							(x - s.drag.start_x) / s.transform.k,
							(y - s.drag.start_y) / s.transform.k,
						);
						let (nx, ny) = (
							s.drag.node_start_x + dx as f32,
							s.drag.node_start_y + dy as f32,
						);
						s.graph.visit_nodes_mut(|node| {
							if node.index() == idx {
								node.data.x = nx;
								node.data.y = ny;
								node.data.is_anchor = true;
							}
						});
					}
				} else if s.pan.active {
					s.transform.x = s.pan.transform_start_x + (x - s.pan.start_x);
					s.transform.y = s.pan.transform_start_y + (y - s.pan.start_y);
				}
			}
		}
		handlers.emit(hovered.into_iter().collect());
	};

	let (engine_mu, press_mu) = (engine.clone(), press.clone());
	let on_mouseup = move |ev: MouseEvent| {
		let pressed_at = press_mu.borrow_mut().take();
		let mut events = Vec::new();
		if let Some(ref mut e) = *engine_mu.borrow_mut() {
			if let Some(s) = e.scene_mut() {
				s.drag.active = false;
				s.drag.node_idx = None;
				s.pan.active = false;
			}
			if let (Some((px, py)), Some((x, y))) = (pressed_at, pointer(&ev)) {
				if (x - px).hypot(y - py) < CLICK_SLOP {
					events.extend(e.select_at(x, y));
				}
			}
		}
		handlers.emit(events);
	};

	let (engine_ml, press_ml) = (engine.clone(), press.clone());
	let on_mouseleave = move |_: MouseEvent| {
		press_ml.borrow_mut().take();
		let mut events = Vec::new();
		if let Some(ref mut e) = *engine_ml.borrow_mut() {
			if let Some(s) = e.scene_mut() {
				s.drag.active = false;
				s.drag.node_idx = None;
				s.pan.active = false;
			}
			events.extend(e.clear_hover());
		}
		handlers.emit(events);
	};

	let engine_dc = engine.clone();
	let on_dblclick = move |ev: MouseEvent| {
		let Some((x, y)) = pointer(&ev) else {
			return;
		};
		let events = match *engine_dc.borrow_mut() {
			Some(ref mut e) => e.drill_at(x, y),
			None => Vec::new(),
		};
		handlers.emit(events);
	};

	let engine_wh = engine.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let mouse: &MouseEvent = &ev;
		let Some((x, y)) = pointer(mouse) else {
			return;
		};
		if let Some(s) = engine_wh.borrow_mut().as_mut().and_then(|e| e.scene_mut()) {
			let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
			let new_k = (s.transform.k * factor).clamp(0.1, 10.0);
			let ratio = new_k / s.transform.k;
			s.transform.x = x - (x - s.transform.x) * ratio;
			s.transform.y = y - (y - s.transform.y) * ratio;
			s.transform.k = new_k;
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="traffic-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:dblclick=on_dblclick
			on:wheel=on_wheel
			style="display: block; width: 100%; height: 100%; cursor: grab;"
		/>
	}
}
