use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::engine::TrafficEngine;
use super::scene::{NODE_RADIUS, NodeInfo, Scene};
use crate::traffic::SeverityClass;

/// Distance between the two directions of a bidirectional connection.
const PAIR_OFFSET: f64 = 3.0;

fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

/// Share of the busiest connection, in `0.0..=1.0`.
fn volume_share(volume: f64, max_volume: f64) -> f64 {
	if max_volume <= 0.0 {
		0.0
	} else {
		(volume / max_volume).clamp(0.0, 1.0)
	}
}

pub fn render(engine: &TrafficEngine, ctx: &CanvasRenderingContext2d) {
	let Some(state) = engine.scene() else {
		return;
	};
	ctx.set_fill_style_str(engine.style("colorBackground"));
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);
	draw_edges(engine, state, ctx);
	draw_nodes(engine, state, ctx);
	ctx.restore();
}

fn node_color<'a>(engine: &'a TrafficEngine, info: &NodeInfo) -> &'a str {
	if info.is_entry {
		engine.style("colorEntryNode")
	} else if info.severity == SeverityClass::Normal {
		engine.style("colorNode")
	} else {
		engine.style(info.severity.style_key())
	}
}

fn draw_edges(engine: &TrafficEngine, state: &Scene, ctx: &CanvasRenderingContext2d) {
	let k = state.transform.k;
	let (dash, gap, arrow_size) = (8.0 / k, 4.0 / k, 8.0 / k);
	let t = ease_out_cubic(state.hover.highlight_t);

	let positions = state.node_positions();
	for edge in state.edges() {
		let (Some(&(x1, y1)), Some(&(x2, y2))) =
			(positions.get(&edge.source), positions.get(&edge.target))
		else {
			continue;
		};
		let (dx, dy) = (x2 - x1, y2 - y1);
		let dist = (dx * dx + dy * dy).sqrt();
		if dist < 0.001 {
			continue;
		}
		let (ux, uy) = (dx / dist, dy / dist);
		// opposite directions of a pair land on opposite sides of the centre line
		let (ox, oy) = if edge.paired {
			(-uy * PAIR_OFFSET, ux * PAIR_OFFSET)
		} else {
			(0.0, 0.0)
		};
		let (x1, y1, x2, y2) = (x1 + ox, y1 + oy, x2 + ox, y2 + oy);
		let share = volume_share(edge.info.volume, state.max_volume);
		// busier connections are thicker and flow faster
		let line_width = (1.0 + 2.5 * share) / k;
		let dash_offset = -(state.flow_time * (15.0 + 60.0 * share)) % (dash + gap);

		let is_highlighted = state.is_highlighted(edge.source) && state.is_highlighted(edge.target);

		// t=0: all edges at base (0.6), t=1: highlighted at 0.9, others at 0.15
		let (edge_alpha, arrow_alpha, width) = if is_highlighted {
			(0.6 + 0.3 * t, 0.8 + 0.1 * t, line_width * (1.0 + 0.3 * t))
		} else {
			(0.6 - 0.45 * t, 0.8 - 0.45 * t, line_width * (1.0 - 0.3 * t))
		};
		let color = engine.style(edge.info.severity.style_key());

		ctx.set_global_alpha(edge_alpha);
		ctx.set_stroke_style_str(color);
		ctx.set_line_width(width);
		let _ = ctx.set_line_dash(&js_sys::Array::of2(
			&JsValue::from_f64(dash),
			&JsValue::from_f64(gap),
		));
		ctx.set_line_dash_offset(dash_offset);

		ctx.begin_path();
		ctx.move_to(x1 + ux * NODE_RADIUS, y1 + uy * NODE_RADIUS);
		ctx.line_to(
			x2 - ux * (NODE_RADIUS + arrow_size),
			y2 - uy * (NODE_RADIUS + arrow_size),
		);
		ctx.stroke();

		let _ = ctx.set_line_dash(&js_sys::Array::new());
		ctx.set_global_alpha(arrow_alpha);
		ctx.set_fill_style_str(color);
		let (tip_x, tip_y) = (x2 - ux * NODE_RADIUS, y2 - uy * NODE_RADIUS);
		let (back_x, back_y) = (tip_x - ux * arrow_size, tip_y - uy * arrow_size);
		let (px, py) = (-uy * arrow_size * 0.5, ux * arrow_size * 0.5);
		ctx.begin_path();
		ctx.move_to(tip_x, tip_y);
		ctx.line_to(back_x + px, back_y + py);
		ctx.line_to(back_x - px, back_y - py);
		ctx.close_path();
		ctx.fill();
	}
	ctx.set_global_alpha(1.0);
	let _ = ctx.set_line_dash(&js_sys::Array::new());
}

fn draw_label(
	engine: &TrafficEngine,
	ctx: &CanvasRenderingContext2d,
	info: &NodeInfo,
	x: f64,
	y: f64,
	alpha: f64,
	k: f64,
) {
	let Some(label) = engine.label(info) else {
		return;
	};
	ctx.set_global_alpha(alpha);
	ctx.set_fill_style_str(engine.style("colorLabelText"));
	ctx.set_font(&format!("{}px sans-serif", 10.0 / k.max(0.5)));
	let _ = ctx.fill_text(&label, x, y + 3.0);
	ctx.set_global_alpha(1.0);
}

fn draw_rings(
	engine: &TrafficEngine,
	state: &Scene,
	ctx: &CanvasRenderingContext2d,
	idx: force_graph::DefaultNodeIdx,
	x: f64,
	y: f64,
	radius: f64,
) {
	let k = state.transform.k;
	if state.matches.contains(&idx) {
		ctx.begin_path();
		let _ = ctx.arc(x, y, radius + 4.0 / k, 0.0, 2.0 * PI);
		ctx.set_stroke_style_str(engine.style("colorSearchMatch"));
		ctx.set_line_width(2.0 / k);
		ctx.stroke();
	}
	if state.selected == Some(idx) {
		ctx.begin_path();
		let _ = ctx.arc(x, y, radius + 7.0 / k, 0.0, 2.0 * PI);
		ctx.set_stroke_style_str(engine.style("colorText"));
		ctx.set_line_width(1.0 / k);
		ctx.stroke();
	}
}

fn draw_nodes(engine: &TrafficEngine, state: &Scene, ctx: &CanvasRenderingContext2d) {
	let (has_highlight, t, k) = (
		state.has_active_highlight(),
		ease_out_cubic(state.hover.highlight_t),
		state.transform.k,
	);

	state.graph.visit_nodes(|node| {
		let idx = node.index();
		if has_highlight && state.is_highlighted(idx) {
			return;
		}
		let info = &node.data.user_data;
		let (x, y) = (node.x() as f64, node.y() as f64);
		let (alpha, radius) = (1.0 - 0.7 * t, NODE_RADIUS * (1.0 - 0.15 * t));

		ctx.set_global_alpha(alpha);
		ctx.begin_path();
		let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(node_color(engine, info));
		ctx.fill();
		ctx.set_global_alpha(1.0);

		draw_rings(engine, state, ctx, idx, x, y, radius);
		draw_label(engine, ctx, info, x + radius + 3.0, y, alpha * 0.8, k);
	});

	if !has_highlight {
		return;
	}

	state.graph.visit_nodes(|node| {
		let idx = node.index();
		if !state.is_highlighted(idx) {
			return;
		}
		let info = &node.data.user_data;
		let (x, y) = (node.x() as f64, node.y() as f64);
		let is_hovered = state.is_hovered(idx);
		let is_neighbor =
			state.hover.neighbors.contains(&idx) || state.hover.prev_neighbors.contains(&idx);

		let (radius, glow_radius) = if is_hovered {
			(
				NODE_RADIUS * (1.0 + 0.35 * t),
				NODE_RADIUS * (1.8 + 1.2 * t),
			)
		} else if is_neighbor {
			(NODE_RADIUS * (1.0 + 0.2 * t), NODE_RADIUS * (1.4 + 0.6 * t))
		} else {
			(NODE_RADIUS, 0.0)
		};

		if glow_radius > 0.0 && t > 0.01 {
			if let Ok(gradient) = ctx.create_radial_gradient(x, y, radius * 0.3, x, y, glow_radius)
			{
				let alpha = if is_hovered { 0.35 * t } else { 0.2 * t };
				let _ = gradient.add_color_stop(0.0, &format!("rgba(255, 255, 255, {})", alpha));
				let _ = gradient
					.add_color_stop(0.6, &format!("rgba(200, 220, 255, {})", alpha * 0.3));
				let _ = gradient.add_color_stop(1.0, "rgba(255, 255, 255, 0)");
				ctx.begin_path();
				let _ = ctx.arc(x, y, glow_radius, 0.0, 2.0 * PI);
				#[allow(deprecated)]
				ctx.set_fill_style(&gradient);
				ctx.fill();
			}
		}

		ctx.begin_path();
		let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(node_color(engine, info));
		ctx.fill();

		if is_hovered && t > 0.01 {
			ctx.begin_path();
			let _ = ctx.arc(x, y, radius + 2.0 / k, 0.0, 2.0 * PI);
			ctx.set_global_alpha(0.7 * t);
			ctx.set_stroke_style_str(engine.style("colorText"));
			ctx.set_line_width(1.5 / k);
			ctx.stroke();
			ctx.set_global_alpha(1.0);
		}

		draw_rings(engine, state, ctx, idx, x, y, radius);
		draw_label(engine, ctx, info, x + radius + 3.0, y, 1.0, k);

		// class description under the hovered node
		if is_hovered {
			if let Some(def) = info.class.as_deref().and_then(|c| engine.definition(c)) {
				ctx.set_global_alpha(t);
				ctx.set_fill_style_str(engine.style("colorText"));
				ctx.set_font(&format!("{}px sans-serif", 9.0 / k.max(0.5)));
				let _ = ctx.fill_text(def, x + radius + 3.0, y + 3.0 + 12.0 / k.max(0.5));
				ctx.set_global_alpha(1.0);
			}
		}
	});
}
