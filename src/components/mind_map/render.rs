use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::geometry::{Rect, TextMeasure, bounding_box, circle_radius};
use super::state::EditorState;
use super::store::GraphStore;
use super::types::{Node, Shape};
use super::view::ViewTransform;

const SELECTION_COLOR: &str = "#3b82f6";
const SELECTION_WIDTH: f64 = 3.0;
const SELECTION_INSET: f64 = 5.0;
const SELECTION_DASH: [f64; 2] = [5.0, 5.0];

/// The subset of 2D canvas drawing the renderer needs.
pub trait Surface: TextMeasure {
	fn clear(&self, width: f64, height: f64);
	fn save(&self);
	fn restore(&self);
	fn transform(&self, view: &ViewTransform);
	fn set_stroke(&self, color: &str, width: f64);
	fn set_fill(&self, color: &str);
	fn set_line_dash(&self, pattern: &[f64]);
	fn line(&self, x1: f64, y1: f64, x2: f64, y2: f64);
	fn rect(&self, rect: &Rect);
	fn circle(&self, x: f64, y: f64, radius: f64);
	fn diamond(&self, rect: &Rect);
	fn stroke_rect(&self, rect: &Rect);
	fn centered_text(&self, text: &str, font: &str, x: f64, y: f64);
}

impl TextMeasure for CanvasRenderingContext2d {
	fn text_width(&self, text: &str, font: &str) -> f64 {
		self.set_font(font);
		self.measure_text(text).map(|m| m.width()).unwrap_or(0.0)
	}
}

impl Surface for CanvasRenderingContext2d {
	fn clear(&self, width: f64, height: f64) {
		self.clear_rect(0.0, 0.0, width, height);
	}

	fn save(&self) {
		CanvasRenderingContext2d::save(self);
	}

	fn restore(&self) {
		CanvasRenderingContext2d::restore(self);
	}

	fn transform(&self, view: &ViewTransform) {
		let _ = self.translate(view.pan.x, view.pan.y);
		let _ = self.scale(view.scale, view.scale);
	}

	fn set_stroke(&self, color: &str, width: f64) {
		self.set_stroke_style_str(color);
		self.set_line_width(width);
	}

	fn set_fill(&self, color: &str) {
		self.set_fill_style_str(color);
	}

	fn set_line_dash(&self, pattern: &[f64]) {
		let dash = pattern
			.iter()
			.map(|v| JsValue::from_f64(*v))
			.collect::<js_sys::Array>();
		let _ = CanvasRenderingContext2d::set_line_dash(self, &dash);
	}

	fn line(&self, x1: f64, y1: f64, x2: f64, y2: f64) {
		self.begin_path();
		self.move_to(x1, y1);
		self.line_to(x2, y2);
		self.stroke();
	}

	fn rect(&self, rect: &Rect) {
		self.fill_rect(rect.x, rect.y, rect.width, rect.height);
		CanvasRenderingContext2d::stroke_rect(self, rect.x, rect.y, rect.width, rect.height);
	}

	fn circle(&self, x: f64, y: f64, radius: f64) {
		self.begin_path();
		let _ = self.arc(x, y, radius, 0.0, 2.0 * PI);
		self.fill();
		self.stroke();
	}

	fn diamond(&self, rect: &Rect) {
		let (cx, cy) = (rect.x + rect.width / 2.0, rect.y + rect.height / 2.0);
		self.begin_path();
		self.move_to(cx, rect.y);
		self.line_to(rect.x + rect.width, cy);
		self.line_to(cx, rect.y + rect.height);
		self.line_to(rect.x, cy);
		self.close_path();
		self.fill();
		self.stroke();
	}

	fn stroke_rect(&self, rect: &Rect) {
		CanvasRenderingContext2d::stroke_rect(self, rect.x, rect.y, rect.width, rect.height);
	}

	fn centered_text(&self, text: &str, font: &str, x: f64, y: f64) {
		self.set_font(font);
		self.set_text_align("center");
		self.set_text_baseline("middle");
		let _ = self.fill_text(text, x, y);
	}
}

/// Redraws the whole editor. Reads state only.
pub fn render(state: &EditorState, surface: &impl Surface) {
	surface.clear(state.viewport.width, state.viewport.height);
	surface.save();
	surface.transform(&state.view);
	draw_connections(&state.store, surface);
	for node in state.store.nodes() {
		draw_node(node, state.selected.as_deref() == Some(node.id.as_str()), surface);
	}
	surface.restore();
}

fn draw_connections(store: &GraphStore, surface: &impl Surface) {
	for connection in store.connections() {
		let (Some(from), Some(to)) = (
			store.node(&connection.from_node_id),
			store.node(&connection.to_node_id),
		) else {
			continue;
		};
		surface.set_stroke(&connection.style.color, connection.style.width);
		surface.set_line_dash(connection.style.style.dash_pattern());
		surface.line(from.x, from.y, to.x, to.y);
	}
	surface.set_line_dash(&[]);
}

fn draw_node(node: &Node, selected: bool, surface: &impl Surface) {
	let rect = bounding_box(node, surface);
	let style = &node.style;

	surface.set_fill(&style.background_color);
	surface.set_stroke(&style.border_color, style.border_width);
	match style.shape {
		Shape::Circle => surface.circle(node.x, node.y, circle_radius(&rect)),
		Shape::Diamond => surface.diamond(&rect),
		Shape::Rectangle => surface.rect(&rect),
	}

	if selected {
		surface.set_stroke(SELECTION_COLOR, SELECTION_WIDTH);
		surface.set_line_dash(&SELECTION_DASH);
		surface.stroke_rect(&rect.inflate(SELECTION_INSET));
		surface.set_line_dash(&[]);
	}

	surface.set_fill(&style.text_color);
	surface.centered_text(&node.text, &style.font(), node.x, node.y);
}

#[cfg(test)]
mod tests {
	use std::cell::RefCell;

	use super::*;
	use crate::components::mind_map::geometry::{ApproxMeasure, Point};
	use crate::components::mind_map::types::{LineStyle, StyleUpdate};

	#[derive(Clone, Debug, PartialEq)]
	enum Op {
		Clear,
		Save,
		Restore,
		Transform(ViewTransform),
		Stroke(String, f64),
		Fill(String),
		Dash(Vec<f64>),
		Line(f64, f64, f64, f64),
		Rect(Rect),
		Circle(f64, f64, f64),
		Diamond(Rect),
		StrokeRect(Rect),
		Text(String),
	}

	#[derive(Default)]
	struct Recorder(RefCell<Vec<Op>>);

	impl Recorder {
		fn push(&self, op: Op) {
			self.0.borrow_mut().push(op);
		}

		fn ops(&self) -> Vec<Op> {
			self.0.borrow().clone()
		}
	}

	impl TextMeasure for Recorder {
		fn text_width(&self, text: &str, font: &str) -> f64 {
			ApproxMeasure.text_width(text, font)
		}
	}

	impl Surface for Recorder {
		fn clear(&self, _: f64, _: f64) {
			self.push(Op::Clear);
		}
		fn save(&self) {
			self.push(Op::Save);
		}
		fn restore(&self) {
			self.push(Op::Restore);
		}
		fn transform(&self, view: &ViewTransform) {
			self.push(Op::Transform(*view));
		}
		fn set_stroke(&self, color: &str, width: f64) {
			self.push(Op::Stroke(color.into(), width));
		}
		fn set_fill(&self, color: &str) {
			self.push(Op::Fill(color.into()));
		}
		fn set_line_dash(&self, pattern: &[f64]) {
			self.push(Op::Dash(pattern.to_vec()));
		}
		fn line(&self, x1: f64, y1: f64, x2: f64, y2: f64) {
			self.push(Op::Line(x1, y1, x2, y2));
		}
		fn rect(&self, rect: &Rect) {
			self.push(Op::Rect(*rect));
		}
		fn circle(&self, x: f64, y: f64, radius: f64) {
			self.push(Op::Circle(x, y, radius));
		}
		fn diamond(&self, rect: &Rect) {
			self.push(Op::Diamond(*rect));
		}
		fn stroke_rect(&self, rect: &Rect) {
			self.push(Op::StrokeRect(*rect));
		}
		fn centered_text(&self, text: &str, _: &str, _: f64, _: f64) {
			self.push(Op::Text(text.into()));
		}
	}

	fn position(ops: &[Op], pred: impl Fn(&Op) -> bool) -> usize {
		ops.iter().position(pred).expect("op not recorded")
	}

	#[test]
	fn connections_are_drawn_before_nodes() {
		let mut state = EditorState::new();
		let a = state.store.add_node("A", 0.0, 0.0, None).id;
		let b = state.store.add_node("B", 200.0, 0.0, None).id;
		state.store.add_connection(&a, &b);

		let surface = Recorder::default();
		render(&state, &surface);
		let ops = surface.ops();

		assert_eq!(ops[0], Op::Clear);
		assert_eq!(ops[2], Op::Transform(state.view));
		let line = position(&ops, |op| matches!(op, Op::Line(..)));
		let first_node = position(&ops, |op| matches!(op, Op::Rect(_)));
		assert!(line < first_node);
		assert_eq!(ops[line], Op::Line(0.0, 0.0, 200.0, 0.0));
		assert_eq!(ops.last(), Some(&Op::Restore));
	}

	#[test]
	fn shapes_follow_style() {
		let mut state = EditorState::new();
		let circle = state.store.add_node("c", 0.0, 0.0, None).id;
		let diamond = state.store.add_node("d", 100.0, 0.0, None).id;
		state.store.update_node_style(&circle, StyleUpdate::Shape(Shape::Circle));
		state.store.update_node_style(&diamond, StyleUpdate::Shape(Shape::Diamond));

		let surface = Recorder::default();
		render(&state, &surface);
		let ops = surface.ops();
		assert!(ops.contains(&Op::Circle(0.0, 0.0, 40.0)));
		assert!(ops.iter().any(|op| matches!(op, Op::Diamond(r) if r.x == 60.0)));
	}

	#[test]
	fn selection_gets_dashed_outline() {
		let mut state = EditorState::new();
		let a = state.store.add_node("A", 0.0, 0.0, None).id;
		state.store.add_node("B", 200.0, 0.0, None);

		let surface = Recorder::default();
		render(&state, &surface);
		assert!(!surface.ops().iter().any(|op| matches!(op, Op::StrokeRect(_))));

		state.selected = Some(a);
		let surface = Recorder::default();
		render(&state, &surface);
		let ops = surface.ops();
		let outlines: Vec<_> = ops.iter().filter(|op| matches!(op, Op::StrokeRect(_))).collect();
		assert_eq!(outlines.len(), 1);
		let outline = position(&ops, |op| matches!(op, Op::StrokeRect(_)));
		assert_eq!(ops[outline - 1], Op::Dash(SELECTION_DASH.to_vec()));
		assert_eq!(
			ops[outline],
			Op::StrokeRect(Rect {
				x: -45.0,
				y: -24.0,
				width: 90.0,
				height: 48.0,
			})
		);
	}

	#[test]
	fn dash_pattern_follows_connection_style() {
		let mut state = EditorState::new();
		let a = state.store.add_node("A", 0.0, 0.0, None).id;
		let b = state.store.add_node("B", 0.0, 100.0, None).id;
		let id = state.store.add_connection(&a, &b).unwrap().id;
		let mut snapshot = state.store.snapshot();
		snapshot
			.connections
			.iter_mut()
			.filter(|c| c.id == id)
			.for_each(|c| c.style.style = LineStyle::Dashed);
		state.load(snapshot.nodes, snapshot.connections);

		let surface = Recorder::default();
		render(&state, &surface);
		let ops = surface.ops();
		let line = position(&ops, |op| matches!(op, Op::Line(..)));
		assert_eq!(ops[line - 1], Op::Dash(vec![5.0, 5.0]));
		assert_eq!(ops[line + 1], Op::Dash(vec![]));
	}

	#[test]
	fn render_does_not_mutate_state() {
		let mut state = EditorState::new();
		state.store.add_node("A", 0.0, 0.0, None);
		state.view.zoom_at(Point::new(10.0, 10.0), 1.5);
		let before = state.store.snapshot();
		let view = state.view;
		render(&state, &Recorder::default());
		assert_eq!(state.store.snapshot(), before);
		assert_eq!(state.view, view);
	}
}
