//! Node bounding boxes and point-in-shape tests.

use super::types::{Node, Shape};

pub const PADDING: f64 = 12.0;
pub const MIN_WIDTH: f64 = 80.0;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

impl Point {
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	pub fn distance(self, other: Point) -> f64 {
		let (dx, dy) = (self.x - other.x, self.y - other.y);
		(dx * dx + dy * dy).sqrt()
	}

	pub fn midpoint(self, other: Point) -> Point {
		Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
	}
}

/// Axis-aligned box; `x`/`y` is the top-left corner.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
	pub x: f64,
	pub y: f64,
	pub width: f64,
	pub height: f64,
}

impl Rect {
	pub fn contains(&self, p: Point) -> bool {
		p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
	}

	pub fn inflate(&self, by: f64) -> Rect {
		Rect {
			x: self.x - by,
			y: self.y - by,
			width: self.width + 2.0 * by,
			height: self.height + 2.0 * by,
		}
	}
}

/// Font metrics provider. The canvas context implements it in the browser.
pub trait TextMeasure {
	fn text_width(&self, text: &str, font: &str) -> f64;
}

/// Metric-free estimate: every glyph is `0.6 * font size` wide.
#[derive(Clone, Copy, Debug, Default)]
pub struct ApproxMeasure;

impl TextMeasure for ApproxMeasure {
	fn text_width(&self, text: &str, font: &str) -> f64 {
		let size = font
			.split_whitespace()
			.find_map(|part| part.strip_suffix("px"))
			.and_then(|px| px.parse::<f64>().ok())
			.unwrap_or(14.0);
		text.chars().count() as f64 * size * 0.6
	}
}

pub fn bounding_box(node: &Node, measure: &(impl TextMeasure + ?Sized)) -> Rect {
	let text_width = measure.text_width(&node.text, &node.style.font());
	let width = (text_width + PADDING * 2.0).max(MIN_WIDTH);
	let height = node.style.font_size + PADDING * 2.0;
	Rect {
		x: node.x - width / 2.0,
		y: node.y - height / 2.0,
		width,
		height,
	}
}

/// Radius used to draw and hit-test circle-shaped nodes.
pub fn circle_radius(rect: &Rect) -> f64 {
	rect.width.max(rect.height) / 2.0
}

pub fn hit_test(point: Point, node: &Node, measure: &(impl TextMeasure + ?Sized)) -> bool {
	let rect = bounding_box(node, measure);
	match node.style.shape {
		Shape::Circle => point.distance(Point::new(node.x, node.y)) <= circle_radius(&rect),
		// diamonds use their enclosing box
		Shape::Rectangle | Shape::Diamond => rect.contains(point),
	}
}

/// First node (in iteration order) containing `point`.
pub fn node_at<'a>(
	nodes: impl IntoIterator<Item = &'a Node>,
	point: Point,
	measure: &(impl TextMeasure + ?Sized),
) -> Option<&'a Node> {
	nodes.into_iter().find(|node| hit_test(point, node, measure))
}
