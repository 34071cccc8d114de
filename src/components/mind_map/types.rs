use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type NodeId = String;
pub type ConnectionId = String;

pub const DEFAULT_BACKGROUND: &str = "#3b82f6";
pub const DEFAULT_TEXT_COLOR: &str = "#ffffff";
pub const DEFAULT_BORDER: &str = "#1d4ed8";
pub const DEFAULT_CONNECTION_COLOR: &str = "#64748b";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
	#[default]
	Normal,
	Bold,
}

impl FontWeight {
	pub fn as_str(self) -> &'static str {
		match self {
			FontWeight::Normal => "normal",
			FontWeight::Bold => "bold",
		}
	}

	pub fn parse(value: &str) -> Option<Self> {
		match value {
			"normal" => Some(FontWeight::Normal),
			"bold" => Some(FontWeight::Bold),
			_ => None,
		}
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
	#[default]
	Rectangle,
	Circle,
	Diamond,
}

impl Shape {
	pub const ALL: [Shape; 3] = [Shape::Rectangle, Shape::Circle, Shape::Diamond];

	pub fn as_str(self) -> &'static str {
		match self {
			Shape::Rectangle => "rectangle",
			Shape::Circle => "circle",
			Shape::Diamond => "diamond",
		}
	}

	pub fn parse(value: &str) -> Option<Self> {
		Shape::ALL.into_iter().find(|s| s.as_str() == value)
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStyle {
	#[default]
	Solid,
	Dashed,
	Dotted,
}

impl LineStyle {
	/// Canvas dash pattern in model units; empty means a solid stroke.
	pub fn dash_pattern(self) -> &'static [f64] {
		match self {
			LineStyle::Solid => &[],
			LineStyle::Dashed => &[5.0, 5.0],
			LineStyle::Dotted => &[2.0, 4.0],
		}
	}
}

/// Visual style of a node. Every field falls back to its default when absent
/// from a persisted document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NodeStyle {
	pub background_color: String,
	pub text_color: String,
	pub border_color: String,
	pub border_width: f64,
	pub border_radius: f64,
	pub font_size: f64,
	pub font_weight: FontWeight,
	pub shape: Shape,
}

impl Default for NodeStyle {
	fn default() -> Self {
		Self {
			background_color: DEFAULT_BACKGROUND.into(),
			text_color: DEFAULT_TEXT_COLOR.into(),
			border_color: DEFAULT_BORDER.into(),
			border_width: 2.0,
			border_radius: 8.0,
			font_size: 14.0,
			font_weight: FontWeight::Normal,
			shape: Shape::Rectangle,
		}
	}
}

impl NodeStyle {
	/// CSS font shorthand used both for measuring and drawing the label.
	pub fn font(&self) -> String {
		format!(
			"{} {}px Inter, sans-serif",
			self.font_weight.as_str(),
			self.font_size
		)
	}
}

/// A single typed change to one [`NodeStyle`] field.
#[derive(Clone, Debug, PartialEq)]
pub enum StyleUpdate {
	BackgroundColor(String),
	TextColor(String),
	BorderColor(String),
	BorderWidth(f64),
	BorderRadius(f64),
	FontSize(f64),
	FontWeight(FontWeight),
	Shape(Shape),
}

impl StyleUpdate {
	pub fn apply(self, style: &mut NodeStyle) {
		match self {
			StyleUpdate::BackgroundColor(c) => style.background_color = c,
			StyleUpdate::TextColor(c) => style.text_color = c,
			StyleUpdate::BorderColor(c) => style.border_color = c,
			StyleUpdate::BorderWidth(w) => style.border_width = w.max(0.0),
			StyleUpdate::BorderRadius(r) => style.border_radius = r.max(0.0),
			StyleUpdate::FontSize(s) => style.font_size = s.max(1.0),
			StyleUpdate::FontWeight(w) => style.font_weight = w,
			StyleUpdate::Shape(s) => style.shape = s,
		}
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
	pub id: NodeId,
	pub text: String,
	pub x: f64,
	pub y: f64,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub parent_id: Option<NodeId>,
	#[serde(default)]
	pub style: NodeStyle,
	/// The backend stores nodes without timestamps; decoding stamps them.
	#[serde(default = "Utc::now")]
	pub created_at: DateTime<Utc>,
	#[serde(default = "Utc::now")]
	pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionStyle {
	pub color: String,
	pub width: f64,
	pub style: LineStyle,
}

impl Default for ConnectionStyle {
	fn default() -> Self {
		Self {
			color: DEFAULT_CONNECTION_COLOR.into(),
			width: 2.0,
			style: LineStyle::Solid,
		}
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
	pub id: ConnectionId,
	pub from_node_id: NodeId,
	pub to_node_id: NodeId,
	#[serde(default)]
	pub style: ConnectionStyle,
}

impl Connection {
	pub fn touches(&self, node_id: &str) -> bool {
		self.from_node_id == node_id || self.to_node_id == node_id
	}
}

/// The persisted aggregate. `id` is assigned by the backend on first save.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MindMap {
	#[serde(alias = "_id")]
	pub id: String,
	pub title: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	#[serde(default)]
	pub nodes: Vec<Node>,
	#[serde(default)]
	pub connections: Vec<Connection>,
	#[serde(default = "Utc::now")]
	pub created_at: DateTime<Utc>,
	#[serde(default = "Utc::now")]
	pub updated_at: DateTime<Utc>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub user_id: Option<String>,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn node_style_fills_missing_fields_with_defaults() {
		let style: NodeStyle =
			serde_json::from_str(r##"{"backgroundColor":"#000000","shape":"diamond"}"##).unwrap();
		assert_eq!(style.background_color, "#000000");
		assert_eq!(style.shape, Shape::Diamond);
		assert_eq!(style.font_size, 14.0);
		assert_eq!(style.font_weight, FontWeight::Normal);
		assert_eq!(style.text_color, DEFAULT_TEXT_COLOR);
	}

	#[test]
	fn mind_map_accepts_document_store_id() {
		let json = r#"{
			"_id": "65a1f0c2b3d4e5f60718293a",
			"title": "Plans",
			"nodes": [],
			"connections": [],
			"createdAt": "2024-01-01T00:00:00Z",
			"updatedAt": "2024-01-02T00:00:00Z"
		}"#;
		let map: MindMap = serde_json::from_str(json).unwrap();
		assert_eq!(map.id, "65a1f0c2b3d4e5f60718293a");
		assert_eq!(map.description, None);
	}

	#[test]
	fn nodes_decode_without_timestamps() {
		let json = r#"{
			"_id": "65a1f0c2b3d4e5f60718293a",
			"title": "Plans",
			"nodes": [{"id": "n1", "text": "A", "x": 1, "y": 2, "style": {}}],
			"connections": [{"id": "c1", "fromNodeId": "n1", "toNodeId": "n1"}],
			"createdAt": "2024-01-01T00:00:00Z",
			"updatedAt": "2024-01-02T00:00:00Z"
		}"#;
		let before = Utc::now();
		let map: MindMap = serde_json::from_str(json).unwrap();
		let node = &map.nodes[0];
		assert_eq!((node.id.as_str(), node.x, node.y), ("n1", 1.0, 2.0));
		assert_eq!(node.parent_id, None);
		assert_eq!(node.style, NodeStyle::default());
		assert!(node.created_at >= before);
		assert!(node.updated_at >= before);
		assert_eq!(map.connections[0].style, ConnectionStyle::default());
	}

	#[test]
	fn connection_style_serializes_line_style_lowercase() {
		let style = ConnectionStyle {
			style: LineStyle::Dotted,
			..Default::default()
		};
		let value = serde_json::to_value(&style).unwrap();
		assert_eq!(value["style"], "dotted");
	}

	#[test]
	fn style_update_clamps_font_size() {
		let mut style = NodeStyle::default();
		StyleUpdate::FontSize(-3.0).apply(&mut style);
		assert_eq!(style.font_size, 1.0);
		StyleUpdate::Shape(Shape::Circle).apply(&mut style);
		assert_eq!(style.shape, Shape::Circle);
	}

	#[test]
	fn font_string_includes_weight_and_size() {
		let style = NodeStyle {
			font_weight: FontWeight::Bold,
			font_size: 18.0,
			..Default::default()
		};
		assert_eq!(style.font(), "bold 18px Inter, sans-serif");
	}
}
