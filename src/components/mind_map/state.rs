use log::debug;

use super::geometry::{Point, TextMeasure, node_at};
use super::store::GraphStore;
use super::types::{Connection, Node, NodeId, StyleUpdate};
use super::view::ViewTransform;

pub const WHEEL_ZOOM_IN: f64 = 1.1;
pub const WHEEL_ZOOM_OUT: f64 = 0.9;
pub const LONG_PRESS_MS: u32 = 500;
/// Screen-space movement that turns a press into a drag and cancels a long-press.
pub const LONG_PRESS_TOLERANCE: f64 = 8.0;
pub const CHILD_OFFSET: Point = Point::new(180.0, 80.0);
pub const NEW_NODE_TEXT: &str = "New idea";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Button {
	Primary,
	Secondary,
	Other,
}

impl Button {
	/// Maps `MouseEvent.button`.
	pub fn from_dom(button: i16) -> Self {
		match button {
			0 => Button::Primary,
			2 => Button::Secondary,
			_ => Button::Other,
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
	Delete,
	Escape,
	Enter,
	Other,
}

impl Key {
	/// Maps `KeyboardEvent.key`.
	pub fn from_dom(key: &str) -> Self {
		match key {
			"Delete" => Key::Delete,
			"Escape" => Key::Escape,
			"Enter" => Key::Enter,
			_ => Key::Other,
		}
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Cursor {
	#[default]
	Default,
	Crosshair,
	Grabbing,
}

impl Cursor {
	pub fn as_css(self) -> &'static str {
		match self {
			Cursor::Default => "default",
			Cursor::Crosshair => "crosshair",
			Cursor::Grabbing => "grabbing",
		}
	}
}

/// Side effects the host must carry out after an input event.
#[derive(Clone, Debug, PartialEq)]
pub enum Action {
	RenderNeeded,
	SetCursor(Cursor),
	EditTextRequested { id: NodeId, text: String },
}

/// Primary gesture state machine.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Interaction {
	#[default]
	Idle,
	DraggingNode {
		id: NodeId,
		/// Model-space distance from the node centre to the press point.
		offset: Point,
		/// Screen point where the press started.
		origin: Point,
		moved: bool,
	},
	Panning {
		last: Point,
	},
	/// A source node was picked via "connect"; the next press completes it.
	ConnectingPending {
		source: NodeId,
	},
	/// Two touch contacts; overrides drag and pan until released.
	Pinching {
		distance: f64,
		center: Point,
	},
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Viewport {
	pub width: f64,
	pub height: f64,
}

/// Everything the editor needs that does not touch the browser: graph,
/// view, gesture state, selection and the context menu anchor.
#[derive(Clone, Debug, Default)]
pub struct EditorState {
	pub store: GraphStore,
	pub view: ViewTransform,
	pub interaction: Interaction,
	pub selected: Option<NodeId>,
	/// Screen point the context menu is anchored at, when open.
	pub context_menu: Option<Point>,
	pub viewport: Viewport,
}

impl EditorState {
	pub fn new() -> Self {
		Self::default()
	}

	/// Empties the editor and seeds it with a single central node.
	pub fn reset(&mut self, text: &str, at: Point) {
		self.store.clear();
		self.clear_transient();
		self.store.add_node(text, at.x, at.y, None);
	}

	/// Replaces the graph with a loaded document. Returns the number of
	/// connections dropped by validation.
	pub fn load(&mut self, nodes: Vec<Node>, connections: Vec<Connection>) -> usize {
		self.clear_transient();
		self.store.replace(nodes, connections)
	}

	fn clear_transient(&mut self) {
		self.selected = None;
		self.context_menu = None;
		self.interaction = Interaction::Idle;
	}

	pub fn set_viewport(&mut self, width: f64, height: f64) {
		self.viewport = Viewport { width, height };
	}

	pub fn selected_node(&self) -> Option<&Node> {
		self.selected.as_deref().and_then(|id| self.store.node(id))
	}

	pub fn cursor(&self) -> Cursor {
		match self.interaction {
			Interaction::ConnectingPending { .. } => Cursor::Crosshair,
			Interaction::DraggingNode { .. } | Interaction::Panning { .. } => Cursor::Grabbing,
			Interaction::Idle | Interaction::Pinching { .. } => Cursor::Default,
		}
	}

	fn node_id_at(&self, screen: Point, measure: &(impl TextMeasure + ?Sized)) -> Option<NodeId> {
		let model = self.view.to_model(screen);
		node_at(self.store.nodes(), model, measure).map(|n| n.id.clone())
	}

	// --- Pointer ---

	pub fn on_pointer_down(
		&mut self,
		screen: Point,
		button: Button,
		measure: &(impl TextMeasure + ?Sized),
	) -> Vec<Action> {
		match button {
			Button::Secondary => return self.open_context_menu(screen, measure),
			Button::Other => return Vec::new(),
			Button::Primary => {}
		}
		self.context_menu = None;

		match std::mem::take(&mut self.interaction) {
			Interaction::ConnectingPending { source } => {
				if let Some(target) = self.node_id_at(screen, measure) {
					if self.store.add_connection(&source, &target).is_some() {
						self.selected = Some(target);
					}
				} else {
					debug!("connection from {} cancelled", source);
				}
				vec![Action::SetCursor(Cursor::Default), Action::RenderNeeded]
			}
			pinch @ Interaction::Pinching { .. } => {
				self.interaction = pinch;
				Vec::new()
			}
			_ => {
				if let Some(id) = self.node_id_at(screen, measure) {
					let model = self.view.to_model(screen);
					let offset = self
						.store
						.node(&id)
						.map(|n| Point::new(model.x - n.x, model.y - n.y))
						.unwrap_or_default();
					self.selected = Some(id.clone());
					self.interaction = Interaction::DraggingNode {
						id,
						offset,
						origin: screen,
						moved: false,
					};
				} else {
					self.selected = None;
					self.interaction = Interaction::Panning { last: screen };
				}
				vec![Action::SetCursor(Cursor::Grabbing), Action::RenderNeeded]
			}
		}
	}

	pub fn on_pointer_move(&mut self, screen: Point) -> Vec<Action> {
		match &mut self.interaction {
			Interaction::DraggingNode {
				id,
				offset,
				origin,
				moved,
			} => {
				if origin.distance(screen) > LONG_PRESS_TOLERANCE {
					*moved = true;
				}
				let model = self.view.to_model(screen);
				self.store.move_node(id, model.x - offset.x, model.y - offset.y);
				vec![Action::RenderNeeded]
			}
			Interaction::Panning { last } => {
				let (dx, dy) = (screen.x - last.x, screen.y - last.y);
				*last = screen;
				self.view.pan_by(dx, dy);
				vec![Action::RenderNeeded]
			}
			_ => Vec::new(),
		}
	}

	pub fn on_pointer_up(&mut self) -> Vec<Action> {
		match self.interaction {
			Interaction::DraggingNode { .. } | Interaction::Panning { .. } => {
				self.interaction = Interaction::Idle;
				vec![Action::SetCursor(Cursor::Default)]
			}
			_ => Vec::new(),
		}
	}

	pub fn on_wheel(&mut self, screen: Point, delta_y: f64) -> Vec<Action> {
		if matches!(self.interaction, Interaction::DraggingNode { .. }) {
			return Vec::new();
		}
		let factor = if delta_y > 0.0 {
			WHEEL_ZOOM_OUT
		} else {
			WHEEL_ZOOM_IN
		};
		self.view.zoom_at(screen, factor);
		vec![Action::RenderNeeded]
	}

	/// Adds a node where the user double-clicked, or asks to edit the node
	/// that was double-clicked.
	pub fn on_double_click(&mut self, screen: Point, measure: &(impl TextMeasure + ?Sized)) -> Vec<Action> {
		if let Some(id) = self.node_id_at(screen, measure) {
			self.selected = Some(id);
			return self.edit_selected();
		}
		let model = self.view.to_model(screen);
		let node = self.store.add_node(NEW_NODE_TEXT, model.x, model.y, None);
		self.selected = Some(node.id);
		vec![Action::RenderNeeded]
	}

	// --- Touch ---

	pub fn on_touch_start(&mut self, touches: &[Point], measure: &(impl TextMeasure + ?Sized)) -> Vec<Action> {
		match touches {
			[] => Vec::new(),
			[single] => self.on_pointer_down(*single, Button::Primary, measure),
			[a, b, ..] => {
				self.interaction = Interaction::Pinching {
					distance: a.distance(*b),
					center: a.midpoint(*b),
				};
				vec![Action::SetCursor(Cursor::Default)]
			}
		}
	}

	pub fn on_touch_move(&mut self, touches: &[Point]) -> Vec<Action> {
		match touches {
			[] => Vec::new(),
			[single] => {
				if matches!(self.interaction, Interaction::Pinching { .. }) {
					Vec::new()
				} else {
					self.on_pointer_move(*single)
				}
			}
			[a, b, ..] => {
				let (distance, center) = (a.distance(*b), a.midpoint(*b));
				let mut actions = Vec::new();
				if let Interaction::Pinching { distance: last, .. } = self.interaction {
					if last > 0.0 {
						self.view.zoom_at(center, distance / last);
						actions.push(Action::RenderNeeded);
					}
				}
				self.interaction = Interaction::Pinching { distance, center };
				actions
			}
		}
	}

	pub fn on_touch_end(&mut self, remaining: usize) -> Vec<Action> {
		if matches!(self.interaction, Interaction::Pinching { .. }) {
			if remaining < 2 {
				self.interaction = Interaction::Idle;
			}
			return Vec::new();
		}
		if remaining == 0 {
			self.on_pointer_up()
		} else {
			Vec::new()
		}
	}

	/// Fired by the host after [`LONG_PRESS_MS`] of an unmoved press.
	pub fn on_long_press(&mut self) -> Vec<Action> {
		let Interaction::DraggingNode {
			id,
			origin,
			moved: false,
			..
		} = &self.interaction
		else {
			return Vec::new();
		};
		self.selected = Some(id.clone());
		self.context_menu = Some(*origin);
		self.interaction = Interaction::Idle;
		vec![Action::SetCursor(Cursor::Default), Action::RenderNeeded]
	}

	// --- Keyboard ---

	pub fn on_key_down(&mut self, key: Key) -> Vec<Action> {
		match key {
			Key::Delete => self.delete_selected(),
			Key::Escape => {
				self.clear_transient();
				vec![Action::SetCursor(Cursor::Default), Action::RenderNeeded]
			}
			Key::Enter => self.edit_selected(),
			Key::Other => Vec::new(),
		}
	}

	// --- Context menu ---

	pub fn open_context_menu(&mut self, screen: Point, measure: &(impl TextMeasure + ?Sized)) -> Vec<Action> {
		match self.node_id_at(screen, measure) {
			Some(id) => {
				self.selected = Some(id);
				self.context_menu = Some(screen);
			}
			None => {
				self.selected = None;
				self.context_menu = None;
			}
		}
		vec![Action::RenderNeeded]
	}

	pub fn close_context_menu(&mut self) {
		self.context_menu = None;
	}

	pub fn menu_edit(&mut self) -> Vec<Action> {
		self.close_context_menu();
		self.edit_selected()
	}

	pub fn menu_delete(&mut self) -> Vec<Action> {
		self.close_context_menu();
		self.delete_selected()
	}

	pub fn menu_connect(&mut self) -> Vec<Action> {
		self.close_context_menu();
		let Some(source) = self.selected.clone() else {
			return Vec::new();
		};
		self.interaction = Interaction::ConnectingPending { source };
		vec![Action::SetCursor(Cursor::Crosshair)]
	}

	pub fn menu_add_child(&mut self) -> Vec<Action> {
		self.close_context_menu();
		let Some(parent) = self.selected_node().cloned() else {
			return Vec::new();
		};
		let child = self.store.add_node(
			NEW_NODE_TEXT,
			parent.x + CHILD_OFFSET.x,
			parent.y + CHILD_OFFSET.y,
			Some(parent.id.clone()),
		);
		self.store.add_connection(&parent.id, &child.id);
		self.selected = Some(child.id);
		vec![Action::RenderNeeded]
	}

	// --- Editing ---

	pub fn edit_selected(&self) -> Vec<Action> {
		match self.selected_node() {
			Some(node) => vec![Action::EditTextRequested {
				id: node.id.clone(),
				text: node.text.clone(),
			}],
			None => Vec::new(),
		}
	}

	/// Commits an edit prompt. Blank input keeps the old text.
	pub fn apply_edit(&mut self, id: &str, text: &str) -> Vec<Action> {
		let text = text.trim();
		if text.is_empty() || !self.store.contains(id) {
			return Vec::new();
		}
		self.store.update_node_text(id, text);
		vec![Action::RenderNeeded]
	}

	pub fn delete_selected(&mut self) -> Vec<Action> {
		let Some(id) = self.selected.take() else {
			return Vec::new();
		};
		self.context_menu = None;
		self.store.delete_node(&id);
		let stale = match &self.interaction {
			Interaction::DraggingNode { id, .. } | Interaction::ConnectingPending { source: id } => {
				!self.store.contains(id)
			}
			_ => false,
		};
		if stale {
			self.interaction = Interaction::Idle;
			return vec![Action::SetCursor(Cursor::Default), Action::RenderNeeded];
		}
		vec![Action::RenderNeeded]
	}

	pub fn add_node_at_center(&mut self) -> Vec<Action> {
		let center = self.view.to_model(Point::new(
			self.viewport.width / 2.0,
			self.viewport.height / 2.0,
		));
		let node = self.store.add_node(NEW_NODE_TEXT, center.x, center.y, None);
		self.selected = Some(node.id);
		vec![Action::RenderNeeded]
	}

	pub fn set_selected_text(&mut self, text: &str) {
		if let Some(id) = &self.selected {
			self.store.update_node_text(id, text);
		}
	}

	pub fn set_selected_style(&mut self, update: StyleUpdate) {
		if let Some(id) = &self.selected {
			self.store.update_node_style(id, update);
		}
	}
}
