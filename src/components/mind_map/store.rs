use std::collections::HashSet;

use chrono::Utc;
use indexmap::IndexMap;
use log::{debug, warn};
use uuid::Uuid;

use super::types::{Connection, ConnectionStyle, Node, NodeId, NodeStyle, StyleUpdate};

/// Ordered materialization of the store, in insertion order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphSnapshot {
	pub nodes: Vec<Node>,
	pub connections: Vec<Connection>,
}

/// In-memory owner of the nodes and connections of the open mind map.
///
/// Every connection references two distinct nodes that are present in the
/// store. Iteration order is insertion order.
#[derive(Clone, Debug, Default)]
pub struct GraphStore {
	nodes: IndexMap<NodeId, Node>,
	connections: IndexMap<String, Connection>,
}

fn fresh_id() -> String {
	Uuid::new_v4().simple().to_string()
}

impl GraphStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn add_node(&mut self, text: impl Into<String>, x: f64, y: f64, parent_id: Option<NodeId>) -> Node {
		let now = Utc::now();
		let node = Node {
			id: fresh_id(),
			text: text.into(),
			x,
			y,
			parent_id,
			style: NodeStyle::default(),
			created_at: now,
			updated_at: now,
		};
		debug!("add node {} {:?}", node.id, node.text);
		self.nodes.insert(node.id.clone(), node.clone());
		node
	}

	/// Removes `id`, every node descending from it through `parent_id`, and
	/// every connection touching a removed node. Returns the number of nodes
	/// removed; absent ids are a no-op.
	pub fn delete_node(&mut self, id: &str) -> usize {
		if !self.nodes.contains_key(id) {
			return 0;
		}

		let mut doomed: HashSet<NodeId> = HashSet::new();
		let mut stack = vec![id.to_string()];
		while let Some(current) = stack.pop() {
			if !doomed.insert(current.clone()) {
				continue;
			}
			stack.extend(
				self.nodes
					.values()
					.filter(|n| n.parent_id.as_deref() == Some(current.as_str()))
					.map(|n| n.id.clone()),
			);
		}

		self.connections
			.retain(|_, c| !doomed.contains(&c.from_node_id) && !doomed.contains(&c.to_node_id));
		self.nodes.retain(|node_id, _| !doomed.contains(node_id));
		debug!("deleted {} node(s) rooted at {}", doomed.len(), id);
		doomed.len()
	}

	/// Returns `None` for self-loops or when either endpoint is missing.
	/// Duplicate connections between the same pair are allowed.
	pub fn add_connection(&mut self, from_id: &str, to_id: &str) -> Option<Connection> {
		if from_id == to_id {
			debug!("rejected self-connection on {}", from_id);
			return None;
		}
		if !self.nodes.contains_key(from_id) || !self.nodes.contains_key(to_id) {
			debug!("rejected connection {} -> {}: missing endpoint", from_id, to_id);
			return None;
		}
		let connection = Connection {
			id: fresh_id(),
			from_node_id: from_id.to_string(),
			to_node_id: to_id.to_string(),
			style: ConnectionStyle::default(),
		};
		self.connections.insert(connection.id.clone(), connection.clone());
		Some(connection)
	}

	pub fn update_node_text(&mut self, id: &str, text: impl Into<String>) {
		if let Some(node) = self.nodes.get_mut(id) {
			node.text = text.into();
			node.updated_at = Utc::now();
		}
	}

	pub fn update_node_style(&mut self, id: &str, update: StyleUpdate) {
		if let Some(node) = self.nodes.get_mut(id) {
			update.apply(&mut node.style);
			node.updated_at = Utc::now();
		}
	}

	pub fn move_node(&mut self, id: &str, x: f64, y: f64) {
		if let Some(node) = self.nodes.get_mut(id) {
			node.x = x;
			node.y = y;
		}
	}

	pub fn clear(&mut self) {
		self.nodes.clear();
		self.connections.clear();
	}

	pub fn snapshot(&self) -> GraphSnapshot {
		GraphSnapshot {
			nodes: self.nodes.values().cloned().collect(),
			connections: self.connections.values().cloned().collect(),
		}
	}

	/// Wholesale load of a persisted document. Later duplicates of a node id
	/// replace earlier ones; connections that are self-loops or reference a
	/// missing node are dropped. Returns the number of dropped connections.
	pub fn replace(&mut self, nodes: Vec<Node>, connections: Vec<Connection>) -> usize {
		self.clear();
		for node in nodes {
			self.nodes.insert(node.id.clone(), node);
		}
		let mut dropped = 0;
		for connection in connections {
			let valid = connection.from_node_id != connection.to_node_id
				&& self.nodes.contains_key(&connection.from_node_id)
				&& self.nodes.contains_key(&connection.to_node_id);
			if valid {
				self.connections.insert(connection.id.clone(), connection);
			} else {
				warn!(
					"dropping invalid connection {} ({} -> {})",
					connection.id, connection.from_node_id, connection.to_node_id
				);
				dropped += 1;
			}
		}
		dropped
	}

	pub fn node(&self, id: &str) -> Option<&Node> {
		self.nodes.get(id)
	}

	pub fn contains(&self, id: &str) -> bool {
		self.nodes.contains_key(id)
	}

	pub fn nodes(&self) -> impl Iterator<Item = &Node> {
		self.nodes.values()
	}

	pub fn connections(&self) -> impl Iterator<Item = &Connection> {
		self.connections.values()
	}

	pub fn node_count(&self) -> usize {
		self.nodes.len()
	}

	pub fn connection_count(&self) -> usize {
		self.connections.len()
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::mind_map::types::{Shape, StyleUpdate};

	#[test]
	fn node_ids_are_unique() {
		let mut store = GraphStore::new();
		let ids: HashSet<_> = (0..200)
			.map(|i| store.add_node(format!("n{i}"), 0.0, 0.0, None).id)
			.collect();
		assert_eq!(ids.len(), 200);
		assert_eq!(store.node_count(), 200);
	}

	#[test]
	fn delete_node_cascades_connections() {
		let mut store = GraphStore::new();
		let a = store.add_node("A", 100.0, 100.0, None);
		let b = store.add_node("B", 300.0, 100.0, None);
		assert!(store.add_connection(&a.id, &b.id).is_some());
		assert_eq!((store.node_count(), store.connection_count()), (2, 1));

		store.delete_node(&a.id);
		assert_eq!((store.node_count(), store.connection_count()), (1, 0));
		assert!(store.contains(&b.id));
		assert!(store.connections().all(|c| !c.touches(&a.id)));
	}

	#[test]
	fn delete_node_removes_descendants() {
		let mut store = GraphStore::new();
		let root = store.add_node("root", 0.0, 0.0, None);
		let child = store.add_node("child", 0.0, 0.0, Some(root.id.clone()));
		let grandchild = store.add_node("grandchild", 0.0, 0.0, Some(child.id.clone()));
		let other = store.add_node("other", 0.0, 0.0, None);
		store.add_connection(&other.id, &grandchild.id);

		assert_eq!(store.delete_node(&root.id), 3);
		assert_eq!(store.node_count(), 1);
		assert_eq!(store.connection_count(), 0);
	}

	#[test]
	fn delete_node_terminates_on_parent_cycle() {
		let mut store = GraphStore::new();
		let a = store.add_node("a", 0.0, 0.0, None);
		let b = store.add_node("b", 0.0, 0.0, Some(a.id.clone()));
		let mut cyclic = store.node(&a.id).unwrap().clone();
		cyclic.parent_id = Some(b.id.clone());
		let b = store.node(&b.id).unwrap().clone();
		store.replace(vec![cyclic.clone(), b], vec![]);

		assert_eq!(store.delete_node(&cyclic.id), 2);
		assert!(store.is_empty());
	}

	#[test]
	fn delete_is_idempotent_and_ignores_unknown_ids() {
		let mut store = GraphStore::new();
		let a = store.add_node("A", 0.0, 0.0, None);
		let b = store.add_node("B", 0.0, 0.0, None);
		store.add_connection(&a.id, &b.id);

		assert_eq!(store.delete_node("missing"), 0);
		assert_eq!((store.node_count(), store.connection_count()), (2, 1));

		store.delete_node(&a.id);
		store.delete_node(&a.id);
		assert_eq!((store.node_count(), store.connection_count()), (1, 0));
	}

	#[test]
	fn self_connection_is_rejected() {
		let mut store = GraphStore::new();
		let a = store.add_node("A", 0.0, 0.0, None);
		assert!(store.add_connection(&a.id, &a.id).is_none());
		assert_eq!(store.connection_count(), 0);
	}

	#[test]
	fn connection_to_missing_node_is_rejected() {
		let mut store = GraphStore::new();
		let a = store.add_node("A", 0.0, 0.0, None);
		assert!(store.add_connection(&a.id, "ghost").is_none());
		assert!(store.add_connection("ghost", &a.id).is_none());
		assert_eq!(store.connection_count(), 0);
	}

	#[test]
	fn duplicate_connections_are_permitted() {
		let mut store = GraphStore::new();
		let a = store.add_node("A", 0.0, 0.0, None);
		let b = store.add_node("B", 0.0, 0.0, None);
		let first = store.add_connection(&a.id, &b.id).unwrap();
		let second = store.add_connection(&a.id, &b.id).unwrap();
		assert_ne!(first.id, second.id);
		assert_eq!(store.connection_count(), 2);
	}

	#[test]
	fn updates_bump_timestamp_and_ignore_missing() {
		let mut store = GraphStore::new();
		let a = store.add_node("A", 0.0, 0.0, None);
		store.update_node_text(&a.id, "renamed");
		store.update_node_style(&a.id, StyleUpdate::Shape(Shape::Diamond));
		store.update_node_text("missing", "x");

		let node = store.node(&a.id).unwrap();
		assert_eq!(node.text, "renamed");
		assert_eq!(node.style.shape, Shape::Diamond);
		assert!(node.updated_at >= a.updated_at);
		assert_eq!(store.node_count(), 1);
	}

	#[test]
	fn snapshot_preserves_insertion_order() {
		let mut store = GraphStore::new();
		let names = ["c", "a", "b"];
		for name in names {
			store.add_node(name, 0.0, 0.0, None);
		}
		let snapshot = store.snapshot();
		let texts: Vec<_> = snapshot.nodes.iter().map(|n| n.text.as_str()).collect();
		assert_eq!(texts, names);
	}

	#[test]
	fn replace_drops_dangling_and_self_connections() {
		let mut source = GraphStore::new();
		let a = source.add_node("A", 0.0, 0.0, None);
		let b = source.add_node("B", 0.0, 0.0, None);
		let good = source.add_connection(&a.id, &b.id).unwrap();
		let mut dangling = good.clone();
		dangling.id = "dangling".into();
		dangling.to_node_id = "ghost".into();
		let mut looped = good.clone();
		looped.id = "loop".into();
		looped.to_node_id = a.id.clone();

		let mut store = GraphStore::new();
		store.add_node("stale", 0.0, 0.0, None);
		let dropped = store.replace(vec![a, b], vec![good.clone(), dangling, looped]);

		assert_eq!(dropped, 2);
		assert_eq!(store.node_count(), 2);
		assert_eq!(store.snapshot().connections, vec![good]);
	}

	#[test]
	fn clear_empties_everything() {
		let mut store = GraphStore::new();
		let a = store.add_node("A", 0.0, 0.0, None);
		let b = store.add_node("B", 0.0, 0.0, None);
		store.add_connection(&a.id, &b.id);
		store.clear();
		assert!(store.is_empty());
		assert_eq!(store.connection_count(), 0);
	}
}
