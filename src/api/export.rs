use chrono::{DateTime, Utc};
use serde::Serialize;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::HtmlAnchorElement;

use crate::components::mind_map::types::{Connection, Node};

/// Downloadable JSON snapshot of the open map.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
	pub title: String,
	pub description: String,
	pub nodes: Vec<Node>,
	pub connections: Vec<Connection>,
	pub exported_at: DateTime<Utc>,
}

impl ExportDocument {
	pub fn file_name(&self) -> String {
		format!("mindmap-{}.json", self.exported_at.format("%Y-%m-%d"))
	}

	pub fn to_json(&self) -> serde_json::Result<String> {
		serde_json::to_string_pretty(self)
	}

	/// `data:` URL suitable for an anchor's `href`.
	pub fn data_url(&self) -> serde_json::Result<String> {
		let json = self.to_json()?;
		let encoded: String = js_sys::encode_uri_component(&json).into();
		Ok(format!("data:application/json;charset=utf-8,{encoded}"))
	}

	/// Hands the document to the browser as a file download.
	pub fn download(&self) -> Result<(), JsValue> {
		let href = self
			.data_url()
			.map_err(|err| JsValue::from_str(&err.to_string()))?;
		let document = web_sys::window()
			.and_then(|w| w.document())
			.ok_or_else(|| JsValue::from_str("no document"))?;
		let anchor: HtmlAnchorElement = document.create_element("a")?.dyn_into()?;
		anchor.set_href(&href);
		anchor.set_download(&self.file_name());
		anchor.click();
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use chrono::TimeZone;

	use super::*;
	use crate::components::mind_map::store::GraphStore;

	#[test]
	fn export_names_file_by_date_and_keeps_graph() {
		let mut store = GraphStore::new();
		let a = store.add_node("A", 0.0, 0.0, None);
		let b = store.add_node("B", 10.0, 0.0, None);
		store.add_connection(&a.id, &b.id);
		let snapshot = store.snapshot();
		let doc = ExportDocument {
			title: "Plans".into(),
			description: String::new(),
			nodes: snapshot.nodes,
			connections: snapshot.connections,
			exported_at: Utc.with_ymd_and_hms(2024, 3, 9, 17, 45, 0).unwrap(),
		};
		assert_eq!(doc.file_name(), "mindmap-2024-03-09.json");

		let value: serde_json::Value = serde_json::from_str(&doc.to_json().unwrap()).unwrap();
		assert_eq!(value["title"], "Plans");
		assert_eq!(value["exportedAt"], "2024-03-09T17:45:00Z");
		assert_eq!(value["nodes"].as_array().unwrap().len(), 2);
		assert_eq!(value["connections"][0]["fromNodeId"], a.id.as_str());
	}
}
