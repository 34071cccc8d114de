use async_trait::async_trait;
use log::{debug, error};
use reqwest::header::AUTHORIZATION;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::auth::{LoginRequest, Session, SignupRequest, User};
use crate::components::mind_map::store::GraphSnapshot;
use crate::components::mind_map::types::{Connection, MindMap, Node};
use crate::error::{ApiError, Result};

/// The single response envelope every endpoint answers with.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
	#[serde(default)]
	pub success: bool,
	pub data: Option<T>,
	pub error: Option<String>,
	pub message: Option<String>,
}

impl<T> Envelope<T> {
	fn failure_message(&self) -> String {
		self.error
			.clone()
			.or_else(|| self.message.clone())
			.unwrap_or_else(|| "Request failed".into())
	}

	/// Success flag and status both have to agree before `data` is trusted.
	pub fn into_result(self, status: u16) -> Result<Option<T>> {
		if (200..300).contains(&status) && self.success {
			Ok(self.data)
		} else {
			let status = if (200..300).contains(&status) { 500 } else { status };
			Err(ApiError::from_status(status, self.failure_message()))
		}
	}

	pub fn into_data(self, status: u16) -> Result<T> {
		self.into_result(status)?
			.ok_or_else(|| ApiError::Server {
				status,
				message: "response carried no data".into(),
			})
	}
}

/// Body of a create or update call.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MindMapDraft {
	pub title: String,
	/// Always sent so that clearing it on update reaches the backend.
	pub description: String,
	pub nodes: Vec<Node>,
	pub connections: Vec<Connection>,
}

impl MindMapDraft {
	/// Falls back to the first node's text, then "Untitled", when the title
	/// is blank.
	pub fn from_graph(title: &str, description: &str, graph: GraphSnapshot) -> Self {
		let title = match title.trim() {
			"" => graph
				.nodes
				.first()
				.map(|n| n.text.trim())
				.filter(|t| !t.is_empty())
				.unwrap_or("Untitled")
				.to_string(),
			t => t.to_string(),
		};
		Self {
			title,
			description: description.trim().to_string(),
			nodes: graph.nodes,
			connections: graph.connections,
		}
	}
}

/// CRUD over the `mindmaps` resource.
#[async_trait(?Send)]
pub trait MindMapApi {
	/// Summaries, most recently updated first.
	async fn list(&self) -> Result<Vec<MindMap>>;
	async fn get(&self, id: &str) -> Result<MindMap>;
	async fn create(&self, draft: &MindMapDraft) -> Result<MindMap>;
	async fn update(&self, id: &str, draft: &MindMapDraft) -> Result<MindMap>;
	async fn delete(&self, id: &str) -> Result<()>;
}

#[derive(Debug, Deserialize)]
struct AuthPayload {
	user: User,
	token: String,
}

/// JSON-over-HTTP client for the backend, carrying the bearer token if any.
#[derive(Clone, Debug)]
pub struct HttpApi {
	client: reqwest::Client,
	base_url: String,
	token: Option<String>,
}

impl HttpApi {
	pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
		Self {
			client: reqwest::Client::new(),
			base_url: base_url.into(),
			token,
		}
	}

	pub fn url(&self, path: &str) -> String {
		format!("{}/api/{}", self.base_url.trim_end_matches('/'), path.trim_start_matches('/'))
	}

	fn request(&self, method: Method, path: &str) -> RequestBuilder {
		debug!("{} {}", method, path);
		let builder = self.client.request(method, self.url(path));
		match &self.token {
			Some(token) => builder.header(AUTHORIZATION, format!("Bearer {token}")),
			None => builder,
		}
	}

	async fn envelope<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<(u16, Envelope<T>)> {
		let response = builder.send().await.map_err(|err| {
			error!("request failed: {}", err);
			ApiError::from(err)
		})?;
		let status = response.status();
		let body = response.text().await?;
		match serde_json::from_str::<Envelope<T>>(&body) {
			Ok(envelope) => Ok((status.as_u16(), envelope)),
			Err(_) if !status.is_success() => Err(ApiError::from_status(
				status.as_u16(),
				status.canonical_reason().unwrap_or("Request failed"),
			)),
			Err(err) => Err(ApiError::Network(format!("malformed response: {err}"))),
		}
	}

	async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
		let (status, envelope) = self.envelope(builder).await?;
		envelope.into_data(status)
	}

	pub async fn signup(&self, request: &SignupRequest) -> Result<Session> {
		request.validate()?;
		let payload: AuthPayload = self
			.send(self.request(Method::POST, "auth/signup").json(request))
			.await?;
		Ok(Session {
			token: payload.token,
			user: payload.user,
		})
	}

	pub async fn login(&self, request: &LoginRequest) -> Result<Session> {
		request.validate()?;
		let payload: AuthPayload = self
			.send(self.request(Method::POST, "auth/login").json(request))
			.await?;
		Ok(Session {
			token: payload.token,
			user: payload.user,
		})
	}

	/// Verifies the current token and returns its user.
	pub async fn me(&self) -> Result<User> {
		if self.token.is_none() {
			return Err(ApiError::from_status(
				StatusCode::UNAUTHORIZED.as_u16(),
				"Not signed in",
			));
		}
		self.send(self.request(Method::GET, "auth/me")).await
	}
}

#[async_trait(?Send)]
impl MindMapApi for HttpApi {
	async fn list(&self) -> Result<Vec<MindMap>> {
		self.send(self.request(Method::GET, "mindmaps")).await
	}

	async fn get(&self, id: &str) -> Result<MindMap> {
		self.send(self.request(Method::GET, &format!("mindmaps/{id}"))).await
	}

	async fn create(&self, draft: &MindMapDraft) -> Result<MindMap> {
		self.send(self.request(Method::POST, "mindmaps").json(draft)).await
	}

	async fn update(&self, id: &str, draft: &MindMapDraft) -> Result<MindMap> {
		self.send(self.request(Method::PUT, &format!("mindmaps/{id}")).json(draft))
			.await
	}

	async fn delete(&self, id: &str) -> Result<()> {
		let (status, envelope) = self
			.envelope::<serde_json::Value>(self.request(Method::DELETE, &format!("mindmaps/{id}")))
			.await?;
		envelope.into_result(status).map(|_| ())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn urls_are_joined_under_api() {
		let api = HttpApi::new("https://maps.example.com/", None);
		assert_eq!(api.url("mindmaps"), "https://maps.example.com/api/mindmaps");
		assert_eq!(api.url("/auth/me"), "https://maps.example.com/api/auth/me");
	}

	#[test]
	fn envelope_success_yields_data() {
		let envelope: Envelope<Vec<u32>> =
			serde_json::from_str(r#"{"success":true,"data":[1,2],"message":"ok"}"#).unwrap();
		assert_eq!(envelope.into_data(200).unwrap(), vec![1, 2]);
	}

	#[test]
	fn envelope_error_maps_status() {
		let envelope: Envelope<u32> = serde_json::from_str(
			r#"{"success":false,"error":"Mind map not found","message":"The requested mind map does not exist"}"#,
		)
		.unwrap();
		assert_eq!(
			envelope.into_data(404),
			Err(ApiError::NotFound("Mind map not found".into()))
		);

		let envelope: Envelope<u32> =
			serde_json::from_str(r#"{"success":false,"message":"Invalid token"}"#).unwrap();
		assert_eq!(envelope.into_data(401), Err(ApiError::Auth("Invalid token".into())));
	}

	#[test]
	fn success_without_flag_is_a_failure() {
		let envelope: Envelope<u32> = serde_json::from_str(r#"{"data":3}"#).unwrap();
		assert!(matches!(
			envelope.into_data(200),
			Err(ApiError::Server { status: 500, .. })
		));
	}

	#[test]
	fn delete_envelope_needs_no_data() {
		let envelope: Envelope<serde_json::Value> =
			serde_json::from_str(r#"{"success":true,"message":"Mind map deleted"}"#).unwrap();
		assert_eq!(envelope.into_result(200).unwrap(), None);
	}

	#[test]
	fn draft_title_falls_back_to_first_node_then_untitled() {
		use crate::components::mind_map::store::GraphStore;

		let mut store = GraphStore::new();
		assert_eq!(MindMapDraft::from_graph("  ", "", store.snapshot()).title, "Untitled");

		store.add_node("Roadmap", 0.0, 0.0, None);
		store.add_node("Other", 10.0, 0.0, None);
		let draft = MindMapDraft::from_graph("", "  ", store.snapshot());
		assert_eq!(draft.title, "Roadmap");
		assert_eq!(draft.description, "");
		assert_eq!(draft.nodes.len(), 2);

		let draft = MindMapDraft::from_graph(" Q3 ", "goals", store.snapshot());
		assert_eq!(draft.title, "Q3");
		assert_eq!(draft.description, "goals");
	}

	#[test]
	fn draft_always_sends_description() {
		let draft = MindMapDraft {
			title: "Plans".into(),
			description: String::new(),
			nodes: vec![],
			connections: vec![],
		};
		let value = serde_json::to_value(&draft).unwrap();
		assert_eq!(value["title"], "Plans");
		assert_eq!(value["description"], "");
		assert!(value["nodes"].as_array().unwrap().is_empty());
	}
}
