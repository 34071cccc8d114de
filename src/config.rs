//! Runtime configuration for the client.

use log::debug;

use crate::components::mind_map::geometry::Point;

pub const DEFAULT_AUTOSAVE_MS: u32 = 30_000;
const FALLBACK_API_URL: &str = "http://localhost:3000";

#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
	/// Origin of the REST backend; `/api/...` paths are appended to it.
	pub api_base_url: String,
	pub autosave_interval_ms: u32,
	pub initial_node_text: String,
	pub initial_node_position: Point,
}

impl AppConfig {
	pub fn new(api_base_url: impl Into<String>) -> Self {
		Self {
			api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
			autosave_interval_ms: DEFAULT_AUTOSAVE_MS,
			initial_node_text: "Central Idea".into(),
			initial_node_position: Point::new(400.0, 300.0),
		}
	}

	/// Uses the compile-time `MINDMAP_API_URL`, else the page origin.
	pub fn from_env() -> Self {
		let base = option_env!("MINDMAP_API_URL")
			.map(str::to_string)
			.or_else(|| web_sys::window().and_then(|w| w.location().origin().ok()))
			.unwrap_or_else(|| FALLBACK_API_URL.to_string());
		debug!("api base url: {}", base);
		let mut config = Self::new(base);
		if let Some(ms) = option_env!("MINDMAP_AUTOSAVE_MS").and_then(|v| v.parse().ok()) {
			config.autosave_interval_ms = ms;
		}
		config
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn trailing_slash_is_trimmed() {
		let config = AppConfig::new("https://maps.example.com/");
		assert_eq!(config.api_base_url, "https://maps.example.com");
		assert_eq!(config.autosave_interval_ms, DEFAULT_AUTOSAVE_MS);
		assert_eq!(config.initial_node_position, Point::new(400.0, 300.0));
	}
}
