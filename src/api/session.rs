use leptos::prelude::*;
use log::{info, warn};
use web_sys::Storage;

use super::auth::Session;
use super::client::HttpApi;
use crate::config::AppConfig;

const TOKEN_KEY: &str = "authToken";
const USER_KEY: &str = "user";

fn local_storage() -> Option<Storage> {
	web_sys::window()?.local_storage().ok().flatten()
}

/// Reads a session persisted by an earlier sign-in.
fn restore() -> Option<Session> {
	let storage = local_storage()?;
	let token = storage.get_item(TOKEN_KEY).ok().flatten()?;
	let user = storage.get_item(USER_KEY).ok().flatten()?;
	match serde_json::from_str(&user) {
		Ok(user) => Some(Session { token, user }),
		Err(err) => {
			warn!("discarding stored user: {}", err);
			None
		}
	}
}

fn persist(session: Option<&Session>) {
	let Some(storage) = local_storage() else {
		return;
	};
	let result = match session {
		Some(session) => serde_json::to_string(&session.user)
			.map_err(|err| err.to_string())
			.and_then(|user| {
				storage
					.set_item(TOKEN_KEY, &session.token)
					.and_then(|_| storage.set_item(USER_KEY, &user))
					.map_err(|err| format!("{err:?}"))
			}),
		None => storage
			.remove_item(TOKEN_KEY)
			.and_then(|_| storage.remove_item(USER_KEY))
			.map_err(|err| format!("{err:?}")),
	};
	if let Err(err) = result {
		warn!("could not update stored session: {}", err);
	}
}

/// Application services, built once at the root and shared through context.
#[derive(Clone, Copy)]
pub struct AppContext {
	config: StoredValue<AppConfig>,
	pub session: RwSignal<Option<Session>>,
}

impl AppContext {
	pub fn new(config: AppConfig) -> Self {
		Self {
			config: StoredValue::new(config),
			session: RwSignal::new(restore()),
		}
	}

	pub fn config(&self) -> AppConfig {
		self.config.get_value()
	}

	/// A client carrying the current bearer token.
	pub fn api(&self) -> HttpApi {
		let token = self.session.with_untracked(|s| s.as_ref().map(|s| s.token.clone()));
		HttpApi::new(self.config().api_base_url, token)
	}

	pub fn is_authenticated(&self) -> bool {
		self.session.with_untracked(Option::is_some)
	}

	pub fn sign_in(&self, session: Session) {
		info!("signed in as {}", session.user.email);
		persist(Some(&session));
		self.session.set(Some(session));
	}

	pub fn sign_out(&self) {
		info!("signed out");
		persist(None);
		self.session.set(None);
	}
}
