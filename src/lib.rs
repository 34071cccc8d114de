//! Leptos client-side mind map editor: app wiring and routes.

use leptos::prelude::*;
use leptos_meta::*;
use leptos_router::components::*;
use leptos_router::path;
use log::{Level, info};

// Modules
pub mod api;
pub mod components;
pub mod config;
pub mod error;
mod pages;

use crate::api::AppContext;
use crate::components::toast::{ToastHost, Toasts};
use crate::config::AppConfig;

// Top-Level pages
use crate::pages::editor::Editor;
use crate::pages::home::Home;
use crate::pages::login::Login;
use crate::pages::not_found::NotFound;
use crate::pages::signup::Signup;

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("Logging initialized");
}

/// Router for the editor, the auth pages and a 404 fallback.
#[component]
pub fn App() -> impl IntoView {
	// Provides context that manages stylesheets, titles, meta tags, etc.
	provide_meta_context();

	provide_context(AppContext::new(AppConfig::from_env()));
	let toasts = Toasts::new();
	provide_context(toasts);

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="light" />

		// sets the document title
		<Title text="Mind Map" />

		// injects metadata in the <head> of the page
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<Router>
			<Routes fallback=|| view! { <NotFound /> }>
				<Route path=path!("/") view=Editor />
				<Route path=path!("/home") view=Home />
				<Route path=path!("/login") view=Login />
				<Route path=path!("/signup") view=Signup />
			</Routes>
		</Router>
		<ToastHost toasts=toasts />
	}
}
