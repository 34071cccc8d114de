use chrono::Utc;
use gloo_timers::callback::Interval;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::use_navigate;
use log::{debug, warn};

use crate::api::export::ExportDocument;
use crate::api::{AppContext, HttpApi, MindMapDraft, PersistenceClient, SaveOutcome, SkipReason};
use crate::components::mind_map::types::FontWeight;
use crate::components::mind_map::{EditorState, MindMap, MindMapCanvas, Node, Shape, StyleUpdate};
use crate::components::toast::Toasts;
use crate::error::ApiError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Modal {
	Closed,
	NewMap,
	Load,
}

/// Everything the editor page's handlers share. All fields are `Copy` handles.
#[derive(Clone, Copy)]
struct EditorPage {
	app: AppContext,
	toasts: Toasts,
	state: RwSignal<EditorState>,
	title: RwSignal<String>,
	description: RwSignal<String>,
	saving: RwSignal<bool>,
	modal: RwSignal<Modal>,
	maps: RwSignal<Vec<MindMap>>,
	persistence: StoredValue<PersistenceClient<HttpApi>, LocalStorage>,
}

impl EditorPage {
	fn client(&self) -> PersistenceClient<HttpApi> {
		self.persistence.get_value()
	}

	fn draft(&self) -> MindMapDraft {
		let graph = self.state.with_untracked(|s| s.store.snapshot());
		self.title
			.with_untracked(|t| self.description.with_untracked(|d| MindMapDraft::from_graph(t, d, graph)))
	}

	/// Auth failures end the session; everything else becomes a toast.
	fn report(&self, context: &str, err: ApiError) {
		warn!("{}: {}", context, err);
		if err.is_auth() {
			self.toasts.error("Your session has expired. Please log in again.");
			self.app.sign_out();
		} else {
			self.toasts.error(format!("{context}: {err}"));
		}
	}

	fn save(self, manual: bool) {
		let client = self.client();
		let draft = self.draft();
		self.saving.set(true);
		spawn_local(async move {
			let result = if manual {
				client.save(draft).await
			} else {
				client.autosave(draft).await
			};
			self.saving.set(client.is_saving());
			match result {
				Ok(SaveOutcome::Created(map) | SaveOutcome::Updated(map)) => {
					if self.title.with_untracked(|t| t.trim().is_empty()) {
						self.title.set(map.title);
					}
					if manual {
						self.toasts.success("Mind map saved");
					} else {
						debug!("auto-saved mind map {}", map.id);
					}
				}
				Ok(SaveOutcome::Skipped(SkipReason::InFlight)) if manual => {
					self.toasts.info("A save is already in progress");
				}
				Ok(SaveOutcome::Skipped(_)) => {}
				Err(err) => self.report("Save failed", err),
			}
		});
	}

	fn new_map(self, title: String, description: String) {
		let title = title.trim().to_string();
		if title.is_empty() {
			self.toasts.error("Title is required");
			return;
		}
		let at = self.app.config().initial_node_position;
		self.client().forget();
		self.state.update(|s| s.reset(&title, at));
		self.title.set(title);
		self.description.set(description.trim().to_string());
		self.modal.set(Modal::Closed);
		self.toasts.success("New mind map created");
	}

	fn open_load(self) {
		self.modal.set(Modal::Load);
		let client = self.client();
		spawn_local(async move {
			match client.list().await {
				Ok(maps) => self.maps.set(maps),
				Err(err) => self.report("Could not list mind maps", err),
			}
		});
	}

	fn load(self, id: String) {
		let client = self.client();
		spawn_local(async move {
			match client.load(&id).await {
				Ok(Some(map)) => {
					let dropped = self
						.state
						.try_update(|s| s.load(map.nodes, map.connections))
						.unwrap_or_default();
					if dropped > 0 {
						warn!("dropped {} invalid connections from {}", dropped, map.id);
					}
					self.title.set(map.title);
					self.description.set(map.description.unwrap_or_default());
					self.modal.set(Modal::Closed);
					self.toasts.success("Mind map loaded");
				}
				Ok(None) => debug!("load of {} superseded", id),
				Err(err) => self.report("Load failed", err),
			}
		});
	}

	fn delete(self, id: String) {
		let confirmed = web_sys::window()
			.and_then(|w| w.confirm_with_message("Delete this mind map?").ok())
			.unwrap_or(false);
		if !confirmed {
			return;
		}
		let client = self.client();
		spawn_local(async move {
			match client.delete(&id).await {
				Ok(()) => {
					self.maps.update(|maps| maps.retain(|m| m.id != id));
					self.toasts.success("Mind map deleted");
				}
				Err(err) => self.report("Delete failed", err),
			}
		});
	}

	fn export(self) {
		let graph = self.state.with_untracked(|s| s.store.snapshot());
		let document = ExportDocument {
			title: self.title.get_untracked(),
			description: self.description.get_untracked(),
			nodes: graph.nodes,
			connections: graph.connections,
			exported_at: Utc::now(),
		};
		match document.download() {
			Ok(()) => self.toasts.success("Mind map exported"),
			Err(err) => {
				warn!("export failed: {:?}", err);
				self.toasts.error("Export failed");
			}
		}
	}

	fn logout(self) {
		self.client().forget();
		self.app.sign_out();
		self.toasts.info("Logged out");
	}
}

/// The editor route: toolbar, canvas, properties panel and dialogs.
#[component]
pub fn Editor() -> impl IntoView {
	let app = expect_context::<AppContext>();
	let toasts = expect_context::<Toasts>();
	let config = app.config();

	let state = RwSignal::new(EditorState::new());
	state.update(|s| s.reset(&config.initial_node_text, config.initial_node_position));

	let page = EditorPage {
		app,
		toasts,
		state,
		title: RwSignal::new(String::new()),
		description: RwSignal::new(String::new()),
		saving: RwSignal::new(false),
		modal: RwSignal::new(Modal::Closed),
		maps: RwSignal::new(Vec::new()),
		persistence: StoredValue::new_local(PersistenceClient::new(app.api())),
	};

	let navigate = use_navigate();
	Effect::new(move |_| {
		if app.session.with(Option::is_none) {
			navigate("/home", Default::default());
		}
	});

	if app.is_authenticated() {
		let api = app.api();
		spawn_local(async move {
			if let Err(err) = api.me().await {
				page.report("Could not verify session", err);
			}
		});
	}

	let autosave = StoredValue::new_local(Some(Interval::new(config.autosave_interval_ms, move || {
		if page.app.is_authenticated() {
			page.save(false);
		}
	})));
	on_cleanup(move || {
		autosave.try_update_value(|timer| timer.take());
	});

	let stats = move || {
		state.with(|s| {
			format!(
				"{} nodes, {} connections",
				s.store.node_count(),
				s.store.connection_count()
			)
		})
	};

	view! {
		<div class="editor">
			<header class="toolbar">
				<span class="map-title">
					{move || {
						let title = page.title.get();
						if title.is_empty() { "Untitled".to_string() } else { title }
					}}
				</span>
				<button on:click=move |_| page.modal.set(Modal::NewMap)>"New"</button>
				<button on:click=move |_| state.update(|s| {
					s.add_node_at_center();
				})>"Add node"</button>
				<button on:click=move |_| page.save(true) disabled=move || page.saving.get()>
					{move || if page.saving.get() { "Saving..." } else { "Save" }}
				</button>
				<button on:click=move |_| page.open_load()>"Load"</button>
				<button on:click=move |_| page.export()>"Export"</button>
				<span class="stats">{stats}</span>
				<button class="logout" on:click=move |_| page.logout()>"Logout"</button>
			</header>
			<main class="workspace">
				<div class="canvas-host">
					<MindMapCanvas state=state />
				</div>
				<PropertiesPanel state=state />
			</main>
			<NewMapModal page=page />
			<LoadModal page=page />
		</div>
	}
}

#[component]
fn PropertiesPanel(state: RwSignal<EditorState>) -> impl IntoView {
	let selected = Memo::new(move |_| state.with(|s| s.selected_node().cloned()));
	let field = move |read: fn(&Node) -> String| {
		move || selected.with(|n| n.as_ref().map(read).unwrap_or_default())
	};
	let restyle = move |update: StyleUpdate| state.update(|s| s.set_selected_style(update));

	view! {
		<Show
			when=move || selected.with(Option::is_some)
			fallback=|| view! { <aside class="properties empty">"Select a node to edit it"</aside> }
		>
			<aside class="properties">
				<h2>"Node"</h2>
				<label>
					"Text"
					<input
						type="text"
						prop:value=field(|n| n.text.clone())
						on:change=move |ev| {
							let text = event_target_value(&ev);
							if !text.trim().is_empty() {
								state.update(|s| s.set_selected_text(text.trim()));
							}
						}
					/>
				</label>
				<label>
					"Background"
					<input
						type="color"
						prop:value=field(|n| n.style.background_color.clone())
						on:input=move |ev| restyle(StyleUpdate::BackgroundColor(event_target_value(&ev)))
					/>
				</label>
				<label>
					"Text color"
					<input
						type="color"
						prop:value=field(|n| n.style.text_color.clone())
						on:input=move |ev| restyle(StyleUpdate::TextColor(event_target_value(&ev)))
					/>
				</label>
				<label>
					"Border"
					<input
						type="color"
						prop:value=field(|n| n.style.border_color.clone())
						on:input=move |ev| restyle(StyleUpdate::BorderColor(event_target_value(&ev)))
					/>
				</label>
				<label>
					"Shape"
					<select
						prop:value=field(|n| n.style.shape.as_str().to_string())
						on:change=move |ev| {
							if let Some(shape) = Shape::parse(&event_target_value(&ev)) {
								restyle(StyleUpdate::Shape(shape));
							}
						}
					>
						{Shape::ALL
							.iter()
							.map(|shape| view! { <option value=shape.as_str()>{shape.as_str()}</option> })
							.collect_view()}
					</select>
				</label>
				<label>
					"Font weight"
					<select
						prop:value=field(|n| n.style.font_weight.as_str().to_string())
						on:change=move |ev| {
							if let Some(weight) = FontWeight::parse(&event_target_value(&ev)) {
								restyle(StyleUpdate::FontWeight(weight));
							}
						}
					>
						<option value="normal">"normal"</option>
						<option value="bold">"bold"</option>
					</select>
				</label>
				<label>
					"Font size"
					<input
						type="number"
						min="8"
						max="48"
						prop:value=field(|n| n.style.font_size.to_string())
						on:change=move |ev| {
							if let Ok(size) = event_target_value(&ev).parse::<f64>() {
								restyle(StyleUpdate::FontSize(size));
							}
						}
					/>
				</label>
				<button class="danger" on:click=move |_| state.update(|s| {
					s.delete_selected();
				})>"Delete node"</button>
			</aside>
		</Show>
	}
}

#[component]
fn NewMapModal(page: EditorPage) -> impl IntoView {
	let title = RwSignal::new(String::new());
	let description = RwSignal::new(String::new());
	let close = move || {
		title.set(String::new());
		description.set(String::new());
		page.modal.set(Modal::Closed);
	};

	view! {
		<Show when=move || page.modal.get() == Modal::NewMap>
			<div class="modal-backdrop">
				<div class="modal">
					<h2>"New mind map"</h2>
					<input type="text" placeholder="Title" bind:value=title />
					<textarea placeholder="Description (optional)" bind:value=description />
					<div class="modal-actions">
						<button on:click=move |_| close()>"Cancel"</button>
						<button
							class="primary"
							on:click=move |_| {
								page.new_map(title.get_untracked(), description.get_untracked());
								if page.modal.get_untracked() == Modal::Closed {
									close();
								}
							}
						>
							"Create"
						</button>
					</div>
				</div>
			</div>
		</Show>
	}
}

#[component]
fn LoadModal(page: EditorPage) -> impl IntoView {
	view! {
		<Show when=move || page.modal.get() == Modal::Load>
			<div class="modal-backdrop">
				<div class="modal">
					<h2>"Your mind maps"</h2>
					<Show
						when=move || page.maps.with(|maps| !maps.is_empty())
						fallback=|| view! { <p>"No saved mind maps yet"</p> }
					>
						<ul class="map-list">
							<For each=move || page.maps.get() key=|map| map.id.clone() let:map>
								<MapRow page=page map=map />
							</For>
						</ul>
					</Show>
					<div class="modal-actions">
						<button on:click=move |_| page.modal.set(Modal::Closed)>"Close"</button>
					</div>
				</div>
			</div>
		</Show>
	}
}

#[component]
fn MapRow(page: EditorPage, map: MindMap) -> impl IntoView {
	let description = map
		.description
		.clone()
		.filter(|d| !d.trim().is_empty())
		.unwrap_or_else(|| "No description".into());
	let updated = map.updated_at.format("%Y-%m-%d %H:%M").to_string();
	let load_id = map.id.clone();
	let delete_id = map.id;

	view! {
		<li class="map-row">
			<div>
				<strong>{map.title}</strong>
				<p>{description}</p>
				<small>"Updated " {updated}</small>
			</div>
			<button on:click=move |_| page.load(load_id.clone())>"Load"</button>
			<button class="danger" on:click=move |_| page.delete(delete_id.clone())>"Delete"</button>
		</li>
	}
}
