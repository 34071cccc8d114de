use gloo_timers::callback::Timeout;
use leptos::prelude::*;

const TOAST_LIFETIME_MS: u32 = 3_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastKind {
	Success,
	Error,
	Info,
}

impl ToastKind {
	fn class(self) -> &'static str {
		match self {
			ToastKind::Success => "toast toast-success",
			ToastKind::Error => "toast toast-error",
			ToastKind::Info => "toast toast-info",
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct Toast {
	id: u64,
	kind: ToastKind,
	message: String,
}

/// Transient notifications, provided once through context.
#[derive(Clone, Copy)]
pub struct Toasts {
	items: RwSignal<Vec<Toast>>,
	next_id: RwSignal<u64>,
}

impl Toasts {
	pub fn new() -> Self {
		Self {
			items: RwSignal::new(Vec::new()),
			next_id: RwSignal::new(0),
		}
	}

	pub fn push(&self, kind: ToastKind, message: impl Into<String>) {
		let id = self.next_id.get_untracked();
		self.next_id.set(id + 1);
		self.items.update(|items| {
			items.push(Toast {
				id,
				kind,
				message: message.into(),
			})
		});
		let items = self.items;
		Timeout::new(TOAST_LIFETIME_MS, move || {
			items.update(|items| items.retain(|t| t.id != id));
		})
		.forget();
	}

	pub fn success(&self, message: impl Into<String>) {
		self.push(ToastKind::Success, message);
	}

	pub fn error(&self, message: impl Into<String>) {
		self.push(ToastKind::Error, message);
	}

	pub fn info(&self, message: impl Into<String>) {
		self.push(ToastKind::Info, message);
	}
}

#[component]
pub fn ToastHost(toasts: Toasts) -> impl IntoView {
	view! {
		<div class="toast-container">
			<For each=move || toasts.items.get() key=|toast| toast.id let:toast>
				<div class=toast.kind.class()>{toast.message}</div>
			</For>
		</div>
	}
}
