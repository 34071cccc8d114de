use leptos::prelude::*;
use leptos_router::components::A;

use crate::api::AppContext;
use crate::components::toast::Toasts;

/// Landing page: sign-in links, or a way back to the editor when signed in.
#[component]
pub fn Home() -> impl IntoView {
	let app = expect_context::<AppContext>();
	let toasts = expect_context::<Toasts>();

	let greeting = move || {
		app.session
			.with(|s| s.as_ref().map(|s| format!("Signed in as {}", s.user.name)))
	};

	view! {
		<div class="centered-page">
			<h1>"Mind Map"</h1>
			<p class="subtitle">"Sketch ideas on a canvas and keep them in the cloud."</p>
			<Show
				when=move || app.session.with(Option::is_some)
				fallback=|| {
					view! {
						<div class="link-row">
							<A href="/login">"Log in"</A>
							<A href="/signup">"Sign up"</A>
						</div>
					}
				}
			>
				<p>{greeting}</p>
				<div class="link-row">
					<A href="/">"Open editor"</A>
					<button on:click=move |_| {
						app.sign_out();
						toasts.info("Logged out");
					}>"Log out"</button>
				</div>
			</Show>
		</div>
	}
}
