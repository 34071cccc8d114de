use leptos::ev::SubmitEvent;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::components::A;
use leptos_router::hooks::use_navigate;

use crate::api::AppContext;
use crate::api::auth::{MIN_PASSWORD_LEN, SignupRequest};
use crate::components::toast::Toasts;

#[component]
pub fn Signup() -> impl IntoView {
	let app = expect_context::<AppContext>();
	let toasts = expect_context::<Toasts>();
	let navigate = use_navigate();

	let name = RwSignal::new(String::new());
	let email = RwSignal::new(String::new());
	let password = RwSignal::new(String::new());
	let pending = RwSignal::new(false);

	let on_submit = move |ev: SubmitEvent| {
		ev.prevent_default();
		let request = SignupRequest::new(
			&email.get_untracked(),
			&password.get_untracked(),
			&name.get_untracked(),
		);
		if let Err(err) = request.validate() {
			toasts.error(err.to_string());
			return;
		}
		pending.set(true);
		let navigate = navigate.clone();
		spawn_local(async move {
			match app.api().signup(&request).await {
				Ok(session) => {
					toasts.success("Account created");
					app.sign_in(session);
					navigate("/", Default::default());
				}
				Err(err) => toasts.error(err.to_string()),
			}
			pending.set(false);
		});
	};

	view! {
		<div class="centered-page">
			<form class="auth-form" on:submit=on_submit>
				<h1>"Sign up"</h1>
				<input type="text" placeholder="Name" bind:value=name />
				<input type="email" placeholder="Email" bind:value=email />
				<input
					type="password"
					placeholder=format!("Password (at least {MIN_PASSWORD_LEN} characters)")
					bind:value=password
				/>
				<button type="submit" disabled=move || pending.get()>
					{move || if pending.get() { "Creating account..." } else { "Sign up" }}
				</button>
				<p>"Already registered? " <A href="/login">"Log in"</A></p>
			</form>
		</div>
	}
}
