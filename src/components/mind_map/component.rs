use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use leptos::ev;
use leptos::prelude::*;
use log::warn;
use wasm_bindgen::prelude::*;
use web_sys::{
	CanvasRenderingContext2d, Element, HtmlCanvasElement, KeyboardEvent, MouseEvent, TouchEvent,
	WheelEvent,
};

use super::geometry::{ApproxMeasure, Point, TextMeasure};
use super::render;
use super::state::{Action, Button, Cursor, EditorState, Key, LONG_PRESS_MS};

fn context_2d(canvas: &HtmlCanvasElement) -> Option<CanvasRenderingContext2d> {
	canvas.get_context("2d").ok().flatten()?.dyn_into().ok()
}

fn canvas_element(canvas_ref: NodeRef<leptos::html::Canvas>) -> Option<HtmlCanvasElement> {
	canvas_ref.get_untracked().map(Into::into)
}

/// Font metrics from the live canvas, or an estimate before it is mounted.
fn measurer(canvas_ref: NodeRef<leptos::html::Canvas>) -> Box<dyn TextMeasure> {
	match canvas_element(canvas_ref).as_ref().and_then(context_2d) {
		Some(ctx) => Box::new(ctx),
		None => Box::new(ApproxMeasure),
	}
}

fn local_point(canvas_ref: NodeRef<leptos::html::Canvas>, client_x: i32, client_y: i32) -> Option<Point> {
	let canvas = canvas_element(canvas_ref)?;
	let rect = canvas.get_bounding_client_rect();
	Some(Point::new(
		client_x as f64 - rect.left(),
		client_y as f64 - rect.top(),
	))
}

fn touch_points(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &TouchEvent) -> Vec<Point> {
	let touches = ev.touches();
	(0..touches.length())
		.filter_map(|i| touches.get(i))
		.filter_map(|t| local_point(canvas_ref, t.client_x(), t.client_y()))
		.collect()
}

/// Runs an input handler against the editor and carries out the returned actions.
fn dispatch(
	state: RwSignal<EditorState>,
	cursor: RwSignal<Cursor>,
	handler: impl FnOnce(&mut EditorState) -> Vec<Action>,
) {
	let mut actions = Vec::new();
	state.maybe_update(|s| {
		actions = handler(s);
		!actions.is_empty()
	});
	for action in actions {
		match action {
			Action::RenderNeeded => {}
			Action::SetCursor(c) => cursor.set(c),
			Action::EditTextRequested { id, text } => prompt_edit(state, &id, &text),
		}
	}
}

/// Editor shortcuts stay out of the way of form fields.
fn handles_shortcuts(target_tag: Option<&str>) -> bool {
	!matches!(
		target_tag.map(str::to_ascii_uppercase).as_deref(),
		Some("INPUT" | "TEXTAREA" | "SELECT")
	)
}

fn event_target_tag(ev: &KeyboardEvent) -> Option<String> {
	ev.target()?.dyn_into::<Element>().ok().map(|el| el.tag_name())
}

fn prompt_edit(state: RwSignal<EditorState>, id: &str, current: &str) {
	let Some(window) = web_sys::window() else {
		return;
	};
	match window.prompt_with_message_and_default("Edit node text:", current) {
		Ok(Some(text)) => state.update(|s| {
			s.apply_edit(id, &text);
		}),
		Ok(None) => {}
		Err(err) => warn!("edit prompt failed: {:?}", err),
	}
}

/// Interactive canvas for the mind map held in `state`.
#[component]
pub fn MindMapCanvas(state: RwSignal<EditorState>) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let cursor = RwSignal::new(Cursor::Default);
	let long_press: Rc<RefCell<Option<Timeout>>> = Rc::new(RefCell::new(None));

	let fit_to_parent = move || {
		let Some(canvas) = canvas_element(canvas_ref) else {
			return;
		};
		let (w, h) = canvas
			.parent_element()
			.map(|p| (p.client_width() as f64, p.client_height() as f64))
			.unwrap_or((800.0, 600.0));
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);
		state.update(|s| s.set_viewport(w, h));
	};

	Effect::new(move |_| {
		if canvas_ref.get().is_some() {
			fit_to_parent();
		}
	});
	let resize_handle = window_event_listener(ev::resize, move |_| fit_to_parent());
	on_cleanup(move || resize_handle.remove());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(ctx) = context_2d(&canvas) else {
			warn!("canvas has no 2d context");
			return;
		};
		state.with(|s| render::render(s, &ctx));
	});

	let on_mousedown = move |ev: MouseEvent| {
		let Some(p) = local_point(canvas_ref, ev.client_x(), ev.client_y()) else {
			return;
		};
		let measure = measurer(canvas_ref);
		let button = Button::from_dom(ev.button());
		dispatch(state, cursor, |s| s.on_pointer_down(p, button, &*measure));
	};

	let on_mousemove = move |ev: MouseEvent| {
		if let Some(p) = local_point(canvas_ref, ev.client_x(), ev.client_y()) {
			dispatch(state, cursor, |s| s.on_pointer_move(p));
		}
	};

	let on_mouseup = move |_: MouseEvent| dispatch(state, cursor, |s| s.on_pointer_up());

	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		if let Some(p) = local_point(canvas_ref, ev.client_x(), ev.client_y()) {
			let delta = ev.delta_y();
			dispatch(state, cursor, |s| s.on_wheel(p, delta));
		}
	};

	let on_dblclick = move |ev: MouseEvent| {
		if let Some(p) = local_point(canvas_ref, ev.client_x(), ev.client_y()) {
			let measure = measurer(canvas_ref);
			dispatch(state, cursor, |s| s.on_double_click(p, &*measure));
		}
	};

	let keydown_handle = window_event_listener(ev::keydown, move |ev: KeyboardEvent| {
		let key = Key::from_dom(&ev.key());
		if key == Key::Other || !handles_shortcuts(event_target_tag(&ev).as_deref()) {
			return;
		}
		ev.prevent_default();
		dispatch(state, cursor, |s| s.on_key_down(key));
	});
	on_cleanup(move || keydown_handle.remove());

	let long_press_start = long_press.clone();
	let on_touchstart = move |ev: TouchEvent| {
		ev.prevent_default();
		let points = touch_points(canvas_ref, &ev);
		let measure = measurer(canvas_ref);
		dispatch(state, cursor, |s| s.on_touch_start(&points, &*measure));
		let timer = (points.len() == 1).then(|| {
			Timeout::new(LONG_PRESS_MS, move || {
				dispatch(state, cursor, |s| s.on_long_press());
			})
		});
		*long_press_start.borrow_mut() = timer;
	};

	let on_touchmove = move |ev: TouchEvent| {
		ev.prevent_default();
		let points = touch_points(canvas_ref, &ev);
		dispatch(state, cursor, |s| s.on_touch_move(&points));
	};

	let long_press_end = long_press.clone();
	let on_touchend = move |ev: TouchEvent| {
		ev.prevent_default();
		// dropping the timeout cancels it
		long_press_end.borrow_mut().take();
		let remaining = ev.touches().length() as usize;
		dispatch(state, cursor, |s| s.on_touch_end(remaining));
	};

	let menu_item = move |label: &'static str, action: fn(&mut EditorState) -> Vec<Action>| {
		view! {
			<button
				class="context-menu-item"
				on:click=move |_| dispatch(state, cursor, action)
			>
				{label}
			</button>
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="mindmap-canvas"
			tabindex="0"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseup
			on:wheel=on_wheel
			on:dblclick=on_dblclick
			on:contextmenu=|ev: MouseEvent| ev.prevent_default()
			on:touchstart=on_touchstart
			on:touchmove=on_touchmove
			on:touchend=on_touchend
			style:cursor=move || cursor.get().as_css()
		/>
		{move || {
			state
				.with(|s| s.context_menu)
				.map(|at| {
					view! {
						<div
							class="context-menu"
							style:left=format!("{}px", at.x)
							style:top=format!("{}px", at.y)
						>
							{menu_item("Edit", EditorState::menu_edit)}
							{menu_item("Add child", EditorState::menu_add_child)}
							{menu_item("Connect", EditorState::menu_connect)}
							{menu_item("Delete", EditorState::menu_delete)}
						</div>
					}
				})
		}}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn shortcuts_skip_form_fields_only() {
		assert!(handles_shortcuts(None));
		assert!(handles_shortcuts(Some("CANVAS")));
		assert!(handles_shortcuts(Some("BUTTON")));
		assert!(handles_shortcuts(Some("BODY")));
		assert!(!handles_shortcuts(Some("INPUT")));
		assert!(!handles_shortcuts(Some("textarea")));
		assert!(!handles_shortcuts(Some("SELECT")));
	}
}
