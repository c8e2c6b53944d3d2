use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::{error, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::api::HttpNeighborApi;
use super::expansion::{ExpansionController, NeighborApi};
use super::explorer::{GraphExplorer, InputEvent};
use super::render;
use super::search::SearchOutcome;

/// Pointer travel below this many screen pixels counts as a click, not a
/// drag.
const CLICK_SLOP: f64 = 3.0;

type SharedExplorer = Rc<RefCell<Option<GraphExplorer>>>;
type SharedController = Rc<ExpansionController<HttpNeighborApi>>;

/// Interactive graph canvas: renders the live graph, expands a node's
/// neighbors on click, and mirrors the focus/panel state into the supplied
/// signals for the surrounding page.
#[component]
pub fn GraphExplorerCanvas(
	#[prop(into)] base_url: String,
	#[prop(into)] query: Signal<String>,
	parent_panel: RwSignal<Vec<String>>,
	child_panel: RwSignal<Vec<String>>,
	focused: RwSignal<Option<String>>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let explorer: SharedExplorer = Rc::new(RefCell::new(None));
	let controller: SharedController =
		Rc::new(ExpansionController::new(HttpNeighborApi::new(&base_url)));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let (explorer_init, controller_init, animate_init, resize_cb_init) = (
		explorer.clone(),
		controller.clone(),
		animate.clone(),
		resize_cb.clone(),
	);

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let window: Window = web_sys::window().unwrap();

		let (w, h) = (
			canvas
				.parent_element()
				.map(|p| p.client_width() as f64)
				.unwrap_or(800.0),
			canvas
				.parent_element()
				.map(|p| p.client_height() as f64)
				.unwrap_or(600.0),
		);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let ctx: CanvasRenderingContext2d = canvas
			.get_context("2d")
			.unwrap()
			.unwrap()
			.dyn_into()
			.unwrap();
		*explorer_init.borrow_mut() = Some(GraphExplorer::new(w, h));

		// Bootstrap: seed the store from the backend's full graph.
		let (explorer_boot, controller_boot) = (explorer_init.clone(), controller_init.clone());
		spawn_local(async move {
			match controller_boot.api().full_graph().await {
				Ok(payload) => {
					if let Some(ref mut ex) = *explorer_boot.borrow_mut() {
						if let Err(err) = ex.seed(&payload) {
							error!("seeding graph view failed: {err}");
						}
					}
				}
				Err(err) => error!("initial graph fetch failed: {err}"),
			}
		});

		let (explorer_resize, canvas_resize) = (explorer_init.clone(), canvas.clone());
		*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
			let Some(parent) = canvas_resize.parent_element() else {
				return;
			};
			let (nw, nh) = (parent.client_width() as f64, parent.client_height() as f64);
			canvas_resize.set_width(nw as u32);
			canvas_resize.set_height(nh as u32);
			if let Some(ref mut ex) = *explorer_resize.borrow_mut() {
				ex.resize(nw, nh);
			}
		}));
		if let Some(ref cb) = *resize_cb_init.borrow() {
			let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}

		let (explorer_anim, animate_inner) = (explorer_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if let Some(ref mut ex) = *explorer_anim.borrow_mut() {
				ex.tick(0.016);
				render::paint(&ex.scene, &ctx, ex.width, ex.height, &ex.transform);
			}
			if let Some(ref cb) = *animate_inner.borrow() {
				let _ = web_sys::window()
					.unwrap()
					.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	// Mirror search keystrokes into the filter.
	let explorer_search = explorer.clone();
	Effect::new(move |_| {
		let raw = query.get();
		if let Some(ref mut ex) = *explorer_search.borrow_mut() {
			match ex.handle_event(InputEvent::SearchChanged(raw)) {
				Some(SearchOutcome::Unchanged) | None => {}
				Some(SearchOutcome::Matches(_)) | Some(SearchOutcome::Cleared) => {
					parent_panel.set(ex.parent_panel.clone());
				}
			}
		}
	});

	let explorer_md = explorer.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let canvas: HtmlCanvasElement = canvas_ref.get().unwrap().into();
		let rect = canvas.get_bounding_client_rect();
		let (x, y) = (
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		);

		if let Some(ref mut ex) = *explorer_md.borrow_mut() {
			if let Some(id) = ex.node_at(x, y) {
				ex.drag.node = Some(id);
				ex.drag.start_x = x;
				ex.drag.start_y = y;
				ex.drag.moved = false;
			} else {
				ex.pan.active = true;
				ex.pan.start_x = x;
				ex.pan.start_y = y;
				ex.pan.transform_start_x = ex.transform.x;
				ex.pan.transform_start_y = ex.transform.y;
			}
		}
	};

	let explorer_mm = explorer.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let canvas: HtmlCanvasElement = canvas_ref.get().unwrap().into();
		let rect = canvas.get_bounding_client_rect();
		let (x, y) = (
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		);

		if let Some(ref mut ex) = *explorer_mm.borrow_mut() {
			if let Some(id) = ex.drag.node.clone() {
				let (dx, dy) = (x - ex.drag.start_x, y - ex.drag.start_y);
				if !ex.drag.moved && (dx * dx + dy * dy).sqrt() < CLICK_SLOP {
					return;
				}
				if !ex.drag.moved {
					ex.drag.moved = true;
					ex.handle_event(InputEvent::DragStarted { id: id.clone() });
				}
				let (gx, gy) = ex.screen_to_graph(x, y);
				ex.handle_event(InputEvent::DragMoved { id, x: gx, y: gy });
			} else if ex.pan.active {
				ex.transform.x = ex.pan.transform_start_x + (x - ex.pan.start_x);
				ex.transform.y = ex.pan.transform_start_y + (y - ex.pan.start_y);
			}
		}
	};

	let (explorer_mu, controller_mu) = (explorer.clone(), controller.clone());
	let on_mouseup = move |_: MouseEvent| {
		let request = {
			let mut borrow = explorer_mu.borrow_mut();
			let Some(ref mut ex) = *borrow else {
				return;
			};
			let request = match ex.drag.node.take() {
				Some(id) if ex.drag.moved => {
					ex.handle_event(InputEvent::DragEnded { id });
					None
				}
				Some(id) => Some(id),
				None => None,
			};
			ex.pan.active = false;
			request
		};

		if let Some(id) = request {
			expand(
				id,
				explorer_mu.clone(),
				controller_mu.clone(),
				parent_panel,
				child_panel,
				focused,
			);
		}
	};

	let explorer_ml = explorer.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut ex) = *explorer_ml.borrow_mut() {
			if let Some(id) = ex.drag.node.take() {
				if ex.drag.moved {
					ex.handle_event(InputEvent::DragEnded { id });
				}
			}
			ex.pan.active = false;
		}
	};

	let explorer_wh = explorer.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let canvas: HtmlCanvasElement = canvas_ref.get().unwrap().into();
		let rect = canvas.get_bounding_client_rect();
		let (x, y) = (
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		);

		if let Some(ref mut ex) = *explorer_wh.borrow_mut() {
			let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
			let new_k = (ex.transform.k * factor).clamp(0.1, 10.0);
			let ratio = new_k / ex.transform.k;
			ex.transform.x = x - (x - ex.transform.x) * ratio;
			ex.transform.y = y - (y - ex.transform.y) * ratio;
			ex.transform.k = new_k;
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="graph-explorer-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
	}
}

/// Run one click-to-expand workflow for `id`. The two fetches are
/// sequential; the merge and panel refresh happen only after both succeed.
/// Rapid re-clicks are not serialized: a later click's result may land
/// after an earlier one's.
fn expand(
	id: String,
	explorer: SharedExplorer,
	controller: SharedController,
	parent_panel: RwSignal<Vec<String>>,
	child_panel: RwSignal<Vec<String>>,
	focused: RwSignal<Option<String>>,
) {
	spawn_local(async move {
		match controller.fetch_neighbors(&id).await {
			Ok(fetched) => {
				if let Some(ref mut ex) = *explorer.borrow_mut() {
					ex.apply_expansion(fetched);
					parent_panel.set(ex.parent_panel.clone());
					child_panel.set(ex.child_panel.clone());
					focused.set(ex.selection.focused.clone());
				}
				controller.finish();
			}
			Err(err) => warn!("expansion of {id} failed: {err}"),
		}
	});
}
