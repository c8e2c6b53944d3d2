use leptos::prelude::*;

use crate::components::graph_explorer::GraphExplorerCanvas;

/// Main page: side panel (focus header, parent search, parent and child
/// lists) next to the interactive graph canvas.
#[component]
pub fn Home() -> impl IntoView {
	let parent_panel = RwSignal::new(Vec::<String>::new());
	let child_panel = RwSignal::new(Vec::<String>::new());
	let focused = RwSignal::new(None::<String>);
	let query = RwSignal::new(String::new());

	view! {
		<div class="explorer-layout" style="display: flex; height: 100vh;">
			<div class="side-panel" style="width: 280px; overflow-y: auto; padding: 12px;">
				<b>
					"Directly Connected Parent Nodes with: "
					<span class="selected-parent">
						{move || focused.get().unwrap_or_else(|| "!".to_string())}
					</span>
				</b>
				<hr />
				<input
					type="text"
					class="parent-search"
					placeholder="Search parent nodes..."
					prop:value=move || query.get()
					on:input=move |ev| query.set(event_target_value(&ev))
				/>
				<ul class="parent-list">
					{move || {
						parent_panel
							.get()
							.into_iter()
							.map(|id| view! { <li>{id}</li> })
							.collect_view()
					}}
				</ul>
				<hr />
				<b>"Connected Child Nodes"</b>
				<ul class="child-list">
					{move || {
						child_panel
							.get()
							.into_iter()
							.map(|id| view! { <li>{id}</li> })
							.collect_view()
					}}
				</ul>
			</div>
			<div class="graph-panel" style="flex: 1; position: relative;">
				<GraphExplorerCanvas
					base_url=""
					query=query
					parent_panel=parent_panel
					child_panel=child_panel
					focused=focused
				/>
			</div>
		</div>
	}
}
