use log::debug;

use super::expansion::FetchedNeighbors;
use super::layout::{LayoutEngine, LayoutParams};
use super::render::{HIT_RADIUS, Scene, ViewTransform};
use super::search::{SearchFilter, SearchOutcome, SelectionState};
use super::store::{GraphStore, StoreConfig, StoreError};
use super::types::GraphPayload;

/// Typed interaction events emitted by the input adapter (the component's
/// raw pointer/keystroke handlers) and consumed by graph logic. Coordinates
/// are graph-space, already untransformed from the screen.
#[derive(Clone, Debug)]
pub enum InputEvent {
	/// A click on a node; starts the expansion workflow (handled by the
	/// component, which owns the async fetch).
	FocusRequested(String),
	DragStarted { id: String },
	DragMoved { id: String, x: f64, y: f64 },
	DragEnded { id: String },
	SearchChanged(String),
}

/// In-flight node drag, if any.
#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub node: Option<String>,
	pub start_x: f64,
	pub start_y: f64,
	pub moved: bool,
}

/// Background pan, if any.
#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

/// One mounted graph view: owns the store, the layout engine, the scene and
/// all selection/panel state. Created when the component mounts, dropped on
/// unmount; nothing here is ambient or shared between views.
pub struct GraphExplorer {
	pub store: GraphStore,
	pub layout: LayoutEngine,
	pub scene: Scene,
	pub selection: SelectionState,
	pub parent_panel: Vec<String>,
	pub child_panel: Vec<String>,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub width: f64,
	pub height: f64,
}

impl GraphExplorer {
	pub fn new(width: f64, height: f64) -> Self {
		Self {
			store: GraphStore::new(StoreConfig::default()),
			layout: LayoutEngine::new((width / 2.0, height / 2.0), LayoutParams::default()),
			scene: Scene::default(),
			selection: SelectionState::default(),
			parent_panel: Vec::new(),
			child_panel: Vec::new(),
			transform: ViewTransform::default(),
			drag: DragState::default(),
			pan: PanState::default(),
			width,
			height,
		}
	}

	/// Seed the view from the initial full-graph payload and start the
	/// layout converging.
	pub fn seed(&mut self, payload: &GraphPayload) -> Result<(), StoreError> {
		self.store.initialize(payload)?;
		self.layout.sync(&self.store);
		self.layout.reheat(1.0);
		self.reconcile();
		Ok(())
	}

	/// One frame: advance the simulation (if hot) and refresh the scene.
	pub fn tick(&mut self, dt: f64) {
		self.layout.step(dt);
		self.reconcile();
	}

	fn reconcile(&mut self) {
		self.scene
			.reconcile(&self.store, &self.layout, self.selection.highlighted.as_deref());
	}

	/// Merge one expansion's fetched neighbor lists: parents first, then
	/// children (order only affects edge direction), reheat unconditionally
	/// (edges may have changed even when no node is new), focus and
	/// highlight the expanded node, and replace both side panels with the
	/// freshly fetched lists.
	pub fn apply_expansion(&mut self, fetched: FetchedNeighbors) {
		let FetchedNeighbors {
			focus,
			parents,
			children,
		} = fetched;
		let new_parents = self.store.merge_parents(&focus, &parents);
		let new_children = self.store.merge_children(&focus, &children);
		debug!(
			"expanded {focus}: {} new parents, {} new children",
			new_parents.len(),
			new_children.len()
		);

		self.layout.sync(&self.store);
		self.layout.reheat(1.0);
		self.selection.focused = Some(focus.clone());
		self.selection.highlighted = Some(focus);
		self.parent_panel = parents;
		self.child_panel = children;
		self.reconcile();
	}

	/// Dispatch a typed interaction event. Returns the search outcome when
	/// the event was a query change, so the caller can mirror the panel.
	pub fn handle_event(&mut self, event: InputEvent) -> Option<SearchOutcome> {
		match event {
			// The async expansion flow lives with the component.
			InputEvent::FocusRequested(_) => None,
			InputEvent::DragStarted { id } => {
				if let Some((x, y)) = self.layout.position(&id) {
					self.layout.pin(&id, x, y);
				}
				self.layout.hold_hot();
				None
			}
			InputEvent::DragMoved { id, x, y } => {
				self.layout.pin(&id, x, y);
				self.layout.hold_hot();
				None
			}
			InputEvent::DragEnded { id } => {
				self.layout.unpin(&id);
				self.layout.cool();
				None
			}
			InputEvent::SearchChanged(query) => {
				let outcome = SearchFilter::apply(&mut self.selection, &self.store, &query);
				match &outcome {
					SearchOutcome::Unchanged => {}
					SearchOutcome::Matches(matches) => self.parent_panel = matches.clone(),
					SearchOutcome::Cleared => self.parent_panel.clear(),
				}
				self.reconcile();
				Some(outcome)
			}
		}
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	/// Topmost node under a screen position, if any.
	pub fn node_at(&self, sx: f64, sy: f64) -> Option<String> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		self.layout
			.bodies()
			.iter()
			.rev()
			.find(|body| {
				let (dx, dy) = (body.x - gx, body.y - gy);
				(dx * dx + dy * dy).sqrt() < HIT_RADIUS
			})
			.map(|body| body.id.clone())
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		self.layout.set_center(width / 2.0, height / 2.0);
	}
}
