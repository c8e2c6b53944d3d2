use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::layout::LayoutEngine;
use super::store::GraphStore;

pub const NODE_RADIUS: f64 = 8.0;
pub const HIT_RADIUS: f64 = 14.0;

const BASE_COLOR: &str = "#1f77b4";
const CHILD_COLOR: &str = "#ff7f0e";
const HIGHLIGHT_COLOR: &str = "#d62728";

/// Style bucket for a node sprite. At most one sprite in a scene is
/// `Highlighted` at a time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NodeStyle {
	Base,
	Child,
	Highlighted,
}

#[derive(Clone, Debug)]
pub struct NodeSprite {
	pub id: String,
	pub x: f64,
	pub y: f64,
	pub style: NodeStyle,
}

/// A line for one directed edge. `line` is absent while an endpoint has no
/// body yet (edges to never-materialized ids are tolerated, not drawn).
#[derive(Clone, Debug)]
pub struct EdgeSprite {
	pub source: String,
	pub target: String,
	pub line: Option<((f64, f64), (f64, f64))>,
}

/// Retained visual state, reconciled against the store and layout on every
/// structural change and every simulation step: sprites are created for new
/// entities, pruned for entities no longer present, and have their
/// positions and styles refreshed in place.
#[derive(Debug, Default)]
pub struct Scene {
	pub nodes: Vec<NodeSprite>,
	pub edges: Vec<EdgeSprite>,
}

impl Scene {
	pub fn reconcile(
		&mut self,
		store: &GraphStore,
		layout: &LayoutEngine,
		highlighted: Option<&str>,
	) {
		let records = store.nodes();
		self.nodes.truncate(records.len());
		for (i, record) in records.iter().enumerate() {
			let (x, y) = layout.position(&record.id).unwrap_or((0.0, 0.0));
			let style = if highlighted == Some(record.id.as_str()) {
				NodeStyle::Highlighted
			} else if record.is_child {
				NodeStyle::Child
			} else {
				NodeStyle::Base
			};
			match self.nodes.get_mut(i) {
				Some(sprite) => {
					if sprite.id != record.id {
						sprite.id = record.id.clone();
					}
					sprite.x = x;
					sprite.y = y;
					sprite.style = style;
				}
				None => self.nodes.push(NodeSprite {
					id: record.id.clone(),
					x,
					y,
					style,
				}),
			}
		}

		let edges = store.edges();
		self.edges.truncate(edges.len());
		for (i, edge) in edges.iter().enumerate() {
			let line = layout
				.position(&edge.source)
				.zip(layout.position(&edge.target));
			match self.edges.get_mut(i) {
				Some(sprite) => {
					if sprite.source != edge.source || sprite.target != edge.target {
						sprite.source = edge.source.clone();
						sprite.target = edge.target.clone();
					}
					sprite.line = line;
				}
				None => self.edges.push(EdgeSprite {
					source: edge.source.clone(),
					target: edge.target.clone(),
					line,
				}),
			}
		}
	}
}

/// Pan/zoom transform applied to the whole scene before painting.
#[derive(Clone, Debug)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			k: 1.0,
		}
	}
}

pub fn paint(
	scene: &Scene,
	ctx: &CanvasRenderingContext2d,
	width: f64,
	height: f64,
	transform: &ViewTransform,
) {
	ctx.set_fill_style_str("#1a1a2e");
	ctx.fill_rect(0.0, 0.0, width, height);
	ctx.save();
	let _ = ctx.translate(transform.x, transform.y);
	let _ = ctx.scale(transform.k, transform.k);
	draw_edges(scene, ctx, transform.k);
	draw_nodes(scene, ctx, transform.k);
	ctx.restore();
}

fn draw_edges(scene: &Scene, ctx: &CanvasRenderingContext2d, k: f64) {
	let (line_width, arrow_size) = (1.5 / k, 8.0 / k);
	ctx.set_stroke_style_str("rgba(100, 180, 255, 0.6)");
	ctx.set_line_width(line_width);

	for sprite in &scene.edges {
		let Some(((x1, y1), (x2, y2))) = sprite.line else {
			continue;
		};
		let (dx, dy) = (x2 - x1, y2 - y1);
		let dist = (dx * dx + dy * dy).sqrt();
		if dist < 0.001 {
			continue;
		}
		let (ux, uy) = (dx / dist, dy / dist);

		ctx.begin_path();
		ctx.move_to(x1 + ux * NODE_RADIUS, y1 + uy * NODE_RADIUS);
		ctx.line_to(
			x2 - ux * (NODE_RADIUS + arrow_size),
			y2 - uy * (NODE_RADIUS + arrow_size),
		);
		ctx.stroke();

		// Arrowhead at the target end; edges are directed source -> target.
		ctx.set_fill_style_str("rgba(100, 180, 255, 0.8)");
		let (tip_x, tip_y) = (x2 - ux * NODE_RADIUS, y2 - uy * NODE_RADIUS);
		let (back_x, back_y) = (tip_x - ux * arrow_size, tip_y - uy * arrow_size);
		let (px, py) = (-uy * arrow_size * 0.5, ux * arrow_size * 0.5);
		ctx.begin_path();
		ctx.move_to(tip_x, tip_y);
		ctx.line_to(back_x + px, back_y + py);
		ctx.line_to(back_x - px, back_y - py);
		ctx.close_path();
		ctx.fill();
	}
}

fn draw_nodes(scene: &Scene, ctx: &CanvasRenderingContext2d, k: f64) {
	for sprite in &scene.nodes {
		let (x, y) = (sprite.x, sprite.y);
		let (color, radius) = match sprite.style {
			NodeStyle::Base => (BASE_COLOR, NODE_RADIUS),
			NodeStyle::Child => (CHILD_COLOR, NODE_RADIUS),
			NodeStyle::Highlighted => (HIGHLIGHT_COLOR, NODE_RADIUS * 1.4),
		};

		ctx.begin_path();
		let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(color);
		ctx.fill();

		if sprite.style == NodeStyle::Highlighted {
			ctx.begin_path();
			let _ = ctx.arc(x, y, radius + 3.0 / k, 0.0, 2.0 * PI);
			ctx.set_stroke_style_str("rgba(255, 255, 255, 0.9)");
			ctx.set_line_width(1.5 / k);
			ctx.stroke();
		}

		// The id doubles as the display label.
		ctx.set_fill_style_str("rgba(255, 255, 255, 0.8)");
		ctx.set_font(&format!("{}px sans-serif", 10.0 / k.max(0.5)));
		let _ = ctx.fill_text(&sprite.id, x + radius + 3.0, y + 3.0);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::graph_explorer::layout::LayoutParams;
	use crate::components::graph_explorer::store::StoreConfig;
	use crate::components::graph_explorer::types::{EdgePayload, GraphPayload};

	fn world(nodes: &[&str], edges: &[(&str, &str)]) -> (GraphStore, LayoutEngine) {
		let mut store = GraphStore::new(StoreConfig::default());
		store
			.initialize(&GraphPayload {
				nodes: nodes.iter().map(|s| s.to_string()).collect(),
				edges: edges
					.iter()
					.map(|(s, t)| EdgePayload {
						source: s.to_string(),
						target: t.to_string(),
					})
					.collect(),
			})
			.unwrap();
		let mut layout = LayoutEngine::new((400.0, 300.0), LayoutParams::default());
		layout.sync(&store);
		(store, layout)
	}

	#[test]
	fn reconcile_creates_a_sprite_per_entity() {
		let (store, layout) = world(&["A", "B"], &[("A", "B")]);
		let mut scene = Scene::default();
		scene.reconcile(&store, &layout, None);

		assert_eq!(scene.nodes.len(), 2);
		assert_eq!(scene.edges.len(), 1);
		assert!(scene.edges[0].line.is_some());
	}

	#[test]
	fn reconcile_tracks_positions_across_steps() {
		let (store, mut layout) = world(&["A", "B"], &[("A", "B")]);
		let mut scene = Scene::default();
		scene.reconcile(&store, &layout, None);
		let before = (scene.nodes[0].x, scene.nodes[0].y);

		layout.reheat(1.0);
		layout.step(0.016);
		scene.reconcile(&store, &layout, None);
		let after = (scene.nodes[0].x, scene.nodes[0].y);

		assert_eq!(scene.nodes.len(), 2);
		assert_ne!(before, after);
	}

	#[test]
	fn highlight_is_exclusive() {
		let (mut store, mut layout) = world(&["A", "B"], &[("A", "B")]);
		store.merge_children("A", &["C".to_string()]);
		layout.sync(&store);

		let mut scene = Scene::default();
		scene.reconcile(&store, &layout, Some("A"));
		let highlighted: Vec<&str> = scene
			.nodes
			.iter()
			.filter(|s| s.style == NodeStyle::Highlighted)
			.map(|s| s.id.as_str())
			.collect();
		assert_eq!(highlighted, vec!["A"]);

		scene.reconcile(&store, &layout, None);
		assert!(scene.nodes.iter().all(|s| s.style != NodeStyle::Highlighted));
	}

	#[test]
	fn child_nodes_get_the_child_style() {
		let (mut store, mut layout) = world(&["A"], &[]);
		store.merge_children("A", &["kid".to_string()]);
		layout.sync(&store);

		let mut scene = Scene::default();
		scene.reconcile(&store, &layout, None);
		let kid = scene.nodes.iter().find(|s| s.id == "kid").unwrap();
		assert_eq!(kid.style, NodeStyle::Child);
		let a = scene.nodes.iter().find(|s| s.id == "A").unwrap();
		assert_eq!(a.style, NodeStyle::Base);
	}

	#[test]
	fn stale_sprites_are_pruned() {
		let (big_store, big_layout) = world(&["A", "B", "C"], &[]);
		let mut scene = Scene::default();
		scene.reconcile(&big_store, &big_layout, None);
		assert_eq!(scene.nodes.len(), 3);

		// The store is additive in practice, but reconcile stays general.
		let (small_store, small_layout) = world(&["A"], &[]);
		scene.reconcile(&small_store, &small_layout, None);
		assert_eq!(scene.nodes.len(), 1);
	}

	#[test]
	fn edge_to_unmaterialized_id_has_no_line() {
		let (mut store, mut layout) = world(&["A"], &[]);
		store.merge_parents("ghost", &["A".to_string()]);
		layout.sync(&store);

		let mut scene = Scene::default();
		scene.reconcile(&store, &layout, None);
		assert_eq!(scene.edges.len(), 1);
		assert!(scene.edges[0].line.is_none());
	}
}
