use std::collections::HashMap;

use thiserror::Error;

use super::types::{EdgePayload, GraphPayload};

#[derive(Debug, Error, PartialEq)]
pub enum StoreError {
	#[error("graph store already initialized")]
	AlreadyInitialized,
}

/// A node in the materialized graph. Identity is the id string; `is_child`
/// records how the node first entered the graph and is only used for
/// styling and list classification.
#[derive(Clone, Debug)]
pub struct NodeRecord {
	pub id: String,
	pub is_child: bool,
}

/// A directed edge between two node ids.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeRecord {
	pub source: String,
	pub target: String,
}

#[derive(Clone, Copy, Debug)]
pub struct StoreConfig {
	/// When true, re-expanding a node does not re-insert edges it already
	/// contributed. Defaults to false: the original visualization keeps
	/// duplicate edges, and the duplication is display-only.
	pub dedupe_edges: bool,
}

impl Default for StoreConfig {
	fn default() -> Self {
		Self {
			dedupe_edges: false,
		}
	}
}

/// Canonical, strictly additive node/edge set for one mounted view.
///
/// Nodes are kept in insertion order (the search filter's tie-break relies
/// on it) with a side index for id lookups. Edges are plain id pairs; the
/// layout engine resolves them to live bodies on sync.
#[derive(Debug, Default)]
pub struct GraphStore {
	nodes: Vec<NodeRecord>,
	index: HashMap<String, usize>,
	edges: Vec<EdgeRecord>,
	config: StoreConfig,
	initialized: bool,
}

impl GraphStore {
	pub fn new(config: StoreConfig) -> Self {
		Self {
			config,
			..Self::default()
		}
	}

	/// Seed the baseline graph. All seeded nodes are parents
	/// (`is_child = false`). Errors on a second call for the same view.
	pub fn initialize(&mut self, payload: &GraphPayload) -> Result<(), StoreError> {
		if self.initialized {
			return Err(StoreError::AlreadyInitialized);
		}
		self.initialized = true;
		for id in &payload.nodes {
			self.insert_node(id, false);
		}
		for EdgePayload { source, target } in &payload.edges {
			self.insert_edge(source, target);
		}
		Ok(())
	}

	/// Merge the children of an expansion of `focus`: missing ids become
	/// child nodes, and a `focus -> id` edge is inserted for every id.
	/// Returns the ids that were newly inserted, in input order.
	pub fn merge_children(&mut self, focus: &str, children: &[String]) -> Vec<String> {
		let mut added = Vec::new();
		for id in children {
			if self.insert_node(id, true) {
				added.push(id.clone());
			}
			self.insert_edge(focus, id);
		}
		added
	}

	/// Merge the parents of an expansion of `focus`: missing ids become
	/// parent nodes, and an `id -> focus` edge is inserted for every id.
	pub fn merge_parents(&mut self, focus: &str, parents: &[String]) -> Vec<String> {
		let mut added = Vec::new();
		for id in parents {
			if self.insert_node(id, false) {
				added.push(id.clone());
			}
			self.insert_edge(id, focus);
		}
		added
	}

	pub fn nodes(&self) -> &[NodeRecord] {
		&self.nodes
	}

	pub fn edges(&self) -> &[EdgeRecord] {
		&self.edges
	}

	pub fn contains(&self, id: &str) -> bool {
		self.index.contains_key(id)
	}

	/// Parent node ids (`is_child = false`) in insertion order.
	pub fn parent_ids(&self) -> impl Iterator<Item = &str> {
		self.nodes
			.iter()
			.filter(|n| !n.is_child)
			.map(|n| n.id.as_str())
	}

	/// Returns true if the node was newly inserted. An existing node wins
	/// id collisions outright; its `is_child` flag is never rewritten.
	fn insert_node(&mut self, id: &str, is_child: bool) -> bool {
		if self.index.contains_key(id) {
			return false;
		}
		self.index.insert(id.to_owned(), self.nodes.len());
		self.nodes.push(NodeRecord {
			id: id.to_owned(),
			is_child,
		});
		true
	}

	fn insert_edge(&mut self, source: &str, target: &str) {
		if self.config.dedupe_edges
			&& self
				.edges
				.iter()
				.any(|e| e.source == source && e.target == target)
		{
			return;
		}
		self.edges.push(EdgeRecord {
			source: source.to_owned(),
			target: target.to_owned(),
		});
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn payload(nodes: &[&str], edges: &[(&str, &str)]) -> GraphPayload {
		GraphPayload {
			nodes: nodes.iter().map(|s| s.to_string()).collect(),
			edges: edges
				.iter()
				.map(|(s, t)| EdgePayload {
					source: s.to_string(),
					target: t.to_string(),
				})
				.collect(),
		}
	}

	fn ids(v: &[&str]) -> Vec<String> {
		v.iter().map(|s| s.to_string()).collect()
	}

	#[test]
	fn initialize_seeds_parents_only() {
		let mut store = GraphStore::new(StoreConfig::default());
		store
			.initialize(&payload(&["A", "B", "C"], &[("A", "B")]))
			.unwrap();

		assert_eq!(store.nodes().len(), 3);
		assert!(store.nodes().iter().all(|n| !n.is_child));
		assert_eq!(store.edges().len(), 1);
	}

	#[test]
	fn initialize_twice_fails() {
		let mut store = GraphStore::new(StoreConfig::default());
		store.initialize(&payload(&["A"], &[])).unwrap();
		assert_eq!(
			store.initialize(&payload(&["B"], &[])),
			Err(StoreError::AlreadyInitialized)
		);
		assert_eq!(store.nodes().len(), 1);
	}

	#[test]
	fn merge_children_is_id_idempotent_but_edges_accumulate() {
		let mut store = GraphStore::new(StoreConfig::default());
		store.initialize(&payload(&["F", "c1"], &[])).unwrap();

		let added = store.merge_children("F", &ids(&["c1", "c2"]));
		assert_eq!(added, ids(&["c2"]));
		// c1 pre-existed: node count +1, but both edges inserted.
		assert_eq!(store.nodes().len(), 3);
		assert_eq!(store.edges().len(), 2);
		assert!(store.edges().contains(&EdgeRecord {
			source: "F".into(),
			target: "c1".into(),
		}));
	}

	#[test]
	fn merge_never_duplicates_node_ids() {
		let mut store = GraphStore::new(StoreConfig::default());
		store.initialize(&payload(&["F"], &[])).unwrap();
		store.merge_children("F", &ids(&["x", "y"]));
		store.merge_parents("F", &ids(&["x", "z"]));
		store.merge_children("F", &ids(&["z", "y"]));

		let mut seen: Vec<&str> = store.nodes().iter().map(|n| n.id.as_str()).collect();
		seen.sort();
		seen.dedup();
		assert_eq!(seen.len(), store.nodes().len());
	}

	#[test]
	fn child_flag_is_never_downgraded() {
		let mut store = GraphStore::new(StoreConfig::default());
		store.initialize(&payload(&["F", "P"], &[])).unwrap();
		// P entered as a parent; a later child merge must not re-flag it.
		store.merge_children("F", &ids(&["P"]));
		let p = store.nodes().iter().find(|n| n.id == "P").unwrap();
		assert!(!p.is_child);
	}

	#[test]
	fn merge_parents_edge_direction_points_at_focus() {
		let mut store = GraphStore::new(StoreConfig::default());
		store.initialize(&payload(&["F"], &[])).unwrap();
		store.merge_parents("F", &ids(&["D"]));
		assert_eq!(
			store.edges(),
			&[EdgeRecord {
				source: "D".into(),
				target: "F".into(),
			}]
		);
	}

	#[test]
	fn re_expansion_duplicates_edges_by_default() {
		let mut store = GraphStore::new(StoreConfig::default());
		store.initialize(&payload(&["F"], &[])).unwrap();
		store.merge_children("F", &ids(&["c"]));
		store.merge_children("F", &ids(&["c"]));
		assert_eq!(store.edges().len(), 2);
	}

	#[test]
	fn dedupe_config_makes_re_expansion_idempotent() {
		let mut store = GraphStore::new(StoreConfig { dedupe_edges: true });
		store.initialize(&payload(&["F"], &[])).unwrap();
		store.merge_children("F", &ids(&["c"]));
		store.merge_children("F", &ids(&["c"]));
		assert_eq!(store.edges().len(), 1);
	}

	#[test]
	fn parent_ids_preserve_insertion_order() {
		let mut store = GraphStore::new(StoreConfig::default());
		store.initialize(&payload(&["Alpha", "Beta"], &[])).unwrap();
		store.merge_children("Alpha", &ids(&["kid"]));
		store.merge_parents("Alpha", &ids(&["Apple"]));

		let parents: Vec<&str> = store.parent_ids().collect();
		assert_eq!(parents, vec!["Alpha", "Beta", "Apple"]);
	}
}
