use super::store::GraphStore;

/// Ephemeral per-interaction selection: the focused node, the raw search
/// query and the derived highlight.
#[derive(Clone, Debug, Default)]
pub struct SelectionState {
	pub focused: Option<String>,
	pub query: String,
	pub highlighted: Option<String>,
}

/// Result of applying a query change.
#[derive(Clone, Debug, PartialEq)]
pub enum SearchOutcome {
	/// Empty query: the panel keeps its last expansion result.
	Unchanged,
	/// Matching parent ids, insertion order; the first is highlighted.
	Matches(Vec<String>),
	/// Nothing matched; highlighting was cleared.
	Cleared,
}

/// Live text filter over parent (`is_child = false`) nodes.
pub struct SearchFilter;

impl SearchFilter {
	/// Apply a raw query-string change against the store's current parents
	/// and update the selection's query and highlight accordingly.
	pub fn apply(
		selection: &mut SelectionState,
		store: &GraphStore,
		raw_query: &str,
	) -> SearchOutcome {
		selection.query = raw_query.to_owned();
		let query = raw_query.trim().to_lowercase();
		if query.is_empty() {
			return SearchOutcome::Unchanged;
		}

		let matches: Vec<String> = store
			.parent_ids()
			.filter(|id| id.to_lowercase().contains(&query))
			.map(str::to_owned)
			.collect();

		match matches.first() {
			Some(first) => {
				selection.highlighted = Some(first.clone());
				SearchOutcome::Matches(matches)
			}
			None => {
				selection.highlighted = None;
				SearchOutcome::Cleared
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::graph_explorer::store::StoreConfig;
	use crate::components::graph_explorer::types::GraphPayload;

	fn store_with_parents(names: &[&str]) -> GraphStore {
		let mut store = GraphStore::new(StoreConfig::default());
		store
			.initialize(&GraphPayload {
				nodes: names.iter().map(|s| s.to_string()).collect(),
				edges: vec![],
			})
			.unwrap();
		store
	}

	#[test]
	fn case_insensitive_substring_in_insertion_order() {
		let store = store_with_parents(&["Alpha", "Beta", "Apple"]);
		let mut selection = SelectionState::default();

		let outcome = SearchFilter::apply(&mut selection, &store, "a");
		assert_eq!(
			outcome,
			SearchOutcome::Matches(vec!["Alpha".into(), "Beta".into(), "Apple".into()])
		);
		assert_eq!(selection.highlighted.as_deref(), Some("Alpha"));
	}

	#[test]
	fn query_is_matched_anywhere_in_the_id() {
		let store = store_with_parents(&["Alpha", "Beta", "Apple"]);
		let mut selection = SelectionState::default();

		let outcome = SearchFilter::apply(&mut selection, &store, "PL");
		assert_eq!(outcome, SearchOutcome::Matches(vec!["Apple".into()]));
		assert_eq!(selection.highlighted.as_deref(), Some("Apple"));
	}

	#[test]
	fn child_nodes_are_excluded() {
		let mut store = store_with_parents(&["Alpha"]);
		store.merge_children("Alpha", &["alp-child".to_string()]);
		let mut selection = SelectionState::default();

		let outcome = SearchFilter::apply(&mut selection, &store, "alp");
		assert_eq!(outcome, SearchOutcome::Matches(vec!["Alpha".into()]));
	}

	#[test]
	fn no_match_clears_highlight() {
		let store = store_with_parents(&["Alpha", "Beta"]);
		let mut selection = SelectionState {
			highlighted: Some("Alpha".into()),
			..Default::default()
		};

		let outcome = SearchFilter::apply(&mut selection, &store, "zzz");
		assert_eq!(outcome, SearchOutcome::Cleared);
		assert_eq!(selection.highlighted, None);
	}

	#[test]
	fn blank_query_is_a_no_op_on_highlight() {
		let store = store_with_parents(&["Alpha"]);
		let mut selection = SelectionState {
			highlighted: Some("Alpha".into()),
			..Default::default()
		};

		let outcome = SearchFilter::apply(&mut selection, &store, "   ");
		assert_eq!(outcome, SearchOutcome::Unchanged);
		assert_eq!(selection.highlighted.as_deref(), Some("Alpha"));
	}
}
