use std::cell::Cell;

use thiserror::Error;

use super::types::GraphPayload;

/// Failures scoped to one expansion attempt. Nothing here is fatal: the
/// graph stays usable and the user may simply click again.
#[derive(Debug, Error)]
pub enum ApiError {
	#[error("network failure: {0}")]
	Network(String),
	#[error("malformed response: {0}")]
	Malformed(String),
}

/// Resolves a node id to its neighbor id lists. The production
/// implementation is HTTP (`api::HttpNeighborApi`); tests substitute stubs.
pub trait NeighborApi {
	async fn full_graph(&self) -> Result<GraphPayload, ApiError>;
	async fn children_of(&self, id: &str) -> Result<Vec<String>, ApiError>;
	async fn parents_of(&self, id: &str) -> Result<Vec<String>, ApiError>;
}

/// Where a given expansion currently is. Kept in a `Cell` so the phase is
/// observable without holding a borrow across the awaits; rapid re-clicks
/// are deliberately not serialized (last writer wins).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum ExpansionPhase {
	#[default]
	Idle,
	FetchingChildren,
	FetchingParents,
	Merging,
}

/// Neighbor lists fetched for one focus click, ready to merge.
#[derive(Clone, Debug)]
pub struct FetchedNeighbors {
	pub focus: String,
	pub parents: Vec<String>,
	pub children: Vec<String>,
}

/// Orchestrates the click-to-expand workflow: two strictly sequential
/// fetches (children, then parents), aborting on the first failure with
/// the graph untouched. The merge itself is applied by the caller
/// (`GraphExplorer::apply_expansion`) once both lists are in hand.
pub struct ExpansionController<A> {
	api: A,
	phase: Cell<ExpansionPhase>,
}

impl<A: NeighborApi> ExpansionController<A> {
	pub fn new(api: A) -> Self {
		Self {
			api,
			phase: Cell::new(ExpansionPhase::Idle),
		}
	}

	pub fn phase(&self) -> ExpansionPhase {
		self.phase.get()
	}

	pub fn api(&self) -> &A {
		&self.api
	}

	/// Fetch both neighbor lists for `focus`. On any failure the phase
	/// returns to `Idle` and the error is surfaced to the caller, which
	/// logs it and leaves the store and layout alone.
	pub async fn fetch_neighbors(&self, focus: &str) -> Result<FetchedNeighbors, ApiError> {
		self.phase.set(ExpansionPhase::FetchingChildren);
		let children = match self.api.children_of(focus).await {
			Ok(children) => children,
			Err(err) => {
				self.phase.set(ExpansionPhase::Idle);
				return Err(err);
			}
		};

		self.phase.set(ExpansionPhase::FetchingParents);
		let parents = match self.api.parents_of(focus).await {
			Ok(parents) => parents,
			Err(err) => {
				self.phase.set(ExpansionPhase::Idle);
				return Err(err);
			}
		};

		self.phase.set(ExpansionPhase::Merging);
		Ok(FetchedNeighbors {
			focus: focus.to_owned(),
			parents,
			children,
		})
	}

	/// Mark the merge as applied; the workflow is back at rest.
	pub fn finish(&self) {
		self.phase.set(ExpansionPhase::Idle);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	struct StubApi {
		children: Result<Vec<String>, ()>,
		parents: Result<Vec<String>, ()>,
	}

	impl NeighborApi for StubApi {
		async fn full_graph(&self) -> Result<GraphPayload, ApiError> {
			Ok(GraphPayload::default())
		}

		async fn children_of(&self, _id: &str) -> Result<Vec<String>, ApiError> {
			self.children
				.clone()
				.map_err(|_| ApiError::Network("child fetch refused".into()))
		}

		async fn parents_of(&self, _id: &str) -> Result<Vec<String>, ApiError> {
			self.parents
				.clone()
				.map_err(|_| ApiError::Network("parent fetch refused".into()))
		}
	}

	#[test]
	fn successful_expansion_fetches_children_then_parents() {
		let controller = ExpansionController::new(StubApi {
			children: Ok(vec!["C".into()]),
			parents: Ok(vec!["D".into()]),
		});

		let fetched = pollster::block_on(controller.fetch_neighbors("A")).unwrap();
		assert_eq!(fetched.focus, "A");
		assert_eq!(fetched.children, vec!["C".to_string()]);
		assert_eq!(fetched.parents, vec!["D".to_string()]);
		assert_eq!(controller.phase(), ExpansionPhase::Merging);

		controller.finish();
		assert_eq!(controller.phase(), ExpansionPhase::Idle);
	}

	#[test]
	fn failed_child_fetch_aborts_before_the_parent_fetch() {
		let controller = ExpansionController::new(StubApi {
			children: Err(()),
			parents: Ok(vec!["should never be fetched".into()]),
		});

		let err = pollster::block_on(controller.fetch_neighbors("X")).unwrap_err();
		assert!(matches!(err, ApiError::Network(_)));
		assert_eq!(controller.phase(), ExpansionPhase::Idle);
	}

	#[test]
	fn failed_parent_fetch_resets_the_phase() {
		let controller = ExpansionController::new(StubApi {
			children: Ok(vec!["C".into()]),
			parents: Err(()),
		});

		let err = pollster::block_on(controller.fetch_neighbors("X")).unwrap_err();
		assert!(matches!(err, ApiError::Network(_)));
		assert_eq!(controller.phase(), ExpansionPhase::Idle);
	}
}
