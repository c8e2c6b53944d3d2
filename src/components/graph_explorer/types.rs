use serde::Deserialize;

/// Edge entry as served by `/api/graph/`.
#[derive(Clone, Debug, Deserialize)]
pub struct EdgePayload {
	pub source: String,
	pub target: String,
}

/// Full-graph payload served by `/api/graph/`; seeds the store once at mount.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct GraphPayload {
	pub nodes: Vec<String>,
	pub edges: Vec<EdgePayload>,
}
