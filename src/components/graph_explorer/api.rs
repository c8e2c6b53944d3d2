use serde::de::DeserializeOwned;

use super::expansion::{ApiError, NeighborApi};
use super::types::GraphPayload;

/// `NeighborApi` over the backend's three JSON endpoints. Paths are
/// resolved against `base_url` (empty for same-origin).
#[derive(Clone)]
pub struct HttpNeighborApi {
	base_url: String,
}

impl HttpNeighborApi {
	pub fn new(base_url: &str) -> Self {
		Self {
			base_url: base_url.trim_end_matches('/').to_owned(),
		}
	}

	#[cfg(target_arch = "wasm32")]
	async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
		use wasm_bindgen::JsCast;
		use wasm_bindgen_futures::JsFuture;
		use web_sys::{Request, RequestInit, RequestMode, Response};

		let url = format!("{}{}", self.base_url, path);

		let opts = RequestInit::new();
		opts.set_method("GET");
		opts.set_mode(RequestMode::Cors);

		let request = Request::new_with_str_and_init(&url, &opts)
			.map_err(|e| ApiError::Network(format!("bad request for {url}: {e:?}")))?;

		let window = web_sys::window().ok_or_else(|| ApiError::Network("no window".into()))?;
		let resp_value = JsFuture::from(window.fetch_with_request(&request))
			.await
			.map_err(|e| ApiError::Network(format!("fetch {url}: {e:?}")))?;

		let resp: Response = resp_value
			.dyn_into()
			.map_err(|_| ApiError::Network(format!("{url}: not a Response")))?;
		if !resp.ok() {
			return Err(ApiError::Network(format!("{url}: HTTP {}", resp.status())));
		}

		let json = JsFuture::from(
			resp.json()
				.map_err(|e| ApiError::Malformed(format!("{url}: {e:?}")))?,
		)
		.await
		.map_err(|e| ApiError::Malformed(format!("{url}: {e:?}")))?;

		serde_wasm_bindgen::from_value(json)
			.map_err(|e| ApiError::Malformed(format!("{url}: {e}")))
	}

	#[cfg(not(target_arch = "wasm32"))]
	async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
		let url = format!("{}{}", self.base_url, path);

		let resp = reqwest::get(&url)
			.await
			.map_err(|e| ApiError::Network(format!("fetch {url}: {e}")))?;
		if !resp.status().is_success() {
			return Err(ApiError::Network(format!("{url}: HTTP {}", resp.status())));
		}

		resp.json::<T>()
			.await
			.map_err(|e| ApiError::Malformed(format!("{url}: {e}")))
	}
}

impl NeighborApi for HttpNeighborApi {
	async fn full_graph(&self) -> Result<GraphPayload, ApiError> {
		self.get_json("/api/graph/").await
	}

	async fn children_of(&self, id: &str) -> Result<Vec<String>, ApiError> {
		self.get_json(&format!("/api/child-nodes/{id}/")).await
	}

	async fn parents_of(&self, id: &str) -> Result<Vec<String>, ApiError> {
		self.get_json(&format!("/api/parent-connected-nodes/{id}/"))
			.await
	}
}
