mod api;
mod component;
mod expansion;
mod explorer;
mod layout;
mod render;
mod search;
mod store;
mod types;

pub use component::GraphExplorerCanvas;
