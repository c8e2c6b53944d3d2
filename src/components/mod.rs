pub mod graph_explorer;
