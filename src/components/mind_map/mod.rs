mod component;
pub mod geometry;
mod render;
pub mod state;
pub mod store;
pub mod types;
pub mod view;

pub use component::MindMapCanvas;
pub use state::EditorState;
pub use types::{Connection, MindMap, Node, NodeStyle, Shape, StyleUpdate};
