mod tree_renderer;

pub use tree_renderer::{RenderStyle, TreeRenderer};
