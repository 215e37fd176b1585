//! Turning the external tool's line-oriented output into a tree.
//!
//! The tool prints one archive-relative path per line. Lines are read from the
//! buffered output stream and folded into a [`PathTree`], where repeated
//! directory prefixes share a single node.

mod line_reader;
mod path_tree;
mod session;

pub use line_reader::LineReader;
pub use path_tree::{PathTree, TreeNode};
pub use session::{ListingError, ListingReport, ListingRequest, ListingSession};
