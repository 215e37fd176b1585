use std::fmt::Write as _;

use clap::ValueEnum;
use colored::Colorize;

use crate::listing::{PathTree, TreeNode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum RenderStyle {
    /// Box-drawing connectors
    #[default]
    Tree,
    /// Two spaces per level
    Indent,
    /// One full path per leaf
    Paths,
}

/// Writes a [`PathTree`] as text. Labels of nodes with children are
/// highlighted when colour is on.
#[derive(Debug, Clone, Copy)]
pub struct TreeRenderer {
    style: RenderStyle,
    color: bool,
}

impl TreeRenderer {
    pub fn new(style: RenderStyle, color: bool) -> Self {
        Self { style, color }
    }

    /// Colour only when asked for and stdout can show it.
    pub fn color_for_stdout(no_color: bool) -> bool {
        !no_color && supports_color::on(supports_color::Stream::Stdout).is_some()
    }

    pub fn render(&self, tree: &PathTree) -> String {
        let mut out = String::new();
        match self.style {
            RenderStyle::Tree => self.render_branches(tree.root(), "", &mut out),
            RenderStyle::Indent => self.render_indented(tree.root(), 0, &mut out),
            RenderStyle::Paths => {
                for path in tree.paths() {
                    let _ = writeln!(out, "{}", path.join("/"));
                }
            }
        }
        out
    }

    fn render_branches(&self, node: &TreeNode, prefix: &str, out: &mut String) {
        let count = node.child_count();
        for (index, child) in node.children().enumerate() {
            let last = index + 1 == count;
            let connector = if last { "└── " } else { "├── " };
            let _ = writeln!(out, "{prefix}{connector}{}", self.label(child));

            let extension = if last { "    " } else { "│   " };
            self.render_branches(child, &format!("{prefix}{extension}"), out);
        }
    }

    fn render_indented(&self, node: &TreeNode, depth: usize, out: &mut String) {
        for child in node.children() {
            let _ = writeln!(out, "{}{}", "  ".repeat(depth), self.label(child));
            self.render_indented(child, depth + 1, out);
        }
    }

    fn label(&self, node: &TreeNode) -> String {
        if self.color && node.has_children() {
            node.label().blue().bold().to_string()
        } else {
            node.label().to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PathTree {
        ["Assets/Textures/a.dds", "Assets/Textures/b.dds", "Meta.lsx"]
            .into_iter()
            .collect()
    }

    #[test]
    fn tree_style_draws_connectors() {
        let rendered = TreeRenderer::new(RenderStyle::Tree, false).render(&sample());

        assert_eq!(
            rendered,
            "├── Assets\n\
             │   └── Textures\n\
             │       ├── a.dds\n\
             │       └── b.dds\n\
             └── Meta.lsx\n"
        );
    }

    #[test]
    fn indent_style_uses_two_spaces_per_level() {
        let rendered = TreeRenderer::new(RenderStyle::Indent, false).render(&sample());

        assert_eq!(
            rendered,
            "Assets\n  Textures\n    a.dds\n    b.dds\nMeta.lsx\n"
        );
    }

    #[test]
    fn paths_style_lists_leaves() {
        let rendered = TreeRenderer::new(RenderStyle::Paths, false).render(&sample());

        assert_eq!(
            rendered,
            "Assets/Textures/a.dds\nAssets/Textures/b.dds\nMeta.lsx\n"
        );
    }

    #[test]
    fn empty_tree_renders_nothing() {
        for style in [RenderStyle::Tree, RenderStyle::Indent, RenderStyle::Paths] {
            assert_eq!(TreeRenderer::new(style, false).render(&PathTree::new()), "");
        }
    }

    #[test]
    fn color_only_touches_nodes_with_children() {
        colored::control::set_override(true);
        let rendered = TreeRenderer::new(RenderStyle::Indent, true).render(&sample());

        let lines: Vec<_> = rendered.lines().collect();
        assert_ne!(lines[0], "Assets");
        assert!(lines[0].contains("Assets"));
        assert_eq!(lines[2], "    a.dds");
    }
}
