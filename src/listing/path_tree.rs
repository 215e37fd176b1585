use hashlink::LinkedHashMap;

/// A single path segment in a package listing together with everything
/// listed below it.
///
/// Nodes are not typed as files or directories. A label that ends one path
/// may be an intermediate segment of another, and both refer to the same node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeNode {
    label: String,
    children: LinkedHashMap<String, TreeNode>,
}

impl TreeNode {
    fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            children: LinkedHashMap::new(),
        }
    }

    /// The segment text. Empty for the synthetic root.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Children in first-seen order.
    pub fn children(&self) -> impl Iterator<Item = &TreeNode> {
        self.children.values()
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    #[cfg(test)]
    pub fn child(&self, label: &str) -> Option<&TreeNode> {
        self.children.get(label)
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    fn child_or_insert(&mut self, label: &str) -> &mut TreeNode {
        self.children
            .entry(label.to_string())
            .or_insert_with(|| TreeNode::new(label))
    }

    fn count(&self) -> usize {
        self.children.values().map(|child| 1 + child.count()).sum()
    }

    fn collect_paths<'a>(&'a self, prefix: &mut Vec<&'a str>, out: &mut Vec<Vec<String>>) {
        for child in self.children.values() {
            prefix.push(child.label());
            if child.has_children() {
                child.collect_paths(prefix, out);
            } else {
                out.push(prefix.iter().map(|s| s.to_string()).collect());
            }
            prefix.pop();
        }
    }
}

/// Tree of archive-relative paths, built incrementally from the lines the
/// external tool prints.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathTree {
    root: TreeNode,
}

impl PathTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts one line of listing output.
    ///
    /// Both `/` and `\` separate segments. Empty segments are skipped, so
    /// blank lines and bare separators leave the tree untouched.
    pub fn insert(&mut self, path: &str) {
        let line = path.trim();
        if line.is_empty() {
            return;
        }

        let normalized = line.replace('\\', "/");
        let mut current = &mut self.root;
        for segment in normalized.split('/').filter(|s| !s.is_empty()) {
            current = current.child_or_insert(segment);
        }
    }

    pub fn root(&self) -> &TreeNode {
        &self.root
    }

    pub fn is_empty(&self) -> bool {
        !self.root.has_children()
    }

    /// Number of nodes, not counting the root.
    pub fn node_count(&self) -> usize {
        self.root.count()
    }

    /// Every root-to-leaf label sequence, depth first in insertion order.
    pub fn paths(&self) -> Vec<Vec<String>> {
        let mut out = Vec::new();
        self.root.collect_paths(&mut Vec::new(), &mut out);
        out
    }
}

impl<S: AsRef<str>> FromIterator<S> for PathTree {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut tree = PathTree::new();
        tree.extend(iter);
        tree
    }
}

impl<S: AsRef<str>> Extend<S> for PathTree {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for line in iter {
            self.insert(line.as_ref());
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use rstest::*;

    use super::*;

    fn labels(node: &TreeNode) -> Vec<&str> {
        node.children().map(TreeNode::label).collect()
    }

    #[test]
    fn shared_prefixes_collapse_onto_one_ancestor() {
        let tree: PathTree = ["a/b/c", "a/b/d"].into_iter().collect();

        assert_eq!(labels(tree.root()), vec!["a"]);
        let a = tree.root().child("a").unwrap();
        assert_eq!(labels(a), vec!["b"]);
        let b = a.child("b").unwrap();
        assert_eq!(labels(b), vec!["c", "d"]);
    }

    #[test]
    fn inserting_the_same_path_twice_changes_nothing() {
        let mut tree = PathTree::new();
        tree.insert("Public/Shared/meta.lsx");
        let snapshot = tree.clone();

        tree.insert("Public/Shared/meta.lsx");

        assert_eq!(tree, snapshot);
        assert_eq!(tree.node_count(), 3);
    }

    #[test]
    fn backslashes_and_slashes_build_identical_trees() {
        let mut mixed = PathTree::new();
        mixed.insert("a\\b/c");
        let mut forward = PathTree::new();
        forward.insert("a/b/c");

        assert_eq!(mixed, forward);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("/")]
    #[case("///")]
    #[case("\\\\")]
    #[case("\t\r")]
    fn blank_or_separator_only_lines_create_no_nodes(#[case] line: &str) {
        let mut tree = PathTree::new();
        tree.insert(line);

        assert!(tree.is_empty());
        assert_eq!(tree.node_count(), 0);
    }

    #[test]
    fn siblings_keep_first_seen_order() {
        let tree: PathTree = ["x/1", "y/2", "x/3"].into_iter().collect();

        assert_eq!(labels(tree.root()), vec!["x", "y"]);
        assert_eq!(labels(tree.root().child("x").unwrap()), vec!["1", "3"]);
        assert_eq!(labels(tree.root().child("y").unwrap()), vec!["2"]);
    }

    #[rstest]
    #[case("/a/b", &["a", "b"])]
    #[case("a//b/", &["a", "b"])]
    #[case("\\a\\\\b\\", &["a", "b"])]
    #[case("  a/b  ", &["a", "b"])]
    #[case("a/with space/b", &["a", "with space", "b"])]
    fn empty_segments_are_skipped(#[case] line: &str, #[case] expected: &[&str]) {
        let mut tree = PathTree::new();
        tree.insert(line);

        assert_eq!(tree.paths(), vec![expected.to_vec()]);
    }

    #[test]
    fn labels_match_case_sensitively() {
        let tree: PathTree = ["Assets/a", "assets/a"].into_iter().collect();

        assert_eq!(labels(tree.root()), vec!["Assets", "assets"]);
    }

    #[test]
    fn terminal_segment_can_later_become_an_ancestor() {
        let tree: PathTree = ["Mods/Gustav", "Mods/Gustav/meta.lsx"].into_iter().collect();

        let gustav = tree.root().child("Mods").unwrap().child("Gustav").unwrap();
        assert_eq!(labels(gustav), vec!["meta.lsx"]);
        assert_eq!(tree.node_count(), 3);
    }

    #[test]
    fn leaf_paths_equal_the_deduplicated_inputs() {
        let inputs = [
            "Localization/English/english.loca",
            "Localization\\German\\german.loca",
            "Public/Game/GUI/icons.dds",
            "Localization/English/english.loca",
            "Public/Game/Stats/Armor.txt",
        ];
        let tree: PathTree = inputs.into_iter().collect();

        let expected: BTreeSet<Vec<String>> = inputs
            .iter()
            .map(|line| {
                line.replace('\\', "/")
                    .split('/')
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect()
            })
            .collect();
        let actual: BTreeSet<Vec<String>> = tree.paths().into_iter().collect();

        assert_eq!(actual, expected);
    }

    #[test]
    fn listing_output_becomes_nested_tree() {
        let output = "Assets/Textures/a.dds\nAssets/Textures/b.dds\nMeta.lsx\n";
        let tree: PathTree = output.lines().collect();

        assert_eq!(labels(tree.root()), vec!["Assets", "Meta.lsx"]);
        let textures = tree
            .root()
            .child("Assets")
            .and_then(|assets| assets.child("Textures"))
            .unwrap();
        assert_eq!(labels(textures), vec!["a.dds", "b.dds"]);
        assert!(!tree.root().child("Meta.lsx").unwrap().has_children());
    }
}
