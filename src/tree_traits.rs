//! Text rendering of a built quadtree as an indented tree.

use termtree::Tree;
use tracing::instrument;

use crate::domain::{QuadNode, QuadTree, Quadrant};

pub trait TreeNodeConvert {
    fn to_tree_string(&self) -> Tree<String>;
}

fn label(prefix: &str, node: &QuadNode) -> String {
    if !node.is_leaf() {
        return format!("{} {}", prefix, node.region);
    }
    let mut text = format!("{} {} ({} points)", prefix, node.region, node.points.len());
    if node.forced {
        text.push_str(" [forced]");
    }
    text
}

impl TreeNodeConvert for QuadTree {
    #[instrument(level = "debug", skip(self))]
    fn to_tree_string(&self) -> Tree<String> {
        fn build_tree(tree: &QuadTree, node: &QuadNode, parent_tree: &mut Tree<String>) {
            if let Some(children) = tree.children(node) {
                for (quadrant, child) in Quadrant::ALL.iter().zip(children) {
                    let mut child_tree = Tree::new(label(&quadrant.to_string(), child));
                    build_tree(tree, child, &mut child_tree);
                    parent_tree.push(child_tree);
                }
            }
        }

        match self.root().and_then(|idx| self.get_node(idx)) {
            Some(root) => {
                let mut out = Tree::new(label("root", root));
                build_tree(self, root, &mut out);
                out
            }
            None => Tree::new("Empty tree".to_string()),
        }
    }
}
