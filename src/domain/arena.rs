use generational_arena::{Arena, Index};
use tracing::instrument;

use crate::domain::entities::Region;

/// Tree node in the arena-based quadtree.
#[derive(Debug, Clone)]
pub struct QuadNode {
    /// Rectangle covered by this node
    pub region: Region,
    /// Positions of the assigned points in the tree's point list.
    /// Only meaningful on leaves; emptied when a node is split.
    pub points: Vec<usize>,
    /// Child indices in NW, NE, SE, SW order, None for leaves
    pub children: Option<[Index; 4]>,
    /// Distance from the root (root = 0)
    pub depth: usize,
    /// Set when the degeneracy guard stopped subdivision of an over-full leaf
    pub forced: bool,
}

impl QuadNode {
    pub fn new(region: Region, points: Vec<usize>, depth: usize) -> Self {
        Self {
            region,
            points,
            children: None,
            depth,
            forced: false,
        }
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }
}

/// Arena storage for quadtree nodes.
///
/// Parents own their children through indices into the arena; there are no
/// back-edges. Nodes are only mutated while the tree is being built.
#[derive(Debug, Clone)]
pub struct QuadArena {
    arena: Arena<QuadNode>,
    root: Option<Index>,
}

impl Default for QuadArena {
    fn default() -> Self {
        Self::new()
    }
}

impl QuadArena {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            root: None,
        }
    }

    pub fn with_capacity(n: usize) -> Self {
        Self {
            arena: Arena::with_capacity(n),
            root: None,
        }
    }

    /// Insert the root node. Replaces any previous root reference.
    pub fn insert_root(&mut self, node: QuadNode) -> Index {
        let idx = self.arena.insert(node);
        self.root = Some(idx);
        idx
    }

    /// Split a leaf: store the four children and detach the leaf's points.
    ///
    /// Returns the child indices in storage order, or None if `parent` is
    /// unknown or already split.
    #[instrument(level = "trace", skip(self, children))]
    pub(crate) fn attach_children(
        &mut self,
        parent: Index,
        children: [QuadNode; 4],
    ) -> Option<[Index; 4]> {
        match self.arena.get(parent) {
            Some(node) if node.is_leaf() => {}
            _ => return None,
        }
        let indices = children.map(|child| self.arena.insert(child));
        let node = self.arena.get_mut(parent)?;
        node.children = Some(indices);
        node.points = Vec::new();
        Some(indices)
    }

    pub(crate) fn mark_forced(&mut self, idx: Index) {
        if let Some(node) = self.arena.get_mut(idx) {
            node.forced = true;
        }
    }

    pub fn get_node(&self, idx: Index) -> Option<&QuadNode> {
        self.arena.get(idx)
    }

    pub fn root(&self) -> Option<Index> {
        self.root
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Preorder traversal (parent before children, children in storage order).
    pub fn iter(&self) -> TreeIterator<'_> {
        TreeIterator::new(self)
    }

    /// Depth-first traversal yielding only leaves, in storage order.
    pub fn leaves(&self) -> LeafIterator<'_> {
        LeafIterator {
            inner: TreeIterator::new(self),
        }
    }

    /// Largest node depth in the tree (a lone root has depth 0).
    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        self.iter().map(|(_, node)| node.depth).max().unwrap_or(0)
    }
}

pub struct TreeIterator<'a> {
    arena: &'a QuadArena,
    stack: Vec<Index>,
}

impl<'a> TreeIterator<'a> {
    fn new(arena: &'a QuadArena) -> Self {
        let mut stack = Vec::new();
        if let Some(root) = arena.root() {
            stack.push(root);
        }
        Self { arena, stack }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (Index, &'a QuadNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.arena.get_node(current_idx) {
                if let Some(children) = &node.children {
                    // Push children in reverse order for NW-first traversal
                    for &child in children.iter().rev() {
                        self.stack.push(child);
                    }
                }
                return Some((current_idx, node));
            }
        }
        None
    }
}

pub struct LeafIterator<'a> {
    inner: TreeIterator<'a>,
}

impl<'a> Iterator for LeafIterator<'a> {
    type Item = (Index, &'a QuadNode);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.by_ref().find(|(_, node)| node.is_leaf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(region: Region, depth: usize) -> QuadNode {
        QuadNode::new(region, Vec::new(), depth)
    }

    #[test]
    fn given_split_root_when_iterating_then_preorder_in_storage_order() {
        let mut arena = QuadArena::new();
        let root_region = Region::new(0.0, 0.0, 2.0, 2.0);
        let root = arena.insert_root(QuadNode::new(root_region, vec![0, 1], 0));
        let children = root_region.quadrants().map(|r| leaf(r, 1));
        let idx = arena.attach_children(root, children).unwrap();

        let order: Vec<Index> = arena.iter().map(|(i, _)| i).collect();
        assert_eq!(order, vec![root, idx[0], idx[1], idx[2], idx[3]]);

        let leaves: Vec<Index> = arena.leaves().map(|(i, _)| i).collect();
        assert_eq!(leaves, idx.to_vec());
        assert_eq!(arena.depth(), 1);
        assert!(arena.get_node(root).unwrap().points.is_empty());
    }

    #[test]
    fn given_inner_node_when_attaching_again_then_rejected() {
        let mut arena = QuadArena::new();
        let region = Region::new(0.0, 0.0, 1.0, 1.0);
        let root = arena.insert_root(leaf(region, 0));
        assert!(arena
            .attach_children(root, region.quadrants().map(|r| leaf(r, 1)))
            .is_some());
        assert!(arena
            .attach_children(root, region.quadrants().map(|r| leaf(r, 1)))
            .is_none());
        assert_eq!(arena.len(), 5);
    }

    #[test]
    fn given_empty_arena_when_iterating_then_nothing() {
        let arena = QuadArena::new();
        assert_eq!(arena.iter().count(), 0);
        assert_eq!(arena.leaves().count(), 0);
        assert_eq!(arena.depth(), 0);
    }
}
