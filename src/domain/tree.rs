//! Built quadtree: root holder, leaf enumeration and statistics.

use std::fmt;

use generational_arena::Index;

use crate::domain::arena::{LeafIterator, QuadArena, QuadNode, TreeIterator};
use crate::domain::builder::{BuildOptions, TreeBuilder};
use crate::domain::entities::{Point, Quadrant, Region};
use crate::domain::error::TreeResult;

/// Immutable quadtree over a point set.
///
/// Owns the node arena and the original input points. Nodes refer to points by
/// their position in [`QuadTree::points`].
#[derive(Debug, Clone)]
pub struct QuadTree {
    arena: QuadArena,
    root_region: Region,
    points: Vec<Point>,
    threshold: usize,
}

impl QuadTree {
    /// Build a tree with threshold `k` and default guard settings.
    ///
    /// # Errors
    /// * `InvalidInput` for an empty point sequence, `k == 0` or non-finite coordinates
    ///
    /// Axes on which all points coincide are padded, see
    /// [`DegeneratePolicy`](crate::domain::DegeneratePolicy).
    pub fn build<I, P>(points: I, k: usize) -> TreeResult<Self>
    where
        I: IntoIterator<Item = P>,
        P: Into<Point>,
    {
        Self::build_with(points, &BuildOptions::with_threshold(k))
    }

    pub fn build_with<I, P>(points: I, options: &BuildOptions) -> TreeResult<Self>
    where
        I: IntoIterator<Item = P>,
        P: Into<Point>,
    {
        TreeBuilder::new(options.clone()).build(points.into_iter().map(Into::into).collect())
    }

    pub(crate) fn from_parts(
        arena: QuadArena,
        root_region: Region,
        points: Vec<Point>,
        threshold: usize,
    ) -> Self {
        Self {
            arena,
            root_region,
            points,
            threshold,
        }
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// The input points, in input order.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn root_region(&self) -> Region {
        self.root_region
    }

    pub fn root(&self) -> Option<Index> {
        self.arena.root()
    }

    pub fn get_node(&self, idx: Index) -> Option<&QuadNode> {
        self.arena.get_node(idx)
    }

    pub fn arena(&self) -> &QuadArena {
        &self.arena
    }

    /// All nodes in preorder.
    pub fn nodes(&self) -> TreeIterator<'_> {
        self.arena.iter()
    }

    /// Leaves in depth-first order, children visited NW, NE, SE, SW.
    ///
    /// Each call starts a fresh traversal.
    pub fn leaves(&self) -> Leaves<'_> {
        Leaves {
            inner: self.arena.leaves(),
            points: &self.points,
        }
    }

    /// Children of a node in storage order, None for leaves.
    pub fn children(&self, node: &QuadNode) -> Option<[&QuadNode; 4]> {
        let [a, b, c, d] = node.children?;
        Some([
            self.arena.get_node(a)?,
            self.arena.get_node(b)?,
            self.arena.get_node(c)?,
            self.arena.get_node(d)?,
        ])
    }

    /// Child of `node` covering `quadrant`, None for leaves.
    pub fn child(&self, node: &QuadNode, quadrant: Quadrant) -> Option<&QuadNode> {
        let children = node.children?;
        self.arena.get_node(children[quadrant.slot()])
    }

    /// Largest node depth; a tree that never split has depth 0.
    pub fn depth(&self) -> usize {
        self.arena.depth()
    }

    pub fn node_count(&self) -> usize {
        self.arena.len()
    }

    pub fn leaf_count(&self) -> usize {
        self.arena.leaves().count()
    }

    pub fn stats(&self) -> TreeStats {
        let mut stats = TreeStats {
            points: self.points.len(),
            ..TreeStats::default()
        };
        for (_, node) in self.arena.iter() {
            stats.node_count += 1;
            stats.max_depth = stats.max_depth.max(node.depth);
            if node.is_leaf() {
                stats.leaf_count += 1;
                stats.point_refs += node.points.len();
                stats.max_leaf_points = stats.max_leaf_points.max(node.points.len());
                if node.points.is_empty() {
                    stats.empty_leaf_count += 1;
                }
                if node.forced {
                    stats.forced_leaf_count += 1;
                }
            }
        }
        stats
    }
}

/// Read-only view of one leaf.
#[derive(Debug, Clone, Copy)]
pub struct LeafView<'a> {
    node: &'a QuadNode,
    points: &'a [Point],
}

impl<'a> LeafView<'a> {
    pub fn region(&self) -> Region {
        self.node.region
    }

    pub fn depth(&self) -> usize {
        self.node.depth
    }

    /// True if the degeneracy guard stopped the split of this leaf.
    pub fn is_forced(&self) -> bool {
        self.node.forced
    }

    pub fn len(&self) -> usize {
        self.node.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node.points.is_empty()
    }

    /// Positions of this leaf's points in the tree's point list.
    pub fn point_indices(&self) -> &'a [usize] {
        &self.node.points
    }

    pub fn points(&self) -> impl Iterator<Item = &'a Point> + 'a {
        let node: &'a QuadNode = self.node;
        let all = self.points;
        node.points.iter().filter_map(move |&i| all.get(i))
    }
}

pub struct Leaves<'a> {
    inner: LeafIterator<'a>,
    points: &'a [Point],
}

impl<'a> Iterator for Leaves<'a> {
    type Item = LeafView<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, node)| LeafView {
            node,
            points: self.points,
        })
    }
}

/// Shape summary of a built tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeStats {
    /// Number of input points
    pub points: usize,
    pub node_count: usize,
    pub leaf_count: usize,
    pub empty_leaf_count: usize,
    /// Leaves left over-full by the degeneracy guard
    pub forced_leaf_count: usize,
    pub max_depth: usize,
    pub max_leaf_points: usize,
    /// Sum of leaf point counts; exceeds `points` when points sit on split lines
    pub point_refs: usize,
}

impl fmt::Display for TreeStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "points:        {}", self.points)?;
        writeln!(f, "nodes:         {}", self.node_count)?;
        writeln!(f, "leaves:        {}", self.leaf_count)?;
        writeln!(f, "empty leaves:  {}", self.empty_leaf_count)?;
        writeln!(f, "forced leaves: {}", self.forced_leaf_count)?;
        writeln!(f, "max depth:     {}", self.max_depth)?;
        writeln!(f, "max per leaf:  {}", self.max_leaf_points)?;
        write!(f, "point refs:    {}", self.point_refs)
    }
}
