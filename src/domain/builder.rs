//! Tree builder: bounding region computation and the subdivision pass.

use generational_arena::Index;
use itertools::{Itertools, MinMaxResult};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::domain::arena::{QuadArena, QuadNode};
use crate::domain::entities::{Axis, Point, Region};
use crate::domain::error::{DomainError, TreeResult};
use crate::domain::subdivider::{Decision, Subdivider};
use crate::domain::tree::QuadTree;

/// Relative margin added around the point cloud on each axis.
pub const PADDING: f64 = 0.1;

/// Largest accepted `max_depth`.
pub const MAX_DEPTH_LIMIT: usize = 128;

/// How to treat an axis on which every point has the same coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DegeneratePolicy {
    /// Widen the axis to the fallback extent, centered on the shared coordinate.
    #[default]
    Pad,
    /// Fail with `DomainError::DegenerateGeometry`.
    Reject,
}

/// Knobs for a single build.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildOptions {
    /// Maximum number of points a leaf may hold (k)
    pub threshold: usize,
    /// Nodes at this depth are never split; at most [`MAX_DEPTH_LIMIT`]
    pub max_depth: usize,
    /// Nodes narrower or lower than this are never split
    pub min_extent: f64,
    /// Fail instead of forcing a leaf when the guard fires
    pub strict: bool,
    pub degenerate: DegeneratePolicy,
    /// Extent substituted for a zero-width axis under `DegeneratePolicy::Pad`
    pub fallback_extent: f64,
    /// Compute quadrant splits of each tree level with rayon
    pub parallel: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            threshold: 1,
            max_depth: 32,
            min_extent: 1e-9,
            strict: false,
            degenerate: DegeneratePolicy::Pad,
            fallback_extent: 1.0,
            parallel: false,
        }
    }
}

impl BuildOptions {
    pub fn with_threshold(threshold: usize) -> Self {
        Self {
            threshold,
            ..Self::default()
        }
    }

    fn validate(&self) -> TreeResult<()> {
        if self.threshold < 1 {
            return Err(DomainError::invalid_input("threshold k must be at least 1"));
        }
        if self.max_depth > MAX_DEPTH_LIMIT {
            return Err(DomainError::invalid_input(format!(
                "max_depth must be at most {MAX_DEPTH_LIMIT}, got {}",
                self.max_depth
            )));
        }
        if !self.min_extent.is_finite() || self.min_extent <= 0.0 {
            return Err(DomainError::invalid_input(format!(
                "min_extent must be a finite positive number, got {}",
                self.min_extent
            )));
        }
        if !self.fallback_extent.is_finite() || self.fallback_extent <= 0.0 {
            return Err(DomainError::invalid_input(format!(
                "fallback_extent must be a finite positive number, got {}",
                self.fallback_extent
            )));
        }
        Ok(())
    }

    fn subdivider(&self) -> Subdivider {
        Subdivider {
            threshold: self.threshold,
            max_depth: self.max_depth,
            min_extent: self.min_extent,
            strict: self.strict,
        }
    }
}

/// Constructs quadtrees from point sets.
#[derive(Debug, Clone, Default)]
pub struct TreeBuilder {
    options: BuildOptions,
}

impl TreeBuilder {
    pub fn new(options: BuildOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    /// Build a tree whose root is the padded bounding box of `points`.
    #[instrument(level = "debug", skip(self, points), fields(n = points.len(), k = self.options.threshold))]
    pub fn build(&self, points: Vec<Point>) -> TreeResult<QuadTree> {
        self.options.validate()?;
        validate_points(&points)?;
        let region = bounding_region(
            &points,
            self.options.degenerate,
            self.options.fallback_extent,
        )?;
        debug!("root region: {}", region);
        self.subdivide_from(region, points)
    }

    /// Build a tree over a caller-supplied root region.
    ///
    /// Every point must lie inside `region`.
    #[instrument(level = "debug", skip(self, points), fields(n = points.len(), k = self.options.threshold))]
    pub fn build_in(&self, region: Region, points: Vec<Point>) -> TreeResult<QuadTree> {
        self.options.validate()?;
        validate_points(&points)?;
        let finite = region.x0.is_finite()
            && region.y0.is_finite()
            && region.width.is_finite()
            && region.height.is_finite();
        if !finite || region.width < 0.0 || region.height < 0.0 {
            return Err(DomainError::invalid_input(format!(
                "root region must be finite with non-negative extents, got {region}"
            )));
        }
        if let Some((i, p)) = points.iter().enumerate().find(|(_, p)| !region.contains(p)) {
            return Err(DomainError::invalid_input(format!(
                "point {i} {p} lies outside the root region {region}"
            )));
        }
        self.subdivide_from(region, points)
    }

    fn subdivide_from(&self, region: Region, points: Vec<Point>) -> TreeResult<QuadTree> {
        let mut arena = QuadArena::with_capacity(points.len().saturating_mul(2).max(1));
        let root = arena.insert_root(QuadNode::new(region, (0..points.len()).collect(), 0));

        if self.options.parallel {
            self.subdivide_parallel(&mut arena, root, &points)?;
        } else {
            self.subdivide_sequential(&mut arena, root, &points)?;
        }

        let tree = QuadTree::from_parts(arena, region, points, self.options.threshold);
        info!(
            "built quadtree: {} nodes, {} leaves, depth {}",
            tree.node_count(),
            tree.leaf_count(),
            tree.depth()
        );
        Ok(tree)
    }

    /// Depth-first with an explicit stack; children are visited NW first.
    fn subdivide_sequential(
        &self,
        arena: &mut QuadArena,
        root: Index,
        points: &[Point],
    ) -> TreeResult<()> {
        let subdivider = self.options.subdivider();
        let mut stack = vec![root];

        while let Some(idx) = stack.pop() {
            let Some(node) = arena.get_node(idx) else {
                continue;
            };
            let depth = node.depth;
            let decision = subdivider.decide(&node.region, &node.points, depth, points)?;
            if let Some(children) = apply(arena, idx, depth, decision) {
                for &child in children.iter().rev() {
                    stack.push(child);
                }
            }
        }
        Ok(())
    }

    /// Level by level: decisions for the whole frontier are computed in
    /// parallel, then applied in frontier order.
    fn subdivide_parallel(
        &self,
        arena: &mut QuadArena,
        root: Index,
        points: &[Point],
    ) -> TreeResult<()> {
        let subdivider = self.options.subdivider();
        let mut frontier = vec![root];

        while !frontier.is_empty() {
            let shared: &QuadArena = arena;
            let decisions = frontier
                .par_iter()
                .filter_map(|&idx| shared.get_node(idx).map(|node| (idx, node)))
                .map(|(idx, node)| {
                    subdivider
                        .decide(&node.region, &node.points, node.depth, points)
                        .map(|decision| (idx, node.depth, decision))
                })
                .collect::<TreeResult<Vec<_>>>()?;

            let mut next = Vec::with_capacity(decisions.len() * 4);
            for (idx, depth, decision) in decisions {
                if let Some(children) = apply(arena, idx, depth, decision) {
                    next.extend_from_slice(&children);
                }
            }
            frontier = next;
        }
        Ok(())
    }
}

fn apply(arena: &mut QuadArena, idx: Index, depth: usize, decision: Decision) -> Option<[Index; 4]> {
    match decision {
        Decision::Leaf => None,
        Decision::Forced => {
            arena.mark_forced(idx);
            None
        }
        Decision::Split(parts) => arena.attach_children(
            idx,
            parts.map(|(region, members)| QuadNode::new(region, members, depth + 1)),
        ),
    }
}

fn validate_points(points: &[Point]) -> TreeResult<()> {
    if points.is_empty() {
        return Err(DomainError::invalid_input("point sequence is empty"));
    }
    if let Some((i, p)) = points.iter().enumerate().find(|(_, p)| !p.is_finite()) {
        return Err(DomainError::invalid_input(format!(
            "point {i} has a non-finite coordinate: {p}"
        )));
    }
    Ok(())
}

/// Padded bounding region of a point set.
///
/// With `dx = xmax - xmin` the region starts at `xmin - 0.1 * dx` and is
/// `(xmax - x0) * 1.1` wide, so points on the maximum edge stay strictly
/// inside; the y axis is treated the same way.
pub fn bounding_region(
    points: &[Point],
    policy: DegeneratePolicy,
    fallback_extent: f64,
) -> TreeResult<Region> {
    let (xmin, xmax) = axis_bounds(points.iter().map(|p| p.x), Axis::X, policy, fallback_extent)?;
    let (ymin, ymax) = axis_bounds(points.iter().map(|p| p.y), Axis::Y, policy, fallback_extent)?;

    let x0 = xmin - PADDING * (xmax - xmin);
    let y0 = ymin - PADDING * (ymax - ymin);
    let width = (xmax - x0) * (1.0 + PADDING);
    let height = (ymax - y0) * (1.0 + PADDING);

    Ok(Region::new(x0, y0, width, height))
}

fn axis_bounds(
    values: impl Iterator<Item = f64>,
    axis: Axis,
    policy: DegeneratePolicy,
    fallback_extent: f64,
) -> TreeResult<(f64, f64)> {
    let (min, max) = match values.minmax() {
        MinMaxResult::NoElements => {
            return Err(DomainError::invalid_input("point sequence is empty"))
        }
        MinMaxResult::OneElement(v) => (v, v),
        MinMaxResult::MinMax(min, max) => (min, max),
    };
    if max > min {
        return Ok((min, max));
    }
    match policy {
        DegeneratePolicy::Reject => Err(DomainError::DegenerateGeometry { axis }),
        DegeneratePolicy::Pad => {
            debug!("zero extent on {} axis, padding to {}", axis, fallback_extent);
            Ok((min - fallback_extent / 2.0, max + fallback_extent / 2.0))
        }
    }
}
