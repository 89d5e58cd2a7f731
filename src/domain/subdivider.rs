//! Split decision for a single quadtree node.

use tracing::{debug, instrument};

use crate::domain::entities::{Point, Region};
use crate::domain::error::{DomainError, TreeResult};

/// Outcome of inspecting one node.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// At most `k` points: the node stays a leaf.
    Leaf,
    /// Over-full, but the degeneracy guard stopped further splitting.
    Forced,
    /// Quadrant regions with their point subsets, in NW, NE, SE, SW order.
    Split([(Region, Vec<usize>); 4]),
}

/// Decides whether a node is split, and how its points are distributed.
///
/// Each quadrant filters the parent's full point set with the inclusive
/// containment test, so a point on an internal split line lands in every
/// quadrant touching it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Subdivider {
    pub threshold: usize,
    pub max_depth: usize,
    pub min_extent: f64,
    pub strict: bool,
}

impl Subdivider {
    #[instrument(level = "trace", skip(self, members, points), fields(n = members.len()))]
    pub fn decide(
        &self,
        region: &Region,
        members: &[usize],
        depth: usize,
        points: &[Point],
    ) -> TreeResult<Decision> {
        if members.len() <= self.threshold {
            return Ok(Decision::Leaf);
        }

        if depth >= self.max_depth
            || region.width < self.min_extent
            || region.height < self.min_extent
            || !region.can_split()
        {
            if self.strict {
                return Err(DomainError::RecursionLimitExceeded {
                    depth,
                    points: members.len(),
                });
            }
            debug!(
                "guard: forcing leaf at depth {} with {} points in {}",
                depth,
                members.len(),
                region
            );
            return Ok(Decision::Forced);
        }

        let parts = region.quadrants().map(|quad| {
            let subset: Vec<usize> = members
                .iter()
                .copied()
                .filter(|&i| points.get(i).is_some_and(|p| quad.contains(p)))
                .collect();
            (quad, subset)
        });
        Ok(Decision::Split(parts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subdivider(threshold: usize) -> Subdivider {
        Subdivider {
            threshold,
            max_depth: 8,
            min_extent: 1e-9,
            strict: false,
        }
    }

    #[test]
    fn given_points_within_threshold_when_deciding_then_leaf() {
        let points = vec![Point::new(0.5, 0.5), Point::new(0.2, 0.7)];
        let region = Region::new(0.0, 0.0, 1.0, 1.0);

        let decision = subdivider(2).decide(&region, &[0, 1], 0, &points).unwrap();

        assert_eq!(decision, Decision::Leaf);
    }

    #[test]
    fn given_point_on_center_when_splitting_then_assigned_to_all_quadrants() {
        let points = vec![Point::new(1.0, 1.0), Point::new(0.5, 0.5)];
        let region = Region::new(0.0, 0.0, 2.0, 2.0);

        let decision = subdivider(1).decide(&region, &[0, 1], 0, &points).unwrap();

        let Decision::Split(parts) = decision else {
            panic!("expected split, got {decision:?}");
        };
        for (_, subset) in &parts {
            assert!(subset.contains(&0));
        }
        // SW holds both points
        assert_eq!(parts[3].1, vec![0, 1]);
        assert_eq!(parts[0].1, vec![0]);
    }

    #[test]
    fn given_max_depth_when_deciding_then_forced_leaf() {
        let points = vec![Point::new(0.0, 0.0); 3];
        let region = Region::new(-1.0, -1.0, 2.0, 2.0);

        let decision = subdivider(1).decide(&region, &[0, 1, 2], 8, &points).unwrap();

        assert_eq!(decision, Decision::Forced);
    }

    #[test]
    fn given_tiny_region_when_deciding_then_forced_leaf() {
        let points = vec![Point::new(0.0, 0.0); 2];
        let region = Region::new(0.0, 0.0, 1e-12, 1.0);

        let decision = subdivider(1).decide(&region, &[0, 1], 0, &points).unwrap();

        assert_eq!(decision, Decision::Forced);
    }

    #[test]
    fn given_region_at_float_resolution_when_deciding_then_forced_leaf() {
        // 1e-4 is wider than min_extent but below the spacing of f64 near 1e12
        let points = vec![Point::new(1e12, 1e12); 2];
        let region = Region::new(1e12, 1e12, 1e-4, 1e-4);

        let decision = subdivider(1).decide(&region, &[0, 1], 0, &points).unwrap();

        assert_eq!(decision, Decision::Forced);
    }

    #[test]
    fn given_strict_guard_when_limit_reached_then_errors() {
        let points = vec![Point::new(0.0, 0.0); 2];
        let region = Region::new(-1.0, -1.0, 2.0, 2.0);
        let strict = Subdivider {
            strict: true,
            ..subdivider(1)
        };

        let result = strict.decide(&region, &[0, 1], 8, &points);

        assert_eq!(
            result,
            Err(DomainError::RecursionLimitExceeded {
                depth: 8,
                points: 2
            })
        );
    }
}
