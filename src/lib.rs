//! Quadtree spatial index over 2-D point sets.
//!
//! A [`domain::QuadTree`] recursively splits the padded bounding box of a point set
//! into four quadrants until every leaf holds at most `k` points.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod tree_traits;
pub mod util;

pub use domain::{BuildOptions, Point, QuadTree, Region, TreeBuilder};
