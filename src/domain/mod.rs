//! Domain layer: quadtree model and construction
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod builder;
pub mod entities;
pub mod error;
pub mod subdivider;
pub mod tree;

pub use arena::{QuadArena, QuadNode};
pub use builder::{bounding_region, BuildOptions, DegeneratePolicy, TreeBuilder, MAX_DEPTH_LIMIT};
pub use entities::{Axis, Point, Quadrant, Region};
pub use error::{DomainError, TreeResult};
pub use subdivider::{Decision, Subdivider};
pub use tree::{LeafView, Leaves, QuadTree, TreeStats};
