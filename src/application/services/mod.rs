//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (FileSystem, PointGenerator)
//! but are themselves concrete structs, not traits.

mod quadtree;

pub use quadtree::QuadTreeService;
