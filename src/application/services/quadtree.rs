//! Quadtree service
//!
//! Wires a point source, the tree builder and the SVG renderer together.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::application::points::{format_points, parse_points};
use crate::application::render::{render_svg, SvgStyle};
use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{BuildOptions, DomainError, Point, QuadTree, TreeBuilder};
use crate::infrastructure::traits::{FileSystem, PointGenerator};

/// Service for loading points, building quadtrees and plotting them.
pub struct QuadTreeService {
    fs: Arc<dyn FileSystem>,
    generator: Arc<dyn PointGenerator>,
    builder: TreeBuilder,
    style: SvgStyle,
}

impl QuadTreeService {
    /// Create a new quadtree service.
    pub fn new(
        fs: Arc<dyn FileSystem>,
        generator: Arc<dyn PointGenerator>,
        options: BuildOptions,
        style: SvgStyle,
    ) -> Self {
        Self {
            fs,
            generator,
            builder: TreeBuilder::new(options),
            style,
        }
    }

    pub fn options(&self) -> &BuildOptions {
        self.builder.options()
    }

    /// Read a point file (see [`parse_points`] for the format).
    #[instrument(level = "debug", skip(self))]
    pub fn load_points(&self, path: &Path) -> ApplicationResult<Vec<Point>> {
        if !self.fs.is_file(path) {
            return Err(ApplicationError::OperationFailed {
                context: format!("point file not found: {}", path.display()),
                source: Box::new(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "file does not exist",
                )),
            });
        }
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read points", path)?;
        let points = parse_points(&content)?;
        debug!("load_points: {} points from {}", points.len(), path.display());
        Ok(points)
    }

    /// Write points in the format [`load_points`](Self::load_points) reads.
    #[instrument(level = "debug", skip(self, points), fields(n = points.len()))]
    pub fn save_points(&self, points: &[Point], path: &Path) -> ApplicationResult<()> {
        self.fs
            .ensure_parent(path)
            .with_path_context("create parent directory", path)?;
        self.fs
            .write(path, &format_points(points))
            .with_path_context("write points", path)
    }

    /// Uniform random points in the unit square.
    #[instrument(level = "debug", skip(self))]
    pub fn random_points(&self, count: usize, seed: Option<u64>) -> ApplicationResult<Vec<Point>> {
        if count == 0 {
            return Err(DomainError::invalid_input("random point count must be at least 1").into());
        }
        Ok(self.generator.generate(count, seed))
    }

    #[instrument(level = "debug", skip(self, points), fields(n = points.len()))]
    pub fn build(&self, points: Vec<Point>) -> ApplicationResult<QuadTree> {
        let tree = self.builder.build(points)?;
        info!(
            "quadtree over {} points: {} leaves, depth {}",
            tree.points().len(),
            tree.leaf_count(),
            tree.depth()
        );
        Ok(tree)
    }

    pub fn build_from_file(&self, path: &Path) -> ApplicationResult<QuadTree> {
        let points = self.load_points(path)?;
        self.build(points)
    }

    pub fn render(&self, tree: &QuadTree) -> ApplicationResult<String> {
        render_svg(tree, &self.style).map_err(|e| ApplicationError::OperationFailed {
            context: "render svg".into(),
            source: Box::new(e),
        })
    }

    /// Render `tree` and write the SVG to `path`, creating parent directories.
    #[instrument(level = "debug", skip(self, tree))]
    pub fn write_svg(&self, tree: &QuadTree, path: &Path) -> ApplicationResult<()> {
        let svg = self.render(tree)?;
        self.fs
            .ensure_parent(path)
            .with_path_context("create parent directory", path)?;
        self.fs
            .write(path, &svg)
            .with_path_context("write svg", path)?;
        debug!("write_svg: {} bytes to {}", svg.len(), path.display());
        Ok(())
    }
}
