//! I/O boundary traits for testability
//!
//! These traits abstract external I/O and randomness, allowing services
//! to be tested with mock implementations.

use std::io;
use std::path::Path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::domain::Point;

/// Filesystem abstraction for testability.
pub trait FileSystem: Send + Sync {
    /// Read file contents to string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Write string content to file.
    fn write(&self, path: &Path, content: &str) -> io::Result<()>;

    /// Check if path is a file.
    fn is_file(&self, path: &Path) -> bool;

    /// Create directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Create parent directories if needed.
    fn ensure_parent(&self, path: &Path) -> io::Result<()>;
}

/// Source of random input points.
pub trait PointGenerator: Send + Sync {
    /// `count` points uniformly distributed in the unit square `[0, 1)^2`.
    ///
    /// The same seed always yields the same points; `None` draws from OS entropy.
    fn generate(&self, count: usize, seed: Option<u64>) -> Vec<Point>;
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Real filesystem implementation.
#[derive(Debug, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        std::fs::write(path, content)
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn ensure_parent(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                self.create_dir_all(parent)?;
            }
        }
        Ok(())
    }
}

/// Uniform random points backed by `rand`'s standard generator.
#[derive(Debug, Default)]
pub struct UniformPointGenerator;

impl PointGenerator for UniformPointGenerator {
    fn generate(&self, count: usize, seed: Option<u64>) -> Vec<Point> {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        (0..count)
            .map(|_| Point::new(rng.random::<f64>(), rng.random::<f64>()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_seed_when_generating_then_reproducible_unit_square_points() {
        let generator = UniformPointGenerator;

        let a = generator.generate(100, Some(7));
        let b = generator.generate(100, Some(7));

        assert_eq!(a.len(), 100);
        assert_eq!(a, b);
        assert!(a
            .iter()
            .all(|p| (0.0..1.0).contains(&p.x) && (0.0..1.0).contains(&p.y)));
    }

    #[test]
    fn given_zero_count_when_generating_then_empty() {
        assert!(UniformPointGenerator.generate(0, None).is_empty());
    }
}
