//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/qtree/qtree.toml`
//! 3. Local config: `<dir>/.qtree.toml` (current directory unless `-C` is given)
//! 4. Environment variables: `QTREE_*` prefix, `__` separates sections
//!
//! Command line flags are applied on top by the CLI layer.

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::{ApplicationError, SvgStyle};
use crate::domain::{BuildOptions, DegeneratePolicy};
use crate::util::path::expand_env_vars;

/// Recursion guard for degenerate inputs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GuardConfig {
    /// Nodes at this depth are never split
    pub max_depth: usize,
    /// Nodes narrower or lower than this are never split
    pub min_extent: f64,
    /// Fail instead of producing a forced leaf
    pub strict: bool,
}

impl Default for GuardConfig {
    fn default() -> Self {
        let defaults = BuildOptions::default();
        Self {
            max_depth: defaults.max_depth,
            min_extent: defaults.min_extent,
            strict: defaults.strict,
        }
    }
}

/// Random point generation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RandomConfig {
    pub count: usize,
    /// Fixed seed for reproducible point sets
    pub seed: Option<u64>,
}

impl Default for RandomConfig {
    fn default() -> Self {
        Self {
            count: 1000,
            seed: None,
        }
    }
}

/// SVG output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    pub point_radius: f64,
    pub margin: f64,
    /// Output file used when `render` is called without `-o`
    pub output: PathBuf,
}

impl Default for RenderConfig {
    fn default() -> Self {
        let style = SvgStyle::default();
        Self {
            width: style.width,
            height: style.height,
            point_radius: style.point_radius,
            margin: style.margin,
            output: PathBuf::from("quadtree.svg"),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawGuardConfig {
    pub max_depth: Option<usize>,
    pub min_extent: Option<f64>,
    pub strict: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawRandomConfig {
    pub count: Option<usize>,
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawRenderConfig {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub point_radius: Option<f64>,
    pub margin: Option<f64>,
    pub output: Option<PathBuf>,
}

/// Raw settings for intermediate parsing.
///
/// Every field is optional so a config file only overrides what it names.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub threshold: Option<usize>,
    pub parallel: Option<bool>,
    pub degenerate: Option<DegeneratePolicy>,
    pub fallback_extent: Option<f64>,
    pub guard: RawGuardConfig,
    pub random: RawRandomConfig,
    pub render: RawRenderConfig,
}

/// Unified configuration for qtree.
///
/// Scalars come before the tables so the struct serializes to valid TOML.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Maximum number of points per leaf (k)
    pub threshold: usize,
    /// Compute each tree level's splits with rayon
    pub parallel: bool,
    /// Treatment of an axis with zero extent
    pub degenerate: DegeneratePolicy,
    /// Extent used for a zero-width axis when `degenerate = "pad"`
    pub fallback_extent: f64,
    pub guard: GuardConfig,
    pub random: RandomConfig,
    pub render: RenderConfig,
}

impl Default for Settings {
    fn default() -> Self {
        let defaults = BuildOptions::default();
        Self {
            threshold: defaults.threshold,
            parallel: defaults.parallel,
            degenerate: defaults.degenerate,
            fallback_extent: defaults.fallback_extent,
            guard: GuardConfig::default(),
            random: RandomConfig::default(),
            render: RenderConfig::default(),
        }
    }
}

/// Get the XDG config directory for qtree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "qtree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("qtree.toml"))
}

/// Get the path to the local config file in `dir`.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".qtree.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Directory searched for `.qtree.toml`; `None` skips the local layer
    pub fn load(local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                debug!("global config: {}", global_path.display());
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        if let Some(dir) = local_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                debug!("local config: {}", local_path.display());
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        current = Self::apply_env_overrides(current)?;
        current.expand_paths();

        Ok(current)
    }

    /// Overlay wins where it names a value, otherwise keep self.
    pub fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            threshold: overlay.threshold.unwrap_or(self.threshold),
            parallel: overlay.parallel.unwrap_or(self.parallel),
            degenerate: overlay.degenerate.unwrap_or(self.degenerate),
            fallback_extent: overlay.fallback_extent.unwrap_or(self.fallback_extent),
            guard: GuardConfig {
                max_depth: overlay.guard.max_depth.unwrap_or(self.guard.max_depth),
                min_extent: overlay.guard.min_extent.unwrap_or(self.guard.min_extent),
                strict: overlay.guard.strict.unwrap_or(self.guard.strict),
            },
            random: RandomConfig {
                count: overlay.random.count.unwrap_or(self.random.count),
                seed: overlay.random.seed.or(self.random.seed),
            },
            render: RenderConfig {
                width: overlay.render.width.unwrap_or(self.render.width),
                height: overlay.render.height.unwrap_or(self.render.height),
                point_radius: overlay
                    .render
                    .point_radius
                    .unwrap_or(self.render.point_radius),
                margin: overlay.render.margin.unwrap_or(self.render.margin),
                output: overlay
                    .render
                    .output
                    .clone()
                    .unwrap_or_else(|| self.render.output.clone()),
            },
        }
    }

    /// Apply QTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("QTREE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(config_err)?;

        let degenerate = match env_value(config.get_string("degenerate"))? {
            Some(val) => Some(parse_policy(&val)?),
            None => None,
        };

        let raw = RawSettings {
            threshold: env_value(config.get::<usize>("threshold"))?,
            parallel: env_value(config.get_bool("parallel"))?,
            degenerate,
            fallback_extent: env_value(config.get_float("fallback_extent"))?,
            guard: RawGuardConfig {
                max_depth: env_value(config.get::<usize>("guard.max_depth"))?,
                min_extent: env_value(config.get_float("guard.min_extent"))?,
                strict: env_value(config.get_bool("guard.strict"))?,
            },
            random: RawRandomConfig {
                count: env_value(config.get::<usize>("random.count"))?,
                seed: env_value(config.get::<u64>("random.seed"))?,
            },
            render: RawRenderConfig {
                width: env_value(config.get::<u32>("render.width"))?,
                height: env_value(config.get::<u32>("render.height"))?,
                point_radius: env_value(config.get_float("render.point_radius"))?,
                margin: env_value(config.get_float("render.margin"))?,
                output: env_value(config.get_string("render.output"))?.map(PathBuf::from),
            },
        };

        Ok(settings.merge_with(&raw))
    }

    /// Expand `~`, `$VAR` and `${VAR}` in path-like fields.
    fn expand_paths(&mut self) {
        let expanded = expand_env_vars(self.render.output.to_string_lossy().as_ref());
        self.render.output = PathBuf::from(expanded);
    }

    /// Options for the tree builder derived from these settings.
    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            threshold: self.threshold,
            max_depth: self.guard.max_depth,
            min_extent: self.guard.min_extent,
            strict: self.guard.strict,
            degenerate: self.degenerate,
            fallback_extent: self.fallback_extent,
            parallel: self.parallel,
        }
    }

    pub fn svg_style(&self) -> SvgStyle {
        SvgStyle {
            width: self.render.width,
            height: self.render.height,
            point_radius: self.render.point_radius,
            margin: self.render.margin,
        }
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# qtree configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/qtree/qtree.toml
#   Local:  ./.qtree.toml (or <dir>/.qtree.toml with -C <dir>)
#   Env:    QTREE_* environment variables, e.g. QTREE_GUARD__MAX_DEPTH=20
#   Flags:  command line options win over everything

# Maximum number of points per leaf (k)
# threshold = 1

# Compute the splits of each tree level in parallel
# parallel = false

# Axis with zero extent: "pad" widens it to fallback_extent, "reject" fails
# degenerate = "pad"
# fallback_extent = 1.0

[guard]
# Nodes at this depth, or smaller than min_extent, become leaves
# max_depth is at most 128, min_extent must be positive
# max_depth = 32
# min_extent = 1e-9
# Fail instead of producing such forced leaves
# strict = false

[random]
# count = 1000
# seed = 42

[render]
# width = 1200
# height = 800
# point_radius = 3.0
# margin = 40.0
# output = "quadtree.svg"
"#
        .to_string()
    }
}

fn parse_policy(value: &str) -> Result<DegeneratePolicy, ApplicationError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "pad" => Ok(DegeneratePolicy::Pad),
        "reject" => Ok(DegeneratePolicy::Reject),
        other => Err(ApplicationError::Config {
            message: format!("degenerate must be 'pad' or 'reject', got '{other}'"),
        }),
    }
}

/// An unset variable is `None`; a value of the wrong type is an error.
fn env_value<T>(result: Result<T, ConfigError>) -> Result<Option<T>, ApplicationError> {
    match result {
        Ok(val) => Ok(Some(val)),
        Err(ConfigError::NotFound(_)) => Ok(None),
        Err(e) => Err(config_err(e)),
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
