//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};

/// Quadtree spatial index: subdivide a point set until every leaf holds at most k points
#[derive(Parser, Debug)]
#[command(name = "qtree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Directory holding .qtree.toml and relative input files (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub config_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Build knobs shared by every command that builds a tree.
#[derive(Args, Debug, Clone, Default)]
pub struct TreeArgs {
    /// Maximum number of points per leaf (overrides config)
    #[arg(short = 'k', long = "threshold")]
    pub threshold: Option<usize>,

    /// Compute the splits of each tree level in parallel
    #[arg(long)]
    pub parallel: bool,
}

impl TreeArgs {
    /// The parallel switch only ever turns parallelism on.
    pub fn parallel_override(&self) -> Option<bool> {
        self.parallel.then_some(true)
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build a quadtree from a point file and summarize it
    Build {
        /// Point file: one `x,y` or `x y` pair per line
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,

        #[command(flatten)]
        tree: TreeArgs,

        /// List every leaf with its region and points
        #[arg(long, conflicts_with_all = ["tree_view", "stats"])]
        leaves: bool,

        /// Print the node hierarchy
        #[arg(long = "tree", conflicts_with_all = ["leaves", "stats"])]
        tree_view: bool,

        /// Print node, leaf and depth statistics
        #[arg(long, conflicts_with_all = ["leaves", "tree_view"])]
        stats: bool,
    },

    /// Build a quadtree over uniform random points in the unit square
    Random {
        /// Number of points (overrides config)
        #[arg(short = 'n', long)]
        count: Option<usize>,

        /// Seed for reproducible points (overrides config)
        #[arg(long)]
        seed: Option<u64>,

        #[command(flatten)]
        tree: TreeArgs,

        /// Write an SVG plot of the tree
        #[arg(long, value_hint = ValueHint::FilePath)]
        svg: Option<PathBuf>,

        /// Save the generated points
        #[arg(long, value_hint = ValueHint::FilePath)]
        save: Option<PathBuf>,
    },

    /// Build a quadtree from a point file and plot it as SVG
    Render {
        /// Point file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,

        /// SVG output file (default: render.output from config)
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,

        #[command(flatten)]
        tree: TreeArgs,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective configuration
    Show,

    /// Show config file locations
    Path,

    /// Write a commented template config file
    Init {
        /// Write the global config instead of the local one
        #[arg(short, long)]
        global: bool,
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}
