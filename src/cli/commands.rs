//! Command dispatch: turns parsed arguments into service calls and terminal output.

use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use tracing::{debug, instrument};

use crate::application::services::QuadTreeService;
use crate::cli::args::{Cli, Commands, ConfigCommands, TreeArgs};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::QuadTree;
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::{InfraError, InfraResult};
use crate::tree_traits::TreeNodeConvert;
use crate::util::path::resolve_against;

/// How `build` presents the finished tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum View {
    Summary,
    Leaves,
    Tree,
    Stats,
}

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let base_dir = match &cli.config_dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().map_err(|e| InfraError::io("current directory", e))?,
    };

    let command = cli
        .command
        .as_ref()
        .ok_or_else(|| CliError::Usage("no command given, see `qtree --help`".into()))?;

    match command {
        Commands::Completion { shell } => {
            print_completions(*shell);
            Ok(())
        }
        Commands::Config { command } => execute_config(command, &base_dir),
        Commands::Build {
            file,
            tree,
            leaves,
            tree_view,
            stats,
        } => {
            let view = match (*leaves, *tree_view, *stats) {
                (true, _, _) => View::Leaves,
                (_, true, _) => View::Tree,
                (_, _, true) => View::Stats,
                _ => View::Summary,
            };
            let container = load_container(&base_dir)?;
            cmd_build(&container, &resolve_against(&base_dir, file), tree, view)
        }
        Commands::Random {
            count,
            seed,
            tree,
            svg,
            save,
        } => {
            let container = load_container(&base_dir)?;
            cmd_random(
                &container,
                *count,
                *seed,
                tree,
                svg.as_deref().map(|p| resolve_against(&base_dir, p)),
                save.as_deref().map(|p| resolve_against(&base_dir, p)),
            )
        }
        Commands::Render { file, output, tree } => {
            let container = load_container(&base_dir)?;
            let output = output
                .clone()
                .unwrap_or_else(|| container.settings.render.output.clone());
            cmd_render(
                &container,
                &resolve_against(&base_dir, file),
                &resolve_against(&base_dir, &output),
                tree,
            )
        }
    }
}

fn load_container(base_dir: &Path) -> CliResult<ServiceContainer> {
    let settings = Settings::load(Some(base_dir))?;
    debug!("settings: {:?}", settings);
    Ok(ServiceContainer::new(settings))
}

fn service(container: &ServiceContainer, tree: &TreeArgs) -> QuadTreeService {
    container.quadtree_service_with(tree.threshold, tree.parallel_override())
}

fn print_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}

fn warn_forced(tree: &QuadTree) {
    let forced = tree.leaves().filter(|leaf| leaf.is_forced()).count();
    if forced > 0 {
        output::warning(&format!(
            "{forced} leaves hold more than {} points (depth or extent limit reached)",
            tree.threshold()
        ));
    }
}

fn print_summary(tree: &QuadTree) {
    output::action("points", &tree.points().len());
    output::action("k", &tree.threshold());
    output::action("bounds", &tree.root_region());
    output::action("nodes", &tree.node_count());
    output::action("leaves", &tree.leaf_count());
    output::action("depth", &tree.depth());
}

#[instrument(skip(container))]
fn cmd_build(
    container: &ServiceContainer,
    file: &Path,
    tree_args: &TreeArgs,
    view: View,
) -> CliResult<()> {
    let service = service(container, tree_args);
    let tree = service.build_from_file(file)?;

    match view {
        View::Summary => print_summary(&tree),
        View::Stats => output::info(&tree.stats()),
        View::Tree => output::info(&tree.to_tree_string()),
        View::Leaves => {
            for (i, leaf) in tree.leaves().enumerate() {
                output::header(&format!("leaf {} {} ({} points)", i, leaf.region(), leaf.len()));
                for p in leaf.points() {
                    output::detail(p);
                }
            }
        }
    }
    warn_forced(&tree);
    Ok(())
}

#[instrument(skip(container))]
fn cmd_random(
    container: &ServiceContainer,
    count: Option<usize>,
    seed: Option<u64>,
    tree_args: &TreeArgs,
    svg: Option<PathBuf>,
    save: Option<PathBuf>,
) -> CliResult<()> {
    let count = count.unwrap_or(container.settings.random.count);
    let seed = seed.or(container.settings.random.seed);
    let service = service(container, tree_args);

    let points = service.random_points(count, seed)?;
    if let Some(path) = &save {
        service.save_points(&points, path)?;
        output::success(&format!("saved {} points to {}", points.len(), path.display()));
    }

    let tree = service.build(points)?;
    print_summary(&tree);
    warn_forced(&tree);

    if let Some(path) = &svg {
        service.write_svg(&tree, path)?;
        output::success(&format!("wrote {}", path.display()));
    }
    Ok(())
}

#[instrument(skip(container))]
fn cmd_render(
    container: &ServiceContainer,
    file: &Path,
    out: &Path,
    tree_args: &TreeArgs,
) -> CliResult<()> {
    let service = service(container, tree_args);
    let tree = service.build_from_file(file)?;
    service.write_svg(&tree, out)?;
    warn_forced(&tree);
    output::success(&format!(
        "wrote {} ({} leaves, {} points)",
        out.display(),
        tree.leaf_count(),
        tree.points().len()
    ));
    Ok(())
}

fn execute_config(command: &ConfigCommands, base_dir: &Path) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = Settings::load(Some(base_dir))?;
            output::info(&settings.to_toml()?);
            Ok(())
        }
        ConfigCommands::Path => {
            let exists = |p: &Path| if p.exists() { "" } else { " (not found)" };
            match global_config_path() {
                Some(p) => output::action("global", &format!("{}{}", p.display(), exists(&p))),
                None => output::action("global", &"<no config directory on this platform>"),
            }
            let local = local_config_path(base_dir);
            output::action("local", &format!("{}{}", local.display(), exists(&local)));
            Ok(())
        }
        ConfigCommands::Init { global, force } => {
            let path = if *global {
                global_config_path().ok_or_else(|| {
                    CliError::Usage("cannot determine global config directory".into())
                })?
            } else {
                local_config_path(base_dir)
            };
            if path.exists() && !*force {
                return Err(CliError::Usage(format!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                )));
            }
            write_template(&path)?;
            output::success(&format!("created {}", path.display()));
            Ok(())
        }
    }
}

fn write_template(path: &Path) -> InfraResult<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .map_err(|e| InfraError::io(format!("create {}", dir.display()), e))?;
    }
    std::fs::write(path, Settings::template())
        .map_err(|e| InfraError::io(format!("write {}", path.display()), e))
}
