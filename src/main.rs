//! `grouper` command-line front end.
//!
//! Operates on a JSON group store and, optionally, a JSON scene document
//! (a [`MemoryScene`]). Commands that need live objects (membership,
//! clustering, pivots) require `--scene`.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use grouper::cluster::{self, NamePattern, PartitionStrategy, PivotMode};
use grouper::group::{Group, GroupId};
use grouper::manager::{Change, GroupManager, ManagerSettings};
use grouper::options::GrouperOptions;
use grouper::scene::MemoryScene;
use grouper::GrouperError;

#[derive(Parser)]
#[command(name = "grouper", version, about = "Persistent scene object groups")]
struct Cli {
    /// Group store file (defaults to the configured store path).
    #[arg(long)]
    store: Option<PathBuf>,
    /// Scene document providing the live objects.
    #[arg(long)]
    scene: Option<PathBuf>,
    /// TOML options file.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List all groups.
    List,
    /// Print the group tree.
    Tree,
    /// Print store statistics as JSON.
    Stats,
    /// Create a root group.
    Create {
        /// Group name.
        name: String,
        /// Guids of scene objects to add.
        #[arg(long, num_args = 1..)]
        objects: Vec<String>,
    },
    /// Delete a group (children follow the configured delete policy).
    Delete {
        /// Group id.
        id: String,
    },
    /// Move a group under another, or to the root if no parent is given.
    Parent {
        /// Group to move.
        child: String,
        /// New parent.
        parent: Option<String>,
    },
    /// Partition every scene object and store the result as smart groups.
    Cluster {
        /// Partitioning strategy.
        #[arg(value_enum)]
        strategy: StrategyArg,
        /// Proximity link distance.
        #[arg(long)]
        threshold: Option<f32>,
        /// Grid cell size.
        #[arg(long)]
        cell: Option<f32>,
        /// Naming template for the new groups.
        #[arg(long)]
        template: Option<String>,
        /// Folder group to place the new groups under.
        #[arg(long)]
        folder: Option<String>,
    },
    /// Print the pivot of a group's live members.
    Pivot {
        /// Group id.
        id: String,
        /// Pivot mode (defaults to the configured mode).
        #[arg(long, value_enum)]
        mode: Option<ModeArg>,
    },
    /// Snap a group's live members to a grid and write the scene back.
    Snap {
        /// Group id.
        id: String,
        /// Grid size (defaults to the configured snap size).
        #[arg(long)]
        size: Option<f32>,
    },
    /// List scene objects whose name matches a pattern.
    Find {
        /// Substring, or a regular expression with `--regex`.
        pattern: String,
        /// Treat the pattern as a regular expression.
        #[arg(long)]
        regex: bool,
    },
    /// Delete groups with no members and no children.
    Cleanup,
}

#[derive(Clone, Copy, ValueEnum)]
enum StrategyArg {
    Proximity,
    Grid,
    Material,
    Tag,
    Layer,
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Average,
    GeometricCenter,
    Bottom,
    WeightedCenter,
}

impl From<ModeArg> for PivotMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Average => Self::Average,
            ModeArg::GeometricCenter => Self::GeometricCenter,
            ModeArg::Bottom => Self::Bottom,
            ModeArg::WeightedCenter => Self::WeightedCenter,
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), GrouperError> {
    let options = match &cli.config {
        Some(path) => GrouperOptions::load(path)?,
        None => GrouperOptions::default(),
    };
    let mut settings = ManagerSettings::from(&options);
    if let Some(store) = cli.store {
        settings.store_path = Some(store);
    }
    let scene = match &cli.scene {
        Some(path) => MemoryScene::load(path)?,
        None => MemoryScene::new("Global"),
    };
    let mut manager = GroupManager::new(scene, settings);

    match cli.command {
        Command::List => {
            for g in manager.groups() {
                println!("{}  {}  ({} members)", g.id, g.name, g.members.len());
            }
        }
        Command::Tree => {
            for root in manager.root_groups() {
                print_tree(&manager, root, 0);
            }
        }
        Command::Stats => {
            let stats = serde_json::to_string_pretty(&manager.statistics())
                .map_err(|e| GrouperError::StoreParse(e.to_string()))?;
            println!("{stats}");
        }
        Command::Create { name, objects } => {
            let live: Vec<_> = objects
                .iter()
                .filter_map(|guid| {
                    let found = manager.host().find(guid);
                    if found.is_none() {
                        log::warn!("object '{guid}' is not in the scene; skipped");
                    }
                    found
                })
                .collect();
            let (id, _) = manager.create_group(&name, &live)?;
            println!("{id}");
        }
        Command::Delete { id } => {
            if let Change::Deleted { removed, promoted } = manager.delete_group(&GroupId::from(id))? {
                println!(
                    "deleted {} group(s), promoted {} to root",
                    removed.len(),
                    promoted.len()
                );
            }
        }
        Command::Parent { child, parent } => {
            let parent = parent.map(GroupId::from);
            let _ = manager.set_parent(&GroupId::from(child), parent.as_ref())?;
        }
        Command::Cluster {
            strategy,
            threshold,
            cell,
            template,
            folder,
        } => {
            let clustering = &options.clustering;
            let strategy = match strategy {
                StrategyArg::Proximity => PartitionStrategy::Proximity {
                    threshold: threshold.unwrap_or(clustering.proximity_threshold),
                },
                StrategyArg::Grid => PartitionStrategy::Grid {
                    cell_size: cell.unwrap_or(clustering.grid_cell_size),
                },
                StrategyArg::Material => PartitionStrategy::Material,
                StrategyArg::Tag => PartitionStrategy::Tag,
                StrategyArg::Layer => PartitionStrategy::Layer,
            };
            let all = manager.host().ids();
            let parts = cluster::partition(manager.host(), &all, strategy);
            let (created, _) = manager.create_smart_groups(
                &parts,
                template.as_deref(),
                folder.as_deref(),
            )?;
            println!("created {} group(s)", created.len());
        }
        Command::Pivot { id, mode } => {
            let id = GroupId::from(id);
            if manager.group(&id).is_none() {
                return Err(GrouperError::UnknownGroup(id));
            }
            let mode = mode.map_or(options.clustering.pivot_mode, PivotMode::from);
            let members = manager.objects_in_group(&id);
            let p = cluster::compute_pivot(manager.host(), &members, mode);
            println!("{} {} {}", p.x, p.y, p.z);
        }
        Command::Snap { id, size } => {
            let Some(path) = &cli.scene else {
                return Err(GrouperError::SceneLoad("snap needs --scene".to_owned()));
            };
            let members = manager.objects_in_group(&GroupId::from(id));
            let size = size.unwrap_or(options.clustering.snap_size);
            let moved = cluster::snap_to_grid(manager.host_mut(), &members, size);
            std::fs::write(path, manager.host().to_json()?)?;
            println!("snapped {} object(s)", moved.len());
        }
        Command::Find { pattern, regex } => {
            let pattern = NamePattern::new(&pattern, regex || options.clustering.use_regex)?;
            let all = manager.host().ids();
            for id in cluster::filter_by_name(manager.host(), &all, &pattern) {
                if let Some(object) = manager.host().object(id) {
                    println!("{}  {}", object.guid, object.name);
                }
            }
        }
        Command::Cleanup => {
            let removed = manager
                .cleanup_empty_groups()?
                .map_or(0, |change| change.affected().len());
            println!("removed {removed} empty group(s)");
        }
    }

    let _ = manager.shutdown()?;
    Ok(())
}

fn print_tree(manager: &GroupManager<MemoryScene>, group: &Group, depth: usize) {
    let flags = format!(
        "{}{}",
        if group.visible { "" } else { " [hidden]" },
        if group.locked { " [locked]" } else { "" }
    );
    println!(
        "{:indent$}{} ({} members){flags}",
        "",
        group.name,
        group.members.len(),
        indent = depth * 2
    );
    for child in manager.children(&group.id) {
        print_tree(manager, child, depth + 1);
    }
}
