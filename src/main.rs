//! categorier CLI: keep a taxonomy of named nodes in a YAML file.

use anyhow::Context;
use categorier::config::{default_config_path, CategorierConfig};
use categorier::format::{format_listing, format_node};
use categorier_core::ErrorKind;
use categorier_graph::{Combine, Criterion, FlatMode, GraphManager, ValueSelector};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "categorier", version = env!("CARGO_PKG_VERSION"), about = "Personal knowledge taxonomy: nodes, categories and their attributes")]
struct Cli {
    /// Config file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Data file (YAML), overrides the configured path
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Default)]
struct Flatten {
    /// Connect to the root ancestors of the given parents instead
    #[arg(long, conflicts_with = "all_flat")]
    flat: bool,

    /// Connect to the given parents and every one of their ancestors
    #[arg(long)]
    all_flat: bool,
}

impl Flatten {
    fn mode(&self, default: FlatMode) -> FlatMode {
        match (self.flat, self.all_flat) {
            (true, _) => FlatMode::Flat,
            (_, true) => FlatMode::AllFlat,
            _ => default,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Create a node
    Add {
        name: String,
        #[arg(short, long = "parent", num_args = 1..)]
        parents: Vec<String>,
        #[arg(short, long = "child", num_args = 1..)]
        children: Vec<String>,
        #[command(flatten)]
        flatten: Flatten,
        /// Descriptions to attach
        #[arg(short, long = "description", num_args = 1..)]
        descriptions: Vec<String>,
    },
    /// Create several nodes under the same parents, skipping existing ones
    AddMany {
        #[arg(required = true)]
        names: Vec<String>,
        #[arg(short, long = "parent", num_args = 1..)]
        parents: Vec<String>,
    },
    /// Connect an existing node to parents and/or children
    Link {
        name: String,
        #[arg(short, long = "parent", num_args = 1..)]
        parents: Vec<String>,
        #[arg(short, long = "child", num_args = 1..)]
        children: Vec<String>,
        #[command(flatten)]
        flatten: Flatten,
    },
    /// Remove edges of an existing node
    Unlink {
        name: String,
        #[arg(short, long = "parent", num_args = 1..)]
        parents: Vec<String>,
        #[arg(short, long = "child", num_args = 1..)]
        children: Vec<String>,
    },
    /// Delete a node and every edge touching it
    Delete { name: String },
    /// Cut ancestors out of a node's ancestry, reconnecting to what lay above them
    DeleteJust {
        name: String,
        #[arg(required = true)]
        cut: Vec<String>,
    },
    /// Set an attribute: one value is stored as-is, several as a list
    Set {
        name: String,
        key: String,
        values: Vec<String>,
        /// Append to the existing list instead of replacing
        #[arg(long)]
        append: bool,
    },
    /// Remove an attribute, or selected values (text or 1-based position)
    Unset {
        name: String,
        key: String,
        selectors: Vec<String>,
    },
    /// Replace one value (text or 1-based position) of an attribute
    Change {
        name: String,
        key: String,
        selector: String,
        value: String,
    },
    /// Rename a node
    Rename { old: String, new: String },
    /// Rename an attribute key
    RenameKey { name: String, old: String, new: String },
    /// Add descriptions, or remove them by 1-based position
    Describe {
        name: String,
        texts: Vec<String>,
        #[arg(short, long, num_args = 1..)]
        remove: Vec<usize>,
    },
    /// Show one node, or list every node
    Show { name: Option<String> },
    /// Find nodes by name prefix and attribute values
    Search {
        /// Name prefix
        #[arg(long)]
        name: Option<String>,
        /// key=prefix
        #[arg(long = "attr", value_parser = parse_attr)]
        attrs: Vec<Criterion>,
        /// Nodes without this attribute
        #[arg(long)]
        missing: Vec<String>,
        /// Match any criterion instead of all
        #[arg(long)]
        any: bool,
    },
    /// Print the effective configuration as TOML
    Config,
}

fn parse_attr(s: &str) -> Result<Criterion, String> {
    let (key, prefix) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=prefix, got '{}'", s))?;
    Ok(Criterion::attribute(key, prefix))
}

fn strs(values: &[String]) -> Vec<&str> {
    values.iter().map(String::as_str).collect()
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = cli
        .config
        .clone()
        .or_else(default_config_path)
        .map(|path| CategorierConfig::load(&path))
        .unwrap_or_default();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter.as_str().into()),
        )
        .init();

    let data_path = cli.data.clone().unwrap_or_else(|| config.data_path.clone());
    let mut graph = GraphManager::open(&data_path)
        .with_context(|| format!("loading {}", data_path.display()))?;

    let mutated = run(&mut graph, cli.command, &config)?;
    if mutated {
        graph
            .save()
            .with_context(|| format!("saving {}", data_path.display()))?;
    }
    Ok(())
}

/// Execute one command. Returns whether the graph needs saving.
fn run(graph: &mut GraphManager, command: Command, config: &CategorierConfig) -> anyhow::Result<bool> {
    match command {
        Command::Add { name, parents, children, flatten, descriptions } => {
            let mode = flatten.mode(config.flat_mode);
            graph.create_with(&name, &strs(&parents), &strs(&children), mode)?;
            if !descriptions.is_empty() {
                graph.add_descriptions(&name, &strs(&descriptions))?;
            }
        }
        Command::AddMany { names, parents } => {
            let parents = strs(&parents);
            for name in &names {
                match graph.create(name, &parents, &[]) {
                    Ok(_) => {}
                    Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                        tracing::warn!("{}, skipped", e);
                    }
                    Err(e) => return Err(e.into()),
                }
            }
        }
        Command::Link { name, parents, children, flatten } => {
            if parents.is_empty() && children.is_empty() {
                anyhow::bail!("nothing to link: pass --parent or --child");
            }
            graph.add_parents_with(&name, &strs(&parents), flatten.mode(config.flat_mode))?;
            graph.add_children(&name, &strs(&children))?;
        }
        Command::Unlink { name, parents, children } => {
            graph.remove_parents(&name, &strs(&parents))?;
            graph.remove_children(&name, &strs(&children))?;
        }
        Command::Delete { name } => graph.delete(&name)?,
        Command::DeleteJust { name, cut } => graph.delete_with_reconnect(&name, &strs(&cut))?,
        Command::Set { name, key, values, append } => {
            if append {
                graph.add_values(&name, &key, &strs(&values))?;
            } else {
                graph.set_attribute(&name, &key, &strs(&values))?;
            }
        }
        Command::Unset { name, key, selectors } => {
            let selectors: Vec<ValueSelector> =
                selectors.iter().map(|s| ValueSelector::parse(s)).collect();
            graph.unset_attribute(&name, &key, &selectors)?;
        }
        Command::Change { name, key, selector, value } => {
            graph.change_value(&name, &key, &ValueSelector::parse(&selector), &value)?;
        }
        Command::Rename { old, new } => graph.rename(&old, &new)?,
        Command::RenameKey { name, old, new } => graph.rename_attribute(&name, &old, &new)?,
        Command::Describe { name, texts, remove } => {
            if !remove.is_empty() {
                graph.remove_descriptions(&name, &remove)?;
            }
            if !texts.is_empty() {
                graph.add_descriptions(&name, &strs(&texts))?;
            }
        }
        Command::Show { name } => {
            match name {
                Some(name) => print!("{}", format_node(graph, &name)?),
                None => print!("{}", format_listing(&graph.all_names().collect::<Vec<_>>())),
            }
            return Ok(false);
        }
        Command::Search { name, attrs, missing, any } => {
            let mut criteria: Vec<Criterion> = name.into_iter().map(Criterion::name_prefix).collect();
            criteria.extend(attrs);
            criteria.extend(missing.into_iter().map(Criterion::missing));
            let combine = if any { Combine::Any } else { Combine::All };
            print!("{}", format_listing(&graph.search(&criteria, combine)));
            return Ok(false);
        }
        Command::Config => {
            print!("{}", config.to_toml());
            return Ok(false);
        }
    }
    Ok(true)
}
