//! Command dispatch and the file I/O collaborators around the core tree.
//!
//! The core never touches the filesystem; reading source files and writing
//! serialized trees happens here.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use clap::CommandFactory;
use clap_complete::generate;
use itertools::Itertools;
use regex::Regex;
use tracing::{debug, instrument};

use crate::arena::SourceTree;
use crate::builder::TreeBuilder;
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{self, Settings};
use crate::display::ToTreeString;
use crate::errors::TreeError;
use crate::transform::Transformer;
use crate::util::path::ensure_file_exists;

pub fn execute_command(cli: Cli) -> CliResult<()> {
    match cli.command {
        Some(Commands::Tree { file, lines }) => tree(&file, lines),
        Some(Commands::Cat { file, output }) => cat(&file, output.as_deref()),
        Some(Commands::Stats { file }) => stats(&file),
        Some(Commands::Find { file, pattern }) => find(&file, &pattern),
        Some(Commands::Append {
            file,
            addition,
            at_line,
            output,
        }) => append(&file, &addition, at_line, output.as_deref()),
        Some(Commands::Transform {
            file,
            replace,
            delete_matching,
            drop_children,
            output,
        }) => transform(&file, &replace, &delete_matching, drop_children, output.as_deref()),
        Some(Commands::Config { command }) => config_command(command),
        Some(Commands::Completion { shell }) => completion(shell),
        None => {
            Cli::command()
                .print_help()
                .map_err(|e| TreeError::io("print help", e))?;
            Ok(())
        }
    }
}

/// Read a source file and build its tree.
#[instrument(level = "debug")]
fn load_tree(path: &Path) -> CliResult<SourceTree> {
    ensure_file_exists(path)?;
    let content = std::fs::read_to_string(path)
        .map_err(|e| TreeError::io(format!("read {}", path.display()), e))?;
    let lines: Vec<&str> = content.lines().collect();
    debug!("read {} lines from {}", lines.len(), path.display());
    Ok(TreeBuilder::new().build_from_lines(&lines))
}

/// Serialize `tree` to the given path, or to stdout when none is given.
fn emit(tree: &SourceTree, output_path: Option<&Path>) -> CliResult<()> {
    match output_path {
        Some(path) => {
            let file = File::create(path)
                .map_err(|e| TreeError::io(format!("create {}", path.display()), e))?;
            let mut writer = BufWriter::new(file);
            tree.write_to(&mut writer)?;
            writer
                .flush()
                .map_err(|e| TreeError::io("flush output", e))?;
            output::action("Wrote", &path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut lock = stdout.lock();
            tree.write_to(&mut lock)?;
        }
    }
    Ok(())
}

#[instrument(level = "debug")]
fn tree(path: &Path, lines: bool) -> CliResult<()> {
    let settings = Settings::load(path.parent())?;
    let tree = load_tree(path)?;
    let show_lines = lines || settings.display.show_lines;
    output::info(&tree.to_tree_string(&path.display().to_string(), show_lines));
    Ok(())
}

#[instrument(level = "debug")]
fn cat(path: &Path, output_path: Option<&Path>) -> CliResult<()> {
    let tree = load_tree(path)?;
    emit(&tree, output_path)
}

#[instrument(level = "debug")]
fn stats(path: &Path) -> CliResult<()> {
    let tree = load_tree(path)?;
    output::header(&path.display());
    output::detail(&format!("nodes:  {}", tree.len()));
    output::detail(&format!("levels: {}", tree.max_depth()));
    for (category, count) in tree
        .category_counts()
        .into_iter()
        .sorted_by_key(|(category, _)| category.to_string())
    {
        output::detail(&format!("{}: {}", category, count));
    }
    Ok(())
}

#[instrument(level = "debug")]
fn find(path: &Path, pattern: &str) -> CliResult<()> {
    let regex =
        Regex::new(pattern).map_err(|e| CliError::InvalidArgs(format!("bad pattern: {e}")))?;
    let tree = load_tree(path)?;

    let matches = tree.find_matching(&regex);
    if matches.is_empty() {
        output::warning(&format!("no match for '{pattern}'"));
        return Ok(());
    }
    for idx in matches {
        if let Some(node) = tree.node(idx) {
            output::info(&format!("{}: {}", node.data.line, node.data.text));
        }
    }
    Ok(())
}

#[instrument(level = "debug")]
fn append(
    base: &Path,
    addition: &Path,
    at_line: Option<usize>,
    output_path: Option<&Path>,
) -> CliResult<()> {
    let mut tree = load_tree(base)?;
    let incoming = load_tree(addition)?;
    tree.append(incoming, at_line)?;
    emit(&tree, output_path)
}

#[instrument(level = "debug")]
fn transform(
    path: &Path,
    replace_specs: &[String],
    delete_specs: &[String],
    drop_children: bool,
    output_path: Option<&Path>,
) -> CliResult<()> {
    let settings = Settings::load(path.parent())?;
    let mut tree = load_tree(path)?;

    // Flags win over configured defaults
    let transformer = if replace_specs.is_empty() && delete_specs.is_empty() {
        settings.transform_rules()?
    } else {
        Transformer::from_specs(replace_specs, delete_specs, !drop_children)?
    };
    tree.set_transformer(transformer);

    let report = tree.apply_transformer()?;
    debug!(?report, "transform finished");
    emit(&tree, output_path)?;
    if output_path.is_some() {
        output::success(&format!(
            "{} rewritten, {} deleted",
            report.rewritten, report.deleted
        ));
    }
    Ok(())
}

#[instrument(level = "debug")]
fn config_command(command: ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = Settings::load(Some(Path::new(".")))?;
            output::info(&settings.to_toml()?);
            Ok(())
        }
        ConfigCommands::Init { global } => config_init(global),
        ConfigCommands::Path => {
            match config::global_config_path() {
                Some(path) => output::info(&format!("global: {}", path.display())),
                None => output::warning("global config directory not resolvable"),
            }
            output::info(&format!(
                "local:  {}",
                config::local_config_path(Path::new(".")).display()
            ));
            Ok(())
        }
    }
}

fn config_init(global: bool) -> CliResult<()> {
    let path = if global {
        let dir = config::global_config_dir().ok_or_else(|| {
            TreeError::Config("cannot resolve global config directory".to_string())
        })?;
        std::fs::create_dir_all(&dir)
            .map_err(|e| TreeError::io(format!("create {}", dir.display()), e))?;
        dir.join("rstree.toml")
    } else {
        config::local_config_path(Path::new("."))
    };

    if path.exists() {
        return Err(CliError::InvalidArgs(format!(
            "config already exists: {}",
            path.display()
        )));
    }
    std::fs::write(&path, Settings::template())
        .map_err(|e| TreeError::io(format!("write {}", path.display()), e))?;
    output::success(&format!("created {}", path.display()));
    Ok(())
}

fn completion(shell: clap_complete::Shell) -> CliResult<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
    Ok(())
}
