//! CLI execution and command dispatch logic.
//!
//! This module keeps [`main`](crate) minimal by providing a single entry
//! point that handles command execution. It owns all filesystem access: the
//! classification engine and the assembler work on in-memory structures
//! only, and the runner loads the manifest, hands the assembled graph to the
//! generator, and writes (or removes) the descriptor files.
//!
//! Generation is all-or-nothing. Every classification problem in the model
//! is listed before the pass is abandoned; a half-written build tree is
//! worse than none.

use std::fs;
use std::io::{self, Write as _};

use anyhow::{Context, Result, bail};
use camino::{Utf8Path, Utf8PathBuf};
use itertools::{Itertools, Position};
use tracing::{debug, info};

use crate::cli::{Cli, Commands, ModuleCommands};
use crate::cmake_gen::{self, CMAKE_LISTS};
use crate::ir::{self, BuildGraph};
use crate::project::{self, Dependency, ENTRY_MARKER};

/// Subdirectories created for a new module with `module add --create`.
const MODULE_SUBDIRS: [&str; 3] = ["src", "inc", "src/inc"];

/// Execute the parsed [`Cli`] commands.
///
/// # Errors
///
/// Returns an error when the manifest cannot be loaded, the model fails
/// classification, or descriptor files cannot be written.
pub fn run(cli: &Cli) -> Result<()> {
    let root = cli
        .directory
        .clone()
        .unwrap_or_else(|| Utf8PathBuf::from("."));
    let manifest = root.join(&cli.file);
    let command = cli.command.clone().unwrap_or(Commands::Generate);
    match command {
        Commands::Init => init(&manifest),
        Commands::Module(ModuleCommands::Add {
            module,
            target,
            create,
        }) => module_add(&root, &manifest, &module, &target, create),
        Commands::Module(ModuleCommands::Rm { module, target }) => {
            module_rm(&manifest, &module, target.as_deref())
        }
        Commands::Tree => tree(&manifest),
        Commands::Generate => generate(&root, &manifest),
        Commands::Clean => clean(&root, &manifest),
    }
}

/// Create an empty manifest, or report the one already present.
fn init(manifest: &Utf8Path) -> Result<()> {
    let mut out = io::stdout().lock();
    if manifest.exists() {
        writeln!(out, "Found {manifest}; no need to initialise.")?;
        return Ok(());
    }
    fs::write(manifest, "").with_context(|| format!("creating {manifest}"))?;
    info!("initialised empty project at {manifest}");
    writeln!(out, "Initialised empty project at {manifest}.")?;
    Ok(())
}

/// Append a module (or target) dependency to a target and save the manifest.
fn module_add(
    root: &Utf8Path,
    manifest: &Utf8Path,
    module: &str,
    target: &str,
    create: bool,
) -> Result<()> {
    let mut project = load(manifest)?;
    let marked = module.ends_with(ENTRY_MARKER);
    let name = module.trim_end_matches(ENTRY_MARKER);

    let dep = if project.contains_target(name) {
        Dependency::target(name)
    } else {
        Dependency::module(name, marked)
    };
    if !project.contains_target(target) {
        info!("target {target} not found, declaring it");
    }
    project.add_dependency(target, dep)?;
    project::save(&project, manifest)?;

    if create {
        for sub in MODULE_SUBDIRS {
            let dir = root.join(name).join(sub);
            fs::create_dir_all(&dir).with_context(|| format!("creating {dir}"))?;
        }
    }

    writeln!(io::stdout().lock(), "Added {name} to {target}.")?;
    Ok(())
}

/// Remove a module dependency from one target, or from every target.
fn module_rm(manifest: &Utf8Path, module: &str, target: Option<&str>) -> Result<()> {
    let mut project = load(manifest)?;
    let removed = project.remove_dependency(module, target)?;
    project::save(&project, manifest)?;
    writeln!(
        io::stdout().lock(),
        "Removed {removed} dependenc{} on {module}.",
        if removed == 1 { "y" } else { "ies" }
    )?;
    Ok(())
}

/// Print the project dependency tree.
fn tree(manifest: &Utf8Path) -> Result<()> {
    let project = load(manifest)?;
    let mut out = io::stdout().lock();
    for (target, deps) in &project.targets {
        writeln!(out, "{target}")?;
        for (position, dep) in deps.iter().with_position() {
            let branch = match position {
                Position::Last | Position::Only => "└── ",
                Position::First | Position::Middle => "├── ",
            };
            let marker = if dep.entry { "*" } else { "" };
            writeln!(out, "{branch}{}{marker}", dep.name)?;
        }
    }
    Ok(())
}

/// Classify the project and write every descriptor, or report every problem
/// and write nothing.
fn generate(root: &Utf8Path, manifest: &Utf8Path) -> Result<()> {
    let project = load(manifest)?;
    debug!(
        "model: {}",
        serde_json::to_string(&project.to_map()).unwrap_or_default()
    );

    let errors = ir::diagnose(&project);
    let graph = BuildGraph::from_project(&project);
    if !errors.is_empty() || graph.is_ambiguous() {
        let mut err_out = io::stderr().lock();
        for error in &errors {
            writeln!(err_out, "error: {error}")?;
        }
        drop(err_out);
        bail!(
            "refusing to write descriptors: {} problem(s) found",
            errors.len()
        );
    }

    let name = project_name(root);
    let top = cmake_gen::render_root(&name, &graph).context("rendering top-level descriptor")?;
    write_descriptor(&root.join(CMAKE_LISTS), &top)?;

    let mut written = 1_usize;
    for (subdir, list) in &graph.lists {
        if subdir == ir::ROOT_SUBDIR {
            continue;
        }
        let dir = root.join(subdir);
        fs::create_dir_all(&dir).with_context(|| format!("creating {dir}"))?;
        let text = cmake_gen::render_subdir(list)
            .with_context(|| format!("rendering descriptor for {subdir}"))?;
        write_descriptor(&dir.join(CMAKE_LISTS), &text)?;
        written += 1;
    }

    writeln!(io::stdout().lock(), "Generated {written} descriptor(s).")?;
    Ok(())
}

/// Delete the descriptors a generate pass would have written.
fn clean(root: &Utf8Path, manifest: &Utf8Path) -> Result<()> {
    let project = load(manifest)?;
    let graph = BuildGraph::from_project(&project);
    let mut removed = 0_usize;
    removed += remove_descriptor(&root.join(CMAKE_LISTS))?;
    for subdir in graph.subdirs() {
        removed += remove_descriptor(&root.join(subdir).join(CMAKE_LISTS))?;
    }
    writeln!(io::stdout().lock(), "Removed {removed} descriptor(s).")?;
    Ok(())
}

fn load(manifest: &Utf8Path) -> Result<project::Project> {
    project::from_path(manifest).with_context(|| format!("loading project at {manifest}"))
}

fn write_descriptor(path: &Utf8Path, text: &str) -> Result<()> {
    fs::write(path, text).with_context(|| format!("writing {path}"))?;
    info!("generated {path}");
    Ok(())
}

/// Remove one descriptor file; a missing file is not an error.
fn remove_descriptor(path: &Utf8Path) -> Result<usize> {
    match fs::remove_file(path) {
        Ok(()) => {
            info!("removed {path}");
            Ok(1)
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(0),
        Err(err) => Err(err).with_context(|| format!("removing {path}")),
    }
}

/// Name the CMake project after the directory holding the manifest.
fn project_name(root: &Utf8Path) -> String {
    root.canonicalize_utf8()
        .ok()
        .as_deref()
        .and_then(Utf8Path::file_name)
        .map_or_else(|| "project".to_owned(), str::to_owned)
}
