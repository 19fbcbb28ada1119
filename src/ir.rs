//! Build graph structures and assembly.
//!
//! This module defines the renderer-agnostic build description produced from
//! a [`Project`]: a mapping from subdirectory to the build units declared
//! there and their link lists. Assembly is a pure function of the model;
//! classification comes from the usage inference in [`crate::usage`], and
//! failures are encoded in the returned graph rather than raised, so a whole
//! pass yields one consolidated report.
//!
//! Two subdirectory values are reserved and must be recognised by callers:
//! [`ROOT_SUBDIR`] holds the top-level descriptor's build list, and the
//! presence of [`AMBIGUOUS_SUBDIR`] signals that at least one executable
//! target had no resolvable entry component. Nothing may be rendered from a
//! graph containing the ambiguity sentinel.

use indexmap::map::Entry;
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use thiserror::Error;

use crate::project::{DepKind, Dependency, Project};
use crate::usage::{self, Ledger, Usage};

/// Reserved subdirectory for the top-level build descriptor.
pub const ROOT_SUBDIR: &str = ".";

/// Reserved subdirectory signalling unresolved classification. Its presence
/// in a graph marks the whole assembly pass as failed.
pub const AMBIGUOUS_SUBDIR: &str = "__ambiguous__";

/// Problems found while classifying and assembling a project.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GenError {
    /// A module could not be classified as library or executable role.
    #[error("usage of module {module} is ambiguous")]
    AmbiguousUsage {
        /// Name of the unclassifiable module.
        module: String,
    },
    /// One target carries more than one explicit entry marker.
    #[error("target {target} marks both {first} and {second} as entry components")]
    ConflictingEntryMarkers {
        /// Target with conflicting markers.
        target: String,
        /// First marked module, in list order.
        first: String,
        /// Second marked module, in list order.
        second: String,
    },
    /// An executable target has no dependency that resolves to an entry
    /// component.
    #[error("executable target {target} has no entry component")]
    MissingExecutableComponent {
        /// Target missing its entry component.
        target: String,
    },
}

/// Kind of a concrete build output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitKind {
    /// A linkable library.
    Library,
    /// An executable program.
    Executable,
}

/// A concrete build output declared in some descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildUnit {
    /// Library or executable.
    pub kind: UnitKind,
    /// Name of the output.
    pub name: String,
}

impl BuildUnit {
    /// Create a library unit.
    #[must_use]
    pub fn library(name: &str) -> Self {
        Self {
            kind: UnitKind::Library,
            name: name.to_owned(),
        }
    }

    /// Create an executable unit.
    #[must_use]
    pub fn executable(name: &str) -> Self {
        Self {
            kind: UnitKind::Executable,
            name: name.to_owned(),
        }
    }
}

/// The build units of one subdirectory and their link requirements.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BuildList {
    /// Units declared in this subdirectory, in assembly order.
    pub units: Vec<BuildUnit>,
    /// Link names per unit name. Units without links carry an empty list.
    pub links: IndexMap<String, Vec<String>>,
}

impl BuildList {
    /// Create a list holding a single unit with the given links.
    #[must_use]
    pub fn single(unit: BuildUnit, links: Vec<String>) -> Self {
        let mut list = Self::default();
        list.links.insert(unit.name.clone(), links);
        list.units.push(unit);
        list
    }

    /// Merge another list into this one: units concatenate and link entries
    /// union, with the right-hand side winning on key collision.
    pub fn merge(&mut self, other: Self) {
        self.units.extend(other.units);
        self.links.extend(other.links);
    }
}

/// The assembled build description: subdirectory to build list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildGraph {
    /// Build lists keyed by subdirectory, including the reserved values.
    pub lists: IndexMap<String, BuildList>,
}

impl BuildGraph {
    /// Assemble the build graph for a project.
    ///
    /// Every target becomes one unit: library targets land in the root list
    /// and link every dependency verbatim; executable targets land in the
    /// subdirectory named after their entry component and link everything
    /// else. Each module that resolves to a library role additionally gets a
    /// one-unit list under its own name so it builds as an independent
    /// compilation unit. Executable targets without an entry component land
    /// under [`AMBIGUOUS_SUBDIR`]; no partial output is silently dropped.
    ///
    /// Assembly is deterministic: two passes over the same model produce
    /// set-equal graphs.
    #[must_use]
    pub fn from_project(project: &Project) -> Self {
        let mut graph = Self::default();
        let mut ledger = Ledger::new();
        let mut libmodules: IndexSet<&str> = IndexSet::new();

        for (target, deps) in &project.targets {
            let (unit, subdir, links) = if project.is_library(target) {
                let links = deps.iter().map(|dep| dep.name.clone()).collect();
                (BuildUnit::library(target), ROOT_SUBDIR.to_owned(), links)
            } else {
                assemble_executable(project, target, deps, &mut ledger)
            };

            for dep in deps {
                if dep.kind == DepKind::Module
                    && usage::resolve(project, &dep.name, &mut ledger) == Usage::Libmodule
                {
                    libmodules.insert(dep.name.as_str());
                }
            }

            graph.insert_merged(subdir, BuildList::single(unit, links));
        }

        for module in libmodules {
            let list = BuildList::single(BuildUnit::library(module), Vec::new());
            graph.insert_merged(module.to_owned(), list);
        }

        graph
    }

    /// Whether the pass failed; graphs with the ambiguity sentinel must not
    /// be rendered.
    #[must_use]
    pub fn is_ambiguous(&self) -> bool {
        self.lists.contains_key(AMBIGUOUS_SUBDIR)
    }

    /// Subdirectories holding their own descriptor, excluding the reserved
    /// values, in assembly order.
    pub fn subdirs(&self) -> impl Iterator<Item = &str> {
        self.lists
            .keys()
            .map(String::as_str)
            .filter(|subdir| *subdir != ROOT_SUBDIR && *subdir != AMBIGUOUS_SUBDIR)
    }

    /// Build list of the project root, when any target landed there.
    #[must_use]
    pub fn root(&self) -> Option<&BuildList> {
        self.lists.get(ROOT_SUBDIR)
    }

    fn insert_merged(&mut self, subdir: String, list: BuildList) {
        match self.lists.entry(subdir) {
            Entry::Occupied(mut slot) => slot.get_mut().merge(list),
            Entry::Vacant(slot) => {
                slot.insert(list);
            }
        }
    }
}

/// Partition an executable target's dependencies into its entry component and
/// link list.
fn assemble_executable(
    project: &Project,
    target: &str,
    deps: &[Dependency],
    ledger: &mut Ledger,
) -> (BuildUnit, String, Vec<String>) {
    let entry = entry_component(project, deps, ledger);
    let links = deps
        .iter()
        .filter(|dep| entry != Some(dep.name.as_str()))
        .map(|dep| dep.name.clone())
        .collect();
    let subdir = entry.map_or_else(|| AMBIGUOUS_SUBDIR.to_owned(), str::to_owned);
    (BuildUnit::executable(target), subdir, links)
}

/// The module supplying the target's entry point: an explicitly marked module
/// when present, otherwise the first module the inference resolves to an
/// executable role.
fn entry_component<'a>(
    project: &Project,
    deps: &'a [Dependency],
    ledger: &mut Ledger,
) -> Option<&'a str> {
    if let Some(dep) = deps
        .iter()
        .find(|dep| dep.kind == DepKind::Module && dep.entry)
    {
        return Some(dep.name.as_str());
    }
    deps.iter()
        .find(|dep| {
            dep.kind == DepKind::Module
                && usage::resolve(project, &dep.name, ledger) == Usage::Exemodule
        })
        .map(|dep| dep.name.as_str())
}

/// Collect every classification problem in the project.
///
/// The scan never stops at the first finding: conflicting entry markers are
/// reported per target, every unresolvable module yields one
/// [`GenError::AmbiguousUsage`], and every executable target left without an
/// entry component yields a [`GenError::MissingExecutableComponent`]. An
/// empty result means the assembled graph is safe to render.
#[must_use]
pub fn diagnose(project: &Project) -> Vec<GenError> {
    let mut errors = Vec::new();

    for (target, deps) in &project.targets {
        let marked: Vec<&str> = deps
            .iter()
            .filter(|dep| dep.entry)
            .map(|dep| dep.name.as_str())
            .collect();
        if let [first, second, ..] = marked.as_slice() {
            errors.push(GenError::ConflictingEntryMarkers {
                target: target.clone(),
                first: (*first).to_owned(),
                second: (*second).to_owned(),
            });
        }
    }

    let mut ledger = Ledger::new();
    let mut ambiguous: IndexSet<&str> = IndexSet::new();
    for (target, deps) in &project.targets {
        if project.is_library(target) {
            continue;
        }
        let mut has_entry = false;
        for dep in deps {
            if dep.kind != DepKind::Module {
                continue;
            }
            match usage::resolve(project, &dep.name, &mut ledger) {
                Usage::Exemodule => has_entry = true,
                Usage::Ambiguous => {
                    ambiguous.insert(dep.name.as_str());
                }
                Usage::Libmodule => {}
            }
        }
        if !has_entry {
            errors.push(GenError::MissingExecutableComponent {
                target: target.clone(),
            });
        }
    }
    for module in ambiguous {
        errors.push(GenError::AmbiguousUsage {
            module: module.to_owned(),
        });
    }

    errors
}
