//! Project model structures and persistence.
//!
//! A `project.yaml` is a flat mapping from target name to an ordered list of
//! dependency-name strings. This module parses that mapping into a [`Project`]
//! of typed [`Dependency`] values and provides the structural queries the
//! inference engine and assembler are built on.
//!
//! A dependency name is Target-kind when it matches another key of the
//! mapping; any other name is Module-kind. A trailing `*` on a module name
//! marks it as the executable entry component of the owning target; the
//! marker is stripped on load and restored on save.
//!
//! ```rust
//! use listsmith::project;
//!
//! let yaml = "default:\n  - moduleA*\n  - moduleB\n";
//! let project = project::from_str(yaml).expect("parse");
//! assert_eq!(project.executables(), vec!["default"]);
//! ```

use std::fs;
use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use indexmap::{IndexMap, IndexSet};
use thiserror::Error;

/// Default name of the project manifest file.
pub const PROJECT_YAML: &str = "project.yaml";

/// Name of the target that `module add` appends to when none is given.
pub const DEFAULT_TARGET: &str = "default";

/// Trailing marker declaring a module as a target's executable entry point.
pub const ENTRY_MARKER: char = '*';

/// Errors raised while loading, saving, or editing a project.
#[derive(Debug, Error)]
pub enum ProjectError {
    /// The manifest file could not be read or written.
    #[error("failed to access {path}")]
    Io {
        /// Path of the manifest involved.
        path: Utf8PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The manifest was not a mapping of target name to dependency list.
    #[error("failed to parse {path} as a target mapping")]
    Parse {
        /// Path of the manifest involved.
        path: Utf8PathBuf,
        /// Underlying YAML failure.
        #[source]
        source: serde_saphyr::Error,
    },
    /// A named target does not exist in the project.
    #[error("target {target} not found in project")]
    TargetNotFound {
        /// Name of the missing target.
        target: String,
    },
    /// A dependency was added twice to the same target.
    #[error("{name} is already a dependency of {target}")]
    DuplicateDependency {
        /// Name of the repeated dependency.
        name: String,
        /// Target that already lists it.
        target: String,
    },
    /// A module was removed but no target depended on it.
    #[error("no target depends on module {name}")]
    ModuleNotFound {
        /// Name of the module that was not found.
        name: String,
    },
}

/// Classification of a dependency name within the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepKind {
    /// The name matches another target declared in the project.
    Target,
    /// The name is a source module external to the target mapping.
    Module,
}

/// A single entry in a target's dependency list.
///
/// Equality considers `(kind, name)` only; the entry marker records how the
/// dependency was spelled, not what it refers to.
#[derive(Debug, Clone)]
pub struct Dependency {
    /// Whether the name refers to another target or to a source module.
    pub kind: DepKind,
    /// Dependency name with any entry marker stripped.
    pub name: String,
    /// True when the dependency was marked as the owning target's entry
    /// component.
    pub entry: bool,
}

impl PartialEq for Dependency {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.name == other.name
    }
}

impl Eq for Dependency {}

impl Dependency {
    /// Create a module dependency.
    #[must_use]
    pub fn module(name: &str, entry: bool) -> Self {
        Self {
            kind: DepKind::Module,
            name: name.to_owned(),
            entry,
        }
    }

    /// Create a target dependency. Targets never carry an entry marker.
    #[must_use]
    pub fn target(name: &str) -> Self {
        Self {
            kind: DepKind::Target,
            name: name.to_owned(),
            entry: false,
        }
    }
}

/// The in-memory dependency model: target name to ordered dependency list.
///
/// Keys are unique and iteration order is insertion order, so saving a loaded
/// project reproduces the original mapping. A target must not depend on
/// itself; the model does not enforce this.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Project {
    /// Mapping from target name to its ordered dependencies.
    pub targets: IndexMap<String, Vec<Dependency>>,
}

impl Project {
    /// Build a project from a raw mapping of target name to dependency-name
    /// strings, classifying each name and stripping entry markers.
    #[must_use]
    pub fn from_map(map: &IndexMap<String, Vec<String>>) -> Self {
        let mut project = Self::default();
        for (target, dep_list) in map {
            let deps = dep_list
                .iter()
                .map(|raw| {
                    let marked = raw.ends_with(ENTRY_MARKER);
                    let name = raw.trim_end_matches(ENTRY_MARKER);
                    if map.contains_key(name) {
                        Dependency::target(name)
                    } else {
                        Dependency::module(name, marked)
                    }
                })
                .collect();
            project.targets.insert(target.clone(), deps);
        }
        project
    }

    /// Convert the project back into the raw string mapping, restoring entry
    /// markers.
    #[must_use]
    pub fn to_map(&self) -> IndexMap<String, Vec<String>> {
        self.targets
            .iter()
            .map(|(target, deps)| {
                let list = deps
                    .iter()
                    .map(|dep| {
                        if dep.entry {
                            format!("{}{ENTRY_MARKER}", dep.name)
                        } else {
                            dep.name.clone()
                        }
                    })
                    .collect();
                (target.clone(), list)
            })
            .collect()
    }

    /// Serialise the project as YAML text.
    ///
    /// Names in a project are plain identifiers, so no quoting is applied.
    #[must_use]
    pub fn to_yaml(&self) -> String {
        let mut out = String::new();
        for (target, dep_list) in self.to_map() {
            if dep_list.is_empty() {
                out.push_str(&format!("{target}: []\n"));
            } else {
                out.push_str(&format!("{target}:\n"));
                for dep in dep_list {
                    out.push_str(&format!("  - {dep}\n"));
                }
            }
        }
        out
    }

    /// Ordered dependency list of `target`, or `None` when undeclared.
    #[must_use]
    pub fn deps(&self, target: &str) -> Option<&[Dependency]> {
        self.targets.get(target).map(Vec::as_slice)
    }

    /// Whether `target` is declared in the project.
    #[must_use]
    pub fn contains_target(&self, target: &str) -> bool {
        self.targets.contains_key(target)
    }

    /// Whether any target's dependency list mentions `name`.
    #[must_use]
    pub fn any_depends(&self, name: &str) -> bool {
        self.targets
            .values()
            .flatten()
            .any(|dep| dep.name == name)
    }

    /// Whether any target lists `name` as a dependency of the given kind.
    #[must_use]
    pub fn any_depends_kind(&self, name: &str, kind: DepKind) -> bool {
        self.targets
            .values()
            .flatten()
            .any(|dep| dep.name == name && dep.kind == kind)
    }

    /// Whether `target` lists `module` as a Module-kind dependency.
    #[must_use]
    pub fn contains_module(&self, module: &str, target: &str) -> bool {
        self.deps(target).is_some_and(|deps| {
            deps.iter()
                .any(|dep| dep.kind == DepKind::Module && dep.name == module)
        })
    }

    /// Targets that some other target links against.
    ///
    /// A target is a library exactly when it appears as a Target-kind
    /// dependency elsewhere in the model.
    #[must_use]
    pub fn libraries(&self) -> Vec<&str> {
        self.targets
            .keys()
            .filter(|target| self.any_depends_kind(target, DepKind::Target))
            .map(String::as_str)
            .collect()
    }

    /// Targets that nothing links against; these produce executables.
    #[must_use]
    pub fn executables(&self) -> Vec<&str> {
        self.targets
            .keys()
            .filter(|target| !self.any_depends_kind(target, DepKind::Target))
            .map(String::as_str)
            .collect()
    }

    /// Whether `target` is a library target.
    #[must_use]
    pub fn is_library(&self, target: &str) -> bool {
        self.any_depends_kind(target, DepKind::Target)
    }

    /// Every distinct module name referenced anywhere, in first-seen order.
    #[must_use]
    pub fn modules(&self) -> Vec<&str> {
        let unique: IndexSet<&str> = self
            .targets
            .values()
            .flatten()
            .filter(|dep| dep.kind == DepKind::Module)
            .map(|dep| dep.name.as_str())
            .collect();
        unique.into_iter().collect()
    }

    /// Module-kind dependency names of a single target, in list order.
    #[must_use]
    pub fn modules_of(&self, target: &str) -> Vec<&str> {
        self.deps(target)
            .into_iter()
            .flatten()
            .filter(|dep| dep.kind == DepKind::Module)
            .map(|dep| dep.name.as_str())
            .collect()
    }

    /// Append a dependency to `target`, creating the target when absent.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectError::DuplicateDependency`] when the target already
    /// lists an equal dependency.
    pub fn add_dependency(&mut self, target: &str, dep: Dependency) -> Result<(), ProjectError> {
        let deps = self.targets.entry(target.to_owned()).or_default();
        if deps.contains(&dep) {
            return Err(ProjectError::DuplicateDependency {
                name: dep.name,
                target: target.to_owned(),
            });
        }
        deps.push(dep);
        Ok(())
    }

    /// Remove a module dependency from one target, or from every target when
    /// `target` is `None`. Returns how many entries were removed.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectError::TargetNotFound`] for an undeclared target and
    /// [`ProjectError::ModuleNotFound`] when nothing was removed.
    pub fn remove_dependency(
        &mut self,
        module: &str,
        target: Option<&str>,
    ) -> Result<usize, ProjectError> {
        let victim = Dependency::module(module, false);
        let mut removed = 0;
        match target {
            Some(name) => {
                let deps = self
                    .targets
                    .get_mut(name)
                    .ok_or_else(|| ProjectError::TargetNotFound {
                        target: name.to_owned(),
                    })?;
                let before = deps.len();
                deps.retain(|dep| dep != &victim);
                removed = before - deps.len();
            }
            None => {
                for deps in self.targets.values_mut() {
                    let before = deps.len();
                    deps.retain(|dep| dep != &victim);
                    removed += before - deps.len();
                }
            }
        }
        if removed == 0 {
            return Err(ProjectError::ModuleNotFound {
                name: module.to_owned(),
            });
        }
        Ok(removed)
    }
}

/// Parse a project from YAML text.
///
/// An empty or whitespace-only document yields an empty project, matching a
/// freshly initialised manifest.
///
/// # Errors
///
/// Returns [`ProjectError::Parse`] when the document is not a mapping of
/// target name to list of strings.
pub fn from_str(yaml: &str) -> Result<Project, ProjectError> {
    if yaml.trim().is_empty() {
        return Ok(Project::default());
    }
    let map: IndexMap<String, Vec<String>> =
        serde_saphyr::from_str(yaml).map_err(|source| ProjectError::Parse {
            path: Utf8PathBuf::from(PROJECT_YAML),
            source,
        })?;
    Ok(Project::from_map(&map))
}

/// Load a project from the manifest at `path`.
///
/// # Errors
///
/// Returns [`ProjectError::Io`] when the file cannot be read and
/// [`ProjectError::Parse`] when its contents are not a target mapping.
pub fn from_path(path: &Utf8Path) -> Result<Project, ProjectError> {
    let yaml = fs::read_to_string(path).map_err(|source| ProjectError::Io {
        path: path.to_owned(),
        source,
    })?;
    from_str(&yaml).map_err(|err| match err {
        ProjectError::Parse { source, .. } => ProjectError::Parse {
            path: path.to_owned(),
            source,
        },
        other => other,
    })
}

/// Write the project manifest to `path`, replacing any previous contents.
///
/// # Errors
///
/// Returns [`ProjectError::Io`] when the file cannot be written.
pub fn save(project: &Project, path: &Utf8Path) -> Result<(), ProjectError> {
    fs::write(path, project.to_yaml()).map_err(|source| ProjectError::Io {
        path: path.to_owned(),
        source,
    })
}
