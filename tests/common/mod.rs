//! Shared fixtures and helpers for integration tests.

use std::collections::{BTreeMap, BTreeSet};

use indexmap::IndexMap;
use listsmith::ir::{BuildGraph, UnitKind};
use listsmith::project::Project;

/// Build a project from `(target, dependency list)` pairs, running the same
/// name classification and entry-marker stripping as the manifest loader.
pub fn project(entries: &[(&str, &[&str])]) -> Project {
    let map: IndexMap<String, Vec<String>> = entries
        .iter()
        .map(|(target, deps)| {
            let list = deps.iter().map(|dep| (*dep).to_owned()).collect();
            ((*target).to_owned(), list)
        })
        .collect();
    Project::from_map(&map)
}

/// Order-insensitive view of a graph: per subdirectory, the set of
/// `(unit name, is_executable)` pairs and each unit's link set.
pub type GraphSets = BTreeMap<String, (BTreeSet<(String, bool)>, BTreeMap<String, BTreeSet<String>>)>;

/// Flatten a graph into sets so permuted assemblies can be compared.
pub fn graph_as_sets(graph: &BuildGraph) -> GraphSets {
    graph
        .lists
        .iter()
        .map(|(subdir, list)| {
            let units = list
                .units
                .iter()
                .map(|unit| (unit.name.clone(), unit.kind == UnitKind::Executable))
                .collect();
            let links = list
                .links
                .iter()
                .map(|(unit, names)| (unit.clone(), names.iter().cloned().collect()))
                .collect();
            (subdir.clone(), (units, links))
        })
        .collect()
}
