//! CMake descriptor generator.
//!
//! This module converts one build-graph entry into the text of a
//! `CMakeLists.txt`. Rendering goes through embedded `minijinja` templates:
//! one for the project-root descriptor (project declaration, subdirectory
//! listing, and interface libraries for library targets) and one for
//! subdirectory descriptors (a compiled module library, or the executables
//! whose entry component lives there).
//!
//! The generator consumes plain data and writes nothing to disk; it also does
//! not check for the ambiguity sentinel, that gate belongs to the caller.
//! Output order follows the (insertion-ordered) graph, so rendering is
//! deterministic for a given model.

use minijinja::{Environment, context};
use serde::Serialize;

use crate::ir::{BuildGraph, BuildList, UnitKind};

/// File name of every generated descriptor.
pub const CMAKE_LISTS: &str = "CMakeLists.txt";

const SUBDIR_TEMPLATE: &str = "\
{% for unit in units -%}
{% if unit.exe -%}
add_executable({{ unit.name }} src/main.c)
{% else -%}
file(GLOB sources src/*.c)
add_library({{ unit.name }} STATIC ${sources})
target_include_directories({{ unit.name }} PUBLIC inc)
{% endif -%}
{% if unit.links -%}
target_link_libraries({{ unit.name }} {% if unit.exe %}PRIVATE{% else %}PUBLIC{% endif %} {{ unit.links|join(\" \") }})
{% endif -%}
{% endfor %}";

const ROOT_TEMPLATE: &str = "\
cmake_minimum_required(VERSION 3.16)
project({{ name }} C)
{% for subdir in subdirs -%}
add_subdirectory({{ subdir }})
{% endfor -%}
{% for unit in units -%}
add_library({{ unit.name }} INTERFACE)
{% if unit.links -%}
target_link_libraries({{ unit.name }} INTERFACE {{ unit.links|join(\" \") }})
{% endif -%}
{% endfor %}";

/// One build unit flattened for template consumption.
#[derive(Serialize)]
struct RenderUnit {
    name: String,
    exe: bool,
    links: Vec<String>,
}

fn render_units(list: &BuildList) -> Vec<RenderUnit> {
    list.units
        .iter()
        .map(|unit| RenderUnit {
            name: unit.name.clone(),
            exe: unit.kind == UnitKind::Executable,
            links: list.links.get(&unit.name).cloned().unwrap_or_default(),
        })
        .collect()
}

/// Render the descriptor for one subdirectory's build list.
///
/// # Errors
///
/// Returns a [`minijinja::Error`] when template evaluation fails.
pub fn render_subdir(list: &BuildList) -> Result<String, minijinja::Error> {
    let mut env = Environment::new();
    env.add_template("subdir", SUBDIR_TEMPLATE)?;
    env.get_template("subdir")?
        .render(context! { units => render_units(list) })
}

/// Render the project-root descriptor: the project declaration, one
/// `add_subdirectory` per non-reserved subdirectory in the graph, then the
/// root build list's library targets as interface libraries.
///
/// # Errors
///
/// Returns a [`minijinja::Error`] when template evaluation fails.
pub fn render_root(name: &str, graph: &BuildGraph) -> Result<String, minijinja::Error> {
    let units = graph.root().map(render_units).unwrap_or_default();
    let subdirs: Vec<&str> = graph.subdirs().collect();
    let mut env = Environment::new();
    env.add_template("root", ROOT_TEMPLATE)?;
    env.get_template("root")?
        .render(context! { name, subdirs, units })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::BuildUnit;

    #[test]
    fn subdir_library_compiles_its_own_sources() {
        let list = BuildList::single(BuildUnit::library("moduleB"), Vec::new());
        let text = render_subdir(&list).expect("render");
        assert!(text.contains("add_library(moduleB STATIC ${sources})"));
        assert!(text.contains("target_include_directories(moduleB PUBLIC inc)"));
        assert!(!text.contains("target_link_libraries"));
    }

    #[test]
    fn subdir_executable_links_privately() {
        let list = BuildList::single(BuildUnit::executable("default"), vec!["moduleB".to_owned()]);
        let text = render_subdir(&list).expect("render");
        assert!(text.contains("add_executable(default src/main.c)"));
        assert!(text.contains("target_link_libraries(default PRIVATE moduleB)"));
    }
}
