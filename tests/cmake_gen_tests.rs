//! Unit tests for CMake descriptor generation.

mod common;

use listsmith::cmake_gen::{render_root, render_subdir};
use listsmith::ir::{BuildGraph, BuildList, BuildUnit};
use rstest::rstest;

#[rstest]
fn executable_descriptor_is_exact() {
    let list = BuildList::single(BuildUnit::executable("default"), vec!["moduleB".to_owned()]);
    let text = render_subdir(&list).expect("render");
    assert_eq!(
        text,
        "add_executable(default src/main.c)\n\
         target_link_libraries(default PRIVATE moduleB)\n"
    );
}

#[rstest]
fn library_descriptor_is_exact() {
    let list = BuildList::single(BuildUnit::library("moduleB"), Vec::new());
    let text = render_subdir(&list).expect("render");
    assert_eq!(
        text,
        "file(GLOB sources src/*.c)\n\
         add_library(moduleB STATIC ${sources})\n\
         target_include_directories(moduleB PUBLIC inc)\n"
    );
}

#[rstest]
fn merged_list_renders_every_unit() {
    let mut list = BuildList::single(BuildUnit::executable("one"), vec!["shared".to_owned()]);
    list.merge(BuildList::single(BuildUnit::executable("two"), Vec::new()));
    let text = render_subdir(&list).expect("render");
    assert!(text.contains("add_executable(one src/main.c)"));
    assert!(text.contains("add_executable(two src/main.c)"));
    assert!(text.contains("target_link_libraries(one PRIVATE shared)"));
    assert!(!text.contains("target_link_libraries(two"));
}

#[rstest]
fn root_descriptor_lists_subdirectories_and_library_targets() {
    let project = common::project(&[
        ("app", &["libcore", "main*"]),
        ("libcore", &["moduleX"]),
    ]);
    let graph = BuildGraph::from_project(&project);
    let text = render_root("demo", &graph).expect("render");

    assert!(text.starts_with(
        "cmake_minimum_required(VERSION 3.16)\nproject(demo C)\n"
    ));
    assert!(text.contains("add_subdirectory(main)"));
    assert!(text.contains("add_subdirectory(moduleX)"));
    assert!(!text.contains("add_subdirectory(.)"));
    assert!(text.contains("add_library(libcore INTERFACE)"));
    assert!(text.contains("target_link_libraries(libcore INTERFACE moduleX)"));
}

#[rstest]
fn root_descriptor_without_library_targets_has_no_units() {
    let project = common::project(&[("default", &["moduleA*", "moduleB"])]);
    let graph = BuildGraph::from_project(&project);
    let text = render_root("demo", &graph).expect("render");
    assert_eq!(
        text,
        "cmake_minimum_required(VERSION 3.16)\n\
         project(demo C)\n\
         add_subdirectory(moduleA)\n\
         add_subdirectory(moduleB)\n"
    );
}
