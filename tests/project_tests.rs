//! Unit tests for the project model and its persistence mapping.

mod common;

use listsmith::project::{self, DepKind, Dependency, ProjectError};
use rstest::rstest;

#[rstest]
fn load_classifies_targets_and_modules() {
    let yaml = "app:\n  - libcore\n  - moduleM\nlibcore:\n  - moduleX\n";
    let project = project::from_str(yaml).expect("parse");

    let deps = project.deps("app").expect("app");
    assert_eq!(deps.len(), 2);
    assert_eq!(
        deps.iter().map(|d| d.kind).collect::<Vec<_>>(),
        vec![DepKind::Target, DepKind::Module]
    );
    assert_eq!(project.libraries(), vec!["libcore"]);
    assert_eq!(project.executables(), vec!["app"]);
    assert_eq!(project.modules(), vec!["moduleM", "moduleX"]);
    assert_eq!(project.modules_of("libcore"), vec!["moduleX"]);
}

#[rstest]
fn round_trip_preserves_order_and_markers() {
    let yaml = "default:\n  - moduleA*\n  - moduleB\nextra:\n  - moduleC\n";
    let project = project::from_str(yaml).expect("parse");
    assert_eq!(project.to_yaml(), yaml);
}

#[rstest]
fn empty_target_serialises_as_empty_list() {
    let project = common::project(&[("default", &[])]);
    assert_eq!(project.to_yaml(), "default: []\n");
}

#[rstest]
fn structural_queries_see_all_targets() {
    let project = common::project(&[
        ("app", &["libcore", "moduleA*"]),
        ("libcore", &["moduleX"]),
    ]);
    assert!(project.any_depends("moduleX"));
    assert!(project.any_depends_kind("libcore", DepKind::Target));
    assert!(!project.any_depends_kind("libcore", DepKind::Module));
    assert!(project.contains_module("moduleA", "app"));
    assert!(!project.contains_module("libcore", "app"));
    assert!(!project.contains_module("moduleX", "app"));
}

#[rstest]
fn add_dependency_rejects_duplicates() {
    let mut project = common::project(&[("default", &["moduleA"])]);
    let err = project
        .add_dependency("default", Dependency::module("moduleA", true))
        .expect_err("duplicate");
    assert!(matches!(err, ProjectError::DuplicateDependency { .. }));
}

#[rstest]
fn add_dependency_declares_missing_target() {
    let mut project = common::project(&[]);
    project
        .add_dependency("tool", Dependency::module("main", true))
        .expect("add");
    assert_eq!(project.modules_of("tool"), vec!["main"]);
}

#[rstest]
fn remove_dependency_from_all_targets() {
    let mut project = common::project(&[
        ("one", &["shared", "a*"]),
        ("two", &["shared", "b*"]),
    ]);
    let removed = project.remove_dependency("shared", None).expect("remove");
    assert_eq!(removed, 2);
    assert_eq!(project.modules_of("one"), vec!["a"]);
    assert_eq!(project.modules_of("two"), vec!["b"]);
}

#[rstest]
fn remove_unknown_module_is_an_error() {
    let mut project = common::project(&[("default", &["moduleA"])]);
    let module_err = project
        .remove_dependency("missing", None)
        .expect_err("missing module");
    assert!(matches!(module_err, ProjectError::ModuleNotFound { .. }));
    let target_err = project
        .remove_dependency("moduleA", Some("nope"))
        .expect_err("missing target");
    assert!(matches!(target_err, ProjectError::TargetNotFound { .. }));
}

#[rstest]
fn malformed_yaml_is_a_parse_error() {
    let err = project::from_str("default: 7\n").expect_err("not a list");
    assert!(matches!(err, ProjectError::Parse { .. }));
}
