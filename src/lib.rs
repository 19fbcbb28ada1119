//! Listsmith core library.
//!
//! This library loads a `project.yaml` dependency model, infers the role of
//! every referenced module, assembles a build graph, and renders the graph
//! into `CMakeLists.txt` descriptors.

pub mod cli;
pub mod cmake_gen;
pub mod ir;
pub mod project;
pub mod runner;
pub mod usage;
