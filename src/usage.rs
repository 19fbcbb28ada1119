//! Module usage inference.
//!
//! Given the dependency model, every referenced module plays one of two
//! roles: it belongs to a library, or it supplies the executable entry point
//! of some target. [`resolve`] disambiguates a module by scanning library
//! targets first (library membership always wins), then the executable
//! targets that mention it. Modules sharing an executable target constrain
//! each other, so resolution recurses into siblings through a caller-supplied
//! ledger; a module is temporarily recorded as [`Usage::Ambiguous`] while its
//! own resolution is in flight, which doubles as the cycle guard.
//!
//! Ambiguity is data, not an error: `resolve` always returns a verdict and
//! the assembler turns any leftover [`Usage::Ambiguous`] into a reported
//! failure.

use std::collections::HashMap;
use std::fmt;

use crate::project::{DepKind, Project};

/// The inferred role of a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Usage {
    /// The module is compiled into a library.
    Libmodule,
    /// The module supplies an executable target's entry point.
    Exemodule,
    /// The role could not be determined, or resolution is still in flight.
    Ambiguous,
}

impl fmt::Display for Usage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Libmodule => "library module",
            Self::Exemodule => "executable module",
            Self::Ambiguous => "ambiguous",
        };
        f.write_str(label)
    }
}

/// Per-pass memo of module verdicts, owned by the top-level assembly call and
/// threaded through every recursive [`resolve`]. Must not be reused across
/// passes over different projects.
pub type Ledger = HashMap<String, Usage>;

/// Infer the usage of `module` within `project`.
///
/// Verdicts are memoised in `ledger`; a module already present is returned
/// without recomputation, which is also what stops mutually dependent
/// siblings from recursing forever.
pub fn resolve(project: &Project, module: &str, ledger: &mut Ledger) -> Usage {
    if let Some(&known) = ledger.get(module) {
        return known;
    }

    // Library membership dominates every other signal.
    for lib in project.libraries() {
        if project.contains_module(module, lib) {
            ledger.insert(module.to_owned(), Usage::Libmodule);
            return Usage::Libmodule;
        }
    }

    let mut verdict = Usage::Ambiguous;
    for exe in project.executables() {
        if !project.contains_module(module, exe) {
            continue;
        }
        verdict = resolve_in_executable(project, module, exe, ledger);
        ledger.insert(module.to_owned(), verdict);
        if verdict != Usage::Ambiguous {
            break;
        }
    }

    // Record the terminal verdict even when no executable settled it.
    ledger.insert(module.to_owned(), verdict);
    verdict
}

/// Infer the role `module` plays inside one executable target.
fn resolve_in_executable(
    project: &Project,
    module: &str,
    exe: &str,
    ledger: &mut Ledger,
) -> Usage {
    let deps = project.deps(exe).unwrap_or_default();

    // An explicit entry marker settles the question either way.
    if deps
        .iter()
        .any(|dep| dep.kind == DepKind::Module && dep.entry && dep.name == module)
    {
        return Usage::Exemodule;
    }
    if deps
        .iter()
        .any(|dep| dep.kind == DepKind::Module && dep.entry && dep.name != module)
    {
        return Usage::Libmodule;
    }

    let siblings: Vec<&str> = project
        .modules_of(exe)
        .into_iter()
        .filter(|other| *other != module)
        .collect();
    if siblings.is_empty() {
        // Sole module of an executable target: it must be the entry point.
        return Usage::Exemodule;
    }

    let mut pending = false;
    let mut sibling_entry = false;
    for other in siblings {
        let other_use = if let Some(&known) = ledger.get(other) {
            known
        } else {
            // Mark this module in-progress so a sibling that depends back on
            // it sees Ambiguous instead of recursing into us again.
            ledger.insert(module.to_owned(), Usage::Ambiguous);
            resolve(project, other, ledger)
        };
        match other_use {
            Usage::Exemodule => sibling_entry = true,
            Usage::Ambiguous => pending = true,
            Usage::Libmodule => {}
        }
    }

    if sibling_entry {
        // At most one entry module per target, and a sibling claimed it.
        Usage::Libmodule
    } else if pending {
        Usage::Ambiguous
    } else {
        Usage::Exemodule
    }
}
