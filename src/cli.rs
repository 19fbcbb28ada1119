//! Command line interface definition using clap.
//!
//! This module defines the [`Cli`] structure and its subcommands. The
//! subcommand surface mirrors the project workflow: initialise a manifest,
//! edit its module lists, inspect the tree, then generate or clean the
//! descriptors.

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};

use crate::project::{DEFAULT_TARGET, PROJECT_YAML};

/// A YAML-powered CMake project generator.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the project manifest file to use.
    #[arg(short, long, value_name = "FILE", default_value = PROJECT_YAML)]
    pub file: Utf8PathBuf,

    /// Change to this directory before doing anything.
    #[arg(short = 'C', long, value_name = "DIR")]
    pub directory: Option<Utf8PathBuf>,

    /// Enable verbose logging output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Optional subcommand to execute; defaults to `generate` when omitted.
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Parse command-line arguments, providing `generate` as the default
    /// command.
    #[must_use]
    pub fn parse_with_default() -> Self {
        Self::parse().with_default_command()
    }

    /// Apply the default command if none was specified.
    #[must_use]
    fn with_default_command(mut self) -> Self {
        if self.command.is_none() {
            self.command = Some(Commands::Generate);
        }
        self
    }
}

/// Available top-level commands.
#[derive(Debug, Subcommand, PartialEq, Eq, Clone)]
pub enum Commands {
    /// Create an empty project manifest in the working directory.
    Init,

    /// Manage a target's module dependencies.
    #[command(subcommand)]
    Module(ModuleCommands),

    /// Print the project dependency tree.
    Tree,

    /// Classify the project and write every CMake descriptor.
    Generate,

    /// Delete the descriptors a generate pass would have written.
    Clean,
}

/// Subcommands for `module`.
#[derive(Debug, Subcommand, PartialEq, Eq, Clone)]
pub enum ModuleCommands {
    /// Add a module dependency to a target. A trailing `*` marks the module
    /// as the target's executable entry component.
    Add {
        /// Module name, optionally with a trailing entry marker.
        module: String,
        /// Target that will depend on the module.
        #[arg(default_value = DEFAULT_TARGET)]
        target: String,
        /// Also create the module's source directory skeleton.
        #[arg(long)]
        create: bool,
    },
    /// Remove a module dependency from a target, or from every target.
    #[command(alias = "remove")]
    Rm {
        /// Module name to remove.
        module: String,
        /// Target to remove it from; removes from all targets when omitted.
        target: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_is_the_default_command() {
        let cli = Cli::try_parse_from(["listsmith"])
            .expect("parse")
            .with_default_command();
        assert_eq!(cli.command, Some(Commands::Generate));
        assert_eq!(cli.file, Utf8PathBuf::from(PROJECT_YAML));
    }

    #[test]
    fn module_add_defaults_to_the_default_target() {
        let cli = Cli::try_parse_from(["listsmith", "module", "add", "moduleA*"]).expect("parse");
        let Some(Commands::Module(ModuleCommands::Add {
            module,
            target,
            create,
        })) = cli.command
        else {
            panic!("expected module add");
        };
        assert_eq!(module, "moduleA*");
        assert_eq!(target, DEFAULT_TARGET);
        assert!(!create);
    }
}
