//! External tool abstractions
//!
//! This module provides trait-based abstractions for the external CLI tools the
//! wrapper drives (Snakemake, rsync, MkDocs, snakedeploy, dbt-metabase),
//! enabling testable code through dependency injection and mock implementations.

pub mod command;
pub mod snakemake;

pub use command::{CommandError, CommandExecutor, CommandOutput, Invocation, ProcessCommandExecutor};
pub use snakemake::SnakemakeRun;
