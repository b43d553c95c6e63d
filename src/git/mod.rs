//! Git operations module
//!
//! Cloning BGCFlow goes through libgit2 bindings instead of shelling out to `git`.

pub mod operations;

pub use operations::{Git2Operations, GitError, GitOperations};
