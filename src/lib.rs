// BGCFlow wrapper library
// Exposes the core components for the `bgcflow` binary and for testing

pub mod cli;
pub mod config;
pub mod external;
pub mod fs;
pub mod git;
pub mod metabase;
pub mod monitor;
pub mod projects;
pub mod prompt;
pub mod report;
pub mod results;
pub mod runner;
pub mod shutdown;
pub mod telemetry;
pub mod workflows;

// Re-export key types for easy access
pub use config::{config, WrapperConfig};
pub use external::{CommandError, CommandExecutor, Invocation, ProcessCommandExecutor, SnakemakeRun};
pub use git::{Git2Operations, GitError, GitOperations};
pub use metabase::{MetabaseClient, MetabaseError, MetabaseSync, SyncOptions};
pub use monitor::{MonitorError, MonitorHandle, PanoptesMonitor};
pub use projects::{NewProject, ProjectError, ProjectScaffolder};
pub use report::{ReportError, ReportOptions};
pub use results::{ResultCopier, ResultError};
pub use runner::{PipelineRunner, RunError, RunOptions};
pub use telemetry::{create_command_span, generate_correlation_id, init_telemetry};
pub use workflows::{PipelineCatalog, CatalogError};
