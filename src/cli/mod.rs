use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

#[derive(Parser)]
#[command(name = "bgcflow")]
#[command(version)]
#[command(about = "A snakemake wrapper and utility tools for BGCFlow")]
#[command(long_about = "A snakemake wrapper and utility tools for BGCFlow (https://github.com/NBChub/bgcflow). \
                       Clone BGCFlow with 'bgcflow clone', set up projects with 'bgcflow init' \
                       and run the pipelines with 'bgcflow run'.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// [EXPERIMENTAL] Deploy BGCFlow locally using snakedeploy
    Deploy {
        /// Path to deploy BGCFlow
        destination: PathBuf,
        #[arg(long, default_value = "main", help = "BGCFlow branch/release to use")]
        branch: String,
        #[arg(long, help = "BGCFlow release tag to deploy instead of a branch")]
        tag: Option<String>,
    },
    /// Get a clone of BGCFlow to local directory
    Clone {
        /// Path to clone BGCFlow
        destination: PathBuf,
        #[arg(long, default_value = "main", help = "BGCFlow branch. (DEFAULT: `main`)")]
        branch: String,
    },
    /// A snakemake CLI wrapper to run BGCFlow. Automatically runs panoptes
    Run {
        #[arg(long = "bgcflow_dir", default_value = ".", help = "Location of BGCFlow directory. (DEFAULT: Current working directory.)")]
        bgcflow_dir: PathBuf,
        #[arg(long, visible_alias = "snakefile", default_value = "workflow/Snakefile", help = "Snakefile to run: a workflow name or a path relative to the BGCFlow directory. (DEFAULT: workflow/Snakefile)")]
        workflow: String,
        #[arg(long = "wms-monitor", default_value = "http://127.0.0.1:5000", help = "Panoptes address. (DEFAULT: http://127.0.0.1:5000)")]
        wms_monitor: String,
        #[arg(short = 'c', long, default_value = "8", help = "Use at most N CPU cores/jobs in parallel. (DEFAULT: 8)")]
        cores: usize,
        #[arg(short = 'n', long, help = "Test run.")]
        dryrun: bool,
        #[arg(short = 't', long, help = "Touch output files (mark them up to date without really changing them).")]
        touch: bool,
        #[arg(long, help = "Remove a lock on the working directory.")]
        unlock: bool,
        #[arg(long, help = "Runs the pipeline until it reaches the specified rules or files.")]
        until: Option<String>,
        #[arg(long = "monitor-off", help = "Turn off Panoptes monitoring workflow.")]
        monitor_off: bool,
    },
    /// Get description of available pipelines from BGCFlow
    Pipelines {
        #[arg(long = "bgcflow_dir", default_value = ".", help = "Location of BGCFlow directory. (DEFAULT: Current working directory)")]
        bgcflow_dir: PathBuf,
        #[arg(long, help = "Get description of a given pipeline.")]
        describe: Option<String>,
        #[arg(long, help = "Get citation of a given pipeline.")]
        cite: Option<String>,
    },
    /// Create projects or initiate BGCFlow config. Use --project to create a new BGCFlow project
    Init {
        #[arg(long = "bgcflow_dir", default_value = ".", help = "Location of BGCFlow directory. (DEFAULT: Current working directory)")]
        bgcflow_dir: PathBuf,
        #[arg(long, help = "Initiate a new BGCFlow project. Insert project name: `bgcflow init --project <TEXT>`")]
        project: Option<String>,
        #[arg(long = "use_project_pipeline", requires = "project", help = "Generate pipeline selection template in PEP file instead of using Global pipelines.")]
        use_project_pipeline: bool,
        #[arg(long = "prokka_db", requires = "project", help = "Path to custom reference file.")]
        prokka_db: Option<PathBuf>,
        #[arg(long = "gtdb_tax", requires = "project", help = "Path to custom taxonomy file.")]
        gtdb_tax: Option<PathBuf>,
        #[arg(long = "samples_csv", requires = "project", help = "Path to samples file.")]
        samples_csv: Option<PathBuf>,
    },
    /// View a tree of a project results or get a copy using Rsync
    GetResult {
        /// Project name
        project: String,
        #[arg(long, help = "Destination path to copy results.")]
        copy: Option<PathBuf>,
        #[arg(long = "bgcflow_dir", default_value = ".", help = "Location of BGCFlow directory. (DEFAULT: Current working directory)")]
        bgcflow_dir: PathBuf,
        #[arg(long = "copy-links", help = "Resolve symlinks as file/folders.")]
        copy_links: bool,
    },
    /// Serve static HTML report or other utilities (Metabase, etc.)
    Serve {
        #[arg(long, default_value = "8001", help = "Port to use. (DEFAULT: 8001)")]
        port: u16,
        #[arg(long = "file_server", default_value = "http://localhost:8002", help = "Address of the file server. (DEFAULT: http://localhost:8002)")]
        file_server: String,
        #[arg(long = "bgcflow_dir", default_value = ".", help = "Location of BGCFlow directory. (DEFAULT: Current working directory)")]
        bgcflow_dir: PathBuf,
        #[arg(long, help = "Run Metabase server at http://localhost:3000. Requires Java to be installed.")]
        metabase: bool,
        #[arg(long, help = "Name of the project, or `snakemake_report` for the Snakemake run summary.")]
        project: Option<String>,
        #[arg(short = 'y', long, help = "Overwrite existing report files without asking")]
        yes: bool,
    },
    /// Use DBT to build DuckDB database from BGCFlow results
    Build {
        #[arg(long = "bgcflow_dir", default_value = ".", help = "Location of BGCFlow directory. (DEFAULT: Current working directory.)")]
        bgcflow_dir: PathBuf,
        #[arg(short = 'c', long, default_value = "8", help = "Use at most N CPU cores/jobs in parallel. (DEFAULT: 8)")]
        cores: usize,
        #[arg(short = 'n', long, help = "Test run.")]
        dryrun: bool,
    },
    /// Upload a project's DuckDB database to Metabase and sync its dbt models
    Sync {
        /// Project name
        project: String,
        #[arg(long = "bgcflow_dir", default_value = ".", help = "Location of BGCFlow directory. (DEFAULT: Current working directory)")]
        bgcflow_dir: PathBuf,
        #[arg(long = "dbt_dir", help = "dbt project directory. (DEFAULT: derived from the project results)")]
        dbt_dir: Option<PathBuf>,
        #[arg(long = "metabase_host", help = "Metabase URL. (DEFAULT: http://localhost:3000)")]
        metabase_host: Option<String>,
        #[arg(long = "mb_username", help = "Metabase username. Prompted when missing.")]
        mb_username: Option<String>,
        #[arg(long = "mb_password", help = "Metabase password. Prompted when missing.")]
        mb_password: Option<String>,
        #[arg(long = "dbt_schema", default_value = "main", help = "dbt schema. (DEFAULT: main)")]
        dbt_schema: String,
        #[arg(long = "dbt_database", default_value = "dbt_bgcflow", help = "dbt database. (DEFAULT: dbt_bgcflow)")]
        dbt_database: String,
        #[arg(long = "metabase_https", help = "Connect to Metabase with HTTPS instead of HTTP")]
        metabase_https: bool,
        #[arg(long = "metabase_database", help = "Metabase database name. (DEFAULT: project name)")]
        metabase_database: Option<String>,
        #[arg(long = "dbt_excludes", num_args = 1.., help = "Additional dbt models to leave out of the sync")]
        dbt_excludes: Vec<String>,
        #[arg(short = 'y', long, help = "Update an existing Metabase database without asking")]
        yes: bool,
    },
}
