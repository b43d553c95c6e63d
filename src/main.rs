use anyhow::Result;
use bgcflow_wrapper::cli::commands::{
    build::BuildCommand, clone::CloneCommand, deploy::DeployCommand, get_result::GetResultCommand,
    init::InitCommand, pipelines::PipelinesCommand, run::RunCommand, serve::ServeCommand,
    show_getting_started, sync::SyncCommand, Command,
};
use bgcflow_wrapper::cli::{Cli, Commands};
use bgcflow_wrapper::config::{config, WrapperConfig};
use bgcflow_wrapper::runner::RunOptions;
use bgcflow_wrapper::telemetry::{create_command_span, generate_correlation_id, init_telemetry};
use clap::Parser;
use tracing::Instrument;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let observability = match config() {
        Ok(config) => config.observability.clone(),
        Err(e) => {
            eprintln!("WARNING: {e}. Using default settings.");
            WrapperConfig::default().observability
        }
    };
    if let Err(e) = init_telemetry(&observability) {
        eprintln!("WARNING: Failed to initialize logging: {e}");
    }

    if let Err(e) = dispatch(cli).await {
        eprintln!("ERROR: {e:#}");
        std::process::exit(1);
    }
}

fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Deploy { .. } => "deploy",
        Commands::Clone { .. } => "clone",
        Commands::Run { .. } => "run",
        Commands::Pipelines { .. } => "pipelines",
        Commands::Init { .. } => "init",
        Commands::GetResult { .. } => "get-result",
        Commands::Serve { .. } => "serve",
        Commands::Build { .. } => "build",
        Commands::Sync { .. } => "sync",
    }
}

async fn dispatch(cli: Cli) -> Result<()> {
    let Some(command) = cli.command else {
        // No subcommand: explain how to get started
        return show_getting_started().await;
    };

    let correlation_id = generate_correlation_id();
    let span = create_command_span(command_name(&command), &correlation_id);

    async move {
        match command {
            Commands::Deploy {
                destination,
                branch,
                tag,
            } => DeployCommand::new(destination, branch, tag).execute().await,
            Commands::Clone { destination, branch } => {
                CloneCommand::new(destination, branch).execute().await
            }
            Commands::Run {
                bgcflow_dir,
                workflow,
                wms_monitor,
                cores,
                dryrun,
                touch,
                unlock,
                until,
                monitor_off,
            } => {
                RunCommand::new(RunOptions {
                    bgcflow_dir,
                    workflow,
                    wms_monitor,
                    cores,
                    dryrun,
                    touch,
                    unlock,
                    until,
                    monitor_off,
                })
                .execute()
                .await
            }
            Commands::Pipelines {
                bgcflow_dir,
                describe,
                cite,
            } => PipelinesCommand::new(bgcflow_dir, describe, cite).execute().await,
            Commands::Init {
                bgcflow_dir,
                project,
                use_project_pipeline,
                prokka_db,
                gtdb_tax,
                samples_csv,
            } => {
                InitCommand {
                    bgcflow_dir,
                    project,
                    use_project_pipeline,
                    prokka_db,
                    gtdb_tax,
                    samples_csv,
                }
                .execute()
                .await
            }
            Commands::GetResult {
                project,
                copy,
                bgcflow_dir,
                copy_links,
            } => {
                GetResultCommand {
                    project,
                    copy,
                    bgcflow_dir,
                    copy_links,
                }
                .execute()
                .await
            }
            Commands::Serve {
                port,
                file_server,
                bgcflow_dir,
                metabase,
                project,
                yes,
            } => {
                ServeCommand {
                    port,
                    file_server,
                    bgcflow_dir,
                    metabase,
                    project,
                    yes,
                }
                .execute()
                .await
            }
            Commands::Build {
                bgcflow_dir,
                cores,
                dryrun,
            } => {
                BuildCommand {
                    bgcflow_dir,
                    cores,
                    dryrun,
                }
                .execute()
                .await
            }
            Commands::Sync {
                project,
                bgcflow_dir,
                dbt_dir,
                metabase_host,
                mb_username,
                mb_password,
                dbt_schema,
                dbt_database,
                metabase_https,
                metabase_database,
                dbt_excludes,
                yes,
            } => {
                SyncCommand {
                    project,
                    bgcflow_dir,
                    dbt_dir,
                    metabase_host,
                    mb_username,
                    mb_password,
                    dbt_schema,
                    dbt_database,
                    metabase_https,
                    metabase_database,
                    dbt_excludes,
                    yes,
                }
                .execute()
                .await
            }
        }
    }
    .instrument(span)
    .await
}
