use anyhow::Result;

pub mod build;
pub mod clone;
pub mod deploy;
pub mod get_result;
pub mod init;
pub mod pipelines;
pub mod run;
pub mod serve;
pub mod sync;

#[allow(async_fn_in_trait)]
pub trait Command {
    async fn execute(&self) -> Result<()>;
}

pub const MISSING_BGCFLOW_DIR: &str = "ERROR: Cannot find BGCFlow directory.\n\
Point to the right directory using `--bgcflow_dir <destination>` or clone BGCFlow using `bgcflow clone <destination>`.";

pub async fn show_getting_started() -> Result<()> {
    println!("BGCFlow - a snakemake wrapper and utility tools for BGCFlow");
    println!();
    println!("To get started:");
    println!("  bgcflow clone <destination>     # Get a copy of BGCFlow");
    println!("  bgcflow init                    # Generate the config and list projects");
    println!("  bgcflow init --project <name>   # Scaffold a new project");
    println!("  bgcflow run -n                  # Dry run the main workflow");
    println!();
    println!("Explore results:");
    println!("  bgcflow pipelines               # List available pipelines");
    println!("  bgcflow get-result <project>    # List or copy a project's results");
    println!("  bgcflow serve --project <name>  # Serve a project report");
    println!("  bgcflow build                   # Build the DuckDB database");
    println!("  bgcflow sync <project>          # Upload the database to Metabase");
    println!();
    println!("Run 'bgcflow --help' for every option.");
    Ok(())
}
