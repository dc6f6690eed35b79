//! kernsweep
//!
//! Removes the oldest unused Linux kernel on Debian-family systems, keeping
//! the running kernel and at least one fallback

use std::path::PathBuf;

use clap::Parser;
use color_eyre::{Result, Section, SectionExt};
use kernsweep_core::{
    Context, KernelError, RemovalPlan, RemovalWorkflow, StdinConfirmer, WorkflowOutcome, status,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod config;
mod factory;

use config::Config;

/// Remove the oldest unused Linux kernel
#[derive(Parser, Debug)]
#[command(name = "kernsweep", version, about)]
struct Args {
    /// Enable informational logging
    #[arg(short, long)]
    verbose: bool,

    /// Show the removal plan without executing it
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Print installed kernels and the removal candidate, then exit
    #[arg(short, long)]
    status: bool,

    /// Print the status report as JSON
    #[arg(long, requires = "status")]
    json: bool,

    /// Configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl Args {
    /// Only a real removal needs root
    fn requires_root(&self) -> bool {
        !self.dry_run && !self.status
    }
}

fn init_tracing(verbose: bool, config: &Config) {
    let default_level = if verbose { "info" } else { config.log_level.as_str() };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn check_privileges(args: &Args) -> Result<()> {
    if args.requires_root() && !nix::unistd::geteuid().is_root() {
        return Err::<(), _>(KernelError::Privilege(
            "removing kernels requires root".to_string(),
        ))
        .suggestion("run with sudo, or use --dry-run / --status");
    }
    Ok(())
}

fn print_plan(plan: &RemovalPlan) {
    println!("Packages to purge:");
    for pkg in &plan.group.packages {
        println!("  - {pkg}");
    }
}

fn report_outcome(outcome: &WorkflowOutcome) {
    match outcome {
        WorkflowOutcome::NothingToRemove => println!("No old kernel to remove."),
        WorkflowOutcome::DryRun(plan) => {
            println!("Oldest removable kernel: {}", plan.group.version);
            print_plan(plan);
            println!("Dry run: nothing was removed and the bootloader was not updated.");
        }
        WorkflowOutcome::Aborted(plan) => {
            println!(
                "Removal of kernel {} aborted; nothing was changed.",
                plan.group.version
            );
        }
        WorkflowOutcome::Removed(plan) => {
            println!("Kernel {} removed.", plan.group.version);
            println!("Reboot recommended to finalise the changes.");
        }
    }
}

async fn run(args: &Args, config: &Config) -> Result<()> {
    let host = factory::create_host(config)?;

    let ctx = if args.status {
        Context::discover_for_status(host.as_ref()).await?
    } else {
        Context::discover(host.as_ref()).await?
    };
    let ctx = ctx.with_verbose(args.verbose).with_dry_run(args.dry_run);

    info!(running = %ctx.current(), "starting kernel cleanup");

    if args.status {
        let report = status(&ctx, host.as_ref()).await?;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            print!("{}", report.render(ctx.verbose));
        }
        return Ok(());
    }

    let confirmer = StdinConfirmer;
    let mut workflow = RemovalWorkflow::new(&ctx, host.as_ref(), &confirmer);

    match workflow.run().await {
        Ok(outcome) => {
            report_outcome(&outcome);
            Ok(())
        }
        Err(e) => {
            let removed = e.removed_packages().join("\n");
            let result: Result<()> = Err(e.into());
            if removed.is_empty() {
                result
            } else {
                result.with_section(move || removed.header("Packages already removed:"))
            }
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    let args = Args::parse();

    let (config, config_path) = Config::load_default(args.config.as_deref())?;
    init_tracing(args.verbose, &config);
    debug!(path = ?config_path, "configuration loaded");

    // Partially applied changes stay applied
    ctrlc::set_handler(|| {
        eprintln!("\n\n{}", KernelError::UserAbort);
        std::process::exit(1);
    })?;

    check_privileges(&args)?;

    run(&args, &config).await
}
