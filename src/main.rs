use anyhow::Result;
use clap::Parser;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use gitflow_release::build::SystemRunner;
use gitflow_release::config::{self, Config};
use gitflow_release::event;
use gitflow_release::gateway::{GhGateway, RepoSlug};
use gitflow_release::ui;
use gitflow_release::workflow::{Dispatcher, RunContext};

#[derive(clap::Parser)]
#[command(
    name = "gitflow-release",
    about = "Automate git-flow merges, tags and releases when a pull request is approved"
)]
struct Args {
    #[arg(short, long, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(short, long, help = "Pull request event payload (defaults to $GITHUB_EVENT_PATH)")]
    event: Option<PathBuf>,

    #[arg(long, help = "Branch being merged (overrides the event)")]
    current: Option<String>,

    #[arg(long, help = "Branch being merged into (overrides the event)")]
    target: Option<String>,

    #[arg(long, help = "Hosted repository as owner/name")]
    repo: Option<String>,

    #[arg(long, default_value = ".", help = "Local checkout the release build runs in")]
    project_dir: PathBuf,

    #[arg(long, help = "Show which workflow would run without changing anything")]
    dry_run: bool,

    #[arg(short, long, help = "Enable debug logging")]
    verbose: bool,
}

/// Initialize logging with RUST_LOG environment variable support
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = match config::load_config(args.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            ui::display_error(&format!("Error loading config: {}", e));
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&args, &config) {
        tracing::error!(error = %e, "run failed");
        ui::display_error(&e.to_string());
        std::process::exit(1);
    }

    Ok(())
}

fn run(args: &Args, config: &Config) -> gitflow_release::Result<()> {
    let event_path = args.event.clone().or_else(event::event_path_from_env);
    let branches = event::resolve_branches(
        &config.branches,
        args.current.clone(),
        args.target.clone(),
        event_path.as_deref(),
    )?;

    let dispatcher = Dispatcher::default();
    let workflow = dispatcher.select(&branches, &config.prefixes)?;
    ui::display_selection(workflow, &branches);

    if args.dry_run {
        ui::display_status("Dry run: no changes made");
        return Ok(());
    }

    let slug = RepoSlug::resolve(
        args.repo.as_deref(),
        config.repository.as_deref(),
        &args.project_dir,
    )?;
    ui::display_success(&format!("Using repository {}", slug));

    let gateway = GhGateway::new(SystemRunner, slug);
    let runner = SystemRunner;
    let ctx = RunContext {
        branches: &branches,
        prefixes: &config.prefixes,
        build: &config.build,
        gateway: &gateway,
        runner: &runner,
        project_dir: &args.project_dir,
    };

    let (workflow, commit) = dispatcher.dispatch(&ctx)?;
    ui::display_result(workflow, &commit);
    Ok(())
}
