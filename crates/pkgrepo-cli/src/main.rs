use std::{path::Path, process::ExitCode, sync::atomic::Ordering};

use clap::Parser;
use cli::{Args, Commands};
use logging::setup_logging;
use nu_ansi_term::Color::{Green, Yellow};
use pkgrepo_config::{generate_default_config, Config, ConflictPolicy};
use pkgrepo_core::{create_repo, ChannelProgress, CreateOptions, RepoSummary};
use pkgrepo_package::TarballReader;
use progress::spawn_progress_handler;
use tracing::{debug, info, warn};
use utils::{progress_enabled, Colored, COLOR, PROGRESS};

mod cli;
mod logging;
mod progress;
mod utils;

fn create(
    root: &Path,
    config_path: Option<&Path>,
    conflict_policy: Option<ConflictPolicy>,
) -> pkgrepo_core::Result<RepoSummary> {
    let config = Config::load(config_path)?;
    let mut options = CreateOptions::from_config(&config)?;
    if let Some(policy) = conflict_policy {
        options = options.with_conflict_policy(policy);
    }
    debug!(?options, "resolved options");

    if !progress_enabled() {
        return create_repo(root, &options, &TarballReader, None);
    }

    let (hook, receiver) = ChannelProgress::new();
    let guard = spawn_progress_handler(receiver);
    let result = create_repo(root, &options, &TarballReader, Some(&hook));

    // Dropping the hook closes the channel so the handler thread can drain and exit.
    drop(hook);
    guard.finish();
    progress::stop();

    result
}

fn report(summary: &RepoSummary) {
    let stats = &summary.stats;
    info!(
        "{} {} packages, {} dependencies, {} files",
        Colored(Green, "Cataloged"),
        stats.packages,
        stats.dependencies,
        stats.files
    );
    if stats.replaced_packages > 0 {
        info!("Replaced {} duplicate packages", stats.replaced_packages);
    }
    if stats.skipped_packages > 0 || stats.skipped_rows > 0 {
        warn!(
            "Skipped {} duplicate packages and {} duplicate rows",
            stats.skipped_packages, stats.skipped_rows
        );
    }
    if summary.failed > 0 {
        warn!(
            "{} of {} archives could not be read",
            Colored(Yellow, summary.failed),
            summary.scanned
        );
    }
}

fn handle_cli() -> pkgrepo_core::Result<()> {
    let args = Args::parse();

    if args.no_color {
        COLOR.store(false, Ordering::Relaxed);
    }
    if args.quiet || args.json {
        PROGRESS.store(false, Ordering::Relaxed);
    }

    setup_logging(&args);

    match args.command {
        Commands::Create {
            root,
            conflict_policy,
            no_progress,
        } => {
            if no_progress {
                PROGRESS.store(false, Ordering::Relaxed);
            }
            let summary = create(&root, args.config.as_deref(), conflict_policy)?;
            report(&summary);
        }
        Commands::DefConfig {
            output,
        } => {
            generate_default_config(&output)?;
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .build(),
        )
    }))
    .ok();

    match handle_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{:?}", miette::Report::new(err));
            ExitCode::FAILURE
        }
    }
}
