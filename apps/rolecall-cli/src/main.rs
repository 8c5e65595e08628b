use clap::Parser;
use std::path::Path;
use tracing::info;
use tracing_subscriber::EnvFilter;

use rolecall_engine::EngineConfig;

mod cli;
mod error;
mod metrics;
mod output;
mod runner;
mod script;

use cli::{Cli, Command, Format};
use error::CliError;
use runner::Runner;
use script::Script;

async fn cmd_run(format: Format, path: &Path, with_metrics: bool) -> Result<(), CliError> {
    let script = Script::load(path)?;
    script.check()?;

    let handle = if with_metrics {
        Some(metrics::init_metrics()?)
    } else {
        None
    };

    let config = EngineConfig::from_env()?;
    info!(
        feed_capacity = config.feed_capacity,
        max_invitations_per_role = ?config.max_invitations_per_role,
        "Starting scenario {}",
        path.display()
    );

    let mut runner = Runner::new(&config);
    runner.register(&script.members).await?;
    runner
        .run(&script.steps, |step| output::print_step(format, step))
        .await?;
    output::print_mailboxes(format, &runner.mailboxes());

    if let Some(handle) = handle {
        println!();
        print!("{}", handle.render());
    }
    Ok(())
}

fn cmd_check(path: &Path) -> Result<(), CliError> {
    let script = Script::load(path)?;
    script.check()?;
    println!(
        "✓ {}: {} member(s), {} step(s)",
        path.display(),
        script.members.len(),
        script.steps.len()
    );
    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match &cli.command {
        Command::Run { script, metrics } => cmd_run(cli.format, script, *metrics).await,
        Command::Check { script } => cmd_check(script),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
