//! txflow - replay transaction plans through the transaction engine
//!
//! Loads a plan, registers its apps with a `Transaction`, runs it through the
//! scripted runner and reports what happened to every app.

mod cli;
mod display;
mod error;
mod events;
mod logging;
mod report;

use crate::cli::{Cli, Commands};
use crate::display::OutputRenderer;
use crate::error::CliError;
use crate::events::EventHandler;
use crate::report::{CommandResult, InspectReport, RunReport};
use clap::Parser;
use std::path::Path;
use std::process;
use txflow_config::Config;
use txflow_events::{EventReceiver, EventSender};
use txflow_transaction::sim::Plan;
use txflow_transaction::{Transaction, TransactionOptions};
use txflow_types::{ColorChoice, OutputFormat};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Parse command line arguments first to check for JSON mode
    let cli = Cli::parse();
    let json_mode = cli.global.json;

    init_tracing(json_mode, cli.global.debug);

    if let Err(e) = run(cli).await {
        error!("Application error: {}", e);
        if !json_mode {
            eprintln!("Error: {e}");
        }
        process::exit(1);
    }
}

/// Main application logic
async fn run(cli: Cli) -> Result<(), CliError> {
    info!("Starting txflow v{}", env!("CARGO_PKG_VERSION"));

    // defaults, then file, then environment, then flags
    let mut config = Config::load_or_default(cli.global.config.as_deref()).await?;
    config.merge_env()?;
    apply_cli_config(&mut config, &cli.global, &cli.command);

    let json_output = config.general.default_output == OutputFormat::Json;
    let renderer = OutputRenderer::new(json_output, config.general.color);

    let colors_enabled = match config.general.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => console::Term::stderr().features().colors_supported(),
    };
    let event_handler = EventHandler::new(colors_enabled, cli.global.debug, json_output);

    let (event_sender, event_receiver) = txflow_events::channel();
    let result = execute_command_with_events(
        cli.command,
        &config,
        event_sender,
        event_receiver,
        event_handler,
    )
    .await?;

    renderer.render_result(&result)?;

    if let Some(failure) = result.into_failure() {
        return Err(failure.into());
    }

    info!("Command completed successfully");
    Ok(())
}

/// Execute a command while a background task drains its events
async fn execute_command_with_events(
    command: Commands,
    config: &Config,
    event_sender: EventSender,
    mut event_receiver: EventReceiver,
    mut event_handler: EventHandler,
) -> Result<CommandResult, CliError> {
    let events = tokio::spawn(async move {
        while let Some(message) = event_receiver.recv().await {
            event_handler.handle_event(message);
        }
    });

    // The transaction runs on this thread; its sender is dropped when it
    // finishes, which closes the channel and ends the drain task.
    let result = execute_command(command, config, event_sender).await;

    if let Err(e) = events.await {
        error!("Event handler stopped unexpectedly: {}", e);
    }
    result
}

/// Execute the specified command
async fn execute_command(
    command: Commands,
    config: &Config,
    event_sender: EventSender,
) -> Result<CommandResult, CliError> {
    match command {
        Commands::Run { plan, .. } => {
            let report = run_plan(&plan, config, event_sender).await?;
            Ok(CommandResult::Run(report))
        }
        Commands::Inspect { plan } => {
            let runner = Plan::load(&plan).await?.into_runner()?;
            Ok(CommandResult::Inspect(InspectReport::from_graph(
                runner.plan_graph(),
            )))
        }
    }
}

/// Replay a plan file through a fresh transaction
async fn run_plan(
    path: &Path,
    config: &Config,
    event_sender: EventSender,
) -> Result<RunReport, CliError> {
    let plan = Plan::load(path).await?;
    let apps = plan.build_apps()?;
    let runner = plan.into_runner()?;

    let options = TransactionOptions::from(&config.transaction);
    let mut transaction = Transaction::new(runner, options).with_event_sender(event_sender);
    for app in &apps {
        transaction.add_app(app);
    }

    let outcome = transaction.run();
    let error_operation = transaction.error_operation();
    Ok(RunReport::new(
        transaction.runner(),
        &apps,
        outcome,
        error_operation,
    ))
}

/// Initialize tracing/logging
fn init_tracing(json_mode: bool, debug_enabled_flag: bool) {
    let debug_enabled = std::env::var("RUST_LOG").is_ok() || debug_enabled_flag;

    if debug_enabled {
        // Debug mode: structured JSON logs to file
        let log_dir = Config::log_dir();
        if let Err(e) = std::fs::create_dir_all(&log_dir) {
            if !json_mode {
                eprintln!("Warning: Failed to create log directory: {e}");
            }
        }

        let log_file = log_dir.join(format!(
            "txflow-{}.log",
            chrono::Utc::now().format("%Y%m%d-%H%M%S")
        ));

        match std::fs::File::create(&log_file) {
            Ok(file) => {
                tracing_subscriber::fmt()
                    .json()
                    .with_writer(file)
                    .with_env_filter(
                        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(
                            |_| tracing_subscriber::EnvFilter::new("info,txflow=trace"),
                        ),
                    )
                    .init();

                if !json_mode {
                    eprintln!("Debug logging enabled: {}", log_file.display());
                }
                return;
            }
            Err(e) => {
                if !json_mode {
                    eprintln!("Warning: Failed to create log file: {e}");
                }
            }
        }
    }

    if json_mode {
        // JSON mode: keep stderr clean
        tracing_subscriber::fmt()
            .with_writer(std::io::sink)
            .with_env_filter("off")
            .init();
    } else {
        // Normal mode: minimal logging to stderr
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn,txflow::events=off")),
            )
            .init();
    }
}

/// Apply CLI configuration overrides (highest precedence)
fn apply_cli_config(config: &mut Config, global: &cli::GlobalArgs, command: &Commands) {
    if global.json {
        config.general.default_output = OutputFormat::Json;
    }
    if let Some(color) = global.color {
        config.general.color = color;
    }

    if let Commands::Run {
        keep_going,
        no_deploy,
        ..
    } = command
    {
        if *keep_going {
            config.transaction.stop_on_first_error = false;
        }
        if *no_deploy {
            config.transaction.no_deploy = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::parse_from([
            "txflow",
            "--json",
            "--color",
            "always",
            "run",
            "plan.toml",
            "--keep-going",
            "--no-deploy",
        ]);
        let mut config = Config::default();
        apply_cli_config(&mut config, &cli.global, &cli.command);

        assert_eq!(config.general.default_output, OutputFormat::Json);
        assert_eq!(config.general.color, ColorChoice::Always);
        assert!(!config.transaction.stop_on_first_error);
        assert!(config.transaction.no_deploy);
    }

    #[test]
    fn test_inspect_leaves_transaction_config_alone() {
        let cli = Cli::parse_from(["txflow", "inspect", "plan.toml"]);
        let mut config = Config::default();
        apply_cli_config(&mut config, &cli.global, &cli.command);

        assert!(config.transaction.stop_on_first_error);
        assert!(!config.transaction.no_deploy);
    }

    #[tokio::test]
    async fn test_run_plan_installs_apps() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plan.toml");
        std::fs::write(
            &path,
            r#"
[[apps]]
reference = "app/org.example.App/x86_64/stable"
state = "available"

[[operations]]
reference = "app/org.example.App/x86_64/stable"
kind = "install"
download_size = 100
"#,
        )
        .unwrap();

        let (sender, mut receiver) = txflow_events::channel();
        let report = run_plan(&path, &Config::default(), sender).await.unwrap();

        assert!(report.success);
        assert_eq!(report.apps.len(), 1);
        assert_eq!(report.apps[0].state, txflow_types::AppState::Installed);
        assert!(receiver.try_recv().is_ok());
    }
}
