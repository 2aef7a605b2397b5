//! CLI entrypoint for tandem
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tandem_application::{
    CastVoteInput, CastVoteUseCase, ChangeNotifier, CompositeNotifier, CreateDecisionInput,
    CreateDecisionUseCase, DecisionStore, DeleteDecisionUseCase, GetDecisionUseCase, VoteLedger,
};
use tandem_domain::{DecisionId, OutputFormat, StorageBackend};
use tandem_infrastructure::{
    BroadcastNotifier, ConfigLoader, FileConfig, InMemoryDecisionStore, JsonlChangeJournal,
    SqliteDecisionStore,
};
use tandem_presentation::{Cli, Command, ConsoleFormatter};
use tokio::sync::broadcast::Receiver;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // === Configuration ===
    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref())
            .map_err(|e| anyhow!("failed to load configuration: {}", e))?
    };

    if cli.show_config {
        for line in ConfigLoader::describe_sources(cli.config.as_deref()) {
            println!("{}", line);
        }
        println!();
        println!("{}", toml::to_string_pretty(&config)?);
        print!("{}", ConsoleFormatter::format_config_issues(&config.validate()));
        return Ok(());
    }

    let issues = config.validate();
    eprint!("{}", ConsoleFormatter::format_config_issues(&issues));
    if issues.iter().any(|issue| issue.is_error()) {
        bail!("configuration has errors");
    }

    if !config.output.color {
        colored::control::set_override(false);
    }
    let format = cli
        .output
        .map(OutputFormat::from)
        .or(config.output.format)
        .unwrap_or_default();

    let Some(command) = cli.command else {
        bail!("No command given. Run `tandem --help` for usage.");
    };

    // === Dependency Injection ===
    let broadcast = Arc::new(BroadcastNotifier::new(config.notifications.capacity().0));
    let events = broadcast.subscribe();
    let mut notifier = CompositeNotifier::default().with(broadcast);
    if let Some(path) = &config.notifications.journal
        && let Some(journal) = JsonlChangeJournal::open(path)
    {
        info!("Journaling changes to {}", journal.path().display());
        notifier = notifier.with(Arc::new(journal));
    }
    let notifier: Arc<dyn ChangeNotifier> = Arc::new(notifier);

    let (backend, _) = config.storage.parse_backend();
    match backend {
        StorageBackend::Sqlite => {
            let path = config
                .storage
                .resolve_path()
                .0
                .context("no SQLite database path available")?;
            let store = open_sqlite(&path)?;
            run(Arc::new(store), command, &config, notifier, format).await?;
        }
        StorageBackend::Memory => {
            warn!("Using the memory backend; nothing is kept after this command");
            run(
                Arc::new(InMemoryDecisionStore::new()),
                command,
                &config,
                notifier,
                format,
            )
            .await?;
        }
    }

    log_events(events);
    Ok(())
}

fn open_sqlite(path: &Path) -> Result<SqliteDecisionStore> {
    info!("Opening SQLite store {}", path.display());
    SqliteDecisionStore::open(path)
        .with_context(|| format!("cannot open database {}", path.display()))
}

async fn run<S: DecisionStore + 'static>(
    store: Arc<S>,
    command: Command,
    config: &FileConfig,
    notifier: Arc<dyn ChangeNotifier>,
    format: OutputFormat,
) -> Result<()> {
    let output = match command {
        Command::Create {
            kind,
            title,
            creator,
            partner,
            options,
        } => {
            let created = CreateDecisionUseCase::new(store)
                .with_notifier(notifier)
                .execute(
                    CreateDecisionInput::new(kind.into(), title, creator, partner)
                        .with_options(options),
                )
                .await?;
            render(format, &created, ConsoleFormatter::format_created)
        }
        Command::Vote {
            decision,
            user,
            option,
        } => {
            let cast = CastVoteUseCase::new(store)
                .with_config(config.engine.to_engine_config())
                .with_notifier(notifier)
                .execute(CastVoteInput::new(decision, user, option))
                .await?;
            render(format, &cast, ConsoleFormatter::format_vote)
        }
        Command::Show { decision } => {
            let snapshot = GetDecisionUseCase::new(store)
                .execute(&DecisionId::new(decision))
                .await?;
            render(format, &snapshot, ConsoleFormatter::format_snapshot)
        }
        Command::Votes { decision, round } => {
            let votes = VoteLedger::new(store)
                .list_votes(&DecisionId::new(decision), round)
                .await?;
            render(format, &votes, |v: &Vec<_>| ConsoleFormatter::format_votes(v))
        }
        Command::Delete { decision } => {
            let id = DecisionId::new(decision);
            DeleteDecisionUseCase::new(store)
                .with_notifier(notifier)
                .execute(&id)
                .await?;
            render(format, &serde_json::json!({ "deleted": &id }), |_| {
                ConsoleFormatter::format_deleted(&id)
            })
        }
    };

    print!("{}", output);
    Ok(())
}

fn render<T, F>(format: OutputFormat, value: &T, text: F) -> String
where
    T: Serialize,
    F: FnOnce(&T) -> String,
{
    match format {
        OutputFormat::Text => text(value),
        OutputFormat::Json => format!("{}\n", ConsoleFormatter::format_json(value)),
    }
}

/// Everything published during this invocation, at debug level.
fn log_events(mut events: Receiver<tandem_application::ChangeEvent>) {
    while let Ok(event) = events.try_recv() {
        debug!(
            "change: {} on {:?} {}",
            event.kind.as_str(),
            event.topic,
            event.topic.decision_id()
        );
    }
}
