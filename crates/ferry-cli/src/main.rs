//! Ferry - Deployable & Channel propagation
//!
//! Usage:
//!   ferry check <deployable> <channel>     # Residency and promotion verdicts
//!   ferry family <deployable>              # Parent and existing projections
//!   ferry project <deployable> <channel>   # Build (or --apply) a projection
//!   ferry promote <deployable>             # Create missing projections
//!   ferry cleanup <channel>                # Retire a channel's deployables

use std::collections::HashSet;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ferry_core::config::{ConfigStore, FerryConfig, OutputFormat};
use ferry_core::error::FerryError;
use ferry_core::family::resolve_family;
use ferry_core::policy::{evaluate_promotion, evaluate_residency};
use ferry_core::projection::{cleanup, project};
use ferry_core::reconcile::{ChannelOutcome, PromotionReport, Reconciler};
use ferry_core::resource::{Channel, Deployable, ObjectKey};
use ferry_core::store::{DeployableStore, ManifestStore};

const DEFAULT_LOG_FILTER: &str = "ferry=info,warn";

#[derive(Parser)]
#[command(name = "ferry")]
#[command(about = "Deployable & Channel propagation", long_about = None)]
struct Cli {
    /// Path to ferry.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Manifest store (overrides the config file)
    #[arg(long, short, global = true)]
    manifest: Option<PathBuf>,

    /// Output format (overrides the config file)
    #[arg(long, short, global = true)]
    format: Option<FormatArg>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check whether a deployable resides in, or may be promoted to, a channel
    Check {
        /// Deployable (namespace/name)
        deployable: ObjectKey,
        /// Channel (namespace/name)
        channel: ObjectKey,
    },

    /// Show the parent and existing projections of a deployable
    Family {
        /// Deployable (namespace/name)
        deployable: ObjectKey,
        /// Channels to consider (defaults to every channel in the manifest)
        #[arg(long = "channel", value_name = "NAMESPACE/NAME")]
        channels: Vec<ObjectKey>,
    },

    /// Build the projection of a deployable into a channel
    Project {
        /// Deployable (namespace/name)
        deployable: ObjectKey,
        /// Channel (namespace/name)
        channel: ObjectKey,
        /// Store the projection instead of only printing it
        #[arg(long)]
        apply: bool,
    },

    /// Create missing projections of a deployable
    Promote {
        /// Deployable (namespace/name)
        deployable: ObjectKey,
        /// Channels to consider (defaults to every channel in the manifest)
        #[arg(long = "channel", value_name = "NAMESPACE/NAME")]
        channels: Vec<ObjectKey>,
    },

    /// Delete every deployable that declares a retired channel
    Cleanup {
        /// Channel (namespace/name)
        channel: ObjectKey,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    /// Human-readable table
    Table,
    /// Machine-readable JSON
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Table => OutputFormat::Table,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

struct Session {
    store: ManifestStore,
    format: OutputFormat,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_store = ConfigStore::discover(cli.config.as_deref())?;
    let config = config_store.load()?;

    init_tracing(&config);

    let manifest = cli
        .manifest
        .clone()
        .unwrap_or_else(|| config.manifest_path(config_store.base_dir()));
    let session = Session {
        store: ManifestStore::new(manifest),
        format: cli.format.map(Into::into).unwrap_or(config.output),
    };

    tracing::debug!(
        config = %config_store.config_path().display(),
        manifest = %session.store.path().display(),
        "Loaded configuration"
    );

    run_cli(cli.command, &session)
}

fn init_tracing(config: &FerryConfig) {
    let fallback = config
        .log_filter
        .clone()
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| fallback.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run_cli(command: Commands, session: &Session) -> Result<()> {
    match command {
        Commands::Check {
            deployable,
            channel,
        } => run_check(session, &deployable, &channel),
        Commands::Family {
            deployable,
            channels,
        } => run_family(session, &deployable, &channels),
        Commands::Project {
            deployable,
            channel,
            apply,
        } => run_project(session, &deployable, &channel, apply),
        Commands::Promote {
            deployable,
            channels,
        } => run_promote(session, &deployable, &channels),
        Commands::Cleanup { channel } => run_cleanup(session, &channel),
    }
}

fn load_deployable(session: &Session, key: &ObjectKey) -> Result<Deployable> {
    session
        .store
        .get(key)
        .with_context(|| format!("Failed to read manifest {}", session.store.path().display()))?
        .ok_or_else(|| anyhow::anyhow!("Deployable not found: {}", key))
}

fn load_channel(session: &Session, key: &ObjectKey) -> Result<Channel> {
    session
        .store
        .channel(key)
        .with_context(|| format!("Failed to read manifest {}", session.store.path().display()))?
        .ok_or_else(|| anyhow::anyhow!("Channel not found: {}", key))
}

/// Requested channels, or every channel in the manifest when none are given.
fn load_channels(session: &Session, keys: &[ObjectKey]) -> Result<Vec<Channel>> {
    if keys.is_empty() {
        return session
            .store
            .channels()
            .with_context(|| format!("Failed to read manifest {}", session.store.path().display()));
    }
    keys.iter().map(|key| load_channel(session, key)).collect()
}

fn run_check(session: &Session, deployable: &ObjectKey, channel: &ObjectKey) -> Result<()> {
    let deployable = load_deployable(session, deployable)?;
    let channel = load_channel(session, channel)?;

    let resident = evaluate_residency(Some(&deployable), Some(&channel));
    let promotable = evaluate_promotion(Some(&deployable), Some(&channel));

    match session.format {
        OutputFormat::Table => {
            println!("{:<12} {}", "deployable", deployable.key());
            println!("{:<12} {}", "channel", channel.key());
            println!("{:<12} {}", "in-channel", verdict(resident));
            println!("{:<12} {}", "to-channel", verdict(promotable));
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "deployable": deployable.key(),
                "channel": channel.key(),
                "in_channel": resident,
                "to_channel": promotable,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }
    Ok(())
}

fn verdict(allowed: bool) -> &'static str {
    if allowed { "allowed" } else { "denied" }
}

fn run_family(session: &Session, deployable: &ObjectKey, channels: &[ObjectKey]) -> Result<()> {
    let deployable = load_deployable(session, deployable)?;
    let namespaces: HashSet<String> = load_channels(session, channels)?
        .iter()
        .map(|c| c.namespace().to_string())
        .collect();

    let family = resolve_family(&session.store, &deployable, &namespaces)?;

    match session.format {
        OutputFormat::Table => {
            match &family.parent {
                Some(parent) => println!("Parent: {}", parent.key()),
                None => println!("Parent: -"),
            }
            if family.children.is_empty() {
                println!("No projections");
            } else {
                println!("{:<30} {}", "CHANNEL", "PROJECTION");
                for (channel, child) in &family.children {
                    println!("{:<30} {}", channel, child.key());
                }
            }
        }
        OutputFormat::Json => {
            let children: serde_json::Map<String, serde_json::Value> = family
                .children
                .iter()
                .map(|(channel, child)| (channel.clone(), serde_json::json!(child.key())))
                .collect();
            let output = serde_json::json!({
                "deployable": deployable.key(),
                "parent": family.parent.as_ref().map(Deployable::key),
                "children": children,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }
    Ok(())
}

fn run_project(
    session: &Session,
    deployable: &ObjectKey,
    channel: &ObjectKey,
    apply: bool,
) -> Result<()> {
    let deployable = load_deployable(session, deployable)?;
    let channel = load_channel(session, channel)?;

    let Some(projection) = project(Some(&deployable), &channel.key())? else {
        return Ok(());
    };

    let projection = if apply {
        let created = session
            .store
            .create(projection)
            .map_err(|e| FerryError::Store {
                context: format!("failed to store projection into {}", channel.key()),
                source: e,
            })?;
        tracing::info!(projection = %created.key(), "Stored projection");
        created
    } else {
        projection
    };

    match session.format {
        OutputFormat::Table => {
            let rendered = toml::to_string_pretty(&projection)
                .context("Failed to render projection")?;
            print!("{}", rendered);
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&projection)?),
    }
    Ok(())
}

fn run_promote(session: &Session, deployable: &ObjectKey, channels: &[ObjectKey]) -> Result<()> {
    let deployable = load_deployable(session, deployable)?;
    let channels = load_channels(session, channels)?;

    let reconciler = Reconciler::new(&session.store);
    let report = reconciler.promote(&deployable, &channels)?;

    match session.format {
        OutputFormat::Table => print_promotion_table(&report),
        OutputFormat::Json => {
            let outcomes: Vec<_> = report
                .outcomes
                .iter()
                .map(|(channel, outcome)| {
                    let (status, projection) = outcome_parts(outcome);
                    serde_json::json!({
                        "channel": channel,
                        "status": status,
                        "projection": projection,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&outcomes)?);
        }
    }
    Ok(())
}

fn outcome_parts(outcome: &ChannelOutcome) -> (&'static str, Option<&ObjectKey>) {
    match outcome {
        ChannelOutcome::Created(key) => ("created", Some(key)),
        ChannelOutcome::AlreadyPresent(key) => ("present", Some(key)),
        ChannelOutcome::Resident => ("resident", None),
        ChannelOutcome::Denied => ("denied", None),
    }
}

fn print_promotion_table(report: &PromotionReport) {
    if report.outcomes.is_empty() {
        println!("No channels to consider");
        return;
    }
    println!("{:<30} {:<10} {}", "CHANNEL", "STATUS", "PROJECTION");
    for (channel, outcome) in &report.outcomes {
        let (status, projection) = outcome_parts(outcome);
        let projection = projection.map(ToString::to_string).unwrap_or_else(|| "-".to_string());
        println!("{:<30} {:<10} {}", channel.to_string(), status, projection);
    }
}

fn run_cleanup(session: &Session, channel: &ObjectKey) -> Result<()> {
    let report = match cleanup(&session.store, channel) {
        Ok(report) => report,
        Err(FerryError::Cleanup(failures)) => {
            for (key, cause) in &failures.failures {
                eprintln!("✗ {}: {}", key, cause);
            }
            anyhow::bail!(
                "Cleanup of {} left {} deployable(s) behind",
                channel,
                failures.len()
            );
        }
        Err(e) => return Err(e.into()),
    };

    match session.format {
        OutputFormat::Table => {
            if report.deleted.is_empty() {
                println!("• Nothing to clean up for {}", channel);
            }
            for key in &report.deleted {
                println!("✓ Deleted {}", key);
            }
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "channel": channel,
                "deleted": report.deleted,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }
    Ok(())
}
