//! influxdb3-provider: drive the InfluxDB V3 provider from the command line
//!
//! Each invocation configures the provider from flags, environment and the
//! profile file, runs one resource or data source operation on JSON
//! documents and prints the resulting state.

use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use influxdb3_provider::output::{OutputFormat, print_output};
use influxdb3_provider::{Diagnostics, InfluxDbProvider, ProviderOptions, Schema};
use serde_json::{Value, json};
use tracing::debug;
use tracing_subscriber::prelude::*;

/// Manage InfluxDB V3 databases and tokens through the provider interface
#[derive(Parser, Debug)]
#[command(name = "influxdb3-provider")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Account ID (falls back to INFLUXDB3_ACCOUNT_ID, then the profile)
    #[arg(long, global = true)]
    account_id: Option<String>,

    /// Cluster ID (falls back to INFLUXDB3_CLUSTER_ID, then the profile)
    #[arg(long, global = true)]
    cluster_id: Option<String>,

    /// Management token (falls back to INFLUXDB3_TOKEN, then the profile)
    #[arg(long, global = true)]
    token: Option<String>,

    /// Console URL (falls back to INFLUXDB3_URL, the profile, then the default console)
    #[arg(long, global = true)]
    url: Option<String>,

    /// Profile to read settings from
    #[arg(long, short, global = true, env = "INFLUXDB3_PROFILE")]
    profile: Option<String>,

    /// Path to an alternate profile file
    #[arg(long, global = true, env = "INFLUXDB3_CONFIG_FILE")]
    config_file: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'o', global = true, value_enum, default_value = "json")]
    output: OutputFormat,

    /// Print sensitive attributes instead of masking them
    #[arg(long, global = true)]
    show_sensitive: bool,

    /// Enable verbose logging
    #[arg(long, short, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print provider, resource and data source schemas
    Schema,

    /// Run an operation on a managed resource
    Resource {
        /// Resource type, e.g. influxdb3_database
        type_name: String,

        #[command(subcommand)]
        action: ResourceAction,
    },

    /// Read a data source
    Data {
        /// Data source type, e.g. influxdb3_tokens
        type_name: String,

        /// Configuration document (path or `-` for stdin); defaults to `{}`
        #[arg(long)]
        input: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum ResourceAction {
    /// Validate, plan and create from a configuration document
    Create {
        #[arg(long)]
        input: String,
    },
    /// Refresh a state document
    Read {
        #[arg(long)]
        input: String,
    },
    /// Plan and apply an in-place update
    Update {
        /// New configuration document
        #[arg(long)]
        input: String,
        /// Current state document
        #[arg(long)]
        prior: String,
    },
    /// Delete the object behind a state document
    Delete {
        #[arg(long)]
        input: String,
    },
    /// Import an existing object by its id (database name or token id)
    Import { id: String },
    /// Show the planned state without applying it
    Plan {
        #[arg(long)]
        input: String,
        #[arg(long)]
        prior: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let provider = InfluxDbProvider::new(env!("CARGO_PKG_VERSION")).with_options(ProviderOptions {
        profile: cli.profile.clone(),
        config_file: cli.config_file.clone(),
    });

    match &cli.command {
        Command::Schema => {
            print_output(&provider.provider_schema(), cli.output)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Resource { type_name, action } => {
            configure(&provider, &cli).await?;
            run_resource(&provider, &cli, type_name, action).await
        }
        Command::Data { type_name, input } => {
            configure(&provider, &cli).await?;
            run_data_source(&provider, &cli, type_name, input.as_deref()).await
        }
    }
}

fn init_tracing(verbose: u8) {
    // RUST_LOG wins over the verbosity flag
    let filter = if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::EnvFilter::from_default_env()
    } else {
        let level = match verbose {
            0 => "influxdb3_provider=warn,influxdb3_core=warn",
            1 => "influxdb3_provider=info,influxdb3_core=info",
            2 => "influxdb3_provider=debug,influxdb3_core=debug",
            _ => "influxdb3_provider=trace,influxdb3_core=trace",
        };
        tracing_subscriber::EnvFilter::new(level)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .compact(),
        )
        .init();

    debug!("Tracing initialized with verbosity level: {}", verbose);
}

async fn configure(provider: &InfluxDbProvider, cli: &Cli) -> Result<()> {
    let config = json!({
        "account_id": cli.account_id,
        "cluster_id": cli.cluster_id,
        "token": cli.token,
        "url": cli.url,
    });
    let diags = provider.configure(&config).await;
    report(&diags);
    if diags.has_errors() {
        anyhow::bail!("provider configuration failed");
    }
    Ok(())
}

/// Result of one operation: a state document to print, or diagnostics
type Outcome = std::result::Result<Option<Value>, Diagnostics>;

async fn run_resource(
    provider: &InfluxDbProvider,
    cli: &Cli,
    type_name: &str,
    action: &ResourceAction,
) -> Result<ExitCode> {
    let outcome = resource_outcome(provider, cli, type_name, action).await?;
    finish(outcome, cli.output)
}

async fn resource_outcome(
    provider: &InfluxDbProvider,
    cli: &Cli,
    type_name: &str,
    action: &ResourceAction,
) -> Result<Outcome> {
    let resource = match provider.resource(type_name) {
        Ok(r) => r,
        Err(e) => return Ok(Err(e.into())),
    };
    let schema = resource.schema();

    let outcome: Outcome = match action {
        ResourceAction::Create { input } => {
            let config = read_document(input)?;
            let diags = resource.validate(&config);
            if diags.has_errors() {
                Err(diags)
            } else {
                report(&diags);
                let plan = resource.plan(None, &config);
                resource
                    .create(&plan.planned_state)
                    .await
                    .map(Some)
                    .map_err(Into::into)
            }
        }
        ResourceAction::Read { input } => {
            let state = read_document(input)?;
            resource.read(&state).await.map(Some).map_err(Into::into)
        }
        ResourceAction::Update { input, prior } => {
            let config = read_document(input)?;
            let prior = read_document(prior)?;
            let diags = resource.validate(&config);
            if diags.has_errors() {
                Err(diags)
            } else {
                report(&diags);
                let plan = resource.plan(Some(&prior), &config);
                if plan.requires_replace.is_empty() {
                    resource
                        .update(&plan.planned_state, &prior)
                        .await
                        .map(Some)
                        .map_err(Into::into)
                } else {
                    let mut diags = Diagnostics::new();
                    diags.add_error(
                        "Resource Requires Replacement",
                        format!(
                            "Changing {} cannot be done in place. Delete the resource and create it again.",
                            plan.requires_replace.join(", ")
                        ),
                    );
                    Err(diags)
                }
            }
        }
        ResourceAction::Delete { input } => {
            let state = read_document(input)?;
            resource
                .delete(&state)
                .await
                .map(|()| None)
                .map_err(Into::into)
        }
        ResourceAction::Import { id } => resource
            .import_state(id)
            .await
            .map(Some)
            .map_err(Into::into),
        ResourceAction::Plan { input, prior } => {
            let config = read_document(input)?;
            let prior = prior.as_deref().map(read_document).transpose()?;
            let diags = resource.validate(&config);
            if diags.has_errors() {
                Err(diags)
            } else {
                report(&diags);
                let mut plan = resource.plan(prior.as_ref(), &config);
                if !cli.show_sensitive {
                    plan.planned_state = schema.redact(&plan.planned_state);
                }
                return Ok(Ok(Some(serde_json::to_value(&plan)?)));
            }
        }
    };

    Ok(redact(outcome, &schema, cli.show_sensitive))
}

async fn run_data_source(
    provider: &InfluxDbProvider,
    cli: &Cli,
    type_name: &str,
    input: Option<&str>,
) -> Result<ExitCode> {
    let outcome = data_source_outcome(provider, cli, type_name, input).await?;
    finish(outcome, cli.output)
}

async fn data_source_outcome(
    provider: &InfluxDbProvider,
    cli: &Cli,
    type_name: &str,
    input: Option<&str>,
) -> Result<Outcome> {
    let data_source = match provider.data_source(type_name) {
        Ok(d) => d,
        Err(e) => return Ok(Err(e.into())),
    };
    let schema = data_source.schema();

    let config = match input {
        Some(path) => read_document(path)?,
        None => json!({}),
    };
    let diags = data_source.validate(&config);
    let outcome = if diags.has_errors() {
        Err(diags)
    } else {
        report(&diags);
        data_source.read(&config).await.map(Some).map_err(Into::into)
    };

    Ok(redact(outcome, &schema, cli.show_sensitive))
}

fn redact(outcome: Outcome, schema: &Schema, show_sensitive: bool) -> Outcome {
    match outcome {
        Ok(Some(state)) if !show_sensitive => Ok(Some(schema.redact(&state))),
        other => other,
    }
}

/// Print the state or the diagnostics and pick the exit status
fn finish(outcome: Outcome, format: OutputFormat) -> Result<ExitCode> {
    match outcome {
        Ok(Some(state)) => {
            print_output(&state, format)?;
            Ok(ExitCode::SUCCESS)
        }
        Ok(None) => Ok(ExitCode::SUCCESS),
        Err(diags) => {
            report(&diags);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn report(diags: &Diagnostics) {
    for diag in diags.iter() {
        eprintln!("{diag}");
    }
}

/// Read a JSON document from a file, or stdin for `-`
fn read_document(source: &str) -> Result<Value> {
    let content = if source == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read document from stdin")?;
        buf
    } else {
        std::fs::read_to_string(source)
            .with_context(|| format!("Failed to read document from {source}"))?
    };
    serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {source}"))
}
