// # r53sync - Route 53 record-set reconciler
//
// This binary is a THIN integration layer:
// - Parses the command line (with environment fallbacks)
// - Initializes logging and the runtime
// - Wires the AWS backends into the r53sync-core engine
//
// No discovery, record-building or submission logic lives here.
//
// ## Commands
//
// - `update-record-sets (--resource <path> | --s3location <path>)`:
//   discover instances and UPSERT every declared record set in one batch
// - `upload-resource --resource <path> --s3location <path>`:
//   validate a local definition and store it at the pointer's location
// - `validate (--resource <path> | --s3location <path>)`:
//   load and validate a definition without touching DNS
// - `create-policy (--resource <path> | --s3location <path>)`:
//   print the IAM policy needed to run update-record-sets for a definition
//
// Local definitions never resolve AWS credentials; the SDK is only loaded
// when a command talks to EC2, Route 53 or S3.
//
// ## Environment
//
// - `R53SYNC_LOG_LEVEL`: trace, debug, info, warn, error (default: info)
// - `R53SYNC_MODE`: set to `dry-run` to build the batch without submitting it
// - `R53SYNC_MAX_CONCURRENCY`: resources resolved at once (default: 8)
// - Standard AWS variables (`AWS_REGION`, `AWS_PROFILE`, ...) for the SDK
//
// Logs go to standard error; standard output carries only the command result.
//
// ## Example
//
// ```bash
// export AWS_REGION=us-west-1
// R53SYNC_MODE=dry-run r53sync update-record-sets --resource resource.json
// ```

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use r53sync_aws::{Ec2Inventory, Route53Provider, S3ObjectStore, load_sdk_config};
use r53sync_core::{
    DefinitionSource, EngineConfig, ReconciliationEngine, ResourceDefinition, S3Location,
    load_definition, policy_document, upload_definition,
};
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for different termination scenarios
#[derive(Debug, Clone, Copy)]
enum R53SyncExitCode {
    /// Command completed
    Success = 0,
    /// Invalid arguments or startup failure
    ConfigError = 1,
    /// The command itself failed
    RuntimeError = 2,
}

impl From<R53SyncExitCode> for ExitCode {
    fn from(code: R53SyncExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

#[derive(Debug, Parser)]
#[command(name = "r53sync", version, about)]
struct Cli {
    /// Region for the SDK clients; overrides the AWS provider chain
    #[arg(long, global = true)]
    region: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Discover instances and UPSERT every declared record set
    UpdateRecordSets {
        #[command(flatten)]
        source: SourceArgs,

        /// Build and log the change batch without submitting it
        #[arg(long)]
        dry_run: bool,

        /// Comment for the change batch (generated when omitted)
        #[arg(long)]
        comment: Option<String>,

        /// Maximum number of resources resolved concurrently
        #[arg(long, env = "R53SYNC_MAX_CONCURRENCY")]
        max_concurrency: Option<usize>,
    },

    /// Validate a local definition and upload it to an s3location
    UploadResource {
        /// Local resource definition file
        #[arg(long)]
        resource: PathBuf,

        /// s3location pointer file naming the destination
        #[arg(long)]
        s3location: PathBuf,
    },

    /// Load and validate a definition without discovery or DNS changes
    Validate {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Print the IAM policy document needed to update a definition's records
    CreatePolicy {
        #[command(flatten)]
        source: SourceArgs,
    },
}

#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
struct SourceArgs {
    /// Local resource definition file
    #[arg(long)]
    resource: Option<PathBuf>,

    /// s3location pointer file naming a remote resource definition
    #[arg(long)]
    s3location: Option<PathBuf>,
}

impl SourceArgs {
    fn into_source(self) -> Result<DefinitionSource> {
        match (self.resource, self.s3location) {
            (Some(path), None) => Ok(DefinitionSource::Resource(path)),
            (None, Some(path)) => Ok(DefinitionSource::S3Location(path)),
            _ => anyhow::bail!("exactly one of --resource or --s3location is required"),
        }
    }
}

fn log_level_from_env() -> Result<Level> {
    let raw = env::var("R53SYNC_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    match raw.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => anyhow::bail!(
            "R53SYNC_LOG_LEVEL '{}' is not valid. \
            Valid levels: trace, debug, info, warn, error",
            raw
        ),
    }
}

fn dry_run_from_env() -> Result<bool> {
    match env::var("R53SYNC_MODE") {
        Err(_) => Ok(false),
        Ok(mode) => match mode.as_str() {
            "dry-run" => Ok(true),
            "" | "live" => Ok(false),
            other => anyhow::bail!(
                "R53SYNC_MODE '{}' is not valid. Valid modes: live, dry-run",
                other
            ),
        },
    }
}

/// Engine settings for `update-record-sets`, validated before any AWS setup
fn engine_config(command: &Command) -> Result<Option<EngineConfig>> {
    let Command::UpdateRecordSets {
        dry_run,
        comment,
        max_concurrency,
        ..
    } = command
    else {
        return Ok(None);
    };

    let mut config = EngineConfig::default().with_dry_run(*dry_run || dry_run_from_env()?);
    if let Some(limit) = max_concurrency {
        config = config.with_max_concurrency(*limit);
    }
    if let Some(comment) = comment {
        config = config.with_comment(comment.clone());
    }
    config.validate()?;

    Ok(Some(config))
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                R53SyncExitCode::ConfigError.into()
            } else {
                R53SyncExitCode::Success.into()
            };
        }
    };

    let log_level = match log_level_from_env() {
        Ok(level) => level,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return R53SyncExitCode::ConfigError.into();
        }
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return R53SyncExitCode::ConfigError.into();
    }

    let config = match engine_config(&cli.command) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return R53SyncExitCode::ConfigError.into();
        }
    };

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return R53SyncExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        if let Err(e) = run(cli, config).await {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            R53SyncExitCode::RuntimeError
        } else {
            R53SyncExitCode::Success
        }
    });

    result.into()
}

async fn run(cli: Cli, config: Option<EngineConfig>) -> Result<()> {
    let region = cli.region.as_deref();

    match cli.command {
        Command::UpdateRecordSets { source, .. } => {
            let config = config.context("engine configuration was not prepared")?;

            let sdk_config = load_sdk_config(region).await;
            let store = S3ObjectStore::new(&sdk_config);
            let definition = load_definition(&source.into_source()?, &store).await?;

            let (engine, events) = ReconciliationEngine::new(
                Box::new(Ec2Inventory::new(&sdk_config)),
                Box::new(Route53Provider::new(&sdk_config)),
                config,
            )?;
            // Progress is already logged by the engine
            drop(events);

            let report = engine.reconcile(&definition).await?;
            println!("{}", serde_json::to_string_pretty(&report.change_info)?);
        }

        Command::UploadResource {
            resource,
            s3location,
        } => {
            let sdk_config = load_sdk_config(region).await;
            let store = S3ObjectStore::new(&sdk_config);
            let location = upload_definition(&resource, &s3location, &store)
                .await
                .with_context(|| format!("uploading {}", resource.display()))?;
            info!(%location, "Resource definition uploaded");
            println!("{}", location);
        }

        Command::Validate { source } => {
            let (definition, _) = read_definition(source.into_source()?, region).await?;
            print!("{}", summarize(&definition));
        }

        Command::CreatePolicy { source } => {
            let (definition, location) = read_definition(source.into_source()?, region).await?;
            let policy = policy_document(&definition, location.as_ref());
            println!("{}", serde_json::to_string_pretty(&policy)?);
        }
    }

    Ok(())
}

/// Load a definition, touching S3 only when it is kept remotely
///
/// Returns the pointer alongside the definition for remote sources.
async fn read_definition(
    source: DefinitionSource,
    region: Option<&str>,
) -> Result<(ResourceDefinition, Option<S3Location>)> {
    match &source {
        DefinitionSource::Resource(path) => {
            info!(path = %path.display(), "Reading resource definition");
            let definition = ResourceDefinition::read(path)
                .await
                .with_context(|| format!("reading {}", path.display()))?;
            Ok((definition, None))
        }
        DefinitionSource::S3Location(path) => {
            let location = S3Location::read(path).await?;
            let sdk_config = load_sdk_config(region).await;
            let definition = load_definition(&source, &S3ObjectStore::new(&sdk_config)).await?;
            Ok((definition, Some(location)))
        }
    }
}

/// One line for the zone, then one line per resource
fn summarize(definition: &ResourceDefinition) -> String {
    let mut out = format!(
        "HostedZone {}: {} resource(s)\n",
        definition.hosted_zone,
        definition.resources.len()
    );
    for (name, spec) in definition.resources.iter() {
        out.push_str(&format!(
            "  {}: {} <- {} instance group(s)\n",
            name,
            spec.resource_record_set.name,
            spec.instances.len()
        ));
    }
    out
}
