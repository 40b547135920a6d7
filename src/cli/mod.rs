//! # Command Line Interface
//!
//! Reads, writes, lists, and deletes keys in any backend from a shell.
//! Flags override the `KUBESTORE_*` environment variables.

pub mod output;

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{ClusterConfig, LoggingConfig, StoreConfig};
use crate::kube::ResourceType;
use crate::observability::{init_logging, log_store_info};
use crate::store::{build_store, BackendType, Store, StoreExt};
use output::{parse_value, render_keys, render_value, OutputFormat};

#[derive(Parser)]
#[command(name = "kubestore")]
#[command(about = "Key/value state on Kubernetes resources or local files")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Backend: configmap, secret, annotation, or file
    #[arg(long, global = true)]
    pub backend: Option<BackendType>,

    /// ConfigMap, Secret, or annotated resource name
    #[arg(long, global = true)]
    pub name: Option<String>,

    /// Directory for the file backend
    #[arg(long, global = true)]
    pub directory: Option<PathBuf>,

    /// API group of the annotated resource (empty for the core group)
    #[arg(long, global = true)]
    pub group: Option<String>,

    /// API version of the annotated resource
    #[arg(long = "api-version", global = true)]
    pub api_version: Option<String>,

    /// Plural resource name of the annotated resource, e.g. deployments
    #[arg(long, global = true)]
    pub resource: Option<String>,

    /// Output format: json, yaml, or text
    #[arg(short, long, global = true, default_value = "json")]
    pub output: String,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the value stored under a key
    Get { key: String },

    /// Store a value; input that is not valid JSON is stored as a string
    Set { key: String, value: String },

    /// List the keys present
    List,

    /// Remove a key
    Delete { key: String },
}

impl Cli {
    /// Merge the flags over the environment-derived settings.
    fn store_config(&self, mut config: StoreConfig) -> StoreConfig {
        if let Some(backend) = self.backend {
            config.backend = backend;
        }
        if let Some(name) = &self.name {
            config.name = Some(name.clone());
        }
        if let Some(directory) = &self.directory {
            config.directory = Some(directory.clone());
        }

        if let Some(plural) = &self.resource {
            let current = config.resource.take();
            config.resource = Some(ResourceType::new(
                self.group
                    .clone()
                    .or_else(|| current.as_ref().map(|r| r.group.clone()))
                    .unwrap_or_default(),
                self.api_version
                    .clone()
                    .or_else(|| current.as_ref().map(|r| r.version.clone()))
                    .unwrap_or_else(|| "v1".to_string()),
                plural.clone(),
            ));
        }
        config
    }
}

/// Run CLI commands
pub async fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    initialise_logging(cli.verbose)?;

    let format = OutputFormat::parse(&cli.output)?;
    let config = cli.store_config(StoreConfig::from_env()?);
    log_store_info(&config);

    let cluster = match config.backend {
        BackendType::File => None,
        _ => Some(ClusterConfig::resolve().context("Failed to resolve cluster access")?),
    };
    let store = build_store(&config, cluster.as_ref())?;

    if let Some(text) = handle_command(&cli.command, store.as_ref(), format).await? {
        if !text.is_empty() {
            println!("{}", text);
        }
    }
    Ok(())
}

/// Execute one command against `store`, returning what to print.
pub async fn handle_command(
    command: &Commands,
    store: &dyn Store,
    format: OutputFormat,
) -> anyhow::Result<Option<String>> {
    match command {
        Commands::Get { key } => {
            let value: serde_json::Value = store.get(key).await.map_err(|e| {
                if e.is_not_found() {
                    anyhow::anyhow!("key not found: {}", key)
                } else {
                    anyhow::Error::new(e).context(format!("Failed to get '{}'", key))
                }
            })?;
            Ok(Some(render_value(&value, format)?))
        }
        Commands::Set { key, value } => {
            store
                .set(key, &parse_value(value))
                .await
                .with_context(|| format!("Failed to set '{}'", key))?;
            Ok(None)
        }
        Commands::List => {
            let keys = store.list().await.context("Failed to list keys")?;
            Ok(Some(render_keys(&keys, format)?))
        }
        Commands::Delete { key } => {
            store.delete(key).await.with_context(|| format!("Failed to delete '{}'", key))?;
            Ok(None)
        }
    }
}

fn initialise_logging(verbose: bool) -> anyhow::Result<()> {
    let mut config = LoggingConfig::from_env();
    if verbose {
        config.log_level = "debug".to_string();
    }
    init_logging(&config)?;
    Ok(())
}
