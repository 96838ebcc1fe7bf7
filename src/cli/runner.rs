//! CLI runner - executes commands

use crate::catalog::{discover, Catalog};
use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::TapConfig;
use crate::engine::{Orchestrator, SyncContext};
use crate::error::{Error, Result, ResultExt};
use crate::http::{HttpClient, RequestConfig, RequestExecutor};
use crate::output::JsonLinesSink;
use crate::state::StateStore;
use crate::streams::StreamKind;
use crate::transform::SchemaTransformer;
use crate::types::Method;
use serde_json::{json, Value};
use tracing::info;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Check => self.check().await,
            Commands::Discover => self.discover(),
            Commands::Sync { streams } => self.sync(streams.as_deref()).await,
            Commands::Streams => self.streams(),
        }
    }

    /// Load and validate the config
    fn load_config(&self) -> Result<TapConfig> {
        // Inline config takes precedence
        if let Some(json_str) = &self.cli.config_json {
            return TapConfig::from_json(json_str);
        }

        match &self.cli.config {
            Some(path) => TapConfig::from_file(path),
            None => Err(Error::config(
                "Config not specified (use --config or --config-json)",
            )),
        }
    }

    /// Load state
    ///
    /// When a state path is given, checkpoints are written back to it.
    fn load_state(&self) -> Result<StateStore> {
        let store = match (&self.cli.state_json, &self.cli.state) {
            (Some(state_json), Some(path)) => StateStore::from_json(state_json)?.with_path(path),
            (Some(state_json), None) => StateStore::from_json(state_json)?,
            (None, Some(path)) => StateStore::from_file(path)?,
            (None, None) => StateStore::in_memory(),
        };
        Ok(store)
    }

    /// Load the catalog, or discover one with every stream selected
    fn load_catalog(&self, streams: Option<&str>) -> Result<Catalog> {
        let mut catalog = match &self.cli.catalog {
            Some(path) => Catalog::from_file(path)?,
            None => discover().select_all(),
        };

        if let Some(list) = streams {
            let wanted: Vec<&str> = list
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect();
            for name in &wanted {
                if catalog.get(name).is_none() {
                    return Err(Error::stream_not_found(*name));
                }
            }
            for entry in &mut catalog.streams {
                entry.set_selected(wanted.contains(&entry.tap_stream_id.as_str()));
            }
        }

        Ok(catalog)
    }

    /// Test connection
    async fn check(&self) -> Result<()> {
        let config = self.load_config()?;
        let app_id = config.require_app_id()?;
        let client = HttpClient::from_tap_config(&config)?;

        info!("Checking connection to {}", config.realm_hostname);
        let path = format!("v1/apps/{app_id}");
        match client.execute(Method::GET, &path, RequestConfig::new()).await {
            Ok(_) => {
                self.output_message(&json!({
                    "type": "CONNECTION_STATUS",
                    "connectionStatus": {
                        "status": "SUCCEEDED",
                        "message": "Connection successful"
                    }
                }));
            }
            Err(e) => {
                self.output_message(&json!({
                    "type": "CONNECTION_STATUS",
                    "connectionStatus": {
                        "status": "FAILED",
                        "message": format!("Connection failed: {e}")
                    }
                }));
            }
        }

        Ok(())
    }

    /// Discover streams
    fn discover(&self) -> Result<()> {
        let catalog = discover();
        let value = serde_json::to_value(&catalog)
            .map_err(|e| Error::catalog(format!("Failed to serialize catalog: {e}")))?;
        self.output_message(&value);
        Ok(())
    }

    /// Sync the selected streams to stdout
    async fn sync(&self, streams: Option<&str>) -> Result<()> {
        let config = self.load_config()?;
        let catalog = self.load_catalog(streams)?;
        let mut state = self.load_state()?;
        if state.is_in_memory() {
            info!("No state file given, state is only emitted as STATE messages");
        }
        let client =
            HttpClient::from_tap_config(&config).context("Failed to build HTTP client")?;
        let transformer = SchemaTransformer::new();
        let mut sink = JsonLinesSink::stdout();

        info!("Starting Quickbase sync");
        let mut ctx = SyncContext::new(&client, &config, &mut state, &transformer, &mut sink);
        let total = Orchestrator::new(&catalog).run(&mut ctx).await?;

        let stats = ctx.stats();
        info!(
            total_records = total,
            records_emitted = stats.records_emitted,
            streams = stats.streams_synced,
            forbidden_skips = stats.forbidden_skips,
            duration_ms = stats.duration_ms,
            "Sync complete"
        );
        Ok(())
    }

    /// List available streams (lightweight, no schemas)
    fn streams(&self) -> Result<()> {
        let streams: Vec<Value> = StreamKind::ALL
            .into_iter()
            .map(|kind| {
                let def = kind.definition();
                json!({
                    "name": def.id,
                    "parent": def.parent.map(StreamKind::id),
                    "replication_method": def.method.to_string(),
                    "key_properties": def.key_properties
                })
            })
            .collect();

        self.output_message(&json!({
            "type": "STREAMS",
            "streams": streams
        }));

        Ok(())
    }

    /// Output a message
    fn output_message(&self, msg: &Value) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}
