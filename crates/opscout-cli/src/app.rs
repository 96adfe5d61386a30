//! The opscout CLI application.

use crate::cli::{CliArgs, Command};
use crate::config::OpscoutConfig;
use crate::config_handlers;
use opscout::{DetailsLookup, OperatorRetriever, OperatorTools, RetrievalMode};
use opscout_core::{CatalogProvider, CatalogSnapshot, Error, JsonCatalogProvider, Result};
use opscout_vector::{
    create_embedding_provider, is_index_fresh, persistence, IndexOrigin, IndexPaths,
    SemanticIndex,
};
use std::sync::Arc;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

// ============================================================================
// OpscoutCli
// ============================================================================

/// CLI application bound to a loaded configuration.
pub struct OpscoutCli {
    config: Arc<OpscoutConfig>,
    version: String,
}

impl OpscoutCli {
    /// Create from CLI args, loading config from file/env.
    pub fn from_args(args: &CliArgs) -> Result<Self> {
        let config = OpscoutConfig::load(args.config.as_deref())?;
        Ok(Self::new(config))
    }

    /// Create a CLI application from an explicit config.
    pub fn new(config: OpscoutConfig) -> Self {
        Self {
            config: Arc::new(config),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Override the version string.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// The loaded configuration.
    pub fn config(&self) -> &OpscoutConfig {
        &self.config
    }

    /// Initialise tracing-based logging.
    ///
    /// `RUST_LOG` wins when set. Otherwise the opscout crates log at `info`
    /// (`debug` with `--verbose`) and everything else at `warn`; `--quiet`
    /// drops everything to `warn`. Library crates log through `log`, which
    /// the subscriber picks up.
    pub fn init_logging(&self, verbose: bool, quiet: bool) {
        let filter = match std::env::var("RUST_LOG") {
            Ok(_) => EnvFilter::from_default_env(),
            Err(_) => EnvFilter::new(default_filter(verbose, quiet)),
        };

        // A subscriber may already be installed (e.g. in tests).
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    }

    /// Run the CLI with the given arguments.
    pub async fn run(&self, args: CliArgs) -> Result<()> {
        self.init_logging(args.verbose, args.quiet);

        match args.command {
            Some(Command::Search {
                query,
                limit,
                mode,
                json,
            }) => self.cmd_search(&query, limit, mode, json).await,
            Some(Command::Details { name, json }) => self.cmd_details(&name, json).await,
            Some(Command::Index { force, check }) => self.cmd_index(force, check).await,
            Some(Command::Version) => {
                println!("opscout {}", self.version);
                Ok(())
            }
            Some(Command::Config(config_cmd)) => {
                config_handlers::handle_config_command(args.config.as_deref(), config_cmd.command)
            }
            None => {
                println!("opscout {} (use --help for usage)", self.version);
                Ok(())
            }
        }
    }

    /// Build a retriever over the configured catalog.
    ///
    /// With `semantic` set, the configured embedding provider is attached;
    /// if it cannot be created, vector and hybrid queries fall back to BM25.
    pub fn build_retriever(&self, semantic: bool) -> Result<OperatorRetriever> {
        let provider = Arc::new(JsonCatalogProvider::new(self.config.catalog_path()?));
        let mut retriever = OperatorRetriever::new(provider, self.config.retrieval.clone())
            .with_batch_size(self.config.vector.batch_size);

        if let Some(dir) = self.config.index_dir() {
            retriever = retriever.with_index_dir(dir);
        }

        if semantic {
            match create_embedding_provider(&self.config.vector) {
                Ok(embedder) => retriever = retriever.with_embedder(embedder),
                Err(e) => warn!("Semantic search unavailable, using bm25 instead: {e}"),
            }
        }
        Ok(retriever)
    }

    // ------------------------------------------------------------------------
    // Command handlers
    // ------------------------------------------------------------------------

    async fn cmd_search(
        &self,
        query: &str,
        limit: Option<usize>,
        mode: RetrievalMode,
        json: bool,
    ) -> Result<()> {
        debug!("search: mode={mode} limit={limit:?} query={query:?}");
        let retriever = self.build_retriever(mode.falls_back_to_bm25())?;
        retriever.init().await?;

        let tools = OperatorTools::new(Arc::new(retriever)).with_mode(mode);
        let results = tools.search_operators(query, limit).await?;

        if json {
            println!("{}", serde_json::to_string_pretty(&results)?);
        } else {
            println!("{}", results.to_markdown());
        }
        Ok(())
    }

    async fn cmd_details(&self, name: &str, json: bool) -> Result<()> {
        let retriever = self.build_retriever(false)?;
        retriever.init().await?;

        let lookup = OperatorTools::new(Arc::new(retriever))
            .get_operator_details(name)
            .await?;

        if json {
            println!("{}", serde_json::to_string_pretty(&lookup)?);
        } else {
            println!("{}", lookup.to_markdown());
        }

        match lookup {
            DetailsLookup::Found(_) => Ok(()),
            DetailsLookup::NotFound { .. } => {
                Err(Error::not_found(format!("Operator '{name}' not found")))
            }
        }
    }

    async fn cmd_index(&self, force: bool, check: bool) -> Result<()> {
        let provider = JsonCatalogProvider::new(self.config.catalog_path()?);
        let snapshot = CatalogSnapshot::new(provider.catalog()?);
        let dir = self
            .config
            .index_dir()
            .ok_or_else(|| Error::config("Could not determine the vector index directory"))?;
        let paths = IndexPaths::new(&dir);

        if check {
            let fresh = paths.exist() && is_index_fresh(&paths.metadata, snapshot.fingerprint());
            println!(
                "Vector index at {} is {} ({} operators, fingerprint {})",
                dir.display(),
                if fresh { "fresh" } else { "stale" },
                snapshot.len(),
                snapshot.fingerprint()
            );
            if let Ok(metadata) = persistence::load_metadata(&paths.metadata) {
                println!(
                    "  built at {} by '{}': {} entries, dimension {}",
                    metadata.created_at,
                    metadata.provider,
                    metadata.document_count,
                    metadata.embedding_dimension
                );
            }
            return Ok(());
        }

        if force && paths.metadata.exists() {
            std::fs::remove_file(&paths.metadata)
                .map_err(|e| Error::io_with_path(e, &paths.metadata))?;
        }

        let embedder = create_embedding_provider(&self.config.vector)?;
        let (index, origin) = SemanticIndex::load_or_build(
            &snapshot,
            embedder,
            Some(dir.as_path()),
            self.config.vector.batch_size,
        )
        .await?;

        let verb = match origin {
            IndexOrigin::Loaded => "is up to date",
            IndexOrigin::Built => "built",
        };
        println!(
            "Vector index {verb}: {} operators in {}",
            index.len(),
            dir.display()
        );
        Ok(())
    }
}

/// Log targets of the opscout crates.
const LOG_TARGETS: &[&str] = &[
    "opscout",
    "opscout_core",
    "opscout_lexical",
    "opscout_vector",
    "opscout_cli",
];

/// Filter directive used when `RUST_LOG` is unset.
fn default_filter(verbose: bool, quiet: bool) -> String {
    if quiet {
        return "warn".to_string();
    }
    let level = if verbose { "debug" } else { "info" };
    std::iter::once("warn".to_string())
        .chain(LOG_TARGETS.iter().map(|target| format!("{target}={level}")))
        .collect::<Vec<_>>()
        .join(",")
}

// ============================================================================
// Tests
// ============================================================================
