pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::cli::analyze::AnalyzeOptions;
use crate::core::analysis::{Analyzer, Anchoring};
use crate::core::cache::Store;
use crate::core::config::{AppConfig, SourceKind};
use crate::core::{FundRepository, PriceSeriesProvider};
use crate::providers::{FonparamProvider, LocalDatasetProvider};
use crate::store::KeyValueStore;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use tracing::{debug, info};

pub enum AppCommand {
    Analyze(AnalyzeOptions),
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("fonx starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let today = chrono::Local::now().date_naive();
    run_with_config(command, &config, today).await
}

/// Runs `command` against the source selected in `config`, treating `today`
/// as the end of every analysis window.
pub async fn run_with_config(
    command: AppCommand,
    config: &AppConfig,
    today: NaiveDate,
) -> Result<()> {
    let anchoring = config.analysis.anchoring;
    match config.source {
        SourceKind::Fonparam => {
            let store = KeyValueStore::new(&config.default_data_path()?);
            let cache = store
                .get_collection("fonparam", true, true)
                .or_else(|| store.get_collection("fonparam", false, true))
                .context("No cache collection available")?;
            let provider = FonparamProvider::new(
                config.fonparam_base_url(),
                cache,
                config.cache.fund_ttl(),
                config.cache.history_ttl(),
            );
            dispatch(command, &provider, &provider, anchoring, today).await
        }
        SourceKind::Local => {
            let path = config
                .providers
                .local
                .as_ref()
                .map(|local| local.path.as_str())
                .context("The local source requires providers.local.path")?;
            let provider = LocalDatasetProvider::from_path(path)?;
            dispatch(command, &provider, &provider, anchoring, today).await
        }
    }
}

async fn dispatch(
    command: AppCommand,
    funds: &(dyn FundRepository + Send + Sync),
    prices: &(dyn PriceSeriesProvider + Send + Sync),
    anchoring: Anchoring,
    today: NaiveDate,
) -> Result<()> {
    let analyzer = Analyzer::new(funds, prices, anchoring);
    match command {
        AppCommand::Analyze(options) => cli::analyze::run(&options, &analyzer, today).await,
    }
}
