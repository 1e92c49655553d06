//! The end-to-end run: fetch, mutate, publish, configure.
//!
//! Stages run strictly one after another and every stage must complete
//! before the next begins. Fetch, mutate and publish failures abort the run;
//! a failed server reload is only reported in the [`RunSummary`].
//!
//! # Example
//!
//! ```rust,no_run
//! use sitegraft_core::{HttpFetcher, Pipeline, PipelineConfig};
//!
//! # #[tokio::main]
//! # async fn main() -> sitegraft_core::Result<()> {
//! let config = PipelineConfig::builder().document_root("/srv/site").build();
//! let fetcher = HttpFetcher::new(config.fetch.clone())?;
//! let summary = Pipeline::new(config, fetcher).run("https://example.com/", "rust", 2).await?;
//! println!("mutated {} files", summary.mutation.files.len());
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;

use serde::Serialize;
use tracing::info;
use url::Url;

use crate::config::PipelineConfig;
use crate::fetch::{FetchStats, SiteFetcher};
use crate::mutate::{Mutator, TreeReport};
use crate::publish::{Publisher, WorkingTree};
use crate::server::{ServerControl, write_config};
use crate::{Result, SitegraftError};

/// What happened when the server was asked to pick up the new config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReloadOutcome {
    Reloaded,
    Skipped,
    Failed { warning: String },
}

/// Summary of a completed run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub seed_url: String,
    pub fetch: FetchStats,
    pub mutation: TreeReport,
    pub document_root: PathBuf,
    pub nginx_conf: PathBuf,
    pub listen_port: u16,
    pub reload: ReloadOutcome,
}

impl RunSummary {
    /// Gets the summary as a JSON value.
    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}

/// Parses and checks a seed URL.
pub fn parse_seed(url: &str) -> Result<Url> {
    let parsed = Url::parse(url).map_err(|e| SitegraftError::InvalidUrl(e.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(SitegraftError::InvalidUrl(format!(
            "URL must use http:// or https://, got {}",
            parsed.scheme()
        )));
    }
    Ok(parsed)
}

/// Checks the run inputs before any work starts.
///
/// Returns the parsed seed URL; fails on a non-http(s) URL or a
/// whitespace-only keyword.
pub fn check_inputs(seed_url: &str, keyword: &str) -> Result<Url> {
    let seed = parse_seed(seed_url)?;
    if keyword.trim().is_empty() {
        return Err(SitegraftError::InvalidKeyword);
    }
    Ok(seed)
}

/// Orchestrates one run against a configured document root.
pub struct Pipeline<F> {
    config: PipelineConfig,
    fetcher: F,
    mutator: Mutator,
    publisher: Publisher,
    control: ServerControl,
}

impl<F: SiteFetcher> Pipeline<F> {
    pub fn new(config: PipelineConfig, fetcher: F) -> Self {
        let mutator = Mutator::with_config(config.keyword.clone());
        let publisher = Publisher::new(config.document_root.clone(), &config.backup_suffix);
        let control = ServerControl::new(config.nginx_bin.clone());
        Self { config, fetcher, mutator, publisher, control }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Creates this run's private working tree.
    pub fn prepare(&self) -> Result<WorkingTree> {
        WorkingTree::create(&self.config.work_base)
    }

    /// Fetches the site into `tree`.
    pub async fn fetch(&self, seed: &Url, max_depth: usize, tree: &WorkingTree) -> Result<FetchStats> {
        info!(url = %seed, depth = max_depth, dest = %tree.path().display(), "downloading site");
        self.fetcher.fetch_site(seed, max_depth, tree.path()).await
    }

    /// Injects `keyword` into every HTML file of `tree`.
    pub fn mutate(&self, tree: &WorkingTree, keyword: &str) -> Result<TreeReport> {
        if keyword.trim().is_empty() {
            return Err(SitegraftError::InvalidKeyword);
        }
        info!(keyword, "injecting keyword into html");
        let report = self.mutator.mutate_tree(tree.path(), keyword, &mut rand::rng())?;
        info!(files = report.files.len(), "mutation finished");
        Ok(report)
    }

    /// Swaps `tree` into the document root, consuming it.
    pub fn publish(&self, tree: WorkingTree) -> Result<()> {
        info!(root = %self.publisher.document_root().display(), "publishing to document root");
        self.publisher.publish(tree.path())
    }

    /// Writes the server block and, if enabled, validates and reloads nginx.
    ///
    /// Only writing the config can fail the run.
    pub fn configure_server(&self) -> Result<ReloadOutcome> {
        write_config(&self.config.nginx_conf, &self.config.document_root, self.config.listen_port)?;

        if !self.config.reload {
            return Ok(ReloadOutcome::Skipped);
        }

        Ok(match self.control.validate_and_reload() {
            Ok(()) => ReloadOutcome::Reloaded,
            Err(warning) => ReloadOutcome::Failed { warning: warning.to_string() },
        })
    }

    /// Assembles the summary of a run that reached the server step.
    pub fn summary(&self, seed: &Url, fetch: FetchStats, mutation: TreeReport, reload: ReloadOutcome) -> RunSummary {
        RunSummary {
            seed_url: seed.to_string(),
            fetch,
            mutation,
            document_root: self.config.document_root.clone(),
            nginx_conf: self.config.nginx_conf.clone(),
            listen_port: self.config.listen_port,
            reload,
        }
    }

    /// Runs every stage in order.
    pub async fn run(&self, seed_url: &str, keyword: &str, max_depth: usize) -> Result<RunSummary> {
        let seed = check_inputs(seed_url, keyword)?;

        let tree = self.prepare()?;
        let fetch = self.fetch(&seed, max_depth, &tree).await?;
        let mutation = self.mutate(&tree, keyword)?;
        self.publish(tree)?;
        let reload = self.configure_server()?;

        Ok(self.summary(&seed, fetch, mutation, reload))
    }
}
