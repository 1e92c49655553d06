pub mod config;
pub mod error;
pub mod fetch;
pub mod mutate;
pub mod parse;
pub mod pipeline;
pub mod publish;
pub mod server;
pub mod walk;

pub use config::{
    DEFAULT_BACKUP_SUFFIX, DEFAULT_DOCUMENT_ROOT, DEFAULT_MAX_DEPTH, DEFAULT_NGINX_CONF, DEFAULT_PORT, PipelineConfig,
    PipelineConfigBuilder,
};
pub use error::{ConfigReloadWarning, PublishStep, Result, SitegraftError};
#[cfg(feature = "fetch")]
pub use fetch::HttpFetcher;
pub use fetch::{FetchConfig, FetchStats, SiteFetcher};
pub use mutate::{Injection, KeywordConfig, MutationReport, Mutator, TreeReport, mutate_file, mutate_html};
pub use parse::Document;
pub use pipeline::{Pipeline, ReloadOutcome, RunSummary, check_inputs, parse_seed};
pub use publish::{Publisher, WorkingTree};
pub use server::{ServerControl, render_config, write_config};
pub use walk::find_html_files;
