//! Run configuration.
//!
//! Every path and port the pipeline touches lives in [`PipelineConfig`] and is
//! passed in explicitly, so several runs (or tests) can use isolated roots.
//!
//! # Example
//!
//! ```rust
//! use sitegraft_core::PipelineConfig;
//!
//! let config = PipelineConfig::builder()
//!     .document_root("/srv/www/site")
//!     .listen_port(9000)
//!     .reload(false)
//!     .build();
//!
//! assert_eq!(config.listen_port, 9000);
//! ```

use std::path::PathBuf;

use crate::fetch::FetchConfig;
use crate::mutate::KeywordConfig;

/// Default directory nginx serves from.
pub const DEFAULT_DOCUMENT_ROOT: &str = "/var/www/site";
/// Default location of the generated nginx server block.
pub const DEFAULT_NGINX_CONF: &str = "/etc/nginx/conf.d/site.conf";
/// Default nginx listen port.
pub const DEFAULT_PORT: u16 = 8088;
/// Suffix appended to the document root to name the backup slot.
pub const DEFAULT_BACKUP_SUFFIX: &str = "-bak";
/// Default link-following depth.
pub const DEFAULT_MAX_DEPTH: usize = 2;

/// Configuration for a full fetch, mutate, publish and reload run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Directory under which each run creates its private working tree
    /// (default: the system temp directory).
    pub work_base: PathBuf,

    /// Directory the web server serves (default: `/var/www/site`).
    pub document_root: PathBuf,

    /// Backup slot suffix (default: `-bak`).
    pub backup_suffix: String,

    /// Where the server block is written (default: `/etc/nginx/conf.d/site.conf`).
    pub nginx_conf: PathBuf,

    /// Listen port written into the server block (default: 8088).
    pub listen_port: u16,

    /// Binary used for `-t` and `-s reload` (default: `nginx`).
    pub nginx_bin: PathBuf,

    /// Whether to validate and reload the server after publishing (default: true).
    pub reload: bool,

    /// HTTP settings for the fetcher.
    pub fetch: FetchConfig,

    /// Limits for the injection pass.
    pub keyword: KeywordConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            work_base: std::env::temp_dir(),
            document_root: PathBuf::from(DEFAULT_DOCUMENT_ROOT),
            backup_suffix: DEFAULT_BACKUP_SUFFIX.to_string(),
            nginx_conf: PathBuf::from(DEFAULT_NGINX_CONF),
            listen_port: DEFAULT_PORT,
            nginx_bin: PathBuf::from("nginx"),
            reload: true,
            fetch: FetchConfig::default(),
            keyword: KeywordConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Creates a new builder for PipelineConfig.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::new()
    }
}

/// Builder for PipelineConfig.
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self { config: PipelineConfig::default() }
    }

    pub fn work_base(mut self, value: impl Into<PathBuf>) -> Self {
        self.config.work_base = value.into();
        self
    }

    pub fn document_root(mut self, value: impl Into<PathBuf>) -> Self {
        self.config.document_root = value.into();
        self
    }

    pub fn backup_suffix(mut self, value: impl Into<String>) -> Self {
        self.config.backup_suffix = value.into();
        self
    }

    pub fn nginx_conf(mut self, value: impl Into<PathBuf>) -> Self {
        self.config.nginx_conf = value.into();
        self
    }

    pub fn listen_port(mut self, value: u16) -> Self {
        self.config.listen_port = value;
        self
    }

    pub fn nginx_bin(mut self, value: impl Into<PathBuf>) -> Self {
        self.config.nginx_bin = value.into();
        self
    }

    /// Enables or disables the validate/reload step.
    pub fn reload(mut self, value: bool) -> Self {
        self.config.reload = value;
        self
    }

    /// Sets the HTTP request timeout in seconds.
    pub fn timeout(mut self, value: u64) -> Self {
        self.config.fetch.timeout = value;
        self
    }

    pub fn user_agent(mut self, value: impl Into<String>) -> Self {
        self.config.fetch.user_agent = value.into();
        self
    }

    pub fn keyword(mut self, value: KeywordConfig) -> Self {
        self.config.keyword = value;
        self
    }

    /// Builds the PipelineConfig.
    pub fn build(self) -> PipelineConfig {
        self.config
    }
}

impl Default for PipelineConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
