//! Static-serving configuration for the external nginx instance.
//!
//! [`render_config`] produces a fixed server block parameterized only by the
//! document root and listen port; [`write_config`] always overwrites the
//! target file. [`ServerControl`] asks nginx to validate and reload it.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{info, warn};

use crate::Result;
use crate::error::ConfigReloadWarning;

/// Static asset extensions served with a one-day cache header.
pub const STATIC_EXTENSIONS: &str = "js|css|png|jpg|jpeg|gif|ico|svg|webp|woff2?|ttf";

/// Renders the nginx server block for `document_root` on `port`.
///
/// Unmatched paths fall back to `/index.html`; static assets skip access
/// logging and are cached for a day.
pub fn render_config(document_root: &Path, port: u16) -> String {
    format!(
        r#"server {{
    listen {port};
    server_name _;
    root {root};
    index index.html index.htm;

    location / {{
      try_files $uri $uri/ /index.html;
    }}

    location ~* \.({extensions})$ {{
      access_log off;
      add_header Cache-Control "public,max-age=86400";
    }}
}}
"#,
        port = port,
        root = document_root.display(),
        extensions = STATIC_EXTENSIONS,
    )
}

/// Writes the server block to `conf_path`, replacing any previous content.
pub fn write_config(conf_path: &Path, document_root: &Path, port: u16) -> Result<()> {
    if let Some(parent) = conf_path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    fs::write(conf_path, render_config(document_root, port))?;
    info!(path = %conf_path.display(), port, "wrote server config");
    Ok(())
}

/// Runs the external server's validate and reload commands.
#[derive(Debug, Clone)]
pub struct ServerControl {
    binary: PathBuf,
}

impl Default for ServerControl {
    fn default() -> Self {
        Self::new("nginx")
    }
}

impl ServerControl {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self { binary: binary.into() }
    }

    /// `nginx -t`
    pub fn validate(&self) -> std::result::Result<(), ConfigReloadWarning> {
        self.run(&["-t"])
    }

    /// `nginx -s reload`
    pub fn reload(&self) -> std::result::Result<(), ConfigReloadWarning> {
        self.run(&["-s", "reload"])
    }

    /// Validates, then reloads only if validation passed.
    ///
    /// Failures are logged and handed back as warnings; they never make a
    /// run fail because the content is already published.
    pub fn validate_and_reload(&self) -> std::result::Result<(), ConfigReloadWarning> {
        let outcome = self.validate().and_then(|()| self.reload());
        if let Err(warning) = &outcome {
            warn!(%warning, "server config reload failed");
        }
        outcome
    }

    fn run(&self, args: &[&str]) -> std::result::Result<(), ConfigReloadWarning> {
        let command = format!("{} {}", self.binary.display(), args.join(" "));
        let status = Command::new(&self.binary)
            .args(args)
            .status()
            .map_err(|source| ConfigReloadWarning::Spawn { command: command.clone(), source })?;

        if status.success() { Ok(()) } else { Err(ConfigReloadWarning::Failed { command, status }) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_render_config() {
        let conf = render_config(Path::new("/var/www/site"), 8088);

        assert!(conf.contains("listen 8088;"));
        assert!(conf.contains("root /var/www/site;"));
        assert!(conf.contains("index index.html index.htm;"));
        assert!(conf.contains("try_files $uri $uri/ /index.html;"));
        assert!(conf.contains(r"location ~* \.(js|css|png|jpg|jpeg|gif|ico|svg|webp|woff2?|ttf)$ {"));
        assert!(conf.contains("access_log off;"));
        assert!(conf.contains(r#"add_header Cache-Control "public,max-age=86400";"#));
    }

    #[test]
    fn test_write_config_overwrites() {
        let tmp = TempDir::new().unwrap();
        let conf = tmp.path().join("conf.d/site.conf");
        fs::create_dir_all(conf.parent().unwrap()).unwrap();
        fs::write(&conf, "stale content that must disappear").unwrap();

        write_config(&conf, Path::new("/srv/site"), 9090).unwrap();

        let written = fs::read_to_string(&conf).unwrap();
        assert!(!written.contains("stale"));
        assert_eq!(written, render_config(Path::new("/srv/site"), 9090));
    }

    #[test]
    fn test_missing_binary_is_a_warning() {
        let control = ServerControl::new("/nonexistent/sitegraft-nginx");
        let warning = control.validate_and_reload().unwrap_err();
        assert!(matches!(warning, ConfigReloadWarning::Spawn { .. }));
        assert!(warning.to_string().contains("-t"));
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_validation_skips_reload() {
        let control = ServerControl::new("false");
        let warning = control.validate_and_reload().unwrap_err();
        match warning {
            ConfigReloadWarning::Failed { command, .. } => assert_eq!(command, "false -t"),
            other => panic!("unexpected warning: {other}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_successful_reload() {
        assert!(ServerControl::new("true").validate_and_reload().is_ok());
    }
}
