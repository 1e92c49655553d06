//! Swapping a mutated working tree into the live document root.
//!
//! Publishing is a two-step rename: the current root moves into a sibling
//! backup slot, then the working tree moves into the root's path. Between
//! the two renames the root is briefly absent; an interruption there leaves
//! it missing. A rename that would cross filesystems (a tmpfs `/tmp` and a
//! disk-backed document root, say) degrades to copy-then-remove.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use fs_extra::dir::CopyOptions;
use tracing::{debug, info, warn};

use crate::error::PublishStep;
use crate::{Result, SitegraftError};

/// Directory name of the fetched site inside a run's private temp directory.
const SITE_DIR: &str = "site";

/// A freshly created, run-private directory that receives fetched files.
///
/// The enclosing temp directory has a random suffix so concurrent runs never
/// share one. It is removed on drop, after [`Publisher::publish`] moved the
/// site out or when the run failed before publishing.
#[derive(Debug)]
pub struct WorkingTree {
    temp: TempDir,
    site: PathBuf,
}

impl WorkingTree {
    /// Creates `scrape-XXXXXX/site` under `base`.
    pub fn create(base: &Path) -> Result<Self> {
        fs::create_dir_all(base)?;
        let temp = tempfile::Builder::new().prefix("scrape-").tempdir_in(base)?;
        let site = temp.path().join(SITE_DIR);
        Ok(Self { temp, site })
    }

    /// Path of the site directory. It does not exist until the fetcher fills it.
    pub fn path(&self) -> &Path {
        &self.site
    }

    /// The per-run temp directory enclosing [`WorkingTree::path`].
    pub fn base(&self) -> &Path {
        self.temp.path()
    }
}

/// Moves working trees into a document root, keeping a backup during the swap.
#[derive(Debug, Clone)]
pub struct Publisher {
    document_root: PathBuf,
    backup_root: PathBuf,
}

impl Publisher {
    /// Creates a publisher whose backup slot is `document_root` + `backup_suffix`.
    pub fn new(document_root: impl Into<PathBuf>, backup_suffix: &str) -> Self {
        let document_root = document_root.into();
        let mut backup: OsString = document_root.clone().into_os_string();
        backup.push(backup_suffix);
        Self { document_root, backup_root: PathBuf::from(backup) }
    }

    pub fn document_root(&self) -> &Path {
        &self.document_root
    }

    pub fn backup_root(&self) -> &Path {
        &self.backup_root
    }

    /// Replaces the document root with `working_tree`.
    ///
    /// # Errors
    ///
    /// Returns [`SitegraftError::PublishError`] if preparing the parent,
    /// backing up the old root or moving the new tree fails. No rollback is
    /// attempted; the root is left as the failed step left it.
    pub fn publish(&self, working_tree: &Path) -> Result<()> {
        if let Some(parent) = self.document_root.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| publish_error(PublishStep::PrepareParent, parent, parent, e))?;
        }

        if self.document_root.exists() {
            self.clear_stale_backup()?;
            move_dir(&self.document_root, &self.backup_root)
                .map_err(|e| publish_error(PublishStep::Backup, &self.document_root, &self.backup_root, e))?;
        }

        move_dir(working_tree, &self.document_root)
            .map_err(|e| publish_error(PublishStep::Swap, working_tree, &self.document_root, e))?;
        info!(root = %self.document_root.display(), "published site");

        self.discard_backup();
        Ok(())
    }

    fn clear_stale_backup(&self) -> Result<()> {
        if fs::symlink_metadata(&self.backup_root).is_err() {
            return Ok(());
        }
        warn!(backup = %self.backup_root.display(), "overwriting stale backup");
        remove_path(&self.backup_root)
            .map_err(|e| publish_error(PublishStep::ClearStaleBackup, &self.backup_root, &self.backup_root, e))
    }

    /// Best-effort removal; a leftover backup is harmless.
    fn discard_backup(&self) {
        if fs::symlink_metadata(&self.backup_root).is_err() {
            return;
        }
        if let Err(e) = remove_path(&self.backup_root) {
            warn!(backup = %self.backup_root.display(), error = %e, "failed to remove backup");
        }
    }
}

/// Renames `from` to `to`, copying then removing when they sit on
/// different filesystems.
fn move_dir(from: &Path, to: &Path) -> io::Result<()> {
    match fs::rename(from, to) {
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            debug!(from = %from.display(), to = %to.display(), "rename crosses filesystems, copying");
            copy_then_remove(from, to)
        }
        other => other,
    }
}

/// `to` must not exist yet; it is created holding the contents of `from`.
fn copy_then_remove(from: &Path, to: &Path) -> io::Result<()> {
    let options = CopyOptions::new().copy_inside(true);
    fs_extra::dir::move_dir(from, to, &options)
        .map(|_| ())
        .map_err(io::Error::other)
}

fn remove_path(path: &Path) -> io::Result<()> {
    if fs::symlink_metadata(path)?.is_dir() { fs::remove_dir_all(path) } else { fs::remove_file(path) }
}

fn publish_error(step: PublishStep, from: &Path, to: &Path, source: io::Error) -> SitegraftError {
    SitegraftError::PublishError { step, from: from.to_path_buf(), to: to.to_path_buf(), source }
}
