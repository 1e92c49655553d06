use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use sitegraft_core::*;
use tempfile::TempDir;
use url::Url;

fn get_fixture_path(name: &str) -> String {
    format!("../../tests/fixtures/{}", name)
}

fn copy_dir(from: &Path, to: &Path) -> std::io::Result<usize> {
    fs::create_dir_all(to)?;
    let mut copied = 0;
    for entry in fs::read_dir(from)? {
        let entry = entry?;
        let target = to.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copied += copy_dir(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), target)?;
            copied += 1;
        }
    }
    Ok(copied)
}

/// Serves a directory from disk instead of the network.
struct DirFetcher {
    source: PathBuf,
}

#[async_trait]
impl SiteFetcher for DirFetcher {
    async fn fetch_site(&self, _seed: &Url, _max_depth: usize, dest: &Path) -> Result<FetchStats> {
        let pages = copy_dir(&self.source, dest)?;
        Ok(FetchStats { pages, ..Default::default() })
    }
}

struct FailingFetcher;

#[async_trait]
impl SiteFetcher for FailingFetcher {
    async fn fetch_site(&self, seed: &Url, _max_depth: usize, _dest: &Path) -> Result<FetchStats> {
        Err(SitegraftError::FetchError { url: seed.to_string(), reason: "HTTP 503 Service Unavailable".into() })
    }
}

struct Layout {
    tmp: TempDir,
}

impl Layout {
    fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("work")).unwrap();
        Self { tmp }
    }

    fn root(&self) -> PathBuf {
        self.tmp.path().join("www/site")
    }

    fn backup(&self) -> PathBuf {
        self.tmp.path().join("www/site-bak")
    }

    fn conf(&self) -> PathBuf {
        self.tmp.path().join("nginx/conf.d/site.conf")
    }

    fn work(&self) -> PathBuf {
        self.tmp.path().join("work")
    }

    fn config(&self) -> PipelineConfigBuilder {
        PipelineConfig::builder()
            .work_base(self.work())
            .document_root(self.root())
            .nginx_conf(self.conf())
            .listen_port(18088)
            .reload(false)
    }
}

fn site_fetcher() -> DirFetcher {
    DirFetcher { source: PathBuf::from(get_fixture_path("site")) }
}

#[tokio::test]
async fn test_full_run_publishes_mutated_site() {
    let layout = Layout::new();
    let pipeline = Pipeline::new(layout.config().build(), site_fetcher());

    let summary = pipeline.run("http://localhost/", "sourdough", 2).await.unwrap();

    assert_eq!(summary.fetch.pages, 4);
    assert_eq!(summary.mutation.files.len(), 3);
    assert_eq!(summary.reload, ReloadOutcome::Skipped);
    assert_eq!(summary.listen_port, 18088);

    let index = fs::read_to_string(layout.root().join("index.html")).unwrap();
    assert!(index.contains("<title>Home | sourdough</title>"));
    assert!(index.contains("Welcome sourdough"));
    assert!(layout.root().join("style.css").exists());
    assert!(!layout.backup().exists());

    let conf = fs::read_to_string(layout.conf()).unwrap();
    assert!(conf.contains("listen 18088;"));
    assert!(conf.contains(&format!("root {};", layout.root().display())));
}

#[tokio::test]
async fn test_rerun_replaces_previous_site() {
    let layout = Layout::new();
    fs::create_dir_all(layout.root()).unwrap();
    fs::write(layout.root().join("old.html"), "<p>old</p>").unwrap();
    fs::create_dir_all(layout.backup()).unwrap();
    fs::write(layout.backup().join("stale.html"), "<p>stale</p>").unwrap();

    let pipeline = Pipeline::new(layout.config().build(), site_fetcher());
    pipeline.run("http://localhost/", "rye", 1).await.unwrap();
    pipeline.run("http://localhost/", "rye", 1).await.unwrap();

    assert!(!layout.root().join("old.html").exists());
    assert!(!layout.backup().exists());

    // every run starts from a fresh fetch, so keywords do not pile up
    let index = fs::read_to_string(layout.root().join("index.html")).unwrap();
    assert!(index.contains("<title>Home | rye</title>"));
}

#[tokio::test]
async fn test_fetch_failure_leaves_root_untouched() {
    let layout = Layout::new();
    fs::create_dir_all(layout.root()).unwrap();
    fs::write(layout.root().join("index.html"), "<p>live</p>").unwrap();

    let pipeline = Pipeline::new(layout.config().build(), FailingFetcher);
    let err = pipeline.run("http://localhost/", "kw", 2).await.unwrap_err();

    assert!(matches!(err, SitegraftError::FetchError { .. }));
    assert_eq!(fs::read_to_string(layout.root().join("index.html")).unwrap(), "<p>live</p>");
    assert!(!layout.conf().exists());
    assert_eq!(fs::read_dir(layout.work()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_invalid_inputs_rejected_before_fetch() {
    let layout = Layout::new();
    let pipeline = Pipeline::new(layout.config().build(), site_fetcher());

    let err = pipeline.run("not a url", "kw", 2).await.unwrap_err();
    assert!(matches!(err, SitegraftError::InvalidUrl(_)));

    let err = pipeline.run("http://localhost/", "   ", 2).await.unwrap_err();
    assert!(matches!(err, SitegraftError::InvalidKeyword));

    assert!(!layout.root().exists());
}

#[tokio::test]
async fn test_mutation_failure_aborts_before_publish() {
    let layout = Layout::new();
    let source = layout.tmp.path().join("source");
    fs::create_dir_all(&source).unwrap();
    fs::copy(get_fixture_path("latin1.html"), source.join("index.html")).unwrap();

    let pipeline = Pipeline::new(layout.config().build(), DirFetcher { source });
    let err = pipeline.run("http://localhost/", "kw", 0).await.unwrap_err();

    assert!(matches!(err, SitegraftError::ParseError { .. }));
    assert!(!layout.root().exists());
    assert!(!layout.conf().exists());
}

#[cfg(unix)]
#[tokio::test]
async fn test_reload_failure_is_only_a_warning() {
    let layout = Layout::new();
    let config = layout.config().reload(true).nginx_bin("false").build();
    let pipeline = Pipeline::new(config, site_fetcher());

    let summary = pipeline.run("http://localhost/", "kw", 2).await.unwrap();

    match summary.reload {
        ReloadOutcome::Failed { warning } => assert!(warning.contains("false -t")),
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert!(layout.root().join("index.html").exists());
    assert!(layout.conf().exists());
}

#[cfg(unix)]
#[tokio::test]
async fn test_reload_success() {
    let layout = Layout::new();
    let config = layout.config().reload(true).nginx_bin("true").build();
    let summary = Pipeline::new(config, site_fetcher())
        .run("http://localhost/", "kw", 2)
        .await
        .unwrap();

    assert_eq!(summary.reload, ReloadOutcome::Reloaded);
}

#[tokio::test]
async fn test_summary_serializes() {
    let layout = Layout::new();
    let summary = Pipeline::new(layout.config().build(), site_fetcher())
        .run("http://localhost/", "kw", 2)
        .await
        .unwrap();

    let json = summary.to_json().unwrap();
    assert_eq!(json["seed_url"], "http://localhost/");
    assert_eq!(json["reload"]["status"], "skipped");
    assert_eq!(json["mutation"]["files"].as_array().unwrap().len(), 3);
}
