use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use clap::builder::NonEmptyStringValueParser;
use owo_colors::OwoColorize;
use sitegraft_core::{
    DEFAULT_DOCUMENT_ROOT, DEFAULT_MAX_DEPTH, DEFAULT_NGINX_CONF, DEFAULT_PORT, FetchConfig, HttpFetcher, Pipeline,
    PipelineConfig, check_inputs,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod echo;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const STEPS: usize = 5;

/// Mirror a website, inject a keyword into its HTML and serve it with nginx
#[derive(Parser, Debug)]
#[command(name = "sitegraft")]
#[command(author = "Sitegraft Contributors")]
#[command(version = VERSION)]
#[command(about = "Mirror a website, inject a keyword and serve it with nginx", long_about = None)]
struct Args {
    /// Seed URL of the site to mirror (http or https)
    #[arg(long, value_name = "URL")]
    url: String,

    /// Keyword injected into titles, headings, body text and alt attributes
    #[arg(long, value_name = "KW", value_parser = NonEmptyStringValueParser::new())]
    keyword: String,

    /// Maximum link depth followed from the seed URL
    #[arg(long, alias = "maxDepth", default_value_t = DEFAULT_MAX_DEPTH, value_name = "N")]
    max_depth: usize,

    /// Directory served by nginx
    #[arg(long, default_value = DEFAULT_DOCUMENT_ROOT, value_name = "DIR")]
    document_root: PathBuf,

    /// Path of the generated nginx server block
    #[arg(long, default_value = DEFAULT_NGINX_CONF, value_name = "FILE")]
    nginx_conf: PathBuf,

    /// Port nginx listens on
    #[arg(long, default_value_t = DEFAULT_PORT, value_name = "PORT")]
    port: u16,

    /// nginx binary used to validate and reload the config
    #[arg(long, default_value = "nginx", value_name = "BIN")]
    nginx_bin: PathBuf,

    /// Write the config but do not validate or reload nginx
    #[arg(long)]
    skip_reload: bool,

    /// Directory for the per-run working tree (default: system temp dir)
    #[arg(long, value_name = "DIR")]
    work_dir: Option<PathBuf>,

    /// HTTP timeout in seconds
    #[arg(long, default_value = "30", value_name = "SECS")]
    timeout: u64,

    /// Custom User-Agent for HTTP requests
    #[arg(long, value_name = "UA")]
    user_agent: Option<String>,

    /// Print the run summary as JSON on stdout
    #[arg(long)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "sitegraft_core=debug,sitegraft=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn build_config(args: &Args) -> PipelineConfig {
    let mut builder = PipelineConfig::builder()
        .document_root(&args.document_root)
        .nginx_conf(&args.nginx_conf)
        .listen_port(args.port)
        .nginx_bin(&args.nginx_bin)
        .reload(!args.skip_reload)
        .timeout(args.timeout)
        .user_agent(
            args.user_agent
                .clone()
                .unwrap_or_else(|| FetchConfig::default().user_agent),
        );

    if let Some(dir) = &args.work_dir {
        builder = builder.work_base(dir);
    }

    builder.build()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    if args.verbose {
        echo::print_banner();
        echo::print_info("Debug logging enabled");
        eprintln!();
    }

    let seed = check_inputs(&args.url, &args.keyword).context("Invalid arguments")?;
    let config = build_config(&args);
    debug!(?config, "pipeline configuration");
    let fetcher = HttpFetcher::new(config.fetch.clone()).context("Failed to build HTTP client")?;
    let pipeline = Pipeline::new(config, fetcher);

    echo::print_step(1, STEPS, "Preparing working directory");
    let tree = pipeline.prepare().context("Failed to create working directory")?;
    if args.verbose {
        echo::print_detail("Working tree", tree.path().display());
    }

    echo::print_step(
        2,
        STEPS,
        &format!("Fetching {} (depth {})", seed.as_str().bright_white().underline(), args.max_depth),
    );
    let fetch = pipeline
        .fetch(&seed, args.max_depth, &tree)
        .await
        .with_context(|| format!("Failed to fetch {}", seed))?;
    if args.verbose {
        echo::print_fetch_stats(&fetch);
    }

    echo::print_step(3, STEPS, &format!("Injecting keyword {}", args.keyword.bright_white()));
    let mutation = pipeline.mutate(&tree, &args.keyword).context("Failed to mutate HTML")?;
    if args.verbose {
        echo::print_mutation_report(&mutation);
    }

    echo::print_step(
        4,
        STEPS,
        &format!("Publishing to {}", args.document_root.display().bright_white()),
    );
    pipeline.publish(tree).context("Failed to publish site")?;

    echo::print_step(
        5,
        STEPS,
        &format!("Writing nginx config {}", args.nginx_conf.display().bright_white()),
    );
    let reload = pipeline
        .configure_server()
        .with_context(|| format!("Failed to write nginx config: {}", args.nginx_conf.display()))?;
    echo::print_reload_outcome(&reload);

    if args.json {
        let summary = pipeline.summary(&seed, fetch, mutation, reload);
        let json = summary.to_json().context("Failed to serialize summary")?;
        println!("{}", serde_json::to_string_pretty(&json)?);
    }

    println!("Done. Open: http://localhost:{}", args.port);
    Ok(())
}
