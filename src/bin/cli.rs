//! refeed CLI
//!
//! Crawls a feed view, exports the records, resolves their media, and
//! republishes them through a WebDriver session.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::{Args, Parser, Subcommand};
use refeed::{
    driver::WebDriverPage,
    error::{AppError, Result},
    models::{Config, CrawlSession, TabOrder, TargetSpec},
    pipeline,
    services::publisher::Credentials,
    storage::LocalStorage,
};

/// refeed - feed crawler and republisher
#[derive(Parser, Debug)]
#[command(name = "refeed", version, about = "Crawls a social feed and republishes posts")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// WebDriver endpoint of the browser session
    #[arg(long, default_value = "http://localhost:9515")]
    webdriver_url: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct ScrapeArgs {
    /// Stop after this many records
    #[arg(short = 't', long = "tweets", default_value_t = 50)]
    quota: usize,

    /// Ignore the quota and crawl until the feed is exhausted
    #[arg(long)]
    no_limit: bool,

    /// Crawl a user's profile
    #[arg(short, long)]
    username: Option<String>,

    /// Crawl a hashtag view
    #[arg(long)]
    hashtag: Option<String>,

    /// Crawl a search query
    #[arg(short, long)]
    query: Option<String>,

    /// Order hashtag/search results by recency
    #[arg(long)]
    latest: bool,

    /// Order hashtag/search results by relevance
    #[arg(long)]
    top: bool,

    /// Also collect profile stats for each record
    #[arg(long)]
    details: bool,

    /// Skip media resolution and download
    #[arg(long)]
    no_media: bool,
}

#[derive(Args, Debug)]
struct PublishArgs {
    /// Account username (or REFEED_USER in the environment)
    #[arg(long)]
    user: Option<String>,

    /// Account password (or REFEED_PASSWORD in the environment)
    #[arg(long)]
    password: Option<String>,

    /// Verification answer for the login prompt (or REFEED_MAIL)
    #[arg(long)]
    mail: Option<String>,

    /// Keep downloaded media after a successful post
    #[arg(long)]
    keep_media: bool,

    /// Override the delay between posts, in seconds
    #[arg(long)]
    delay: Option<u64>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl a feed view and export the records
    Scrape(ScrapeArgs),

    /// Republish records from a previous export
    Publish {
        #[command(flatten)]
        publish: PublishArgs,

        /// CSV export to publish (default: newest export in the output dir)
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Full pipeline: scrape, fetch media, then republish
    Run {
        #[command(flatten)]
        scrape: ScrapeArgs,

        #[command(flatten)]
        publish: PublishArgs,
    },

    /// Validate the configuration file
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn build_session(args: &ScrapeArgs) -> Result<CrawlSession> {
    let target = TargetSpec::from_options(
        args.username.clone(),
        args.hashtag.clone(),
        args.query.clone(),
    )?;
    let tab = TabOrder::from_flags(args.latest, args.top)?;
    let mut session = CrawlSession::new(target, tab, args.quota, args.no_limit);
    session.poster_details = args.details;
    Ok(session)
}

/// Resolve credentials from flags, falling back to the environment.
fn build_credentials(args: &PublishArgs) -> Result<Credentials> {
    let from_env = |value: &Option<String>, key: &str| {
        value.clone().or_else(|| std::env::var(key).ok())
    };

    let username = from_env(&args.user, "REFEED_USER")
        .ok_or_else(|| AppError::config("account username not set (--user or REFEED_USER)"))?;
    let password = from_env(&args.password, "REFEED_PASSWORD")
        .ok_or_else(|| AppError::config("account password not set (--password or REFEED_PASSWORD)"))?;
    Ok(Credentials {
        username,
        password,
        verification: from_env(&args.mail, "REFEED_MAIL"),
    })
}

/// Flip the cancellation flag on Ctrl-C so loops can wind down cleanly.
fn spawn_cancel_handler() -> Arc<AtomicBool> {
    let cancel = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&cancel);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("Interrupt received, finishing current step...");
            flag.store(true, Ordering::SeqCst);
        }
    });
    cancel
}

#[tokio::main]
async fn main() -> Result<()> {
    // Pull REFEED_* credentials from a .env file when present.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    log::info!("refeed starting...");

    if let Command::Validate = cli.command {
        refeed::config::load_config(&cli.config)?;
        log::info!("Configuration OK ({})", cli.config.display());
        return Ok(());
    }

    let mut config = refeed::config::load_or_default(&cli.config);
    config.validate()?;

    let cancel = spawn_cancel_handler();
    let page = WebDriverPage::connect(&cli.webdriver_url, Some(&config.crawler.user_agent))
        .await
        .map_err(|e| AppError::config(format!("WebDriver connection failed: {e}")))?;

    let outcome = run(&page, &mut config, cli.command, &cancel).await;

    if let Err(e) = page.quit().await {
        log::warn!("Browser session did not close cleanly: {e}");
    }
    outcome
}

async fn run(
    page: &WebDriverPage,
    config: &mut Config,
    command: Command,
    cancel: &Arc<AtomicBool>,
) -> Result<()> {
    match command {
        Command::Scrape(args) => {
            let session = build_session(&args)?;
            let outcome = pipeline::run_scrape(page, config, &session, cancel).await?;
            if !args.no_media {
                pipeline::fetch_media(config, &outcome.records, cancel).await?;
            }
            log::info!("Scrape complete: {} records", outcome.records.len());
        }

        Command::Publish { publish, csv } => {
            let creds = build_credentials(&publish)?;
            apply_publish_overrides(config, &publish);

            let storage = LocalStorage::new(&config.crawler.output_dir);
            let path = csv.or_else(|| storage.latest_export()).ok_or_else(|| {
                AppError::config("no export found; run 'scrape' first or pass --csv")
            })?;
            let records = LocalStorage::read_posts_csv(&path)?;
            log::info!("Loaded {} records from {}", records.len(), path.display());

            let summary = pipeline::run_publish(page, config, &records, &creds, cancel).await?;
            log::info!(
                "Publish complete: {}/{} posted",
                summary.posted,
                summary.total()
            );
        }

        Command::Run { scrape, publish } => {
            let creds = build_credentials(&publish)?;
            apply_publish_overrides(config, &publish);

            let session = build_session(&scrape)?;
            let outcome = pipeline::run_scrape(page, config, &session, cancel).await?;
            if !scrape.no_media {
                pipeline::fetch_media(config, &outcome.records, cancel).await?;
            }
            if outcome.records.is_empty() {
                log::warn!("Nothing collected; skipping publish");
                return Ok(());
            }

            let summary =
                pipeline::run_publish(page, config, &outcome.records, &creds, cancel).await?;
            log::info!(
                "Pipeline complete: {} collected, {}/{} posted",
                outcome.records.len(),
                summary.posted,
                summary.total()
            );
        }

        Command::Validate => unreachable!("handled before the session opens"),
    }

    log::info!("Done!");
    Ok(())
}

fn apply_publish_overrides(config: &mut Config, args: &PublishArgs) {
    if args.keep_media {
        config.publish.keep_media = true;
    }
    if let Some(delay) = args.delay {
        config.publish.delay_between_posts_secs = delay;
    }
}
