use std::path::PathBuf;
use std::sync::Arc;

use advisor_core::allocation::{self, DEFAULT_PREVIEW_LIMIT};
use advisor_core::dataset::{DatasetSource, FileDatasetSource};
use advisor_core::domain::profile::{self, Horizon, RiskProfile, MAX_AGE, MIN_AGE};
use advisor_core::session::{SelectionSource, Session};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod report;

#[derive(Debug, Parser)]
#[command(name = "advisor_cli")]
struct Args {
    /// Investor age in years.
    #[arg(long, value_parser = clap::value_parser!(u32).range(MIN_AGE as i64..=MAX_AGE as i64))]
    age: u32,

    /// Investment horizon: short, medium or long.
    #[arg(long, value_parser = parse_horizon)]
    horizon: Horizon,

    /// Use this profile instead of the suggested one.
    #[arg(long, value_parser = parse_profile)]
    profile: Option<RiskProfile>,

    /// Total amount to invest.
    #[arg(long, default_value_t = allocation::DEFAULT_INVESTMENT)]
    amount: f64,

    /// Rows to print from the ranked allocation.
    #[arg(long, default_value_t = 15)]
    top: usize,

    /// Dataset CSV path. Defaults to DATASET_URL or DATASET_PATH.
    #[arg(long)]
    dataset: Option<PathBuf>,

    /// Also print the first rows of the chosen cluster.
    #[arg(long)]
    preview: bool,

    /// Print the full result as JSON instead of a table.
    #[arg(long)]
    json: bool,
}

fn parse_horizon(s: &str) -> Result<Horizon, String> {
    s.parse().map_err(|e: advisor_core::AdvisorError| e.to_string())
}

fn parse_profile(s: &str) -> Result<RiskProfile, String> {
    profile::select_manual(s).map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = advisor_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    let res = run(&settings, &args).await;
    if let Err(err) = &res {
        sentry_anyhow::capture_anyhow(err);
        tracing::error!(error = %err, "advisory run failed");
    }
    res
}

async fn run(settings: &advisor_core::config::Settings, args: &Args) -> anyhow::Result<()> {
    let source: Arc<dyn DatasetSource> = match &args.dataset {
        Some(path) => Arc::new(FileDatasetSource::new(path)),
        None => advisor_core::dataset::source_from_settings(settings)?,
    };
    let dataset = source.load().await?;

    let suggested = profile::suggest(args.age, args.horizon);
    let now = chrono::Utc::now();
    let mut session = Session::new(now);
    match args.profile {
        Some(manual) => session.commit(manual, SelectionSource::Manual, now),
        None => session.commit(suggested, SelectionSource::Suggested, now),
    }

    let records = session.allocate(&dataset.instruments, args.amount)?;
    let chosen = session
        .profile()
        .ok_or(advisor_core::AdvisorError::NoProfileSelected)?;
    let preview = args
        .preview
        .then(|| allocation::preview(&dataset.instruments, chosen, DEFAULT_PREVIEW_LIMIT));

    tracing::info!(
        age = args.age,
        horizon = %args.horizon,
        %suggested,
        %chosen,
        amount = args.amount,
        rows = records.len(),
        "allocation computed"
    );

    let report = report::Report {
        suggested,
        chosen,
        total_investment: args.amount,
        preview,
        items: records,
        top: args.top,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{report}");
    }
    Ok(())
}

fn init_sentry(settings: &advisor_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
