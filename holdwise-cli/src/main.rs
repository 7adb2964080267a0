//! Holdwise CLI: run the recommendation engine over JSON inputs.
//!
//! Commands:
//! - `analyze`: load a snapshot, price history, and optional candidates,
//!   then print the report as text or JSON and optionally export CSV
//! - `policy`: print the effective configuration as TOML
//!
//! Logging goes to stderr and is controlled with `RUST_LOG`.

mod export;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use holdwise_core::domain::{BuyCandidate, PortfolioSnapshot, PriceSeries};
use holdwise_core::{analyze, AnalysisInput, EngineConfig, ProfileKind};

#[derive(Parser)]
#[command(
    name = "holdwise",
    about = "Holdwise: rule-based portfolio recommendations"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a portfolio snapshot and print recommendations.
    Analyze {
        /// Snapshot JSON: `{"positions": [...], "cash": 12345.0}`.
        #[arg(long)]
        snapshot: PathBuf,

        /// Price history JSON: `{"TICKER": [{"date": "2024-01-02", "close": 10.0}, ...]}`.
        #[arg(long)]
        prices: Option<PathBuf>,

        /// Buy candidates JSON: `[{"ticker": ..., "price": ..., "confidence": ...}]`.
        #[arg(long)]
        candidates: Option<PathBuf>,

        /// Policy TOML. Defaults are used for anything it omits.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Signal profile; overrides the one in --config.
        #[arg(long, value_enum)]
        profile: Option<ProfileArg>,

        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,

        /// Also write the recommendations as CSV to this path.
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Print the effective policy as TOML.
    Policy {
        /// Policy TOML to merge over the defaults.
        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long, value_enum)]
        profile: Option<ProfileArg>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ProfileArg {
    ShortHorizon,
    General,
}

impl From<ProfileArg> for ProfileKind {
    fn from(arg: ProfileArg) -> Self {
        match arg {
            ProfileArg::ShortHorizon => ProfileKind::ShortHorizon,
            ProfileArg::General => ProfileKind::General,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            snapshot,
            prices,
            candidates,
            config,
            profile,
            format,
            csv,
        } => run_analyze(&snapshot, prices, candidates, config, profile, format, csv),
        Commands::Policy { config, profile } => {
            let config = load_config(config.as_deref(), profile)?;
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

fn run_analyze(
    snapshot_path: &Path,
    prices: Option<PathBuf>,
    candidates: Option<PathBuf>,
    config: Option<PathBuf>,
    profile: Option<ProfileArg>,
    format: Format,
    csv_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config(config.as_deref(), profile)?;
    let snapshot: PortfolioSnapshot = read_json(snapshot_path)?;
    let history: HashMap<String, PriceSeries> = match prices {
        Some(path) => read_json(&path)?,
        None => HashMap::new(),
    };
    let candidates: Vec<BuyCandidate> = match candidates {
        Some(path) => read_json(&path)?,
        None => Vec::new(),
    };

    tracing::debug!(
        positions = snapshot.positions.len(),
        series = history.len(),
        candidates = candidates.len(),
        profile = ?config.profile.kind,
        "inputs loaded"
    );

    let input = AnalysisInput::new(snapshot)
        .with_history(history)
        .with_candidates(candidates);
    let report = analyze(&input, &config).context("analysis failed")?;

    match format {
        Format::Text => print!("{}", export::render_text(&report)),
        Format::Json => println!("{}", export::export_json(&report)?),
    }

    if let Some(path) = csv_path {
        let csv = export::export_recommendations_csv(&report)?;
        std::fs::write(&path, csv)
            .with_context(|| format!("failed to write CSV to {}", path.display()))?;
        tracing::info!(path = %path.display(), "recommendations exported");
    }

    Ok(())
}

fn load_config(path: Option<&Path>, profile: Option<ProfileArg>) -> Result<EngineConfig> {
    let config = match path {
        Some(path) => EngineConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    Ok(match profile {
        Some(kind) => config.with_profile(kind.into()),
        None => config,
    })
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
}
