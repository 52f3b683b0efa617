//! CLI entrypoint for the padcollide search.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{ArgAction, Parser};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use padcollide::{
    io, Checkpoint, Collider, Collision, DigestAlgorithm, Document, MatchKey, PaddingScheme,
    SearchBudget, SearchConfig, SearchOutcome, Side, SqliteCacheStore, VariantCache,
};

/// Find whitespace-padded variants of two documents whose digests share a
/// suffix.
#[derive(Debug, Parser)]
#[command(name = "padcollide")]
#[command(about = "Birthday-attack search for documents with colliding truncated digests")]
struct Cli {
    /// Path to the real document.
    real: PathBuf,
    /// Path to the fake document.
    fake: PathBuf,
    /// Number of trailing hex characters that must match.
    num_chars: usize,
    /// Digest algorithm (sha256 or blake3).
    #[arg(long, default_value = "sha256")]
    algorithm: DigestAlgorithm,
    /// Padding scheme (lines or trailing).
    #[arg(long, default_value = "lines")]
    scheme: PaddingScheme,
    /// Stop after this many attempts without a collision.
    #[arg(long)]
    max_attempts: Option<u64>,
    /// Stop after this many seconds without a collision.
    #[arg(long)]
    max_seconds: Option<u64>,
    /// CBOR checkpoint file; resumed from if present, written if the run stops early.
    #[arg(long, conflicts_with = "cache_db")]
    checkpoint: Option<PathBuf>,
    /// Keep the caches in a SQLite database instead of memory; resumable.
    #[arg(long)]
    cache_db: Option<PathBuf>,
    /// Print a JSON report on stdout.
    #[arg(long)]
    json: bool,
    /// More log output (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum Report {
    Collision {
        match_key: MatchKey,
        attempt: u64,
        real_output: PathBuf,
        fake_output: PathBuf,
        algorithm: DigestAlgorithm,
        num_chars: usize,
    },
    Exhausted {
        next_attempt: u64,
    },
    Interrupted {
        next_attempt: u64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = SearchConfig {
        num_chars: cli.num_chars,
        algorithm: cli.algorithm,
        scheme: cli.scheme,
        budget: SearchBudget {
            max_attempts: cli.max_attempts,
            max_duration: cli.max_seconds.map(Duration::from_secs),
        },
        ..SearchConfig::default()
    };
    // Reject a bad suffix length before touching the filesystem.
    config.digest()?;

    let real = io::read_document(&cli.real)
        .with_context(|| format!("reading real document {}", cli.real.display()))?;
    let fake = io::read_document(&cli.fake)
        .with_context(|| format!("reading fake document {}", cli.fake.display()))?;

    let stop = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&stop);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, stopping search");
            flag.store(true, Ordering::Relaxed);
        }
    });

    let outcome = if let Some(db_path) = &cli.cache_db {
        search_sqlite(real, fake, &config, db_path, stop).await?
    } else {
        search_memory(real, fake, &config, cli.checkpoint.as_deref(), stop).await?
    };

    report(&cli, outcome)
}

async fn search_memory(
    real: Document,
    fake: Document,
    config: &SearchConfig,
    checkpoint_path: Option<&Path>,
    stop: Arc<AtomicBool>,
) -> anyhow::Result<SearchOutcome> {
    let collider = match checkpoint_path {
        Some(path) if path.exists() => {
            let checkpoint = Checkpoint::load(path)
                .with_context(|| format!("loading checkpoint {}", path.display()))?;
            tracing::warn!(
                path = %path.display(),
                next_attempt = checkpoint.next_attempt,
                "resuming from checkpoint"
            );
            Collider::from_checkpoint(real, fake, config, checkpoint)?
        }
        _ => Collider::new(real, fake, config)?,
    };

    let (outcome, collider) = run_blocking(collider.with_stop_flag(stop)).await?;

    if let Some(path) = checkpoint_path {
        if matches!(outcome, SearchOutcome::Collision(_)) {
            if path.exists() {
                std::fs::remove_file(path)
                    .with_context(|| format!("removing checkpoint {}", path.display()))?;
            }
        } else {
            collider
                .checkpoint()?
                .save(path)
                .with_context(|| format!("saving checkpoint {}", path.display()))?;
        }
    }

    Ok(outcome)
}

async fn search_sqlite(
    real: Document,
    fake: Document,
    config: &SearchConfig,
    db_path: &Path,
    stop: Arc<AtomicBool>,
) -> anyhow::Result<SearchOutcome> {
    let store = SqliteCacheStore::open(db_path)
        .with_context(|| format!("opening cache database {}", db_path.display()))?;
    let collider = Collider::with_caches(
        real,
        fake,
        config,
        store.cache(Side::Real),
        store.cache(Side::Fake),
    )?;
    let fingerprint = collider.fingerprint();

    let collider = match store.resume_position(&fingerprint)? {
        Some(next) => {
            tracing::warn!(path = %db_path.display(), next_attempt = next, "resuming from cache database");
            collider.starting_at(next)
        }
        None => {
            // Rows without a position row come from a run that never
            // recorded one; they cannot be trusted to belong to this search.
            store.clear()?;
            store.save_position(&fingerprint, 0)?;
            collider
        }
    };

    let (outcome, collider) = run_blocking(collider.with_stop_flag(stop)).await?;
    store.save_position(&fingerprint, collider.next_attempt())?;
    Ok(outcome)
}

async fn run_blocking<R, F>(
    mut collider: Collider<R, F>,
) -> anyhow::Result<(SearchOutcome, Collider<R, F>)>
where
    R: VariantCache + Send + 'static,
    F: VariantCache + Send + 'static,
{
    let result = tokio::task::spawn_blocking(move || {
        let outcome = collider.run()?;
        Ok::<_, padcollide::SearchError>((outcome, collider))
    })
    .await
    .context("search task failed")??;
    Ok(result)
}

fn report(cli: &Cli, outcome: SearchOutcome) -> anyhow::Result<ExitCode> {
    match outcome {
        SearchOutcome::Collision(collision) => {
            let (real_out, fake_out) = write_outputs(cli, &collision)?;
            if cli.json {
                print_json(&Report::Collision {
                    match_key: collision.key,
                    attempt: collision.attempt,
                    real_output: real_out,
                    fake_output: fake_out,
                    algorithm: cli.algorithm,
                    num_chars: cli.num_chars,
                })?;
            } else {
                println!(
                    "Collision found! {} and {} have the same hash: {}",
                    real_out.display(),
                    fake_out.display(),
                    collision.key
                );
            }
            Ok(ExitCode::SUCCESS)
        }
        SearchOutcome::Exhausted { next_attempt } => {
            if cli.json {
                print_json(&Report::Exhausted { next_attempt })?;
            } else {
                eprintln!("No collision found within budget ({} attempts made)", next_attempt);
            }
            Ok(ExitCode::FAILURE)
        }
        SearchOutcome::Interrupted { next_attempt } => {
            if cli.json {
                print_json(&Report::Interrupted { next_attempt })?;
            } else {
                eprintln!("Search interrupted after {} attempts", next_attempt);
            }
            Ok(ExitCode::FAILURE)
        }
    }
}

fn write_outputs(cli: &Cli, collision: &Collision) -> anyhow::Result<(PathBuf, PathBuf)> {
    io::write_collision(&cli.real, &cli.fake, collision).context("writing collision outputs")
}

fn print_json(report: &Report) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
