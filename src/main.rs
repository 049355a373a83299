use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tft_tracker::api::{build_router, cors_layer, AppState};
use tft_tracker::calculate::{aggregate, Dashboard, FilterMode, RankedEntry};
use tft_tracker::config::AppConfig;
use tft_tracker::models::RosterSnapshot;
use tft_tracker::parse_duration;
use tft_tracker::riot::{RiotClient, StatsApi};
use tft_tracker::roster::{FetchPolicy, RosterFetcher};
use tft_tracker::sync::{SharedSnapshot, SyncConfig, SyncOrchestrator};

#[derive(Parser)]
#[command(name = "tft-tracker")]
#[command(about = "Ranked TFT roster tracker with a custom points ladder")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./tft-tracker.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the roster once and print the snapshot as JSON
    Fetch {
        /// Write the snapshot to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Print rankings for a saved snapshot
    Report {
        /// Snapshot JSON written by `fetch` (or an /api/stats response)
        #[arg(long)]
        input: PathBuf,

        /// Match window: today, last10 or last20
        #[arg(long)]
        filter: Option<String>,

        /// Print the full dashboard as JSON
        #[arg(long)]
        json: bool,
    },

    /// Start the API server with periodic refresh
    Serve {
        #[arg(long)]
        host: Option<String>,

        #[arg(long)]
        port: Option<u16>,

        /// Refresh interval (e.g., "60s", "5m")
        #[arg(long)]
        interval: Option<String>,
    },
}

/// Load the config file, or the defaults when it does not exist.
/// Runs before logging is set up, so the caller reports which one was used.
fn load_config(path: &Path) -> Result<(AppConfig, bool)> {
    if path.exists() {
        let config = AppConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?;
        Ok((config, true))
    } else {
        let config = AppConfig::default();
        config.validate()?;
        Ok((config, false))
    }
}

fn build_fetcher(config: &AppConfig) -> Result<RosterFetcher> {
    let client = RiotClient::from_settings(&config.riot).context("Failed to build Riot client")?;
    let api: Arc<dyn StatsApi> = Arc::new(client);
    Ok(RosterFetcher::new(api, FetchPolicy::from(&config.fetch)))
}

fn print_board(title: &str, entries: &[RankedEntry], dashboard: &Dashboard) {
    println!("\n{}", title);
    for entry in entries {
        let name = dashboard
            .player(&entry.player_id)
            .map(|p| format!("{}#{}", p.name, p.tag))
            .unwrap_or_else(|| entry.player_id.to_string());
        let medal = entry
            .badge
            .map(|b| format!("{:?}", b).to_lowercase())
            .unwrap_or_default();
        println!(
            "  {:>2}. {:<24} {:>+5} pts  {:>2} games  {}",
            entry.position + 1,
            name,
            entry.value,
            entry.games,
            medal
        );
    }
}

fn print_report(dashboard: &Dashboard) {
    println!("Filter: {}", dashboard.filter);

    for player in &dashboard.players {
        let s = &player.stats;
        println!(
            "  {}#{}: {} pts over {} games, avg {} pts, avg place {}, top4 {}%, win {}%",
            player.name,
            player.tag,
            s.total_points,
            s.filtered_games,
            s.avg_points_display(),
            s.avg_placement_display(),
            s.top4_rate,
            s.win_rate
        );
    }

    print_board("Overall", &dashboard.rankings.overall, dashboard);
    print_board("Solo", &dashboard.rankings.solo, dashboard);
    if let Some(shared) = &dashboard.rankings.shared {
        print_board("Shared", shared, dashboard);
    }

    println!("\nCommon matches: {}", dashboard.common_matches.len());
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let (config, from_file) = load_config(&cli.config)?;

    // Initialize tracing
    let log_level = cli.log_level.as_deref().unwrap_or(&config.log_level);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(cli.json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!cli.json_logs).then(tracing_subscriber::fmt::layer))
        .init();

    tracing::info!("Starting tft-tracker v{}", env!("CARGO_PKG_VERSION"));
    if from_file {
        tracing::info!("Loaded config from {}", cli.config.display());
    } else {
        tracing::info!("No config at {}, using defaults", cli.config.display());
    }

    match cli.command {
        Commands::Fetch { output } => {
            let fetcher = build_fetcher(&config)?;
            let snapshot = fetcher.fetch_roster(&config.roster).await;

            for failure in &snapshot.failures {
                tracing::warn!("Skipped {}: {}", failure.player, failure.error);
            }
            if snapshot.is_empty() {
                anyhow::bail!("No player data could be fetched");
            }

            let json = serde_json::to_string_pretty(&snapshot)?;
            match output {
                Some(path) => {
                    std::fs::write(&path, json)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    tracing::info!(
                        "Wrote {} players to {}",
                        snapshot.players.len(),
                        path.display()
                    );
                }
                None => println!("{}", json),
            }
        }
        Commands::Report {
            input,
            filter,
            json,
        } => {
            let content = std::fs::read_to_string(&input)
                .with_context(|| format!("Failed to read {}", input.display()))?;
            let snapshot = RosterSnapshot::from_json(&content)
                .with_context(|| format!("Invalid snapshot in {}", input.display()))?;

            let mode = match filter {
                Some(raw) => raw.parse::<FilterMode>()?,
                None => config.refresh.default_filter,
            };
            let dashboard = aggregate(&snapshot.players, mode);

            if json {
                println!("{}", serde_json::to_string_pretty(&dashboard)?);
            } else {
                print_report(&dashboard);
            }
        }
        Commands::Serve {
            host,
            port,
            interval,
        } => {
            let interval = match interval {
                Some(raw) => parse_duration(&raw)
                    .filter(|d| !d.is_zero())
                    .with_context(|| format!("Invalid --interval: {}", raw))?,
                None => config.refresh_interval()?,
            };

            let fetcher = build_fetcher(&config)?;
            let orchestrator = Arc::new(SyncOrchestrator::new(
                SyncConfig {
                    roster: config.roster.clone(),
                    interval,
                },
                fetcher,
                SharedSnapshot::default(),
            ));

            tokio::spawn(orchestrator.clone().run_periodic());

            let state = AppState::new(orchestrator.clone(), config.refresh.default_filter);
            let app = build_router(state).layer(cors_layer(&config.server.cors_origin));

            let addr = format!(
                "{}:{}",
                host.unwrap_or_else(|| config.server.host.clone()),
                port.unwrap_or(config.server.port)
            );
            let listener = tokio::net::TcpListener::bind(&addr)
                .await
                .with_context(|| format!("Failed to bind {}", addr))?;
            tracing::info!("Dashboard API: http://{}", addr);

            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = tokio::signal::ctrl_c().await;
                    tracing::info!("Shutting down");
                    orchestrator.cancel().await;
                })
                .await?;
        }
    }

    Ok(())
}
