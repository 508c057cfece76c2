mod config;
mod database;
mod import;
mod monitoring;
mod notify;
mod orchestrator;
mod pool;

#[cfg(test)]
mod testing;

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tokio::sync::watch;
use tracing::{error, info};

use config::Config;
use database::MonitoredSite;
use monitoring::TickReport;
use orchestrator::Orchestrator;

/// Watches HTTP endpoints, records their status history and alerts on failures
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Optional TOML config file; environment variables override it
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Check all active sites every interval until interrupted (default)
    Run,
    /// Run exactly one check cycle and print what happened
    CheckOnce,
    /// Add every URL of a text file (one per line), skipping known ones
    Import { file: PathBuf },
    /// List tracked sites with their latest status
    Sites {
        #[arg(long)]
        json: bool,
    },
    /// Track a new URL
    Add {
        url: String,
        #[arg(short, long)]
        name: Option<String>,
    },
    /// Resume checking a site
    Enable { id: i64 },
    /// Stop checking a site without deleting it
    Disable { id: i64 },
    /// Delete a site and its history
    Remove { id: i64 },
    /// Show recent history for a site
    History {
        id: i64,
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },
    /// Delete history older than the retention window
    PurgeHistory,
    /// Print the effective configuration
    ShowConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Before the logger so RUST_LOG from .env applies
    dotenvy::dotenv().ok();
    logger::init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    if let Some(Command::ShowConfig) = cli.command {
        print!("{config}");
        return Ok(());
    }

    let orchestrator = Orchestrator::new(config).await?;
    let store = orchestrator.store();

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => {
            let (shutdown_tx, shutdown_rx) = watch::channel(false);
            tokio::spawn(async move {
                match tokio::signal::ctrl_c().await {
                    Ok(()) => info!("Shutdown requested"),
                    Err(e) => error!("Failed to listen for Ctrl-C: {}", e),
                }
                let _ = shutdown_tx.send(true);
            });

            orchestrator.run(shutdown_rx).await?;
        }
        Command::CheckOnce => {
            let scheduler = orchestrator.scheduler()?;
            print_report(&scheduler.run_tick().await);
        }
        Command::Import { file } => {
            let summary = import::import_file(store.as_ref(), &file).await?;
            println!(
                "Import complete: {} new site(s), {} already tracked",
                summary.added, summary.duplicates
            );
        }
        Command::Sites { json } => {
            let sites = store.list_sites().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&sites)?);
            } else {
                print_sites(&sites);
            }
        }
        Command::Add { url, name } => match store.add_site(name.as_deref(), &url).await? {
            Some(id) => println!("Added site {id}: {}", url.trim()),
            None => println!("{} is already tracked", url.trim()),
        },
        Command::Enable { id } => {
            store.set_active(id, true).await?;
            println!("Site {id} enabled");
        }
        Command::Disable { id } => {
            store.set_active(id, false).await?;
            println!("Site {id} disabled");
        }
        Command::Remove { id } => {
            store.delete_site(id).await?;
            println!("Site {id} removed");
        }
        Command::History { id, limit } => {
            let Some(site) = store.get_site(id).await? else {
                bail!("Site {id} not found");
            };
            println!("History for {} ({})", site.name, site.url);
            for record in store.history_for(id, limit).await? {
                println!(
                    "  {}  {:<16} {:.3}s",
                    record.checked_at.format("%Y-%m-%d %H:%M:%S"),
                    record.status,
                    record.response_time
                );
            }
        }
        Command::PurgeHistory => {
            let deleted = orchestrator.retention().cleanup_expired_history().await?;
            println!("Deleted {deleted} history row(s)");
        }
        Command::ShowConfig => {}
    }

    Ok(())
}

fn print_sites(sites: &[MonitoredSite]) {
    if sites.is_empty() {
        println!("No sites tracked");
        return;
    }

    for site in sites {
        let checked = site
            .last_checked_at
            .map(|t| t.format("%d-%m-%Y %H:%M:%S").to_string())
            .unwrap_or_else(|| "never".into());
        println!(
            "{:>4} {:<3} {:<16} {:>7.3}s  {:<19}  {} ({})",
            site.id,
            if site.active { "on" } else { "off" },
            site.status,
            site.response_time,
            checked,
            site.url,
            site.name
        );
    }
}

fn print_report(report: &TickReport) {
    match report {
        TickReport::Offline => println!("No outbound connectivity; cycle skipped"),
        TickReport::Aborted { reason } => println!("Cycle aborted: {reason}"),
        TickReport::Completed(summary) => {
            println!(
                "Checked {} site(s), {} failing, {} storage error(s)",
                summary.checked,
                summary.failures.len(),
                summary.store_errors
            );
            for failure in &summary.failures {
                println!("  - {}: {}", failure.url, failure.reason);
            }
            for delivery in &summary.deliveries {
                println!("  alert via {}: {:?}", delivery.channel(), delivery);
            }
        }
    }
}
