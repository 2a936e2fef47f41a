use super::client::UpstoxClient;
use super::config::TrackerSettings;
use super::continuous::ContinuousTracker;
use super::credentials;
use super::display;
use super::snapshot;

use anyhow::Result;
use chrono::Local;
use colored::Colorize;
use tracing::{error, info};

/// Tracker command handler - entry points for both run modes
pub struct TrackerCommands;

impl TrackerCommands {
    fn build_client(settings: &TrackerSettings) -> Result<UpstoxClient> {
        let token = credentials::load_access_token(&settings.credentials_file)?;
        UpstoxClient::with_timeout(&token, settings.api_base_url.clone(), settings.http_timeout)
    }

    /// Poll the option chain until Ctrl-C (or `max_cycles`), tracking lows
    pub async fn run_continuous(settings: TrackerSettings) -> Result<()> {
        display::banner(&format!(
            "🎯 CONTINUOUS LOW TRACKER - Finding Options Nearest to ₹{:.0} LOW",
            settings.target_price
        ));
        println!("Started at: {}", Local::now().format("%H:%M:%S"));
        println!("Update interval: {} seconds", settings.interval.as_secs());
        println!("Target: Find options whose LOW is closest to ₹{:.0}", settings.target_price);
        println!("{}", "=".repeat(70).blue());
        println!();

        let client = Self::build_client(&settings)?;
        let tracker = ContinuousTracker::new(client, settings);

        let shutdown = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                // Without a signal handler the loop can only end via max_cycles.
                error!(error = %e, "Failed to listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
        };

        let reason = tracker.run(shutdown).await?;
        info!(?reason, "Continuous tracking finished");
        Ok(())
    }

    /// One-shot window low snapshot
    pub async fn run_window(settings: TrackerSettings) -> Result<()> {
        display::banner("WINDOWED LOW SNAPSHOT");
        println!("Fetching option chain...");
        println!("Timeframe: {}", settings.candle_window.label());
        println!();

        let client = Self::build_client(&settings)?;

        match snapshot::run_window_snapshot(&client, &settings).await? {
            Some(report) => info!(
                evaluated = report.evaluated,
                path = %report.path.display(),
                "Window snapshot written"
            ),
            None => println!("{} No data - output left unchanged", "ℹ".blue()),
        }

        Ok(())
    }
}
