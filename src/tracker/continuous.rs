use anyhow::Result;
use chrono::{DateTime, Local};
use colored::Colorize;
use std::future::Future;
use std::path::PathBuf;
use tracing::{error, info, warn};

use super::client::UpstoxClient;
use super::config::TrackerSettings;
use super::display;
use super::lows::{LowTable, NewLowEvent, TargetBand, observations_from_chain};
use super::models::StrikeData;
use super::output::{self, ThreadSnapshot, TrackingStatus};
use super::selection::{CandidateResult, select_from_table};

/// Why the poll loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Interrupted,
    MaxCycles,
}

/// Poll loop state: one client, one table, one writer.
pub struct ContinuousTracker {
    client: UpstoxClient,
    settings: TrackerSettings,
    table: LowTable,
    cycles: u64,
}

impl ContinuousTracker {
    pub fn new(client: UpstoxClient, settings: TrackerSettings) -> Self {
        let band = TargetBand::new(settings.target_price, settings.tolerance);
        Self {
            client,
            settings,
            table: LowTable::new(band),
            cycles: 0,
        }
    }

    pub fn table(&self) -> &LowTable {
        &self.table
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Fold one chain snapshot into the table and report new lows.
    pub fn apply_snapshot(&mut self, chain: &[StrikeData], now: DateTime<Local>) -> Vec<NewLowEvent> {
        let observations = observations_from_chain(chain);
        let events = self.table.ingest(&observations, now);

        for event in &events {
            if event.near_target {
                warn!(
                    strike = event.key.strike(),
                    option_type = %event.key.option_type,
                    old_low = event.old_low,
                    new_low = event.new_low,
                    drop_pct = event.drop_percent,
                    distance = event.distance,
                    "New low near target"
                );
            } else {
                info!(
                    strike = event.key.strike(),
                    option_type = %event.key.option_type,
                    old_low = event.old_low,
                    new_low = event.new_low,
                    "New low"
                );
            }
            display::new_low(event, self.table.band().target);
        }

        events
    }

    pub fn select(&self) -> CandidateResult {
        select_from_table(&self.table)
    }

    /// Rewrite the output file with the current selection
    pub fn persist(&self, status: TrackingStatus, now: DateTime<Local>) -> Result<PathBuf> {
        let snapshot = ThreadSnapshot::new(
            &self.settings.label_window,
            status,
            self.table.len(),
            self.select(),
            now,
        );
        let path = output::output_path(&self.settings.output_dir, now);
        output::write_snapshot(&path, &self.settings.thread_id, &snapshot)?;
        Ok(path)
    }

    /// Everything after a successful fetch. No await points: a cycle either
    /// finishes this whole block or never reaches it.
    fn complete_cycle(&mut self, chain: &[StrikeData]) {
        let now = Local::now();
        self.apply_snapshot(chain, now);

        let result = self.select();
        println!("⏰ {} Status:", now.format("%H:%M:%S"));
        display::status(&result);

        if let Err(e) = self.persist(TrackingStatus::Active, now) {
            error!(error = %e, "Failed to save tracking data");
        }
    }

    /// Poll until `shutdown` resolves or `max_cycles` is reached, then write a
    /// final summary.
    pub async fn run<S>(mut self, shutdown: S) -> Result<StopReason>
    where
        S: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        let reason = loop {
            self.cycles += 1;
            println!(
                "{} {} - Fetching option chain...",
                format!("[Sample {}]", self.cycles).cyan(),
                Local::now().format("%H:%M:%S")
            );

            let fetched = tokio::select! {
                _ = &mut shutdown => break StopReason::Interrupted,
                res = self.client.fetch_option_chain(&self.settings.instrument_key, &self.settings.expiry) => res,
            };

            match fetched {
                Ok(chain) if !chain.is_empty() => self.complete_cycle(&chain),
                Ok(_) => {
                    warn!(cycle = self.cycles, "Option chain was empty");
                    println!("{} No data received", "❌".to_string());
                }
                Err(e) => {
                    warn!(cycle = self.cycles, timeout = e.is_timeout(), error = %e, "Fetch failed, skipping cycle");
                    println!("{} No data received", "❌".to_string());
                }
            }

            if self.settings.max_cycles > 0 && self.cycles >= self.settings.max_cycles {
                break StopReason::MaxCycles;
            }

            tokio::select! {
                _ = &mut shutdown => break StopReason::Interrupted,
                _ = tokio::time::sleep(self.settings.interval) => {}
            }
        };

        self.finish(reason);
        Ok(reason)
    }

    fn finish(&self, reason: StopReason) {
        let now = Local::now();
        match reason {
            StopReason::Interrupted => println!("\n\n{} Tracking stopped", "⏹️".to_string()),
            StopReason::MaxCycles => println!("\n{} Reached {} cycles", "⏹️".to_string(), self.cycles),
        }
        println!("Total samples collected: {}", self.cycles);
        println!("Total options tracked: {}", self.table.len());
        info!(cycles = self.cycles, tracked = self.table.len(), reason = ?reason, "Tracker stopped");

        let title = format!("FINAL SUMMARY - Options Nearest to ₹{:.0} LOW:", self.settings.target_price);
        display::summary(&title, &self.select(), self.settings.target_price);

        match self.persist(TrackingStatus::Stopped, now) {
            Ok(path) => println!("{} Final snapshot saved to {}", "✓".green(), path.display()),
            Err(e) => error!(error = %e, "Failed to save final snapshot"),
        }
    }
}
