use anyhow::Result;
use chrono::Local;
use colored::Colorize;
use std::path::PathBuf;
use tracing::{info, warn};

use super::client::UpstoxClient;
use super::config::{self, TrackerSettings};
use super::display;
use super::lows::{OptionType, observations_from_chain};
use super::models::StrikeData;
use super::output::{self, ThreadSnapshot, TrackingStatus};
use super::selection::{CandidateResult, LowCandidate, select_nearest};
use super::window::window_low;
use crate::utility::timing::timed_async_if_slow;

/// An instrument from the chain that qualifies for a candle lookup
#[derive(Debug, Clone, PartialEq)]
pub struct WindowTarget {
    pub strike: f64,
    pub option_type: OptionType,
    pub instrument_key: String,
    pub ltp: f64,
}

fn strike_selected(key_strikes: &[f64], strike: f64) -> bool {
    key_strikes.is_empty() || key_strikes.iter().any(|k| (k - strike).abs() < 1e-6)
}

/// Instruments with an instrument key and a positive LTP, restricted to the
/// key strikes (all strikes when the list is empty).
pub fn window_targets(chain: &[StrikeData], key_strikes: &[f64]) -> Vec<WindowTarget> {
    observations_from_chain(chain)
        .into_iter()
        .filter(|obs| strike_selected(key_strikes, obs.strike))
        .filter_map(|obs| {
            let ltp = obs.valid_price()?;
            Some(WindowTarget {
                strike: obs.strike,
                option_type: obs.option_type,
                instrument_key: obs.instrument_key?,
                ltp,
            })
        })
        .collect()
}

/// Outcome of one snapshot run
#[derive(Debug, Clone)]
pub struct WindowReport {
    pub result: CandidateResult,
    pub evaluated: usize,
    pub path: PathBuf,
}

/// Fetch chain, aggregate per-instrument window lows, select and persist.
///
/// Returns `Ok(None)` when the chain itself could not be fetched.
pub async fn run_window_snapshot(
    client: &UpstoxClient,
    settings: &TrackerSettings,
) -> Result<Option<WindowReport>> {
    let window = settings.candle_window;

    let chain = match client
        .fetch_option_chain(&settings.instrument_key, &settings.expiry)
        .await
    {
        Ok(chain) => chain,
        Err(e) => {
            warn!(error = %e, "Option chain fetch failed, nothing written");
            println!("{} Failed to fetch option chain: {}", "✗".red(), e);
            return Ok(None);
        }
    };

    println!("{}", "Processing key strikes...".cyan());
    let mut candidates = Vec::new();

    for target in window_targets(&chain, &settings.key_strikes) {
        println!("  Strike {} {}...", target.strike, target.option_type);

        let fetched = timed_async_if_slow(
            format!("candles {}", target.instrument_key),
            config::SLOW_REQUEST_THRESHOLD_MS,
            || client.fetch_intraday_candles(&target.instrument_key),
        )
        .await;

        let candles = match fetched {
            Ok(candles) => candles,
            Err(e) => {
                warn!(instrument = %target.instrument_key, error = %e, "Candle fetch failed");
                continue;
            }
        };

        let Some(low) = window_low(&candles, &window) else {
            info!(instrument = %target.instrument_key, window = %window.label(), "No candles in window");
            continue;
        };

        candidates.push(LowCandidate {
            strike: target.strike,
            option_type: target.option_type,
            low,
            current_price: target.ltp,
            sample_count: 1,
            last_update_time: Local::now(),
        });
    }

    let result = select_nearest(&candidates, settings.target_price);
    let title = format!(
        "RESULTS - Options Nearest to ₹{:.0} ({} Timeframe Low):",
        settings.target_price,
        window.label()
    );
    display::summary(&title, &result, settings.target_price);

    let now = Local::now();
    let snapshot = ThreadSnapshot::new(&window, TrackingStatus::Active, candidates.len(), result.clone(), now);
    let path = output::output_path(&settings.output_dir, now);
    output::write_snapshot(&path, &settings.thread_id, &snapshot)?;
    println!("\n{} Saved to {}", "✓".green(), path.display());

    Ok(Some(WindowReport {
        result,
        evaluated: candidates.len(),
        path,
    }))
}
