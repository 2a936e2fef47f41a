use anyhow::Result;
use option_low_tracker::logging;
use option_low_tracker::tracker::{TrackerCommands, TrackerSettings, config};

#[tokio::main]
async fn main() -> Result<()> {
    let _log_guard = logging::init_logging()?;

    // ========================================
    // CONFIGURATION - from environment
    // ========================================
    let mode = config::get_execution_mode();
    let settings = TrackerSettings::from_env();
    settings.log_summary();

    match mode.as_str() {
        "continuous" => TrackerCommands::run_continuous(settings).await?,
        "window" => TrackerCommands::run_window(settings).await?,
        _ => {
            eprintln!("Invalid mode '{}'. Use 'continuous' or 'window'", mode);
            eprintln!("Set TRACKER_MODE environment variable to control execution mode");
            eprintln!("Examples:");
            eprintln!("  TRACKER_MODE=continuous TRACKER_INTERVAL_SECS=30 cargo run");
            eprintln!("  TRACKER_MODE=window TRACKER_WINDOW_START=10:00 TRACKER_WINDOW_END=11:00 cargo run");
            std::process::exit(1);
        }
    }

    Ok(())
}
