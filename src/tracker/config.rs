use std::time::Duration;
use tracing::warn;

use super::window::{ClockTime, TimeWindow};

// -----------------------------------------------
// UPSTOX API ENDPOINTS
// -----------------------------------------------
pub const API_BASE_URL: &str = "https://api.upstox.com/v2";

pub fn option_chain_url(base: &str) -> String {
    format!("{}/option/chain", base)
}

pub fn intraday_candle_url(base: &str, instrument_key: &str) -> String {
    format!(
        "{}/historical-candle/intraday/{}/1minute",
        base,
        urlencoding::encode(instrument_key) // "NSE_FO|12345" carries a pipe
    )
}

// -----------------------------------------------
// HTTP CLIENT CONFIG
// -----------------------------------------------
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS);
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
pub const HEADER_ACCEPT_JSON: &str = "application/json";
pub const SLOW_REQUEST_THRESHOLD_MS: u128 = 2_000;

// -----------------------------------------------
// TRACKING DEFAULTS
// -----------------------------------------------
pub const DEFAULT_CREDENTIALS_FILE: &str = "upstox_credentials.txt";
pub const DEFAULT_INSTRUMENT_KEY: &str = "NSE_INDEX|Nifty 50";
pub const DEFAULT_EXPIRY: &str = "2025-11-25";
pub const DEFAULT_INTERVAL_SECS: u64 = 30;
pub const DEFAULT_TARGET_PRICE: f64 = 50.0;
pub const DEFAULT_TOLERANCE: f64 = 15.0;
pub const DEFAULT_LABEL_START: &str = "09:30";
pub const DEFAULT_LABEL_END: &str = "10:30";
pub const DEFAULT_WINDOW_START: &str = "10:00";
pub const DEFAULT_WINDOW_END: &str = "11:00";
pub const DEFAULT_KEY_STRIKES: &[f64] = &[25900.0, 25950.0, 26000.0, 26050.0, 26100.0];
pub const DEFAULT_OUTPUT_DIR: &str = "output";
pub const DEFAULT_THREAD_ID: &str = "thread_1";

// -----------------------------------------------
// RUNTIME CONFIGURATION
// -----------------------------------------------

/// Get the execution mode from environment or default to continuous
pub fn get_execution_mode() -> String {
    std::env::var("TRACKER_MODE").unwrap_or_else(|_| "continuous".to_string())
}

fn env_string(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_parsed<T: std::str::FromStr>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(raw) => match raw.trim().parse::<T>() {
            Ok(v) => v,
            Err(_) => {
                warn!(var = name, value = %raw, "Unparseable value, using default");
                default
            }
        },
        Err(_) => default,
    }
}

/// Parse a float, rejecting NaN and infinities.
pub fn parse_finite(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn env_finite(name: &str, default: f64) -> f64 {
    match std::env::var(name) {
        Ok(raw) => parse_finite(&raw).unwrap_or_else(|| {
            warn!(var = name, value = %raw, "Not a finite number, using default");
            default
        }),
        Err(_) => default,
    }
}

fn clock_or(raw: &str, default: &str) -> ClockTime {
    // Defaults are compile-time constants in HH:MM form.
    ClockTime::parse(raw)
        .or_else(|| ClockTime::parse(default))
        .unwrap_or(ClockTime::new(0, 0))
}

/// `start..end` when end is not before start, otherwise `None`.
pub fn ordered_window(start: ClockTime, end: ClockTime) -> Option<TimeWindow> {
    (end >= start).then_some(TimeWindow::new(start, end))
}

fn env_window(start_var: &str, end_var: &str, start: &str, end: &str) -> TimeWindow {
    let parse = |var: &str, default: &str| {
        let raw = env_string(var, default);
        if ClockTime::parse(&raw).is_none() {
            warn!(var, value = %raw, "Invalid HH:MM value, using default");
        }
        clock_or(&raw, default)
    };

    let (from, to) = (parse(start_var, start), parse(end_var, end));
    ordered_window(from, to).unwrap_or_else(|| {
        warn!(start = %from, end = %to, "Window ends before it starts, using defaults");
        TimeWindow::new(clock_or(start, start), clock_or(end, end))
    })
}

/// Parse a comma separated strike list; blank entries are skipped.
pub fn parse_strike_list(raw: &str) -> Option<Vec<f64>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<f64>().ok())
        .collect()
}

/// Everything the tracker and the snapshot tool need, resolved once at startup.
#[derive(Debug, Clone)]
pub struct TrackerSettings {
    pub api_base_url: String,
    pub credentials_file: String,
    pub instrument_key: String,
    pub expiry: String,
    pub interval: Duration,
    /// Per-request HTTP timeout; a request that runs past it skips the cycle.
    pub http_timeout: Duration,
    /// Zero means run until interrupted.
    pub max_cycles: u64,
    pub target_price: f64,
    pub tolerance: f64,
    /// Label window written into the continuous tracker's output.
    pub label_window: TimeWindow,
    /// Candle window used by the snapshot tool.
    pub candle_window: TimeWindow,
    /// Empty means every strike in the chain.
    pub key_strikes: Vec<f64>,
    pub output_dir: String,
    pub thread_id: String,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        let window = |s: &str, e: &str| TimeWindow::new(clock_or(s, s), clock_or(e, e));

        Self {
            api_base_url: API_BASE_URL.to_string(),
            credentials_file: DEFAULT_CREDENTIALS_FILE.to_string(),
            instrument_key: DEFAULT_INSTRUMENT_KEY.to_string(),
            expiry: DEFAULT_EXPIRY.to_string(),
            interval: Duration::from_secs(DEFAULT_INTERVAL_SECS),
            http_timeout: HTTP_TIMEOUT,
            max_cycles: 0,
            target_price: DEFAULT_TARGET_PRICE,
            tolerance: DEFAULT_TOLERANCE,
            label_window: window(DEFAULT_LABEL_START, DEFAULT_LABEL_END),
            candle_window: window(DEFAULT_WINDOW_START, DEFAULT_WINDOW_END),
            key_strikes: DEFAULT_KEY_STRIKES.to_vec(),
            output_dir: DEFAULT_OUTPUT_DIR.to_string(),
            thread_id: DEFAULT_THREAD_ID.to_string(),
        }
    }
}

impl TrackerSettings {
    /// Create settings from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let key_strikes = match std::env::var("TRACKER_KEY_STRIKES") {
            Ok(raw) => parse_strike_list(&raw).unwrap_or_else(|| {
                warn!(value = %raw, "Invalid TRACKER_KEY_STRIKES, using defaults");
                DEFAULT_KEY_STRIKES.to_vec()
            }),
            Err(_) => DEFAULT_KEY_STRIKES.to_vec(),
        };

        Self {
            api_base_url: env_string("TRACKER_API_BASE_URL", API_BASE_URL),
            credentials_file: env_string("TRACKER_CREDENTIALS_FILE", DEFAULT_CREDENTIALS_FILE),
            instrument_key: env_string("TRACKER_INSTRUMENT_KEY", DEFAULT_INSTRUMENT_KEY),
            expiry: env_string("TRACKER_EXPIRY", DEFAULT_EXPIRY),
            interval: Duration::from_secs(
                env_parsed("TRACKER_INTERVAL_SECS", DEFAULT_INTERVAL_SECS).max(1),
            ),
            http_timeout: Duration::from_secs(
                env_parsed("TRACKER_HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS).max(1),
            ),
            max_cycles: env_parsed("TRACKER_MAX_CYCLES", 0),
            target_price: env_finite("TRACKER_TARGET_PRICE", DEFAULT_TARGET_PRICE),
            tolerance: env_finite("TRACKER_TOLERANCE", DEFAULT_TOLERANCE).abs(),
            label_window: env_window(
                "TRACKER_LABEL_START",
                "TRACKER_LABEL_END",
                DEFAULT_LABEL_START,
                DEFAULT_LABEL_END,
            ),
            candle_window: env_window(
                "TRACKER_WINDOW_START",
                "TRACKER_WINDOW_END",
                DEFAULT_WINDOW_START,
                DEFAULT_WINDOW_END,
            ),
            key_strikes,
            output_dir: env_string("TRACKER_OUTPUT_DIR", DEFAULT_OUTPUT_DIR),
            thread_id: env_string("TRACKER_THREAD_ID", DEFAULT_THREAD_ID),
        }
    }

    /// Log the resolved configuration once at startup
    pub fn log_summary(&self) {
        tracing::info!(
            instrument = %self.instrument_key,
            expiry = %self.expiry,
            interval_secs = self.interval.as_secs(),
            http_timeout_secs = self.http_timeout.as_secs(),
            target = self.target_price,
            tolerance = self.tolerance,
            output_dir = %self.output_dir,
            "Tracker configuration"
        );
    }
}
