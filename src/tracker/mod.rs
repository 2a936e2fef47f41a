pub mod client;
pub mod commands;
pub mod config;
pub mod continuous;
pub mod credentials;
pub mod display;
pub mod lows;
pub mod models;
pub mod output;
pub mod selection;
pub mod snapshot;
pub mod window;

// Re-exports (public API)
pub use client::UpstoxClient;
pub use commands::TrackerCommands;
pub use config::TrackerSettings;
pub use continuous::{ContinuousTracker, StopReason};
pub use lows::{
    InstrumentKey,
    LowTable,
    NewLowEvent,
    Observation,
    OptionType,
    TargetBand,
    TrackedInstrument,
    observations_from_chain,
};
pub use models::{MarketData, OptionChainResponse, OptionSide, StrikeData};
pub use output::{ThreadSnapshot, TrackingStatus, output_path, write_snapshot};
pub use selection::{CandidateResult, LowCandidate, SelectedStrike, select_from_table, select_nearest};
pub use snapshot::{WindowReport, run_window_snapshot, window_targets};
pub use window::{Candle, ClockTime, TimeWindow, window_low};
