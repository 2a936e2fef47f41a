use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::models::StrikeData;

/// Option contract variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum OptionType {
    #[serde(rename = "CE")]
    Call,
    #[serde(rename = "PE")]
    Put,
}

impl OptionType {
    pub const ALL: [OptionType; 2] = [OptionType::Call, OptionType::Put];

    pub fn as_str(&self) -> &'static str {
        match self {
            OptionType::Call => "CE",
            OptionType::Put => "PE",
        }
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Table key: option type first, then strike in hundredths so it can be ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InstrumentKey {
    pub option_type: OptionType,
    strike_cents: i64,
}

impl InstrumentKey {
    pub fn new(strike: f64, option_type: OptionType) -> Self {
        Self {
            option_type,
            strike_cents: (strike * 100.0).round() as i64,
        }
    }

    pub fn strike(&self) -> f64 {
        self.strike_cents as f64 / 100.0
    }
}

impl fmt::Display for InstrumentKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}", self.strike(), self.option_type)
    }
}

/// One price sample for one instrument, as read from a chain snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub strike: f64,
    pub option_type: OptionType,
    pub price: Option<f64>,
    pub instrument_key: Option<String>,
}

impl Observation {
    pub fn new(strike: f64, option_type: OptionType, price: Option<f64>) -> Self {
        Self { strike, option_type, price, instrument_key: None }
    }

    /// The traded price if it is usable for tracking
    pub fn valid_price(&self) -> Option<f64> {
        self.price.filter(|p| p.is_finite() && *p > 0.0)
    }
}

/// Flatten a chain snapshot into observations, one per (strike, side) present.
///
/// Strikes without a strike price and sides without market data are skipped;
/// a zero or missing LTP is kept so the table can ignore it.
pub fn observations_from_chain(chain: &[StrikeData]) -> Vec<Observation> {
    let mut observations = Vec::with_capacity(chain.len() * 2);

    for row in chain {
        let Some(strike) = row.strike_price.filter(|s| s.is_finite()) else {
            continue;
        };

        for option_type in OptionType::ALL {
            let Some(side) = row.side(option_type) else {
                continue;
            };
            let Some(market) = side.market_data.as_ref() else {
                continue;
            };

            observations.push(Observation {
                strike,
                option_type,
                price: market.ltp,
                instrument_key: side.instrument_key.clone(),
            });
        }
    }

    observations
}

/// Target price plus the band that makes a new low "near target"
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetBand {
    pub target: f64,
    pub tolerance: f64,
}

impl TargetBand {
    pub fn new(target: f64, tolerance: f64) -> Self {
        Self { target, tolerance }
    }

    pub fn distance(&self, price: f64) -> f64 {
        (price - self.target).abs()
    }

    pub fn is_near(&self, price: f64) -> bool {
        self.distance(price) <= self.tolerance
    }
}

/// Running state for one (strike, option type) pair
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedInstrument {
    pub strike: f64,
    pub option_type: OptionType,
    /// Lowest price since tracking began, never since market open
    pub running_low: f64,
    pub current_price: f64,
    pub first_price: f64,
    pub sample_count: u64,
    pub last_update_time: DateTime<Local>,
    pub instrument_key: Option<String>,
}

impl TrackedInstrument {
    fn first_seen(obs: &Observation, price: f64, now: DateTime<Local>) -> Self {
        Self {
            strike: obs.strike,
            option_type: obs.option_type,
            running_low: price,
            current_price: price,
            first_price: price,
            sample_count: 1,
            last_update_time: now,
            instrument_key: obs.instrument_key.clone(),
        }
    }
}

/// Emitted when an observation undercuts an instrument's running low
#[derive(Debug, Clone, PartialEq)]
pub struct NewLowEvent {
    pub key: InstrumentKey,
    pub old_low: f64,
    pub new_low: f64,
    pub drop_percent: f64,
    pub distance: f64,
    /// New low landed inside the target band
    pub near_target: bool,
    pub time: DateTime<Local>,
}

/// Per-instrument running lows, owned by whoever drives the poll loop
#[derive(Debug, Clone)]
pub struct LowTable {
    band: TargetBand,
    entries: BTreeMap<InstrumentKey, TrackedInstrument>,
}

impl LowTable {
    pub fn new(band: TargetBand) -> Self {
        Self { band, entries: BTreeMap::new() }
    }

    pub fn band(&self) -> TargetBand {
        self.band
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, strike: f64, option_type: OptionType) -> Option<&TrackedInstrument> {
        self.entries.get(&InstrumentKey::new(strike, option_type))
    }

    /// Entries ordered by option type, then ascending strike
    pub fn iter(&self) -> impl Iterator<Item = &TrackedInstrument> {
        self.entries.values()
    }

    /// Fold a single observation; returns the new-low event if one occurred.
    pub fn observe(&mut self, obs: &Observation, now: DateTime<Local>) -> Option<NewLowEvent> {
        let price = obs.valid_price()?;
        let key = InstrumentKey::new(obs.strike, obs.option_type);

        let Some(entry) = self.entries.get_mut(&key) else {
            self.entries.insert(key, TrackedInstrument::first_seen(obs, price, now));
            return None;
        };

        entry.current_price = price;
        entry.sample_count += 1;
        entry.last_update_time = now;
        if entry.instrument_key.is_none() {
            entry.instrument_key = obs.instrument_key.clone();
        }

        if price >= entry.running_low {
            return None;
        }

        let old_low = entry.running_low;
        entry.running_low = price;

        Some(NewLowEvent {
            key,
            old_low,
            new_low: price,
            drop_percent: (old_low - price) / old_low * 100.0,
            distance: self.band.distance(price),
            near_target: self.band.is_near(price),
            time: now,
        })
    }

    /// Fold a batch of observations in order, collecting new-low events.
    pub fn ingest<'a, I>(&mut self, observations: I, now: DateTime<Local>) -> Vec<NewLowEvent>
    where
        I: IntoIterator<Item = &'a Observation>,
    {
        observations
            .into_iter()
            .filter_map(|obs| self.observe(obs, now))
            .collect()
    }
}
