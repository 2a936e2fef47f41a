use chrono::{DateTime, FixedOffset, Timelike};
use serde_json::Value;
use std::fmt;

/// Wall-clock time at minute granularity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ClockTime {
    pub hour: u32,
    pub minute: u32,
}

impl ClockTime {
    pub fn new(hour: u32, minute: u32) -> Self {
        Self { hour, minute }
    }

    /// Parse "HH:MM" (24h)
    pub fn parse(raw: &str) -> Option<Self> {
        let (h, m) = raw.trim().split_once(':')?;
        let hour = h.parse::<u32>().ok()?;
        let minute = m.parse::<u32>().ok()?;
        (hour < 24 && minute < 60).then_some(Self { hour, minute })
    }

    fn minutes_of_day(self) -> u32 {
        self.hour * 60 + self.minute
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// Clock window `[start, end)` that also admits the exact `end` minute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: ClockTime,
    pub end: ClockTime,
}

impl TimeWindow {
    pub fn new(start: ClockTime, end: ClockTime) -> Self {
        Self { start, end }
    }

    /// "10:00-11:00"
    pub fn label(&self) -> String {
        format!("{}-{}", self.start, self.end)
    }

    pub fn contains(&self, t: ClockTime) -> bool {
        let m = t.minutes_of_day();
        let start = self.start.minutes_of_day();
        let end = self.end.minutes_of_day();

        (start <= m && m < end) || m == end
    }
}

/// One intraday OHLC candle
#[derive(Debug, Clone, PartialEq)]
pub struct Candle {
    pub timestamp: DateTime<FixedOffset>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub open_interest: f64,
}

impl Candle {
    /// Build a candle from a `[timestamp, open, high, low, close, volume, oi]` row.
    ///
    /// Returns `None` for anything that is not a well formed row; the caller
    /// treats those as missing data rather than failing the whole feed.
    pub fn from_row(row: &Value) -> Option<Self> {
        let fields = row.as_array()?;
        if fields.len() < 5 {
            return None;
        }

        let timestamp = DateTime::parse_from_rfc3339(fields[0].as_str()?).ok()?;
        let num = |idx: usize| fields.get(idx).and_then(Value::as_f64);

        Some(Self {
            timestamp,
            open: num(1)?,
            high: num(2)?,
            low: num(3)?,
            close: num(4)?,
            volume: num(5).unwrap_or(0.0),
            open_interest: num(6).unwrap_or(0.0),
        })
    }

    /// Exchange-local clock time of the candle (the timestamp's own offset)
    pub fn clock_time(&self) -> ClockTime {
        ClockTime::new(self.timestamp.hour(), self.timestamp.minute())
    }
}

/// Minimum low among candles whose clock time falls in the window.
///
/// `None` when no candle qualifies, including an empty feed.
pub fn window_low(candles: &[Candle], window: &TimeWindow) -> Option<f64> {
    candles
        .iter()
        .filter(|c| window.contains(c.clock_time()))
        .map(|c| c.low)
        .filter(|low| low.is_finite())
        .fold(None, |acc: Option<f64>, low| {
            Some(acc.map_or(low, |current| current.min(low)))
        })
}
