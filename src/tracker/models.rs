use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::lows::OptionType;

// -----------------------------------------------
// LENIENT FIELD READERS
// -----------------------------------------------
// Only presence is checked on the wire. A field of the wrong type on one
// instrument reads as absent instead of failing the whole chain.

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.and_then(|v| serde_json::from_value(v).ok()))
}

fn lenient_rows<'de, D>(deserializer: D) -> Result<Vec<StrikeData>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    let rows = match raw {
        Some(Value::Array(rows)) => rows,
        _ => return Ok(Vec::new()),
    };
    Ok(rows
        .into_iter()
        .filter_map(|row| serde_json::from_value(row).ok())
        .collect())
}

/// Envelope returned by the option chain endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OptionChainResponse {
    #[serde(default, deserialize_with = "lenient")]
    pub status: Option<String>,

    #[serde(default, deserialize_with = "lenient_rows")]
    pub data: Vec<StrikeData>,
}

/// One strike row of the option chain
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StrikeData {
    #[serde(default, deserialize_with = "lenient")]
    pub strike_price: Option<f64>,

    #[serde(default, deserialize_with = "lenient")]
    pub call_options: Option<OptionSide>,

    #[serde(default, deserialize_with = "lenient")]
    pub put_options: Option<OptionSide>,
}

impl StrikeData {
    pub fn side(&self, option_type: OptionType) -> Option<&OptionSide> {
        match option_type {
            OptionType::Call => self.call_options.as_ref(),
            OptionType::Put => self.put_options.as_ref(),
        }
    }
}

/// Call or put half of a strike row
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OptionSide {
    #[serde(default, deserialize_with = "lenient")]
    pub instrument_key: Option<String>,

    #[serde(default, deserialize_with = "lenient")]
    pub market_data: Option<MarketData>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarketData {
    #[serde(default, deserialize_with = "lenient")]
    pub ltp: Option<f64>,
}

/// Envelope returned by the intraday candle endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CandleResponse {
    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub data: Option<CandleData>,
}

/// Raw candle rows; each is `[timestamp, open, high, low, close, volume, oi]`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CandleData {
    #[serde(default)]
    pub candles: Vec<Value>,
}
