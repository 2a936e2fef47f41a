use chrono::{DateTime, Local};
use serde::Serialize;

use super::lows::{LowTable, OptionType};

/// Something that can be ranked by its low
#[derive(Debug, Clone, PartialEq)]
pub struct LowCandidate {
    pub strike: f64,
    pub option_type: OptionType,
    pub low: f64,
    pub current_price: f64,
    pub sample_count: u64,
    pub last_update_time: DateTime<Local>,
}

/// Winning instrument for one side
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectedStrike {
    pub strike: f64,
    pub low: f64,
    #[serde(rename = "ltp")]
    pub current_price: f64,
    pub distance: f64,
    #[serde(rename = "samples")]
    pub sample_count: u64,
    #[serde(rename = "last_update", serialize_with = "serialize_clock")]
    pub last_update_time: DateTime<Local>,
}

fn serialize_clock<S: serde::Serializer>(t: &DateTime<Local>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&t.format("%H:%M:%S").to_string())
}

/// Best call and best put, each absent when that pool is empty
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidateResult {
    pub call: Option<SelectedStrike>,
    pub put: Option<SelectedStrike>,
}

impl CandidateResult {
    pub fn side(&self, option_type: OptionType) -> Option<&SelectedStrike> {
        match option_type {
            OptionType::Call => self.call.as_ref(),
            OptionType::Put => self.put.as_ref(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.call.is_none() && self.put.is_none()
    }
}

/// Pick, per option type, the candidate whose low is nearest the target.
///
/// Equal distances resolve to the lower strike, so the result does not depend
/// on input order.
pub fn select_nearest<'a, I>(candidates: I, target: f64) -> CandidateResult
where
    I: IntoIterator<Item = &'a LowCandidate>,
{
    let mut best_call: Option<(&LowCandidate, f64)> = None;
    let mut best_put: Option<(&LowCandidate, f64)> = None;

    for candidate in candidates {
        if !candidate.low.is_finite() {
            continue;
        }
        let distance = (candidate.low - target).abs();
        let slot = match candidate.option_type {
            OptionType::Call => &mut best_call,
            OptionType::Put => &mut best_put,
        };

        let better = match slot {
            None => true,
            Some((current, current_distance)) => {
                distance < *current_distance
                    || (distance == *current_distance && candidate.strike < current.strike)
            }
        };
        if better {
            *slot = Some((candidate, distance));
        }
    }

    let finish = |slot: Option<(&LowCandidate, f64)>| {
        slot.map(|(c, distance)| SelectedStrike {
            strike: c.strike,
            low: c.low,
            current_price: c.current_price,
            distance,
            sample_count: c.sample_count,
            last_update_time: c.last_update_time,
        })
    };

    CandidateResult {
        call: finish(best_call),
        put: finish(best_put),
    }
}

/// Rank the table's running lows against its target. Recomputed on every call.
pub fn select_from_table(table: &LowTable) -> CandidateResult {
    let candidates: Vec<LowCandidate> = table
        .iter()
        .map(|e| LowCandidate {
            strike: e.strike,
            option_type: e.option_type,
            low: e.running_low,
            current_price: e.current_price,
            sample_count: e.sample_count,
            last_update_time: e.last_update_time,
        })
        .collect();

    select_nearest(&candidates, table.band().target)
}
