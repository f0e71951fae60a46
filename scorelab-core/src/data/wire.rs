//! Wire format of the timed-trading service.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::provider::DataError;
use crate::domain::{
    lenient_flags, lenient_number, lenient_price, lenient_string, lenient_timestamp, SignalFlags,
    TrailPoint,
};

/// `GET /timed/tickers` response.
#[derive(Debug, Deserialize)]
struct UniverseResponse {
    #[serde(default)]
    tickers: Vec<UniverseItem>,
}

/// Universe entries are either bare symbols or `{ "ticker": ... }` objects.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum UniverseItem {
    Symbol(String),
    Object {
        #[serde(default)]
        ticker: Option<String>,
    },
    Other(Value),
}

impl UniverseItem {
    fn into_symbol(self) -> Option<String> {
        match self {
            UniverseItem::Symbol(s) => Some(s),
            UniverseItem::Object { ticker } => ticker,
            UniverseItem::Other(_) => None,
        }
        .filter(|s| !s.is_empty())
    }
}

/// `GET /timed/trail` response.
#[derive(Debug, Deserialize)]
struct TrailResponse {
    #[serde(default)]
    trail: Vec<RawTrailPoint>,
}

/// One trail record exactly as the service sent it.
///
/// Only `ts` is needed to keep a record. Score fields follow JavaScript
/// `Number()` coercion (`null` is 0, absent is NaN); `price` must be a JSON
/// number or it is NaN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTrailPoint {
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub ts: Option<i64>,
    #[serde(default = "nan", deserialize_with = "lenient_price")]
    pub price: f64,
    #[serde(default = "nan", deserialize_with = "lenient_number")]
    pub rank: f64,
    #[serde(default = "nan", deserialize_with = "lenient_number")]
    pub htf_score: f64,
    #[serde(default = "nan", deserialize_with = "lenient_number")]
    pub ltf_score: f64,
    #[serde(default, deserialize_with = "lenient_string")]
    pub state: String,
    #[serde(default = "nan", deserialize_with = "lenient_number")]
    pub completion: f64,
    #[serde(default = "nan", deserialize_with = "lenient_number")]
    pub phase_pct: f64,
    #[serde(default, deserialize_with = "lenient_flags")]
    pub flags: SignalFlags,
}

fn nan() -> f64 {
    f64::NAN
}

impl RawTrailPoint {
    /// Attach the instrument; records without a timestamp cannot be ordered and are dropped.
    pub fn into_point(self, ticker: &str) -> Option<TrailPoint> {
        Some(TrailPoint {
            ticker: ticker.to_string(),
            ts: self.ts?,
            price: self.price,
            rank: self.rank,
            htf_score: self.htf_score,
            ltf_score: self.ltf_score,
            state: self.state,
            completion: self.completion,
            phase_pct: self.phase_pct,
            flags: self.flags,
        })
    }
}

impl From<&TrailPoint> for RawTrailPoint {
    fn from(p: &TrailPoint) -> Self {
        Self {
            ts: Some(p.ts),
            price: p.price,
            rank: p.rank,
            htf_score: p.htf_score,
            ltf_score: p.ltf_score,
            state: p.state.clone(),
            completion: p.completion,
            phase_pct: p.phase_pct,
            flags: p.flags,
        }
    }
}

/// Parse the universe body into symbols, dropping empty and malformed entries.
pub fn parse_universe(body: &str) -> Result<Vec<String>, DataError> {
    let resp: UniverseResponse = serde_json::from_str(body).map_err(|e| {
        DataError::ResponseFormatChanged(format!("failed to parse ticker universe: {e}"))
    })?;
    Ok(resp
        .tickers
        .into_iter()
        .filter_map(UniverseItem::into_symbol)
        .collect())
}

/// Parse a trail body. A missing `trail` key is an empty trail.
pub fn parse_trail(body: &str) -> Result<Vec<RawTrailPoint>, DataError> {
    let resp: TrailResponse = serde_json::from_str(body)
        .map_err(|e| DataError::ResponseFormatChanged(format!("failed to parse trail: {e}")))?;
    Ok(resp.trail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn universe_accepts_strings_and_objects() {
        let body = r#"{"tickers": ["AAPL", {"ticker": "MSFT"}, {"name": "x"}, "", 42]}"#;
        assert_eq!(parse_universe(body).unwrap(), vec!["AAPL", "MSFT"]);
    }

    #[test]
    fn universe_without_key_is_empty() {
        assert!(parse_universe("{}").unwrap().is_empty());
    }

    #[test]
    fn universe_garbage_is_an_error() {
        assert!(matches!(
            parse_universe("<html>"),
            Err(DataError::ResponseFormatChanged(_))
        ));
    }

    #[test]
    fn trail_record_parses_full_point() {
        let body = r#"{"trail": [{
            "ts": 1700000000000, "price": 189.5, "rank": 74, "htf_score": "1.2",
            "ltf_score": -0.3, "state": "HTF_BULL_LTF_PULLBACK",
            "completion": 0.41, "phase_pct": 0.22,
            "flags": {"sq30_release": true, "ema_cross_1h_13_48": 1}
        }]}"#;
        let trail = parse_trail(body).unwrap();
        assert_eq!(trail.len(), 1);
        let p = trail[0].clone().into_point("AAPL").unwrap();
        assert_eq!(p.ticker, "AAPL");
        assert_eq!(p.ts, 1_700_000_000_000);
        assert_eq!(p.htf_score, 1.2);
        assert!(p.flags.sq30_release);
        assert!(p.flags.ema_cross_1h_13_48);
    }

    #[test]
    fn malformed_fields_degrade_instead_of_failing() {
        let body = r#"{"trail": [
            {"ts": 1, "price": null, "rank": "n/a", "state": 7, "flags": "broken"},
            {"price": 10}
        ]}"#;
        let trail = parse_trail(body).unwrap();
        assert_eq!(trail.len(), 2);
        let p = trail[0].clone().into_point("X").unwrap();
        assert!(p.price.is_nan());
        assert!(p.rank.is_nan());
        assert!(p.htf_score.is_nan(), "absent stays NaN");
        assert_eq!(p.state, "");
        assert_eq!(p.flags, SignalFlags::default());
        assert!(trail[1].clone().into_point("X").is_none());
    }

    #[test]
    fn missing_trail_key_is_empty() {
        assert!(parse_trail(r#"{"error": "nope"}"#).unwrap().is_empty());
    }

    #[test]
    fn null_score_fields_read_as_zero() {
        let body = r#"{"trail": [{
            "ts": 1, "price": 50.0, "rank": null, "htf_score": null, "ltf_score": null,
            "completion": null, "phase_pct": null, "state": "HTF_BULL_LTF_BULL"
        }]}"#;
        let p = parse_trail(body).unwrap()[0].clone().into_point("X").unwrap();
        assert_eq!(p.rank, 0.0);
        assert_eq!(p.htf_score, 0.0);
        assert_eq!(p.ltf_score, 0.0);
        assert_eq!(p.completion, 0.0);
        assert_eq!(p.phase_pct, 0.0);
    }

    #[test]
    fn string_price_is_not_a_price() {
        let body = r#"{"trail": [{"ts": 1, "price": "100.5", "rank": "74"}]}"#;
        let p = parse_trail(body).unwrap()[0].clone().into_point("X").unwrap();
        assert!(p.price.is_nan());
        assert_eq!(p.rank, 74.0);
    }
}
