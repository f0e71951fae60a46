//! JSON number shape for configured cut-offs.
//!
//! Whole values are written as integers (`20`, not `20.0`) so reports keep the
//! shape consumers already diff against.

use serde::Serializer;

const MAX_EXACT: f64 = 9_007_199_254_740_992.0;

pub fn whole<S: Serializer>(value: &f64, s: S) -> Result<S::Ok, S::Error> {
    if value.fract() == 0.0 && value.abs() <= MAX_EXACT {
        s.serialize_i64(*value as i64)
    } else {
        s.serialize_f64(*value)
    }
}

pub fn whole_opt<S: Serializer>(value: &Option<f64>, s: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(v) => whole(v, s),
        None => s.serialize_none(),
    }
}
