//! Numeric helpers for report aggregation. Pure functions, empty input → `None`.

/// Median: middle element, or the mean of the two middle elements.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let sorted = sorted_copy(values);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        Some(sorted[mid])
    } else {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    }
}

/// Nearest-rank percentile: element at `ceil(p/100 · n) − 1`, clamped to the first.
pub fn percentile(values: &[f64], p: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let sorted = sorted_copy(values);
    let rank = ((p / 100.0) * sorted.len() as f64).ceil() as i64 - 1;
    let idx = rank.clamp(0, sorted.len() as i64 - 1) as usize;
    Some(sorted[idx])
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// wins / (wins + losses); 0.0 when nothing was decided.
pub fn win_rate(wins: usize, losses: usize) -> f64 {
    let decided = wins + losses;
    if decided == 0 {
        return 0.0;
    }
    wins as f64 / decided as f64
}

/// `count / total`; 0.0 for an empty population.
pub fn ratio(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    count as f64 / total as f64
}

fn sorted_copy(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
}
