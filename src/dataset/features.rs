use super::history::DailyBar;

/// Column order of the engineered feature matrix.
pub const FEATURE_NAMES: [&str; 9] = [
    "close",
    "open",
    "high",
    "low",
    "volume",
    "ma_7",
    "ma_21",
    "return_1d",
    "volatility_7",
];

/// Position of the closing price in [`FEATURE_NAMES`].
pub const CLOSE_INDEX: usize = 0;

const SHORT_WINDOW: usize = 7;
const LONG_WINDOW: usize = 21;

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn std_dev(values: &[f64]) -> f64 {
    let m = mean(values);
    (values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64).sqrt()
}

/// One feature row per bar that has a full long-window lookback. The first
/// `LONG_WINDOW - 1` bars only feed the rolling columns.
pub fn engineer(bars: &[DailyBar]) -> Vec<Vec<f64>> {
    if bars.len() < LONG_WINDOW {
        return Vec::new();
    }

    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let mut rows = Vec::with_capacity(bars.len() - LONG_WINDOW + 1);

    for i in (LONG_WINDOW - 1)..bars.len() {
        let bar = &bars[i];
        let short = &closes[i + 1 - SHORT_WINDOW..=i];
        let long = &closes[i + 1 - LONG_WINDOW..=i];
        let prev = closes[i - 1];
        let return_1d = if prev == 0.0 { 0.0 } else { bar.close / prev - 1.0 };

        rows.push(vec![
            bar.close,
            bar.open,
            bar.high,
            bar.low,
            bar.volume,
            mean(short),
            mean(long),
            return_1d,
            std_dev(short),
        ]);
    }

    rows
}
