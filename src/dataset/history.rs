use super::DatasetError;
use chrono::NaiveDate;
use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// One daily OHLCV row.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Open", default)]
    open: Option<f64>,
    #[serde(rename = "High", default)]
    high: Option<f64>,
    #[serde(rename = "Low", default)]
    low: Option<f64>,
    #[serde(rename = "Close", default)]
    close: Option<f64>,
    #[serde(rename = "Volume", default)]
    volume: Option<f64>,
}

/// Accepts `2024-01-02` as well as timestamped exports like
/// `2024-01-02 00:00:00-05:00`.
fn parse_date(raw: &str) -> Result<NaiveDate, DatasetError> {
    let day = raw.trim().get(..10).unwrap_or(raw.trim());
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .map_err(|e| DatasetError::Parse(format!("bad date '{}': {}", raw, e)))
}

pub fn load_history(path: &Path) -> Result<Vec<DailyBar>, DatasetError> {
    info!("Loading price history from {}", path.display());
    let file = std::fs::File::open(path)?;
    read_history(file)
}

/// Parses a daily OHLCV CSV, drops rows without a close and sorts by date.
pub fn read_history<R: Read>(reader: R) -> Result<Vec<DailyBar>, DatasetError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut bars = Vec::new();
    let mut dropped = 0usize;

    for record in csv_reader.deserialize::<CsvRow>() {
        let row = record?;
        let close = match row.close {
            Some(close) if close.is_finite() => close,
            _ => {
                dropped += 1;
                continue;
            }
        };

        bars.push(DailyBar {
            date: parse_date(&row.date)?,
            open: row.open.unwrap_or(close),
            high: row.high.unwrap_or(close),
            low: row.low.unwrap_or(close),
            close,
            volume: row.volume.unwrap_or(0.0),
        });
    }

    bars.sort_by_key(|bar| bar.date);

    debug!("Parsed {} bars, dropped {} without a close", bars.len(), dropped);
    Ok(bars)
}

/// The most recent `count` closes, oldest first.
pub fn last_closes(bars: &[DailyBar], count: usize) -> Result<Vec<f64>, DatasetError> {
    if bars.len() < count {
        return Err(DatasetError::Insufficient {
            needed: count,
            got: bars.len(),
        });
    }
    Ok(bars[bars.len() - count..].iter().map(|b| b.close).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Date,Open,High,Low,Close,Adj Close,Volume
2024-01-03,11.0,12.0,10.5,11.5,11.5,2000
2024-01-02,10.0,11.0,9.5,10.5,10.5,1000
2024-01-04,11.5,12.5,11.0,,,1500
2024-01-05 00:00:00-05:00,11.6,12.6,11.1,12.0,12.0,
";

    #[test]
    fn test_rows_sorted_and_missing_close_dropped() {
        let bars = read_history(SAMPLE.as_bytes()).unwrap();
        assert_eq!(bars.len(), 3);
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(bars[0].close, 10.5);
        assert_eq!(bars[2].close, 12.0);
        assert_eq!(bars[2].volume, 0.0);
    }

    #[test]
    fn test_last_closes() {
        let bars = read_history(SAMPLE.as_bytes()).unwrap();
        assert_eq!(last_closes(&bars, 2).unwrap(), vec![11.5, 12.0]);
        assert!(matches!(
            last_closes(&bars, 60),
            Err(DatasetError::Insufficient { needed: 60, got: 3 })
        ));
    }

    #[test]
    fn test_bad_date_is_parse_error() {
        let csv = "Date,Close\nyesterday,10.0\n";
        assert!(matches!(
            read_history(csv.as_bytes()),
            Err(DatasetError::Parse(_))
        ));
    }
}
