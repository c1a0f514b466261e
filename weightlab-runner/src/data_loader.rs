//! CSV price loading for the runner.
//!
//! Expected columns: `timestamp,ticker,close,adj_close`. Dates are ISO
//! `YYYY-MM-DD`. A row with an empty close is a missing observation and is
//! dropped; an empty adjusted close falls back to the close.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};
use weightlab_core::data::PriceObservation;
use weightlab_core::domain::Ticker;

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open price file '{path}': {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("malformed price row: {0}")]
    Row(#[from] csv::Error),

    #[error("price file contained no observations")]
    Empty,
}

#[derive(Debug, Deserialize)]
struct PriceRow {
    timestamp: NaiveDate,
    ticker: Ticker,
    close: Option<Decimal>,
    adj_close: Option<Decimal>,
}

/// Load observations from a CSV file on disk.
pub fn load_price_csv(path: &Path) -> Result<Vec<PriceObservation>, LoadError> {
    let reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|source| LoadError::Open {
            path: path.to_path_buf(),
            source,
        })?;
    let observations = collect_rows(reader)?;
    debug!(path = %path.display(), rows = observations.len(), "loaded price file");
    Ok(observations)
}

/// Read observations from any CSV source with a header row.
pub fn read_price_csv<R: Read>(input: R) -> Result<Vec<PriceObservation>, LoadError> {
    let reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(input);
    collect_rows(reader)
}

fn collect_rows<R: Read>(mut reader: csv::Reader<R>) -> Result<Vec<PriceObservation>, LoadError> {
    let mut observations = Vec::new();
    let mut missing = 0usize;

    for row in reader.deserialize::<PriceRow>() {
        let row = row?;
        let Some(close) = row.close else {
            missing += 1;
            continue;
        };
        let adj_close = row.adj_close.unwrap_or(close);
        observations.push(PriceObservation::new(row.timestamp, row.ticker, close, adj_close));
    }

    if missing > 0 {
        warn!(missing, "dropped rows with no close");
    }
    if observations.is_empty() {
        return Err(LoadError::Empty);
    }
    Ok(observations)
}
