//! Loading price history from two-column CSV files
//!
//! Rows are `date,price` with no header. Dates are ISO `YYYY-MM-DD` or US
//! `M/D/YYYY`. Blank lines and whitespace around fields are ignored.

use std::io::Read;
use std::path::Path;

use jiff::civil::Date;
use nestegg_core::PricePoint;

#[derive(Debug, Clone, PartialEq)]
pub enum PriceLoadError {
    Io(String),
    Csv { line: u64, message: String },
    MissingColumn { line: u64 },
    InvalidDate { line: u64, value: String },
    InvalidPrice { line: u64, value: String },
    Empty,
}

impl std::fmt::Display for PriceLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PriceLoadError::Io(msg) => write!(f, "IO error: {}", msg),
            PriceLoadError::Csv { line, message } => {
                write!(f, "line {}: malformed row: {}", line, message)
            }
            PriceLoadError::MissingColumn { line } => {
                write!(f, "line {}: expected `date,price`", line)
            }
            PriceLoadError::InvalidDate { line, value } => {
                write!(f, "line {}: invalid date '{}'", line, value)
            }
            PriceLoadError::InvalidPrice { line, value } => {
                write!(f, "line {}: invalid price '{}'", line, value)
            }
            PriceLoadError::Empty => write!(f, "price file contains no rows"),
        }
    }
}

impl std::error::Error for PriceLoadError {}

/// Parse `YYYY-MM-DD` or `M/D/YYYY`
pub fn parse_date(value: &str) -> Option<Date> {
    if value.contains('/') {
        let mut parts = value.split('/');
        let month = parts.next()?.trim().parse::<i8>().ok()?;
        let day = parts.next()?.trim().parse::<i8>().ok()?;
        let year = parts.next()?.trim().parse::<i16>().ok()?;
        if parts.next().is_some() {
            return None;
        }
        Date::new(year, month, day).ok()
    } else {
        value.parse::<Date>().ok()
    }
}

/// Read price points from any CSV source
pub fn read_prices<R: Read>(reader: R) -> Result<Vec<PricePoint>, PriceLoadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut points = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(|e| PriceLoadError::Csv {
            line: e.position().map_or(0, |p| p.line()),
            message: e.to_string(),
        })?;
        let line = record.position().map_or(0, |p| p.line());

        // A line of whitespace trims down to one empty field
        if record.iter().all(str::is_empty) {
            continue;
        }

        let (Some(date), Some(price)) = (record.get(0), record.get(1)) else {
            return Err(PriceLoadError::MissingColumn { line });
        };

        let timestamp = parse_date(date).ok_or_else(|| PriceLoadError::InvalidDate {
            line,
            value: date.to_string(),
        })?;
        let price = price
            .parse::<f64>()
            .map_err(|_| PriceLoadError::InvalidPrice {
                line,
                value: price.to_string(),
            })?;

        points.push(PricePoint::new(timestamp, price));
    }

    if points.is_empty() {
        return Err(PriceLoadError::Empty);
    }

    tracing::debug!(rows = points.len(), "Loaded price history");
    Ok(points)
}

pub fn load_prices(path: &Path) -> Result<Vec<PricePoint>, PriceLoadError> {
    let file = std::fs::File::open(path)
        .map_err(|e| PriceLoadError::Io(format!("{}: {}", path.display(), e)))?;
    read_prices(file)
}
