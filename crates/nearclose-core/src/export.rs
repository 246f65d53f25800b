//! Spreadsheet export of the raw daily history.
//!
//! The export is a comma-separated sheet that spreadsheet applications open
//! directly. Absent bar fields are written as empty cells.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::{CoreError, PriceRecord, PriceSeries};

/// File name offered for the download.
pub const EXPORT_FILE_NAME: &str = "raw_prices.csv";

/// Content type offered with the download.
pub const EXPORT_CONTENT_TYPE: &str = "application/vnd.ms-excel";

const HEADER: [&str; 6] = ["Date", "Open", "High", "Low", "Close", "Volume"];

/// Write `series` as a sheet into `writer`, header first.
pub fn write_spreadsheet<W: Write>(series: &PriceSeries, writer: W) -> Result<(), CoreError> {
    let mut sheet = csv::Writer::from_writer(writer);
    sheet.write_record(HEADER)?;
    for record in series.records() {
        sheet.write_record(row(record))?;
    }
    sheet.flush()?;
    Ok(())
}

/// Sheet contents as bytes, for HTTP responses.
pub fn spreadsheet_bytes(series: &PriceSeries) -> Result<Vec<u8>, CoreError> {
    let mut buffer = Vec::new();
    write_spreadsheet(series, &mut buffer)?;
    Ok(buffer)
}

/// Write the sheet to `path`, replacing any existing file.
pub fn write_spreadsheet_file(series: &PriceSeries, path: &Path) -> Result<(), CoreError> {
    let file = File::create(path)?;
    write_spreadsheet(series, file)
}

fn row(record: &PriceRecord) -> [String; 6] {
    [
        record.date.format_iso(),
        optional_cell(record.open),
        optional_cell(record.high),
        optional_cell(record.low),
        record.close.to_string(),
        record.volume.map(|v| v.to_string()).unwrap_or_default(),
    ]
}

fn optional_cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
