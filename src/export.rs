//! CSV export of an optimized route.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::error::PlannerError;
use crate::model::{RouteResult, RouteStop};

pub const CSV_HEADER: [&str; 8] = [
    "N°",
    "POS",
    "Indirizzo",
    "Arrivo",
    "Durata Visita",
    "Partenza",
    "Distanza Prossimo",
    "Tempo Viaggio",
];

/// Render `result` as UTF-8 CSV: header, one row per stop, a blank line and
/// a three-row summary.
pub fn render_csv(result: &RouteResult) -> Result<String, PlannerError> {
    let mut writer = csv_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;
    for (index, stop) in result.stops.iter().enumerate() {
        writer.write_record(stop_record(index + 1, stop))?;
    }
    let mut bytes = writer.into_inner().map_err(|err| err.into_error())?;
    bytes.push(b'\n');

    let mut writer = csv_writer(bytes);
    writer.write_record(["Totale POS".to_string(), result.stops.len().to_string()])?;
    writer.write_record([
        "Distanza Totale".to_string(),
        format_km(result.total_distance),
    ])?;
    writer.write_record(["Tempo Totale".to_string(), format_total_time(result.total_time)])?;
    let bytes = writer.into_inner().map_err(|err| err.into_error())?;

    String::from_utf8(bytes)
        .map_err(|err| PlannerError::Io(io::Error::new(io::ErrorKind::InvalidData, err)))
}

/// `percorso_<YYYY-MM-DD>.csv`
pub fn file_name(date: NaiveDate) -> String {
    format!("percorso_{}.csv", date.format("%Y-%m-%d"))
}

/// Write the CSV for `result` into `dir` and return the file path.
pub fn write_csv_file(
    result: &RouteResult,
    dir: &Path,
    date: NaiveDate,
) -> Result<PathBuf, PlannerError> {
    let path = dir.join(file_name(date));
    fs::write(&path, render_csv(result)?)?;
    Ok(path)
}

fn csv_writer(buffer: Vec<u8>) -> csv::Writer<Vec<u8>> {
    csv::WriterBuilder::new()
        .flexible(true)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(buffer)
}

fn stop_record(position: usize, stop: &RouteStop) -> [String; 8] {
    [
        position.to_string(),
        stop.name.clone(),
        stop.address.clone(),
        stop.arrival_time.clone(),
        format!("{} min", stop.visit_duration),
        stop.departure_time.clone(),
        stop.distance_to_next.map(format_km).unwrap_or_default(),
        stop.travel_time_to_next
            .map(|minutes| format!("{} min", minutes))
            .unwrap_or_default(),
    ]
}

fn format_km(km: f64) -> String {
    format!("{:.1} km", km)
}

fn format_total_time(minutes: u32) -> String {
    format!("{}h {:02}min", minutes / 60, minutes % 60)
}
