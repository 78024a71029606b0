use chrono::NaiveDate;
use rust_xlsxwriter::{Format, Workbook};
use serde::Deserialize;

use crate::{
    error::AppError,
    metrics::{self, NOT_AVAILABLE},
    models::trip::Trip,
};

pub const SHEET_NAME: &str = "Registros de Viagens";
const FILE_STEM: &str = "registros-viagens";

pub const COLUMNS: [&str; 14] = [
    "Data",
    "Tipo de Veículo",
    "Placa",
    "Motorista",
    "Origem",
    "Destino",
    "Saída",
    "Chegada",
    "Km Inicial",
    "Km Final",
    "Total Rodado (km)",
    "Duração",
    "Atividade",
    "Paradas",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Xlsx,
    Csv,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Csv => "csv",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            ExportFormat::Csv => "text/csv; charset=utf-8",
        }
    }
}

/// One spreadsheet line, already formatted for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRow {
    pub date: String,
    pub vehicle_type: String,
    pub plate: String,
    pub driver: String,
    pub origin: String,
    pub destination: String,
    pub departure: String,
    pub arrival: String,
    pub initial_km: i64,
    pub final_km: Option<i64>,
    pub distance: Option<i64>,
    pub duration: String,
    pub activity: String,
    pub stops: usize,
}

impl ExportRow {
    pub fn from_trip(trip: &Trip) -> Self {
        Self {
            date: format_date(trip.date),
            vehicle_type: trip.vehicle_type.label().to_string(),
            plate: trip.vehicle_plate.clone(),
            driver: trip.driver_text().to_string(),
            origin: trip.start_location.clone(),
            destination: trip.destination.clone(),
            departure: trip.departure_time.clone(),
            arrival: trip.arrival_text().to_string(),
            initial_km: trip.initial_kilometers,
            final_km: trip.final_kilometers,
            distance: metrics::distance(trip),
            duration: metrics::duration(trip).to_string(),
            activity: trip.activity_text().to_string(),
            stops: trip.stops.len(),
        }
    }

    fn text_cells(&self) -> [String; 14] {
        [
            self.date.clone(),
            self.vehicle_type.clone(),
            self.plate.clone(),
            self.driver.clone(),
            self.origin.clone(),
            self.destination.clone(),
            self.departure.clone(),
            self.arrival.clone(),
            self.initial_km.to_string(),
            optional_number(self.final_km),
            optional_number(self.distance),
            self.duration.clone(),
            self.activity.clone(),
            self.stops.to_string(),
        ]
    }
}

fn optional_number(value: Option<i64>) -> String {
    value
        .map(|n| n.to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

pub fn export_rows(trips: &[&Trip]) -> Vec<ExportRow> {
    trips.iter().map(|trip| ExportRow::from_trip(trip)).collect()
}

pub fn export_filename(today: NaiveDate, format: ExportFormat) -> String {
    format!(
        "{FILE_STEM}-{}.{}",
        today.format("%Y-%m-%d"),
        format.extension()
    )
}

pub fn render(rows: &[ExportRow], format: ExportFormat) -> Result<Vec<u8>, AppError> {
    match format {
        ExportFormat::Xlsx => write_xlsx(rows),
        ExportFormat::Csv => write_csv(rows),
    }
}

pub fn write_xlsx(rows: &[ExportRow]) -> Result<Vec<u8>, AppError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (col, title) in (0u16..).zip(COLUMNS) {
        worksheet.write_string_with_format(0, col, title, &header)?;
    }

    for (row, record) in (1u32..).zip(rows) {
        for (col, cell) in (0u16..).zip(record.text_cells()) {
            worksheet.write_string(row, col, cell)?;
        }
        // Odometer, distance and stop count as numbers when present.
        for (col, value) in [
            (8, Some(record.initial_km)),
            (9, record.final_km),
            (10, record.distance),
        ] {
            if let Some(number) = value.and_then(exact_f64) {
                worksheet.write_number(row, col, number)?;
            }
        }
        if let Some(stops) = i64::try_from(record.stops).ok().and_then(exact_f64) {
            worksheet.write_number(row, 13, stops)?;
        }
    }

    Ok(workbook.save_to_buffer()?)
}

/// Largest magnitude a spreadsheet number holds without rounding.
const MAX_EXACT_NUMBER: i64 = 1 << 53;

/// `None` past 2^53, where the cell keeps its text form instead.
fn exact_f64(value: i64) -> Option<f64> {
    (-MAX_EXACT_NUMBER..=MAX_EXACT_NUMBER)
        .contains(&value)
        .then_some(value as f64)
}

pub fn write_csv(rows: &[ExportRow]) -> Result<Vec<u8>, AppError> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(COLUMNS)?;
    for record in rows {
        wtr.write_record(record.text_cells())?;
    }
    wtr.into_inner()
        .map_err(|err| AppError::Other(anyhow::anyhow!("flush csv export: {}", err.error())))
}
