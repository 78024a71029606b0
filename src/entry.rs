use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use crate::models::trip::{Stop, Trip, VehicleType};

/// Which of the variant-dependent fields must be filled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequiredFields {
    pub driver_name: bool,
    /// Arrival time and final odometer reading.
    pub arrival: bool,
}

impl Default for RequiredFields {
    fn default() -> Self {
        Self {
            driver_name: true,
            arrival: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    DriverName,
    VehiclePlate,
    Date,
    StartLocation,
    DepartureTime,
    InitialKilometers,
    Destination,
    ArrivalTime,
    FinalKilometers,
}

impl Field {
    pub fn label(&self) -> &'static str {
        match self {
            Field::DriverName => "Nome do Motorista",
            Field::VehiclePlate => "Placa do Veículo",
            Field::Date => "Data",
            Field::StartLocation => "Local de Saída",
            Field::DepartureTime => "Horário de Saída",
            Field::InitialKilometers => "Kilometragem Inicial",
            Field::Destination => "Destino",
            Field::ArrivalTime => "Horário de Chegada",
            Field::FinalKilometers => "Kilometragem Final",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Preencha todos os campos obrigatórios: {}", join_labels(.missing))]
pub struct ValidationError {
    pub missing: Vec<Field>,
}

fn join_labels(fields: &[Field]) -> String {
    fields
        .iter()
        .map(Field::label)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Edit applied to a single stop row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopField {
    Destination(String),
    DepartureLocation(String),
    ArrivalTime(String),
    DepartureTime(String),
    KilometersAtArrival(i64),
    Activity(String),
}

/// Form state for a trip that has not been saved yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TripDraft {
    pub driver_name: String,
    pub vehicle_type: VehicleType,
    pub vehicle_plate: String,
    pub date: String,
    pub start_location: String,
    pub departure_time: String,
    pub initial_kilometers: i64,
    pub destination: String,
    pub arrival_time: String,
    pub final_kilometers: i64,
    pub activity: String,
    pub is_substitution: bool,
    pub stops: Vec<Stop>,
}

impl TripDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an empty stop whose departure location is the previous stop's
    /// destination, or the trip destination for the first stop.
    pub fn add_stop(&mut self) -> &Stop {
        let departure_location = self
            .stops
            .last()
            .map(|stop| stop.destination.clone())
            .unwrap_or_else(|| self.destination.clone());
        self.stops.push(Stop {
            id: Uuid::new_v4().to_string(),
            destination: String::new(),
            departure_location,
            arrival_time: String::new(),
            departure_time: String::new(),
            kilometers_at_arrival: 0,
            activity: None,
        });
        &self.stops[self.stops.len() - 1]
    }

    pub fn update_stop(&mut self, id: &str, field: StopField) -> bool {
        let Some(stop) = self.stops.iter_mut().find(|stop| stop.id == id) else {
            return false;
        };
        match field {
            StopField::Destination(value) => stop.destination = value,
            StopField::DepartureLocation(value) => stop.departure_location = value,
            StopField::ArrivalTime(value) => stop.arrival_time = value,
            StopField::DepartureTime(value) => stop.departure_time = value,
            StopField::KilometersAtArrival(value) => stop.kilometers_at_arrival = value,
            StopField::Activity(value) => stop.activity = normalize_optional(Some(value)),
        }
        true
    }

    /// Later stops keep whatever departure location they already had.
    pub fn remove_stop(&mut self, id: &str) -> bool {
        let before = self.stops.len();
        self.stops.retain(|stop| stop.id != id);
        self.stops.len() != before
    }

    pub fn validate(&self, required: RequiredFields) -> Result<NaiveDate, ValidationError> {
        let mut missing = Vec::new();
        if required.driver_name && is_blank(&self.driver_name) {
            missing.push(Field::DriverName);
        }
        if is_blank(&self.vehicle_plate) {
            missing.push(Field::VehiclePlate);
        }
        let date = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d").ok();
        if date.is_none() {
            missing.push(Field::Date);
        }
        if is_blank(&self.start_location) {
            missing.push(Field::StartLocation);
        }
        if is_blank(&self.departure_time) {
            missing.push(Field::DepartureTime);
        }
        if self.initial_kilometers == 0 {
            missing.push(Field::InitialKilometers);
        }
        if is_blank(&self.destination) {
            missing.push(Field::Destination);
        }
        if required.arrival {
            if is_blank(&self.arrival_time) {
                missing.push(Field::ArrivalTime);
            }
            if self.final_kilometers == 0 {
                missing.push(Field::FinalKilometers);
            }
        }

        match date {
            Some(date) if missing.is_empty() => Ok(date),
            _ => Err(ValidationError { missing }),
        }
    }

    /// Builds the trip record without touching the draft.
    pub fn build(&self, required: RequiredFields) -> Result<Trip, ValidationError> {
        let date = self.validate(required)?;
        Ok(Trip {
            id: Uuid::new_v4().to_string(),
            vehicle_type: self.vehicle_type,
            vehicle_plate: self.vehicle_plate.trim().to_string(),
            date,
            start_location: self.start_location.trim().to_string(),
            departure_time: self.departure_time.trim().to_string(),
            initial_kilometers: self.initial_kilometers,
            destination: self.destination.trim().to_string(),
            arrival_time: normalize_optional(Some(self.arrival_time.clone())),
            final_kilometers: Some(self.final_kilometers).filter(|km| *km != 0),
            stops: self
                .stops
                .iter()
                .cloned()
                .map(|mut stop| {
                    stop.activity = normalize_optional(stop.activity);
                    stop
                })
                .collect(),
            driver_name: normalize_optional(Some(self.driver_name.clone())),
            activity: normalize_optional(Some(self.activity.clone())),
            is_substitution: self.is_substitution,
        })
    }

    /// Validates and builds the trip, then resets the draft. On failure the
    /// draft is left exactly as it was.
    pub fn submit(&mut self, required: RequiredFields) -> Result<Trip, ValidationError> {
        let trip = self.build(required)?;
        self.reset();
        Ok(trip)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

pub(crate) fn normalize_optional(input: Option<String>) -> Option<String> {
    input.and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}
